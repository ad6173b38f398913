//! End-to-end placement over hand-built inventories.

use std::collections::BTreeMap;

use hostfit_catalog::Catalog;
use hostfit_inventory::{Host, HostCache, HostGroup, Vm};
use hostfit_placement::{
    candidates, estimate, recommend, score, PlacementError, PlacementFilters, PlacementResult,
    ScorePreference,
};
use proptest::prelude::*;

fn vm(name: &str, size: &str) -> Vm {
    Vm {
        id: format!("/VMS/{}", name.to_uppercase()),
        name: name.to_string(),
        size: size.to_string(),
        ..Vm::default()
    }
}

fn host(name: &str, sku: &str, fault_domain: &str, vms: &[(&str, &str)]) -> Host {
    Host {
        id: format!("/hosts/{name}"),
        name: name.to_string(),
        sku: sku.to_string(),
        fault_domain: fault_domain.to_string(),
        vms: vms
            .iter()
            .map(|(n, s)| {
                let vm = vm(n, s);
                (vm.id.clone(), vm)
            })
            .collect(),
        ..Host::default()
    }
}

fn group(name: &str, location: &str, zone: Option<&str>, rg: &str, hosts: Vec<Host>) -> HostGroup {
    let mut group = HostGroup {
        id: format!("/rg/{rg}/hg/{name}"),
        name: name.to_string(),
        location: location.to_string(),
        zone: zone.map(str::to_string),
        resource_group: rg.to_string(),
        ..HostGroup::default()
    };
    for mut h in hosts {
        h.group_name = name.to_string();
        h.location = location.to_string();
        h.resource_group = rg.to_string();
        group.insert_host(h);
    }
    group
}

fn cache(groups: Vec<HostGroup>, catalog: &Catalog) -> HostCache {
    let mut cache = HostCache::new();
    for g in groups {
        cache.insert_group(g);
    }
    cache.recompute_utilization(catalog).unwrap();
    cache
}

fn filters(rg: Option<&str>, hg: Option<&str>) -> PlacementFilters {
    PlacementFilters {
        resource_group: rg.map(str::to_string),
        host_group: hg.map(str::to_string),
        ..PlacementFilters::default()
    }
}

#[test]
fn test_half_full_host_scores_half() {
    let catalog = Catalog::builtin();
    let cache = cache(
        vec![group(
            "hg",
            "eastus",
            Some("1"),
            "rg",
            vec![host("H1", "DSv3-Type1", "0", &[("a", "Standard_D32s_v3")])],
        )],
        &catalog,
    );

    let h1 = cache.hosts().next().unwrap();
    assert_eq!(h1.utilized_cores, 32);
    assert_eq!(h1.utilized_memory_gib, 128);
    assert_eq!(h1.available_cores, 32);
    assert_eq!(h1.available_memory_gib, 312);

    assert_eq!(score(h1, "Standard_D16s_v3", &catalog).unwrap(), 0.5);
    assert_eq!(score(h1, "Standard_D64s_v3", &catalog).unwrap(), 0.0);

    let result = recommend(
        &cache,
        &PlacementFilters::default(),
        "Standard_D16s_v3",
        &catalog,
        ScorePreference::Highest,
    )
    .unwrap();
    assert_eq!(
        result,
        PlacementResult::PlacedOn {
            host_id: "/hosts/H1".to_string(),
            host_name: "H1".to_string(),
            host_group: "hg".to_string(),
            score: 0.5,
        }
    );
}

#[test]
fn test_incompatible_family_requires_new_host() {
    let catalog = Catalog::builtin();
    let cache = cache(
        vec![group(
            "hg",
            "eastus",
            Some("1"),
            "rg",
            vec![host("H1", "DSv3-Type1", "0", &[])],
        )],
        &catalog,
    );

    let result = recommend(
        &cache,
        &filters(Some("rg"), Some("hg")),
        "Standard_E2s_v3",
        &catalog,
        ScorePreference::Highest,
    )
    .unwrap();

    assert_eq!(
        result,
        PlacementResult::CreateHostRequired {
            host_sku: "ESv3-Type1".to_string(),
            resource_group: "rg".to_string(),
            host_group: "hg".to_string(),
            location: None,
            zone: None,
        }
    );
}

#[test]
fn test_unknown_size_is_unsupported() {
    let catalog = Catalog::builtin();
    let cache = cache(
        vec![group("hg", "eastus", None, "rg", vec![host("H1", "DSv3-Type1", "0", &[])])],
        &catalog,
    );

    let err = recommend(
        &cache,
        &filters(Some("rg"), Some("hg")),
        "Standard_Z1_v9",
        &catalog,
        ScorePreference::Highest,
    )
    .unwrap_err();
    assert!(matches!(err, PlacementError::UnsupportedVmSize(ref s) if s == "Standard_Z1_v9"));
}

#[test]
fn test_missing_target_when_nothing_fits() {
    let catalog = Catalog::builtin();
    let cache = cache(
        vec![group(
            "hg",
            "eastus",
            None,
            "rg",
            vec![host("H1", "DSv3-Type1", "0", &[("a", "Standard_D64s_v3")])],
        )],
        &catalog,
    );

    let err = recommend(
        &cache,
        &filters(Some("rg"), None),
        "Standard_D2s_v3",
        &catalog,
        ScorePreference::Highest,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        PlacementError::MissingTarget { ref host_sku, .. } if host_sku == "DSv3-Type1"
    ));
}

#[test]
fn test_empty_cache_falls_back_to_reverse_lookup() {
    let catalog = Catalog::builtin();
    let result = recommend(
        &HostCache::new(),
        &filters(Some("rg"), Some("hg")),
        "Standard_D4s_v3",
        &catalog,
        ScorePreference::Highest,
    )
    .unwrap();

    // DSv3-Type1 and DSv3-Type2 both qualify; the first by id wins.
    assert!(matches!(
        result,
        PlacementResult::CreateHostRequired { ref host_sku, .. } if host_sku == "DSv3-Type1"
    ));
}

#[test]
fn test_filters_narrow_the_scan() {
    let catalog = Catalog::builtin();
    let cache = cache(
        vec![
            group(
                "hg-east",
                "eastus",
                Some("1"),
                "rg-a",
                vec![
                    host("e1", "DSv3-Type1", "0", &[("a", "Standard_D32s_v3")]),
                    host("e2", "DSv3-Type1", "1", &[]),
                ],
            ),
            group(
                "hg-west",
                "westus",
                Some("2"),
                "rg-b",
                vec![host("w1", "DSv3-Type1", "0", &[("b", "Standard_D16s_v3")])],
            ),
        ],
        &catalog,
    );

    let names = |f: &PlacementFilters| -> Vec<String> {
        candidates(&cache, f, "Standard_D8s_v3", &catalog)
            .unwrap()
            .into_iter()
            .map(|c| c.host_name)
            .collect()
    };

    assert_eq!(names(&PlacementFilters::default()), vec!["e1", "e2", "w1"]);
    assert_eq!(
        names(&PlacementFilters {
            location: Some("westus".to_string()),
            ..PlacementFilters::default()
        }),
        vec!["w1"]
    );
    assert_eq!(
        names(&PlacementFilters {
            zone: Some("1".to_string()),
            ..PlacementFilters::default()
        }),
        vec!["e1", "e2"]
    );
    assert_eq!(names(&filters(Some("RG-B"), None)), vec!["w1"]);
    assert_eq!(
        names(&PlacementFilters {
            fault_domain: Some("1".to_string()),
            ..PlacementFilters::default()
        }),
        vec!["e2"]
    );
}

#[test]
fn test_preference_picks_opposite_ends() {
    let catalog = Catalog::builtin();
    let cache = cache(
        vec![group(
            "hg",
            "eastus",
            None,
            "rg",
            vec![
                // 8/32 cores = 0.25
                host("busy", "DSv3-Type1", "0", &[("a", "Standard_D32s_v3")]),
                // 8/64 cores = 0.125
                host("idle", "DSv3-Type1", "0", &[]),
            ],
        )],
        &catalog,
    );

    let pick = |preference| match recommend(
        &cache,
        &PlacementFilters::default(),
        "Standard_D8s_v3",
        &catalog,
        preference,
    )
    .unwrap()
    {
        PlacementResult::PlacedOn { host_name, .. } => host_name,
        other => panic!("unexpected {other:?}"),
    };

    assert_eq!(pick(ScorePreference::Highest), "busy");
    assert_eq!(pick(ScorePreference::Lowest), "idle");
}

#[test]
fn test_equal_scores_go_to_first_host() {
    let catalog = Catalog::builtin();
    let cache = cache(
        vec![group(
            "hg",
            "eastus",
            None,
            "rg",
            vec![
                host("b-host", "DSv3-Type1", "0", &[]),
                host("a-host", "DSv3-Type1", "0", &[]),
            ],
        )],
        &catalog,
    );

    for preference in [ScorePreference::Highest, ScorePreference::Lowest] {
        let result = recommend(
            &cache,
            &PlacementFilters::default(),
            "Standard_D2s_v3",
            &catalog,
            preference,
        )
        .unwrap();
        assert!(matches!(
            result,
            PlacementResult::PlacedOn { ref host_name, .. } if host_name == "a-host"
        ));
    }
}

#[test]
fn test_recommend_leaves_cache_untouched() {
    let catalog = Catalog::builtin();
    let cache = cache(
        vec![group(
            "hg",
            "eastus",
            None,
            "rg",
            vec![host("H1", "DSv3-Type1", "0", &[("a", "Standard_D4s_v3")])],
        )],
        &catalog,
    );
    let before = cache.clone();

    let first = recommend(
        &cache,
        &PlacementFilters::default(),
        "Standard_D4s_v3",
        &catalog,
        ScorePreference::Highest,
    )
    .unwrap();
    let second = recommend(
        &cache,
        &PlacementFilters::default(),
        "Standard_D4s_v3",
        &catalog,
        ScorePreference::Highest,
    )
    .unwrap();

    assert_eq!(first, second);
    assert_eq!(cache, before);
}

fn d_series() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "Standard_D2s_v3",
        "Standard_D4s_v3",
        "Standard_D8s_v3",
        "Standard_D16s_v3",
        "Standard_D32s_v3",
    ])
}

proptest! {
    #[test]
    fn prop_more_headroom_never_scores_higher(
        shared in prop::collection::vec(d_series(), 0..4),
        extra in d_series(),
        request in d_series(),
    ) {
        let catalog = Catalog::builtin();

        let shared_vms: Vec<(String, &str)> = shared
            .iter()
            .enumerate()
            .map(|(i, s)| (format!("vm{i}"), *s))
            .collect();
        let as_refs = |v: &[(String, &str)]| -> Vec<(String, String)> {
            v.iter().map(|(n, s)| (n.clone(), s.to_string())).collect()
        };

        let roomy_vms = as_refs(&shared_vms);
        let mut tight_vms = as_refs(&shared_vms);
        tight_vms.push(("extra".to_string(), extra.to_string()));

        let build = |name: &str, vms: &[(String, String)]| {
            let pairs: Vec<(&str, &str)> =
                vms.iter().map(|(n, s)| (n.as_str(), s.as_str())).collect();
            let mut h = host(name, "DSv3-Type1", "0", &pairs);
            h.recompute_utilization(&catalog).unwrap();
            h
        };
        let roomy = build("roomy", &roomy_vms);
        let tight = build("tight", &tight_vms);

        let a = estimate(&roomy, request, &catalog).unwrap();
        let b = estimate(&tight, request, &catalog).unwrap();
        if a > 0.0 && b > 0.0 {
            prop_assert!(a <= b, "roomy {a} > tight {b}");
        }
    }

    #[test]
    fn prop_incompatible_size_scores_zero(
        vms in prop::collection::vec(d_series(), 0..3),
        size in prop::sample::select(vec![
            "Standard_E2s_v3",
            "Standard_F8s_v2",
            "Standard_Unknown",
            "",
        ]),
    ) {
        let catalog = Catalog::builtin();
        let pairs: Vec<(String, &str)> =
            vms.iter().enumerate().map(|(i, s)| (format!("vm{i}"), *s)).collect();
        let refs: Vec<(&str, &str)> = pairs.iter().map(|(n, s)| (n.as_str(), *s)).collect();
        let h = host("h", "DSv3-Type1", "0", &refs);

        prop_assert_eq!(score(&h, size, &catalog).unwrap(), 0.0);
    }

    #[test]
    fn prop_provider_capacity_is_authoritative(
        count in 0u32..1000,
        vms in prop::collection::vec(d_series(), 0..6),
        size in d_series(),
    ) {
        let catalog = Catalog::builtin();
        let pairs: Vec<(String, &str)> =
            vms.iter().enumerate().map(|(i, s)| (format!("vm{i}"), *s)).collect();
        let refs: Vec<(&str, &str)> = pairs.iter().map(|(n, s)| (n.as_str(), *s)).collect();
        let mut h = host("h", "DSv3-Type1", "0", &refs);
        h.allocatable_capacity = BTreeMap::from([(size.to_string(), count)]);

        prop_assert_eq!(score(&h, size, &catalog).unwrap(), f64::from(count));
    }
}
