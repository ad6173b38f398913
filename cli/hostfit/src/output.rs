//! Output formatting for CLI commands.

use colored::Colorize;
use hostfit_inventory::{Host, HostGroup};
use serde::Serialize;
use tabled::{Table, Tabled};

const CLI_SCHEMA_VERSION: &str = "hostfit.cli.v1";

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON format.
    Json,
}

/// Print data in the specified format.
pub fn print_output<T: Serialize + Tabled>(data: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if data.is_empty() {
                println!("{}", "No items found.".dimmed());
            } else {
                let table = Table::new(data).to_string();
                println!("{}", table);
            }
        }
        OutputFormat::Json => {
            let json = format_json(data, "[]");
            println!("{}", json);
        }
    }
}

/// Print a single item as JSON.
pub fn print_single<T: Serialize>(data: &T) {
    println!("{}", format_json(data, "{}"));
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", "Success:".green().bold(), message);
}

/// Print an info message.
pub fn print_info(message: &str) {
    println!("{} {}", "Info:".blue().bold(), message);
}

/// Print a warning to stderr so stdout stays parseable.
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "Warning:".yellow().bold(), message);
}

/// One row of the host utilization table.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct HostRow {
    #[tabled(rename = "Host Group")]
    pub host_group: String,

    #[tabled(rename = "Host")]
    pub host: String,

    #[tabled(rename = "SKU")]
    pub sku: String,

    #[tabled(rename = "Location")]
    pub location: String,

    #[tabled(rename = "Zone", display = "display_option")]
    pub zone: Option<String>,

    #[tabled(rename = "FD")]
    pub fault_domain: String,

    #[tabled(rename = "VMs")]
    pub vms: usize,

    #[tabled(rename = "Cores (used/total)", display = "display_ratio")]
    pub cores: (u32, u32),

    #[tabled(rename = "Memory GiB (used/total)", display = "display_ratio")]
    pub memory_gib: (u32, u32),

    #[tabled(rename = "Avail Cores")]
    pub available_cores: i64,

    #[tabled(rename = "Avail GiB")]
    pub available_memory_gib: i64,

    #[tabled(rename = "Unresolved")]
    pub unresolved_vms: u32,

    #[tabled(rename = "Status")]
    pub status: &'static str,
}

impl HostRow {
    pub fn new(group: &HostGroup, host: &Host) -> Self {
        Self {
            host_group: group.name.clone(),
            host: host.name.clone(),
            sku: host.sku.clone(),
            location: group.location.clone(),
            zone: group.zone.clone(),
            fault_domain: if host.fault_domain.is_empty() {
                "-".to_string()
            } else {
                host.fault_domain.clone()
            },
            vms: host.vms.len(),
            cores: (host.utilized_cores, host.total_cores),
            memory_gib: (host.utilized_memory_gib, host.total_memory_gib),
            available_cores: host.available_cores,
            available_memory_gib: host.available_memory_gib,
            unresolved_vms: host.unresolved_vm_count,
            status: host_status(host),
        }
    }
}

/// Oversubscription outranks missing VM costs.
fn host_status(host: &Host) -> &'static str {
    let utilization = host.utilization();
    if utilization.is_oversubscribed() {
        "oversubscribed"
    } else if !utilization.is_complete() {
        "incomplete"
    } else {
        "ok"
    }
}

fn display_option(opt: &Option<String>) -> String {
    opt.as_deref().unwrap_or("-").to_string()
}

fn display_ratio(pair: &(u32, u32)) -> String {
    format!("{}/{}", pair.0, pair.1)
}

#[derive(Debug, Serialize)]
pub struct ReceiptNextStep {
    pub label: &'static str,
    pub cmd: String,
}

pub struct Receipt<'a, T: Serialize> {
    pub message: String,
    pub status: &'a str,
    pub kind: &'a str,
    pub resource_key: &'a str,
    pub resource: &'a T,
    pub next: &'a [ReceiptNextStep],
}

pub fn receipt_value<T: Serialize>(
    status: &str,
    kind: &str,
    resource_key: &str,
    resource: &T,
    next: &[ReceiptNextStep],
) -> serde_json::Value {
    let mut receipt = serde_json::Map::new();
    receipt.insert("kind".to_string(), serde_json::json!(kind));
    receipt.insert("status".to_string(), serde_json::json!(status));
    receipt.insert(
        "next".to_string(),
        serde_json::to_value(next).unwrap_or_else(|_| serde_json::json!([])),
    );
    receipt.insert(
        resource_key.to_string(),
        serde_json::to_value(resource).unwrap_or_else(|_| serde_json::json!({})),
    );
    serde_json::json!({ "receipt": receipt })
}

pub fn print_receipt<T: Serialize>(format: OutputFormat, receipt: Receipt<'_, T>) {
    match format {
        OutputFormat::Table => {
            print_success(&receipt.message);
            for step in receipt.next {
                print_info(&format!("{}: {}", step.label, step.cmd));
            }
        }
        OutputFormat::Json => {
            let out = receipt_value(
                receipt.status,
                receipt.kind,
                receipt.resource_key,
                receipt.resource,
                receipt.next,
            );
            print_single(&out);
        }
    }
}

fn format_json<T: Serialize + ?Sized>(data: &T, fallback: &str) -> String {
    let value = serde_json::to_value(data).unwrap_or_else(|_| serde_json::json!({}));
    let wrapped = serde_json::json!({
        "schemaVersion": CLI_SCHEMA_VERSION,
        "data": value
    });
    serde_json::to_string_pretty(&wrapped).unwrap_or_else(|_| fallback.to_string())
}
