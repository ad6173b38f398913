//! Built-in SKU table for Azure dedicated hosts.

use crate::Catalog;

const DSV3_TYPE1: &[&str] = &[
    "Standard_D2s_v3",
    "Standard_D4s_v3",
    "Standard_D8s_v3",
    "Standard_D16s_v3",
    "Standard_D32s_v3",
    "Standard_D64s_v3",
];

const DSV3_TYPE2: &[&str] = &[
    "Standard_D2s_v3",
    "Standard_D4s_v3",
    "Standard_D8s_v3",
    "Standard_D16s_v3",
    "Standard_D32s_v3",
    "Standard_D48s_v3",
    "Standard_D64s_v3",
];

const ESV3_TYPE1: &[&str] = &[
    "Standard_E2s_v3",
    "Standard_E4s_v3",
    "Standard_E8s_v3",
    "Standard_E16s_v3",
    "Standard_E32s_v3",
    "Standard_E48s_v3",
    "Standard_E64s_v3",
];

const FSV2_TYPE2: &[&str] = &[
    "Standard_F2s_v2",
    "Standard_F4s_v2",
    "Standard_F8s_v2",
    "Standard_F16s_v2",
    "Standard_F32s_v2",
    "Standard_F64s_v2",
];

pub(crate) fn catalog() -> Catalog {
    Catalog::builder()
        // Dsv3: 4 GiB per core
        .vm_size("Standard_D2s_v3", 2, 8)
        .vm_size("Standard_D4s_v3", 4, 16)
        .vm_size("Standard_D8s_v3", 8, 32)
        .vm_size("Standard_D16s_v3", 16, 64)
        .vm_size("Standard_D32s_v3", 32, 128)
        .vm_size("Standard_D48s_v3", 48, 192)
        .vm_size("Standard_D64s_v3", 64, 256)
        // Esv3: 8 GiB per core, except E64s
        .vm_size("Standard_E2s_v3", 2, 16)
        .vm_size("Standard_E4s_v3", 4, 32)
        .vm_size("Standard_E8s_v3", 8, 64)
        .vm_size("Standard_E16s_v3", 16, 128)
        .vm_size("Standard_E32s_v3", 32, 256)
        .vm_size("Standard_E48s_v3", 48, 384)
        .vm_size("Standard_E64s_v3", 64, 432)
        // Fsv2: 2 GiB per core
        .vm_size("Standard_F2s_v2", 2, 4)
        .vm_size("Standard_F4s_v2", 4, 8)
        .vm_size("Standard_F8s_v2", 8, 16)
        .vm_size("Standard_F16s_v2", 16, 32)
        .vm_size("Standard_F32s_v2", 32, 64)
        .vm_size("Standard_F64s_v2", 64, 128)
        .host_sku("DSv3-Type1", 64, 440, DSV3_TYPE1)
        .host_sku("DSv3-Type2", 64, 640, DSV3_TYPE2)
        .host_sku("ESv3-Type1", 64, 440, ESV3_TYPE1)
        .host_sku("FSv2-Type2", 72, 440, FSV2_TYPE2)
        .build()
}
