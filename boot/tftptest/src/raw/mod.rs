//! Raw UEFI bindings
//!
//! Raw, unsafe mirrors of the firmware structures the probe touches. All
//! types here are `#[repr(C)]` and match the UEFI ABI; their layouts are
//! checked at compile time.
//!
//! # Safety
//!
//! Using these types directly is unsafe and requires understanding the
//! UEFI specification. The `services` and `protocols` modules wrap them.

pub mod types;
pub mod system_table;
pub mod boot_services;
pub mod protocols;

pub use types::*;
pub use system_table::*;
pub use boot_services::*;
