//! UEFI Services
//!
//! Safe wrappers over the raw service tables.

pub mod boot;

pub use boot::BootServices;
