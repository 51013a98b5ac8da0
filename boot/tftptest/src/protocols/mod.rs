//! High-Level Protocol Abstractions
//!
//! Safe wrappers around the firmware protocols the probe uses:
//!
//! - **Console**: Simple Text Input/Output as a [`crate::console::Console`]
//! - **PXE**: PXE Base Code as a [`crate::network::NetworkBoot`]

pub mod console;
pub mod pxe;

pub use console::EfiConsole;
pub use pxe::PxeBaseCode;
