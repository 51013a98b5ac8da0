//! Raw UEFI Protocol Definitions
//!
//! FFI layouts of the protocols this application opens.

pub mod loaded_image;
pub mod pxe;

pub use loaded_image::*;
pub use pxe::PxeBaseCodeProtocol;
