//! Loaded Image Protocol
//!
//! Tells an image which device it was loaded from.

use crate::raw::types::*;
use core::ffi::c_void;
use core::fmt;
use core::mem::offset_of;
use static_assertions::const_assert_eq;

/// Loaded Image Protocol
#[repr(C)]
pub struct EfiLoadedImageProtocol {
    /// Revision
    pub revision: u32,
    /// Parent handle
    pub parent_handle: Handle,
    /// System table
    pub system_table: *mut c_void,

    // Device location
    /// Device handle the image was loaded from
    pub device_handle: Handle,
    /// File path
    pub file_path: *mut c_void,
    /// Reserved
    pub reserved: *mut c_void,

    // Load options
    /// Load options size
    pub load_options_size: u32,
    /// Load options
    pub load_options: *mut c_void,

    // Image location
    /// Image base
    pub image_base: *mut c_void,
    /// Image size
    pub image_size: u64,
    /// Image code type
    pub image_code_type: u32,
    /// Image data type
    pub image_data_type: u32,

    /// Unload function
    pub unload: unsafe extern "efiapi" fn(image_handle: Handle) -> Status,
}

impl EfiLoadedImageProtocol {
    /// Protocol GUID
    pub const GUID: Guid = guids::LOADED_IMAGE_PROTOCOL;

    /// Get device handle
    pub fn device(&self) -> Option<Handle> {
        if self.device_handle.is_null() {
            None
        } else {
            Some(self.device_handle)
        }
    }
}

impl fmt::Debug for EfiLoadedImageProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EfiLoadedImageProtocol")
            .field("revision", &self.revision)
            .field("parent_handle", &self.parent_handle)
            .field("device_handle", &self.device_handle)
            .field("image_base", &self.image_base)
            .field("image_size", &self.image_size)
            .finish()
    }
}

#[cfg(target_pointer_width = "64")]
const_assert_eq!(offset_of!(EfiLoadedImageProtocol, device_handle), 24);
