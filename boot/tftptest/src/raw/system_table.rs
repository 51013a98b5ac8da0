//! Raw UEFI System Table Definition
//!
//! The System Table is handed to the application on entry. It carries the
//! console protocols, the firmware identification and the Boot Services
//! table pointer.

use super::boot_services::EfiBootServices;
use super::types::*;
use core::ffi::c_void;
use core::mem::{offset_of, size_of};
use static_assertions::const_assert_eq;

// =============================================================================
// SYSTEM TABLE
// =============================================================================

/// EFI System Table
#[derive(Debug)]
#[repr(C)]
pub struct EfiSystemTable {
    /// Table header
    pub hdr: TableHeader,

    /// Pointer to null-terminated firmware vendor string (UCS-2)
    pub firmware_vendor: *const Char16,

    /// Firmware revision number
    pub firmware_revision: u32,

    /// Handle for console input device
    pub console_in_handle: Handle,

    /// Pointer to Simple Text Input protocol
    pub con_in: *mut EfiSimpleTextInputProtocol,

    /// Handle for console output device
    pub console_out_handle: Handle,

    /// Pointer to Simple Text Output protocol
    pub con_out: *mut EfiSimpleTextOutputProtocol,

    /// Handle for standard error device
    pub standard_error_handle: Handle,

    /// Pointer to Simple Text Output protocol for standard error
    pub std_err: *mut EfiSimpleTextOutputProtocol,

    /// Pointer to Runtime Services table (unused here)
    pub runtime_services: *mut c_void,

    /// Pointer to Boot Services table
    pub boot_services: *mut EfiBootServices,

    /// Number of entries in configuration table
    pub number_of_table_entries: usize,

    /// Pointer to array of configuration tables (unused here)
    pub configuration_table: *mut c_void,
}

impl EfiSystemTable {
    /// System Table signature: "IBI SYST"
    pub const SIGNATURE: u64 = TableHeader::SYSTEM_TABLE_SIGNATURE;

    /// Upper bound when scanning the vendor string for its terminator
    const VENDOR_SCAN_LIMIT: usize = 1024;

    /// Validate the system table
    pub fn validate(&self) -> bool {
        self.hdr.validate(Self::SIGNATURE)
    }

    /// Get the firmware vendor string, without its terminator
    ///
    /// # Safety
    /// The caller must ensure the pointer is valid.
    pub unsafe fn firmware_vendor(&self) -> Option<&[Char16]> {
        if self.firmware_vendor.is_null() {
            return None;
        }

        let mut len = 0;
        while len < Self::VENDOR_SCAN_LIMIT && *self.firmware_vendor.add(len) != 0 {
            len += 1;
        }

        Some(core::slice::from_raw_parts(self.firmware_vendor, len))
    }
}

// Safety: the system table is only accessed from the single boot thread
unsafe impl Send for EfiSystemTable {}
unsafe impl Sync for EfiSystemTable {}

// =============================================================================
// SIMPLE TEXT INPUT PROTOCOL
// =============================================================================

/// Simple Text Input Protocol
#[repr(C)]
pub struct EfiSimpleTextInputProtocol {
    /// Reset the input device
    pub reset: unsafe extern "efiapi" fn(
        this: *mut Self,
        extended_verification: Boolean,
    ) -> Status,

    /// Read a keystroke from the input device
    pub read_key_stroke: unsafe extern "efiapi" fn(
        this: *mut Self,
        key: *mut InputKey,
    ) -> Status,

    /// Event signalled when a keystroke is available
    pub wait_for_key: Event,
}

impl EfiSimpleTextInputProtocol {
    /// Protocol GUID
    pub const GUID: Guid = guids::SIMPLE_TEXT_INPUT_PROTOCOL;
}

impl core::fmt::Debug for EfiSimpleTextInputProtocol {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EfiSimpleTextInputProtocol")
            .field("wait_for_key", &self.wait_for_key)
            .finish()
    }
}

// =============================================================================
// SIMPLE TEXT OUTPUT PROTOCOL
// =============================================================================

/// Simple Text Output Mode
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct SimpleTextOutputMode {
    /// Maximum mode number supported
    pub max_mode: i32,
    /// Current mode number
    pub mode: i32,
    /// Current character attribute
    pub attribute: i32,
    /// Current cursor column
    pub cursor_column: i32,
    /// Current cursor row
    pub cursor_row: i32,
    /// Whether the cursor is visible
    pub cursor_visible: Boolean,
}

/// Simple Text Output Protocol
#[repr(C)]
pub struct EfiSimpleTextOutputProtocol {
    /// Reset the text output device
    pub reset: unsafe extern "efiapi" fn(
        this: *mut Self,
        extended_verification: Boolean,
    ) -> Status,

    /// Write a null-terminated UCS-2 string to the output device
    pub output_string: unsafe extern "efiapi" fn(
        this: *mut Self,
        string: *const Char16,
    ) -> Status,

    /// Test if a string can be output
    pub test_string: unsafe extern "efiapi" fn(
        this: *mut Self,
        string: *const Char16,
    ) -> Status,

    /// Query mode information
    pub query_mode: unsafe extern "efiapi" fn(
        this: *mut Self,
        mode_number: usize,
        columns: *mut usize,
        rows: *mut usize,
    ) -> Status,

    /// Set the output mode
    pub set_mode: unsafe extern "efiapi" fn(
        this: *mut Self,
        mode_number: usize,
    ) -> Status,

    /// Set the text attribute
    pub set_attribute: unsafe extern "efiapi" fn(
        this: *mut Self,
        attribute: usize,
    ) -> Status,

    /// Clear the screen
    pub clear_screen: unsafe extern "efiapi" fn(this: *mut Self) -> Status,

    /// Set cursor position
    pub set_cursor_position: unsafe extern "efiapi" fn(
        this: *mut Self,
        column: usize,
        row: usize,
    ) -> Status,

    /// Enable or disable cursor
    pub enable_cursor: unsafe extern "efiapi" fn(
        this: *mut Self,
        visible: Boolean,
    ) -> Status,

    /// Pointer to mode information
    pub mode: *mut SimpleTextOutputMode,
}

impl EfiSimpleTextOutputProtocol {
    /// Protocol GUID
    pub const GUID: Guid = guids::SIMPLE_TEXT_OUTPUT_PROTOCOL;
}

impl core::fmt::Debug for EfiSimpleTextOutputProtocol {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EfiSimpleTextOutputProtocol")
            .field("mode", &self.mode)
            .finish()
    }
}

#[cfg(target_pointer_width = "64")]
mod layout {
    use super::*;

    const_assert_eq!(offset_of!(EfiSystemTable, firmware_vendor), 24);
    const_assert_eq!(offset_of!(EfiSystemTable, con_in), 48);
    const_assert_eq!(offset_of!(EfiSystemTable, con_out), 64);
    const_assert_eq!(offset_of!(EfiSystemTable, boot_services), 96);
    const_assert_eq!(size_of::<EfiSystemTable>(), 120);
    const_assert_eq!(offset_of!(EfiSimpleTextInputProtocol, wait_for_key), 16);
    const_assert_eq!(offset_of!(EfiSimpleTextOutputProtocol, mode), 72);
}
