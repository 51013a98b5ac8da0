//! Raw UEFI Boot Services
//!
//! Only `HandleProtocol` and `WaitForEvent` are called by this application.
//! The other slots are kept as untyped pointers so the table layout still
//! matches the firmware's.

use super::types::*;
use core::ffi::c_void;
use core::mem::offset_of;
use static_assertions::const_assert_eq;

/// Boot service slot this application never calls
pub type UnusedService = *const c_void;

// =============================================================================
// BOOT SERVICES TABLE
// =============================================================================

/// EFI Boot Services Table
#[repr(C)]
pub struct EfiBootServices {
    /// Table header
    pub hdr: TableHeader,

    // Task priority services
    pub raise_tpl: UnusedService,
    pub restore_tpl: UnusedService,

    // Memory services
    pub allocate_pages: UnusedService,
    pub free_pages: UnusedService,
    pub get_memory_map: UnusedService,
    pub allocate_pool: UnusedService,
    pub free_pool: UnusedService,

    // Event & timer services
    pub create_event: UnusedService,
    pub set_timer: UnusedService,

    /// Block until one of the given events is signalled
    pub wait_for_event: unsafe extern "efiapi" fn(
        number_of_events: usize,
        event: *const Event,
        index: *mut usize,
    ) -> Status,

    pub signal_event: UnusedService,
    pub close_event: UnusedService,
    pub check_event: UnusedService,

    // Protocol handler services
    pub install_protocol_interface: UnusedService,
    pub reinstall_protocol_interface: UnusedService,
    pub uninstall_protocol_interface: UnusedService,

    /// Query a handle for a protocol interface
    pub handle_protocol: unsafe extern "efiapi" fn(
        handle: Handle,
        protocol: *const Guid,
        interface: *mut *mut c_void,
    ) -> Status,

    pub reserved: *mut c_void,
    pub register_protocol_notify: UnusedService,
    pub locate_handle: UnusedService,
    pub locate_device_path: UnusedService,
    pub install_configuration_table: UnusedService,

    // Image services
    pub load_image: UnusedService,
    pub start_image: UnusedService,
    pub exit: UnusedService,
    pub unload_image: UnusedService,
    pub exit_boot_services: UnusedService,

    // Miscellaneous services
    pub get_next_monotonic_count: UnusedService,
    pub stall: UnusedService,
    pub set_watchdog_timer: UnusedService,

    // Driver support services
    pub connect_controller: UnusedService,
    pub disconnect_controller: UnusedService,

    // Open and close protocol services
    pub open_protocol: UnusedService,
    pub close_protocol: UnusedService,
    pub open_protocol_information: UnusedService,

    // Library services
    pub protocols_per_handle: UnusedService,
    pub locate_handle_buffer: UnusedService,
    pub locate_protocol: UnusedService,
    pub install_multiple_protocol_interfaces: UnusedService,
    pub uninstall_multiple_protocol_interfaces: UnusedService,

    // CRC and memory utility services
    pub calculate_crc32: UnusedService,
    pub copy_mem: UnusedService,
    pub set_mem: UnusedService,
    pub create_event_ex: UnusedService,
}

impl EfiBootServices {
    /// Boot Services signature: "BOOTSERV"
    pub const SIGNATURE: u64 = TableHeader::BOOT_SERVICES_SIGNATURE;

    /// Validate the boot services table
    pub fn validate(&self) -> bool {
        self.hdr.validate(Self::SIGNATURE)
    }

    /// Look up a protocol interface on a handle
    ///
    /// # Safety
    /// Boot services must still be active and `T` must be the raw layout of
    /// the protocol named by `guid`.
    pub unsafe fn handle_protocol<T>(
        &self,
        handle: Handle,
        guid: &Guid,
    ) -> Result<*mut T, Status> {
        let mut interface: *mut c_void = core::ptr::null_mut();
        let status = (self.handle_protocol)(handle, guid, &mut interface);
        status.to_status_result_with(interface.cast::<T>())
    }

    /// Block until `event` is signalled
    ///
    /// # Safety
    /// Boot services must still be active and `event` must be a valid event.
    pub unsafe fn wait_for_single_event(&self, event: Event) -> Result<(), Status> {
        let mut index = 0usize;
        (self.wait_for_event)(1, &event, &mut index).to_status_result()
    }
}

impl core::fmt::Debug for EfiBootServices {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EfiBootServices")
            .field("hdr", &self.hdr)
            .finish_non_exhaustive()
    }
}

#[cfg(target_pointer_width = "64")]
mod layout {
    use super::*;

    const_assert_eq!(offset_of!(EfiBootServices, wait_for_event), 24 + 9 * 8);
    const_assert_eq!(offset_of!(EfiBootServices, handle_protocol), 24 + 16 * 8);
    const_assert_eq!(offset_of!(EfiBootServices, create_event_ex), 24 + 43 * 8);
}
