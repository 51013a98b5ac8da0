//! Boot Services Wrapper
//!
//! Safe wrappers for the two Boot Services the probe calls.

use crate::raw::boot_services::EfiBootServices;
use crate::raw::types::*;
use core::ptr::NonNull;

// =============================================================================
// BOOT SERVICES
// =============================================================================

/// Boot services wrapper
#[derive(Debug, Clone, Copy)]
pub struct BootServices {
    inner: NonNull<EfiBootServices>,
}

impl BootServices {
    /// Create from raw pointer
    ///
    /// # Safety
    /// Pointer must be valid and boot services must be available for the
    /// lifetime of the wrapper.
    pub unsafe fn from_ptr(ptr: *mut EfiBootServices) -> Option<Self> {
        NonNull::new(ptr).map(|inner| Self { inner })
    }

    /// Get boot services reference
    fn bs(&self) -> &EfiBootServices {
        unsafe { self.inner.as_ref() }
    }

    /// Check the table signature
    pub fn validate(&self) -> bool {
        self.bs().validate()
    }
}

// =============================================================================
// PROTOCOL SERVICES
// =============================================================================

impl BootServices {
    /// Query `handle` for the protocol named by `guid`
    ///
    /// A null interface reported with `EFI_SUCCESS` is treated as
    /// `EFI_UNSUPPORTED`.
    ///
    /// # Safety
    /// `T` must be the raw layout of the protocol named by `guid`.
    pub unsafe fn handle_protocol<T>(&self, handle: Handle, guid: &Guid) -> Result<NonNull<T>, Status> {
        let interface = unsafe { self.bs().handle_protocol::<T>(handle, guid)? };
        NonNull::new(interface).ok_or(Status::UNSUPPORTED)
    }
}

// =============================================================================
// EVENT SERVICES
// =============================================================================

impl BootServices {
    /// Block until `event` is signalled
    pub fn wait_for_event(&self, event: Event) -> Result<(), Status> {
        if event.is_null() {
            return Err(Status::INVALID_PARAMETER);
        }
        unsafe { self.bs().wait_for_single_event(event) }
    }
}
