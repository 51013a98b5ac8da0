//! # PXE TFTP Read Probe
//!
//! Checks a UEFI firmware's `EFI_PXE_BASE_CODE_PROTOCOL.Mtftp` with
//! `TFTP_READ_FILE`. Booted over PXE, the application downloads its own
//! boot file (which must succeed and carry an "MZ" marker) and then a file
//! the server does not have (which must fail with `EFI_TFTP_ERROR`).
//!
//! ## Architecture
//!
//! - **raw**: `#[repr(C)]` mirrors of the firmware tables and protocols
//! - **services**: safe Boot Services wrapper
//! - **protocols**: console and PXE Base Code wrappers
//! - **probe**: the two-transfer check, written against the [`Console`],
//!   [`NetworkBoot`] and [`BootPlatform`] traits so it runs under test
//!   without firmware
//!
//! Firmware handles live in a [`UefiEnv`] passed to whoever needs them;
//! there is no global system table.
//!
//! ## Features
//!
//! - `debug_output` - Info-level log on COM1 (default)
//! - `verbose` - Debug-level log
//! - `trace` - Trace-level log
//! - `strict-signature` - require the full "MZ" marker

#![cfg_attr(not(test), no_std)]
#![allow(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

use core::ptr::NonNull;

// =============================================================================
// MODULES
// =============================================================================

/// Raw UEFI bindings
pub mod raw;

/// Safe service wrappers
pub mod services;

/// Protocol wrappers
pub mod protocols;

pub mod config;
pub mod console;
pub mod debug;
pub mod error;
pub mod network;
pub mod pe;
pub mod probe;
pub mod string;

pub use console::Console;
pub use error::{Error, Result};
pub use network::NetworkBoot;
pub use probe::{BootFileProbe, BootPlatform, FirmwareInfo};

use crate::error::ProtocolKind;
use crate::protocols::{EfiConsole, PxeBaseCode};
use crate::raw::protocols::{EfiLoadedImageProtocol, PxeBaseCodeProtocol};
use crate::raw::system_table::EfiSystemTable;
use crate::raw::types::{Handle, Status};
use crate::services::BootServices;
use crate::string::String16;

// =============================================================================
// ENVIRONMENT
// =============================================================================

/// Validated firmware environment handed to the application on entry
#[derive(Debug)]
pub struct UefiEnv {
    image: Handle,
    system_table: NonNull<EfiSystemTable>,
    boot_services: BootServices,
}

impl UefiEnv {
    /// Check the entry-point arguments
    ///
    /// # Safety
    /// `system_table` must be the pointer the firmware passed to the entry
    /// point, and boot services must not have been exited.
    pub unsafe fn init(image: Handle, system_table: *mut EfiSystemTable) -> Result<Self> {
        let system_table = NonNull::new(system_table).ok_or(Error::InvalidSystemTable)?;
        let st = system_table.as_ref();
        if !st.validate() {
            return Err(Error::InvalidSystemTable);
        }

        let boot_services =
            BootServices::from_ptr(st.boot_services).ok_or(Error::BootServicesUnavailable)?;
        if !boot_services.validate() {
            return Err(Error::BootServicesUnavailable);
        }

        let (major, minor) = st.hdr.version();
        log::debug!("UEFI {}.{}, image {:?}", major, minor, image);

        Ok(Self {
            image,
            system_table,
            boot_services,
        })
    }

    fn system_table(&self) -> &EfiSystemTable {
        unsafe { self.system_table.as_ref() }
    }

    /// Firmware text console
    pub fn console(&self) -> Result<EfiConsole> {
        let st = self.system_table();
        unsafe { EfiConsole::new(st.con_in, st.con_out, self.boot_services) }
            .ok_or(Error::ConsoleUnavailable)
    }
}

impl BootPlatform for UefiEnv {
    type Network = PxeBaseCode;

    fn firmware(&self) -> FirmwareInfo {
        let st = self.system_table();
        let vendor = unsafe { st.firmware_vendor() }
            .map(String16::from_ucs2)
            .unwrap_or_default();
        FirmwareInfo {
            vendor,
            revision: st.firmware_revision,
        }
    }

    fn network_boot(&self) -> Result<PxeBaseCode> {
        let loaded_image = unsafe {
            self.boot_services
                .handle_protocol::<EfiLoadedImageProtocol>(self.image, &EfiLoadedImageProtocol::GUID)
        }
        .map_err(|status| Error::CapabilityLookup {
            protocol: ProtocolKind::LoadedImage,
            status,
        })?;

        let pxe_lookup_failed = |status| Error::CapabilityLookup {
            protocol: ProtocolKind::PxeBaseCode,
            status,
        };

        // A null device handle is what HandleProtocol itself would reject.
        let device = unsafe { loaded_image.as_ref() }
            .device()
            .ok_or_else(|| pxe_lookup_failed(Status::INVALID_PARAMETER))?;

        let pxe = unsafe {
            self.boot_services
                .handle_protocol::<PxeBaseCodeProtocol>(device, &PxeBaseCodeProtocol::GUID)
        }
        .map_err(pxe_lookup_failed)?;

        log::debug!("PXE Base Code on {:?}", device);
        Ok(unsafe { PxeBaseCode::from_ptr(pxe) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_system_table_rejected() {
        let result = unsafe { UefiEnv::init(Handle::NULL, core::ptr::null_mut()) };
        assert_eq!(result.err(), Some(Error::InvalidSystemTable));
    }
}
