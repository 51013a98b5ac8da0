//! Console Protocol
//!
//! Firmware text console built on Simple Text Input/Output.

use crate::console::Console;
use crate::error::{Error, Result};
use crate::raw::system_table::{EfiSimpleTextInputProtocol, EfiSimpleTextOutputProtocol};
use crate::raw::types::*;
use crate::services::BootServices;
use crate::string::encode_console_chunks;
use core::fmt;
use core::ptr::NonNull;

/// UCS-2 units written per `OutputString` call, terminator included
const OUTPUT_CHUNK: usize = 128;

// =============================================================================
// CONSOLE
// =============================================================================

/// Firmware console (ConIn + ConOut of the system table)
#[derive(Debug)]
pub struct EfiConsole {
    con_in: NonNull<EfiSimpleTextInputProtocol>,
    con_out: NonNull<EfiSimpleTextOutputProtocol>,
    boot_services: BootServices,
}

impl EfiConsole {
    /// Create from the system table's console pointers
    ///
    /// # Safety
    /// Both pointers must stay valid while boot services are active.
    pub unsafe fn new(
        con_in: *mut EfiSimpleTextInputProtocol,
        con_out: *mut EfiSimpleTextOutputProtocol,
        boot_services: BootServices,
    ) -> Option<Self> {
        Some(Self {
            con_in: NonNull::new(con_in)?,
            con_out: NonNull::new(con_out)?,
            boot_services,
        })
    }

    /// One `ReadKeyStroke` call
    fn read_key(&mut self) -> Status {
        let con_in = self.con_in.as_ptr();
        let mut key = InputKey::default();
        unsafe { ((*con_in).read_key_stroke)(con_in, &mut key) }
    }

    /// Spin on `ReadKeyStroke` until it stops reporting `EFI_NOT_READY`
    fn poll_key(&mut self) -> Result<()> {
        loop {
            let status = self.read_key();
            if status != Status::NOT_READY {
                return status.to_status_result().map_err(Error::Device);
            }
            core::hint::spin_loop();
        }
    }
}

impl Console for EfiConsole {
    fn write_str(&mut self, s: &str) -> Result<()> {
        let con_out = self.con_out.as_ptr();
        let mut chunk = [0u16; OUTPUT_CHUNK];
        let mut failure = Status::SUCCESS;

        let written = encode_console_chunks(s, &mut chunk, |units| {
            let status = unsafe { ((*con_out).output_string)(con_out, units.as_ptr()) };
            // Warnings such as EFI_WARN_UNKNOWN_GLYPH still print the rest.
            if status.is_error() {
                failure = status;
                return Err(fmt::Error);
            }
            Ok(())
        });

        written.map_err(|_| Error::Device(failure))
    }

    fn reset(&mut self) -> Result<()> {
        let con_out = self.con_out.as_ptr();
        let status = unsafe { ((*con_out).reset)(con_out, FALSE) };
        status.to_status_result().map_err(Error::Device)
    }

    fn wait_for_key(&mut self) -> Result<()> {
        // Drop keys pressed while the probe was running.
        while self.read_key() == Status::SUCCESS {}

        let event = unsafe { self.con_in.as_ref().wait_for_key };
        match self.boot_services.wait_for_event(event) {
            Ok(()) => match self.read_key() {
                Status::NOT_READY => self.poll_key(),
                status => status.to_status_result().map_err(Error::Device),
            },
            Err(status) => {
                log::debug!("WaitForEvent(WaitForKey) failed: {}, polling", status);
                self.poll_key()
            }
        }
    }
}
