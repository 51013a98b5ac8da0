//! Operator Console
//!
//! The probe reports to a text console and waits for a key press before it
//! returns. [`Console`] is the seam between the probe and the firmware's
//! Simple Text protocols.

use crate::config::HEX_HEAD_LEN;
use crate::error::{Error, Result};
use crate::raw::types::Status;
use core::fmt;

/// Prompt shown before the final key press
pub const PRESS_ANY_KEY: &str = "\nPress any key...";

/// Text console
pub trait Console {
    /// Write text; `\n` starts a new line
    fn write_str(&mut self, s: &str) -> Result<()>;

    /// Reset the output device
    fn reset(&mut self) -> Result<()>;

    /// Discard pending keystrokes, then block until a key is pressed
    fn wait_for_key(&mut self) -> Result<()>;

    /// Write formatted text
    fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> Result<()> {
        let mut writer = ConsoleWriter { console: self, error: None };
        match fmt::write(&mut writer, args) {
            Ok(()) => Ok(()),
            Err(_) => Err(writer.error.unwrap_or(Error::Device(Status::DEVICE_ERROR))),
        }
    }
}

/// `fmt::Write` adapter that keeps the console's own error
struct ConsoleWriter<'a, C: Console + ?Sized> {
    console: &'a mut C,
    error: Option<Error>,
}

impl<C: Console + ?Sized> fmt::Write for ConsoleWriter<'_, C> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.console.write_str(s).map_err(|e| {
            self.error = Some(e);
            fmt::Error
        })
    }
}

/// Let the operator read the screen before the firmware takes over again
///
/// The key wait happens even when the prompt could not be written.
pub fn pause<C: Console + ?Sized>(console: &mut C) -> Result<()> {
    let prompted = console.write_str(PRESS_ANY_KEY);
    let waited = console.wait_for_key();
    prompted.and(waited).and_then(|()| console.write_str("\n"))
}

/// First bytes of a buffer as space-separated hex
#[derive(Debug, Clone, Copy)]
pub struct HexHead<'a>(pub &'a [u8]);

impl fmt::Display for HexHead<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, b) in self.0.iter().take(HEX_HEAD_LEN).enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::mock::MockConsole;

    #[test]
    fn test_hex_head() {
        let data = [0x4D, 0x5A, 0x90, 0x00, 0x03, 0x00, 0x00, 0x00, 0xFF];
        assert_eq!(format!("{}", HexHead(&data)), "4d 5a 90 00 03 00 00 00");
        assert_eq!(format!("{}", HexHead(&[0xAB])), "ab");
    }

    #[test]
    fn test_pause_waits_once() {
        let mut console = MockConsole::new();
        pause(&mut console).unwrap();
        assert_eq!(console.output(), "\nPress any key...\n");
        assert_eq!(console.key_waits(), 1);
    }

    #[test]
    fn test_pause_waits_when_prompt_fails() {
        let mut console = MockConsole::new();
        console.fail_output(Status::DEVICE_ERROR);
        let result = pause(&mut console);
        assert_eq!(result, Err(Error::Device(Status::DEVICE_ERROR)));
        assert_eq!(console.key_waits(), 1);
    }

    #[test]
    fn test_write_fmt_keeps_device_error() {
        let mut console = MockConsole::new();
        console.fail_output(Status::DEVICE_ERROR);
        let result = write!(console, "{}", 42);
        assert_eq!(result, Err(Error::Device(Status::DEVICE_ERROR)));
    }
}
