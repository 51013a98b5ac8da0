//! Serial Logging
//!
//! Diagnostic trace over the COM1 UART, behind the `log` facade. The
//! operator report goes to the firmware console; this is the parallel
//! machine-readable record.

use core::fmt;
use spin::Mutex;

// =============================================================================
// SERIAL PORT
// =============================================================================

/// Serial port I/O ports
pub mod serial_port {
    pub const COM1: u16 = 0x3F8;
}

/// Serial port registers
pub mod serial_reg {
    pub const DATA: u16 = 0;
    pub const INTR_ENABLE: u16 = 1;
    pub const FIFO_CTRL: u16 = 2;
    pub const LINE_CTRL: u16 = 3;
    pub const MODEM_CTRL: u16 = 4;
    pub const LINE_STATUS: u16 = 5;

    // With DLAB set
    pub const DIVISOR_LOW: u16 = 0;
    pub const DIVISOR_HIGH: u16 = 1;
}

/// Line status bits
pub mod line_status {
    pub const THRE: u8 = 0x20; // Transmit holding register empty
}

/// Divisor for 115200 baud
pub const BAUD_115200_DIVISOR: u16 = 1;

/// 16550 UART writer
#[derive(Debug)]
pub struct SerialPort {
    port: u16,
    initialized: bool,
}

impl SerialPort {
    /// Create new serial port
    pub const fn new(port: u16) -> Self {
        Self {
            port,
            initialized: false,
        }
    }

    /// Create COM1 serial port
    pub const fn com1() -> Self {
        Self::new(serial_port::COM1)
    }

    /// Check whether the UART passed its loopback test
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Program the UART; a port failing loopback stays disabled
    #[cfg(all(target_arch = "x86_64", not(test)))]
    pub fn init(&mut self) {
        unsafe {
            self.write_reg(serial_reg::INTR_ENABLE, 0x00);

            // DLAB on, divisor, then 8N1
            self.write_reg(serial_reg::LINE_CTRL, 0x80);
            let divisor = BAUD_115200_DIVISOR;
            self.write_reg(serial_reg::DIVISOR_LOW, (divisor & 0xFF) as u8);
            self.write_reg(serial_reg::DIVISOR_HIGH, (divisor >> 8) as u8);
            self.write_reg(serial_reg::LINE_CTRL, 0x03);

            self.write_reg(serial_reg::FIFO_CTRL, 0xC7);

            // Loopback test
            self.write_reg(serial_reg::MODEM_CTRL, 0x1E);
            self.write_reg(serial_reg::DATA, 0xAE);
            if self.read_reg(serial_reg::DATA) != 0xAE {
                return;
            }

            self.write_reg(serial_reg::MODEM_CTRL, 0x0F);
            self.initialized = true;
        }
    }

    #[cfg(not(all(target_arch = "x86_64", not(test))))]
    pub fn init(&mut self) {
        // No port I/O here
    }

    #[cfg(all(target_arch = "x86_64", not(test)))]
    unsafe fn write_reg(&self, reg: u16, value: u8) {
        unsafe {
            core::arch::asm!(
                "out dx, al",
                in("dx") self.port + reg,
                in("al") value,
                options(nomem, nostack, preserves_flags)
            );
        }
    }

    #[cfg(all(target_arch = "x86_64", not(test)))]
    unsafe fn read_reg(&self, reg: u16) -> u8 {
        let value: u8;
        unsafe {
            core::arch::asm!(
                "in al, dx",
                in("dx") self.port + reg,
                out("al") value,
                options(nomem, nostack, preserves_flags)
            );
        }
        value
    }

    /// Write byte
    #[cfg(all(target_arch = "x86_64", not(test)))]
    pub fn write_byte(&mut self, byte: u8) {
        if !self.initialized {
            return;
        }

        while unsafe { self.read_reg(serial_reg::LINE_STATUS) } & line_status::THRE == 0 {
            core::hint::spin_loop();
        }

        unsafe {
            self.write_reg(serial_reg::DATA, byte);
        }
    }

    #[cfg(not(all(target_arch = "x86_64", not(test))))]
    pub fn write_byte(&mut self, _byte: u8) {}
}

impl fmt::Write for SerialPort {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.bytes() {
            if byte == b'\n' {
                self.write_byte(b'\r');
            }
            self.write_byte(byte);
        }
        Ok(())
    }
}

// =============================================================================
// LOGGER
// =============================================================================

/// `log` sink writing one line per record to a serial port
#[derive(Debug)]
pub struct SerialLogger {
    port: Mutex<SerialPort>,
}

impl SerialLogger {
    /// Create a logger on an uninitialized port
    pub const fn new(port: SerialPort) -> Self {
        Self { port: Mutex::new(port) }
    }

    /// Write one line unless the port is held; returns whether it was written
    pub fn try_write(&self, args: fmt::Arguments<'_>) -> bool {
        match self.port.try_lock() {
            Some(mut port) => fmt::Write::write_fmt(&mut *port, format_args!("{}\n", args)).is_ok(),
            None => false,
        }
    }
}

impl log::Log for SerialLogger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut port = self.port.lock();
        let _ = fmt::Write::write_fmt(
            &mut *port,
            format_args!("[{:5}] {}: {}\n", record.level(), record.target(), record.args()),
        );
    }

    fn flush(&self) {}
}

static LOGGER: SerialLogger = SerialLogger::new(SerialPort::com1());

/// Bring up COM1 and install the serial logger
///
/// Calling it again only changes the level.
pub fn init(level: log::LevelFilter) {
    if level != log::LevelFilter::Off {
        let mut port = LOGGER.port.lock();
        if !port.is_initialized() {
            port.init();
        }
    }
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(level);
}

/// Report from the panic handler
///
/// A panic inside a log call leaves the port locked; the line is dropped
/// then instead of spinning on the lock.
pub fn panic_log(args: fmt::Arguments<'_>) {
    if log::max_level() != log::LevelFilter::Off {
        let _ = LOGGER.try_write(args);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_port_stays_disabled() {
        let mut port = SerialPort::com1();
        port.init();
        assert!(!port.is_initialized());
        assert!(fmt::Write::write_str(&mut port, "ignored\n").is_ok());
    }

    #[test]
    fn test_try_write_skips_held_port() {
        let logger = SerialLogger::new(SerialPort::com1());
        assert!(logger.try_write(format_args!("free")));

        let held = logger.port.lock();
        assert!(!logger.try_write(format_args!("busy")));
        drop(held);
        assert!(logger.try_write(format_args!("free again")));
    }
}
