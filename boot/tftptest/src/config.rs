//! Probe Configuration
//!
//! The probe takes no runtime configuration. Everything tunable is a
//! constant or a cargo feature resolved here.

use crate::pe::SignatureCheck;
use core::ffi::CStr;

/// Program name shown in the banner
pub const PROGRAM_NAME: &str = "tftptest";

/// Program version shown in the banner
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Download buffer capacity (64 KiB)
pub const DOWNLOAD_BUFFER_SIZE: usize = 65536;

/// Requested TFTP block size
pub const DEFAULT_BLOCK_SIZE: usize = 1024;

/// Capacity of the UCS-2 boot file name, terminator included
pub const BOOTFILE_NAME_MAXLEN: usize = 256;

/// Capacity of the UCS-2 firmware vendor string, terminator included
pub const FIRMWARE_VENDOR_MAXLEN: usize = 128;

/// Bytes shown in buffer dumps
pub const HEX_HEAD_LEN: usize = 8;

/// File the TFTP server must not have
pub const MISSING_FILE_NAME: &CStr = c"foobar.txt";

/// Probe settings
#[derive(Debug, Clone, Copy)]
pub struct ProbeConfig {
    /// TFTP block size requested for both transfers
    pub block_size: usize,
    /// Name used for the transfer expected to fail
    pub missing_file: &'static CStr,
    /// Executable marker check applied to the boot file
    pub signature_check: SignatureCheck,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            missing_file: MISSING_FILE_NAME,
            signature_check: default_signature_check(),
        }
    }
}

/// Signature check selected by cargo features
pub const fn default_signature_check() -> SignatureCheck {
    if cfg!(feature = "strict-signature") {
        SignatureCheck::Strict
    } else {
        SignatureCheck::Lenient
    }
}

/// Maximum serial log level selected by cargo features
pub const fn log_level() -> log::LevelFilter {
    if cfg!(feature = "trace") {
        log::LevelFilter::Trace
    } else if cfg!(feature = "verbose") {
        log::LevelFilter::Debug
    } else if cfg!(feature = "debug_output") {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Off
    }
}
