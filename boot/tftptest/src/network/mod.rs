//! Network Boot Types
//!
//! DHCP-negotiated parameters and the TFTP transfer contract of the
//! firmware's network-boot capability. The capability itself is the
//! [`NetworkBoot`] trait: the PXE Base Code protocol implements it on real
//! firmware, tests substitute a mock.

use crate::error::Result;
use crate::raw::protocols::pxe::BOOTP_BOOT_FILE_LEN;
use crate::raw::types::Status;
use core::ffi::CStr;
use core::fmt;

// =============================================================================
// ADDRESSES
// =============================================================================

/// MAC address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    /// Take the Ethernet address from a BOOTP `chaddr` field
    pub fn from_hw_addr(hw_addr: &[u8; 16]) -> Self {
        let mut mac = [0u8; 6];
        mac.copy_from_slice(&hw_addr[..6]);
        Self(mac)
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            self.0[0], self.0[1], self.0[2],
            self.0[3], self.0[4], self.0[5]
        )
    }
}

/// IPv4 address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Ipv4Address(pub [u8; 4]);

impl Ipv4Address {
    /// Create from parts
    pub const fn new(a: u8, b: u8, c: u8, d: u8) -> Self {
        Self([a, b, c, d])
    }
}

impl fmt::Display for Ipv4Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}.{}", self.0[0], self.0[1], self.0[2], self.0[3])
    }
}

// =============================================================================
// DHCP RECORD
// =============================================================================

/// Boot file name from the BOOTP `file` field
///
/// Always NUL-terminated, even when the server filled all 128 bytes.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct BootFile {
    raw: [u8; BOOTP_BOOT_FILE_LEN + 1],
}

impl BootFile {
    /// Copy a BOOTP `file` field (or any name) up to its first NUL
    pub fn from_bootp(field: &[u8]) -> Self {
        let mut raw = [0u8; BOOTP_BOOT_FILE_LEN + 1];
        let len = field
            .iter()
            .take(BOOTP_BOOT_FILE_LEN)
            .position(|&b| b == 0)
            .unwrap_or_else(|| field.len().min(BOOTP_BOOT_FILE_LEN));
        raw[..len].copy_from_slice(&field[..len]);
        Self { raw }
    }

    /// Name bytes, without terminator
    pub fn as_bytes(&self) -> &[u8] {
        self.as_cstr().to_bytes()
    }

    /// NUL-terminated view for the firmware
    pub fn as_cstr(&self) -> &CStr {
        CStr::from_bytes_until_nul(&self.raw).unwrap_or_default()
    }

    /// Check if the server sent no name
    pub fn is_empty(&self) -> bool {
        self.raw[0] == 0
    }
}

impl fmt::Debug for BootFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BootFile({:?})", self.as_cstr())
    }
}

/// DHCP-negotiated boot parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DhcpRecord {
    /// Client hardware address (from the DHCP discover packet)
    pub client_mac: MacAddress,
    /// Station IP assigned to the client
    pub station_ip: Ipv4Address,
    /// Subnet mask assigned to the client
    pub subnet_mask: Ipv4Address,
    /// TFTP server (BOOTP `siaddr` of the DHCP ACK)
    pub server_ip: Ipv4Address,
    /// Boot file name (BOOTP `file` of the DHCP ACK)
    pub boot_file: BootFile,
}

/// Last error a TFTP server sent to the firmware's client
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TftpErrorInfo {
    /// TFTP error code (1 = file not found, ...)
    pub code: u8,
    message: [u8; 128],
}

impl TftpErrorInfo {
    /// Build from the code and the (possibly unterminated) message bytes
    pub fn new(code: u8, message: &[u8]) -> Self {
        let mut raw = [0u8; 128];
        let len = message
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(message.len())
            .min(raw.len() - 1);
        raw[..len].copy_from_slice(&message[..len]);
        Self { code, message: raw }
    }

    /// Error message, without terminator
    pub fn message(&self) -> &[u8] {
        CStr::from_bytes_until_nul(&self.message)
            .map(CStr::to_bytes)
            .unwrap_or_default()
    }
}

impl fmt::Debug for TftpErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TftpErrorInfo")
            .field("code", &self.code)
            .field("message", &format_args!("{}", self))
            .finish()
    }
}

impl fmt::Display for TftpErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in self.message() {
            let c = if b.is_ascii_graphic() || b == b' ' { char::from(b) } else { '?' };
            fmt::Write::write_char(f, c)?;
        }
        Ok(())
    }
}

// =============================================================================
// TRANSFERS
// =============================================================================

/// Parameters of one TFTP read
#[derive(Debug, Clone, Copy)]
pub struct ReadFileRequest<'a> {
    /// Server to read from
    pub server: Ipv4Address,
    /// Remote file name
    pub filename: &'a CStr,
    /// Requested TFTP block size
    pub block_size: usize,
    /// Allow the firmware to overwrite an existing file
    pub overwrite: bool,
}

/// Result class of one transfer attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    /// The file was received
    Success {
        /// Bytes the firmware reported as received
        received: u64,
    },
    /// The server refused the file (`EFI_TFTP_ERROR`)
    NotFound,
    /// Any other firmware status
    OtherError(Status),
}

impl TransferOutcome {
    /// Classify a firmware status returned by a read
    pub fn from_status(status: Status, received: u64) -> Self {
        match status {
            Status::SUCCESS => Self::Success { received },
            Status::TFTP_ERROR => Self::NotFound,
            other => Self::OtherError(other),
        }
    }

    /// Firmware status this outcome stands for
    pub fn status(self) -> Status {
        match self {
            Self::Success { .. } => Status::SUCCESS,
            Self::NotFound => Status::TFTP_ERROR,
            Self::OtherError(status) => status,
        }
    }
}

/// Firmware network-boot capability
pub trait NetworkBoot {
    /// DHCP parameters negotiated during the PXE boot
    ///
    /// Fails with `InvalidState` when no DHCP discover record exists.
    fn dhcp_record(&self) -> Result<DhcpRecord>;

    /// Read a file over TFTP into `buffer`
    ///
    /// `buffer_size` is in/out: the caller passes the capacity and the
    /// firmware stores the number of bytes received.
    fn read_file(
        &mut self,
        request: &ReadFileRequest<'_>,
        buffer: &mut [u8],
        buffer_size: &mut u64,
    ) -> Status;

    /// Error sent by the TFTP server during the last transfer, if any
    fn tftp_error(&self) -> Option<TftpErrorInfo>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_formats() {
        let mac = MacAddress([0x52, 0x54, 0x00, 0x12, 0x34, 0xab]);
        assert_eq!(format!("{}", mac), "52:54:00:12:34:ab");
        assert_eq!(format!("{}", Ipv4Address::new(10, 0, 2, 15)), "10.0.2.15");
    }

    #[test]
    fn test_mac_from_hw_addr() {
        let mut chaddr = [0xEEu8; 16];
        chaddr[..6].copy_from_slice(&[1, 2, 3, 4, 5, 6]);
        assert_eq!(MacAddress::from_hw_addr(&chaddr), MacAddress([1, 2, 3, 4, 5, 6]));
    }

    #[test]
    fn test_boot_file_from_bootp() {
        let mut field = [0u8; BOOTP_BOOT_FILE_LEN];
        field[..12].copy_from_slice(b"tftptest.efi");
        let file = BootFile::from_bootp(&field);
        assert_eq!(file.as_bytes(), b"tftptest.efi");
        assert_eq!(file.as_cstr().to_bytes_with_nul().len(), 13);
    }

    #[test]
    fn test_boot_file_full_field_is_terminated() {
        let field = [b'x'; BOOTP_BOOT_FILE_LEN];
        let file = BootFile::from_bootp(&field);
        assert_eq!(file.as_bytes().len(), BOOTP_BOOT_FILE_LEN);
        assert!(!file.is_empty());
        assert!(BootFile::from_bootp(&[0u8; 4]).is_empty());
    }

    #[test]
    fn test_transfer_outcome_classification() {
        assert_eq!(
            TransferOutcome::from_status(Status::SUCCESS, 42),
            TransferOutcome::Success { received: 42 }
        );
        assert_eq!(TransferOutcome::from_status(Status::TFTP_ERROR, 0), TransferOutcome::NotFound);
        assert_eq!(
            TransferOutcome::from_status(Status::TIMEOUT, 0),
            TransferOutcome::OtherError(Status::TIMEOUT)
        );
        assert_eq!(TransferOutcome::NotFound.status(), Status::TFTP_ERROR);
    }

    #[test]
    fn test_tftp_error_message() {
        let info = TftpErrorInfo::new(1, b"File not found\0junk");
        assert_eq!(info.code, 1);
        assert_eq!(info.message(), b"File not found");
        assert_eq!(format!("{}", info), "File not found");
    }
}
