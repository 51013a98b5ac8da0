//! Raw UEFI type definitions
//!
//! Fundamental types used by the firmware interfaces this application
//! touches. All of them are binary-compatible with the UEFI ABI.

use core::fmt;
use core::mem::{align_of, size_of};
use static_assertions::const_assert_eq;

// =============================================================================
// BASIC TYPES
// =============================================================================

/// UEFI BOOLEAN (1 byte, 0 or 1)
///
/// Kept as `u8` rather than `bool`: firmware-owned memory is read through
/// these types and may hold any byte value.
pub type Boolean = u8;

/// UEFI CHAR8 type (ASCII character)
pub type Char8 = u8;

/// UEFI CHAR16 type (UCS-2 character)
pub type Char16 = u16;

/// `TRUE` as a UEFI BOOLEAN
pub const TRUE: Boolean = 1;

/// `FALSE` as a UEFI BOOLEAN
pub const FALSE: Boolean = 0;

/// Interpret a firmware BOOLEAN
#[inline]
pub const fn is_true(value: Boolean) -> bool {
    value != FALSE
}

// =============================================================================
// HANDLE
// =============================================================================

/// UEFI Handle - opaque pointer to a set of protocol instances
#[derive(Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct Handle(pub *mut core::ffi::c_void);

impl Handle {
    /// Null handle
    pub const NULL: Self = Self(core::ptr::null_mut());

    /// Create a new handle from a raw pointer
    pub const fn new(ptr: *mut core::ffi::c_void) -> Self {
        Self(ptr)
    }

    /// Check if this is a null handle
    pub fn is_null(self) -> bool {
        self.0.is_null()
    }

    /// Get the raw pointer
    pub const fn as_ptr(self) -> *mut core::ffi::c_void {
        self.0
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({:p})", self.0)
    }
}

impl Default for Handle {
    fn default() -> Self {
        Self::NULL
    }
}

/// UEFI Event - opaque pointer
#[derive(Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct Event(pub *mut core::ffi::c_void);

impl Event {
    /// Null event
    pub const NULL: Self = Self(core::ptr::null_mut());

    /// Check if this is a null event
    pub fn is_null(self) -> bool {
        self.0.is_null()
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Event({:p})", self.0)
    }
}

// =============================================================================
// STATUS
// =============================================================================

/// UEFI Status code
///
/// The high bit marks an error; non-zero codes without it are warnings.
#[derive(Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct Status(pub u64);

impl Status {
    const ERROR_BIT: u64 = 1u64 << 63;

    /// Success
    pub const SUCCESS: Self = Self(0);

    // Warnings
    pub const WARN_UNKNOWN_GLYPH: Self = Self(1);
    pub const WARN_DELETE_FAILURE: Self = Self(2);
    pub const WARN_WRITE_FAILURE: Self = Self(3);
    pub const WARN_BUFFER_TOO_SMALL: Self = Self(4);

    // Errors
    pub const LOAD_ERROR: Self = Self(Self::ERROR_BIT | 1);
    pub const INVALID_PARAMETER: Self = Self(Self::ERROR_BIT | 2);
    pub const UNSUPPORTED: Self = Self(Self::ERROR_BIT | 3);
    pub const BAD_BUFFER_SIZE: Self = Self(Self::ERROR_BIT | 4);
    pub const BUFFER_TOO_SMALL: Self = Self(Self::ERROR_BIT | 5);
    pub const NOT_READY: Self = Self(Self::ERROR_BIT | 6);
    pub const DEVICE_ERROR: Self = Self(Self::ERROR_BIT | 7);
    pub const WRITE_PROTECTED: Self = Self(Self::ERROR_BIT | 8);
    pub const OUT_OF_RESOURCES: Self = Self(Self::ERROR_BIT | 9);
    pub const NOT_FOUND: Self = Self(Self::ERROR_BIT | 14);
    pub const ACCESS_DENIED: Self = Self(Self::ERROR_BIT | 15);
    pub const NO_RESPONSE: Self = Self(Self::ERROR_BIT | 16);
    pub const NO_MAPPING: Self = Self(Self::ERROR_BIT | 17);
    pub const TIMEOUT: Self = Self(Self::ERROR_BIT | 18);
    pub const NOT_STARTED: Self = Self(Self::ERROR_BIT | 19);
    pub const ALREADY_STARTED: Self = Self(Self::ERROR_BIT | 20);
    pub const ABORTED: Self = Self(Self::ERROR_BIT | 21);
    pub const ICMP_ERROR: Self = Self(Self::ERROR_BIT | 22);
    pub const TFTP_ERROR: Self = Self(Self::ERROR_BIT | 23);
    pub const PROTOCOL_ERROR: Self = Self(Self::ERROR_BIT | 24);
    pub const INCOMPATIBLE_VERSION: Self = Self(Self::ERROR_BIT | 25);
    pub const SECURITY_VIOLATION: Self = Self(Self::ERROR_BIT | 26);
    pub const CRC_ERROR: Self = Self(Self::ERROR_BIT | 27);
    pub const END_OF_MEDIA: Self = Self(Self::ERROR_BIT | 28);
    pub const END_OF_FILE: Self = Self(Self::ERROR_BIT | 31);
    pub const IP_ADDRESS_CONFLICT: Self = Self(Self::ERROR_BIT | 34);
    pub const HTTP_ERROR: Self = Self(Self::ERROR_BIT | 35);

    /// Check if this is a success status
    pub const fn is_success(self) -> bool {
        self.0 == 0
    }

    /// Check if this is an error status
    pub const fn is_error(self) -> bool {
        (self.0 & Self::ERROR_BIT) != 0
    }

    /// Check if this is a warning status
    pub const fn is_warning(self) -> bool {
        !self.is_success() && !self.is_error()
    }

    /// Get the status code without the error bit
    pub const fn code(self) -> u64 {
        self.0 & !Self::ERROR_BIT
    }

    /// Convert to Result with Status as error type
    pub fn to_status_result(self) -> Result<(), Self> {
        self.to_status_result_with(())
    }

    /// Convert to Result with a value on success, Status as error type
    pub fn to_status_result_with<T>(self, value: T) -> Result<T, Self> {
        if self.is_success() {
            Ok(value)
        } else {
            Err(self)
        }
    }

    /// Firmware name of the status (`EFI_TFTP_ERROR`, ...)
    pub fn name(self) -> Option<&'static str> {
        let name = match self {
            Self::SUCCESS => "EFI_SUCCESS",
            Self::WARN_UNKNOWN_GLYPH => "EFI_WARN_UNKNOWN_GLYPH",
            Self::WARN_DELETE_FAILURE => "EFI_WARN_DELETE_FAILURE",
            Self::WARN_WRITE_FAILURE => "EFI_WARN_WRITE_FAILURE",
            Self::WARN_BUFFER_TOO_SMALL => "EFI_WARN_BUFFER_TOO_SMALL",
            Self::LOAD_ERROR => "EFI_LOAD_ERROR",
            Self::INVALID_PARAMETER => "EFI_INVALID_PARAMETER",
            Self::UNSUPPORTED => "EFI_UNSUPPORTED",
            Self::BAD_BUFFER_SIZE => "EFI_BAD_BUFFER_SIZE",
            Self::BUFFER_TOO_SMALL => "EFI_BUFFER_TOO_SMALL",
            Self::NOT_READY => "EFI_NOT_READY",
            Self::DEVICE_ERROR => "EFI_DEVICE_ERROR",
            Self::WRITE_PROTECTED => "EFI_WRITE_PROTECTED",
            Self::OUT_OF_RESOURCES => "EFI_OUT_OF_RESOURCES",
            Self::NOT_FOUND => "EFI_NOT_FOUND",
            Self::ACCESS_DENIED => "EFI_ACCESS_DENIED",
            Self::NO_RESPONSE => "EFI_NO_RESPONSE",
            Self::NO_MAPPING => "EFI_NO_MAPPING",
            Self::TIMEOUT => "EFI_TIMEOUT",
            Self::NOT_STARTED => "EFI_NOT_STARTED",
            Self::ALREADY_STARTED => "EFI_ALREADY_STARTED",
            Self::ABORTED => "EFI_ABORTED",
            Self::ICMP_ERROR => "EFI_ICMP_ERROR",
            Self::TFTP_ERROR => "EFI_TFTP_ERROR",
            Self::PROTOCOL_ERROR => "EFI_PROTOCOL_ERROR",
            Self::INCOMPATIBLE_VERSION => "EFI_INCOMPATIBLE_VERSION",
            Self::SECURITY_VIOLATION => "EFI_SECURITY_VIOLATION",
            Self::CRC_ERROR => "EFI_CRC_ERROR",
            Self::END_OF_MEDIA => "EFI_END_OF_MEDIA",
            Self::END_OF_FILE => "EFI_END_OF_FILE",
            Self::IP_ADDRESS_CONFLICT => "EFI_IP_ADDRESS_CONFLICT",
            Self::HTTP_ERROR => "EFI_HTTP_ERROR",
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Debug for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "Status({})", name),
            None => write!(f, "Status(0x{:X})", self.0),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None if self.is_error() => write!(f, "EFI error {}", self.code()),
            None => write!(f, "EFI warning {}", self.code()),
        }
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::SUCCESS
    }
}

// =============================================================================
// GUID
// =============================================================================

/// UEFI Globally Unique Identifier (GUID)
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(C)]
pub struct Guid {
    /// First component
    pub data1: u32,
    /// Second component
    pub data2: u16,
    /// Third component
    pub data3: u16,
    /// Fourth component
    pub data4: [u8; 8],
}

impl Guid {
    /// Create a GUID from its components
    pub const fn new(data1: u32, data2: u16, data3: u16, data4: [u8; 8]) -> Self {
        Self { data1, data2, data3, data4 }
    }
}

impl fmt::Debug for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Guid({})", self)
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08X}-{:04X}-{:04X}-{:02X}{:02X}-{:02X}{:02X}{:02X}{:02X}{:02X}{:02X}",
            self.data1, self.data2, self.data3,
            self.data4[0], self.data4[1],
            self.data4[2], self.data4[3], self.data4[4],
            self.data4[5], self.data4[6], self.data4[7])
    }
}

/// Well-known UEFI GUIDs used by this application
pub mod guids {
    use super::Guid;

    /// EFI_LOADED_IMAGE_PROTOCOL_GUID
    pub const LOADED_IMAGE_PROTOCOL: Guid = Guid::new(
        0x5B1B31A1, 0x9562, 0x11D2,
        [0x8E, 0x3F, 0x00, 0xA0, 0xC9, 0x69, 0x72, 0x3B]
    );

    /// EFI_PXE_BASE_CODE_PROTOCOL_GUID
    pub const PXE_BASE_CODE_PROTOCOL: Guid = Guid::new(
        0x03C4E603, 0xAC28, 0x11D3,
        [0x9A, 0x2D, 0x00, 0x90, 0x27, 0x3F, 0xC1, 0x4D]
    );

    /// EFI_SIMPLE_TEXT_INPUT_PROTOCOL_GUID
    pub const SIMPLE_TEXT_INPUT_PROTOCOL: Guid = Guid::new(
        0x387477C1, 0x69C7, 0x11D2,
        [0x8E, 0x39, 0x00, 0xA0, 0xC9, 0x69, 0x72, 0x3B]
    );

    /// EFI_SIMPLE_TEXT_OUTPUT_PROTOCOL_GUID
    pub const SIMPLE_TEXT_OUTPUT_PROTOCOL: Guid = Guid::new(
        0x387477C2, 0x69C7, 0x11D2,
        [0x8E, 0x39, 0x00, 0xA0, 0xC9, 0x69, 0x72, 0x3B]
    );
}

// =============================================================================
// TABLE HEADER
// =============================================================================

/// Common header for all UEFI tables
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct TableHeader {
    /// Signature identifying the table
    pub signature: u64,
    /// Revision of the table
    pub revision: u32,
    /// Size of the entire table including header
    pub header_size: u32,
    /// CRC32 of the entire table
    pub crc32: u32,
    /// Reserved (must be zero)
    pub reserved: u32,
}

impl TableHeader {
    /// EFI_SYSTEM_TABLE_SIGNATURE
    pub const SYSTEM_TABLE_SIGNATURE: u64 = 0x5453595320494249; // "IBI SYST"

    /// EFI_BOOT_SERVICES_SIGNATURE
    pub const BOOT_SERVICES_SIGNATURE: u64 = 0x56524553544F4F42; // "BOOTSERV"

    /// Validate the table header
    pub fn validate(&self, expected_signature: u64) -> bool {
        self.signature == expected_signature
    }

    /// Get the UEFI specification version
    pub fn version(&self) -> (u16, u16) {
        let major = (self.revision >> 16) as u16;
        let minor = (self.revision & 0xFFFF) as u16;
        (major, minor)
    }
}

// =============================================================================
// INPUT KEY
// =============================================================================

/// Key stroke as returned by `ReadKeyStroke`
#[derive(Debug, Clone, Copy, Default)]
#[repr(C)]
pub struct InputKey {
    /// Scan code
    pub scan_code: u16,
    /// Unicode character
    pub unicode_char: Char16,
}

// =============================================================================
// NETWORK ADDRESSES
// =============================================================================

/// EFI_IP_ADDRESS: 16 bytes, IPv4 uses the first four
#[derive(Clone, Copy, PartialEq, Eq, Default)]
#[repr(C, align(4))]
pub struct IpAddress(pub [u8; 16]);

impl IpAddress {
    /// Build from an IPv4 address
    pub const fn from_v4(octets: [u8; 4]) -> Self {
        let mut raw = [0u8; 16];
        raw[0] = octets[0];
        raw[1] = octets[1];
        raw[2] = octets[2];
        raw[3] = octets[3];
        Self(raw)
    }

    /// IPv4 view (first four bytes)
    pub const fn v4(&self) -> [u8; 4] {
        [self.0[0], self.0[1], self.0[2], self.0[3]]
    }
}

impl fmt::Debug for IpAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v4 = self.v4();
        write!(f, "IpAddress({}.{}.{}.{})", v4[0], v4[1], v4[2], v4[3])
    }
}

/// EFI_MAC_ADDRESS: 32 bytes, Ethernet uses the first six
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct MacAddress(pub [u8; 32]);

const_assert_eq!(size_of::<Status>(), 8);
const_assert_eq!(size_of::<Guid>(), 16);
const_assert_eq!(size_of::<TableHeader>(), 24);
const_assert_eq!(size_of::<InputKey>(), 4);
const_assert_eq!(size_of::<IpAddress>(), 16);
const_assert_eq!(align_of::<IpAddress>(), 4);
const_assert_eq!(size_of::<MacAddress>(), 32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classes() {
        assert!(Status::SUCCESS.is_success());
        assert!(Status::TFTP_ERROR.is_error());
        assert!(Status::WARN_BUFFER_TOO_SMALL.is_warning());
        assert_eq!(Status::TFTP_ERROR.code(), 23);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(format!("{}", Status::TFTP_ERROR), "EFI_TFTP_ERROR");
        assert_eq!(format!("{}", Status::TIMEOUT), "EFI_TIMEOUT");
        assert_eq!(format!("{}", Status(Status::ERROR_BIT | 99)), "EFI error 99");
        assert_eq!(format!("{:?}", Status::SUCCESS), "Status(EFI_SUCCESS)");
    }

    #[test]
    fn test_status_result() {
        assert_eq!(Status::SUCCESS.to_status_result_with(7), Ok(7));
        assert_eq!(Status::NOT_READY.to_status_result(), Err(Status::NOT_READY));
    }

    #[test]
    fn test_guid_display() {
        assert_eq!(
            format!("{}", guids::PXE_BASE_CODE_PROTOCOL),
            "03C4E603-AC28-11D3-9A2D-0090273FC14D"
        );
    }

    #[test]
    fn test_ip_address_v4() {
        let ip = IpAddress::from_v4([10, 0, 2, 2]);
        assert_eq!(ip.v4(), [10, 0, 2, 2]);
        assert_eq!(&ip.0[4..], &[0u8; 12]);
    }
}
