//! Executable Signature Check
//!
//! A UEFI boot file is a PE32+ image and starts with the DOS "MZ" marker.

use core::fmt;

/// DOS magic bytes
pub const DOS_MAGIC: u16 = 0x5A4D; // "MZ"

/// First marker byte ('M')
pub const DOS_MAGIC_BYTE0: u8 = DOS_MAGIC.to_le_bytes()[0];

/// Second marker byte ('Z')
pub const DOS_MAGIC_BYTE1: u8 = DOS_MAGIC.to_le_bytes()[1];

/// How the first two bytes of a download are judged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignatureCheck {
    /// Accept when byte 0 is 'M' or byte 1 is anything but 'Z'
    #[default]
    Lenient,
    /// Accept only "MZ"
    Strict,
}

impl SignatureCheck {
    /// Judge the head of a downloaded file
    ///
    /// Missing bytes read as zero, matching a zero-filled buffer.
    pub fn matches(self, head: &[u8]) -> bool {
        let b0 = head.first().copied().unwrap_or(0);
        let b1 = head.get(1).copied().unwrap_or(0);
        match self {
            Self::Lenient => b0 == DOS_MAGIC_BYTE0 || b1 != DOS_MAGIC_BYTE1,
            Self::Strict => u16::from_le_bytes([b0, b1]) == DOS_MAGIC,
        }
    }
}

impl fmt::Display for SignatureCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lenient => f.write_str("lenient"),
            Self::Strict => f.write_str("strict"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_bytes() {
        assert_eq!(DOS_MAGIC_BYTE0, b'M');
        assert_eq!(DOS_MAGIC_BYTE1, b'Z');
    }

    #[test]
    fn test_lenient_check() {
        let check = SignatureCheck::Lenient;
        assert!(check.matches(b"MZ\x90\x00"));
        assert!(check.matches(b"M\x00"));
        // Anything whose second byte is not 'Z' passes.
        assert!(check.matches(&[0u8; 8]));
        assert!(!check.matches(b"XZ"));
    }

    #[test]
    fn test_strict_check() {
        let check = SignatureCheck::Strict;
        assert!(check.matches(b"MZ"));
        assert!(!check.matches(&[0u8; 8]));
        assert!(!check.matches(b"M\x00"));
        assert!(!check.matches(b"XZ"));
        assert!(!check.matches(&[]));
    }
}
