//! UCS-2 String Utilities
//!
//! Fixed-capacity UCS-2 strings and the UTF-8 to UCS-2 conversion used for
//! console output. Nothing here allocates.

use core::fmt::{self, Write};

/// Replacement for characters outside the Basic Multilingual Plane
pub const REPLACEMENT_CHAR: u16 = 0xFFFD;

// =============================================================================
// FIXED-CAPACITY STRING
// =============================================================================

/// Fixed-capacity, always NUL-terminated UCS-2 string
///
/// Holds at most `N - 1` characters; pushes beyond that are dropped.
#[derive(Clone, Copy)]
pub struct String16<const N: usize> {
    /// Buffer (always null-terminated)
    buffer: [u16; N],
    /// Length (without null terminator)
    len: usize,
}

impl<const N: usize> String16<N> {
    /// Create empty string
    pub const fn new() -> Self {
        Self {
            buffer: [0; N],
            len: 0,
        }
    }

    /// Widen an 8-bit string, stopping at the first NUL
    ///
    /// Input beyond the capacity is silently truncated.
    pub fn from_ascii(bytes: &[u8]) -> Self {
        let mut result = Self::new();
        for &b in bytes {
            if b == 0 || !result.push_u16(u16::from(b)) {
                break;
            }
        }
        result
    }

    /// Copy a UCS-2 slice, stopping at the first NUL
    pub fn from_ucs2(slice: &[u16]) -> Self {
        let mut result = Self::new();
        for &c in slice {
            if c == 0 || !result.push_u16(c) {
                break;
            }
        }
        result
    }

    /// Create from str
    pub fn from_str(s: &str) -> Self {
        let mut result = Self::new();
        for c in s.chars() {
            if !result.push_char(c) {
                break;
            }
        }
        result
    }

    /// Get length
    pub fn len(&self) -> usize {
        self.len
    }

    /// Is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Capacity
    pub const fn capacity(&self) -> usize {
        N - 1 // Reserve for null terminator
    }

    /// Push u16
    pub fn push_u16(&mut self, c: u16) -> bool {
        if self.len >= self.capacity() {
            return false;
        }

        self.buffer[self.len] = c;
        self.len += 1;
        self.buffer[self.len] = 0;
        true
    }

    /// Push char
    pub fn push_char(&mut self, c: char) -> bool {
        self.push_u16(to_ucs2(c))
    }

    /// As slice (without null)
    pub fn as_slice(&self) -> &[u16] {
        &self.buffer[..self.len]
    }

    /// As slice with null terminator
    pub fn as_slice_with_nul(&self) -> &[u16] {
        &self.buffer[..=self.len]
    }
}

impl<const N: usize> Default for String16<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> fmt::Display for String16<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in char::decode_utf16(self.as_slice().iter().copied()) {
            f.write_char(c.unwrap_or(char::REPLACEMENT_CHARACTER))?;
        }
        Ok(())
    }
}

impl<const N: usize> fmt::Debug for String16<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"")?;
        fmt::Display::fmt(self, f)?;
        write!(f, "\"")
    }
}

impl<const N: usize> PartialEq for String16<N> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<const N: usize> Eq for String16<N> {}

// =============================================================================
// ENCODING
// =============================================================================

/// Map a char onto a single UCS-2 unit
#[inline]
pub fn to_ucs2(c: char) -> u16 {
    u16::try_from(u32::from(c)).unwrap_or(REPLACEMENT_CHAR)
}

/// Encode `s` as UCS-2 for a text console, in NUL-terminated chunks
///
/// `\n` becomes `\r\n`. `chunk` is scratch space (at least 3 units); `emit`
/// is called with each filled chunk, terminator included.
pub fn encode_console_chunks<F>(s: &str, chunk: &mut [u16], mut emit: F) -> fmt::Result
where
    F: FnMut(&[u16]) -> fmt::Result,
{
    debug_assert!(chunk.len() >= 3);
    // Room for a CR/LF pair plus the terminator.
    let limit = chunk.len() - 2;
    let mut len = 0;

    for c in s.chars() {
        if len >= limit {
            chunk[len] = 0;
            emit(&chunk[..=len])?;
            len = 0;
        }
        if c == '\n' {
            chunk[len] = u16::from(b'\r');
            len += 1;
        }
        chunk[len] = to_ucs2(c);
        len += 1;
    }

    if len > 0 {
        chunk[len] = 0;
        emit(&chunk[..=len])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_ascii_stops_at_nul() {
        let s: String16<16> = String16::from_ascii(b"boot.efi\0garbage");
        assert_eq!(s.len(), 8);
        assert_eq!(format!("{}", s), "boot.efi");
        assert_eq!(s.as_slice_with_nul().last(), Some(&0));
    }

    #[test]
    fn test_from_ascii_truncates_silently() {
        let long = [b'a'; 300];
        let s: String16<256> = String16::from_ascii(&long);
        assert_eq!(s.len(), 255);
        assert_eq!(s.as_slice_with_nul().len(), 256);
    }

    #[test]
    fn test_from_ucs2() {
        let raw = [u16::from(b'O'), u16::from(b'V'), u16::from(b'M'), u16::from(b'F'), 0, 0x41];
        let s: String16<32> = String16::from_ucs2(&raw);
        assert_eq!(format!("{}", s), "OVMF");
        assert_eq!(s, String16::from_str("OVMF"));
    }

    #[test]
    fn test_encode_translates_newlines() {
        let mut chunk = [0u16; 64];
        let mut out = Vec::new();
        encode_console_chunks("a\nb", &mut chunk, |c| {
            out.extend_from_slice(c);
            Ok(())
        })
        .unwrap();
        assert_eq!(out, [0x61, 0x0D, 0x0A, 0x62, 0]);
    }

    #[test]
    fn test_encode_splits_long_strings() {
        let mut chunk = [0u16; 4];
        let mut chunks = Vec::new();
        encode_console_chunks("abcde", &mut chunk, |c| {
            assert_eq!(c.last(), Some(&0));
            chunks.push(c.len());
            Ok(())
        })
        .unwrap();
        assert_eq!(chunks, [3, 3, 2]);
    }
}
