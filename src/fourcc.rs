//! Four-character codes - 32-bit tags built from 4 ASCII bytes
//!
//! Design: Packed big-endian so `'ascr'` reads as `0x61736372` on every host.
//! Malformed input is a programming error and panics.

use std::fmt;

/// 32-bit tag identifying descriptor types, event classes and keywords
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FourCharCode(u32);

impl FourCharCode {
    /// Build from raw bytes (usable in `const` items)
    ///
    /// Non-ASCII bytes are rejected at compile time when used in a constant.
    #[inline]
    pub const fn from_bytes(bytes: [u8; 4]) -> Self {
        assert!(
            bytes[0].is_ascii() && bytes[1].is_ascii() && bytes[2].is_ascii() && bytes[3].is_ascii(),
            "four-character codes only accept ASCII bytes"
        );
        Self(u32::from_be_bytes(bytes))
    }

    /// Wrap an already packed value
    #[inline]
    pub const fn from_u32(value: u32) -> Self {
        Self(value)
    }

    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn to_bytes(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }
}

/// Create a [`FourCharCode`] from an ASCII string.
///
/// # Panics
/// Panics if `code` contains non-ASCII characters or is not exactly 4 bytes long.
pub fn four_char_code(code: &str) -> FourCharCode {
    assert!(code.is_ascii(), "four_char_code() only accepts ASCII characters");
    assert!(code.len() == 4, "four_char_code() only accepts strings of length 4");

    let bytes = code.as_bytes();
    FourCharCode::from_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

impl fmt::Display for FourCharCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.to_bytes();
        if bytes.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
            // Only printable ASCII reaches this branch
            for b in bytes {
                write!(f, "{}", b as char)?;
            }
            Ok(())
        } else {
            write!(f, "0x{:08x}", self.0)
        }
    }
}

impl fmt::Debug for FourCharCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'", self)
    }
}

impl From<FourCharCode> for u32 {
    fn from(code: FourCharCode) -> Self {
        code.0
    }
}
