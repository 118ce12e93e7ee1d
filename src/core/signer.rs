//! Request token signing
//!
//! The endpoint rejects any query whose `tk` parameter does not match the
//! checksum its own page script computes from the host's key pair. The
//! arithmetic below reproduces that script exactly, including its 32-bit
//! integer coercions, so it must not be "simplified".

use std::fmt;
use std::str::FromStr;

use crate::core::errors::TranslationError;

/// Mixing program applied after every input byte
const BYTE_ROUND: &[u8] = b"+-a^+6";

/// Mixing program applied once after all bytes
const FINAL_ROUND: &[u8] = b"+-3^+b+-f";

/// Two integers issued by a host page that parameterize the token algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SigningKeyPair {
    /// Seed of the running checksum, also folded into the token's second half
    pub h1: i64,
    /// Xored into the checksum after the final round
    pub h2: i64,
}

impl SigningKeyPair {
    /// Key pair from its two halves
    pub fn new(h1: i64, h2: i64) -> Self {
        Self { h1, h2 }
    }
}

impl fmt::Display for SigningKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.h1, self.h2)
    }
}

impl FromStr for SigningKeyPair {
    type Err = TranslationError;

    /// Parse the `h1.h2` form the host embeds in its page
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TranslationError::Config {
            message: format!("invalid key pair '{}', expected <h1>.<h2>", s),
        };

        let (h1, h2) = s.trim().split_once('.').ok_or_else(invalid)?;
        let h1 = h1.parse::<i64>().map_err(|_| invalid())?;
        let h2 = h2.parse::<i64>().map_err(|_| invalid())?;
        Ok(Self::new(h1, h2))
    }
}

/// Compute the `tk` token for `text` under `key`.
///
/// Pure: the same key and text always yield the same token.
pub fn sign(key: &SigningKeyPair, text: &str) -> String {
    let mut a = key.h1;
    for &byte in text.as_bytes() {
        a = a.wrapping_add(i64::from(byte));
        a = mix(a, BYTE_ROUND);
    }
    a = mix(a, FINAL_ROUND);

    let mut a = i64::from(to_int32(a) ^ to_int32(key.h2));
    if a < 0 {
        a = (a & 0x7fff_ffff) + 0x8000_0000;
    }
    a %= 1_000_000;

    format!("{}.{}", a, to_int32(a) ^ to_int32(key.h1))
}

/// Run a mixing program over `a`.
///
/// Each op is three bytes: `+` add / otherwise xor, `+` logical right shift /
/// otherwise left shift, then the shift width as a digit or a letter (`a` = 10).
fn mix(mut a: i64, program: &[u8]) -> i64 {
    for op in program.chunks_exact(3) {
        let shift = match op[2] {
            c @ b'a'..=b'z' => u32::from(c - b'a') + 10,
            c => u32::from(c - b'0'),
        };

        let operand = if op[1] == b'+' {
            i64::from(to_uint32(a) >> shift)
        } else {
            i64::from(to_int32(a).wrapping_shl(shift))
        };

        a = if op[0] == b'+' {
            i64::from(to_int32(a.wrapping_add(operand)))
        } else {
            i64::from(to_int32(a) ^ to_int32(operand))
        };
    }
    a
}

/// Wrap to a signed 32-bit value the way `x | 0` does
fn to_int32(value: i64) -> i32 {
    value as i32
}

/// Wrap to an unsigned 32-bit value the way `x >>> 0` does
fn to_uint32(value: i64) -> u32 {
    value as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    // Expected tokens were produced by the page script itself.
    const KEY: SigningKeyPair = SigningKeyPair { h1: 406398, h2: 2087938574 };
    const WIDE_KEY: SigningKeyPair = SigningKeyPair { h1: 422388, h2: 3876711001 };

    #[test]
    fn test_ascii_tokens() {
        assert_eq!(sign(&KEY, "hello"), "338590.203232");
        assert_eq!(sign(&KEY, "Hello, world!"), "91438.480848");
    }

    #[test]
    fn test_multibyte_tokens() {
        assert_eq!(sign(&KEY, "你好"), "916876.773874");
        assert_eq!(sign(&KEY, "é"), "899527.756409");
        assert_eq!(
            sign(&KEY, "逗斗车 - 四川愣娃闯帝都 逗比天团再聚首 - 余洋"),
            "693858.828700"
        );
    }

    #[test]
    fn test_astral_plane_token() {
        assert_eq!(sign(&KEY, "😀 ok"), "202049.337471");
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(sign(&KEY, ""), "263193.145255");
        assert_eq!(sign(&SigningKeyPair::new(0, 0), ""), "0.0");
    }

    #[test]
    fn test_second_half_above_i32_range() {
        assert_eq!(sign(&WIDE_KEY, "hello"), "725516.877560");
        assert_eq!(sign(&WIDE_KEY, "你好"), "948590.526490");
        assert_eq!(sign(&WIDE_KEY, ""), "127821.492217");
    }

    #[test]
    fn test_extreme_keys_do_not_overflow() {
        for key in [
            SigningKeyPair::new(i64::MAX, 0),
            SigningKeyPair::new(i64::MIN, i64::MAX),
            SigningKeyPair::new(i64::MAX - 1, i64::MIN),
        ] {
            for text in ["", "a", "你好"] {
                let token = sign(&key, text);
                let (first, second) = token.split_once('.').unwrap();
                let first: i64 = first.parse().unwrap();
                assert!((0..1_000_000).contains(&first));
                assert!(second.parse::<i64>().is_ok());
            }
        }
    }

    #[test]
    fn test_deterministic_and_text_sensitive() {
        let first = sign(&KEY, "translate me");
        assert_eq!(first, sign(&KEY, "translate me"));
        assert_ne!(first, sign(&KEY, "translate me!"));
    }

    #[test]
    fn test_key_pair_parse_and_display() {
        let key: SigningKeyPair = "406398.2087938574".parse().unwrap();
        assert_eq!(key, KEY);
        assert_eq!(key.to_string(), "406398.2087938574");

        let negative: SigningKeyPair = "406375.-1857761911".parse().unwrap();
        assert_eq!(negative.h2, -1857761911);
    }

    #[test]
    fn test_key_pair_rejects_garbage() {
        assert!("406398".parse::<SigningKeyPair>().is_err());
        assert!("abc.123".parse::<SigningKeyPair>().is_err());
        assert!("".parse::<SigningKeyPair>().is_err());
    }
}
