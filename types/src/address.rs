//! Representative / account address type.
//!
//! Address format: `<prefix>` + base32(4 zero bits ++ public_key, 52 chars)
//! + base32(checksum, 8 chars).
//!
//! Checksum: Blake2b with a 5-byte digest over the public key, byte-reversed.
//! Base32 alphabet: `13456789abcdefghijkmnopqrstuwxyz`.

use blake2::digest::consts::U5;
use blake2::{Blake2b, Digest};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix addresses are normalised to unless configured otherwise.
pub const DEFAULT_PREFIX: &str = "ban_";

/// Prefixes from earlier ledger generations that normalise to the current one.
const LEGACY_PREFIXES: [&str; 2] = ["xrb_", "nano_"];

const BASE32_ALPHABET: &[u8; 32] = b"13456789abcdefghijkmnopqrstuwxyz";

/// Reverse lookup table: ASCII byte → 5-bit value (0xFF = invalid).
const BASE32_DECODE: [u8; 128] = {
    let mut table = [0xFFu8; 128];
    let mut i = 0;
    while i < 32 {
        table[BASE32_ALPHABET[i] as usize] = i as u8;
        i += 1;
    }
    table
};

/// Characters after the prefix: 52 public key + 8 checksum.
const ENCODED_LEN: usize = 60;
const PUBKEY_CHARS: usize = 52;
/// Zero bits prepended to the 256-bit key so it fills 52 characters.
const PUBKEY_PAD_BITS: u32 = 4;

type Blake2b40 = Blake2b<U5>;

/// An account id as the ledger and the reputation sources report it.
///
/// Construction never fails: ids arrive from collaborators that may hand back
/// anything. Use [`RepAddress::is_valid`] where well-formedness matters.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepAddress(String);

impl RepAddress {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Rewrite a legacy or foreign prefix to `prefix`, lowercasing the id.
    ///
    /// Ids with no recognised prefix are returned lowercased and unchanged.
    pub fn normalize(&self, prefix: &str) -> RepAddress {
        let lower = self.0.trim().to_ascii_lowercase();
        if lower.starts_with(prefix) {
            return RepAddress(lower);
        }
        for legacy in LEGACY_PREFIXES.iter().chain(std::iter::once(&DEFAULT_PREFIX)) {
            if let Some(body) = lower.strip_prefix(legacy) {
                return RepAddress(format!("{prefix}{body}"));
            }
        }
        RepAddress(lower)
    }

    /// Whether this id is a well-formed `prefix` address with a valid checksum.
    pub fn is_valid(&self, prefix: &str) -> bool {
        self.public_key(prefix).is_some()
    }

    /// Extract the public key bytes. `None` if malformed or the checksum fails.
    pub fn public_key(&self, prefix: &str) -> Option<[u8; 32]> {
        let encoded = self.0.strip_prefix(prefix)?;
        if encoded.len() != ENCODED_LEN {
            return None;
        }
        let (key_part, checksum_part) = encoded.split_at(PUBKEY_CHARS);
        let key: [u8; 32] = decode_base32(key_part, PUBKEY_PAD_BITS)?;
        let checksum: [u8; 5] = decode_base32(checksum_part, 0)?;
        (checksum == checksum_of(&key)).then_some(key)
    }

    /// Compact display label: first 11 characters, `...`, last 6 characters.
    pub fn short_label(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 17 {
            return self.0.clone();
        }
        let head: String = chars[..11].iter().collect();
        let tail: String = chars[chars.len() - 6..].iter().collect();
        format!("{head}...{tail}")
    }

    /// Case-insensitive id comparison, as used by the known list.
    pub fn eq_ignore_case(&self, other: &str) -> bool {
        self.0 == other || self.0.to_lowercase() == other.to_lowercase()
    }
}

/// Build the address for a public key under `prefix`.
pub fn derive_address(public_key: &[u8; 32], prefix: &str) -> RepAddress {
    let key_encoded = encode_base32(public_key, PUBKEY_PAD_BITS);
    let checksum_encoded = encode_base32(&checksum_of(public_key), 0);
    RepAddress(format!("{prefix}{key_encoded}{checksum_encoded}"))
}

fn checksum_of(public_key: &[u8; 32]) -> [u8; 5] {
    let digest = Blake2b40::digest(public_key);
    let mut checksum = [0u8; 5];
    checksum.copy_from_slice(&digest);
    checksum.reverse();
    checksum
}

/// Encode bytes as base32, as if `pad_bits` zero bits preceded them.
fn encode_base32(bytes: &[u8], pad_bits: u32) -> String {
    let mut result = String::with_capacity((bytes.len() * 8 + pad_bits as usize).div_ceil(5));
    let mut buffer: u64 = 0;
    let mut bits_in_buffer = pad_bits;

    for &byte in bytes {
        buffer = (buffer << 8) | u64::from(byte);
        bits_in_buffer += 8;
        while bits_in_buffer >= 5 {
            bits_in_buffer -= 5;
            let idx = ((buffer >> bits_in_buffer) & 0x1F) as usize;
            result.push(BASE32_ALPHABET[idx] as char);
        }
    }
    if bits_in_buffer > 0 {
        let idx = ((buffer << (5 - bits_in_buffer)) & 0x1F) as usize;
        result.push(BASE32_ALPHABET[idx] as char);
    }
    result
}

/// Decode base32 into exactly `N` bytes. The first `pad_bits` bits must be zero
/// and no bits may be left over.
fn decode_base32<const N: usize>(s: &str, pad_bits: u32) -> Option<[u8; N]> {
    let mut result = [0u8; N];
    let mut pos = 0;
    let mut buffer: u64 = 0;
    let mut bits_in_buffer: u32 = 0;

    for (i, c) in s.bytes().enumerate() {
        let val = *BASE32_DECODE.get(c as usize)?;
        if val == 0xFF {
            return None;
        }
        if i == 0 && pad_bits > 0 {
            if u32::from(val) >> (5 - pad_bits) != 0 {
                return None;
            }
            buffer = u64::from(val);
            bits_in_buffer = 5 - pad_bits;
            continue;
        }
        buffer = (buffer << 5) | u64::from(val);
        bits_in_buffer += 5;
        if bits_in_buffer >= 8 {
            bits_in_buffer -= 8;
            if pos == N {
                return None;
            }
            result[pos] = (buffer >> bits_in_buffer) as u8;
            pos += 1;
        }
    }

    (pos == N && bits_in_buffer == 0).then_some(result)
}

impl fmt::Display for RepAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RepAddress {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RepAddress {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for RepAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOOT: &str = "ban_1hootubxy68fhhrctjmaias148tz91tsse3pq1pgmfedsm3cubhobuihqnxd";
    const BATMAN: &str = "ban_3batmanuenphd7osrez9c45b3uqw9d9u81ne8xa6m43e1py56y9p48ap69zg";

    #[test]
    fn known_addresses_validate() {
        assert!(RepAddress::new(HOOT).is_valid(DEFAULT_PREFIX));
        assert!(RepAddress::new(BATMAN).is_valid(DEFAULT_PREFIX));
    }

    #[test]
    fn corrupted_checksum_is_rejected() {
        let mut corrupted = HOOT.to_string();
        corrupted.pop();
        corrupted.push('1');
        assert!(!RepAddress::new(corrupted).is_valid(DEFAULT_PREFIX));
    }

    #[test]
    fn wrong_length_and_prefix_are_rejected() {
        assert!(!RepAddress::new("ban_1hoot").is_valid(DEFAULT_PREFIX));
        assert!(!RepAddress::new(HOOT).is_valid("nano_"));
        assert!(!RepAddress::new("").is_valid(DEFAULT_PREFIX));
    }

    #[test]
    fn derive_then_decode_round_trips() {
        let key = [0xA7u8; 32];
        let address = derive_address(&key, DEFAULT_PREFIX);
        assert_eq!(address.as_str().len(), DEFAULT_PREFIX.len() + ENCODED_LEN);
        assert_eq!(address.public_key(DEFAULT_PREFIX), Some(key));
    }

    #[test]
    fn derived_address_matches_known_key() {
        let key = RepAddress::new(HOOT).public_key(DEFAULT_PREFIX).unwrap();
        assert_eq!(derive_address(&key, DEFAULT_PREFIX).as_str(), HOOT);
    }

    #[test]
    fn normalize_rewrites_legacy_prefixes() {
        let body = &HOOT[DEFAULT_PREFIX.len()..];
        let legacy = RepAddress::new(format!("xrb_{body}"));
        assert_eq!(legacy.normalize(DEFAULT_PREFIX).as_str(), HOOT);
        let nano = RepAddress::new(format!("NANO_{}", body.to_uppercase()));
        assert_eq!(nano.normalize(DEFAULT_PREFIX).as_str(), HOOT);
    }

    #[test]
    fn normalize_leaves_unknown_prefix_alone() {
        let odd = RepAddress::new("brst_abc");
        assert_eq!(odd.normalize(DEFAULT_PREFIX).as_str(), "brst_abc");
    }

    #[test]
    fn short_label_truncates() {
        assert_eq!(RepAddress::new(BATMAN).short_label(), "ban_3batman...ap69zg");
        assert_eq!(RepAddress::new("ban_short").short_label(), "ban_short");
    }

    #[test]
    fn eq_ignore_case_matches() {
        assert!(RepAddress::new(HOOT).eq_ignore_case(&HOOT.to_uppercase()));
    }
}
