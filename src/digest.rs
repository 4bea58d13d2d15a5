//! Base-36 + SHA-1 derivation (C7).
//!
//! MediaWiki stores `rev_sha1` as the revision text's SHA-1 digest,
//! reinterpreted as an unsigned big-endian integer and encoded in base 36,
//! left-padded with `'0'` to 31 characters (the widest a 160-bit number
//! can need in base 36).

use sha1::{Digest, Sha1};

const WIDTH: usize = 31;
const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Computes MediaWiki's base-36 SHA-1 for a revision's text bytes.
pub fn sha1_base36(text: &[u8]) -> String {
    let digest = Sha1::digest(text);
    base36_pad(&digest)
}

/// Encodes a big-endian byte string in base 36, left-padded to [`WIDTH`].
fn base36_pad(bytes: &[u8]) -> String {
    // Long division of the big-endian number by 36, repeatedly, collecting
    // remainders least-significant-digit first.
    let mut digits = Vec::with_capacity(WIDTH);
    let mut work = bytes.to_vec();
    while work.iter().any(|&b| b != 0) {
        let mut remainder: u32 = 0;
        for byte in work.iter_mut() {
            let acc = (remainder << 8) | *byte as u32;
            *byte = (acc / 36) as u8;
            remainder = acc % 36;
        }
        digits.push(ALPHABET[remainder as usize]);
        // Drop now-redundant leading zero bytes to keep the division cheap.
        while work.first() == Some(&0) && work.len() > 1 {
            work.remove(0);
        }
    }
    if digits.is_empty() {
        digits.push(b'0');
    }
    digits.reverse();
    let mut s = String::from_utf8(digits).expect("alphabet is ASCII");
    while s.len() < WIDTH {
        s.insert(0, '0');
    }
    s
}

/// Validates a dump-supplied `<sha1>` value: 31 chars, lowercase `[0-9a-z]`.
/// Returns it unchanged if valid, `None` if it must be recomputed.
pub fn validate_source_sha1(s: &str) -> Option<String> {
    if s.len() == WIDTH && s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'z').contains(&b)) {
        Some(s.to_string())
    } else {
        None
    }
}
