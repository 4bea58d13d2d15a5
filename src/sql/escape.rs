//! SQL escaper / value formatter (C5).
//!
//! Reproduces the literal encoding `mysqldump --hex-blob=0` uses:
//! single-quoted strings escaped the way MySQL's `mysql_real_escape_string`
//! does, numbers unquoted, `NULL` bare. Operates on bytes end to end —
//! `String` cannot legally hold the raw, possibly non-UTF-8 bytes a
//! malformed dump's revision text may carry, so every formatter here
//! returns `Vec<u8>` rather than `String`.

/// A formatted SQL value ready to be joined into a row tuple.
pub enum Value {
    Str(Vec<u8>),
    Int(i64),
    UInt(u64),
    Null,
}

impl Value {
    pub fn str(s: impl Into<Vec<u8>>) -> Self {
        Value::Str(s.into())
    }
}

/// Escapes bytes into a single-quoted MySQL string literal, byte for byte.
/// Every input byte has a defined encoding: the six special bytes get their
/// backslash escape, everything else — ASCII or any non-ASCII byte of a
/// multi-byte UTF-8 sequence alike — passes through unchanged.
pub fn quote_bytes(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len() + 2);
    out.push(b'\'');
    for &b in bytes {
        match b {
            0 => out.extend_from_slice(b"\\0"),
            b'\n' => out.extend_from_slice(b"\\n"),
            b'\r' => out.extend_from_slice(b"\\r"),
            b'\\' => out.extend_from_slice(b"\\\\"),
            b'\'' => out.extend_from_slice(b"\\'"),
            b'"' => out.extend_from_slice(b"\\\""),
            0x1a => out.extend_from_slice(b"\\Z"),
            _ => out.push(b),
        }
    }
    out.push(b'\'');
    out
}

/// Formats one [`Value`] as it appears inside a row tuple.
pub fn format_value(value: &Value) -> Vec<u8> {
    match value {
        Value::Str(bytes) => quote_bytes(bytes),
        Value::Int(n) => n.to_string().into_bytes(),
        Value::UInt(n) => n.to_string().into_bytes(),
        Value::Null => b"NULL".to_vec(),
    }
}

/// Formats a full row tuple: `(v1,v2,…)`.
pub fn format_row(values: &[Value]) -> Vec<u8> {
    let mut out = Vec::new();
    out.push(b'(');
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            out.push(b',');
        }
        out.extend(format_value(value));
    }
    out.push(b')');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_all_special_bytes() {
        let got = quote_bytes(b"a\0b\nc\rd\\e'f\"g\x1ah");
        assert_eq!(got, b"'a\\0b\\nc\\rd\\\\e\\'f\\\"g\\Zh'".to_vec());
    }

    #[test]
    fn plain_bytes_pass_through() {
        assert_eq!(quote_bytes(b"Hello"), b"'Hello'".to_vec());
    }

    #[test]
    fn non_utf8_and_multibyte_utf8_bytes_pass_through_unchanged() {
        // 0xE9 alone is not valid UTF-8; 0xC3 0xA9 is "é". Neither may be
        // reinterpreted byte-by-byte as a codepoint — each raw byte must
        // come out exactly as it went in.
        let got = quote_bytes(b"caf\xc3\xa9 \xe9 end");
        assert_eq!(got, b"'caf\xc3\xa9 \xe9 end'".to_vec());
    }

    #[test]
    fn numbers_are_unquoted_and_null_is_bare() {
        assert_eq!(format_value(&Value::UInt(42)), b"42".to_vec());
        assert_eq!(format_value(&Value::Int(-1)), b"-1".to_vec());
        assert_eq!(format_value(&Value::Null), b"NULL".to_vec());
    }

    #[test]
    fn row_joins_values_with_commas() {
        let row = format_row(&[Value::UInt(1), Value::str("x"), Value::Null]);
        assert_eq!(row, b"(1,'x',NULL)".to_vec());
    }

    #[test]
    fn escaping_round_trips_through_a_naive_sql_unescape() {
        // Sanity check for invariant 6 (spec.md §8): escaping is total and
        // reversible by the standard backslash-escape rules.
        fn naive_unescape(bytes: &[u8]) -> Vec<u8> {
            let inner = &bytes[1..bytes.len() - 1];
            let mut out = Vec::new();
            let mut iter = inner.iter().peekable();
            while let Some(&b) = iter.next() {
                if b == b'\\' {
                    match iter.next() {
                        Some(b'0') => out.push(0),
                        Some(b'n') => out.push(b'\n'),
                        Some(b'r') => out.push(b'\r'),
                        Some(b'\\') => out.push(b'\\'),
                        Some(b'\'') => out.push(b'\''),
                        Some(b'"') => out.push(b'"'),
                        Some(b'Z') => out.push(0x1a),
                        Some(other) => out.push(*other),
                        None => {}
                    }
                } else {
                    out.push(b);
                }
            }
            out
        }
        let original = b"it's a \"test\"\nwith\\backslash and \0 nul and caf\xc3\xa9".to_vec();
        let quoted = quote_bytes(&original);
        assert_eq!(naive_unescape(&quoted), original);
    }
}
