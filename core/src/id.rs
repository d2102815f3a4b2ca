//! Deterministic, namespaced entity identifiers.
//!
//! An identifier looks like `{tip.example.com}indicator-<uuid>`: the
//! namespace in braces, a display type, and a version-5 UUID (DNS
//! namespace) of a canonical name built from the kind and the value.
//!
//! The canonical name is the printed byte-literal form of both parts,
//! `b'ipv4':b'172.16.1.10'`, not the raw strings. Identifiers already
//! stored by IC deployments were derived from that form, so it has to be
//! reproduced byte for byte, quoting and escaping rules included.

use std::fmt::Write;

use uuid::Uuid;

use crate::error::ApiError;

/// Kinds that are shown as the generic `indicator` type.
const INDICATOR_KINDS: [&str; 5] = ["email", "uri", "ipv4", "ip", "domain"];

/// Derive the identifier for `value` of `kind` within `namespace`.
///
/// Pure and total: the same triple always yields the same string.
pub fn make_id(namespace: &str, kind: &str, value: &str) -> String {
    let uuid = Uuid::new_v5(&Uuid::NAMESPACE_DNS, canonical_name(kind, value).as_bytes());
    format!("{{{namespace}}}{}-{uuid}", display_type(kind))
}

/// `make_id` over raw bytes, which must each be valid UTF-8.
pub fn make_id_from_bytes(namespace: &[u8], kind: &[u8], value: &[u8]) -> Result<String, ApiError> {
    let namespace = std::str::from_utf8(namespace).map_err(|_| ApiError::EncodingError("namespace"))?;
    let kind = std::str::from_utf8(kind).map_err(|_| ApiError::EncodingError("kind"))?;
    let value = std::str::from_utf8(value).map_err(|_| ApiError::EncodingError("value"))?;
    Ok(make_id(namespace, kind, value))
}

/// The exact string hashed by `make_id`.
pub fn canonical_name(kind: &str, value: &str) -> String {
    format!("{}:{}", byte_literal(kind.as_bytes()), byte_literal(value.as_bytes()))
}

fn display_type(kind: &str) -> &str {
    if INDICATOR_KINDS.contains(&kind) {
        "indicator"
    } else {
        kind
    }
}

/// Render bytes as a `b'...'` literal.
///
/// Single quotes are used unless the bytes contain `'` and no `"`.
/// Printable ASCII is kept as is; `\t`, `\n`, `\r`, the backslash and the
/// active quote are escaped; everything else becomes `\xNN`.
fn byte_literal(bytes: &[u8]) -> String {
    let quote = if bytes.contains(&b'\'') && !bytes.contains(&b'"') {
        b'"'
    } else {
        b'\''
    };

    let mut out = String::with_capacity(bytes.len() + 3);
    out.push('b');
    out.push(quote as char);
    for &b in bytes {
        match b {
            b'\\' => out.push_str("\\\\"),
            b'\t' => out.push_str("\\t"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            _ if b == quote => {
                out.push('\\');
                out.push(b as char);
            }
            0x20..=0x7e => out.push(b as char),
            _ => {
                let _ = write!(out, "\\x{b:02x}");
            }
        }
    }
    out.push(quote as char);
    out
}
