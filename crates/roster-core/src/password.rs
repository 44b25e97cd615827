//! Decoding of stored `userPassword` values.
//!
//! Entries written by earlier tooling hold the password in one of three
//! shapes: a byte-literal string (`b'secret'`), base64 text, or the plain
//! value. Decoders are tried in that order and the first that succeeds wins;
//! anything they all reject is taken verbatim.
//!
//! Comparison is plain equality. There is no hashing here; moving to salted
//! hashes needs a data migration and is tracked separately.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;

type Decoder = fn(&str) -> Option<String>;

const DECODERS: &[Decoder] = &[decode_byte_literal, decode_base64];

/// Recover the plain-text password from a stored attribute value.
pub fn decode_password(raw: &str) -> String {
  DECODERS
    .iter()
    .find_map(|decode| decode(raw))
    .unwrap_or_else(|| raw.to_owned())
}

/// Whether `candidate` matches the stored value once decoded.
pub fn verify_password(stored: &str, candidate: &str) -> bool {
  decode_password(stored) == candidate
}

/// `b'...'` or `b"..."` with backslash escapes, decoded as UTF-8.
fn decode_byte_literal(raw: &str) -> Option<String> {
  let rest = raw.strip_prefix('b')?;
  let quote = rest.chars().next().filter(|c| *c == '\'' || *c == '"')?;
  let body = rest.strip_prefix(quote)?.strip_suffix(quote)?;

  let mut bytes = Vec::with_capacity(body.len());
  let mut chars = body.chars();
  while let Some(c) = chars.next() {
    if !c.is_ascii() || c == quote {
      return None;
    }
    if c != '\\' {
      bytes.push(c as u8);
      continue;
    }
    match chars.next()? {
      '\\' => bytes.push(b'\\'),
      '\'' => bytes.push(b'\''),
      '"' => bytes.push(b'"'),
      'n' => bytes.push(b'\n'),
      'r' => bytes.push(b'\r'),
      't' => bytes.push(b'\t'),
      '0' => bytes.push(0),
      'x' => {
        let hex: String = [chars.next()?, chars.next()?].iter().collect();
        bytes.push(u8::from_str_radix(&hex, 16).ok()?);
      }
      other if other.is_ascii() => {
        bytes.push(b'\\');
        bytes.push(other as u8);
      }
      _ => return None,
    }
  }

  String::from_utf8(bytes).ok()
}

fn decode_base64(raw: &str) -> Option<String> {
  if raw.is_empty() {
    return None;
  }
  let bytes = B64.decode(raw).ok()?;
  String::from_utf8(bytes).ok()
}
