//! Text cleanup for content chunks.
//!
//! Raw chunk bytes go through two passes before they are sent as the
//! `data` field of a full-text document:
//!
//! 1. [`strip_control_and_quotes`] drops ASCII control bytes, DEL and the
//!    characters `"`, `'` and `\`.
//! 2. [`repair_utf8`] turns what is left into valid UTF-8, mapping bytes
//!    that are not part of a well-formed sequence to characters from the
//!    legacy single-byte encodings they most likely came from.

/// Chunk text ready to be indexed. Always valid UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedChunk(String);

impl SanitizedChunk {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for SanitizedChunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Run both passes over raw chunk bytes.
pub fn sanitize(raw: &[u8]) -> SanitizedChunk {
    SanitizedChunk(repair_utf8(&strip_control_and_quotes(raw)))
}

/// Remove bytes 0x00-0x1F, 0x7F and the quote and backslash characters.
pub fn strip_control_and_quotes(raw: &[u8]) -> Vec<u8> {
    raw.iter()
        .copied()
        .filter(|b| !matches!(b, 0x00..=0x1F | 0x7F | b'"' | b'\'' | b'\\'))
        .collect()
}

/// Decode bytes as UTF-8, repairing anything that is not.
///
/// Never fails. ASCII text is returned unchanged.
pub fn repair_utf8(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        match c {
            b'\t' | b'\n' | b'\r' => out.push(char::from(c)),
            0x00..=0x1F => {}
            0x20..=0x7E => out.push(char::from(c)),
            // Windows-1252 euro sign
            0x80 => out.push('\u{20AC}'),
            // IBM next line
            0x85 => out.push_str("\n\r"),
            0x7F..=0x9F => {}
            // Stray continuation bytes and overlong leads read as Latin-1
            0xA0..=0xC1 => out.push(char::from(c)),
            _ => {
                let width = match c {
                    0xC2..=0xDF => 2,
                    0xE0..=0xEF => 3,
                    0xF0..=0xF4 => 4,
                    _ => 0,
                };
                let sequence = bytes
                    .get(i..i + width)
                    .filter(|_| width > 0)
                    .and_then(|seq| std::str::from_utf8(seq).ok());

                match sequence {
                    Some(s) => {
                        // Encoded C1 controls
                        if !(c == 0xC2 && bytes[i + 1] < 0xA0) {
                            out.push_str(s);
                        }
                        i += width;
                        continue;
                    }
                    None => out.push(char::from(c)),
                }
            }
        }
        i += 1;
    }

    out
}
