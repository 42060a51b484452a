//! Program image parsing.
//!
//! The LS-8 image format is plain text: whitespace-separated tokens, each
//! meaningful token a binary literal of an 8-bit value. Tokens that do not
//! parse as a base-2 byte (inline commentary, stray punctuation) are
//! skipped.

use tracing::debug;

/// Parse image text into the byte sequence to install at address 0.
///
/// Total: unparseable tokens are skipped, never an error. Tokens wider than
/// 8 bits fail the byte parse and are skipped as well.
pub fn parse_image(src: &str) -> Vec<u8> {
    let mut image = Vec::new();
    let mut skipped = 0usize;
    for token in src.split_whitespace() {
        match u8::from_str_radix(token, 2) {
            Ok(byte) => image.push(byte),
            Err(_) => skipped += 1,
        }
    }
    debug!(bytes = image.len(), skipped, "parsed program image");
    image
}
