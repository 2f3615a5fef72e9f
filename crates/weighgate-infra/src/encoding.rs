//! Character encoding detection for exported ledgers
//!
//! Weighbridge software on Chinese Windows installs usually exports GBK,
//! newer systems export UTF-8 (often with a BOM).

use encoding_rs::{Encoding, GB18030, GBK, UTF_8};

/// Decode raw file bytes, trying a BOM first and then UTF-8, GBK and
/// GB18030 without replacement characters.
///
/// Returns the text and the encoding that accepted it, or `None` when every
/// candidate hits a malformed sequence.
pub fn decode_bytes(bytes: &[u8]) -> Option<(String, &'static Encoding)> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        if let Some(text) =
            encoding.decode_without_bom_handling_and_without_replacement(&bytes[bom_len..])
        {
            return Some((text.into_owned(), encoding));
        }
    }

    let candidates: [&'static Encoding; 3] = [UTF_8, GBK, GB18030];
    candidates.into_iter().find_map(|encoding| {
        encoding
            .decode_without_bom_handling_and_without_replacement(bytes)
            .map(|text| (text.into_owned(), encoding))
    })
}
