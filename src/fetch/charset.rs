use encoding_rs::{Encoding, EUC_KR};

use crate::static_regex;

/// How far into a document a `<meta>` charset is looked for.
const META_PRESCAN_BYTES: usize = 1024;

static_regex!(CHARSET_PARAM <- r#"(?i)charset\s*=\s*["']?\s*([A-Za-z0-9_:.-]+)"#);
static_regex!(META_TAG <- r"(?i)<meta\b[^>]*>");

/// The encoding a `charset=` parameter names, if `encoding_rs` knows the label.
fn charset_param(s: &str) -> Option<&'static Encoding> {
    CHARSET_PARAM
        .captures(s)
        .and_then(|captures| Encoding::for_label(captures[1].as_bytes()))
}

/// `<meta charset="...">` or `<meta http-equiv="Content-Type" content="...; charset=...">`
fn meta_charset(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(META_PRESCAN_BYTES)]);
    META_TAG
        .find_iter(&head)
        .find_map(|tag| charset_param(tag.as_str()))
}

/// The `Content-Type` charset wins, then a `<meta>` declaration. Pages that declare
/// neither are the old EUC-KR ones.
pub fn page_encoding(content_type: Option<&str>, bytes: &[u8]) -> &'static Encoding {
    content_type
        .and_then(charset_param)
        .or_else(|| meta_charset(bytes))
        .unwrap_or(EUC_KR)
}

pub fn decode_page(content_type: Option<&str>, bytes: &[u8]) -> String {
    let encoding = page_encoding(content_type, bytes);
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        log::warn!("Page is not valid {}; undecodable bytes replaced", used.name());
    }
    text.into_owned()
}
