use std::borrow::Cow;

use rmcp::ErrorData;
use rmcp::model::ErrorCode;

pub fn mcp_err(code: ErrorCode, message: impl Into<Cow<'static, str>>) -> ErrorData {
    ErrorData {
        code,
        message: message.into(),
        data: None,
    }
}

/// Decodes `%XX` escapes in a resource URI path segment. Malformed
/// escapes pass through unchanged.
pub fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if let Some(escape) = input.get(i + 1..i + 3) {
                if let Ok(value) = u8::from_str_radix(escape, 16) {
                    out.push(value);
                    i += 3;
                    continue;
                }
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}
