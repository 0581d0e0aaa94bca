//! Decoding `PARAMS:` payloads into keyword arguments.
//!
//! Models often put multi-line code in a string value without escaping the
//! line breaks, which strict JSON rejects. When a strict parse fails for
//! that reason, the payload gets exactly one repair pass: line breaks
//! inside string literals are escaped and the result is parsed again.
//! Nothing else is repaired.

use crate::errors::PayloadError;
use crate::tools::ToolArgs;
use tracing::debug;

/// Parse a raw payload, with one newline-escaping retry.
pub fn parse_params(raw: &str) -> Result<ToolArgs, PayloadError> {
    match serde_json::from_str::<ToolArgs>(raw) {
        Ok(args) => Ok(args),
        Err(original) if is_newline_malformation(&original) => {
            debug!("Repairing tool parameters: {}", original);
            serde_json::from_str(&escape_newlines_in_strings(raw)).map_err(|after_repair| {
                PayloadError::RepairFailed {
                    original,
                    after_repair,
                }
            })
        }
        Err(e) => Err(PayloadError::Malformed(e)),
    }
}

/// An unterminated string or a raw control character inside a string.
fn is_newline_malformation(err: &serde_json::Error) -> bool {
    let msg = err.to_string();
    msg.contains("control character") || (err.is_eof() && msg.contains("while parsing a string"))
}

/// Escape literal `\n` and `\r` occurring inside string literals.
pub fn escape_newlines_in_strings(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 16);
    let mut in_string = false;
    let mut escaped = false;

    for c in raw.chars() {
        if in_string {
            match c {
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                _ => {
                    if escaped {
                        escaped = false;
                    } else if c == '\\' {
                        escaped = true;
                    } else if c == '"' {
                        in_string = false;
                    }
                    out.push(c);
                }
            }
        } else {
            if c == '"' {
                in_string = true;
            }
            out.push(c);
        }
    }

    out
}
