//! Scanning model output for tool directives.
//!
//! Wire format, two consecutive lines:
//!
//! ```text
//! USE_TOOL: <identifier>
//! PARAMS: {<object literal>}
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

/// Directive head, up to and including the opening brace of the payload.
static DIRECTIVE_HEAD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"USE_TOOL:\s*(\w+)\s*\nPARAMS:\s*\{").expect("directive regex")
});

/// A tool request found in model output, not yet executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// Requested tool name.
    pub tool: String,
    /// Raw payload text, braces included, exactly as emitted.
    pub params: String,
    /// Byte span of the whole directive in the scanned text.
    pub span: Range<usize>,
}

/// Find every directive in `text`, in order of appearance.
pub fn extract(text: &str) -> Vec<Directive> {
    let mut directives = Vec::new();
    let mut pos = 0;

    while let Some(caps) = DIRECTIVE_HEAD_RE.captures_at(text, pos) {
        let Some(head) = caps.get(0) else { break };
        let open = head.end() - 1;

        let Some(close) = payload_end(text, open) else {
            // Nothing closes this payload, so nothing after it can either.
            break;
        };

        directives.push(Directive {
            tool: caps[1].to_string(),
            params: text[open..=close].to_string(),
            span: head.start()..close + 1,
        });
        pos = close + 1;
    }

    directives
}

/// Index of the `}` ending the object literal opened at `open`.
///
/// Prefers the first `}` that balances the opening brace outside string
/// literals. Falls back to the first `}` when the payload never balances.
fn payload_end(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(open) {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }

    text[open..].find('}').map(|i| open + i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_has_no_directives() {
        assert!(extract("").is_empty());
        assert!(extract("The answer is 4. Use {braces} freely.").is_empty());
        assert!(extract("USE_TOOL: calc\nno params line").is_empty());
    }

    #[test]
    fn test_single_directive_span() {
        let text = "Let me calculate.\nUSE_TOOL: calc\nPARAMS: {\"expr\": \"2+2\"}\nDone.";
        let found = extract(text);
        assert_eq!(found.len(), 1);
        let d = &found[0];
        assert_eq!(d.tool, "calc");
        assert_eq!(d.params, "{\"expr\": \"2+2\"}");
        assert_eq!(&text[d.span.clone()], "USE_TOOL: calc\nPARAMS: {\"expr\": \"2+2\"}");
    }

    #[test]
    fn test_multiple_directives_in_order_with_duplicates() {
        let call = "USE_TOOL: echo\nPARAMS: {\"x\": 1}";
        let text = format!("{call}\nthen\n{call}\nand USE_TOOL: other\nPARAMS: {{}}");
        let found = extract(&text);
        let names: Vec<_> = found.iter().map(|d| d.tool.as_str()).collect();
        assert_eq!(names, vec!["echo", "echo", "other"]);
        assert_ne!(found[0].span, found[1].span);
        assert_eq!(found[2].params, "{}");
    }

    #[test]
    fn test_loose_whitespace_and_multiline_payload() {
        let text = "USE_TOOL:   python  \nPARAMS:\n{\"code\": \"for i in range(2):\n    print(i)\"}";
        let found = extract(text);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].tool, "python");
        assert!(found[0].params.starts_with("{\"code\""));
        assert!(found[0].params.ends_with("print(i)\"}"));
        assert_eq!(found[0].span.end, text.len());
    }

    #[test]
    fn test_nested_braces_and_braces_in_strings() {
        let text = "USE_TOOL: python\nPARAMS: {\"code\": \"print({'a': 1})\", \"opts\": {\"v\": true}} tail";
        let found = extract(text);
        assert_eq!(
            found[0].params,
            "{\"code\": \"print({'a': 1})\", \"opts\": {\"v\": true}}"
        );
    }

    #[test]
    fn test_unbalanced_payload_stops_at_first_brace() {
        let text = "USE_TOOL: calc\nPARAMS: {\"expr\": \"2+2} trailing";
        let found = extract(text);
        assert_eq!(found[0].params, "{\"expr\": \"2+2}");
    }

    #[test]
    fn test_unclosed_payload_is_ignored() {
        assert!(extract("USE_TOOL: calc\nPARAMS: {\"expr\": \"2+2\"").is_empty());
    }
}
