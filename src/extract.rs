//! Pull the useful payload out of a raw model completion.
//!
//! The first fenced block wins. A block's language comes from the info string
//! on its opening fence line, never from the first line of the code itself.

const FENCE: &str = "```";

/// Payload extracted from a completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    /// Language tag of the fenced block, if it carried one.
    pub language: Option<String>,
    /// Fenced content (or the whole response when unfenced), trimmed.
    pub body: String,
}

impl Extracted {
    /// Whether nothing usable was extracted.
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Extract the first fenced block from `response`.
///
/// An opening fence with no closing fence takes everything after it.
/// Without any fence the whole trimmed response is returned.
pub fn extract(response: &str) -> Extracted {
    let Some(open) = response.find(FENCE) else {
        return Extracted {
            language: None,
            body: response.trim().to_string(),
        };
    };

    let after = &response[open + FENCE.len()..];
    let inner = match after.find(FENCE) {
        Some(close) => &after[..close],
        None => after,
    };

    if let Some((info, rest)) = inner.split_once('\n') {
        let info = info.trim();
        if is_language_tag(info) {
            return Extracted {
                language: Some(info.to_string()),
                body: rest.trim().to_string(),
            };
        }
    }

    Extracted {
        language: None,
        body: inner.trim().to_string(),
    }
}

/// A single bare word such as `python`, `c++`, `objective-c` or `c#`.
fn is_language_tag(info: &str) -> bool {
    !info.is_empty()
        && info
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '#' | '-' | '_' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_fenced_block() {
        let response = "Here you go:\n```\n  fn main() {}\n```\nEnjoy!";
        let extracted = extract(response);
        assert_eq!(extracted.body, "fn main() {}");
        assert_eq!(extracted.language, None);
    }

    #[test]
    fn test_language_tag_is_read_from_fence() {
        let response = "```python\ndef add(a, b):\n    return a + b\n```";
        let extracted = extract(response);
        assert_eq!(extracted.language.as_deref(), Some("python"));
        assert_eq!(extracted.body, "def add(a, b):\n    return a + b");
    }

    #[test]
    fn test_no_fence_returns_trimmed_response() {
        let extracted = extract("\n\n  print('hi')  \n");
        assert_eq!(extracted.body, "print('hi')");
        assert_eq!(extracted.language, None);
    }

    #[test]
    fn test_first_block_wins() {
        let response = "```c\nint a;\n```\ntext\n```js\nlet b;\n```";
        let extracted = extract(response);
        assert_eq!(extracted.language.as_deref(), Some("c"));
        assert_eq!(extracted.body, "int a;");
    }

    #[test]
    fn test_unterminated_fence_takes_rest() {
        let extracted = extract("Sure:\n```rust\nfn f() {}\n");
        assert_eq!(extracted.language.as_deref(), Some("rust"));
        assert_eq!(extracted.body, "fn f() {}");
    }

    #[test]
    fn test_code_on_fence_line_is_not_a_tag() {
        let extracted = extract("```x = 1\ny = 2```");
        assert_eq!(extracted.language, None);
        assert_eq!(extracted.body, "x = 1\ny = 2");
    }

    #[test]
    fn test_first_code_line_is_never_a_tag() {
        // The word on the first line inside the block stays part of the code.
        let extracted = extract("```\nimport os\n```");
        assert_eq!(extracted.language, None);
        assert_eq!(extracted.body, "import os");
    }

    #[test]
    fn test_inline_fence_without_newline() {
        let extracted = extract("```ls -la```");
        assert_eq!(extracted.language, None);
        assert_eq!(extracted.body, "ls -la");
    }

    #[test]
    fn test_symbolic_tags() {
        assert!(is_language_tag("c++"));
        assert!(is_language_tag("c#"));
        assert!(is_language_tag("objective-c"));
        assert!(!is_language_tag("two words"));
        assert!(!is_language_tag(""));
    }

    #[test]
    fn test_empty_block() {
        assert!(extract("```\n```").is_empty());
    }
}
