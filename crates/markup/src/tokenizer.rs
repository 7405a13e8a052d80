//! Simplified markup tokenizer with a constrained, practical tag-name
//! character set.
//!
//! Supported tag-name characters (ASCII only): `[A-Za-z0-9:_-]`. Attribute
//! names use the same ASCII character class. Tag and attribute names are
//! emitted ASCII-lowercase.
//!
//! Known limitations (intentional):
//! - Not a full HTML5 tokenizer/state machine (no spec parse-error recovery);
//!   malformed input degrades to a best-effort token stream, never an error.
//! - Rawtext close-tag scanning for `script`/`style` accepts only ASCII
//!   whitespace before `>` (see `find_rawtext_close_tag`).
//!
//! TODO(markup/tokenizer): replace with a full HTML5 tokenizer + tree builder
//! state machine if fragment inputs outgrow this subset.

use crate::entities::decode_entities;
use dom::serialize::is_void_element;
use memchr::memchr;

const COMMENT_START: &str = "<!--";
const COMMENT_END: &str = "-->";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    Doctype(String),
    StartTag {
        name: String,
        attrs: Vec<(String, Option<String>)>,
        self_closing: bool,
    },
    EndTag(String),
    Comment(String),
    Text(String),
}

fn starts_with_ignore_ascii_case_at(haystack: &[u8], start: usize, needle: &[u8]) -> bool {
    haystack.len() >= start + needle.len()
        && haystack[start..start + needle.len()].eq_ignore_ascii_case(needle)
}

// Only matches starting at ASCII '<', which cannot appear in UTF-8
// continuation bytes.
const SCRIPT_CLOSE_TAG: &[u8] = b"</script";
const STYLE_CLOSE_TAG: &[u8] = b"</style";

fn find_rawtext_close_tag(haystack: &str, close_tag: &[u8]) -> Option<(usize, usize)> {
    let hay = haystack.as_bytes();
    let len = hay.len();
    let n = close_tag.len();
    debug_assert!(close_tag.starts_with(b"</"));
    if len < n {
        return None;
    }
    let mut i = 0;
    while i + n <= len {
        let rel = memchr(b'<', &hay[i..])?;
        i += rel;
        if i + n > len {
            return None;
        }
        if hay[i + 1] == b'/' && starts_with_ignore_ascii_case_at(hay, i, close_tag) {
            let mut k = i + n;
            while k < len && hay[k].is_ascii_whitespace() {
                k += 1;
            }
            if k < len && hay[k] == b'>' {
                return Some((i, k + 1));
            }
        }
        i += 1;
    }
    None
}

fn is_name_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'-' || c == b'_' || c == b':'
}

// Attribute names additionally allow a leading sigil so event-binding
// attributes (`@click`) survive tokenization.
fn is_attr_name_char(c: u8) -> bool {
    is_name_char(c) || c == b'@'
}

/// Tokenize a markup string. Never fails; unparseable stretches fall back to
/// text.
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut out = Vec::new();
    let bytes = input.as_bytes();
    let mut i = 0;
    // We scan by byte, but slice endpoints are always UTF-8 char boundaries:
    // cuts happen only at ASCII structural bytes or after ASCII-only tokens.
    while i < bytes.len() {
        if bytes[i] != b'<' {
            let start = i;
            i += memchr(b'<', &bytes[i..]).unwrap_or(bytes.len() - i);
            let decoded = decode_entities(&input[start..i]);
            if !decoded.is_empty() {
                out.push(Token::Text(decoded));
            }
            continue;
        }

        if input[i..].starts_with(COMMENT_START) {
            let body_start = i + COMMENT_START.len();
            match input[body_start..].find(COMMENT_END) {
                Some(end) => {
                    out.push(Token::Comment(input[body_start..body_start + end].to_string()));
                    i = body_start + end + COMMENT_END.len();
                    continue;
                }
                None => {
                    out.push(Token::Comment(input[body_start..].to_string()));
                    break;
                }
            }
        }

        if starts_with_ignore_ascii_case_at(bytes, i, b"<!doctype") {
            let rest = &input[i + 2..];
            match rest.find('>') {
                Some(end) => {
                    out.push(Token::Doctype(rest[..end].trim().to_string()));
                    i += 2 + end + 1;
                    continue;
                }
                None => break,
            }
        }

        // End tag.
        if i + 2 <= bytes.len() && bytes[i + 1] == b'/' {
            let start = i + 2;
            let mut j = start;
            while j < bytes.len() && is_name_char(bytes[j]) {
                j += 1;
            }
            let name = input[start..j].to_ascii_lowercase();
            while j < bytes.len() && bytes[j] != b'>' {
                j += 1;
            }
            if j < bytes.len() {
                j += 1;
            }
            out.push(Token::EndTag(name));
            i = j;
            continue;
        }

        // Start tag.
        let start = i + 1;
        let mut j = start;
        while j < bytes.len() && is_name_char(bytes[j]) {
            j += 1;
        }
        if j == start {
            // Stray '<' with no name: treat it as text.
            out.push(Token::Text("<".to_string()));
            i += 1;
            continue;
        }
        let name = input[start..j].to_ascii_lowercase();
        let len = bytes.len();
        let mut k = j;
        let mut attrs: Vec<(String, Option<String>)> = Vec::new();
        let mut self_closing = false;

        let skip_whitespace = |k: &mut usize| {
            while *k < len && bytes[*k].is_ascii_whitespace() {
                *k += 1;
            }
        };

        loop {
            skip_whitespace(&mut k);
            if k >= len {
                break;
            }
            if bytes[k] == b'>' {
                k += 1;
                break;
            }
            if bytes[k] == b'/' {
                if k + 1 < len && bytes[k + 1] == b'>' {
                    self_closing = true;
                    k += 2;
                    break;
                }
                k += 1;
                continue;
            }
            let name_start = k;
            while k < len && is_attr_name_char(bytes[k]) {
                k += 1;
            }
            if name_start == k {
                k += 1;
                continue;
            }
            let attr_name = input[name_start..k].to_ascii_lowercase();

            skip_whitespace(&mut k);
            let value: Option<String>;
            if k < len && bytes[k] == b'=' {
                k += 1;
                skip_whitespace(&mut k);
                if k < len && (bytes[k] == b'"' || bytes[k] == b'\'') {
                    let quote = bytes[k];
                    k += 1;
                    let vstart = k;
                    while k < len && bytes[k] != quote {
                        k += 1;
                    }
                    value = Some(decode_entities(&input[vstart..k]));
                    if k < len {
                        k += 1;
                    }
                } else {
                    let vstart = k;
                    while k < len && !bytes[k].is_ascii_whitespace() && bytes[k] != b'>' {
                        if bytes[k] == b'/' && k + 1 < len && bytes[k + 1] == b'>' {
                            break;
                        }
                        k += 1;
                    }
                    value = Some(input[vstart..k].to_string());
                }
            } else {
                value = None;
            }
            attrs.push((attr_name, value));
        }

        if is_void_element(&name) {
            self_closing = true;
        }
        let content_start = k;
        let rawtext = (name == "script" || name == "style") && !self_closing;
        out.push(Token::StartTag {
            name: name.clone(),
            attrs,
            self_closing,
        });

        if rawtext {
            let close_tag = if name == "script" {
                SCRIPT_CLOSE_TAG
            } else {
                STYLE_CLOSE_TAG
            };
            match find_rawtext_close_tag(&input[content_start..], close_tag) {
                Some((rel_start, rel_end)) => {
                    let raw = &input[content_start..content_start + rel_start];
                    if !raw.is_empty() {
                        out.push(Token::Text(raw.to_string()));
                    }
                    out.push(Token::EndTag(name));
                    i = content_start + rel_end;
                }
                None => {
                    // Missing close tag: emit an implicit end tag and treat
                    // the remainder as rawtext content.
                    let raw = &input[content_start..];
                    if !raw.is_empty() {
                        out.push(Token::Text(raw.to_string()));
                    }
                    out.push(Token::EndTag(name));
                    break;
                }
            }
            continue;
        }

        i = content_start;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_preserves_utf8_text_nodes() {
        let tokens = tokenize("<p>120×32</p>");
        assert!(
            tokens.iter().any(|t| matches!(t, Token::Text(s) if s == "120×32")),
            "expected UTF-8 text token, got: {tokens:?}"
        );
    }

    #[test]
    fn tokenize_lowercases_tag_and_attribute_names() {
        let tokens = tokenize("<DiV ID=\"x\"></DIV>");
        assert_eq!(
            tokens,
            vec![
                Token::StartTag {
                    name: "div".to_string(),
                    attrs: vec![("id".to_string(), Some("x".to_string()))],
                    self_closing: false,
                },
                Token::EndTag("div".to_string()),
            ]
        );
    }

    #[test]
    fn tokenize_handles_unquoted_and_bare_attributes() {
        let tokens = tokenize("<input type=text disabled>");
        assert!(
            matches!(
                &tokens[..],
                [Token::StartTag { name, attrs, self_closing: true }]
                    if name == "input"
                        && attrs[0] == ("type".to_string(), Some("text".to_string()))
                        && attrs[1] == ("disabled".to_string(), None)
            ),
            "expected void start tag with two attrs, got: {tokens:?}"
        );
    }

    #[test]
    fn tokenize_finds_script_end_tag_case_insensitive() {
        let tokens = tokenize("<script>let x = 1;</ScRiPt>");
        assert_eq!(
            tokens,
            vec![
                Token::StartTag {
                    name: "script".to_string(),
                    attrs: vec![],
                    self_closing: false,
                },
                Token::Text("let x = 1;".to_string()),
                Token::EndTag("script".to_string()),
            ]
        );
    }

    #[test]
    fn rawtext_close_tag_does_not_accept_near_matches() {
        let tokens = tokenize("<script>ok</scriptx >no</script >");
        assert!(
            matches!(
                &tokens[..],
                [Token::StartTag { .. }, Token::Text(body), Token::EndTag(end)]
                    if body == "ok</scriptx >no" && end == "script"
            ),
            "expected near-match not to close rawtext, got: {tokens:?}"
        );
    }

    #[test]
    fn tokenize_handles_rawtext_without_close_tag() {
        let tokens = tokenize("<style>body{}");
        assert!(
            matches!(
                &tokens[..],
                [Token::StartTag { .. }, Token::Text(body), Token::EndTag(end)]
                    if body == "body{}" && end == "style"
            ),
            "expected implicit end tag for unterminated rawtext, got: {tokens:?}"
        );
    }

    #[test]
    fn tokenize_decodes_entities_in_text_and_quoted_values() {
        let tokens = tokenize("<a title=\"a &amp; b\">x &lt; y</a>");
        assert!(tokens.iter().any(
            |t| matches!(t, Token::StartTag { attrs, .. } if attrs[0].1.as_deref() == Some("a & b"))
        ));
        assert!(
            tokens
                .iter()
                .any(|t| matches!(t, Token::Text(s) if s == "x < y"))
        );
    }

    #[test]
    fn tokenize_handles_comments_and_doctype() {
        let tokens = tokenize("<!DOCTYPE html><!--note--><p></p>");
        assert_eq!(tokens[0], Token::Doctype("DOCTYPE html".to_string()));
        assert_eq!(tokens[1], Token::Comment("note".to_string()));
    }

    #[test]
    fn tokenize_treats_stray_angle_bracket_as_text() {
        let tokens = tokenize("a < b");
        assert_eq!(
            tokens,
            vec![Token::Text("a ".to_string()), Token::Text("<".to_string()), Token::Text(" b".to_string())]
        );
    }

    #[test]
    fn tokenize_keeps_event_binding_attributes() {
        let tokens = tokenize("<button @click=\"save\">go</button>");
        assert!(
            matches!(
                &tokens[0],
                Token::StartTag { attrs, .. }
                    if attrs[0] == ("@click".to_string(), Some("save".to_string()))
            ),
            "expected the @click attribute to survive, got: {tokens:?}"
        );
    }

    #[test]
    fn tokenize_allows_custom_element_and_prefixed_tags() {
        let tokens = tokenize("<my-widget></my-widget><svg:rect/>");
        assert!(matches!(&tokens[0], Token::StartTag { name, .. } if name == "my-widget"));
        assert!(
            matches!(&tokens[2], Token::StartTag { name, self_closing: true, .. } if name == "svg:rect")
        );
    }
}
