//! `<a href>` handling and the URL scheme allowlist.

use crate::color::LINK_BLUE;
use crate::style::StylePatch;

const ALLOWED_SCHEMES: &[&str] = &["http", "https", "mailto", "tel"];

/// An accepted link waiting for its close tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkContext {
    pub href: String,
}

impl LinkContext {
    /// `None` when the href is empty or its scheme is not allowed.
    pub fn from_href(href: &str) -> Option<LinkContext> {
        let href = strip_controls(href);
        is_allowed_cleaned(&href).then_some(LinkContext { href })
    }

    /// Link blue, underlined, carrying the target.
    pub fn intrinsic(&self) -> StylePatch {
        StylePatch {
            color: Some(LINK_BLUE),
            underline: Some(true),
            link: Some(self.href.clone()),
            ..StylePatch::default()
        }
    }
}

/// Whether `href` may become a link: an allowed scheme, or no scheme at all
/// (relative path, `//host`, `#fragment`).
pub fn is_allowed_href(href: &str) -> bool {
    is_allowed_cleaned(&strip_controls(href))
}

fn strip_controls(href: &str) -> String {
    href.chars()
        .filter(|c| !(c.is_ascii_whitespace() || c.is_ascii_control()))
        .collect()
}

fn is_allowed_cleaned(href: &str) -> bool {
    if href.is_empty() {
        return false;
    }
    match scheme(href) {
        Some(scheme) => ALLOWED_SCHEMES
            .iter()
            .any(|allowed| scheme.eq_ignore_ascii_case(allowed)),
        None => true,
    }
}

/// The URL scheme, if `href` has one. A `:` after `/`, `?` or `#` belongs
/// to the path, not a scheme.
fn scheme(href: &str) -> Option<&str> {
    let colon = href.find(':')?;
    let candidate = &href[..colon];
    let mut chars = candidate.chars();
    let first = chars.next()?;
    let valid = first.is_ascii_alphabetic()
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_listed_schemes() {
        assert!(is_allowed_href("https://example.com"));
        assert!(is_allowed_href("HTTP://example.com"));
        assert!(is_allowed_href("mailto:ann@example.org"));
        assert!(is_allowed_href("tel:+15551234567"));
    }

    #[test]
    fn allows_scheme_less_targets() {
        assert!(is_allowed_href("/docs/intro"));
        assert!(is_allowed_href("//cdn.example.com/x"));
        assert!(is_allowed_href("#section-2"));
        assert!(is_allowed_href("page.html?a=b:c"));
    }

    #[test]
    fn rejects_script_and_data_schemes() {
        assert!(!is_allowed_href("javascript:alert(1)"));
        assert!(!is_allowed_href("JavaScript:alert(1)"));
        assert!(!is_allowed_href("data:text/html;base64,AAAA"));
        assert!(!is_allowed_href("vbscript:msgbox"));
    }

    #[test]
    fn strips_whitespace_and_controls_before_checking() {
        assert!(!is_allowed_href(" java\tscript:alert(1)"));
        assert!(!is_allowed_href("java\u{0}script:alert(1)"));
        assert_eq!(
            LinkContext::from_href("  https://example.com \n").map(|l| l.href),
            Some("https://example.com".to_string())
        );
    }

    #[test]
    fn rejects_empty() {
        assert!(!is_allowed_href(""));
        assert!(!is_allowed_href(" \t "));
    }
}
