//! Auto-link detection over already parsed text.
//!
//! Detection never mutates its input: it returns a new [`StyledText`] with
//! link styling on matches that are not already part of a link, so calling
//! it repeatedly cannot stack duplicate links.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::sync::OnceLock;

use crate::color::LINK_BLUE;
use crate::styled_text::StyledText;
use crate::style::TextDecoration;

/// Which kinds of plain-text links to detect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LinkDetection {
    pub web_urls: bool,
    pub emails: bool,
    pub phone_numbers: bool,
}

impl LinkDetection {
    pub fn all() -> Self {
        Self {
            web_urls: true,
            emails: true,
            phone_numbers: true,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.web_urls || self.emails || self.phone_numbers
    }
}

fn url_regex() -> &'static Regex {
    static URL_REGEX: OnceLock<Regex> = OnceLock::new();
    URL_REGEX.get_or_init(|| {
        Regex::new(r"(?i)\b(?:https?://|www\.)[^\s<>]*[^\s<>.,;:!?)\]'\x22]").unwrap()
    })
}

fn email_regex() -> &'static Regex {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap()
    })
}

fn phone_regex() -> &'static Regex {
    static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();
    PHONE_REGEX.get_or_init(|| {
        Regex::new(r"(?:\+\d{1,3}[\s.-]?)?(?:\(\d{2,4}\)[\s.-]?|\d{2,4}[\s.-])?\d{3,4}[\s.-]?\d{4}\b")
            .unwrap()
    })
}

/// A detected link: where it is and the URL it opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedLink {
    pub range: Range<usize>,
    pub url: String,
}

/// Find links in `text` according to `detection`. Overlapping matches keep
/// the earliest (then longest) one.
pub fn detect(text: &str, detection: LinkDetection) -> Vec<DetectedLink> {
    let mut found: Vec<DetectedLink> = Vec::new();
    if detection.web_urls {
        found.extend(url_regex().find_iter(text).map(|m| {
            let s = m.as_str();
            let url = if s.to_ascii_lowercase().starts_with("www.") {
                format!("https://{}", s)
            } else {
                s.to_string()
            };
            DetectedLink {
                range: m.range(),
                url,
            }
        }));
    }
    if detection.emails {
        found.extend(email_regex().find_iter(text).map(|m| DetectedLink {
            range: m.range(),
            url: format!("mailto:{}", m.as_str()),
        }));
    }
    if detection.phone_numbers {
        found.extend(phone_regex().find_iter(text).map(|m| DetectedLink {
            range: m.range(),
            url: format!(
                "tel:{}",
                m.as_str()
                    .chars()
                    .filter(|c| c.is_ascii_digit() || *c == '+')
                    .collect::<String>()
            ),
        }));
    }

    found.sort_by(|a, b| {
        a.range
            .start
            .cmp(&b.range.start)
            .then(b.range.end.cmp(&a.range.end))
    });
    let mut kept: Vec<DetectedLink> = Vec::with_capacity(found.len());
    for link in found {
        if kept.last().is_some_and(|prev| link.range.start < prev.range.end) {
            continue;
        }
        kept.push(link);
    }
    kept
}

/// Copy of `styled` with detected links styled and attached. Matches that
/// touch an existing link are skipped.
pub fn linkify(styled: &StyledText, detection: LinkDetection) -> StyledText {
    if !detection.is_enabled() {
        return styled.clone();
    }

    let mut result = styled.clone();
    for link in detect(styled.text(), detection) {
        let overlaps_link = styled
            .fragments()
            .iter()
            .any(|f| f.style.link.is_some() && f.range.start < link.range.end && link.range.start < f.range.end);
        if overlaps_link {
            continue;
        }
        let url = link.url;
        result = result.restyled(link.range, |style| {
            style.link = Some(url.clone());
            style.color = Some(LINK_BLUE);
            style.text_decoration =
                TextDecoration::from_flags(true, style.text_decoration.has_line_through());
        });
    }
    result
}
