use serde::de::{Deserializer, IgnoredAny};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::color::Color;
use crate::style::{FontStyle, FontWeight, StylePatch, TextDecoration};

/// Tags that share an override entry when only one spelling is configured.
const TAG_ALIASES: &[(&str, &str)] = &[
    ("strong", "b"),
    ("b", "strong"),
    ("em", "i"),
    ("i", "em"),
    ("del", "s"),
    ("s", "del"),
];

/// User-supplied style for one tag.
///
/// Deserialization is fail-soft: unknown keys are ignored and values that
/// fail to parse leave their property unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<FontWeight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_style: Option<FontStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_decoration_line: Option<TextDecoration>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
    Number(f64),
    Text(String),
    Other(IgnoredAny),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTagStyle {
    Map(BTreeMap<String, RawValue>),
    Other(IgnoredAny),
}

impl TagStyle {
    pub fn is_empty(&self) -> bool {
        *self == TagStyle::default()
    }

    /// Decoration only ever turns flags on, so the patch cannot strip a
    /// decoration that an enclosing element applied.
    pub fn to_patch(&self) -> StylePatch {
        StylePatch {
            font_weight: self.font_weight,
            font_style: self.font_style,
            font_size: self.font_size,
            color: self.color,
            underline: self
                .text_decoration_line
                .filter(|d| d.has_underline())
                .map(|_| true),
            line_through: self
                .text_decoration_line
                .filter(|d| d.has_line_through())
                .map(|_| true),
            ..StylePatch::default()
        }
    }

    fn from_raw(raw: BTreeMap<String, RawValue>) -> Self {
        let mut style = TagStyle::default();
        for (key, value) in raw {
            let applied = match key.as_str() {
                "color" => text(&value)
                    .and_then(Color::parse)
                    .map(|c| style.color = Some(c)),
                "fontSize" => parse_font_size(&value).map(|s| style.font_size = Some(s)),
                "fontWeight" => match &value {
                    RawValue::Number(n) => FontWeight::parse(&n.to_string()),
                    RawValue::Text(s) => FontWeight::parse(s),
                    RawValue::Other(_) => None,
                }
                .map(|w| style.font_weight = Some(w)),
                "fontStyle" => text(&value)
                    .and_then(FontStyle::parse)
                    .map(|s| style.font_style = Some(s)),
                "textDecorationLine" => text(&value)
                    .and_then(TextDecoration::parse)
                    .map(|d| style.text_decoration_line = Some(d)),
                other => {
                    tracing::debug!(key = other, "ignoring unknown tag style key");
                    continue;
                }
            };
            if applied.is_none() {
                tracing::debug!(key = key.as_str(), "ignoring invalid tag style value");
            }
        }
        style
    }
}

fn text(value: &RawValue) -> Option<&str> {
    match value {
        RawValue::Text(s) => Some(s.as_str()),
        _ => None,
    }
}

fn parse_font_size(value: &RawValue) -> Option<f32> {
    let size = match value {
        RawValue::Number(n) => *n,
        RawValue::Text(s) => s.trim().trim_end_matches("px").trim().parse::<f64>().ok()?,
        RawValue::Other(_) => return None,
    };
    (size.is_finite() && size > 0.0).then_some(size as f32)
}

impl<'de> Deserialize<'de> for TagStyle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawTagStyle::deserialize(deserializer)? {
            RawTagStyle::Map(raw) => TagStyle::from_raw(raw),
            RawTagStyle::Other(_) => TagStyle::default(),
        })
    }
}

/// Tag name → style override. Tag names are matched lowercase.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagStyles(HashMap<String, TagStyle>);

impl TagStyles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, tag: &str, style: TagStyle) -> Self {
        self.insert(tag, style);
        self
    }

    pub fn insert(&mut self, tag: &str, style: TagStyle) {
        self.0.insert(tag.to_ascii_lowercase(), style);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Look up the override for `tag`, falling back to its alias
    /// (`strong` ↔ `b`, `em` ↔ `i`, `del` ↔ `s`).
    pub fn resolve(&self, tag: &str) -> Option<&TagStyle> {
        if let Some(style) = self.lookup(tag) {
            return Some(style);
        }
        TAG_ALIASES
            .iter()
            .find(|(name, _)| *name == tag)
            .and_then(|(_, alias)| self.lookup(alias))
    }

    fn lookup(&self, tag: &str) -> Option<&TagStyle> {
        self.0
            .get(tag)
            .or_else(|| {
                self.0
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(tag))
                    .map(|(_, v)| v)
            })
            .filter(|style| !style.is_empty())
    }
}
