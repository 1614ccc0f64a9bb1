use serde::{Deserialize, Serialize};

use crate::bidi::TextDirection;
use crate::color::Color;
use crate::overrides::TagStyle;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "WeightRepr")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WeightRepr {
    Number(u16),
    Named(String),
}

impl TryFrom<WeightRepr> for FontWeight {
    type Error = String;

    fn try_from(repr: WeightRepr) -> Result<Self, Self::Error> {
        match repr {
            WeightRepr::Number(n) => FontWeight::from_numeric(n)
                .ok_or_else(|| format!("expected 100-900, got {}", n)),
            WeightRepr::Named(s) => FontWeight::parse(&s)
                .ok_or_else(|| format!("expected 100-900 or 'normal'/'bold', got '{}'", s)),
        }
    }
}

impl FontWeight {
    /// Parse `normal`, `bold` or a numeric weight. Weights of 600 and above
    /// render bold.
    pub fn parse(s: &str) -> Option<FontWeight> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Some(FontWeight::Normal),
            "bold" => Some(FontWeight::Bold),
            other => other.parse::<u16>().ok().and_then(FontWeight::from_numeric),
        }
    }

    fn from_numeric(n: u16) -> Option<FontWeight> {
        match n {
            100..=599 => Some(FontWeight::Normal),
            600..=1000 => Some(FontWeight::Bold),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

impl FontStyle {
    pub fn parse(s: &str) -> Option<FontStyle> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Some(FontStyle::Normal),
            "italic" => Some(FontStyle::Italic),
            _ => None,
        }
    }
}

/// Decoration line. Underline and line-through combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextDecoration {
    #[default]
    None,
    Underline,
    LineThrough,
    #[serde(rename = "underline line-through")]
    UnderlineLineThrough,
}

impl TextDecoration {
    pub fn from_flags(underline: bool, line_through: bool) -> Self {
        match (underline, line_through) {
            (false, false) => TextDecoration::None,
            (true, false) => TextDecoration::Underline,
            (false, true) => TextDecoration::LineThrough,
            (true, true) => TextDecoration::UnderlineLineThrough,
        }
    }

    pub fn has_underline(self) -> bool {
        matches!(
            self,
            TextDecoration::Underline | TextDecoration::UnderlineLineThrough
        )
    }

    pub fn has_line_through(self) -> bool {
        matches!(
            self,
            TextDecoration::LineThrough | TextDecoration::UnderlineLineThrough
        )
    }

    /// Parse a `textDecorationLine` value. Tokens may appear in any order.
    pub fn parse(s: &str) -> Option<TextDecoration> {
        let mut underline = false;
        let mut line_through = false;
        for token in s.split_whitespace() {
            match token.to_ascii_lowercase().as_str() {
                "none" => {}
                "underline" => underline = true,
                "line-through" | "strikethrough" => line_through = true,
                _ => return None,
            }
        }
        if s.trim().is_empty() {
            return None;
        }
        Some(TextDecoration::from_flags(underline, line_through))
    }
}

/// Logical or physical paragraph alignment as supplied by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Auto,
    Start,
    End,
    Left,
    Right,
    Center,
    Justify,
}

/// Fully resolved style of a fragment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleRecord {
    pub font_weight: FontWeight,
    pub font_style: FontStyle,
    pub font_size: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    pub text_decoration: TextDecoration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<TextDirection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f32>,
}

impl Default for StyleRecord {
    fn default() -> Self {
        Self {
            font_weight: FontWeight::Normal,
            font_style: FontStyle::Normal,
            font_size: 14.0,
            color: None,
            text_decoration: TextDecoration::None,
            link: None,
            direction: None,
            font_family: None,
            letter_spacing: None,
            line_height: None,
        }
    }
}

impl StyleRecord {
    pub fn is_bold(&self) -> bool {
        self.font_weight == FontWeight::Bold
    }

    pub fn is_italic(&self) -> bool {
        self.font_style == FontStyle::Italic
    }

    /// Layer `patch` over this record. Unset patch fields leave the record
    /// untouched; decoration flags are merged individually.
    pub fn apply(&mut self, patch: &StylePatch) {
        if let Some(weight) = patch.font_weight {
            self.font_weight = weight;
        }
        if let Some(style) = patch.font_style {
            self.font_style = style;
        }
        if let Some(size) = patch.font_size {
            self.font_size = size;
        }
        if let Some(color) = patch.color {
            self.color = Some(color);
        }
        if patch.underline.is_some() || patch.line_through.is_some() {
            let underline = patch
                .underline
                .unwrap_or(self.text_decoration.has_underline());
            let line_through = patch
                .line_through
                .unwrap_or(self.text_decoration.has_line_through());
            self.text_decoration = TextDecoration::from_flags(underline, line_through);
        }
        if let Some(link) = &patch.link {
            self.link = Some(link.clone());
        }
        if let Some(direction) = patch.direction {
            self.direction = Some(direction);
        }
        if let Some(family) = &patch.font_family {
            self.font_family = Some(family.clone());
        }
    }

    pub fn patched(&self, patch: &StylePatch) -> StyleRecord {
        let mut record = self.clone();
        record.apply(patch);
        record
    }
}

/// A partial style layered over a text range.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StylePatch {
    pub font_weight: Option<FontWeight>,
    pub font_style: Option<FontStyle>,
    pub font_size: Option<f32>,
    pub color: Option<Color>,
    pub underline: Option<bool>,
    pub line_through: Option<bool>,
    pub link: Option<String>,
    pub direction: Option<TextDirection>,
    pub font_family: Option<String>,
}

impl StylePatch {
    pub fn bold() -> Self {
        Self {
            font_weight: Some(FontWeight::Bold),
            ..Self::default()
        }
    }

    pub fn italic() -> Self {
        Self {
            font_style: Some(FontStyle::Italic),
            ..Self::default()
        }
    }

    pub fn underline() -> Self {
        Self {
            underline: Some(true),
            ..Self::default()
        }
    }

    pub fn line_through() -> Self {
        Self {
            line_through: Some(true),
            ..Self::default()
        }
    }

    pub fn direction(direction: TextDirection) -> Self {
        Self {
            direction: Some(direction),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == StylePatch::default()
    }

    /// Fields set in `over` replace the ones in `self`.
    pub fn merge(&self, over: &StylePatch) -> StylePatch {
        StylePatch {
            font_weight: over.font_weight.or(self.font_weight),
            font_style: over.font_style.or(self.font_style),
            font_size: over.font_size.or(self.font_size),
            color: over.color.or(self.color),
            underline: over.underline.or(self.underline),
            line_through: over.line_through.or(self.line_through),
            link: over.link.clone().or_else(|| self.link.clone()),
            direction: over.direction.or(self.direction),
            font_family: over.font_family.clone().or_else(|| self.font_family.clone()),
        }
    }
}

/// Merge a tag's intrinsic style with the user override for that tag.
///
/// The override only replaces the properties it names; everything else in
/// `intrinsic` survives. A decoration override replaces the tag's own
/// decoration but leaves unset flags to enclosing elements.
pub fn resolve(intrinsic: &StylePatch, tag_override: Option<&TagStyle>) -> StylePatch {
    let Some(style) = tag_override else {
        return intrinsic.clone();
    };
    let mut own = intrinsic.clone();
    if style.text_decoration_line.is_some() {
        own.underline = None;
        own.line_through = None;
    }
    own.merge(&style.to_patch())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn font_weight_parses_names_and_numbers() {
        assert_eq!(FontWeight::parse("bold"), Some(FontWeight::Bold));
        assert_eq!(FontWeight::parse("700"), Some(FontWeight::Bold));
        assert_eq!(FontWeight::parse("400"), Some(FontWeight::Normal));
        assert_eq!(FontWeight::parse("heavy"), None);
        assert_eq!(FontWeight::parse("50"), None);
    }

    #[test]
    fn decoration_parses_combined_tokens() {
        assert_eq!(
            TextDecoration::parse("line-through underline"),
            Some(TextDecoration::UnderlineLineThrough)
        );
        assert_eq!(TextDecoration::parse("none"), Some(TextDecoration::None));
        assert_eq!(TextDecoration::parse("wavy"), None);
        assert_eq!(TextDecoration::parse(""), None);
    }

    #[test]
    fn decoration_flags_are_additive() {
        let mut record = StyleRecord::default();
        record.apply(&StylePatch::underline());
        record.apply(&StylePatch::line_through());
        assert_eq!(record.text_decoration, TextDecoration::UnderlineLineThrough);
    }

    #[test]
    fn weight_and_style_are_independent() {
        let record = StyleRecord::default()
            .patched(&StylePatch::bold())
            .patched(&StylePatch::italic())
            .patched(&StylePatch::underline());
        assert!(record.is_bold());
        assert!(record.is_italic());
        assert!(record.text_decoration.has_underline());
    }

    #[test]
    fn resolve_keeps_intrinsic_properties_the_override_does_not_name() {
        let tag_style = TagStyle {
            color: Color::parse("#FF0000"),
            ..TagStyle::default()
        };
        let patch = resolve(&StylePatch::bold(), Some(&tag_style));
        assert_eq!(patch.font_weight, Some(FontWeight::Bold));
        assert_eq!(patch.color, Some(Color::rgb(255, 0, 0)));
    }

    #[test]
    fn resolve_override_replaces_named_property() {
        let tag_style = TagStyle {
            font_weight: Some(FontWeight::Normal),
            ..TagStyle::default()
        };
        let patch = resolve(&StylePatch::bold(), Some(&tag_style));
        assert_eq!(patch.font_weight, Some(FontWeight::Normal));
    }

    #[test]
    fn decoration_override_replaces_only_the_tags_own_decoration() {
        let none = TagStyle {
            text_decoration_line: Some(TextDecoration::None),
            ..TagStyle::default()
        };
        let patch = resolve(&StylePatch::underline(), Some(&none));
        assert_eq!(patch.underline, None);
        assert_eq!(patch.line_through, None);

        let strike = TagStyle {
            text_decoration_line: Some(TextDecoration::LineThrough),
            ..TagStyle::default()
        };
        let patch = resolve(&StylePatch::underline(), Some(&strike));
        assert_eq!(patch.underline, None);
        assert_eq!(patch.line_through, Some(true));

        let outer = StyleRecord::default().patched(&StylePatch::line_through());
        let record = outer.patched(&resolve(&StylePatch::underline(), Some(&none)));
        assert!(record.text_decoration.has_line_through());
    }

    #[test]
    fn empty_patch_is_identity() {
        let record = StyleRecord::default();
        assert_eq!(record.patched(&StylePatch::default()), record);
    }
}
