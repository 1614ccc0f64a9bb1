//! Paragraph and run direction.
//!
//! Direction is approximated per run: the explicit host flag wins, then an
//! element's `dir` attribute, then the first character with a strong bidi
//! class. Full bidi reordering is left to the platform text engine; this
//! module only chooses the base direction, alignment and line-break
//! heuristic, and provides the isolate/override controls emitted for
//! `<bdi>` and `<bdo>`.

use serde::{Deserialize, Serialize};
use unicode_bidi::{bidi_class, BidiClass};

use crate::style::TextAlign;

pub const LRI: char = '\u{2066}';
pub const RLI: char = '\u{2067}';
pub const FSI: char = '\u{2068}';
pub const PDI: char = '\u{2069}';
pub const LRO: char = '\u{202D}';
pub const RLO: char = '\u{202E}';
pub const PDF: char = '\u{202C}';

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    #[default]
    Ltr,
    Rtl,
}

impl TextDirection {
    pub fn is_rtl(self) -> bool {
        self == TextDirection::Rtl
    }
}

/// Value of a `dir` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirAttribute {
    Ltr,
    Rtl,
    Auto,
}

impl DirAttribute {
    pub fn parse(value: &str) -> Option<DirAttribute> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ltr" => Some(DirAttribute::Ltr),
            "rtl" => Some(DirAttribute::Rtl),
            "auto" => Some(DirAttribute::Auto),
            _ => None,
        }
    }

    pub fn explicit(self) -> Option<TextDirection> {
        match self {
            DirAttribute::Ltr => Some(TextDirection::Ltr),
            DirAttribute::Rtl => Some(TextDirection::Rtl),
            DirAttribute::Auto => None,
        }
    }
}

/// Direction of the first strongly-directional character, if any.
pub fn first_strong_direction(text: &str) -> Option<TextDirection> {
    text.chars().find_map(|c| match bidi_class(c) {
        BidiClass::L => Some(TextDirection::Ltr),
        BidiClass::R | BidiClass::AL => Some(TextDirection::Rtl),
        _ => None,
    })
}

/// Effective direction of a run of text.
///
/// `explicit_rtl` is the host's RTL flag; `dir` is an element's `dir`
/// attribute. Unparseable `dir` values are treated as absent.
pub fn resolve_direction(explicit_rtl: Option<bool>, dir: Option<&str>, text: &str) -> TextDirection {
    resolve_attribute_direction(explicit_rtl, dir.and_then(DirAttribute::parse), text)
}

/// [`resolve_direction`] with an already parsed `dir` attribute.
pub fn resolve_attribute_direction(
    explicit_rtl: Option<bool>,
    dir: Option<DirAttribute>,
    text: &str,
) -> TextDirection {
    if let Some(rtl) = explicit_rtl {
        return if rtl {
            TextDirection::Rtl
        } else {
            TextDirection::Ltr
        };
    }
    if let Some(direction) = dir.and_then(DirAttribute::explicit) {
        return direction;
    }
    first_strong_direction(text).unwrap_or_default()
}

/// Whether the host flag or `dir` fixes the direction, so detection is
/// never consulted.
pub fn is_forced_direction(explicit_rtl: Option<bool>, dir: Option<DirAttribute>) -> bool {
    explicit_rtl.is_some() || dir.and_then(DirAttribute::explicit).is_some()
}

/// Alignment after mapping logical values through the paragraph direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PhysicalAlign {
    Left,
    Right,
    Center,
    Justify,
}

pub fn physical_alignment(align: TextAlign, direction: TextDirection) -> PhysicalAlign {
    let start = if direction.is_rtl() {
        PhysicalAlign::Right
    } else {
        PhysicalAlign::Left
    };
    let end = if direction.is_rtl() {
        PhysicalAlign::Left
    } else {
        PhysicalAlign::Right
    };
    match align {
        TextAlign::Auto | TextAlign::Start => start,
        TextAlign::End => end,
        TextAlign::Left => PhysicalAlign::Left,
        TextAlign::Right => PhysicalAlign::Right,
        TextAlign::Center => PhysicalAlign::Center,
        TextAlign::Justify => PhysicalAlign::Justify,
    }
}

/// Direction heuristic handed to the native line breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DirectionHeuristic {
    Ltr,
    Rtl,
    FirstStrongLtr,
    FirstStrongRtl,
}

/// Direction decisions for one paragraph, consumed by a render adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParagraphDirection {
    pub direction: TextDirection,
    pub alignment: PhysicalAlign,
    pub heuristic: DirectionHeuristic,
}

impl ParagraphDirection {
    pub fn resolve(
        explicit_rtl: Option<bool>,
        dir: Option<&str>,
        text: &str,
        align: TextAlign,
    ) -> Self {
        let dir = dir.and_then(DirAttribute::parse);
        let direction = resolve_attribute_direction(explicit_rtl, dir, text);
        Self::from_resolved(direction, is_forced_direction(explicit_rtl, dir), align)
    }

    /// Paragraph decisions for a direction the parser already resolved.
    pub fn from_resolved(direction: TextDirection, forced: bool, align: TextAlign) -> Self {
        let heuristic = match (forced, direction) {
            (true, TextDirection::Ltr) => DirectionHeuristic::Ltr,
            (true, TextDirection::Rtl) => DirectionHeuristic::Rtl,
            (false, TextDirection::Ltr) => DirectionHeuristic::FirstStrongLtr,
            (false, TextDirection::Rtl) => DirectionHeuristic::FirstStrongRtl,
        };
        Self {
            direction,
            alignment: physical_alignment(align, direction),
            heuristic,
        }
    }
}

pub fn is_bidi_control(c: char) -> bool {
    matches!(
        c,
        '\u{200E}' | '\u{200F}' | '\u{061C}' | '\u{202A}'..='\u{202E}' | '\u{2066}'..='\u{2069}'
    )
}

/// Opening control for `<bdi>`; closed by [`PDI`].
pub fn isolate_open(dir: Option<DirAttribute>) -> char {
    match dir {
        Some(DirAttribute::Ltr) => LRI,
        Some(DirAttribute::Rtl) => RLI,
        Some(DirAttribute::Auto) | None => FSI,
    }
}

/// Opening control for `<bdo>`; closed by [`PDF`]. `None` unless the
/// direction is explicit.
pub fn override_open(dir: Option<DirAttribute>) -> Option<char> {
    match dir {
        Some(DirAttribute::Ltr) => Some(LRO),
        Some(DirAttribute::Rtl) => Some(RLO),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_flag_overrides_everything() {
        assert_eq!(
            resolve_direction(Some(true), Some("ltr"), "hello"),
            TextDirection::Rtl
        );
        assert_eq!(
            resolve_direction(Some(false), Some("rtl"), "שלום"),
            TextDirection::Ltr
        );
    }

    #[test]
    fn dir_attribute_beats_detection() {
        assert_eq!(resolve_direction(None, Some("rtl"), "hello"), TextDirection::Rtl);
        assert_eq!(resolve_direction(None, Some("LTR"), "مرحبا"), TextDirection::Ltr);
    }

    #[test]
    fn auto_and_invalid_dir_fall_back_to_detection() {
        assert_eq!(resolve_direction(None, Some("auto"), "مرحبا"), TextDirection::Rtl);
        assert_eq!(resolve_direction(None, Some("sideways"), "שלום"), TextDirection::Rtl);
    }

    #[test]
    fn detection_skips_neutral_and_weak_characters() {
        assert_eq!(first_strong_direction("123, (שלום) abc"), Some(TextDirection::Rtl));
        assert_eq!(first_strong_direction("  42 hello עברית"), Some(TextDirection::Ltr));
        assert_eq!(first_strong_direction("123 !?"), None);
        assert_eq!(resolve_direction(None, None, "123 !?"), TextDirection::Ltr);
    }

    #[test]
    fn alignment_maps_logical_values() {
        assert_eq!(
            physical_alignment(TextAlign::Start, TextDirection::Rtl),
            PhysicalAlign::Right
        );
        assert_eq!(
            physical_alignment(TextAlign::End, TextDirection::Rtl),
            PhysicalAlign::Left
        );
        assert_eq!(
            physical_alignment(TextAlign::Auto, TextDirection::Ltr),
            PhysicalAlign::Left
        );
        assert_eq!(
            physical_alignment(TextAlign::Left, TextDirection::Rtl),
            PhysicalAlign::Left
        );
    }

    #[test]
    fn heuristic_is_forced_only_for_explicit_direction() {
        let forced = ParagraphDirection::resolve(Some(true), None, "abc", TextAlign::Auto);
        assert_eq!(forced.heuristic, DirectionHeuristic::Rtl);
        assert_eq!(forced.alignment, PhysicalAlign::Right);

        let detected = ParagraphDirection::resolve(None, None, "مرحبا", TextAlign::Auto);
        assert_eq!(detected.heuristic, DirectionHeuristic::FirstStrongRtl);

        let by_attr = ParagraphDirection::resolve(None, Some("ltr"), "مرحبا", TextAlign::Auto);
        assert_eq!(by_attr.heuristic, DirectionHeuristic::Ltr);
    }

    #[test]
    fn bdo_without_dir_has_no_override() {
        assert_eq!(override_open(None), None);
        assert_eq!(override_open(Some(DirAttribute::Auto)), None);
        assert_eq!(override_open(Some(DirAttribute::Rtl)), Some(RLO));
        assert_eq!(isolate_open(None), FSI);
        assert_eq!(isolate_open(Some(DirAttribute::Ltr)), LRI);
    }

    #[test]
    fn recognizes_control_characters() {
        assert!(is_bidi_control(FSI));
        assert!(is_bidi_control(PDF));
        assert!(!is_bidi_control('a'));
    }
}
