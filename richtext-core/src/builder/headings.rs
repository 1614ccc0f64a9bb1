//! `h1`–`h6` sizing.

use crate::style::{FontWeight, StylePatch};

/// Size multipliers for `h1` through `h6`.
pub const HEADING_SCALES: [f32; 6] = [2.0, 1.5, 1.17, 1.0, 0.83, 0.67];

/// Level 1–6 for a heading tag name.
pub fn heading_level(tag: &str) -> Option<usize> {
    let mut digits = tag.strip_prefix('h')?.chars();
    let level = digits.next()?.to_digit(10)? as usize;
    if digits.next().is_some() {
        return None;
    }
    (1..=HEADING_SCALES.len()).contains(&level).then_some(level)
}

pub fn heading_scale(level: usize) -> f32 {
    HEADING_SCALES[level.clamp(1, HEADING_SCALES.len()) - 1]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadingContext {
    pub level: usize,
}

impl HeadingContext {
    /// Absolute size relative to `base_size`, always bold.
    pub fn intrinsic(&self, base_size: f32) -> StylePatch {
        StylePatch {
            font_size: Some(base_size * heading_scale(self.level)),
            font_weight: Some(FontWeight::Bold),
            ..StylePatch::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_heading_tags() {
        assert_eq!(heading_level("h1"), Some(1));
        assert_eq!(heading_level("h6"), Some(6));
        assert_eq!(heading_level("h7"), None);
        assert_eq!(heading_level("h0"), None);
        assert_eq!(heading_level("hr"), None);
        assert_eq!(heading_level("h01"), None);
        assert_eq!(heading_level("h+1"), None);
        assert_eq!(heading_level("h"), None);
    }

    #[test]
    fn h2_is_one_and_a_half_times_base() {
        let patch = HeadingContext { level: 2 }.intrinsic(16.0);
        assert_eq!(patch.font_size, Some(24.0));
        assert_eq!(patch.font_weight, Some(FontWeight::Bold));
    }
}
