use serde::Serialize;
use std::ops::Range;

use crate::bidi::TextDirection;
use crate::error::{RichTextError, RichTextResult};
use crate::style::StyleRecord;

/// A contiguous run of text with one resolved style.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fragment {
    /// Byte range in the owning [`StyledText`].
    pub range: Range<usize>,
    pub text: String,
    pub style: StyleRecord,
}

/// Paragraph-level attribute over a range, applied by the platform as a
/// leading-margin or quote span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockSpan {
    pub range: Range<usize>,
    pub kind: BlockKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum BlockKind {
    /// A list item starting with its marker. `level` is the capped nesting
    /// level used for indentation.
    ListItem {
        level: usize,
        ordered: bool,
        marker_len: usize,
    },
    Blockquote { level: usize },
}

/// Parser output: the rendered string, its styled fragments and block spans.
///
/// Immutable once built. Transformations such as auto-linking and
/// truncation return a new value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyledText {
    text: String,
    fragments: Vec<Fragment>,
    blocks: Vec<BlockSpan>,
    direction: TextDirection,
    /// The host flag or a root `dir` attribute chose `direction`.
    #[serde(skip)]
    forced_direction: bool,
}

impl StyledText {
    pub fn empty(direction: TextDirection) -> Self {
        Self {
            text: String::new(),
            fragments: Vec::new(),
            blocks: Vec::new(),
            direction,
            forced_direction: false,
        }
    }

    /// Build from `(range, style)` runs covering `text`. Adjacent runs with
    /// equal styles are merged.
    pub(crate) fn from_runs(
        text: String,
        runs: impl IntoIterator<Item = (Range<usize>, StyleRecord)>,
        blocks: Vec<BlockSpan>,
        direction: TextDirection,
    ) -> Self {
        let mut fragments: Vec<Fragment> = Vec::new();
        for (range, style) in runs {
            if range.is_empty() {
                continue;
            }
            match fragments.last_mut() {
                Some(last) if last.style == style && last.range.end == range.start => {
                    last.range.end = range.end;
                    last.text.push_str(&text[range]);
                }
                _ => fragments.push(Fragment {
                    text: text[range.clone()].to_string(),
                    range,
                    style,
                }),
            }
        }
        Self {
            text,
            fragments,
            blocks,
            direction,
            forced_direction: false,
        }
    }

    pub(crate) fn from_fragments(
        text: String,
        fragments: Vec<Fragment>,
        blocks: Vec<BlockSpan>,
        direction: TextDirection,
    ) -> Self {
        Self {
            text,
            fragments,
            blocks,
            direction,
            forced_direction: false,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn blocks(&self) -> &[BlockSpan] {
        &self.blocks
    }

    /// Base direction of the whole text.
    pub fn direction(&self) -> TextDirection {
        self.direction
    }

    /// `false` when the direction was detected from the first strong
    /// character rather than set explicitly.
    pub fn is_direction_forced(&self) -> bool {
        self.forced_direction
    }

    pub(crate) fn with_forced_direction(mut self, forced: bool) -> Self {
        self.forced_direction = forced;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn fragment_at(&self, offset: usize) -> Option<&Fragment> {
        let idx = self
            .fragments
            .partition_point(|f| f.range.end <= offset);
        self.fragments.get(idx).filter(|f| f.range.contains(&offset))
    }

    pub fn style_at(&self, offset: usize) -> Option<&StyleRecord> {
        self.fragment_at(offset).map(|f| &f.style)
    }

    /// Text with bidi control characters removed.
    pub fn plain_text(&self) -> String {
        self.text
            .chars()
            .filter(|&c| !crate::bidi::is_bidi_control(c))
            .collect()
    }

    /// Convert a byte range of this text to UTF-16 code units, the unit
    /// native attributed-string APIs index by.
    pub fn utf16_range(&self, range: &Range<usize>) -> Range<usize> {
        let start = self.utf16_offset(range.start);
        let len: usize = self.text[range.start..range.end]
            .chars()
            .map(char::len_utf16)
            .sum();
        start..start + len
    }

    pub fn utf16_offset(&self, byte_offset: usize) -> usize {
        self.text[..byte_offset.min(self.text.len())]
            .chars()
            .map(char::len_utf16)
            .sum()
    }

    /// Check that fragments partition the text and block spans stay in
    /// bounds.
    pub fn validate(&self) -> RichTextResult<()> {
        let violation = |detail: String| Err(RichTextError::InvariantViolation { detail });

        let mut cursor = 0;
        for fragment in &self.fragments {
            if fragment.range.start != cursor {
                return violation(format!(
                    "fragment starts at {} but previous ended at {}",
                    fragment.range.start, cursor
                ));
            }
            if fragment.range.is_empty() || fragment.range.end > self.text.len() {
                return violation(format!("fragment range {:?} is invalid", fragment.range));
            }
            if !self.text.is_char_boundary(fragment.range.start)
                || !self.text.is_char_boundary(fragment.range.end)
            {
                return violation(format!(
                    "fragment range {:?} splits a character",
                    fragment.range
                ));
            }
            if self.text[fragment.range.clone()] != fragment.text {
                return violation(format!(
                    "fragment text differs from source at {:?}",
                    fragment.range
                ));
            }
            cursor = fragment.range.end;
        }
        if cursor != self.text.len() {
            return violation(format!(
                "fragments cover {} of {} bytes",
                cursor,
                self.text.len()
            ));
        }

        for block in &self.blocks {
            if block.range.start > block.range.end || block.range.end > self.text.len() {
                return violation(format!("block range {:?} is out of bounds", block.range));
            }
        }
        Ok(())
    }

    /// Copy of this text with `restyle` applied to every part of `range`.
    /// Fragments are split at the range edges and re-merged afterwards.
    pub fn restyled(&self, range: Range<usize>, restyle: impl Fn(&mut StyleRecord)) -> StyledText {
        let mut runs = Vec::with_capacity(self.fragments.len() + 2);
        for fragment in &self.fragments {
            let cuts = [
                fragment.range.start,
                range.start.clamp(fragment.range.start, fragment.range.end),
                range.end.clamp(fragment.range.start, fragment.range.end),
                fragment.range.end,
            ];
            for pair in cuts.windows(2) {
                let piece = pair[0]..pair[1];
                if piece.is_empty() {
                    continue;
                }
                let mut style = fragment.style.clone();
                if piece.start >= range.start && piece.end <= range.end {
                    restyle(&mut style);
                }
                runs.push((piece, style));
            }
        }
        StyledText::from_runs(self.text.clone(), runs, self.blocks.clone(), self.direction)
            .with_forced_direction(self.forced_direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{FontWeight, StylePatch};

    fn sample() -> StyledText {
        let plain = StyleRecord::default();
        let bold = plain.patched(&StylePatch::bold());
        StyledText::from_runs(
            "héllo world".to_string(),
            vec![(0..6, bold), (6..12, plain)],
            Vec::new(),
            TextDirection::Ltr,
        )
    }

    #[test]
    fn merges_equal_adjacent_runs() {
        let plain = StyleRecord::default();
        let text = StyledText::from_runs(
            "abc".to_string(),
            vec![(0..1, plain.clone()), (1..3, plain)],
            Vec::new(),
            TextDirection::Ltr,
        );
        assert_eq!(text.fragments().len(), 1);
        assert_eq!(text.fragments()[0].text, "abc");
    }

    #[test]
    fn fragment_lookup_by_offset() {
        let text = sample();
        assert_eq!(text.style_at(0).map(|s| s.font_weight), Some(FontWeight::Bold));
        assert_eq!(text.style_at(7).map(|s| s.font_weight), Some(FontWeight::Normal));
        assert!(text.style_at(12).is_none());
    }

    #[test]
    fn utf16_ranges_count_code_units() {
        let text = StyledText::from_runs(
            "a😀b".to_string(),
            vec![(0..6, StyleRecord::default())],
            Vec::new(),
            TextDirection::Ltr,
        );
        assert_eq!(text.utf16_range(&(1..5)), 1..3);
        assert_eq!(text.utf16_offset(5), 3);
    }

    #[test]
    fn validate_accepts_partition() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn validate_rejects_gaps() {
        let text = StyledText::from_fragments(
            "abc".to_string(),
            vec![Fragment {
                range: 1..3,
                text: "bc".to_string(),
                style: StyleRecord::default(),
            }],
            Vec::new(),
            TextDirection::Ltr,
        );
        assert!(matches!(
            text.validate(),
            Err(RichTextError::InvariantViolation { .. })
        ));
    }

    #[test]
    fn restyled_splits_and_leaves_original_untouched() {
        let original = sample();
        let linked = original.restyled(9..12, |s| s.link = Some("https://w.org".to_string()));
        assert_eq!(original.fragments().len(), 2);
        assert_eq!(linked.fragments().len(), 3);
        assert_eq!(linked.fragments()[2].text, "rld");
        assert!(linked.validate().is_ok());
    }
}
