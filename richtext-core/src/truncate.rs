//! Word-boundary truncation with a styled ellipsis.
//!
//! Works on a laid-out paragraph: everything before the last visible line is
//! kept as is, and the last visible line is refilled from the remaining text
//! so that it ends with an ellipsis without splitting a word.

use unicode_segmentation::UnicodeSegmentation;

use crate::layout::{ParagraphLayout, TextMeasure};
use crate::style::StyleRecord;
use crate::styled_text::{BlockSpan, Fragment, StyledText};

pub const ELLIPSIS: char = '\u{2026}';

#[derive(Debug, Clone, PartialEq)]
pub enum Truncation {
    /// No layout yet. Render the full text and retry after layout.
    Deferred,
    /// The text fits in the allowed lines.
    Unchanged,
    Truncated(TruncationResult),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TruncationResult {
    /// Bytes of source text kept, excluding the ellipsis.
    pub visible_len: usize,
    /// Cut offset in the source text before word-boundary correction.
    pub raw_cut: usize,
    /// Cut offset after word-boundary correction. Never past `raw_cut`.
    pub cut: usize,
    /// The truncated text. When an ellipsis was added it is the last
    /// fragment.
    pub text: StyledText,
}

impl TruncationResult {
    pub fn ellipsis(&self) -> Option<&Fragment> {
        self.text
            .fragments()
            .last()
            .filter(|f| f.range.start >= self.visible_len)
    }
}

fn is_word_char(c: Option<char>) -> bool {
    c.is_some_and(char::is_alphanumeric)
}

/// Truncate `styled` to `max_lines` lines of `layout`. `max_lines == 0`
/// means unlimited.
pub fn truncate(
    styled: &StyledText,
    layout: Option<&ParagraphLayout>,
    max_lines: usize,
    measure: &dyn TextMeasure,
) -> Truncation {
    let Some(layout) = layout else {
        return Truncation::Deferred;
    };
    if max_lines == 0 || layout.line_count() <= max_lines {
        return Truncation::Unchanged;
    }

    let source = styled.text();
    let fallback = StyleRecord::default();
    let style_at = |offset: usize| styled.style_at(offset).unwrap_or(&fallback);

    let last_line = &layout.lines[max_lines - 1].range;
    let fits = last_line.start <= last_line.end
        && layout.lines.last().map(|l| l.range.end) == Some(source.len());
    let (true, Some(rest), Some(through_line)) = (
        fits,
        source.get(last_line.start..),
        source.get(..last_line.end),
    ) else {
        tracing::debug!(?last_line, len = source.len(), "layout does not fit the text");
        return Truncation::Deferred;
    };

    let line_start = last_line.start;
    // Newlines become spaces so the rest of the paragraph fills one line.
    // Both are single bytes, so tail offsets map to source offsets.
    let tail: String = rest
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();

    let last_on_line = through_line
        .char_indices()
        .next_back()
        .map_or(line_start, |(i, _)| i);
    let ellipsis_width = measure.advance(&ELLIPSIS.to_string(), style_at(last_on_line));
    let budget = layout.line_width - ellipsis_width;

    let mut width = 0.0f32;
    let mut raw = tail.len();
    for (i, g) in tail.grapheme_indices(true) {
        let advance = measure.advance(g, style_at(line_start + i));
        if width + advance > budget {
            raw = i;
            break;
        }
        width += advance;
    }

    let mut cut = raw;
    if is_word_char(tail[..raw].chars().next_back()) && is_word_char(tail[raw..].chars().next()) {
        if let Some(space) = tail[..raw].rfind(|c| c == ' ' || c == '\t') {
            cut = space;
        }
    }

    let kept = tail[..cut].trim_end();
    let result = if kept.is_empty() {
        let prefix = source[..line_start].trim_end();
        let visible_len = prefix.len();
        TruncationResult {
            visible_len,
            raw_cut: line_start + raw,
            cut: line_start + cut,
            text: clipped(styled, prefix.to_string(), visible_len, None),
        }
    } else {
        let visible_len = line_start + kept.len();
        let mut text = String::with_capacity(visible_len + ELLIPSIS.len_utf8());
        text.push_str(&source[..line_start]);
        text.push_str(kept);
        let last_char = text
            .char_indices()
            .next_back()
            .map_or(0, |(i, _)| i);
        let ellipsis_style = style_at(last_char).clone();
        text.push(ELLIPSIS);
        TruncationResult {
            visible_len,
            raw_cut: line_start + raw,
            cut: line_start + cut,
            text: clipped(styled, text, visible_len, Some(ellipsis_style)),
        }
    };
    tracing::trace!(
        raw_cut = result.raw_cut,
        cut = result.cut,
        visible_len = result.visible_len,
        "truncated text"
    );
    Truncation::Truncated(result)
}

/// Fragments and blocks of `styled` restricted to `[0, visible_len)` over
/// the new `text`, plus a trailing ellipsis fragment.
fn clipped(
    styled: &StyledText,
    text: String,
    visible_len: usize,
    ellipsis_style: Option<StyleRecord>,
) -> StyledText {
    let mut fragments: Vec<Fragment> = styled
        .fragments()
        .iter()
        .filter(|f| f.range.start < visible_len)
        .map(|f| {
            let range = f.range.start..f.range.end.min(visible_len);
            Fragment {
                text: text[range.clone()].to_string(),
                range,
                style: f.style.clone(),
            }
        })
        .collect();
    if let Some(style) = ellipsis_style {
        fragments.push(Fragment {
            range: visible_len..text.len(),
            text: ELLIPSIS.to_string(),
            style,
        });
    }
    let blocks: Vec<BlockSpan> = styled
        .blocks()
        .iter()
        .filter(|b| b.range.start < visible_len)
        .map(|b| BlockSpan {
            range: b.range.start..b.range.end.min(visible_len),
            kind: b.kind,
        })
        .collect();
    StyledText::from_fragments(text, fragments, blocks, styled.direction())
        .with_forced_direction(styled.is_direction_forced())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderConfig;
    use crate::layout::{layout_paragraph, CellMeasure, LaidOutLine};
    use pretty_assertions::assert_eq;

    fn truncated(markup: &str, width: f32, max_lines: usize) -> Truncation {
        let styled = crate::parse(markup, &RenderConfig::default());
        let layout = layout_paragraph(&styled, width, &CellMeasure);
        truncate(&styled, Some(&layout), max_lines, &CellMeasure)
    }

    fn result(truncation: Truncation) -> TruncationResult {
        match truncation {
            Truncation::Truncated(result) => result,
            other => panic!("expected truncation, got {:?}", other),
        }
    }

    #[test]
    fn deferred_without_layout() {
        let styled = crate::parse("text", &RenderConfig::default());
        assert_eq!(truncate(&styled, None, 1, &CellMeasure), Truncation::Deferred);
    }

    #[test]
    fn deferred_when_layout_belongs_to_other_text() {
        let longer = crate::parse("Hello World Wide Web", &RenderConfig::default());
        let layout = layout_paragraph(&longer, 8.0, &CellMeasure);
        let styled = crate::parse("Hello", &RenderConfig::default());
        assert_eq!(
            truncate(&styled, Some(&layout), 1, &CellMeasure),
            Truncation::Deferred
        );

        let emoji = crate::parse("😀😀 x", &RenderConfig::default());
        let mut split = layout_paragraph(&emoji, 100.0, &CellMeasure);
        split.lines = vec![
            LaidOutLine { range: 0..2, width: 1.0 },
            LaidOutLine { range: 2..emoji.text().len(), width: 1.0 },
        ];
        assert_eq!(
            truncate(&emoji, Some(&split), 1, &CellMeasure),
            Truncation::Deferred
        );
    }

    #[test]
    fn unchanged_when_it_fits() {
        assert_eq!(truncated("short", 20.0, 1), Truncation::Unchanged);
        assert_eq!(truncated("a b c d e f", 3.0, 0), Truncation::Unchanged);
    }

    #[test]
    fn cuts_at_word_boundary() {
        let result = result(truncated("Hello World Wide Web", 15.0, 1));
        assert_eq!(result.raw_cut, 14);
        assert_eq!(result.cut, 11);
        assert_eq!(result.text.text(), "Hello World…");
        assert_eq!(result.visible_len, 11);
        assert_eq!(result.ellipsis().map(|f| f.text.as_str()), Some("…"));
    }

    #[test]
    fn keeps_raw_cut_without_spaces() {
        let result = result(truncated("abcdefghij", 5.0, 1));
        assert_eq!(result.text.text(), "abcd…");
        assert_eq!(result.cut, result.raw_cut);
    }

    #[test]
    fn earlier_lines_are_kept_and_newlines_flattened() {
        let result = result(truncated("one<br>two<br>three<br>four", 80.0, 2));
        assert_eq!(result.text.text(), "one\ntwo three four…");
    }

    #[test]
    fn ellipsis_inherits_last_visible_style() {
        let result = result(truncated("plain <b>bold words here</b>", 12.0, 1));
        assert_eq!(result.text.text(), "plain bold…");
        let ellipsis = result.ellipsis().map(|f| f.style.is_bold());
        assert_eq!(ellipsis, Some(true));
        assert!(result.text.validate().is_ok());
    }

    #[test]
    fn no_ellipsis_only_line() {
        let result = result(truncated("first<br>abcdef", 1.0, 2));
        assert!(result.ellipsis().is_none());
        assert_eq!(result.text.text(), "f");
    }
}
