//! Reference line layout.
//!
//! Platforms lay text out with their own engines and hand the result to
//! [`crate::truncate`] as a [`ParagraphLayout`]. The greedy breaker here
//! produces the same shape of data for tests, the CLI and hosts without a
//! native text stack.

use std::ops::Range;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::style::StyleRecord;
use crate::styled_text::StyledText;

/// Measures the advance width of text in a given style.
pub trait TextMeasure {
    /// Advance of a single grapheme cluster.
    fn advance(&self, grapheme: &str, style: &StyleRecord) -> f32;

    fn measure(&self, text: &str, style: &StyleRecord) -> f32 {
        text.graphemes(true).map(|g| self.advance(g, style)).sum()
    }
}

/// One unit per terminal cell, independent of font size.
#[derive(Debug, Clone, Copy, Default)]
pub struct CellMeasure;

impl TextMeasure for CellMeasure {
    fn advance(&self, grapheme: &str, _style: &StyleRecord) -> f32 {
        grapheme.width() as f32
    }
}

/// Monospace approximation: each cell is `em_ratio` of the font size, plus
/// letter spacing.
#[derive(Debug, Clone, Copy)]
pub struct MonospaceMeasure {
    pub em_ratio: f32,
}

impl Default for MonospaceMeasure {
    fn default() -> Self {
        Self { em_ratio: 0.6 }
    }
}

impl TextMeasure for MonospaceMeasure {
    fn advance(&self, grapheme: &str, style: &StyleRecord) -> f32 {
        let cells = grapheme.width();
        if cells == 0 {
            return 0.0;
        }
        cells as f32 * style.font_size * self.em_ratio + style.letter_spacing.unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LaidOutLine {
    /// Byte range of the line, including trailing whitespace and the
    /// newline that ended it.
    pub range: Range<usize>,
    /// Width of the line without trailing whitespace.
    pub width: f32,
}

/// Lines of one laid-out paragraph. Line ranges partition the text.
#[derive(Debug, Clone, PartialEq)]
pub struct ParagraphLayout {
    pub line_width: f32,
    pub lines: Vec<LaidOutLine>,
}

impl ParagraphLayout {
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

fn is_space(grapheme: &str) -> bool {
    grapheme.chars().all(|c| c == ' ' || c == '\t')
}

fn is_newline(grapheme: &str) -> bool {
    grapheme == "\n" || grapheme == "\r\n" || grapheme == "\r"
}

/// Width of `range` in `styled`, ignoring trailing whitespace.
pub fn range_width(styled: &StyledText, range: Range<usize>, measure: &dyn TextMeasure) -> f32 {
    let fallback = StyleRecord::default();
    let slice = styled.text()[range.clone()].trim_end();
    slice
        .grapheme_indices(true)
        .map(|(i, g)| {
            let style = styled.style_at(range.start + i).unwrap_or(&fallback);
            measure.advance(g, style)
        })
        .sum()
}

/// Greedy line breaking at `line_width`.
///
/// Lines break after whitespace; a word wider than the line is broken at
/// grapheme boundaries. Whitespace may hang past the edge. `\n` always ends
/// a line.
pub fn layout_paragraph(
    styled: &StyledText,
    line_width: f32,
    measure: &dyn TextMeasure,
) -> ParagraphLayout {
    let fallback = StyleRecord::default();
    let text = styled.text();
    let mut breaks: Vec<usize> = Vec::new();

    let mut line_start = 0;
    let mut width = 0.0f32;
    // Position just after the last whitespace on this line, with the width
    // up to that point.
    let mut last_break: Option<(usize, f32)> = None;

    for (i, g) in text.grapheme_indices(true) {
        let end = i + g.len();
        if is_newline(g) {
            breaks.push(end);
            line_start = end;
            width = 0.0;
            last_break = None;
            continue;
        }

        let style = styled.style_at(i).unwrap_or(&fallback);
        let advance = measure.advance(g, style);
        if width + advance > line_width && i > line_start && !is_space(g) {
            match last_break {
                Some((at, at_width)) => {
                    breaks.push(at);
                    line_start = at;
                    width -= at_width;
                }
                None => {
                    breaks.push(i);
                    line_start = i;
                    width = 0.0;
                }
            }
            last_break = None;
        }

        width += advance;
        if is_space(g) {
            last_break = Some((end, width));
        }
    }
    if line_start < text.len() {
        breaks.push(text.len());
    }

    let mut lines = Vec::with_capacity(breaks.len());
    let mut start = 0;
    for end in breaks {
        lines.push(LaidOutLine {
            width: range_width(styled, start..end, measure),
            range: start..end,
        });
        start = end;
    }

    ParagraphLayout { line_width, lines }
}
