//! Flattening of overlapping style spans into fragments.

use std::ops::Range;

use crate::bidi::TextDirection;
use crate::style::{StylePatch, StyleRecord};
use crate::styled_text::{BlockSpan, StyledText};

/// A patch applied over a range when an element closes.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StyleSpan {
    pub range: Range<usize>,
    pub patch: StylePatch,
    /// Open order of the element. Later-opened elements are nested inside
    /// any earlier one they overlap, so they apply last.
    pub order: usize,
}

/// Clip spans and blocks to `len`, dropping the ones left empty.
pub(crate) fn clip(spans: &mut Vec<StyleSpan>, blocks: &mut Vec<BlockSpan>, len: usize) {
    for span in spans.iter_mut() {
        span.range.end = span.range.end.min(len);
    }
    spans.retain(|s| s.range.start < s.range.end);
    for block in blocks.iter_mut() {
        block.range.end = block.range.end.min(len);
    }
    blocks.retain(|b| b.range.start < b.range.end);
}

/// Resolve every segment between span boundaries to a full style record.
///
/// `font_multiplier` scales the final font size of every fragment.
pub(crate) fn flatten(
    text: String,
    mut spans: Vec<StyleSpan>,
    blocks: Vec<BlockSpan>,
    base: &StyleRecord,
    font_multiplier: f32,
    direction: TextDirection,
) -> StyledText {
    if text.is_empty() {
        return StyledText::empty(direction);
    }
    spans.sort_by_key(|s| s.order);

    let mut cuts: Vec<usize> = Vec::with_capacity(spans.len() * 2 + 2);
    cuts.push(0);
    cuts.push(text.len());
    for span in &spans {
        cuts.push(span.range.start.min(text.len()));
        cuts.push(span.range.end.min(text.len()));
    }
    cuts.sort_unstable();
    cuts.dedup();

    let runs: Vec<(Range<usize>, StyleRecord)> = cuts
        .windows(2)
        .map(|pair| {
            let segment = pair[0]..pair[1];
            let mut style = base.clone();
            for span in &spans {
                if span.range.start <= segment.start && segment.end <= span.range.end {
                    style.apply(&span.patch);
                }
            }
            style.font_size *= font_multiplier;
            (segment, style)
        })
        .collect();

    StyledText::from_runs(text, runs, blocks, direction)
}
