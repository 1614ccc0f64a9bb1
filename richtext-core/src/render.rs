//! Seam between the core and a platform text renderer.

use unicode_width::UnicodeWidthStr;

use crate::bidi::{ParagraphDirection, PhysicalAlign};
use crate::config::RenderConfig;
use crate::layout::{layout_paragraph, CellMeasure};
use crate::styled_text::StyledText;
use crate::truncate::{truncate, Truncation};

/// A platform renderer.
///
/// `apply_fragments` turns styled text into whatever the platform lays out
/// (an attributed string, a text layout) and `draw` puts it on screen. The
/// core makes every layout-affecting decision before this point.
pub trait RenderAdapter {
    type Handle;

    fn apply_fragments(
        &mut self,
        text: &StyledText,
        direction: &ParagraphDirection,
        max_lines: usize,
    ) -> Self::Handle;

    fn draw(&mut self, handle: &Self::Handle);
}

/// Map the direction `text` was parsed with onto `config`'s alignment,
/// then apply and draw it.
pub fn render<A: RenderAdapter>(
    adapter: &mut A,
    text: &StyledText,
    config: &RenderConfig,
    max_lines: usize,
) -> A::Handle {
    let direction = ParagraphDirection::from_resolved(
        text.direction(),
        text.is_direction_forced(),
        config.text_align,
    );
    let handle = adapter.apply_fragments(text, &direction, max_lines);
    adapter.draw(&handle);
    handle
}

/// Laid-out lines ready to print.
#[derive(Debug, Clone, PartialEq)]
pub struct PlainTextHandle {
    pub lines: Vec<String>,
    pub alignment: PhysicalAlign,
    pub truncated: bool,
}

/// Renders into a fixed-width grid of terminal cells. Styling is dropped;
/// layout, truncation and alignment are kept.
#[derive(Debug, Clone, Default)]
pub struct PlainTextAdapter {
    width: usize,
    output: Vec<String>,
}

impl PlainTextAdapter {
    pub fn new(width: usize) -> Self {
        Self {
            width,
            output: Vec::new(),
        }
    }

    pub fn output(&self) -> &[String] {
        &self.output
    }

    fn align(&self, line: &str, alignment: PhysicalAlign) -> String {
        let free = self.width.saturating_sub(line.width());
        let pad = match alignment {
            PhysicalAlign::Left | PhysicalAlign::Justify => 0,
            PhysicalAlign::Right => free,
            PhysicalAlign::Center => free / 2,
        };
        format!("{}{}", " ".repeat(pad), line)
    }
}

impl RenderAdapter for PlainTextAdapter {
    type Handle = PlainTextHandle;

    fn apply_fragments(
        &mut self,
        text: &StyledText,
        direction: &ParagraphDirection,
        max_lines: usize,
    ) -> PlainTextHandle {
        let width = self.width as f32;
        let layout = layout_paragraph(text, width, &CellMeasure);
        let (shown, truncated) = match truncate(text, Some(&layout), max_lines, &CellMeasure) {
            Truncation::Truncated(result) => (result.text, true),
            Truncation::Unchanged | Truncation::Deferred => (text.clone(), false),
        };
        let shown_layout = layout_paragraph(&shown, width, &CellMeasure);
        let lines = shown_layout
            .lines
            .iter()
            .map(|line| {
                let raw = &shown.text()[line.range.clone()];
                raw.chars()
                    .filter(|&c| !crate::bidi::is_bidi_control(c))
                    .collect::<String>()
                    .trim_end()
                    .to_string()
            })
            .collect();
        PlainTextHandle {
            lines,
            alignment: direction.alignment,
            truncated,
        }
    }

    fn draw(&mut self, handle: &PlainTextHandle) {
        let drawn: Vec<String> = handle
            .lines
            .iter()
            .map(|line| self.align(line, handle.alignment))
            .collect();
        self.output.extend(drawn);
    }
}
