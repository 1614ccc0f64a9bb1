//! Builds [`StyledText`] from markup tokens.
//!
//! Every supported tag lives on one stack of open elements. Inline
//! elements (`b`, `i`, `a`, ...) close independently of each other, so
//! they may cross; closing a block element first closes everything opened
//! inside it. When an element closes, its intrinsic style (merged with the
//! user override for the tag) becomes a span over the text it enclosed.
//! Spans are flattened into fragments once the whole input is consumed.

mod headings;
mod links;
mod lists;
mod spans;

pub use headings::{heading_level, heading_scale, HeadingContext, HEADING_SCALES};
pub use links::{is_allowed_href, LinkContext};
pub use lists::{nesting_level, ListContext, ListItemContext, ListKind, BULLET, MAX_LIST_NESTING};

use std::ops::Range;

use crate::bidi::{self, DirAttribute, TextDirection};
use crate::config::RenderConfig;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::style::{self, StylePatch};
use crate::styled_text::{BlockKind, BlockSpan, StyledText};
use crate::tokenizer::{Tag, Token, Tokenizer};
use spans::{clip, flatten, StyleSpan};

const INLINE_TAGS: &[&str] = &[
    "b", "strong", "i", "em", "u", "s", "del", "span", "a", "bdi", "bdo",
];
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "blockquote", "pre", "ul", "ol", "li", "h1", "h2", "h3", "h4", "h5", "h6",
];

fn is_block(tag: &str) -> bool {
    BLOCK_TAGS.contains(&tag)
}

fn is_supported(tag: &str) -> bool {
    tag == "br" || is_block(tag) || INLINE_TAGS.contains(&tag)
}

#[derive(Debug, Clone)]
enum ElementKind {
    Inline(StylePatch),
    Paragraph,
    Blockquote { level: usize },
    Pre,
    Heading(HeadingContext),
    /// `None` when the href was missing or rejected.
    Link(Option<LinkContext>),
    List(ListContext),
    /// `None` for an `li` outside any list.
    ListItem(Option<ListItemContext>),
    /// `bdi` / `bdo`, with the control character that ends them.
    Isolate { closer: Option<char> },
}

#[derive(Debug, Clone)]
struct OpenElement {
    tag: String,
    kind: ElementKind,
    start: usize,
    order: usize,
    dir: Option<DirAttribute>,
}

struct Builder<'a> {
    config: &'a RenderConfig,
    diagnostics: &'a dyn Diagnostics,
    text: String,
    stack: Vec<OpenElement>,
    spans: Vec<StyleSpan>,
    blocks: Vec<BlockSpan>,
    pending_space: bool,
    pre_depth: usize,
    next_order: usize,
    /// First top-level block, when it opened before any text: its order
    /// and `dir`. Its `dir` sets the paragraph direction if it also
    /// encloses everything that follows.
    root: Option<(usize, Option<DirAttribute>)>,
    root_end: Option<usize>,
}

/// Parse `markup` into styled text. Never fails; problems with the input
/// are reported to `diagnostics` and rendered as best-effort text.
pub fn build(markup: &str, config: &RenderConfig, diagnostics: &dyn Diagnostics) -> StyledText {
    let mut builder = Builder::new(config, diagnostics);
    for token in Tokenizer::new(markup) {
        match token {
            Token::Text(text) => builder.push_text(&text),
            Token::Tag(tag) if tag.closing => builder.close_tag(&tag),
            Token::Tag(tag) => builder.open_tag(&tag),
            Token::Malformed { text, offset } => {
                diagnostics.report(Diagnostic::MalformedTag { offset });
                builder.push_text(&text);
            }
        }
    }

    let styled = builder.finish();
    let checked = styled.validate();
    if let Err(err) = &checked {
        diagnostics.report(Diagnostic::InvariantViolation {
            detail: err.to_string(),
        });
    }
    debug_assert!(checked.is_ok(), "{:?}", checked);
    styled
}

impl<'a> Builder<'a> {
    fn new(config: &'a RenderConfig, diagnostics: &'a dyn Diagnostics) -> Self {
        Self {
            config,
            diagnostics,
            text: String::new(),
            stack: Vec::new(),
            spans: Vec::new(),
            blocks: Vec::new(),
            pending_space: false,
            pre_depth: 0,
            next_order: 0,
            root: None,
            root_end: None,
        }
    }

    // ─── Text and whitespace ─────────────────────────────────────────────

    fn at_line_start(&self) -> bool {
        self.text.is_empty() || self.text.ends_with('\n')
    }

    fn push_text(&mut self, s: &str) {
        if self.pre_depth > 0 {
            self.flush_space();
            self.text.push_str(s);
            return;
        }
        for c in s.chars() {
            if c.is_ascii_whitespace() {
                self.pending_space = true;
            } else {
                self.flush_space();
                self.text.push(c);
            }
        }
    }

    /// Emit a collapsed space unless the text is at a line start or already
    /// ends in a space.
    fn flush_space(&mut self) {
        if !std::mem::take(&mut self.pending_space) {
            return;
        }
        if !(self.at_line_start() || self.text.ends_with(' ')) {
            self.text.push(' ');
        }
    }

    fn ensure_newline(&mut self) {
        self.pending_space = false;
        if !self.at_line_start() {
            self.text.push('\n');
        }
    }

    fn line_break(&mut self) {
        self.pending_space = false;
        self.text.push('\n');
    }

    // ─── Open tags ───────────────────────────────────────────────────────

    fn open_tag(&mut self, tag: &Tag) {
        let name = tag.name.as_str();
        if name == "br" {
            self.line_break();
            return;
        }
        if !is_supported(name) {
            self.diagnostics.report(Diagnostic::UnknownTag {
                tag: tag.name.clone(),
                offset: tag.offset,
            });
            return;
        }

        let dir = self.dir_attribute(tag);
        let (kind, start) = if name == "li" {
            let item = self.open_list_item();
            let start = item.map_or(self.text.len(), |i| i.marker_start);
            (ElementKind::ListItem(item), start)
        } else if is_block(name) {
            self.ensure_newline();
            let start = self.text.len();
            (self.open_block(tag), start)
        } else {
            self.flush_space();
            let start = self.text.len();
            (self.open_inline(tag, dir), start)
        };

        let order = self.next_order;
        self.next_order += 1;
        let top_level = self.stack.is_empty() && self.text.is_empty();
        if self.root.is_none() && top_level && is_block(name) && name != "li" {
            self.root = Some((order, dir));
        }
        self.stack.push(OpenElement {
            tag: tag.name.clone(),
            kind,
            start,
            order,
            dir,
        });

        if tag.self_closing {
            self.close_tag(tag);
        }
    }

    fn open_block(&mut self, tag: &Tag) -> ElementKind {
        if let Some(level) = heading_level(&tag.name) {
            return ElementKind::Heading(HeadingContext { level });
        }
        match tag.name.as_str() {
            "blockquote" => ElementKind::Blockquote {
                level: 1 + self
                    .stack
                    .iter()
                    .filter(|e| matches!(e.kind, ElementKind::Blockquote { .. }))
                    .count(),
            },
            "pre" => {
                self.pre_depth += 1;
                ElementKind::Pre
            }
            "ul" | "ol" => ElementKind::List(self.open_list(tag)),
            _ => ElementKind::Paragraph,
        }
    }

    fn open_inline(&mut self, tag: &Tag, dir: Option<DirAttribute>) -> ElementKind {
        match tag.name.as_str() {
            "b" | "strong" => ElementKind::Inline(StylePatch::bold()),
            "i" | "em" => ElementKind::Inline(StylePatch::italic()),
            "u" => ElementKind::Inline(StylePatch::underline()),
            "s" | "del" => ElementKind::Inline(StylePatch::line_through()),
            "a" => ElementKind::Link(self.open_link(tag)),
            "bdi" => {
                self.text.push(bidi::isolate_open(dir));
                ElementKind::Isolate {
                    closer: Some(bidi::PDI),
                }
            }
            "bdo" => match bidi::override_open(dir) {
                Some(control) => {
                    self.text.push(control);
                    ElementKind::Isolate {
                        closer: Some(bidi::PDF),
                    }
                }
                None => ElementKind::Isolate { closer: None },
            },
            _ => ElementKind::Inline(StylePatch::default()),
        }
    }

    fn open_link(&self, tag: &Tag) -> Option<LinkContext> {
        let href = tag.attr("href")?;
        let link = LinkContext::from_href(href);
        if link.is_none() {
            self.diagnostics.report(Diagnostic::RejectedLink {
                href: href.to_string(),
            });
        }
        link
    }

    fn open_list(&self, tag: &Tag) -> ListContext {
        let kind = ListKind::from_tag(&tag.name).unwrap_or(ListKind::Unordered);
        let depth = 1 + self
            .stack
            .iter()
            .filter(|e| matches!(e.kind, ElementKind::List(_)))
            .count();
        let start = match (kind, tag.attr("start")) {
            (ListKind::Ordered, Some(value)) => value.trim().parse::<usize>().unwrap_or_else(|_| {
                self.diagnostics.report(Diagnostic::InvalidAttribute {
                    tag: tag.name.clone(),
                    attribute: "start".to_string(),
                    value: value.to_string(),
                });
                1
            }),
            _ => 1,
        };
        ListContext::new(kind, depth, start)
    }

    /// Start a list item: close the previous item of the same list, move to
    /// a fresh line and insert the marker. Returns `None` outside a list.
    fn open_list_item(&mut self) -> Option<ListItemContext> {
        let list_idx = self
            .stack
            .iter()
            .rposition(|e| matches!(e.kind, ElementKind::List(_)));
        let open_item = self.stack.iter().rposition(|e| e.tag == "li");
        if let (Some(list), Some(item)) = (list_idx, open_item) {
            if item > list {
                self.close_from(item);
            }
        }

        let Some(list_idx) = list_idx else {
            self.flush_space();
            return None;
        };
        self.ensure_newline();
        let ElementKind::List(list) = &mut self.stack[list_idx].kind else {
            return None;
        };
        let marker = list.next_marker();
        let item = ListItemContext {
            marker_start: self.text.len(),
            marker_len: marker.len(),
            level: list.level,
            ordered: list.is_ordered(),
        };
        self.text.push_str(&marker);
        Some(item)
    }

    fn dir_attribute(&self, tag: &Tag) -> Option<DirAttribute> {
        let value = tag.attr("dir")?;
        let dir = DirAttribute::parse(value);
        if dir.is_none() {
            self.diagnostics.report(Diagnostic::InvalidAttribute {
                tag: tag.name.clone(),
                attribute: "dir".to_string(),
                value: value.to_string(),
            });
        }
        dir
    }

    // ─── Close tags ──────────────────────────────────────────────────────

    fn close_tag(&mut self, tag: &Tag) {
        match self.stack.iter().rposition(|e| e.tag == tag.name) {
            Some(idx) => self.close_from(idx),
            None if is_supported(&tag.name) => {
                self.diagnostics.report(Diagnostic::OrphanCloseTag {
                    tag: tag.name.clone(),
                    offset: tag.offset,
                });
            }
            None => {}
        }
    }

    /// Close the element at `idx`. A block element closes everything opened
    /// after it first; an inline element is removed on its own.
    fn close_from(&mut self, idx: usize) {
        if is_block(&self.stack[idx].tag) {
            while self.stack.len() > idx + 1 {
                if let Some(inner) = self.stack.pop() {
                    self.close_element(inner);
                }
            }
        }
        let element = self.stack.remove(idx);
        self.close_element(element);
    }

    fn close_element(&mut self, element: OpenElement) {
        let OpenElement {
            tag,
            kind,
            start,
            order,
            dir,
        } = element;
        if self.root.is_some_and(|(root_order, _)| root_order == order) {
            self.root_end = Some(self.text.len());
        }

        if let ElementKind::Isolate {
            closer: Some(closer),
        } = kind
        {
            self.text.push(closer);
        }
        let range = start..self.text.len();

        let intrinsic = match kind {
            ElementKind::Inline(patch) => Some(patch),
            ElementKind::Link(link) => link.map(|l| l.intrinsic()),
            ElementKind::Isolate { .. } => Some(StylePatch::default()),
            ElementKind::Paragraph => {
                self.end_block(&range);
                Some(StylePatch::default())
            }
            ElementKind::Blockquote { level } => {
                self.push_block(&range, BlockKind::Blockquote { level });
                self.end_block(&range);
                Some(StylePatch::default())
            }
            ElementKind::Pre => {
                self.pre_depth = self.pre_depth.saturating_sub(1);
                self.end_block(&range);
                Some(StylePatch {
                    font_family: Some("monospace".to_string()),
                    ..StylePatch::default()
                })
            }
            ElementKind::Heading(heading) => {
                self.end_block(&range);
                Some(heading.intrinsic(self.config.font_size))
            }
            ElementKind::List(_) => {
                let nested = self
                    .stack
                    .iter()
                    .any(|e| matches!(e.kind, ElementKind::List(_)));
                if nested {
                    self.pending_space = false;
                } else {
                    self.ensure_newline();
                }
                Some(StylePatch::default())
            }
            ElementKind::ListItem(item) => {
                if let Some(item) = item {
                    self.push_block(
                        &range,
                        BlockKind::ListItem {
                            level: item.level,
                            ordered: item.ordered,
                            marker_len: item.marker_len,
                        },
                    );
                }
                Some(StylePatch::default())
            }
        };

        if range.is_empty() {
            return;
        }
        if let Some(intrinsic) = intrinsic {
            let patch = style::resolve(&intrinsic, self.config.tag_styles.resolve(&tag));
            if !patch.is_empty() {
                self.spans.push(StyleSpan {
                    range: range.clone(),
                    patch,
                    order,
                });
            }
        }
        if let Some(direction) = dir.and_then(|d| self.element_direction(d, &range)) {
            self.spans.push(StyleSpan {
                range,
                patch: StylePatch::direction(direction),
                order,
            });
        }
    }

    /// Closing a block adds a separator only if the block produced text.
    fn end_block(&mut self, range: &Range<usize>) {
        if range.is_empty() {
            self.pending_space = false;
        } else {
            self.ensure_newline();
        }
    }

    fn push_block(&mut self, range: &Range<usize>, kind: BlockKind) {
        if !range.is_empty() {
            self.blocks.push(BlockSpan {
                range: range.clone(),
                kind,
            });
        }
    }

    fn element_direction(&self, dir: DirAttribute, range: &Range<usize>) -> Option<TextDirection> {
        if let Some(rtl) = self.config.rtl {
            return Some(if rtl {
                TextDirection::Rtl
            } else {
                TextDirection::Ltr
            });
        }
        dir.explicit()
            .or_else(|| bidi::first_strong_direction(&self.text[range.clone()]))
    }

    // ─── End of input ────────────────────────────────────────────────────

    fn finish(mut self) -> StyledText {
        while let Some(element) = self.stack.pop() {
            self.close_element(element);
        }

        let len = self
            .text
            .trim_end_matches(|c: char| c.is_ascii_whitespace())
            .len();
        self.text.truncate(len);
        clip(&mut self.spans, &mut self.blocks, len);
        self.blocks.sort_by_key(|b| b.range.start);

        let root_dir = match (self.root, self.root_end) {
            (Some((_, dir)), Some(end)) if end >= len => dir,
            _ => None,
        };
        let direction = bidi::resolve_attribute_direction(self.config.rtl, root_dir, &self.text);
        flatten(
            self.text,
            self.spans,
            self.blocks,
            &self.config.base_style(),
            self.config.font_multiplier(),
            direction,
        )
        .with_forced_direction(bidi::is_forced_direction(self.config.rtl, root_dir))
    }
}
