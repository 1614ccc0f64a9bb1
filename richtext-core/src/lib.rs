//! # richtext-core
//!
//! Parses a restricted HTML subset into styled text runs that any native
//! attributed-text API can apply, and owns the layout-affecting decisions
//! that must match across platforms: style precedence, list/heading/link
//! nesting, word-boundary truncation and text direction.
//!
//! ## Supported markup
//! - **Inline**: `b`, `strong`, `i`, `em`, `u`, `s`, `del`, `span`, `a`
//! - **Blocks**: `p`, `div`, `blockquote`, `pre`, `h1`–`h6`, `br`
//! - **Lists**: `ul`, `ol` (with `start`), `li`
//! - **Bidi**: `bdi`, `bdo` and the `dir` attribute on any element
//!
//! Anything else is transparent: its text renders, the tag is ignored.
//!
//! ## Example
//! ```
//! use richtext_core::{parse, RenderConfig};
//!
//! let styled = parse("<b>Hello</b> world", &RenderConfig::default());
//! assert_eq!(styled.text(), "Hello world");
//! assert!(styled.fragments()[0].style.is_bold());
//! ```
//!
//! ## Truncation
//! ```
//! use richtext_core::layout::{layout_paragraph, CellMeasure};
//! use richtext_core::truncate::{truncate, Truncation};
//! use richtext_core::{parse, RenderConfig};
//!
//! let styled = parse("Hello World Wide Web", &RenderConfig::default());
//! let layout = layout_paragraph(&styled, 15.0, &CellMeasure);
//! if let Truncation::Truncated(result) = truncate(&styled, Some(&layout), 1, &CellMeasure) {
//!     assert_eq!(result.text.text(), "Hello World…");
//! }
//! ```

pub mod accessibility;
pub mod bidi;
pub mod builder;
pub mod color;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod layout;
pub mod linkify;
pub mod overrides;
pub mod render;
pub mod style;
pub mod styled_text;
pub mod tokenizer;
pub mod truncate;

// --- Core types ---
pub use accessibility::accessibility_label;
pub use bidi::{ParagraphDirection, TextDirection};
pub use color::Color;
pub use config::RenderConfig;
pub use diagnostics::{Diagnostic, Diagnostics, TracingDiagnostics};
pub use error::{RichTextError, RichTextResult};
pub use overrides::{TagStyle, TagStyles};
pub use style::{StylePatch, StyleRecord};
pub use styled_text::{BlockKind, BlockSpan, Fragment, StyledText};
pub use truncate::{Truncation, TruncationResult};

/// Parse markup with diagnostics logged through `tracing`.
///
/// When `config.detect_links` enables any detector, plain-text links are
/// attached after parsing.
pub fn parse(markup: &str, config: &RenderConfig) -> StyledText {
    parse_with_diagnostics(markup, config, &TracingDiagnostics)
}

/// Parse markup, reporting recoverable problems to `diagnostics`.
pub fn parse_with_diagnostics(
    markup: &str,
    config: &RenderConfig,
    diagnostics: &dyn Diagnostics,
) -> StyledText {
    let styled = builder::build(markup, config, diagnostics);
    if config.detect_links.is_enabled() {
        linkify::linkify(&styled, config.detect_links)
    } else {
        styled
    }
}
