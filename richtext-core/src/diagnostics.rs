use std::sync::Mutex;

/// A recoverable event noticed while parsing.
///
/// None of these stop a parse. They exist so hosts can surface authoring
/// problems during development without the parser depending on any
/// build-time flag.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// A tag outside the supported set; its contents still render.
    UnknownTag { tag: String, offset: usize },
    /// A close tag with no matching open element.
    OrphanCloseTag { tag: String, offset: usize },
    /// A `<` that starts a tag but never reaches `>`; rendered as text.
    MalformedTag { offset: usize },
    /// A link whose href is empty or uses a disallowed scheme.
    RejectedLink { href: String },
    /// An attribute value that could not be used.
    InvalidAttribute {
        tag: String,
        attribute: String,
        value: String,
    },
    /// Output offsets broke an invariant. Indicates a parser bug.
    InvariantViolation { detail: String },
}

pub trait Diagnostics {
    fn report(&self, diagnostic: Diagnostic);
}

/// Emits each diagnostic as a `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn report(&self, diagnostic: Diagnostic) {
        match diagnostic {
            Diagnostic::UnknownTag { tag, offset } => {
                tracing::debug!(tag = tag.as_str(), offset, "unknown tag treated as transparent");
            }
            Diagnostic::OrphanCloseTag { tag, offset } => {
                tracing::debug!(tag = tag.as_str(), offset, "ignoring close tag without open element");
            }
            Diagnostic::MalformedTag { offset } => {
                tracing::debug!(offset, "unterminated tag rendered as text");
            }
            Diagnostic::RejectedLink { href } => {
                tracing::debug!(href = href.as_str(), "link rejected, rendering as plain text");
            }
            Diagnostic::InvalidAttribute {
                tag,
                attribute,
                value,
            } => {
                tracing::debug!(
                    tag = tag.as_str(),
                    attribute = attribute.as_str(),
                    value = value.as_str(),
                    "ignoring invalid attribute value"
                );
            }
            Diagnostic::InvariantViolation { detail } => {
                tracing::error!(detail = detail.as_str(), "styled text invariant violated");
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDiagnostics;

impl Diagnostics for NoopDiagnostics {
    fn report(&self, _diagnostic: Diagnostic) {}
}

/// Records diagnostics in memory.
#[derive(Debug, Default)]
pub struct CollectingDiagnostics {
    events: Mutex<Vec<Diagnostic>>,
}

impl CollectingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Diagnostic> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl Diagnostics for CollectingDiagnostics {
    fn report(&self, diagnostic: Diagnostic) {
        if let Ok(mut events) = self.events.lock() {
            events.push(diagnostic);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    fn collecting_keeps_report_order() {
        let diagnostics = CollectingDiagnostics::new();
        diagnostics.report(Diagnostic::MalformedTag { offset: 3 });
        diagnostics.report(Diagnostic::RejectedLink {
            href: "javascript:void(0)".to_string(),
        });
        assert_eq!(
            diagnostics.events(),
            vec![
                Diagnostic::MalformedTag { offset: 3 },
                Diagnostic::RejectedLink {
                    href: "javascript:void(0)".to_string()
                },
            ]
        );
    }

    #[traced_test]
    #[test]
    fn tracing_reports_invariant_violations() {
        TracingDiagnostics.report(Diagnostic::InvariantViolation {
            detail: "fragment gap at 4".to_string(),
        });
        assert!(logs_contain("styled text invariant violated"));
    }
}
