//! `ul` / `ol` / `li` state.

/// Deepest indentation level. Lists nested further keep counting but stop
/// indenting.
pub const MAX_LIST_NESTING: usize = 3;

pub const BULLET: &str = "• ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Ordered,
    Unordered,
}

impl ListKind {
    pub fn from_tag(tag: &str) -> Option<ListKind> {
        match tag {
            "ol" => Some(ListKind::Ordered),
            "ul" => Some(ListKind::Unordered),
            _ => None,
        }
    }
}

/// Indentation level for a list at nesting `depth` (outermost list is 1).
pub fn nesting_level(depth: usize) -> usize {
    depth.min(MAX_LIST_NESTING)
}

/// One open list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListContext {
    pub kind: ListKind,
    /// Capped indentation level.
    pub level: usize,
    next_number: usize,
}

impl ListContext {
    pub fn new(kind: ListKind, depth: usize, start: usize) -> Self {
        Self {
            kind,
            level: nesting_level(depth),
            next_number: start,
        }
    }

    pub fn is_ordered(&self) -> bool {
        self.kind == ListKind::Ordered
    }

    /// Marker for the next item; advances the counter.
    pub fn next_marker(&mut self) -> String {
        match self.kind {
            ListKind::Unordered => BULLET.to_string(),
            ListKind::Ordered => {
                let marker = format!("{}. ", self.next_number);
                self.next_number = self.next_number.saturating_add(1);
                marker
            }
        }
    }
}

/// An `li` that opened inside a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListItemContext {
    pub marker_start: usize,
    pub marker_len: usize,
    pub level: usize,
    pub ordered: bool,
}
