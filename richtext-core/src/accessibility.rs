use crate::bidi::is_bidi_control;
use crate::styled_text::{BlockKind, StyledText};

const TERMINAL_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?'];

/// Plain-text label for screen readers.
///
/// Bullet markers are dropped and ordered markers kept. Lines are joined
/// with `", "` between consecutive list items and `". "` elsewhere, so a
/// screen reader pauses between them. A line that already ends in
/// punctuation is joined with a plain space.
pub fn accessibility_label(styled: &StyledText) -> String {
    let text = styled.text();
    let mut parts: Vec<(String, bool)> = Vec::new();

    let mut offset = 0;
    for line in text.split('\n') {
        let start = offset;
        offset += line.len() + 1;

        let item = styled.blocks().iter().find_map(|b| match b.kind {
            BlockKind::ListItem {
                ordered,
                marker_len,
                ..
            } if b.range.start == start => Some((ordered, marker_len)),
            _ => None,
        });
        let body = match item {
            Some((false, marker_len)) => line.get(marker_len..).unwrap_or(""),
            _ => line,
        };
        let cleaned: String = body.chars().filter(|&c| !is_bidi_control(c)).collect();
        let cleaned = cleaned.trim();
        if !cleaned.is_empty() {
            parts.push((cleaned.to_string(), item.is_some()));
        }
    }

    let mut label = String::new();
    let mut previous_item = false;
    for (i, (part, is_item)) in parts.iter().enumerate() {
        if i > 0 {
            if label.ends_with(TERMINAL_PUNCTUATION) {
                label.push(' ');
            } else if previous_item && *is_item {
                label.push_str(", ");
            } else {
                label.push_str(". ");
            }
        }
        label.push_str(part);
        previous_item = *is_item;
    }
    label
}
