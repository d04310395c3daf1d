//! Auto-bullet behaviour for the Enter key in multi-line description fields.
//!
//! Cursor positions are counted in characters (Unicode scalar values), not bytes.
//! Out-of-range positions are clamped to the end of the buffer.

use serde::{Deserialize, Serialize};

/// Characters that mark a line as a bullet item.
pub const BULLET_MARKERS: [char; 3] = ['•', '-', '*'];

/// Marker inserted when a plain line is converted into the first bullet of a list.
pub const CANONICAL_BULLET: &str = "• ";

/// Which branch of the Enter handling fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnterRule {
    /// The line already was a bullet; the same marker is repeated on the new line.
    ContinueBullet,
    /// A plain line became the first bullet and a second bullet was opened.
    StartList,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EnterOutcome {
    Edited {
        buffer: String,
        cursor: usize,
        rule: EnterRule,
    },
    /// The caller should apply its default newline behaviour.
    NoChange,
}

/// Computes the buffer and cursor that result from pressing Enter with the selection
/// `cursor_start..cursor_end`. The selection is replaced as a plain newline would.
pub fn on_enter(buffer: &str, cursor_start: usize, cursor_end: usize) -> EnterOutcome {
    let total = buffer.chars().count();
    let start = cursor_start.min(cursor_end).min(total);
    let end = cursor_start.max(cursor_end).min(total);
    let start_byte = byte_offset(buffer, start);
    let end_byte = byte_offset(buffer, end);

    let line_start = buffer[..start_byte].rfind('\n').map_or(0, |i| i + 1);
    let current_line = &buffer[line_start..start_byte];

    if let Some(prefix) = bullet_prefix(current_line) {
        let mut next = String::with_capacity(buffer.len() + prefix.len() + 1);
        next.push_str(&buffer[..start_byte]);
        next.push('\n');
        next.push_str(prefix);
        next.push_str(&buffer[end_byte..]);
        return EnterOutcome::Edited {
            buffer: next,
            cursor: start + 1 + prefix.chars().count(),
            rule: EnterRule::ContinueBullet,
        };
    }

    if current_line.trim().is_empty() {
        return EnterOutcome::NoChange;
    }

    let mut next = String::with_capacity(buffer.len() + 2 * CANONICAL_BULLET.len() + 1);
    next.push_str(&buffer[..line_start]);
    next.push_str(CANONICAL_BULLET);
    next.push_str(current_line);
    next.push('\n');
    next.push_str(CANONICAL_BULLET);
    next.push_str(&buffer[end_byte..]);
    EnterOutcome::Edited {
        buffer: next,
        cursor: start + 2 * CANONICAL_BULLET.chars().count() + 1,
        rule: EnterRule::StartList,
    }
}

/// The leading `whitespace, marker, whitespace` run of a bullet line, if any.
pub fn bullet_prefix(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    let marker = trimmed.chars().next()?;
    if !BULLET_MARKERS.contains(&marker) {
        return None;
    }
    let lead = line.len() - trimmed.len();
    let after = &trimmed[marker.len_utf8()..];
    let gap = after.len() - after.trim_start().len();
    Some(&line[..lead + marker.len_utf8() + gap])
}

pub fn is_bullet_line(line: &str) -> bool {
    bullet_prefix(line).is_some()
}

/// Text of a bullet line without its marker; non-bullet lines are returned trimmed.
pub fn bullet_text(line: &str) -> &str {
    match bullet_prefix(line) {
        Some(prefix) => line[prefix.len()..].trim_end(),
        None => line.trim(),
    }
}

fn byte_offset(s: &str, chars: usize) -> usize {
    s.char_indices().nth(chars).map_or(s.len(), |(b, _)| b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edited(outcome: EnterOutcome) -> (String, usize, EnterRule) {
        match outcome {
            EnterOutcome::Edited {
                buffer,
                cursor,
                rule,
            } => (buffer, cursor, rule),
            EnterOutcome::NoChange => panic!("expected an edit"),
        }
    }

    #[test]
    fn test_continues_existing_bullet() {
        let (buffer, cursor, rule) = edited(on_enter("• Led team", 10, 10));
        assert_eq!(buffer, "• Led team\n• ");
        assert_eq!(cursor, 13);
        assert_eq!(rule, EnterRule::ContinueBullet);
    }

    #[test]
    fn test_continues_dash_marker_with_indent() {
        let (buffer, cursor, _) = edited(on_enter("  - one", 7, 7));
        assert_eq!(buffer, "  - one\n  - ");
        assert_eq!(cursor, 12);
    }

    #[test]
    fn test_continuation_splits_line_at_cursor() {
        let (buffer, cursor, _) = edited(on_enter("* abcdef", 5, 5));
        assert_eq!(buffer, "* abc\n* def");
        assert_eq!(cursor, 8);
    }

    #[test]
    fn test_selection_is_replaced() {
        let (buffer, _, _) = edited(on_enter("- keep DROP tail", 7, 12));
        assert_eq!(buffer, "- keep \n- tail");
    }

    #[test]
    fn test_plain_line_becomes_list() {
        let (buffer, cursor, rule) = edited(on_enter("Shipped v2", 10, 10));
        assert_eq!(buffer, "• Shipped v2\n• ");
        assert_eq!(cursor, 15);
        assert_eq!(rule, EnterRule::StartList);
    }

    #[test]
    fn test_only_current_line_is_converted() {
        let (buffer, cursor, _) = edited(on_enter("Intro paragraph\nFirst item", 26, 26));
        assert_eq!(buffer, "Intro paragraph\n• First item\n• ");
        assert_eq!(cursor, 31);
    }

    #[test]
    fn test_blank_line_is_left_to_default() {
        assert_eq!(on_enter("", 0, 0), EnterOutcome::NoChange);
        assert_eq!(on_enter("text\n   ", 8, 8), EnterOutcome::NoChange);
    }

    #[test]
    fn test_cursor_counts_characters_not_bytes() {
        let (buffer, cursor, _) = edited(on_enter("• café", 6, 6));
        assert_eq!(buffer, "• café\n• ");
        assert_eq!(cursor, 9);
    }

    #[test]
    fn test_out_of_range_cursor_is_clamped() {
        let (buffer, _, _) = edited(on_enter("- x", 99, 99));
        assert_eq!(buffer, "- x\n- ");
    }

    #[test]
    fn test_bullet_text_strips_marker() {
        assert_eq!(bullet_text("  •  Built things "), "Built things");
        assert_eq!(bullet_text(" plain "), "plain");
        assert!(is_bullet_line("* x"));
        assert!(!is_bullet_line("x *"));
    }
}
