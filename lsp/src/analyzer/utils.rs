use ropey::Rope;
use tower_lsp::lsp_types::{Position, Range};
use xule_core::token::Span;

/// Convert an LSP (UTF-16) position to a rope char index, clamped to the end
/// of the line.
pub fn position_to_char_idx(text: &Rope, pos: Position) -> usize {
    let line_idx = pos.line as usize;
    if line_idx >= text.len_lines() {
        return text.len_chars();
    }
    let line_start_char = text.line_to_char(line_idx);
    let line_slice = text.line(line_idx);
    let target_utf16 = pos.character as usize;

    if let Some(s) = line_slice.as_str() {
        if s.is_ascii() {
            let len_chars = s.trim_end_matches(['\n', '\r']).len();
            return line_start_char + target_utf16.min(len_chars);
        }
    }

    let mut seen_utf16 = 0usize;
    let mut chars_in_line = 0usize;
    for ch in line_slice.chars() {
        if ch == '\n' || ch == '\r' {
            break;
        }
        let u16_len = ch.len_utf16();
        if seen_utf16 + u16_len > target_utf16 {
            break;
        }
        seen_utf16 += u16_len;
        chars_in_line += 1;
        if seen_utf16 == target_utf16 {
            break;
        }
    }
    line_start_char + chars_in_line
}

/// LSP position to the 1-based (line, column) in chars used by syntax spans.
pub fn position_to_line_col(text: &Rope, pos: Position) -> (u32, u32) {
    let idx = position_to_char_idx(text, pos);
    let line = text.char_to_line(idx);
    let column = idx - text.line_to_char(line);
    (line as u32 + 1, column as u32 + 1)
}

pub fn char_idx_to_position(text: &Rope, idx: usize) -> Position {
    let idx = idx.min(text.len_chars());
    let line = text.char_to_line(idx);
    let line_start = text.line_to_char(line);
    let character = text.char_to_utf16_cu(idx) - text.char_to_utf16_cu(line_start);
    Position::new(line as u32, character as u32)
}

pub fn span_to_range(text: &Rope, span: &Span) -> Range {
    Range::new(
        char_idx_to_position(text, span.start.offset),
        char_idx_to_position(text, span.end.offset),
    )
}

/// Case-insensitive subsequence test used before ranking completion labels.
pub fn is_subsequence(needle: &str, haystack: &str) -> bool {
    let mut hay = haystack.chars().flat_map(char::to_lowercase);
    needle
        .chars()
        .flat_map(char::to_lowercase)
        .all(|n| hay.any(|h| h == n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use xule_core::token::Position as CorePosition;

    #[test]
    fn test_position_round_trip_with_wide_chars() {
        let rope = Rope::from_str("a = '𝄞x'\nnext");
        // the clef takes two UTF-16 units
        let idx = position_to_char_idx(&rope, Position::new(0, 7));
        assert_eq!(rope.char(idx), 'x');
        assert_eq!(char_idx_to_position(&rope, idx), Position::new(0, 7));
        assert_eq!(position_to_line_col(&rope, Position::new(1, 2)), (2, 3));
    }

    #[test]
    fn test_position_clamps_to_line_end() {
        let rope = Rope::from_str("ab\ncd");
        assert_eq!(position_to_char_idx(&rope, Position::new(0, 40)), 2);
        assert_eq!(position_to_char_idx(&rope, Position::new(9, 0)), 5);
    }

    #[test]
    fn test_span_to_range() {
        let rope = Rope::from_str("x\n  $abc");
        let span = Span::new(CorePosition::new(2, 3, 4), CorePosition::new(2, 7, 8));
        let range = span_to_range(&rope, &span);
        assert_eq!(range.start, Position::new(1, 2));
        assert_eq!(range.end, Position::new(1, 6));
    }

    #[test]
    fn test_subsequence() {
        assert!(is_subsequence("lnm", "local-name"));
        assert!(is_subsequence("", "anything"));
        assert!(is_subsequence("LEN", "length"));
        assert!(!is_subsequence("xyz", "length"));
    }
}
