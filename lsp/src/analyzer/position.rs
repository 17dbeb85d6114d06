//! Caret resolution: map a 1-based (line, column) to the tree node under it
//! and the token-stream index prediction should start from.

use xule_core::tree::{NodeId, SyntaxTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeInfo {
    pub node: NodeId,
    /// Caret offset inside the node's text, in chars.
    pub offset: usize,
    /// Stream index to seed candidate collection with.
    pub token_index: usize,
}

#[derive(Debug, Clone, Copy)]
struct Hit {
    node: NodeId,
    offset: usize,
    /// False when the caret only follows the node (closest-subtree recovery).
    touching: bool,
}

/// Resolve a caret against `tree`. `None` only when the position lies
/// outside the root's span.
pub fn resolve(tree: &SyntaxTree, line: u32, column: u32) -> Option<NodeInfo> {
    if tree.is_empty() {
        return None;
    }
    let root = tree.root();
    let span = tree.span(root)?;
    if !span.touches(line, column) {
        return None;
    }
    let info = match find(tree, root, line, column) {
        Some(hit) => to_node_info(tree, hit),
        None => NodeInfo {
            node: root,
            offset: 0,
            token_index: 0,
        },
    };
    Some(info)
}

fn find(tree: &SyntaxTree, node: NodeId, line: u32, column: u32) -> Option<Hit> {
    if tree.is_terminal(node) {
        return terminal_offset(tree, node, line, column).map(|offset| Hit {
            node,
            offset,
            touching: true,
        });
    }
    let span = tree.span(node)?;
    if !span.touches(line, column) {
        return None;
    }
    tree.children(node)
        .iter()
        .find_map(|&child| find(tree, child, line, column))
        .or_else(|| recover(tree, node, line, column))
}

/// Right-most terminal of the subtree ending at or before the caret.
fn recover(tree: &SyntaxTree, node: NodeId, line: u32, column: u32) -> Option<Hit> {
    tree.terminals(node)
        .into_iter()
        .rev()
        .find(|t| {
            tree.span(*t)
                .is_some_and(|s| (s.end.line, s.end.column) <= (line, column))
        })
        .and_then(|t| {
            let len = tree.token(t)?.char_len();
            Some(Hit {
                node: t,
                offset: len,
                touching: false,
            })
        })
}

/// Caret offset inside a terminal, walking the token text line by line.
/// Zero-width tokens only match their exact position.
fn terminal_offset(tree: &SyntaxTree, node: NodeId, line: u32, column: u32) -> Option<usize> {
    let token = tree.token(node)?;
    let span = token.span;
    if span.is_empty() {
        return (span.start.line == line && span.start.column == column).then_some(0);
    }
    if !span.touches(line, column) {
        return None;
    }
    let mut offset = 0;
    for (i, (width, break_len)) in line_widths(&token.text).into_iter().enumerate() {
        let part_line = span.start.line + i as u32;
        if part_line == line {
            let first_column = if i == 0 { span.start.column } else { 1 };
            let within = column.saturating_sub(first_column) as usize;
            return Some(offset + within.min(width));
        }
        offset += width + break_len;
    }
    None
}

/// Char width of each line of `text` and of the break ending it. `\r\n`
/// is one break, a lone `\r` another.
fn line_widths(text: &str) -> Vec<(usize, usize)> {
    let mut lines = Vec::new();
    let mut width = 0;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\n' => {
                lines.push((width, 1));
                width = 0;
            }
            '\r' if chars.peek() == Some(&'\n') => {
                chars.next();
                lines.push((width, 2));
                width = 0;
            }
            '\r' => {
                lines.push((width, 1));
                width = 0;
            }
            _ => width += 1,
        }
    }
    lines.push((width, 0));
    lines
}

fn to_node_info(tree: &SyntaxTree, hit: Hit) -> NodeInfo {
    let Some(token) = tree.token(hit.node) else {
        return NodeInfo {
            node: hit.node,
            offset: hit.offset,
            token_index: 0,
        };
    };
    let last = tree.tokens().len().saturating_sub(1);
    let index = token.index;
    let next = (index + 1).min(last);
    let token_index = if !hit.touching {
        next
    } else if token.kind.is_identifier_like() {
        index
    } else if hit.offset == 0 {
        index.saturating_sub(1)
    } else if hit.offset >= token.char_len() {
        next
    } else {
        index
    };
    NodeInfo {
        node: hit.node,
        offset: hit.offset,
        token_index,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xule_core::{
        parse,
        token::{TokenKind, tokenize_for_completion},
        tree::SyntaxTree,
    };

    fn tree_of(text: &str) -> SyntaxTree {
        parse(tokenize_for_completion(text).unwrap().tokens).tree
    }

    fn kind_at(tree: &SyntaxTree, info: &NodeInfo) -> Option<TokenKind> {
        tree.token_kind(info.node)
    }

    #[test]
    fn test_identifier_under_caret() {
        let tree = tree_of("assert a satisfied $total > 0");
        let info = resolve(&tree, 1, 23).unwrap();
        assert_eq!(kind_at(&tree, &info), Some(TokenKind::Variable));
        assert_eq!(info.offset, 3);
        assert_eq!(info.token_index, tree.token(info.node).unwrap().index);
    }

    #[test]
    fn test_after_dot_seeds_next_token() {
        let tree = tree_of("output o $x.");
        let info = resolve(&tree, 1, 13).unwrap();
        assert_eq!(kind_at(&tree, &info), Some(TokenKind::Dot));
        let dot = tree.token(info.node).unwrap().index;
        assert_eq!(info.token_index, dot + 1);
        assert_eq!(tree.tokens()[info.token_index].kind, TokenKind::Eof);
    }

    #[test]
    fn test_gap_recovers_previous_token() {
        let tree = tree_of("assert a satisfied   true");
        let info = resolve(&tree, 1, 21).unwrap();
        assert_eq!(kind_at(&tree, &info), Some(TokenKind::Satisfied));
        assert_eq!(info.offset, "satisfied".len());
        let satisfied = tree.token(info.node).unwrap().index;
        assert_eq!(info.token_index, satisfied + 1);
    }

    #[test]
    fn test_multiline_string_content() {
        let tree = tree_of("output o \"first\nsecond\"");
        let info = resolve(&tree, 2, 4).unwrap();
        assert_eq!(kind_at(&tree, &info), Some(TokenKind::StringContent));
        assert_eq!(info.offset, "first\n".len() + 3);
    }

    #[test]
    fn test_multiline_string_with_crlf_and_lone_cr() {
        let tree = tree_of("output o \"ab\r\ncd\ref\"");
        let info = resolve(&tree, 3, 2).unwrap();
        assert_eq!(kind_at(&tree, &info), Some(TokenKind::StringContent));
        assert_eq!(info.offset, "ab\r\ncd\r".chars().count() + 1);
        assert_eq!(line_widths("ab\r\ncd\ref"), vec![(2, 2), (2, 1), (2, 0)]);
    }

    #[test]
    fn test_outside_and_empty() {
        let tree = tree_of("output o 1");
        assert!(resolve(&tree, 3, 1).is_none());
        let empty = tree_of("");
        let info = resolve(&empty, 1, 1).unwrap();
        assert_eq!(kind_at(&empty, &info), Some(TokenKind::Eof));
        assert_eq!(info.token_index, 0);
    }

    #[test]
    fn test_leading_whitespace_falls_back_to_root() {
        let tree = tree_of("   output o 1");
        let info = resolve(&tree, 1, 2).unwrap();
        assert_eq!(info.node, tree.root());
        assert_eq!(info.offset, 0);
    }
}
