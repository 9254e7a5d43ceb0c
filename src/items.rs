//! Item extraction: one statement plus every piece of surrounding
//! formatting that belongs to it.
//!
//! Each statement in a chunk is turned into a positioned record with a
//! fully rendered `code` fragment (leading comments, the statement text
//! with its bindings pre-sorted, trailing same-line comments, indentation
//! and trailing spaces) and a `[lo, hi)` byte range. Once the items of a
//! chunk are rebuilt in original order they cover the chunk's span with no
//! gaps other than the newlines between items.

use crate::chunks::{Chunk, EngineKind};
use crate::compare::SortKey;
use crate::specifiers::print_with_sorted_specifiers;
use crate::tokens::{remove_blank_lines, scan, LineIndex, Token, TokenKind};

#[derive(Debug)]
pub struct Item {
    pub code: String,
    pub lo: usize,
    pub hi: usize,
    pub is_side_effect: bool,
    pub key: SortKey,
    pub index: usize,
    /// Set when the item ends in a line comment, so the reprinter can keep
    /// it from swallowing whatever follows the chunk.
    pub needs_newline: bool,
}

/// Indentation owned by a statement (or its first leading comment): the
/// whitespace between the last newline and `pos`. At the start of the file
/// any leading whitespace counts even without a newline.
fn indentation_before(text: &str, pos: usize) -> &str {
    let prefix = &text[..pos];
    let ws = match prefix.rfind(|c: char| !c.is_whitespace()) {
        Some(p) => {
            let ch = prefix[p..].chars().next().expect("rfind returns a char start");
            let ws = &prefix[p + ch.len_utf8()..];
            if !ws.contains(['\n', '\r']) {
                return "";
            }
            ws
        }
        None => prefix,
    };
    match ws.rfind(['\n', '\r']) {
        Some(p) => &ws[p + 1..],
        None => ws,
    }
}

pub fn extract_items(
    chunk: &Chunk,
    text: &str,
    lines: &LineIndex,
    engine: EngineKind,
    newline: &str,
) -> Vec<Item> {
    let stmts = &chunk.statements;
    let mut items: Vec<Item> = Vec::with_capacity(stmts.len());

    for (i, stmt) in stmts.iter().enumerate() {
        let stmt_start_line = lines.line_of(stmt.lo);
        let stmt_end_line = lines.line_of(stmt.hi - 1);
        let last_line = if i == 0 {
            stmt_start_line - 1
        } else {
            lines.line_of(stmts[i - 1].hi - 1)
        };

        // Leading comments. The gap starts after the previous item's claimed
        // range, so a comment can never be owned twice. The first item of a
        // chunk only claims comments on its own line; later items also claim
        // the lines between them and their predecessor.
        let gap_from = if i == 0 {
            chunk.preceding_end
        } else {
            items[i - 1].hi
        };
        let gap = scan(&text[gap_from..stmt.lo], gap_from);
        let leading: Vec<&Token> = gap
            .iter()
            .filter(|t| t.is_comment())
            .filter(|c| {
                let c_start = lines.line_of(c.lo);
                let c_end = lines.line_of(c.hi - 1);
                c_start <= stmt_start_line && c_end > last_line && (i > 0 || c_start > last_line)
            })
            .collect();

        let first_lo = leading.first().map_or(stmt.lo, |c| c.lo);
        let indentation = indentation_before(text, first_lo);

        // Trailing comments: everything after the statement that ends on the
        // statement's own line. A block comment that runs past the line
        // belongs to the next item.
        let bound = stmts.get(i + 1).map_or(text.len(), |next| next.lo);
        let mut trailing: Vec<Token> = Vec::new();
        for token in scan(&text[stmt.hi..bound], stmt.hi) {
            match token.kind {
                TokenKind::Spaces => continue,
                TokenKind::LineComment | TokenKind::BlockComment
                    if lines.line_of(token.hi - 1) == stmt_end_line =>
                {
                    trailing.push(token);
                }
                _ => break,
            }
        }

        let last_hi = trailing.last().map_or(stmt.hi, |c| c.hi);
        let trailing_spaces: String = text[last_hi..]
            .chars()
            .take_while(|c| c.is_whitespace() && *c != '\n' && *c != '\r')
            .collect();

        let rendered = print_with_sorted_specifiers(
            &text[stmt.lo..stmt.hi],
            stmt.src_lo.map(|p| p - stmt.lo),
            engine,
            newline,
        );

        let mut code = String::new();
        code.push_str(indentation);
        for (k, comment) in leading.iter().enumerate() {
            code.push_str(&comment.text);
            let gap_end = leading.get(k + 1).map_or(stmt.lo, |next| next.lo);
            code.push_str(&remove_blank_lines(&text[comment.hi..gap_end]));
        }
        code.push_str(&rendered);
        let mut prev = stmt.hi;
        for comment in &trailing {
            code.push_str(&text[prev..comment.lo]);
            code.push_str(&comment.text);
            prev = comment.hi;
        }
        code.push_str(&trailing_spaces);

        let needs_newline = trailing
            .last()
            .is_some_and(|c| c.kind == TokenKind::LineComment);
        let source = stmt.source.clone().unwrap_or_default();

        items.push(Item {
            code,
            lo: first_lo - indentation.len(),
            hi: last_hi + trailing_spaces.len(),
            is_side_effect: stmt.is_side_effect,
            key: SortKey::new(&source, stmt.kind),
            index: i,
            needs_newline,
        });
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunks::{collect_chunks, EngineKind};
    use crate::parser::TypeScriptParser;

    fn items_of(source: &str) -> Vec<Item> {
        let parser = TypeScriptParser::new();
        let parsed = parser.parse(source, "test.ts").unwrap();
        let chunks = collect_chunks(&parsed, source, EngineKind::Imports);
        assert_eq!(chunks.len(), 1, "expected a single chunk");
        let lines = LineIndex::new(source);
        extract_items(&chunks[0], source, &lines, EngineKind::Imports, "\n")
    }

    #[test]
    fn test_items_cover_their_own_text() {
        let source = "import a from 'a';\nimport b from 'b';\n";
        let items = items_of(source);
        assert_eq!(items[0].code, "import a from 'a';");
        assert_eq!(items[1].code, "import b from 'b';");
        assert_eq!(&source[items[0].lo..items[0].hi], "import a from 'a';");
    }

    #[test]
    fn test_leading_own_line_comment_belongs_to_second_item() {
        let source = "import a from 'a';\n// bee\nimport b from 'b';\n";
        let items = items_of(source);
        assert_eq!(items[1].code, "// bee\nimport b from 'b';");
    }

    #[test]
    fn test_first_item_does_not_claim_comment_above_it() {
        let source = "// file header\nimport a from 'a';\n";
        let items = items_of(source);
        assert_eq!(items[0].code, "import a from 'a';");
    }

    #[test]
    fn test_first_item_claims_same_line_comment() {
        let source = "/* hi */ import a from 'a';\n";
        let items = items_of(source);
        assert_eq!(items[0].code, "/* hi */ import a from 'a';");
    }

    #[test]
    fn test_trailing_same_line_comment_is_claimed() {
        let source = "import a from 'a'; // ay\nimport b from 'b';\n";
        let items = items_of(source);
        assert_eq!(items[0].code, "import a from 'a'; // ay");
        assert!(items[0].needs_newline);
        assert!(!items[1].needs_newline);
    }

    #[test]
    fn test_multiline_block_comment_moves_to_next_item() {
        let source = "import a from 'a'; /* to\nb */ import b from 'b';\n";
        let items = items_of(source);
        assert_eq!(items[0].code, "import a from 'a'; ");
        assert_eq!(items[1].code, "/* to\nb */ import b from 'b';");
    }

    #[test]
    fn test_blank_lines_between_leading_comments_collapse() {
        let source = "import a from 'a';\n// one\n\n\n// two\nimport b from 'b';\n";
        let items = items_of(source);
        assert_eq!(items[1].code, "// one\n// two\nimport b from 'b';");
    }

    #[test]
    fn test_indentation_is_captured() {
        let source = "import a from 'a';\n    import b from 'b';\n";
        let items = items_of(source);
        assert_eq!(items[1].code, "    import b from 'b';");
        assert_eq!(&source[items[1].lo..items[1].hi], "    import b from 'b';");
    }

    #[test]
    fn test_bindings_are_pre_sorted_in_code() {
        let source = "import { b, a } from 'x';\n";
        let items = items_of(source);
        assert_eq!(items[0].code, "import { a, b } from 'x';");
    }

    #[test]
    fn test_trailing_spaces_are_claimed() {
        let source = "import b from 'b'; import a from 'a';\n";
        let items = items_of(source);
        assert_eq!(items[0].code, "import b from 'b'; ");
        assert_eq!(items[1].code, "import a from 'a';");
    }
}
