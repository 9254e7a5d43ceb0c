//! Sorting of the named bindings inside a brace-delimited specifier list.
//!
//! The interior of the braces is split into per-binding fragment runs by a
//! small state machine (`before → specifier → after`), sorted by
//! external-interface name, and reassembled with comma and newline repair.
//! Lists with fewer than two bindings are emitted verbatim.

use crate::chunks::EngineKind;
use crate::compare::{self, BindingKind};
use crate::tokens::{collapse_blank_runs, print_tokens, scan, Token, TokenKind};

#[derive(Debug, Default)]
struct SpecifierItem {
    before: Vec<Token>,
    specifier: Vec<Token>,
    after: Vec<Token>,
    had_comma: bool,
}

#[derive(Debug, Default)]
struct SpecifierList {
    /// Trivia owned by the opening brace, not the first binding.
    before: Vec<Token>,
    items: Vec<SpecifierItem>,
    /// Trivia between the last binding and the closing brace.
    after: Vec<Token>,
}

enum State {
    Before,
    Specifier,
    After,
}

fn parse_specifier_list(tokens: &[Token]) -> SpecifierList {
    let mut list = SpecifierList::default();
    let mut current = SpecifierItem::default();
    let mut pending: Vec<Token> = Vec::new();
    let mut state = State::Before;

    for token in tokens {
        match state {
            State::Before => match token.kind {
                TokenKind::Newline => {
                    current.before.push(token.clone());
                    // Trivia before the first newline belongs to the brace.
                    if list.items.is_empty() && list.before.is_empty() {
                        list.before.append(&mut current.before);
                    }
                }
                TokenKind::Spaces | TokenKind::LineComment | TokenKind::BlockComment => {
                    current.before.push(token.clone());
                }
                TokenKind::Punct | TokenKind::Word => {
                    if list.items.is_empty() && list.before.is_empty() {
                        list.before = std::mem::take(&mut current.before);
                    }
                    current.specifier.push(token.clone());
                    state = State::Specifier;
                }
            },
            State::Specifier => match token.kind {
                TokenKind::Punct if token.text == "," => {
                    current.specifier.append(&mut pending);
                    current.had_comma = true;
                    state = State::After;
                }
                TokenKind::Punct | TokenKind::Word => {
                    current.specifier.append(&mut pending);
                    current.specifier.push(token.clone());
                }
                _ => pending.push(token.clone()),
            },
            State::After => match token.kind {
                TokenKind::Newline => {
                    current.after.push(token.clone());
                    list.items.push(std::mem::take(&mut current));
                    state = State::Before;
                }
                TokenKind::Spaces | TokenKind::LineComment => {
                    current.after.push(token.clone());
                }
                TokenKind::BlockComment => {
                    // A block comment spanning lines belongs to the next
                    // binding, not this one.
                    if token.spans_lines() {
                        list.items.push(std::mem::take(&mut current));
                        current.before.push(token.clone());
                        state = State::Before;
                    } else {
                        current.after.push(token.clone());
                    }
                }
                TokenKind::Punct | TokenKind::Word => {
                    list.items.push(std::mem::take(&mut current));
                    current.specifier.push(token.clone());
                    state = State::Specifier;
                }
            },
        }
    }

    match state {
        State::Before => list.after = current.before,
        State::Specifier => {
            current.after = pending;
            list.items.push(current);
        }
        State::After => list.items.push(current),
    }
    list
}

fn strip_quotes(name: &str) -> &str {
    let mut chars = name.chars();
    match (chars.next(), name.chars().last()) {
        (Some(open @ ('"' | '\'' | '`')), Some(close)) if open == close && name.len() >= 2 => {
            &name[1..name.len() - 1]
        }
        _ => name,
    }
}

/// External-interface name, local name and kind of one binding, derived
/// lexically from its token run: `[type|typeof] name [as alias]`. An
/// `import` exposes `name` to this module; an `export` exposes `alias`
/// (or `name`) to the module graph.
fn specifier_names(item: &SpecifierItem, engine: EngineKind) -> (String, String, BindingKind) {
    let words: Vec<&str> = item
        .specifier
        .iter()
        .filter(|t| t.kind == TokenKind::Word)
        .map(|t| t.text.as_str())
        .collect();

    // `{ type as foo }` binds the name `type`; a kind marker needs a
    // following name that is not just its own alias.
    let (kind, rest) = match words.split_first() {
        Some((&marker @ ("type" | "typeof"), rest))
            if !rest.is_empty() && !(rest.len() == 2 && rest[0] == "as") =>
        {
            let kind = if marker == "type" {
                BindingKind::Type
            } else {
                BindingKind::Typeof
            };
            (kind, rest)
        }
        _ => (BindingKind::Value, &words[..]),
    };

    let name = strip_quotes(rest.first().copied().unwrap_or_default()).to_string();
    let alias = if rest.len() >= 3 && rest[rest.len() - 2] == "as" {
        Some(strip_quotes(rest[rest.len() - 1]).to_string())
    } else {
        None
    };

    match engine {
        EngineKind::Imports => {
            let local = alias.unwrap_or_else(|| name.clone());
            (name, local, kind)
        }
        EngineKind::Exports => {
            let external = alias.unwrap_or_else(|| name.clone());
            (external, name, kind)
        }
    }
}

fn needs_starting_newline(tokens: &[Token]) -> bool {
    let first = tokens.iter().find(|t| t.kind != TokenKind::Spaces);
    matches!(first, Some(t) if t.is_comment() && !t.spans_lines())
}

fn ends_with_newline(text: &str) -> bool {
    text.ends_with('\n') || text.ends_with('\r')
}

/// Prints the specifier run with a comma inserted right after its last code
/// token, leaving trailing trivia in place.
fn with_inserted_comma(specifier: &[Token]) -> String {
    let split = specifier
        .iter()
        .rposition(|t| t.is_code())
        .map(|p| p + 1)
        .unwrap_or(specifier.len());
    format!(
        "{},{}",
        print_tokens(&specifier[..split]),
        print_tokens(&specifier[split..])
    )
}

fn print_sorted(list: &SpecifierList, order: &[usize], newline: &str) -> String {
    let had_trailing_comma = list.items.last().is_some_and(|item| item.had_comma);
    let mut out = print_tokens(&list.before);

    for (pos, &idx) in order.iter().enumerate() {
        let item = &list.items[idx];
        let is_last = pos == order.len() - 1;

        // A binding led by a same-line comment must not end up glued to the
        // previous binding's line, or the comment changes owners.
        if pos > 0 && needs_starting_newline(&item.before) && !ends_with_newline(&out) {
            out.push_str(newline);
        }
        out.push_str(&print_tokens(&item.before));

        let wants_comma = !is_last || had_trailing_comma;
        if wants_comma && item.had_comma {
            out.push_str(&print_tokens(&item.specifier));
            out.push(',');
        } else if wants_comma {
            out.push_str(&with_inserted_comma(&item.specifier));
        } else {
            out.push_str(&print_tokens(&item.specifier));
        }

        if is_last {
            let tail = format!("{}{}", print_tokens(&item.after), print_tokens(&list.after));
            out.push_str(&collapse_blank_runs(&tail));
        } else {
            out.push_str(&print_tokens(&item.after));
        }
    }
    out
}

/// Reprints a statement with the bindings in its brace-delimited list
/// sorted by external-interface name. Statements without at least two
/// bindings before the source string are returned verbatim, which also
/// keeps import attribute objects (`with { ... }`) untouched.
pub fn print_with_sorted_specifiers(
    stmt_text: &str,
    src_offset: Option<usize>,
    engine: EngineKind,
    newline: &str,
) -> String {
    let tokens = scan(stmt_text, 0);
    let Some(open) = tokens
        .iter()
        .position(|t| t.kind == TokenKind::Punct && t.text == "{")
    else {
        return stmt_text.to_string();
    };
    if let Some(src_lo) = src_offset {
        if tokens[open].lo > src_lo {
            return stmt_text.to_string();
        }
    }

    let mut depth = 0usize;
    let mut close = None;
    for (i, token) in tokens.iter().enumerate().skip(open) {
        if token.kind == TokenKind::Punct {
            match token.text.as_str() {
                "{" => depth += 1,
                "}" => {
                    depth -= 1;
                    if depth == 0 {
                        close = Some(i);
                        break;
                    }
                }
                _ => {}
            }
        }
    }
    let Some(close) = close else {
        return stmt_text.to_string();
    };

    let list = parse_specifier_list(&tokens[open + 1..close]);
    if list.items.len() < 2 {
        return stmt_text.to_string();
    }

    let names: Vec<_> = list
        .items
        .iter()
        .map(|item| specifier_names(item, engine))
        .collect();
    let mut order: Vec<usize> = (0..list.items.len()).collect();
    order.sort_by(|&a, &b| {
        let (ext_a, local_a, kind_a) = &names[a];
        let (ext_b, local_b, kind_b) = &names[b];
        compare::compare(ext_a, ext_b)
            .then_with(|| compare::compare(local_a, local_b))
            .then_with(|| {
                let rank = |k: &BindingKind| match k {
                    BindingKind::Type => 0u8,
                    BindingKind::Typeof => 1,
                    BindingKind::Value => 2,
                };
                rank(kind_a).cmp(&rank(kind_b))
            })
    });

    format!(
        "{}{}{}",
        &stmt_text[..tokens[open].hi],
        print_sorted(&list, &order, newline),
        &stmt_text[tokens[close].lo..]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sort_import(text: &str) -> String {
        let src_offset = text.rfind(['\'', '"']).map(|p| text[..p].rfind(['\'', '"']).unwrap());
        print_with_sorted_specifiers(text, src_offset, EngineKind::Imports, "\n")
    }

    #[test]
    fn test_sorts_by_external_name_with_alias() {
        assert_eq!(
            sort_import("import { e, b, a as c } from 'x';"),
            "import { a as c, b, e } from 'x';"
        );
    }

    #[test]
    fn test_zero_or_one_binding_is_verbatim() {
        for text in [
            "import 'x';",
            "import a from 'x';",
            "import {  b  } from 'x';",
            "import * as ns from 'x';",
        ] {
            assert_eq!(sort_import(text), text);
        }
    }

    #[test]
    fn test_already_sorted_list_round_trips() {
        let text = "import { a, b, c } from 'x';";
        assert_eq!(sort_import(text), text);
    }

    #[test]
    fn test_trailing_comma_is_mirrored() {
        assert_eq!(
            sort_import("import {\n    b,\n    a,\n} from 'x';"),
            "import {\n    a,\n    b,\n} from 'x';"
        );
        assert_eq!(
            sort_import("import { b, a } from 'x';"),
            "import { a, b } from 'x';"
        );
    }

    #[test]
    fn test_comments_travel_with_their_binding() {
        assert_eq!(
            sort_import("import {\n    b, // bee\n    a, // ay\n} from 'x';"),
            "import {\n    a, // ay\n    b, // bee\n} from 'x';"
        );
    }

    #[test]
    fn test_trailing_line_comment_stays_with_its_binding() {
        assert_eq!(
            sort_import("import { b, // bee\na } from 'x';"),
            "import { a, b // bee\n} from 'x';"
        );
    }

    #[test]
    fn test_newline_inserted_when_comment_would_change_owner() {
        assert_eq!(
            sort_import("import { \n// see\nb, a } from 'x';"),
            "import { \na, \n// see\nb } from 'x';"
        );
    }

    #[test]
    fn test_type_markers_are_not_names() {
        assert_eq!(
            sort_import("import { type z, b } from 'x';"),
            "import { b, type z } from 'x';"
        );
    }

    #[test]
    fn test_type_as_binds_the_name_type() {
        assert_eq!(
            sort_import("import { type as t, b } from 'x';"),
            "import { b, type as t } from 'x';"
        );
    }

    #[test]
    fn test_exports_sort_by_exported_alias() {
        assert_eq!(
            print_with_sorted_specifiers(
                "export { a as z, b as y };",
                None,
                EngineKind::Exports,
                "\n"
            ),
            "export { b as y, a as z };"
        );
    }

    #[test]
    fn test_import_attributes_are_left_alone() {
        let text = "import data from './d.json' with { type: 'json', lazy: 'no' };";
        let src = text.find("'./d.json'");
        assert_eq!(
            print_with_sorted_specifiers(text, src, EngineKind::Imports, "\n"),
            text
        );
    }

    #[test]
    fn test_bindings_sort_but_attributes_do_not() {
        let text = "import { b, a } from './d.json' with { type: 'json' };";
        let src = text.find("'./d.json'");
        assert_eq!(
            print_with_sorted_specifiers(text, src, EngineKind::Imports, "\n"),
            "import { a, b } from './d.json' with { type: 'json' };"
        );
    }

    #[test]
    fn test_blank_run_before_closing_brace_is_collapsed() {
        assert_eq!(
            sort_import("import {\n    b,\n    a,\n\n} from 'x';"),
            "import {\n    a,\n    b,\n} from 'x';"
        );
    }

    #[test]
    fn test_quoted_external_names() {
        assert_eq!(
            sort_import("import { 'z-z' as z, 'a-a' as a } from 'x';"),
            "import { 'a-a' as a, 'z-z' as z } from 'x';"
        );
    }
}
