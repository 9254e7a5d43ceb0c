//! Chunk discovery over the host's top-level statement list.
//!
//! A chunk is a maximal contiguous run of statements relevant to one engine
//! (imports or exports), separated only by comments and whitespace. Chunk
//! boundaries come solely from `module.body`, so a chunk never crosses a
//! declaration of an unrelated kind.

use swc_common::Spanned;
use swc_ecma_ast::{ModuleDecl, ModuleItem};

use crate::compare::BindingKind;
use crate::parser::ParsedModule;
use crate::tokens::{scan, LineIndex, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    Imports,
    Exports,
}

/// One relevant module-linkage statement, reduced to what the text-level
/// engine needs.
#[derive(Debug, Clone)]
pub struct Linkage {
    pub lo: usize,
    pub hi: usize,
    /// The cooked module specifier; empty-source exports carry `None`.
    pub source: Option<String>,
    /// Byte offset of the source string token, when present.
    pub src_lo: Option<usize>,
    /// Statement-level type marker (`import type` / `export type`).
    pub kind: BindingKind,
    pub is_side_effect: bool,
}

/// A chunk plus the end offset of whatever top-level item precedes it
/// (0 at the start of the file). The extractor needs that boundary to judge
/// which leading comments belong to the first statement.
#[derive(Debug)]
pub struct Chunk {
    pub statements: Vec<Linkage>,
    pub preceding_end: usize,
}

/// True when a binding brace appears before `limit` in the statement text.
/// Distinguishes `import {} from "x"` (empty binding list) from a genuine
/// side-effect import. Comments are skipped, so a brace in a comment does
/// not count.
fn has_brace_before(text: &str, lo: usize, limit: usize) -> bool {
    scan(&text[lo..limit], lo)
        .iter()
        .any(|t| t.kind == TokenKind::Punct && t.text == "{")
}

fn linkage_of(
    decl: &ModuleDecl,
    parsed: &ParsedModule,
    text: &str,
    engine: EngineKind,
) -> Option<Linkage> {
    match (engine, decl) {
        (EngineKind::Imports, ModuleDecl::Import(import)) => {
            let (lo, hi) = parsed.byte_range(import.span);
            let (src_lo, _) = parsed.byte_range(import.src.span);
            let kind = if import.type_only {
                BindingKind::Type
            } else {
                BindingKind::Value
            };
            let is_side_effect = import.specifiers.is_empty()
                && !import.type_only
                && !has_brace_before(text, lo, src_lo);
            Some(Linkage {
                lo,
                hi,
                source: Some(import.src.value.to_string()),
                src_lo: Some(src_lo),
                kind,
                is_side_effect,
            })
        }
        (EngineKind::Exports, ModuleDecl::ExportNamed(export)) => {
            let (lo, hi) = parsed.byte_range(export.span);
            let kind = if export.type_only {
                BindingKind::Type
            } else {
                BindingKind::Value
            };
            let (source, src_lo) = match &export.src {
                Some(src) => (
                    Some(src.value.to_string()),
                    Some(parsed.byte_range(src.span).0),
                ),
                None => (None, None),
            };
            Some(Linkage {
                lo,
                hi,
                source,
                src_lo,
                kind,
                is_side_effect: false,
            })
        }
        (EngineKind::Exports, ModuleDecl::ExportAll(export)) => {
            let (lo, hi) = parsed.byte_range(export.span);
            let kind = if export.type_only {
                BindingKind::Type
            } else {
                BindingKind::Value
            };
            Some(Linkage {
                lo,
                hi,
                source: Some(export.src.value.to_string()),
                src_lo: Some(parsed.byte_range(export.src.span).0),
                kind,
                is_side_effect: false,
            })
        }
        _ => None,
    }
}

pub fn collect_chunks(parsed: &ParsedModule, text: &str, engine: EngineKind) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut current: Vec<Linkage> = Vec::new();
    let mut preceding_end = 0usize;
    let mut last_end = 0usize;

    for item in &parsed.module.body {
        let linkage = match item {
            ModuleItem::ModuleDecl(decl) => linkage_of(decl, parsed, text, engine),
            ModuleItem::Stmt(_) => None,
        };
        match linkage {
            Some(link) => {
                if current.is_empty() {
                    preceding_end = last_end;
                }
                last_end = link.hi;
                current.push(link);
            }
            None => {
                if !current.is_empty() {
                    chunks.push(Chunk {
                        statements: std::mem::take(&mut current),
                        preceding_end,
                    });
                }
                last_end = parsed.byte_range(item.span()).1;
            }
        }
    }
    if !current.is_empty() {
        chunks.push(Chunk {
            statements: current,
            preceding_end,
        });
    }
    chunks
}

/// Semicolon ownership repair for the chunk's final statement.
///
/// In semicolon-optional style, a terminator that sits on its own line with
/// code after it is a defensive prefix for the following statement, not the
/// end of this one. The statement's logical end moves back to the token
/// before the terminator. With nothing after it, the terminator always
/// belongs to the statement.
pub fn repair_last_semicolon(chunk: &mut Chunk, text: &str, lines: &LineIndex) {
    let Some(last) = chunk.statements.last_mut() else {
        return;
    };
    let code: Vec<_> = scan(&text[last.lo..last.hi], last.lo)
        .into_iter()
        .filter(|t| t.is_code())
        .collect();
    if code.len() < 2 {
        return;
    }
    let terminator = &code[code.len() - 1];
    let before = &code[code.len() - 2];
    if terminator.kind != TokenKind::Punct || terminator.text != ";" {
        return;
    }
    if lines.line_of(before.hi - 1) == lines.line_of(terminator.lo) {
        return;
    }
    let code_follows = scan(&text[last.hi..], last.hi).iter().any(|t| t.is_code());
    if code_follows {
        last.hi = before.hi;
    }
}
