//! Chunk sorting: buckets items by configured regex groups, orders each
//! bucket, and reprints the chunk as a single text edit.

use std::cmp::Ordering;

use regex::Regex;

use crate::chunks::{repair_last_semicolon, Chunk, EngineKind};
use crate::compare::{compare_keys, BindingKind};
use crate::edits::TextEdit;
use crate::items::{extract_items, Item};
use crate::tokens::{scan, LineIndex, TokenKind};

/// Key the group regexes are matched against. Side-effect imports carry a
/// non-printable prefix so a leading `^\u{0}` pattern can capture them;
/// type-only statements carry a suffix on the import side and a prefix on
/// the export side.
fn match_key(item: &Item, engine: EngineKind) -> String {
    let source = &item.key.original;
    match engine {
        EngineKind::Imports => {
            if item.is_side_effect {
                format!("\u{0}{source}")
            } else if item.key.kind != BindingKind::Value {
                format!("{source}\u{0}")
            } else {
                source.clone()
            }
        }
        EngineKind::Exports => {
            if item.key.kind != BindingKind::Value {
                format!("\u{0}{source}")
            } else {
                source.clone()
            }
        }
    }
}

/// The single longest regex match wins; ties go to the earliest pattern.
/// Returns the (group, pattern) position, or None for the catch-all.
fn best_bucket(key: &str, groups: &[Vec<Regex>]) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize)> = None;
    let mut longest = 0;
    for (g, patterns) in groups.iter().enumerate() {
        for (p, pattern) in patterns.iter().enumerate() {
            if let Some(m) = pattern.find(key) {
                let len = m.as_str().len();
                if best.is_none() || len > longest {
                    best = Some((g, p));
                    longest = len;
                }
            }
        }
    }
    best
}

fn compare_items(a: &Item, b: &Item) -> Ordering {
    match (a.is_side_effect, b.is_side_effect) {
        (true, true) => a.index.cmp(&b.index),
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => compare_keys(&a.key, &b.key).then(a.index.cmp(&b.index)),
    }
}

/// Sorts one chunk. Returns the replacement edit, or None when the chunk
/// is already in order (byte-for-byte).
pub fn sort_chunk(
    chunk: &mut Chunk,
    text: &str,
    lines: &LineIndex,
    engine: EngineKind,
    groups: &[Vec<Regex>],
    newline: &str,
) -> Option<TextEdit> {
    repair_last_semicolon(chunk, text, lines);
    let items = extract_items(chunk, text, lines, engine, newline);
    let (first, last) = match (items.first(), items.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return None,
    };
    let (lo, hi) = (first.lo, last.hi);

    // One flat bucket per pattern, plus a trailing catch-all that prints as
    // its own group.
    let mut buckets: Vec<Vec<Vec<Item>>> = groups
        .iter()
        .map(|g| g.iter().map(|_| Vec::new()).collect())
        .collect();
    let mut catch_all: Vec<Item> = Vec::new();
    for item in items {
        match best_bucket(&match_key(&item, engine), groups) {
            Some((g, p)) => buckets[g][p].push(item),
            None => catch_all.push(item),
        }
    }

    let mut group_texts: Vec<String> = Vec::new();
    let mut last_needs_newline = false;
    let mut flush = |group: Vec<Vec<Item>>| {
        let mut codes: Vec<String> = Vec::new();
        for mut bucket in group {
            bucket.sort_by(compare_items);
            for item in bucket {
                last_needs_newline = item.needs_newline;
                codes.push(item.code);
            }
        }
        if !codes.is_empty() {
            group_texts.push(codes.join(newline));
        }
    };
    for group in buckets {
        flush(group);
    }
    flush(vec![catch_all]);

    let mut sorted = group_texts.join(&format!("{newline}{newline}"));

    // A line comment that sorted to the end must not swallow code that sat
    // on the same line right after the chunk.
    if last_needs_newline {
        let follows_on_same_line = scan(&text[hi..], hi)
            .into_iter()
            .find(|t| t.kind != TokenKind::Spaces)
            .is_some_and(|t| t.kind != TokenKind::Newline);
        if follows_on_same_line {
            sorted.push_str(newline);
        }
    }

    if sorted == text[lo..hi] {
        None
    } else {
        Some(TextEdit {
            lo,
            hi,
            new_text: sorted,
        })
    }
}
