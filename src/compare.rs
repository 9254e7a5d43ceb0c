//! Natural ordering and sort-key derivation.
//!
//! Module sources are compared case-insensitively with numeric awareness
//! (`img2` before `img10`), after a normalization pass that makes relative
//! paths sort by directory nesting instead of raw code points.

use std::cmp::Ordering;
use std::iter::Peekable;
use std::str::Chars;

use once_cell::sync::Lazy;
use regex::Regex;

/// How a statement or binding participates in the type system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Type,
    Typeof,
    Value,
}

impl BindingKind {
    fn rank(self) -> u8 {
        match self {
            BindingKind::Type => 0,
            BindingKind::Typeof => 1,
            BindingKind::Value => 2,
        }
    }
}

/// The multi-level sort key of one statement.
#[derive(Debug, Clone)]
pub struct SortKey {
    pub normalized: String,
    pub original: String,
    pub kind: BindingKind,
}

impl SortKey {
    pub fn new(source: &str, kind: BindingKind) -> Self {
        Self {
            normalized: normalize_source(source),
            original: source.to_string(),
            kind,
        }
    }
}

/// Stands in for the leading `/` of a rooted path: collates after the
/// swapped relative-path prefixes and before plain identifiers.
const ROOT_MARKER: char = '\u{1}';

/// Appended when a normalized source ends in `/`, so a directory sorts
/// after its own contents (`./a` before `.`).
const DIR_SENTINEL: char = '\u{10FFFF}';

/// `.`, `..`, `../..` and so on.
static BARE_DOT_PATH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[./]*\.$").expect("valid regex"));

/// Transforms a source specifier for comparison only (never for display).
/// Bare dot paths are completed with `/`, a rooted path gets a marker in
/// place of its leading `/`, and `.`/`_` as well as `/`/`-` swap roles so
/// that path boundaries collate ahead of underscores and hyphens.
pub fn normalize_source(raw: &str) -> String {
    let mut s = raw.to_string();
    if BARE_DOT_PATH.is_match(&s) {
        s.push('/');
    }
    if let Some(rest) = s.strip_prefix('/') {
        s = format!("{ROOT_MARKER}{rest}");
    }
    if s.ends_with('/') {
        s.push(DIR_SENTINEL);
    }
    s.chars()
        .map(|c| match c {
            '.' => '_',
            '_' => '.',
            '/' => '-',
            '-' => '/',
            other => other,
        })
        .collect()
}

fn weight(c: char) -> u64 {
    match c {
        '_' => 1,
        ROOT_MARKER => 2,
        '-' => 3,
        DIR_SENTINEL => u64::MAX,
        c if c.is_ascii_digit() => 0x100 + c as u64,
        c => {
            let folded = c.to_lowercase().next().unwrap_or(c);
            if folded.is_alphanumeric() {
                0x20_0000 + folded as u64
            } else {
                0x10 + folded as u64
            }
        }
    }
}

fn digit_run(chars: &mut Peekable<Chars>) -> String {
    let mut run = String::new();
    while let Some(&c) = chars.peek() {
        if !c.is_ascii_digit() {
            break;
        }
        run.push(c);
        chars.next();
    }
    run
}

fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn compare_natural(a: &str, b: &str) -> Ordering {
    let mut ia = a.chars().peekable();
    let mut ib = b.chars().peekable();
    loop {
        match (ia.peek().copied(), ib.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(ca), Some(cb)) => {
                if ca.is_ascii_digit() && cb.is_ascii_digit() {
                    let ra = digit_run(&mut ia);
                    let rb = digit_run(&mut ib);
                    let ord = compare_digit_runs(&ra, &rb);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                } else {
                    let (wa, wb) = (weight(ca), weight(cb));
                    if wa != wb {
                        return wa.cmp(&wb);
                    }
                    ia.next();
                    ib.next();
                }
            }
        }
    }
}

/// Natural comparison with a raw byte-order tie-break, so strings that
/// collate equal (`"01"` vs `"1"`, case variants) still order
/// deterministically.
pub fn compare(a: &str, b: &str) -> Ordering {
    compare_natural(a, b).then_with(|| a.cmp(b))
}

/// Compares two statements' sort keys: normalized source, then original
/// source, then binding kind. Callers rely on a stable sort for the final
/// original-index tie-break.
pub fn compare_keys(a: &SortKey, b: &SortKey) -> Ordering {
    compare(&a.normalized, &b.normalized)
        .then_with(|| compare(&a.original, &b.original))
        .then_with(|| a.kind.rank().cmp(&b.kind.rank()))
}
