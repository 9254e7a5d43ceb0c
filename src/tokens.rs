//! Lexical fragment classification over raw source text.
//!
//! swc's token stream omits comments and whitespace, so the sorting engine
//! re-slices the original text between statement boundaries and classifies
//! the fragments itself. The scanner only needs to be exact for module
//! linkage statements and the trivia around them: strings and template
//! literals are treated as single atoms so that braces, commas and
//! semicolons inside them can never be mistaken for structure.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Spaces,
    Newline,
    LineComment,
    BlockComment,
    Punct,
    Word,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Byte range in the original source.
    pub lo: usize,
    pub hi: usize,
}

impl Token {
    pub fn is_comment(&self) -> bool {
        matches!(self.kind, TokenKind::LineComment | TokenKind::BlockComment)
    }

    pub fn is_whitespace(&self) -> bool {
        matches!(self.kind, TokenKind::Spaces | TokenKind::Newline)
    }

    /// True for tokens that carry code rather than trivia.
    pub fn is_code(&self) -> bool {
        matches!(self.kind, TokenKind::Punct | TokenKind::Word)
    }

    pub fn spans_lines(&self) -> bool {
        self.text.contains('\n') || self.text.contains('\r')
    }
}

fn is_word_char(c: char) -> bool {
    c == '_' || c == '$' || c.is_alphanumeric()
}

/// Length in bytes of a string literal starting at the head of `rest`.
/// Template literals are scanned as flat strings; module specifiers never
/// nest interpolation.
fn string_len(rest: &str, quote: char) -> usize {
    let mut chars = rest.char_indices().skip(1);
    while let Some((i, c)) = chars.next() {
        if c == '\\' {
            chars.next();
        } else if c == quote {
            return i + c.len_utf8();
        } else if quote != '`' && (c == '\n' || c == '\r') {
            return i;
        }
    }
    rest.len()
}

/// Classifies `text` into tokens, offsetting all ranges by `base`.
pub fn scan(text: &str, base: usize) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < text.len() {
        let rest = &text[i..];
        let c = rest.chars().next().expect("offset is on a char boundary");
        let (kind, len) = if c == '\n' || c == '\r' {
            let len = if c == '\r' && rest[1..].starts_with('\n') {
                2
            } else {
                c.len_utf8()
            };
            (TokenKind::Newline, len)
        } else if c.is_whitespace() {
            let len = rest
                .chars()
                .take_while(|&ch| ch.is_whitespace() && ch != '\n' && ch != '\r')
                .map(char::len_utf8)
                .sum();
            (TokenKind::Spaces, len)
        } else if rest.starts_with("//") {
            let len = rest.find(['\n', '\r']).unwrap_or(rest.len());
            (TokenKind::LineComment, len)
        } else if rest.starts_with("/*") {
            let len = rest[2..].find("*/").map(|p| p + 4).unwrap_or(rest.len());
            (TokenKind::BlockComment, len)
        } else if c == '"' || c == '\'' || c == '`' {
            (TokenKind::Word, string_len(rest, c))
        } else if is_word_char(c) {
            let len = rest
                .chars()
                .take_while(|&ch| is_word_char(ch))
                .map(char::len_utf8)
                .sum();
            (TokenKind::Word, len)
        } else {
            (TokenKind::Punct, c.len_utf8())
        };
        tokens.push(Token {
            kind,
            text: text[i..i + len].to_string(),
            lo: base + i,
            hi: base + i + len,
        });
        i += len;
    }
    tokens
}

pub fn print_tokens(tokens: &[Token]) -> String {
    tokens.iter().map(|t| t.text.as_str()).collect()
}

/// Splits a pure-whitespace string into alternating (spaces, newline)
/// pieces. The result always has odd length and starts and ends with a
/// possibly empty spaces run.
fn split_whitespace_runs(ws: &str) -> Vec<&str> {
    let bytes = ws.as_bytes();
    let mut pieces = Vec::new();
    let mut seg_start = 0;
    let mut i = 0;
    while i < bytes.len() {
        let nl_len = match bytes[i] {
            b'\n' => 1,
            b'\r' if bytes.get(i + 1) == Some(&b'\n') => 2,
            b'\r' => 1,
            _ => 0,
        };
        if nl_len > 0 {
            pieces.push(&ws[seg_start..i]);
            pieces.push(&ws[i..i + nl_len]);
            i += nl_len;
            seg_start = i;
        } else {
            i += 1;
        }
    }
    pieces.push(&ws[seg_start..]);
    pieces
}

/// Collapses interior blank lines in a pure-whitespace string: five or more
/// alternating pieces (at least one fully blank line) reduce to the first
/// spaces run, the first newline and the last spaces run. Idempotent.
pub fn remove_blank_lines(whitespace: &str) -> String {
    let pieces = split_whitespace_runs(whitespace);
    if pieces.len() >= 5 {
        let mut out = String::with_capacity(whitespace.len());
        out.push_str(pieces[0]);
        out.push_str(pieces[1]);
        out.push_str(pieces[pieces.len() - 1]);
        out
    } else {
        whitespace.to_string()
    }
}

/// Collapses blank lines in a run of mixed whitespace and comments, leaving
/// the comments themselves untouched.
pub fn collapse_blank_runs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending = String::new();
    for token in scan(text, 0) {
        if token.is_whitespace() {
            pending.push_str(&token.text);
        } else {
            out.push_str(&remove_blank_lines(&pending));
            pending.clear();
            out.push_str(&token.text);
        }
    }
    out.push_str(&remove_blank_lines(&pending));
    out
}

/// The file's newline sequence: whatever the first newline in the source
/// looks like, line feed if the source has none.
pub fn guess_newline(text: &str) -> &'static str {
    match text.find('\n') {
        Some(i) if i > 0 && text.as_bytes()[i - 1] == b'\r' => "\r\n",
        _ => "\n",
    }
}

/// Byte offset to 1-based line number lookups.
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let bytes = text.as_bytes();
        let mut starts = vec![0];
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\n' => {
                    starts.push(i + 1);
                    i += 1;
                }
                b'\r' => {
                    let len = if bytes.get(i + 1) == Some(&b'\n') { 2 } else { 1 };
                    starts.push(i + len);
                    i += len;
                }
                _ => i += 1,
            }
        }
        Self { starts }
    }

    pub fn line_of(&self, offset: usize) -> usize {
        self.starts.partition_point(|&s| s <= offset)
    }
}
