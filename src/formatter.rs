//! Canonical formatting for HCL source
//!
//! The formatter works on the token stream of a parsed file rather than on the
//! syntax tree's structure. It keeps the author's line breaks, recomputes
//! indentation from bracket nesting, normalises the spacing between tokens on
//! each line and aligns the `=` of consecutive attributes. String templates,
//! heredocs and comments are copied through untouched.
//!
//! Source text the grammar does not hand out as a leaf, such as the `.0` of a
//! legacy index, is kept as-is and stays glued to its neighbours. A leading
//! byte order mark is preserved.
//!
//! Trailing comments are separated from the code by a single space and are not
//! aligned across neighbouring lines, unlike `hclwrite`.
//!
//! The output only ever differs from the input in whitespace, and formatting
//! already-formatted source returns it unchanged.
//!
//! # Example
//!
//! ```rust
//! use hcl2fmt::formatter::{FormatOptions, format_source};
//!
//! let unformatted = "service \"web\" {\nport=8080\n  name  =  \"web\"\n}\n";
//!
//! let formatted = format_source(unformatted, &FormatOptions::default()).unwrap();
//! assert_eq!(formatted, "service \"web\" {\n  port = 8080\n  name = \"web\"\n}\n");
//! ```

use crate::parser::parse;
use anyhow::{Result, bail};
use tree_sitter::TreeCursor;

/// Produces the canonical form of a file's content
pub trait Formatter {
    /// Formats `content`, which is expected to be syntactically valid.
    ///
    /// # Errors
    ///
    /// Returns an error only when `content` could not have passed validation.
    fn format(&self, content: &[u8]) -> Result<Vec<u8>>;
}

/// Configuration options for the formatter
#[derive(Debug, Clone)]
pub struct FormatOptions {
    /// Number of spaces to use for each indentation level
    pub indent_width: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self { indent_width: 2 }
    }
}

/// [`Formatter`] for HCL files
#[derive(Debug, Default, Clone)]
pub struct HclFormatter {
    pub options: FormatOptions,
}

impl Formatter for HclFormatter {
    fn format(&self, content: &[u8]) -> Result<Vec<u8>> {
        let source = std::str::from_utf8(content)?;
        Ok(format_source(source, &self.options)?.into_bytes())
    }
}

// Node kinds whose text is copied as a single token.
const VERBATIM_KINDS: &[&str] = &[
    "string_lit",
    "quoted_template",
    "heredoc_template",
    "template_expr",
];

// Words that introduce or continue a `for` expression rather than name a value.
const KEYWORDS: &[&str] = &["for", "in", "if"];

const BOM: char = '\u{feff}';

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TokenKind {
    Open,
    Close,
    Word,
    Punct,
    Verbatim,
    Comment,
}

#[derive(Debug)]
struct Token<'a> {
    text: &'a str,
    kind: TokenKind,
    start_row: usize,
    end_row: usize,
    /// No whitespace separates this token from the previous one in the source
    /// and one of the two is text outside any leaf.
    glued: bool,
}

impl Token<'_> {
    fn is_keyword(&self) -> bool {
        self.kind == TokenKind::Word && KEYWORDS.contains(&self.text)
    }

    fn is_multiline(&self) -> bool {
        self.end_row > self.start_row
    }
}

#[derive(Debug)]
struct Line<'a> {
    tokens: Vec<Token<'a>>,
    blank_before: bool,
    indent: usize,
}

impl Line<'_> {
    fn starts_with_close(&self) -> bool {
        self.tokens
            .first()
            .is_some_and(|t| t.kind == TokenKind::Close)
    }

    fn net_brackets(&self) -> isize {
        self.tokens
            .iter()
            .map(|t| match t.kind {
                TokenKind::Open => 1,
                TokenKind::Close => -1,
                _ => 0,
            })
            .sum()
    }

    /// `key = value` wholly on one line: no brackets left open, no heredoc
    fn is_assignment(&self) -> bool {
        self.tokens.len() >= 2
            && matches!(self.tokens[0].kind, TokenKind::Word | TokenKind::Verbatim)
            && self.tokens[1].text == "="
            && self.net_brackets() == 0
            && !self.tokens.iter().any(Token::is_multiline)
    }
}

/// Format HCL source into its canonical form
///
/// # Errors
///
/// Returns an error if the source does not parse cleanly, or if formatting
/// would change anything other than whitespace.
pub fn format_source(input: &str, opts: &FormatOptions) -> Result<String> {
    let (bom, body) = match input.strip_prefix(BOM) {
        Some(rest) => (true, rest),
        None => (false, input),
    };

    let tree = parse(body)?;
    if tree.root_node().has_error() {
        bail!("source contains syntax errors");
    }

    let mut collector = TokenCollector::new(body);
    let mut cursor = tree.walk();
    collector.collect(&mut cursor)?;
    let tokens = collector.finish();

    let mut lines = split_lines(tokens);
    assign_indents(&mut lines);
    let widths = alignment_widths(&lines);

    let mut output = String::with_capacity(input.len());
    if bom {
        output.push(BOM);
    }
    for (i, line) in lines.iter().enumerate() {
        if i > 0 && line.blank_before {
            output.push('\n');
        }
        output.push_str(&" ".repeat(line.indent * opts.indent_width));
        render_line(line, widths[i], &mut output);
        output.push('\n');
    }

    if !same_tokens(input, &output) {
        bail!("formatting would alter non-whitespace content");
    }

    Ok(output)
}

struct TokenCollector<'a> {
    source: &'a str,
    tokens: Vec<Token<'a>>,
    last_byte: usize,
    after_gap: bool,
}

impl<'a> TokenCollector<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            tokens: Vec::new(),
            last_byte: 0,
            after_gap: false,
        }
    }

    fn collect(&mut self, cursor: &mut TreeCursor) -> Result<()> {
        let node = cursor.node();
        let verbatim =
            VERBATIM_KINDS.contains(&node.kind()) || opens_template(cursor, self.source);

        if node.child_count() == 0 || verbatim {
            self.handle_gap(node.start_byte());
            let raw = node.utf8_text(self.source.as_bytes())?;
            let kind = if node.kind() == "comment" || is_comment_text(raw) {
                TokenKind::Comment
            } else if verbatim {
                TokenKind::Verbatim
            } else {
                classify(raw)
            };
            let text = match kind {
                TokenKind::Comment => raw.trim_end(),
                TokenKind::Verbatim => raw.trim_end_matches(['\r', '\n']),
                _ => raw.trim(),
            };
            if !text.is_empty() {
                let glued = self.after_gap && !raw.starts_with(char::is_whitespace);
                self.push(text, kind, node.start_position().row, glued);
            }
            self.last_byte = self.last_byte.max(node.end_byte());
            return Ok(());
        }

        if cursor.goto_first_child() {
            loop {
                self.collect(cursor)?;
                if !cursor.goto_next_sibling() {
                    break;
                }
            }
            cursor.goto_parent();
        }
        Ok(())
    }

    /// Keeps any non-whitespace text between the last leaf and `end`.
    fn handle_gap(&mut self, end: usize) {
        self.after_gap = false;
        if end <= self.last_byte {
            return;
        }
        let Some(slice) = self.source.get(self.last_byte..end) else {
            return;
        };
        let text = slice.trim();
        if text.is_empty() {
            return;
        }

        let offset = self.last_byte + (slice.len() - slice.trim_start().len());
        let row = self.source[..offset].matches('\n').count();
        let glued = !self.tokens.is_empty() && !slice.starts_with(char::is_whitespace);
        self.push(text, TokenKind::Verbatim, row, glued);
        self.last_byte = end;
        self.after_gap = !slice.ends_with(char::is_whitespace);
    }

    fn push(&mut self, text: &'a str, kind: TokenKind, start_row: usize, glued: bool) {
        self.tokens.push(Token {
            text,
            kind,
            start_row,
            end_row: start_row + text.matches('\n').count(),
            glued,
        });
    }

    fn finish(mut self) -> Vec<Token<'a>> {
        self.handle_gap(self.source.len());
        self.tokens
    }
}

/// Quoted strings and heredocs start with a `"` or `<<` leaf.
fn opens_template(cursor: &TreeCursor, source: &str) -> bool {
    let node = cursor.node();
    let Some(first) = node.child(0) else {
        return false;
    };
    if first.child_count() != 0 {
        return false;
    }
    first
        .utf8_text(source.as_bytes())
        .is_ok_and(|text| text == "\"" || text.starts_with("<<"))
}

fn is_comment_text(text: &str) -> bool {
    text.starts_with('#') || text.starts_with("//") || text.starts_with("/*")
}

fn classify(text: &str) -> TokenKind {
    match text {
        "{" | "[" | "(" => TokenKind::Open,
        "}" | "]" | ")" => TokenKind::Close,
        "[*]" | ".*" => TokenKind::Word,
        _ if text.starts_with(|c: char| c.is_alphanumeric() || c == '_') => TokenKind::Word,
        _ => TokenKind::Punct,
    }
}

fn split_lines(tokens: Vec<Token<'_>>) -> Vec<Line<'_>> {
    let mut lines: Vec<Line> = Vec::new();
    let mut current: Vec<Token> = Vec::new();
    let mut blank_before = false;

    for token in tokens {
        if let Some(last) = current.last() {
            if token.start_row > last.end_row {
                let next_blank = token.start_row > last.end_row + 1;
                lines.push(Line {
                    tokens: std::mem::take(&mut current),
                    blank_before,
                    indent: 0,
                });
                blank_before = next_blank;
            }
        }
        current.push(token);
    }
    if !current.is_empty() {
        lines.push(Line {
            tokens: current,
            blank_before,
            indent: 0,
        });
    }
    lines
}

/// Each line that opens brackets pushes one indentation level, however many
/// brackets it opens; closing them pops that level again.
fn assign_indents(lines: &mut [Line<'_>]) {
    let mut levels: Vec<usize> = Vec::new();

    for line in lines.iter_mut() {
        let net = line.net_brackets();
        if net > 0 {
            line.indent = levels.len().saturating_sub(usize::from(line.starts_with_close()));
            levels.push(net.unsigned_abs());
        } else if net < 0 {
            let mut closed = net.unsigned_abs();
            while closed > 0 {
                let Some(top) = levels.last_mut() else {
                    break;
                };
                if closed >= *top {
                    closed -= *top;
                    levels.pop();
                } else {
                    *top -= closed;
                    closed = 0;
                }
            }
            line.indent = levels.len();
        } else {
            line.indent = levels.len().saturating_sub(usize::from(line.starts_with_close()));
        }
    }
}

/// Key width to pad to for each line, or `None` when the line is not aligned.
fn alignment_widths(lines: &[Line<'_>]) -> Vec<Option<usize>> {
    let mut widths = vec![None; lines.len()];
    let mut start = 0;

    while start < lines.len() {
        if !lines[start].is_assignment() {
            start += 1;
            continue;
        }

        let mut end = start + 1;
        while end < lines.len()
            && lines[end].is_assignment()
            && !lines[end].blank_before
            && lines[end].indent == lines[start].indent
        {
            end += 1;
        }

        let width = lines[start..end]
            .iter()
            .map(|l| l.tokens[0].text.chars().count())
            .max()
            .unwrap_or(0);
        for w in &mut widths[start..end] {
            *w = Some(width);
        }
        start = end;
    }
    widths
}

fn render_line(line: &Line<'_>, key_width: Option<usize>, output: &mut String) {
    for (i, token) in line.tokens.iter().enumerate() {
        if i > 0 {
            let prev = &line.tokens[i - 1];
            let before = if i >= 2 { Some(&line.tokens[i - 2]) } else { None };
            match key_width {
                Some(width) if i == 1 => {
                    let pad = width - prev.text.chars().count();
                    output.push_str(&" ".repeat(pad + 1));
                }
                _ => {
                    if needs_space(before, prev, token) {
                        output.push(' ');
                    }
                }
            }
        }
        output.push_str(token.text);
    }
}

/// `-` and `!` are prefix operators unless they follow a value.
fn is_unary(before: Option<&Token<'_>>, token: &Token<'_>) -> bool {
    if token.text != "-" && token.text != "!" {
        return false;
    }
    match before {
        None => true,
        Some(prev) => {
            matches!(prev.kind, TokenKind::Open | TokenKind::Punct) || prev.is_keyword()
        }
    }
}

fn needs_space(before: Option<&Token<'_>>, prev: &Token<'_>, next: &Token<'_>) -> bool {
    if next.glued {
        return false;
    }
    if next.kind == TokenKind::Comment || prev.kind == TokenKind::Comment {
        return true;
    }

    match next.text {
        "," | ")" | "]" | "[*]" => return false,
        "}" => return prev.text != "{",
        t if t.starts_with('.') => return false,
        _ => {}
    }

    match prev.text {
        "(" | "[" | "." => return false,
        _ => {}
    }
    if is_unary(before, prev) {
        return false;
    }

    if next.text == "(" || next.text == "[" {
        let follows_value = matches!(prev.kind, TokenKind::Close | TokenKind::Verbatim)
            || (prev.kind == TokenKind::Word && !prev.is_keyword());
        return !follows_value;
    }

    true
}

fn same_tokens(input: &str, output: &str) -> bool {
    input
        .chars()
        .filter(|c| !c.is_whitespace())
        .eq(output.chars().filter(|c| !c.is_whitespace()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(src: &str) -> String {
        format_source(src, &FormatOptions::default()).unwrap()
    }

    #[test]
    fn indents_nested_blocks() {
        let src = "a {\nb {\nc = 1\n}\n}\n";
        assert_eq!(fmt(src), "a {\n  b {\n    c = 1\n  }\n}\n");
    }

    #[test]
    fn respects_indent_width() {
        let opts = FormatOptions { indent_width: 4 };
        let out = format_source("a {\nb = 1\n}\n", &opts).unwrap();
        assert_eq!(out, "a {\n    b = 1\n}\n");
    }

    #[test]
    fn normalises_spacing_around_operators() {
        assert_eq!(fmt("x=1+2*3\n"), "x = 1 + 2 * 3\n");
        assert_eq!(fmt("y = a==b ? c : d\n"), "y = a == b ? c : d\n");
    }

    #[test]
    fn tightens_calls_indexes_and_attribute_access() {
        assert_eq!(fmt("v = max( 1 , 2 )\n"), "v = max(1, 2)\n");
        assert_eq!(fmt("v = var . list [ 0 ]\n"), "v = var.list[0]\n");
    }

    #[test]
    fn keeps_unary_operators_attached() {
        assert_eq!(fmt("v = - 1\n"), "v = -1\n");
        assert_eq!(fmt("v = ! true\n"), "v = !true\n");
        assert_eq!(fmt("v = a - 1\n"), "v = a - 1\n");
    }

    #[test]
    fn aligns_consecutive_attributes() {
        let src = "a = 1\nlonger = 2\nmid = 3\n";
        assert_eq!(fmt(src), "a      = 1\nlonger = 2\nmid    = 3\n");
    }

    #[test]
    fn blank_line_breaks_alignment_group() {
        let src = "a = 1\n\nlonger = 2\n";
        assert_eq!(fmt(src), "a = 1\n\nlonger = 2\n");
    }

    #[test]
    fn collapses_blank_lines_and_trims_edges() {
        let src = "\n\n\na = 1\n\n\n\nb = 2\n\n\n";
        assert_eq!(fmt(src), "a = 1\n\nb = 2\n");
    }

    #[test]
    fn copies_strings_verbatim() {
        let src = "msg = \"hello   ${ var.name }  !\"\n";
        assert_eq!(fmt(src), src);
    }

    #[test]
    fn keeps_comments() {
        let src = "# leading\na = 1   # trailing\n";
        assert_eq!(fmt(src), "# leading\na = 1 # trailing\n");
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(fmt(""), "");
        assert_eq!(fmt("\n\n"), "");
    }

    #[test]
    fn adds_trailing_newline() {
        assert_eq!(fmt("a = 1"), "a = 1\n");
    }

    #[test]
    fn empty_collections_stay_tight() {
        assert_eq!(fmt("a = {}\nb = []\n"), "a = {}\nb = []\n");
    }

    #[test]
    fn is_idempotent() {
        let src = "resource \"x\" \"y\" {\ncount=2\n  tags={Name=\"n\",Env=\"e\"}\nlist=[\n1,\n2,\n]\n}\n";
        let once = fmt(src);
        assert_eq!(fmt(&once), once);
    }

    #[test]
    fn rejects_invalid_source() {
        assert!(format_source("a = {\n", &FormatOptions::default()).is_err());
    }

    #[test]
    fn formatter_trait_works_on_bytes() {
        let out = HclFormatter::default().format(b"a=1\n").unwrap();
        assert_eq!(out, b"a = 1\n");
    }

    #[test]
    fn formatter_trait_rejects_invalid_utf8() {
        assert!(HclFormatter::default().format(b"a = \"\xff\"\n").is_err());
    }

    #[test]
    fn legacy_index_is_kept_intact() {
        assert_eq!(fmt("v = a.0\n"), "v = a.0\n");
        assert_eq!(fmt("v=a.0.b\n"), "v = a.0.b\n");
        let once = fmt("id = aws_instance.web.0.id\n");
        assert_eq!(once, "id = aws_instance.web.0.id\n");
        assert_eq!(fmt(&once), once);
    }

    #[test]
    fn keeps_leading_byte_order_mark() {
        assert_eq!(fmt("\u{feff}a=1\n"), "\u{feff}a = 1\n");
        assert_eq!(fmt("\u{feff}"), "\u{feff}");
        let bytes = HclFormatter::default()
            .format("\u{feff}a = 1\n".as_bytes())
            .unwrap();
        assert_eq!(bytes, "\u{feff}a = 1\n".as_bytes());
    }

    #[test]
    fn open_brackets_and_heredocs_leave_alignment_group() {
        let src = "a = 1\ntags = {\nx = 1\n}\n";
        assert_eq!(fmt(src), "a = 1\ntags = {\n  x = 1\n}\n");

        let src = "a = 1\ndesc = <<EOT\ntext\nEOT\nlonger = 2\n";
        assert_eq!(fmt(src), "a = 1\ndesc = <<EOT\ntext\nEOT\nlonger = 2\n");
    }

    #[test]
    fn single_line_values_still_align() {
        let src = "a = 1\ntags = { x = 1 }\n";
        assert_eq!(fmt(src), "a    = 1\ntags = { x = 1 }\n");
    }

    #[test]
    fn trailing_comments_are_not_aligned() {
        let src = "a = 1 # one\nlonger = 2     # two\n";
        assert_eq!(fmt(src), "a      = 1 # one\nlonger = 2 # two\n");
    }
}
