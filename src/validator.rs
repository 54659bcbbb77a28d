//! Syntax validation for HCL files
//!
//! A file must be well-formed before it is handed to the formatter. The
//! validator parses the raw bytes and turns every `ERROR` and `MISSING` node in
//! the tree into a [`SyntaxError`], grouped into one [`Diagnostic`] per file.

use crate::parser::parse;
use std::fmt;
use std::path::{Path, PathBuf};
use tree_sitter::Node;

/// Checks a file's content for syntax errors
pub trait Validator {
    /// Returns `Ok(())` when `content` is well-formed.
    ///
    /// Implementations only read; they never touch the file system.
    fn validate(&self, path: &Path, content: &[u8]) -> Result<(), Diagnostic>;
}

/// A single syntax error. Positions are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

/// All syntax errors found in one file. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub path: PathBuf,
    pub errors: Vec<SyntaxError>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(
                f,
                "{}:{}:{}: {}",
                self.path.display(),
                err.line,
                err.column,
                err.message
            )?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostic {}

/// Validator backed by the tree-sitter HCL grammar
#[derive(Debug, Default, Clone, Copy)]
pub struct HclValidator;

impl Validator for HclValidator {
    fn validate(&self, path: &Path, content: &[u8]) -> Result<(), Diagnostic> {
        let source = match std::str::from_utf8(content) {
            Ok(s) => s,
            Err(e) => {
                let (line, column) = position_of(content, e.valid_up_to());
                return Err(Diagnostic {
                    path: path.to_path_buf(),
                    errors: vec![SyntaxError {
                        line,
                        column,
                        message: format!("invalid UTF-8 at byte {}", e.valid_up_to()),
                    }],
                });
            }
        };

        let tree = parse(source).map_err(|e| Diagnostic {
            path: path.to_path_buf(),
            errors: vec![SyntaxError {
                line: 1,
                column: 1,
                message: e.to_string(),
            }],
        })?;

        let root = tree.root_node();
        if !root.has_error() {
            return Ok(());
        }

        let mut errors = Vec::new();
        collect_errors(root, source.as_bytes(), &mut errors);
        if errors.is_empty() {
            // has_error() saw something the walk did not surface
            errors.push(SyntaxError {
                line: 1,
                column: 1,
                message: "syntax error".to_string(),
            });
        }
        log::debug!("{}: {} syntax error(s)", path.display(), errors.len());

        Err(Diagnostic {
            path: path.to_path_buf(),
            errors,
        })
    }
}

fn collect_errors(node: Node, source: &[u8], out: &mut Vec<SyntaxError>) {
    if node.is_missing() {
        out.push(syntax_error(node, format!("missing \"{}\"", node.kind())));
        return;
    }
    if node.is_error() {
        let text = node.utf8_text(source).unwrap_or("");
        let snippet = text.lines().next().unwrap_or("").trim();
        let message = if snippet.is_empty() {
            "unexpected end of input".to_string()
        } else {
            format!("unexpected \"{}\"", truncate(snippet, 40))
        };
        out.push(syntax_error(node, message));
        return;
    }
    if !node.has_error() {
        return;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_errors(child, source, out);
    }
}

fn syntax_error(node: Node, message: String) -> SyntaxError {
    let start = node.start_position();
    SyntaxError {
        line: start.row + 1,
        column: start.column + 1,
        message,
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

fn position_of(content: &[u8], offset: usize) -> (usize, usize) {
    let before = &content[..offset.min(content.len())];
    let line = before.iter().filter(|&&b| b == b'\n').count() + 1;
    let column = match before.iter().rposition(|&b| b == b'\n') {
        Some(nl) => offset - nl,
        None => offset + 1,
    };
    (line, column)
}
