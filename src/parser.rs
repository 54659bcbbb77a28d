//! HCL parser using tree-sitter
//!
//! This module provides a simple interface to parse HCL configuration files using
//! the [tree-sitter-hcl](https://github.com/tree-sitter-grammars/tree-sitter-hcl)
//! grammar. Both the validator and the formatter work on the tree it returns.
//!
//! # Example
//!
//! ```rust
//! use hcl2fmt::parser::parse;
//!
//! let source = r#"
//! resource "aws_instance" "web" {
//!   ami = "ami-123456"
//! }
//! "#;
//!
//! let tree = parse(source).unwrap();
//! assert!(!tree.root_node().has_error());
//! ```

use once_cell::sync::Lazy;
use tree_sitter::{Language, Parser, Tree};

/// The HCL language definition for tree-sitter
pub static HCL_LANGUAGE: Lazy<Language> = Lazy::new(|| tree_sitter_hcl::LANGUAGE.into());

/// Parse HCL source into a concrete syntax tree
///
/// The parser is tolerant of syntax errors: malformed input still yields a tree,
/// with `ERROR` and `MISSING` nodes marking the broken spans. Callers that need
/// to know whether the input is well-formed should check
/// [`tree_sitter::Node::has_error`] on the root.
///
/// # Errors
///
/// Returns an error if the grammar cannot be loaded or tree-sitter gives up on
/// the input.
pub fn parse(source: &str) -> anyhow::Result<Tree> {
    let mut parser = Parser::new();
    parser.set_language(&HCL_LANGUAGE)?;
    parser
        .parse(source, None)
        .ok_or_else(|| anyhow::anyhow!("Failed to parse HCL source"))
}
