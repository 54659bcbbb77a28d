//! # hcl2fmt - Recursive HCL formatter
//!
//! hcl2fmt finds every `*.hcl` file under a directory, checks that each one is
//! syntactically valid and rewrites it in canonical form, keeping its file mode.
//! Parsing uses [tree-sitter](https://tree-sitter.github.io/tree-sitter/) with the
//! [tree-sitter-hcl](https://github.com/tree-sitter-grammars/tree-sitter-hcl)
//! grammar.
//!
//! A file that cannot be read or written is reported and skipped. A file with a
//! syntax error stops the whole run: nothing discovered after it is touched.
//!
//! ## Usage
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use hcl2fmt::discovery::ExtensionWalker;
//! use hcl2fmt::formatter::HclFormatter;
//! use hcl2fmt::pipeline::{Pipeline, RunStatus};
//! use hcl2fmt::validator::HclValidator;
//! use std::path::Path;
//!
//! let mut pipeline = Pipeline::new(
//!     ExtensionWalker::default(),
//!     HclValidator,
//!     HclFormatter::default(),
//!     std::io::stdout(),
//! );
//! let status = pipeline.run(Path::new("infra")).unwrap();
//! assert_eq!(status, RunStatus::Done);
//! ```
//!
//! ### As a CLI Tool
//!
//! ```text
//! hcl2fmt [-v] [-w DIR]
//! ```
//!
//! ## Modules
//!
//! - [`parser`] - Tree-sitter integration and HCL parsing
//! - [`validator`] - Syntax checking and diagnostics
//! - [`formatter`] - Canonical formatting
//! - [`discovery`] - Recursive file discovery
//! - [`pipeline`] - The discover, validate, format, write loop
//! - [`config`] - Command-line flags

/// Tree-sitter based HCL parser
pub mod parser;

pub mod validator;

/// Canonical formatting engine
pub mod formatter;

pub mod discovery;

pub mod pipeline;

pub mod config;

pub mod error;

pub use error::{DiscoveryError, PipelineError};
pub use pipeline::{Pipeline, RunStatus};
