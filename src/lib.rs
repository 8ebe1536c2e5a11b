//! Scanner, parser, and typed AST for Alpha, a small imperative
//! teaching language.
//!
//! Source text goes through two stages: the [`Scanner`] turns it into
//! position-tagged tokens (always ending in an end-of-input token), and
//! the recursive-descent [`Parser`] turns those into a [`Program`] or
//! fails on the first syntax error.
//!
//! # Quick start
//!
//! ```
//! use alpha_lang::{parse, render, tokenize, SingleCommand};
//!
//! let tokens = tokenize("x = 1").unwrap();
//! let program = parse(&tokens).unwrap();
//! assert!(matches!(program.command, SingleCommand::Assignment(_)));
//! assert!(render(&program).starts_with("Program ("));
//! ```
//!
//! ## Error reporting
//!
//! ```
//! let err = alpha_lang::parse_str("if x then").unwrap_err();
//! assert_eq!(
//!     err.to_string(),
//!     "<stdin>:1:10: unexpected token 'EOF' expected one of \
//!      'identifier', 'if', 'while', 'let', 'begin', 'else'"
//! );
//! ```

// Allow noisy pedantic lints that don't add value for
// a library crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

use std::io;
use std::path::{Path, PathBuf};

pub mod ast;
pub mod parser;
pub mod render;
pub mod scanner;
pub mod token;

pub use ast::{
    Assignment, BeginBlock, Command, ConstDecl, Declaration, Expression, FunctionCall, IfBlock,
    LetBlock, Literal, Node, Operator, Primary, Program, SingleCommand, SingleDeclaration,
    TypeDenoter, VarDecl, WhileBlock,
};
pub use parser::{Expected, MAX_DEPTH, ParseError, ParseErrorKind, Parser, parse};
pub use render::render;
pub use scanner::{LexError, LexErrorKind, STDIN_NAME, Scanner, tokenize};
pub use token::{Span, Token, TokenKind};

/// Unified error type covering reading, scanning, and parsing.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A scanner error.
    #[error("{0}")]
    Lex(#[from] LexError),
    /// A parser error.
    #[error("{0}")]
    Parse(#[from] ParseError),
    /// The source file could not be read.
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Scan and parse an in-memory source in one step. Errors name the
/// source `<stdin>`.
pub fn parse_str(input: &str) -> Result<Program, Error> {
    parse_source(Scanner::new(input))
}

/// Read, scan, and parse a source file. Errors name the file by its
/// base name.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Program, Error> {
    let path = path.as_ref();
    let scanner = Scanner::from_file(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_source(scanner)
}

fn parse_source(scanner: Scanner) -> Result<Program, Error> {
    let file_name = scanner.file_name().to_string();
    let tokens = scanner.tokenize()?;
    Ok(Parser::with_file_name(&tokens, file_name).parse_program()?)
}
