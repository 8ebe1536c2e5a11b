use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::token::{Span, Token, TokenKind};

/// Name reported for sources that do not come from a file.
pub const STDIN_NAME: &str = "<stdin>";

/// Classifies a scanner error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    /// String literal without its closing quote.
    UnterminatedString,
    /// Character that cannot start any token.
    UnexpectedCharacter(char),
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnterminatedString => write!(f, "unterminated string literal"),
            Self::UnexpectedCharacter(ch) => write!(f, "unexpected character '{ch}'"),
        }
    }
}

/// Error produced during scanning.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{file}:{}:{}: {kind}", span.line, span.column)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub file: String,
    pub span: Span,
}

/// What the scanner does with a matched rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    /// Consume the match and try again (whitespace, line breaks, comments).
    Skip,
    /// Consume the match and emit a token of this kind.
    Emit(TokenKind),
}

struct Rule {
    action: Action,
    pattern: Regex,
}

/// Ordered rule table. The first rule whose pattern matches a prefix of
/// the remaining input wins, so a pattern must come before any other
/// pattern that matches one of its prefixes.
const RULE_TABLE: &[(Action, &str)] = &[
    (Action::Skip, r"^(?:\r\n|\r|\n)"),
    (Action::Skip, r"^[ \t]+"),
    (Action::Skip, r"^//[^\r\n]*"),
    // Opening quote and content only; the closing quote is checked by hand.
    (Action::Emit(TokenKind::String), r#"^"[^"]*"#),
    (Action::Emit(TokenKind::String), r"^'[^']*"),
    (Action::Emit(TokenKind::If), r"^if\b"),
    (Action::Emit(TokenKind::End), r"^end\b"),
    (Action::Emit(TokenKind::Tilde), r"^~"),
    (Action::Emit(TokenKind::Colon), r"^:"),
    (Action::Emit(TokenKind::Semicolon), r"^;"),
    (Action::Emit(TokenKind::Then), r"^then\b"),
    (Action::Emit(TokenKind::Else), r"^else\b"),
    // Float before integer, or `1.5` would scan as `1` and fail on `.`.
    (Action::Emit(TokenKind::Float), r"^[0-9]+\.[0-9]+"),
    (Action::Emit(TokenKind::Integer), r"^[0-9]+"),
    (Action::Emit(TokenKind::Plus), r"^\+"),
    (Action::Emit(TokenKind::Minus), r"^-"),
    (Action::Emit(TokenKind::Slash), r"^/"),
    (Action::Emit(TokenKind::Star), r"^\*"),
    (Action::Emit(TokenKind::LeftParen), r"^\("),
    (Action::Emit(TokenKind::RightParen), r"^\)"),
    (Action::Emit(TokenKind::Comparison), r"^=="),
    (Action::Emit(TokenKind::Equals), r"^="),
    (Action::Emit(TokenKind::LessThanEqual), r"^<="),
    (Action::Emit(TokenKind::GreaterThanEqual), r"^>="),
    (Action::Emit(TokenKind::LessThan), r"^<"),
    (Action::Emit(TokenKind::GreaterThan), r"^>"),
    (Action::Emit(TokenKind::While), r"^while\b"),
    (Action::Emit(TokenKind::Do), r"^do\b"),
    (Action::Emit(TokenKind::Let), r"^let\b"),
    (Action::Emit(TokenKind::Var), r"^var\b"),
    (Action::Emit(TokenKind::Const), r"^const\b"),
    (Action::Emit(TokenKind::In), r"^in\b"),
    (Action::Emit(TokenKind::Begin), r"^begin\b"),
    (Action::Emit(TokenKind::Identifier), r"^[_a-zA-Z][_a-zA-Z0-9]*"),
];

/// Compiled form of `RULE_TABLE`, same length and order. The patterns
/// are literals, so a compile failure is a bug in the table.
static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    RULE_TABLE
        .iter()
        .map(|&(action, pattern)| {
            let pattern = Regex::new(pattern)
                .unwrap_or_else(|err| panic!("invalid scanner rule {pattern:?}: {err}"));
            Rule { action, pattern }
        })
        .collect()
});

/// Tokenize an in-memory source string, including the final
/// end-of-input token.
///
/// # Errors
///
/// Returns `LexError` on unterminated strings or characters that cannot
/// start a token.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    Scanner::new(input).tokenize()
}

/// Converts source text into tokens, one call at a time.
///
/// `line` and `column` always describe the next unconsumed character.
#[derive(Debug, Clone)]
pub struct Scanner {
    source: String,
    cursor: usize,
    line: usize,
    column: usize,
    file_name: String,
}

impl Scanner {
    /// Scanner over an in-memory source, reported as `<stdin>`.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self::with_file_name(source, STDIN_NAME)
    }

    #[must_use]
    pub fn with_file_name(source: impl Into<String>, file_name: impl Into<String>) -> Self {
        let source = source.into();
        let cursor = if source.starts_with('\u{FEFF}') {
            '\u{FEFF}'.len_utf8()
        } else {
            0
        };
        Self {
            source,
            cursor,
            line: 1,
            column: 1,
            file_name: file_name.into(),
        }
    }

    /// Read `path` and scan its contents. Errors name the file by its
    /// base name.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be read as UTF-8 text.
    pub fn from_file(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)?;
        let name = path.file_name().map_or_else(
            || path.display().to_string(),
            |name| name.to_string_lossy().into_owned(),
        );
        Ok(Self::with_file_name(source, name))
    }

    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Position of the next unconsumed character.
    #[must_use]
    pub const fn position(&self) -> Span {
        Span::new(self.line, self.column)
    }

    /// Scan the next token, skipping whitespace and comments.
    ///
    /// Once the input is exhausted every call returns an end-of-input
    /// token at the same position.
    ///
    /// # Errors
    ///
    /// Returns `LexError` when no rule matches at the cursor or a string
    /// literal is missing its closing quote.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        loop {
            let rest = &self.source[self.cursor..];
            let Some(first) = rest.chars().next() else {
                return Ok(Token::eof(self.position()));
            };

            let matched = RULES.iter().find_map(|rule| {
                rule.pattern
                    .find(rest)
                    .filter(|m| m.start() == 0 && !m.is_empty())
                    .map(|m| (rule.action, m.end()))
            });

            match matched {
                Some((Action::Skip, len)) => self.consume(len),
                Some((Action::Emit(TokenKind::String), len)) => {
                    return self.scan_string(first, len);
                }
                Some((Action::Emit(kind), len)) => return Ok(self.emit(kind, len)),
                None => {
                    return Err(self.error(LexErrorKind::UnexpectedCharacter(first), self.position()));
                }
            }
        }
    }

    /// Drain the scanner, stopping after (and including) the first
    /// end-of-input token.
    ///
    /// # Errors
    ///
    /// Returns the first `LexError` encountered.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.is_eof();
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    /// `len` covers the opening quote and the content; the closing quote
    /// must follow immediately.
    fn scan_string(&mut self, quote: char, len: usize) -> Result<Token, LexError> {
        let start = self.position();
        if !self.source[self.cursor + len..].starts_with(quote) {
            return Err(self.error(LexErrorKind::UnterminatedString, start));
        }
        Ok(self.emit(TokenKind::String, len + quote.len_utf8()))
    }

    fn emit(&mut self, kind: TokenKind, len: usize) -> Token {
        let span = self.position();
        let text = self.source[self.cursor..self.cursor + len].to_string();
        self.consume(len);
        let token = Token::new(kind, text, span);
        log::trace!("{}: {token}", self.file_name);
        token
    }

    /// Advance the cursor over `len` bytes, keeping line and column in
    /// step. `\r\n` counts as one line break.
    fn consume(&mut self, len: usize) {
        let end = self.position().advance(&self.source[self.cursor..self.cursor + len]);
        self.line = end.line;
        self.column = end.column;
        self.cursor += len;
    }

    fn error(&self, kind: LexErrorKind, span: Span) -> LexError {
        let err = LexError {
            kind,
            file: self.file_name.clone(),
            span,
        };
        log::debug!("scan failed: {err}");
        err
    }
}
