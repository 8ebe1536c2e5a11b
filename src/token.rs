use std::fmt;

/// Source location of a token's first character (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Span {
    pub line: usize,
    pub column: usize,
}

impl Span {
    #[must_use]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Position just past `text` when it starts at `self`. `\r\n`
    /// counts as one line break.
    #[must_use]
    pub fn advance(self, text: &str) -> Self {
        let mut span = self;
        let mut chars = text.chars().peekable();
        while let Some(ch) = chars.next() {
            match ch {
                '\r' if chars.peek() == Some(&'\n') => {}
                '\r' | '\n' => {
                    span.line += 1;
                    span.column = 1;
                }
                _ => span.column += 1,
            }
        }
        span
    }
}

impl Default for Span {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

/// Token kinds produced by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum TokenKind {
    /// End of input. Always the last token of a scan.
    Eof,
    Identifier,
    Integer,
    Float,
    /// Quoted string, `"..."` or `'...'`.
    String,

    // Keywords
    If,
    Then,
    Else,
    While,
    Do,
    Let,
    In,
    Begin,
    End,
    Const,
    Var,

    // Punctuation
    Tilde,
    Colon,
    Semicolon,
    LeftParen,
    RightParen,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    /// `=`, both the assignment sign and an expression operator.
    Equals,
    /// `==`
    Comparison,
    LessThan,
    GreaterThan,
    LessThanEqual,
    GreaterThanEqual,
}

impl TokenKind {
    /// Stable textual name used in diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Eof => "EOF",
            Self::Identifier => "identifier",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::If => "if",
            Self::Then => "then",
            Self::Else => "else",
            Self::While => "while",
            Self::Do => "do",
            Self::Let => "let",
            Self::In => "in",
            Self::Begin => "begin",
            Self::End => "end",
            Self::Const => "const",
            Self::Var => "var",
            Self::Tilde => "~",
            Self::Colon => ":",
            Self::Semicolon => ";",
            Self::LeftParen => "(",
            Self::RightParen => ")",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Equals => "=",
            Self::Comparison => "==",
            Self::LessThan => "<",
            Self::GreaterThan => ">",
            Self::LessThanEqual => "<=",
            Self::GreaterThanEqual => ">=",
        }
    }

    /// Whether this kind may appear between two primaries of an
    /// expression.
    #[must_use]
    pub const fn is_operator(self) -> bool {
        matches!(
            self,
            Self::Plus
                | Self::Minus
                | Self::Star
                | Self::Slash
                | Self::Equals
                | Self::Comparison
                | Self::LessThan
                | Self::GreaterThan
                | Self::LessThanEqual
                | Self::GreaterThanEqual
        )
    }

    #[must_use]
    pub const fn is_keyword(self) -> bool {
        matches!(
            self,
            Self::If
                | Self::Then
                | Self::Else
                | Self::While
                | Self::Do
                | Self::Let
                | Self::In
                | Self::Begin
                | Self::End
                | Self::Const
                | Self::Var
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single token with its kind, text, and source location.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

impl Token {
    #[must_use]
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }

    /// End-of-input token at `span`. Its text is empty.
    #[must_use]
    pub const fn eof(span: Span) -> Self {
        Self {
            kind: TokenKind::Eof,
            text: String::new(),
            span,
        }
    }

    #[must_use]
    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[<{}>@{}:{} {}]",
            self.kind, self.span.line, self.span.column, self.text
        )
    }
}
