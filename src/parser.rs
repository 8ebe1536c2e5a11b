use std::fmt;

use crate::ast::{
    Assignment, BeginBlock, Command, ConstDecl, Declaration, Expression, FunctionCall, IfBlock,
    LetBlock, Literal, Operator, Primary, Program, SingleCommand, SingleDeclaration, TypeDenoter,
    VarDecl, WhileBlock,
};
use crate::scanner::STDIN_NAME;
use crate::token::{Span, Token, TokenKind};

/// Kinds that can start a single command.
pub const COMMAND_START: &[TokenKind] = &[
    TokenKind::Identifier,
    TokenKind::If,
    TokenKind::While,
    TokenKind::Let,
    TokenKind::Begin,
];

/// Kinds that can start a primary expression.
pub const PRIMARY_START: &[TokenKind] = &[
    TokenKind::Integer,
    TokenKind::Float,
    TokenKind::String,
    TokenKind::Identifier,
    TokenKind::LeftParen,
];

/// Maximum combined nesting of commands and expressions. Deeper input
/// is rejected with `ParseErrorKind::NestingTooDeep`, which also bounds
/// recursion when the tree is rendered, walked or dropped.
pub const MAX_DEPTH: usize = 128;

/// Kinds that can start a single declaration.
pub const DECLARATION_START: &[TokenKind] = &[TokenKind::Const, TokenKind::Var];

/// What the parser would have accepted instead of the offending token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expected {
    One(TokenKind),
    /// Ordered list of acceptable kinds.
    OneOf(Vec<TokenKind>),
}

impl Expected {
    #[must_use]
    pub fn kinds(&self) -> &[TokenKind] {
        match self {
            Self::One(kind) => std::slice::from_ref(kind),
            Self::OneOf(kinds) => kinds,
        }
    }
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::One(kind) => write!(f, "expected '{kind}'"),
            Self::OneOf(kinds) => {
                write!(f, "expected one of ")?;
                for (i, kind) in kinds.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "'{kind}'")?;
                }
                Ok(())
            }
        }
    }
}

/// Classifies a parser error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The current token does not fit the production in progress.
    UnexpectedToken { found: TokenKind, expected: Expected },
    /// Integer literal outside the `i64` range.
    InvalidNumber { text: String },
    /// Commands and expressions nested more than `limit` levels deep.
    NestingTooDeep { limit: usize },
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedToken { found, expected } => {
                write!(f, "unexpected token '{found}' {expected}")
            }
            Self::InvalidNumber { text } => write!(f, "invalid number literal '{text}'"),
            Self::NestingTooDeep { limit } => {
                write!(f, "nesting exceeds the limit of {limit} levels")
            }
        }
    }
}

/// Error produced during parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{file}:{}:{}: {kind}", span.line, span.column)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub file: String,
    pub span: Span,
}

impl ParseError {
    /// Kinds that would have been accepted; empty for literal and
    /// nesting errors.
    #[must_use]
    pub fn expected(&self) -> &[TokenKind] {
        match &self.kind {
            ParseErrorKind::UnexpectedToken { expected, .. } => expected.kinds(),
            ParseErrorKind::InvalidNumber { .. } | ParseErrorKind::NestingTooDeep { .. } => &[],
        }
    }

    /// Kind of the offending token, if the error is about one.
    #[must_use]
    pub const fn found(&self) -> Option<TokenKind> {
        match &self.kind {
            ParseErrorKind::UnexpectedToken { found, .. } => Some(*found),
            ParseErrorKind::InvalidNumber { .. } | ParseErrorKind::NestingTooDeep { .. } => {
                None
            }
        }
    }
}

/// Parse a token sequence into a `Program`.
///
/// # Errors
///
/// Returns `ParseError` on the first token that does not fit the
/// grammar.
pub fn parse(tokens: &[Token]) -> Result<Program, ParseError> {
    Parser::new(tokens).parse_program()
}

/// Recursive-descent parser with one method per grammar production and
/// a single token of lookahead.
#[derive(Debug)]
pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
    file_name: String,
    /// Returned by lookahead once `pos` runs off the end of `tokens`.
    eof: Token,
}

impl<'a> Parser<'a> {
    #[must_use]
    pub fn new(tokens: &'a [Token]) -> Self {
        Self::with_file_name(tokens, STDIN_NAME)
    }

    #[must_use]
    pub fn with_file_name(tokens: &'a [Token], file_name: impl Into<String>) -> Self {
        let eof = match tokens.last() {
            Some(last) if last.is_eof() => last.clone(),
            Some(last) => Token::eof(last.span.advance(&last.text)),
            None => Token::eof(Span::default()),
        };
        Self {
            tokens,
            pos: 0,
            depth: 0,
            file_name: file_name.into(),
            eof,
        }
    }

    /// `program ::= singleCommand EOF`
    ///
    /// # Errors
    ///
    /// Returns `ParseError` on the first syntax error; no recovery is
    /// attempted.
    pub fn parse_program(mut self) -> Result<Program, ParseError> {
        log::debug!(
            "parsing {} tokens from {}",
            self.tokens.len(),
            self.file_name
        );
        let command = self.parse_single_command()?;
        self.expect(TokenKind::Eof)?;
        log::debug!("parsed {}", self.file_name);
        Ok(Program { command })
    }

    /// `command ::= singleCommand (';' singleCommand)*`
    fn parse_command(&mut self) -> Result<Command, ParseError> {
        let mut commands = vec![self.parse_branch(TokenKind::End)?];
        while self.check(TokenKind::Semicolon) {
            self.accept();
            commands.push(self.parse_single_command()?);
        }
        Ok(Command { commands })
    }

    fn parse_single_command(&mut self) -> Result<SingleCommand, ParseError> {
        self.nested(|p| match p.peek() {
            TokenKind::Identifier => p.parse_identifier_command(),
            TokenKind::If => p.parse_if_block().map(SingleCommand::If),
            TokenKind::While => p.parse_while_block().map(SingleCommand::While),
            TokenKind::Let => p.parse_let_block().map(SingleCommand::Let),
            TokenKind::Begin => p.parse_begin_block().map(SingleCommand::Begin),
            _ => Err(p.unexpected(Expected::OneOf(COMMAND_START.to_vec()))),
        })
    }

    /// Single command that must be present before `pending` can close
    /// the enclosing construct. A missing command reports `pending`
    /// alongside the command-start kinds.
    fn parse_branch(&mut self, pending: TokenKind) -> Result<SingleCommand, ParseError> {
        if COMMAND_START.contains(&self.peek()) {
            return self.parse_single_command();
        }
        let mut expected = COMMAND_START.to_vec();
        expected.push(pending);
        Err(self.unexpected(Expected::OneOf(expected)))
    }

    /// `Identifier ('=' expression | '(' expression? ')')`
    fn parse_identifier_command(&mut self) -> Result<SingleCommand, ParseError> {
        let identifier = self.accept();
        match self.peek() {
            TokenKind::Equals => {
                self.accept();
                let expression = self.parse_expression()?;
                Ok(SingleCommand::Assignment(Assignment {
                    identifier,
                    expression,
                }))
            }
            TokenKind::LeftParen => {
                self.accept();
                let argument = if self.check(TokenKind::RightParen) {
                    None
                } else if PRIMARY_START.contains(&self.peek()) {
                    Some(self.parse_expression()?)
                } else {
                    let mut expected = vec![TokenKind::RightParen];
                    expected.extend_from_slice(PRIMARY_START);
                    return Err(self.unexpected(Expected::OneOf(expected)));
                };
                self.expect(TokenKind::RightParen)?;
                Ok(SingleCommand::FunctionCall(FunctionCall {
                    identifier,
                    argument,
                }))
            }
            _ => Err(self.unexpected(Expected::OneOf(vec![
                TokenKind::Equals,
                TokenKind::LeftParen,
            ]))),
        }
    }

    /// `'if' expression 'then' singleCommand 'else' singleCommand`
    fn parse_if_block(&mut self) -> Result<IfBlock, ParseError> {
        self.expect(TokenKind::If)?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::Then)?;
        let then_branch = self.parse_branch(TokenKind::Else)?;
        self.expect(TokenKind::Else)?;
        let else_branch = self.parse_single_command()?;
        Ok(IfBlock {
            condition,
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        })
    }

    /// `'while' expression 'do' singleCommand`
    fn parse_while_block(&mut self) -> Result<WhileBlock, ParseError> {
        self.expect(TokenKind::While)?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::Do)?;
        let body = self.parse_single_command()?;
        Ok(WhileBlock {
            condition,
            body: Box::new(body),
        })
    }

    /// `'let' declaration 'in' singleCommand`
    fn parse_let_block(&mut self) -> Result<LetBlock, ParseError> {
        self.expect(TokenKind::Let)?;
        let declaration = self.parse_declaration()?;
        self.expect(TokenKind::In)?;
        let body = self.parse_single_command()?;
        Ok(LetBlock {
            declaration,
            body: Box::new(body),
        })
    }

    /// `'begin' command 'end'`
    fn parse_begin_block(&mut self) -> Result<BeginBlock, ParseError> {
        self.expect(TokenKind::Begin)?;
        let command = self.parse_command()?;
        self.expect(TokenKind::End)?;
        Ok(BeginBlock { command })
    }

    /// `declaration ::= singleDeclaration (';' singleDeclaration)*`
    fn parse_declaration(&mut self) -> Result<Declaration, ParseError> {
        let mut declarations = vec![self.parse_single_declaration()?];
        while self.check(TokenKind::Semicolon) {
            self.accept();
            declarations.push(self.parse_single_declaration()?);
        }
        Ok(Declaration { declarations })
    }

    fn parse_single_declaration(&mut self) -> Result<SingleDeclaration, ParseError> {
        match self.peek() {
            TokenKind::Const => {
                self.accept();
                let identifier = self.expect(TokenKind::Identifier)?;
                self.expect(TokenKind::Tilde)?;
                let initializer = self.parse_expression()?;
                Ok(SingleDeclaration::Const(ConstDecl {
                    identifier,
                    initializer,
                }))
            }
            TokenKind::Var => {
                self.accept();
                let identifier = self.expect(TokenKind::Identifier)?;
                self.expect(TokenKind::Colon)?;
                let type_denoter = self.parse_type_denoter()?;
                Ok(SingleDeclaration::Var(VarDecl {
                    identifier,
                    type_denoter,
                }))
            }
            _ => Err(self.unexpected(Expected::OneOf(DECLARATION_START.to_vec()))),
        }
    }

    /// `typeDenoter ::= Identifier`
    fn parse_type_denoter(&mut self) -> Result<TypeDenoter, ParseError> {
        let name = self.expect(TokenKind::Identifier)?;
        Ok(TypeDenoter { name })
    }

    /// `expression ::= primaryExpression (operator primaryExpression)*`
    ///
    /// Operators chain left to right with no precedence.
    fn parse_expression(&mut self) -> Result<Expression, ParseError> {
        self.nested(|p| {
            let mut expression = Expression::new(p.parse_primary()?);
            while let Some(op) = Operator::from_token_kind(p.peek()) {
                p.accept();
                let primary = p.parse_primary()?;
                expression.rest.push((op, primary));
            }
            Ok(expression)
        })
    }

    fn parse_primary(&mut self) -> Result<Primary, ParseError> {
        match self.peek() {
            TokenKind::Integer => {
                let token = self.accept();
                match token.text.parse::<i64>() {
                    Ok(value) => Ok(Primary::Literal(Literal::Integer(value))),
                    Err(_) => Err(self.invalid_number(token)),
                }
            }
            TokenKind::Float => {
                let token = self.accept();
                match token.text.parse::<f64>() {
                    Ok(value) => Ok(Primary::Literal(Literal::Float(value))),
                    Err(_) => Err(self.invalid_number(token)),
                }
            }
            TokenKind::String => {
                let token = self.accept();
                Ok(Primary::Literal(Literal::String(
                    strip_quotes(&token.text).to_string(),
                )))
            }
            TokenKind::Identifier => Ok(Primary::Identifier(self.accept())),
            TokenKind::LeftParen => {
                self.accept();
                let inner = self.parse_expression()?;
                self.expect(TokenKind::RightParen)?;
                Ok(Primary::Group(Box::new(inner)))
            }
            _ => Err(self.unexpected(Expected::OneOf(PRIMARY_START.to_vec()))),
        }
    }

    /// Run one level of a recursive production, failing at the current
    /// token once `MAX_DEPTH` levels are open.
    fn nested<T>(
        &mut self,
        production: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= MAX_DEPTH {
            let span = self.current().span;
            return Err(self.error(ParseErrorKind::NestingTooDeep { limit: MAX_DEPTH }, span));
        }
        self.depth += 1;
        let result = production(self);
        self.depth -= 1;
        result
    }

    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.eof)
    }

    fn peek(&self) -> TokenKind {
        self.current().kind
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek() == kind
    }

    /// Consume the current token unconditionally. The cursor never moves
    /// past the end of the slice.
    fn accept(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.accept())
        } else {
            Err(self.unexpected(Expected::One(kind)))
        }
    }

    fn unexpected(&self, expected: Expected) -> ParseError {
        let token = self.current();
        self.error(
            ParseErrorKind::UnexpectedToken {
                found: token.kind,
                expected,
            },
            token.span,
        )
    }

    fn invalid_number(&self, token: Token) -> ParseError {
        self.error(ParseErrorKind::InvalidNumber { text: token.text }, token.span)
    }

    fn error(&self, kind: ParseErrorKind, span: Span) -> ParseError {
        let err = ParseError {
            kind,
            file: self.file_name.clone(),
            span,
        };
        log::debug!("parse failed: {err}");
        err
    }
}

/// String token text without its surrounding quotes.
fn strip_quotes(text: &str) -> &str {
    text.get(1..text.len().saturating_sub(1)).unwrap_or_default()
}
