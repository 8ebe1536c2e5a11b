//! Typed syntax tree for Alpha programs.
//!
//! Each grammar construct has its own type, and [`Node`] is the closed
//! borrowed view over all of them, used for generic traversal and
//! rendering.

use std::fmt;

use crate::render;
use crate::token::{Token, TokenKind};

/// Root of a parsed program: exactly one single command.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Program {
    pub command: SingleCommand,
}

/// One statement.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum SingleCommand {
    Assignment(Assignment),
    FunctionCall(FunctionCall),
    If(IfBlock),
    While(WhileBlock),
    Let(LetBlock),
    Begin(BeginBlock),
}

/// `name = expression`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Assignment {
    pub identifier: Token,
    pub expression: Expression,
}

/// `name(expression?)`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FunctionCall {
    pub identifier: Token,
    pub argument: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct IfBlock {
    pub condition: Expression,
    pub then_branch: Box<SingleCommand>,
    pub else_branch: Box<SingleCommand>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct WhileBlock {
    pub condition: Expression,
    pub body: Box<SingleCommand>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LetBlock {
    pub declaration: Declaration,
    pub body: Box<SingleCommand>,
}

/// `begin command end`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BeginBlock {
    pub command: Command,
}

/// Semicolon-separated sequence of one or more single commands.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Command {
    pub commands: Vec<SingleCommand>,
}

/// Semicolon-separated sequence of one or more single declarations.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Declaration {
    pub declarations: Vec<SingleDeclaration>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum SingleDeclaration {
    Const(ConstDecl),
    Var(VarDecl),
}

/// `const name ~ expression`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ConstDecl {
    pub identifier: Token,
    pub initializer: Expression,
}

/// `var name : type`
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct VarDecl {
    pub identifier: Token,
    pub type_denoter: TypeDenoter,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TypeDenoter {
    pub name: Token,
}

/// Flat operator chain: `first (op primary)*`.
///
/// There is no precedence: `a + b * c` is the chain `[a, +, b, *, c]`.
/// Parentheses are the only grouping.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Expression {
    pub first: Primary,
    pub rest: Vec<(Operator, Primary)>,
}

impl Expression {
    #[must_use]
    pub const fn new(first: Primary) -> Self {
        Self {
            first,
            rest: Vec::new(),
        }
    }

    /// Number of primaries in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        1 + self.rest.len()
    }

    /// Always false: an expression holds at least one primary.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Primaries in source order.
    pub fn primaries(&self) -> impl Iterator<Item = &Primary> {
        std::iter::once(&self.first).chain(self.rest.iter().map(|(_, p)| p))
    }

    /// Operators in source order.
    pub fn operators(&self) -> impl Iterator<Item = Operator> + '_ {
        self.rest.iter().map(|(op, _)| *op)
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Primary {
    Literal(Literal),
    Identifier(Token),
    /// Parenthesised sub-expression.
    Group(Box<Expression>),
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Literal {
    Integer(i64),
    Float(f64),
    /// Content without the surrounding quotes.
    String(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Equals,
    Comparison,
    LessThan,
    GreaterThan,
    LessThanEqual,
    GreaterThanEqual,
}

impl Operator {
    /// Operator for a token kind, if the kind is one.
    #[must_use]
    pub const fn from_token_kind(kind: TokenKind) -> Option<Self> {
        Some(match kind {
            TokenKind::Plus => Self::Add,
            TokenKind::Minus => Self::Subtract,
            TokenKind::Star => Self::Multiply,
            TokenKind::Slash => Self::Divide,
            TokenKind::Equals => Self::Equals,
            TokenKind::Comparison => Self::Comparison,
            TokenKind::LessThan => Self::LessThan,
            TokenKind::GreaterThan => Self::GreaterThan,
            TokenKind::LessThanEqual => Self::LessThanEqual,
            TokenKind::GreaterThanEqual => Self::GreaterThanEqual,
            _ => return None,
        })
    }

    #[must_use]
    pub const fn token_kind(self) -> TokenKind {
        match self {
            Self::Add => TokenKind::Plus,
            Self::Subtract => TokenKind::Minus,
            Self::Multiply => TokenKind::Star,
            Self::Divide => TokenKind::Slash,
            Self::Equals => TokenKind::Equals,
            Self::Comparison => TokenKind::Comparison,
            Self::LessThan => TokenKind::LessThan,
            Self::GreaterThan => TokenKind::GreaterThan,
            Self::LessThanEqual => TokenKind::LessThanEqual,
            Self::GreaterThanEqual => TokenKind::GreaterThanEqual,
        }
    }

    #[must_use]
    pub const fn symbol(self) -> &'static str {
        self.token_kind().name()
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value:?}"),
            Self::String(value) => write!(f, "{value:?}"),
        }
    }
}

/// Borrowed view of any tree node, one variant per construct.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Node<'a> {
    Program(&'a Program),
    Assignment(&'a Assignment),
    FunctionCall(&'a FunctionCall),
    IfBlock(&'a IfBlock),
    WhileBlock(&'a WhileBlock),
    LetBlock(&'a LetBlock),
    BeginBlock(&'a BeginBlock),
    Command(&'a Command),
    Declaration(&'a Declaration),
    ConstDecl(&'a ConstDecl),
    VarDecl(&'a VarDecl),
    TypeDenoter(&'a TypeDenoter),
    Expression(&'a Expression),
    Operator(Operator),
    Literal(&'a Literal),
    IdentifierRef(&'a Token),
}

impl<'a> Node<'a> {
    /// Construct name used in the rendered form.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Program(_) => "Program",
            Self::Assignment(_) => "Assignment",
            Self::FunctionCall(_) => "FunctionCall",
            Self::IfBlock(_) => "IfBlock",
            Self::WhileBlock(_) => "WhileBlock",
            Self::LetBlock(_) => "LetBlock",
            Self::BeginBlock(_) => "BeginBlock",
            Self::Command(_) => "Command",
            Self::Declaration(_) => "Declaration",
            Self::ConstDecl(_) => "ConstDecl",
            Self::VarDecl(_) => "VarDecl",
            Self::TypeDenoter(_) => "TypeDenoter",
            Self::Expression(_) => "Expression",
            Self::Operator(_) => "Operator",
            Self::Literal(Literal::Integer(_)) => "Integer",
            Self::Literal(Literal::Float(_)) => "Float",
            Self::Literal(Literal::String(_)) => "String",
            Self::IdentifierRef(_) => "Identifier",
        }
    }

    /// Leaf value carried by the node itself: identifier text, literal
    /// value, or operator symbol.
    #[must_use]
    pub fn value(self) -> Option<String> {
        match self {
            Self::Assignment(Assignment { identifier, .. })
            | Self::FunctionCall(FunctionCall { identifier, .. })
            | Self::ConstDecl(ConstDecl { identifier, .. })
            | Self::VarDecl(VarDecl { identifier, .. })
            | Self::TypeDenoter(TypeDenoter { name: identifier })
            | Self::IdentifierRef(identifier) => Some(identifier.text.clone()),
            Self::Operator(op) => Some(op.symbol().to_string()),
            Self::Literal(lit) => Some(lit.to_string()),
            Self::Program(_)
            | Self::IfBlock(_)
            | Self::WhileBlock(_)
            | Self::LetBlock(_)
            | Self::BeginBlock(_)
            | Self::Command(_)
            | Self::Declaration(_)
            | Self::Expression(_) => None,
        }
    }

    /// Direct children in source order.
    #[must_use]
    pub fn children(self) -> Vec<Self> {
        match self {
            Self::Program(p) => vec![Node::from(&p.command)],
            Self::Assignment(a) => vec![Node::Expression(&a.expression)],
            Self::FunctionCall(call) => call.argument.iter().map(Node::Expression).collect(),
            Self::IfBlock(block) => vec![
                Node::Expression(&block.condition),
                Node::from(block.then_branch.as_ref()),
                Node::from(block.else_branch.as_ref()),
            ],
            Self::WhileBlock(block) => vec![
                Node::Expression(&block.condition),
                Node::from(block.body.as_ref()),
            ],
            Self::LetBlock(block) => vec![
                Node::Declaration(&block.declaration),
                Node::from(block.body.as_ref()),
            ],
            Self::BeginBlock(block) => vec![Node::Command(&block.command)],
            Self::Command(command) => command.commands.iter().map(Node::from).collect(),
            Self::Declaration(decl) => decl.declarations.iter().map(Node::from).collect(),
            Self::ConstDecl(decl) => vec![Node::Expression(&decl.initializer)],
            Self::VarDecl(decl) => vec![Node::TypeDenoter(&decl.type_denoter)],
            Self::Expression(expr) => {
                let mut children = Vec::with_capacity(expr.rest.len() * 2 + 1);
                children.push(Node::from(&expr.first));
                for (op, primary) in &expr.rest {
                    children.push(Node::Operator(*op));
                    children.push(Node::from(primary));
                }
                children
            }
            Self::TypeDenoter(_) | Self::Operator(_) | Self::Literal(_) | Self::IdentifierRef(_) => {
                Vec::new()
            }
        }
    }

    /// Visit this node and every descendant, depth-first, parents first.
    pub fn walk(self, visit: &mut impl FnMut(Node<'a>)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }
}

impl<'a> From<&'a Program> for Node<'a> {
    fn from(program: &'a Program) -> Self {
        Node::Program(program)
    }
}

impl<'a> From<&'a SingleCommand> for Node<'a> {
    fn from(command: &'a SingleCommand) -> Self {
        match command {
            SingleCommand::Assignment(a) => Node::Assignment(a),
            SingleCommand::FunctionCall(c) => Node::FunctionCall(c),
            SingleCommand::If(b) => Node::IfBlock(b),
            SingleCommand::While(b) => Node::WhileBlock(b),
            SingleCommand::Let(b) => Node::LetBlock(b),
            SingleCommand::Begin(b) => Node::BeginBlock(b),
        }
    }
}

impl<'a> From<&'a SingleDeclaration> for Node<'a> {
    fn from(decl: &'a SingleDeclaration) -> Self {
        match decl {
            SingleDeclaration::Const(c) => Node::ConstDecl(c),
            SingleDeclaration::Var(v) => Node::VarDecl(v),
        }
    }
}

impl<'a> From<&'a Primary> for Node<'a> {
    fn from(primary: &'a Primary) -> Self {
        match primary {
            Primary::Literal(lit) => Node::Literal(lit),
            Primary::Identifier(tok) => Node::IdentifierRef(tok),
            Primary::Group(expr) => Node::Expression(expr.as_ref()),
        }
    }
}

impl fmt::Display for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render::render(*self))
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&Node::from(self), f)
    }
}
