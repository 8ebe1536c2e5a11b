//! Parser structure and error tests.

mod common;

use alpha_lang::{
    Error, Expected, Literal, MAX_DEPTH, Node, Operator, ParseErrorKind, Parser, Primary,
    SingleCommand, SingleDeclaration, Span, TokenKind, parse, parse_file, parse_str, render,
    tokenize,
};
use common::parse_ok;

fn parse_err(input: &str) -> alpha_lang::ParseError {
    common::init_logging();
    match parse_str(input) {
        Err(Error::Parse(err)) => err,
        other => panic!("expected parse error for {input:?}, got {other:?}"),
    }
}

fn ident_primary(primary: &Primary) -> &str {
    match primary {
        Primary::Identifier(tok) => &tok.text,
        other => panic!("expected identifier primary, got {other:?}"),
    }
}

// -----------------------------------------------------------
// Productions.
// -----------------------------------------------------------

#[test]
fn if_block_with_calls() {
    let program = parse_ok("if c then x() else y()");
    let SingleCommand::If(block) = &program.command else {
        panic!("expected if block");
    };
    assert_eq!(block.condition.len(), 1);
    assert_eq!(ident_primary(&block.condition.first), "c");

    let SingleCommand::FunctionCall(then_call) = block.then_branch.as_ref() else {
        panic!("expected call in then branch");
    };
    assert_eq!(then_call.identifier.text, "x");
    assert!(then_call.argument.is_none());

    let SingleCommand::FunctionCall(else_call) = block.else_branch.as_ref() else {
        panic!("expected call in else branch");
    };
    assert_eq!(else_call.identifier.text, "y");
    assert!(else_call.argument.is_none());
}

#[test]
fn let_const_block() {
    let program = parse_ok("let const k ~ 5 in k = k + 1");
    let SingleCommand::Let(block) = &program.command else {
        panic!("expected let block");
    };
    assert_eq!(block.declaration.declarations.len(), 1);
    let SingleDeclaration::Const(decl) = &block.declaration.declarations[0] else {
        panic!("expected const declaration");
    };
    assert_eq!(decl.identifier.text, "k");
    assert_eq!(decl.initializer.first, Primary::Literal(Literal::Integer(5)));

    let SingleCommand::Assignment(body) = block.body.as_ref() else {
        panic!("expected assignment body");
    };
    assert_eq!(body.identifier.text, "k");
    assert_eq!(ident_primary(&body.expression.first), "k");
    assert_eq!(
        body.expression.rest,
        [(Operator::Add, Primary::Literal(Literal::Integer(1)))]
    );
}

#[test]
fn multiple_declarations() {
    let program = parse_ok("let var a : int; const b ~ 2.5; var c : text in f(a)");
    let SingleCommand::Let(block) = &program.command else {
        panic!("expected let block");
    };
    let decls = &block.declaration.declarations;
    assert_eq!(decls.len(), 3);
    let SingleDeclaration::Var(a) = &decls[0] else {
        panic!("expected var");
    };
    assert_eq!(a.identifier.text, "a");
    assert_eq!(a.type_denoter.name.text, "int");
    assert!(matches!(
        &decls[1],
        SingleDeclaration::Const(c) if c.initializer.first == Primary::Literal(Literal::Float(2.5))
    ));
}

#[test]
fn while_block() {
    let program = parse_ok("while n > 0 do n = n - 1");
    let SingleCommand::While(block) = &program.command else {
        panic!("expected while block");
    };
    assert_eq!(
        block.condition.operators().collect::<Vec<_>>(),
        [Operator::GreaterThan]
    );
    assert!(matches!(block.body.as_ref(), SingleCommand::Assignment(_)));
}

#[test]
fn begin_block_sequence() {
    let program = parse_ok("begin a = 1; b(); begin c = 2 end end");
    let SingleCommand::Begin(block) = &program.command else {
        panic!("expected begin block");
    };
    let commands = &block.command.commands;
    assert_eq!(commands.len(), 3);
    assert!(matches!(commands[0], SingleCommand::Assignment(_)));
    assert!(matches!(commands[1], SingleCommand::FunctionCall(_)));
    assert!(matches!(commands[2], SingleCommand::Begin(_)));
}

#[test]
fn flat_chain_has_no_precedence() {
    let program = parse_ok("x = 2 + 3 * 4");
    let SingleCommand::Assignment(assignment) = &program.command else {
        panic!("expected assignment");
    };
    let expr = &assignment.expression;
    assert_eq!(expr.first, Primary::Literal(Literal::Integer(2)));
    assert_eq!(
        expr.rest,
        [
            (Operator::Add, Primary::Literal(Literal::Integer(3))),
            (Operator::Multiply, Primary::Literal(Literal::Integer(4))),
        ]
    );
}

#[test]
fn parentheses_group() {
    let program = parse_ok("x = (2 + 3) * 4");
    let SingleCommand::Assignment(assignment) = &program.command else {
        panic!("expected assignment");
    };
    let Primary::Group(inner) = &assignment.expression.first else {
        panic!("expected group");
    };
    assert_eq!(inner.len(), 2);
    assert_eq!(assignment.expression.len(), 2);
}

#[test]
fn equals_inside_expression_is_operator() {
    let program = parse_ok("x = a = b == c");
    let SingleCommand::Assignment(assignment) = &program.command else {
        panic!("expected assignment");
    };
    assert_eq!(
        assignment.expression.operators().collect::<Vec<_>>(),
        [Operator::Equals, Operator::Comparison]
    );
}

#[test]
fn every_operator() {
    let program = parse_ok("x = a + b - c * d / e = f == g < h > i <= j >= k");
    let SingleCommand::Assignment(assignment) = &program.command else {
        panic!("expected assignment");
    };
    let symbols: Vec<_> = assignment
        .expression
        .operators()
        .map(Operator::symbol)
        .collect();
    assert_eq!(
        symbols,
        ["+", "-", "*", "/", "=", "==", "<", ">", "<=", ">="]
    );
}

#[test]
fn call_with_string_argument() {
    let program = parse_ok(r#"print("hello world")"#);
    let SingleCommand::FunctionCall(call) = &program.command else {
        panic!("expected call");
    };
    let arg = call.argument.as_ref().expect("argument");
    assert_eq!(
        arg.first,
        Primary::Literal(Literal::String("hello world".to_string()))
    );
}

// -----------------------------------------------------------
// Errors.
// -----------------------------------------------------------

#[test]
fn missing_else_and_body() {
    let err = parse_err("if x then");
    assert_eq!(err.found(), Some(TokenKind::Eof));
    assert!(err.expected().contains(&TokenKind::Else));
    assert_eq!(err.span, Span::new(1, 10));
    assert_eq!(
        err.to_string(),
        "<stdin>:1:10: unexpected token 'EOF' expected one of \
         'identifier', 'if', 'while', 'let', 'begin', 'else'"
    );
}

#[test]
fn missing_else_after_branch() {
    let err = parse_err("if x then y()");
    assert_eq!(
        err.kind,
        ParseErrorKind::UnexpectedToken {
            found: TokenKind::Eof,
            expected: Expected::One(TokenKind::Else),
        }
    );
    assert_eq!(
        err.to_string(),
        "<stdin>:1:14: unexpected token 'EOF' expected 'else'"
    );
}

#[test]
fn missing_then() {
    let err = parse_err("if x y() else z()");
    assert_eq!(err.found(), Some(TokenKind::Identifier));
    assert_eq!(err.expected(), [TokenKind::Then]);
    assert_eq!(err.span, Span::new(1, 6));
}

#[test]
fn missing_do() {
    let err = parse_err("while x y()");
    assert_eq!(err.expected(), [TokenKind::Do]);
}

#[test]
fn missing_in() {
    let err = parse_err("let var a : int a = 1");
    assert_eq!(err.expected(), [TokenKind::In]);
    assert_eq!(err.span, Span::new(1, 17));
}

#[test]
fn bad_declaration_start() {
    let err = parse_err("let a = 1 in b()");
    assert_eq!(err.expected(), [TokenKind::Const, TokenKind::Var]);
    assert_eq!(err.span, Span::new(1, 5));
}

#[test]
fn const_needs_identifier() {
    let err = parse_err("let const 5 ~ 5 in x()");
    assert_eq!(err.found(), Some(TokenKind::Integer));
    assert_eq!(err.expected(), [TokenKind::Identifier]);
    assert_eq!(err.span, Span::new(1, 11));
}

#[test]
fn const_needs_tilde() {
    let err = parse_err("let const k = 5 in x()");
    assert_eq!(err.found(), Some(TokenKind::Equals));
    assert_eq!(err.expected(), [TokenKind::Tilde]);
}

#[test]
fn var_needs_type() {
    let err = parse_err("let var a : in x()");
    assert_eq!(err.found(), Some(TokenKind::In));
    assert_eq!(err.expected(), [TokenKind::Identifier]);
}

#[test]
fn unclosed_begin() {
    let err = parse_err("begin x = 1; y = 2");
    assert_eq!(err.found(), Some(TokenKind::Eof));
    assert_eq!(err.expected(), [TokenKind::End]);
}

#[test]
fn empty_begin() {
    let err = parse_err("begin end");
    assert_eq!(err.found(), Some(TokenKind::End));
    assert!(err.expected().contains(&TokenKind::Identifier));
    assert!(err.expected().contains(&TokenKind::End));
}

#[test]
fn trailing_semicolon_in_begin() {
    let err = parse_err("begin x = 1; end");
    assert_eq!(err.found(), Some(TokenKind::End));
    assert_eq!(
        err.expected(),
        [
            TokenKind::Identifier,
            TokenKind::If,
            TokenKind::While,
            TokenKind::Let,
            TokenKind::Begin,
        ]
    );
}

#[test]
fn missing_operand() {
    let err = parse_err("x = 1 +");
    assert_eq!(err.found(), Some(TokenKind::Eof));
    assert_eq!(
        err.to_string(),
        "<stdin>:1:8: unexpected token 'EOF' expected one of \
         'integer', 'float', 'string', 'identifier', '('"
    );
}

#[test]
fn unclosed_group() {
    let err = parse_err("x = (1 + 2");
    assert_eq!(err.expected(), [TokenKind::RightParen]);
}

#[test]
fn call_with_bad_argument() {
    let err = parse_err("f(;)");
    assert_eq!(err.found(), Some(TokenKind::Semicolon));
    assert_eq!(err.expected()[0], TokenKind::RightParen);
    assert!(err.expected().contains(&TokenKind::LeftParen));
}

#[test]
fn unclosed_call() {
    let err = parse_err("f(1");
    assert_eq!(err.expected(), [TokenKind::RightParen]);
}

#[test]
fn program_is_single_command() {
    let err = parse_err("a = 1; b = 2");
    assert_eq!(err.found(), Some(TokenKind::Semicolon));
    assert_eq!(err.expected(), [TokenKind::Eof]);
}

#[test]
fn command_cannot_start_with_keyword() {
    let err = parse_err("then x()");
    assert_eq!(err.found(), Some(TokenKind::Then));
    assert_eq!(err.span, Span::new(1, 1));
}

#[test]
fn error_position_on_later_line() {
    let err = parse_err("begin\n  x = 1;\n  y 2\nend");
    assert_eq!(err.span, Span::new(3, 5));
    assert_eq!(err.found(), Some(TokenKind::Integer));
}

#[test]
fn empty_source() {
    let err = parse_err("   // nothing\n");
    assert_eq!(err.found(), Some(TokenKind::Eof));
    assert_eq!(err.span, Span::new(2, 1));
}

// -----------------------------------------------------------
// Nesting limits.
// -----------------------------------------------------------

fn nested(open: &str, inner: &str, close: &str, depth: usize) -> String {
    format!("{}{inner}{}", open.repeat(depth), close.repeat(depth))
}

#[test]
fn deeply_nested_parens_are_rejected() {
    let err = parse_err(&format!("x = {}", nested("(", "1", ")", 10_000)));
    assert_eq!(err.kind, ParseErrorKind::NestingTooDeep { limit: MAX_DEPTH });
    assert_eq!(
        err.to_string(),
        format!("<stdin>:1:132: nesting exceeds the limit of {MAX_DEPTH} levels")
    );
}

#[test]
fn deeply_nested_commands_are_rejected() {
    let begins = parse_err(&nested("begin ", "x = 1", " end", 10_000));
    assert_eq!(begins.kind, ParseErrorKind::NestingTooDeep { limit: MAX_DEPTH });

    let loops = parse_err(&nested("while x do ", "y()", "", 10_000));
    assert_eq!(loops.kind, ParseErrorKind::NestingTooDeep { limit: MAX_DEPTH });

    let lets = parse_err(&nested("let var a : int in ", "y()", "", 10_000));
    assert_eq!(lets.kind, ParseErrorKind::NestingTooDeep { limit: MAX_DEPTH });
}

#[test]
fn nesting_below_limit_parses_and_renders() {
    let program = parse_ok(&nested("while x do ", "y()", "", MAX_DEPTH - 1));
    let mut loops = 0;
    Node::from(&program).walk(&mut |node| {
        if matches!(node, Node::WhileBlock(_)) {
            loops += 1;
        }
    });
    assert_eq!(loops, MAX_DEPTH - 1);
    assert!(render(&program).contains("FunctionCall"));
}

// -----------------------------------------------------------
// Entry points.
// -----------------------------------------------------------

#[test]
fn parser_with_file_name() {
    let tokens = tokenize("x =").expect("tokenize");
    let err = Parser::with_file_name(&tokens, "main.alpha")
        .parse_program()
        .unwrap_err();
    assert_eq!(err.file, "main.alpha");
    assert!(err.to_string().starts_with("main.alpha:1:4: "));
}

#[test]
fn parse_from_tokens() {
    let tokens = tokenize("go()").expect("tokenize");
    assert!(parse(&tokens).is_ok());
}

#[test]
fn parse_str_lex_error() {
    let err = parse_str("x = \"unclosed").unwrap_err();
    assert!(matches!(err, Error::Lex(_)));
    assert_eq!(err.to_string(), "<stdin>:1:5: unterminated string literal");
}

#[test]
fn parse_file_reports_base_name() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("prog.alpha");
    std::fs::write(&path, "while x do\n  y =\n").expect("write");

    let err = parse_file(&path).unwrap_err();
    let Error::Parse(parse_err) = &err else {
        panic!("expected parse error, got {err:?}");
    };
    assert_eq!(parse_err.file, "prog.alpha");
    assert_eq!(parse_err.span, Span::new(3, 1));
}

#[test]
fn parse_file_ok() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("ok.alpha");
    std::fs::write(&path, "let var i : int in\nbegin\n  i = 0;\n  print(i)\nend\n")
        .expect("write");
    assert!(parse_file(&path).is_ok());
}

#[test]
fn parse_file_missing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = parse_file(dir.path().join("missing.alpha")).unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
    assert!(err.to_string().contains("missing.alpha"));
}
