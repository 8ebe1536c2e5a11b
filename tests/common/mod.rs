#![allow(dead_code)]

use alpha_lang::{Program, parse_str, render};

/// Route library logging to the test harness. Safe to call repeatedly.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn parse_ok(input: &str) -> Program {
    init_logging();
    parse_str(input).unwrap_or_else(|e| panic!("failed to parse {input:?}: {e}"))
}

pub fn assert_renders(input: &str, expected: &str) {
    let program = parse_ok(input);
    let output = render(&program);
    assert_eq!(
        output, expected,
        "render mismatch:\n--- expected ---\n{expected}\n--- got ---\n{output}"
    );
}

/// Every reserved word of the language.
pub const KEYWORDS: &[&str] = &[
    "if", "then", "else", "while", "do", "let", "in", "begin", "end", "const", "var",
];
