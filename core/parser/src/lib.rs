//! FILENAME: core/parser/src/lib.rs
//! PURPOSE: Library root for the Cotiza arithmetic formula parser.
//! CONTEXT: Quantity formulas stored in the generator sheets are rewritten
//! (cell coordinates -> variable names -> numbers) before they reach this
//! crate. What arrives here must be plain arithmetic; anything else is
//! rejected so no formula text is ever executed dynamically.
//!
//! PIPELINE: Formula String --> Lexer --> Tokens --> Parser --> AST --> Evaluator
//!
//! SUPPORTED FEATURES:
//! - Numeric literals: 12, 0.5, .25
//! - Arithmetic: +, -, *, /
//! - Unary sign: -5, +5
//! - Parentheses for grouping
//! - An optional leading '=' (formula indicator), accepted once
//! - Nesting up to `MAX_DEPTH` levels
//!
//! Identifiers are tokenized so the parser can report them by name, but
//! they never parse into an expression.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;


// Re-export commonly used types for convenience
pub use ast::{BinaryOperator, Expression, UnaryOperator};
pub use lexer::Lexer;
pub use parser::{parse, parse_arithmetic, ParseError, ParseResult, Parser, MAX_DEPTH};
pub use token::Token;
