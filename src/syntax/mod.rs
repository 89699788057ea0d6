//! Syntax module: lexer, parser, and AST for the formula language.

pub mod ast;
pub mod parser;
pub mod token;

pub use ast::{Atom, Formula, Term};
pub use parser::parse_formula;
pub use token::Token;
