//! Parser for the formula language.
//!
//! Converts tokens into AST with proper operator precedence.
//!
//! Precedence (lowest to highest):
//! 1. -> (implication, right-associative)
//! 2. | (disjunction)
//! 3. & (conjunction)
//! 4. ~, quantifiers, atoms, parentheses

use super::ast::{Atom, Formula, Term};
use super::token::Token;
use logos::Logos;
use std::iter::Peekable;

/// Parser state.
pub struct Parser<'a> {
    tokens: Peekable<Box<dyn Iterator<Item = Token> + 'a>>,
}

impl<'a> Parser<'a> {
    /// Create a new parser from input string.
    pub fn new(input: &'a str) -> Self {
        let lexer = Token::lexer(input);
        let iter: Box<dyn Iterator<Item = Token> + 'a> =
            Box::new(lexer.filter_map(|t| t.ok()));
        Self {
            tokens: iter.peekable(),
        }
    }

    /// Peek at the next token without consuming it.
    fn peek(&mut self) -> Option<&Token> {
        self.tokens.peek()
    }

    /// Consume and return the next token.
    fn next(&mut self) -> Option<Token> {
        self.tokens.next()
    }

    /// Expect a specific token, return error if not found.
    fn expect(&mut self, expected: Token) -> Result<(), String> {
        match self.next() {
            Some(t) if t == expected => Ok(()),
            Some(t) => Err(format!("Expected {}, got {}", expected, t)),
            None => Err(format!("Expected {}, got end of input", expected)),
        }
    }

    /// Parse a full formula, checking that all input is consumed.
    pub fn parse_formula(&mut self) -> Result<Formula, String> {
        let formula = self.parse_implication()?;
        match self.next() {
            None => Ok(formula),
            Some(t) => Err(format!("Unexpected trailing token: {}", t)),
        }
    }

    /// Parse an implication (lowest precedence, right-associative).
    fn parse_implication(&mut self) -> Result<Formula, String> {
        let left = self.parse_disjunction()?;

        if let Some(Token::Implies) = self.peek() {
            self.next();
            let right = self.parse_implication()?;
            Ok(Formula::Implies(Box::new(left), Box::new(right)))
        } else {
            Ok(left)
        }
    }

    /// Parse a disjunction (|).
    fn parse_disjunction(&mut self) -> Result<Formula, String> {
        let mut left = self.parse_conjunction()?;

        while let Some(Token::Or) = self.peek() {
            self.next();
            let right = self.parse_conjunction()?;
            left = Formula::Or(Box::new(left), Box::new(right));
        }

        Ok(left)
    }

    /// Parse a conjunction (&).
    fn parse_conjunction(&mut self) -> Result<Formula, String> {
        let mut left = self.parse_unary()?;

        while let Some(Token::And) = self.peek() {
            self.next();
            let right = self.parse_unary()?;
            left = Formula::And(Box::new(left), Box::new(right));
        }

        Ok(left)
    }

    /// Parse negation, quantifiers, and primary formulas.
    fn parse_unary(&mut self) -> Result<Formula, String> {
        match self.peek() {
            Some(Token::Not) => {
                self.next();
                let inner = self.parse_unary()?;
                Ok(Formula::Not(Box::new(inner)))
            }

            // Quantifier bodies extend as far right as possible:
            // `forall ?x: A(?x) -> B(?x)` quantifies the whole implication.
            Some(Token::Forall) => {
                self.next();
                let vars = self.parse_quantified_vars()?;
                let body = self.parse_implication()?;
                Ok(Formula::Forall {
                    vars,
                    body: Box::new(body),
                })
            }

            Some(Token::Exists) => {
                self.next();
                let vars = self.parse_quantified_vars()?;
                let body = self.parse_implication()?;
                Ok(Formula::Exists {
                    vars,
                    body: Box::new(body),
                })
            }

            Some(Token::LParen) => {
                self.next();
                let inner = self.parse_implication()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }

            Some(Token::Ident(_)) => self.parse_atom(),

            Some(t) => Err(format!("Unexpected token in formula: {}", t)),
            None => Err("Unexpected end of input in formula".into()),
        }
    }

    /// Parse the variable list of a quantifier: `?x` or `?x, ?y` then `:`.
    fn parse_quantified_vars(&mut self) -> Result<Vec<String>, String> {
        let mut vars = Vec::new();

        loop {
            match self.next() {
                Some(Token::Variable(v)) => {
                    if vars.contains(&v) {
                        return Err(format!("Duplicate quantified variable: {}", v));
                    }
                    vars.push(v);
                }
                Some(t) => return Err(format!("Expected variable, got {}", t)),
                None => return Err("Expected variable after quantifier".into()),
            }

            match self.next() {
                Some(Token::Comma) => continue,
                Some(Token::Colon) => break,
                Some(t) => return Err(format!("Expected , or : after variable, got {}", t)),
                None => return Err("Expected : after quantified variables".into()),
            }
        }

        Ok(vars)
    }

    /// Parse an atom: `A(?data)` or `Close(?x, a)`.
    fn parse_atom(&mut self) -> Result<Formula, String> {
        let predicate = match self.next() {
            Some(Token::Ident(s)) => s,
            Some(t) => return Err(format!("Expected predicate name, got {}", t)),
            None => return Err("Expected predicate name".into()),
        };

        self.expect(Token::LParen)?;

        let mut terms = Vec::new();
        loop {
            match self.next() {
                Some(Token::RParen) => break,
                Some(Token::Comma) => continue,
                Some(Token::Variable(v)) => terms.push(Term::Variable(v)),
                Some(Token::Ident(c)) => terms.push(Term::Constant(c)),
                Some(t) => return Err(format!("Unexpected token in arguments: {}", t)),
                None => return Err("Unexpected end of input in arguments".into()),
            }
        }

        if terms.is_empty() {
            return Err(format!("Predicate {} applied to no arguments", predicate));
        }

        Ok(Formula::Atom(Atom { predicate, terms }))
    }
}

/// Convenience function to parse a single formula.
pub fn parse_formula(input: &str) -> Result<Formula, String> {
    let mut parser = Parser::new(input);
    parser.parse_formula()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_membership_axiom() {
        let formula = parse_formula("forall ?data_A: A(?data_A)").unwrap();

        match formula {
            Formula::Forall { vars, body } => {
                assert_eq!(vars, vec!["?data_A".to_string()]);
                assert!(matches!(*body, Formula::Atom(_)));
            }
            other => panic!("Expected forall, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_exclusion_axiom() {
        let formula = parse_formula("forall ?data: A(?data) -> ~B(?data)").unwrap();

        match formula {
            Formula::Forall { body, .. } => match *body {
                Formula::Implies(lhs, rhs) => {
                    assert!(matches!(*lhs, Formula::Atom(_)));
                    assert!(matches!(*rhs, Formula::Not(_)));
                }
                other => panic!("Expected implication, got {:?}", other),
            },
            other => panic!("Expected forall, got {:?}", other),
        }
    }

    #[test]
    fn test_implication_is_right_associative() {
        let formula = parse_formula("A(?x) -> B(?x) -> C(?x)").unwrap();

        match formula {
            Formula::Implies(lhs, rhs) => {
                assert!(matches!(*lhs, Formula::Atom(_)));
                assert!(matches!(*rhs, Formula::Implies(_, _)));
            }
            other => panic!("Expected implication, got {:?}", other),
        }
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let formula = parse_formula("A(?x) | B(?x) & C(?x)").unwrap();

        match formula {
            Formula::Or(lhs, rhs) => {
                assert!(matches!(*lhs, Formula::Atom(_)));
                assert!(matches!(*rhs, Formula::And(_, _)));
            }
            other => panic!("Expected disjunction, got {:?}", other),
        }
    }

    #[test]
    fn test_constant_argument() {
        let formula = parse_formula("A(a)").unwrap();

        match formula {
            Formula::Atom(atom) => {
                assert_eq!(atom.predicate, "A");
                assert_eq!(atom.terms, vec![Term::Constant("a".into())]);
            }
            other => panic!("Expected atom, got {:?}", other),
        }
    }

    #[test]
    fn test_multi_variable_quantifier() {
        let formula = parse_formula("forall ?x, ?y: Close(?x, ?y)").unwrap();

        match formula {
            Formula::Forall { vars, .. } => {
                assert_eq!(vars, vec!["?x".to_string(), "?y".to_string()]);
            }
            other => panic!("Expected forall, got {:?}", other),
        }
    }

    #[test]
    fn test_trailing_tokens_rejected() {
        assert!(parse_formula("A(?x) B(?x)").is_err());
        assert!(parse_formula("forall ?x ?x: A(?x)").is_err());
        assert!(parse_formula("").is_err());
    }
}
