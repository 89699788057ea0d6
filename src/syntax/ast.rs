//! Abstract syntax tree for first-order formulas.

use rustc_hash::FxHashSet;

/// A term appearing as a predicate argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    /// A variable bound to a sample tensor: `?data`
    Variable(String),
    /// A constant bound to a fixed point: `a`
    Constant(String),
}

impl Term {
    /// The surface name of the term (`?data`, `a`).
    pub fn name(&self) -> &str {
        match self {
            Term::Variable(s) => s,
            Term::Constant(s) => s,
        }
    }
}

/// An atomic formula: a predicate applied to terms.
/// Example: `A(?data)` or `Close(?x, a)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Atom {
    pub predicate: String,
    pub terms: Vec<Term>,
}

/// A first-order formula over predicates, variables, and constants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Formula {
    /// Predicate application: `A(?data)`
    Atom(Atom),

    /// Negation: `~A(?data)`
    Not(Box<Formula>),

    /// Conjunction: `A(?x) & B(?x)`
    And(Box<Formula>, Box<Formula>),

    /// Disjunction: `A(?x) | B(?x)`
    Or(Box<Formula>, Box<Formula>),

    /// Implication: `A(?x) -> B(?x)` (right-associative)
    Implies(Box<Formula>, Box<Formula>),

    /// Universal quantification: `forall ?x: body` or `forall ?x, ?y: body`
    Forall { vars: Vec<String>, body: Box<Formula> },

    /// Existential quantification: `exists ?x: body`
    Exists { vars: Vec<String>, body: Box<Formula> },
}

impl Formula {
    /// Free variables in first-occurrence order.
    pub fn free_vars(&self) -> Vec<String> {
        let mut out = Vec::new();
        let mut seen = FxHashSet::default();
        self.collect_free(&mut out, &mut seen, &mut Vec::new());
        out
    }

    fn collect_free(
        &self,
        out: &mut Vec<String>,
        seen: &mut FxHashSet<String>,
        bound: &mut Vec<String>,
    ) {
        match self {
            Formula::Atom(atom) => {
                for term in &atom.terms {
                    if let Term::Variable(v) = term {
                        if !bound.contains(v) && seen.insert(v.clone()) {
                            out.push(v.clone());
                        }
                    }
                }
            }
            Formula::Not(inner) => inner.collect_free(out, seen, bound),
            Formula::And(l, r) | Formula::Or(l, r) | Formula::Implies(l, r) => {
                l.collect_free(out, seen, bound);
                r.collect_free(out, seen, bound);
            }
            Formula::Forall { vars, body } | Formula::Exists { vars, body } => {
                let depth = bound.len();
                bound.extend(vars.iter().cloned());
                body.collect_free(out, seen, bound);
                bound.truncate(depth);
            }
        }
    }
}

impl std::fmt::Display for Formula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Formula::Atom(atom) => {
                let args: Vec<&str> = atom.terms.iter().map(|t| t.name()).collect();
                write!(f, "{}({})", atom.predicate, args.join(", "))
            }
            Formula::Not(inner) => write!(f, "~{}", paren(inner)),
            Formula::And(l, r) => write!(f, "{} & {}", paren(l), paren(r)),
            Formula::Or(l, r) => write!(f, "{} | {}", paren(l), paren(r)),
            Formula::Implies(l, r) => write!(f, "{} -> {}", paren(l), paren(r)),
            Formula::Forall { vars, body } => {
                write!(f, "forall {}: {}", vars.join(", "), body)
            }
            Formula::Exists { vars, body } => {
                write!(f, "exists {}: {}", vars.join(", "), body)
            }
        }
    }
}

/// Wrap non-atomic subformulas in parentheses when printed inline.
fn paren(formula: &Formula) -> String {
    match formula {
        Formula::Atom(_) | Formula::Not(_) => format!("{}", formula),
        _ => format!("({})", formula),
    }
}
