//! Fuzzy-logic semantics: t-norms, quantifier aggregators, and the
//! `Semantics` bundle used by the knowledge base.
//!
//! All operations are differentiable candle expressions and map truth
//! values in [0,1] to truth values in [0,1].

mod aggregate;
mod connectives;

pub use aggregate::Aggregator;
pub use connectives::Tnorm;

/// Bundle of fuzzy operators used when grounding formulas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Semantics {
    /// Connective family for `&`, `|`, `->`
    pub tnorm: Tnorm,
    /// Aggregator for `forall`
    pub universal: Aggregator,
    /// Aggregator for `exists`
    pub existential: Aggregator,
    /// Aggregator across registered axioms
    pub axioms: Aggregator,
}

impl Default for Semantics {
    fn default() -> Self {
        Self {
            tnorm: Tnorm::Lukasiewicz,
            universal: Aggregator::HarmonicMean,
            existential: Aggregator::Max,
            axioms: Aggregator::Mean,
        }
    }
}
