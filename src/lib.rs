//! ltn: Logic Tensor Networks over candle.
//!
//! A first-order formula like `forall ?x: A(?x) -> ~B(?x)` becomes a
//! differentiable expression over the truth values of learned predicate
//! groundings, so maximizing its satisfaction by gradient ascent trains
//! the predicates.
//!
//! # Key Insight
//!
//! All registration state (predicates, variable bindings, constants,
//! axioms) lives in an explicitly-owned [`KnowledgeBase`] rather than in
//! process-wide globals; every operation is a method on it.

pub mod data;
pub mod error;
pub mod logic;
pub mod rng;
pub mod runtime;
pub mod syntax;
pub mod viz;

pub use data::{balanced_circle_partition, uniform_samples, Partition};
pub use error::{LtnError, Result};
pub use logic::{Aggregator, Semantics, Tnorm};
pub use runtime::{InitOptions, KnowledgeBase, MlpConfig, TrainOptions, Truth};
pub use syntax::{parse_formula, Atom, Formula, Term, Token};
