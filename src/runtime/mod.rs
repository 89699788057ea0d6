//! Runtime: predicate groundings, formula evaluation, and the knowledge base.

mod eval;
mod knowledge;
mod predicate;

pub use eval::Truth;
pub use knowledge::{InitOptions, KnowledgeBase, TrainOptions};
pub use predicate::{MlpConfig, Predicate};
