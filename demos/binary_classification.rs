//! Binary classification of 2-D points by geometric membership.
//!
//! Samples uniform points in the unit square, splits them into balanced
//! classes by distance to the center, states membership and mutual
//! exclusion axioms over predicates A and B, trains the knowledge base
//! to satisfy them, and renders truth scatters for train and test sets.

use candle_core::Device;
use ltn::viz::{scatter_grid, Panel};
use ltn::{
    balanced_circle_partition, uniform_samples, InitOptions, KnowledgeBase, Result, TrainOptions,
};
use std::path::Path;

const NR_SAMPLES: usize = 1000;
const MAX_ITERATIONS: usize = 20000;
const CENTER: [f32; 2] = [0.5, 0.5];
const RADIUS_SQ: f32 = 0.09;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let device = Device::Cpu;
    let mut kb = KnowledgeBase::new(&device);

    let data = uniform_samples(NR_SAMPLES, [0.0, 0.0], [1.0, 1.0], 42, &device)?;
    let partition = balanced_circle_partition(&data, CENTER, RADIUS_SQ)?;

    println!("# samples data_A: {}", partition.inside.dims()[0]);
    println!("# samples data_B: {}", partition.outside.dims()[0]);
    println!("# samples data: {}", data.dims()[0]);

    kb.predicate("A", 2)?;
    kb.predicate("B", 2)?;

    kb.variable("?data_A", partition.inside)?;
    kb.variable("?data_B", partition.outside)?;
    kb.variable("?data", data.clone())?;

    kb.axiom("forall ?data_A: A(?data_A)")?;
    kb.axiom("forall ?data_B: B(?data_B)")?;

    kb.axiom("forall ?data: A(?data) -> ~B(?data)")?;
    kb.axiom("forall ?data: ~B(?data) -> A(?data)")?;

    kb.initialize(InitOptions {
        sat_threshold: 0.1,
        ..Default::default()
    })?;
    let sat_level = kb.train(TrainOptions {
        max_iterations: MAX_ITERATIONS,
        ..Default::default()
    })?;
    println!("satisfaction level: {:.4}", sat_level);

    // Fresh samples the axioms never saw.
    let data_test = uniform_samples(NR_SAMPLES, [0.0, 0.0], [1.0, 1.0], 1337, &device)?;
    kb.variable("?data_test", data_test.clone())?;

    let a_train = kb.ask("A(?data)")?;
    let b_train = kb.ask("B(?data)")?;
    let a_test = kb.ask("A(?data_test)")?;
    let b_test = kb.ask("B(?data_test)")?;

    scatter_grid(
        Path::new("classification.png"),
        2,
        2,
        &[
            Panel {
                title: "A(x) - training",
                points: &data,
                truth: &a_train,
            },
            Panel {
                title: "B(x) - training",
                points: &data,
                truth: &b_train,
            },
            Panel {
                title: "A(x) - test",
                points: &data_test,
                truth: &a_test,
            },
            Panel {
                title: "B(x) - test",
                points: &data_test,
                truth: &b_test,
            },
        ],
    )?;
    println!("wrote classification.png");

    kb.constant("a", &[0.5, 0.5])?;
    kb.constant("b", &[0.75, 0.75])?;
    println!("a is in A: {:.4}", kb.ask("A(a)")?.to_scalar()?);
    println!("b is in A: {:.4}", kb.ask("A(b)")?.to_scalar()?);
    println!("a is in B: {:.4}", kb.ask("B(a)")?.to_scalar()?);
    println!("b is in B: {:.4}", kb.ask("B(b)")?.to_scalar()?);

    Ok(())
}
