//! Synthetic sample generation and the balanced geometric partitioner.

use candle_core::{Device, Tensor};

use crate::error::Result;
use crate::rng::Lcg;

/// Two equal-length subsets of a sample set, original order preserved.
#[derive(Debug, Clone)]
pub struct Partition {
    /// Points strictly inside the circle
    pub inside: Tensor,
    /// Points on or outside the circle
    pub outside: Tensor,
}

/// Sample `n` uniform 2-D points in the box `[low, high]`, `[n, 2]`.
/// Deterministic for a fixed seed.
pub fn uniform_samples(
    n: usize,
    low: [f32; 2],
    high: [f32; 2],
    seed: u64,
    device: &Device,
) -> Result<Tensor> {
    let mut rng = Lcg::new(seed);
    let mut data = Vec::with_capacity(n * 2);
    for _ in 0..n {
        data.push(rng.next_range(low[0], high[0]));
        data.push(rng.next_range(low[1], high[1]));
    }
    Ok(Tensor::from_vec(data, (n, 2), device)?)
}

/// Partition points by squared distance to `center`: strictly inside
/// `radius_sq` versus on-or-outside, then truncate both sides to the
/// smaller cardinality. Ordering within each side follows the input.
///
/// The boundary is half-open: a point at exactly `radius_sq` lands
/// outside.
pub fn balanced_circle_partition(
    points: &Tensor,
    center: [f32; 2],
    radius_sq: f32,
) -> Result<Partition> {
    let rows = points.to_vec2::<f32>()?;

    let mut inside: Vec<[f32; 2]> = Vec::new();
    let mut outside: Vec<[f32; 2]> = Vec::new();
    for row in &rows {
        let dx = row[0] - center[0];
        let dy = row[1] - center[1];
        if dx * dx + dy * dy < radius_sq {
            inside.push([row[0], row[1]]);
        } else {
            outside.push([row[0], row[1]]);
        }
    }

    let keep = inside.len().min(outside.len());
    inside.truncate(keep);
    outside.truncate(keep);

    Ok(Partition {
        inside: to_tensor(&inside, points.device())?,
        outside: to_tensor(&outside, points.device())?,
    })
}

fn to_tensor(rows: &[[f32; 2]], device: &Device) -> Result<Tensor> {
    let flat: Vec<f32> = rows.iter().flat_map(|r| [r[0], r[1]]).collect();
    Ok(Tensor::from_vec(flat, (rows.len(), 2), device)?)
}
