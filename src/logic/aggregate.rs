//! Quantifier aggregators.
//!
//! An aggregator collapses one dimension of a truth tensor into a single
//! truth value per remaining coordinate.

use candle_core::{Result, Tensor};

const EPS: f64 = 1e-7;

/// Aggregation strategy for quantified dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Aggregator {
    /// Hard minimum (strict universal reading)
    Min,
    /// Hard maximum (strict existential reading)
    Max,
    /// Arithmetic mean
    Mean,
    /// Harmonic mean, the default universal aggregator
    HarmonicMean,
    /// 1 - ||1-t||_p style smooth universal aggregator
    PMeanError(f64),
}

impl Aggregator {
    /// Aggregate dimension `dim` away.
    pub fn reduce(&self, t: &Tensor, dim: usize) -> Result<Tensor> {
        match self {
            Aggregator::Min => t.min(dim),
            Aggregator::Max => t.max(dim),
            Aggregator::Mean => t.mean(dim),
            // hmean(t) = 1 / mean(1 / t)
            Aggregator::HarmonicMean => (t + EPS)?.recip()?.mean(dim)?.recip(),
            // 1 - mean((1-t)^p)^(1/p)
            Aggregator::PMeanError(p) => {
                let err = (t.neg()? + 1.0)?.powf(*p)?.mean(dim)?;
                ((err + EPS)?.powf(1.0 / p)?.neg()? + 1.0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::Device;

    fn truth(values: &[f32]) -> Tensor {
        Tensor::new(values, &Device::Cpu).unwrap()
    }

    fn scalar(t: Tensor) -> f32 {
        t.to_scalar::<f32>().unwrap()
    }

    #[test]
    fn test_min_max_mean() {
        let t = truth(&[0.2, 0.4, 0.9]);

        assert_eq!(scalar(Aggregator::Min.reduce(&t, 0).unwrap()), 0.2);
        assert_eq!(scalar(Aggregator::Max.reduce(&t, 0).unwrap()), 0.9);
        assert!((scalar(Aggregator::Mean.reduce(&t, 0).unwrap()) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_harmonic_mean_tracks_low_truths() {
        let t = truth(&[0.1, 0.9]);
        let hmean = scalar(Aggregator::HarmonicMean.reduce(&t, 0).unwrap());

        // 2 / (1/0.1 + 1/0.9) = 0.18
        assert!((hmean - 0.18).abs() < 1e-3, "hmean = {}", hmean);
        // Dominated by the low truth value, unlike the arithmetic mean.
        assert!(hmean < 0.5);
    }

    #[test]
    fn test_pmean_error_on_uniform_input() {
        let t = truth(&[0.8, 0.8, 0.8]);
        let agg = scalar(Aggregator::PMeanError(2.0).reduce(&t, 0).unwrap());
        assert!((agg - 0.8).abs() < 1e-3, "pme = {}", agg);
    }

    #[test]
    fn test_reduce_inner_dimension() {
        let t = truth(&[0.1, 0.2, 0.3, 0.4])
            .reshape((2, 2))
            .unwrap();
        let reduced = Aggregator::Mean.reduce(&t, 1).unwrap();
        assert_eq!(reduced.dims(), &[2]);
    }
}
