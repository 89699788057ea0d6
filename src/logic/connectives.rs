//! Differentiable fuzzy connectives.
//!
//! Operands may have different (broadcast-compatible) shapes; callers
//! align truth tensors to a common rank before applying a connective.

use candle_core::{Result, Tensor};

/// T-norm family selecting the connective definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tnorm {
    /// Łukasiewicz: a∧b = max(0, a+b-1), a∨b = min(1, a+b)
    Lukasiewicz,
    /// Product: a∧b = ab, with the Reichenbach implication 1-a+ab
    Product,
    /// Gödel: a∧b = min(a,b), a∨b = max(a,b)
    Godel,
}

impl Tnorm {
    /// Negation is shared across families: ¬a = 1-a.
    pub fn not(&self, a: &Tensor) -> Result<Tensor> {
        (a.neg()? + 1.0)
    }

    /// Conjunction.
    pub fn and(&self, a: &Tensor, b: &Tensor) -> Result<Tensor> {
        match self {
            Tnorm::Lukasiewicz => (a.broadcast_add(b)? - 1.0)?.relu(),
            Tnorm::Product => a.broadcast_mul(b),
            Tnorm::Godel => a.broadcast_minimum(b),
        }
    }

    /// Disjunction.
    pub fn or(&self, a: &Tensor, b: &Tensor) -> Result<Tensor> {
        match self {
            Tnorm::Lukasiewicz => cap_at_one(&a.broadcast_add(b)?),
            // a∨b = 1 - (1-a)(1-b)
            Tnorm::Product => {
                let product = self.not(a)?.broadcast_mul(&self.not(b)?)?;
                self.not(&product)
            }
            Tnorm::Godel => a.broadcast_maximum(b),
        }
    }

    /// Implication.
    pub fn implies(&self, a: &Tensor, b: &Tensor) -> Result<Tensor> {
        match self {
            // min(1, 1-a+b)
            Tnorm::Lukasiewicz => cap_at_one(&self.not(a)?.broadcast_add(b)?),
            // Reichenbach: 1 - a + ab
            Tnorm::Product => self.not(a)?.broadcast_add(&a.broadcast_mul(b)?),
            // Kleene-Dienes: max(1-a, b)
            Tnorm::Godel => self.not(a)?.broadcast_maximum(b),
        }
    }
}

/// min(1, x) = 1 - relu(1 - x), expressed with ops that carry gradients.
fn cap_at_one(x: &Tensor) -> Result<Tensor> {
    ((x.neg()? + 1.0)?.relu()?.neg()? + 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::Device;

    fn truth(values: &[f32]) -> Tensor {
        Tensor::new(values, &Device::Cpu).unwrap()
    }

    fn values(t: &Tensor) -> Vec<f32> {
        t.to_vec1::<f32>().unwrap()
    }

    #[test]
    fn test_lukasiewicz_boolean_corners() {
        let tnorm = Tnorm::Lukasiewicz;
        let a = truth(&[0.0, 0.0, 1.0, 1.0]);
        let b = truth(&[0.0, 1.0, 0.0, 1.0]);

        assert_eq!(values(&tnorm.and(&a, &b).unwrap()), vec![0.0, 0.0, 0.0, 1.0]);
        assert_eq!(values(&tnorm.or(&a, &b).unwrap()), vec![0.0, 1.0, 1.0, 1.0]);
        assert_eq!(
            values(&tnorm.implies(&a, &b).unwrap()),
            vec![1.0, 1.0, 0.0, 1.0]
        );
        assert_eq!(values(&tnorm.not(&a).unwrap()), vec![1.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_product_stays_in_unit_interval() {
        let tnorm = Tnorm::Product;
        let a = truth(&[0.2, 0.5, 0.9]);
        let b = truth(&[0.7, 0.5, 0.1]);

        for op in [
            tnorm.and(&a, &b).unwrap(),
            tnorm.or(&a, &b).unwrap(),
            tnorm.implies(&a, &b).unwrap(),
        ] {
            for v in values(&op) {
                assert!((0.0..=1.0).contains(&v), "out of range: {}", v);
            }
        }
    }

    #[test]
    fn test_godel_is_min_max() {
        let tnorm = Tnorm::Godel;
        let a = truth(&[0.3, 0.8]);
        let b = truth(&[0.6, 0.2]);

        assert_eq!(values(&tnorm.and(&a, &b).unwrap()), vec![0.3, 0.2]);
        assert_eq!(values(&tnorm.or(&a, &b).unwrap()), vec![0.6, 0.8]);
    }

    #[test]
    fn test_broadcast_alignment() {
        let tnorm = Tnorm::Lukasiewicz;
        let a = truth(&[0.5, 1.0]).reshape((2, 1)).unwrap();
        let b = truth(&[0.5, 0.75, 1.0]).reshape((1, 3)).unwrap();

        let and = tnorm.and(&a, &b).unwrap();
        assert_eq!(and.dims(), &[2, 3]);
    }
}
