//! Predicate groundings.
//!
//! A predicate symbol is grounded as a small MLP over sample features:
//! tanh hidden layers, sigmoid output, so truth values land in [0,1].
//! Parameters are `Var`s for gradient tracking.

use candle_core::{Device, Tensor, Var};
use candle_nn::ops::sigmoid;

use crate::error::Result;
use crate::rng::Lcg;

/// Hidden-layer configuration for a predicate grounding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MlpConfig {
    /// Hidden layer widths, input to output
    pub hidden: Vec<usize>,
}

impl Default for MlpConfig {
    fn default() -> Self {
        Self { hidden: vec![16, 16] }
    }
}

/// One affine layer: `x @ w + b`.
struct Layer {
    weight: Var,
    bias: Var,
}

/// A grounded predicate symbol.
pub struct Predicate {
    name: String,
    input_dim: usize,
    layers: Vec<Layer>,
    device: Device,
}

impl Predicate {
    /// Create a grounding for `name` over `input_dim` features.
    pub fn new(
        name: &str,
        input_dim: usize,
        config: &MlpConfig,
        seed: u64,
        device: &Device,
    ) -> Result<Self> {
        let mut dims = vec![input_dim];
        dims.extend_from_slice(&config.hidden);
        dims.push(1);

        let mut rng = Lcg::new(seed);
        let mut layers = Vec::with_capacity(dims.len() - 1);
        for pair in dims.windows(2) {
            let (fan_in, fan_out) = (pair[0], pair[1]);
            layers.push(Layer {
                weight: Var::from_tensor(&xavier(fan_in, fan_out, &mut rng, device)?)?,
                bias: Var::from_tensor(&Tensor::zeros(fan_out, candle_core::DType::F32, device)?)?,
            });
        }

        Ok(Self {
            name: name.to_string(),
            input_dim,
            layers,
            device: device.clone(),
        })
    }

    /// The predicate name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared feature width.
    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    /// Truth values for a batch of samples `[n, input_dim]`, returned as `[n]`.
    pub fn forward(&self, samples: &Tensor) -> Result<Tensor> {
        let mut h = samples.clone();
        let last = self.layers.len() - 1;

        for (i, layer) in self.layers.iter().enumerate() {
            h = h
                .matmul(layer.weight.as_tensor())?
                .broadcast_add(layer.bias.as_tensor())?;
            if i < last {
                h = h.tanh()?;
            }
        }

        Ok(sigmoid(&h)?.squeeze(1)?)
    }

    /// Re-randomize all parameters in place.
    pub fn reinitialize(&mut self, seed: u64) -> Result<()> {
        let mut rng = Lcg::new(seed);
        for layer in &self.layers {
            let (fan_in, fan_out) = {
                let dims = layer.weight.as_tensor().dims();
                (dims[0], dims[1])
            };
            layer
                .weight
                .set(&xavier(fan_in, fan_out, &mut rng, &self.device)?)?;
            layer.bias.set(&Tensor::zeros(
                fan_out,
                candle_core::DType::F32,
                &self.device,
            )?)?;
        }
        Ok(())
    }

    /// All learnable parameters, for the optimizer.
    pub fn params(&self) -> Vec<Var> {
        self.layers
            .iter()
            .flat_map(|l| [l.weight.clone(), l.bias.clone()])
            .collect()
    }
}

/// Xavier-uniform initialization driven by the crate LCG.
fn xavier(fan_in: usize, fan_out: usize, rng: &mut Lcg, device: &Device) -> Result<Tensor> {
    let limit = (6.0 / (fan_in + fan_out) as f64).sqrt() as f32;
    let data: Vec<f32> = (0..fan_in * fan_out)
        .map(|_| rng.next_range(-limit, limit))
        .collect();
    Ok(Tensor::from_vec(data, (fan_in, fan_out), device)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_shape_and_range() {
        let pred = Predicate::new("A", 2, &MlpConfig::default(), 42, &Device::Cpu).unwrap();
        let samples = Tensor::from_vec(
            vec![0.1f32, 0.2, 0.8, 0.9, 0.5, 0.5],
            (3, 2),
            &Device::Cpu,
        )
        .unwrap();

        let truth = pred.forward(&samples).unwrap();
        assert_eq!(truth.dims(), &[3]);
        for v in truth.to_vec1::<f32>().unwrap() {
            assert!((0.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn test_same_seed_same_grounding() {
        let a = Predicate::new("A", 2, &MlpConfig::default(), 7, &Device::Cpu).unwrap();
        let b = Predicate::new("A", 2, &MlpConfig::default(), 7, &Device::Cpu).unwrap();
        let samples = Tensor::from_vec(vec![0.3f32, 0.4], (1, 2), &Device::Cpu).unwrap();

        let ta = a.forward(&samples).unwrap().to_vec1::<f32>().unwrap();
        let tb = b.forward(&samples).unwrap().to_vec1::<f32>().unwrap();
        assert_eq!(ta, tb);
    }

    #[test]
    fn test_reinitialize_changes_output() {
        let mut pred = Predicate::new("A", 2, &MlpConfig::default(), 7, &Device::Cpu).unwrap();
        let samples = Tensor::from_vec(vec![0.3f32, 0.4], (1, 2), &Device::Cpu).unwrap();

        let before = pred.forward(&samples).unwrap().to_vec1::<f32>().unwrap();
        pred.reinitialize(8).unwrap();
        let after = pred.forward(&samples).unwrap().to_vec1::<f32>().unwrap();
        assert_ne!(before, after);
    }

    #[test]
    fn test_forward_on_empty_batch() {
        let pred = Predicate::new("A", 2, &MlpConfig::default(), 42, &Device::Cpu).unwrap();
        let samples = Tensor::from_vec(Vec::<f32>::new(), (0, 2), &Device::Cpu).unwrap();

        let truth = pred.forward(&samples).unwrap();
        assert_eq!(truth.dims(), &[0]);
    }
}
