//! The knowledge base: registered predicates, bindings, and axioms.
//!
//! All registration state is owned here; there is no process-global
//! solver state. Training maximizes the aggregate satisfaction of the
//! registered axioms by gradient ascent on predicate parameters.

use candle_core::{Device, Tensor};
use candle_nn::optim::{AdamW, Optimizer, ParamsAdamW};
use indexmap::IndexMap;
use tracing::debug;

use crate::error::{LtnError, Result};
use crate::logic::Semantics;
use crate::rng::Lcg;
use crate::syntax::{parse_formula, Formula};

use super::eval::{eval, Truth};
use super::predicate::{MlpConfig, Predicate};

/// A registered axiom: surface text plus parsed formula.
pub struct Axiom {
    pub source: String,
    pub formula: Formula,
}

/// Options for [`KnowledgeBase::initialize`].
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Keep re-randomizing until the initial satisfaction exceeds this.
    pub sat_threshold: f32,
    /// Bound on re-randomization attempts.
    pub max_attempts: usize,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            sat_threshold: 0.1,
            max_attempts: 100,
        }
    }
}

/// Options for [`KnowledgeBase::train`].
#[derive(Debug, Clone)]
pub struct TrainOptions {
    /// Fixed iteration budget; no early stopping.
    pub max_iterations: usize,
    pub learning_rate: f64,
    pub weight_decay: f64,
    /// Emit a progress log line every this many iterations.
    pub log_every: usize,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            learning_rate: 0.01,
            weight_decay: 0.0,
            log_every: 500,
        }
    }
}

/// An explicitly-owned logic-tensor-network knowledge base.
pub struct KnowledgeBase {
    device: Device,
    semantics: Semantics,
    predicates: IndexMap<String, Predicate>,
    variables: IndexMap<String, Tensor>,
    constants: IndexMap<String, Tensor>,
    axioms: Vec<Axiom>,
    seed: Lcg,
}

impl KnowledgeBase {
    /// Create an empty knowledge base with default semantics.
    pub fn new(device: &Device) -> Self {
        Self::with_semantics(device, Semantics::default())
    }

    /// Create an empty knowledge base with explicit semantics.
    pub fn with_semantics(device: &Device, semantics: Semantics) -> Self {
        Self {
            device: device.clone(),
            semantics,
            predicates: IndexMap::new(),
            variables: IndexMap::new(),
            constants: IndexMap::new(),
            axioms: Vec::new(),
            seed: Lcg::new(0x51e5),
        }
    }

    /// Reseed parameter initialization (data seeds are separate).
    pub fn set_seed(&mut self, seed: u64) {
        self.seed = Lcg::new(seed);
    }

    /// Get the device.
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// The fuzzy semantics in effect.
    pub fn semantics(&self) -> Semantics {
        self.semantics
    }

    /// Register a predicate symbol over `input_dim` features.
    pub fn predicate(&mut self, name: &str, input_dim: usize) -> Result<()> {
        self.predicate_with_config(name, input_dim, &MlpConfig::default())
    }

    /// Register a predicate with an explicit grounding configuration.
    /// Re-registering a name replaces its grounding.
    pub fn predicate_with_config(
        &mut self,
        name: &str,
        input_dim: usize,
        config: &MlpConfig,
    ) -> Result<()> {
        let grounding = Predicate::new(name, input_dim, config, self.next_seed(), &self.device)?;
        self.predicates.insert(name.to_string(), grounding);
        Ok(())
    }

    /// Bind a variable symbol (`?name`) to a sample tensor `[n, d]`.
    pub fn variable(&mut self, name: &str, samples: Tensor) -> Result<()> {
        if !name.starts_with('?') {
            return Err(LtnError::Binding(format!(
                "variable names start with '?', got {}",
                name
            )));
        }
        if samples.rank() != 2 {
            return Err(LtnError::Binding(format!(
                "variable {} needs a rank-2 sample tensor, got rank {}",
                name,
                samples.rank()
            )));
        }
        self.variables.insert(name.to_string(), samples);
        Ok(())
    }

    /// Bind a constant symbol to a fixed point.
    pub fn constant(&mut self, name: &str, coords: &[f32]) -> Result<()> {
        if name.starts_with('?') {
            return Err(LtnError::Binding(format!(
                "constant names do not start with '?', got {}",
                name
            )));
        }
        let point = Tensor::from_vec(coords.to_vec(), (coords.len(),), &self.device)?;
        self.constants.insert(name.to_string(), point);
        Ok(())
    }

    /// Parse and register an axiom.
    pub fn axiom(&mut self, source: &str) -> Result<()> {
        let formula = parse_formula(source).map_err(|message| LtnError::Parse {
            source_text: source.to_string(),
            message,
        })?;
        self.check_symbols(&formula)?;
        let open = formula.free_vars();
        if !open.is_empty() {
            // Free variables are closed by the universal aggregator
            // when the satisfaction level is computed.
            debug!(axiom = source, vars = ?open, "registered open axiom");
        }
        self.axioms.push(Axiom {
            source: source.to_string(),
            formula,
        });
        Ok(())
    }

    /// Evaluate any formula against the current groundings.
    pub fn ask(&self, source: &str) -> Result<Truth> {
        let formula = parse_formula(source).map_err(|message| LtnError::Parse {
            source_text: source.to_string(),
            message,
        })?;
        eval(self, &formula)
    }

    /// Aggregate satisfaction level of all axioms, in [0,1].
    pub fn satisfiability(&self) -> Result<f32> {
        Ok(self.satisfiability_tensor()?.to_scalar::<f32>()?)
    }

    /// Satisfaction level as a rank-0 tensor carrying gradients.
    fn satisfiability_tensor(&self) -> Result<Tensor> {
        if self.axioms.is_empty() {
            return Err(LtnError::Runtime("no axioms registered".into()));
        }

        let mut levels = Vec::with_capacity(self.axioms.len());
        for axiom in &self.axioms {
            levels.push(self.close_universally(&axiom.formula)?);
        }

        let stacked = Tensor::stack(&levels, 0)?;
        Ok(self.semantics.axioms.reduce(&stacked, 0)?)
    }

    /// Truth of a formula with any remaining free variables closed by
    /// the universal aggregator.
    fn close_universally(&self, formula: &Formula) -> Result<Tensor> {
        let mut truth = eval(self, formula)?;
        while !truth.vars().is_empty() {
            let values = if truth.values().dims()[0] == 0 {
                let rest: Vec<usize> = truth.values().dims()[1..].to_vec();
                (Tensor::zeros(rest.as_slice(), candle_core::DType::F32, &self.device)? + 1.0)?
            } else {
                self.semantics.universal.reduce(truth.values(), 0)?
            };
            let vars = truth.vars()[1..].to_vec();
            truth = Truth::new(values, vars);
        }
        Ok(truth.values().clone())
    }

    /// Re-randomize groundings until the satisfaction level clears
    /// `opts.sat_threshold`, keeping the best attempt. The parameters
    /// already in place count as an attempt, so initialization never
    /// makes the knowledge base worse. Returns the satisfaction level
    /// of the parameters left in place.
    pub fn initialize(&mut self, opts: InitOptions) -> Result<f32> {
        let mut best_sat = self.satisfiability()?;
        if best_sat > opts.sat_threshold {
            return Ok(best_sat);
        }

        let mut best_params = self.snapshot_params()?;

        for attempt in 0..opts.max_attempts {
            for grounding in self.predicates.values_mut() {
                // Each grounding draws its own seed so predicates of the
                // same shape never start as the same function.
                grounding.reinitialize(self.seed.next_u64())?;
            }
            let sat = self.satisfiability()?;
            debug!(attempt, sat, "initialization attempt");

            if sat > best_sat {
                best_sat = sat;
                best_params = self.snapshot_params()?;
            }
            if sat > opts.sat_threshold {
                return Ok(sat);
            }
        }

        // Threshold never cleared: put the best-scoring parameters back
        // (possibly the ones that were in place on entry).
        self.restore_params(&best_params)?;
        Ok(best_sat)
    }

    /// Detached copies of all predicate parameters, in registry order.
    fn snapshot_params(&self) -> Result<Vec<Tensor>> {
        let mut saved = Vec::new();
        for grounding in self.predicates.values() {
            for var in grounding.params() {
                saved.push(var.as_tensor().copy()?);
            }
        }
        Ok(saved)
    }

    /// Write a parameter snapshot back into the groundings in place.
    fn restore_params(&mut self, saved: &[Tensor]) -> Result<()> {
        let mut tensors = saved.iter();
        for grounding in self.predicates.values() {
            for var in grounding.params() {
                let tensor = tensors
                    .next()
                    .ok_or_else(|| LtnError::Runtime("parameter snapshot out of sync".into()))?;
                var.set(tensor)?;
            }
        }
        Ok(())
    }

    /// Train predicate groundings to maximize axiom satisfaction for a
    /// fixed iteration budget. Returns the final satisfaction level.
    pub fn train(&mut self, opts: TrainOptions) -> Result<f32> {
        let params: Vec<_> = self
            .predicates
            .values()
            .flat_map(|p| p.params())
            .collect();
        if params.is_empty() {
            return Err(LtnError::Runtime("no predicates registered".into()));
        }

        let adamw = ParamsAdamW {
            lr: opts.learning_rate,
            weight_decay: opts.weight_decay,
            ..Default::default()
        };
        let mut optimizer = AdamW::new(params, adamw)?;

        let eps = 1e-7;

        for iteration in 0..opts.max_iterations {
            let sat = self.satisfiability_tensor()?;

            // Ascent on satisfaction as descent on -log(sat).
            let loss = sat.clamp(eps, 1.0 - eps)?.log()?.neg()?;
            optimizer.backward_step(&loss)?;

            if opts.log_every > 0 && iteration % opts.log_every == 0 {
                debug!(iteration, sat = sat.to_scalar::<f32>()?, "training");
            }
        }

        // Measured after the last update, so the returned level matches
        // the parameters now in place.
        self.satisfiability()
    }

    /// Check every symbol a formula mentions is registered.
    fn check_symbols(&self, formula: &Formula) -> Result<()> {
        match formula {
            Formula::Atom(atom) => {
                if !self.predicates.contains_key(&atom.predicate) {
                    return Err(LtnError::UnknownSymbol(atom.predicate.clone()));
                }
                for term in &atom.terms {
                    let known = match term {
                        crate::syntax::Term::Variable(v) => self.variables.contains_key(v),
                        crate::syntax::Term::Constant(c) => self.constants.contains_key(c),
                    };
                    if !known {
                        return Err(LtnError::UnknownSymbol(term.name().to_string()));
                    }
                }
                Ok(())
            }
            Formula::Not(inner) => self.check_symbols(inner),
            Formula::And(l, r) | Formula::Or(l, r) | Formula::Implies(l, r) => {
                self.check_symbols(l)?;
                self.check_symbols(r)
            }
            Formula::Forall { body, .. } | Formula::Exists { body, .. } => {
                self.check_symbols(body)
            }
        }
    }

    /// Per-grounding seeds drawn from the knowledge-base seed stream.
    fn next_seed(&mut self) -> u64 {
        self.seed.next_u64()
    }

    // Accessors for the evaluator and the REPL.

    /// Look up a predicate grounding.
    pub fn predicate_grounding(&self, name: &str) -> Option<&Predicate> {
        self.predicates.get(name)
    }

    /// Look up a variable's sample tensor.
    pub fn variable_data(&self, name: &str) -> Option<&Tensor> {
        self.variables.get(name)
    }

    /// Look up a constant's point.
    pub fn constant_data(&self, name: &str) -> Option<&Tensor> {
        self.constants.get(name)
    }

    /// Registered predicate names with input widths.
    pub fn predicate_names(&self) -> Vec<(&str, usize)> {
        self.predicates
            .iter()
            .map(|(name, p)| (name.as_str(), p.input_dim()))
            .collect()
    }

    /// Bound variable names with sample counts.
    pub fn variable_names(&self) -> Vec<(&str, usize)> {
        self.variables
            .iter()
            .map(|(name, t)| (name.as_str(), t.dims()[0]))
            .collect()
    }

    /// Bound constant names.
    pub fn constant_names(&self) -> Vec<&str> {
        self.constants.keys().map(|s| s.as_str()).collect()
    }

    /// Registered axiom source strings.
    pub fn axiom_sources(&self) -> Vec<&str> {
        self.axioms.iter().map(|a| a.source.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::Device;

    fn circle_kb(n: usize) -> KnowledgeBase {
        let mut kb = KnowledgeBase::new(&Device::Cpu);
        kb.predicate("A", 2).unwrap();
        kb.predicate("B", 2).unwrap();

        let data =
            crate::data::uniform_samples(n, [0.0, 0.0], [1.0, 1.0], 42, kb.device()).unwrap();
        let partition = crate::data::balanced_circle_partition(&data, [0.5, 0.5], 0.09).unwrap();

        kb.variable("?data_A", partition.inside).unwrap();
        kb.variable("?data_B", partition.outside).unwrap();
        kb.variable("?data", data).unwrap();

        kb.axiom("forall ?data_A: A(?data_A)").unwrap();
        kb.axiom("forall ?data_B: B(?data_B)").unwrap();
        kb.axiom("forall ?data: A(?data) -> ~B(?data)").unwrap();
        kb.axiom("forall ?data: ~B(?data) -> A(?data)").unwrap();
        kb
    }

    #[test]
    fn test_satisfiability_in_unit_interval() {
        let kb = circle_kb(60);
        let sat = kb.satisfiability().unwrap();
        assert!(sat.is_finite());
        assert!((0.0..=1.0).contains(&sat), "sat = {}", sat);
    }

    #[test]
    fn test_training_improves_satisfiability() {
        let mut kb = circle_kb(60);
        kb.initialize(InitOptions {
            sat_threshold: 0.0,
            max_attempts: 1,
        })
        .unwrap();

        let before = kb.satisfiability().unwrap();
        let after = kb
            .train(TrainOptions {
                max_iterations: 150,
                learning_rate: 0.05,
                ..Default::default()
            })
            .unwrap();

        assert!(after.is_finite());
        assert!((0.0..=1.0).contains(&after));
        assert!(after >= before - 0.05, "before {} after {}", before, after);
    }

    #[test]
    fn test_initialize_keeps_trained_parameters_when_unbeaten() {
        let mut kb = circle_kb(60);
        kb.train(TrainOptions {
            max_iterations: 200,
            learning_rate: 0.05,
            ..Default::default()
        })
        .unwrap();
        let trained = kb.satisfiability().unwrap();

        // Unreachable threshold: every attempt runs, none can clear it.
        let reported = kb
            .initialize(InitOptions {
                sat_threshold: 1.0,
                max_attempts: 5,
            })
            .unwrap();
        let actual = kb.satisfiability().unwrap();

        assert!(
            (reported - actual).abs() < 1e-6,
            "reported {} but knowledge base is at {}",
            reported,
            actual
        );
        assert!(actual >= trained - 1e-6, "trained {} actual {}", trained, actual);
    }

    #[test]
    fn test_initialize_gives_predicates_distinct_groundings() {
        let mut kb = circle_kb(40);
        kb.constant("p", &[0.3, 0.7]).unwrap();
        kb.initialize(InitOptions {
            sat_threshold: 1.0,
            max_attempts: 3,
        })
        .unwrap();

        // A and B share layer shapes but must not share weights.
        let a = kb.ask("A(p)").unwrap().to_scalar().unwrap();
        let b = kb.ask("B(p)").unwrap().to_scalar().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_train_reports_post_update_satisfiability() {
        let mut kb = circle_kb(40);

        let before = kb.satisfiability().unwrap();
        let idle = kb
            .train(TrainOptions {
                max_iterations: 0,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(idle, before);

        let returned = kb
            .train(TrainOptions {
                max_iterations: 50,
                learning_rate: 0.05,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(returned, kb.satisfiability().unwrap());
    }

    #[test]
    fn test_open_query_yields_per_sample_truth() {
        let kb = circle_kb(40);
        let truth = kb.ask("A(?data)").unwrap();

        let values = truth.to_vec().unwrap();
        assert_eq!(values.len(), 40);
        assert!(values.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_queries_do_not_move_satisfiability() {
        let kb = circle_kb(40);
        let before = kb.satisfiability().unwrap();
        kb.ask("forall ?data: A(?data) | B(?data)").unwrap();
        let after = kb.satisfiability().unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_axiom_with_unknown_symbol_rejected() {
        let mut kb = KnowledgeBase::new(&Device::Cpu);
        kb.predicate("A", 2).unwrap();

        let err = kb.axiom("forall ?ghost: A(?ghost)").unwrap_err();
        assert!(matches!(err, LtnError::UnknownSymbol(_)));
    }

    #[test]
    fn test_bad_variable_name_rejected() {
        let mut kb = KnowledgeBase::new(&Device::Cpu);
        let t = Tensor::from_vec(vec![0.0f32, 0.0], (1, 2), &Device::Cpu).unwrap();
        assert!(matches!(
            kb.variable("data", t),
            Err(LtnError::Binding(_))
        ));
    }

    #[test]
    fn test_ask_constant_after_binding() {
        let mut kb = circle_kb(40);
        kb.constant("a", &[0.5, 0.5]).unwrap();

        let truth = kb.ask("A(a)").unwrap();
        let v = truth.to_scalar().unwrap();
        assert!((0.0..=1.0).contains(&v));
    }
}
