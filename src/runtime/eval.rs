//! Grounding evaluation: formulas to truth tensors.
//!
//! A [`Truth`] carries one tensor dimension per free variable, in order.
//! Atoms over several distinct variables ground over the cross product of
//! their sample sets; connectives broadcast-align operands over the union
//! of free variables; quantifiers aggregate bound dimensions away.

use candle_core::{DType, Tensor};

use crate::error::{LtnError, Result};
use crate::logic::Semantics;
use crate::syntax::{Formula, Term};

use super::knowledge::KnowledgeBase;

/// Truth values of a formula, one dimension per free variable.
#[derive(Debug, Clone)]
pub struct Truth {
    values: Tensor,
    vars: Vec<String>,
}

impl Truth {
    pub(crate) fn new(values: Tensor, vars: Vec<String>) -> Self {
        debug_assert_eq!(values.rank(), vars.len());
        Self { values, vars }
    }

    /// The truth tensor (rank 0 for closed formulas).
    pub fn values(&self) -> &Tensor {
        &self.values
    }

    /// Free variables, parallel to the tensor dimensions.
    pub fn vars(&self) -> &[String] {
        &self.vars
    }

    /// Scalar truth value of a closed formula.
    pub fn to_scalar(&self) -> Result<f32> {
        if !self.vars.is_empty() {
            return Err(LtnError::Runtime(format!(
                "formula is open over {}",
                self.vars.join(", ")
            )));
        }
        Ok(self.values.to_scalar::<f32>()?)
    }

    /// Truth values flattened to a vector, row-major over the free variables.
    pub fn to_vec(&self) -> Result<Vec<f32>> {
        if self.vars.is_empty() {
            return Ok(vec![self.values.to_scalar::<f32>()?]);
        }
        Ok(self.values.flatten_all()?.to_vec1::<f32>()?)
    }
}

/// Evaluate a formula against the knowledge base.
pub(crate) fn eval(kb: &KnowledgeBase, formula: &Formula) -> Result<Truth> {
    let semantics = kb.semantics();
    match formula {
        Formula::Atom(atom) => eval_atom(kb, atom),

        Formula::Not(inner) => {
            let t = eval(kb, inner)?;
            Ok(Truth::new(semantics.tnorm.not(&t.values)?, t.vars))
        }

        Formula::And(l, r) => eval_binary(kb, l, r, |a, b| semantics.tnorm.and(a, b)),
        Formula::Or(l, r) => eval_binary(kb, l, r, |a, b| semantics.tnorm.or(a, b)),
        Formula::Implies(l, r) => eval_binary(kb, l, r, |a, b| semantics.tnorm.implies(a, b)),

        Formula::Forall { vars, body } => {
            let t = eval(kb, body)?;
            quantify(&semantics, t, vars, true)
        }
        Formula::Exists { vars, body } => {
            let t = eval(kb, body)?;
            quantify(&semantics, t, vars, false)
        }
    }
}

/// Ground an atom over the cross product of its variables' sample sets.
fn eval_atom(kb: &KnowledgeBase, atom: &crate::syntax::Atom) -> Result<Truth> {
    let predicate = kb
        .predicate_grounding(&atom.predicate)
        .ok_or_else(|| LtnError::UnknownSymbol(atom.predicate.clone()))?;

    // Distinct free variables in first-occurrence order, with sample counts.
    let mut vars: Vec<String> = Vec::new();
    let mut sizes: Vec<usize> = Vec::new();
    for term in &atom.terms {
        if let Term::Variable(v) = term {
            if !vars.contains(v) {
                let data = kb
                    .variable_data(v)
                    .ok_or_else(|| LtnError::UnknownSymbol(v.clone()))?;
                vars.push(v.clone());
                sizes.push(data.dims()[0]);
            }
        }
    }
    let total: usize = sizes.iter().product();

    // Build the feature block for each term: [total, d_term].
    let mut blocks: Vec<Tensor> = Vec::with_capacity(atom.terms.len());
    for term in &atom.terms {
        match term {
            Term::Variable(v) => {
                let data = kb.variable_data(v).expect("checked above");
                let pos = vars.iter().position(|x| x == v).expect("checked above");
                let stride: usize = sizes[pos + 1..].iter().product();
                let indices: Vec<u32> = (0..total)
                    .map(|flat| ((flat / stride) % sizes[pos]) as u32)
                    .collect();
                let idx = Tensor::from_vec(indices, (total,), kb.device())?;
                blocks.push(data.index_select(&idx, 0)?);
            }
            Term::Constant(c) => {
                let point = kb
                    .constant_data(c)
                    .ok_or_else(|| LtnError::UnknownSymbol(c.clone()))?;
                blocks.push(point.unsqueeze(0)?.repeat((total, 1))?);
            }
        }
    }

    let features = if blocks.len() == 1 {
        blocks.pop().expect("non-empty")
    } else {
        Tensor::cat(&blocks, 1)?
    };

    let width = features.dims()[1];
    if width != predicate.input_dim() {
        return Err(LtnError::InputWidthMismatch {
            predicate: atom.predicate.clone(),
            expected: predicate.input_dim(),
            got: width,
        });
    }

    let flat = predicate.forward(&features)?;
    let values = if sizes.is_empty() {
        // All terms are constants: a single truth value, rank 0.
        flat.squeeze(0)?
    } else {
        flat.reshape(sizes.as_slice())?
    };

    Ok(Truth::new(values, vars))
}

fn eval_binary(
    kb: &KnowledgeBase,
    l: &Formula,
    r: &Formula,
    op: impl Fn(&Tensor, &Tensor) -> candle_core::Result<Tensor>,
) -> Result<Truth> {
    let a = eval(kb, l)?;
    let b = eval(kb, r)?;
    let (at, bt, vars) = align(a, b)?;
    Ok(Truth::new(op(&at, &bt)?, vars))
}

/// Reshape two truth tensors to a common rank over the union of their
/// free variables (left operand's variables first).
fn align(a: Truth, b: Truth) -> Result<(Tensor, Tensor, Vec<String>)> {
    if a.vars == b.vars {
        let vars = a.vars.clone();
        return Ok((a.values, b.values, vars));
    }

    let mut union = a.vars.clone();
    for v in &b.vars {
        if !union.contains(v) {
            union.push(v.clone());
        }
    }

    let at = expand_to(&a, &union)?;
    let bt = expand_to(&b, &union)?;
    Ok((at, bt, union))
}

/// Permute and reshape `t` so its dimensions line up with `union`,
/// inserting singleton dimensions for variables it does not mention.
fn expand_to(t: &Truth, union: &[String]) -> Result<Tensor> {
    // Permute own dims into union-relative order.
    let mut order: Vec<(usize, usize)> = t
        .vars
        .iter()
        .enumerate()
        .map(|(dim, v)| {
            let rank = union.iter().position(|u| u == v).expect("union covers vars");
            (rank, dim)
        })
        .collect();
    order.sort_by_key(|&(rank, _)| rank);
    let perm: Vec<usize> = order.iter().map(|&(_, dim)| dim).collect();

    let permuted = if perm.iter().enumerate().all(|(i, &d)| i == d) {
        t.values.clone()
    } else {
        t.values.permute(perm)?.contiguous()?
    };

    // Insert singleton dims for absent variables.
    let dims = permuted.dims();
    let mut next = 0;
    let shape: Vec<usize> = union
        .iter()
        .map(|v| {
            if t.vars.contains(v) {
                let d = dims[next];
                next += 1;
                d
            } else {
                1
            }
        })
        .collect();

    Ok(permuted.reshape(shape.as_slice())?)
}

/// Aggregate quantified variables out of a truth tensor.
fn quantify(
    semantics: &Semantics,
    body: Truth,
    quantified: &[String],
    universal: bool,
) -> Result<Truth> {
    let aggregator = if universal {
        semantics.universal
    } else {
        semantics.existential
    };

    let mut values = body.values;
    let mut vars = body.vars;

    for q in quantified {
        // Quantifying a variable the body never mentions is a no-op.
        let Some(dim) = vars.iter().position(|v| v == q) else {
            continue;
        };

        // Quantification over an empty sample set is vacuous: a universal
        // claim holds (1.0), an existential one fails (0.0).
        values = if values.dims()[dim] == 0 {
            let mut shape: Vec<usize> = values.dims().to_vec();
            shape.remove(dim);
            let fill = if universal { 1.0f64 } else { 0.0 };
            (Tensor::zeros(shape.as_slice(), DType::F32, values.device())? + fill)?
        } else {
            aggregator.reduce(&values, dim)?
        };
        vars.remove(dim);
    }

    Ok(Truth::new(values, vars))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::knowledge::KnowledgeBase;
    use crate::syntax::parse_formula;
    use candle_core::Device;

    fn kb_with_samples(n: usize) -> KnowledgeBase {
        let mut kb = KnowledgeBase::new(&Device::Cpu);
        kb.predicate("A", 2).unwrap();
        kb.predicate("B", 2).unwrap();

        let data = crate::data::uniform_samples(n, [0.0, 0.0], [1.0, 1.0], 11, kb.device()).unwrap();
        kb.variable("?data", data).unwrap();
        kb.constant("a", &[0.5, 0.5]).unwrap();
        kb
    }

    fn ask(kb: &KnowledgeBase, src: &str) -> Truth {
        let formula = parse_formula(src).unwrap();
        eval(kb, &formula).unwrap()
    }

    #[test]
    fn test_atom_over_variable() {
        let kb = kb_with_samples(10);
        let t = ask(&kb, "A(?data)");

        assert_eq!(t.vars(), &["?data".to_string()]);
        assert_eq!(t.values().dims(), &[10]);
    }

    #[test]
    fn test_atom_over_constant_is_closed() {
        let kb = kb_with_samples(10);
        let t = ask(&kb, "A(a)");

        assert!(t.vars().is_empty());
        let v = t.to_scalar().unwrap();
        assert!((0.0..=1.0).contains(&v));
    }

    #[test]
    fn test_closed_formula_scalar() {
        let kb = kb_with_samples(10);
        let t = ask(&kb, "forall ?data: A(?data) -> ~B(?data)");

        assert!(t.vars().is_empty());
        let v = t.to_scalar().unwrap();
        assert!((0.0..=1.0).contains(&v));
    }

    #[test]
    fn test_connective_broadcasts_distinct_variables() {
        let mut kb = kb_with_samples(4);
        let other =
            crate::data::uniform_samples(3, [0.0, 0.0], [1.0, 1.0], 5, kb.device()).unwrap();
        kb.variable("?other", other).unwrap();

        let t = ask(&kb, "A(?data) & B(?other)");
        assert_eq!(t.vars(), &["?data".to_string(), "?other".to_string()]);
        assert_eq!(t.values().dims(), &[4, 3]);
    }

    #[test]
    fn test_forall_over_empty_set_is_vacuous() {
        let mut kb = kb_with_samples(4);
        let empty = Tensor::from_vec(Vec::<f32>::new(), (0, 2), &Device::Cpu).unwrap();
        kb.variable("?none", empty).unwrap();

        let t = ask(&kb, "forall ?none: A(?none)");
        assert_eq!(t.to_scalar().unwrap(), 1.0);

        let e = ask(&kb, "exists ?none: A(?none)");
        assert_eq!(e.to_scalar().unwrap(), 0.0);
    }

    #[test]
    fn test_unknown_predicate_is_reported() {
        let kb = kb_with_samples(4);
        let formula = parse_formula("C(?data)").unwrap();
        let err = eval(&kb, &formula).unwrap_err();
        assert!(matches!(err, LtnError::UnknownSymbol(s) if s == "C"));
    }
}
