//! The transition rule shared by the lattice walks.

use crate::{error::Result, lattice::Node};
use rand::prelude::*;

/// Which neighbors a walk may step to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Neighborhood {
    Children,
    /// Children followed by parents.
    Adjacent,
}

impl Neighborhood {
    pub fn of<N: Node>(self, node: &N) -> Result<Vec<N>> {
        match self {
            Neighborhood::Children => node.children(),
            Neighborhood::Adjacent => node.adjacent(),
        }
    }
}

/// The unnormalized weight of the step `from -> to`.
pub trait WeightFn<N: Node>: Send + Sync {
    fn weight(&self, from: &N, to: &N) -> Result<f64>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weight {
    Uniform,
    /// Favors neighbors with more children.
    ChildCount,
    /// Favors larger neighbors.
    Level,
}

impl<N: Node> WeightFn<N> for Weight {
    fn weight(&self, _from: &N, to: &N) -> Result<f64> {
        Ok(match self {
            Weight::Uniform => 1.0,
            Weight::ChildCount => to.child_count()? as f64,
            Weight::Level => to.level() as f64,
        })
    }
}

/// Normalizes the weights of the steps from `from` to each candidate.
///
/// Falls back to uniform probabilities when the weights do not sum to a
/// positive finite number.
pub fn probabilities<N: Node, W: WeightFn<N> + ?Sized>(
    from: &N,
    candidates: &[N],
    weight: &W,
) -> Result<Vec<f64>> {
    let weights = candidates
        .iter()
        .map(|to| weight.weight(from, to))
        .collect::<Result<Vec<f64>>>()?;
    let total: f64 = weights.iter().sum();
    if !(total.is_finite() && total > 0.0) || weights.iter().any(|&w| w < 0.0) {
        let uniform = 1.0 / candidates.len() as f64;
        return Ok(vec![uniform; candidates.len()]);
    }
    Ok(weights.into_iter().map(|w| w / total).collect())
}

/// Draws an index with the given probabilities.
///
/// `x = total * (1 - U)` lies in `(0, total]`, and the chosen index is the
/// first one whose running sum reaches `x`.
pub fn weighted_sample<R: Rng>(probabilities: &[f64], rng: &mut R) -> usize {
    let total: f64 = probabilities.iter().sum();
    let u: f64 = rng.random();
    let mut x = total * (1.0 - u);
    for (i, &p) in probabilities.iter().enumerate() {
        x -= p;
        if x <= 0.0 {
            return i;
        }
    }
    probabilities.len().saturating_sub(1)
}

/// Picks one of `candidates`, or `None` if there is none.
pub fn choose<N: Node, W: WeightFn<N> + ?Sized, R: Rng>(
    from: &N,
    mut candidates: Vec<N>,
    weight: &W,
    rng: &mut R,
) -> Result<Option<N>> {
    match candidates.len() {
        0 => Ok(None),
        1 => Ok(candidates.pop()),
        _ => {
            let probabilities = probabilities(from, &candidates, weight)?;
            let i = weighted_sample(&probabilities, rng);
            Ok(Some(candidates.swap_remove(i)))
        }
    }
}

/// One step of a walk from `node`.
pub fn transition<N: Node, W: WeightFn<N> + ?Sized, R: Rng>(
    node: &N,
    neighborhood: Neighborhood,
    weight: &W,
    rng: &mut R,
) -> Result<Option<N>> {
    choose(node, neighborhood.of(node)?, weight, rng)
}
