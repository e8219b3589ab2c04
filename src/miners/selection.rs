//! Exact selection probabilities of absorbing-walk samples.
//!
//! The walk from the root is an absorbing Markov chain. With `Q` the
//! transitions among the transient ancestors of a sample, `R` the
//! transitions from them into the sample and `u` the first step out of the
//! root, the probability of drawing the sample is `u (I - Q)^-1 R`, plus
//! `u[sample]` when the sample is itself a first step.

use super::transition::{probabilities, WeightFn};
use crate::{
    error::{Error, Result},
    lattice::Node,
};
use log::debug;
use smartcore::linalg::basic::arrays::{Array, Array2, MutArray};
use smartcore::linalg::basic::matrix::DenseMatrix;
use sprs::{CsMat, TriMat};
use std::collections::{HashMap, VecDeque};
use std::fmt::Display;

const TOLERANCE: f64 = 1e-9;
const PIVOT_EPSILON: f64 = 1e-12;

/// The nodes below `sample`, excluding the root, in BFS order.
fn ancestors<N: Node>(sample: &N) -> Result<Vec<N>> {
    let mut index: HashMap<Vec<u8>, usize> = HashMap::new();
    let mut ancestors = vec![];
    let mut queue = VecDeque::new();
    queue.push_back(sample.clone());
    while let Some(node) = queue.pop_front() {
        for parent in node.parents()? {
            if parent.level() == 0 || index.contains_key(parent.label()) {
                continue;
            }
            index.insert(parent.label().to_vec(), ancestors.len());
            ancestors.push(parent.clone());
            queue.push_back(parent);
        }
    }
    Ok(ancestors)
}

fn to_dense(m: &CsMat<f64>) -> DenseMatrix<f64> {
    let (rows, cols) = m.shape();
    let mut dense = DenseMatrix::zeros(rows, cols);
    for (&v, (i, j)) in m.iter() {
        let cur = *dense.get((i, j));
        dense.set((i, j), cur + v);
    }
    dense
}

/// Inverts `I - Q` by Gauss-Jordan elimination with partial pivoting.
fn fundamental(q: &CsMat<f64>) -> Result<DenseMatrix<f64>> {
    let n = q.rows();
    let mut a = to_dense(q);
    for i in 0..n {
        for j in 0..n {
            let v = *a.get((i, j));
            a.set((i, j), if i == j { 1.0 - v } else { -v });
        }
    }
    let mut inv = DenseMatrix::zeros(n, n);
    for i in 0..n {
        inv.set((i, i), 1.0);
    }
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&x, &y| {
                a.get((x, col))
                    .abs()
                    .partial_cmp(&a.get((y, col)).abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(col);
        let p = *a.get((pivot, col));
        if p.abs() < PIVOT_EPSILON || p.is_nan() {
            return Err(Error::Computation(String::from("I - Q is singular")));
        }
        if pivot != col {
            for j in 0..n {
                for m in [&mut a, &mut inv].iter_mut() {
                    let (x, y) = (*m.get((col, j)), *m.get((pivot, j)));
                    m.set((col, j), y);
                    m.set((pivot, j), x);
                }
            }
        }
        for j in 0..n {
            let (x, y) = (*a.get((col, j)), *inv.get((col, j)));
            a.set((col, j), x / p);
            inv.set((col, j), y / p);
        }
        for i in 0..n {
            let factor = *a.get((i, col));
            if i == col || factor == 0.0 {
                continue;
            }
            for j in 0..n {
                let (x, y) = (*a.get((i, j)), *a.get((col, j)));
                a.set((i, j), x - factor * y);
                let (x, y) = (*inv.get((i, j)), *inv.get((col, j)));
                inv.set((i, j), x - factor * y);
            }
        }
    }
    Ok(inv)
}

/// The probability that an absorbing walk from `root` over children,
/// stepping with `weight`, ends in `sample`.
///
/// `sample` must be maximal, as every absorbing walk ends in a maximal
/// node.
pub fn selection_probability<N: Node, W: WeightFn<N> + ?Sized>(
    root: &N,
    sample: &N,
    weight: &W,
) -> Result<f64> {
    let transient = ancestors(sample)?;
    let index: HashMap<&[u8], usize> = transient
        .iter()
        .enumerate()
        .map(|(i, node)| (node.label(), i))
        .collect();
    let n = transient.len();
    let mut q = TriMat::<f64>::new((n, n));
    let mut r = TriMat::<f64>::new((n, 1));
    let mut u = TriMat::<f64>::new((1, n));
    let mut direct = 0.0;

    let starts = root.children()?;
    for (start, p) in starts.iter().zip(probabilities(root, &starts, weight)?) {
        if start.label() == sample.label() {
            direct += p;
        } else if let Some(&j) = index.get(start.label()) {
            u.add_triplet(0, j, p);
        }
    }
    for (i, node) in transient.iter().enumerate() {
        let children = node.children()?;
        for (child, p) in children.iter().zip(probabilities(node, &children, weight)?) {
            if child.label() == sample.label() {
                r.add_triplet(i, 0, p);
            } else if let Some(&j) = index.get(child.label()) {
                q.add_triplet(i, j, p);
            }
        }
    }
    debug!("{} transient ancestors of {}", n, sample);

    let mut probability = direct;
    if n > 0 {
        let fundamental = fundamental(&q.to_csr())?;
        let (u, r) = (to_dense(&u.to_csr()), to_dense(&r.to_csr()));
        for i in 0..n {
            let ui = *u.get((0, i));
            if ui == 0.0 {
                continue;
            }
            for j in 0..n {
                probability += ui * *fundamental.get((i, j)) * *r.get((j, 0));
            }
        }
    }
    checked(probability, sample)
}

/// Rejects a probability that is NaN or above 1 beyond rounding.
fn checked(probability: f64, sample: &dyn Display) -> Result<f64> {
    if probability.is_nan() || probability > 1.0 + TOLERANCE {
        return Err(Error::Computation(format!(
            "selection probability {} of {} is out of range",
            probability, sample
        )));
    }
    Ok(probability)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fundamental() {
        // A chain 0 -> 1 -> 2 with probability 1/2 at each step.
        let mut q = TriMat::<f64>::new((3, 3));
        q.add_triplet(0, 1, 0.5);
        q.add_triplet(1, 2, 0.5);
        let inv = fundamental(&q.to_csr()).unwrap();
        assert!((*inv.get((0, 0)) - 1.0).abs() < 1e-12);
        assert!((*inv.get((0, 1)) - 0.5).abs() < 1e-12);
        assert!((*inv.get((0, 2)) - 0.25).abs() < 1e-12);
        assert!((*inv.get((2, 0))).abs() < 1e-12);
    }

    #[test]
    fn test_out_of_range_probability() {
        assert!(matches!(checked(1.5, &"x"), Err(Error::Computation(_))));
        assert!(matches!(checked(f64::NAN, &"x"), Err(Error::Computation(_))));
        assert_eq!(checked(1.0 + 1e-12, &"x").unwrap(), 1.0 + 1e-12);
        assert_eq!(checked(0.0, &"x").unwrap(), 0.0);
    }

    #[test]
    fn test_singular() {
        let mut q = TriMat::<f64>::new((1, 1));
        q.add_triplet(0, 0, 1.0);
        assert!(matches!(
            fundamental(&q.to_csr()),
            Err(Error::Computation(_))
        ));
    }
}
