use super::transition::{choose, transition, Neighborhood, Weight, WeightFn};
use super::walk::Walk;
use crate::{
    error::Result,
    lattice::{DataType, Node},
};
use rand_chacha::ChaCha8Rng;

/// The absorbing walk: start at the root and step to children until a
/// node has none. The absorbing node is the sample.
pub struct Graple<W = Weight> {
    weight: W,
}

impl<W> Graple<W> {
    pub fn new(weight: W) -> Self {
        Self { weight }
    }

    pub fn weight(&self) -> &W {
        &self.weight
    }
}

impl<D: DataType, W: WeightFn<D::Node>> Walk<D> for Graple<W> {
    fn sample(&self, dt: &D, rng: &mut ChaCha8Rng) -> Result<Option<D::Node>> {
        let mut cur = dt.root()?;
        while let Some(next) = transition(&cur, Neighborhood::Children, &self.weight, rng)? {
            cur = next;
        }
        Ok(if cur.level() == 0 { None } else { Some(cur) })
    }
}

/// A fixed-length walk over children and parents, started at a random
/// singleton. The root is never entered.
pub struct LatticeWalk<W = Weight> {
    steps: usize,
    weight: W,
}

impl<W> LatticeWalk<W> {
    pub fn new(steps: usize, weight: W) -> Self {
        Self { steps, weight }
    }
}

impl<D: DataType, W: WeightFn<D::Node>> Walk<D> for LatticeWalk<W> {
    fn sample(&self, dt: &D, rng: &mut ChaCha8Rng) -> Result<Option<D::Node>> {
        let root = dt.root()?;
        let mut cur = match choose(&root, dt.singletons()?, &Weight::Uniform, rng)? {
            Some(start) => start,
            None => return Ok(None),
        };
        for _ in 0..self.steps {
            let candidates: Vec<D::Node> = Neighborhood::Adjacent
                .of(&cur)?
                .into_iter()
                .filter(|node| node.level() > 0)
                .collect();
            match choose(&cur, candidates, &self.weight, rng)? {
                Some(next) => cur = next,
                None => break,
            }
        }
        Ok(Some(cur))
    }
}
