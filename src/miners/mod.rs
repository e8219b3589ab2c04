//! Lattice traversals: exhaustive miners and absorbing-walk samplers.

pub use dfs::Dfs;
pub use graple::{Graple, LatticeWalk};
pub use selection::selection_probability;
pub use transition::{Neighborhood, Weight, WeightFn};
pub use vsigram::Vsigram;
pub use walk::{RejectingWalk, Walk};

use crate::{error::Result, lattice::DataType, report::Reporter};

pub mod dfs;
pub mod graple;
pub mod selection;
pub mod transition;
pub mod vsigram;
pub mod walk;

pub trait Miner<D: DataType> {
    /// Reports the acceptable nodes found, then closes the reporter.
    fn mine(&mut self, dt: &D, reporter: &mut dyn Reporter<D::Node>) -> Result<()>;
}
