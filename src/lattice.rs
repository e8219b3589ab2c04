//! The pattern lattice as seen by the miners.

use crate::error::Result;
use std::fmt::Display;

/// A lattice node. Two nodes are the same node iff their labels are equal.
pub trait Node: Clone + Send + Sync + Display {
    /// The canonical label.
    fn label(&self) -> &[u8];

    /// 0 for the root, 1 for singletons, edges + 1 otherwise.
    fn level(&self) -> usize;

    fn support(&self) -> Result<usize>;

    /// The frequent nodes one edge (or one vertex, below the singletons)
    /// larger.
    fn children(&self) -> Result<Vec<Self>>;

    /// The children whose canonical parent is this node.
    fn canon_kids(&self) -> Result<Vec<Self>>;

    /// The nodes one edge smaller.
    fn parents(&self) -> Result<Vec<Self>>;

    fn child_count(&self) -> Result<usize> {
        Ok(self.children()?.len())
    }

    fn parent_count(&self) -> Result<usize> {
        Ok(self.parents()?.len())
    }

    fn adjacent_count(&self) -> Result<usize> {
        Ok(self.child_count()? + self.parent_count()?)
    }

    /// Children followed by parents.
    fn adjacent(&self) -> Result<Vec<Self>> {
        let mut adjacent = self.children()?;
        adjacent.extend(self.parents()?);
        Ok(adjacent)
    }

    fn maximal(&self) -> Result<bool> {
        Ok(self.child_count()? == 0)
    }
}

/// A kind of lattice: where miners start and what they may report.
pub trait DataType: Send + Sync {
    type Node: Node;

    /// The empty pattern, parent of every singleton.
    fn root(&self) -> Result<Self::Node>;

    fn singletons(&self) -> Result<Vec<Self::Node>>;

    /// Whether a node is within the reporting bounds.
    fn acceptable(&self, node: &Self::Node) -> bool;

    /// The minimum support threshold.
    fn support(&self) -> usize;

    fn close(&self) -> Result<()>;
}
