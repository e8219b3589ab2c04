use super::Miner;
use crate::{
    error::Result,
    lattice::{DataType, Node},
    report::Reporter,
    store::{Store, StoreType},
};
use log::{debug, info};

/// Depth-first traversal of the whole frequent lattice.
///
/// Each node is reported once; the labels already pushed are kept in a
/// [`Store`], so large lattices can spill the seen-set to disk.
pub struct Dfs {
    seen: Store,
}

impl Dfs {
    pub fn new(seen: Store) -> Self {
        Self { seen }
    }

    /// Opens an empty seen-set, discarding the one of a previous run.
    pub fn open(store_type: &StoreType) -> Result<Self> {
        let seen = Store::open(store_type, "dfs_seen")?;
        seen.clear()?;
        Ok(Self::new(seen))
    }
}

impl<D: DataType> Miner<D> for Dfs {
    fn mine(&mut self, dt: &D, reporter: &mut dyn Reporter<D::Node>) -> Result<()> {
        let mut stack = vec![dt.root()?];
        let (mut visited, mut reported) = (0, 0);
        while let Some(node) = stack.pop() {
            visited += 1;
            if dt.acceptable(&node) {
                reporter.report(&node)?;
                reported += 1;
            }
            let children = node.children()?;
            debug!("{} children of {}", children.len(), node);
            for child in children {
                if self.seen.put_once(child.label(), &[vec![]])? {
                    stack.push(child);
                }
            }
        }
        info!("dfs visited {} nodes, reported {}", visited, reported);
        reporter.close()
    }
}
