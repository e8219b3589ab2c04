use super::Digraph;
use crate::{
    cache::Relation,
    canon::is_canonical_extension,
    error::{Error, Result},
    lattice::{DataType, Node},
    search::{find_embeddings, min_image_support},
    subgraph::{Embedding, Extension, SubGraph},
};
use log::debug;
use parking_lot::Mutex;
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;

/// A frequent connected pattern and its embeddings.
///
/// Clones share the pattern and the embeddings. Embeddings of nodes
/// rebuilt from the cache without them are searched for on first use.
#[derive(Clone)]
pub struct SubgraphNode {
    dt: Digraph,
    pattern: Arc<SubGraph>,
    label: Arc<[u8]>,
    embeddings: Arc<Mutex<Option<Arc<Vec<Embedding>>>>>,
    unsupported: Arc<HashSet<Extension>>,
}

impl SubgraphNode {
    pub(crate) fn new(
        dt: Digraph,
        pattern: SubGraph,
        embeddings: Option<Vec<Embedding>>,
        unsupported: HashSet<Extension>,
    ) -> Self {
        let label: Arc<[u8]> = pattern.label().into();
        Self {
            dt,
            pattern: Arc::new(pattern),
            label,
            embeddings: Arc::new(Mutex::new(embeddings.map(Arc::new))),
            unsupported: Arc::new(unsupported),
        }
    }

    pub fn pattern(&self) -> &SubGraph {
        &self.pattern
    }

    pub fn embeddings(&self) -> Result<Arc<Vec<Embedding>>> {
        let mut embeddings = self.embeddings.lock();
        if let Some(embeddings) = embeddings.as_ref() {
            return Ok(embeddings.clone());
        }
        let found = Arc::new(find_embeddings(self.dt.graph(), &self.pattern)?);
        if found.is_empty() && !self.pattern.is_empty() {
            if let Some(frequency) = self.dt.cache().frequency(&self.label)? {
                if frequency > 0 {
                    return Err(Error::Invariant(format!(
                        "cached pattern {} has no embeddings",
                        self.pattern.display(self.dt.graph().labels())
                    )));
                }
            }
        }
        *embeddings = Some(found.clone());
        Ok(found)
    }

    /// The extensions already known to be infrequent for this pattern.
    pub fn unsupported(&self) -> &HashSet<Extension> {
        &self.unsupported
    }

    fn at_ceiling(&self) -> bool {
        self.pattern.num_edges() >= self.dt.config().max_edges
    }

    fn load(&self, labels: &[Vec<u8>]) -> Result<Vec<SubgraphNode>> {
        labels.iter().map(|label| self.dt.node(label)).collect()
    }

    fn parent_labels(&self) -> Vec<Vec<u8>> {
        let oracle = self.dt.oracle();
        let mut labels = BTreeSet::new();
        if self.pattern.num_vertices() == 2 && self.pattern.num_edges() == 1 {
            for v in self.pattern.vertices() {
                labels.insert(SubGraph::from_parts(vec![v.color], vec![]).label());
            }
        } else {
            for e in 0..self.pattern.num_edges() {
                let parent = self.pattern.builder().remove_edge(e);
                if parent.is_connected() {
                    labels.insert(parent.canonicalize(oracle).0.label());
                }
            }
        }
        labels.into_iter().collect()
    }
}

impl Node for SubgraphNode {
    fn label(&self) -> &[u8] {
        &self.label
    }

    fn level(&self) -> usize {
        self.pattern.level()
    }

    fn support(&self) -> Result<usize> {
        if self.pattern.is_empty() {
            return Ok(self.dt.graph().num_vertices());
        }
        match self.dt.cache().frequency(&self.label)? {
            Some(frequency) => Ok(frequency),
            None => Ok(min_image_support(
                self.pattern.num_vertices(),
                &self.embeddings()?,
            )),
        }
    }

    fn children(&self) -> Result<Vec<SubgraphNode>> {
        if self.pattern.is_empty() {
            return self.dt.singletons();
        }
        if self.at_ceiling() {
            return Ok(vec![]);
        }
        let mut computed = None;
        let labels = self
            .dt
            .cache()
            .get_or_insert_with(Relation::Children, &self.label, || {
                let embeddings = self.embeddings()?;
                let result = self.dt.extender(&self.pattern).extend(
                    &self.pattern,
                    &embeddings,
                    &self.unsupported,
                )?;
                self.dt.cache().put_extensions(&self.label, &result.extensions)?;
                let children: Vec<SubgraphNode> = result
                    .children
                    .into_iter()
                    .map(|child| self.dt.register(child.pattern, child.embeddings, child.unsupported))
                    .collect::<Result<_>>()?;
                debug!("{} has {} children", self, children.len());
                let labels = children.iter().map(|child| child.label().to_vec()).collect();
                computed = Some(children);
                Ok(labels)
            })?;
        match computed {
            Some(children) => Ok(children),
            None => self.load(&labels),
        }
    }

    fn canon_kids(&self) -> Result<Vec<SubgraphNode>> {
        if self.pattern.is_empty() {
            return self.dt.singletons();
        }
        let children = self.children()?;
        let labels = self
            .dt
            .cache()
            .get_or_insert_with(Relation::CanonKids, &self.label, || {
                Ok(children
                    .iter()
                    .filter(|child| {
                        is_canonical_extension(&self.pattern, child.pattern(), self.dt.oracle())
                    })
                    .map(|child| child.label().to_vec())
                    .collect())
            })?;
        let labels: HashSet<Vec<u8>> = labels.into_iter().collect();
        Ok(children
            .into_iter()
            .filter(|child| labels.contains(child.label()))
            .collect())
    }

    fn parents(&self) -> Result<Vec<SubgraphNode>> {
        match self.pattern.level() {
            0 => Ok(vec![]),
            1 => Ok(vec![self.dt.root()?]),
            _ => {
                let labels = self
                    .dt
                    .cache()
                    .get_or_insert_with(Relation::Parents, &self.label, || {
                        Ok(self.parent_labels())
                    })?;
                self.load(&labels)
            }
        }
    }
}

impl fmt::Display for SubgraphNode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.pattern.display(self.dt.graph().labels()))
    }
}

impl fmt::Debug for SubgraphNode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SubgraphNode")
            .field("pattern", &self.pattern)
            .finish()
    }
}

impl PartialEq for SubgraphNode {
    fn eq(&self, other: &Self) -> bool {
        self.label == other.label
    }
}

impl Eq for SubgraphNode {}
