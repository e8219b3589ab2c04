//! The lattice of connected subgraph patterns of a colored digraph.

pub use node::SubgraphNode;

use crate::{
    cache::LatticeCache,
    canon::{CanonicalOracle, RefiningOracle},
    config::{Backend, Config},
    error::{Error, Result},
    graph::Graph,
    lattice::DataType,
    search::{find_embeddings, min_image_support, Extender},
    subgraph::{Embedding, Extension, SubGraph},
    types::Color,
};
use log::{debug, info};
use std::collections::HashSet;
use std::sync::Arc;

mod node;

struct Inner {
    graph: Graph,
    config: Config,
    oracle: Box<dyn CanonicalOracle>,
    cache: LatticeCache,
}

/// A shared handle on the host graph, the lattice settings and the cache.
#[derive(Clone)]
pub struct Digraph {
    inner: Arc<Inner>,
}

impl Digraph {
    pub fn new(graph: Graph, config: Config) -> Result<Self> {
        Self::with_oracle(graph, config, Box::new(RefiningOracle::new()))
    }

    pub fn with_oracle(
        graph: Graph,
        config: Config,
        oracle: Box<dyn CanonicalOracle>,
    ) -> Result<Self> {
        config.validate()?;
        let cache = LatticeCache::open(&config.store)?;
        info!(
            "digraph lattice over {} (support {}, {:?})",
            graph.info(),
            config.support,
            config.backend
        );
        Ok(Self {
            inner: Arc::new(Inner {
                graph,
                config,
                oracle,
                cache,
            }),
        })
    }

    pub fn graph(&self) -> &Graph {
        &self.inner.graph
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn oracle(&self) -> &dyn CanonicalOracle {
        self.inner.oracle.as_ref()
    }

    pub(crate) fn cache(&self) -> &LatticeCache {
        &self.inner.cache
    }

    pub(crate) fn extender(&self, pattern: &SubGraph) -> Extender<'_> {
        Extender {
            graph: self.graph(),
            oracle: self.oracle(),
            support: self.config().support,
            allow_new_vertex: pattern.num_vertices() < self.config().max_vertices,
        }
    }

    fn root_node(&self) -> SubgraphNode {
        SubgraphNode::new(self.clone(), SubGraph::empty(), Some(vec![]), HashSet::new())
    }

    fn singleton_embeddings(&self, color: Color) -> Vec<Embedding> {
        self.graph()
            .vertices_with_color(color)
            .iter()
            .map(|&v| Embedding::new(vec![v]))
            .collect()
    }

    /// Caches a freshly computed node, unless another one already was.
    pub(crate) fn register(
        &self,
        pattern: SubGraph,
        embeddings: Vec<Embedding>,
        unsupported: HashSet<Extension>,
    ) -> Result<SubgraphNode> {
        let label = pattern.label();
        if self.cache().frequency(&label)?.is_some() {
            return self.node(&label);
        }
        let frequency = min_image_support(pattern.num_vertices(), &embeddings);
        let persisted = match self.config().backend {
            Backend::EmbList => Some(embeddings.as_slice()),
            Backend::Search => None,
        };
        self.cache().put_node(&label, frequency, persisted)?;
        Ok(SubgraphNode::new(
            self.clone(),
            pattern,
            Some(embeddings),
            unsupported,
        ))
    }

    /// Rebuilds a node from its canonical label.
    pub fn node(&self, label: &[u8]) -> Result<SubgraphNode> {
        let pattern = SubGraph::from_label(label)?;
        if pattern.is_empty() {
            return Ok(self.root_node());
        }
        if self.cache().frequency(label)?.is_none() {
            debug!("searching embeddings of {}", pattern.display(self.graph().labels()));
            let embeddings = if pattern.num_edges() == 0 {
                self.singleton_embeddings(pattern.vertices()[0].color)
            } else {
                find_embeddings(self.graph(), &pattern)?
            };
            return self.register(pattern, embeddings, HashSet::new());
        }
        match self.config().backend {
            Backend::EmbList => {
                let embeddings = self.cache().embeddings(label)?;
                if embeddings.is_empty() {
                    return Err(Error::Invariant(format!(
                        "cached pattern {} has no embeddings",
                        pattern.display(self.graph().labels())
                    )));
                }
                Ok(SubgraphNode::new(
                    self.clone(),
                    pattern,
                    Some(embeddings),
                    HashSet::new(),
                ))
            }
            Backend::Search => Ok(SubgraphNode::new(
                self.clone(),
                pattern,
                None,
                HashSet::new(),
            )),
        }
    }

    /// Canonicalizes `pattern` and returns its node.
    pub fn node_from_pattern(&self, pattern: &SubGraph) -> Result<SubgraphNode> {
        let (canonical, _) = pattern.builder().canonicalize(self.oracle());
        self.node(&canonical.label())
    }
}

impl DataType for Digraph {
    type Node = SubgraphNode;

    fn root(&self) -> Result<SubgraphNode> {
        Ok(self.root_node())
    }

    fn singletons(&self) -> Result<Vec<SubgraphNode>> {
        let support = self.config().support;
        self.graph()
            .vertex_colors()
            .into_iter()
            .filter(|&color| self.graph().color_frequency(color) >= support)
            .map(|color| self.node(&SubGraph::from_parts(vec![color], vec![]).label()))
            .collect()
    }

    fn acceptable(&self, node: &SubgraphNode) -> bool {
        let config = self.config();
        let (e, v) = (node.pattern().num_edges(), node.pattern().num_vertices());
        v > 0
            && config.min_edges <= e
            && e <= config.max_edges
            && config.min_vertices <= v
            && v <= config.max_vertices
    }

    fn support(&self) -> usize {
        self.config().support
    }

    fn close(&self) -> Result<()> {
        self.cache().close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;
    use crate::lattice::Node;
    use crate::subgraph::Edge;

    fn create_fixture() -> Graph {
        let mut builder = GraphBuilder::new();
        builder.add_vertex(1, "black");
        builder.add_vertex(2, "black");
        for id in 3..7 {
            builder.add_vertex(id, "red");
        }
        for &(src, dst) in &[(1, 3), (1, 4), (3, 4), (2, 5), (5, 6), (6, 2)] {
            builder.add_edge(src, dst, "");
        }
        builder.build()
    }

    #[test]
    fn test_singletons() {
        let dt = Digraph::new(create_fixture(), Config::default().support(2)).unwrap();
        let singletons = dt.singletons().unwrap();
        let names: Vec<String> = singletons.iter().map(|n| n.to_string()).collect();
        assert_eq!(names, vec!["0:1(0:black)", "0:1(0:red)"]);
        assert_eq!(singletons[0].support().unwrap(), 2);
        assert_eq!(singletons[1].support().unwrap(), 4);
        let dt = Digraph::new(create_fixture(), Config::default().support(3)).unwrap();
        assert_eq!(dt.singletons().unwrap().len(), 1);
    }

    #[test]
    fn test_acceptable() {
        let config = Config::default().min_edges(1).max_vertices(2);
        let dt = Digraph::new(create_fixture(), config).unwrap();
        let root = dt.root().unwrap();
        assert!(!dt.acceptable(&root));
        let black = dt.singletons().unwrap().remove(0);
        assert!(!dt.acceptable(&black));
        let child = black.children().unwrap().remove(0);
        assert!(dt.acceptable(&child));
    }

    #[test]
    fn test_node_from_label() {
        let dt = Digraph::new(create_fixture(), Config::default()).unwrap();
        let black = dt.singletons().unwrap().remove(0);
        let child = black.children().unwrap().remove(0);
        let again = dt.node(child.label()).unwrap();
        assert_eq!(again.label(), child.label());
        assert_eq!(again.embeddings().unwrap(), child.embeddings().unwrap());
        assert!(dt.node(&[1, 2, 3]).is_err());
    }

    /// Caches a `black -> black` pattern, which never occurs, as frequent.
    fn absent_pattern(dt: &Digraph) -> Vec<u8> {
        let labels = dt.graph().labels();
        let black = labels.color("black").unwrap();
        let edge = Edge {
            src: 0,
            targ: 1,
            color: labels.color("").unwrap(),
        };
        let pattern = SubGraph::from_parts(vec![black, black], vec![edge]);
        let (canonical, _) = pattern.builder().canonicalize(dt.oracle());
        let label = canonical.label();
        dt.cache().put_node(&label, 5, None).unwrap();
        label
    }

    #[test]
    fn test_cached_frequency_without_embeddings() {
        let dt = Digraph::new(create_fixture(), Config::default()).unwrap();
        let label = absent_pattern(&dt);
        assert!(matches!(dt.node(&label), Err(Error::Invariant(_))));

        let config = Config::default().backend(Backend::Search);
        let dt = Digraph::new(create_fixture(), config).unwrap();
        let label = absent_pattern(&dt);
        let node = dt.node(&label).unwrap();
        assert!(matches!(node.embeddings(), Err(Error::Invariant(_))));
        assert!(matches!(node.children(), Err(Error::Invariant(_))));
    }
}
