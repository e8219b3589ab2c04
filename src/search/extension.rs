use super::min_image_support;
use crate::{
    canon::CanonicalOracle,
    error::{Error, Result},
    graph::{Graph, HostEdge},
    subgraph::{Embedding, Extension, SubGraph, Vertex},
    types::Color,
};
use log::debug;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// A frequent one-edge extension of a pattern, in canonical order.
#[derive(Debug, Clone)]
pub struct Child {
    pub pattern: SubGraph,
    pub embeddings: Vec<Embedding>,
    pub unsupported: HashSet<Extension>,
}

#[derive(Debug, Default)]
pub struct ExtensionResult {
    /// The frequent extensions, ascending.
    pub extensions: Vec<Extension>,
    /// One child per canonical label, ascending by label.
    pub children: Vec<Child>,
    /// The inherited unsupported set plus the infrequent extensions found.
    pub unsupported: HashSet<Extension>,
}

/// Grows patterns by one edge against the host graph.
pub struct Extender<'a> {
    pub graph: &'a Graph,
    pub oracle: &'a dyn CanonicalOracle,
    pub support: usize,
    pub allow_new_vertex: bool,
}

impl<'a> Extender<'a> {
    fn frequent_color(&self, color: Color) -> bool {
        self.graph.color_frequency(color) >= self.support
    }

    fn frequent_edge_color(&self, color: Color) -> bool {
        self.graph.edge_color_frequency(color) >= self.support
    }

    /// Turns a host edge incident to `emb` into an extension of `pattern`.
    fn candidate(
        &self,
        pattern: &SubGraph,
        emb: &Embedding,
        edge: &HostEdge,
    ) -> Option<(Extension, Embedding)> {
        let len = pattern.num_vertices();
        let (src_color, targ_color) = (self.graph.color(edge.src), self.graph.color(edge.targ));
        if !self.frequent_edge_color(edge.color)
            || !self.frequent_color(src_color)
            || !self.frequent_color(targ_color)
        {
            return None;
        }
        let src = emb.position(edge.src);
        let targ = emb.position(edge.targ);
        if let (Some(s), Some(t)) = (src, targ) {
            if pattern.has_edge(s, t, edge.color) {
                return None;
            }
        }
        let ext = Extension::new(
            Vertex {
                idx: src.unwrap_or(len),
                color: src_color,
            },
            Vertex {
                idx: targ.unwrap_or(len),
                color: targ_color,
            },
            edge.color,
        );
        let extended = match (src, targ) {
            (Some(_), Some(_)) => emb.clone(),
            (None, Some(_)) if self.allow_new_vertex => emb.extend(edge.src),
            (Some(_), None) if self.allow_new_vertex => emb.extend(edge.targ),
            _ => return None,
        };
        Some((ext, extended))
    }

    /// Finds the frequent one-edge extensions of `pattern` and the children
    /// they produce.
    ///
    /// The result only depends on the pattern and its embeddings, so it can
    /// be cached under the pattern label.
    pub fn extend(
        &self,
        pattern: &SubGraph,
        embeddings: &[Embedding],
        unsupported: &HashSet<Extension>,
    ) -> Result<ExtensionResult> {
        let len = pattern.num_vertices();
        let mut buckets: BTreeMap<Extension, BTreeSet<Embedding>> = BTreeMap::new();
        for emb in embeddings {
            for i in 0..len {
                let v = emb.get(i);
                for edge in self.graph.kids(v).iter().chain(self.graph.parents(v)) {
                    if let Some((ext, extended)) = self.candidate(pattern, emb, edge) {
                        if !unsupported.contains(&ext) {
                            buckets.entry(ext).or_insert_with(BTreeSet::new).insert(extended);
                        }
                    }
                }
            }
        }
        let mut result = ExtensionResult {
            unsupported: unsupported.clone(),
            ..ExtensionResult::default()
        };
        let mut frequent = vec![];
        for (ext, bucket) in buckets {
            let new_len = if ext.adds_vertex(len) { len + 1 } else { len };
            let bucket: Vec<Embedding> = bucket.into_iter().collect();
            if min_image_support(new_len, &bucket) >= self.support {
                frequent.push((ext, bucket));
            } else {
                result.unsupported.insert(ext);
            }
        }
        let mut seen: BTreeMap<Vec<u8>, (SubGraph, Vec<usize>, BTreeSet<Embedding>)> =
            BTreeMap::new();
        let builder = pattern.builder();
        for (ext, bucket) in frequent {
            if bucket.is_empty() {
                return Err(Error::Invariant(format!(
                    "extension {:?} is frequent without embeddings",
                    ext
                )));
            }
            // Extensions merging into one child reach it through different
            // vertex orders, so each bucket is permuted with its own.
            let (child, vord) = builder.extend(&ext)?.canonicalize(self.oracle);
            let permuted: Vec<Embedding> = bucket.iter().map(|emb| emb.permute(&vord)).collect();
            seen.entry(child.label())
                .or_insert_with(|| (child, vord, BTreeSet::new()))
                .2
                .extend(permuted);
            result.extensions.push(ext);
        }
        for (_, (child, vord, embeddings)) in seen {
            let mut position = vec![0; vord.len()];
            for (k, &v) in vord.iter().enumerate() {
                position[v] = k;
            }
            let unsupported = result
                .unsupported
                .iter()
                .map(|ext| ext.translate(len, child.num_vertices(), &position))
                .collect();
            result.children.push(Child {
                pattern: child,
                embeddings: embeddings.into_iter().collect(),
                unsupported,
            });
        }
        debug!(
            "{} extensions, {} children, {} unsupported",
            result.extensions.len(),
            result.children.len(),
            result.unsupported.len()
        );
        Ok(result)
    }
}
