use super::{Edge, Extension, SubGraph, Vertex};
use crate::{
    canon::CanonicalOracle,
    error::{Error, Result},
    types::Color,
};

/// A pattern under construction, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Builder {
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_subgraph(sg: &SubGraph) -> Self {
        Self {
            vertices: sg.vertices().to_vec(),
            edges: sg.edges().to_vec(),
        }
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn add_vertex(&mut self, color: Color) -> Vertex {
        let vertex = Vertex {
            idx: self.vertices.len(),
            color,
        };
        self.vertices.push(vertex);
        vertex
    }

    pub fn add_edge(&mut self, src: usize, targ: usize, color: Color) -> Result<Edge> {
        if src >= self.vertices.len() || targ >= self.vertices.len() {
            return Err(Error::Invariant(format!(
                "edge {}->{} outside of a {}-vertex pattern",
                src,
                targ,
                self.vertices.len()
            )));
        }
        let edge = Edge { src, targ, color };
        self.edges.push(edge);
        Ok(edge)
    }

    /// Applies `ext`, adding its new vertex (if any) as the last vertex.
    pub fn extend(&self, ext: &Extension) -> Result<Builder> {
        let len = self.vertices.len();
        let both_new = ext.source.idx == len && ext.target.idx == len;
        if ext.source.idx > len || ext.target.idx > len || both_new {
            return Err(Error::Invariant(format!(
                "extension {:?} does not fit a {}-vertex pattern",
                ext, len
            )));
        }
        let mut builder = self.clone();
        let src = if ext.source.idx == len {
            builder.add_vertex(ext.source.color).idx
        } else {
            ext.source.idx
        };
        let targ = if ext.target.idx == len {
            builder.add_vertex(ext.target.color).idx
        } else {
            ext.target.idx
        };
        builder.add_edge(src, targ, ext.color)?;
        Ok(builder)
    }

    /// Removes edge `e` and drops endpoints left without edges.
    ///
    /// The lowest indexed endpoint is kept when dropping both would leave
    /// an empty pattern.
    pub fn remove_edge(&self, e: usize) -> Builder {
        let removed = self.edges[e];
        let edges: Vec<Edge> = self
            .edges
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != e)
            .map(|(_, &edge)| edge)
            .collect();
        let touched = |v: usize| edges.iter().any(|edge| edge.src == v || edge.targ == v);
        let mut dropped: Vec<usize> = vec![removed.src, removed.targ]
            .into_iter()
            .filter(|&v| !touched(v))
            .collect();
        dropped.sort_unstable();
        dropped.dedup();
        if dropped.len() == self.vertices.len() {
            dropped.remove(0);
        }
        let mut position = vec![usize::MAX; self.vertices.len()];
        let mut vertices = Vec::with_capacity(self.vertices.len());
        for v in &self.vertices {
            if !dropped.contains(&v.idx) {
                position[v.idx] = vertices.len();
                vertices.push(Vertex {
                    idx: vertices.len(),
                    color: v.color,
                });
            }
        }
        let edges = edges
            .into_iter()
            .map(|edge| Edge {
                src: position[edge.src],
                targ: position[edge.targ],
                color: edge.color,
            })
            .collect();
        Builder { vertices, edges }
    }

    pub fn is_connected(&self) -> bool {
        self.clone().build().is_connected()
    }

    /// Keeps the insertion order.
    pub fn build(self) -> SubGraph {
        SubGraph::from_parts(
            self.vertices.into_iter().map(|v| v.color).collect(),
            self.edges,
        )
    }

    /// Returns the canonical pattern and `vord`, where canonical vertex `k`
    /// is builder vertex `vord[k]`.
    pub fn canonicalize(&self, oracle: &dyn CanonicalOracle) -> (SubGraph, Vec<usize>) {
        let colors: Vec<Color> = self.vertices.iter().map(|v| v.color).collect();
        let (vord, eord) = oracle.canonical_permutation(&colors, &self.edges);
        let mut position = vec![0; vord.len()];
        for (k, &v) in vord.iter().enumerate() {
            position[v] = k;
        }
        let edges = eord
            .iter()
            .map(|&e| {
                let edge = self.edges[e];
                Edge {
                    src: position[edge.src],
                    targ: position[edge.targ],
                    color: edge.color,
                }
            })
            .collect();
        let sg = SubGraph::from_parts(vord.iter().map(|&v| colors[v]).collect(), edges);
        (sg, vord)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canon::RefiningOracle;

    fn create_path() -> Builder {
        let mut b = Builder::new();
        let v0 = b.add_vertex(0);
        let v1 = b.add_vertex(1);
        let v2 = b.add_vertex(1);
        b.add_edge(v0.idx, v1.idx, 5).unwrap();
        b.add_edge(v1.idx, v2.idx, 5).unwrap();
        b
    }

    #[test]
    fn test_extend() {
        let b = create_path();
        let ext = Extension::new(
            Vertex { idx: 2, color: 1 },
            Vertex { idx: 3, color: 0 },
            6,
        );
        let extended = b.extend(&ext).unwrap();
        assert_eq!(extended.vertices().len(), 4);
        assert_eq!(
            extended.edges()[2],
            Edge {
                src: 2,
                targ: 3,
                color: 6
            }
        );
        let both_new = Extension::new(
            Vertex { idx: 3, color: 1 },
            Vertex { idx: 3, color: 0 },
            6,
        );
        assert!(b.extend(&both_new).is_err());
        assert!(b.clone().add_edge(0, 7, 1).is_err());
    }

    #[test]
    fn test_remove_edge() {
        let b = create_path();
        let leaf = b.remove_edge(1);
        assert_eq!(leaf.vertices().len(), 2);
        assert!(leaf.is_connected());
        let split = b.remove_edge(0);
        assert_eq!(split.vertices().len(), 2);
        assert_eq!(split.vertices()[0].color, 1);
        let single = Builder::from_subgraph(&b.remove_edge(1).build()).remove_edge(0);
        assert_eq!(single.vertices().len(), 1);
        assert_eq!(single.vertices()[0].color, 0);
        assert!(single.edges().is_empty());
    }

    #[test]
    fn test_canonicalize_is_order_independent() {
        let mut b = Builder::new();
        let v0 = b.add_vertex(1);
        let v1 = b.add_vertex(1);
        let v2 = b.add_vertex(0);
        b.add_edge(v1.idx, v0.idx, 5).unwrap();
        b.add_edge(v2.idx, v1.idx, 5).unwrap();
        let oracle = RefiningOracle::new();
        let (sg1, _) = create_path().canonicalize(&oracle);
        let (sg2, vord) = b.canonicalize(&oracle);
        assert_eq!(sg1.label(), sg2.label());
        assert_eq!(vord, vec![2, 0, 1]);
    }
}
