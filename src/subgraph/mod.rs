//! Patterns, extensions and embeddings.
//!
//! A [`SubGraph`] is always stored in canonical order, so its byte
//! [`label`](SubGraph::label) identifies its isomorphism class. The label
//! layout is
//!
//! ```text
//! +------------+------------+
//! |  num_edges | num_verts  |            big-endian u32
//! +------------+------------+
//! |   color    |   color    |  ...       one u32 per vertex
//! +------------+------------+------------+
//! |    src     |    targ    |   color    |  one row per edge
//! +------------+------------+------------+
//! ```

pub use builder::Builder;
pub use embedding::Embedding;
pub use extension::Extension;
pub use parser::parse;

use crate::{
    error::{Error, Result},
    graph::Labels,
    types::Color,
};
use itertools::Itertools;
use std::{collections::VecDeque, fmt};

mod builder;
mod embedding;
mod extension;
mod parser;

/// A pattern vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Vertex {
    pub idx: usize,
    pub color: Color,
}

/// A directed pattern edge between local vertex indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Edge {
    pub src: usize,
    pub targ: usize,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubGraph {
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    kids: Vec<Vec<usize>>,
    parents: Vec<Vec<usize>>,
}

impl SubGraph {
    /// The pattern without vertices, the root of the lattice.
    pub fn empty() -> Self {
        Self::from_parts(vec![], vec![])
    }

    /// Creates a pattern whose vertex `i` is colored `colors[i]`.
    ///
    /// The order is kept as is; use [`Builder::canonicalize`] to obtain
    /// a canonical pattern.
    pub(crate) fn from_parts(colors: Vec<Color>, edges: Vec<Edge>) -> Self {
        let vertices: Vec<Vertex> = colors
            .into_iter()
            .enumerate()
            .map(|(idx, color)| Vertex { idx, color })
            .collect();
        let mut kids = vec![vec![]; vertices.len()];
        let mut parents = vec![vec![]; vertices.len()];
        for (e, edge) in edges.iter().enumerate() {
            kids[edge.src].push(e);
            parents[edge.targ].push(e);
        }
        Self {
            vertices,
            edges,
            kids,
            parents,
        }
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Indices of the edges leaving `v`.
    pub fn kids(&self, v: usize) -> &[usize] {
        &self.kids[v]
    }

    /// Indices of the edges entering `v`.
    pub fn parents(&self, v: usize) -> &[usize] {
        &self.parents[v]
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// The lattice level: edges + 1, or 0 for the empty pattern.
    pub fn level(&self) -> usize {
        if self.vertices.is_empty() {
            0
        } else {
            self.edges.len() + 1
        }
    }

    pub fn has_edge(&self, src: usize, targ: usize, color: Color) -> bool {
        src < self.kids.len()
            && self.kids[src].iter().any(|&e| {
                let edge = &self.edges[e];
                edge.targ == targ && edge.color == color
            })
    }

    /// Whether the pattern is weakly connected.
    pub fn is_connected(&self) -> bool {
        if self.vertices.is_empty() {
            return true;
        }
        let mut seen = vec![false; self.vertices.len()];
        let mut queue = VecDeque::new();
        seen[0] = true;
        queue.push_back(0);
        while let Some(v) = queue.pop_front() {
            let out = self.kids[v].iter().map(|&e| self.edges[e].targ);
            let inc = self.parents[v].iter().map(|&e| self.edges[e].src);
            for n in out.chain(inc) {
                if !seen[n] {
                    seen[n] = true;
                    queue.push_back(n);
                }
            }
        }
        seen.into_iter().all(|x| x)
    }

    pub fn label(&self) -> Vec<u8> {
        let mut label =
            Vec::with_capacity(8 + 4 * self.vertices.len() + 12 * self.edges.len());
        label.extend_from_slice(&(self.edges.len() as u32).to_be_bytes());
        label.extend_from_slice(&(self.vertices.len() as u32).to_be_bytes());
        for v in &self.vertices {
            label.extend_from_slice(&v.color.to_be_bytes());
        }
        for e in &self.edges {
            label.extend_from_slice(&(e.src as u32).to_be_bytes());
            label.extend_from_slice(&(e.targ as u32).to_be_bytes());
            label.extend_from_slice(&e.color.to_be_bytes());
        }
        label
    }

    pub fn from_label(label: &[u8]) -> Result<Self> {
        let invalid = || Error::Invariant(format!("malformed pattern label {:?}", label));
        let num_edges = read_u32(label, 0).ok_or_else(invalid)? as usize;
        let num_vertices = read_u32(label, 4).ok_or_else(invalid)? as usize;
        if label.len() != 8 + 4 * num_vertices + 12 * num_edges {
            return Err(invalid());
        }
        let colors: Vec<Color> = (0..num_vertices)
            .map(|i| read_u32(label, 8 + 4 * i).ok_or_else(invalid))
            .collect::<Result<_>>()?;
        let base = 8 + 4 * num_vertices;
        let mut edges = Vec::with_capacity(num_edges);
        for i in 0..num_edges {
            let pos = base + 12 * i;
            let edge = Edge {
                src: read_u32(label, pos).ok_or_else(invalid)? as usize,
                targ: read_u32(label, pos + 4).ok_or_else(invalid)? as usize,
                color: read_u32(label, pos + 8).ok_or_else(invalid)?,
            };
            if edge.src >= num_vertices || edge.targ >= num_vertices {
                return Err(invalid());
            }
            edges.push(edge);
        }
        Ok(Self::from_parts(colors, edges))
    }

    pub fn builder(&self) -> Builder {
        Builder::from_subgraph(self)
    }

    /// Renders the pattern as `E:V(idx:label)...[src->targ:label]...`.
    pub fn display<'a>(&'a self, labels: &'a Labels) -> PatternDisplay<'a> {
        PatternDisplay {
            pattern: self,
            labels,
        }
    }
}

pub struct PatternDisplay<'a> {
    pattern: &'a SubGraph,
    labels: &'a Labels,
}

impl<'a> PatternDisplay<'a> {
    fn name(&self, color: Color) -> String {
        self.labels
            .name(color)
            .map_or_else(|| color.to_string(), String::from)
    }
}

impl<'a> fmt::Display for PatternDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}:{}{}{}",
            self.pattern.num_edges(),
            self.pattern.num_vertices(),
            self.pattern
                .vertices()
                .iter()
                .map(|v| format!("({}:{})", v.idx, self.name(v.color)))
                .join(""),
            self.pattern
                .edges()
                .iter()
                .map(|e| format!("[{}->{}:{}]", e.src, e.targ, self.name(e.color)))
                .join("")
        )
    }
}

pub(crate) fn read_u32(bytes: &[u8], pos: usize) -> Option<u32> {
    bytes.get(pos..pos + 4).map(|s| {
        let mut buf = [0; 4];
        buf.copy_from_slice(s);
        u32::from_be_bytes(buf)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_path() -> SubGraph {
        SubGraph::from_parts(
            vec![0, 1, 1],
            vec![
                Edge {
                    src: 0,
                    targ: 1,
                    color: 2,
                },
                Edge {
                    src: 1,
                    targ: 2,
                    color: 2,
                },
            ],
        )
    }

    #[test]
    fn test_label_round_trip() {
        let sg = create_path();
        let label = sg.label();
        assert_eq!(label.len(), 8 + 3 * 4 + 2 * 12);
        assert_eq!(SubGraph::from_label(&label).unwrap(), sg);
        assert_eq!(SubGraph::from_label(&label).unwrap().label(), label);
        assert_eq!(SubGraph::empty().label(), vec![0; 8]);
    }

    #[test]
    fn test_malformed_label() {
        assert!(SubGraph::from_label(&[0, 0, 0]).is_err());
        let mut label = create_path().label();
        label.pop();
        assert!(SubGraph::from_label(&label).is_err());
    }

    #[test]
    fn test_adjacency() {
        let sg = create_path();
        assert_eq!(sg.kids(1), &[1]);
        assert_eq!(sg.parents(1), &[0]);
        assert!(sg.has_edge(0, 1, 2));
        assert!(!sg.has_edge(1, 0, 2));
        assert!(sg.is_connected());
        assert_eq!(sg.level(), 3);
        assert_eq!(SubGraph::empty().level(), 0);
    }

    #[test]
    fn test_disconnected() {
        let sg = SubGraph::from_parts(
            vec![0, 0, 0],
            vec![Edge {
                src: 0,
                targ: 1,
                color: 0,
            }],
        );
        assert!(!sg.is_connected());
    }

    #[test]
    fn test_display() {
        let mut labels = Labels::new();
        labels.intern("black");
        labels.intern("red");
        labels.intern("");
        assert_eq!(
            create_path().display(&labels).to_string(),
            "2:3(0:black)(1:red)(2:red)[0->1:][1->2:]"
        );
    }
}
