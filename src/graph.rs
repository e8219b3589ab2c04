//! The colored host graph.

use crate::types::{Color, ExternalId, VId};
use derive_more::Display;
use log::info;
use rayon::slice::ParallelSliceMut;
use std::collections::HashMap;

/// The table of interned label text.
///
/// Vertex and edge labels share one table, so a color is meaningful for
/// both.
#[derive(Debug, Clone, Default)]
pub struct Labels {
    names: Vec<String>,
    colors: HashMap<String, Color>,
}

impl Labels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, name: &str) -> Color {
        if let Some(&color) = self.colors.get(name) {
            return color;
        }
        let color = self.names.len() as Color;
        self.names.push(String::from(name));
        self.colors.insert(String::from(name), color);
        color
    }

    pub fn color(&self, name: &str) -> Option<Color> {
        self.colors.get(name).copied()
    }

    pub fn name(&self, color: Color) -> Option<&str> {
        self.names.get(color as usize).map(|name| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// A directed, colored edge of the host graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HostEdge {
    pub src: VId,
    pub targ: VId,
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Out,
    In,
}

#[derive(Debug, Display, PartialEq, Eq)]
#[display(fmt = "{} {} {} {}", num_vertices, num_edges, num_vlabels, num_elabels)]
pub struct GraphInfo {
    num_vertices: usize,
    num_edges: usize,
    num_vlabels: usize,
    num_elabels: usize,
}

impl GraphInfo {
    pub fn num_vertices(&self) -> usize {
        self.num_vertices
    }

    pub fn num_edges(&self) -> usize {
        self.num_edges
    }
}

/// Collects vertices and edges before the indices are built.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    labels: Labels,
    vids: HashMap<ExternalId, VId>,
    ids: Vec<ExternalId>,
    colors: Vec<Color>,
    edges: Vec<HostEdge>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a vertex, relabelling it if it was already added.
    pub fn add_vertex(&mut self, id: ExternalId, label: &str) -> VId {
        let color = self.labels.intern(label);
        match self.vids.get(&id) {
            Some(&v) => {
                self.colors[v] = color;
                v
            }
            None => {
                let v = self.ids.len();
                self.vids.insert(id, v);
                self.ids.push(id);
                self.colors.push(color);
                v
            }
        }
    }

    /// Adds an arc between two known vertices.
    ///
    /// Returns `false` if either endpoint is unknown.
    pub fn add_edge(&mut self, src: ExternalId, dst: ExternalId, label: &str) -> bool {
        if let (Some(&src), Some(&targ)) = (self.vids.get(&src), self.vids.get(&dst)) {
            let color = self.labels.intern(label);
            self.edges.push(HostEdge { src, targ, color });
            true
        } else {
            false
        }
    }

    pub fn build(self) -> Graph {
        let GraphBuilder {
            labels,
            ids,
            colors,
            mut edges,
            ..
        } = self;
        info!("indexing {} vertices...", colors.len());
        let mut by_color: HashMap<Color, Vec<VId>> = HashMap::new();
        for (v, &color) in colors.iter().enumerate() {
            by_color.entry(color).or_insert_with(Vec::new).push(v);
        }
        info!("indexing {} edges...", edges.len());
        edges.par_sort_unstable();
        edges.dedup();
        let mut kids = vec![vec![]; colors.len()];
        let mut parents = vec![vec![]; colors.len()];
        let mut edge_colors: HashMap<Color, usize> = HashMap::new();
        let mut out_index: HashMap<(VId, Color, Color), Vec<VId>> = HashMap::new();
        let mut in_index: HashMap<(VId, Color, Color), Vec<VId>> = HashMap::new();
        for &edge in &edges {
            kids[edge.src].push(edge);
            parents[edge.targ].push(edge);
            *edge_colors.entry(edge.color).or_insert(0) += 1;
            out_index
                .entry((edge.src, edge.color, colors[edge.targ]))
                .or_insert_with(Vec::new)
                .push(edge.targ);
            in_index
                .entry((edge.targ, edge.color, colors[edge.src]))
                .or_insert_with(Vec::new)
                .push(edge.src);
        }
        info!("indexed");
        Graph {
            labels,
            ids,
            colors,
            kids,
            parents,
            by_color,
            edge_colors,
            out_index,
            in_index,
            num_edges: edges.len(),
        }
    }
}

/// The immutable host graph and its indices.
///
/// Every query is read-only, so a graph can be shared between mining
/// threads without locking.
#[derive(Debug)]
pub struct Graph {
    labels: Labels,
    ids: Vec<ExternalId>,
    colors: Vec<Color>,
    kids: Vec<Vec<HostEdge>>,
    parents: Vec<Vec<HostEdge>>,
    by_color: HashMap<Color, Vec<VId>>,
    edge_colors: HashMap<Color, usize>,
    out_index: HashMap<(VId, Color, Color), Vec<VId>>,
    in_index: HashMap<(VId, Color, Color), Vec<VId>>,
    num_edges: usize,
}

impl Graph {
    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    pub fn num_vertices(&self) -> usize {
        self.colors.len()
    }

    pub fn num_edges(&self) -> usize {
        self.num_edges
    }

    pub fn color(&self, v: VId) -> Color {
        self.colors[v]
    }

    /// The id the vertex had in the graph source.
    pub fn external_id(&self, v: VId) -> ExternalId {
        self.ids[v]
    }

    /// The number of vertices with `color`.
    pub fn color_frequency(&self, color: Color) -> usize {
        self.by_color.get(&color).map_or(0, |vs| vs.len())
    }

    /// The number of edges with `color`.
    pub fn edge_color_frequency(&self, color: Color) -> usize {
        self.edge_colors.get(&color).copied().unwrap_or(0)
    }

    /// The vertex colors present in the graph, ascending.
    pub fn vertex_colors(&self) -> Vec<Color> {
        let mut colors: Vec<Color> = self.by_color.keys().copied().collect();
        colors.sort_unstable();
        colors
    }

    pub fn vertices_with_color(&self, color: Color) -> &[VId] {
        self.by_color
            .get(&color)
            .map(|vs| vs.as_slice())
            .unwrap_or(&[])
    }

    /// The outgoing edges of `v`.
    pub fn kids(&self, v: VId) -> &[HostEdge] {
        &self.kids[v]
    }

    /// The incoming edges of `v`.
    pub fn parents(&self, v: VId) -> &[HostEdge] {
        &self.parents[v]
    }

    /// The neighbors of `v` reached over an edge colored `edge_color` whose
    /// far endpoint is colored `neighbor_color`.
    pub fn neighbors(
        &self,
        v: VId,
        edge_color: Color,
        neighbor_color: Color,
        direction: Direction,
    ) -> &[VId] {
        let index = match direction {
            Direction::Out => &self.out_index,
            Direction::In => &self.in_index,
        };
        index
            .get(&(v, edge_color, neighbor_color))
            .map(|vs| vs.as_slice())
            .unwrap_or(&[])
    }

    pub fn has_edge(&self, src: VId, targ: VId, color: Color) -> bool {
        self.kids[src]
            .binary_search(&HostEdge { src, targ, color })
            .is_ok()
    }

    pub fn info(&self) -> GraphInfo {
        GraphInfo {
            num_vertices: self.num_vertices(),
            num_edges: self.num_edges,
            num_vlabels: self.by_color.len(),
            num_elabels: self.edge_colors.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_triangle() -> Graph {
        let mut builder = GraphBuilder::new();
        builder.add_vertex(1, "a");
        builder.add_vertex(2, "b");
        builder.add_vertex(3, "b");
        assert!(builder.add_edge(1, 2, "x"));
        assert!(builder.add_edge(1, 3, "x"));
        assert!(builder.add_edge(2, 3, "y"));
        assert!(builder.add_edge(2, 3, "y"));
        assert!(!builder.add_edge(2, 4, "y"));
        builder.build()
    }

    #[test]
    fn test_frequencies() {
        let g = create_triangle();
        let (a, b) = (
            g.labels().color("a").unwrap(),
            g.labels().color("b").unwrap(),
        );
        let (x, y) = (
            g.labels().color("x").unwrap(),
            g.labels().color("y").unwrap(),
        );
        assert_eq!(g.color_frequency(a), 1);
        assert_eq!(g.color_frequency(b), 2);
        assert_eq!(g.edge_color_frequency(x), 2);
        assert_eq!(g.edge_color_frequency(y), 1);
        assert_eq!(g.vertices_with_color(b), &[1, 2]);
        assert_eq!(g.info().to_string(), "3 3 2 2");
    }

    #[test]
    fn test_adjacency() {
        let g = create_triangle();
        let (b, x, y) = (
            g.labels().color("b").unwrap(),
            g.labels().color("x").unwrap(),
            g.labels().color("y").unwrap(),
        );
        assert_eq!(g.kids(0).len(), 2);
        assert_eq!(g.parents(2).len(), 2);
        assert_eq!(g.neighbors(0, x, b, Direction::Out), &[1, 2]);
        assert_eq!(g.neighbors(2, y, b, Direction::In), &[1]);
        assert!(g.neighbors(2, x, b, Direction::Out).is_empty());
        assert!(g.has_edge(1, 2, y));
        assert!(!g.has_edge(2, 1, y));
        assert_eq!(g.external_id(2), 3);
    }
}
