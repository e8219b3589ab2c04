//! Canonical vertex and edge orders.
//!
//! The lattice only relies on [`CanonicalOracle`] being deterministic and
//! total: isomorphic inputs must yield the same canonical pattern. The
//! bundled [`RefiningOracle`] refines colors to an equitable partition and
//! individualizes vertices of the first non-singleton cell, keeping the
//! least encoding over all leaves of the search tree.

use crate::{
    subgraph::{Edge, SubGraph},
    types::Color,
};
use std::collections::HashSet;

pub trait CanonicalOracle: Send + Sync {
    /// Returns `(vord, eord)`: canonical vertex `k` is input vertex
    /// `vord[k]` and canonical edge `k` is input edge `eord[k]`.
    fn canonical_permutation(&self, colors: &[Color], edges: &[Edge]) -> (Vec<usize>, Vec<usize>);
}

type Encoding = (Vec<Color>, Vec<(usize, usize, Color)>);

struct Colored<'a> {
    colors: &'a [Color],
    edges: &'a [Edge],
    out: Vec<Vec<(Color, usize)>>,
    inc: Vec<Vec<(Color, usize)>>,
    edge_set: HashSet<(usize, usize, Color)>,
}

impl<'a> Colored<'a> {
    fn new(colors: &'a [Color], edges: &'a [Edge]) -> Self {
        let mut out = vec![vec![]; colors.len()];
        let mut inc = vec![vec![]; colors.len()];
        let mut edge_set = HashSet::with_capacity(edges.len());
        for e in edges {
            out[e.src].push((e.color, e.targ));
            inc[e.targ].push((e.color, e.src));
            edge_set.insert((e.src, e.targ, e.color));
        }
        Self {
            colors,
            edges,
            out,
            inc,
            edge_set,
        }
    }

    fn len(&self) -> usize {
        self.colors.len()
    }

    /// Splits cells by the colored neighbourhoods of their vertices until
    /// the partition is equitable.
    fn refine(&self, mut cells: Vec<usize>) -> Vec<usize> {
        let mut num_cells = count_cells(&cells);
        loop {
            let signatures: Vec<_> = (0..self.len())
                .map(|v| {
                    let mut out: Vec<(Color, usize)> =
                        self.out[v].iter().map(|&(c, n)| (c, cells[n])).collect();
                    let mut inc: Vec<(Color, usize)> =
                        self.inc[v].iter().map(|&(c, n)| (c, cells[n])).collect();
                    out.sort_unstable();
                    inc.sort_unstable();
                    (cells[v], out, inc)
                })
                .collect();
            cells = rank(&signatures);
            let refined = count_cells(&cells);
            if refined == num_cells {
                return cells;
            }
            num_cells = refined;
        }
    }

    fn individualize(&self, cells: &[usize], v: usize) -> Vec<usize> {
        let keys: Vec<(usize, bool)> = cells
            .iter()
            .enumerate()
            .map(|(w, &cell)| (cell, w != v))
            .collect();
        self.refine(rank(&keys))
    }

    /// Whether swapping `u` and `v` maps the graph onto itself.
    fn swappable(&self, u: usize, v: usize) -> bool {
        if self.colors[u] != self.colors[v] {
            return false;
        }
        let swap = |x: usize| {
            if x == u {
                v
            } else if x == v {
                u
            } else {
                x
            }
        };
        self.edges
            .iter()
            .all(|e| self.edge_set.contains(&(swap(e.src), swap(e.targ), e.color)))
    }

    fn encode(&self, vord: &[usize]) -> Encoding {
        let position = inverse(vord);
        let colors = vord.iter().map(|&v| self.colors[v]).collect();
        let mut edges: Vec<_> = self
            .edges
            .iter()
            .map(|e| (position[e.src], position[e.targ], e.color))
            .collect();
        edges.sort_unstable();
        (colors, edges)
    }

    fn search(&self, cells: Vec<usize>, best: &mut Option<(Encoding, Vec<usize>)>) {
        if count_cells(&cells) == self.len() {
            let mut vord = vec![0; self.len()];
            for (v, &cell) in cells.iter().enumerate() {
                vord[cell] = v;
            }
            let encoding = self.encode(&vord);
            let better = match best {
                Some((current, _)) => encoding < *current,
                None => true,
            };
            if better {
                *best = Some((encoding, vord));
            }
            return;
        }
        let mut sizes = vec![0; self.len()];
        for &cell in &cells {
            sizes[cell] += 1;
        }
        let target = match sizes.iter().position(|&size| size > 1) {
            Some(target) => target,
            None => return,
        };
        let mut tried: Vec<usize> = vec![];
        for v in (0..self.len()).filter(|&v| cells[v] == target) {
            if tried.iter().any(|&u| self.swappable(u, v)) {
                continue;
            }
            tried.push(v);
            self.search(self.individualize(&cells, v), best);
        }
    }
}

fn rank<K: Ord + Clone>(keys: &[K]) -> Vec<usize> {
    let mut distinct: Vec<K> = keys.to_vec();
    distinct.sort();
    distinct.dedup();
    keys.iter()
        .map(|key| distinct.binary_search(key).unwrap_or(0))
        .collect()
}

fn count_cells(cells: &[usize]) -> usize {
    cells.iter().collect::<HashSet<_>>().len()
}

fn inverse(vord: &[usize]) -> Vec<usize> {
    let mut position = vec![0; vord.len()];
    for (k, &v) in vord.iter().enumerate() {
        position[v] = k;
    }
    position
}

/// Color refinement with individualization.
#[derive(Debug, Clone, Copy, Default)]
pub struct RefiningOracle;

impl RefiningOracle {
    pub fn new() -> Self {
        RefiningOracle
    }
}

impl CanonicalOracle for RefiningOracle {
    fn canonical_permutation(&self, colors: &[Color], edges: &[Edge]) -> (Vec<usize>, Vec<usize>) {
        let graph = Colored::new(colors, edges);
        let mut best = None;
        graph.search(graph.refine(rank(colors)), &mut best);
        let vord = best.map_or_else(Vec::new, |(_, vord)| vord);
        let position = inverse(&vord);
        let mut eord: Vec<usize> = (0..edges.len()).collect();
        eord.sort_by_key(|&e| {
            let edge = &edges[e];
            (position[edge.src], position[edge.targ], edge.color, e)
        });
        (vord, eord)
    }
}

/// The unique parent through which the lattice spanning tree reaches `sg`.
///
/// It drops the last canonical edge whose removal keeps the pattern
/// connected, together with a vertex left isolated. A 2-vertex, 1-edge
/// pattern keeps its canonical vertex 0 and a singleton's parent is the
/// empty pattern. `None` for the empty pattern.
pub fn canonical_parent(sg: &SubGraph, oracle: &dyn CanonicalOracle) -> Option<SubGraph> {
    if sg.is_empty() {
        return None;
    }
    if sg.num_edges() == 0 {
        return Some(SubGraph::empty());
    }
    (0..sg.num_edges())
        .rev()
        .map(|e| sg.builder().remove_edge(e))
        .find(|builder| builder.is_connected())
        .map(|builder| builder.canonicalize(oracle).0)
}

/// Whether `child` hangs below `parent` in the lattice spanning tree.
pub fn is_canonical_extension(
    parent: &SubGraph,
    child: &SubGraph,
    oracle: &dyn CanonicalOracle,
) -> bool {
    canonical_parent(child, oracle).map_or(false, |p| p.label() == parent.label())
}
