use crate::{
    error::{Error, Result},
    graph::{Direction, Graph},
    subgraph::{Embedding, SubGraph},
    types::VId,
};
use std::collections::{HashSet, VecDeque};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(u32);

/// A partial embedding: pattern vertex `sg_idx` is bound to host vertex
/// `emb_idx`, the rest of the binding is found by following `prev`.
#[derive(Debug, Clone, Copy)]
struct Chain {
    sg_idx: usize,
    emb_idx: VId,
    prev: Option<ChainId>,
}

/// Partial embeddings sharing their prefixes.
#[derive(Debug, Default)]
pub struct ChainArena {
    chains: Vec<Chain>,
}

impl ChainArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sg_idx: usize, emb_idx: VId, prev: Option<ChainId>) -> ChainId {
        let id = ChainId(self.chains.len() as u32);
        self.chains.push(Chain {
            sg_idx,
            emb_idx,
            prev,
        });
        id
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// The bindings of the chain ending in `id`, indexed by pattern vertex.
    pub fn bindings(&self, id: ChainId, len: usize) -> Vec<Option<VId>> {
        let mut bound = vec![None; len];
        let mut cur = Some(id);
        while let Some(ChainId(i)) = cur {
            let chain = &self.chains[i as usize];
            bound[chain.sg_idx] = Some(chain.emb_idx);
            cur = chain.prev;
        }
        bound
    }
}

/// Orders the pattern vertices so that every vertex but the first has an
/// edge to an earlier one, together with that anchor edge.
fn connected_order(pattern: &SubGraph) -> Result<Vec<(usize, Option<usize>)>> {
    let mut order = Vec::with_capacity(pattern.num_vertices());
    let mut seen = vec![false; pattern.num_vertices()];
    let mut queue = VecDeque::new();
    seen[0] = true;
    queue.push_back((0, None));
    while let Some((v, anchor)) = queue.pop_front() {
        order.push((v, anchor));
        let out = pattern.kids(v).iter().map(|&e| (e, pattern.edges()[e].targ));
        let inc = pattern.parents(v).iter().map(|&e| (e, pattern.edges()[e].src));
        for (e, n) in out.chain(inc) {
            if !seen[n] {
                seen[n] = true;
                queue.push_back((n, Some(e)));
            }
        }
    }
    if order.len() != pattern.num_vertices() {
        return Err(Error::Invariant(String::from(
            "embedding search needs a connected pattern",
        )));
    }
    Ok(order)
}

/// Finds every embedding of `pattern` in `graph`, sorted.
pub fn find_embeddings(graph: &Graph, pattern: &SubGraph) -> Result<Vec<Embedding>> {
    if pattern.is_empty() {
        return Ok(vec![]);
    }
    let len = pattern.num_vertices();
    let order = connected_order(pattern)?;
    let mut arena = ChainArena::new();
    let first = order[0].0;
    let unbound = vec![None; len];
    let mut frontier: Vec<ChainId> = graph
        .vertices_with_color(pattern.vertices()[first].color)
        .iter()
        .filter(|&&v| fits(graph, pattern, first, v, &unbound))
        .map(|&v| arena.push(first, v, None))
        .collect();
    for &(p, anchor) in &order[1..] {
        let anchor = match anchor {
            Some(e) => pattern.edges()[e],
            None => return Err(Error::Invariant(format!("vertex {} has no anchor", p))),
        };
        let color = pattern.vertices()[p].color;
        let mut next = vec![];
        for id in frontier {
            let bound = arena.bindings(id, len);
            let candidates = if anchor.targ == p {
                bound[anchor.src].map(|q| graph.neighbors(q, anchor.color, color, Direction::Out))
            } else {
                bound[anchor.targ].map(|q| graph.neighbors(q, anchor.color, color, Direction::In))
            };
            let used: HashSet<VId> = bound.iter().flatten().copied().collect();
            for &w in candidates.unwrap_or(&[]) {
                if !used.contains(&w) && fits(graph, pattern, p, w, &bound) {
                    next.push(arena.push(p, w, Some(id)));
                }
            }
        }
        frontier = next;
    }
    let mut embeddings: Vec<Embedding> = frontier
        .into_iter()
        .map(|id| {
            Embedding::new(
                arena
                    .bindings(id, len)
                    .into_iter()
                    .map(|v| v.unwrap_or(0))
                    .collect(),
            )
        })
        .collect();
    embeddings.sort_unstable();
    embeddings.dedup();
    Ok(embeddings)
}

/// Whether binding pattern vertex `p` to host vertex `w` keeps every edge
/// between `p` and the bound vertices.
fn fits(graph: &Graph, pattern: &SubGraph, p: usize, w: VId, bound: &[Option<VId>]) -> bool {
    let resolve = |v: usize| if v == p { Some(w) } else { bound[v] };
    let out = pattern.kids(p).iter().all(|&e| {
        let edge = pattern.edges()[e];
        resolve(edge.targ).map_or(true, |t| graph.has_edge(w, t, edge.color))
    });
    out && pattern.parents(p).iter().all(|&e| {
        let edge = pattern.edges()[e];
        resolve(edge.src).map_or(true, |s| graph.has_edge(s, w, edge.color))
    })
}

/// The minimum over pattern vertices of the number of distinct host
/// vertices bound to it.
pub fn min_image_support(len: usize, embeddings: &[Embedding]) -> usize {
    if embeddings.is_empty() {
        return 0;
    }
    (0..len)
        .map(|i| {
            embeddings
                .iter()
                .map(|emb| emb.get(i))
                .collect::<HashSet<_>>()
                .len()
        })
        .min()
        .unwrap_or_else(|| embeddings.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;
    use crate::subgraph::parse;

    fn create_graph() -> Graph {
        let mut builder = GraphBuilder::new();
        for (id, label) in &[(1, "a"), (2, "b"), (3, "b"), (4, "b")] {
            builder.add_vertex(*id, label);
        }
        builder.add_edge(1, 2, "x");
        builder.add_edge(1, 3, "x");
        builder.add_edge(2, 3, "x");
        builder.add_edge(3, 2, "x");
        builder.add_edge(4, 4, "x");
        builder.build()
    }

    #[test]
    fn test_arena() {
        let mut arena = ChainArena::new();
        let a = arena.push(1, 7, None);
        let b = arena.push(0, 9, Some(a));
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.bindings(b, 3), vec![Some(9), Some(7), None]);
    }

    #[test]
    fn test_find_embeddings() {
        let g = create_graph();
        let fork = parse("1:2(0:a)(1:b)[0->1:x]", g.labels()).unwrap();
        let embs = find_embeddings(&g, &fork).unwrap();
        assert_eq!(
            embs,
            vec![Embedding::new(vec![0, 1]), Embedding::new(vec![0, 2])]
        );
        assert_eq!(min_image_support(2, &embs), 1);
        let cycle = parse("2:2(0:b)(1:b)[0->1:x][1->0:x]", g.labels()).unwrap();
        assert_eq!(find_embeddings(&g, &cycle).unwrap().len(), 2);
        let lp = parse("1:1(0:b)[0->0:x]", g.labels()).unwrap();
        assert_eq!(
            find_embeddings(&g, &lp).unwrap(),
            vec![Embedding::new(vec![3])]
        );
    }

    #[test]
    fn test_min_image_support() {
        let embs = vec![
            Embedding::new(vec![1, 2]),
            Embedding::new(vec![1, 3]),
            Embedding::new(vec![4, 3]),
        ];
        assert_eq!(min_image_support(2, &embs), 2);
        assert_eq!(min_image_support(2, &[]), 0);
    }
}
