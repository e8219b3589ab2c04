//! Frequent subgraph pattern mining and sampling over a colored host graph.

pub mod cache;
pub mod canon;
pub mod config;
pub mod digraph;
pub mod error;
pub mod graph;
pub mod lattice;
pub mod loader;
pub mod miners;
pub mod report;
pub mod search;
pub mod stack;
pub mod store;
pub mod subgraph;
pub mod types;
