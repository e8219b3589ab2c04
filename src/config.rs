//! Mining configuration.

use crate::error::{Error, Result};
use crate::store::StoreType;
use std::path::PathBuf;

/// How a lattice node obtains its embeddings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Embeddings are kept with the node and persisted in the cache.
    EmbList,
    /// Only patterns are cached; embeddings are searched for on demand.
    Search,
}

impl Backend {
    pub fn new(backend: &str) -> Result<Self> {
        match backend {
            "emb-list" => Ok(Backend::EmbList),
            "search" => Ok(Backend::Search),
            _ => Err(Error::Config(format!("unknown backend {:?}", backend))),
        }
    }
}

/// The lattice and miner settings.
///
/// ```
/// use sfp::config::Config;
///
/// let config = Config::default().support(3).max_edges(4).workers(2);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub support: usize,
    pub min_edges: usize,
    pub max_edges: usize,
    pub min_vertices: usize,
    pub max_vertices: usize,
    pub backend: Backend,
    pub store: StoreType,
    pub workers: usize,
    pub samples: usize,
    pub unique: bool,
    pub seed: u64,
    pub report_buffer: usize,
    pub max_rejections: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            support: 2,
            min_edges: 0,
            max_edges: usize::MAX,
            min_vertices: 1,
            max_vertices: usize::MAX,
            backend: Backend::EmbList,
            store: StoreType::Mem,
            workers: rayon::current_num_threads(),
            samples: 1,
            unique: false,
            seed: 42,
            report_buffer: 100,
            max_rejections: 10_000,
        }
    }
}

impl Config {
    pub fn support(mut self, support: usize) -> Self {
        self.support = support;
        self
    }

    pub fn min_edges(mut self, min_edges: usize) -> Self {
        self.min_edges = min_edges;
        self
    }

    pub fn max_edges(mut self, max_edges: usize) -> Self {
        self.max_edges = max_edges;
        self
    }

    pub fn min_vertices(mut self, min_vertices: usize) -> Self {
        self.min_vertices = min_vertices;
        self
    }

    pub fn max_vertices(mut self, max_vertices: usize) -> Self {
        self.max_vertices = max_vertices;
        self
    }

    pub fn backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    /// Persist the lattice caches as SQLite files under `directory`.
    pub fn cache_dir<P: Into<PathBuf>>(mut self, directory: P) -> Self {
        self.store = StoreType::Sqlite(directory.into());
        self
    }

    pub fn store(mut self, store: StoreType) -> Self {
        self.store = store;
        self
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn samples(mut self, samples: usize) -> Self {
        self.samples = samples;
        self
    }

    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn report_buffer(mut self, report_buffer: usize) -> Self {
        self.report_buffer = report_buffer;
        self
    }

    pub fn max_rejections(mut self, max_rejections: usize) -> Self {
        self.max_rejections = max_rejections;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.support == 0 {
            return Err(Error::Config(String::from("support must be positive")));
        }
        if self.min_edges > self.max_edges {
            return Err(Error::Config(format!(
                "min_edges {} exceeds max_edges {}",
                self.min_edges, self.max_edges
            )));
        }
        if self.min_vertices > self.max_vertices {
            return Err(Error::Config(format!(
                "min_vertices {} exceeds max_vertices {}",
                self.min_vertices, self.max_vertices
            )));
        }
        if self.workers == 0 {
            return Err(Error::Config(String::from("at least one worker is needed")));
        }
        if self.report_buffer == 0 {
            return Err(Error::Config(String::from("report_buffer must be positive")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_bounds() {
        assert!(Config::default().support(0).validate().is_err());
        assert!(Config::default()
            .min_edges(3)
            .max_edges(2)
            .validate()
            .is_err());
        assert!(Config::default()
            .min_vertices(4)
            .max_vertices(1)
            .validate()
            .is_err());
        assert!(Config::default().workers(0).validate().is_err());
    }

    #[test]
    fn test_backend_new() {
        assert_eq!(Backend::new("search").unwrap(), Backend::Search);
        assert_eq!(Backend::new("emb-list").unwrap(), Backend::EmbList);
        assert!(Backend::new("itemset").is_err());
    }
}
