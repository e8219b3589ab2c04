//! Sinks for mined and sampled nodes.

use crate::{error::Result, lattice::Node};
use log::info;
use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

pub trait Reporter<N: Node>: Send {
    fn report(&mut self, node: &N) -> Result<()>;

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Keeps every reported node.
#[derive(Debug)]
pub struct CollectReporter<N> {
    nodes: Vec<N>,
}

impl<N> Default for CollectReporter<N> {
    fn default() -> Self {
        Self { nodes: vec![] }
    }
}

impl<N> CollectReporter<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[N] {
        &self.nodes
    }

    pub fn into_nodes(self) -> Vec<N> {
        self.nodes
    }
}

impl<N: Node> Reporter<N> for CollectReporter<N> {
    fn report(&mut self, node: &N) -> Result<()> {
        self.nodes.push(node.clone());
        Ok(())
    }
}

/// Logs every node with its support.
#[derive(Debug, Default)]
pub struct LogReporter {
    count: usize,
}

impl LogReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<N: Node> Reporter<N> for LogReporter {
    fn report(&mut self, node: &N) -> Result<()> {
        self.count += 1;
        info!("{} support {}", node, node.support()?);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        info!("{} nodes reported", self.count);
        Ok(())
    }
}

/// Writes one `pattern<TAB>support` line per node.
pub struct FileReporter {
    out: BufWriter<Box<dyn Write + Send>>,
}

impl FileReporter {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::from_writer(Box::new(File::create(path)?)))
    }

    pub fn stdout() -> Self {
        Self::from_writer(Box::new(io::stdout()))
    }

    pub fn from_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            out: BufWriter::new(writer),
        }
    }
}

impl<N: Node> Reporter<N> for FileReporter {
    fn report(&mut self, node: &N) -> Result<()> {
        writeln!(self.out, "{}\t{}", node, node.support()?)?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

/// Forwards every node to each reporter in turn.
pub struct ChainReporter<N> {
    reporters: Vec<Box<dyn Reporter<N>>>,
}

impl<N: Node> ChainReporter<N> {
    pub fn new(reporters: Vec<Box<dyn Reporter<N>>>) -> Self {
        Self { reporters }
    }
}

impl<N: Node> Reporter<N> for ChainReporter<N> {
    fn report(&mut self, node: &N) -> Result<()> {
        for reporter in &mut self.reporters {
            reporter.report(node)?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        for reporter in &mut self.reporters {
            reporter.close()?;
        }
        Ok(())
    }
}

/// Drops nodes whose label was already reported.
pub struct UniqueReporter<R> {
    inner: R,
    seen: HashSet<Vec<u8>>,
}

impl<R> UniqueReporter<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            seen: HashSet::new(),
        }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<N: Node, R: Reporter<N>> Reporter<N> for UniqueReporter<R> {
    fn report(&mut self, node: &N) -> Result<()> {
        if self.seen.insert(node.label().to_vec()) {
            self.inner.report(node)
        } else {
            Ok(())
        }
    }

    fn close(&mut self) -> Result<()> {
        self.inner.close()
    }
}
