use super::Miner;
use crate::{
    config::Config,
    error::{Error, Result},
    lattice::{DataType, Node},
    report::Reporter,
    stack::ConcurrentStack,
};
use crossbeam::channel::{bounded, Receiver, Sender};
use log::{debug, info};
use parking_lot::Mutex;

/// Parallel traversal of the canonical spanning tree of the lattice.
///
/// Workers only follow canonical kids, so every node is expanded once and
/// no seen-set is needed. Reports go through a bounded channel to a single
/// consumer.
pub struct Vsigram {
    workers: usize,
    report_buffer: usize,
}

impl Vsigram {
    pub fn new(workers: usize, report_buffer: usize) -> Self {
        Self {
            workers,
            report_buffer,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.workers, config.report_buffer)
    }
}

fn expand<D: DataType>(
    dt: &D,
    node: &D::Node,
    stack: &ConcurrentStack<D::Node>,
    reports: &Sender<D::Node>,
) -> Result<()> {
    if dt.acceptable(node) {
        reports
            .send(node.clone())
            .map_err(|_| Error::Worker(String::from("report channel is closed")))?;
    }
    let kids = node.canon_kids()?;
    debug!("{} canonical kids of {}", kids.len(), node);
    stack.extend(kids);
    Ok(())
}

fn work<D: DataType>(
    dt: &D,
    stack: &ConcurrentStack<D::Node>,
    reports: Sender<D::Node>,
    errors: &Mutex<Vec<Error>>,
) {
    while let Some(node) = stack.pop() {
        if let Err(e) = expand(dt, &node, stack, &reports) {
            errors.lock().push(e);
            stack.close();
        }
    }
}

/// Reports until every sender is gone. After a failure the remaining
/// nodes are drained so no worker blocks on a full channel.
fn consume<N: Node>(
    reports: Receiver<N>,
    reporter: &mut dyn Reporter<N>,
    stack: &ConcurrentStack<N>,
    errors: &Mutex<Vec<Error>>,
) -> usize {
    let mut count = 0;
    let mut failed = false;
    for node in reports.iter() {
        if failed {
            continue;
        }
        match reporter.report(&node) {
            Ok(()) => count += 1,
            Err(e) => {
                errors.lock().push(e);
                stack.close();
                failed = true;
            }
        }
    }
    count
}

impl<D: DataType> Miner<D> for Vsigram {
    fn mine(&mut self, dt: &D, reporter: &mut dyn Reporter<D::Node>) -> Result<()> {
        let workers = self.workers;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()?;
        let stack = ConcurrentStack::new(dt.root()?.canon_kids()?);
        let errors = Mutex::new(vec![]);
        let (sender, receiver) = bounded(self.report_buffer);
        info!("vsigram with {} workers", workers);
        let sink = &mut *reporter;
        let reported = crossbeam::thread::scope(|scope| {
            let (stack, errors) = (&stack, &errors);
            let consumer = scope.spawn(move |_| consume(receiver, sink, stack, errors));
            pool.scope(|s| {
                for _ in 0..workers {
                    stack.register();
                }
                for _ in 0..workers {
                    let sender = sender.clone();
                    s.spawn(move |_| work(dt, stack, sender, errors));
                }
            });
            drop(sender);
            consumer.join()
        })
        .and_then(|joined| joined)
        .map_err(|_| Error::Worker(String::from("a vsigram thread panicked")))?;
        if let Some(e) = errors.into_inner().into_iter().next() {
            return Err(e);
        }
        info!("vsigram reported {} nodes", reported);
        reporter.close()
    }
}
