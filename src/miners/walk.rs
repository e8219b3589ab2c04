use super::Miner;
use crate::{
    config::Config,
    error::{Error, Result},
    lattice::{DataType, Node},
    report::Reporter,
};
use crossbeam::channel::{bounded, select, Receiver, Sender};
use log::{debug, info};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;

/// A random walk over the lattice producing one candidate per run.
pub trait Walk<D: DataType>: Send + Sync {
    /// Walks once; `None` when the walk ended without a sample.
    fn sample(&self, dt: &D, rng: &mut ChaCha8Rng) -> Result<Option<D::Node>>;
}

/// Runs `walk` until told to stop. After each sample the producer blocks
/// on `terminate`, so no walk is wasted past the last accepted sample.
fn produce<D: DataType, W: Walk<D>>(
    dt: &D,
    walk: &W,
    seed: u64,
    samples: Sender<Option<D::Node>>,
    terminate: Receiver<bool>,
    errors: Sender<Error>,
) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    loop {
        match walk.sample(dt, &mut rng) {
            Ok(sample) => {
                if samples.send(sample).is_err() {
                    return;
                }
            }
            Err(e) => {
                let _ = errors.send(e);
                return;
            }
        }
        match terminate.recv() {
            Ok(false) => {}
            _ => return,
        }
    }
}

/// Draws samples from a [`Walk`] and reports the acceptable ones.
///
/// With `unique` set a label is reported at most once. Sampling fails
/// after `max_rejections` consecutive rejected samples.
pub struct RejectingWalk<W> {
    walk: W,
    samples: usize,
    unique: bool,
    max_rejections: usize,
    seed: u64,
}

impl<W> RejectingWalk<W> {
    pub fn new(walk: W, config: &Config) -> Self {
        Self {
            walk,
            samples: config.samples,
            unique: config.unique,
            max_rejections: config.max_rejections,
            seed: config.seed,
        }
    }

    fn consume<D: DataType>(
        &self,
        dt: &D,
        reporter: &mut dyn Reporter<D::Node>,
        samples: Receiver<Option<D::Node>>,
        terminate: Sender<bool>,
        errors: Receiver<Error>,
    ) -> Result<usize> {
        let mut seen: HashSet<Vec<u8>> = HashSet::new();
        let (mut accepted, mut rejected) = (0, 0);
        while accepted < self.samples {
            let sample = select! {
                recv(samples) -> msg => match msg {
                    Ok(sample) => sample,
                    Err(_) => {
                        return Err(errors.try_recv().unwrap_or_else(|_| {
                            Error::Sampling(String::from("the walk stopped"))
                        }))
                    }
                },
                recv(errors) -> msg => {
                    return Err(msg.unwrap_or_else(|_| {
                        Error::Sampling(String::from("the walk stopped"))
                    }))
                }
            };
            let node = sample.filter(|node| {
                dt.acceptable(node) && (!self.unique || seen.insert(node.label().to_vec()))
            });
            match node {
                Some(node) => {
                    debug!("sample {}: {}", accepted, node);
                    reporter.report(&node)?;
                    accepted += 1;
                    rejected = 0;
                }
                None => {
                    rejected += 1;
                    if rejected > self.max_rejections {
                        return Err(Error::Sampling(format!(
                            "{} samples in a row were rejected",
                            rejected
                        )));
                    }
                }
            }
            if terminate.send(accepted >= self.samples).is_err() {
                break;
            }
        }
        Ok(accepted)
    }
}

impl<D: DataType, W: Walk<D>> Miner<D> for RejectingWalk<W> {
    fn mine(&mut self, dt: &D, reporter: &mut dyn Reporter<D::Node>) -> Result<()> {
        let (samples_tx, samples_rx) = bounded(1);
        let (terminate_tx, terminate_rx) = bounded(1);
        let (errors_tx, errors_rx) = bounded(1);
        let (walk, seed) = (&self.walk, self.seed);
        let this = &*self;
        let sink = &mut *reporter;
        let accepted = crossbeam::thread::scope(|scope| {
            scope.spawn(move |_| produce(dt, walk, seed, samples_tx, terminate_rx, errors_tx));
            this.consume(dt, sink, samples_rx, terminate_tx, errors_rx)
        })
        .map_err(|_| Error::Worker(String::from("the walk thread panicked")))??;
        info!("{} samples accepted", accepted);
        reporter.close()
    }
}
