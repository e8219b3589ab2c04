//! Error management.

use derive_more::Display;

#[derive(Debug, Display)]
pub enum Error {
    /// A structural invariant of the lattice does not hold.
    #[display(fmt = "invariant violated: {}", _0)]
    Invariant(String),
    /// A numerical result is outside of its domain.
    #[display(fmt = "computation error: {}", _0)]
    Computation(String),
    #[display(fmt = "store error: {}", _0)]
    Store(rusqlite::Error),
    #[display(fmt = "store is closed")]
    StoreClosed,
    #[display(fmt = "io error: {}", _0)]
    Io(std::io::Error),
    #[display(fmt = "parse error: {}", _0)]
    Parse(String),
    #[display(fmt = "invalid configuration: {}", _0)]
    Config(String),
    #[display(fmt = "worker failed: {}", _0)]
    Worker(String),
    #[display(fmt = "sampling failed: {}", _0)]
    Sampling(String),
}

impl std::error::Error for Error {}

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        Error::Store(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl<R: pest::RuleType> From<pest::error::Error<R>> for Error {
    fn from(e: pest::error::Error<R>) -> Self {
        Error::Parse(e.to_string())
    }
}

impl From<rayon::ThreadPoolBuildError> for Error {
    fn from(e: rayon::ThreadPoolBuildError) -> Self {
        Error::Worker(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
