use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("energy {energy} MeV is outside the model domain [{emin}, {emax}] MeV")]
    Domain { energy: f64, emin: f64, emax: f64 },

    #[error("{what} failed to converge after {iterations} iterations")]
    Convergence {
        what: &'static str,
        iterations: usize,
    },

    #[error("unreachable path request: {0}")]
    Range(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("parse error on line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("could not read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("bad configuration in '{}': {source}", path.display())]
    Config {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl Error {
    pub(crate) fn domain(energy: f64, emin: f64, emax: f64) -> Self {
        Error::Domain { energy, emin, emax }
    }

    pub(crate) fn parse(line: usize, reason: impl Into<String>) -> Self {
        Error::Parse {
            line,
            reason: reason.into(),
        }
    }

    pub fn is_domain(&self) -> bool {
        matches!(*self, Error::Domain { .. })
    }

    pub fn is_range(&self) -> bool {
        matches!(*self, Error::Range(_))
    }

    pub fn is_convergence(&self) -> bool {
        matches!(*self, Error::Convergence { .. })
    }
}

/// Check that `e` lies inside `[emin, emax]`; NaN never does.
pub(crate) fn check_domain(e: f64, emin: f64, emax: f64) -> Result<()> {
    if e >= emin && e <= emax {
        Ok(())
    } else {
        Err(Error::domain(e, emin, emax))
    }
}
