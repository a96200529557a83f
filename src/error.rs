use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AlignError {
    #[error("dynamic programming matrix of {rows}x{columns} cells does not fit in memory")]
    MatrixTooLarge { rows: usize, columns: usize },
}

pub type AlignResult<T> = Result<T, AlignError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid gap penalties (open {open}, extension {extension}): need open <= extension <= 0")]
    InvalidGapPenalties { open: f64, extension: f64 },
    #[error("invalid mismatch penalty {0}: must be finite and <= 0")]
    InvalidMismatch(f64),
    #[error("hash sample count must be positive")]
    InvalidHashSamples,
    #[error("cannot read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
