//! Custom error types for the I/O module.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IoError {
    #[error("file is {found} bytes, over the {limit}-byte limit")]
    FileTooLarge { limit: u64, found: u64 },

    #[error("underlying I/O error")]
    StdIo(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, IoError>;
