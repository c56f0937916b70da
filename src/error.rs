use std::result;

use thiserror::Error;

pub type Result<T> = result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// A page request did not come back with a usable response.
    #[error("page {page} failed (status {status:?}): {reason}")]
    Transport {
        page: u32,
        status: Option<u16>,
        reason: String,
    },
    #[error("data format: {0}")]
    DataFormat(String),
    #[error("empty input: {0}")]
    EmptyInput(&'static str),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("config: {0}")]
    Config(String),
}

impl Error {
    pub fn data_format(msg: impl Into<String>) -> Self {
        Error::DataFormat(msg.into())
    }
}
