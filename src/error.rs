//! Error types.

use thiserror::Error;

/// Error represents a failure while decoding ownership data or building
/// match patterns from it.
#[derive(Debug, Error)]
pub enum Error {
    /// A required ownership tree was absent.
    #[error("ownership tree is empty")]
    EmptyTree,

    /// The wire form of an ownership tree could not be decoded.
    #[error("decode failure: {message}")]
    Decode { message: String },

    /// The composite match pattern could not be compiled.
    #[error("invalid match pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// An input document could not be read as a record list.
    #[error("invalid input: {message}")]
    Input { message: String },
}

impl Error {
    /// Creates a decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        Error::Decode {
            message: message.into(),
        }
    }

    /// Creates an input error.
    pub fn input(message: impl Into<String>) -> Self {
        Error::Input {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
