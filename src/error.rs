#![warn(missing_docs)]
//! Paralens specific error structures
use std::{error::Error, fmt::Display};

/// Paralens application specific Result type
pub type PlResult<T> = std::result::Result<T, ParalensError>;

/// Errors that can be returned by the various paralens functions.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ParalensError {
    /// malformed lens prescription: zero radius, bad surface range, unordered surfaces, ...
    InvalidGeometry(String),
    /// afocal / zero-power configuration leading to a division by a zero matrix element
    DegenerateSystem(String),
    /// a pupil calculation was requested but no surface is flagged as the aperture stop
    MissingStop(String),
    /// attempt to set a derived aperture quantity while the other one is authoritative
    InvalidMutation(String),
    /// errors during ray-aggregate analysis (missing keys, shape mismatch, empty data)
    Analysis(String),
    /// errors not falling in one of the categories above
    Other(String),
}

impl Display for ParalensError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidGeometry(m) => {
                write!(f, "InvalidGeometry:{m}")
            }
            Self::DegenerateSystem(m) => {
                write!(f, "DegenerateSystem:{m}")
            }
            Self::MissingStop(m) => {
                write!(f, "MissingStop:{m}")
            }
            Self::InvalidMutation(m) => {
                write!(f, "InvalidMutation:{m}")
            }
            Self::Analysis(m) => {
                write!(f, "Analysis:{m}")
            }
            Self::Other(m) => write!(f, "Paralens Error:Other:{m}"),
        }
    }
}
impl Error for ParalensError {}

impl std::convert::From<String> for ParalensError {
    fn from(msg: String) -> Self {
        Self::Other(msg)
    }
}
