use std::{
    fmt::{self, Display, Formatter},
    io::{self, ErrorKind},
};

use thiserror::Error;

use crate::fourcc::FourCC;
use crate::resolver::SizeRole;

/// * The error info from `std::io::Error` but this must contains the message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IOErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
}

impl IOErrorInfo {
    pub fn new(kind: ErrorKind, message: String) -> Self {
        Self { kind, message }
    }
}

/// * The errors that stop a walk. After one of these is yielded the walker yields nothing more.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalkError {
    #[error("Unknown master chunk identifier \"{0}\"")]
    UnknownMaster(FourCC),

    #[error("Invalid structure: {0}")]
    Structural(String),

    #[error("The \"{id}\" chunk at 0x{offset:x} declares {declared} bytes, but only {available} bytes remain")]
    Truncated {
        id: FourCC,
        offset: u64,
        declared: u64,
        available: u64,
    },

    #[error("The \"{id}\" chunk has a placeholder size, but the size table has no {role} entry")]
    UnresolvedSize { id: FourCC, role: SizeRole },

    #[error("IO error: {0:?}")]
    IOError(IOErrorInfo),
}

impl WalkError {
    pub fn is_truncation(&self) -> bool {
        matches!(self, Self::Truncated { .. })
    }
}

impl From<io::Error> for WalkError {
    fn from(ioerr: io::Error) -> Self {
        WalkError::IOError(IOErrorInfo {
            kind: ioerr.kind(),
            message: ioerr.to_string(),
        })
    }
}

/// * The errors of a single chunk decoder. The registry never propagates these, the chunk is kept as a generic record instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChunkDecodeError {
    #[error("The \"{id}\" chunk is too short: {needed} bytes needed, got {got}")]
    TooShort { id: FourCC, needed: usize, got: usize },

    #[error("Data corrupted: {0}")]
    InvalidData(String),

    #[error("The payload of the \"{0}\" chunk was deferred and not loaded")]
    Deferred(FourCC),

    #[error("Tag error: {0}")]
    Tag(String),
}

/// * A non-fatal finding about a decoded chunk, e.g. a PCM `fmt ` chunk with a size other than 16.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanityNote {
    pub location: String,
    pub message: String,
}

impl SanityNote {
    pub fn new(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            message: message.into(),
        }
    }
}

impl Display for SanityNote {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}
