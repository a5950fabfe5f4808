//! Definition of errors.

use std::error::Error;
use std::fmt;

/// A specialized Result type for suggest.
pub type Result<T, E = SuggestError> = std::result::Result<T, E>;

/// The error type for suggest.
#[derive(Debug)]
pub enum SuggestError {
    /// The error variant for [`InvalidConfigError`].
    InvalidConfig(InvalidConfigError),

    /// The error variant for [`InvalidFormatError`].
    InvalidFormat(InvalidFormatError),

    /// The requested dictionary is not registered.
    DictionaryMissing(String),

    /// A posting list or packed table could not be decoded.
    InvalidCodec(String),

    /// The version tag of a persisted structure is not the supported one.
    IndexVersionMismatch {
        /// Supported version.
        expected: String,
        /// Version found in the input.
        found: String,
    },

    /// A packed array got a byte length that is not a multiple of its element size.
    InvalidSize {
        /// Name of the array.
        what: &'static str,
        /// Byte length found.
        len: usize,
    },

    /// The error variant for [`TryFromIntError`](std::num::TryFromIntError).
    TryFromInt(std::num::TryFromIntError),

    /// The error variant for [`ParseIntError`](std::num::ParseIntError).
    ParseInt(std::num::ParseIntError),

    /// The error variant for [`DecodeError`](bincode::error::DecodeError).
    BincodeDecode(bincode::error::DecodeError),

    /// The error variant for [`EncodeError`](bincode::error::EncodeError).
    BincodeEncode(bincode::error::EncodeError),

    /// The error variant for [`serde_json::Error`].
    SerdeJson(serde_json::Error),

    /// The error variant for [`std::io::Error`].
    StdIo(std::io::Error),
}

impl SuggestError {
    pub(crate) fn invalid_config<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidConfig(InvalidConfigError {
            arg,
            msg: msg.into(),
        })
    }

    pub(crate) fn invalid_format<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidFormat(InvalidFormatError {
            arg,
            msg: msg.into(),
        })
    }

    pub(crate) fn invalid_codec<S>(msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidCodec(msg.into())
    }
}

impl fmt::Display for SuggestError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InvalidConfig(e) => e.fmt(f),
            Self::InvalidFormat(e) => e.fmt(f),
            Self::DictionaryMissing(name) => write!(f, "DictionaryMissing: {name}"),
            Self::InvalidCodec(msg) => write!(f, "InvalidCodec: {msg}"),
            Self::IndexVersionMismatch { expected, found } => {
                write!(
                    f,
                    "IndexVersionMismatch: expected {expected:?}, found {found:?}"
                )
            }
            Self::InvalidSize { what, len } => {
                write!(f, "InvalidSize: {what}: {len} bytes")
            }
            Self::TryFromInt(e) => e.fmt(f),
            Self::ParseInt(e) => e.fmt(f),
            Self::BincodeDecode(e) => e.fmt(f),
            Self::BincodeEncode(e) => e.fmt(f),
            Self::SerdeJson(e) => e.fmt(f),
            Self::StdIo(e) => e.fmt(f),
        }
    }
}

impl Error for SuggestError {}

/// Error used when a configuration value is out of its domain.
#[derive(Debug)]
pub struct InvalidConfigError {
    /// Name of the argument.
    pub(crate) arg: &'static str,

    /// Error message.
    pub(crate) msg: String,
}

impl fmt::Display for InvalidConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidConfigError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidConfigError {}

/// Error used when a text input is malformed.
#[derive(Debug)]
pub struct InvalidFormatError {
    /// Name of the input.
    pub(crate) arg: &'static str,

    /// Error message.
    pub(crate) msg: String,
}

impl fmt::Display for InvalidFormatError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidFormatError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidFormatError {}

impl From<std::num::TryFromIntError> for SuggestError {
    fn from(error: std::num::TryFromIntError) -> Self {
        Self::TryFromInt(error)
    }
}

impl From<std::num::ParseIntError> for SuggestError {
    fn from(error: std::num::ParseIntError) -> Self {
        Self::ParseInt(error)
    }
}

impl From<bincode::error::DecodeError> for SuggestError {
    fn from(error: bincode::error::DecodeError) -> Self {
        Self::BincodeDecode(error)
    }
}

impl From<bincode::error::EncodeError> for SuggestError {
    fn from(error: bincode::error::EncodeError) -> Self {
        Self::BincodeEncode(error)
    }
}

impl From<serde_json::Error> for SuggestError {
    fn from(error: serde_json::Error) -> Self {
        Self::SerdeJson(error)
    }
}

impl From<std::io::Error> for SuggestError {
    fn from(error: std::io::Error) -> Self {
        Self::StdIo(error)
    }
}
