//! Definition of errors.

use std::error::Error;
use std::fmt;
use std::path::PathBuf;

pub type Result<T, E = TaleweaverError> = std::result::Result<T, E>;

#[derive(Debug)]
pub enum TaleweaverError {
    InsufficientData(InsufficientDataError),
    ModelNotFound(ModelNotFoundError),
    NotFitted(NotFittedError),
    CorruptArtifact(CorruptArtifactError),
    InvalidArgument(InvalidArgumentError),
    EncodeError(bincode::error::EncodeError),
    IOError(std::io::Error),
}

impl TaleweaverError {
    pub(crate) fn insufficient_data<S>(msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InsufficientData(InsufficientDataError { msg: msg.into() })
    }

    pub(crate) fn model_not_found<P>(path: P) -> Self
    where
        P: Into<PathBuf>,
    {
        Self::ModelNotFound(ModelNotFoundError { path: path.into() })
    }

    pub(crate) fn not_fitted(component: &'static str) -> Self {
        Self::NotFitted(NotFittedError { component })
    }

    pub(crate) fn corrupt_artifact<S>(msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::CorruptArtifact(CorruptArtifactError { msg: msg.into() })
    }

    pub(crate) fn invalid_argument<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidArgument(InvalidArgumentError {
            arg,
            msg: msg.into(),
        })
    }
}

impl fmt::Display for TaleweaverError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InsufficientData(e) => fmt::Display::fmt(e, f),
            Self::ModelNotFound(e) => fmt::Display::fmt(e, f),
            Self::NotFitted(e) => fmt::Display::fmt(e, f),
            Self::CorruptArtifact(e) => fmt::Display::fmt(e, f),
            Self::InvalidArgument(e) => fmt::Display::fmt(e, f),
            Self::EncodeError(e) => fmt::Display::fmt(e, f),
            Self::IOError(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl Error for TaleweaverError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::EncodeError(e) => Some(e),
            Self::IOError(e) => Some(e),
            _ => None,
        }
    }
}

/// Error used when the training corpus is empty or yields no usable features.
#[derive(Debug)]
pub struct InsufficientDataError {
    /// Error message.
    pub(crate) msg: String,
}

impl fmt::Display for InsufficientDataError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InsufficientDataError: {}", self.msg)
    }
}

impl Error for InsufficientDataError {}

/// Error used when no model artifact exists at the requested path.
#[derive(Debug)]
pub struct ModelNotFoundError {
    /// Path that was looked up.
    pub(crate) path: PathBuf,
}

impl ModelNotFoundError {
    /// Path of the missing artifact.
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl fmt::Display for ModelNotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "ModelNotFoundError: {} not found. Please run `train` first.",
            self.path.display()
        )
    }
}

impl Error for ModelNotFoundError {}

/// Error used when a component is used before it has been fitted or loaded.
#[derive(Debug)]
pub struct NotFittedError {
    /// Name of the unfitted component.
    pub(crate) component: &'static str,
}

impl fmt::Display for NotFittedError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "NotFittedError: {} must be fitted or loaded before use",
            self.component
        )
    }
}

impl Error for NotFittedError {}

/// Error used when a model artifact cannot be decoded or is inconsistent.
#[derive(Debug)]
pub struct CorruptArtifactError {
    /// Error message.
    pub(crate) msg: String,
}

impl fmt::Display for CorruptArtifactError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "CorruptArtifactError: {}", self.msg)
    }
}

impl Error for CorruptArtifactError {}

/// Error used when the argument is invalid.
#[derive(Debug)]
pub struct InvalidArgumentError {
    /// Name of the argument.
    pub(crate) arg: &'static str,

    /// Error message.
    pub(crate) msg: String,
}

impl fmt::Display for InvalidArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidArgumentError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidArgumentError {}

impl From<bincode::error::DecodeError> for TaleweaverError {
    fn from(error: bincode::error::DecodeError) -> Self {
        Self::corrupt_artifact(error.to_string())
    }
}

impl From<bincode::error::EncodeError> for TaleweaverError {
    fn from(error: bincode::error::EncodeError) -> Self {
        Self::EncodeError(error)
    }
}

impl From<std::io::Error> for TaleweaverError {
    fn from(error: std::io::Error) -> Self {
        Self::IOError(error)
    }
}
