// SPDX-License-Identifier: MPL-2.0
use std::fmt;

#[derive(Debug, Clone)]
pub enum Error {
    Io(String),
    Config(String),
    Load(LoadError),
}

/// Reasons an image source could not be resolved into a bitmap.
///
/// None of these are fatal: the page keeps showing its placeholder and the
/// host only notices through `save_requested` receiving no image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The URL scheme is not handled by the loader (e.g. `http` for a file loader).
    UnsupportedScheme(String),

    /// A link string could not be parsed as a URL.
    InvalidUrl(String),

    /// The resource could not be read.
    Io(String),

    /// The bytes were read but could not be decoded into an image.
    Decode(String),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::UnsupportedScheme(scheme) => {
                write!(f, "Unsupported URL scheme: {}", scheme)
            }
            LoadError::InvalidUrl(link) => write!(f, "Invalid image link: {}", link),
            LoadError::Io(msg) => write!(f, "I/O error: {}", msg),
            LoadError::Decode(msg) => write!(f, "Decode error: {}", msg),
        }
    }
}

impl std::error::Error for LoadError {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O Error: {}", e),
            Error::Config(e) => write!(f, "Config Error: {}", e),
            Error::Load(e) => write!(f, "Load Error: {}", e),
        }
    }
}

impl std::error::Error for Error {}

impl From<LoadError> for Error {
    fn from(err: LoadError) -> Self {
        Error::Load(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<image_rs::ImageError> for LoadError {
    fn from(err: image_rs::ImageError) -> Self {
        match err {
            image_rs::ImageError::IoError(io) => LoadError::Io(io.to_string()),
            other => LoadError::Decode(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Reports a broken host contract (e.g. a page index outside the session).
///
/// Debug builds stop right here; release builds log and let the caller
/// fall through to its no-op branch.
#[macro_export]
macro_rules! invariant_violation {
    ($($arg:tt)*) => {{
        debug_assert!(false, $($arg)*);
        tracing::error!($($arg)*);
    }};
}
