use thiserror::Error;

use usbi2c_core::Error as CoreError;

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("could not load driver library {path}: {source}")]
    Load {
        path: String,
        source: libloading::Error,
    },

    #[error("driver library {path} has no entry point {symbol}: {source}")]
    Symbol {
        path: String,
        symbol: &'static str,
        source: libloading::Error,
    },
}

impl From<LibraryError> for CoreError {
    fn from(err: LibraryError) -> Self {
        CoreError::Adapter(err.to_string())
    }
}
