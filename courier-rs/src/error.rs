//! Dispatch error. Handler and decorator failures pass through unchanged.

use courier_core::{Cancelled, ContainerError};
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum Error {
    /// A required contract (proxy, handler, dispatch entry) has no registration.
    #[error(transparent)]
    Resolution(#[from] ContainerError),
    #[error(transparent)]
    Cancelled(#[from] Cancelled),
    /// Raised inside a handler or decorator body. Use [`Error::downcast_ref`] to get the original error back.
    #[error(transparent)]
    Handler(BoxError),
    #[error("invalid decorator type {type_name}: {reason}")]
    InvalidDecorator {
        type_name: &'static str,
        reason: &'static str,
    },
    #[error("unsupported contract shape: {contract}")]
    UnsupportedContract { contract: String },
    #[error("open decorator returned an outcome that is not {expected}")]
    OutcomeMismatch { expected: &'static str },
}

impl Error {
    pub fn handler<E: Into<BoxError>>(err: E) -> Self {
        Error::Handler(err.into())
    }

    /// Original error raised by handler code, if it is an `E`.
    pub fn downcast_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            Error::Handler(inner) => inner.downcast_ref::<E>(),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled(_))
    }

    pub fn is_not_registered(&self) -> bool {
        matches!(self, Error::Resolution(ContainerError::NotRegistered { .. }))
    }
}

/// Convert a domain error into [`Error::Handler`] without writing `.map_err(Error::handler)` at each call.
pub trait IntoDispatchError {
    fn into_dispatch_error(self) -> Error;
}

impl<E: std::error::Error + Send + Sync + 'static> IntoDispatchError for E {
    fn into_dispatch_error(self) -> Error {
        Error::Handler(Box::new(self))
    }
}
