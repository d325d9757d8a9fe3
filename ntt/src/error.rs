use thiserror::Error;

/// Every failure the library can surface. Constructors validate eagerly and
/// return one of these; transform and cipher hot paths never fail once the
/// descriptor is built.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("requested root, generator or inverse does not exist")]
    NotFound,

    #[error("element has no modular inverse")]
    NotInvertible,

    #[error("arithmetic would exceed the chosen word width")]
    Overflow,

    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("the field cannot supply the requested transform size")]
    UnsupportedSize,
}

pub type Result<T> = core::result::Result<T, Error>;
