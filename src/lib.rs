// lib.rs

/// Contains permutations, face numbering, triangulations and the shared
/// index types.
pub mod core;

/// Defines the printable encoders: isomorphism signatures and tight
/// encodings.
pub mod encode;

/// Defines the decoders for isomorphism signatures, dehydration strings,
/// splitting signatures and tight encodings.
pub mod decode;

/// Normal and almost normal surfaces in 3-manifold triangulations, and the
/// constructions built from them.
pub mod surface;

use crate::core::shared::ErrorKind;

/// Contains the most commonly used traits, types, and objects.
pub mod prelude {
    pub use crate::core::perm::{Perm, Perm2, Perm3, Perm4, Perm5};
    pub use crate::core::shared::{ConfigType, ErrorKind, FaceIdx, SimplexIdx};
    pub use crate::core::triangulation::{factory, Triangulation, Triangulation2, Triangulation3, Triangulation4};
    pub use crate::decode::{self, decode_any};
    pub use crate::encode::{self, iso_sig};
    pub use crate::surface::compress::{CandidateSearcher, CompressingDiscSearch, DiscSearcher};
    pub use crate::surface::count::DiscCount;
    pub use crate::surface::{NormalSurface, TetCoords};
    pub use crate::Error;
}

/// The error every fallible operation of the crate converts into.
#[remain::sorted]
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Operation cancelled.")]
    Cancelled,
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),
    #[error("Unsupported: {0}")]
    Unsupported(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Cancelled => ErrorKind::Cancelled,
            Error::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Error::InvalidEncoding(_) => ErrorKind::InvalidEncoding,
            Error::Unsupported(_) => ErrorKind::Unsupported,
        }
    }
}

macro_rules! error_from {
    ($($err:ty),*) => {
        $(
            impl From<$err> for Error {
                fn from(e: $err) -> Self {
                    match e.kind() {
                        ErrorKind::Cancelled => Error::Cancelled,
                        ErrorKind::InvalidArgument => Error::InvalidArgument(e.to_string()),
                        ErrorKind::InvalidEncoding => Error::InvalidEncoding(e.to_string()),
                        ErrorKind::Unsupported => Error::Unsupported(e.to_string()),
                    }
                }
            }
        )*
    };
}

error_from!(
    crate::core::perm::Err,
    crate::core::triangulation::Err,
    crate::decode::Err,
    crate::decode::dehydration::Err,
    crate::decode::iso_sig::Err,
    crate::decode::signature::Err,
    crate::decode::tight::Err,
    crate::surface::Err
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_errors_keep_their_kind() {
        let e: Error = surface::Err::Cancelled.into();
        assert_eq!(e, Error::Cancelled);

        let e: Error = surface::Err::NotCompact.into();
        assert_eq!(e.kind(), ErrorKind::Unsupported);

        let e: Error = crate::core::perm::Err::TrailingCharacters.into();
        assert_eq!(e.kind(), ErrorKind::InvalidEncoding);
        assert!(e.to_string().starts_with("Invalid encoding: "));

        let e: Error = decode::decode_any("!!").unwrap_err().into();
        assert_eq!(e.kind(), ErrorKind::InvalidArgument);
    }
}
