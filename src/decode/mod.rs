pub mod dehydration;
pub mod iso_sig;
pub mod signature;
pub mod tight;

use crate::core::shared::ErrorKind;
use crate::core::triangulation::Triangulation3;

/// The printable formats a 3-manifold triangulation can be read from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Dehydration,
    IsoSig,
    SplittingSignature,
}

#[remain::sorted]
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Err {
    #[error("Dehydration decoding error: {0}")]
    DehydrationError(#[from] dehydration::Err),
    #[error("Isomorphism signature decoding error: {0}")]
    IsoSigError(#[from] iso_sig::Err),
    #[error("Splitting signature decoding error: {0}")]
    SignatureError(#[from] signature::Err),
    #[error("Tight decoding error: {0}")]
    TightError(#[from] tight::Err),
}

impl Err {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Err::DehydrationError(e) => e.kind(),
            Err::IsoSigError(e) => e.kind(),
            Err::SignatureError(e) => e.kind(),
            Err::TightError(e) => e.kind(),
        }
    }
}

/// Reads a 3-manifold triangulation in the given format.
pub fn decode(s: &str, format: Format) -> Result<Triangulation3, Err> {
    let tri = match format {
        Format::Dehydration => dehydration::rehydrate(s)?,
        Format::IsoSig => iso_sig::decode(s)?,
        Format::SplittingSignature => signature::decode(s)?,
    };
    Ok(tri)
}

/// Tries the formats in turn: splitting signatures are recognised by their
/// separators, then isomorphism signatures, then dehydration strings.
pub fn decode_any(s: &str) -> Result<Triangulation3, Err> {
    if s.contains(['(', ')', '.', ',', ';', ':', '|']) {
        return decode(s, Format::SplittingSignature);
    }
    match iso_sig::decode(s) {
        Ok(tri) => Ok(tri),
        Err(iso_err) => dehydration::rehydrate(s).map_err(|_| Err::IsoSigError(iso_err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_are_detected() {
        assert_eq!(decode_any("(abb)(ac)(c)").unwrap().size(), 3);
        assert_eq!(decode_any("cPcbbbiht").unwrap().size(), 2);
        assert!(decode_any("cabbbbmlq").unwrap().is_closed());
        let err = decode_any("!!").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }
}
