pub mod iso_sig;
pub mod tight;

pub use iso_sig::iso_sig;
