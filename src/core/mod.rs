pub mod char_coder;
pub mod face_numbering;
pub mod perm;
pub mod shared;
pub mod triangulation;
