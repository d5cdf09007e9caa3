use core::fmt;

/// Declares index newtypes, each with a vector indexed by it (`SimplexIdx`
/// comes with `VecSimplexIdx`, and so on).
macro_rules! typed_idx {
    ($($Idx:ident),*) => {
        $(
            #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
            pub struct $Idx(usize);

            impl $Idx {
                #[inline]
                pub fn get(self) -> usize {
                    self.0
                }
            }

            impl From<usize> for $Idx {
                fn from(idx: usize) -> Self {
                    Self(idx)
                }
            }

            impl From<$Idx> for usize {
                fn from(idx: $Idx) -> Self {
                    idx.0
                }
            }

            impl fmt::Debug for $Idx {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    self.0.fmt(f)
                }
            }

            impl fmt::Display for $Idx {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    self.0.fmt(f)
                }
            }

            paste::paste! {
                #[derive(Debug, Clone, Default, PartialEq, Eq)]
                pub struct [<Vec $Idx>]<T> {
                    inner: Vec<T>,
                }

                #[allow(unused)]
                impl<T: Clone> [<Vec $Idx>]<T> {
                    pub fn new() -> Self {
                        Self { inner: Vec::new() }
                    }

                    pub fn filled(len: usize, value: T) -> Self {
                        Self { inner: vec![value; len] }
                    }

                    /// Appends `value` and returns its index.
                    pub fn push(&mut self, value: T) -> $Idx {
                        self.inner.push(value);
                        $Idx(self.inner.len() - 1)
                    }

                    pub fn len(&self) -> usize {
                        self.inner.len()
                    }

                    pub fn is_empty(&self) -> bool {
                        self.inner.is_empty()
                    }

                    pub fn iter(&self) -> impl Iterator<Item = &T> {
                        self.inner.iter()
                    }

                    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
                        self.inner.iter_mut()
                    }

                    pub fn indexed(&self) -> impl Iterator<Item = ($Idx, &T)> {
                        self.inner.iter().enumerate().map(|(i, v)| ($Idx(i), v))
                    }

                    pub fn remove(&mut self, idx: $Idx) -> T {
                        self.inner.remove(idx.0)
                    }

                    pub fn as_slice(&self) -> &[T] {
                        &self.inner
                    }
                }

                impl<T> std::ops::Index<$Idx> for [<Vec $Idx>]<T> {
                    type Output = T;

                    fn index(&self, idx: $Idx) -> &T {
                        &self.inner[idx.0]
                    }
                }

                impl<T> std::ops::IndexMut<$Idx> for [<Vec $Idx>]<T> {
                    fn index_mut(&mut self, idx: $Idx) -> &mut T {
                        &mut self.inner[idx.0]
                    }
                }
            }
        )*
    };
}

typed_idx!(BoundaryIdx, ComponentIdx, FaceIdx, SimplexIdx);

/// Per-operation settings with a sensible default.
pub trait ConfigType {
    fn default() -> Self;
}

/// The broad category of a failure, shared by every error type in the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A cooperative search was asked to stop before it finished.
    Cancelled,
    /// Malformed input, an index out of range, or a gluing that cannot be made.
    InvalidArgument,
    /// A tight encoding that is truncated, out of range or followed by junk.
    InvalidEncoding,
    /// The input lacks a property the operation needs.
    Unsupported,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::InvalidArgument => "invalid argument",
            ErrorKind::InvalidEncoding => "invalid encoding",
            ErrorKind::Unsupported => "unsupported",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_vectors_hand_out_their_indices() {
        let mut v = VecSimplexIdx::new();
        let a = v.push('a');
        let b = v.push('b');
        assert_eq!(a, SimplexIdx::from(0));
        assert_eq!(b.get() - a.get(), 1);
        assert_eq!(v[b], 'b');
        let pairs = v.indexed().map(|(i, c)| (i.get(), *c)).collect::<Vec<_>>();
        assert_eq!(pairs, vec![(0, 'a'), (1, 'b')]);
    }
}
