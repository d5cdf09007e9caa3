//! Permutations of {0, ..., N-1} for N <= 5, stored as an index into S_N.
//!
//! Every operation is a lookup into tables that are built once per N. The
//! stored index follows the alternating listing of S_N, in which the
//! permutation with index `i` has sign `(-1)^i`. The lexicographic listing
//! is also available through [`Perm::ordered_sn_index`].

use std::{fmt, ops};

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::shared::ErrorKind;

/// Largest permutation size with precomputed tables.
pub const MAX_PERM_SIZE: usize = 5;

#[remain::sorted]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Err {
    #[error("Tight encoding ends before the permutation is complete.")]
    IncompleteEncoding,
    #[error("Index {0} is out of range for S_{1}.")]
    IndexOutOfRange(usize, usize),
    #[error("Images {0:?} do not describe a permutation of {1} elements.")]
    NotAPermutation(Vec<usize>, usize),
    #[error("Tight encoding is followed by unexpected characters.")]
    TrailingCharacters,
    #[error("Tight encoding character {0:?} is out of range.")]
    ValueOutOfRange(char),
}

impl Err {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Err::IncompleteEncoding | Err::TrailingCharacters | Err::ValueOutOfRange(_) => ErrorKind::InvalidEncoding,
            Err::IndexOutOfRange(..) | Err::NotAPermutation(..) => ErrorKind::InvalidArgument,
        }
    }
}

pub(crate) const fn factorial(n: usize) -> usize {
    let mut ans = 1;
    let mut i = 2;
    while i <= n {
        ans *= i;
        i += 1;
    }
    ans
}

/// Lookup tables for S_n.
pub(crate) struct PermTable {
    n: usize,
    images: Vec<[u8; MAX_PERM_SIZE]>,
    inverse: Vec<u8>,
    product: Vec<u8>,
    order: Vec<u8>,
    to_ordered: Vec<u8>,
    from_ordered: Vec<u8>,
}

impl PermTable {
    fn build(n: usize) -> Self {
        let n_perms = factorial(n);
        let lex = lex_listing(n);

        let mut images = vec![[0u8; MAX_PERM_SIZE]; n_perms];
        let mut to_ordered = vec![0u8; n_perms];
        let mut from_ordered = vec![0u8; n_perms];
        for (ordered, img) in lex.iter().enumerate() {
            let code = ordered ^ ((parity(img) ^ ordered) & 1);
            images[code] = *img;
            to_ordered[code] = ordered as u8;
            from_ordered[ordered] = code as u8;
        }

        let code_of = |img: &[u8; MAX_PERM_SIZE]| from_ordered[lex_rank(&img[..n])] as usize;

        let mut inverse = vec![0u8; n_perms];
        let mut product = vec![0u8; n_perms * n_perms];
        for a in 0..n_perms {
            let mut inv = [0u8; MAX_PERM_SIZE];
            for i in 0..n {
                inv[images[a][i] as usize] = i as u8;
            }
            inverse[a] = code_of(&inv) as u8;
            for b in 0..n_perms {
                let mut prod = [0u8; MAX_PERM_SIZE];
                for i in 0..n {
                    prod[i] = images[a][images[b][i] as usize];
                }
                product[a * n_perms + b] = code_of(&prod) as u8;
            }
        }

        let mut order = vec![0u8; n_perms];
        for a in 0..n_perms {
            let mut k = 1;
            let mut p = a;
            while p != 0 {
                p = product[p * n_perms + a] as usize;
                k += 1;
            }
            order[a] = k;
        }

        Self { n, images, inverse, product, order, to_ordered, from_ordered }
    }

    pub(crate) fn all() -> &'static [PermTable; MAX_PERM_SIZE + 1] {
        &TABLES
    }

    #[inline]
    fn n_perms(&self) -> usize {
        self.inverse.len()
    }

    pub(crate) fn code_of(&self, images: &[usize]) -> usize {
        debug_assert!(images.len() <= MAX_PERM_SIZE);
        let mut small = [0u8; MAX_PERM_SIZE];
        for (dst, &x) in small.iter_mut().zip(images) {
            *dst = x as u8;
        }
        self.from_ordered[lex_rank(&small[..images.len()])] as usize
    }
}

/// All permutations of `0..n` in lexicographic order, padded with fixed points.
fn lex_listing(n: usize) -> Vec<[u8; MAX_PERM_SIZE]> {
    let mut out = Vec::with_capacity(factorial(n));
    let mut cur = [0u8, 1, 2, 3, 4];
    loop {
        out.push(cur);
        // next permutation of the first n entries
        let Some(i) = (0..n.saturating_sub(1)).rev().find(|&i| cur[i] < cur[i + 1]) else {
            break;
        };
        let j = (i + 1..n).rev().find(|&j| cur[j] > cur[i]).unwrap_or(i + 1);
        cur.swap(i, j);
        cur[i + 1..n].reverse();
    }
    out
}

fn lex_rank(img: &[u8]) -> usize {
    let n = img.len();
    let mut rank = 0;
    for i in 0..n {
        let smaller = img[i + 1..].iter().filter(|&&x| x < img[i]).count();
        rank += smaller * factorial(n - 1 - i);
    }
    rank
}

fn parity(img: &[u8; MAX_PERM_SIZE]) -> usize {
    let mut inversions = 0;
    for i in 0..MAX_PERM_SIZE {
        for j in i + 1..MAX_PERM_SIZE {
            if img[i] > img[j] {
                inversions += 1;
            }
        }
    }
    inversions & 1
}

lazy_static! {
    static ref TABLES: [PermTable; MAX_PERM_SIZE + 1] = std::array::from_fn(PermTable::build);
}

/// A permutation of {0, ..., N-1}.
///
/// Composition follows `(p * q)[x] = p[q[x]]`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Perm<const N: usize> {
    code: u8,
}

// Perm2, Perm3, Perm4 and Perm5.
seq_macro::seq!(K in 2..=5 {
    pub type Perm~K = Perm<K>;
});

impl<const N: usize> Perm<N> {
    /// The number of permutations of N elements.
    pub const N_PERMS: usize = factorial(N);

    #[inline]
    pub(crate) fn table() -> &'static PermTable {
        debug_assert!(N <= MAX_PERM_SIZE);
        &TABLES[N]
    }

    #[inline]
    pub fn identity() -> Self {
        Self { code: 0 }
    }

    /// Builds the permutation sending `i` to `images[i]`.
    pub fn from_images(images: [usize; N]) -> Result<Self, Err> {
        let mut seen = [false; MAX_PERM_SIZE];
        for &x in images.iter() {
            if x >= N || seen[x] {
                return Err(Err::NotAPermutation(images.to_vec(), N));
            }
            seen[x] = true;
        }
        Ok(Self { code: Self::table().code_of(&images) as u8 })
    }

    /// Builds a permutation from images that are already known to be valid.
    pub(crate) fn from_valid(images: [usize; N]) -> Self {
        debug_assert!(Self::from_images(images).is_ok(), "{images:?} is not a permutation");
        Self { code: Self::table().code_of(&images) as u8 }
    }

    /// Builds the permutation whose preimage of `i` is `preimages[i]`.
    pub fn from_preimages(preimages: [usize; N]) -> Result<Self, Err> {
        Ok(Self::from_images(preimages)?.inverse())
    }

    /// The transposition swapping `a` and `b`; the identity if they coincide.
    pub fn transposition(a: usize, b: usize) -> Self {
        let mut images: [usize; N] = std::array::from_fn(|i| i);
        images.swap(a, b);
        Self::from_valid(images)
    }

    /// The cyclic shift `k -> k + i mod N`.
    pub fn rot(i: usize) -> Self {
        Self::from_valid(std::array::from_fn(|k| (k + i) % N))
    }

    pub fn from_sn_index(index: usize) -> Result<Self, Err> {
        if index >= Self::N_PERMS {
            return Err(Err::IndexOutOfRange(index, N));
        }
        Ok(Self { code: index as u8 })
    }

    pub fn from_ordered_sn_index(index: usize) -> Result<Self, Err> {
        if index >= Self::N_PERMS {
            return Err(Err::IndexOutOfRange(index, N));
        }
        Ok(Self { code: Self::table().from_ordered[index] })
    }

    /// The index in the alternating listing of S_N.
    #[inline]
    pub fn sn_index(self) -> usize {
        self.code as usize
    }

    /// The index in the lexicographic listing of S_N.
    #[inline]
    pub fn ordered_sn_index(self) -> usize {
        Self::table().to_ordered[self.code as usize] as usize
    }

    #[inline]
    pub fn image(self, i: usize) -> usize {
        Self::table().images[self.code as usize][i] as usize
    }

    #[inline]
    pub fn pre(self, i: usize) -> usize {
        self.inverse().image(i)
    }

    pub fn images(self) -> [usize; N] {
        std::array::from_fn(|i| self.image(i))
    }

    #[inline]
    pub fn inverse(self) -> Self {
        Self { code: Self::table().inverse[self.code as usize] }
    }

    /// Returns +1 for even permutations and -1 for odd ones.
    #[inline]
    pub fn sign(self) -> i32 {
        if self.code % 2 == 0 { 1 } else { -1 }
    }

    #[inline]
    pub fn order(self) -> usize {
        Self::table().order[self.code as usize] as usize
    }

    #[inline]
    pub fn is_identity(self) -> bool {
        self.code == 0
    }

    /// Raises this permutation to the given (possibly negative) power.
    pub fn pow(self, exp: i64) -> Self {
        let order = self.order() as i64;
        let e = exp.rem_euclid(order);
        let mut ans = Self::identity();
        for _ in 0..e {
            ans = ans * self;
        }
        ans
    }

    /// Returns `q * self * q^-1`.
    pub fn conjugate(self, q: Self) -> Self {
        q * self * q.inverse()
    }

    /// Views this permutation as one of M >= N elements that fixes the extra points.
    pub fn extend<const M: usize>(self) -> Perm<M> {
        debug_assert!(M >= N);
        Perm::<M>::from_valid(std::array::from_fn(|i| if i < N { self.image(i) } else { i }))
    }

    /// Restricts this permutation to its first M points, which must map into `0..M`.
    pub fn contract<const M: usize>(self) -> Result<Perm<M>, Err> {
        let images: [usize; M] = std::array::from_fn(|i| self.image(i));
        Perm::<M>::from_images(images)
    }

    /// Encodes this permutation as a short printable string.
    pub fn tight_encoding(self) -> String {
        let mut out = String::new();
        crate::encode::tight::encode_perm(self, &mut out);
        out
    }

    /// Decodes a whole string produced by [`Perm::tight_encoding`].
    pub fn tight_decode(s: &str) -> Result<Self, Err> {
        crate::decode::tight::decode_perm_str(s)
    }
}

impl<const N: usize> Default for Perm<N> {
    fn default() -> Self {
        Self::identity()
    }
}

impl<const N: usize> ops::Mul for Perm<N> {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self::Output {
        let table = Self::table();
        Self { code: table.product[self.code as usize * table.n_perms() + rhs.code as usize] }
    }
}

impl<const N: usize> ops::Index<usize> for Perm<N> {
    type Output = u8;

    #[inline]
    fn index(&self, i: usize) -> &Self::Output {
        &Self::table().images[self.code as usize][i]
    }
}

impl<const N: usize> fmt::Display for Perm<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..N {
            write!(f, "{}", self.image(i))?;
        }
        Ok(())
    }
}

impl<const N: usize> fmt::Debug for Perm<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Perm<{}>({})", Self::table().n, self)
    }
}

/// Shorthand for a permutation of four elements with known-valid images.
macro_rules! perm4 {
    ($a:expr, $b:expr, $c:expr, $d:expr) => {
        $crate::core::perm::Perm::<4>::from_valid([$a, $b, $c, $d])
    };
}
pub(crate) use perm4;
