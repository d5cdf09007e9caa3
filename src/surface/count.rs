use std::cmp::Ordering;
use std::fmt;
use std::ops;
use std::str::FromStr;

use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The number of normal discs of one type in one tetrahedron.
///
/// Spun normal surfaces in ideal triangulations may have infinitely many
/// triangles near an ideal vertex, which is recorded as `Infinity`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum DiscCount {
    Finite(BigInt),
    Infinity,
}

impl DiscCount {
    pub fn zero() -> Self {
        DiscCount::Finite(BigInt::zero())
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, DiscCount::Finite(n) if n.is_zero())
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self, DiscCount::Infinity)
    }

    pub fn is_negative(&self) -> bool {
        matches!(self, DiscCount::Finite(n) if n.is_negative())
    }

    /// The finite value, if there is one.
    pub fn finite(&self) -> Option<&BigInt> {
        match self {
            DiscCount::Finite(n) => Some(n),
            DiscCount::Infinity => None,
        }
    }

    /// The count as a machine integer, if it is finite and small enough.
    pub fn to_usize(&self) -> Option<usize> {
        self.finite().and_then(ToPrimitive::to_usize)
    }
}

impl Default for DiscCount {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<u64> for DiscCount {
    fn from(n: u64) -> Self {
        DiscCount::Finite(BigInt::from(n))
    }
}

impl From<BigInt> for DiscCount {
    fn from(n: BigInt) -> Self {
        DiscCount::Finite(n)
    }
}

impl Ord for DiscCount {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (DiscCount::Finite(a), DiscCount::Finite(b)) => a.cmp(b),
            (DiscCount::Finite(_), DiscCount::Infinity) => Ordering::Less,
            (DiscCount::Infinity, DiscCount::Finite(_)) => Ordering::Greater,
            (DiscCount::Infinity, DiscCount::Infinity) => Ordering::Equal,
        }
    }
}

impl PartialOrd for DiscCount {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl ops::Add for &DiscCount {
    type Output = DiscCount;

    fn add(self, rhs: Self) -> DiscCount {
        match (self, rhs) {
            (DiscCount::Finite(a), DiscCount::Finite(b)) => DiscCount::Finite(a + b),
            _ => DiscCount::Infinity,
        }
    }
}

impl ops::AddAssign<&DiscCount> for DiscCount {
    fn add_assign(&mut self, rhs: &DiscCount) {
        *self = &*self + rhs;
    }
}

impl ops::AddAssign<&BigInt> for DiscCount {
    fn add_assign(&mut self, rhs: &BigInt) {
        if let DiscCount::Finite(n) = self {
            *n += rhs;
        }
    }
}

impl ops::Mul<&BigInt> for &DiscCount {
    type Output = DiscCount;

    /// Zero times infinity is zero.
    fn mul(self, rhs: &BigInt) -> DiscCount {
        match self {
            DiscCount::Finite(n) => DiscCount::Finite(n * rhs),
            DiscCount::Infinity if rhs.is_zero() => DiscCount::zero(),
            DiscCount::Infinity => DiscCount::Infinity,
        }
    }
}

impl fmt::Display for DiscCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscCount::Finite(n) => write!(f, "{n}"),
            DiscCount::Infinity => f.write_str("inf"),
        }
    }
}

impl FromStr for DiscCount {
    type Err = num_bigint::ParseBigIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inf" | "infinity" => Ok(DiscCount::Infinity),
            _ => s.parse().map(DiscCount::Finite),
        }
    }
}

impl Serialize for DiscCount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for DiscCount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
