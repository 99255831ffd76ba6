use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

/// Arithmetic failures on [`ExtInt`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ExtIntError {
    /// `+infinity + -infinity` has no mathematical value.
    #[error("undefined arithmetic: adding infinities of opposite sign")]
    UndefinedArithmetic,
    /// An infinity cannot be read back as a machine integer.
    #[error("cannot represent an infinite value as an integer")]
    NotFinite,
}

/// An integer extended with both infinities: `ℤ ∪ {−∞, +∞}`.
///
/// The fixed-point computations use `+∞` as "no upper bound yet", which
/// keeps the iteration code free of option-juggling. The order is total:
/// `−∞ < z < +∞` for every finite `z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtInt {
    NegInf,
    Finite(i64),
    PosInf,
}

/// Finite values serialize as plain numbers, infinities as the strings
/// `"infinity"` / `"-infinity"`, matching the textual report format.
impl Serialize for ExtInt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ExtInt::Finite(z) => serializer.serialize_i64(*z),
            ExtInt::PosInf => serializer.serialize_str("infinity"),
            ExtInt::NegInf => serializer.serialize_str("-infinity"),
        }
    }
}

impl ExtInt {
    /// The finite value `z`.
    pub fn finite(z: i64) -> Self {
        ExtInt::Finite(z)
    }

    /// Positive infinity.
    pub fn infinity() -> Self {
        ExtInt::PosInf
    }

    pub fn is_finite(self) -> bool {
        matches!(self, ExtInt::Finite(_))
    }

    pub fn is_infinite(self) -> bool {
        !self.is_finite()
    }

    /// The finite payload, or [`ExtIntError::NotFinite`] on an infinity.
    pub fn finite_value(self) -> Result<i64, ExtIntError> {
        match self {
            ExtInt::Finite(z) => Ok(z),
            _ => Err(ExtIntError::NotFinite),
        }
    }

    /// −1, 0 or +1. Infinities take their sign from the variant, finite
    /// values from the payload.
    pub fn sign(self) -> i32 {
        match self {
            ExtInt::NegInf => -1,
            ExtInt::Finite(z) => match z.cmp(&0) {
                Ordering::Less => -1,
                Ordering::Equal => 0,
                Ordering::Greater => 1,
            },
            ExtInt::PosInf => 1,
        }
    }

    /// Saturating addition. An infinity absorbs any finite operand; adding
    /// infinities of opposite sign is refused. Finite overflow saturates to
    /// the infinity matching the sign of the true sum.
    pub fn checked_add(self, rhs: ExtInt) -> Result<ExtInt, ExtIntError> {
        match (self, rhs) {
            (ExtInt::Finite(a), ExtInt::Finite(b)) => Ok(match a.checked_add(b) {
                Some(sum) => ExtInt::Finite(sum),
                // Overflow only happens when both operands share a sign.
                None if a > 0 => ExtInt::PosInf,
                None => ExtInt::NegInf,
            }),
            (ExtInt::PosInf, ExtInt::NegInf) | (ExtInt::NegInf, ExtInt::PosInf) => {
                Err(ExtIntError::UndefinedArithmetic)
            }
            (inf @ (ExtInt::PosInf | ExtInt::NegInf), _) => Ok(inf),
            (_, inf) => Ok(inf),
        }
    }
}

impl std::ops::Neg for ExtInt {
    type Output = ExtInt;

    fn neg(self) -> ExtInt {
        match self {
            ExtInt::NegInf => ExtInt::PosInf,
            ExtInt::Finite(z) => ExtInt::Finite(-z),
            ExtInt::PosInf => ExtInt::NegInf,
        }
    }
}

impl Ord for ExtInt {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (ExtInt::Finite(a), ExtInt::Finite(b)) => a.cmp(b),
            (ExtInt::NegInf, ExtInt::NegInf) | (ExtInt::PosInf, ExtInt::PosInf) => Ordering::Equal,
            (ExtInt::NegInf, _) | (_, ExtInt::PosInf) => Ordering::Less,
            (ExtInt::PosInf, _) | (_, ExtInt::NegInf) => Ordering::Greater,
        }
    }
}

impl PartialOrd for ExtInt {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<i64> for ExtInt {
    fn from(z: i64) -> Self {
        ExtInt::Finite(z)
    }
}

impl fmt::Display for ExtInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtInt::NegInf => write!(f, "-infinity"),
            ExtInt::Finite(z) => write!(f, "{z}"),
            ExtInt::PosInf => write!(f, "infinity"),
        }
    }
}
