//! Exact half-integer arithmetic, spins and multiplicative parities.

use std::fmt::{self, Display};
use std::iter::Sum;
use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, RxnError};

fn quantum_error(code: &str, message: impl Into<String>) -> RxnError {
    RxnError::Initialization(ErrorInfo::new(code, message))
}

/// A multiple of one half, stored as twice its value so that spin
/// arithmetic stays exact.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "f64", into = "f64")]
pub struct HalfInteger(i32);

impl HalfInteger {
    /// The value zero.
    pub const ZERO: Self = Self(0);
    /// The value one half.
    pub const HALF: Self = Self(1);
    /// The value one.
    pub const ONE: Self = Self(2);

    /// Creates a value from twice its magnitude, so `from_doubled(3)` is 3/2.
    pub const fn from_doubled(doubled: i32) -> Self {
        Self(doubled)
    }

    /// Creates an integer value.
    pub const fn integer(value: i32) -> Self {
        Self(value * 2)
    }

    /// Parses a floating point value that must be a multiple of one half.
    pub fn try_from_f64(value: f64) -> Result<Self, RxnError> {
        let doubled = value * 2.0;
        if !doubled.is_finite() || (doubled - doubled.round()).abs() > 1e-9 {
            return Err(RxnError::Initialization(
                ErrorInfo::new("not-a-half-integer", "value is not a multiple of 1/2")
                    .with_context("value", value),
            ));
        }
        Ok(Self(doubled.round() as i32))
    }

    /// Returns twice the value.
    pub const fn doubled(self) -> i32 {
        self.0
    }

    /// Returns the value as a float.
    pub fn as_f64(self) -> f64 {
        f64::from(self.0) / 2.0
    }

    /// Returns whether the value is a whole number.
    pub const fn is_integer(self) -> bool {
        self.0 % 2 == 0
    }

    /// Returns the absolute value.
    pub const fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// Returns whether the value is below zero.
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Iterates `self, self + 1, ...` up to and including `upper`.
    pub fn up_to(self, upper: HalfInteger) -> impl Iterator<Item = HalfInteger> {
        (self.0..=upper.0).step_by(2).map(HalfInteger)
    }

    /// Iterates `self, self + 1/2, ...` up to and including `upper`.
    pub fn up_to_in_halves(self, upper: HalfInteger) -> impl Iterator<Item = HalfInteger> {
        (self.0..=upper.0).map(HalfInteger)
    }
}

impl TryFrom<f64> for HalfInteger {
    type Error = RxnError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::try_from_f64(value)
    }
}

impl From<HalfInteger> for f64 {
    fn from(value: HalfInteger) -> Self {
        value.as_f64()
    }
}

impl From<i32> for HalfInteger {
    fn from(value: i32) -> Self {
        Self::integer(value)
    }
}

impl Add for HalfInteger {
    type Output = HalfInteger;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for HalfInteger {
    type Output = HalfInteger;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Neg for HalfInteger {
    type Output = HalfInteger;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Sum for HalfInteger {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a HalfInteger> for HalfInteger {
    fn sum<I: Iterator<Item = &'a HalfInteger>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl Display for HalfInteger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_integer() {
            write!(f, "{}", self.0 / 2)
        } else {
            write!(f, "{}/2", self.0)
        }
    }
}

/// A spin magnitude together with one of its projections.
///
/// The projection always lies in `-magnitude..=magnitude` and differs from the
/// magnitude by a whole number; construction enforces both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawSpin", into = "RawSpin")]
pub struct Spin {
    magnitude: HalfInteger,
    projection: HalfInteger,
}

#[derive(Serialize, Deserialize)]
struct RawSpin {
    magnitude: HalfInteger,
    projection: HalfInteger,
}

impl TryFrom<RawSpin> for Spin {
    type Error = RxnError;

    fn try_from(raw: RawSpin) -> Result<Self, Self::Error> {
        Spin::new(raw.magnitude, raw.projection)
    }
}

impl From<Spin> for RawSpin {
    fn from(spin: Spin) -> Self {
        RawSpin {
            magnitude: spin.magnitude,
            projection: spin.projection,
        }
    }
}

impl Spin {
    /// Creates a spin, validating the magnitude/projection pair.
    pub fn new(magnitude: HalfInteger, projection: HalfInteger) -> Result<Self, RxnError> {
        if magnitude.is_negative() {
            return Err(quantum_error(
                "negative-spin-magnitude",
                format!("spin magnitude {magnitude} is negative"),
            ));
        }
        if projection.abs() > magnitude || !(magnitude - projection).is_integer() {
            return Err(RxnError::Initialization(
                ErrorInfo::new(
                    "invalid-spin-projection",
                    format!("projection {projection} is not allowed for magnitude {magnitude}"),
                )
                .with_context("magnitude", magnitude)
                .with_context("projection", projection),
            ));
        }
        Ok(Self {
            magnitude,
            projection,
        })
    }

    /// Convenience constructor from floating point values.
    pub fn from_f64(magnitude: f64, projection: f64) -> Result<Self, RxnError> {
        Self::new(
            HalfInteger::try_from_f64(magnitude)?,
            HalfInteger::try_from_f64(projection)?,
        )
    }

    /// Returns the spin magnitude.
    pub fn magnitude(&self) -> HalfInteger {
        self.magnitude
    }

    /// Returns the spin projection.
    pub fn projection(&self) -> HalfInteger {
        self.projection
    }

    /// Returns whether the magnitude is non-zero.
    pub fn is_nonzero(&self) -> bool {
        self.magnitude != HalfInteger::ZERO
    }

    /// All projections allowed for the given magnitude, ascending.
    pub fn projections(magnitude: HalfInteger) -> Vec<HalfInteger> {
        (-magnitude).up_to(magnitude).collect()
    }
}

impl Display for Spin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "|{},{}>", self.magnitude, self.projection)
    }
}

/// An intrinsic multiplicative quantum number. Undefined parities are
/// represented as `Option::None` at the use site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum Parity {
    /// Eigenvalue -1.
    Minus,
    /// Eigenvalue +1.
    Plus,
}

impl Parity {
    /// Returns the eigenvalue as an integer.
    pub const fn value(self) -> i32 {
        match self {
            Parity::Minus => -1,
            Parity::Plus => 1,
        }
    }

    /// Returns `(-1)^exponent`, or `None` when the exponent is not a whole number.
    pub fn from_exponent(exponent: HalfInteger) -> Option<Parity> {
        if !exponent.is_integer() {
            return None;
        }
        if (exponent.doubled() / 2) % 2 == 0 {
            Some(Parity::Plus)
        } else {
            Some(Parity::Minus)
        }
    }

    /// Multiplies all parities together; the empty product is `Plus`.
    pub fn product<I: IntoIterator<Item = Parity>>(parities: I) -> Parity {
        parities.into_iter().fold(Parity::Plus, Mul::mul)
    }
}

impl Mul for Parity {
    type Output = Parity;

    fn mul(self, rhs: Self) -> Self::Output {
        if self == rhs {
            Parity::Plus
        } else {
            Parity::Minus
        }
    }
}

impl TryFrom<i8> for Parity {
    type Error = RxnError;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Parity::Plus),
            -1 => Ok(Parity::Minus),
            other => Err(quantum_error(
                "invalid-parity",
                format!("parity must be +1 or -1, got {other}"),
            )),
        }
    }
}

impl From<Parity> for i8 {
    fn from(parity: Parity) -> Self {
        parity.value() as i8
    }
}

impl Display for Parity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parity::Minus => write!(f, "-"),
            Parity::Plus => write!(f, "+"),
        }
    }
}
