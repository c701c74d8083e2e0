//! Unit Domain Model
//!
//! Value type for monetary amounts. The single source of truth is the
//! integer amount in the smallest indivisible denomination ("atoms");
//! every other tier is a presentation-time view, so repeated conversions
//! never accumulate rounding error.

use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::shared::errors::UnitError;

/// Fixed denomination table.
///
/// Each tier is a power-of-ten multiple of its neighbour; `coin` is the
/// base tier used for fiat conversion and serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Denomination {
    /// `Mcoin`, one million coins
    Mega,
    /// `kcoin`, one thousand coins
    Kilo,
    /// `coin`, the base denomination
    Coin,
    /// `cents`, one hundredth of a coin
    Cents,
    /// `atoms`, the smallest indivisible unit
    Atoms,
}

impl Denomination {
    /// All table entries, largest tier first
    pub const ALL: [Self; 5] = [Self::Mega, Self::Kilo, Self::Coin, Self::Cents, Self::Atoms];

    /// Base denomination for fiat conversion and serialization
    pub const BASE: Self = Self::Coin;

    /// Denomination code as it appears in serialized form
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Mega => "Mcoin",
            Self::Kilo => "kcoin",
            Self::Coin => "coin",
            Self::Cents => "cents",
            Self::Atoms => "atoms",
        }
    }

    /// Number of atoms per unit of this denomination
    #[must_use]
    pub const fn scale(self) -> i64 {
        match self {
            Self::Mega => 100_000_000_000,
            Self::Kilo => 100_000_000,
            Self::Coin => 100_000,
            Self::Cents => 1_000,
            Self::Atoms => 1,
        }
    }

    /// Decimal digits shown when presenting an amount in this denomination
    #[must_use]
    pub const fn precision(self) -> u32 {
        match self {
            Self::Mega => 11,
            Self::Kilo => 8,
            Self::Coin => 5,
            Self::Cents => 3,
            Self::Atoms => 0,
        }
    }

    /// Resolve a denomination from its code
    ///
    /// # Errors
    ///
    /// Returns `UnitError::UnknownDenomination` if the code is not in the
    /// table.
    pub fn from_code(code: &str) -> Result<Self, UnitError> {
        Self::ALL
            .into_iter()
            .find(|denomination| denomination.code() == code)
            .ok_or_else(|| UnitError::UnknownDenomination(code.to_string()))
    }
}

impl fmt::Display for Denomination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Denomination {
    type Err = UnitError;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        Self::from_code(code)
    }
}

/// Serialized form of a [`Unit`]: `{amount, code}` with `code` always the
/// base denomination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitObject {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub code: String,
}

/// An immutable monetary amount backed by an integer count of atoms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "UnitObject", into = "UnitObject")]
pub struct Unit {
    atoms: i64,
}

impl Unit {
    /// Create a unit from an amount in the given denomination.
    ///
    /// The amount is scaled to atoms and rounded half away from zero;
    /// after this point the backing value is never rounded again.
    ///
    /// # Errors
    ///
    /// Returns `UnitError::AmountOutOfRange` if the scaled amount does not
    /// fit the integer atom representation.
    pub fn new(amount: Decimal, denomination: Denomination) -> Result<Self, UnitError> {
        let atoms = amount
            .checked_mul(Decimal::from(denomination.scale()))
            .and_then(|scaled| {
                scaled
                    .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                    .to_i64()
            })
            .ok_or(UnitError::AmountOutOfRange(amount))?;
        Ok(Self { atoms })
    }

    /// Create a unit from an amount and a denomination code
    ///
    /// # Errors
    ///
    /// Returns `UnitError::UnknownDenomination` for a code not in the
    /// table, or `UnitError::AmountOutOfRange` as for [`Unit::new`].
    pub fn from_code(amount: Decimal, code: &str) -> Result<Self, UnitError> {
        Self::new(amount, Denomination::from_code(code)?)
    }

    /// Create a unit from a fiat amount and an exchange rate
    /// (fiat per base-denomination unit)
    ///
    /// # Errors
    ///
    /// Returns `UnitError::InvalidExchangeRate` if the rate is not
    /// strictly positive.
    pub fn from_fiat(amount: Decimal, rate: Decimal) -> Result<Self, UnitError> {
        if rate <= Decimal::ZERO {
            return Err(UnitError::InvalidExchangeRate(rate));
        }
        let coins = amount
            .checked_div(rate)
            .ok_or(UnitError::AmountOutOfRange(amount))?;
        Self::new(coins, Denomination::BASE)
    }

    /// Create a unit from an exact atom count
    #[must_use]
    pub const fn from_atoms(atoms: i64) -> Self {
        Self { atoms }
    }

    /// Create a unit from an amount in the mega denomination
    ///
    /// # Errors
    ///
    /// See [`Unit::new`].
    pub fn from_mega(amount: Decimal) -> Result<Self, UnitError> {
        Self::new(amount, Denomination::Mega)
    }

    /// Create a unit from an amount in the kilo denomination
    ///
    /// # Errors
    ///
    /// See [`Unit::new`].
    pub fn from_kilo(amount: Decimal) -> Result<Self, UnitError> {
        Self::new(amount, Denomination::Kilo)
    }

    /// Create a unit from an amount in the base denomination
    ///
    /// # Errors
    ///
    /// See [`Unit::new`].
    pub fn from_coin(amount: Decimal) -> Result<Self, UnitError> {
        Self::new(amount, Denomination::Coin)
    }

    /// Create a unit from an amount in cents
    ///
    /// # Errors
    ///
    /// See [`Unit::new`].
    pub fn from_cents(amount: Decimal) -> Result<Self, UnitError> {
        Self::new(amount, Denomination::Cents)
    }

    /// The backing amount in atoms
    #[must_use]
    pub const fn atoms(&self) -> i64 {
        self.atoms
    }

    /// The amount presented in the given denomination, rounded to that
    /// tier's display precision
    #[must_use]
    pub fn to(&self, denomination: Denomination) -> Decimal {
        let value = Decimal::from(self.atoms) / Decimal::from(denomination.scale());
        value
            .round_dp_with_strategy(denomination.precision(), RoundingStrategy::MidpointAwayFromZero)
            .normalize()
    }

    /// The amount presented in the denomination named by `code`
    ///
    /// # Errors
    ///
    /// Returns `UnitError::UnknownDenomination` for a code not in the
    /// table.
    pub fn to_code(&self, code: &str) -> Result<Decimal, UnitError> {
        Ok(self.to(Denomination::from_code(code)?))
    }

    /// The fiat value at the given exchange rate, rounded to 2 decimals
    ///
    /// # Errors
    ///
    /// Returns `UnitError::InvalidExchangeRate` if the rate is not
    /// strictly positive, or `UnitError::AmountOutOfRange` if the product
    /// overflows.
    pub fn at_rate(&self, rate: Decimal) -> Result<Decimal, UnitError> {
        if rate <= Decimal::ZERO {
            return Err(UnitError::InvalidExchangeRate(rate));
        }
        let base = self.to(Denomination::BASE);
        let value = base
            .checked_mul(rate)
            .ok_or(UnitError::AmountOutOfRange(base))?;
        Ok(value
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
            .normalize())
    }

    /// Shorthand for `to(Denomination::Mega)`
    #[must_use]
    pub fn to_mega(&self) -> Decimal {
        self.to(Denomination::Mega)
    }

    /// Shorthand for `to(Denomination::Kilo)`
    #[must_use]
    pub fn to_kilo(&self) -> Decimal {
        self.to(Denomination::Kilo)
    }

    /// Shorthand for `to(Denomination::Coin)`
    #[must_use]
    pub fn to_coin(&self) -> Decimal {
        self.to(Denomination::Coin)
    }

    /// Shorthand for `to(Denomination::Cents)`
    #[must_use]
    pub fn to_cents(&self) -> Decimal {
        self.to(Denomination::Cents)
    }

    /// Shorthand for `to(Denomination::Atoms)`
    #[must_use]
    pub fn to_atoms(&self) -> Decimal {
        self.to(Denomination::Atoms)
    }

    /// Export as `{amount, code}` in the base denomination
    #[must_use]
    pub fn to_object(&self) -> UnitObject {
        UnitObject {
            amount: self.to(Denomination::BASE),
            code: Denomination::BASE.code().to_string(),
        }
    }

    /// Rebuild a unit from its `{amount, code}` form
    ///
    /// # Errors
    ///
    /// Returns `UnitError::UnknownDenomination` if the code is not in the
    /// table, or `UnitError::AmountOutOfRange` as for [`Unit::new`].
    pub fn from_object(object: &UnitObject) -> Result<Self, UnitError> {
        Self::from_code(object.amount, &object.code)
    }
}

impl From<Unit> for UnitObject {
    fn from(unit: Unit) -> Self {
        unit.to_object()
    }
}

impl TryFrom<UnitObject> for Unit {
    type Error = UnitError;

    fn try_from(object: UnitObject) -> Result<Self, Self::Error> {
        Self::from_object(&object)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.atoms, Denomination::Atoms.code())
    }
}
