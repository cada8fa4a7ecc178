use std::{fmt, iter::Sum, ops::Add};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use uuid::Uuid;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(UserId);
id_newtype!(ProjectId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CartItemId(pub Uuid);

impl CartItemId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for CartItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ItemCategory {
    Project,
    Marketing,
    Other(String),
}

impl ItemCategory {
    pub fn as_str(&self) -> &str {
        match self {
            ItemCategory::Project => "project",
            ItemCategory::Marketing => "marketing",
            ItemCategory::Other(tag) => tag,
        }
    }
}

impl From<String> for ItemCategory {
    fn from(value: String) -> Self {
        match value.as_str() {
            "project" => ItemCategory::Project,
            "marketing" => ItemCategory::Marketing,
            _ => ItemCategory::Other(value),
        }
    }
}

impl From<&str> for ItemCategory {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<ItemCategory> for String {
    fn from(value: ItemCategory) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("invalid ZAR amount: {0}")]
pub struct InvalidAmount(pub f64);

/// Non-negative South African Rand amount, held in whole cents.
///
/// On the wire amounts are plain JSON numbers in rands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Zar(u64);

impl Zar {
    pub const ZERO: Zar = Zar(0);

    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    pub const fn from_rands(rands: u64) -> Self {
        Self(rands.saturating_mul(100))
    }

    pub fn try_from_f64(rands: f64) -> Result<Self, InvalidAmount> {
        if !rands.is_finite() || rands < 0.0 {
            return Err(InvalidAmount(rands));
        }
        let cents = (rands * 100.0).round();
        if cents > u64::MAX as f64 {
            return Err(InvalidAmount(rands));
        }
        Ok(Self(cents as u64))
    }

    pub const fn cents(self) -> u64 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl Add for Zar {
    type Output = Zar;

    fn add(self, rhs: Self) -> Self::Output {
        Zar(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Zar {
    fn sum<I: Iterator<Item = Zar>>(iter: I) -> Self {
        iter.fold(Zar::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Zar> for Zar {
    fn sum<I: Iterator<Item = &'a Zar>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// en-ZA style: `R 17 000`, or `R 1 234,50` when there are cents.
impl fmt::Display for Zar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rands = (self.0 / 100).to_string();
        let cents = self.0 % 100;

        let mut grouped = String::with_capacity(rands.len() + rands.len() / 3);
        for (idx, ch) in rands.chars().enumerate() {
            if idx > 0 && (rands.len() - idx) % 3 == 0 {
                grouped.push(' ');
            }
            grouped.push(ch);
        }

        if cents == 0 {
            write!(f, "R {grouped}")
        } else {
            write!(f, "R {grouped},{cents:02}")
        }
    }
}

impl Serialize for Zar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0 % 100 == 0 {
            serializer.serialize_u64(self.0 / 100)
        } else {
            serializer.serialize_f64(self.as_f64())
        }
    }
}

impl<'de> Deserialize<'de> for Zar {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = f64::deserialize(deserializer)?;
        Zar::try_from_f64(raw).map_err(serde::de::Error::custom)
    }
}
