//! Canonical contract fields
//!
//! Every template and every query is described along the same four axes.
//! [`FieldMap`] stores one value per axis in canonical order, so a record can
//! never carry two vectors for the same field.

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

use crate::Vector;

/// One of the four structured aspects of a contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldName {
    /// What the contract is about (goods, works, services)
    SubjectMatter,
    /// Who signs it and in which role
    Parties,
    /// Pricing model, installments, payment method
    PricePayment,
    /// Delivery, acceptance, schedule, warranty
    PerformanceTerms,
}

impl FieldName {
    /// All fields in canonical order
    pub const ALL: [FieldName; 4] = [
        FieldName::SubjectMatter,
        FieldName::Parties,
        FieldName::PricePayment,
        FieldName::PerformanceTerms,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        match self {
            FieldName::SubjectMatter => 0,
            FieldName::Parties => 1,
            FieldName::PricePayment => 2,
            FieldName::PerformanceTerms => 3,
        }
    }

    /// Key used in JSON payloads
    pub const fn as_str(self) -> &'static str {
        match self {
            FieldName::SubjectMatter => "subject_matter",
            FieldName::Parties => "parties",
            FieldName::PricePayment => "price_payment",
            FieldName::PerformanceTerms => "performance_terms",
        }
    }

    /// Positional key used by older catalogs and clients (`text1`..`text4`)
    pub const fn legacy_key(self) -> &'static str {
        match self {
            FieldName::SubjectMatter => "text1",
            FieldName::Parties => "text2",
            FieldName::PricePayment => "text3",
            FieldName::PerformanceTerms => "text4",
        }
    }

    /// Human-readable label for summaries
    pub const fn label(self) -> &'static str {
        match self {
            FieldName::SubjectMatter => "合同标的",
            FieldName::Parties => "合同主体",
            FieldName::PricePayment => "合同价款与支付",
            FieldName::PerformanceTerms => "合同交易条款",
        }
    }

    /// Parse either the canonical or the legacy key. Unknown keys yield `None`.
    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == key || f.legacy_key() == key)
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FieldName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FieldName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = String::deserialize(deserializer)?;
        FieldName::parse(&key)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown field name: {key}")))
    }
}

/// Fixed-size map holding exactly one slot per [`FieldName`]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldMap<T> {
    slots: [T; 4],
}

impl<T> FieldMap<T> {
    pub fn from_fn(mut f: impl FnMut(FieldName) -> T) -> Self {
        Self {
            slots: FieldName::ALL.map(&mut f),
        }
    }

    #[inline]
    pub fn get(&self, field: FieldName) -> &T {
        &self.slots[field.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, field: FieldName) -> &mut T {
        &mut self.slots[field.index()]
    }

    #[inline]
    pub fn set(&mut self, field: FieldName, value: T) {
        self.slots[field.index()] = value;
    }

    /// Iterate `(field, value)` pairs in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (FieldName, &T)> {
        FieldName::ALL.into_iter().zip(self.slots.iter())
    }

    pub fn map<U>(&self, mut f: impl FnMut(FieldName, &T) -> U) -> FieldMap<U> {
        FieldMap::from_fn(|field| f(field, self.get(field)))
    }
}

impl<T> IntoIterator for FieldMap<T> {
    type Item = (FieldName, T);
    type IntoIter = std::iter::Zip<std::array::IntoIter<FieldName, 4>, std::array::IntoIter<T, 4>>;

    fn into_iter(self) -> Self::IntoIter {
        FieldName::ALL.into_iter().zip(self.slots)
    }
}

impl<T: Serialize> Serialize for FieldMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4))?;
        for (field, value) in self.iter() {
            map.serialize_entry(field.as_str(), value)?;
        }
        map.end()
    }
}

struct FieldMapVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de> + Default> Visitor<'de> for FieldMapVisitor<T> {
    type Value = FieldMap<T>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map keyed by contract field name")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut out = FieldMap::<T>::default();
        while let Some(key) = access.next_key::<String>()? {
            match FieldName::parse(&key) {
                Some(field) => out.set(field, access.next_value()?),
                // Unrecognized keys are ignored, value is still consumed
                None => {
                    access.next_value::<serde::de::IgnoredAny>()?;
                }
            }
        }
        Ok(out)
    }
}

impl<'de, T: Deserialize<'de> + Default> Deserialize<'de> for FieldMap<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(FieldMapVisitor(PhantomData))
    }
}

/// Per-field embedding vectors; a `None` slot means "no usable vector"
pub type FieldVectors = FieldMap<Option<Vector>>;

impl FieldVectors {
    /// Number of fields that carry a vector
    pub fn present_count(&self) -> usize {
        self.iter().filter(|(_, v)| v.is_some()).count()
    }

    /// Drop empty vectors so they behave like missing ones
    pub fn without_empty(mut self) -> Self {
        for field in FieldName::ALL {
            if self.get(field).as_ref().is_some_and(Vector::is_empty) {
                self.set(field, None);
            }
        }
        self
    }
}

/// Per-field source text
pub type FieldTexts = FieldMap<String>;
