//! Attributes: value arrays aligned to one vertex set's ordered index space.
//!
//! `defined[i] == false` means slot `i` holds the type's zero value and
//! carries no meaning. Accessors that return a single value honour the mask.

use crate::error::{Result, SphynxError};

fn check_aligned(kind: &str, lens: &[usize]) -> Result<()> {
    if lens.windows(2).any(|w| w[0] != w[1]) {
        return Err(SphynxError::InvalidEntity(format!(
            "{} columns differ in length: {:?}",
            kind, lens
        )));
    }
    Ok(())
}

// ── DoubleAttribute ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DoubleAttribute {
    values: Vec<f64>,
    defined: Vec<bool>,
}

impl DoubleAttribute {
    pub fn new(values: Vec<f64>, defined: Vec<bool>) -> Result<Self> {
        check_aligned("DoubleAttribute", &[values.len(), defined.len()])?;
        Ok(Self { values, defined })
    }

    pub fn len(&self) -> usize {
        self.defined.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defined.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn defined(&self) -> &[bool] {
        &self.defined
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        match self.defined.get(index) {
            Some(true) => Some(self.values[index]),
            _ => None,
        }
    }
}

// ── StringAttribute ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StringAttribute {
    values: Vec<String>,
    defined: Vec<bool>,
}

impl StringAttribute {
    pub fn new(values: Vec<String>, defined: Vec<bool>) -> Result<Self> {
        check_aligned("StringAttribute", &[values.len(), defined.len()])?;
        Ok(Self { values, defined })
    }

    pub fn len(&self) -> usize {
        self.defined.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defined.is_empty()
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn defined(&self) -> &[bool] {
        &self.defined
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        match self.defined.get(index) {
            Some(true) => Some(self.values[index].as_str()),
            _ => None,
        }
    }
}

// ── DoubleTuple2Attribute ──────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DoubleTuple2Attribute {
    values1: Vec<f64>,
    values2: Vec<f64>,
    defined: Vec<bool>,
}

impl DoubleTuple2Attribute {
    pub fn new(values1: Vec<f64>, values2: Vec<f64>, defined: Vec<bool>) -> Result<Self> {
        check_aligned(
            "DoubleTuple2Attribute",
            &[values1.len(), values2.len(), defined.len()],
        )?;
        Ok(Self {
            values1,
            values2,
            defined,
        })
    }

    pub fn len(&self) -> usize {
        self.defined.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defined.is_empty()
    }

    pub fn values1(&self) -> &[f64] {
        &self.values1
    }

    pub fn values2(&self) -> &[f64] {
        &self.values2
    }

    pub fn defined(&self) -> &[bool] {
        &self.defined
    }

    pub fn get(&self, index: usize) -> Option<(f64, f64)> {
        match self.defined.get(index) {
            Some(true) => Some((self.values1[index], self.values2[index])),
            _ => None,
        }
    }
}
