//! Field tables: where each watched value lives in a given build

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::ValueType;
use crate::memory::Pointer;

/// Named field layouts for one game version
pub type FieldTable = BTreeMap<String, FieldSpec>;

/// Layout of one watched field
///
/// `address` is a chain relative to the main module base: every entry except
/// the last is dereferenced. `[0x1234]` is a static at `base + 0x1234`;
/// `[0x1234, 0x10]` reads the pointer at `base + 0x1234` and adds `0x10`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FieldSpec {
    #[serde(rename = "type")]
    pub value_type: ValueType,
    pub address: Vec<i64>,
    /// Number of consecutive elements (arrays of saved records)
    #[serde(default = "default_count")]
    pub count: usize,
    /// Distance between elements; defaults to the element size
    #[serde(default)]
    pub stride: i64,
}

fn default_count() -> usize {
    1
}

impl FieldSpec {
    /// A scalar field
    pub fn new(value_type: ValueType, address: Vec<i64>) -> Self {
        Self {
            value_type,
            address,
            count: 1,
            stride: 0,
        }
    }

    /// An array field of `count` elements spaced `stride` bytes apart
    pub fn array(value_type: ValueType, address: Vec<i64>, count: usize, stride: i64) -> Self {
        Self {
            value_type,
            address,
            count,
            stride,
        }
    }

    /// Effective element stride
    pub fn element_stride(&self) -> i64 {
        if self.stride > 0 {
            self.stride
        } else {
            self.value_type.size() as i64
        }
    }

    /// Pointer to the first element, anchored at the module base
    pub fn pointer(&self, module_base: usize, is_64_bit: bool) -> Pointer {
        Pointer::new(module_base as i64, self.address.clone(), is_64_bit)
    }
}
