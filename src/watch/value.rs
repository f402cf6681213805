//! Typed values sampled from game memory

use serde::{Deserialize, Serialize};

use crate::memory::MemoryReader;

/// A single sampled value
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    U64(u64),
    I64(i64),
    F32(f32),
    Bool(bool),
}

impl Value {
    /// Convert to i64 (floats truncate, bools are 0/1)
    pub fn as_i64(&self) -> i64 {
        match *self {
            Value::U8(v) => v as i64,
            Value::I8(v) => v as i64,
            Value::U16(v) => v as i64,
            Value::I16(v) => v as i64,
            Value::U32(v) => v as i64,
            Value::I32(v) => v as i64,
            Value::U64(v) => v as i64,
            Value::I64(v) => v,
            Value::F32(v) => v as i64,
            Value::Bool(b) => b as i64,
        }
    }

    /// Convert to f64
    pub fn as_f64(&self) -> f64 {
        match *self {
            Value::F32(v) => v as f64,
            Value::U64(v) => v as f64,
            other => other.as_i64() as f64,
        }
    }

    /// Convert to boolean (non-zero = true)
    pub fn as_bool(&self) -> bool {
        match *self {
            Value::Bool(b) => b,
            Value::F32(v) => v != 0.0,
            other => other.as_i64() != 0,
        }
    }
}

/// Memory representation of a watched field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    F32,
    Bool,
}

impl ValueType {
    /// Size in bytes
    pub fn size(&self) -> usize {
        match self {
            ValueType::U8 | ValueType::I8 | ValueType::Bool => 1,
            ValueType::U16 | ValueType::I16 => 2,
            ValueType::U32 | ValueType::I32 | ValueType::F32 => 4,
            ValueType::U64 | ValueType::I64 => 8,
        }
    }

    /// Read one value of this type at `address`
    pub fn read(&self, reader: &dyn MemoryReader, address: usize) -> Option<Value> {
        Some(match self {
            ValueType::U8 => Value::U8(reader.read_u8(address)?),
            ValueType::I8 => Value::I8(reader.read_i8(address)?),
            ValueType::U16 => Value::U16(reader.read_u16(address)?),
            ValueType::I16 => Value::I16(reader.read_i16(address)?),
            ValueType::U32 => Value::U32(reader.read_u32(address)?),
            ValueType::I32 => Value::I32(reader.read_i32(address)?),
            ValueType::U64 => Value::U64(reader.read_u64(address)?),
            ValueType::I64 => Value::I64(reader.read_i64(address)?),
            ValueType::F32 => Value::F32(reader.read_f32(address)?),
            ValueType::Bool => Value::Bool(reader.read_bool(address)?),
        })
    }
}
