//! Pointer chain resolution
//!
//! A pointer is a base address plus a chain of offsets. When resolving,
//! each offset EXCEPT the last is dereferenced; the last offset is just
//! added to get the final address.

use super::MemoryReader;

/// A pointer with offset chain for resolving nested memory addresses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pointer {
    /// Base address (absolute)
    pub base: i64,
    /// Chain of offsets to follow
    pub offsets: Vec<i64>,
    /// Whether this is a 64-bit process (affects pointer size when dereferencing)
    pub is_64_bit: bool,
}

impl Pointer {
    /// Create a pointer with specific values
    pub fn new(base: i64, offsets: Vec<i64>, is_64_bit: bool) -> Self {
        Self { base, offsets, is_64_bit }
    }

    /// A copy of this pointer whose final address is shifted by `delta`
    ///
    /// Used for array elements: only the last hop moves, intermediate
    /// dereferences stay the same.
    pub fn shifted(&self, delta: i64) -> Self {
        let mut copy = self.clone();
        match copy.offsets.last_mut() {
            Some(last) => *last += delta,
            None => copy.base += delta,
        }
        copy
    }

    /// Resolve the pointer chain to get the final address
    ///
    /// Returns `None` if any intermediate read fails or hits a null pointer.
    pub fn resolve(&self, reader: &dyn MemoryReader) -> Option<usize> {
        let mut ptr = self.base;

        for (i, &offset) in self.offsets.iter().enumerate() {
            let address = ptr.wrapping_add(offset);

            if i + 1 < self.offsets.len() {
                ptr = if self.is_64_bit {
                    reader.read_i64(address as usize)?
                } else {
                    reader.read_u32(address as usize)? as i64
                };

                if ptr == 0 {
                    return None;
                }
            } else {
                ptr = address;
            }
        }

        if ptr <= 0 {
            None
        } else {
            Some(ptr as usize)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MockMemoryReader;

    #[test]
    fn test_no_offsets_is_base() {
        let reader = MockMemoryReader::new();
        let ptr = Pointer::new(0x1000, vec![], true);
        assert_eq!(ptr.resolve(&reader), Some(0x1000));
    }

    #[test]
    fn test_single_offset_not_dereferenced() {
        let reader = MockMemoryReader::new();
        let ptr = Pointer::new(0x1000, vec![0x20], true);
        assert_eq!(ptr.resolve(&reader), Some(0x1020));
    }

    #[test]
    fn test_chain_64_bit() {
        let reader = MockMemoryReader::new();
        // 0x1000 -> 0x2000, (0x2000 + 0x8) -> 0x3000, final = 0x3000 + 0x10
        reader.write_ptr(0x1000, 0x2000);
        reader.write_ptr(0x2008, 0x3000);

        let ptr = Pointer::new(0x1000, vec![0x0, 0x8, 0x10], true);
        assert_eq!(ptr.resolve(&reader), Some(0x3010));
    }

    #[test]
    fn test_chain_32_bit() {
        let reader = MockMemoryReader::new();
        reader.write_u32(0x1000, 0x5000);

        let ptr = Pointer::new(0x1000, vec![0x0, 0x4], false);
        assert_eq!(ptr.resolve(&reader), Some(0x5004));
    }

    #[test]
    fn test_null_intermediate() {
        let reader = MockMemoryReader::new();
        reader.write_ptr(0x1000, 0);
        let ptr = Pointer::new(0x1000, vec![0x0, 0x10], true);
        assert_eq!(ptr.resolve(&reader), None);
    }

    #[test]
    fn test_unreadable_intermediate() {
        let reader = MockMemoryReader::new();
        let ptr = Pointer::new(0x1000, vec![0x0, 0x10], true);
        assert_eq!(ptr.resolve(&reader), None);
    }

    #[test]
    fn test_shifted() {
        let reader = MockMemoryReader::new();
        reader.write_ptr(0x1000, 0x2000);

        let ptr = Pointer::new(0x1000, vec![0x0, 0x10], true);
        assert_eq!(ptr.shifted(0x8).resolve(&reader), Some(0x2018));

        let flat = Pointer::new(0x1000, vec![], true);
        assert_eq!(flat.shifted(0x4).resolve(&reader), Some(0x1004));
    }
}
