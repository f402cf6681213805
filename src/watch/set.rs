//! Tick-sampled field set bound to one process

use std::collections::HashMap;

use super::{FieldSpec, FieldTable, Observation, Value};
use crate::error::{AutosplitterError, Result};
use crate::memory::{MemoryReader, ProcessRef};

/// All fields of one version's table, sampled as a batch once per tick
#[derive(Debug, Clone)]
pub struct WatchSet {
    fields: Vec<(String, FieldSpec)>,
    module_base: usize,
    is_64_bit: bool,
    observation: Observation,
}

impl WatchSet {
    /// Bind a field table to a process. Nothing is read until [`prime`](Self::prime).
    pub fn bind(table: &FieldTable, process: &ProcessRef) -> Self {
        Self {
            fields: table.iter().map(|(n, s)| (n.clone(), s.clone())).collect(),
            module_base: process.base_address,
            is_64_bit: process.is_64_bit,
            observation: Observation::new(),
        }
    }

    /// Number of watched fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn observation(&self) -> &Observation {
        &self.observation
    }

    /// Sample every field and commit the batch
    ///
    /// If any read fails nothing is committed and the previous
    /// current/old values stay as they were.
    pub fn update(&mut self, reader: &dyn MemoryReader) -> Result<()> {
        let sample = self.sample(reader)?;
        self.observation.commit(sample);
        Ok(())
    }

    /// Double-sample priming: afterwards `old == current` for every field
    pub fn prime(&mut self, reader: &dyn MemoryReader) -> Result<()> {
        let sample = self.sample(reader)?;
        self.observation.commit(sample.clone());
        self.observation.commit(sample);
        log::debug!("Primed {} watched fields", self.fields.len());
        Ok(())
    }

    fn sample(&self, reader: &dyn MemoryReader) -> Result<HashMap<String, Vec<Value>>> {
        let mut staged = HashMap::with_capacity(self.fields.len());

        for (name, spec) in &self.fields {
            let pointer = spec.pointer(self.module_base, self.is_64_bit);
            let stride = spec.element_stride();
            let mut values = Vec::with_capacity(spec.count);

            for index in 0..spec.count.max(1) {
                let element = pointer.shifted(index as i64 * stride);
                let address = element.resolve(reader);
                let value = address.and_then(|a| spec.value_type.read(reader, a));
                match value {
                    Some(v) => values.push(v),
                    None => {
                        return Err(AutosplitterError::ReadFailed {
                            field: name.clone(),
                            address: address.unwrap_or(0),
                        })
                    }
                }
            }

            staged.insert(name.clone(), values);
        }

        Ok(staged)
    }
}
