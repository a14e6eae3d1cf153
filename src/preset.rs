use crate::error::EngineError;
use crate::filter::{Filter, FilterRepr};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone)]
struct Preset {
    name: String,
    filters: Vec<Filter>,
}

/// Named snapshots of a filter set, listed in insertion order.
#[derive(Debug, Default, Clone)]
pub struct PresetStore {
    presets: Vec<Preset>,
}

/// Persisted form of one preset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredPreset {
    pub name: String,
    pub filters: Vec<FilterRepr>,
}

impl PresetStore {
    /// Saves under `name`, overwriting an existing preset in place.
    pub fn save(&mut self, name: &str, filters: &[Filter]) -> Result<(), EngineError> {
        validate_name(name)?;
        match self.presets.iter_mut().find(|preset| preset.name == name) {
            Some(preset) => preset.filters = filters.to_vec(),
            None => self.presets.push(Preset {
                name: name.to_string(),
                filters: filters.to_vec(),
            }),
        }
        Ok(())
    }

    pub fn load(&self, name: &str) -> Result<Vec<Filter>, EngineError> {
        validate_name(name)?;
        self.presets
            .iter()
            .find(|preset| preset.name == name)
            .map(|preset| preset.filters.clone())
            .ok_or_else(|| EngineError::PresetNotFound(name.to_string()))
    }

    pub fn list_names(&self) -> Vec<&str> {
        self.presets
            .iter()
            .map(|preset| preset.name.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    pub fn to_stored(&self) -> Vec<StoredPreset> {
        self.presets
            .iter()
            .map(|preset| StoredPreset {
                name: preset.name.clone(),
                filters: preset
                    .filters
                    .iter()
                    .cloned()
                    .map(FilterRepr::from)
                    .collect(),
            })
            .collect()
    }

    /// Restores from stored form. Filters that no longer convert are dropped
    /// entry by entry; the preset itself survives.
    pub fn from_stored(stored: Vec<StoredPreset>) -> Self {
        let mut presets = Vec::with_capacity(stored.len());
        for entry in stored {
            let mut filters = Vec::with_capacity(entry.filters.len());
            for repr in entry.filters {
                match Filter::try_from(repr) {
                    Ok(filter) => filters.push(filter),
                    Err(err) => {
                        warn!(preset = %entry.name, error = %err, "skipping stored filter")
                    }
                }
            }
            presets.push(Preset {
                name: entry.name,
                filters,
            });
        }
        Self { presets }
    }
}

fn validate_name(name: &str) -> Result<(), EngineError> {
    if name.is_empty() || !name.chars().all(char::is_alphanumeric) {
        return Err(EngineError::InvalidPresetName);
    }
    Ok(())
}
