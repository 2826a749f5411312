use serde::Deserialize;
use serde_json::Value;

use crate::{MappingConfig, MappingEntry, ProfileError, Size};

/// A profile before its entries are decoded.
#[derive(Debug, Deserialize)]
pub(crate) struct RawMappingConfig {
    #[serde(default)]
    title: String,
    version: String,
    original_size: Size,
    mappings: Vec<Value>,
}

impl TryFrom<RawMappingConfig> for MappingConfig {
    type Error = ProfileError;

    fn try_from(raw: RawMappingConfig) -> Result<Self, Self::Error> {
        if !raw.original_size.is_valid() {
            return Err(ProfileError::InvalidOriginalSize {
                width: raw.original_size.width,
                height: raw.original_size.height,
            });
        }

        let mut mappings = Vec::with_capacity(raw.mappings.len());
        for (index, value) in raw.mappings.into_iter().enumerate() {
            let type_name = match value.get("type") {
                Some(Value::String(name)) => name.clone(),
                _ => return Err(ProfileError::MissingType { index }),
            };
            let entry = MappingEntry::from_value(value).map_err(|source| {
                ProfileError::Entry {
                    index,
                    type_name,
                    source,
                }
            })?;
            mappings.push(entry);
        }

        Ok(MappingConfig {
            title: raw.title,
            version: raw.version,
            original_size: raw.original_size,
            mappings,
        })
    }
}

/// Parse a JSON mapping profile. Fails on the first malformed entry.
pub fn parse_mapping_config(input: &str) -> Result<MappingConfig, ProfileError> {
    let raw: RawMappingConfig = serde_json::from_str(input)?;
    MappingConfig::try_from(raw)
}

/// Serialize a profile the way it is stored on disk.
pub fn to_json(config: &MappingConfig) -> Result<String, ProfileError> {
    Ok(serde_json::to_string_pretty(config)?)
}
