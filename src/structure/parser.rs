//! Structure file parsing
//!
//! Structure files may be written in YAML or JSON; the format is detected by
//! trial decode, YAML first. Validation only checks what is needed before
//! the first remote call - nested names, URLs and step fields are validated
//! lazily by the remote service itself.

use crate::common::{Error, Result};

use super::spec::StructureDefinition;

/// Decode a structure document from YAML or JSON bytes
///
/// Fails only if both decoders fail, carrying both decoder messages.
pub fn decode(data: &[u8]) -> Result<StructureDefinition> {
    let yaml_err = match serde_yaml::from_slice::<StructureDefinition>(data) {
        Ok(def) => return Ok(def),
        Err(e) => e,
    };

    match serde_json::from_slice::<StructureDefinition>(data) {
        Ok(def) => Ok(def),
        Err(json_err) => Err(Error::Parse {
            yaml: yaml_err.to_string(),
            json: json_err.to_string(),
        }),
    }
}

/// Validate a decoded structure definition
///
/// The project must be resolvable - either an existing project id or a name
/// to create one under - and at least one goal must be declared.
pub fn validate(def: &StructureDefinition) -> Result<()> {
    if !def.project.uses_existing() && def.project.name.is_empty() {
        return Err(Error::validation(
            "project name is required when not using an existing project",
        ));
    }

    if def.goals.is_empty() {
        return Err(Error::validation("at least one goal is required"));
    }

    Ok(())
}

/// Decode and validate a structure document in one call
pub fn parse(data: &[u8]) -> Result<StructureDefinition> {
    let def = decode(data)?;
    validate(&def)?;
    Ok(def)
}
