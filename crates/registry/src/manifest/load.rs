//! Manifest file loading.

use std::path::Path;

use cmk_registry_spec::ManifestSpec;

use crate::error::ManifestError;

/// Parses a TOML manifest.
pub fn load_manifest_str(content: &str) -> Result<ManifestSpec, ManifestError> {
	Ok(toml::from_str(content)?)
}

/// Reads and parses a TOML manifest file.
pub fn load_manifest_file(path: &Path) -> Result<ManifestSpec, ManifestError> {
	let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
		path: path.to_path_buf(),
		source,
	})?;
	load_manifest_str(&content)
}
