//! Parameter and subscription checks shared by check and inventory plug-ins.

use cmk_primitives::{ParsedSectionName, RuleSetName};
use rustc_hash::FxHashSet;

use crate::error::{DefinitionError, Stage};

/// Plug-in parameters: a table of JSON values.
pub type Parameters = serde_json::Map<String, serde_json::Value>;

/// Default parameters and their ruleset come together or not at all.
pub(crate) fn validate_default_parameters(
	plugin: &str,
	stage: Stage,
	defaults: Option<&Parameters>,
	ruleset: Option<&RuleSetName>,
) -> Result<(), DefinitionError> {
	match (defaults, ruleset) {
		(Some(_), None) => Err(DefinitionError::MissingRulesetName {
			plugin: plugin.to_owned(),
			stage,
		}),
		(None, Some(ruleset)) => Err(DefinitionError::MissingDefaultParameters {
			plugin: plugin.to_owned(),
			stage,
			ruleset: ruleset.clone(),
		}),
		_ => Ok(()),
	}
}

/// Rejects duplicate subscriptions, keeping the declared order.
pub(crate) fn validate_sections(
	plugin: &str,
	sections: &[ParsedSectionName],
) -> Result<(), DefinitionError> {
	let mut seen = FxHashSet::default();
	for section in sections {
		if !seen.insert(section) {
			return Err(DefinitionError::DuplicateSection {
				plugin: plugin.to_owned(),
				section: section.clone(),
			});
		}
	}
	Ok(())
}
