//! Cross-plug-in invariants enforced at registration time.
//!
//! # Invariants
//!
//! - All check plug-ins sharing a `check_ruleset_name` agree on whether their
//!   services carry an item.
//!   - Enforced in: [`validate_check_ruleset_item_consistency`], called by
//!     [`crate::store::PluginRegistry::add_check_plugin`] before insertion.
//!   - Failure symptom: parameters of one plug-in fail to apply to its
//!     siblings when rules are evaluated per item.

use std::sync::Arc;

use cmk_primitives::RuleSetName;
use rustc_hash::FxHashMap;

use crate::check::CheckPlugin;
use crate::error::{ItemRequirement, RegistrationError};

/// Check plug-ins grouped by their check ruleset; `None` collects plug-ins without one.
pub type PluginsByRuleset = FxHashMap<Option<RuleSetName>, Vec<Arc<CheckPlugin>>>;

/// Verifies `plugin` against the plug-ins already registered under its check ruleset.
///
/// A plug-in re-registered under its own name is compared against the others only.
pub fn validate_check_ruleset_item_consistency(
	plugin: &CheckPlugin,
	by_ruleset: &PluginsByRuleset,
) -> Result<(), RegistrationError> {
	let Some(ruleset) = plugin.check_ruleset_name() else {
		return Ok(());
	};
	let Some(group) = by_ruleset.get(&Some(ruleset.clone())) else {
		return Ok(());
	};

	let present: Vec<&Arc<CheckPlugin>> = group
		.iter()
		.filter(|p| p.name() != plugin.name())
		.collect();
	// Groups are consistent, so the first member speaks for all of them.
	let Some(first) = present.first() else {
		return Ok(());
	};
	let group_has_item = first.has_item();
	if plugin.has_item() == group_has_item {
		return Ok(());
	}

	Err(RegistrationError::RulesetItemConflict {
		ruleset: ruleset.clone(),
		plugin: plugin.name().clone(),
		present: present.iter().map(|p| p.name().clone()).collect(),
		requirement: if group_has_item {
			ItemRequirement::Requires
		} else {
			ItemRequirement::DoesNotSupport
		},
	})
}
