//! Storage for discovery and host label rulesets.
//!
//! Discovery and host label rulesets live in one map. A section's host label
//! function and a check plug-in's discovery function may share a ruleset, so
//! both views resolve through the same entry.

use std::sync::Arc;

use cmk_primitives::RuleSetName;
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

/// Opaque rule specification. Matching happens elsewhere.
pub type RuleSpec = serde_json::Value;

/// Rulesets keyed by name, in first-reference order.
#[derive(Debug, Clone, Default)]
pub struct RulesetStore {
	rules: IndexMap<RuleSetName, Arc<[RuleSpec]>, FxBuildHasher>,
}

impl RulesetStore {
	/// Makes `name` known, leaving stored rules untouched.
	pub fn ensure(&mut self, name: RuleSetName) {
		self.rules.entry(name).or_insert_with(|| Arc::from(Vec::<RuleSpec>::new()));
	}

	/// Replaces the rules stored under `name`.
	pub fn set(&mut self, name: RuleSetName, rules: Vec<RuleSpec>) {
		self.rules.insert(name, Arc::from(rules));
	}

	/// Returns the stored rules, or an empty slice for unknown names.
	pub fn get(&self, name: &RuleSetName) -> &[RuleSpec] {
		match self.rules.get(name) {
			Some(rules) => &rules[..],
			None => &[],
		}
	}

	pub fn contains(&self, name: &RuleSetName) -> bool {
		self.rules.contains_key(name)
	}

	pub fn names(&self) -> impl Iterator<Item = &RuleSetName> + '_ {
		self.rules.keys()
	}

	pub fn len(&self) -> usize {
		self.rules.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rules.is_empty()
	}
}
