#![cfg_attr(doc, allow(rustdoc::private_intra_doc_links))]
//! Registry store for agent-based plug-ins.
//!
//! # Purpose
//!
//! Tracks which sections exist, which parsed sections they produce, and which
//! check and inventory plug-ins consume them. The monitoring engine asks it
//! which raw sections to fetch for a set of plug-ins and whether a parsed
//! section has competing producers.
//!
//! # Mental Model
//!
//! 1. **Load Phase:** the plug-in loader calls the `add_*` operations on one
//!    [`PluginRegistry`] per configuration generation. Outcome does not depend
//!    on call order.
//! 2. **Publication:** the finished registry is handed to a [`PluginStore`],
//!    which readers consult through an atomically swapped `Arc`.
//! 3. **Consumption:** readers pin a generation with [`PluginStore::load`] and
//!    use the query operations in [`query`](self::query) or take an
//!    [`AgentBasedPlugins`] snapshot.
//! 4. **Reload:** a new registry is built from scratch and published; live
//!    generations are never mutated field by field.
//!
//! # Key Types
//!
//! | Type | Role |
//! |------|------|
//! | [`PluginRegistry`] | Maps, derived indexes and rulesets of one generation. |
//! | [`AgentBasedPlugins`] | Immutable view of the four plug-in maps. |
//! | [`PluginStore`] | Current generation behind an `ArcSwap`. |
//! | [`SharedLoader`] | Serialises registration when plug-ins load in parallel. |
//!
//! # Invariants
//!
//! - The parsed-name index holds exactly the registered sections.
//!   - Enforced in: [`PluginRegistry::add_section_plugin`].
//!   - Tested by: `store::properties::prop_producers_are_order_independent`.
//!   - Failure symptom: stale producers are fetched, or redetection is skipped.
//!
//! - A section name is never registered as agent and SNMP section at once.
//!   - Enforced in: [`PluginRegistry::add_section_plugin`].
//!   - Tested by: `store::tests::reregistering_under_other_source_moves_section`.
//!   - Failure symptom: lookups return the agent flavour of an SNMP section.
//!
//! - Check ruleset groups are item-consistent at all times.
//!   - Enforced in: [`crate::consistency::validate_check_ruleset_item_consistency`].
//!   - Tested by: `store::tests::conflicting_check_plugin_is_not_registered`.
//!   - Failure symptom: a rejected plug-in is visible in lookups.
//!
//! - Management variants are derived, never stored.
//!   - Enforced in: [`PluginRegistry::get_check_plugin`].
//!   - Tested by: `store::tests::management_variant_is_derived_on_every_call`.

mod query;
mod runtime;
mod snapshot;

use std::sync::Arc;

use cmk_primitives::{CheckPluginName, InventoryPluginName, ParsedSectionName, RuleSetName, SectionName};
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

pub use runtime::{PluginStore, SharedLoader};
pub use snapshot::AgentBasedPlugins;

use crate::check::CheckPlugin;
use crate::consistency::{PluginsByRuleset, validate_check_ruleset_item_consistency};
use crate::error::RegistrationError;
use crate::inventory::InventoryPlugin;
use crate::ruleset::{RuleSpec, RulesetStore};
use crate::section::{AgentSectionPlugin, SectionPlugin, SectionSource, SnmpSectionPlugin};

/// Lookup map used throughout the registry.
pub type Map<K, V> = FxHashMap<K, V>;

/// Section plug-ins grouped by parsed name, then by section name.
pub(crate) type SectionsByParsedName = Map<ParsedSectionName, Map<SectionName, SectionPlugin>>;

/// Registered plug-ins and rulesets of one configuration generation.
///
/// Plug-in maps are shared with snapshots and copied on the next write.
#[derive(Clone, Default)]
pub struct PluginRegistry {
	agent_sections: Arc<Map<SectionName, Arc<AgentSectionPlugin>>>,
	snmp_sections: Arc<Map<SectionName, Arc<SnmpSectionPlugin>>>,
	check_plugins: Arc<Map<CheckPluginName, Arc<CheckPlugin>>>,
	inventory_plugins: Arc<Map<InventoryPluginName, Arc<InventoryPlugin>>>,
	rulesets: RulesetStore,
	check_plugins_by_ruleset: PluginsByRuleset,
	sections_by_parsed_name: SectionsByParsedName,
}

impl PluginRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a section plug-in. The last registration of a name wins.
	pub fn add_section_plugin(&mut self, plugin: impl Into<SectionPlugin>) {
		let plugin = plugin.into();
		let name = plugin.name().clone();

		if let Some(previous) = self.get_section_plugin(&name) {
			self.forget_section(&previous, &plugin);
		}

		self.sections_by_parsed_name
			.entry(plugin.parsed_section_name().clone())
			.or_default()
			.insert(name.clone(), plugin.clone());

		debug!(
			section = %name,
			parsed_section = %plugin.parsed_section_name(),
			source = %plugin.source(),
			"registered section plug-in"
		);
		match plugin {
			SectionPlugin::Agent(p) => {
				Arc::make_mut(&mut self.agent_sections).insert(name, p);
			}
			SectionPlugin::Snmp(p) => {
				Arc::make_mut(&mut self.snmp_sections).insert(name, p);
			}
		}
	}

	/// Drops index and map entries of `previous` that `next` will not overwrite.
	fn forget_section(&mut self, previous: &SectionPlugin, next: &SectionPlugin) {
		if previous.ptr_eq(next) {
			return;
		}
		let name = previous.name();
		let parsed = previous.parsed_section_name();

		if parsed != next.parsed_section_name() {
			warn!(
				section = %name,
				from = %parsed,
				to = %next.parsed_section_name(),
				"section plug-in re-registered under another parsed section name"
			);
			if let Some(producers) = self.sections_by_parsed_name.get_mut(parsed) {
				producers.remove(name);
				if producers.is_empty() {
					self.sections_by_parsed_name.remove(parsed);
				}
			}
		}

		if previous.source() != next.source() {
			warn!(
				section = %name,
				from = %previous.source(),
				to = %next.source(),
				"section plug-in re-registered with another data source"
			);
			match previous.source() {
				SectionSource::Agent => {
					Arc::make_mut(&mut self.agent_sections).remove(name);
				}
				SectionSource::Snmp => {
					Arc::make_mut(&mut self.snmp_sections).remove(name);
				}
			}
		}
	}

	/// Registers a check plug-in after validating its ruleset group.
	///
	/// On error the registry is left unchanged.
	pub fn add_check_plugin(
		&mut self,
		plugin: impl Into<Arc<CheckPlugin>>,
	) -> Result<(), RegistrationError> {
		let plugin = plugin.into();
		validate_check_ruleset_item_consistency(&plugin, &self.check_plugins_by_ruleset)?;

		let name = plugin.name().clone();
		if let Some(previous) = Arc::make_mut(&mut self.check_plugins).insert(name.clone(), plugin.clone())
			&& let Some(group) = self
				.check_plugins_by_ruleset
				.get_mut(&previous.check_ruleset_name)
		{
			group.retain(|p| p.name() != &name);
		}
		debug!(
			plugin = %name,
			ruleset = ?plugin.check_ruleset_name().map(RuleSetName::as_str),
			"registered check plug-in"
		);
		self.check_plugins_by_ruleset
			.entry(plugin.check_ruleset_name.clone())
			.or_default()
			.push(plugin);
		Ok(())
	}

	pub fn add_inventory_plugin(&mut self, plugin: impl Into<Arc<InventoryPlugin>>) {
		let plugin = plugin.into();
		debug!(plugin = %plugin.name(), "registered inventory plug-in");
		Arc::make_mut(&mut self.inventory_plugins).insert(plugin.name().clone(), plugin);
	}

	/// Makes a discovery ruleset known. Stored rules are kept.
	pub fn add_discovery_ruleset(&mut self, name: RuleSetName) {
		self.rulesets.ensure(name);
	}

	/// Makes a host label ruleset known. Shares storage with discovery rulesets.
	pub fn add_host_label_ruleset(&mut self, name: RuleSetName) {
		self.rulesets.ensure(name);
	}

	/// Replaces the rules of a discovery ruleset.
	pub fn set_discovery_ruleset(&mut self, name: RuleSetName, rules: Vec<RuleSpec>) {
		self.rulesets.set(name, rules);
	}

	/// Replaces the rules of a host label ruleset. Shares storage with discovery rulesets.
	pub fn set_host_label_ruleset(&mut self, name: RuleSetName, rules: Vec<RuleSpec>) {
		self.rulesets.set(name, rules);
	}

	/// Returns the rules of a discovery ruleset, empty if unknown.
	pub fn get_discovery_ruleset(&self, name: &RuleSetName) -> &[RuleSpec] {
		self.rulesets.get(name)
	}

	/// Returns the rules of a host label ruleset, empty if unknown.
	pub fn get_host_label_ruleset(&self, name: &RuleSetName) -> &[RuleSpec] {
		self.rulesets.get(name)
	}

	/// Immutable view of the four plug-in maps as registered so far.
	pub fn snapshot(&self) -> AgentBasedPlugins {
		AgentBasedPlugins {
			agent_sections: self.agent_sections.clone(),
			snmp_sections: self.snmp_sections.clone(),
			check_plugins: self.check_plugins.clone(),
			inventory_plugins: self.inventory_plugins.clone(),
		}
	}
}

impl std::fmt::Debug for PluginRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PluginRegistry")
			.field("agent_sections", &self.agent_sections.len())
			.field("snmp_sections", &self.snmp_sections.len())
			.field("check_plugins", &self.check_plugins.len())
			.field("inventory_plugins", &self.inventory_plugins.len())
			.field("rulesets", &self.rulesets.len())
			.finish()
	}
}

#[cfg(test)]
pub(crate) mod test_fixtures;

#[cfg(test)]
mod properties;

#[cfg(test)]
mod tests;
