//! Read-only resolution operations used by the monitoring engine.
//!
//! Lookups never fail: absence is `None` or an empty collection, because
//! callers routinely probe for optional plug-ins and management variants.

use std::borrow::Borrow;
use std::sync::Arc;

use cmk_primitives::{CheckPluginName, InventoryPluginName, ParsedSectionName, RuleSetName, SectionName};
use rustc_hash::FxHashSet;
use tracing::{debug, trace};

use super::{Map, PluginRegistry};
use crate::check::CheckPlugin;
use crate::inventory::InventoryPlugin;
use crate::management::management_plugin_factory;
use crate::section::SectionPlugin;

impl PluginRegistry {
	/// Returns a check plug-in, deriving management variants on the fly.
	///
	/// A management name that is not registered itself resolves through its
	/// basic name. The derived plug-in is not stored.
	pub fn get_check_plugin(&self, name: &CheckPluginName) -> Option<Arc<CheckPlugin>> {
		if let Some(plugin) = self.check_plugins.get(name) {
			return Some(plugin.clone());
		}
		if !name.is_management_name() {
			return None;
		}
		let basic = self.check_plugins.get(&name.create_basic_name().ok()?)?;
		management_plugin_factory(basic).ok().map(Arc::new)
	}

	pub fn get_inventory_plugin(&self, name: &InventoryPluginName) -> Option<Arc<InventoryPlugin>> {
		self.inventory_plugins.get(name).cloned()
	}

	/// Looks up a section in the agent map, then in the SNMP map.
	pub fn get_section_plugin(&self, name: &SectionName) -> Option<SectionPlugin> {
		if let Some(plugin) = self.agent_sections.get(name) {
			return Some(SectionPlugin::Agent(plugin.clone()));
		}
		self.snmp_sections
			.get(name)
			.map(|plugin| SectionPlugin::Snmp(plugin.clone()))
	}

	/// Returns the names of all sections producing `parsed`.
	pub fn get_section_producers(&self, parsed: &ParsedSectionName) -> FxHashSet<SectionName> {
		self.sections_by_parsed_name
			.get(parsed)
			.map(|producers| producers.keys().cloned().collect())
			.unwrap_or_default()
	}

	fn producer_count(&self, parsed: &ParsedSectionName) -> usize {
		self.sections_by_parsed_name
			.get(parsed)
			.map_or(0, |producers| producers.len())
	}

	/// Returns true if the parsed section of `section` has more than one producer.
	///
	/// An unregistered section is treated as producing the parsed section of
	/// the same name.
	pub fn needs_redetection(&self, section: &SectionName) -> bool {
		let parsed = match self.get_section_plugin(section) {
			Some(plugin) => plugin.parsed_section_name().clone(),
			None => {
				debug!(
					section = %section,
					"redetection queried for unregistered section, using its name as parsed section name"
				);
				ParsedSectionName::from(section)
			}
		};
		self.producer_count(&parsed) > 1
	}

	/// Returns every raw section that may feed the given plug-ins.
	///
	/// All producers of each subscribed parsed section are included; which one
	/// supplies data is decided at fetch time. Unknown plug-in names are skipped.
	pub fn get_relevant_raw_sections<C, I>(
		&self,
		check_plugin_names: C,
		inventory_plugin_names: I,
	) -> Map<SectionName, SectionPlugin>
	where
		C: IntoIterator,
		C::Item: Borrow<CheckPluginName>,
		I: IntoIterator,
		I::Item: Borrow<InventoryPluginName>,
	{
		let mut parsed_section_names: FxHashSet<ParsedSectionName> = FxHashSet::default();

		for name in check_plugin_names {
			let name = name.borrow();
			match self.get_check_plugin(name) {
				Some(plugin) => parsed_section_names.extend(plugin.sections().iter().cloned()),
				None => trace!(plugin = %name, "skipping unknown check plug-in"),
			}
		}

		for name in inventory_plugin_names {
			let name = name.borrow();
			match self.inventory_plugins.get(name) {
				Some(plugin) => parsed_section_names.extend(plugin.sections().iter().cloned()),
				None => trace!(plugin = %name, "skipping unknown inventory plug-in"),
			}
		}

		parsed_section_names
			.iter()
			.filter_map(|parsed| self.sections_by_parsed_name.get(parsed))
			.flat_map(|producers| producers.iter())
			.map(|(name, plugin)| (name.clone(), plugin.clone()))
			.collect()
	}

	#[inline]
	pub fn is_registered_check_plugin(&self, name: &CheckPluginName) -> bool {
		self.check_plugins.contains_key(name)
	}

	#[inline]
	pub fn is_registered_inventory_plugin(&self, name: &InventoryPluginName) -> bool {
		self.inventory_plugins.contains_key(name)
	}

	#[inline]
	pub fn is_registered_section_plugin(&self, name: &SectionName) -> bool {
		self.agent_sections.contains_key(name) || self.snmp_sections.contains_key(name)
	}

	#[inline]
	pub fn is_stored_ruleset(&self, name: &RuleSetName) -> bool {
		self.rulesets.contains(name)
	}

	/// Names of all known discovery rulesets.
	///
	/// Yields the same names as [`Self::iter_all_host_label_rulesets`]; both
	/// kinds share one store.
	pub fn iter_all_discovery_rulesets(&self) -> impl Iterator<Item = &RuleSetName> + '_ {
		self.rulesets.names()
	}

	/// Names of all known host label rulesets.
	pub fn iter_all_host_label_rulesets(&self) -> impl Iterator<Item = &RuleSetName> + '_ {
		self.rulesets.names()
	}
}
