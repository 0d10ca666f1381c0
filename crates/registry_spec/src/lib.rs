//! Manifest specs for agent-based plug-ins.
//!
//! These types mirror the plug-in definitions of `cmk-registry` but carry
//! plain strings and handler names instead of validated names and function
//! values. Linking them against a handler table happens in the registry
//! crate.

pub mod check;
pub mod inventory;
pub mod section;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use check::CheckPluginSpec;
pub use inventory::InventoryPluginSpec;
pub use section::{AgentSectionSpec, DetectAtomSpec, SnmpSectionSpec, SnmpTreeSpec};

/// Opaque rule specification as handed over by the rule-matching engine.
pub type RuleSpecValue = serde_json::Value;

/// A complete plug-in manifest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestSpec {
	#[serde(default, rename = "agent_section")]
	pub agent_sections: Vec<AgentSectionSpec>,
	#[serde(default, rename = "snmp_section")]
	pub snmp_sections: Vec<SnmpSectionSpec>,
	#[serde(default, rename = "check_plugin")]
	pub check_plugins: Vec<CheckPluginSpec>,
	#[serde(default, rename = "inventory_plugin")]
	pub inventory_plugins: Vec<InventoryPluginSpec>,
	/// Materialised rules keyed by ruleset name.
	#[serde(default)]
	pub rulesets: BTreeMap<String, Vec<RuleSpecValue>>,
}

impl ManifestSpec {
	/// Total number of plug-in entries in this manifest.
	pub fn plugin_count(&self) -> usize {
		self.agent_sections.len()
			+ self.snmp_sections.len()
			+ self.check_plugins.len()
			+ self.inventory_plugins.len()
	}
}
