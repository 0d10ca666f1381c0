//! Immutable view of registered plug-ins.

use std::sync::Arc;

use cmk_primitives::{CheckPluginName, InventoryPluginName, SectionName};

use super::Map;
use crate::check::CheckPlugin;
use crate::inventory::InventoryPlugin;
use crate::section::{AgentSectionPlugin, SnmpSectionPlugin};

/// The four plug-in maps of a registry at the time of the snapshot.
///
/// Holding a snapshot keeps the definitions alive; later registrations on the
/// source registry copy its maps instead of mutating these.
#[derive(Clone, Default)]
pub struct AgentBasedPlugins {
	pub agent_sections: Arc<Map<SectionName, Arc<AgentSectionPlugin>>>,
	pub snmp_sections: Arc<Map<SectionName, Arc<SnmpSectionPlugin>>>,
	pub check_plugins: Arc<Map<CheckPluginName, Arc<CheckPlugin>>>,
	pub inventory_plugins: Arc<Map<InventoryPluginName, Arc<InventoryPlugin>>>,
}

impl AgentBasedPlugins {
	/// Total number of registered plug-ins.
	pub fn len(&self) -> usize {
		self.agent_sections.len()
			+ self.snmp_sections.len()
			+ self.check_plugins.len()
			+ self.inventory_plugins.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

impl std::fmt::Debug for AgentBasedPlugins {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AgentBasedPlugins")
			.field("agent_sections", &self.agent_sections.len())
			.field("snmp_sections", &self.snmp_sections.len())
			.field("check_plugins", &self.check_plugins.len())
			.field("inventory_plugins", &self.inventory_plugins.len())
			.finish()
	}
}
