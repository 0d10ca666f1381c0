//! Identity types for the agent-based plug-in registry.

/// Validated section, plug-in and ruleset names.
pub mod name;

pub use name::{
	CheckPluginName, InventoryPluginName, MANAGEMENT_PREFIX, NameError, ParsedSectionName,
	RuleSetName, SectionName,
};
