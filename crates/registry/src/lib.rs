//! Registry of agent-based plug-ins and section resolution.
//!
//! Holds section, check and inventory plug-in definitions for one
//! configuration generation and answers the questions the monitoring engine
//! asks before fetching data: which raw sections feed a set of plug-ins, and
//! whether a parsed section has competing producers that require redetection.
//!
//! # Modules
//!
//! - [`section`] - Agent and SNMP section plug-ins
//! - [`check`] - Check plug-ins and service naming
//! - [`inventory`] - Inventory plug-ins
//! - [`management`] - Management board variants of check plug-ins
//! - [`consistency`] - Item consistency of check ruleset groups
//! - [`ruleset`] - Discovery and host label rule storage
//! - [`store`] - The registry, its queries and generation publication
//! - [`manifest`] - TOML manifests linked against handler tables

pub mod check;
pub mod consistency;
pub mod error;
pub mod inventory;
pub mod management;
pub mod manifest;
mod params;
pub mod ruleset;
pub mod section;
pub mod store;

pub use check::{CheckPlugin, CheckPluginBuilder, CheckResult, ITEM_PLACEHOLDER, Service, State};
pub use cmk_primitives::{
	CheckPluginName, InventoryPluginName, MANAGEMENT_PREFIX, NameError, ParsedSectionName,
	RuleSetName, SectionName,
};
pub use error::{
	DefinitionError, HandlerKind, ItemRequirement, ManifestError, ParseError, RegistrationError,
	Stage,
};
pub use inventory::{InventoryPlugin, InventoryPluginBuilder, InventoryRow};
pub use management::{MANAGEMENT_DESCR_PREFIX, management_plugin_factory};
pub use manifest::{HandlerTable, LinkedPlugins};
pub use params::Parameters;
pub use ruleset::{RuleSpec, RulesetStore};
pub use section::{
	AgentSectionPlugin, ParsedSection, ParsedSections, RawSection, SectionPlugin, SectionSource,
	SnmpSectionPlugin, StringTable,
};
pub use store::{AgentBasedPlugins, PluginRegistry, PluginStore, SharedLoader};
