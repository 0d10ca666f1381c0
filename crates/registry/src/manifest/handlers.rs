//! Name to function tables that manifests are linked against.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::check::{CheckFunction, CheckResult, DiscoveryFunction, Service};
use crate::error::{HandlerKind, ManifestError, ParseError};
use crate::inventory::{InventoryFunction, InventoryRow};
use crate::params::Parameters;
use crate::section::{
	AgentParseFunction, ParsedSection, ParsedSections, SnmpParseFunction, StringTable,
};

/// Functions a manifest may reference, one table per kind.
///
/// Handler names are unique per kind; registering a name again replaces the
/// earlier function.
#[derive(Clone, Default)]
pub struct HandlerTable {
	agent_parse: FxHashMap<String, AgentParseFunction>,
	snmp_parse: FxHashMap<String, SnmpParseFunction>,
	discovery: FxHashMap<String, DiscoveryFunction>,
	check: FxHashMap<String, CheckFunction>,
	inventory: FxHashMap<String, InventoryFunction>,
}

impl HandlerTable {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn agent_parse<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
	where
		F: Fn(&StringTable) -> Result<Option<ParsedSection>, ParseError> + Send + Sync + 'static,
	{
		self.agent_parse.insert(name.into(), Arc::new(f));
		self
	}

	pub fn snmp_parse<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
	where
		F: Fn(&[StringTable]) -> Result<Option<ParsedSection>, ParseError> + Send + Sync + 'static,
	{
		self.snmp_parse.insert(name.into(), Arc::new(f));
		self
	}

	pub fn discovery<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
	where
		F: Fn(&Parameters, &ParsedSections) -> Vec<Service> + Send + Sync + 'static,
	{
		self.discovery.insert(name.into(), Arc::new(f));
		self
	}

	pub fn check<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
	where
		F: Fn(Option<&str>, &Parameters, &ParsedSections) -> Vec<CheckResult> + Send + Sync + 'static,
	{
		self.check.insert(name.into(), Arc::new(f));
		self
	}

	pub fn inventory<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
	where
		F: Fn(&Parameters, &ParsedSections) -> Vec<InventoryRow> + Send + Sync + 'static,
	{
		self.inventory.insert(name.into(), Arc::new(f));
		self
	}

	pub(super) fn resolve_agent_parse(&self, plugin: &str, handler: &str) -> Result<AgentParseFunction, ManifestError> {
		lookup(&self.agent_parse, HandlerKind::AgentParse, plugin, handler)
	}

	pub(super) fn resolve_snmp_parse(&self, plugin: &str, handler: &str) -> Result<SnmpParseFunction, ManifestError> {
		lookup(&self.snmp_parse, HandlerKind::SnmpParse, plugin, handler)
	}

	pub(super) fn resolve_discovery(&self, plugin: &str, handler: &str) -> Result<DiscoveryFunction, ManifestError> {
		lookup(&self.discovery, HandlerKind::Discovery, plugin, handler)
	}

	pub(super) fn resolve_check(&self, plugin: &str, handler: &str) -> Result<CheckFunction, ManifestError> {
		lookup(&self.check, HandlerKind::Check, plugin, handler)
	}

	pub(super) fn resolve_inventory(&self, plugin: &str, handler: &str) -> Result<InventoryFunction, ManifestError> {
		lookup(&self.inventory, HandlerKind::Inventory, plugin, handler)
	}
}

fn lookup<T: Clone>(
	table: &FxHashMap<String, T>,
	kind: HandlerKind,
	plugin: &str,
	handler: &str,
) -> Result<T, ManifestError> {
	table
		.get(handler)
		.cloned()
		.ok_or_else(|| ManifestError::MissingHandler {
			kind,
			plugin: plugin.to_owned(),
			handler: handler.to_owned(),
		})
}

impl std::fmt::Debug for HandlerTable {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("HandlerTable")
			.field("agent_parse", &self.agent_parse.len())
			.field("snmp_parse", &self.snmp_parse.len())
			.field("discovery", &self.discovery.len())
			.field("check", &self.check.len())
			.field("inventory", &self.inventory.len())
			.finish()
	}
}
