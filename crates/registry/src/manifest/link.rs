//! Linking manifest specs with handler functions.

use cmk_primitives::{CheckPluginName, InventoryPluginName, ParsedSectionName, RuleSetName, SectionName};
use cmk_registry_spec::{
	AgentSectionSpec, CheckPluginSpec, InventoryPluginSpec, ManifestSpec, SnmpSectionSpec,
};

use super::handlers::HandlerTable;
use crate::check::{CheckPlugin, CheckPluginBuilder};
use crate::error::{ManifestError, Stage};
use crate::inventory::{InventoryPlugin, InventoryPluginBuilder};
use crate::params::Parameters;
use crate::ruleset::RuleSpec;
use crate::section::{
	AgentSectionBuilder, AgentSectionPlugin, DetectAtom, SnmpDetect, SnmpSectionBuilder,
	SnmpSectionPlugin, SnmpTree,
};

/// Plug-in definitions built from one manifest, ready for registration.
#[derive(Debug, Default)]
pub struct LinkedPlugins {
	pub agent_sections: Vec<AgentSectionPlugin>,
	pub snmp_sections: Vec<SnmpSectionPlugin>,
	pub check_plugins: Vec<CheckPlugin>,
	pub inventory_plugins: Vec<InventoryPlugin>,
	pub rulesets: Vec<(RuleSetName, Vec<RuleSpec>)>,
}

/// Builds plug-in definitions from `spec`, resolving handler names in `handlers`.
///
/// Stops at the first invalid name, unknown handler or rejected definition.
pub fn link(spec: &ManifestSpec, handlers: &HandlerTable) -> Result<LinkedPlugins, ManifestError> {
	let mut linked = LinkedPlugins::default();

	for section in &spec.agent_sections {
		linked.agent_sections.push(link_agent_section(section, handlers)?);
	}
	for section in &spec.snmp_sections {
		linked.snmp_sections.push(link_snmp_section(section, handlers)?);
	}
	for plugin in &spec.check_plugins {
		linked.check_plugins.push(link_check_plugin(plugin, handlers)?);
	}
	for plugin in &spec.inventory_plugins {
		linked.inventory_plugins.push(link_inventory_plugin(plugin, handlers)?);
	}
	for (name, rules) in &spec.rulesets {
		linked.rulesets.push((RuleSetName::new(name)?, rules.clone()));
	}

	Ok(linked)
}

fn section_names(names: &[String]) -> Result<Vec<SectionName>, ManifestError> {
	Ok(names.iter().map(SectionName::new).collect::<Result<_, _>>()?)
}

fn parsed_section_names(names: &[String]) -> Result<Vec<ParsedSectionName>, ManifestError> {
	Ok(names
		.iter()
		.map(ParsedSectionName::new)
		.collect::<Result<_, _>>()?)
}

fn parameters(
	plugin: &str,
	stage: Stage,
	value: Option<&serde_json::Value>,
) -> Result<Option<Parameters>, ManifestError> {
	match value {
		None => Ok(None),
		Some(serde_json::Value::Object(map)) => Ok(Some(map.clone())),
		Some(_) => Err(ManifestError::ParametersNotTable {
			plugin: plugin.to_owned(),
			stage,
		}),
	}
}

fn link_agent_section(
	spec: &AgentSectionSpec,
	handlers: &HandlerTable,
) -> Result<AgentSectionPlugin, ManifestError> {
	let parse_function = handlers.resolve_agent_parse(&spec.name, &spec.parse_function)?;
	let mut builder = AgentSectionBuilder::new(SectionName::new(&spec.name)?, parse_function)
		.supersedes(section_names(&spec.supersedes)?);
	if let Some(parsed) = &spec.parsed_section_name {
		builder = builder.parsed_section_name(ParsedSectionName::new(parsed)?);
	}
	if let Some(ruleset) = &spec.host_label_ruleset_name {
		builder = builder.host_label_ruleset_name(RuleSetName::new(ruleset)?);
	}
	Ok(builder.build()?)
}

fn link_snmp_section(
	spec: &SnmpSectionSpec,
	handlers: &HandlerTable,
) -> Result<SnmpSectionPlugin, ManifestError> {
	let parse_function = handlers.resolve_snmp_parse(&spec.name, &spec.parse_function)?;
	let fetch = spec
		.fetch
		.iter()
		.map(|tree| SnmpTree::new(tree.base.clone(), tree.oids.iter().cloned()))
		.collect();
	let detect = SnmpDetect(
		spec.detect
			.iter()
			.map(|all_of| {
				all_of
					.iter()
					.map(|atom| DetectAtom {
						oid: atom.oid.clone(),
						pattern: atom.pattern.clone(),
						negate: atom.negate,
					})
					.collect()
			})
			.collect(),
	);

	let mut builder = SnmpSectionBuilder::new(SectionName::new(&spec.name)?, fetch, detect, parse_function)
		.supersedes(section_names(&spec.supersedes)?);
	if let Some(parsed) = &spec.parsed_section_name {
		builder = builder.parsed_section_name(ParsedSectionName::new(parsed)?);
	}
	if let Some(ruleset) = &spec.host_label_ruleset_name {
		builder = builder.host_label_ruleset_name(RuleSetName::new(ruleset)?);
	}
	Ok(builder.build()?)
}

fn link_check_plugin(spec: &CheckPluginSpec, handlers: &HandlerTable) -> Result<CheckPlugin, ManifestError> {
	let name = &spec.name;
	let mut builder = CheckPluginBuilder::new(
		CheckPluginName::new(name)?,
		spec.service_name.clone(),
		handlers.resolve_discovery(name, &spec.discovery_function)?,
		handlers.resolve_check(name, &spec.check_function)?,
	)
	.sections(parsed_section_names(&spec.sections)?);

	if let Some(params) = parameters(name, Stage::Discovery, spec.discovery_default_parameters.as_ref())? {
		builder = builder.discovery_default_parameters(params);
	}
	if let Some(ruleset) = &spec.discovery_ruleset_name {
		builder = builder.discovery_ruleset_name(RuleSetName::new(ruleset)?);
	}
	if let Some(params) = parameters(name, Stage::Check, spec.check_default_parameters.as_ref())? {
		builder = builder.check_default_parameters(params);
	}
	if let Some(ruleset) = &spec.check_ruleset_name {
		builder = builder.check_ruleset_name(RuleSetName::new(ruleset)?);
	}
	Ok(builder.build()?)
}

fn link_inventory_plugin(
	spec: &InventoryPluginSpec,
	handlers: &HandlerTable,
) -> Result<InventoryPlugin, ManifestError> {
	let name = &spec.name;
	let mut builder = InventoryPluginBuilder::new(
		InventoryPluginName::new(name)?,
		handlers.resolve_inventory(name, &spec.inventory_function)?,
	)
	.sections(parsed_section_names(&spec.sections)?);

	if let Some(params) = parameters(name, Stage::Inventory, spec.inventory_default_parameters.as_ref())? {
		builder = builder.inventory_default_parameters(params);
	}
	if let Some(ruleset) = &spec.inventory_ruleset_name {
		builder = builder.inventory_ruleset_name(RuleSetName::new(ruleset)?);
	}
	Ok(builder.build()?)
}
