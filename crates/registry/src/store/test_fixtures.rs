//! Plug-in constructors shared by the store tests.

use std::sync::Arc;

use cmk_primitives::{CheckPluginName, InventoryPluginName, ParsedSectionName, RuleSetName, SectionName};

use crate::check::{CheckPlugin, CheckResult, Service};
use crate::error::ParseError;
use crate::inventory::{InventoryPlugin, InventoryRow};
use crate::params::Parameters;
use crate::section::{
	AgentSectionPlugin, ParsedSection, ParsedSections, SnmpDetect, SnmpSectionPlugin, SnmpTree,
	StringTable,
};

pub(crate) fn section_name(name: &str) -> SectionName {
	SectionName::new(name).unwrap()
}

pub(crate) fn parsed_name(name: &str) -> ParsedSectionName {
	ParsedSectionName::new(name).unwrap()
}

pub(crate) fn check_name(name: &str) -> CheckPluginName {
	CheckPluginName::new(name).unwrap()
}

pub(crate) fn inventory_name(name: &str) -> InventoryPluginName {
	InventoryPluginName::new(name).unwrap()
}

pub(crate) fn ruleset_name(name: &str) -> RuleSetName {
	RuleSetName::new(name).unwrap()
}

fn parse_rows(table: &StringTable) -> Result<Option<ParsedSection>, ParseError> {
	Ok(Some(Arc::new(table.len())))
}

fn parse_tables(tables: &[StringTable]) -> Result<Option<ParsedSection>, ParseError> {
	Ok(Some(Arc::new(tables.len())))
}

/// Agent section `name` producing `parsed`.
pub(crate) fn agent_section(name: &str, parsed: &str) -> Arc<AgentSectionPlugin> {
	Arc::new(
		AgentSectionPlugin::builder(section_name(name), parse_rows)
			.parsed_section_name(parsed_name(parsed))
			.build()
			.unwrap(),
	)
}

/// SNMP section `name` producing `parsed`.
pub(crate) fn snmp_section(name: &str, parsed: &str) -> Arc<SnmpSectionPlugin> {
	Arc::new(
		SnmpSectionPlugin::builder(
			section_name(name),
			vec![SnmpTree::new(".1.3.6.1.2.1.1", ["1", "5"])],
			SnmpDetect::default(),
			parse_tables,
		)
		.parsed_section_name(parsed_name(parsed))
		.build()
		.unwrap(),
	)
}

/// Check plug-in subscribing to `sections`, optionally tied to a check ruleset.
pub(crate) fn check_plugin(
	name: &str,
	service_name: &str,
	sections: &[&str],
	ruleset: Option<&str>,
) -> Arc<CheckPlugin> {
	let mut builder = CheckPlugin::builder(
		check_name(name),
		service_name,
		|_: &Parameters, _: &ParsedSections| vec![Service::new(None)],
		|_: Option<&str>, _: &Parameters, _: &ParsedSections| Vec::<CheckResult>::new(),
	)
	.sections(sections.iter().map(|s| parsed_name(s)));
	if let Some(ruleset) = ruleset {
		builder = builder
			.check_ruleset_name(ruleset_name(ruleset))
			.check_default_parameters(Parameters::new());
	}
	Arc::new(builder.build().unwrap())
}

pub(crate) fn inventory_plugin(name: &str, sections: &[&str]) -> Arc<InventoryPlugin> {
	Arc::new(
		InventoryPlugin::builder(inventory_name(name), |_: &Parameters, _: &ParsedSections| {
			Vec::<InventoryRow>::new()
		})
		.sections(sections.iter().map(|s| parsed_name(s)))
		.build()
		.unwrap(),
	)
}
