//! Inventory plug-ins: extract structural data from parsed sections.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use cmk_primitives::{InventoryPluginName, ParsedSectionName, RuleSetName};

use crate::error::{DefinitionError, Stage};
use crate::params::{Parameters, validate_default_parameters, validate_sections};
use crate::section::ParsedSections;

/// One node of the inventory tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryRow {
	pub path: Vec<String>,
	pub attributes: BTreeMap<String, String>,
}

pub type InventoryFunction =
	Arc<dyn Fn(&Parameters, &ParsedSections) -> Vec<InventoryRow> + Send + Sync>;

#[derive(Clone)]
pub struct InventoryPlugin {
	name: InventoryPluginName,
	sections: Vec<ParsedSectionName>,
	inventory_function: InventoryFunction,
	inventory_default_parameters: Option<Parameters>,
	inventory_ruleset_name: Option<RuleSetName>,
}

impl InventoryPlugin {
	pub fn builder<F>(name: InventoryPluginName, inventory_function: F) -> InventoryPluginBuilder
	where
		F: Fn(&Parameters, &ParsedSections) -> Vec<InventoryRow> + Send + Sync + 'static,
	{
		InventoryPluginBuilder::new(name, Arc::new(inventory_function))
	}

	#[inline]
	pub fn name(&self) -> &InventoryPluginName {
		&self.name
	}

	#[inline]
	pub fn sections(&self) -> &[ParsedSectionName] {
		&self.sections
	}

	pub fn inventory_ruleset_name(&self) -> Option<&RuleSetName> {
		self.inventory_ruleset_name.as_ref()
	}

	pub fn inventory_default_parameters(&self) -> Option<&Parameters> {
		self.inventory_default_parameters.as_ref()
	}

	pub fn inventorize(&self, params: &Parameters, sections: &ParsedSections) -> Vec<InventoryRow> {
		(self.inventory_function)(params, sections)
	}
}

impl fmt::Debug for InventoryPlugin {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("InventoryPlugin")
			.field("name", &self.name)
			.field("sections", &self.sections)
			.field("inventory_ruleset_name", &self.inventory_ruleset_name)
			.finish_non_exhaustive()
	}
}

pub struct InventoryPluginBuilder {
	name: InventoryPluginName,
	sections: Vec<ParsedSectionName>,
	inventory_function: InventoryFunction,
	inventory_default_parameters: Option<Parameters>,
	inventory_ruleset_name: Option<RuleSetName>,
}

impl InventoryPluginBuilder {
	pub fn new(name: InventoryPluginName, inventory_function: InventoryFunction) -> Self {
		Self {
			name,
			sections: Vec::new(),
			inventory_function,
			inventory_default_parameters: None,
			inventory_ruleset_name: None,
		}
	}

	pub fn sections<I: IntoIterator<Item = ParsedSectionName>>(mut self, sections: I) -> Self {
		self.sections.extend(sections);
		self
	}

	pub fn inventory_default_parameters(mut self, params: Parameters) -> Self {
		self.inventory_default_parameters = Some(params);
		self
	}

	pub fn inventory_ruleset_name(mut self, name: RuleSetName) -> Self {
		self.inventory_ruleset_name = Some(name);
		self
	}

	pub fn build(mut self) -> Result<InventoryPlugin, DefinitionError> {
		if self.sections.is_empty() {
			self.sections.push(ParsedSectionName::from(&self.name));
		}
		validate_sections(self.name.as_str(), &self.sections)?;
		validate_default_parameters(
			self.name.as_str(),
			Stage::Inventory,
			self.inventory_default_parameters.as_ref(),
			self.inventory_ruleset_name.as_ref(),
		)?;
		Ok(InventoryPlugin {
			name: self.name,
			sections: self.sections,
			inventory_function: self.inventory_function,
			inventory_default_parameters: self.inventory_default_parameters,
			inventory_ruleset_name: self.inventory_ruleset_name,
		})
	}
}
