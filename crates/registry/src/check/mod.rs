//! Check plug-ins: turn parsed sections into services and their states.

use std::fmt;
use std::sync::Arc;

use cmk_primitives::{CheckPluginName, ParsedSectionName, RuleSetName};

use crate::error::{DefinitionError, Stage};
use crate::params::{Parameters, validate_default_parameters, validate_sections};
use crate::section::ParsedSections;

/// Placeholder that marks the item inside a service name template.
pub const ITEM_PLACEHOLDER: &str = "%s";

/// Monitoring state of a check result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
	Ok,
	Warn,
	Crit,
	Unknown,
}

impl fmt::Display for State {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Ok => f.write_str("OK"),
			Self::Warn => f.write_str("WARN"),
			Self::Crit => f.write_str("CRIT"),
			Self::Unknown => f.write_str("UNKNOWN"),
		}
	}
}

/// A service found during discovery.
#[derive(Debug, Clone, PartialEq)]
pub struct Service {
	pub item: Option<String>,
	pub parameters: Parameters,
}

impl Service {
	pub fn new(item: Option<String>) -> Self {
		Self {
			item,
			parameters: Parameters::new(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
	pub state: State,
	pub summary: String,
}

impl CheckResult {
	pub fn new(state: State, summary: impl Into<String>) -> Self {
		Self {
			state,
			summary: summary.into(),
		}
	}
}

pub type DiscoveryFunction = Arc<dyn Fn(&Parameters, &ParsedSections) -> Vec<Service> + Send + Sync>;

/// Receives the service item, if any, the effective parameters and the sections.
pub type CheckFunction =
	Arc<dyn Fn(Option<&str>, &Parameters, &ParsedSections) -> Vec<CheckResult> + Send + Sync>;

/// Immutable check plug-in definition.
#[derive(Clone)]
pub struct CheckPlugin {
	pub(crate) name: CheckPluginName,
	pub(crate) sections: Vec<ParsedSectionName>,
	pub(crate) service_name: String,
	pub(crate) discovery_function: DiscoveryFunction,
	pub(crate) discovery_default_parameters: Option<Parameters>,
	pub(crate) discovery_ruleset_name: Option<RuleSetName>,
	pub(crate) check_function: CheckFunction,
	pub(crate) check_default_parameters: Option<Parameters>,
	pub(crate) check_ruleset_name: Option<RuleSetName>,
}

impl CheckPlugin {
	pub fn builder<D, C>(
		name: CheckPluginName,
		service_name: impl Into<String>,
		discovery_function: D,
		check_function: C,
	) -> CheckPluginBuilder
	where
		D: Fn(&Parameters, &ParsedSections) -> Vec<Service> + Send + Sync + 'static,
		C: Fn(Option<&str>, &Parameters, &ParsedSections) -> Vec<CheckResult> + Send + Sync + 'static,
	{
		CheckPluginBuilder::new(
			name,
			service_name.into(),
			Arc::new(discovery_function),
			Arc::new(check_function),
		)
	}

	#[inline]
	pub fn name(&self) -> &CheckPluginName {
		&self.name
	}

	/// Parsed sections this plug-in subscribes to, in declaration order.
	#[inline]
	pub fn sections(&self) -> &[ParsedSectionName] {
		&self.sections
	}

	pub fn service_name(&self) -> &str {
		&self.service_name
	}

	/// Returns true if services of this plug-in carry an item.
	pub fn has_item(&self) -> bool {
		self.service_name.contains(ITEM_PLACEHOLDER)
	}

	/// Renders the service name for `item`.
	pub fn service_description(&self, item: Option<&str>) -> String {
		match item {
			Some(item) if self.has_item() => self.service_name.replacen(ITEM_PLACEHOLDER, item, 1),
			_ => self.service_name.clone(),
		}
	}

	pub fn discovery_ruleset_name(&self) -> Option<&RuleSetName> {
		self.discovery_ruleset_name.as_ref()
	}

	pub fn discovery_default_parameters(&self) -> Option<&Parameters> {
		self.discovery_default_parameters.as_ref()
	}

	pub fn check_ruleset_name(&self) -> Option<&RuleSetName> {
		self.check_ruleset_name.as_ref()
	}

	pub fn check_default_parameters(&self) -> Option<&Parameters> {
		self.check_default_parameters.as_ref()
	}

	/// Runs discovery with the default discovery parameters.
	pub fn discover(&self, sections: &ParsedSections) -> Vec<Service> {
		let empty = Parameters::new();
		let params = self.discovery_default_parameters.as_ref().unwrap_or(&empty);
		(self.discovery_function)(params, sections)
	}

	/// Runs the check function with explicit parameters.
	pub fn check(
		&self,
		item: Option<&str>,
		params: &Parameters,
		sections: &ParsedSections,
	) -> Vec<CheckResult> {
		(self.check_function)(item, params, sections)
	}
}

impl fmt::Debug for CheckPlugin {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("CheckPlugin")
			.field("name", &self.name)
			.field("sections", &self.sections)
			.field("service_name", &self.service_name)
			.field("discovery_ruleset_name", &self.discovery_ruleset_name)
			.field("check_ruleset_name", &self.check_ruleset_name)
			.finish_non_exhaustive()
	}
}

pub struct CheckPluginBuilder {
	name: CheckPluginName,
	service_name: String,
	sections: Vec<ParsedSectionName>,
	discovery_function: DiscoveryFunction,
	discovery_default_parameters: Option<Parameters>,
	discovery_ruleset_name: Option<RuleSetName>,
	check_function: CheckFunction,
	check_default_parameters: Option<Parameters>,
	check_ruleset_name: Option<RuleSetName>,
}

impl CheckPluginBuilder {
	/// Starts a builder from already shared functions.
	pub fn new(
		name: CheckPluginName,
		service_name: String,
		discovery_function: DiscoveryFunction,
		check_function: CheckFunction,
	) -> Self {
		Self {
			name,
			service_name,
			sections: Vec::new(),
			discovery_function,
			discovery_default_parameters: None,
			discovery_ruleset_name: None,
			check_function,
			check_default_parameters: None,
			check_ruleset_name: None,
		}
	}

	/// Subscribes to parsed sections. Without this the plug-in subscribes to its own name.
	pub fn sections<I: IntoIterator<Item = ParsedSectionName>>(mut self, sections: I) -> Self {
		self.sections.extend(sections);
		self
	}

	pub fn discovery_default_parameters(mut self, params: Parameters) -> Self {
		self.discovery_default_parameters = Some(params);
		self
	}

	pub fn discovery_ruleset_name(mut self, name: RuleSetName) -> Self {
		self.discovery_ruleset_name = Some(name);
		self
	}

	pub fn check_default_parameters(mut self, params: Parameters) -> Self {
		self.check_default_parameters = Some(params);
		self
	}

	pub fn check_ruleset_name(mut self, name: RuleSetName) -> Self {
		self.check_ruleset_name = Some(name);
		self
	}

	pub fn build(mut self) -> Result<CheckPlugin, DefinitionError> {
		let plugin = self.name.as_str();
		if self.service_name.matches(ITEM_PLACEHOLDER).count() > 1 {
			return Err(DefinitionError::MultipleItemPlaceholders {
				plugin: plugin.to_owned(),
				service_name: self.service_name,
			});
		}
		if self.sections.is_empty() {
			self.sections.push(ParsedSectionName::from(&self.name));
		}
		validate_sections(plugin, &self.sections)?;
		validate_default_parameters(
			plugin,
			Stage::Discovery,
			self.discovery_default_parameters.as_ref(),
			self.discovery_ruleset_name.as_ref(),
		)?;
		validate_default_parameters(
			plugin,
			Stage::Check,
			self.check_default_parameters.as_ref(),
			self.check_ruleset_name.as_ref(),
		)?;

		Ok(CheckPlugin {
			name: self.name,
			sections: self.sections,
			service_name: self.service_name,
			discovery_function: self.discovery_function,
			discovery_default_parameters: self.discovery_default_parameters,
			discovery_ruleset_name: self.discovery_ruleset_name,
			check_function: self.check_function,
			check_default_parameters: self.check_default_parameters,
			check_ruleset_name: self.check_ruleset_name,
		})
	}
}
