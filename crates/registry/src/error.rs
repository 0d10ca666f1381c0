use std::fmt;
use std::path::PathBuf;

use cmk_primitives::{CheckPluginName, NameError, ParsedSectionName, RuleSetName, SectionName};

use crate::section::SectionSource;

/// A plug-in definition rejected by its builder.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DefinitionError {
	#[error("{plugin}: service name {service_name:?} contains '%s' more than once")]
	MultipleItemPlaceholders {
		plugin: String,
		service_name: String,
	},

	#[error("{plugin}: parsed section {section} is subscribed more than once")]
	DuplicateSection {
		plugin: String,
		section: ParsedSectionName,
	},

	#[error("{plugin}: {stage} default parameters given without a ruleset name")]
	MissingRulesetName { plugin: String, stage: Stage },

	#[error("{plugin}: {stage} ruleset {ruleset} has no default parameters")]
	MissingDefaultParameters {
		plugin: String,
		stage: Stage,
		ruleset: RuleSetName,
	},

	#[error("section {0} supersedes itself")]
	SupersedesItself(SectionName),

	#[error("SNMP section {0} fetches no trees")]
	EmptyFetch(SectionName),

	#[error("SNMP section {section}: tree {base} has no OIDs")]
	EmptyTree { section: SectionName, base: String },
}

/// Plug-in function a set of parameters belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
	Discovery,
	Check,
	Inventory,
}

impl fmt::Display for Stage {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Discovery => f.write_str("discovery"),
			Self::Check => f.write_str("check"),
			Self::Inventory => f.write_str("inventory"),
		}
	}
}

/// What a check ruleset group demands from the service item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemRequirement {
	/// Every plug-in in the group has an item.
	Requires,
	/// No plug-in in the group has an item.
	DoesNotSupport,
}

impl fmt::Display for ItemRequirement {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Requires => f.write_str("requires"),
			Self::DoesNotSupport => f.write_str("does not support"),
		}
	}
}

/// Fatal registration failures. The loader is expected to abort.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
	#[error(
		"check ruleset {ruleset} has checks with and without item: it {requirement} an item, \
		 offending plug-in: {plugin}, present plug-ins: {present_list}",
		present_list = join_names(.present)
	)]
	RulesetItemConflict {
		ruleset: RuleSetName,
		plugin: CheckPluginName,
		present: Vec<CheckPluginName>,
		requirement: ItemRequirement,
	},
}

fn join_names(names: &[CheckPluginName]) -> String {
	names
		.iter()
		.map(CheckPluginName::as_str)
		.collect::<Vec<_>>()
		.join(", ")
}

/// Section parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
	#[error("section {section}: expected {expected} data, got {found} data")]
	SourceMismatch {
		section: SectionName,
		expected: SectionSource,
		found: SectionSource,
	},

	#[error("malformed section data: {0}")]
	Malformed(String),
}

/// Which handler table a manifest reference points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
	AgentParse,
	SnmpParse,
	Discovery,
	Check,
	Inventory,
}

impl fmt::Display for HandlerKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::AgentParse => f.write_str("agent parse function"),
			Self::SnmpParse => f.write_str("SNMP parse function"),
			Self::Discovery => f.write_str("discovery function"),
			Self::Check => f.write_str("check function"),
			Self::Inventory => f.write_str("inventory function"),
		}
	}
}

/// Errors raised while loading, linking or registering a manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
	#[error("failed to read manifest {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("invalid manifest: {0}")]
	Toml(#[from] toml::de::Error),

	#[error("{plugin}: no {kind} named {handler:?}")]
	MissingHandler {
		kind: HandlerKind,
		plugin: String,
		handler: String,
	},

	#[error("{plugin}: {stage} default parameters must be a table")]
	ParametersNotTable { plugin: String, stage: Stage },

	#[error(transparent)]
	Name(#[from] NameError),

	#[error(transparent)]
	Definition(#[from] DefinitionError),

	#[error(transparent)]
	Registration(#[from] RegistrationError),
}
