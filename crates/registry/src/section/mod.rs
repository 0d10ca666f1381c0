//! Section plug-ins: agent and SNMP producers of parsed sections.
//!
//! Both flavours share [`SectionMeta`] and the capability of turning raw
//! data into a [`ParsedSection`]. [`SectionPlugin`] is the tagged union the
//! registry stores and dispatches on.

use std::any::Any;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use cmk_primitives::{ParsedSectionName, RuleSetName, SectionName};
use rustc_hash::FxHashMap;

use crate::error::{DefinitionError, ParseError};

/// Raw agent output of one section: lines split into words.
pub type StringTable = Vec<Vec<String>>;

/// Type-erased parse result. Consumers downcast to the concrete type.
pub type ParsedSection = Arc<dyn Any + Send + Sync>;

/// Parsed sections available to a plug-in function, keyed by parsed name.
pub type ParsedSections = FxHashMap<ParsedSectionName, ParsedSection>;

pub type AgentParseFunction =
	Arc<dyn Fn(&StringTable) -> Result<Option<ParsedSection>, ParseError> + Send + Sync>;

/// Receives one table per fetched tree, in fetch order.
pub type SnmpParseFunction =
	Arc<dyn Fn(&[StringTable]) -> Result<Option<ParsedSection>, ParseError> + Send + Sync>;

/// Data source a section is fetched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionSource {
	Agent,
	Snmp,
}

impl fmt::Display for SectionSource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Agent => f.write_str("agent"),
			Self::Snmp => f.write_str("SNMP"),
		}
	}
}

/// Raw input handed to [`SectionPlugin::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawSection {
	Agent(StringTable),
	Snmp(Vec<StringTable>),
}

impl RawSection {
	pub fn source(&self) -> SectionSource {
		match self {
			Self::Agent(_) => SectionSource::Agent,
			Self::Snmp(_) => SectionSource::Snmp,
		}
	}
}

/// Metadata shared by agent and SNMP sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionMeta {
	pub name: SectionName,
	pub parsed_section_name: ParsedSectionName,
	pub host_label_ruleset_name: Option<RuleSetName>,
	pub supersedes: BTreeSet<SectionName>,
}

impl SectionMeta {
	fn new(
		name: SectionName,
		parsed_section_name: Option<ParsedSectionName>,
		host_label_ruleset_name: Option<RuleSetName>,
		supersedes: BTreeSet<SectionName>,
	) -> Result<Self, DefinitionError> {
		if supersedes.contains(&name) {
			return Err(DefinitionError::SupersedesItself(name));
		}
		Ok(Self {
			parsed_section_name: parsed_section_name.unwrap_or_else(|| ParsedSectionName::from(&name)),
			name,
			host_label_ruleset_name,
			supersedes,
		})
	}
}

/// Section produced by the Checkmk agent.
#[derive(Clone)]
pub struct AgentSectionPlugin {
	meta: SectionMeta,
	parse_function: AgentParseFunction,
}

impl AgentSectionPlugin {
	pub fn builder<F>(name: SectionName, parse_function: F) -> AgentSectionBuilder
	where
		F: Fn(&StringTable) -> Result<Option<ParsedSection>, ParseError> + Send + Sync + 'static,
	{
		AgentSectionBuilder::new(name, Arc::new(parse_function))
	}

	#[inline]
	pub fn meta(&self) -> &SectionMeta {
		&self.meta
	}

	pub fn parse(&self, table: &StringTable) -> Result<Option<ParsedSection>, ParseError> {
		(self.parse_function)(table)
	}
}

impl fmt::Debug for AgentSectionPlugin {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("AgentSectionPlugin")
			.field("meta", &self.meta)
			.finish_non_exhaustive()
	}
}

pub struct AgentSectionBuilder {
	name: SectionName,
	parse_function: AgentParseFunction,
	parsed_section_name: Option<ParsedSectionName>,
	host_label_ruleset_name: Option<RuleSetName>,
	supersedes: BTreeSet<SectionName>,
}

impl AgentSectionBuilder {
	/// Starts a builder from an already shared parse function.
	pub fn new(name: SectionName, parse_function: AgentParseFunction) -> Self {
		Self {
			name,
			parse_function,
			parsed_section_name: None,
			host_label_ruleset_name: None,
			supersedes: BTreeSet::new(),
		}
	}

	pub fn parsed_section_name(mut self, name: ParsedSectionName) -> Self {
		self.parsed_section_name = Some(name);
		self
	}

	pub fn host_label_ruleset_name(mut self, name: RuleSetName) -> Self {
		self.host_label_ruleset_name = Some(name);
		self
	}

	pub fn supersedes<I: IntoIterator<Item = SectionName>>(mut self, names: I) -> Self {
		self.supersedes.extend(names);
		self
	}

	pub fn build(self) -> Result<AgentSectionPlugin, DefinitionError> {
		Ok(AgentSectionPlugin {
			meta: SectionMeta::new(
				self.name,
				self.parsed_section_name,
				self.host_label_ruleset_name,
				self.supersedes,
			)?,
			parse_function: self.parse_function,
		})
	}
}

/// One SNMP table: a base OID and the columns fetched below it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnmpTree {
	pub base: String,
	pub oids: Vec<String>,
}

impl SnmpTree {
	pub fn new<I, S>(base: impl Into<String>, oids: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			base: base.into(),
			oids: oids.into_iter().map(Into::into).collect(),
		}
	}
}

/// Single OID condition of a detection spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectAtom {
	pub oid: String,
	pub pattern: String,
	pub negate: bool,
}

/// Detection spec in disjunctive normal form.
///
/// Carried for the fetch layer; the registry never evaluates it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnmpDetect(pub Vec<Vec<DetectAtom>>);

/// Section produced by an SNMP walk.
#[derive(Clone)]
pub struct SnmpSectionPlugin {
	meta: SectionMeta,
	parse_function: SnmpParseFunction,
	fetch: Vec<SnmpTree>,
	detect: SnmpDetect,
}

impl SnmpSectionPlugin {
	pub fn builder<F>(
		name: SectionName,
		fetch: Vec<SnmpTree>,
		detect: SnmpDetect,
		parse_function: F,
	) -> SnmpSectionBuilder
	where
		F: Fn(&[StringTable]) -> Result<Option<ParsedSection>, ParseError> + Send + Sync + 'static,
	{
		SnmpSectionBuilder::new(name, fetch, detect, Arc::new(parse_function))
	}

	#[inline]
	pub fn meta(&self) -> &SectionMeta {
		&self.meta
	}

	pub fn fetch(&self) -> &[SnmpTree] {
		&self.fetch
	}

	pub fn detect(&self) -> &SnmpDetect {
		&self.detect
	}

	pub fn parse(&self, tables: &[StringTable]) -> Result<Option<ParsedSection>, ParseError> {
		(self.parse_function)(tables)
	}
}

impl fmt::Debug for SnmpSectionPlugin {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SnmpSectionPlugin")
			.field("meta", &self.meta)
			.field("fetch", &self.fetch)
			.field("detect", &self.detect)
			.finish_non_exhaustive()
	}
}

pub struct SnmpSectionBuilder {
	name: SectionName,
	fetch: Vec<SnmpTree>,
	detect: SnmpDetect,
	parse_function: SnmpParseFunction,
	parsed_section_name: Option<ParsedSectionName>,
	host_label_ruleset_name: Option<RuleSetName>,
	supersedes: BTreeSet<SectionName>,
}

impl SnmpSectionBuilder {
	pub fn new(
		name: SectionName,
		fetch: Vec<SnmpTree>,
		detect: SnmpDetect,
		parse_function: SnmpParseFunction,
	) -> Self {
		Self {
			name,
			fetch,
			detect,
			parse_function,
			parsed_section_name: None,
			host_label_ruleset_name: None,
			supersedes: BTreeSet::new(),
		}
	}

	pub fn parsed_section_name(mut self, name: ParsedSectionName) -> Self {
		self.parsed_section_name = Some(name);
		self
	}

	pub fn host_label_ruleset_name(mut self, name: RuleSetName) -> Self {
		self.host_label_ruleset_name = Some(name);
		self
	}

	pub fn supersedes<I: IntoIterator<Item = SectionName>>(mut self, names: I) -> Self {
		self.supersedes.extend(names);
		self
	}

	pub fn build(self) -> Result<SnmpSectionPlugin, DefinitionError> {
		if self.fetch.is_empty() {
			return Err(DefinitionError::EmptyFetch(self.name));
		}
		if let Some(tree) = self.fetch.iter().find(|t| t.oids.is_empty()) {
			return Err(DefinitionError::EmptyTree {
				base: tree.base.clone(),
				section: self.name,
			});
		}
		Ok(SnmpSectionPlugin {
			meta: SectionMeta::new(
				self.name,
				self.parsed_section_name,
				self.host_label_ruleset_name,
				self.supersedes,
			)?,
			parse_function: self.parse_function,
			fetch: self.fetch,
			detect: self.detect,
		})
	}
}

/// A registered section, tagged by its data source.
#[derive(Debug, Clone)]
pub enum SectionPlugin {
	Agent(Arc<AgentSectionPlugin>),
	Snmp(Arc<SnmpSectionPlugin>),
}

impl SectionPlugin {
	#[inline]
	pub fn meta(&self) -> &SectionMeta {
		match self {
			Self::Agent(p) => p.meta(),
			Self::Snmp(p) => p.meta(),
		}
	}

	#[inline]
	pub fn name(&self) -> &SectionName {
		&self.meta().name
	}

	#[inline]
	pub fn parsed_section_name(&self) -> &ParsedSectionName {
		&self.meta().parsed_section_name
	}

	pub fn host_label_ruleset_name(&self) -> Option<&RuleSetName> {
		self.meta().host_label_ruleset_name.as_ref()
	}

	pub fn supersedes(&self) -> &BTreeSet<SectionName> {
		&self.meta().supersedes
	}

	pub fn source(&self) -> SectionSource {
		match self {
			Self::Agent(_) => SectionSource::Agent,
			Self::Snmp(_) => SectionSource::Snmp,
		}
	}

	/// Parses raw data of the matching source kind.
	pub fn parse(&self, raw: &RawSection) -> Result<Option<ParsedSection>, ParseError> {
		match (self, raw) {
			(Self::Agent(p), RawSection::Agent(table)) => p.parse(table),
			(Self::Snmp(p), RawSection::Snmp(tables)) => p.parse(tables),
			_ => Err(ParseError::SourceMismatch {
				section: self.name().clone(),
				expected: self.source(),
				found: raw.source(),
			}),
		}
	}

	/// Returns true if both refer to the same registered definition.
	pub fn ptr_eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Agent(a), Self::Agent(b)) => Arc::ptr_eq(a, b),
			(Self::Snmp(a), Self::Snmp(b)) => Arc::ptr_eq(a, b),
			_ => false,
		}
	}
}

impl From<AgentSectionPlugin> for SectionPlugin {
	fn from(plugin: AgentSectionPlugin) -> Self {
		Self::Agent(Arc::new(plugin))
	}
}

impl From<Arc<AgentSectionPlugin>> for SectionPlugin {
	fn from(plugin: Arc<AgentSectionPlugin>) -> Self {
		Self::Agent(plugin)
	}
}

impl From<SnmpSectionPlugin> for SectionPlugin {
	fn from(plugin: SnmpSectionPlugin) -> Self {
		Self::Snmp(Arc::new(plugin))
	}
}

impl From<Arc<SnmpSectionPlugin>> for SectionPlugin {
	fn from(plugin: Arc<SnmpSectionPlugin>) -> Self {
		Self::Snmp(plugin)
	}
}
