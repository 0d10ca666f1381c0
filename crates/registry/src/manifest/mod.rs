//! Declarative plug-in manifests.
//!
//! A manifest lists sections and plug-ins in TOML and refers to their
//! functions by handler name. Loading happens in three steps:
//!
//! 1. [`load_manifest_str`] / [`load_manifest_file`] deserialize a
//!    [`ManifestSpec`](cmk_registry_spec::ManifestSpec).
//! 2. [`link`] resolves handler names in a [`HandlerTable`] and runs every
//!    definition through its builder.
//! 3. [`register`] adds the linked definitions to a [`PluginRegistry`].
//!
//! Each step fails fast; a manifest with one bad entry registers nothing
//! from the failing step onward.

mod handlers;
mod link;
mod load;

use std::path::Path;

use rustc_hash::FxHashSet;
use tracing::debug;

pub use handlers::HandlerTable;
pub use link::{LinkedPlugins, link};
pub use load::{load_manifest_file, load_manifest_str};

use crate::error::ManifestError;
use crate::store::PluginRegistry;

/// Registers linked definitions and the rulesets they reference.
///
/// Sections and inventory plug-ins go first, then check plug-ins, which may
/// fail the item consistency check. Ruleset values from the manifest are
/// stored last, replacing earlier rules of the same name.
pub fn register(registry: &mut PluginRegistry, linked: LinkedPlugins) -> Result<(), ManifestError> {
	let LinkedPlugins {
		agent_sections,
		snmp_sections,
		check_plugins,
		inventory_plugins,
		rulesets,
	} = linked;

	let mut host_label_rulesets = FxHashSet::default();
	for section in agent_sections {
		if let Some(ruleset) = &section.meta().host_label_ruleset_name {
			host_label_rulesets.insert(ruleset.clone());
		}
		registry.add_section_plugin(section);
	}
	for section in snmp_sections {
		if let Some(ruleset) = &section.meta().host_label_ruleset_name {
			host_label_rulesets.insert(ruleset.clone());
		}
		registry.add_section_plugin(section);
	}
	for ruleset in &host_label_rulesets {
		registry.add_host_label_ruleset(ruleset.clone());
	}

	for plugin in inventory_plugins {
		registry.add_inventory_plugin(plugin);
	}

	let checks = check_plugins.len();
	for plugin in check_plugins {
		if let Some(ruleset) = plugin.discovery_ruleset_name() {
			registry.add_discovery_ruleset(ruleset.clone());
		}
		registry.add_check_plugin(plugin)?;
	}

	let values = rulesets.len();
	for (name, rules) in rulesets {
		if host_label_rulesets.contains(&name) {
			registry.set_host_label_ruleset(name, rules);
		} else {
			registry.set_discovery_ruleset(name, rules);
		}
	}

	debug!(
		check_plugins = checks,
		host_label_rulesets = host_label_rulesets.len(),
		ruleset_values = values,
		"registered manifest"
	);
	Ok(())
}

/// Loads, links and registers the manifest at `path`.
pub fn load_into(
	registry: &mut PluginRegistry,
	path: &Path,
	handlers: &HandlerTable,
) -> Result<(), ManifestError> {
	let spec = load_manifest_file(path)?;
	debug!(path = %path.display(), plugins = spec.plugin_count(), "loaded manifest");
	register(registry, link(&spec, handlers)?)
}
