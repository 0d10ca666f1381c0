use std::sync::Arc;
use std::thread;

use cmk_primitives::{CheckPluginName, InventoryPluginName};
use serde_json::json;

use super::test_fixtures::*;
use super::*;
use crate::error::ItemRequirement;

fn no_checks() -> Vec<CheckPluginName> {
	Vec::new()
}

fn no_inventory() -> Vec<InventoryPluginName> {
	Vec::new()
}

/// Agent `s1` and SNMP `s2` both produce `p`; check `c` consumes `p`.
fn shared_parsed_section_registry() -> PluginRegistry {
	let mut registry = PluginRegistry::new();
	registry.add_section_plugin(agent_section("s1", "p"));
	registry.add_section_plugin(snmp_section("s2", "p"));
	registry
		.add_check_plugin(check_plugin("c", "C", &["p"], None))
		.unwrap();
	registry
}

#[test]
fn competing_producers_are_all_relevant() {
	let registry = shared_parsed_section_registry();

	let relevant = registry.get_relevant_raw_sections([check_name("c")], no_inventory());
	assert_eq!(relevant.len(), 2);
	assert_eq!(relevant[&section_name("s1")].source(), SectionSource::Agent);
	assert_eq!(relevant[&section_name("s2")].source(), SectionSource::Snmp);

	assert!(registry.needs_redetection(&section_name("s1")));
	assert!(registry.needs_redetection(&section_name("s2")));
}

#[test]
fn single_producer_needs_no_redetection() {
	let mut registry = PluginRegistry::new();
	registry.add_section_plugin(agent_section("mem", "mem"));
	assert!(!registry.needs_redetection(&section_name("mem")));
}

#[test]
fn unregistered_section_resolves_through_its_own_name() {
	let mut registry = PluginRegistry::new();
	registry.add_section_plugin(agent_section("mem_linux", "mem"));
	registry.add_section_plugin(agent_section("mem_win", "mem"));

	// no section is called `foo`, and nothing produces a parsed section `foo`
	assert!(!registry.needs_redetection(&section_name("foo")));
	// `mem` itself is not registered but two sections produce parsed section `mem`
	assert!(registry.needs_redetection(&section_name("mem")));
}

#[test]
fn producers_are_grouped_by_parsed_name() {
	let registry = shared_parsed_section_registry();
	let producers = registry.get_section_producers(&parsed_name("p"));
	assert_eq!(producers.len(), 2);
	assert!(producers.contains(&section_name("s1")));
	assert!(producers.contains(&section_name("s2")));
	assert!(registry.get_section_producers(&parsed_name("q")).is_empty());
}

#[test]
fn relevant_sections_cover_check_and_inventory_plugins() {
	let mut registry = PluginRegistry::new();
	registry.add_section_plugin(agent_section("lnx_if", "interfaces"));
	registry.add_section_plugin(snmp_section("if64", "interfaces"));
	registry.add_section_plugin(agent_section("uptime", "uptime"));
	registry.add_section_plugin(agent_section("df", "df"));
	registry
		.add_check_plugin(check_plugin("interfaces", "Interface %s", &["interfaces"], None))
		.unwrap();
	registry.add_inventory_plugin(inventory_plugin("inv_uptime", &["uptime"]));

	let relevant = registry.get_relevant_raw_sections(
		[check_name("interfaces"), check_name("does_not_exist")],
		[inventory_name("inv_uptime")],
	);
	let mut names: Vec<_> = relevant.keys().map(|n| n.as_str()).collect();
	names.sort_unstable();
	assert_eq!(names, ["if64", "lnx_if", "uptime"]);

	assert!(registry.get_relevant_raw_sections(no_checks(), no_inventory()).is_empty());
}

#[test]
fn registered_check_plugin_round_trips() {
	let registry = shared_parsed_section_registry();
	let plugin = registry.get_check_plugin(&check_name("c")).unwrap();
	assert_eq!(plugin.name(), &check_name("c"));
	assert!(registry.get_check_plugin(&check_name("missing")).is_none());
	assert!(registry.is_registered_check_plugin(&check_name("c")));
}

#[test]
fn management_variant_is_derived_on_every_call() {
	let mut registry = PluginRegistry::new();
	registry
		.add_check_plugin(check_plugin("ipmi", "IPMI Sensor %s", &["ipmi"], None))
		.unwrap();

	let first = registry.get_check_plugin(&check_name("mgmt_ipmi")).unwrap();
	let second = registry.get_check_plugin(&check_name("mgmt_ipmi")).unwrap();
	assert_eq!(first.name().as_str(), "mgmt_ipmi");
	assert_eq!(first.service_name(), "Management Interface: IPMI Sensor %s");
	assert!(!Arc::ptr_eq(&first, &second));

	assert!(!registry.is_registered_check_plugin(&check_name("mgmt_ipmi")));
	assert_eq!(registry.snapshot().check_plugins.len(), 1);
	assert!(registry.get_check_plugin(&check_name("mgmt_snmp_uptime")).is_none());
}

#[test]
fn registered_management_plugin_wins_over_derivation() {
	let mut registry = PluginRegistry::new();
	registry
		.add_check_plugin(check_plugin("ipmi", "IPMI Sensor %s", &["ipmi"], None))
		.unwrap();
	let explicit = check_plugin("mgmt_ipmi", "BMC %s", &["ipmi"], None);
	registry.add_check_plugin(explicit.clone()).unwrap();

	let found = registry.get_check_plugin(&check_name("mgmt_ipmi")).unwrap();
	assert!(Arc::ptr_eq(&found, &explicit));
}

#[test]
fn management_variant_feeds_relevant_sections() {
	let mut registry = PluginRegistry::new();
	registry.add_section_plugin(agent_section("ipmi", "ipmi"));
	registry
		.add_check_plugin(check_plugin("ipmi", "IPMI Sensor %s", &["ipmi"], None))
		.unwrap();

	let relevant = registry.get_relevant_raw_sections([check_name("mgmt_ipmi")], no_inventory());
	assert!(relevant.contains_key(&section_name("ipmi")));
}

#[test]
fn registering_a_section_twice_is_idempotent() {
	let mut registry = PluginRegistry::new();
	let plugin = agent_section("mem", "mem");
	registry.add_section_plugin(plugin.clone());
	registry.add_section_plugin(plugin.clone());

	assert_eq!(registry.get_section_producers(&parsed_name("mem")).len(), 1);
	assert_eq!(registry.snapshot().agent_sections.len(), 1);
	let found = registry.get_section_plugin(&section_name("mem")).unwrap();
	assert!(found.ptr_eq(&SectionPlugin::Agent(plugin)));
}

#[test]
fn reregistering_under_other_parsed_name_moves_index_entry() {
	let mut registry = PluginRegistry::new();
	registry.add_section_plugin(agent_section("mem_win", "mem"));
	registry.add_section_plugin(agent_section("mem_win", "mem_windows"));

	assert!(registry.get_section_producers(&parsed_name("mem")).is_empty());
	assert_eq!(
		registry
			.get_section_producers(&parsed_name("mem_windows"))
			.into_iter()
			.collect::<Vec<_>>(),
		vec![section_name("mem_win")]
	);
}

#[test]
fn reregistering_under_other_source_moves_section() {
	let mut registry = PluginRegistry::new();
	registry.add_section_plugin(agent_section("uptime", "uptime"));
	registry.add_section_plugin(snmp_section("uptime", "uptime"));

	let snapshot = registry.snapshot();
	assert!(snapshot.agent_sections.is_empty());
	assert_eq!(snapshot.snmp_sections.len(), 1);
	assert_eq!(
		registry.get_section_plugin(&section_name("uptime")).unwrap().source(),
		SectionSource::Snmp
	);
	assert_eq!(registry.get_section_producers(&parsed_name("uptime")).len(), 1);
}

#[test]
fn conflicting_check_plugin_is_not_registered() {
	let mut registry = PluginRegistry::new();
	registry
		.add_check_plugin(check_plugin("df", "Filesystem %s", &["df"], Some("filesystem")))
		.unwrap();

	let err = registry
		.add_check_plugin(check_plugin("df_total", "Filesystem total", &["df"], Some("filesystem")))
		.unwrap_err();
	assert_eq!(
		err,
		RegistrationError::RulesetItemConflict {
			ruleset: ruleset_name("filesystem"),
			plugin: check_name("df_total"),
			present: vec![check_name("df")],
			requirement: ItemRequirement::Requires,
		}
	);
	assert!(!registry.is_registered_check_plugin(&check_name("df_total")));
	assert!(registry.get_check_plugin(&check_name("df_total")).is_none());

	// a consistent sibling is still accepted after the rejection
	registry
		.add_check_plugin(check_plugin("df_netapp", "Filesystem %s", &["df"], Some("filesystem")))
		.unwrap();
}

#[test]
fn reregistered_check_plugin_replaces_previous_definition() {
	let mut registry = PluginRegistry::new();
	registry
		.add_check_plugin(check_plugin("cpu", "CPU %s", &["cpu"], Some("cpu")))
		.unwrap();
	registry
		.add_check_plugin(check_plugin("cpu", "CPU load", &["cpu"], Some("cpu")))
		.unwrap();

	let plugin = registry.get_check_plugin(&check_name("cpu")).unwrap();
	assert!(!plugin.has_item());

	// the group now only holds the item-less definition
	let err = registry
		.add_check_plugin(check_plugin("cpu_threads", "Thread %s", &["cpu"], Some("cpu")))
		.unwrap_err();
	assert!(matches!(
		err,
		RegistrationError::RulesetItemConflict {
			requirement: ItemRequirement::DoesNotSupport,
			..
		}
	));
}

#[test]
fn unknown_rulesets_are_empty() {
	let registry = PluginRegistry::new();
	assert!(registry.get_discovery_ruleset(&ruleset_name("nothing")).is_empty());
	assert!(registry.get_host_label_ruleset(&ruleset_name("nothing")).is_empty());
	assert!(!registry.is_stored_ruleset(&ruleset_name("nothing")));
}

#[test]
fn rulesets_share_one_store() {
	let mut registry = PluginRegistry::new();
	registry.add_discovery_ruleset(ruleset_name("inventory_df_rules"));
	registry.set_host_label_ruleset(ruleset_name("snmp_labels"), vec![json!({"label": "x"})]);

	assert!(registry.is_stored_ruleset(&ruleset_name("inventory_df_rules")));
	assert!(registry.get_discovery_ruleset(&ruleset_name("inventory_df_rules")).is_empty());
	assert_eq!(
		registry.get_discovery_ruleset(&ruleset_name("snmp_labels")),
		&[json!({"label": "x"})]
	);

	let discovery: Vec<_> = registry.iter_all_discovery_rulesets().collect();
	let host_label: Vec<_> = registry.iter_all_host_label_rulesets().collect();
	assert_eq!(discovery, host_label);
	assert_eq!(discovery.len(), 2);
}

#[test]
fn declaring_a_ruleset_keeps_its_rules() {
	let mut registry = PluginRegistry::new();
	registry.set_discovery_ruleset(ruleset_name("df"), vec![json!({"levels": [80, 90]})]);
	registry.add_discovery_ruleset(ruleset_name("df"));
	assert_eq!(registry.get_discovery_ruleset(&ruleset_name("df")).len(), 1);

	registry.set_discovery_ruleset(ruleset_name("df"), Vec::new());
	assert!(registry.get_discovery_ruleset(&ruleset_name("df")).is_empty());
	assert!(registry.is_stored_ruleset(&ruleset_name("df")));
}

#[test]
fn snapshot_is_isolated_from_later_registrations() {
	let mut registry = shared_parsed_section_registry();
	let before = registry.snapshot();

	registry.add_section_plugin(agent_section("s3", "p"));
	registry.add_inventory_plugin(inventory_plugin("inv", &["p"]));

	assert_eq!(before.agent_sections.len(), 1);
	assert!(before.inventory_plugins.is_empty());
	assert_eq!(before.len(), 3);
	assert_eq!(registry.snapshot().len(), 5);
}

#[test]
fn published_generation_replaces_current() {
	let store = PluginStore::default();
	assert_eq!(store.generation(), 0);
	let pinned = store.load();

	let previous = store.publish(shared_parsed_section_registry());
	assert!(Arc::ptr_eq(&previous, &pinned));
	assert_eq!(store.generation(), 1);

	assert!(pinned.get_check_plugin(&check_name("c")).is_none());
	assert!(store.load().get_check_plugin(&check_name("c")).is_some());
}

#[test]
fn failed_update_keeps_current_generation() {
	let store = PluginStore::new(shared_parsed_section_registry());
	let before = store.load();

	let result = store.update(|registry| {
		registry.add_check_plugin(check_plugin("c_items", "C %s", &["p"], None))?;
		registry.add_check_plugin(check_plugin("df", "Filesystem %s", &["df"], Some("fs")))?;
		registry.add_check_plugin(check_plugin("df_total", "Total", &["df"], Some("fs")))
	});

	assert!(result.is_err());
	assert!(Arc::ptr_eq(&before, &store.load()));
	assert_eq!(store.generation(), 0);
}

#[test]
fn concurrent_updates_are_not_lost() {
	let store = PluginStore::default();

	thread::scope(|scope| {
		for t in 0..4 {
			let store = &store;
			scope.spawn(move || {
				for i in 0..25 {
					store
						.update(|registry| {
							registry.add_discovery_ruleset(ruleset_name(&format!("r_{t}_{i}")));
							Ok::<_, RegistrationError>(())
						})
						.unwrap();
				}
			});
		}
	});

	assert_eq!(store.load().iter_all_discovery_rulesets().count(), 100);
	assert_eq!(store.generation(), 100);
}

#[test]
fn shared_loader_serialises_parallel_registration() {
	let loader = SharedLoader::new();

	thread::scope(|scope| {
		for t in 0..4 {
			let loader = &loader;
			scope.spawn(move || {
				for i in 0..10 {
					let name = format!("sec_{t}_{i}");
					loader.add_section_plugin(agent_section(&name, "shared"));
					loader
						.add_check_plugin(check_plugin(&format!("chk_{t}_{i}"), "Item %s", &["shared"], Some("rules")))
						.unwrap();
				}
			});
		}
	});

	let registry = loader.finish();
	assert_eq!(registry.get_section_producers(&parsed_name("shared")).len(), 40);
	assert_eq!(registry.snapshot().check_plugins.len(), 40);
	assert!(registry.needs_redetection(&section_name("sec_0_0")));
}

#[test]
fn shared_loader_rejects_conflicts_under_contention() {
	let loader = SharedLoader::new();
	loader.with(|registry| registry.add_discovery_ruleset(ruleset_name("rules")));

	let results: Vec<_> = thread::scope(|scope| {
		let handles: Vec<_> = ["Item %s", "Static"]
			.into_iter()
			.enumerate()
			.map(|(i, service_name)| {
				let loader = &loader;
				scope.spawn(move || {
					loader.add_check_plugin(check_plugin(&format!("chk_{i}"), service_name, &["x"], Some("rules")))
				})
			})
			.collect();
		handles.into_iter().map(|h| h.join().unwrap()).collect()
	});

	// whichever registered first wins, the other one conflicts
	assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
	assert_eq!(loader.finish().snapshot().check_plugins.len(), 1);
}
