//! Publication of registry generations.
//!
//! # Role
//!
//! Readers pin the current [`PluginRegistry`] through an `ArcSwap`. A reload
//! builds a new registry and swaps it in whole; small post-load changes go
//! through the compare-and-swap loop in [`PluginStore::update`].
//!
//! # Invariants
//!
//! - Concurrent updates are linearizable (see `store::tests::concurrent_updates_are_not_lost`).
//! - A pinned generation is never mutated.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arc_swap::ArcSwap;
use cmk_primitives::RuleSetName;
use parking_lot::Mutex;
use tracing::debug;

use super::PluginRegistry;
use crate::check::CheckPlugin;
use crate::error::RegistrationError;
use crate::inventory::InventoryPlugin;
use crate::ruleset::RuleSpec;
use crate::section::SectionPlugin;

/// Current registry generation, shared between readers and the loader.
pub struct PluginStore {
	current: ArcSwap<PluginRegistry>,
	generation: AtomicU64,
}

impl PluginStore {
	pub fn new(registry: PluginRegistry) -> Self {
		Self {
			current: ArcSwap::from_pointee(registry),
			generation: AtomicU64::new(0),
		}
	}

	/// Pins the current generation. The returned registry stays valid across swaps.
	#[inline]
	pub fn load(&self) -> Arc<PluginRegistry> {
		self.current.load_full()
	}

	/// Number of generations published since construction.
	#[inline]
	pub fn generation(&self) -> u64 {
		self.generation.load(Ordering::Acquire)
	}

	/// Replaces the current generation and returns the previous one.
	pub fn publish(&self, registry: PluginRegistry) -> Arc<PluginRegistry> {
		let previous = self.current.swap(Arc::new(registry));
		let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
		debug!(generation, "published plug-in registry generation");
		previous
	}

	/// Applies `f` to a copy of the current generation and publishes the result.
	///
	/// Retries on a concurrent publication, so `f` may run more than once. An
	/// error from `f` leaves the current generation in place.
	pub fn update<E, F>(&self, mut f: F) -> Result<Arc<PluginRegistry>, E>
	where
		F: FnMut(&mut PluginRegistry) -> Result<(), E>,
	{
		loop {
			let old = self.current.load_full();

			let mut next = PluginRegistry::clone(&old);
			f(&mut next)?;
			let next = Arc::new(next);

			let prev = self.current.compare_and_swap(&old, next.clone());
			if Arc::ptr_eq(&prev, &old) {
				let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
				debug!(generation, "updated plug-in registry generation");
				return Ok(next);
			}
			// lost the race, retry on the newer generation
		}
	}
}

impl Default for PluginStore {
	fn default() -> Self {
		Self::new(PluginRegistry::default())
	}
}

impl std::fmt::Debug for PluginStore {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PluginStore")
			.field("generation", &self.generation())
			.field("current", &*self.current.load())
			.finish()
	}
}

/// Registry under construction, shared by loader threads.
///
/// Each call takes the single lock, so registrations from parallel loaders
/// are serialised and the consistency check sees every earlier plug-in.
#[derive(Debug, Default)]
pub struct SharedLoader {
	inner: Mutex<PluginRegistry>,
}

impl SharedLoader {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add_section_plugin(&self, plugin: impl Into<SectionPlugin>) {
		self.inner.lock().add_section_plugin(plugin);
	}

	pub fn add_check_plugin(&self, plugin: impl Into<Arc<CheckPlugin>>) -> Result<(), RegistrationError> {
		self.inner.lock().add_check_plugin(plugin)
	}

	pub fn add_inventory_plugin(&self, plugin: impl Into<Arc<InventoryPlugin>>) {
		self.inner.lock().add_inventory_plugin(plugin);
	}

	pub fn add_discovery_ruleset(&self, name: RuleSetName) {
		self.inner.lock().add_discovery_ruleset(name);
	}

	pub fn add_host_label_ruleset(&self, name: RuleSetName) {
		self.inner.lock().add_host_label_ruleset(name);
	}

	pub fn set_discovery_ruleset(&self, name: RuleSetName, rules: Vec<RuleSpec>) {
		self.inner.lock().set_discovery_ruleset(name, rules);
	}

	pub fn set_host_label_ruleset(&self, name: RuleSetName, rules: Vec<RuleSpec>) {
		self.inner.lock().set_host_label_ruleset(name, rules);
	}

	/// Runs `f` with the registry locked.
	pub fn with<R>(&self, f: impl FnOnce(&mut PluginRegistry) -> R) -> R {
		f(&mut self.inner.lock())
	}

	/// Consumes the loader and returns the finished registry.
	pub fn finish(self) -> PluginRegistry {
		self.inner.into_inner()
	}
}
