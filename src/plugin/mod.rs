//! Transpiler plugins.
//!
//! Every hook on [`Plugin`] is optional. [`PluginRegistry`] owns the ordering rules so call
//! sites never inspect individual plugins:
//!
//! * `before_*` hooks run in registration order,
//! * `after_*` hooks pipe their input through each plugin in registration order,
//! * override maps are merged, later plugins winning on conflicts,
//! * statement handlers are tried in registration order until one claims the node.

pub mod advanced_syntax;
pub mod erc20;
pub mod for_loop;

use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::Result;
use crate::transpiler::ast::{InterfaceEntry, Statement};
use crate::transpiler::walker::StatementWalker;

pub use advanced_syntax::AdvancedSyntaxPlugin;
pub use erc20::Erc20MappingPlugin;
pub use for_loop::ForLoopPlugin;

pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;

    /// Observe the raw input before normalization.
    fn before_normalize(&self, _raw: &Value) {}

    fn after_normalize(&self, entries: Vec<InterfaceEntry>) -> Vec<InterfaceEntry> {
        entries
    }

    fn before_assemble(&self, _contract_name: &str, _entries: &[InterfaceEntry]) {}

    /// Post-process the printed module text.
    fn after_assemble(&self, module_text: String) -> String {
        module_text
    }

    fn type_overrides(&self) -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    fn library_overrides(&self) -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    /// Translate a statement the walker may not understand. `Ok(None)` passes it on.
    fn handle_statement(
        &self,
        _stmt: &Statement,
        _walker: &mut StatementWalker<'_>,
    ) -> Result<Option<String>> {
        Ok(None)
    }
}

#[derive(Default)]
pub struct PluginRegistry {
    plugins: Vec<Box<dyn Plugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The plugins the command line enables by default.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.add(Box::new(AdvancedSyntaxPlugin));
        registry.add(Box::new(ForLoopPlugin));
        registry
    }

    pub fn add(&mut self, plugin: Box<dyn Plugin>) {
        debug!("Registering plugin {}", plugin.name());
        self.plugins.push(plugin);
    }

    pub fn names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    pub fn run_before_normalize(&self, raw: &Value) {
        for plugin in &self.plugins {
            plugin.before_normalize(raw);
        }
    }

    pub fn run_after_normalize(&self, entries: Vec<InterfaceEntry>) -> Vec<InterfaceEntry> {
        self.plugins
            .iter()
            .fold(entries, |acc, plugin| plugin.after_normalize(acc))
    }

    pub fn run_before_assemble(&self, contract_name: &str, entries: &[InterfaceEntry]) {
        for plugin in &self.plugins {
            plugin.before_assemble(contract_name, entries);
        }
    }

    pub fn run_after_assemble(&self, module_text: String) -> String {
        self.plugins
            .iter()
            .fold(module_text, |acc, plugin| plugin.after_assemble(acc))
    }

    pub fn type_overrides(&self) -> BTreeMap<String, String> {
        self.plugins
            .iter()
            .fold(BTreeMap::new(), |mut acc, plugin| {
                acc.extend(plugin.type_overrides());
                acc
            })
    }

    pub fn library_overrides(&self) -> BTreeMap<String, String> {
        self.plugins
            .iter()
            .fold(BTreeMap::new(), |mut acc, plugin| {
                acc.extend(plugin.library_overrides());
                acc
            })
    }

    pub fn handle_statement(
        &self,
        stmt: &Statement,
        walker: &mut StatementWalker<'_>,
    ) -> Result<Option<String>> {
        for plugin in &self.plugins {
            if let Some(text) = plugin.handle_statement(stmt, walker)? {
                debug!("Plugin {} handled {}", plugin.name(), stmt.kind());
                return Ok(Some(text));
            }
        }
        Ok(None)
    }
}
