//! The transpilation pipeline and its entry point, [`Transpiler`].

pub mod assembler;
pub mod ast;
pub mod imports;
pub mod module;
pub mod sanitize;
pub mod type_mapper;
pub mod walker;

use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::config::TranspilerConfig;
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::generator;
use crate::parser;
use crate::plugin::PluginRegistry;
use crate::target::TargetRegistry;

use assembler::{Assembler, AssemblyOptions};
use ast::NormalizedContract;
use imports::{builtin_library_map, infer_libraries};
use module::TargetModule;

/// Result of one successful transpilation.
#[derive(Debug)]
pub struct Transpiled {
    pub module_name: String,
    pub source: String,
    pub diagnostics: Diagnostics,
}

/// Holds configuration and registries; every call builds its own working state, so one
/// `Transpiler` can serve many inputs.
pub struct Transpiler {
    config: TranspilerConfig,
    plugins: PluginRegistry,
    targets: TargetRegistry,
}

impl Transpiler {
    /// Built-in targets and the default plugin set.
    pub fn new(config: TranspilerConfig) -> Self {
        Self {
            config,
            plugins: PluginRegistry::with_defaults(),
            targets: TargetRegistry::with_builtins(),
        }
    }

    pub fn with_plugins(mut self, plugins: PluginRegistry) -> Self {
        self.plugins = plugins;
        self
    }

    pub fn with_targets(mut self, targets: TargetRegistry) -> Self {
        self.targets = targets;
        self
    }

    pub fn config(&self) -> &TranspilerConfig {
        &self.config
    }

    pub fn plugins(&self) -> &PluginRegistry {
        &self.plugins
    }

    pub fn transpile_abi(&self, json: &str, contract_name: &str) -> Result<Transpiled> {
        let contract = parser::parse_abi(json, contract_name, &self.plugins)?;
        self.transpile_contract(&contract)
    }

    pub fn transpile_source_ast(&self, json: &str, contract_name: Option<&str>) -> Result<Transpiled> {
        let contracts = parser::parse_source_ast(json, &self.plugins)?;
        let contract = parser::select_contract(contracts, contract_name)?;
        self.transpile_contract(&contract)
    }

    pub fn transpile_contract(&self, contract: &NormalizedContract) -> Result<Transpiled> {
        debug!("Active plugins: [{}]", self.plugins.names().join(", "));
        let mut diagnostics = Diagnostics::new();
        let module = self.assemble(contract, &mut diagnostics)?;

        let source = self
            .plugins
            .run_after_assemble(generator::generate(&module));
        info!(
            "Generated module {}::{} with {} warning(s)",
            module.package,
            module.name,
            diagnostics.warnings().count()
        );

        Ok(Transpiled {
            module_name: module.name,
            source,
            diagnostics,
        })
    }

    /// Build the module without printing it.
    pub fn assemble(
        &self,
        contract: &NormalizedContract,
        diagnostics: &mut Diagnostics,
    ) -> Result<TargetModule> {
        let mut custom_types = self.config.merged_custom_types();
        custom_types.extend(self.plugins.type_overrides());

        let options = AssemblyOptions {
            mode: self.config.mode(),
            module_name: self.config.module_name.clone(),
            package_name: self.config.package_name.clone(),
            library_map: self.library_map(),
        };
        let inferred = infer_libraries(&contract.entries);

        Assembler::new(&self.targets, &self.plugins, &options).assemble(
            contract,
            &inferred,
            self.config.target(),
            &custom_types,
            diagnostics,
        )
    }

    /// Built-in mappings, overridden by `libraryMappings`, overridden by plugins.
    fn library_map(&self) -> BTreeMap<String, String> {
        let mut map = builtin_library_map();
        map.extend(self.config.library_mappings.clone());
        map.extend(self.plugins.library_overrides());
        map
    }
}
