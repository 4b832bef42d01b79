//! Builds a [`TargetModule`] from a normalized contract.

use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

use crate::config::Mode;
use crate::diagnostics::Diagnostics;
use crate::error::{Result, TranspileError};
use crate::plugin::PluginRegistry;
use crate::target::{TargetProfile, TargetRegistry};
use crate::transpiler::ast::{EntryKind, InterfaceEntry, NormalizedContract, Parameter};
use crate::transpiler::imports::{push_unique, resolve_libraries, use_statement};
use crate::transpiler::module::{
    Ability, Field, FunctionDef, Param, StructDef, TargetModule, Visibility,
};
use crate::transpiler::sanitize::sanitize_identifier;
use crate::transpiler::type_mapper::{
    MoveType, StructArena, StructField, SynthesizedStruct, TargetType, TypeMapper,
};
use crate::transpiler::walker::StatementWalker;

#[derive(Debug, Clone, Default)]
pub struct AssemblyOptions {
    pub mode: Mode,
    pub module_name: Option<String>,
    pub package_name: Option<String>,
    /// Library name to Move module path, already merged from every source.
    pub library_map: BTreeMap<String, String>,
}

pub struct Assembler<'a> {
    targets: &'a TargetRegistry,
    plugins: &'a PluginRegistry,
    options: &'a AssemblyOptions,
}

/// Mutable state of one assembly run.
struct Run<'a> {
    profile: &'a dyn TargetProfile,
    mapper: TypeMapper<'a>,
    arena: StructArena,
    diagnostics: &'a mut Diagnostics,
    uses_table: bool,
    uses_events: bool,
    uses_abort: bool,
    uses_vector: bool,
}

impl<'a> Run<'a> {
    fn map(
        &mut self,
        raw: &str,
        components: Option<&[Parameter]>,
        context: &str,
    ) -> Result<MoveType> {
        let TargetType { ty, structs } =
            self.mapper
                .map_type(raw, components, context, self.diagnostics)?;
        self.uses_table |= ty.contains_table();
        for def in structs {
            self.register(def);
        }
        Ok(ty)
    }

    fn register(&mut self, def: SynthesizedStruct) {
        self.uses_table |= def.fields.iter().any(|f| f.ty.contains_table());
        let name = def.name.clone();
        if self.arena.insert(def).is_some() {
            self.diagnostics.warn(format!(
                "struct {} defined twice with different fields; keeping the first definition",
                name
            ));
        }
    }
}

impl<'a> Assembler<'a> {
    pub fn new(
        targets: &'a TargetRegistry,
        plugins: &'a PluginRegistry,
        options: &'a AssemblyOptions,
    ) -> Self {
        Self {
            targets,
            plugins,
            options,
        }
    }

    pub fn assemble(
        &self,
        contract: &NormalizedContract,
        inferred_libraries: &[String],
        target: &str,
        custom_types: &BTreeMap<String, String>,
        diagnostics: &mut Diagnostics,
    ) -> Result<TargetModule> {
        let profile = self.targets.resolve(target).map_err(|err| {
            debug!("Known targets: {}", self.targets.names().join(", "));
            err
        })?;
        info!("Assembling {} for target {}", contract.name, profile.name());

        self.plugins
            .run_before_assemble(&contract.name, &contract.entries);

        let module_name =
            sanitize_identifier(self.options.module_name.as_deref().unwrap_or(&contract.name));
        let struct_name = sanitize_identifier(&contract.name);
        let event_fields = event_field_names(contract);

        let mut run = Run {
            profile,
            mapper: TypeMapper::new(custom_types, self.options.mode),
            arena: StructArena::new(),
            diagnostics,
            uses_table: false,
            uses_events: false,
            uses_abort: false,
            uses_vector: false,
        };

        // Generate the state struct and its init
        let (state_struct, state_types) = build_state_struct(&mut run, contract, &struct_name)?;
        let init = build_init(&run, &struct_name, &state_types);

        // Generate event and error structs and functions in declaration order
        let mut functions = vec![init];
        for entry in &contract.entries {
            match entry.kind {
                EntryKind::Event => build_entry_struct(&mut run, entry, "Event")?,
                EntryKind::Error => build_entry_struct(&mut run, entry, "Error")?,
                EntryKind::Function => {
                    functions.push(self.build_function(&mut run, entry, &event_fields)?)
                }
                _ => debug!("Skipping {:?} entry {}", entry.kind, entry.display_name()),
            }
        }
        run.uses_events |= contract.events().next().is_some();

        // Imports last, once every feature in use is known
        let imports = self.collect_imports(&mut run, inferred_libraries);

        let mut structs = vec![state_struct];
        structs.extend(
            run.arena
                .into_ordered()
                .iter()
                .map(StructDef::synthesized),
        );

        Ok(TargetModule {
            package: self
                .options
                .package_name
                .clone()
                .unwrap_or_else(|| module_name.to_lowercase()),
            name: module_name,
            imports,
            structs,
            functions,
        })
    }

    fn build_function(
        &self,
        run: &mut Run<'_>,
        entry: &InterfaceEntry,
        event_fields: &HashMap<String, Vec<String>>,
    ) -> Result<FunctionDef> {
        let raw_name = entry
            .name
            .as_deref()
            .ok_or_else(|| TranspileError::schema("name", "function entry must have a name"))?;
        let name = sanitize_identifier(raw_name);
        debug!("Processing function: {}", name);

        // Mutating functions end with the profile's context parameter
        let context_param = if entry.is_read_only() {
            None
        } else {
            Some(run.profile.context_param())
        };

        // Map the inputs, moving any that clash with the context parameter out of its way
        let mut params = Vec::with_capacity(entry.inputs.len() + 1);
        let mut renames = HashMap::new();
        for (i, input) in entry.inputs.iter().enumerate() {
            let mut param_name = parameter_name(input, i, "arg");
            if let Some(context) = &context_param {
                if param_name == context.name {
                    let original = param_name.clone();
                    while param_name == context.name
                        || entry_param_taken(entry, &param_name, i)
                    {
                        param_name.push('_');
                    }
                    run.diagnostics.note(format!(
                        "parameter {} of {} renamed to {} to keep the {} context parameter",
                        original,
                        name,
                        param_name,
                        run.profile.name()
                    ));
                    renames.insert(original, param_name.clone());
                }
            }
            let ty = run.map(
                &input.param_type,
                input.components.as_deref(),
                &format!("{}_{}", name, param_name),
            )?;
            params.push(Param::new(param_name, ty.to_string()));
        }

        let visibility = match context_param {
            Some(context) => {
                params.push(context);
                Visibility::Entry
            }
            None => Visibility::Friend,
        };

        // Generate the return type
        let mut returns = Vec::with_capacity(entry.outputs.len());
        for (i, output) in entry.outputs.iter().enumerate() {
            let context = format!("{}_{}", name, parameter_name(output, i, "ret"));
            returns.push(
                run.map(&output.param_type, output.components.as_deref(), &context)?
                    .to_string(),
            );
        }
        let return_type = match returns.len() {
            0 => None,
            1 => returns.pop(),
            _ => Some(format!("({})", returns.join(", "))),
        };

        // Walk the statement IR when there is one, otherwise fall back on the entry name
        let body = match &entry.body {
            Some(statements) => {
                let mut walker = StatementWalker::new(
                    self.plugins,
                    run.profile,
                    self.options.mode,
                    event_fields,
                    run.diagnostics,
                )
                .with_renames(renames);
                let text = walker.walk_statements(statements)?;
                let (uses_abort, uses_events, uses_vector) =
                    (walker.uses_abort(), walker.uses_events(), walker.uses_vector());
                run.uses_abort |= uses_abort;
                run.uses_events |= uses_events;
                run.uses_vector |= uses_vector;
                text.lines().map(str::to_string).collect()
            }
            None => fallback_body(raw_name, run.profile),
        };

        Ok(FunctionDef {
            visibility,
            name,
            params,
            return_type,
            body,
        })
    }

    fn collect_imports(&self, run: &mut Run<'_>, inferred_libraries: &[String]) -> Vec<String> {
        let mut imports = Vec::new();
        for statement in
            resolve_libraries(inferred_libraries, &self.options.library_map, run.diagnostics)
        {
            push_unique(&mut imports, statement);
        }

        for statement in run.profile.imports() {
            push_unique(&mut imports, statement);
        }
        if run.uses_table {
            push_unique(&mut imports, run.profile.table_import().to_string());
        }
        if run.uses_events {
            push_unique(&mut imports, run.profile.event_import().to_string());
        }
        if run.uses_abort {
            if let Some(abort_import) = run.profile.abort_import() {
                push_unique(&mut imports, abort_import.to_string());
            }
        }
        if run.uses_vector {
            push_unique(&mut imports, run.profile.vector_import().to_string());
        }
        for path in self.plugins.library_overrides().values() {
            push_unique(&mut imports, use_statement(path));
        }
        imports
    }
}

fn parameter_name(param: &Parameter, index: usize, prefix: &str) -> String {
    if param.name.is_empty() {
        format!("{}{}", prefix, index)
    } else {
        sanitize_identifier(&param.name)
    }
}

/// Whether another input of `entry` already goes by `name`.
fn entry_param_taken(entry: &InterfaceEntry, name: &str, skip: usize) -> bool {
    entry
        .inputs
        .iter()
        .enumerate()
        .any(|(i, p)| i != skip && parameter_name(p, i, "arg") == name)
}

fn event_field_names(contract: &NormalizedContract) -> HashMap<String, Vec<String>> {
    contract
        .events()
        .filter_map(|event| {
            let name = event.name.clone()?;
            let fields = event
                .inputs
                .iter()
                .enumerate()
                .map(|(i, p)| parameter_name(p, i, "arg"))
                .collect();
            Some((name, fields))
        })
        .collect()
}

fn build_state_struct(
    run: &mut Run<'_>,
    contract: &NormalizedContract,
    struct_name: &str,
) -> Result<(StructDef, Vec<(String, MoveType)>)> {
    let mut fields = run.profile.bookkeeping_fields();
    let mut state_types = Vec::with_capacity(contract.state_variables.len());

    for var in &contract.state_variables {
        let name = sanitize_identifier(&var.name);
        if fields.iter().any(|f| f.name == name) {
            run.diagnostics.note(format!(
                "state variable {} is carried by the {} bookkeeping field",
                var.name,
                run.profile.name()
            ));
            continue;
        }
        let ty = run.map(&var.var_type, None, &name)?;
        fields.push(Field::new(name.clone(), ty.to_string()));
        state_types.push((name, ty));
    }

    Ok((
        StructDef {
            name: struct_name.to_string(),
            abilities: vec![Ability::Key],
            fields,
        },
        state_types,
    ))
}

fn build_init(run: &Run<'_>, struct_name: &str, state_types: &[(String, MoveType)]) -> FunctionDef {
    let initializers: Vec<_> = state_types
        .iter()
        .map(|(name, ty)| format!("{}: {}", name, default_value(ty, &run.arena, run.profile)))
        .collect();

    FunctionDef {
        visibility: Visibility::Private,
        name: "init".to_string(),
        params: run.profile.init_params(),
        return_type: None,
        body: run.profile.init_body(struct_name, &initializers),
    }
}

fn build_entry_struct(run: &mut Run<'_>, entry: &InterfaceEntry, suffix: &str) -> Result<()> {
    let base = sanitize_identifier(entry.display_name());
    let name = format!("{}{}", base, suffix);

    let mut fields = Vec::with_capacity(entry.inputs.len());
    for (i, input) in entry.inputs.iter().enumerate() {
        let field_name = parameter_name(input, i, "arg");
        let ty = run.map(
            &input.param_type,
            input.components.as_deref(),
            &format!("{}_{}", base, field_name),
        )?;
        fields.push(StructField {
            name: field_name,
            ty,
        });
    }

    run.register(SynthesizedStruct { name, fields });
    Ok(())
}

/// Zero value for a state field in the generated `init`.
pub fn default_value(ty: &MoveType, arena: &StructArena, profile: &dyn TargetProfile) -> String {
    match ty {
        MoveType::Primitive("bool") => "false".to_string(),
        MoveType::Primitive("address") => "@0x0".to_string(),
        MoveType::Primitive("vector<u8>") => "b\"\"".to_string(),
        MoveType::Primitive(_) => "0".to_string(),
        MoveType::Vector(_) => "vector[]".to_string(),
        MoveType::Table(key, value) => {
            profile.container_constructor(&key.to_string(), &value.to_string())
        }
        MoveType::Struct(name) => match arena.get(name) {
            Some(def) => {
                let fields: Vec<_> = def
                    .fields
                    .iter()
                    .map(|f| format!("{}: {}", f.name, default_value(&f.ty, arena, profile)))
                    .collect();
                format!("{} {{ {} }}", name, fields.join(", "))
            }
            None => format!("/* TODO: initialize {} */", name),
        },
        MoveType::Custom(name) | MoveType::Unsupported(name) => {
            format!("/* TODO: initialize {} */", name)
        }
    }
}

/// Placeholder body for entries without statement IR, chosen from the entry name.
fn fallback_body(name: &str, profile: &dyn TargetProfile) -> Vec<String> {
    let lower = name.to_lowercase();
    let line = if lower.starts_with("onlyowner") || lower.ends_with("owner") {
        profile.owner_assertion()
    } else if lower == "initialize" {
        format!("self.owner = {};", profile.sender_expr())
    } else if lower.contains("transfer") {
        "// TODO: implement token transfer logic".to_string()
    } else if lower.contains("mint") || lower.contains("burn") {
        "// TODO: implement mint/burn logic".to_string()
    } else {
        format!("// TODO: implement {} logic", name)
    };
    vec![line]
}
