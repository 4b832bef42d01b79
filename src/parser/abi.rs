//! Solidity ABI JSON normalization.

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::{Result, TranspileError};
use crate::plugin::PluginRegistry;
use crate::transpiler::ast::{
    EntryKind, InterfaceEntry, Mutability, NormalizedContract, Parameter, StateVariable,
};

/// Parse an ABI array into a contract named `contract_name`.
///
/// The ABI carries no storage layout, so the named constructor inputs stand in for state
/// variables.
pub fn parse_abi(
    json: &str,
    contract_name: &str,
    plugins: &PluginRegistry,
) -> Result<NormalizedContract> {
    let raw: Value = serde_json::from_str(json)?;
    plugins.run_before_normalize(&raw);

    let items = raw
        .as_array()
        .ok_or_else(|| TranspileError::schema("$", "expected an array of ABI entries"))?;

    let mut entries = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        entries.push(parse_entry(item, &format!("[{}]", index))?);
    }
    let entries = plugins.run_after_normalize(entries);

    let state_variables = constructor_state(&entries);
    info!(
        "Parsed ABI for {}: {} entries, {} state variables",
        contract_name,
        entries.len(),
        state_variables.len()
    );

    Ok(NormalizedContract {
        name: contract_name.to_string(),
        state_variables,
        entries,
        ..NormalizedContract::default()
    })
}

fn constructor_state(entries: &[InterfaceEntry]) -> Vec<StateVariable> {
    entries
        .iter()
        .filter(|entry| entry.kind == EntryKind::Constructor)
        .flat_map(|entry| entry.inputs.iter())
        .filter(|input| !input.name.is_empty())
        .map(|input| StateVariable::new(input.name.clone(), input.param_type.clone()))
        .collect()
}

fn parse_entry(value: &Value, path: &str) -> Result<InterfaceEntry> {
    let obj = value
        .as_object()
        .ok_or_else(|| TranspileError::schema(path, "expected an object"))?;

    let kind = required_str(obj, "type", path)?;
    let name = optional_str(obj, "name", path)?;
    debug!("Normalizing {} {}", kind, name.unwrap_or("<anonymous>"));

    let payable = optional_bool(obj, "payable", path)?;
    let constant = optional_bool(obj, "constant", path)?;
    let mutability = match optional_str(obj, "stateMutability", path)? {
        Some(raw) => Some(Mutability::parse(raw).ok_or_else(|| {
            TranspileError::schema(
                format!("{}.stateMutability", path),
                format!("unknown state mutability `{}`", raw),
            )
        })?),
        None if constant == Some(true) => Some(Mutability::View),
        None if payable == Some(true) => Some(Mutability::Payable),
        None => None,
    };

    Ok(InterfaceEntry {
        kind: EntryKind::parse(kind),
        name: name.map(str::to_string),
        inputs: parameters(obj, "inputs", path)?,
        outputs: parameters(obj, "outputs", path)?,
        mutability,
        anonymous: optional_bool(obj, "anonymous", path)?.unwrap_or(false),
        payable: payable.unwrap_or(false) || mutability == Some(Mutability::Payable),
        body: None,
    })
}

fn parameters(obj: &Map<String, Value>, key: &str, path: &str) -> Result<Vec<Parameter>> {
    let field = format!("{}.{}", path, key);
    let items = match obj.get(key) {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(TranspileError::schema(field, "expected an array")),
    };

    let mut params = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let param_path = format!("{}[{}]", field, index);
        validate_parameter(item, &param_path)?;
        params.push(Parameter::deserialize(item)?);
    }
    Ok(params)
}

fn validate_parameter(value: &Value, path: &str) -> Result<()> {
    let obj = value
        .as_object()
        .ok_or_else(|| TranspileError::schema(path, "expected an object"))?;

    required_str(obj, "type", path)?;
    optional_str(obj, "name", path)?;
    optional_bool(obj, "indexed", path)?;

    match obj.get("components") {
        None | Some(Value::Null) => Ok(()),
        Some(Value::Array(components)) => {
            for (index, component) in components.iter().enumerate() {
                validate_parameter(component, &format!("{}.components[{}]", path, index))?;
            }
            Ok(())
        }
        Some(_) => Err(TranspileError::schema(
            format!("{}.components", path),
            "expected an array",
        )),
    }
}

fn required_str<'v>(obj: &'v Map<String, Value>, key: &str, path: &str) -> Result<&'v str> {
    optional_str(obj, key, path)?
        .ok_or_else(|| TranspileError::schema(format!("{}.{}", path, key), "required string"))
}

fn optional_str<'v>(obj: &'v Map<String, Value>, key: &str, path: &str) -> Result<Option<&'v str>> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(TranspileError::schema(
            format!("{}.{}", path, key),
            "expected a string",
        )),
    }
}

fn optional_bool(obj: &Map<String, Value>, key: &str, path: &str) -> Result<Option<bool>> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(TranspileError::schema(
            format!("{}.{}", path, key),
            "expected a boolean",
        )),
    }
}
