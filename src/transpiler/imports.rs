//! Solidity library inference and `use` statement resolution.

use std::collections::BTreeMap;

use crate::diagnostics::Diagnostics;
use crate::transpiler::ast::InterfaceEntry;

const BUILTIN_LIBRARIES: &[(&str, &str)] = &[
    ("SafeMath", "0x1::SafeMath"),
    ("Ownable", "0x1::AccessControl"),
    ("IERC20", "0x1::coin"),
    ("Address", "0x1::AddressUtils"),
];

pub fn builtin_library_map() -> BTreeMap<String, String> {
    BUILTIN_LIBRARIES
        .iter()
        .map(|(name, path)| (name.to_string(), path.to_string()))
        .collect()
}

/// Guess which well-known Solidity libraries a contract relies on from its interface.
pub fn infer_libraries(entries: &[InterfaceEntry]) -> Vec<String> {
    let mut libs: Vec<String> = Vec::new();
    let mut add = |lib: &str| {
        if !libs.iter().any(|l| l == lib) {
            libs.push(lib.to_string());
        }
    };

    for entry in entries {
        match entry.name.as_deref() {
            Some("transfer") | Some("approve") => {
                add("IERC20");
                add("SafeMath");
            }
            Some("owner") => add("Ownable"),
            _ => {}
        }
        if entry.inputs.iter().any(|input| input.param_type == "address") {
            add("Address");
        }
    }
    libs
}

pub fn use_statement(path: &str) -> String {
    format!("use {};", path.trim_end_matches(';'))
}

/// Resolve library names through `library_map`; unknown names are reported and skipped.
pub fn resolve_libraries(
    libraries: &[String],
    library_map: &BTreeMap<String, String>,
    diagnostics: &mut Diagnostics,
) -> Vec<String> {
    libraries
        .iter()
        .filter_map(|lib| match library_map.get(lib) {
            Some(path) => Some(use_statement(path)),
            None => {
                diagnostics.warn(format!("Missing Move mapping for library {}", lib));
                None
            }
        })
        .collect()
}

/// Append `statement` unless the exact text is already present.
pub fn push_unique(imports: &mut Vec<String>, statement: String) {
    if !imports.contains(&statement) {
        imports.push(statement);
    }
}
