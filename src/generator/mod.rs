use crate::transpiler::module::{FunctionDef, StructDef, TargetModule};

const INDENT: &str = "    ";

/// Serialize a module. Output order follows the module exactly; nothing is validated here.
pub fn generate(module: &TargetModule) -> String {
    let mut output = String::new();

    // Generate module header
    output.push_str(&format!("module {}::{} {{\n", module.package, module.name));

    // Generate imports in assembly order
    for import in &module.imports {
        output.push_str(INDENT);
        output.push_str(import);
        output.push('\n');
    }

    // Generate state, synthesized, event and error structs
    for def in &module.structs {
        output.push('\n');
        output.push_str(&generate_struct(def));
    }

    // Generate functions, init first
    for func in &module.functions {
        output.push('\n');
        output.push_str(&generate_function(func));
    }

    output.push_str("}\n");
    output
}

fn generate_struct(def: &StructDef) -> String {
    let mut output = format!("{}struct {}", INDENT, def.name);

    if !def.abilities.is_empty() {
        let abilities: Vec<_> = def.abilities.iter().map(|a| a.as_str()).collect();
        output.push_str(&format!(" has {}", abilities.join(", ")));
    }
    output.push_str(" {\n");

    for field in &def.fields {
        output.push_str(&format!("{}{}{}: {},\n", INDENT, INDENT, field.name, field.ty));
    }

    output.push_str(INDENT);
    output.push_str("}\n");
    output
}

fn generate_function(func: &FunctionDef) -> String {
    let mut output = String::from(INDENT);

    let keyword = func.visibility.keyword();
    if !keyword.is_empty() {
        output.push_str(keyword);
        output.push(' ');
    }

    // Generate parameters
    let params: Vec<_> = func
        .params
        .iter()
        .map(|p| format!("{}: {}", p.name, p.ty))
        .collect();
    output.push_str(&format!("fun {}({})", func.name, params.join(", ")));

    if let Some(ret) = &func.return_type {
        output.push_str(&format!(": {}", ret));
    }
    output.push_str(" {\n");

    // Generate function body; blank lines stay unindented
    for line in &func.body {
        if !line.is_empty() {
            output.push_str(INDENT);
            output.push_str(INDENT);
            output.push_str(line);
        }
        output.push('\n');
    }

    output.push_str(INDENT);
    output.push_str("}\n");
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transpiler::module::{Ability, Field, Param, Visibility};

    fn module() -> TargetModule {
        TargetModule {
            name: "Counter".to_string(),
            package: "counter".to_string(),
            imports: vec!["use std::signer;".to_string()],
            structs: vec![StructDef {
                name: "Counter".to_string(),
                abilities: vec![Ability::Key],
                fields: vec![Field::new("owner", "address"), Field::new("count", "u64")],
            }],
            functions: vec![
                FunctionDef {
                    visibility: Visibility::Private,
                    name: "init".to_string(),
                    params: vec![Param::new("account", "&signer")],
                    return_type: None,
                    body: vec!["let x = 1;".to_string(), "".to_string(), "x;".to_string()],
                },
                FunctionDef {
                    visibility: Visibility::Friend,
                    name: "get".to_string(),
                    params: vec![],
                    return_type: Some("(u64, bool)".to_string()),
                    body: vec!["return (0, true);".to_string()],
                },
            ],
        }
    }

    #[test]
    fn test_generate_module_layout() {
        let expected = "\
module counter::Counter {
    use std::signer;

    struct Counter has key {
        owner: address,
        count: u64,
    }

    fun init(account: &signer) {
        let x = 1;

        x;
    }

    public(friend) fun get(): (u64, bool) {
        return (0, true);
    }
}
";
        assert_eq!(generate(&module()), expected);
    }

    #[test]
    fn test_generate_is_deterministic() {
        let module = module();
        assert_eq!(generate(&module), generate(&module));
    }

    #[test]
    fn test_struct_without_abilities() {
        let def = StructDef {
            name: "Marker".to_string(),
            abilities: vec![],
            fields: vec![],
        };
        assert_eq!(generate_struct(&def), "    struct Marker {\n    }\n");
    }
}
