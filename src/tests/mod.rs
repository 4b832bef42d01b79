use super::config::{Mode, TranspilerConfig};
use super::diagnostics::Diagnostics;
use super::error::TranspileError;
use super::generator;
use super::parser;
use super::plugin::{Erc20MappingPlugin, Plugin, PluginRegistry};
use super::target::{SuiTarget, TargetProfile, TargetRegistry};
use super::transpiler::module::{Field, Param};
use super::transpiler::type_mapper::get_type_string;
use super::transpiler::Transpiler;
use anyhow::Result;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashSet};

#[cfg(test)]
mod tests {
    use super::*;

    fn config(target: &str) -> TranspilerConfig {
        TranspilerConfig {
            target: Some(target.to_string()),
            ..TranspilerConfig::default()
        }
    }

    fn erc20_abi() -> Value {
        json!([
            {
                "type": "constructor",
                "inputs": [
                    {"name": "totalSupply", "type": "uint256"},
                    {"name": "balances", "type": "mapping(address => uint256)"}
                ],
                "stateMutability": "nonpayable"
            },
            {
                "type": "function",
                "name": "transfer",
                "inputs": [
                    {"name": "to", "type": "address"},
                    {"name": "value", "type": "uint256"}
                ],
                "outputs": [{"name": "", "type": "bool"}],
                "stateMutability": "nonpayable"
            },
            {
                "type": "function",
                "name": "approve",
                "inputs": [
                    {"name": "spender", "type": "address"},
                    {"name": "value", "type": "uint256"}
                ],
                "outputs": [{"name": "", "type": "bool"}],
                "stateMutability": "nonpayable"
            },
            {
                "type": "event",
                "name": "Transfer",
                "anonymous": false,
                "inputs": [
                    {"name": "from", "type": "address", "indexed": true},
                    {"name": "to", "type": "address", "indexed": true},
                    {"name": "value", "type": "uint256", "indexed": false}
                ]
            }
        ])
    }

    fn ident(name: &str) -> Value {
        json!({"nodeType": "Identifier", "name": name})
    }

    fn typed(name: &str, type_string: &str) -> Value {
        json!({
            "nodeType": "VariableDeclaration",
            "name": name,
            "visibility": "public",
            "typeDescriptions": {"typeString": type_string}
        })
    }

    fn msg_sender() -> Value {
        json!({"nodeType": "MemberAccess", "expression": ident("msg"), "memberName": "sender"})
    }

    fn vault_ast(extra_statement: Option<Value>) -> Value {
        let mut statements = vec![
            json!({
                "nodeType": "ExpressionStatement",
                "expression": {
                    "nodeType": "FunctionCall",
                    "expression": ident("require"),
                    "arguments": [
                        {
                            "nodeType": "BinaryOperation",
                            "operator": ">",
                            "leftExpression": ident("amount"),
                            "rightExpression": {"nodeType": "Literal", "kind": "number", "value": "0"}
                        },
                        {"nodeType": "Literal", "kind": "string", "value": "zero amount"}
                    ]
                }
            }),
            json!({
                "nodeType": "ExpressionStatement",
                "expression": {
                    "nodeType": "Assignment",
                    "operator": "+=",
                    "leftHandSide": {
                        "nodeType": "IndexAccess",
                        "baseExpression": {
                            "nodeType": "Identifier",
                            "name": "balances",
                            "typeDescriptions": {"typeString": "mapping(address => uint256)"}
                        },
                        "indexExpression": msg_sender()
                    },
                    "rightHandSide": ident("amount")
                }
            }),
            json!({
                "nodeType": "EmitStatement",
                "eventCall": {
                    "nodeType": "FunctionCall",
                    "expression": ident("Deposit"),
                    "arguments": [msg_sender(), ident("amount")]
                }
            }),
        ];
        statements.extend(extra_statement);

        json!({
            "nodeType": "SourceUnit",
            "nodes": [
                {
                    "nodeType": "ContractDefinition",
                    "name": "Helper",
                    "nodes": []
                },
                {
                    "nodeType": "ContractDefinition",
                    "name": "Vault",
                    "nodes": [
                        typed("balances", "mapping(address => uint256)"),
                        {
                            "nodeType": "EventDefinition",
                            "name": "Deposit",
                            "parameters": {"parameters": [typed("from", "address"), typed("value", "uint256")]}
                        },
                        {
                            "nodeType": "FunctionDefinition",
                            "kind": "function",
                            "name": "deposit",
                            "stateMutability": "nonpayable",
                            "parameters": {"parameters": [typed("amount", "uint256")]},
                            "returnParameters": {"parameters": []},
                            "body": {"nodeType": "Block", "statements": statements}
                        }
                    ]
                }
            ]
        })
    }

    #[test]
    fn test_view_function_from_abi() -> Result<()> {
        let abi = json!([{
            "type": "function",
            "name": "balanceOf",
            "inputs": [{"name": "account", "type": "address"}],
            "outputs": [{"name": "", "type": "uint256"}],
            "stateMutability": "view"
        }]);

        let out = Transpiler::new(config("sui")).transpile_abi(&abi.to_string(), "Token")?;
        let expected = "\
module token::Token {
    use 0x1::AddressUtils;
    use sui::object::{Self, UID};
    use sui::transfer;
    use sui::tx_context::{Self, TxContext};

    struct Token has key {
        id: UID,
        owner: address,
    }

    fun init(ctx: &mut TxContext) {
        let sender = tx_context::sender(ctx);
        transfer::transfer(Token {
            id: object::new(ctx),
            owner: sender,
        }, sender);
    }

    public(friend) fun balanceOf(account: address): u256 {
        // TODO: implement balanceOf logic
    }
}
";
        assert_eq!(out.module_name, "Token");
        assert_eq!(out.source, expected);
        Ok(())
    }

    #[test]
    fn test_mapping_state_initialized_with_container() -> Result<()> {
        let abi = erc20_abi().to_string();

        let sui = Transpiler::new(config("sui")).transpile_abi(&abi, "Token")?;
        assert!(sui
            .source
            .contains("        balances: table::Table<address, u256>,\n"));
        assert!(sui
            .source
            .contains("            balances: table::new<address, u256>(ctx),\n"));
        assert!(sui.source.contains("    use sui::table;\n"));

        let aptos = Transpiler::new(config("aptos")).transpile_abi(&abi, "Token")?;
        assert!(aptos
            .source
            .contains("            balances: table::new<address, u256>(),\n"));
        assert!(aptos.source.contains("    use aptos_std::table;\n"));
        assert!(aptos.source.contains(
            "    public entry fun transfer(to: address, value: u256, account: &signer): bool {\n"
        ));
        Ok(())
    }

    #[test]
    fn test_nested_array_needs_no_structs() -> Result<()> {
        assert_eq!(
            get_type_string("uint256[][]", None, &BTreeMap::new())?,
            "vector<vector<u256>>"
        );

        let abi = json!([{
            "type": "function",
            "name": "matrix",
            "inputs": [{"name": "rows", "type": "uint256[][]"}],
            "stateMutability": "pure"
        }]);
        let out = Transpiler::new(config("sui")).transpile_abi(&abi.to_string(), "Grid")?;
        assert_eq!(out.source.matches("struct ").count(), 1);
        assert!(out
            .source
            .contains("public(friend) fun matrix(rows: vector<vector<u256>>) {"));
        Ok(())
    }

    #[test]
    fn test_unknown_target_produces_nothing() {
        let result = Transpiler::new(config("unknown")).transpile_abi("[]", "Token");
        assert!(matches!(
            result,
            Err(TranspileError::UnknownTarget(name)) if name == "unknown"
        ));
    }

    #[test]
    fn test_target_name_is_case_insensitive() -> Result<()> {
        let out = Transpiler::new(config("Aptos")).transpile_abi("[]", "Empty")?;
        assert!(out.source.contains("move_to(account, Empty {"));
        Ok(())
    }

    #[test]
    fn test_printed_imports_round_trip() -> Result<()> {
        let transpiler = Transpiler::new(config("sui"));
        let contract = parser::parse_abi(&erc20_abi().to_string(), "Token", transpiler.plugins())?;
        let module = transpiler.assemble(&contract, &mut Diagnostics::new())?;

        let text = generator::generate(&module);
        let printed: Vec<_> = text
            .lines()
            .map(str::trim)
            .filter(|line| line.starts_with("use "))
            .collect();

        assert_eq!(printed, module.imports);
        let unique: HashSet<_> = printed.iter().collect();
        assert_eq!(unique.len(), printed.len());
        assert_eq!(
            &module.imports[..3],
            ["use 0x1::coin;", "use 0x1::SafeMath;", "use 0x1::AddressUtils;"]
        );
        assert!(module.imports.contains(&"use sui::event;".to_string()));
        Ok(())
    }

    #[test]
    fn test_duplicate_event_yields_one_struct() -> Result<()> {
        let mut abi = erc20_abi();
        let transfer_event = abi[3].clone();
        if let Some(entries) = abi.as_array_mut() {
            entries.push(transfer_event);
        }

        let out = Transpiler::new(config("sui")).transpile_abi(&abi.to_string(), "Token")?;
        assert_eq!(out.source.matches("struct TransferEvent has").count(), 1);
        assert!(out
            .source
            .contains("    struct TransferEvent has copy, drop, store {\n"));
        Ok(())
    }

    #[test]
    fn test_erc20_plugin_overrides() -> Result<()> {
        let mut plugins = PluginRegistry::with_defaults();
        plugins.add(Box::new(Erc20MappingPlugin));

        assert_eq!(
            get_type_string("contract IERC20", None, &plugins.type_overrides())?,
            "0x2::coin::CoinStore"
        );

        let out = Transpiler::new(config("sui"))
            .with_plugins(plugins)
            .transpile_abi(&erc20_abi().to_string(), "Token")?;
        assert_eq!(out.source.matches("use 0x2::coin;").count(), 1);
        assert!(!out.source.contains("use 0x1::coin;"));
        Ok(())
    }

    #[test]
    fn test_config_overrides() -> Result<()> {
        let config = TranspilerConfig::from_json(
            r#"{
                "target": "sui",
                "moduleName": "vault_v2",
                "packageName": "acme",
                "customTypes": {"fixed128x18": "u128"},
                "libraryMappings": {"Address": "acme::addresses"}
            }"#,
        )?;
        let abi = json!([{
            "type": "function",
            "name": "rate",
            "inputs": [{"name": "who", "type": "address"}],
            "outputs": [{"name": "", "type": "fixed128x18"}],
            "stateMutability": "view"
        }]);

        let out = Transpiler::new(config).transpile_abi(&abi.to_string(), "Vault")?;
        assert_eq!(out.module_name, "vault_v2");
        assert!(out.source.starts_with("module acme::vault_v2 {\n    use acme::addresses;\n"));
        assert!(out.source.contains("    struct Vault has key {\n"));
        assert!(out.source.contains("fun rate(who: address): u128 {"));
        Ok(())
    }

    #[test]
    fn test_lenient_type_placeholder_and_strict_failure() -> Result<()> {
        let abi = json!([{
            "type": "function",
            "name": "rate",
            "outputs": [{"name": "", "type": "fixed128x18"}],
            "stateMutability": "view"
        }])
        .to_string();

        let out = Transpiler::new(config("sui")).transpile_abi(&abi, "Vault")?;
        assert!(out.source.contains("): /* UNSUPPORTED: fixed128x18 */ {"));
        assert_eq!(out.diagnostics.warnings().count(), 1);

        let strict = TranspilerConfig {
            strict_mode: true,
            ..config("sui")
        };
        assert_eq!(strict.mode(), Mode::Strict);
        let result = Transpiler::new(strict).transpile_abi(&abi, "Vault");
        assert!(matches!(result, Err(TranspileError::UnsupportedType(_))));
        Ok(())
    }

    #[test]
    fn test_source_ast_to_sui() -> Result<()> {
        let out = Transpiler::new(config("sui"))
            .transpile_source_ast(&vault_ast(None).to_string(), Some("Vault"))?;

        for line in [
            "    struct Vault has key {",
            "    struct DepositEvent has copy, drop, store {",
            "    public entry fun deposit(amount: u256, ctx: &mut TxContext) {",
            "        assert!(amount > 0, 0); // zero amount",
            "        *table::borrow_mut(&mut balances, tx_context::sender(ctx)) = \
             *table::borrow(&balances, tx_context::sender(ctx)) + amount;",
            "        event::emit(DepositEvent { from: tx_context::sender(ctx), value: amount });",
            "    use sui::table;",
            "    use sui::event;",
        ] {
            assert!(
                out.source.lines().any(|l| l == line),
                "missing line {:?} in\n{}",
                line,
                out.source
            );
        }
        assert!(out.diagnostics.is_empty());
        Ok(())
    }

    #[test]
    fn test_source_ast_array_index_reads_vector() -> Result<()> {
        let read_first = json!({
            "nodeType": "Return",
            "expression": {
                "nodeType": "IndexAccess",
                "baseExpression": {
                    "nodeType": "Identifier",
                    "name": "holders",
                    "typeDescriptions": {"typeString": "uint256[] storage ref"}
                },
                "indexExpression": {"nodeType": "Literal", "kind": "number", "value": "0"}
            }
        });
        let out = Transpiler::new(config("sui"))
            .transpile_source_ast(&vault_ast(Some(read_first)).to_string(), Some("Vault"))?;

        assert!(out.source.contains("        return *vector::borrow(&holders, 0);\n"));
        assert!(out.source.contains("    use std::vector;\n"));
        assert!(!out.source.contains("table::borrow(&holders"));
        Ok(())
    }

    #[test]
    fn test_entry_params_never_shadow_context() -> Result<()> {
        let abi = json!([
            {
                "type": "function",
                "name": "mint",
                "inputs": [
                    {"name": "account", "type": "address"},
                    {"name": "amount", "type": "uint256"}
                ],
                "outputs": [],
                "stateMutability": "nonpayable"
            },
            {
                "type": "function",
                "name": "poke",
                "inputs": [{"name": "ctx", "type": "uint256"}],
                "outputs": [],
                "stateMutability": "nonpayable"
            }
        ])
        .to_string();

        let aptos = Transpiler::new(config("aptos")).transpile_abi(&abi, "Token")?;
        assert!(aptos.source.contains(
            "    public entry fun mint(account_: address, amount: u256, account: &signer) {\n"
        ));
        let sui = Transpiler::new(config("sui")).transpile_abi(&abi, "Token")?;
        assert!(sui
            .source
            .contains("    public entry fun poke(ctx_: u256, ctx: &mut TxContext) {\n"));
        assert!(sui.diagnostics.iter().any(|d| d.to_string().contains("ctx_")));
        Ok(())
    }

    #[test]
    fn test_source_ast_guard_imports_abort_on_aptos() -> Result<()> {
        let out = Transpiler::new(config("aptos"))
            .transpile_source_ast(&vault_ast(None).to_string(), Some("Vault"))?;
        assert!(out.source.contains("    use std::error;\n"));
        assert!(out.source.contains("    use aptos_framework::event;\n"));
        assert!(out
            .source
            .contains("        assert!(amount > 0, 0); // zero amount\n"));
        Ok(())
    }

    #[test]
    fn test_source_ast_contract_selection() -> Result<()> {
        let ast = vault_ast(None).to_string();
        let transpiler = Transpiler::new(config("sui"));

        assert_eq!(transpiler.transpile_source_ast(&ast, None)?.module_name, "Helper");
        assert!(matches!(
            transpiler.transpile_source_ast(&ast, Some("Missing")),
            Err(TranspileError::ContractNotFound(_))
        ));
        Ok(())
    }

    #[test]
    fn test_unsupported_statement_strict_and_lenient() -> Result<()> {
        let ast = vault_ast(Some(json!({"nodeType": "WhileStatement"}))).to_string();

        let lenient = Transpiler::new(config("sui")).transpile_source_ast(&ast, Some("Vault"))?;
        assert!(lenient
            .source
            .contains("        // [UNSUPPORTED] WhileStatement\n"));
        assert_eq!(lenient.diagnostics.warnings().count(), 1);

        let strict = TranspilerConfig {
            strict_mode: true,
            ..config("sui")
        };
        let result = Transpiler::new(strict).transpile_source_ast(&ast, Some("Vault"));
        assert!(matches!(
            result,
            Err(TranspileError::UnsupportedStatement(kind)) if kind == "WhileStatement"
        ));
        Ok(())
    }

    #[test]
    fn test_default_plugins_lower_for_loops() -> Result<()> {
        let for_loop = json!({
            "nodeType": "ForStatement",
            "initializationExpression": {
                "nodeType": "VariableDeclarationStatement",
                "declarations": [{"nodeType": "VariableDeclaration", "name": "i"}],
                "initialValue": {"nodeType": "Literal", "kind": "number", "value": "0"}
            },
            "condition": {
                "nodeType": "BinaryOperation",
                "operator": "<",
                "leftExpression": ident("i"),
                "rightExpression": ident("amount")
            },
            "loopExpression": {
                "nodeType": "ExpressionStatement",
                "expression": {
                    "nodeType": "UnaryOperation",
                    "operator": "++",
                    "prefix": false,
                    "subExpression": ident("i")
                }
            },
            "body": {"nodeType": "Block", "statements": []}
        });
        let ast = vault_ast(Some(for_loop)).to_string();

        let out = Transpiler::new(config("sui")).transpile_source_ast(&ast, Some("Vault"))?;
        assert!(out.source.contains("            while (i < amount) {\n"));
        assert!(out.source.contains("                i = i + 1;\n"));

        let bare = Transpiler::new(config("sui"))
            .with_plugins(PluginRegistry::new())
            .transpile_source_ast(&ast, Some("Vault"))?;
        assert!(bare.source.contains("// [UNSUPPORTED] ForStatement"));
        Ok(())
    }

    struct Banner;

    impl Plugin for Banner {
        fn name(&self) -> &str {
            "banner"
        }

        fn after_assemble(&self, module_text: String) -> String {
            format!("// generated by sol2move\n{}", module_text)
        }
    }

    #[test]
    fn test_after_assemble_post_processes_text() -> Result<()> {
        let mut plugins = PluginRegistry::new();
        plugins.add(Box::new(Banner));

        let out = Transpiler::new(config("sui"))
            .with_plugins(plugins)
            .transpile_abi("[]", "Empty")?;
        assert!(out
            .source
            .starts_with("// generated by sol2move\nmodule empty::Empty {\n"));
        Ok(())
    }

    #[test]
    fn test_schema_error_surfaces_field() {
        let result = Transpiler::new(config("sui"))
            .transpile_abi(r#"[{"type": "function", "inputs": [{"name": "a"}]}]"#, "Bad");
        assert!(matches!(
            result,
            Err(TranspileError::SchemaValidation { field, .. }) if field == "[0].inputs[0].type"
        ));
    }

    /// A Sui variant that shares objects instead of transferring them.
    struct SharedSui;

    impl TargetProfile for SharedSui {
        fn name(&self) -> &'static str {
            "sui-shared"
        }

        fn imports(&self) -> Vec<String> {
            SuiTarget.imports()
        }

        fn bookkeeping_fields(&self) -> Vec<Field> {
            SuiTarget.bookkeeping_fields()
        }

        fn init_params(&self) -> Vec<Param> {
            SuiTarget.init_params()
        }

        fn init_body(&self, contract_name: &str, field_initializers: &[String]) -> Vec<String> {
            let mut body = vec![format!("{}({} {{", self.ownership_transfer(), contract_name)];
            body.push("    id: object::new(ctx),".to_string());
            body.push("    owner: tx_context::sender(ctx),".to_string());
            body.extend(field_initializers.iter().map(|f| format!("    {},", f)));
            body.push("});".to_string());
            body
        }

        fn container_constructor(&self, key_type: &str, value_type: &str) -> String {
            SuiTarget.container_constructor(key_type, value_type)
        }

        fn ownership_transfer(&self) -> &'static str {
            "transfer::share_object"
        }

        fn context_param(&self) -> Param {
            SuiTarget.context_param()
        }

        fn sender_expr(&self) -> &'static str {
            SuiTarget.sender_expr()
        }

        fn table_import(&self) -> &'static str {
            SuiTarget.table_import()
        }

        fn event_import(&self) -> &'static str {
            SuiTarget.event_import()
        }
    }

    #[test]
    fn test_registered_target_is_selectable() -> Result<()> {
        let mut targets = TargetRegistry::with_builtins();
        targets.register(Box::new(SharedSui));

        let out = Transpiler::new(config("sui-shared"))
            .with_targets(targets)
            .transpile_abi(&erc20_abi().to_string(), "Token")?;
        assert!(out.source.contains("        transfer::share_object(Token {\n"));
        assert!(out
            .source
            .contains("            balances: table::new<address, u256>(ctx),\n"));
        Ok(())
    }
}
