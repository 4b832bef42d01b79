//! Normalization of `solc --ast-compact-json` output.
//!
//! Accepts a bare `SourceUnit`, an object with an `ast` field, or standard-JSON compiler output
//! with a `sources` map. Only the node types the statement IR understands are lowered; anything
//! else becomes an `Unsupported` node carrying its `nodeType`.

use serde_json::Value;
use tracing::{debug, info};

use crate::error::{Result, TranspileError};
use crate::parser::types::{parse_type, TypeDescriptor};
use crate::plugin::PluginRegistry;
use crate::transpiler::ast::{
    CatchClause, Container, EntryKind, Expression, Guard, InterfaceEntry, Literal, LiteralKind,
    Mutability, NormalizedContract, Parameter, StateVariable, Statement,
};

pub fn parse_source_ast(json: &str, plugins: &PluginRegistry) -> Result<Vec<NormalizedContract>> {
    let raw: Value = serde_json::from_str(json)?;
    plugins.run_before_normalize(&raw);

    let mut contracts = Vec::new();
    for unit in source_units(&raw)? {
        for node in children(unit, "nodes") {
            if node_type(node) == "ContractDefinition" {
                let mut contract = parse_contract(node)?;
                contract.entries = plugins.run_after_normalize(contract.entries);
                contracts.push(contract);
            }
        }
    }

    info!("Parsed {} contract(s) from source AST", contracts.len());
    Ok(contracts)
}

fn source_units(raw: &Value) -> Result<Vec<&Value>> {
    if let Some(sources) = raw.get("sources").and_then(Value::as_object) {
        return Ok(sources.values().filter_map(|s| s.get("ast")).collect());
    }
    if let Some(ast) = raw.get("ast") {
        return Ok(vec![ast]);
    }
    if node_type(raw) == "SourceUnit" {
        return Ok(vec![raw]);
    }
    Err(TranspileError::schema(
        "nodeType",
        "expected a SourceUnit, an object with `ast`, or compiler output with `sources`",
    ))
}

fn parse_contract(node: &Value) -> Result<NormalizedContract> {
    let name = str_field(node, "name")
        .ok_or_else(|| TranspileError::schema("ContractDefinition.name", "required string"))?;
    debug!("Normalizing contract {}", name);

    let mut contract = NormalizedContract {
        name: name.to_string(),
        base_names: children(node, "baseContracts")
            .filter_map(|base| base.get("baseName"))
            .filter_map(|base| str_field(base, "name").or_else(|| str_field(base, "namePath")))
            .map(str::to_string)
            .collect(),
        ..NormalizedContract::default()
    };

    for child in children(node, "nodes") {
        match node_type(child) {
            "VariableDeclaration" => {
                if let Some(var) = state_variable(child) {
                    contract.state_variables.push(var);
                }
            }
            "FunctionDefinition" => {
                if let Some(entry) = function(child) {
                    contract.entries.push(entry);
                }
            }
            "EventDefinition" => {
                let mut entry = declaration(child, EntryKind::Event);
                entry.anonymous = child
                    .get("anonymous")
                    .and_then(Value::as_bool)
                    .unwrap_or(false);
                contract.entries.push(entry);
            }
            "ErrorDefinition" => contract.entries.push(declaration(child, EntryKind::Error)),
            "ModifierDefinition" => {
                if let Some(name) = str_field(child, "name") {
                    contract.modifiers.push(name.to_string());
                }
            }
            other => debug!("Skipping contract member {}", other),
        }
    }
    Ok(contract)
}

fn state_variable(node: &Value) -> Option<StateVariable> {
    let visibility = str_field(node, "visibility");
    if matches!(visibility, Some("private") | Some("internal")) {
        return None;
    }
    let constant = node.get("constant").and_then(Value::as_bool) == Some(true)
        || str_field(node, "mutability") == Some("constant");
    if constant {
        return None;
    }

    Some(StateVariable {
        name: str_field(node, "name")?.to_string(),
        var_type: type_string(node),
        visibility: visibility.map(str::to_string),
    })
}

fn function(node: &Value) -> Option<InterfaceEntry> {
    let body = node.get("body").filter(|b| !b.is_null())?;

    let kind = EntryKind::parse(str_field(node, "kind").unwrap_or("function"));
    let mut entry = declaration(node, kind);
    if entry.name.as_deref() == Some("") {
        entry.name = None;
    }
    entry.outputs = parameter_list(node.get("returnParameters"));
    entry.mutability = str_field(node, "stateMutability").and_then(Mutability::parse);
    entry.payable = entry.mutability == Some(Mutability::Payable);
    entry.body = Some(block(body));
    Some(entry)
}

/// An entry with a name and an input parameter list.
fn declaration(node: &Value, kind: EntryKind) -> InterfaceEntry {
    let mut entry = InterfaceEntry::new(kind, str_field(node, "name").unwrap_or_default());
    entry.inputs = parameter_list(node.get("parameters"));
    entry
}

fn parameter_list(list: Option<&Value>) -> Vec<Parameter> {
    list.map(|list| {
        children(list, "parameters")
            .map(|p| Parameter {
                indexed: p.get("indexed").and_then(Value::as_bool).unwrap_or(false),
                ..Parameter::new(str_field(p, "name").unwrap_or_default(), type_string(p))
            })
            .collect()
    })
    .unwrap_or_default()
}

fn type_string(node: &Value) -> String {
    node.get("typeDescriptions")
        .and_then(|t| str_field(t, "typeString"))
        .unwrap_or("unknown")
        .to_string()
}

/// Statements of a block, or a single statement used where a block is expected.
fn block(node: &Value) -> Vec<Statement> {
    match node_type(node) {
        "Block" | "UncheckedBlock" => children(node, "statements").flat_map(statements).collect(),
        _ => statements(node),
    }
}

/// Nested blocks are flattened into their parent, so one node may yield several statements.
fn statements(node: &Value) -> Vec<Statement> {
    match node_type(node) {
        "Block" | "UncheckedBlock" => block(node),
        _ => vec![statement(node)],
    }
}

fn statement(node: &Value) -> Statement {
    match node_type(node) {
        "ExpressionStatement" => match node.get("expression") {
            Some(expr) => guard(expr).unwrap_or_else(|| Statement::Expression(expression(expr))),
            None => Statement::Unsupported("ExpressionStatement".to_string()),
        },
        "IfStatement" => Statement::If {
            condition: child_expression(node, "condition"),
            then_branch: node.get("trueBody").map(block).unwrap_or_default(),
            else_branch: node.get("falseBody").filter(|b| !b.is_null()).map(block),
        },
        "Return" => Statement::Return(
            node.get("expression")
                .filter(|e| !e.is_null())
                .map(expression),
        ),
        "VariableDeclarationStatement" => Statement::VariableDeclaration {
            // Skipped tuple slots are `null` and keep their position.
            names: node
                .get("declarations")
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
                .map(|d| str_field(d, "name").unwrap_or_default().to_string())
                .collect(),
            value: node
                .get("initialValue")
                .filter(|v| !v.is_null())
                .map(expression),
        },
        "ForStatement" => Statement::For {
            init: node
                .get("initializationExpression")
                .filter(|n| !n.is_null())
                .map(|n| Box::new(statement(n))),
            condition: node
                .get("condition")
                .filter(|n| !n.is_null())
                .map(expression),
            increment: node
                .get("loopExpression")
                .filter(|n| !n.is_null())
                .map(|n| n.get("expression").map(expression).unwrap_or_else(|| expression(n))),
            body: node.get("body").map(block).unwrap_or_default(),
        },
        "TryStatement" => try_statement(node),
        "InlineAssembly" => Statement::InlineAssembly(
            str_field(node, "operations")
                .map(str::to_string)
                .unwrap_or_else(|| format!("assembly @ {}", str_field(node, "src").unwrap_or("?"))),
        ),
        "EmitStatement" => {
            let call = node.get("eventCall");
            Statement::Emit {
                event: call
                    .and_then(|c| c.get("expression"))
                    .and_then(callee_name)
                    .unwrap_or_default()
                    .to_string(),
                args: call
                    .map(|c| children(c, "arguments").map(expression).collect())
                    .unwrap_or_default(),
            }
        }
        "RevertStatement" => Statement::Guard(Guard::Revert {
            reason: node
                .get("errorCall")
                .and_then(|c| c.get("expression"))
                .and_then(callee_name)
                .map(str::to_string),
        }),
        other => Statement::Unsupported(other.to_string()),
    }
}

fn try_statement(node: &Value) -> Statement {
    let mut clauses = children(node, "clauses");
    let body = clauses
        .next()
        .and_then(|success| success.get("block"))
        .map(block)
        .unwrap_or_default();
    let catch_clauses = clauses
        .map(|clause| CatchClause {
            error_name: str_field(clause, "errorName").unwrap_or_default().to_string(),
            body: clause.get("block").map(block).unwrap_or_default(),
        })
        .collect();

    Statement::Try {
        call: child_expression(node, "externalCall"),
        body,
        catch_clauses,
    }
}

/// `require`, `assert` and `revert` calls used as statements.
fn guard(expr: &Value) -> Option<Statement> {
    if node_type(expr) != "FunctionCall" {
        return None;
    }
    let args: Vec<&Value> = children(expr, "arguments").collect();
    let guard = match expr.get("expression").and_then(callee_name)? {
        "require" | "assert" => Guard::Require {
            condition: args.first().map(|c| expression(c))?,
            message: args.get(1).and_then(|m| string_value(m)),
        },
        "revert" => Guard::Revert {
            reason: args.first().and_then(|r| string_value(r)),
        },
        _ => return None,
    };
    Some(Statement::Guard(guard))
}

fn expression(node: &Value) -> Expression {
    match node_type(node) {
        "Identifier" => Expression::Identifier(str_field(node, "name").unwrap_or_default().to_string()),
        "Literal" => literal(node),
        "BinaryOperation" => Expression::binary(
            child_expression(node, "leftExpression"),
            str_field(node, "operator").unwrap_or_default(),
            child_expression(node, "rightExpression"),
        ),
        "FunctionCall" => Expression::call(
            child_expression(node, "expression"),
            children(node, "arguments").map(expression).collect(),
        ),
        "Assignment" => Expression::Assignment(
            Box::new(child_expression(node, "leftHandSide")),
            str_field(node, "operator").unwrap_or("=").to_string(),
            Box::new(child_expression(node, "rightHandSide")),
        ),
        "MemberAccess" => Expression::MemberAccess(
            Box::new(child_expression(node, "expression")),
            str_field(node, "memberName").unwrap_or_default().to_string(),
        ),
        "IndexAccess" => Expression::IndexAccess(
            Box::new(child_expression(node, "baseExpression")),
            node.get("indexExpression")
                .filter(|i| !i.is_null())
                .map(|i| Box::new(expression(i))),
            node.get("baseExpression").map_or(Container::Unknown, container),
        ),
        "UnaryOperation" => Expression::UnaryOp {
            operator: str_field(node, "operator").unwrap_or_default().to_string(),
            prefix: node.get("prefix").and_then(Value::as_bool).unwrap_or(true),
            operand: Box::new(child_expression(node, "subExpression")),
        },
        // `(x)` parses as a one-element tuple.
        "TupleExpression" => match children(node, "components").collect::<Vec<_>>().as_slice() {
            [single] => expression(single),
            _ => Expression::Unsupported("TupleExpression".to_string()),
        },
        other => Expression::Unsupported(other.to_string()),
    }
}

fn literal(node: &Value) -> Expression {
    let kind = match str_field(node, "kind").unwrap_or_default() {
        "number" => LiteralKind::Number,
        "bool" => LiteralKind::Bool,
        "string" | "unicodeString" => LiteralKind::String,
        "hexString" => LiteralKind::HexString,
        other => return Expression::Unsupported(format!("Literal({})", other)),
    };
    let value = match kind {
        LiteralKind::HexString => str_field(node, "hexValue"),
        _ => str_field(node, "value"),
    };
    Expression::Literal(Literal {
        kind,
        value: value.unwrap_or_default().to_string(),
    })
}

fn child_expression(node: &Value, key: &str) -> Expression {
    match node.get(key) {
        Some(child) if !child.is_null() => expression(child),
        _ => Expression::Unsupported(format!("missing {}", key)),
    }
}

/// Classify an indexed base from its `typeDescriptions.typeString`.
fn container(base: &Value) -> Container {
    let type_string = base
        .get("typeDescriptions")
        .and_then(|t| str_field(t, "typeString"));
    match type_string.map(parse_type) {
        Some(Ok(Some(TypeDescriptor::Mapping { .. }))) => Container::Mapping,
        Some(Ok(Some(TypeDescriptor::Array { .. }))) => Container::Array,
        Some(Ok(Some(TypeDescriptor::Elementary(name)))) if name == "bytes" => Container::Array,
        _ => Container::Unknown,
    }
}

fn callee_name(callee: &Value) -> Option<&str> {
    match node_type(callee) {
        "Identifier" | "IdentifierPath" => str_field(callee, "name"),
        _ => None,
    }
}

fn string_value(node: &Value) -> Option<String> {
    match str_field(node, "kind") {
        Some("string") | Some("unicodeString") => str_field(node, "value").map(str::to_string),
        _ => None,
    }
}

fn node_type(node: &Value) -> &str {
    str_field(node, "nodeType").unwrap_or("Unknown")
}

fn str_field<'v>(node: &'v Value, key: &str) -> Option<&'v str> {
    node.get(key).and_then(Value::as_str)
}

fn children<'v>(node: &'v Value, key: &str) -> impl Iterator<Item = &'v Value> {
    node.get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter(|child| !child.is_null())
}
