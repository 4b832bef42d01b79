//! Statement IR to Move text.
//!
//! Plugins see every statement first; the walker's own handling covers expression
//! statements, `if`/`else`, `return`, `let`, guards and event emission. Anything else is
//! unsupported: an error in strict mode, a marker comment otherwise. Expressions never fail.

use std::collections::HashMap;

use crate::config::Mode;
use crate::diagnostics::Diagnostics;
use crate::error::{Result, TranspileError};
use crate::plugin::PluginRegistry;
use crate::target::TargetProfile;
use crate::transpiler::ast::{Container, Expression, Guard, Literal, LiteralKind, Statement};
use crate::transpiler::sanitize::sanitize_identifier;

const INDENT: &str = "    ";

pub struct StatementWalker<'a> {
    plugins: &'a PluginRegistry,
    profile: &'a dyn TargetProfile,
    mode: Mode,
    events: &'a HashMap<String, Vec<String>>,
    diagnostics: &'a mut Diagnostics,
    /// Parameters the assembler renamed, by their sanitized source name.
    renames: HashMap<String, String>,
    uses_abort: bool,
    uses_events: bool,
    uses_vector: bool,
}

impl<'a> StatementWalker<'a> {
    pub fn new(
        plugins: &'a PluginRegistry,
        profile: &'a dyn TargetProfile,
        mode: Mode,
        events: &'a HashMap<String, Vec<String>>,
        diagnostics: &'a mut Diagnostics,
    ) -> Self {
        Self {
            plugins,
            profile,
            mode,
            events,
            diagnostics,
            renames: HashMap::new(),
            uses_abort: false,
            uses_events: false,
            uses_vector: false,
        }
    }

    pub fn with_renames(mut self, renames: HashMap<String, String>) -> Self {
        self.renames = renames;
        self
    }

    pub fn uses_abort(&self) -> bool {
        self.uses_abort
    }

    pub fn uses_events(&self) -> bool {
        self.uses_events
    }

    pub fn uses_vector(&self) -> bool {
        self.uses_vector
    }

    /// Record a non-fatal finding, for use by plugins.
    pub fn warn(&mut self, message: impl Into<String>) {
        self.diagnostics.warn(message);
    }

    pub fn walk_statements(&mut self, statements: &[Statement]) -> Result<String> {
        let mut lines = Vec::with_capacity(statements.len());
        for stmt in statements {
            lines.push(self.walk_statement(stmt)?);
        }
        Ok(lines.join("\n"))
    }

    pub fn walk_statement(&mut self, stmt: &Statement) -> Result<String> {
        let plugins = self.plugins;
        if let Some(text) = plugins.handle_statement(stmt, self)? {
            return Ok(text);
        }

        match stmt {
            Statement::Expression(expr) => Ok(format!("{};", self.walk_expression(expr))),
            Statement::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let condition = self.walk_expression(condition);
                let then_text = self.walk_statements(then_branch)?;
                let mut text = format!("if ({}) {{\n{}\n}}", condition, indent(&then_text));
                if let Some(else_branch) = else_branch {
                    let else_text = self.walk_statements(else_branch)?;
                    text.push_str(&format!(" else {{\n{}\n}}", indent(&else_text)));
                }
                text.push(';');
                Ok(text)
            }
            Statement::Return(Some(expr)) => Ok(format!("return {};", self.walk_expression(expr))),
            Statement::Return(None) => Ok("return;".to_string()),
            Statement::VariableDeclaration { names, value } => {
                let pattern = match names.as_slice() {
                    [single] => local_name(single),
                    many => format!(
                        "({})",
                        many.iter().map(|n| local_name(n)).collect::<Vec<_>>().join(", ")
                    ),
                };
                match value {
                    Some(value) => Ok(format!("let {} = {};", pattern, self.walk_expression(value))),
                    None => Ok(format!("let {};", pattern)),
                }
            }
            Statement::Guard(guard) => Ok(self.walk_guard(guard)),
            Statement::Emit { event, args } => Ok(self.walk_emit(event, args)),
            Statement::For { .. }
            | Statement::Try { .. }
            | Statement::InlineAssembly(_)
            | Statement::Unsupported(_) => self.unsupported(stmt.kind()),
        }
    }

    pub fn walk_expression(&mut self, expr: &Expression) -> String {
        match expr {
            Expression::Identifier(name) => {
                let name = sanitize_identifier(name);
                self.renames.get(&name).cloned().unwrap_or(name)
            }
            Expression::Literal(literal) => render_literal(literal),
            Expression::BinaryOp(left, op, right) => {
                let left = self.walk_operand(left);
                let right = self.walk_operand(right);
                format!("{} {} {}", left, op, right)
            }
            Expression::Call(callee, args) => {
                let callee = self.walk_expression(callee);
                let args: Vec<_> = args.iter().map(|a| self.walk_expression(a)).collect();
                format!("{}({})", callee, args.join(", "))
            }
            Expression::Assignment(lhs, op, rhs) => self.walk_assignment(lhs, op, rhs),
            Expression::MemberAccess(base, member) => match (base.as_ref(), member.as_str()) {
                (Expression::Identifier(obj), "sender") if obj == "msg" => {
                    self.profile.sender_expr().to_string()
                }
                (Expression::Identifier(obj), "origin") if obj == "tx" => {
                    self.profile.sender_expr().to_string()
                }
                _ => format!("{}.{}", self.walk_expression(base), sanitize_identifier(member)),
            },
            Expression::IndexAccess(base, Some(index), container) => {
                self.walk_index(base, index, *container, false)
            }
            Expression::IndexAccess(_, None, _) => self.unsupported_expression("IndexAccess"),
            Expression::UnaryOp {
                operator,
                prefix,
                operand,
            } => {
                let operand_text = self.walk_operand(operand);
                match operator.as_str() {
                    "++" => format!("{} = {} + 1", operand_text, operand_text),
                    "--" => format!("{} = {} - 1", operand_text, operand_text),
                    _ if *prefix => format!("{}{}", operator, operand_text),
                    _ => format!("{}{}", operand_text, operator),
                }
            }
            Expression::Unsupported(kind) => self.unsupported_expression(kind),
        }
    }

    fn walk_operand(&mut self, expr: &Expression) -> String {
        let text = self.walk_expression(expr);
        match expr {
            Expression::BinaryOp(..) | Expression::Assignment(..) => format!("({})", text),
            _ => text,
        }
    }

    fn walk_assignment(&mut self, lhs: &Expression, op: &str, rhs: &Expression) -> String {
        let target = match lhs {
            Expression::IndexAccess(base, Some(index), container) => {
                self.walk_index(base, index, *container, true)
            }
            _ => self.walk_expression(lhs),
        };
        let value = self.walk_operand(rhs);

        match op.strip_suffix('=') {
            Some(binary) if !binary.is_empty() => {
                let current = match lhs {
                    Expression::IndexAccess(_, Some(_), Container::Mapping | Container::Array) => {
                        self.walk_expression(lhs)
                    }
                    _ => target.clone(),
                };
                format!("{} = {} {} {}", target, current, binary, value)
            }
            _ => format!("{} = {}", target, value),
        }
    }

    /// `table::` access for mappings, `vector::` access for arrays. An unknown base type is
    /// never guessed at.
    fn walk_index(
        &mut self,
        base: &Expression,
        index: &Expression,
        container: Container,
        mutable: bool,
    ) -> String {
        let module = match container {
            Container::Mapping => "table",
            Container::Array => {
                self.uses_vector = true;
                "vector"
            }
            Container::Unknown => return self.unsupported_expression("IndexAccess"),
        };
        let base = self.walk_expression(base);
        let index = self.walk_expression(index);
        if mutable {
            format!("*{}::borrow_mut(&mut {}, {})", module, base, index)
        } else {
            format!("*{}::borrow(&{}, {})", module, base, index)
        }
    }

    fn walk_guard(&mut self, guard: &Guard) -> String {
        self.uses_abort = true;
        match guard {
            Guard::Require { condition, message } => {
                let condition = self.walk_expression(condition);
                match message {
                    Some(message) => format!("assert!({}, 0); // {}", condition, message),
                    None => format!("assert!({}, 0);", condition),
                }
            }
            Guard::Revert { reason: Some(reason) } => format!("abort 0; // {}", reason),
            Guard::Revert { reason: None } => "abort 0;".to_string(),
        }
    }

    fn walk_emit(&mut self, event: &str, args: &[Expression]) -> String {
        self.uses_events = true;
        let events = self.events;
        let field_names = events.get(event).filter(|names| names.len() == args.len());

        let fields: Vec<_> = args
            .iter()
            .enumerate()
            .map(|(i, arg)| {
                let name = field_names
                    .map(|names| names[i].clone())
                    .unwrap_or_else(|| format!("arg{}", i));
                format!("{}: {}", name, self.walk_expression(arg))
            })
            .collect();

        let struct_name = format!("{}Event", sanitize_identifier(event));
        if fields.is_empty() {
            format!("event::emit({} {{}});", struct_name)
        } else {
            format!("event::emit({} {{ {} }});", struct_name, fields.join(", "))
        }
    }

    fn unsupported(&mut self, kind: &str) -> Result<String> {
        if self.mode.is_strict() {
            return Err(TranspileError::UnsupportedStatement(kind.to_string()));
        }
        self.diagnostics
            .warn(format!("unsupported statement `{}` left as a comment", kind));
        Ok(format!("// [UNSUPPORTED] {}", kind))
    }

    fn unsupported_expression(&mut self, kind: &str) -> String {
        self.diagnostics
            .warn(format!("unsupported expression `{}` left as a marker", kind));
        format!("[unsupported expression: {}]", kind)
    }
}

/// Indent every non-empty line by one level.
pub fn indent(text: &str) -> String {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{}{}", INDENT, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn local_name(name: &str) -> String {
    if name.is_empty() {
        "_".to_string()
    } else {
        sanitize_identifier(name)
    }
}

fn render_literal(literal: &Literal) -> String {
    match literal.kind {
        LiteralKind::Number | LiteralKind::Bool => literal.value.clone(),
        LiteralKind::String => format!("b\"{}\"", literal.value.escape_default()),
        LiteralKind::HexString => format!("x\"{}\"", literal.value),
    }
}
