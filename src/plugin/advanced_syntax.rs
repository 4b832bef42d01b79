use super::Plugin;
use crate::error::Result;
use crate::transpiler::ast::{CatchClause, Expression, Statement};
use crate::transpiler::walker::{indent, StatementWalker};

/// Best-effort lowering of `try`/`catch` and inline assembly, neither of which Move has.
pub struct AdvancedSyntaxPlugin;

impl Plugin for AdvancedSyntaxPlugin {
    fn name(&self) -> &str {
        "advancedSyntaxPlugin"
    }

    fn handle_statement(
        &self,
        stmt: &Statement,
        walker: &mut StatementWalker<'_>,
    ) -> Result<Option<String>> {
        match stmt {
            Statement::Try {
                call,
                body,
                catch_clauses,
            } => try_catch(call, body, catch_clauses, walker).map(Some),
            Statement::InlineAssembly(source) => {
                walker.warn("inline assembly copied into a comment");
                Ok(Some(inline_assembly(source)))
            }
            _ => Ok(None),
        }
    }
}

fn try_catch(
    call: &Expression,
    body: &[Statement],
    catch_clauses: &[CatchClause],
    walker: &mut StatementWalker<'_>,
) -> Result<String> {
    walker.warn("try/catch lowered to unconditional execution");

    let mut block = vec![
        "let success = true;".to_string(),
        format!("{};", walker.walk_expression(call)),
    ];
    let body = walker.walk_statements(body)?;
    if !body.is_empty() {
        block.push(body);
    }

    if !catch_clauses.is_empty() {
        let mut handlers = Vec::new();
        for clause in catch_clauses {
            let name = if clause.error_name.is_empty() {
                "error"
            } else {
                clause.error_name.as_str()
            };
            handlers.push(format!("// Catch clause: {}", name));
            let clause_body = walker.walk_statements(&clause.body)?;
            if !clause_body.is_empty() {
                handlers.push(clause_body);
            }
        }
        block.push(format!(
            "if (!success) {{\n{}\n}};",
            indent(&handlers.join("\n"))
        ));
    }

    Ok(format!(
        "// [UNSUPPORTED] Solidity try/catch is not natively supported in Move\n{{\n{}\n}};",
        indent(&block.join("\n"))
    ))
}

fn inline_assembly(source: &str) -> String {
    format!(
        "// [UNSUPPORTED] Solidity inline assembly not supported in Move\n/*\n{}\n*/",
        source.trim().replace("*/", "* /")
    )
}
