use super::Plugin;
use crate::error::Result;
use crate::transpiler::ast::Statement;
use crate::transpiler::walker::{indent, StatementWalker};

/// Lowers Solidity `for` loops to a scoped Move `while`.
pub struct ForLoopPlugin;

impl Plugin for ForLoopPlugin {
    fn name(&self) -> &str {
        "forLoopPlugin"
    }

    fn handle_statement(
        &self,
        stmt: &Statement,
        walker: &mut StatementWalker<'_>,
    ) -> Result<Option<String>> {
        let Statement::For {
            init,
            condition,
            increment,
            body,
        } = stmt
        else {
            return Ok(None);
        };

        let init = match init {
            Some(init) => Some(walker.walk_statement(init)?),
            None => None,
        };
        let condition = condition
            .as_ref()
            .map(|c| walker.walk_expression(c))
            .unwrap_or_else(|| "true".to_string());

        let mut loop_body = walker.walk_statements(body)?;
        if let Some(increment) = increment {
            let increment = walker.walk_expression(increment);
            if !loop_body.is_empty() {
                loop_body.push('\n');
            }
            loop_body.push_str(&format!("{};", increment));
        }

        let mut block = String::new();
        if let Some(init) = init {
            block.push_str(&init);
            block.push('\n');
        }
        block.push_str(&format!(
            "while ({}) {{\n{}\n}};",
            condition,
            indent(&loop_body)
        ));

        Ok(Some(format!("{{\n{}\n}};", indent(&block))))
    }
}
