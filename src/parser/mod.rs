//! Input normalization: ABI JSON and solc AST JSON into [`NormalizedContract`]s, plus the
//! Solidity type-string grammar.

pub mod abi;
pub mod source_ast;
pub mod types;

use tracing::debug;

use crate::error::{Result, TranspileError};
use crate::transpiler::ast::NormalizedContract;

pub use abi::parse_abi;
pub use source_ast::parse_source_ast;

/// Pick one contract out of a multi-contract source. `None` selects the first one.
pub fn select_contract(
    contracts: Vec<NormalizedContract>,
    name: Option<&str>,
) -> Result<NormalizedContract> {
    let available: Vec<_> = contracts.iter().map(|c| c.name.clone()).collect();
    debug!("Contracts in source: {:?}", available);

    let mut contracts = contracts.into_iter();
    match name {
        Some(name) => contracts
            .find(|c| c.name == name)
            .ok_or_else(|| TranspileError::ContractNotFound(name.to_string())),
        None => contracts
            .next()
            .ok_or_else(|| TranspileError::ContractNotFound("<any>".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> NormalizedContract {
        NormalizedContract {
            name: name.to_string(),
            ..NormalizedContract::default()
        }
    }

    #[test]
    fn test_select_contract() -> Result<()> {
        let contracts = || vec![named("Token"), named("Vault")];

        assert_eq!(select_contract(contracts(), Some("Vault"))?.name, "Vault");
        assert_eq!(select_contract(contracts(), None)?.name, "Token");
        assert!(matches!(
            select_contract(contracts(), Some("Missing")),
            Err(TranspileError::ContractNotFound(name)) if name == "Missing"
        ));
        assert!(matches!(
            select_contract(Vec::new(), None),
            Err(TranspileError::ContractNotFound(_))
        ));
        Ok(())
    }
}
