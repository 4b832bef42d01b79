use std::collections::BTreeMap;

use super::Plugin;

/// Maps the ERC-20 interface onto Sui's coin module.
pub struct Erc20MappingPlugin;

impl Plugin for Erc20MappingPlugin {
    fn name(&self) -> &str {
        "erc20-mapping"
    }

    fn type_overrides(&self) -> BTreeMap<String, String> {
        BTreeMap::from([("IERC20".to_string(), "0x2::coin::CoinStore".to_string())])
    }

    fn library_overrides(&self) -> BTreeMap<String, String> {
        BTreeMap::from([("IERC20".to_string(), "0x2::coin".to_string())])
    }
}
