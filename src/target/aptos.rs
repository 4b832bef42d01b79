use super::TargetProfile;
use crate::transpiler::module::{Field, Param};

pub struct AptosTarget;

impl TargetProfile for AptosTarget {
    fn name(&self) -> &'static str {
        "aptos"
    }

    fn imports(&self) -> Vec<String> {
        vec!["use std::signer;".to_string()]
    }

    fn bookkeeping_fields(&self) -> Vec<Field> {
        vec![Field::new("owner", "address")]
    }

    fn init_params(&self) -> Vec<Param> {
        vec![self.context_param()]
    }

    fn init_body(&self, contract_name: &str, field_initializers: &[String]) -> Vec<String> {
        let mut body = vec![
            "let sender = signer::address_of(account);".to_string(),
            format!("{}(account, {} {{", self.ownership_transfer(), contract_name),
            "    owner: sender,".to_string(),
        ];
        body.extend(field_initializers.iter().map(|f| format!("    {},", f)));
        body.push("});".to_string());
        body
    }

    fn container_constructor(&self, key_type: &str, value_type: &str) -> String {
        format!("table::new<{}, {}>()", key_type, value_type)
    }

    fn ownership_transfer(&self) -> &'static str {
        "move_to"
    }

    fn context_param(&self) -> Param {
        Param::new("account", "&signer")
    }

    fn sender_expr(&self) -> &'static str {
        "signer::address_of(account)"
    }

    fn table_import(&self) -> &'static str {
        "use aptos_std::table;"
    }

    fn event_import(&self) -> &'static str {
        "use aptos_framework::event;"
    }

    fn abort_import(&self) -> Option<&'static str> {
        Some("use std::error;")
    }
}
