use super::TargetProfile;
use crate::transpiler::module::{Field, Param};

pub struct SuiTarget;

impl TargetProfile for SuiTarget {
    fn name(&self) -> &'static str {
        "sui"
    }

    fn imports(&self) -> Vec<String> {
        vec![
            "use sui::object::{Self, UID};".to_string(),
            "use sui::transfer;".to_string(),
            "use sui::tx_context::{Self, TxContext};".to_string(),
        ]
    }

    fn bookkeeping_fields(&self) -> Vec<Field> {
        vec![Field::new("id", "UID"), Field::new("owner", "address")]
    }

    fn init_params(&self) -> Vec<Param> {
        vec![self.context_param()]
    }

    fn init_body(&self, contract_name: &str, field_initializers: &[String]) -> Vec<String> {
        let mut body = vec![
            "let sender = tx_context::sender(ctx);".to_string(),
            format!("{}({} {{", self.ownership_transfer(), contract_name),
            "    id: object::new(ctx),".to_string(),
            "    owner: sender,".to_string(),
        ];
        body.extend(field_initializers.iter().map(|f| format!("    {},", f)));
        body.push("}, sender);".to_string());
        body
    }

    fn container_constructor(&self, key_type: &str, value_type: &str) -> String {
        format!("table::new<{}, {}>(ctx)", key_type, value_type)
    }

    fn ownership_transfer(&self) -> &'static str {
        "transfer::transfer"
    }

    fn context_param(&self) -> Param {
        Param::new("ctx", "&mut TxContext")
    }

    fn sender_expr(&self) -> &'static str {
        "tx_context::sender(ctx)"
    }

    fn table_import(&self) -> &'static str {
        "use sui::table;"
    }

    fn event_import(&self) -> &'static str {
        "use sui::event;"
    }
}
