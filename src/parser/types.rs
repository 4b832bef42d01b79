//! Parsing of Solidity type strings into [`TypeDescriptor`] trees.

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use std::fmt;

use crate::error::{Result, TranspileError};

#[derive(Parser)]
#[grammar = "parser/type_descriptor.pest"]
pub struct TypeDescriptorParser;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    Elementary(String),
    Array {
        element: Box<TypeDescriptor>,
        length: Option<u64>,
    },
    Mapping {
        key: Box<TypeDescriptor>,
        value: Box<TypeDescriptor>,
    },
    Enum(String),
    Struct(String),
    Contract(String),
}

impl TypeDescriptor {
    /// Last path segment of a user-defined type (`Token.Status` -> `Status`).
    pub fn user_type_name(&self) -> Option<&str> {
        match self {
            TypeDescriptor::Enum(path)
            | TypeDescriptor::Struct(path)
            | TypeDescriptor::Contract(path) => path.rsplit('.').next(),
            _ => None,
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Elementary(name) => write!(f, "{}", name),
            TypeDescriptor::Array {
                element,
                length: Some(n),
            } => write!(f, "{}[{}]", element, n),
            TypeDescriptor::Array {
                element,
                length: None,
            } => write!(f, "{}[]", element),
            TypeDescriptor::Mapping { key, value } => write!(f, "mapping({} => {})", key, value),
            TypeDescriptor::Enum(path) => write!(f, "enum {}", path),
            TypeDescriptor::Struct(path) => write!(f, "struct {}", path),
            TypeDescriptor::Contract(path) => write!(f, "contract {}", path),
        }
    }
}

pub fn is_mapping_syntax(raw: &str) -> bool {
    raw.trim_start().starts_with("mapping")
}

/// Parse a type string. Returns `None` when the string is not a recognizable Solidity type;
/// a malformed `mapping(...)` is an error because it can never be mapped.
pub fn parse_type(raw: &str) -> Result<Option<TypeDescriptor>> {
    let mut pairs = match TypeDescriptorParser::parse(Rule::descriptor, raw.trim()) {
        Ok(pairs) => pairs,
        Err(_) if is_mapping_syntax(raw) => {
            return Err(TranspileError::InvalidMappingSyntax(raw.to_string()))
        }
        Err(_) => return Ok(None),
    };

    let type_name = pairs
        .next()
        .and_then(|descriptor| {
            descriptor
                .into_inner()
                .find(|p| p.as_rule() == Rule::type_name)
        })
        .ok_or_else(|| TranspileError::InvalidMappingSyntax(raw.to_string()))?;

    Ok(Some(build_type_name(type_name)))
}

fn build_type_name(pair: Pair<Rule>) -> TypeDescriptor {
    let mut inner = pair.into_inner();
    let mut descriptor = match inner.next() {
        Some(base) => build_base(base),
        None => TypeDescriptor::Elementary(String::new()),
    };

    for suffix in inner {
        let length = suffix
            .into_inner()
            .next()
            .and_then(|len| len.as_str().parse().ok());
        descriptor = TypeDescriptor::Array {
            element: Box::new(descriptor),
            length,
        };
    }
    descriptor
}

fn build_base(pair: Pair<Rule>) -> TypeDescriptor {
    match pair.as_rule() {
        Rule::mapping => {
            let mut types = pair
                .into_inner()
                .filter(|p| p.as_rule() == Rule::type_name)
                .map(build_type_name);
            let key = types.next().unwrap_or(TypeDescriptor::Elementary(String::new()));
            let value = types.next().unwrap_or(TypeDescriptor::Elementary(String::new()));
            TypeDescriptor::Mapping {
                key: Box::new(key),
                value: Box::new(value),
            }
        }
        Rule::enum_type => TypeDescriptor::Enum(qualified_name(pair)),
        Rule::struct_type => TypeDescriptor::Struct(qualified_name(pair)),
        Rule::contract_type => TypeDescriptor::Contract(qualified_name(pair)),
        Rule::address_payable => TypeDescriptor::Elementary("address".to_string()),
        _ => TypeDescriptor::Elementary(pair.as_str().to_string()),
    }
}

fn qualified_name(pair: Pair<Rule>) -> String {
    pair.into_inner()
        .find(|p| p.as_rule() == Rule::qualified_name)
        .map(|p| p.as_str().to_string())
        .unwrap_or_default()
}
