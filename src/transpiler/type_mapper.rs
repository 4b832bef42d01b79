//! Solidity to Move type mapping.
//!
//! Mapping is recursive over the parsed [`TypeDescriptor`] and never touches shared state:
//! every struct a type needs is returned alongside it, and deduplication is left to the
//! caller's [`StructArena`].

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::config::Mode;
use crate::diagnostics::Diagnostics;
use crate::error::{Result, TranspileError};
use crate::parser::types::{parse_type, TypeDescriptor};
use crate::transpiler::ast::Parameter;
use crate::transpiler::sanitize::sanitize_identifier;

pub const DEFAULT_CONTEXT: &str = "Tuple";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveType {
    Primitive(&'static str),
    Vector(Box<MoveType>),
    Table(Box<MoveType>, Box<MoveType>),
    Struct(String),
    /// Verbatim override from `customTypes` or a plugin.
    Custom(String),
    /// Placeholder for a type with no mapping; never usable as-is.
    Unsupported(String),
}

impl MoveType {
    pub fn is_table(&self) -> bool {
        matches!(self, MoveType::Table(..))
    }

    pub fn contains_table(&self) -> bool {
        match self {
            MoveType::Table(..) => true,
            MoveType::Vector(inner) => inner.contains_table(),
            _ => false,
        }
    }
}

impl fmt::Display for MoveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveType::Primitive(name) => write!(f, "{}", name),
            MoveType::Vector(inner) => write!(f, "vector<{}>", inner),
            MoveType::Table(key, value) => write!(f, "table::Table<{}, {}>", key, value),
            MoveType::Struct(name) | MoveType::Custom(name) => write!(f, "{}", name),
            MoveType::Unsupported(raw) => write!(f, "/* UNSUPPORTED: {} */", raw),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructField {
    pub name: String,
    pub ty: MoveType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedStruct {
    pub name: String,
    pub fields: Vec<StructField>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetType {
    pub ty: MoveType,
    pub structs: Vec<SynthesizedStruct>,
}

impl TargetType {
    fn plain(ty: MoveType) -> Self {
        Self {
            ty,
            structs: Vec::new(),
        }
    }
}

/// Name-keyed struct cache for one module generation run, preserving first-use order.
#[derive(Debug, Default)]
pub struct StructArena {
    order: Vec<String>,
    defs: HashMap<String, SynthesizedStruct>,
}

impl StructArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert unless a struct with the same name exists. Returns the existing definition when
    /// it differs from `def`, so the caller can report the conflict.
    pub fn insert(&mut self, def: SynthesizedStruct) -> Option<&SynthesizedStruct> {
        if self.defs.contains_key(&def.name) {
            let existing = &self.defs[&def.name];
            return if existing.fields != def.fields {
                Some(existing)
            } else {
                None
            };
        }
        self.order.push(def.name.clone());
        self.defs.insert(def.name.clone(), def);
        None
    }

    pub fn get(&self, name: &str) -> Option<&SynthesizedStruct> {
        self.defs.get(name)
    }

    pub fn into_ordered(mut self) -> Vec<SynthesizedStruct> {
        self.order
            .iter()
            .filter_map(|name| self.defs.remove(name))
            .collect()
    }
}

pub struct TypeMapper<'a> {
    custom_types: &'a BTreeMap<String, String>,
    mode: Mode,
}

impl<'a> TypeMapper<'a> {
    pub fn new(custom_types: &'a BTreeMap<String, String>, mode: Mode) -> Self {
        Self { custom_types, mode }
    }

    pub fn map_type(
        &self,
        raw: &str,
        components: Option<&[Parameter]>,
        context: &str,
        diagnostics: &mut Diagnostics,
    ) -> Result<TargetType> {
        if let Some(custom) = self.custom_types.get(raw.trim()) {
            return Ok(TargetType::plain(MoveType::Custom(custom.clone())));
        }

        match parse_type(raw)? {
            Some(descriptor) => self.map_descriptor(&descriptor, components, context, diagnostics),
            None => self.unsupported(raw, diagnostics),
        }
    }

    pub fn map_descriptor(
        &self,
        descriptor: &TypeDescriptor,
        components: Option<&[Parameter]>,
        context: &str,
        diagnostics: &mut Diagnostics,
    ) -> Result<TargetType> {
        if let Some(custom) = self.lookup_custom(descriptor) {
            return Ok(TargetType::plain(MoveType::Custom(custom.to_string())));
        }

        match descriptor {
            TypeDescriptor::Elementary(name) if name == "tuple" => match components {
                Some(components) => self.map_tuple(components, context, diagnostics),
                None => self.unsupported("tuple", diagnostics),
            },
            TypeDescriptor::Array { element, .. } => {
                let inner = self.map_descriptor(element, components, context, diagnostics)?;
                Ok(TargetType {
                    ty: MoveType::Vector(Box::new(inner.ty)),
                    structs: inner.structs,
                })
            }
            TypeDescriptor::Mapping { key, value } => {
                let key = self.map_descriptor(key, None, &format!("{}_Key", context), diagnostics)?;
                let value =
                    self.map_descriptor(value, None, &format!("{}_Value", context), diagnostics)?;
                let mut structs = key.structs;
                structs.extend(value.structs);
                Ok(TargetType {
                    ty: MoveType::Table(Box::new(key.ty), Box::new(value.ty)),
                    structs,
                })
            }
            TypeDescriptor::Enum(_) => {
                let name = sanitize_identifier(descriptor.user_type_name().unwrap_or(context));
                Ok(TargetType {
                    ty: MoveType::Struct(name.clone()),
                    structs: vec![SynthesizedStruct {
                        name,
                        fields: vec![StructField {
                            name: "kind".to_string(),
                            ty: MoveType::Primitive("u8"),
                        }],
                    }],
                })
            }
            TypeDescriptor::Struct(_) | TypeDescriptor::Contract(_) => {
                self.unsupported(&descriptor.to_string(), diagnostics)
            }
            TypeDescriptor::Elementary(name) => match primitive(name) {
                Some(move_type) => Ok(TargetType::plain(MoveType::Primitive(move_type))),
                None => self.unsupported(name, diagnostics),
            },
        }
    }

    fn map_tuple(
        &self,
        components: &[Parameter],
        context: &str,
        diagnostics: &mut Diagnostics,
    ) -> Result<TargetType> {
        let struct_name = format!("{}Struct", context);
        let mut fields = Vec::with_capacity(components.len());
        let mut nested = Vec::new();

        for (index, component) in components.iter().enumerate() {
            let field_name = if component.name.is_empty() {
                format!("field{}", index)
            } else {
                sanitize_identifier(&component.name)
            };
            let mapped = self.map_type(
                &component.param_type,
                component.components.as_deref(),
                &format!("{}_{}", context, field_name),
                diagnostics,
            )?;
            fields.push(StructField {
                name: field_name,
                ty: mapped.ty,
            });
            nested.extend(mapped.structs);
        }

        let mut structs = vec![SynthesizedStruct {
            name: struct_name.clone(),
            fields,
        }];
        structs.extend(nested);
        Ok(TargetType {
            ty: MoveType::Struct(struct_name),
            structs,
        })
    }

    fn lookup_custom(&self, descriptor: &TypeDescriptor) -> Option<&str> {
        if let Some(custom) = self.custom_types.get(&descriptor.to_string()) {
            return Some(custom);
        }
        descriptor
            .user_type_name()
            .and_then(|name| self.custom_types.get(name))
            .map(String::as_str)
    }

    fn unsupported(&self, raw: &str, diagnostics: &mut Diagnostics) -> Result<TargetType> {
        if self.mode.is_strict() {
            return Err(TranspileError::UnsupportedType(raw.to_string()));
        }
        diagnostics.warn(format!(
            "unsupported Solidity type `{}` requires manual completion",
            raw
        ));
        Ok(TargetType::plain(MoveType::Unsupported(raw.to_string())))
    }
}

/// Fixed Solidity to Move primitive table.
pub fn primitive(name: &str) -> Option<&'static str> {
    match name {
        "bool" => Some("bool"),
        "address" => Some("address"),
        "string" | "bytes" | "byte" => Some("vector<u8>"),
        "uint" => Some("u256"),
        "int" => Some("i256"),
        _ => {
            if let Some(width) = name.strip_prefix("uint") {
                return integer_width(width).map(unsigned);
            }
            if let Some(width) = name.strip_prefix("int") {
                return integer_width(width).map(signed);
            }
            if let Some(size) = name.strip_prefix("bytes") {
                return match size.parse::<u32>() {
                    Ok(1..=32) if !size.starts_with('0') => Some("vector<u8>"),
                    _ => None,
                };
            }
            None
        }
    }
}

/// Valid Solidity widths are multiples of 8 up to 256; they widen to the next Move width.
fn integer_width(width: &str) -> Option<u32> {
    if width.starts_with('0') {
        return None;
    }
    let bits: u32 = width.parse().ok()?;
    if bits == 0 || bits > 256 || bits % 8 != 0 {
        return None;
    }
    [8, 16, 32, 64, 128, 256].into_iter().find(|w| *w >= bits)
}

fn unsigned(bits: u32) -> &'static str {
    match bits {
        8 => "u8",
        16 => "u16",
        32 => "u32",
        64 => "u64",
        128 => "u128",
        _ => "u256",
    }
}

fn signed(bits: u32) -> &'static str {
    match bits {
        8 => "i8",
        16 => "i16",
        32 => "i32",
        64 => "i64",
        128 => "i128",
        _ => "i256",
    }
}

/// Lenient, standalone mapping for callers that only need the type string.
pub fn get_type_string(
    raw: &str,
    components: Option<&[Parameter]>,
    custom_types: &BTreeMap<String, String>,
) -> Result<String> {
    let mapper = TypeMapper::new(custom_types, Mode::Lenient);
    let mut diagnostics = Diagnostics::new();
    Ok(mapper
        .map_type(raw, components, DEFAULT_CONTEXT, &mut diagnostics)?
        .ty
        .to_string())
}
