//! In-memory Move module produced by the assembler and consumed by the printer.

use crate::transpiler::type_mapper::SynthesizedStruct;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetModule {
    pub name: String,
    pub package: String,
    pub imports: Vec<String>,
    pub structs: Vec<StructDef>,
    pub functions: Vec<FunctionDef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ability {
    Copy,
    Drop,
    Store,
    Key,
}

impl Ability {
    pub fn as_str(self) -> &'static str {
        match self {
            Ability::Copy => "copy",
            Ability::Drop => "drop",
            Ability::Store => "store",
            Ability::Key => "key",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ty: String,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructDef {
    pub name: String,
    pub abilities: Vec<Ability>,
    pub fields: Vec<Field>,
}

impl StructDef {
    /// Auxiliary value types get `copy, drop, store`.
    pub fn synthesized(def: &SynthesizedStruct) -> Self {
        Self {
            name: def.name.clone(),
            abilities: vec![Ability::Copy, Ability::Drop, Ability::Store],
            fields: def
                .fields
                .iter()
                .map(|f| Field::new(f.name.clone(), f.ty.to_string()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Private,
    Friend,
    Entry,
}

impl Visibility {
    pub fn keyword(self) -> &'static str {
        match self {
            Visibility::Private => "",
            Visibility::Friend => "public(friend)",
            Visibility::Entry => "public entry",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub ty: String,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDef {
    pub visibility: Visibility,
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: Option<String>,
    pub body: Vec<String>,
}
