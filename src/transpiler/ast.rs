use serde::Deserialize;

/// A contract after normalization, independent of whether it came from an ABI or a source AST.
#[derive(Debug, Clone, Default)]
pub struct NormalizedContract {
    pub name: String,
    pub base_names: Vec<String>,
    pub state_variables: Vec<StateVariable>,
    pub entries: Vec<InterfaceEntry>,
    pub modifiers: Vec<String>,
}

impl NormalizedContract {
    pub fn events(&self) -> impl Iterator<Item = &InterfaceEntry> {
        self.entries.iter().filter(|e| e.kind == EntryKind::Event)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    Function,
    Event,
    Error,
    Constructor,
    Fallback,
    Receive,
    Other(String),
}

impl EntryKind {
    pub fn parse(kind: &str) -> Self {
        match kind {
            "function" => EntryKind::Function,
            "event" => EntryKind::Event,
            "error" => EntryKind::Error,
            "constructor" => EntryKind::Constructor,
            "fallback" => EntryKind::Fallback,
            "receive" => EntryKind::Receive,
            other => EntryKind::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutability {
    Pure,
    View,
    NonPayable,
    Payable,
}

impl Mutability {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pure" => Some(Mutability::Pure),
            "view" | "constant" => Some(Mutability::View),
            "nonpayable" => Some(Mutability::NonPayable),
            "payable" => Some(Mutability::Payable),
            _ => None,
        }
    }

    pub fn is_read_only(self) -> bool {
        matches!(self, Mutability::Pure | Mutability::View)
    }
}

#[derive(Debug, Clone)]
pub struct InterfaceEntry {
    pub kind: EntryKind,
    pub name: Option<String>,
    pub inputs: Vec<Parameter>,
    pub outputs: Vec<Parameter>,
    pub mutability: Option<Mutability>,
    pub anonymous: bool,
    pub payable: bool,
    /// Statement IR; only present when the entry was extracted from a source AST.
    pub body: Option<Vec<Statement>>,
}

impl InterfaceEntry {
    pub fn new(kind: EntryKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: Some(name.into()),
            inputs: Vec::new(),
            outputs: Vec::new(),
            mutability: None,
            anonymous: false,
            payable: false,
            body: None,
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("unknown")
    }

    pub fn is_read_only(&self) -> bool {
        self.mutability.map_or(false, Mutability::is_read_only)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Parameter {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: String,
    #[serde(default)]
    pub components: Option<Vec<Parameter>>,
    #[serde(default)]
    pub indexed: bool,
}

impl Parameter {
    pub fn new(name: impl Into<String>, param_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param_type: param_type.into(),
            components: None,
            indexed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateVariable {
    pub name: String,
    pub var_type: String,
    pub visibility: Option<String>,
}

impl StateVariable {
    pub fn new(name: impl Into<String>, var_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            var_type: var_type.into(),
            visibility: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Expression(Expression),
    If {
        condition: Expression,
        then_branch: Vec<Statement>,
        else_branch: Option<Vec<Statement>>,
    },
    Return(Option<Expression>),
    VariableDeclaration {
        names: Vec<String>,
        value: Option<Expression>,
    },
    For {
        init: Option<Box<Statement>>,
        condition: Option<Expression>,
        increment: Option<Expression>,
        body: Vec<Statement>,
    },
    Try {
        call: Expression,
        body: Vec<Statement>,
        catch_clauses: Vec<CatchClause>,
    },
    InlineAssembly(String),
    Guard(Guard),
    Emit {
        event: String,
        args: Vec<Expression>,
    },
    /// A node outside the understood set, carrying its raw node type.
    Unsupported(String),
}

impl Statement {
    pub fn kind(&self) -> &str {
        match self {
            Statement::Expression(_) => "ExpressionStatement",
            Statement::If { .. } => "IfStatement",
            Statement::Return(_) => "Return",
            Statement::VariableDeclaration { .. } => "VariableDeclarationStatement",
            Statement::For { .. } => "ForStatement",
            Statement::Try { .. } => "TryStatement",
            Statement::InlineAssembly(_) => "InlineAssembly",
            Statement::Guard(_) => "Guard",
            Statement::Emit { .. } => "EmitStatement",
            Statement::Unsupported(kind) => kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    pub error_name: String,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Guard {
    /// `require(cond, msg)` and `assert(cond)`.
    Require {
        condition: Expression,
        message: Option<String>,
    },
    /// `revert(msg)` and `revert CustomError(...)`.
    Revert { reason: Option<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier(String),
    Literal(Literal),
    BinaryOp(Box<Expression>, String, Box<Expression>),
    Call(Box<Expression>, Vec<Expression>),
    Assignment(Box<Expression>, String, Box<Expression>),
    MemberAccess(Box<Expression>, String),
    IndexAccess(Box<Expression>, Option<Box<Expression>>, Container),
    UnaryOp {
        operator: String,
        prefix: bool,
        operand: Box<Expression>,
    },
    Unsupported(String),
}

impl Expression {
    pub fn ident(name: impl Into<String>) -> Self {
        Expression::Identifier(name.into())
    }

    pub fn number(value: impl Into<String>) -> Self {
        Expression::Literal(Literal {
            kind: LiteralKind::Number,
            value: value.into(),
        })
    }

    pub fn binary(left: Expression, op: impl Into<String>, right: Expression) -> Self {
        Expression::BinaryOp(Box::new(left), op.into(), Box::new(right))
    }

    pub fn call(callee: Expression, args: Vec<Expression>) -> Self {
        Expression::Call(Box::new(callee), args)
    }
}

/// What an index expression reads from, as far as the base's solc type tells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Mapping,
    /// Dynamic and fixed arrays, and `bytes`.
    Array,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Number,
    Bool,
    String,
    HexString,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    pub kind: LiteralKind,
    pub value: String,
}
