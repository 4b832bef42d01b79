//! Solidity ABI / solc AST to Move transpiler.
//!
//! ```no_run
//! use sol2move::{Transpiler, TranspilerConfig};
//!
//! let abi = r#"[{"type":"function","name":"ping","inputs":[],"outputs":[]}]"#;
//! let out = Transpiler::new(TranspilerConfig::default()).transpile_abi(abi, "Pinger")?;
//! println!("{}", out.source);
//! # Ok::<(), sol2move::TranspileError>(())
//! ```

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod generator;
pub mod parser;
pub mod plugin;
pub mod target;
pub mod transpiler;

#[cfg(test)]
mod tests;

pub use config::{Mode, TranspilerConfig};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{Result, TranspileError};
pub use plugin::{Plugin, PluginRegistry};
pub use target::{TargetProfile, TargetRegistry};
pub use transpiler::type_mapper::get_type_string;
pub use transpiler::{Transpiled, Transpiler};
