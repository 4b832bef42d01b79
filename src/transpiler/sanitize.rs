//! Move identifier rules.

const RESERVED_KEYWORDS: &[&str] = &[
    "abort", "acquires", "address", "as", "borrow", "break", "const", "continue", "copy", "else",
    "entry", "enum", "false", "friend", "fun", "has", "if", "let", "loop", "match", "module",
    "move", "mut", "native", "public", "return", "script", "signer", "spec", "struct", "true",
    "type", "use", "vector", "while",
];

const EMPTY_IDENTIFIER: &str = "unnamed";

pub fn is_reserved(name: &str) -> bool {
    RESERVED_KEYWORDS.contains(&name)
}

/// Rewrite `name` into a valid, non-reserved Move identifier.
///
/// Invalid characters become `_`, runs of `_` collapse, leading and trailing `_` are trimmed,
/// a leading digit gets a `_` prefix and reserved words get a `_` suffix. The function is
/// idempotent.
pub fn sanitize_identifier(name: &str) -> String {
    let mut safe = String::with_capacity(name.len());
    for c in name.chars() {
        let c = if c.is_ascii_alphanumeric() { c } else { '_' };
        if c == '_' && safe.ends_with('_') {
            continue;
        }
        safe.push(c);
    }

    let trimmed = safe.trim_matches('_');
    if trimmed.is_empty() {
        return EMPTY_IDENTIFIER.to_string();
    }

    let mut safe = if trimmed.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{}", trimmed)
    } else {
        trimmed.to_string()
    };

    if is_reserved(&safe) {
        safe.push('_');
    }
    safe
}
