/// Escapes `%`, `_` and `\` so user input is matched literally by `LIKE`.
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// `LIKE` pattern matching any value containing `needle`.
pub fn like_contains_pattern(needle: &str) -> String {
    format!("%{}%", escape_like(needle))
}
