//! Line-level tokenizing shared by every section: comment stripping, label
//! extraction, and a split-on-top-level-commas helper that respects `[...]`
//! nesting so a memory operand's own brackets never get sliced apart.

/// Drops everything from the first `;` onward.
pub fn strip_comment(line: &str) -> &str {
    match line.find(';') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

/// Splits a `name:` prefix off an already comment-stripped, trimmed line.
/// `name` must be a bare identifier for the colon to count as a label
/// marker, so `[EBX:4]`-style typos (not valid syntax, but harmless to rule
/// out) never get mistaken for one.
pub fn split_label(line: &str) -> (Option<&str>, &str) {
    if let Some(pos) = line.find(':') {
        let candidate = line[..pos].trim();
        if !candidate.is_empty() && candidate.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return (Some(candidate), line[pos + 1..].trim());
        }
    }
    (None, line)
}

/// Splits `line` on its first run of whitespace into `(token, rest)`; `rest`
/// is trimmed, `token` is whatever comes before the first whitespace.
pub fn split_first_token(line: &str) -> (&str, &str) {
    let trimmed = line.trim_start();
    match trimmed.find(char::is_whitespace) {
        Some(pos) => (&trimmed[..pos], trimmed[pos..].trim_start()),
        None => (trimmed, ""),
    }
}

/// Splits a directive or operand list on commas, skipping any that sit
/// inside a `[...]` memory expression.
pub fn split_top_level_commas(s: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut depth = 0i32;
    let mut current = String::new();
    for ch in s.chars() {
        match ch {
            '[' => {
                depth += 1;
                current.push(ch);
            }
            ']' => {
                depth -= 1;
                current.push(ch);
            }
            ',' if depth == 0 => {
                out.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    if !current.trim().is_empty() {
        out.push(current.trim().to_string());
    }
    out
}

/// Recognizes a `NAME EQU value` line, returning `(name, value_text)`.
pub fn split_equ(line: &str) -> Option<(&str, &str)> {
    let (name, rest) = split_first_token(line);
    if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return None;
    }
    let (keyword, value) = split_first_token(rest);
    if keyword.eq_ignore_ascii_case("EQU") {
        Some((name, value.trim()))
    } else {
        None
    }
}
