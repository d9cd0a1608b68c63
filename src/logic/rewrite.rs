//! String-level rewriting between dictionary syntax and the legacy evaluable
//! form (`[field(choice)] = 1` vs `record['field___choice'] == 1`).
//!
//! Older tooling persisted branching logic in the rewritten form; these shims
//! keep such dictionaries round-trippable. The rewritten form is never
//! evaluated here — [`crate::logic::compile`] is the only evaluation path.

fn is_var_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '(' || c == ')'
}

/// Rewrite dictionary syntax to the legacy evaluable form.
///
/// `[field]` becomes `record['field']`, `[field(choice)]` becomes
/// `record['field___choice']`, a lone `=` becomes `==` and `<>` becomes `!=`.
/// The equality rewrite must not fire on the `=` of `<=`/`>=`, and `<>` must
/// be consumed as one token.
#[must_use]
pub fn to_eval_syntax(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 16);
    let mut prev = '\0';
    let mut rest = raw;
    while let Some(c) = rest.chars().next() {
        if c == '[' {
            // Bracket fragments never contain operators.
            if let Some(close) = rest.find(']') {
                let interior = &rest[1..close];
                if !interior.is_empty() && interior.chars().all(is_var_char) {
                    let name = match interior.split_once('(') {
                        Some((field, choice)) => {
                            format!("{field}___{}", choice.trim_end_matches(')'))
                        }
                        None => interior.to_string(),
                    };
                    out.push_str("record['");
                    out.push_str(&name);
                    out.push_str("']");
                    prev = ']';
                    rest = &rest[close + 1..];
                    continue;
                }
            }
        }
        if rest.starts_with("<>") {
            out.push_str("!=");
            prev = '>';
            rest = &rest[2..];
            continue;
        }
        if c == '=' && prev != '<' && prev != '>' && prev != '|' {
            out.push_str("==");
        } else {
            out.push(c);
        }
        prev = c;
        rest = &rest[c.len_utf8()..];
    }
    out
}

/// Rewrite the legacy evaluable form back to dictionary syntax; inverse of
/// [`to_eval_syntax`] on strings it produced.
#[must_use]
pub fn from_eval_syntax(rewritten: &str) -> String {
    let mut out = String::with_capacity(rewritten.len());
    let mut rest = rewritten;
    while !rest.is_empty() {
        if let Some(body) = rest.strip_prefix("record['") {
            if let Some(close) = body.find("']") {
                let name = &body[..close];
                let surface = match name.split_once("___") {
                    Some((field, choice)) => format!("[{field}({choice})]"),
                    None => format!("[{name}]"),
                };
                out.push_str(&surface);
                rest = &body[close + 2..];
                continue;
            }
        }
        if rest.starts_with("==") {
            out.push('=');
            rest = &rest[2..];
        } else if rest.starts_with("!=") {
            out.push_str("<>");
            rest = &rest[2..];
        } else {
            let c = rest.chars().next().unwrap_or_default();
            out.push(c);
            rest = &rest[c.len_utf8()..];
        }
    }
    out
}
