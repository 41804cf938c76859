use crate::Vars;

/// Replace each `${identifier}` with its value from `vars`, or nothing when unset.
///
/// Identifiers are ASCII alphanumerics and underscores. Anything that does not form a
/// complete placeholder (`${`, `${}`, `${a-b}`) is copied through unchanged.
pub fn substitute(template: &str, vars: &Vars) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let ident_len = after
            .bytes()
            .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
            .count();
        if ident_len > 0 && after.as_bytes().get(ident_len) == Some(&b'}') {
            out.push_str(vars.get(&after[..ident_len]).unwrap_or(""));
            rest = &after[ident_len + 1..];
        } else {
            out.push_str("${");
            rest = after;
        }
    }
    out.push_str(rest);
    out
}
