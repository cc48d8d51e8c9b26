//! Rendering records back into the canonical block text.

use super::UserRecord;

/// Renders the roster in the exact declaration format the managed script file
/// carries: one record per line, four-space indent, dates at day precision.
///
/// Evaluating the output with [`super::parse_block`] reproduces the input
/// records (dates are already normalized by the type).
#[must_use]
pub fn render_block(records: &[UserRecord]) -> String {
    let items: Vec<String> = records
        .iter()
        .map(|user| {
            format!(
                "    {{ username: {}, password: {}, expiresAt: new Date({}) }}",
                quote(&user.username),
                quote(&user.password),
                quote(&user.expires_at.format("%Y-%m-%d").to_string()),
            )
        })
        .collect();
    format!("const USERS = [\n{}\n];", items.join(",\n"))
}

/// Double-quoted string literal with the same escapes `JSON.stringify` emits
/// for the characters the roster can realistically contain.
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::super::parse_block;
    use super::*;
    use chrono::NaiveDate;

    fn record(username: &str, password: &str, y: i32, m: u32, d: u32) -> UserRecord {
        UserRecord {
            username: username.to_string(),
            password: password.to_string(),
            expires_at: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
        }
    }

    #[test]
    fn test_exact_format() {
        let records = vec![
            record("admin", "1111", 2099, 1, 1),
            record("alice", "pw", 2030, 6, 1),
        ];
        let block = render_block(&records);
        assert_eq!(
            block,
            "const USERS = [\n    { username: \"admin\", password: \"1111\", expiresAt: new Date(\"2099-01-01\") },\n    { username: \"alice\", password: \"pw\", expiresAt: new Date(\"2030-06-01\") }\n];"
        );
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("a\"b\\c"), "\"a\\\"b\\\\c\"");
    }

    #[test]
    fn test_round_trip() {
        let records = vec![
            record("admin", "p", 2099, 1, 1),
            record("user one", "a\"b", 2030, 12, 31),
        ];
        let parsed = parse_block(&render_block(&records)).unwrap();
        assert_eq!(parsed, records);
    }

    #[test]
    fn test_empty_roster_round_trips() {
        let block = render_block(&[]);
        assert_eq!(parse_block(&block).unwrap(), vec![]);
    }
}
