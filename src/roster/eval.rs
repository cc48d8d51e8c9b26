//! Evaluating the extracted roster block back into records.
//!
//! The block is source text, not JSON, so this is a hand-rolled cursor over a
//! deliberately narrow grammar: a list of object literals whose values are
//! string literals, numbers, or `new Date("...")` calls. Anything outside
//! that subset is rejected rather than evaluated.

use chrono::NaiveDate;

use super::{RosterError, UserRecord, normalize_day};

/// Parses the raw block text (the full `const USERS = [...];` span) into
/// records. The portion after the first `=` is treated as the array
/// expression; the trailing `;` is stripped.
pub fn parse_block(raw: &str) -> Result<Vec<UserRecord>, RosterError> {
    let (_, expr) = raw
        .split_once('=')
        .ok_or_else(|| RosterError::Parse("no '=' in roster declaration".to_string()))?;
    let expr = expr.trim().trim_end_matches(';').trim_end();

    let mut parser = Parser::new(expr);
    let records = parser.parse_array()?;
    parser.skip_ws();
    if !parser.at_end() {
        return Err(parser.error("trailing input after roster array"));
    }
    Ok(records)
}

#[derive(Debug, Clone, PartialEq)]
enum Value {
    Str(String),
    Num(f64),
    Date(NaiveDate),
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    const fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn error(&self, msg: &str) -> RosterError {
        RosterError::Parse(format!("{msg} at offset {}", self.pos))
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn expect(&mut self, want: char) -> Result<(), RosterError> {
        self.skip_ws();
        if self.peek() == Some(want) {
            self.bump();
            Ok(())
        } else {
            Err(self.error(&format!("expected '{want}'")))
        }
    }

    fn eat(&mut self, want: char) -> bool {
        self.skip_ws();
        if self.peek() == Some(want) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn parse_array(&mut self) -> Result<Vec<UserRecord>, RosterError> {
        self.expect('[')?;
        let mut records = Vec::new();
        loop {
            self.skip_ws();
            if self.eat(']') {
                break;
            }
            records.push(self.parse_record()?);
            if !self.eat(',') {
                self.expect(']')?;
                break;
            }
        }
        Ok(records)
    }

    fn parse_record(&mut self) -> Result<UserRecord, RosterError> {
        self.expect('{')?;

        let mut username = None;
        let mut password = None;
        let mut expires_at = None;

        loop {
            self.skip_ws();
            if self.eat('}') {
                break;
            }
            let key = self.parse_key()?;
            self.expect(':')?;
            let value = self.parse_value()?;
            match key.as_str() {
                "username" => username = Some(string_field("username", value)?),
                "password" => password = Some(string_field("password", value)?),
                "expiresAt" => expires_at = Some(date_field(value)?),
                // Unknown keys are within the grammar; their values are
                // parsed and dropped.
                _ => {}
            }
            if !self.eat(',') {
                self.expect('}')?;
                break;
            }
        }

        let username = username.ok_or_else(|| self.error("record missing 'username'"))?;
        let password = password.ok_or_else(|| self.error("record missing 'password'"))?;
        let expires_at = expires_at.ok_or_else(|| self.error("record missing 'expiresAt'"))?;

        Ok(UserRecord {
            username,
            password,
            expires_at,
        })
    }

    fn parse_key(&mut self) -> Result<String, RosterError> {
        self.skip_ws();
        match self.peek() {
            Some('"' | '\'') => self.parse_string(),
            Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {
                let start = self.pos;
                while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_' || c == '$')
                {
                    self.bump();
                }
                Ok(self.src[start..self.pos].to_string())
            }
            _ => Err(self.error("expected object key")),
        }
    }

    fn parse_value(&mut self) -> Result<Value, RosterError> {
        self.skip_ws();
        match self.peek() {
            Some('"' | '\'') => Ok(Value::Str(self.parse_string()?)),
            Some(c) if c.is_ascii_digit() || c == '-' || c == '+' => self.parse_number(),
            Some('n') => self.parse_date_call(),
            _ => Err(self.error("expected string, number, or date constructor")),
        }
    }

    fn parse_string(&mut self) -> Result<String, RosterError> {
        let Some(quote) = self.bump() else {
            return Err(self.error("expected string literal"));
        };
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated string literal")),
                Some('\\') => match self.bump() {
                    None => return Err(self.error("unterminated escape sequence")),
                    Some('n') => out.push('\n'),
                    Some('r') => out.push('\r'),
                    Some('t') => out.push('\t'),
                    Some(c) => out.push(c),
                },
                Some(c) if c == quote => return Ok(out),
                Some(c) => out.push(c),
            }
        }
    }

    fn parse_number(&mut self) -> Result<Value, RosterError> {
        let start = self.pos;
        if matches!(self.peek(), Some('-' | '+')) {
            self.bump();
        }
        while matches!(self.peek(), Some(c) if c.is_ascii_digit() || c == '.') {
            self.bump();
        }
        self.src[start..self.pos]
            .parse::<f64>()
            .map(Value::Num)
            .map_err(|_| self.error("invalid number literal"))
    }

    fn parse_date_call(&mut self) -> Result<Value, RosterError> {
        for word in ["new", "Date"] {
            self.skip_ws();
            if !self.src[self.pos..].starts_with(word) {
                return Err(self.error("expected 'new Date(...)'"));
            }
            self.pos += word.len();
        }
        self.expect('(')?;
        self.skip_ws();
        let arg = match self.peek() {
            Some('"' | '\'') => self.parse_string()?,
            _ => return Err(self.error("only string arguments to Date are supported")),
        };
        self.expect(')')?;
        Ok(Value::Date(normalize_day(&arg)))
    }
}

fn string_field(name: &str, value: Value) -> Result<String, RosterError> {
    match value {
        Value::Str(s) => Ok(s),
        _ => Err(RosterError::Parse(format!(
            "'{name}' must be a string literal"
        ))),
    }
}

fn date_field(value: Value) -> Result<NaiveDate, RosterError> {
    match value {
        Value::Date(day) => Ok(day),
        Value::Str(s) => Ok(normalize_day(&s)),
        Value::Num(_) => Err(RosterError::Parse(
            "'expiresAt' must be a date string or Date constructor".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parses_multi_record_block() {
        let raw = r#"const USERS = [
    { username: "admin", password: "1111", expiresAt: new Date("2099-01-01") },
    { username: "alice", password: "pw", expiresAt: new Date("2030-06-01") }
];"#;
        let records = parse_block(raw).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].username, "admin");
        assert_eq!(records[0].expires_at, day(2099, 1, 1));
        assert_eq!(records[1].password, "pw");
    }

    #[test]
    fn test_parses_empty_block() {
        assert_eq!(parse_block("const USERS = [];").unwrap(), vec![]);
    }

    #[test]
    fn test_accepts_single_quotes_and_string_dates() {
        let raw = "const USERS = [ { username: 'bob', password: 'x', expiresAt: '2031-02-03' } ];";
        let records = parse_block(raw).unwrap();
        assert_eq!(records[0].username, "bob");
        assert_eq!(records[0].expires_at, day(2031, 2, 3));
    }

    #[test]
    fn test_accepts_trailing_comma() {
        let raw = r#"const USERS = [
    { username: "a", password: "b", expiresAt: new Date("2030-01-01") },
];"#;
        assert_eq!(parse_block(raw).unwrap().len(), 1);
    }

    #[test]
    fn test_string_escapes() {
        let raw = r#"const USERS = [ { username: "a\"b", password: "c\\d", expiresAt: "2030-01-01" } ];"#;
        let records = parse_block(raw).unwrap();
        assert_eq!(records[0].username, "a\"b");
        assert_eq!(records[0].password, "c\\d");
    }

    #[test]
    fn test_rejects_missing_equals() {
        assert!(matches!(
            parse_block("const USERS [];"),
            Err(RosterError::Parse(_))
        ));
    }

    #[test]
    fn test_rejects_non_array() {
        assert!(matches!(
            parse_block("const USERS = {};"),
            Err(RosterError::Parse(_))
        ));
    }

    #[test]
    fn test_rejects_function_calls() {
        let raw = r#"const USERS = [ { username: fetch("x"), password: "p", expiresAt: "2030-01-01" } ];"#;
        assert!(matches!(parse_block(raw), Err(RosterError::Parse(_))));
    }

    #[test]
    fn test_rejects_missing_required_field() {
        let raw = r#"const USERS = [ { username: "a", password: "b" } ];"#;
        assert!(matches!(parse_block(raw), Err(RosterError::Parse(_))));
    }

    #[test]
    fn test_unparsable_date_falls_back_to_today() {
        let raw = r#"const USERS = [ { username: "a", password: "b", expiresAt: new Date("garbage") } ];"#;
        let records = parse_block(raw).unwrap();
        assert_eq!(records[0].expires_at, Utc::now().date_naive());
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let raw = r#"const USERS = [ { username: "a", note: "vip", password: "b", expiresAt: "2030-01-01" } ];"#;
        let records = parse_block(raw).unwrap();
        assert_eq!(records[0].username, "a");
    }
}
