//! Decoder for the string-encoded idea collection.
//!
//! Upstream stores the collection as text that is either a JSON object or a
//! Python dict literal (`{'idea_1': 'InvoiceBot', ...}`). Both decode into an
//! insertion-ordered `serde_json::Map`. Any other input decodes to `None`.

use serde_json::{Map, Number, Value};

/// Same nesting limit serde_json applies to JSON input.
const MAX_DEPTH: usize = 128;

pub fn decode_mapping(raw: &str) -> Option<Map<String, Value>> {
    if let Ok(map) = serde_json::from_str::<Map<String, Value>>(raw) {
        return Some(map);
    }

    let mut parser = LiteralParser::new(raw);
    match parser.parse_document()? {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

struct LiteralParser<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    depth: usize,
}

impl<'a> LiteralParser<'a> {
    fn new(raw: &'a str) -> Self {
        Self {
            chars: raw.chars().peekable(),
            depth: 0,
        }
    }

    fn parse_document(&mut self) -> Option<Value> {
        let value = self.parse_value()?;
        self.skip_whitespace();
        // Trailing garbage means this was not a single literal
        match self.chars.peek() {
            None => Some(value),
            Some(_) => None,
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.chars.peek(), Some(c) if c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn expect(&mut self, expected: char) -> Option<()> {
        self.skip_whitespace();
        (self.chars.next()? == expected).then_some(())
    }

    fn parse_value(&mut self) -> Option<Value> {
        self.skip_whitespace();
        match *self.chars.peek()? {
            c @ ('{' | '[' | '(') => {
                if self.depth >= MAX_DEPTH {
                    return None;
                }
                self.depth += 1;
                let value = match c {
                    '{' => self.parse_dict(),
                    '[' => self.parse_sequence('[', ']'),
                    _ => self.parse_sequence('(', ')'),
                };
                self.depth -= 1;
                value
            }
            '\'' | '"' => self.parse_string().map(Value::String),
            c if c == '-' || c == '+' || c == '.' || c.is_ascii_digit() => self.parse_number(),
            c if c.is_alphabetic() => self.parse_keyword(),
            _ => None,
        }
    }

    fn parse_dict(&mut self) -> Option<Value> {
        self.expect('{')?;
        let mut map = Map::new();
        loop {
            self.skip_whitespace();
            if self.chars.peek() == Some(&'}') {
                self.chars.next();
                return Some(Value::Object(map));
            }

            let key = match self.parse_value()? {
                Value::String(key) => key,
                Value::Number(n) => n.to_string(),
                _ => return None,
            };
            self.expect(':')?;
            let value = self.parse_value()?;
            map.insert(key, value);

            self.skip_whitespace();
            match self.chars.next()? {
                ',' => continue,
                '}' => return Some(Value::Object(map)),
                _ => return None,
            }
        }
    }

    fn parse_sequence(&mut self, open: char, close: char) -> Option<Value> {
        self.expect(open)?;
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            if self.chars.peek() == Some(&close) {
                self.chars.next();
                return Some(Value::Array(items));
            }

            items.push(self.parse_value()?);

            self.skip_whitespace();
            match self.chars.next()? {
                ',' => continue,
                c if c == close => return Some(Value::Array(items)),
                _ => return None,
            }
        }
    }

    fn parse_string(&mut self) -> Option<String> {
        let quote = self.chars.next()?;
        let mut out = String::new();
        loop {
            match self.chars.next()? {
                c if c == quote => return Some(out),
                '\\' => match self.chars.next()? {
                    'n' => out.push('\n'),
                    't' => out.push('\t'),
                    'r' => out.push('\r'),
                    '0' => out.push('\0'),
                    'u' => {
                        let code: String = (0..4).map(|_| self.chars.next()).collect::<Option<_>>()?;
                        out.push(char::from_u32(u32::from_str_radix(&code, 16).ok()?)?);
                    }
                    '\n' => {}
                    other => out.push(other),
                },
                c => out.push(c),
            }
        }
    }

    fn parse_number(&mut self) -> Option<Value> {
        let mut text = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E' | '_') {
                if c != '_' {
                    text.push(c);
                }
                self.chars.next();
            } else {
                break;
            }
        }

        if let Ok(int) = text.parse::<i64>() {
            return Some(Value::Number(int.into()));
        }
        let float = text.parse::<f64>().ok()?;
        Number::from_f64(float).map(Value::Number)
    }

    fn parse_keyword(&mut self) -> Option<Value> {
        let mut word = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' {
                word.push(c);
                self.chars.next();
            } else {
                break;
            }
        }

        match word.as_str() {
            "True" | "true" => Some(Value::Bool(true)),
            "False" | "false" => Some(Value::Bool(false)),
            "None" | "null" => Some(Value::Null),
            _ => None,
        }
    }
}
