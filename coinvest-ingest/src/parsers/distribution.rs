//! Distribution cell parser.
//!
//! Ledger cells hold mapping literals typed by hand, sometimes strict JSON
//! (`{"harsh": 3.4}`) and often not (`{Harsh: 3.4, Aish: 0.6}`). Strict JSON
//! is tried first; anything else goes through a small literal grammar:
//!
//!   map   := '{' (entry (',' entry)* ','?)? '}'
//!   entry := key ':' value
//!   key   := bareword | quoted
//!   value := number | quoted number

use coinvest_core::{Distribution, LedgerError, Result};

/// Parse a distribution cell. Keys are lowercased; non-positive amounts dropped.
pub fn parse_distribution(cell: &str) -> Result<Distribution> {
    let text = cell.trim().to_lowercase();
    if let Some(d) = parse_strict_json(&text) {
        return Ok(d);
    }
    LiteralParser::new(&text)
        .parse_map()
        .map(Distribution::from_entries)
        .map_err(|reason| LedgerError::format(format!("unreadable distribution '{}': {reason}", cell.trim())))
}

fn parse_strict_json(text: &str) -> Option<Distribution> {
    let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(text).ok()?;
    let entries = map
        .into_iter()
        .map(|(k, v)| v.as_f64().map(|amount| (k, amount)))
        .collect::<Option<Vec<_>>>()?;
    Some(Distribution::from_entries(entries))
}

struct LiteralParser {
    chars: Vec<char>,
    pos: usize,
}

impl LiteralParser {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, want: char) -> std::result::Result<(), String> {
        self.skip_ws();
        match self.peek() {
            Some(c) if c == want => {
                self.pos += 1;
                Ok(())
            }
            Some(c) => Err(format!("expected '{want}' at position {}, found '{c}'", self.pos)),
            None => Err(format!("expected '{want}', found end of input")),
        }
    }

    fn parse_map(&mut self) -> std::result::Result<Vec<(String, f64)>, String> {
        let mut entries = Vec::new();
        self.expect('{')?;
        loop {
            self.skip_ws();
            if self.peek() == Some('}') {
                self.pos += 1;
                break;
            }
            let key = self.parse_key()?;
            self.expect(':')?;
            let value = self.parse_value()?;
            entries.push((key, value));

            self.skip_ws();
            match self.peek() {
                Some(',') => self.pos += 1,
                Some('}') => {
                    self.pos += 1;
                    break;
                }
                Some(c) => return Err(format!("unexpected '{c}' at position {}", self.pos)),
                None => return Err("unterminated mapping".to_string()),
            }
        }
        self.skip_ws();
        if self.pos != self.chars.len() {
            return Err(format!("trailing text at position {}", self.pos));
        }
        Ok(entries)
    }

    fn parse_quoted(&mut self) -> std::result::Result<String, String> {
        let quote = self.peek().ok_or("expected quoted text")?;
        self.pos += 1;
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == quote {
                let s: String = self.chars[start..self.pos].iter().collect();
                self.pos += 1;
                return Ok(s);
            }
            self.pos += 1;
        }
        Err("unterminated quoted text".to_string())
    }

    fn parse_key(&mut self) -> std::result::Result<String, String> {
        self.skip_ws();
        match self.peek() {
            Some('"') | Some('\'') => self.parse_quoted(),
            Some(c) if c.is_alphanumeric() || c == '_' => {
                let start = self.pos;
                while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
                    self.pos += 1;
                }
                Ok(self.chars[start..self.pos].iter().collect())
            }
            Some(c) => Err(format!("expected a name at position {}, found '{c}'", self.pos)),
            None => Err("expected a name, found end of input".to_string()),
        }
    }

    fn parse_value(&mut self) -> std::result::Result<f64, String> {
        self.skip_ws();
        let raw = match self.peek() {
            Some('"') | Some('\'') => self.parse_quoted()?,
            _ => {
                let start = self.pos;
                while self
                    .peek()
                    .is_some_and(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | '_'))
                {
                    self.pos += 1;
                }
                self.chars[start..self.pos].iter().collect()
            }
        };
        let cleaned = raw.trim().replace('_', "");
        cleaned
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| format!("'{raw}' is not a number"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_json() {
        let d = parse_distribution(r#"{"Harsh": 3.4, "aish": 0.6}"#).unwrap();
        assert_eq!(d.get("harsh"), Some(3.4));
        assert_eq!(d.get("aish"), Some(0.6));
    }

    #[test]
    fn test_bare_keys_and_zero_dropped() {
        let d = parse_distribution("{Harsh: 0.3, Aish: 0}").unwrap();
        assert_eq!(d.len(), 1);
        assert_eq!(d.get("harsh"), Some(0.3));
        assert_eq!(d.canonical_json().unwrap(), r#"{"harsh": 0.3}"#);
    }

    #[test]
    fn test_integers_quoted_values_trailing_comma() {
        let d = parse_distribution("{harsh: 46, 'aish': \"1.5\",}").unwrap();
        assert_eq!(d.get("harsh"), Some(46.0));
        assert_eq!(d.get("aish"), Some(1.5));
    }

    #[test]
    fn test_empty_mapping() {
        assert!(parse_distribution("{}").unwrap().is_empty());
        assert!(parse_distribution("{ }").unwrap().is_empty());
    }

    #[test]
    fn test_sorted_by_name() {
        let d = parse_distribution("{zed: 1, Aish: 2, harsh: 3}").unwrap();
        let names: Vec<_> = d.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(names, vec!["aish", "harsh", "zed"]);
    }

    #[test]
    fn test_rejects_garbage() {
        for bad in ["", "harsh: 3", "{harsh 3}", "{harsh: abc}", "{harsh: 1", "{harsh: 1} extra", "{__import__('os'): 1}"] {
            assert!(
                matches!(parse_distribution(bad), Err(LedgerError::Format(_))),
                "accepted {bad:?}"
            );
        }
    }
}
