//! Single-pass textual repair of near-JSON produced by language models.
//!
//! The scanner is a three-state machine. Transitions:
//!
//! | State      | Input                                          | Action                                   | Next       |
//! |------------|------------------------------------------------|------------------------------------------|------------|
//! | `Normal`   | `"` `{` `[`                                    | insert `,` if a value just ended; emit   | `InString` for `"`, else `Normal` |
//! | `Normal`   | `}` `]`                                        | drop a trailing `,`; close inner containers left open; emit | `Normal` |
//! | `Normal`   | other control character                        | drop                                     | `Normal`   |
//! | `InString` | `\`                                            | hold                                     | `Escaped`  |
//! | `InString` | `"` followed by `:` `,` `}` `]` or the end     | emit                                     | `Normal`   |
//! | `InString` | `"` followed by a quote that opens a string    | emit                                     | `Normal`   |
//! | `InString` | any other `"`                                  | emit `\"`                                | `InString` |
//! | `InString` | newline, carriage return, tab, control char    | emit the escaped form                    | `InString` |
//! | `Escaped`  | `"` `\` `/` `b` `f` `n` `r` `t`, `u` + 4 hex   | emit `\` and the character               | `InString` |
//! | `Escaped`  | anything else                                  | drop the backslash, reprocess the char   | `InString` |
//!
//! At the end of the text an open string is closed and every container still
//! open is closed in order.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Normal,
    InString,
    Escaped,
}

/// Repair `text` so that a strict JSON parser has a chance to accept it.
///
/// Valid JSON comes back unchanged.
pub fn repair(text: &str) -> String {
    let mut scanner = Scanner::new(text);
    scanner.run();
    scanner.finish()
}

struct Scanner {
    chars: Vec<char>,
    pos: usize,
    state: State,
    out: String,
    /// Byte offset in `out` and value of the last non-whitespace character
    /// emitted outside a string, closing quotes included.
    last_token: Option<(usize, char)>,
    /// Closers for the containers currently open, innermost last.
    open: Vec<char>,
}

impl Scanner {
    fn new(text: &str) -> Self {
        Scanner {
            chars: text.chars().collect(),
            pos: 0,
            state: State::Normal,
            out: String::with_capacity(text.len() + 16),
            last_token: None,
            open: Vec::new(),
        }
    }

    fn run(&mut self) {
        while let Some(&c) = self.chars.get(self.pos) {
            match self.state {
                State::Normal => self.normal(c),
                State::InString => self.in_string(c),
                State::Escaped => self.escaped(c),
            }
        }
    }

    fn finish(mut self) -> String {
        if self.state != State::Normal {
            self.emit_token('"');
        }
        while let Some(closer) = self.open.pop() {
            self.drop_trailing_comma();
            self.emit_token(closer);
        }
        self.out
    }

    fn normal(&mut self, c: char) {
        match c {
            '"' => {
                self.insert_missing_comma();
                // Opening quotes are not tokens: only the closing one ends a value.
                self.out.push(c);
                self.state = State::InString;
            }
            '{' | '[' => {
                self.insert_missing_comma();
                self.emit_token(c);
                self.open.push(if c == '{' { '}' } else { ']' });
            }
            '}' | ']' => self.close(c),
            c if c.is_whitespace() => self.out.push(c),
            c if c.is_control() => {}
            c => self.emit_token(c),
        }
        self.pos += 1;
    }

    fn in_string(&mut self, c: char) {
        match c {
            '\\' => self.state = State::Escaped,
            '"' => {
                if self.quote_closes_string() {
                    self.emit_token('"');
                    self.state = State::Normal;
                } else {
                    self.out.push_str("\\\"");
                }
            }
            '\n' => self.out.push_str("\\n"),
            '\r' => {
                if self.chars.get(self.pos + 1) != Some(&'\n') {
                    self.out.push_str("\\n");
                }
            }
            '\t' => self.out.push_str("\\t"),
            c if c.is_control() => self.out.push_str(&format!("\\u{:04x}", c as u32)),
            c => self.out.push(c),
        }
        self.pos += 1;
    }

    fn escaped(&mut self, c: char) {
        self.state = State::InString;
        match c {
            '"' | '\\' | '/' | 'b' | 'f' | 'n' | 'r' | 't' => {
                self.out.push('\\');
                self.out.push(c);
                self.pos += 1;
            }
            'u' if self.hex_escape_follows() => {
                self.out.push_str("\\u");
                self.pos += 1;
            }
            // Stray backslash: dropped, the character is handled as plain string content.
            _ => {}
        }
    }

    /// A quote inside a string ends it only when what follows can come after a
    /// string value or key.
    ///
    /// When another quote follows, this one closes the string only if that
    /// next quote opens a new string. If the next quote is itself followed by
    /// `:` `,` `}` `]` or the end, it is the real closer and this one is
    /// content, as in `"Say "cheese""`.
    fn quote_closes_string(&self) -> bool {
        match self.next_significant(self.pos + 1) {
            None => true,
            Some((_, ':' | ',' | '}' | ']')) => true,
            Some((idx, '"')) => !matches!(
                self.next_significant(idx + 1),
                None | Some((_, ':' | ',' | '}' | ']'))
            ),
            Some(_) => false,
        }
    }

    /// Position and value of the first non-whitespace character at or after
    /// `from`.
    fn next_significant(&self, from: usize) -> Option<(usize, char)> {
        self.chars
            .get(from..)?
            .iter()
            .enumerate()
            .find(|(_, c)| !c.is_whitespace())
            .map(|(offset, c)| (from + offset, *c))
    }

    fn hex_escape_follows(&self) -> bool {
        let digits = self.chars.get(self.pos + 1..self.pos + 5);
        digits.is_some_and(|d| d.iter().all(|c| c.is_ascii_hexdigit()))
    }

    fn close(&mut self, closer: char) {
        if !self.open.contains(&closer) {
            // Stray closer with nothing to close.
            return;
        }
        while let Some(top) = self.open.pop() {
            self.drop_trailing_comma();
            self.emit_token(top);
            if top == closer {
                break;
            }
        }
    }

    /// A value directly followed by the start of another value is missing the
    /// comma between them.
    fn insert_missing_comma(&mut self) {
        let ends_value = matches!(
            self.last_token,
            Some((_, c)) if c == '"' || c == '}' || c == ']' || c.is_ascii_alphanumeric()
        );
        if ends_value {
            self.emit_token(',');
        }
    }

    fn drop_trailing_comma(&mut self) {
        if let Some((idx, ',')) = self.last_token {
            self.out.remove(idx);
            self.last_token = None;
        }
    }

    fn emit_token(&mut self, c: char) {
        self.last_token = Some((self.out.len(), c));
        self.out.push(c);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn parse(text: &str) -> Value {
        serde_json::from_str(&repair(text))
            .unwrap_or_else(|e| panic!("repaired text did not parse: {e}\n{}", repair(text)))
    }

    #[test]
    fn test_valid_json_is_unchanged() {
        let inputs = [
            r#"[{"title":"Dal Rice","time":"20 mins","ingredients":["rice","dal"],"steps":["Cook"],"tips":"Add ghee"}]"#,
            "[\n  {\n    \"title\": \"X\",\n    \"n\": 3, \"ok\": true, \"none\": null\n  }\n]",
            r#"{"a": "tab\tquote\" slash\/ back\\ unié 🍛", "b": [], "c": {}}"#,
            r#"[1.5e3, -2, "", [[]]]"#,
        ];
        for input in inputs {
            assert_eq!(repair(input), input);
            let original: Value = serde_json::from_str(input).unwrap();
            assert_eq!(parse(input), original);
        }
    }

    #[test]
    fn test_escapes_raw_newline_in_string() {
        let text = "[{\"steps\":[\"line1\nline2\"]}]";
        assert_eq!(parse(text), json!([{"steps": ["line1\nline2"]}]));
    }

    #[test]
    fn test_crlf_in_string_becomes_single_newline() {
        let text = "[\"a\r\nb\", \"c\rd\"]";
        assert_eq!(parse(text), json!(["a\nb", "c\nd"]));
    }

    #[test]
    fn test_escapes_control_characters_in_string() {
        let text = "[\"a\tb\u{0007}c\"]";
        assert_eq!(parse(text), json!(["a\tb\u{0007}c"]));
    }

    #[test]
    fn test_escapes_unescaped_inner_quotes() {
        let text = r#"[{"tips":"Use a 5" pan for "extra" crisp","time":"10 mins"}]"#;
        assert_eq!(
            parse(text),
            json!([{"tips": "Use a 5\" pan for \"extra\" crisp", "time": "10 mins"}])
        );
    }

    #[test]
    fn test_drops_stray_backslash() {
        let text = r#"["Heat oil \& add jeera", "50\% done"]"#;
        assert_eq!(parse(text), json!(["Heat oil & add jeera", "50% done"]));
    }

    #[test]
    fn test_bad_unicode_escape_dropped() {
        let text = r#"["\uZZ spice"]"#;
        assert_eq!(parse(text), json!(["uZZ spice"]));
    }

    #[test]
    fn test_inner_quote_at_end_of_value() {
        let text = r#"[{"title":"Say "cheese"","steps":["x"]}]"#;
        assert_eq!(
            parse(text),
            json!([{"title": "Say \"cheese\"", "steps": ["x"]}])
        );
    }

    #[test]
    fn test_inserts_missing_comma_between_strings() {
        let text = r#"{"steps": ["a" "b" ""]}"#;
        assert_eq!(parse(text), json!({"steps": ["a", "b", ""]}));
    }

    #[test]
    fn test_removes_trailing_commas() {
        let text = r#"[{"a": [1, 2, ], "b": "x",}, ]"#;
        assert_eq!(parse(text), json!([{"a": [1, 2], "b": "x"}]));
    }

    #[test]
    fn test_inserts_missing_comma_between_members() {
        let text = r#"[{"title":"x" "time":"y"}]"#;
        assert_eq!(parse(text), json!([{"title": "x", "time": "y"}]));
    }

    #[test]
    fn test_inserts_missing_comma_between_objects_and_arrays() {
        let text = "[{\"a\":[\"x\"] \"b\":2\n\"c\":true}\n{\"d\":null}]";
        assert_eq!(
            parse(text),
            json!([{"a": ["x"], "b": 2, "c": true}, {"d": null}])
        );
    }

    #[test]
    fn test_closes_truncated_output() {
        let text = r#"[{"title":"X","steps":["Boil wat"#;
        assert_eq!(parse(text), json!([{"title": "X", "steps": ["Boil wat"]}]));
    }

    #[test]
    fn test_closes_mismatched_container() {
        let text = r#"[{"title":"X"]"#;
        assert_eq!(parse(text), json!([{"title": "X"}]));
    }

    #[test]
    fn test_ignores_stray_closer() {
        let text = r#"[1, 2]]"#;
        assert_eq!(parse(text), json!([1, 2]));
    }

    #[test]
    fn test_hopeless_text_still_fails_strict_parse() {
        let repaired = repair("Sorry, I cannot help with that.");
        assert!(serde_json::from_str::<Value>(&repaired).is_err());
    }
}
