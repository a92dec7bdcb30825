//! Token and block source.
//!
//! The builder pulls configuration lines through [`BlockSource`]. Lines arrive
//! already split into fields; free-form sub-blocks are read raw and
//! re-tokenized by the builder itself.
//!
//! [`TextSource`] is the in-memory implementation used for files and tests.
//!
//! Tokenizer rules:
//! - whitespace separates fields
//! - `!` and `#` start a comment outside quotes
//! - a double-quoted string is one field, without the quotes
//! - `{` and `}` are fields of their own even without surrounding spaces

/// Literal that closes a block
pub const EOB: &str = "}";

/// Literal that opens a block
pub const BOB: &str = "{";

/// A keyword line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenLine {
    /// Ordered fields; field 0 is the keyword
    pub fields: Vec<String>,
    /// The line ended with `{`, which has been removed from `fields`
    pub opens_block: bool,
}

/// Result of pulling the next keyword line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Tokens(TokenLine),
    EndOfBlock,
    EndOfFile,
}

/// Supplier of configuration lines.
///
/// Implementations must deliver lines in file order. The builder relies on
/// well-formed nesting: every block opener is matched by exactly one `}` at
/// the same level.
pub trait BlockSource {
    /// Next non-empty keyword line, or a block/file terminator.
    fn next_line_tokens(&mut self) -> Line;

    /// Discard everything up to and including the `}` closing the block
    /// opened by the line last returned from [`next_line_tokens`], whether
    /// the `{` ended that line or stands alone on the next one.
    ///
    /// Returns false, consuming nothing, when no block follows.
    ///
    /// [`next_line_tokens`]: BlockSource::next_line_tokens
    fn skip_to_block_end(&mut self) -> bool;

    /// Next raw line, untokenized. `None` at end of input.
    fn pull_raw_line(&mut self) -> Option<String>;
}

/// Split one line into fields.
pub fn tokenize(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut chars = line.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            '!' | '#' => break,
            c if c.is_whitespace() => {
                chars.next();
            }
            '{' | '}' => {
                fields.push(c.to_string());
                chars.next();
            }
            '"' => {
                chars.next();
                let mut quoted = String::new();
                for c in chars.by_ref() {
                    if c == '"' {
                        break;
                    }
                    quoted.push(c);
                }
                fields.push(quoted);
            }
            _ => {
                let mut word = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() || matches!(c, '{' | '}' | '"' | '!' | '#') {
                        break;
                    }
                    word.push(c);
                    chars.next();
                }
                fields.push(word);
            }
        }
    }

    fields
}

/// Configuration text held in memory
#[derive(Debug, Clone)]
pub struct TextSource {
    lines: Vec<String>,
    cursor: usize,
    last_opened: bool,
}

impl TextSource {
    pub fn new(text: &str) -> Self {
        Self {
            lines: text.lines().map(str::to_owned).collect(),
            cursor: 0,
            last_opened: false,
        }
    }

    fn raw_next(&mut self) -> Option<String> {
        let line = self.lines.get(self.cursor)?.clone();
        self.cursor += 1;
        Some(line)
    }

    /// Next line that carries at least one field
    fn peek_fields(&self) -> Option<Vec<String>> {
        self.lines[self.cursor..]
            .iter()
            .map(|l| tokenize(l))
            .find(|fields| !fields.is_empty())
    }
}

impl BlockSource for TextSource {
    fn next_line_tokens(&mut self) -> Line {
        loop {
            let Some(raw) = self.raw_next() else {
                self.last_opened = false;
                return Line::EndOfFile;
            };
            let mut fields = tokenize(&raw);

            match fields.first().map(String::as_str) {
                None => continue,
                // Opening brace on its own line belongs to the previous keyword
                Some(BOB) if fields.len() == 1 => continue,
                Some(EOB) => {
                    self.last_opened = false;
                    return Line::EndOfBlock;
                }
                Some(_) => {}
            }

            let opens_block = fields.last().map(String::as_str) == Some(BOB);
            if opens_block {
                fields.pop();
            }
            self.last_opened = opens_block;
            return Line::Tokens(TokenLine {
                fields,
                opens_block,
            });
        }
    }

    fn skip_to_block_end(&mut self) -> bool {
        let mut depth: usize = if self.last_opened {
            1
        } else {
            // Brace on the following line, or no block at all
            match self.peek_fields() {
                Some(fields) if fields.first().map(String::as_str) == Some(BOB) => 0,
                _ => return false,
            }
        };
        let mut opened = self.last_opened;
        self.last_opened = false;

        while let Some(raw) = self.raw_next() {
            for field in tokenize(&raw) {
                match field.as_str() {
                    BOB => {
                        depth += 1;
                        opened = true;
                    }
                    EOB => depth = depth.saturating_sub(1),
                    _ => {}
                }
            }
            if opened && depth == 0 {
                break;
            }
        }
        true
    }

    fn pull_raw_line(&mut self) -> Option<String> {
        self.last_opened = false;
        self.raw_next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(line: &str) -> Vec<String> {
        tokenize(line)
    }

    #[test]
    fn test_tokenize_words_and_braces() {
        assert_eq!(fields("vrrp_instance VI_1 {"), vec!["vrrp_instance", "VI_1", "{"]);
        assert_eq!(fields("auth{"), vec!["auth", "{"]);
        assert_eq!(fields("   }"), vec!["}"]);
        assert!(fields("   ").is_empty());
    }

    #[test]
    fn test_tokenize_comments_and_quotes() {
        assert_eq!(fields("priority 100 # comment"), vec!["priority", "100"]);
        assert_eq!(fields("! whole line"), Vec::<String>::new());
        assert_eq!(
            fields(r#"notify_master "/usr/bin/notify master # really""#),
            vec!["notify_master", "/usr/bin/notify master # really"]
        );
    }

    #[test]
    fn test_next_line_tokens_marks_blocks() {
        let mut src = TextSource::new("vrrp_instance VI_1 {\n\n  priority 100\n}\n");
        assert_eq!(
            src.next_line_tokens(),
            Line::Tokens(TokenLine {
                fields: vec!["vrrp_instance".into(), "VI_1".into()],
                opens_block: true,
            })
        );
        assert_eq!(
            src.next_line_tokens(),
            Line::Tokens(TokenLine {
                fields: vec!["priority".into(), "100".into()],
                opens_block: false,
            })
        );
        assert_eq!(src.next_line_tokens(), Line::EndOfBlock);
        assert_eq!(src.next_line_tokens(), Line::EndOfFile);
    }

    #[test]
    fn test_skip_nested_block() {
        let text = "\
vrrp_instance VI_1 {
  authentication {
    auth_pass x
  }
  priority 1
}
vrrp_script chk {
}";
        let mut src = TextSource::new(text);
        assert!(matches!(src.next_line_tokens(), Line::Tokens(_)));
        src.skip_to_block_end();
        match src.next_line_tokens() {
            Line::Tokens(line) => assert_eq!(line.fields[0], "vrrp_script"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_skip_with_brace_on_next_line() {
        let mut src = TextSource::new("vrrp_sync_group\n{\n group {\n a\n }\n}\nvrrp_script s\n");
        assert!(matches!(src.next_line_tokens(), Line::Tokens(_)));
        assert!(src.skip_to_block_end());
        match src.next_line_tokens() {
            Line::Tokens(line) => assert_eq!(line.fields, vec!["vrrp_script", "s"]),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_skip_without_block_is_noop() {
        let mut src = TextSource::new("nopreempt\npriority 5\n");
        assert!(matches!(src.next_line_tokens(), Line::Tokens(_)));
        assert!(!src.skip_to_block_end());
        match src.next_line_tokens() {
            Line::Tokens(line) => assert_eq!(line.fields[0], "priority"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_pull_raw_line() {
        let mut src = TextSource::new("a b\n}\n");
        assert_eq!(src.pull_raw_line().as_deref(), Some("a b"));
        assert_eq!(src.pull_raw_line().as_deref(), Some("}"));
        assert_eq!(src.pull_raw_line(), None);
    }
}
