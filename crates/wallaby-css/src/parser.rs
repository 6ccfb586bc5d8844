//! Style sheet parsing.
//!
//! A hand-rolled cursor parser: rules are `selector-chain { declaration* }`
//! and a declaration is `property : value ;`. Parsing never fails to the
//! caller; malformed pieces are skipped by scanning forward to the next
//! resynchronization character (`;` inside a block, `}` outside). The worst
//! case for unparseable input is an empty or partial rule list.

use std::collections::HashMap;

use thiserror::Error;

use crate::selector::Selector;

/// A parsed style rule: a selector paired with its declarations.
#[derive(Debug, Clone)]
pub struct Rule {
    /// What the rule applies to.
    pub selector: Selector,
    /// Property name (lowercased) to raw value string.
    pub declarations: HashMap<String, String>,
}

/// Local, catchable parse failure.
///
/// Never escapes the crate: every public entry point catches these and
/// resynchronizes.
#[derive(Debug, Error)]
pub enum ParseError {
    /// `word()` consumed zero characters.
    #[error("expected a word at offset {offset}")]
    Stuck {
        /// Cursor position where the word was expected.
        offset: usize,
    },
    /// A required literal character was missing.
    #[error("expected '{expected}' at offset {offset}")]
    ExpectedLiteral {
        /// The character that was required.
        expected: char,
        /// Cursor position where it was required.
        offset: usize,
    },
}

/// Cursor-driven parser over sheet or declaration text.
pub struct SheetParser {
    chars: Vec<char>,
    pos: usize,
}

impl SheetParser {
    /// Create a parser over rule-sheet or declaration text.
    #[must_use]
    pub fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
        }
    }

    fn whitespace(&mut self) {
        while self.pos < self.chars.len() && self.chars[self.pos].is_whitespace() {
            self.pos += 1;
        }
    }

    fn literal(&mut self, expected: char) -> Result<(), ParseError> {
        if self.pos < self.chars.len() && self.chars[self.pos] == expected {
            self.pos += 1;
            Ok(())
        } else {
            Err(ParseError::ExpectedLiteral {
                expected,
                offset: self.pos,
            })
        }
    }

    /// Consume a maximal run of word characters (alphanumerics plus
    /// `#-.%`). Fails if the run is empty; callers use the failure to
    /// resynchronize.
    fn word(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        while self.pos < self.chars.len() {
            let ch = self.chars[self.pos];
            if ch.is_alphanumeric() || "#-.%".contains(ch) {
                self.pos += 1;
            } else {
                break;
            }
        }
        if self.pos == start {
            return Err(ParseError::Stuck { offset: start });
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    /// Parse one `property : value` pair, property lowercased.
    fn pair(&mut self) -> Result<(String, String), ParseError> {
        let prop = self.word()?;
        self.whitespace();
        self.literal(':')?;
        self.whitespace();
        let val = self.word()?;
        Ok((prop.to_ascii_lowercase(), val))
    }

    /// Skip forward to the next occurrence of any character in `chars`,
    /// returning which one stopped the scan (without consuming it).
    fn ignore_until(&mut self, chars: &[char]) -> Option<char> {
        while self.pos < self.chars.len() {
            let ch = self.chars[self.pos];
            if chars.contains(&ch) {
                return Some(ch);
            }
            self.pos += 1;
        }
        None
    }

    /// Parse a run of declarations (the inside of a rule block, or an
    /// inline `style` attribute). Malformed declarations are skipped up to
    /// the next `;`; a `}` or end of input stops the scan.
    pub fn parse_declarations(&mut self) -> HashMap<String, String> {
        let mut pairs = HashMap::new();
        while self.pos < self.chars.len() {
            match self.pair() {
                Ok((prop, val)) => {
                    let _ = pairs.insert(prop, val);
                    self.whitespace();
                    if self.literal(';').is_ok() {
                        self.whitespace();
                    } else if !self.resync_declaration() {
                        break;
                    }
                }
                Err(_) => {
                    if !self.resync_declaration() {
                        break;
                    }
                }
            }
        }
        pairs
    }

    /// Skip a malformed declaration. Returns false when the block (or the
    /// input) ended instead.
    fn resync_declaration(&mut self) -> bool {
        if self.ignore_until(&[';', '}']) == Some(';') {
            let _ = self.literal(';');
            self.whitespace();
            true
        } else {
            false
        }
    }

    /// Parse a whitespace-separated selector chain, folding the tag words
    /// left-to-right into nested descendant selectors.
    fn selector(&mut self) -> Result<Selector, ParseError> {
        let mut out = Selector::Tag(self.word()?.to_ascii_lowercase());
        self.whitespace();
        while self.pos < self.chars.len() && self.chars[self.pos] != '{' {
            let tag = self.word()?;
            out = Selector::Descendant(
                Box::new(out),
                Box::new(Selector::Tag(tag.to_ascii_lowercase())),
            );
            self.whitespace();
        }
        Ok(out)
    }

    fn rule(&mut self) -> Result<Rule, ParseError> {
        let selector = self.selector()?;
        self.literal('{')?;
        self.whitespace();
        let declarations = self.parse_declarations();
        self.literal('}')?;
        Ok(Rule {
            selector,
            declarations,
        })
    }

    /// Parse a whole sheet into rules, in source order.
    ///
    /// A malformed rule is skipped by scanning to its closing `}`; nothing
    /// is ever surfaced to the caller as an error.
    pub fn parse_rules(&mut self) -> Vec<Rule> {
        let mut rules = Vec::new();
        while self.pos < self.chars.len() {
            self.whitespace();
            if self.pos >= self.chars.len() {
                break;
            }
            match self.rule() {
                Ok(rule) => rules.push(rule),
                Err(err) => {
                    wallaby_common::warn_once("CSS", &format!("skipped malformed rule: {err}"));
                    if self.ignore_until(&['}']) == Some('}') {
                        let _ = self.literal('}');
                        self.whitespace();
                    } else {
                        break;
                    }
                }
            }
        }
        rules
    }
}
