//! Tokenizer and parser for access-requirement strings:
//!
//! ```text
//! requirement := level ( '|' statement )*
//! statement   := 'Effect' ':' value ';' 'Resource' ':' list ';' 'Source' ':' list
//! list        := value ( ',' value )*
//! ```
//!
//! Values are trimmed. Positions in errors are byte offsets into the input.

use crate::domain::model::Effect;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Text(String),
    Pipe,
    Semicolon,
    Colon,
    Comma,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Text(text) => write!(f, "'{}'", text),
            TokenKind::Pipe => f.write_str("'|'"),
            TokenKind::Semicolon => f.write_str("';'"),
            TokenKind::Colon => f.write_str("':'"),
            TokenKind::Comma => f.write_str("','"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub position: usize,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementDefinition {
    pub effect: Effect,
    pub resources: Vec<String>,
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRequirement {
    pub access_level: String,
    pub statements: Vec<StatementDefinition>,
}

/// Splits on the delimiters `| ; : ,`. Whitespace-only text between
/// delimiters produces no token.
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut text_start = 0;

    let flush = |tokens: &mut Vec<Token>, start: usize, end: usize| {
        let raw = &input[start..end];
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            let leading = raw.len() - raw.trim_start().len();
            tokens.push(Token {
                kind: TokenKind::Text(trimmed.to_string()),
                offset: start + leading,
            });
        }
    };

    for (offset, ch) in input.char_indices() {
        let kind = match ch {
            '|' => TokenKind::Pipe,
            ';' => TokenKind::Semicolon,
            ':' => TokenKind::Colon,
            ',' => TokenKind::Comma,
            _ => continue,
        };
        flush(&mut tokens, text_start, offset);
        tokens.push(Token { kind, offset });
        text_start = offset + ch.len_utf8();
    }
    flush(&mut tokens, text_start, input.len());

    tokens
}

pub fn parse(input: &str) -> Result<ParsedRequirement, SyntaxError> {
    Parser {
        tokens: tokenize(input),
        pos: 0,
        end: input.len(),
    }
    .requirement()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    end: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn error(&self, expected: &str) -> SyntaxError {
        match self.peek() {
            Some(token) => SyntaxError {
                position: token.offset,
                reason: format!("expected {}, found {}", expected, token.kind),
            },
            None => SyntaxError {
                position: self.end,
                reason: format!("expected {}, found end of input", expected),
            },
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<(), SyntaxError> {
        match self.peek() {
            Some(token) if token.kind == kind => {
                self.pos += 1;
                Ok(())
            }
            _ => Err(self.error(expected)),
        }
    }

    fn text(&mut self, expected: &str) -> Result<(String, usize), SyntaxError> {
        match self.peek() {
            Some(Token {
                kind: TokenKind::Text(text),
                offset,
            }) => {
                let found = (text.clone(), *offset);
                self.pos += 1;
                Ok(found)
            }
            _ => Err(self.error(expected)),
        }
    }

    fn requirement(&mut self) -> Result<ParsedRequirement, SyntaxError> {
        let (access_level, _) = self.text("access level")?;

        let mut statements = Vec::new();
        while self.peek().is_some() {
            self.expect(TokenKind::Pipe, "'|'")?;
            statements.push(self.statement()?);
        }

        Ok(ParsedRequirement {
            access_level,
            statements,
        })
    }

    fn statement(&mut self) -> Result<StatementDefinition, SyntaxError> {
        self.field_key("Effect")?;
        let (raw_effect, effect_offset) = self.text("effect value")?;
        let effect = if raw_effect.contains("Deny") {
            Effect::Deny
        } else if raw_effect == "Allow" {
            Effect::Allow
        } else {
            return Err(SyntaxError {
                position: effect_offset,
                reason: format!("unknown effect '{}'", raw_effect),
            });
        };

        self.expect(TokenKind::Semicolon, "';'")?;
        self.field_key("Resource")?;
        let resources = self.list("resource name")?;

        self.expect(TokenKind::Semicolon, "';'")?;
        self.field_key("Source")?;
        let sources = self.list("source system")?;

        Ok(StatementDefinition {
            effect,
            resources,
            sources,
        })
    }

    fn field_key(&mut self, name: &str) -> Result<(), SyntaxError> {
        let expected = format!("field '{}'", name);
        match self.peek() {
            Some(Token {
                kind: TokenKind::Text(text),
                ..
            }) if text == name => {
                self.pos += 1;
                self.expect(TokenKind::Colon, "':'")
            }
            _ => Err(self.error(&expected)),
        }
    }

    fn list(&mut self, item: &str) -> Result<Vec<String>, SyntaxError> {
        let mut values = vec![self.text(item)?.0];
        while matches!(self.peek(), Some(Token { kind: TokenKind::Comma, .. })) {
            self.pos += 1;
            values.push(self.text(item)?.0);
        }
        Ok(values)
    }
}
