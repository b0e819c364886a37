use colored::*;
use log::trace;
use std::collections::{HashMap, VecDeque};
use std::fmt::Display;
use thiserror::Error;

// Width of the only indentation unit the language knows
pub const INDENT_WIDTH: usize = 4;

#[derive(Debug, Error, PartialEq)]
pub enum LexerError {
    #[error("{} while tokenizing code, unexpected character {character:?} at line {line}, column {column}.", "Error".bold().red())]
    UnexpectedCharacter {
        character: char,
        line: usize,
        column: usize,
    },

    #[error("{} while tokenizing string starting at line {line}, column {column}: missing closing '\"' before end of line.", "Error".bold().red())]
    UnterminatedString { line: usize, column: usize },
}

impl LexerError {
    pub fn line(&self) -> usize {
        match self {
            LexerError::UnexpectedCharacter { line, .. } => *line,
            LexerError::UnterminatedString { line, .. } => *line,
        }
    }

    pub fn column(&self) -> usize {
        match self {
            LexerError::UnexpectedCharacter { column, .. } => *column,
            LexerError::UnterminatedString { column, .. } => *column,
        }
    }

    pub fn character(&self) -> char {
        match self {
            LexerError::UnexpectedCharacter { character, .. } => *character,
            LexerError::UnterminatedString { .. } => '"',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TokenKind {
    // Literals
    Identifier,
    String,
    Int,
    Bool,

    // Operators
    Equals,
    EqualEqual,

    // Grouping
    OpenBracket,  // [
    CloseBracket, // ]
    Comma,        // ,

    // Layout
    Indent,
    Comment,
    EndLine,
    #[default]
    EOF,
}

// Line and column are 1-based, column counts chars from the line start
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind,
            value: value.into(),
            line,
            column,
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TokenKind::EndLine => write!(f, "Token(EndLine, '\\n')"),
            TokenKind::EOF => write!(f, "Token(EOF)"),
            kind => write!(f, "Token({:?}, '{}')", kind, self.value),
        }
    }
}

// Skip listed char
fn is_skippable(c: char) -> bool {
    matches!(c, ' ' | '\t')
}

#[derive(Default)]
pub struct Lexer {
    pub tokens: VecDeque<Token>,
    reserved_keywords: HashMap<&'static str, TokenKind>,
}

impl Lexer {
    fn generate_keywords(&mut self) {
        self.reserved_keywords.insert("True", TokenKind::Bool);
        self.reserved_keywords.insert("False", TokenKind::Bool);
    }

    pub fn tokenize(&mut self, source_code: String) -> Result<(), LexerError> {
        self.generate_keywords();
        self.tokens.clear();

        let chars = source_code.chars().collect::<Vec<char>>();

        let mut line: usize = 1;
        let mut line_start: usize = 0;
        let mut i: usize = 0;
        // Still inside the leading indent units of the line
        let mut leading = true;

        while i < chars.len() {
            let c = chars[i];
            let column = i - line_start + 1;

            // Indentation is only meaningful before anything else on a line,
            // one token per unit
            if leading && starts_with_indent(&chars[i..]) {
                self.tokens
                    .push_back(Token::new(TokenKind::Indent, " ".repeat(INDENT_WIDTH), line, column));
                i += INDENT_WIDTH;
                continue;
            }
            leading = false;

            if is_skippable(c) {
                i += 1;
                continue;
            }

            match c {
                '[' => self.push_single(TokenKind::OpenBracket, c, line, column),
                ']' => self.push_single(TokenKind::CloseBracket, c, line, column),
                ',' => self.push_single(TokenKind::Comma, c, line, column),
                '=' => {
                    if chars.get(i + 1) == Some(&'=') {
                        self.tokens
                            .push_back(Token::new(TokenKind::EqualEqual, "==", line, column));
                        i += 1;
                    } else {
                        self.push_single(TokenKind::Equals, c, line, column);
                    }
                }
                // Linux new line
                '\n' => {
                    self.push_single(TokenKind::EndLine, c, line, column);
                    line += 1;
                    line_start = i + 1;
                    leading = true;
                }
                // Windows new line, a lone '\r' is just ignored
                '\r' => {
                    if chars.get(i + 1) == Some(&'\n') {
                        self.push_single(TokenKind::EndLine, '\n', line, column);
                        i += 1;
                        line += 1;
                        line_start = i + 1;
                        leading = true;
                    }
                }
                // Comments run until the end of the line
                '#' => {
                    let end = find_line_end(&chars, i);
                    let text = chars[i + 1..end].iter().collect::<String>();
                    self.tokens
                        .push_back(Token::new(TokenKind::Comment, text.trim(), line, column));
                    i = end;
                    continue;
                }
                // Strings keep their quotes, the parser strips them
                '"' => {
                    let end = find_line_end(&chars, i);
                    let close = chars[i + 1..end]
                        .iter()
                        .position(|ch| *ch == '"')
                        .map(|p| i + 1 + p)
                        .ok_or(LexerError::UnterminatedString { line, column })?;

                    let raw = chars[i..=close].iter().collect::<String>();
                    self.tokens
                        .push_back(Token::new(TokenKind::String, raw, line, column));
                    i = close + 1;
                    continue;
                }
                _ => {
                    let next_is_digit = chars.get(i + 1).is_some_and(|n| n.is_ascii_digit());

                    if c.is_ascii_digit() || (c == '-' && next_is_digit) {
                        // Optional sign then digits
                        let mut end = i + 1;
                        while end < chars.len() && chars[end].is_ascii_digit() {
                            end += 1;
                        }

                        let val = chars[i..end].iter().collect::<String>();
                        self.tokens
                            .push_back(Token::new(TokenKind::Int, val, line, column));
                        i = end;
                        continue;
                    } else if c.is_ascii_alphabetic() {
                        // Identifiers are letters only
                        let mut end = i + 1;
                        while end < chars.len() && chars[end].is_ascii_alphabetic() {
                            end += 1;
                        }

                        let val = chars[i..end].iter().collect::<String>();
                        let kind = self
                            .reserved_keywords
                            .get(val.as_str())
                            .copied()
                            .unwrap_or(TokenKind::Identifier);

                        self.tokens.push_back(Token::new(kind, val, line, column));
                        i = end;
                        continue;
                    } else {
                        return Err(LexerError::UnexpectedCharacter {
                            character: c,
                            line,
                            column,
                        });
                    }
                }
            }

            i += 1;
        }

        // We append manualy end of file
        let column = chars.len() - line_start + 1;
        self.tokens
            .push_back(Token::new(TokenKind::EOF, "EOF", line, column));

        trace!("Tokenized {} tokens over {} lines", self.tokens.len(), line);
        Ok(())
    }

    fn push_single(&mut self, kind: TokenKind, c: char, line: usize, column: usize) {
        self.tokens
            .push_back(Token::new(kind, c.to_string(), line, column));
    }
}

fn starts_with_indent(chars: &[char]) -> bool {
    chars.len() >= INDENT_WIDTH && chars[..INDENT_WIDTH].iter().all(|c| *c == ' ')
}

// Index of the '\n' (or '\r\n') ending the line containing `from`, or the input length
fn find_line_end(chars: &[char], from: usize) -> usize {
    let mut end = from;
    while end < chars.len() && chars[end] != '\n' {
        end += 1;
    }

    if end > from && chars.get(end - 1) == Some(&'\r') {
        end - 1
    } else {
        end
    }
}
