use std::{path::Path, rc::Rc};

use crate::rdl::Diagnostics;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Ident(String),
    Number(String),
    Str(String),
    Punct(char),
    /// The `` `include `` directive. The path string follows as the next token.
    Include,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub file: Rc<Path>,
}

impl Token {
    pub fn is_punct(&self, c: char) -> bool {
        self.kind == TokenKind::Punct(c)
    }

    pub fn ident(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Ident(name) => Some(name),
            _ => None,
        }
    }
}

/// Splits SystemRDL source into tokens.
///
/// Lexing never stops early: problems are reported to `diagnostics` and the
/// remaining input is still scanned, so one pass surfaces every error.
pub struct Lexer<'a> {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    file: Rc<Path>,
    diagnostics: &'a mut Diagnostics,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &str, file: &Path, diagnostics: &'a mut Diagnostics) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            file: Rc::from(file),
            diagnostics,
        }
    }

    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        while let Some(c) = self.peek(0) {
            let line = self.line;
            match c {
                '\n' => {
                    self.line += 1;
                    self.pos += 1;
                }
                c if c.is_whitespace() => self.pos += 1,
                '/' if self.peek(1) == Some('/') => self.skip_line(),
                '/' if self.peek(1) == Some('*') => self.skip_block_comment(),
                '<' if self.peek(1) == Some('%') => self.skip_embedded_perl(),
                '"' => {
                    if let Some(text) = self.string() {
                        tokens.push(Token {
                            kind: TokenKind::Str(text),
                            line,
                            file: Rc::clone(&self.file),
                        });
                    }
                }
                '`' => {
                    if let Some(kind) = self.directive() {
                        tokens.push(Token {
                            kind,
                            line,
                            file: Rc::clone(&self.file),
                        });
                    }
                }
                c if c.is_ascii_alphabetic() || c == '_' || c == '\\' => {
                    if c == '\\' {
                        self.pos += 1;
                    }
                    let name = self.take_while(|c| c.is_ascii_alphanumeric() || c == '_');
                    tokens.push(Token {
                        kind: TokenKind::Ident(name),
                        line,
                        file: Rc::clone(&self.file),
                    });
                }
                c if c.is_ascii_digit() || c == '\'' => {
                    let number =
                        self.take_while(|c| c.is_ascii_alphanumeric() || c == '_' || c == '\'');
                    tokens.push(Token {
                        kind: TokenKind::Number(number),
                        line,
                        file: Rc::clone(&self.file),
                    });
                }
                c => {
                    self.pos += 1;
                    tokens.push(Token {
                        kind: TokenKind::Punct(c),
                        line,
                        file: Rc::clone(&self.file),
                    });
                }
            }
        }

        tokens
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let start = self.pos;
        while let Some(c) = self.peek(0) {
            if !pred(c) {
                break;
            }
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn skip_line(&mut self) {
        while let Some(c) = self.peek(0) {
            if c == '\n' {
                break;
            }
            self.pos += 1;
        }
    }

    fn skip_block_comment(&mut self) {
        let start_line = self.line;
        self.pos += 2;
        loop {
            match self.peek(0) {
                None => {
                    self.diagnostics
                        .error(&self.file, start_line, "unterminated block comment");
                    return;
                }
                Some('*') if self.peek(1) == Some('/') => {
                    self.pos += 2;
                    return;
                }
                Some('\n') => {
                    self.line += 1;
                    self.pos += 1;
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    fn skip_embedded_perl(&mut self) {
        let start_line = self.line;
        self.diagnostics.warning(
            &self.file,
            start_line,
            "embedded Perl preprocessing is not supported; block ignored",
        );
        self.pos += 2;
        loop {
            match self.peek(0) {
                None => {
                    self.diagnostics
                        .error(&self.file, start_line, "unterminated '<%' block");
                    return;
                }
                Some('%') if self.peek(1) == Some('>') => {
                    self.pos += 2;
                    return;
                }
                Some('\n') => {
                    self.line += 1;
                    self.pos += 1;
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    fn string(&mut self) -> Option<String> {
        let start_line = self.line;
        let mut text = String::new();
        self.pos += 1;
        loop {
            match self.peek(0) {
                None => {
                    self.diagnostics
                        .error(&self.file, start_line, "unterminated string literal");
                    return None;
                }
                Some('"') => {
                    self.pos += 1;
                    return Some(text);
                }
                Some('\\') => {
                    if let Some(escaped) = self.peek(1) {
                        if escaped == '\n' {
                            self.line += 1;
                        }
                        text.push(escaped);
                    }
                    self.pos += 2;
                }
                Some(c) => {
                    if c == '\n' {
                        self.line += 1;
                    }
                    text.push(c);
                    self.pos += 1;
                }
            }
        }
    }

    fn directive(&mut self) -> Option<TokenKind> {
        self.pos += 1;
        let name = self.take_while(|c| c.is_ascii_alphanumeric() || c == '_');
        if name == "include" {
            return Some(TokenKind::Include);
        }

        if name.is_empty() {
            self.diagnostics
                .error(&self.file, self.line, "stray '`' in source");
        } else {
            self.diagnostics.warning(
                &self.file,
                self.line,
                format!("preprocessor directive '`{}' is not supported; line ignored", name),
            );
        }
        self.skip_line();
        None
    }
}
