use crate::rdl::{
    Component, ComponentKind, Diagnostics, Instance,
    lexer::{Token, TokenKind},
};

const MODIFIERS: &[&str] = &["external", "internal", "abstract"];
const NON_TYPE_KEYWORDS: &[&str] = &["default", "alias", "external", "internal", "abstract"];
/// Deepest component nesting parsed; bodies below it are skipped.
const MAX_NESTING_DEPTH: usize = 64;

#[derive(Debug, Default)]
struct Scope {
    children: Vec<Component>,
    instances: Vec<Instance>,
}

/// Recovers the component structure from a token stream.
///
/// Only definitions and instantiations are interpreted. Property assignments
/// and every other statement are skipped with balanced bracket tracking.
pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
    diagnostics: &'a mut Diagnostics,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token], diagnostics: &'a mut Diagnostics) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
            diagnostics,
        }
    }

    /// Parses the root namespace and returns its definitions in source order.
    pub fn parse(mut self) -> Vec<Component> {
        self.parse_scope(None).children
    }

    fn peek(&self, offset: usize) -> Option<&'a Token> {
        self.tokens.get(self.pos + offset)
    }

    fn parse_scope(&mut self, opened_by: Option<&'a Token>) -> Scope {
        let mut scope = Scope::default();

        loop {
            let Some(token) = self.peek(0) else {
                if let Some(open) = opened_by {
                    self.diagnostics
                        .error(&open.file, open.line, "missing closing '}' for this '{'");
                }
                return scope;
            };

            if token.is_punct('}') {
                self.pos += 1;
                if opened_by.is_some() {
                    return scope;
                }
                self.diagnostics
                    .error(&token.file, token.line, "unmatched '}'");
                continue;
            }

            if token.is_punct(';') {
                self.pos += 1;
                continue;
            }

            if let Some(component) = self.try_definition() {
                scope.children.push(component);
                continue;
            }

            if self.try_instances(&mut scope.instances) {
                continue;
            }

            self.skip_statement();
        }
    }

    fn skip_modifiers(&self, mut offset: usize) -> usize {
        while let Some(name) = self.peek(offset).and_then(Token::ident) {
            if !MODIFIERS.contains(&name) {
                break;
            }
            offset += 1;
        }
        offset
    }

    fn try_definition(&mut self) -> Option<Component> {
        let offset = self.skip_modifiers(0);
        let keyword = self.peek(offset)?;
        let kind = ComponentKind::from_keyword(keyword.ident()?)?;

        let next = self.peek(offset + 1)?;
        let name = if next.is_punct('{') {
            None
        } else {
            let name = next.ident()?;
            let after = self.peek(offset + 2)?;
            if !(after.is_punct('{') || after.is_punct('#')) {
                return None;
            }
            Some(name.to_string())
        };

        self.pos += offset + if name.is_some() { 2 } else { 1 };

        if self.peek(0).is_some_and(|t| t.is_punct('#')) {
            self.pos += 1;
            self.skip_group();
        }

        let Some(open) = self.peek(0).filter(|t| t.is_punct('{')) else {
            self.diagnostics.error(
                &keyword.file,
                keyword.line,
                format!("expected '{{' to open the body of {} definition", kind),
            );
            self.skip_statement();
            return None;
        };
        self.pos += 1;

        let scope = if kind.has_opaque_body() {
            self.skip_body(open);
            Scope::default()
        } else if self.depth >= MAX_NESTING_DEPTH {
            self.diagnostics.error(
                &open.file,
                open.line,
                format!("components nested more than {} levels deep", MAX_NESTING_DEPTH),
            );
            self.skip_body(open);
            Scope::default()
        } else {
            self.depth += 1;
            let scope = self.parse_scope(Some(open));
            self.depth -= 1;
            scope
        };

        let instance_names = self.declarator_names();

        Some(Component {
            kind,
            name,
            file: keyword.file.to_path_buf(),
            line: keyword.line,
            instance_names,
            children: scope.children,
            instances: scope.instances,
        })
    }

    fn try_instances(&mut self, instances: &mut Vec<Instance>) -> bool {
        let mut offset = self.skip_modifiers(0);
        if self.peek(offset).and_then(Token::ident) == Some("alias") {
            offset += 2;
        }

        let Some(type_token) = self.peek(offset) else {
            return false;
        };
        let Some(type_name) = type_token.ident() else {
            return false;
        };
        if NON_TYPE_KEYWORDS.contains(&type_name) || ComponentKind::from_keyword(type_name).is_some()
        {
            return false;
        }

        let next = self.peek(offset + 1);
        let has_params = next.is_some_and(|t| t.is_punct('#'));
        if !has_params && next.and_then(Token::ident).is_none() {
            return false;
        }

        self.pos += offset + 1;
        if has_params {
            self.pos += 1;
            self.skip_group();
            if self.peek(0).and_then(Token::ident).is_none() {
                self.skip_statement();
                return true;
            }
        }

        for name in self.declarator_names() {
            instances.push(Instance {
                type_name: type_name.to_string(),
                name,
                line: type_token.line,
            });
        }
        true
    }

    /// Reads `a, b[4] @0x10, c;` up to and including the `;` and returns the
    /// declared names.
    fn declarator_names(&mut self) -> Vec<String> {
        let mut names = Vec::new();
        let mut depth = 0usize;
        let mut expect_name = true;

        while let Some(token) = self.peek(0) {
            match &token.kind {
                TokenKind::Punct(';') if depth == 0 => {
                    self.pos += 1;
                    return names;
                }
                TokenKind::Punct('}') if depth == 0 => break,
                TokenKind::Punct('(' | '[' | '{') => depth += 1,
                TokenKind::Punct(')' | ']' | '}') => depth = depth.saturating_sub(1),
                TokenKind::Punct(',') if depth == 0 => {
                    expect_name = true;
                    self.pos += 1;
                    continue;
                }
                TokenKind::Ident(name) if depth == 0 && expect_name => {
                    names.push(name.clone());
                }
                _ => {}
            }
            expect_name = false;
            self.pos += 1;
        }

        if let Some(token) = self.peek(0).or(self.tokens.last()) {
            self.diagnostics
                .error(&token.file, token.line, "expected ';'");
        }
        names
    }

    /// Skips a parenthesized group; the current token must be its `(`.
    fn skip_group(&mut self) {
        let mut depth = 0usize;
        while let Some(token) = self.peek(0) {
            self.pos += 1;
            match token.kind {
                TokenKind::Punct('(') => depth += 1,
                TokenKind::Punct(')') => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return;
                    }
                }
                _ if depth == 0 => {
                    self.pos -= 1;
                    return;
                }
                _ => {}
            }
        }
    }

    /// Skips to the `}` matching `open`, which has already been consumed.
    fn skip_body(&mut self, open: &Token) {
        let mut depth = 1usize;
        while let Some(token) = self.peek(0) {
            self.pos += 1;
            if token.is_punct('{') {
                depth += 1;
            } else if token.is_punct('}') {
                depth -= 1;
                if depth == 0 {
                    return;
                }
            }
        }
        self.diagnostics
            .error(&open.file, open.line, "missing closing '}' for this '{'");
    }

    /// Skips one statement through its `;`. Stops before a `}` that closes
    /// the enclosing scope.
    fn skip_statement(&mut self) {
        let mut depth = 0usize;
        let start = self.pos;
        while let Some(token) = self.peek(0) {
            match token.kind {
                TokenKind::Punct(';') if depth == 0 => {
                    self.pos += 1;
                    return;
                }
                TokenKind::Punct('}') if depth == 0 => {
                    if self.pos == start {
                        self.pos += 1;
                    }
                    return;
                }
                TokenKind::Punct('(' | '[' | '{') => depth += 1,
                TokenKind::Punct(')' | ']' | '}') => depth = depth.saturating_sub(1),
                _ => {}
            }
            self.pos += 1;
        }
    }
}
