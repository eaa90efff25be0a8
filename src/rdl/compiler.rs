use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::rdl::{
    CompileFailed, Component, ComponentKind, Design, Diagnostics,
    lexer::{Lexer, Token, TokenKind},
    parser::Parser,
};

/// Inputs for one compile.
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    pub input_files: Vec<PathBuf>,
    /// Search directories for `` `include ``, tried after the including
    /// file's own directory.
    pub incdirs: Vec<PathBuf>,
    /// Name of the root addrmap to select as top. Defaults to the last one
    /// defined.
    pub top: Option<String>,
}

/// Front-end for SystemRDL sources.
///
/// Every problem is reported through [`Diagnostics`] as it is found; the
/// returned [`CompileFailed`] only carries the error count.
pub struct Compiler {
    options: CompileOptions,
    diagnostics: Diagnostics,
}

impl Compiler {
    pub fn new(options: CompileOptions) -> Self {
        Self::with_diagnostics(options, Diagnostics::default())
    }

    pub fn with_diagnostics(options: CompileOptions, diagnostics: Diagnostics) -> Self {
        Self {
            options,
            diagnostics,
        }
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn compile(&mut self) -> Result<Design, CompileFailed> {
        if self.options.input_files.is_empty() {
            self.diagnostics.fatal("no input files");
            return Err(CompileFailed::new(1));
        }

        let mut globals = Vec::new();
        for input in self.options.input_files.clone() {
            debug!(file = %input.display(), "compiling");
            let mut tokens = Vec::new();
            let mut include_stack = Vec::new();
            self.load(&input, None, &mut include_stack, &mut tokens);
            globals.extend(Parser::new(&tokens, &mut self.diagnostics).parse());
        }

        self.check_redefinitions(&globals);
        let top = self.select_top(&globals);

        if self.diagnostics.has_errors() {
            return Err(CompileFailed::new(self.diagnostics.error_count()));
        }

        Ok(Design { globals, top })
    }

    /// Reads `path` and appends its tokens to `out`, splicing in included
    /// files in place of their `` `include `` directives.
    fn load(
        &mut self,
        path: &Path,
        included_from: Option<&Token>,
        include_stack: &mut Vec<PathBuf>,
        out: &mut Vec<Token>,
    ) {
        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(err) => {
                let message = format!("cannot read '{}': {}", path.display(), err);
                match included_from {
                    Some(token) => self.diagnostics.error(&token.file, token.line, message),
                    None => self.diagnostics.fatal(message),
                }
                return;
            }
        };

        let canonical = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        if include_stack.contains(&canonical) {
            if let Some(token) = included_from {
                self.diagnostics.error(
                    &token.file,
                    token.line,
                    format!("include cycle detected: '{}'", path.display()),
                );
            }
            return;
        }
        include_stack.push(canonical);

        let tokens = Lexer::new(&source, path, &mut self.diagnostics).tokenize();
        let mut iter = tokens.into_iter();
        while let Some(token) = iter.next() {
            if token.kind != TokenKind::Include {
                out.push(token);
                continue;
            }

            let Some(Token {
                kind: TokenKind::Str(target),
                ..
            }) = iter.next()
            else {
                self.diagnostics.error(
                    &token.file,
                    token.line,
                    "expected a quoted file name after `include",
                );
                continue;
            };

            match self.resolve_include(path, &target) {
                Some(resolved) => self.load(&resolved, Some(&token), include_stack, out),
                None => self.diagnostics.error(
                    &token.file,
                    token.line,
                    format!("include file '{}' not found", target),
                ),
            }
        }

        include_stack.pop();
    }

    fn resolve_include(&self, including_file: &Path, target: &str) -> Option<PathBuf> {
        let target = Path::new(target);
        if target.is_absolute() {
            return target.exists().then(|| target.to_path_buf());
        }

        including_file
            .parent()
            .into_iter()
            .chain(self.options.incdirs.iter().map(PathBuf::as_path))
            .map(|dir| dir.join(target))
            .find(|candidate| candidate.is_file())
    }

    fn check_redefinitions(&mut self, globals: &[Component]) {
        let mut seen: HashMap<&str, &Component> = HashMap::new();
        for component in globals {
            let Some(name) = component.name.as_deref() else {
                continue;
            };
            if let Some(previous) = seen.get(name) {
                self.diagnostics.error(
                    &component.file,
                    component.line,
                    format!(
                        "'{}' is already defined at {}:{}",
                        name,
                        previous.file.display(),
                        previous.line
                    ),
                );
                continue;
            }
            seen.insert(name, component);
        }
    }

    fn select_top(&mut self, globals: &[Component]) -> Option<Component> {
        let addrmaps = globals
            .iter()
            .filter(|c| c.kind == ComponentKind::Addrmap && c.name.is_some());

        match self.options.top.clone() {
            Some(top) => {
                let found = addrmaps
                    .filter(|c| c.name.as_deref() == Some(top.as_str()))
                    .next_back()
                    .cloned();
                if found.is_none() {
                    self.diagnostics.fatal(format!(
                        "top-level addrmap '{}' not found in the root namespace",
                        top
                    ));
                }
                found
            }
            None => addrmaps.last().cloned(),
        }
    }
}
