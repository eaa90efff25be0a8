use std::{fmt, path::Path};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub location: Option<String>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{}: {}: {}", location, self.severity, self.message),
            None => write!(f, "{}: {}", self.severity, self.message),
        }
    }
}

/// Collects compiler messages and echoes each one to stderr as it arrives.
#[derive(Debug)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
    echo: bool,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            echo: true,
        }
    }
}

impl Diagnostics {
    /// A collector that keeps messages without printing them.
    pub fn quiet() -> Self {
        Self {
            entries: Vec::new(),
            echo: false,
        }
    }

    pub fn error(&mut self, file: &Path, line: usize, message: impl Into<String>) {
        self.push(Severity::Error, Some(location(file, line)), message.into());
    }

    pub fn warning(&mut self, file: &Path, line: usize, message: impl Into<String>) {
        self.push(Severity::Warning, Some(location(file, line)), message.into());
    }

    /// An error that is not tied to a position in a source file.
    pub fn fatal(&mut self, message: impl Into<String>) {
        self.push(Severity::Error, None, message.into());
    }

    pub fn error_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    fn push(&mut self, severity: Severity, location: Option<String>, message: String) {
        let diagnostic = Diagnostic {
            severity,
            message,
            location,
        };
        if self.echo {
            eprintln!("{}", diagnostic);
        }
        self.entries.push(diagnostic);
    }
}

fn location(file: &Path, line: usize) -> String {
    format!("{}:{}", file.display(), line)
}
