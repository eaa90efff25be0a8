use std::{fmt, fmt::Write as _, path::PathBuf};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Addrmap,
    Regfile,
    Reg,
    Field,
    Mem,
    Signal,
    Enum,
    Struct,
    Constraint,
    Property,
}

impl ComponentKind {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let kind = match keyword {
            "addrmap" => Self::Addrmap,
            "regfile" => Self::Regfile,
            "reg" => Self::Reg,
            "field" => Self::Field,
            "mem" => Self::Mem,
            "signal" => Self::Signal,
            "enum" => Self::Enum,
            "struct" => Self::Struct,
            "constraint" => Self::Constraint,
            "property" => Self::Property,
            _ => return None,
        };
        Some(kind)
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Addrmap => "addrmap",
            Self::Regfile => "regfile",
            Self::Reg => "reg",
            Self::Field => "field",
            Self::Mem => "mem",
            Self::Signal => "signal",
            Self::Enum => "enum",
            Self::Struct => "struct",
            Self::Constraint => "constraint",
            Self::Property => "property",
        }
    }

    /// Kinds whose bodies hold members or property metadata rather than
    /// nested components.
    pub fn has_opaque_body(&self) -> bool {
        matches!(
            self,
            Self::Enum | Self::Struct | Self::Constraint | Self::Property
        )
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// An explicit instantiation of a named definition, `reg_t ctrl;`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Instance {
    pub type_name: String,
    pub name: String,
    pub line: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Component {
    pub kind: ComponentKind,
    /// `None` for anonymous definitions.
    pub name: Option<String>,
    pub file: PathBuf,
    pub line: usize,
    /// Instances declared directly after the closing brace, `reg { ... } a, b;`.
    pub instance_names: Vec<String>,
    pub children: Vec<Component>,
    pub instances: Vec<Instance>,
}

impl Component {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<anonymous>")
    }

    /// Renders this component and everything below it as an indented outline.
    pub fn render_tree(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out, 0);
        out
    }

    fn render_into(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        let _ = write!(
            out,
            "{}{} {} ({}:{})",
            indent,
            self.kind,
            self.display_name(),
            self.file.display(),
            self.line
        );
        if !self.instance_names.is_empty() {
            let _ = write!(out, " => {}", self.instance_names.join(", "));
        }
        out.push('\n');

        for child in &self.children {
            child.render_into(out, depth + 1);
        }
        for instance in &self.instances {
            let _ = writeln!(
                out,
                "{}  {} {} (line {})",
                indent, instance.type_name, instance.name, instance.line
            );
        }
    }
}

/// Result of a successful compile.
#[derive(Debug, Clone, Serialize)]
pub struct Design {
    /// Definitions in the root namespace, in source order.
    pub globals: Vec<Component>,
    /// The selected top-level addrmap, if the inputs define one.
    pub top: Option<Component>,
}
