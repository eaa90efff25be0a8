//! Unit tests for the RDL front-end over real files

use std::{fs, path::PathBuf};

use peakrdl::rdl::{ComponentKind, CompileOptions, Compiler, Design, Diagnostics, Severity};
use tempfile::TempDir;

use crate::common::SAMPLE_RDL;

struct Sources {
    dir: TempDir,
}

impl Sources {
    fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }
}

fn compiler(input_files: Vec<PathBuf>, incdirs: Vec<PathBuf>, top: Option<&str>) -> Compiler {
    Compiler::with_diagnostics(
        CompileOptions {
            input_files,
            incdirs,
            top: top.map(str::to_string),
        },
        Diagnostics::quiet(),
    )
}

fn has_global(design: &Design, kind: ComponentKind, name: &str) -> bool {
    design
        .globals
        .iter()
        .any(|c| c.kind == kind && c.name.as_deref() == Some(name))
}

fn messages(compiler: &Compiler) -> Vec<String> {
    compiler
        .diagnostics()
        .entries()
        .iter()
        .map(ToString::to_string)
        .collect()
}

#[test]
fn compiles_sample_design() {
    let sources = Sources::new();
    let input = sources.write("top.rdl", SAMPLE_RDL);

    let mut compiler = compiler(vec![input], Vec::new(), None);
    let design = compiler.compile().expect("sample should compile");

    let kinds: Vec<_> = design.globals.iter().map(|c| c.kind).collect();
    assert_eq!(
        kinds,
        vec![ComponentKind::Reg, ComponentKind::Enum, ComponentKind::Addrmap]
    );

    let top = design.top.expect("addrmap should be selected");
    assert_eq!(top.name.as_deref(), Some("block"));
    let names: Vec<_> = top.instances.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["ctrl", "status"]);

    assert!(compiler.diagnostics().entries().is_empty());
}

#[test]
fn last_addrmap_is_default_top() {
    let sources = Sources::new();
    let input = sources.write(
        "maps.rdl",
        "addrmap first { };\naddrmap second { };\nreg lone_t { };\n",
    );

    let design = compiler(vec![input], Vec::new(), None).compile().unwrap();

    assert_eq!(design.top.unwrap().name.as_deref(), Some("second"));
}

#[test]
fn explicit_top_is_selected() {
    let sources = Sources::new();
    let input = sources.write("maps.rdl", "addrmap first { };\naddrmap second { };\n");

    let design = compiler(vec![input], Vec::new(), Some("first"))
        .compile()
        .unwrap();

    assert_eq!(design.top.unwrap().name.as_deref(), Some("first"));
}

#[test]
fn unknown_top_fails() {
    let sources = Sources::new();
    let input = sources.write("maps.rdl", "addrmap first { };\n");

    let mut compiler = compiler(vec![input], Vec::new(), Some("nope"));
    let err = compiler.compile().unwrap_err();

    assert_eq!(err.errors, 1);
    assert!(messages(&compiler)[0].contains("'nope' not found"));
}

#[test]
fn design_without_addrmap_has_no_top() {
    let sources = Sources::new();
    let input = sources.write("regs.rdl", "reg a_t { };\n");

    let design = compiler(vec![input], Vec::new(), None).compile().unwrap();

    assert!(design.top.is_none());
    assert!(has_global(&design, ComponentKind::Reg, "a_t"));
}

#[test]
fn includes_resolve_next_to_including_file_first() {
    let sources = Sources::new();
    sources.write("src/common.rdl", "reg local_t { };\n");
    sources.write("inc/common.rdl", "reg from_incdir_t { };\n");
    let input = sources.write("src/top.rdl", "`include \"common.rdl\"\naddrmap top { };\n");

    let design = compiler(vec![input], vec![sources.dir.path().join("inc")], None)
        .compile()
        .unwrap();

    assert!(has_global(&design, ComponentKind::Reg, "local_t"));
    assert!(!has_global(&design, ComponentKind::Reg, "from_incdir_t"));
}

#[test]
fn includes_fall_back_to_incdirs() {
    let sources = Sources::new();
    sources.write("inc/shared.rdl", "reg shared_t { };\n");
    let input = sources.write("src/top.rdl", "`include \"shared.rdl\"\naddrmap top { shared_t r; };\n");

    let design = compiler(vec![input], vec![sources.dir.path().join("inc")], None)
        .compile()
        .unwrap();

    let names: Vec<_> = design.globals.iter().map(|c| c.display_name()).collect();
    assert_eq!(names, vec!["shared_t", "top"]);
}

#[test]
fn missing_include_reports_location() {
    let sources = Sources::new();
    let input = sources.write("top.rdl", "\n`include \"absent.rdl\"\n");

    let mut compiler = compiler(vec![input.clone()], Vec::new(), None);
    assert!(compiler.compile().is_err());

    let entry = &compiler.diagnostics().entries()[0];
    assert_eq!(entry.severity, Severity::Error);
    assert_eq!(
        entry.location.as_deref(),
        Some(format!("{}:2", input.display()).as_str())
    );
    assert!(entry.message.contains("absent.rdl"));
}

#[test]
fn include_cycles_are_errors() {
    let sources = Sources::new();
    sources.write("a.rdl", "`include \"b.rdl\"\nreg a_t { };\n");
    sources.write("b.rdl", "`include \"a.rdl\"\nreg b_t { };\n");
    let input = sources.dir.path().join("a.rdl");

    let mut compiler = compiler(vec![input], Vec::new(), None);
    assert!(compiler.compile().is_err());
    assert!(
        messages(&compiler)
            .iter()
            .any(|m| m.contains("include cycle"))
    );
}

#[test]
fn redefinition_across_files_is_an_error() {
    let sources = Sources::new();
    let first = sources.write("one.rdl", "reg dup_t { };\n");
    let second = sources.write("two.rdl", "reg dup_t { };\n");

    let mut compiler = compiler(vec![first.clone(), second], Vec::new(), None);
    assert!(compiler.compile().is_err());

    let message = &messages(&compiler)[0];
    assert!(message.contains("'dup_t' is already defined"));
    assert!(message.contains(&format!("{}:1", first.display())));
}

#[test]
fn missing_input_is_fatal() {
    let sources = Sources::new();

    let mut compiler = compiler(vec![sources.dir.path().join("nope.rdl")], Vec::new(), None);
    let err = compiler.compile().unwrap_err();

    assert_eq!(err.errors, 1);
    assert_eq!(compiler.diagnostics().entries()[0].location, None);
}

#[test]
fn no_inputs_is_fatal() {
    let mut compiler = compiler(Vec::new(), Vec::new(), None);

    assert!(compiler.compile().is_err());
    assert!(messages(&compiler)[0].contains("no input files"));
}

#[test]
fn errors_are_counted() {
    let sources = Sources::new();
    let input = sources.write("bad.rdl", "reg a_t {\n}; }\n\"open\n");

    let mut compiler = compiler(vec![input], Vec::new(), None);
    let err = compiler.compile().unwrap_err();

    assert_eq!(err.errors, compiler.diagnostics().error_count());
    assert!(err.errors >= 2);
}
