//! Unit tests for parser assembly and dispatch

use std::{cell::RefCell, rc::Rc};

use clap::error::ErrorKind;
use peakrdl::{
    Config, Outcome,
    app::{EXIT_COMPILE_FAILED, build_dispatcher},
};

use crate::common::{Behavior, FailingDiscovery, RecordingSubcommand, StaticDiscovery};

fn dispatcher_with(
    plugins: Vec<Box<dyn peakrdl::Subcommand>>,
) -> peakrdl::Dispatcher {
    build_dispatcher(&StaticDiscovery::new(plugins)).expect("dispatcher should build")
}

// ============================================================================
// Parsing
// ============================================================================

#[test]
fn version_flag_reports_crate_version() {
    let dispatcher = dispatcher_with(Vec::new());

    let err = dispatcher.parse(["peakrdl", "--version"]).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DisplayVersion);
    assert!(err.to_string().contains(env!("CARGO_PKG_VERSION")));
    assert_eq!(err.exit_code(), 0);
}

#[test]
fn version_flag_wins_over_following_arguments() {
    let dispatcher = dispatcher_with(Vec::new());

    let err = dispatcher
        .parse(["peakrdl", "--version", "dump", "missing.rdl"])
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DisplayVersion);
}

#[test]
fn missing_subcommand_is_a_usage_error() {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let dispatcher = dispatcher_with(vec![RecordingSubcommand::new("myexporter", &calls).boxed()]);

    let err = dispatcher.parse(["peakrdl"]).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::MissingSubcommand);
    assert_ne!(err.exit_code(), 0);
    assert!(err.render().to_string().contains("Usage"));
    assert!(calls.borrow().is_empty());
}

#[test]
fn unknown_flag_is_a_usage_error() {
    let dispatcher = dispatcher_with(Vec::new());

    let err = dispatcher
        .parse(["peakrdl", "dump", "top.rdl", "--oops"])
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    assert_eq!(err.exit_code(), 2);
    assert!(err.to_string().contains("--oops"));
}

#[test]
fn help_lists_builtins_and_plugins_under_one_heading() {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let dispatcher = dispatcher_with(vec![RecordingSubcommand::new("myexporter", &calls).boxed()]);

    let help = dispatcher.parser().clone().render_help().to_string();

    assert!(help.contains("Subcommands:"));
    assert!(!help.contains("Commands:"));
    for name in ["dump", "list-globals", "completions", "myexporter"] {
        assert!(help.contains(name), "help should mention {name}:\n{help}");
    }
}

#[test]
fn each_builtin_registers_a_sub_parser_under_its_name() {
    let dispatcher = dispatcher_with(Vec::new());

    for subcommand in peakrdl::cli::builtin_subcommands() {
        let parser = subcommand.register(clap::Command::new("peakrdl"));
        assert!(
            parser.find_subcommand(subcommand.name()).is_some(),
            "{} should add its own sub-parser",
            subcommand.name()
        );
        assert!(
            dispatcher
                .parser()
                .find_subcommand(subcommand.name())
                .is_some()
        );
    }
}

// ============================================================================
// Dispatch
// ============================================================================

#[test]
fn selected_plugin_runs_exactly_once_with_its_options() {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let dispatcher = dispatcher_with(vec![
        RecordingSubcommand::new("myexporter", &calls).boxed(),
        RecordingSubcommand::new("other", &calls).boxed(),
    ]);

    let matches = dispatcher
        .parse(["peakrdl", "myexporter", "--out", "file.txt"])
        .unwrap();
    let result = dispatcher.dispatch(&matches, &Config::default());

    assert!(result.is_ok());
    assert_eq!(*calls.borrow(), vec!["myexporter:file.txt".to_string()]);
    assert_eq!(Outcome::classify(&result), Outcome::Success);
}

#[test]
fn compile_failure_maps_to_exit_code_one() {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let dispatcher = dispatcher_with(vec![
        RecordingSubcommand::new("broken", &calls)
            .behaving(Behavior::FailCompile)
            .boxed(),
    ]);

    let matches = dispatcher.parse(["peakrdl", "broken"]).unwrap();
    let result = dispatcher.dispatch(&matches, &Config::default());

    assert_eq!(Outcome::classify(&result), Outcome::CompileFailed);
    assert_eq!(Outcome::classify(&result).code(), EXIT_COMPILE_FAILED);
}

#[test]
fn other_errors_propagate_unmapped() {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let dispatcher = dispatcher_with(vec![
        RecordingSubcommand::new("buggy", &calls)
            .behaving(Behavior::FailOther)
            .boxed(),
    ]);

    let matches = dispatcher.parse(["peakrdl", "buggy"]).unwrap();
    let result = dispatcher.dispatch(&matches, &Config::default());

    let outcome = Outcome::classify(&result);
    assert_eq!(outcome, Outcome::Unhandled);
    assert_ne!(outcome.code(), EXIT_COMPILE_FAILED);
    assert!(
        result
            .unwrap_err()
            .to_string()
            .contains("unexpected fault in buggy")
    );
}

// ============================================================================
// Startup
// ============================================================================

#[test]
fn duplicate_names_fail_before_parsing() {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let discovery = StaticDiscovery::new(vec![
        RecordingSubcommand::new("html", &calls).tagged("one").boxed(),
        RecordingSubcommand::new("html", &calls).tagged("two").boxed(),
    ]);

    let err = build_dispatcher(&discovery).err().expect("must fail");

    let message = format!("{:#}", err);
    assert!(message.contains("(one)"));
    assert!(message.contains("(two)"));
    assert_eq!(Outcome::classify(&Err(err)), Outcome::Unhandled);
}

#[test]
fn discovery_failure_aborts_startup() {
    let err = build_dispatcher(&FailingDiscovery).err().expect("must fail");

    assert!(format!("{:#}", err).contains("malformed plugin registration"));
}
