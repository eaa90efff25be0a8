//! Integration tests for config file discovery and its effect on plugins

use predicates::prelude::*;

use crate::common::{TestFixture, read};

const SETTINGS_PLUGIN: &str = r#"
return {
    name = "greeter",
    args = { { name = "out", required = true } },
    run = function(options, settings)
        local f = assert(io.open(options.out, "w"))
        f:write(tostring(settings.greeting) .. ":" .. tostring(settings.count))
        f:close()
    end,
}
"#;

#[test]
fn test_exporter_settings_from_xdg_config() {
    let fixture = TestFixture::new();
    fixture.create_plugin("greeter", SETTINGS_PLUGIN);
    fixture.create_config("[exporters.greeter]\ngreeting = \"hi\"\ncount = 3\n");

    fixture
        .command()
        .args(["greeter", "--out", "out.txt"])
        .assert()
        .success();

    assert_eq!(read(&fixture.work_path("out.txt")), "hi:3");
}

#[test]
fn test_cli_config_overrides_discovery() {
    let fixture = TestFixture::new();
    fixture.create_plugin("greeter", SETTINGS_PLUGIN);
    fixture.create_config("[exporters.greeter]\ngreeting = \"xdg\"\n");
    fixture.create_rdl("custom.toml", "[exporters.greeter]\ngreeting = \"cli\"\n");

    fixture
        .command()
        .args(["greeter", "--out", "out.txt", "--peakrdl-cfg", "custom.toml"])
        .assert()
        .success();

    assert_eq!(read(&fixture.work_path("out.txt")), "cli:nil");
}

#[test]
fn test_env_config_is_used() {
    let fixture = TestFixture::new();
    fixture.create_plugin("greeter", SETTINGS_PLUGIN);
    let path = fixture.create_rdl("env.toml", "[exporters.greeter]\ngreeting = \"env\"\n");

    fixture
        .command()
        .env("PEAKRDL_CFG", &path)
        .args(["greeter", "--out", "out.txt"])
        .assert()
        .success();

    assert_eq!(read(&fixture.work_path("out.txt")), "env:nil");
}

#[test]
fn test_local_config_beats_xdg() {
    let fixture = TestFixture::new();
    fixture.create_plugin("greeter", SETTINGS_PLUGIN);
    fixture.create_config("[exporters.greeter]\ngreeting = \"xdg\"\n");
    fixture.create_rdl("peakrdl.toml", "[exporters.greeter]\ngreeting = \"local\"\n");

    fixture
        .command()
        .args(["greeter", "--out", "out.txt"])
        .assert()
        .success();

    assert_eq!(read(&fixture.work_path("out.txt")), "local:nil");
}

#[test]
fn test_missing_cli_config_is_an_error() {
    let fixture = TestFixture::new();

    fixture
        .command()
        .args(["--peakrdl-cfg=absent.toml", "--help"])
        .assert()
        .code(101)
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_extra_plugin_paths() {
    let fixture = TestFixture::new();
    let extra = fixture.temp_dir.path().join("extra");
    std::fs::create_dir_all(extra.join("greeter")).unwrap();
    std::fs::write(extra.join("greeter").join("plugin.lua"), SETTINGS_PLUGIN).unwrap();
    fixture.create_config(&format!("plugin_paths = [{:?}]\n", extra.display().to_string()));

    fixture
        .command()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("greeter"));
}

#[test]
fn test_disabled_plugins_are_hidden() {
    let fixture = TestFixture::new();
    fixture.create_plugin("greeter", SETTINGS_PLUGIN);
    fixture.create_config("disabled_plugins = [\"greeter\"]\n");

    fixture
        .command()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("greeter").not());

    fixture
        .command()
        .args(["greeter", "--out", "out.txt"])
        .assert()
        .code(2);
}

#[test]
fn test_invalid_log_level_is_rejected() {
    let fixture = TestFixture::new();
    fixture.create_config("log_level = \"chatty\"\n");

    fixture
        .command()
        .arg("--help")
        .assert()
        .code(101)
        .stderr(predicate::str::contains("Invalid log_level 'chatty'"));
}

#[test]
fn test_unknown_config_key_is_rejected() {
    let fixture = TestFixture::new();
    fixture.create_config("theme = \"dark\"\n");

    fixture
        .command()
        .arg("--help")
        .assert()
        .code(101)
        .stderr(predicate::str::contains("theme"));
}
