//! CLI integration tests for cmdsmithctl
//!
//! Tests the CLI surface:
//! - cmdsmithctl list / show        catalog browsing
//! - cmdsmithctl generate ID        command on stdout, exit 1 when invalid
//! - cmdsmithctl history            auto-saved entries, clear
//! - cmdsmithctl config ...         export/import, favorites, reset
//! - cmdsmithctl lint               built-in templates are clean
//!
//! Every run gets its own data directory and a settings path that does not
//! exist, so the user's real configuration is never read.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::{tempdir, TempDir};

fn cmdsmithctl(data: &TempDir, args: &[&str]) -> Output {
    let settings = data.path().join("absent-settings.toml");
    Command::new(env!("CARGO_BIN_EXE_cmdsmithctl"))
        .arg("--data-dir")
        .arg(data.path())
        .arg("--config")
        .arg(&settings)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run cmdsmithctl")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn test_generate_prints_command() {
    let data = tempdir().unwrap();
    let output = cmdsmithctl(&data, &["generate", "directory-size", "--set", "directory=/tmp"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "du -hca '/tmp' | sort -h\n");
}

#[test]
fn test_generate_invalid_exits_one() {
    let data = tempdir().unwrap();
    let output = cmdsmithctl(&data, &["generate", "hana-trace", "--set", "sid="]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("System ID (SID) is required"));
    // Best-effort command is still printed
    assert_eq!(stdout(&output), "tail -f /usr/sap/''/HDB'00'/*/trace/*.trc\n");
}

#[test]
fn test_generate_json() {
    let data = tempdir().unwrap();
    let output = cmdsmithctl(
        &data,
        &["generate", "log-search", "--set", "keyword=ERROR", "--json"],
    );
    assert!(output.status.success());
    let result: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(result["valid"], true);
    assert_eq!(result["template_id"], "log-search");
    assert_eq!(
        result["command_text"],
        "grep -Rin -- 'ERROR' '/var/log' 2>/dev/null"
    );
}

#[test]
fn test_stored_sid_defaults_fill_unset_inputs() {
    let data = tempdir().unwrap();
    let output = cmdsmithctl(&data, &["generate", "hana-trace"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "tail -f /usr/sap/'HDB'/HDB'00'/*/trace/*.trc\n");

    let prefs = data.path().join("prefs.json");
    fs::write(
        &prefs,
        r#"{"preferences": {"defaultSID": "PRD", "defaultInstanceNumber": "10"}}"#,
    )
    .unwrap();
    assert!(cmdsmithctl(&data, &["config", "import", prefs.to_str().unwrap()])
        .status
        .success());

    let output = cmdsmithctl(&data, &["generate", "hana-trace"]);
    assert_eq!(stdout(&output), "tail -f /usr/sap/'PRD'/HDB'10'/*/trace/*.trc\n");

    // Explicit values win over stored defaults
    let output = cmdsmithctl(&data, &["generate", "hana-trace", "--set", "sid=QAS"]);
    assert_eq!(stdout(&output), "tail -f /usr/sap/'QAS'/HDB'10'/*/trace/*.trc\n");
}

#[test]
fn test_strict_flag_reports_unbound_tokens() {
    let data = tempdir().unwrap();
    // Built-ins are fully bound, so strict mode changes nothing here
    let output = cmdsmithctl(&data, &["generate", "disk-overview", "--strict"]);
    assert!(output.status.success());
}

#[test]
fn test_unknown_template_fails() {
    let data = tempdir().unwrap();
    let output = cmdsmithctl(&data, &["generate", "no-such-template"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Unknown template: no-such-template"));
}

#[test]
fn test_valid_results_are_auto_saved() {
    let data = tempdir().unwrap();
    cmdsmithctl(&data, &["generate", "service-status", "--set", "serviceName=sshd"]);
    cmdsmithctl(&data, &["generate", "hana-trace", "--set", "sid="]);
    assert!(data.path().join("command-history.json").exists());

    let output = cmdsmithctl(&data, &["history", "--json"]);
    let entries: Vec<serde_json::Value> = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["command_text"], "systemctl status 'sshd'");

    cmdsmithctl(&data, &["generate", "hana-trace", "--set", "sid=", "--save"]);
    let output = cmdsmithctl(&data, &["history", "--json"]);
    let entries: Vec<serde_json::Value> = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["template_id"], "hana-trace");

    let output = cmdsmithctl(&data, &["history", "--clear"]);
    assert!(output.status.success());
    assert!(!data.path().join("command-history.json").exists());
}

#[test]
fn test_auto_save_can_be_disabled() {
    let data = tempdir().unwrap();
    let export = data.path().join("prefs.json");
    fs::write(&export, r#"{"preferences": {"autoSaveHistory": false}}"#).unwrap();
    assert!(cmdsmithctl(&data, &["config", "import", export.to_str().unwrap()])
        .status
        .success());

    cmdsmithctl(&data, &["generate", "disk-overview"]);
    let output = cmdsmithctl(&data, &["history"]);
    assert!(stdout(&output).contains("No saved commands."));
}

#[test]
fn test_config_export_import_roundtrip() {
    let source = tempdir().unwrap();
    assert!(cmdsmithctl(&source, &["config", "favorite", "hana-trace"])
        .status
        .success());
    let exported = stdout(&cmdsmithctl(&source, &["config", "export"]));
    assert!(exported.contains("\"hana-trace\""));

    let target = tempdir().unwrap();
    let file = target.path().join("export.json");
    fs::write(&file, &exported).unwrap();
    let output = cmdsmithctl(&target, &["config", "import", file.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&cmdsmithctl(&target, &["config", "export"])), exported);
}

#[test]
fn test_bad_import_is_rejected() {
    let data = tempdir().unwrap();
    let file = data.path().join("broken.json");
    fs::write(&file, "{ not json").unwrap();
    let output = cmdsmithctl(&data, &["config", "import", file.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("nothing was changed"));
    assert!(!Path::new(&data.path().join("cmdsmith-preferences.json")).exists());
}

#[test]
fn test_favorite_unknown_template() {
    let data = tempdir().unwrap();
    let output = cmdsmithctl(&data, &["config", "favorite", "nope"]);
    assert!(!output.status.success());
}

#[test]
fn test_list_and_show() {
    let data = tempdir().unwrap();

    let output = cmdsmithctl(&data, &["list", "--category", "hana"]);
    assert!(output.status.success());
    let listed = stdout(&output);
    assert!(listed.contains("hana-trace"));
    assert!(!listed.contains("directory-size"));

    let output = cmdsmithctl(&data, &["list", "--search", "duplicate"]);
    assert!(stdout(&output).contains("duplicate-files"));

    let output = cmdsmithctl(&data, &["show", "largest-files"]);
    assert!(output.status.success());
    let shown = stdout(&output);
    assert!(shown.contains("[INPUTS]"));
    assert!(shown.contains("integer 1-100"));
}

#[test]
fn test_lint_builtins() {
    let data = tempdir().unwrap();
    let output = cmdsmithctl(&data, &["lint"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("0 error(s), 0 warning(s)"));
}

#[test]
fn test_settings_file_enables_strict_mode() {
    let data = tempdir().unwrap();
    let settings = data.path().join("settings.toml");
    fs::write(&settings, "[engine]\nstrict = true\nhistory_capacity = 1\n").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_cmdsmithctl"))
        .arg("--data-dir")
        .arg(data.path())
        .arg("--config")
        .arg(&settings)
        .args(["config", "show"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let shown = stdout(&output);
    assert!(shown.contains("Strict mode:      true"));
    assert!(shown.contains("History capacity: 1"));
}
