//! End-to-end tests for the moveaudit binary

mod common;

use common::{refused_endpoint, MockBackend, TestEnv};
use predicates::prelude::*;

const REPORT: &str = r#"Sure, here is my analysis:
```json
{"summary": "One problem found", "issues": [{"title": "Unchecked mint", "severity": "High", "description": "Anyone can mint", "codeSnippet": "public fun mint()", "suggestedFix": "Require a MintCap"}]}
```"#;

#[test]
fn test_empty_stdin_is_no_input() {
    let env = TestEnv::new();
    env.cmd()
        .args(["audit", "--endpoint", &refused_endpoint()])
        .write_stdin("")
        .assert()
        .code(66)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("no input"));
}

#[test]
fn test_refused_backend_is_unavailable() {
    let env = TestEnv::new();
    env.cmd()
        .args(["audit", "module 0x1::m {}", "--endpoint", &refused_endpoint()])
        .assert()
        .code(70)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("inference backend unavailable"));
}

#[test]
fn test_server_error_is_backend_error() {
    let env = TestEnv::new();
    let backend = MockBackend::raw("500 Internal Server Error", r#"{"error":"model not loaded"}"#);
    env.cmd()
        .args(["generate", "a coin", "--endpoint", &backend.endpoint])
        .assert()
        .code(65)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("inference backend error"));
}

#[test]
fn test_audit_prints_report_and_raw_response() {
    let env = TestEnv::new();
    let backend = MockBackend::completion(REPORT);
    let assert = env
        .cmd()
        .args(["audit", "module 0x1::m {}", "--endpoint", &backend.endpoint])
        .assert()
        .success()
        .stderr(predicate::str::contains("Sure, here is my analysis:"));

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(stdout.starts_with("{\n  \"summary\": \"One problem found\""));
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["issues"][0]["severity"], "High");
    assert_eq!(report["issues"][0]["suggestedFix"], "Require a MintCap");

    let request = backend.request();
    assert_eq!(request["stream"], false);
    assert_eq!(request["options"]["num_predict"], 1024);
    assert!(request["prompt"]
        .as_str()
        .unwrap()
        .contains("module 0x1::m {}"));
}

#[test]
fn test_unparseable_completion_still_succeeds() {
    let env = TestEnv::new();
    let backend = MockBackend::completion("I cannot analyze this contract.");
    let assert = env
        .cmd()
        .args(["audit", "module 0x1::m {}", "--endpoint", &backend.endpoint])
        .assert()
        .success();

    let report: serde_json::Value =
        serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(report["error"], "could not parse model output");
    assert_eq!(report["summary"], "Analysis failed");
    assert_eq!(report["issues"], serde_json::json!([]));
}

#[test]
fn test_audit_prints_model_object_unchanged() {
    let env = TestEnv::new();
    let object = r#"{"summary": null, "score": 40, "issues": [{"title": "t", "severity": 3, "line": 12}]}"#;
    let backend = MockBackend::completion(&format!("Analysis:\n{}\nDone.", object));
    let assert = env
        .cmd()
        .args(["audit", "module 0x1::m {}", "--endpoint", &backend.endpoint])
        .assert()
        .success();

    let printed: serde_json::Value =
        serde_json::from_slice(&assert.get_output().stdout).unwrap();
    let expected: serde_json::Value = serde_json::from_str(object).unwrap();
    assert_eq!(printed, expected);
}

#[test]
fn test_generate_strips_preamble() {
    let env = TestEnv::new();
    let backend = MockBackend::completion("Here is the code:\nmodule 0x1::coin {}");
    env.cmd()
        .args(["generate", "a simple coin", "--endpoint", &backend.endpoint])
        .assert()
        .success()
        .stdout("module 0x1::coin {}\n");

    let request = backend.request();
    assert_eq!(request["options"]["num_predict"], 512);
    assert!(request["prompt"].as_str().unwrap().contains("a simple coin"));
}

#[test]
fn test_file_input_and_output_file() {
    let env = TestEnv::new();
    let contract = env.write("Vault.move", "module 0x1::vault { struct V has key {} }");
    let out = env.path("report.json");
    let backend = MockBackend::completion(REPORT);

    env.cmd()
        .arg("audit")
        .arg(&contract)
        .arg("--output")
        .arg(&out)
        .args(["--endpoint", &backend.endpoint])
        .assert()
        .success();

    let request = backend.request();
    assert!(request["prompt"]
        .as_str()
        .unwrap()
        .contains("struct V has key {}"));

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(written["summary"], "One problem found");
}

#[test]
fn test_text_format_report() {
    let env = TestEnv::new();
    let contract = env.write("Token.move", "module 0x1::token {}");
    let backend = MockBackend::completion(REPORT);

    env.cmd()
        .arg("audit")
        .arg(&contract)
        .args(["--format", "text", "--endpoint", &backend.endpoint])
        .assert()
        .success()
        .stdout(predicate::str::contains("Contract: Token"))
        .stdout(predicate::str::contains("Security Score: 85/100 (Medium risk)"))
        .stdout(predicate::str::contains("High Severity Issues (1)"));
}

#[test]
fn test_config_file_selects_endpoint_and_sampling() {
    let env = TestEnv::new();
    let backend = MockBackend::completion("module 0x1::cfg {}");
    let config = env.write(
        "config.toml",
        &format!(
            "[backend]\nendpoint = \"{}\"\nmodel = \"codellama:7b\"\n\n[sampling]\ntemperature = 0.2\ngenerate_max_tokens = 64\n",
            backend.endpoint
        ),
    );

    env.cmd()
        .arg("--config")
        .arg(&config)
        .args(["generate", "a config-driven coin"])
        .assert()
        .success()
        .stdout("module 0x1::cfg {}\n");

    let request = backend.request();
    assert_eq!(request["model"], "codellama:7b");
    assert_eq!(request["options"]["num_predict"], 64);
    assert!((request["options"]["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
}

#[test]
fn test_missing_config_file_fails() {
    let env = TestEnv::new();
    env.cmd()
        .arg("--config")
        .arg(env.path("absent.toml"))
        .args(["generate", "a coin"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("config file not found"));
}

#[cfg(unix)]
#[test]
fn test_local_runner_backend() {
    let env = TestEnv::new();
    let config = env.write(
        "local.toml",
        r#"[backend]
kind = "local"
command = ["sh", "-c", "cat >/dev/null; echo '{\"summary\": \"local run\", \"issues\": []}'"]
"#,
    );

    let assert = env
        .cmd()
        .arg("--config")
        .arg(&config)
        .args(["audit", "module 0x1::m {}"])
        .assert()
        .success()
        .stderr(predicate::str::contains("local sh"));

    let report: serde_json::Value =
        serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(report["summary"], "local run");
}

#[test]
fn test_invocation_log_written() {
    let env = TestEnv::new();
    let log = env.path("logs/moveaudit.jsonl");
    env.cmd()
        .env("MOVEAUDIT_LOG_FILE", &log)
        .args(["audit", "--endpoint", &refused_endpoint()])
        .write_stdin("")
        .assert()
        .code(66);

    let line = std::fs::read_to_string(&log).unwrap();
    let entry: serde_json::Value = serde_json::from_str(line.trim()).unwrap();
    assert_eq!(entry["command"], "audit");
    assert_eq!(entry["exit_code"], 66);
    assert_eq!(entry["error"]["code"], "NoInput");
}
