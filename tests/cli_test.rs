//! Binary-level tests for the `chatline` CLI

mod common;

use assert_cmd::Command;
use predicates::prelude::*;

use common::temp_config_file;

fn chatline() -> Command {
    let mut cmd = Command::cargo_bin("chatline").expect("binary builds");
    for var in [
        "CHATLINE_CONFIG",
        "CHATLINE_BASE_URL",
        "CHATLINE_API_TOKEN",
        "CHATLINE_TIMEOUT_SECONDS",
        "CHATLINE_USER_NAME",
        "CHATLINE_USER_EMAIL",
        "CHATLINE_APP_SCHEME",
        "CHATLINE_WEB_BASE_URL",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn test_help_lists_commands() {
    chatline()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("chat"))
        .stdout(predicate::str::contains("history"))
        .stdout(predicate::str::contains("shared"));
}

#[test]
fn test_shared_signed_out_prompts_for_sign_in() {
    // Unreachable base URL: a signed-out viewer must never trigger a fetch.
    let (_dir, path) = temp_config_file("service:\n  base_url: http://127.0.0.1:9\n");
    chatline()
        .args(["--config", path.to_str().unwrap(), "shared", "abc"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sign in to view this shared chat."));
}

#[test]
fn test_shared_links_printed() {
    let (_dir, path) = temp_config_file(
        "service:\n  base_url: http://127.0.0.1:9\nshare:\n  app_scheme: chatline\n  web_base_url: https://chat.example.com\n",
    );
    chatline()
        .args(["--config", path.to_str().unwrap(), "shared", "abc", "--links"])
        .assert()
        .success()
        .stdout(predicate::str::contains("chatline://chat/shared/abc"))
        .stdout(predicate::str::contains("https://chat.example.com/chat/shared/abc"));
}

#[test]
fn test_invalid_config_fails() {
    let (_dir, path) = temp_config_file("service:\n  timeout_seconds: 0\n");
    chatline()
        .args(["--config", path.to_str().unwrap(), "history", "list"])
        .assert()
        .failure();
}
