use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread::JoinHandle;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use assert_fs::prelude::*;
use predicates::prelude::*;

const FINGERPRINT: &str = "3d8b4357fd879a68b17cd63e515fd6d483835295";
const KEY_ID: &str = "515fd6d483835295";
const WKD_HASH: &str = "dizb37aqa5h4skgu7jf1xjr4q71w4paq";

/// Armored `[1, 2, 3]` without a checksum line.
const ARMORED_KEY: &str =
    "-----BEGIN PGP PUBLIC KEY BLOCK-----\n\nAQID\n-----END PGP PUBLIC KEY BLOCK-----\n";

/// Run webkey isolated from the caller's environment.
fn webkey() -> Command {
    let mut cmd = cargo_bin_cmd!("webkey");
    cmd.env_remove("WEBKEY_SERVICE_URL")
        .env_remove("WEBKEY_STORAGE")
        .env_remove("WEBKEY_BIND")
        .env_remove("RUST_LOG");
    cmd
}

/// Answer `requests` HTTP requests with `body`, then stop.
fn serve_json(body: String, requests: usize) -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/certificate.json", listener.local_addr().unwrap());
    let handle = std::thread::spawn(move || {
        for _ in 0..requests {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 8192];
            let _ = stream.read(&mut buf).unwrap();
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
        }
    });
    (url, handle)
}

fn flat_listing() -> String {
    serde_json::json!([{
        "domain": "example.com",
        "wkd_hash": WKD_HASH,
        "fingerprint": FINGERPRINT,
        "key_id": KEY_ID,
        "primary_user": "Jane Doe <Jane@Example.com>",
        "key_data": ARMORED_KEY,
    }])
    .to_string()
}

// ─── Sync tests ──────────────────────────────────────────────────

#[test]
fn sync_writes_every_lookup_subtree() {
    let dir = assert_fs::TempDir::new().unwrap();
    let (url, server) = serve_json(flat_listing(), 1);

    webkey()
        .current_dir(dir.path())
        .args(["sync", "--storage", "keys", "--webkey-service-url", &url])
        .assert()
        .success()
        .stdout(predicate::str::contains("Webkey Directory: syncing web keys"))
        .stdout(predicate::str::contains("—").not())
        .stdout(predicate::str::contains("Web keys successfully synced!"));
    server.join().unwrap();

    let keys = dir.child("keys");
    keys.child(format!("vks/fingerprint/{FINGERPRINT}"))
        .assert(ARMORED_KEY);
    keys.child(format!("vks/keyid/{KEY_ID}")).assert(ARMORED_KEY);

    let email = std::fs::read_to_string(keys.path().join("vks/email/jane@example.com")).unwrap();
    assert!(email.starts_with("-----BEGIN PGP PUBLIC KEY BLOCK-----\n\nAQID\n="));
    assert!(email.ends_with("-----END PGP PUBLIC KEY BLOCK-----\n"));

    let wkd = std::fs::read_to_string(keys.path().join(format!("wkd/example.com/{WKD_HASH}")))
        .unwrap();
    assert_eq!(wkd, email);
}

#[test]
fn sync_accepts_url_alias_and_env() {
    let dir = assert_fs::TempDir::new().unwrap();
    let (url, server) = serve_json(flat_listing(), 2);

    webkey()
        .current_dir(dir.path())
        .args(["sync", "--storage", "a", "--url", &url])
        .assert()
        .success();

    webkey()
        .current_dir(dir.path())
        .env("WEBKEY_SERVICE_URL", &url)
        .env("WEBKEY_STORAGE", "b")
        .arg("sync")
        .assert()
        .success();
    server.join().unwrap();

    dir.child(format!("a/vks/keyid/{KEY_ID}")).assert(predicate::path::is_file());
    dir.child(format!("b/vks/keyid/{KEY_ID}")).assert(predicate::path::is_file());
}

#[test]
fn sync_prompts_for_missing_url() {
    let dir = assert_fs::TempDir::new().unwrap();
    let (url, server) = serve_json(flat_listing(), 1);

    webkey()
        .current_dir(dir.path())
        .args(["sync", "--storage", "keys"])
        .write_stdin(format!("{url}\n"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Please enter the webkey service url:"))
        .stdout(predicate::str::contains("Web keys successfully synced!"));
    server.join().unwrap();

    dir.child(format!("keys/vks/fingerprint/{FINGERPRINT}"))
        .assert(predicate::path::is_file());
}

#[test]
fn sync_fails_when_url_is_left_empty() {
    let dir = assert_fs::TempDir::new().unwrap();

    webkey()
        .current_dir(dir.path())
        .args(["sync", "--storage", "keys"])
        .write_stdin("\n")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "webkey-service-url parameter is missing!",
        ));

    dir.child("keys").assert(predicate::path::missing());
}

#[test]
fn sync_fails_on_unreachable_service() {
    let dir = assert_fs::TempDir::new().unwrap();
    // Bind then drop to get a port nobody listens on.
    let port = TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();

    webkey()
        .current_dir(dir.path())
        .args(["sync", "--storage", "keys", "--webkey-service-url"])
        .arg(format!("http://127.0.0.1:{port}/certificate.json"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Failed to fetch"));
}

#[test]
fn sync_rejects_malformed_listing() {
    let dir = assert_fs::TempDir::new().unwrap();
    let (url, server) = serve_json("not json".into(), 1);

    webkey()
        .current_dir(dir.path())
        .args(["sync", "--storage", "keys", "--webkey-service-url", &url])
        .assert()
        .failure()
        .code(1);
    server.join().unwrap();

    dir.child("keys").assert(predicate::path::missing());
}

#[test]
fn sync_writes_grouped_listing() {
    let dir = assert_fs::TempDir::new().unwrap();
    let body = format!(
        r#"{{
            "fingerprint": {{ "{FINGERPRINT}": "fp-payload" }},
            "email": {{ "jane@example.com": "email-payload" }},
            "domain": {{ "example.com": {{ "{WKD_HASH}": "wkd-payload" }} }}
        }}"#
    );
    let (url, server) = serve_json(body, 1);

    webkey()
        .current_dir(dir.path())
        .args(["sync", "--storage", "keys", "--webkey-service-url", &url])
        .assert()
        .success();
    server.join().unwrap();

    let keys = dir.child("keys");
    keys.child(format!("vks/fingerprint/{FINGERPRINT}"))
        .assert("fp-payload");
    keys.child("vks/email/jane@example.com").assert("email-payload");
    keys.child(format!("wkd/example.com/{WKD_HASH}"))
        .assert("wkd-payload");
    keys.child("vks/keyid").assert(predicate::path::missing());
}

#[test]
fn sync_empty_listing_writes_nothing() {
    let dir = assert_fs::TempDir::new().unwrap();
    let (url, server) = serve_json("[]".into(), 1);

    webkey()
        .current_dir(dir.path())
        .args(["sync", "--storage", "keys", "--webkey-service-url", &url])
        .assert()
        .success()
        .stdout(predicate::str::contains("Web keys successfully synced!"));
    server.join().unwrap();

    dir.child("keys/vks").assert(predicate::path::missing());
}

#[test]
fn sync_twice_is_idempotent() {
    let dir = assert_fs::TempDir::new().unwrap();
    let (url, server) = serve_json(flat_listing(), 2);
    let email = dir.path().join("keys/vks/email/jane@example.com");

    webkey()
        .current_dir(dir.path())
        .args(["sync", "--storage", "keys", "--webkey-service-url", &url])
        .assert()
        .success();
    let first = std::fs::read(&email).unwrap();

    webkey()
        .current_dir(dir.path())
        .args(["sync", "--storage", "keys", "--webkey-service-url", &url])
        .assert()
        .success();
    server.join().unwrap();

    assert_eq!(std::fs::read(&email).unwrap(), first);
}

#[test]
fn quiet_sync_prints_nothing() {
    let dir = assert_fs::TempDir::new().unwrap();
    let (url, server) = serve_json(flat_listing(), 1);

    webkey()
        .current_dir(dir.path())
        .args(["sync", "-q", "--storage", "keys", "--webkey-service-url", &url])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    server.join().unwrap();
}

#[test]
fn storage_root_comes_from_config_file() {
    let dir = assert_fs::TempDir::new().unwrap();
    dir.child("webkey.toml")
        .write_str("[storage]\nroot = \"from-config\"\n")
        .unwrap();
    let (url, server) = serve_json(flat_listing(), 1);

    webkey()
        .current_dir(dir.path())
        .args(["sync", "--webkey-service-url", &url])
        .assert()
        .success();
    server.join().unwrap();

    dir.child(format!("from-config/vks/keyid/{KEY_ID}"))
        .assert(predicate::path::is_file());
}

#[test]
fn invalid_config_file_fails() {
    let dir = assert_fs::TempDir::new().unwrap();
    dir.child("webkey.toml")
        .write_str("[sync]\ntimeout_secs = 0\n")
        .unwrap();

    webkey()
        .current_dir(dir.path())
        .args(["sync", "--webkey-service-url", "http://127.0.0.1:1/"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("timeout_secs"));
}
