//! Runs the `s3dist` binary against a temporary local release tree.

use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// Test context with a temporary release directory served by the local backend
struct TestContext {
    repo: TempDir,
}

impl TestContext {
    fn new() -> Self {
        let repo = TempDir::new().expect("failed to create temp dir");
        let ctx = Self { repo };
        ctx.write("acme/stable/1.2.0/app.exe", b"windows build");
        ctx.write("acme/stable/1.2.0/app.dmg", b"mac build");
        ctx.write("acme/beta/1.3.0/app.exe", b"beta build");
        ctx.write("acme/readme.txt", b"not a release");
        ctx
    }

    fn write(&self, key: &str, contents: &[u8]) {
        let path = self.repo.path().join(key);
        std::fs::create_dir_all(path.parent().unwrap()).expect("failed to create dirs");
        std::fs::write(path, contents).expect("failed to write object");
    }

    fn cmd(&self) -> Command {
        let bin_path = env!("CARGO_BIN_EXE_s3dist");
        let mut cmd = Command::new(bin_path);
        for var in [
            "S3DIST_BACKEND",
            "S3DIST_PREFIX",
            "S3DIST_KEY",
            "S3DIST_SECRET",
            "S3DIST_BUCKET",
            "S3DIST_REGION",
            "S3DIST_ENDPOINT",
            "S3DIST_ROOT",
            "S3DIST_BASE_URL",
        ] {
            cmd.env_remove(var);
        }
        cmd
    }

    fn local_cmd(&self) -> Command {
        let mut cmd = self.cmd();
        cmd.env("S3DIST_BACKEND", "local")
            .env("S3DIST_ROOT", self.repo.path())
            .env("S3DIST_BASE_URL", "https://dl.example.com")
            .env("S3DIST_PREFIX", "acme/");
        cmd
    }
}

fn stdout(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn test_help_command() {
    let ctx = TestContext::new();
    let output = ctx.cmd().arg("--help").output().expect("failed to run s3dist");

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("list"));
    assert!(text.contains("fetch"));
}

#[test]
fn test_list_json() {
    let ctx = TestContext::new();
    let output = ctx
        .local_cmd()
        .args(["list", "--json"])
        .output()
        .expect("failed to run s3dist");

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let tags: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["tag_name"].as_str().unwrap())
        .collect();
    assert_eq!(tags, vec!["1.2.0-stable", "1.3.0-beta"]);
}

#[test]
fn test_list_channel_filter() {
    let ctx = TestContext::new();
    let output = ctx
        .local_cmd()
        .args(["list", "--channel", "beta"])
        .output()
        .expect("failed to run s3dist");

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("1.3.0-beta"));
    assert!(!text.contains("1.2.0-stable"));
}

#[test]
fn test_url_prints_redirect_target() {
    let ctx = TestContext::new();
    let output = ctx
        .local_cmd()
        .args(["url", "1.2.0", "app.dmg"])
        .output()
        .expect("failed to run s3dist");

    assert!(output.status.success());
    assert_eq!(
        stdout(&output).trim(),
        "https://dl.example.com/acme/stable/1.2.0/app.dmg"
    );
}

#[test]
fn test_fetch_writes_file() {
    let ctx = TestContext::new();
    let out_dir = TempDir::new().unwrap();
    let dest = out_dir.path().join("app.exe");

    let output = ctx
        .local_cmd()
        .args(["fetch", "1.2.0", "app.exe", "-o"])
        .arg(&dest)
        .output()
        .expect("failed to run s3dist");

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(std::fs::read(Path::new(&dest)).unwrap(), b"windows build");
}

#[test]
fn test_unknown_asset_fails() {
    let ctx = TestContext::new();
    let output = ctx
        .local_cmd()
        .args(["url", "9.9.9", "app.exe"])
        .output()
        .expect("failed to run s3dist");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("9.9.9"));
}

#[test]
fn test_missing_bucket_is_fatal() {
    let ctx = TestContext::new();
    let output = ctx
        .cmd()
        .args(["--key", "AKIA", "--secret", "shh", "list"])
        .output()
        .expect("failed to run s3dist");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("bucket"));
}
