//! Integration tests for the `blogmark` binary.

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

fn blogmark_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_blogmark"))
}

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn temp_out(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join("blogmark-cli-test").join(name);
    // Clean up from previous runs
    let _ = fs::remove_dir_all(&dir);
    dir
}

fn run(args: &[&str]) -> Output {
    Command::new(blogmark_bin())
        .args(args)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run blogmark")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn render_strips_front_matter() {
    let file = fixture("posts/safety-tips.md");
    let output = run(&["render", file.to_str().unwrap()]);
    assert!(output.status.success());

    let html = stdout(&output);
    assert_eq!(
        html.trim_end(),
        "<h2>Meet in public</h2><p>Always <em>verify</em> identity before paying. \
         Use <code>code</code> spans for IDs like <code>**A-17**</code>.</p>"
    );
    assert!(!html.contains("title:"));
}

#[test]
fn render_to_file() {
    let out = temp_out("render-to-file");
    fs::create_dir_all(&out).unwrap();
    let target = out.join("hiring.html");

    let file = fixture("posts/hiring-guide.md");
    let output = run(&["render", file.to_str().unwrap(), "--out", target.to_str().unwrap(), "--quiet"]);
    assert!(output.status.success());
    assert!(stdout(&output).is_empty());

    let html = fs::read_to_string(&target).unwrap();
    assert!(html.starts_with("<h1>How to Hire the Right Provider</h1>"));
    assert!(html.contains("<pre><code>curl https://api.example.com/jobs</code></pre>"));

    let _ = fs::remove_dir_all(&out);
}

#[test]
fn render_missing_file_fails() {
    let output = run(&["render", "does-not-exist.md"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("does-not-exist.md"));
}

#[test]
fn check_clean_posts_ok() {
    let a = fixture("posts/hiring-guide.md");
    let b = fixture("posts/safety-tips.md");
    let output = run(&["check", a.to_str().unwrap(), b.to_str().unwrap()]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).matches(": OK").count(), 2);
}

#[test]
fn check_missing_excerpt_exits_nonzero() {
    let file = fixture("draft.md");
    let output = run(&["check", file.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));

    let text = stdout(&output);
    assert!(text.contains("error: [E003] Missing required field: excerpt"), "{text}");
}

#[test]
fn check_warnings_do_not_fail() {
    let file = fixture("unsafe.md");
    let path = file.to_str().unwrap();
    let output = run(&["check", path]);
    assert!(output.status.success());

    let text = stdout(&output);
    assert!(text.contains(&format!("{path}:3: warning: [W003]")), "{text}");
    assert!(text.contains(&format!("{path}:3: info: [I001]")), "{text}");
    assert!(text.contains(&format!("{path}:5: warning: [W004]")), "{text}");
}

#[test]
fn build_writes_posts_and_index() {
    let out = temp_out("build-posts");
    let config = fixture("blogmark.json");
    let output = run(&[
        "build",
        "--config",
        config.to_str().unwrap(),
        "--out",
        out.to_str().unwrap(),
        "--quiet",
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let hiring = fs::read_to_string(out.join("hiring-guide.html")).unwrap();
    // blogmark.json turns off new-tab links.
    assert!(hiring.contains(r#"<a href="/blog/safety">safety guide</a>"#), "{hiring}");
    assert!(out.join("safety-tips.html").exists());

    let index: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("posts.json")).unwrap()).unwrap();
    let entries = index.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["slug"], "hiring-guide");
    assert_eq!(entries[0]["author"], "Ada Obi");
    assert_eq!(entries[0]["featured"], true);
    assert_eq!(entries[1]["slug"], "safety-tips");
    assert_eq!(entries[1]["author"], "HeyB Editorial");
    assert_eq!(entries[1]["file"], "safety-tips.html");

    let _ = fs::remove_dir_all(&out);
}

#[test]
fn rebuild_skips_unchanged_unless_forced() {
    let out = temp_out("build-unchanged");
    let config = fixture("blogmark.json");
    let args = |extra: &[&str]| {
        let mut args = vec![
            "build".to_string(),
            "--config".to_string(),
            config.to_str().unwrap().to_string(),
            "--out".to_string(),
            out.to_str().unwrap().to_string(),
        ];
        args.extend(extra.iter().map(|s| s.to_string()));
        args
    };
    let run_owned = |args: Vec<String>| {
        let refs: Vec<&str> = args.iter().map(String::as_str).collect();
        run(&refs)
    };

    let first = run_owned(args(&[]));
    assert!(stdout(&first).contains("3 created"), "{}", stdout(&first));

    let second = run_owned(args(&[]));
    assert!(stdout(&second).contains("3 unchanged"), "{}", stdout(&second));

    let forced = run_owned(args(&["--force"]));
    assert!(stdout(&forced).contains("3 updated"), "{}", stdout(&forced));

    let _ = fs::remove_dir_all(&out);
}

#[test]
fn build_without_posts_dir_fails() {
    let root = temp_out("build-no-posts");
    fs::create_dir_all(&root).unwrap();
    let config = root.join("blogmark.json");

    let output = run(&["build", "--config", config.to_str().unwrap(), "--quiet"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Posts directory"));

    let _ = fs::remove_dir_all(&root);
}
