use assert_cmd::Command;
use git2::{IndexAddOption, Repository};
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn preview() -> Command {
    Command::cargo_bin("git-push-preview").unwrap()
}

/// helper to commit the whole working tree of `repo`
fn commit_all(repo: &Repository, message: &str) {
    let mut index = repo.index().unwrap();
    index
        .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
        .unwrap();
    index.write().unwrap();

    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
    let signature = git2::Signature::now("Test User", "test@example.com").unwrap();
    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();

    repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
        .unwrap();
}

#[test]
fn test_help_lists_flags() {
    preview()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--remote"))
        .stdout(predicate::str::contains("--json"));
}

#[test]
fn test_outside_repository_fails() {
    let temp_dir = TempDir::new().unwrap();

    preview()
        .args(["--json", "-C"])
        .arg(temp_dir.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("not in a git repository"));
}

#[test]
fn test_non_interactive_requires_json() {
    let temp_dir = TempDir::new().unwrap();

    // stdin/stdout are pipes under the test harness
    preview()
        .arg("-C")
        .arg(temp_dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("interactive terminal required"));
}

#[test]
fn test_unknown_flag_is_rejected() {
    preview().arg("--no-such-flag").assert().failure().code(2);
}

#[test]
fn test_json_lists_pending_entry_first() {
    let repo_dir = TempDir::new().unwrap();
    let remote_dir = TempDir::new().unwrap();
    Repository::init_bare(remote_dir.path()).unwrap();

    let repo = Repository::init(repo_dir.path()).unwrap();
    repo.remote("origin", remote_dir.path().to_str().unwrap())
        .unwrap();
    fs::create_dir(repo_dir.path().join("src")).unwrap();
    fs::write(repo_dir.path().join("src/main.rs"), "fn main() {}\n").unwrap();
    commit_all(&repo, "initial commit");
    fs::write(repo_dir.path().join("src/main.rs"), "fn main() { run() }\n").unwrap();
    fs::write(repo_dir.path().join("README.md"), "readme\n").unwrap();
    commit_all(&repo, "add readme");
    let branch = repo.head().unwrap().shorthand().unwrap().to_string();

    let output = preview()
        .args(["--json", "-C"])
        .arg(repo_dir.path())
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let entries: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 3);

    let pending = &entries[0]["entry"];
    assert_eq!(pending["kind"], "pending");
    assert_eq!(
        pending["message"],
        format!("{branch} → origin : {branch}")
    );
    // git lists README.md before src/main.rs
    let files = pending["files"].as_array().unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0]["path"], "README.md");
    assert_eq!(files[0]["status"], "A");
    // src/main.rs is diffed against the root commit's missing parent
    assert_eq!(files[1]["path"], "src/main.rs");
    assert_eq!(files[1]["status"], "M");
    assert_eq!(files[1]["parent_hash"], serde_json::Value::Null);

    assert_eq!(entries[1]["entry"]["kind"], "commit");
    assert_eq!(entries[1]["entry"]["message"], "add readme");
    assert_eq!(entries[2]["entry"]["message"], "initial commit");
    assert_eq!(entries[2]["entry"]["parent_hash"], serde_json::Value::Null);

    // trees are rooted at the workspace folder
    let workspace = repo_dir
        .path()
        .file_name()
        .unwrap()
        .to_string_lossy()
        .to_string();
    assert_eq!(entries[0]["tree"]["type"], "folder");
    assert_eq!(entries[0]["tree"]["name"], workspace);
}
