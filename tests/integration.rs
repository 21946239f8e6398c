//! End-to-end tests driving the `docdex` binary.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn docdex_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("docdex");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let files_dir = root.join("files");
    fs::create_dir_all(&files_dir).unwrap();
    fs::write(
        files_dir.join("alpha.md"),
        "# Alpha Document\n\nThis is the alpha document about Rust programming.\n\nIt contains information about cargo and crates.",
    ).unwrap();
    fs::write(
        files_dir.join("beta.txt"),
        "Beta plain text file.\n\nContains notes about deployment and infrastructure.\n\nKubernetes and Docker are mentioned here.",
    ).unwrap();

    let config_content = format!(
        r#"[db]
path = "{}/data/docdex.sqlite"

[chunking]
max_chars = 500

[retrieval]
top_k = 3
"#,
        root.display()
    );

    let config_path = config_dir.join("docdex.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_docdex(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = docdex_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run docdex binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

/// Minimal docx (ZIP) with a single paragraph of custom text.
fn minimal_docx_with_text(phrase: &str) -> Vec<u8> {
    use std::io::Write;
    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(std::io::Cursor::new(&mut buf));
        zip.start_file(
            "word/document.xml",
            zip::write::SimpleFileOptions::default(),
        )
        .unwrap();
        let xml = format!(
            "<?xml version=\"1.0\"?><w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\"><w:body><w:p><w:r><w:t>{}</w:t></w:r></w:p></w:body></w:document>",
            phrase
        );
        zip.write_all(xml.as_bytes()).unwrap();
        zip.finish().unwrap();
    }
    buf
}

/// Pull the generated document id out of `add` output ("added doc-...").
fn parse_added_id(stdout: &str) -> String {
    stdout
        .lines()
        .find(|l| l.starts_with("added "))
        .and_then(|l| l.split_whitespace().nth(1))
        .map(|s| s.to_string())
        .unwrap_or_else(|| panic!("no added id in output: {}", stdout))
}

#[test]
fn init_creates_database() {
    let (tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_docdex(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));
    assert!(tmp.path().join("data").join("docdex.sqlite").exists());
}

#[test]
fn init_idempotent() {
    let (_tmp, config_path) = setup_test_env();

    let (_, _, success1) = run_docdex(&config_path, &["init"]);
    assert!(success1, "First init failed");

    let (_, _, success2) = run_docdex(&config_path, &["init"]);
    assert!(success2, "Second init failed (not idempotent)");
}

#[test]
fn add_markdown_and_list() {
    let (tmp, config_path) = setup_test_env();
    let alpha = tmp.path().join("files").join("alpha.md");

    run_docdex(&config_path, &["init"]);
    let (stdout, stderr, success) =
        run_docdex(&config_path, &["add", alpha.to_str().unwrap()]);
    assert!(success, "add failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("added doc-"));
    assert!(stdout.contains("name: alpha.md"));

    let (list_out, _, success) = run_docdex(&config_path, &["list"]);
    assert!(success);
    assert!(list_out.contains("1 document(s)"));
    assert!(list_out.contains("alpha.md"));
}

#[test]
fn add_then_search_finds_chunk() {
    let (tmp, config_path) = setup_test_env();
    let files = tmp.path().join("files");

    run_docdex(&config_path, &["init"]);
    run_docdex(&config_path, &["add", files.join("alpha.md").to_str().unwrap()]);
    run_docdex(&config_path, &["add", files.join("beta.txt").to_str().unwrap()]);

    let (stdout, _, success) = run_docdex(&config_path, &["search", "Rust programming"]);
    assert!(success, "search failed");
    assert!(
        stdout.contains("alpha.md"),
        "Expected alpha.md in results, got: {}",
        stdout
    );
}

#[test]
fn search_top_k_limits_hits() {
    let (tmp, config_path) = setup_test_env();
    let files = tmp.path().join("files");

    run_docdex(&config_path, &["init"]);
    run_docdex(&config_path, &["add", files.join("alpha.md").to_str().unwrap()]);
    run_docdex(&config_path, &["add", files.join("beta.txt").to_str().unwrap()]);

    let (stdout, _, success) = run_docdex(
        &config_path,
        &["search", "document notes information", "--top-k", "1"],
    );
    assert!(success);
    assert!(stdout.contains("1. "), "expected a first hit: {}", stdout);
    assert!(!stdout.contains("2. "), "top-k 1 must return one hit: {}", stdout);
}

#[test]
fn search_deterministic() {
    let (tmp, config_path) = setup_test_env();
    let files = tmp.path().join("files");

    run_docdex(&config_path, &["init"]);
    run_docdex(&config_path, &["add", files.join("alpha.md").to_str().unwrap()]);

    let (stdout1, _, _) = run_docdex(&config_path, &["search", "cargo crates"]);
    let (stdout2, _, _) = run_docdex(&config_path, &["search", "cargo crates"]);
    assert_eq!(stdout1, stdout2);
}

#[test]
fn search_no_results() {
    let (_tmp, config_path) = setup_test_env();

    run_docdex(&config_path, &["init"]);
    let (stdout, _, success) = run_docdex(&config_path, &["search", "xyznonexistent"]);
    assert!(success);
    assert!(stdout.contains("No results."));
}

#[test]
fn remove_deletes_document() {
    let (tmp, config_path) = setup_test_env();
    let alpha = tmp.path().join("files").join("alpha.md");

    run_docdex(&config_path, &["init"]);
    let (add_out, _, _) = run_docdex(&config_path, &["add", alpha.to_str().unwrap()]);
    let id = parse_added_id(&add_out);

    let (stdout, _, success) = run_docdex(&config_path, &["remove", &id]);
    assert!(success);
    assert!(stdout.contains("removed"));

    let (list_out, _, _) = run_docdex(&config_path, &["list"]);
    assert!(list_out.contains("0 document(s)"));

    let (search_out, _, _) = run_docdex(&config_path, &["search", "Rust programming"]);
    assert!(search_out.contains("No results."));
}

#[test]
fn remove_missing_id_succeeds() {
    let (_tmp, config_path) = setup_test_env();

    run_docdex(&config_path, &["init"]);
    let (_, stderr, success) = run_docdex(&config_path, &["remove", "doc-0-missing"]);
    assert!(success, "remove of missing id should be a no-op: {}", stderr);
}

#[test]
fn add_unsupported_extension_fails() {
    let (tmp, config_path) = setup_test_env();
    let bad = tmp.path().join("files").join("image.png");
    fs::write(&bad, [0u8; 32]).unwrap();

    run_docdex(&config_path, &["init"]);
    let (_, stderr, success) = run_docdex(&config_path, &["add", bad.to_str().unwrap()]);
    assert!(!success, "unsupported format must fail");
    assert!(
        stderr.contains("unsupported file type"),
        "Should report the unsupported type, got: {}",
        stderr
    );

    let (list_out, _, _) = run_docdex(&config_path, &["list"]);
    assert!(list_out.contains("0 document(s)"), "no partial state");
}

#[test]
fn add_empty_file_fails() {
    let (tmp, config_path) = setup_test_env();
    let blank = tmp.path().join("files").join("blank.txt");
    fs::write(&blank, "   \n\n  ").unwrap();

    run_docdex(&config_path, &["init"]);
    let (_, stderr, success) = run_docdex(&config_path, &["add", blank.to_str().unwrap()]);
    assert!(!success, "empty file must fail extraction");
    assert!(
        stderr.contains("extraction failed"),
        "Should report extraction failure, got: {}",
        stderr
    );

    let (list_out, _, _) = run_docdex(&config_path, &["list"]);
    assert!(list_out.contains("0 document(s)"));
}

#[test]
fn add_docx_and_search() {
    let (tmp, config_path) = setup_test_env();
    let docx = tmp.path().join("files").join("minutes.docx");
    fs::write(&docx, minimal_docx_with_text("quarterly planning meeting notes")).unwrap();

    run_docdex(&config_path, &["init"]);
    let (stdout, stderr, success) = run_docdex(&config_path, &["add", docx.to_str().unwrap()]);
    assert!(success, "docx add failed: stdout={}, stderr={}", stdout, stderr);

    let (search_out, _, success) =
        run_docdex(&config_path, &["search", "quarterly planning"]);
    assert!(success);
    assert!(
        search_out.contains("minutes.docx"),
        "search should resolve the docx by name, got: {}",
        search_out
    );
}

#[test]
fn add_corrupt_pdf_fails() {
    let (tmp, config_path) = setup_test_env();
    let pdf = tmp.path().join("files").join("bad.pdf");
    fs::write(&pdf, b"not a valid pdf").unwrap();

    run_docdex(&config_path, &["init"]);
    let (_, stderr, success) = run_docdex(&config_path, &["add", pdf.to_str().unwrap()]);
    assert!(!success, "corrupt pdf must fail");
    assert!(
        stderr.contains("extraction failed"),
        "Should report extraction failure, got: {}",
        stderr
    );
}
