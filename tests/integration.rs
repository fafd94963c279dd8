use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn dqa_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("dqa");
    path
}

fn minimal_docx_with_text(phrase: &str) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(std::io::Cursor::new(&mut buf));
        zip.start_file("word/document.xml", zip::write::SimpleFileOptions::default())
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

fn setup_test_env(with_documents: bool) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let docs_dir = root.join("docs");
    fs::create_dir_all(&docs_dir).unwrap();

    if with_documents {
        fs::write(
            docs_dir.join("alpha.docx"),
            minimal_docx_with_text("The alpha service guarantees four nines of uptime."),
        )
        .unwrap();
        fs::write(
            docs_dir.join("beta.docx"),
            minimal_docx_with_text("Support requests are answered within one business day."),
        )
        .unwrap();
    }

    let config_content = format!(
        r#"[data]
folder = "{}/docs"

[chunking]
chunk_size = 40

[retrieval]
top_k = 3
"#,
        root.display()
    );

    let config_path = root.join("dqa.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_dqa(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = dqa_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .env_remove("OPENAI_API_KEY")
        .output()
        .unwrap_or_else(|e| panic!("Failed to run dqa binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

#[test]
fn test_stats_counts_documents_and_chunks() {
    let (_tmp, config_path) = setup_test_env(true);

    let (stdout, stderr, success) = run_dqa(&config_path, &["stats"]);
    assert!(success, "stats failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("documents: 2"));
    // 50 and 54 chars at chunk_size 40 -> 2 chunks each.
    assert!(stdout.contains("chunks: 4"));
    assert!(stdout.contains("embedding batches: 1"));
    assert!(stdout.contains("ok"));
}

#[test]
fn test_stats_empty_folder_reports_no_knowledge_base() {
    let (_tmp, config_path) = setup_test_env(false);

    let (stdout, _, success) = run_dqa(&config_path, &["stats"]);
    assert!(success);
    assert!(stdout.contains("documents: 0"));
    assert!(stdout.contains("no knowledge base"));
}

#[test]
fn test_stats_missing_folder_is_not_an_error() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("dqa.toml");
    fs::write(
        &config_path,
        "[data]\nfolder = \"/nonexistent/never/here\"\n",
    )
    .unwrap();

    let (stdout, _, success) = run_dqa(&config_path, &["stats"]);
    assert!(success);
    assert!(stdout.contains("no knowledge base"));
}

#[test]
fn test_stats_skips_broken_files_with_warning() {
    let (_tmp, config_path) = setup_test_env(true);
    let docs = config_path.parent().unwrap().join("docs");
    fs::write(docs.join("broken.docx"), b"definitely not a zip").unwrap();

    let (stdout, stderr, success) = run_dqa(&config_path, &["stats"]);
    assert!(success);
    assert!(stdout.contains("documents: 2"), "broken file must be skipped");
    assert!(stderr.contains("broken.docx"), "skip must be reported");
}

#[test]
fn test_ask_without_api_key_fails_cleanly() {
    let (_tmp, config_path) = setup_test_env(true);

    let (_, stderr, success) = run_dqa(&config_path, &["ask", "What is the SLA?"]);
    assert!(!success);
    assert!(stderr.contains("OPENAI_API_KEY"));
}

#[test]
fn test_ask_rejects_blank_question() {
    let (_tmp, config_path) = setup_test_env(true);

    let (_, stderr, success) = run_dqa(&config_path, &["ask", "   "]);
    assert!(!success);
    assert!(stderr.contains("Question is empty"));
}

#[test]
fn test_invalid_config_rejected() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("dqa.toml");
    fs::write(&config_path, "[chunking]\nchunk_size = 0\n").unwrap();

    let (_, stderr, success) = run_dqa(&config_path, &["stats"]);
    assert!(!success);
    assert!(stderr.contains("chunk_size"));
}

#[test]
fn test_fill_with_no_questions_fails() {
    let (_tmp, config_path) = setup_test_env(true);
    let questions = config_path.parent().unwrap().join("questions.txt");
    fs::write(&questions, "\n\n").unwrap();

    let (_, stderr, success) = run_dqa(&config_path, &["fill", questions.to_str().unwrap()]);
    assert!(!success);
    assert!(stderr.contains("No questions found"));
}
