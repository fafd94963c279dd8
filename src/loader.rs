//! Document folder loader.
//!
//! Walks the configured folder, extracts text from every supported file
//! (PDF, DOCX, XLSX), and returns ordered (name, text) pairs for the
//! corpus builder. One unreadable or malformed file never aborts the
//! scan — it is reported to stderr and skipped, along with any file
//! whose extracted text is blank. A missing folder is an empty corpus,
//! not an error.

use std::path::Path;

use walkdir::WalkDir;

use crate::extract::{extract_text, DocFormat};

/// Load every supported document under `folder`, in deterministic
/// (sorted relative path) order. Names are paths relative to `folder`.
pub fn load_all_documents(folder: &Path) -> Vec<(String, String)> {
    if !folder.is_dir() {
        return Vec::new();
    }

    let mut documents = Vec::new();

    for entry in WalkDir::new(folder).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let format = match DocFormat::from_path(path) {
            Some(f) => f,
            None => continue,
        };

        let name = path
            .strip_prefix(folder)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string();

        let bytes = match std::fs::read(path) {
            Ok(b) => b,
            Err(e) => {
                eprintln!("Warning: skipping {}: {}", name, e);
                continue;
            }
        };

        let text = match extract_text(&bytes, format) {
            Ok(t) => t,
            Err(e) => {
                eprintln!("Warning: skipping {}: {}", name, e);
                continue;
            }
        };

        if text.trim().is_empty() {
            continue;
        }

        documents.push((name, text));
    }

    documents.sort_by(|a, b| a.0.cmp(&b.0));
    documents
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_docx(path: &Path, text: &str) {
        let mut bytes = Vec::new();
        {
            let mut writer = zip::ZipWriter::new(std::io::Cursor::new(&mut bytes));
            writer
                .start_file("word/document.xml", zip::write::SimpleFileOptions::default())
                .unwrap();
            let xml = format!(
                "<?xml version=\"1.0\"?><w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\"><w:body><w:p><w:r><w:t>{}</w:t></w:r></w:p></w:body></w:document>",
                text
            );
            writer.write_all(xml.as_bytes()).unwrap();
            writer.finish().unwrap();
        }
        std::fs::write(path, bytes).unwrap();
    }

    #[test]
    fn test_missing_folder_is_empty() {
        let docs = load_all_documents(Path::new("/nonexistent/folder"));
        assert!(docs.is_empty());
    }

    #[test]
    fn test_unsupported_files_ignored() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(tmp.path().join("readme.md"), "ignored").unwrap();
        std::fs::write(tmp.path().join("data.bin"), [0u8; 16]).unwrap();
        assert!(load_all_documents(tmp.path()).is_empty());
    }

    #[test]
    fn test_bad_file_skipped_good_file_loaded() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(tmp.path().join("broken.docx"), b"not a zip").unwrap();
        write_docx(&tmp.path().join("good.docx"), "usable content");

        let docs = load_all_documents(tmp.path());
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].0, "good.docx");
        assert_eq!(docs[0].1, "usable content");
    }

    #[test]
    fn test_blank_document_skipped() {
        let tmp = tempfile::TempDir::new().unwrap();
        write_docx(&tmp.path().join("blank.docx"), "   ");
        assert!(load_all_documents(tmp.path()).is_empty());
    }

    #[test]
    fn test_sorted_relative_names() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::create_dir(tmp.path().join("sub")).unwrap();
        write_docx(&tmp.path().join("zeta.docx"), "z");
        write_docx(&tmp.path().join("sub/alpha.docx"), "a");

        let docs = load_all_documents(tmp.path());
        let names: Vec<&str> = docs.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["sub/alpha.docx", "zeta.docx"]);
    }
}
