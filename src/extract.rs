//! Text extraction for binary document formats (PDF, DOCX, XLSX).
//!
//! The loader hands this module raw file bytes and a detected format;
//! it returns plain UTF-8 text ready for chunking. Extraction never
//! panics on malformed input — errors are returned and the loader skips
//! the offending file.
//!
//! Layout of the extracted text:
//! - **PDF**: page text as produced by `pdf-extract`, concatenated.
//! - **DOCX**: one line per paragraph (`<w:p>`), text runs joined.
//! - **XLSX**: every sheet, each introduced by a `Sheet: {name}` header;
//!   one line per row with non-blank cell values joined by `" | "`.

use std::io::Read;
use std::path::Path;

use thiserror::Error;

/// Cap on sheets processed per workbook.
const XLSX_MAX_SHEETS: usize = 100;
/// Cap on cells read per sheet (avoids unbounded memory).
const XLSX_MAX_CELLS_PER_SHEET: usize = 100_000;
/// Cap on decompressed bytes per ZIP entry (zip-bomb protection).
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

/// Document formats the loader understands, detected by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocFormat {
    Pdf,
    Docx,
    Xlsx,
}

impl DocFormat {
    /// Detect the format from a path's extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(DocFormat::Pdf),
            "docx" => Some(DocFormat::Docx),
            "xlsx" => Some(DocFormat::Xlsx),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("OOXML extraction failed: {0}")]
    Ooxml(String),
}

/// Extract plain text from document bytes.
pub fn extract_text(bytes: &[u8], format: DocFormat) -> Result<String, ExtractError> {
    match format {
        DocFormat::Pdf => extract_pdf(bytes),
        DocFormat::Docx => extract_docx(bytes),
        DocFormat::Xlsx => extract_xlsx(bytes),
    }
}

fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))
}

fn read_zip_entry_bounded(
    archive: &mut zip::ZipArchive<std::io::Cursor<&[u8]>>,
    name: &str,
    max_bytes: u64,
) -> Result<Vec<u8>, ExtractError> {
    let entry = archive
        .by_name(name)
        .map_err(|e| ExtractError::Ooxml(e.to_string()))?;
    let mut out = Vec::new();
    entry
        .take(max_bytes)
        .read_to_end(&mut out)
        .map_err(|e| ExtractError::Ooxml(e.to_string()))?;
    if out.len() as u64 >= max_bytes {
        return Err(ExtractError::Ooxml(format!(
            "ZIP entry {} exceeds size limit ({} bytes)",
            name, max_bytes
        )));
    }
    Ok(out)
}

// ============ DOCX ============

fn extract_docx(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))
        .map_err(|e| ExtractError::Ooxml(e.to_string()))?;
    let doc_xml = read_zip_entry_bounded(&mut archive, "word/document.xml", MAX_XML_ENTRY_BYTES)?;
    extract_paragraphs(&doc_xml)
}

/// Collect `<w:t>` runs grouped by their enclosing `<w:p>` paragraph,
/// one output line per paragraph.
fn extract_paragraphs(xml: &[u8]) -> Result<String, ExtractError> {
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_t = false;

    let mut reader = quick_xml::Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e)) => {
                if e.local_name().as_ref() == b"t" {
                    in_t = true;
                }
            }
            Ok(quick_xml::events::Event::Text(te)) if in_t => {
                current.push_str(te.unescape().unwrap_or_default().as_ref());
            }
            Ok(quick_xml::events::Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_t = false,
                b"p" => {
                    paragraphs.push(std::mem::take(&mut current));
                    in_t = false;
                }
                _ => {}
            },
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => return Err(ExtractError::Ooxml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    if !current.is_empty() {
        paragraphs.push(current);
    }

    Ok(paragraphs.join("\n"))
}

// ============ XLSX ============

fn extract_xlsx(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))
        .map_err(|e| ExtractError::Ooxml(e.to_string()))?;
    let shared_strings = read_shared_strings(&mut archive)?;
    let sheet_files = list_worksheet_files(&archive);
    let sheet_names = read_sheet_names(&mut archive)?;

    let mut out = String::new();
    for (idx, file) in sheet_files.into_iter().take(XLSX_MAX_SHEETS).enumerate() {
        let name = sheet_names
            .get(idx)
            .cloned()
            .unwrap_or_else(|| worksheet_file_stem(&file));

        let sheet_xml = read_zip_entry_bounded(&mut archive, &file, MAX_XML_ENTRY_BYTES)?;
        let rows = extract_sheet_rows(&sheet_xml, &shared_strings)?;

        let lines: Vec<String> = rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|c| c.trim())
                    .filter(|c| !c.is_empty())
                    .collect::<Vec<_>>()
                    .join(" | ")
            })
            .filter(|line| !line.is_empty())
            .collect();

        // A sheet with no cell content contributes nothing, header included.
        if lines.is_empty() {
            continue;
        }

        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&format!("Sheet: {}\n", name));
        for line in lines {
            out.push_str(&line);
            out.push('\n');
        }
    }
    Ok(out)
}

/// Parse the first worksheet into rows of cell strings.
///
/// Used by the questionnaire reader, which needs cells by column rather
/// than the flattened text that [`extract_text`] produces.
pub fn xlsx_rows(bytes: &[u8]) -> Result<Vec<Vec<String>>, ExtractError> {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))
        .map_err(|e| ExtractError::Ooxml(e.to_string()))?;
    let shared_strings = read_shared_strings(&mut archive)?;
    let sheet_files = list_worksheet_files(&archive);
    let first = sheet_files
        .first()
        .ok_or_else(|| ExtractError::Ooxml("workbook contains no worksheets".to_string()))?;
    let sheet_xml = read_zip_entry_bounded(&mut archive, first, MAX_XML_ENTRY_BYTES)?;
    extract_sheet_rows(&sheet_xml, &shared_strings)
}

/// Read `xl/sharedStrings.xml`. Workbooks with only inline or numeric
/// cells ship without it, so a missing entry is an empty table.
fn read_shared_strings(
    archive: &mut zip::ZipArchive<std::io::Cursor<&[u8]>>,
) -> Result<Vec<String>, ExtractError> {
    if archive.by_name("xl/sharedStrings.xml").is_err() {
        return Ok(Vec::new());
    }
    let xml = read_zip_entry_bounded(archive, "xl/sharedStrings.xml", MAX_XML_ENTRY_BYTES)?;

    let mut strings = Vec::new();
    let mut reader = quick_xml::Reader::from_reader(xml.as_slice());
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut in_si = false;
    let mut in_t = false;
    let mut current = String::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e)) => match e.local_name().as_ref() {
                b"si" => {
                    in_si = true;
                    current.clear();
                }
                b"t" if in_si => in_t = true,
                _ => {}
            },
            Ok(quick_xml::events::Event::Text(te)) if in_t => {
                current.push_str(te.unescape().unwrap_or_default().as_ref());
            }
            Ok(quick_xml::events::Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_t = false,
                b"si" => {
                    in_si = false;
                    strings.push(std::mem::take(&mut current));
                }
                _ => {}
            },
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => return Err(ExtractError::Ooxml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }
    Ok(strings)
}

/// Worksheet entries in workbook order (`sheet1.xml`, `sheet2.xml`, ...).
fn list_worksheet_files(archive: &zip::ZipArchive<std::io::Cursor<&[u8]>>) -> Vec<String> {
    let mut files: Vec<String> = archive
        .file_names()
        .filter(|n| n.starts_with("xl/worksheets/sheet") && n.ends_with(".xml"))
        .map(|s| s.to_string())
        .collect();
    files.sort_by_key(|name| {
        name.trim_start_matches("xl/worksheets/sheet")
            .trim_end_matches(".xml")
            .parse::<u32>()
            .unwrap_or(u32::MAX)
    });
    files
}

fn worksheet_file_stem(file: &str) -> String {
    file.trim_start_matches("xl/worksheets/")
        .trim_end_matches(".xml")
        .to_string()
}

/// Sheet display names from `xl/workbook.xml`, in declaration order.
fn read_sheet_names(
    archive: &mut zip::ZipArchive<std::io::Cursor<&[u8]>>,
) -> Result<Vec<String>, ExtractError> {
    if archive.by_name("xl/workbook.xml").is_err() {
        return Ok(Vec::new());
    }
    let xml = read_zip_entry_bounded(archive, "xl/workbook.xml", MAX_XML_ENTRY_BYTES)?;

    let mut names = Vec::new();
    let mut reader = quick_xml::Reader::from_reader(xml.as_slice());
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e))
            | Ok(quick_xml::events::Event::Empty(e)) => {
                if e.local_name().as_ref() == b"sheet" {
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"name" {
                            names.push(
                                String::from_utf8_lossy(attr.value.as_ref()).into_owned(),
                            );
                        }
                    }
                }
            }
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => return Err(ExtractError::Ooxml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }
    Ok(names)
}

/// Cell value kinds we resolve. Shared-string cells index into the
/// shared string table; everything else is used as literal text.
#[derive(PartialEq)]
enum CellKind {
    SharedString,
    InlineOrValue,
}

/// 0-based column index from the letter prefix of a cell reference
/// (`"B12"` -> 1, `"AA3"` -> 26).
fn column_index(cell_ref: &[u8]) -> Option<usize> {
    let mut col = 0usize;
    let mut seen = false;
    for &b in cell_ref {
        match b {
            b'A'..=b'Z' => {
                col = col * 26 + (b - b'A') as usize + 1;
                seen = true;
            }
            b'0'..=b'9' => break,
            _ => return None,
        }
    }
    if seen {
        Some(col - 1)
    } else {
        None
    }
}

fn extract_sheet_rows(
    xml: &[u8],
    shared_strings: &[String],
) -> Result<Vec<Vec<String>>, ExtractError> {
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut current_row: Vec<String> = Vec::new();
    let mut cell_kind = CellKind::InlineOrValue;
    let mut cell_col: Option<usize> = None;
    let mut in_value = false;
    let mut cell_count = 0usize;

    let mut reader = quick_xml::Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    loop {
        if cell_count >= XLSX_MAX_CELLS_PER_SHEET {
            break;
        }
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e)) => match e.local_name().as_ref() {
                b"row" => current_row.clear(),
                b"c" => {
                    cell_kind = CellKind::InlineOrValue;
                    cell_col = None;
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"t" if attr.value.as_ref() == b"s" => {
                                cell_kind = CellKind::SharedString;
                            }
                            b"r" => cell_col = column_index(attr.value.as_ref()),
                            _ => {}
                        }
                    }
                }
                // <v> holds numeric values and shared-string indices,
                // <is><t> holds inline string runs.
                b"v" | b"t" => in_value = true,
                _ => {}
            },
            Ok(quick_xml::events::Event::Text(te)) if in_value => {
                let raw = te.unescape().unwrap_or_default();
                let s = raw.trim();
                if !s.is_empty() {
                    let value = match cell_kind {
                        CellKind::SharedString => s
                            .parse::<usize>()
                            .ok()
                            .and_then(|i| shared_strings.get(i).cloned()),
                        CellKind::InlineOrValue => Some(s.to_string()),
                    };
                    if let Some(v) = value {
                        // Place the value at its declared column so rows
                        // with absent leading cells keep their positions;
                        // cells without an `r` reference land after the
                        // last filled column.
                        let col = cell_col.take().unwrap_or(current_row.len());
                        if col >= current_row.len() {
                            current_row.resize(col, String::new());
                            current_row.push(v);
                        } else {
                            current_row[col] = v;
                        }
                        cell_count += 1;
                    }
                }
                in_value = false;
            }
            Ok(quick_xml::events::Event::End(e)) => match e.local_name().as_ref() {
                b"v" | b"t" => in_value = false,
                b"row" => rows.push(std::mem::take(&mut current_row)),
                _ => {}
            },
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => return Err(ExtractError::Ooxml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    if !current_row.is_empty() {
        rows.push(current_row);
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn zip_with_entries(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut bytes = Vec::new();
        {
            let mut writer = zip::ZipWriter::new(std::io::Cursor::new(&mut bytes));
            for (name, content) in entries {
                writer
                    .start_file(*name, zip::write::SimpleFileOptions::default())
                    .unwrap();
                writer.write_all(content.as_bytes()).unwrap();
            }
            writer.finish().unwrap();
        }
        bytes
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(DocFormat::from_path(Path::new("a/b.pdf")), Some(DocFormat::Pdf));
        assert_eq!(DocFormat::from_path(Path::new("Q.DOCX")), Some(DocFormat::Docx));
        assert_eq!(DocFormat::from_path(Path::new("s.xlsx")), Some(DocFormat::Xlsx));
        assert_eq!(DocFormat::from_path(Path::new("notes.md")), None);
        assert_eq!(DocFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_invalid_pdf_returns_error() {
        let err = extract_text(b"not a pdf", DocFormat::Pdf).unwrap_err();
        assert!(matches!(err, ExtractError::Pdf(_)));
    }

    #[test]
    fn test_invalid_zip_returns_error_for_docx() {
        let err = extract_text(b"not a zip", DocFormat::Docx).unwrap_err();
        assert!(matches!(err, ExtractError::Ooxml(_)));
    }

    #[test]
    fn test_docx_paragraphs_become_lines() {
        let xml = "<?xml version=\"1.0\"?>\
            <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
            <w:body>\
            <w:p><w:r><w:t>First </w:t></w:r><w:r><w:t>paragraph.</w:t></w:r></w:p>\
            <w:p><w:r><w:t>Second paragraph.</w:t></w:r></w:p>\
            </w:body></w:document>";
        let bytes = zip_with_entries(&[("word/document.xml", xml)]);
        let text = extract_text(&bytes, DocFormat::Docx).unwrap();
        assert_eq!(text, "First paragraph.\nSecond paragraph.");
    }

    #[test]
    fn test_docx_missing_document_xml_is_error() {
        let bytes = zip_with_entries(&[("word/other.xml", "<x/>")]);
        assert!(extract_text(&bytes, DocFormat::Docx).is_err());
    }

    fn sample_xlsx() -> Vec<u8> {
        let workbook = "<?xml version=\"1.0\"?>\
            <workbook xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\">\
            <sheets><sheet name=\"Questions\" sheetId=\"1\"/></sheets></workbook>";
        let shared = "<?xml version=\"1.0\"?>\
            <sst><si><t>What is the SLA?</t></si><si><t>Who is the DPO?</t></si></sst>";
        let sheet = "<?xml version=\"1.0\"?>\
            <worksheet xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\">\
            <sheetData>\
            <row r=\"1\"><c r=\"A1\" t=\"s\"><v>0</v></c><c r=\"B1\"><v>12</v></c></row>\
            <row r=\"2\"><c r=\"A2\" t=\"s\"><v>1</v></c></row>\
            </sheetData></worksheet>";
        zip_with_entries(&[
            ("xl/workbook.xml", workbook),
            ("xl/sharedStrings.xml", shared),
            ("xl/worksheets/sheet1.xml", sheet),
        ])
    }

    #[test]
    fn test_xlsx_sheet_header_and_row_join() {
        let text = extract_text(&sample_xlsx(), DocFormat::Xlsx).unwrap();
        assert!(text.starts_with("Sheet: Questions\n"));
        assert!(text.contains("What is the SLA? | 12"));
        assert!(text.contains("Who is the DPO?"));
    }

    #[test]
    fn test_xlsx_rows_preserve_cells() {
        let rows = xlsx_rows(&sample_xlsx()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["What is the SLA?", "12"]);
        assert_eq!(rows[1], vec!["Who is the DPO?"]);
    }

    #[test]
    fn test_column_letters_to_index() {
        assert_eq!(column_index(b"A1"), Some(0));
        assert_eq!(column_index(b"B7"), Some(1));
        assert_eq!(column_index(b"Z3"), Some(25));
        assert_eq!(column_index(b"AA12"), Some(26));
        assert_eq!(column_index(b"3"), None);
    }

    #[test]
    fn test_xlsx_sparse_row_keeps_column_positions() {
        // Row 2 has no A cell; its B cell must still land in column 1.
        let sheet = "<?xml version=\"1.0\"?>\
            <worksheet xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\">\
            <sheetData>\
            <row r=\"1\">\
            <c r=\"A1\" t=\"inlineStr\"><is><t>Topic</t></is></c>\
            <c r=\"B1\" t=\"inlineStr\"><is><t>Question</t></is></c>\
            </row>\
            <row r=\"2\">\
            <c r=\"B2\" t=\"inlineStr\"><is><t>Who is the DPO?</t></is></c>\
            </row>\
            </sheetData></worksheet>";
        let bytes = zip_with_entries(&[("xl/worksheets/sheet1.xml", sheet)]);
        let rows = xlsx_rows(&bytes).unwrap();
        assert_eq!(rows[0], vec!["Topic", "Question"]);
        assert_eq!(rows[1], vec!["", "Who is the DPO?"]);
        assert_eq!(rows[1].get(1).map(String::as_str), Some("Who is the DPO?"));
    }

    #[test]
    fn test_xlsx_padding_cells_dropped_from_joined_text() {
        let sheet = "<?xml version=\"1.0\"?>\
            <worksheet xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\">\
            <sheetData>\
            <row r=\"1\"><c r=\"C1\" t=\"inlineStr\"><is><t>lonely cell</t></is></c></row>\
            </sheetData></worksheet>";
        let bytes = zip_with_entries(&[("xl/worksheets/sheet1.xml", sheet)]);
        let text = extract_text(&bytes, DocFormat::Xlsx).unwrap();
        assert!(text.contains("lonely cell"));
        assert!(!text.contains(" | "), "padding must not join into the line");
    }

    #[test]
    fn test_xlsx_inline_strings_without_shared_table() {
        let sheet = "<?xml version=\"1.0\"?>\
            <worksheet xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\">\
            <sheetData>\
            <row r=\"1\"><c r=\"A1\" t=\"inlineStr\"><is><t>hello</t></is></c></row>\
            </sheetData></worksheet>";
        let bytes = zip_with_entries(&[("xl/worksheets/sheet1.xml", sheet)]);
        let rows = xlsx_rows(&bytes).unwrap();
        assert_eq!(rows, vec![vec!["hello".to_string()]]);
    }

    #[test]
    fn test_xlsx_without_worksheets_is_error() {
        let bytes = zip_with_entries(&[("xl/workbook.xml", "<workbook/>")]);
        assert!(xlsx_rows(&bytes).is_err());
    }
}
