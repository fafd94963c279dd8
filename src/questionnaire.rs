//! Questionnaire auto-fill.
//!
//! Reads questions from a tabular file (first worksheet of an `.xlsx`,
//! or one question per line of a plain-text file), answers each row
//! through the retrieval pipeline, and exports the result as an `.xlsx`
//! with an added answer column.
//!
//! Rows run strictly one after the other. A failed row gets an error
//! marker in its answer cell and the run continues — a single provider
//! hiccup must not throw away the rows already answered.

use anyhow::{bail, Context, Result};
use std::io::Write;
use std::path::Path;

use crate::config::Config;
use crate::embedding::EmbeddingClient;
use crate::extract;
use crate::generate::ChatClient;
use crate::kb;
use crate::retrieve;

/// One answered questionnaire row.
pub struct AnswerRow {
    pub question: String,
    pub answer: String,
}

/// Read the question column from a questionnaire file.
///
/// `.xlsx` files use the first worksheet and the 0-based `column`;
/// any other file is treated as plain text with one question per line.
/// Blank rows are dropped.
pub fn read_questions(path: &Path, column: usize, skip_header: bool) -> Result<Vec<String>> {
    let is_xlsx = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("xlsx"))
        .unwrap_or(false);

    let mut questions = if is_xlsx {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read questionnaire: {}", path.display()))?;
        let rows = extract::xlsx_rows(&bytes)
            .with_context(|| format!("Failed to parse questionnaire: {}", path.display()))?;
        rows.into_iter()
            .filter_map(|row| row.get(column).map(|q| q.trim().to_string()))
            .collect::<Vec<_>>()
    } else {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read questionnaire: {}", path.display()))?;
        content.lines().map(|l| l.trim().to_string()).collect()
    };

    if skip_header && !questions.is_empty() {
        questions.remove(0);
    }
    questions.retain(|q| !q.is_empty());
    Ok(questions)
}

/// Answer every question in `file` and write or print the results.
pub async fn run_fill(
    config: &Config,
    file: &Path,
    column: usize,
    skip_header: bool,
    output: Option<&Path>,
) -> Result<()> {
    let questions = read_questions(file, column, skip_header)?;
    if questions.is_empty() {
        bail!("No questions found in {}", file.display());
    }

    let embed_client = EmbeddingClient::new(&config.openai)?;
    let chat_client = ChatClient::new(&config.openai)?;

    println!("Building knowledge base from {}...", config.data.folder.display());
    let knowledge_base = kb::build_knowledge_base(config, &embed_client).await?;
    println!("  indexed chunks: {}", knowledge_base.len());

    let total = questions.len();
    let mut failed = 0usize;
    let mut rows = Vec::with_capacity(total);

    for (i, question) in questions.into_iter().enumerate() {
        println!("[{}/{}] {}", i + 1, total, question);

        let answer = match answer_one(&question, &knowledge_base, &embed_client, &chat_client, config)
            .await
        {
            Ok(a) => a,
            Err(e) => {
                eprintln!("Warning: row {} failed: {}", i + 1, e);
                failed += 1;
                format!("ERROR: {}", e)
            }
        };

        rows.push(AnswerRow { question, answer });
    }

    match output {
        Some(out) => {
            write_answered_xlsx(out, &rows)?;
            println!("fill {}", file.display());
            println!("  questions answered: {}", total - failed);
            println!("  failed: {}", failed);
            println!("  written: {}", out.display());
        }
        None => {
            for row in &rows {
                println!();
                println!("Q: {}", row.question);
                println!("A: {}", row.answer);
            }
        }
    }

    Ok(())
}

async fn answer_one(
    question: &str,
    knowledge_base: &kb::KnowledgeBase,
    embed_client: &EmbeddingClient,
    chat_client: &ChatClient,
    config: &Config,
) -> Result<String> {
    let context = retrieve::retrieve(
        question,
        knowledge_base,
        embed_client,
        config.retrieval.top_k,
    )
    .await?;
    let answer = chat_client.generate(question, &context).await?;
    Ok(answer)
}

/// Write answered rows as a minimal single-sheet workbook with a header
/// row and inline-string cells.
pub fn write_answered_xlsx(path: &Path, rows: &[AnswerRow]) -> Result<()> {
    let mut bytes = Vec::new();
    {
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(&mut bytes));
        let options = zip::write::SimpleFileOptions::default();

        writer.start_file("[Content_Types].xml", options)?;
        writer.write_all(
            br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
</Types>"#,
        )?;

        writer.start_file("_rels/.rels", options)?;
        writer.write_all(
            br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#,
        )?;

        writer.start_file("xl/workbook.xml", options)?;
        writer.write_all(
            br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets><sheet name="Answers" sheetId="1" r:id="rId1"/></sheets>
</workbook>"#,
        )?;

        writer.start_file("xl/_rels/workbook.xml.rels", options)?;
        writer.write_all(
            br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
</Relationships>"#,
        )?;

        writer.start_file("xl/worksheets/sheet1.xml", options)?;
        writer.write_all(build_sheet_xml(rows).as_bytes())?;
        writer.finish()?;
    }

    std::fs::write(path, bytes)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

fn build_sheet_xml(rows: &[AnswerRow]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<sheetData>
"#,
    );

    xml.push_str(&sheet_row(1, "Question", "Auto Answer"));
    for (i, row) in rows.iter().enumerate() {
        xml.push_str(&sheet_row(i + 2, &row.question, &row.answer));
    }

    xml.push_str("</sheetData>\n</worksheet>");
    xml
}

fn sheet_row(r: usize, a: &str, b: &str) -> String {
    format!(
        "<row r=\"{r}\">\
         <c r=\"A{r}\" t=\"inlineStr\"><is><t>{}</t></is></c>\
         <c r=\"B{r}\" t=\"inlineStr\"><is><t>{}</t></is></c>\
         </row>\n",
        xml_escape(a),
        xml_escape(b),
    )
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
