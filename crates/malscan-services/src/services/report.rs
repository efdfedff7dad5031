//! PDF summary of one scan, written as `report-<sha256>.pdf`.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use malscan_core::{DigestSet, ScanVerdicts};
use std::path::{Path, PathBuf};

const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 50.0;

const HEADER_TITLE: &str = "Malware Analysis Report";
const HEADER_SIZE: f32 = 14.0;
const SECTION_SIZE: f32 = 12.0;
const BODY_SIZE: f32 = 10.0;
const BODY_LEADING: f32 = 16.0;
const SECTION_LEADING: f32 = 22.0;
const SECTION_GAP: f32 = 12.0;
/// Rough Helvetica advance width as a fraction of the font size.
const AVG_CHAR_WIDTH: f32 = 0.556;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("PDF encoding failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Face {
    Regular,
    Bold,
}

impl Face {
    fn resource_name(self) -> &'static str {
        match self {
            Face::Regular => "F1",
            Face::Bold => "F2",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct PlacedLine {
    face: Face,
    size: f32,
    x: f32,
    y: f32,
    text: String,
}

/// Body lines longer than this are wrapped.
fn wrap_columns() -> usize {
    ((PAGE_WIDTH - 2.0 * MARGIN) / (BODY_SIZE * AVG_CHAR_WIDTH)) as usize
}

/// Split at spaces where possible, hard-split tokens longer than `width`.
fn wrap_line(line: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in line.split(' ') {
        let mut word: Vec<char> = word.chars().collect();
        let needed = if current.is_empty() {
            word.len()
        } else {
            current.chars().count() + 1 + word.len()
        };
        if needed <= width {
            if !current.is_empty() {
                current.push(' ');
            }
            current.extend(word);
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        while word.len() > width {
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        current.extend(word);
    }
    lines.push(current);
    lines
}

/// Type1 fonts with WinAnsiEncoding only cover ASCII reliably.
fn pdf_safe(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_ascii() && !c.is_ascii_control() { c } else { '?' })
        .collect()
}

struct Layout {
    pages: Vec<Vec<PlacedLine>>,
    y: f32,
}

impl Layout {
    fn new() -> Self {
        let mut layout = Self {
            pages: Vec::new(),
            y: 0.0,
        };
        layout.start_page();
        layout
    }

    fn start_page(&mut self) {
        self.pages.push(Vec::new());
        self.y = PAGE_HEIGHT - MARGIN;
        let width = HEADER_TITLE.len() as f32 * HEADER_SIZE * AVG_CHAR_WIDTH;
        self.place(Face::Bold, HEADER_SIZE, (PAGE_WIDTH - width) / 2.0, HEADER_TITLE);
        self.y -= HEADER_SIZE * 3.0;
    }

    fn place(&mut self, face: Face, size: f32, x: f32, text: &str) {
        let line = PlacedLine {
            face,
            size,
            x,
            y: self.y,
            text: pdf_safe(text),
        };
        if let Some(page) = self.pages.last_mut() {
            page.push(line);
        }
    }

    fn line(&mut self, face: Face, size: f32, leading: f32, text: &str) {
        if self.y - leading < MARGIN {
            self.start_page();
        }
        self.place(face, size, MARGIN, text);
        self.y -= leading;
    }

    fn section(&mut self, title: &str, body: &[String]) {
        // Keep the title together with its first body line.
        let first_line = if body.is_empty() { 0.0 } else { BODY_LEADING };
        if self.y - SECTION_LEADING - first_line < MARGIN {
            self.start_page();
        }
        self.line(Face::Bold, SECTION_SIZE, SECTION_LEADING, title);
        for raw in body {
            for wrapped in wrap_line(raw, wrap_columns()) {
                self.line(Face::Regular, BODY_SIZE, BODY_LEADING, &wrapped);
            }
        }
        self.y -= SECTION_GAP;
    }
}

fn layout_report(original_name: &str, digests: &DigestSet, verdicts: &ScanVerdicts) -> Vec<Vec<PlacedLine>> {
    let mut layout = Layout::new();

    layout.section(
        "File Information",
        &[
            format!("Original Filename: {}", original_name),
            format!("MD5: {}", digests.md5),
            format!("SHA-256: {}", digests.sha256),
            format!("SHA-512: {}", digests.sha512),
        ],
    );

    let results: Vec<String> = verdicts
        .iter()
        .map(|(category, count)| format!("{}: {}", category, count))
        .collect();
    layout.section("VirusTotal Scan Results", &results);

    layout.pages
}

fn page_operations(lines: &[PlacedLine]) -> Vec<Operation> {
    let mut ops = Vec::with_capacity(lines.len() * 5);
    for line in lines {
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new(
            "Tf",
            vec![line.face.resource_name().into(), line.size.into()],
        ));
        ops.push(Operation::new("Td", vec![line.x.into(), line.y.into()]));
        ops.push(Operation::new(
            "Tj",
            vec![Object::string_literal(line.text.as_str())],
        ));
        ops.push(Operation::new("ET", vec![]));
    }
    ops
}

/// Render the report document into memory.
pub fn render_pdf(
    original_name: &str,
    digests: &DigestSet,
    verdicts: &ScanVerdicts,
) -> Result<Vec<u8>, ReportError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular_id,
            "F2" => bold_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for lines in layout_report(original_name, digests, verdicts) {
        let content = Content {
            operations: page_operations(&lines),
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => page_count,
        "Resources" => resources_id,
        "MediaBox" => vec![
            Object::from(0.0_f32),
            Object::from(0.0_f32),
            Object::from(PAGE_WIDTH),
            Object::from(PAGE_HEIGHT),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    Ok(buffer)
}

/// Writes reports into one directory, named by the file's SHA-256.
#[derive(Debug, Clone)]
pub struct ReportRenderer {
    reports_dir: PathBuf,
}

impl ReportRenderer {
    pub fn new(reports_dir: impl Into<PathBuf>) -> Self {
        Self {
            reports_dir: reports_dir.into(),
        }
    }

    pub fn reports_dir(&self) -> &Path {
        &self.reports_dir
    }

    pub fn report_path(&self, digests: &DigestSet) -> PathBuf {
        self.reports_dir.join(digests.report_filename())
    }

    /// Render and persist, overwriting any previous report for the same digest.
    pub fn render(
        &self,
        original_name: &str,
        digests: &DigestSet,
        verdicts: &ScanVerdicts,
    ) -> Result<PathBuf, ReportError> {
        let pdf = render_pdf(original_name, digests, verdicts)?;
        std::fs::create_dir_all(&self.reports_dir)?;
        let path = self.report_path(digests);
        std::fs::write(&path, pdf)?;
        tracing::info!(path = %path.display(), "Generated report");
        Ok(path)
    }
}
