use crate::date::CivilDate;
use crate::error::LayoutError;
use crate::layout::SequenceRequest;
use crate::schedule::Cadence;
use crate::sheet::{GridMode, SheetSpec, Unit};
use crate::theme::Language;
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_FORMAT: &str = "uline-s16990";

static BUILTIN_FORMATS: Lazy<Vec<SheetSpec>> = Lazy::new(|| {
    vec![
        // Uline S-16990 plain stock: the grid is whatever fits inside a
        // quarter-inch margin.
        SheetSpec {
            name: "uline-s16990".to_string(),
            label_width: 1.5,
            label_height: 1.5,
            page_width: 8.5,
            page_height: 11.0,
            unit: Unit::In,
            grid: GridMode::Computed { margin: 0.25 },
        },
        // A4 landscape die-cut stock, 35 labels.
        SheetSpec {
            name: "a4-48x24".to_string(),
            label_width: 48.0,
            label_height: 24.0,
            page_width: 297.0,
            page_height: 210.0,
            unit: Unit::Mm,
            grid: GridMode::Fixed {
                columns: 5,
                rows: 7,
            },
        },
        // A4 portrait die-cut stock, 40 labels. Ten rows of 29.7mm fill the
        // 297mm page exactly.
        SheetSpec {
            name: "a4-52x29".to_string(),
            label_width: 52.5,
            label_height: 29.7,
            page_width: 210.0,
            page_height: 297.0,
            unit: Unit::Mm,
            grid: GridMode::Fixed {
                columns: 4,
                rows: 10,
            },
        },
        // ID-1 card size on A4, two columns of five.
        SheetSpec {
            name: "card-85x54".to_string(),
            label_width: 85.6,
            label_height: 54.0,
            page_width: 210.0,
            page_height: 297.0,
            unit: Unit::Mm,
            grid: GridMode::Fixed {
                columns: 2,
                rows: 5,
            },
        },
    ]
});

pub fn builtin_formats() -> &'static [SheetSpec] {
    &BUILTIN_FORMATS
}

pub fn format_by_name(name: &str) -> Option<&'static SheetSpec> {
    BUILTIN_FORMATS
        .iter()
        .find(|spec| spec.name.eq_ignore_ascii_case(name.trim()))
}

pub fn known_format_names() -> String {
    BUILTIN_FORMATS
        .iter()
        .map(|spec| spec.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn default_format() -> &'static SheetSpec {
    &BUILTIN_FORMATS[0]
}

/// QR payloads as they appear in a job file: either an explicit array with
/// one entry per label, or a single block of newline-separated text.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum QrText {
    Lines(Vec<String>),
    Block(String),
}

impl QrText {
    /// A block drops blank lines before indexing, so pasted text with empty
    /// separators shifts later payloads up. An explicit array keeps its
    /// positions.
    pub fn into_lines(self) -> Vec<String> {
        match self {
            QrText::Lines(lines) => lines,
            QrText::Block(block) => block
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

/// On-disk description of one run. Every field is optional so the CLI can
/// overlay flags on top before the whole thing is validated at once.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobFile {
    pub total_labels: Option<i64>,
    pub start_date: Option<String>,
    pub cadence: Option<String>,
    pub starting_position: Option<i64>,
    pub group_count: Option<i64>,
    pub format: Option<String>,
    pub sheet: Option<SheetSpec>,
    pub title: Option<String>,
    pub patient_name: Option<String>,
    pub language: Option<String>,
    pub qr_text: Option<QrText>,
}

impl JobFile {
    /// Validate and resolve into a request. All range and parse failures come
    /// out of here, keyed to the original field values.
    pub fn into_request(self) -> Result<SequenceRequest, LayoutError> {
        let total = self
            .total_labels
            .ok_or(LayoutError::Missing("totalLabels"))?;
        if total < 1 {
            return Err(LayoutError::InvalidCount(total));
        }

        let raw_date = self.start_date.ok_or(LayoutError::Missing("startDate"))?;
        let start_date = CivilDate::parse(&raw_date)?;

        let cadence = match self.cadence.as_deref() {
            Some(raw) => Cadence::parse(raw)?,
            None => Cadence::Weekly,
        };

        let starting_position = match self.starting_position {
            Some(position) if position < 1 => {
                return Err(LayoutError::InvalidStartPosition(position));
            }
            Some(position) => position.min(u32::MAX as i64) as u32,
            None => 1,
        };

        let group_count = match self.group_count {
            Some(groups) if groups < 1 => {
                return Err(LayoutError::InvalidGroupCount(groups));
            }
            Some(groups) => groups.min(u32::MAX as i64) as u32,
            None => 1,
        };

        let language = match self.language.as_deref() {
            Some(raw) => Language::parse(raw)?,
            None => Language::default(),
        };

        // An inline sheet beats a named format; a named format must exist.
        let sheet = match (self.sheet, self.format.as_deref()) {
            (Some(sheet), _) => sheet,
            (None, Some(name)) => format_by_name(name)
                .cloned()
                .ok_or_else(|| LayoutError::UnknownFormat {
                    name: name.to_string(),
                    known: known_format_names(),
                })?,
            (None, None) => default_format().clone(),
        };

        Ok(SequenceRequest {
            total_items: total.min(u32::MAX as i64) as u32,
            starting_position,
            group_count,
            cadence,
            start_date,
            sheet,
            title: self.title.filter(|title| !title.trim().is_empty()),
            language,
            qr_payloads: self.qr_text.map(QrText::into_lines).unwrap_or_default(),
            patient: self.patient_name.filter(|name| !name.trim().is_empty()),
        })
    }
}

pub fn load_job(path: Option<&Path>) -> anyhow::Result<JobFile> {
    let Some(path) = path else {
        return Ok(JobFile::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_job(&contents)
}

/// Strict JSON first, JSON5 as a fallback for hand-written job files with
/// comments or trailing commas. The strict error is the one reported when
/// both fail.
pub fn parse_job(contents: &str) -> anyhow::Result<JobFile> {
    match serde_json::from_str(contents) {
        Ok(job) => Ok(job),
        Err(json_err) => match json5::from_str(contents) {
            Ok(job) => Ok(job),
            Err(_) => Err(json_err.into()),
        },
    }
}
