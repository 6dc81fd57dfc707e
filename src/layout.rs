use crate::date::CivilDate;
use crate::error::LayoutError;
use crate::numbering::{DisplayNumber, display_number};
use crate::placement::{Placement, placements};
use crate::schedule::{Cadence, change_date};
use crate::sheet::{SheetGeometry, SheetSpec, resolve_geometry};
use crate::theme::Language;

/// Everything a single run needs: the schedule, the sheet, and the text that
/// goes on each face.
#[derive(Debug, Clone)]
pub struct SequenceRequest {
    pub total_items: u32,
    pub starting_position: u32,
    pub group_count: u32,
    pub cadence: Cadence,
    pub start_date: CivilDate,
    pub sheet: SheetSpec,
    pub title: Option<String>,
    pub language: Language,
    /// One payload per label, matched by sequence index. Shorter lists leave
    /// the remaining labels without a code.
    pub qr_payloads: Vec<String>,
    /// Only ever used for output file names, never printed on a face.
    pub patient: Option<String>,
}

impl SequenceRequest {
    pub fn new(total_items: u32, start_date: CivilDate, sheet: SheetSpec) -> Self {
        Self {
            total_items,
            starting_position: 1,
            group_count: 1,
            cadence: Cadence::Weekly,
            start_date,
            sheet,
            title: None,
            language: Language::default(),
            qr_payloads: Vec::new(),
            patient: None,
        }
    }
}

/// The content of one label, independent of where it lands on a sheet.
#[derive(Debug, Clone)]
pub struct LabelRecord {
    pub index: u32,
    pub change_date: CivilDate,
    pub number: DisplayNumber,
    pub qr_payload: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PlacedLabel {
    pub placement: Placement,
    pub record: LabelRecord,
}

/// Labels that share a page, in placement order. `page` keeps the absolute
/// index so a run starting deep into a sheet still reports where it landed.
#[derive(Debug, Clone)]
pub struct PageLayout {
    pub page: u32,
    pub labels: Vec<PlacedLabel>,
}

/// A fully resolved run, ready for any emitter.
#[derive(Debug, Clone)]
pub struct RunLayout {
    pub geometry: SheetGeometry,
    pub title: String,
    pub total_items: u32,
    pub pages: Vec<PageLayout>,
}

impl RunLayout {
    pub fn label_count(&self) -> usize {
        self.pages.iter().map(|page| page.labels.len()).sum()
    }
}

/// Resolve a request into placed, dated, numbered labels.
///
/// All configuration-class failures surface here, before anything is emitted.
pub fn compute_run_layout(request: &SequenceRequest) -> Result<RunLayout, LayoutError> {
    if request.total_items < 1 {
        return Err(LayoutError::InvalidCount(request.total_items as i64));
    }
    if request.group_count < 1 {
        return Err(LayoutError::InvalidGroupCount(request.group_count as i64));
    }

    let geometry = resolve_geometry(&request.sheet)?;
    let slots = placements(request.total_items, request.starting_position, &geometry)?;

    let mut pages: Vec<PageLayout> = Vec::new();
    for (offset, placement) in slots.enumerate() {
        let index = offset as u32 + 1;
        let record = LabelRecord {
            index,
            change_date: change_date(request.start_date, request.cadence, index),
            number: display_number(index, request.total_items, request.group_count),
            qr_payload: request
                .qr_payloads
                .get(offset)
                .filter(|payload| !payload.trim().is_empty())
                .cloned(),
        };
        let placed = PlacedLabel { placement, record };
        match pages.last_mut() {
            Some(page) if page.page == placement.page => page.labels.push(placed),
            _ => pages.push(PageLayout {
                page: placement.page,
                labels: vec![placed],
            }),
        }
    }

    Ok(RunLayout {
        geometry,
        title: request
            .title
            .clone()
            .unwrap_or_else(|| crate::theme::Theme::for_language(request.language).default_title),
        total_items: request.total_items,
        pages,
    })
}
