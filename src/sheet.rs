use crate::error::LayoutError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Slack for fit checks on f32 page math. Metric sheets such as ten rows of
/// 29.7 mm on a 297 mm page are exact on paper but land a hair over in f32.
const FIT_EPS: f32 = 0.01;

/// Physical unit every dimension of a sheet is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    In,
    Mm,
}

impl Unit {
    pub fn suffix(self) -> &'static str {
        match self {
            Unit::In => "in",
            Unit::Mm => "mm",
        }
    }

    /// Length of one typographic point in this unit. Font sizes are given in
    /// points while geometry is in sheet units, so rendering converts through
    /// this factor.
    pub fn per_point(self) -> f32 {
        match self {
            Unit::In => 1.0 / 72.0,
            Unit::Mm => 25.4 / 72.0,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// How the column and row counts of a sheet are determined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridMode {
    /// Die-cut stock with a known layout; counts come straight from the spec.
    Fixed { columns: u32, rows: u32 },
    /// Plain stock; counts are however many labels fit inside the margin.
    Computed { margin: f32 },
}

/// Declarative description of one label sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetSpec {
    #[serde(default)]
    pub name: String,
    pub label_width: f32,
    pub label_height: f32,
    pub page_width: f32,
    pub page_height: f32,
    pub unit: Unit,
    pub grid: GridMode,
}

/// Resolved geometry: counts plus the centering offsets, all in `unit`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SheetGeometry {
    pub columns: u32,
    pub rows: u32,
    pub label_width: f32,
    pub label_height: f32,
    pub page_width: f32,
    pub page_height: f32,
    pub horizontal_margin: f32,
    pub vertical_margin: f32,
    pub unit: Unit,
}

impl SheetGeometry {
    pub fn slots_per_page(&self) -> u32 {
        self.columns * self.rows
    }
}

/// Turn a sheet spec into concrete geometry.
///
/// The grid is always centered: offsets are half the leftover page span, so
/// even fixed die-cut layouts and computed layouts share one placement rule.
/// For computed grids the configured margin only bounds how many labels fit;
/// it does not anchor the grid.
pub fn resolve_geometry(spec: &SheetSpec) -> Result<SheetGeometry, LayoutError> {
    let too_large = || LayoutError::LabelTooLarge {
        label_width: spec.label_width,
        label_height: spec.label_height,
        page_width: spec.page_width,
        page_height: spec.page_height,
        unit: spec.unit.suffix(),
    };

    if spec.label_width <= 0.0
        || spec.label_height <= 0.0
        || spec.page_width <= 0.0
        || spec.page_height <= 0.0
    {
        return Err(too_large());
    }

    let (columns, rows) = match spec.grid {
        GridMode::Fixed { columns, rows } => {
            if columns < 1 || rows < 1 {
                return Err(too_large());
            }
            (columns, rows)
        }
        GridMode::Computed { margin } => {
            let usable_width = spec.page_width - 2.0 * margin.max(0.0);
            let usable_height = spec.page_height - 2.0 * margin.max(0.0);
            let raw_columns = (usable_width / spec.label_width).floor();
            let raw_rows = (usable_height / spec.label_height).floor();
            if raw_columns < 1.0 || raw_rows < 1.0 {
                return Err(too_large());
            }
            (raw_columns as u32, raw_rows as u32)
        }
    };

    let grid_width = columns as f32 * spec.label_width;
    let grid_height = rows as f32 * spec.label_height;
    if grid_width > spec.page_width + FIT_EPS || grid_height > spec.page_height + FIT_EPS {
        return Err(too_large());
    }

    Ok(SheetGeometry {
        columns,
        rows,
        label_width: spec.label_width,
        label_height: spec.label_height,
        page_width: spec.page_width,
        page_height: spec.page_height,
        horizontal_margin: ((spec.page_width - grid_width) / 2.0).max(0.0),
        vertical_margin: ((spec.page_height - grid_height) / 2.0).max(0.0),
        unit: spec.unit,
    })
}
