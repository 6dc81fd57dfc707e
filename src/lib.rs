#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod date;
pub mod emit;
pub mod error;
pub mod layout;
pub mod numbering;
pub mod placement;
pub mod printer;
pub mod render;
pub mod schedule;
pub mod sheet;
pub mod text_metrics;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;

pub use date::CivilDate;
pub use emit::{DocumentEmitter, QrEncoder, RunReport, emit_run};
pub use error::{EmitError, LayoutError};
pub use layout::{RunLayout, SequenceRequest, compute_run_layout};
pub use numbering::{DisplayNumber, display_number};
pub use placement::{Placement, placements};
pub use printer::{LabelPrinter, PrinterDialect, print_run};
pub use render::SvgEmitter;
pub use schedule::{Cadence, change_date};
pub use sheet::{GridMode, SheetGeometry, SheetSpec, Unit, resolve_geometry};
pub use theme::{Language, Theme};
