use thiserror::Error;

/// Configuration-class errors. All of these are detected before any label is
/// placed or emitted; a run that fails with one of them produced no output.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LayoutError {
    #[error("unrecognized cadence `{0}` (expected weekly, biweekly or monthly)")]
    InvalidCadence(String),

    #[error("starting position must be 1 or greater, got {0}")]
    InvalidStartPosition(i64),

    #[error(
        "label {label_width}x{label_height} {unit} does not fit on a {page_width}x{page_height} {unit} page"
    )]
    LabelTooLarge {
        label_width: f32,
        label_height: f32,
        page_width: f32,
        page_height: f32,
        unit: &'static str,
    },

    #[error("invalid date `{0}` (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("label count must be 1 or greater, got {0}")]
    InvalidCount(i64),

    #[error("group count must be 1 or greater, got {0}")]
    InvalidGroupCount(i64),

    #[error("unknown label format `{name}` (known formats: {known})")]
    UnknownFormat { name: String, known: String },

    #[error("unrecognized language `{0}` (expected en-US, ja-JP or zh-CN)")]
    InvalidLanguage(String),

    #[error("{0} is required")]
    Missing(&'static str),

    #[error("printer transport is not available")]
    PrinterUnavailable,
}

/// Run-class errors raised by emitter collaborators for a single label.
/// These are collected per item and never abort the rest of the run.
#[derive(Debug, Error)]
pub enum EmitError {
    #[error("qr encode failed: {0}")]
    Qr(String),

    #[error("draw failed: {0}")]
    Draw(String),

    #[error("printer send failed: {0}")]
    Send(String),
}
