use crate::config::{JobFile, builtin_formats, load_job, parse_job};
use crate::emit::{RunReport, emit_run};
use crate::layout::{LabelRecord, RunLayout, SequenceRequest, compute_run_layout};
use crate::printer::{dymo_label_xml, zpl_label};
#[cfg(feature = "png")]
use crate::render::write_output_png;
use crate::render::{SvgEmitter, write_output_svg};
use crate::sheet::resolve_geometry;
use crate::theme::Theme;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "labelrun", version, about = "Sequential date-label sheets for aligner schedules")]
pub struct Args {
    /// Job file (.json or .json5) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file or directory. Defaults to stdout for single-page SVG.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "emit", value_enum, default_value = "svg")]
    pub emit: EmitFormat,

    /// Number of labels (overrides the job file)
    #[arg(short = 'n', long = "count")]
    pub count: Option<i64>,

    /// First change date, YYYY-MM-DD (overrides the job file)
    #[arg(long = "start-date")]
    pub start_date: Option<String>,

    /// Change cadence: weekly, biweekly or monthly
    #[arg(long = "cadence")]
    pub cadence: Option<String>,

    /// 1-based sheet slot the first label lands in
    #[arg(short = 'p', long = "start-position")]
    pub start_position: Option<i64>,

    /// Split the sequence into this many numbering groups
    #[arg(short = 'g', long = "groups")]
    pub groups: Option<i64>,

    /// Sheet format name (see --list-formats)
    #[arg(short = 'f', long = "format")]
    pub format: Option<String>,

    /// Title line printed on every label
    #[arg(long = "title")]
    pub title: Option<String>,

    /// Label language tag: en-US, ja-JP or zh-CN
    #[arg(long = "language")]
    pub language: Option<String>,

    /// Patient name, used in output file names only
    #[arg(long = "patient")]
    pub patient: Option<String>,

    /// Draw dashed cut lines around labels (svg/png)
    #[arg(long = "outlines")]
    pub outlines: bool,

    /// Raster resolution for png output
    #[arg(long = "dpi", default_value_t = 300.0)]
    pub dpi: f32,

    /// List the built-in sheet formats and exit
    #[arg(long = "list-formats")]
    pub list_formats: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitFormat {
    Svg,
    Png,
    Zpl,
    Dymo,
}

pub fn run() -> Result<()> {
    let args = Args::parse();

    if args.list_formats {
        print_formats();
        return Ok(());
    }

    let mut job = read_job(args.input.as_deref())?;
    apply_overrides(&mut job, &args);
    let request = job.into_request()?;
    let theme = Theme::for_language(request.language);
    let layout = compute_run_layout(&request)?;
    let stem = default_stem(&request);

    let report = match args.emit {
        EmitFormat::Svg => emit_svg(&layout, &theme, &args, &stem)?,
        EmitFormat::Png => emit_png(&layout, &theme, &args, &stem)?,
        EmitFormat::Zpl => emit_zpl(&layout, &args, &stem)?,
        EmitFormat::Dymo => emit_dymo(&layout, &args, &stem)?,
    };

    if !report.complete() {
        for failure in &report.failures {
            eprintln!("label {}: {}", failure.index, failure.message);
        }
        if report.succeeded == 0 {
            return Err(anyhow::anyhow!("no labels were emitted"));
        }
        eprintln!("emitted {} of {} labels", report.succeeded, report.total);
    }
    Ok(())
}

fn print_formats() {
    for spec in builtin_formats() {
        match resolve_geometry(spec) {
            Ok(geometry) => println!(
                "{:<14} {}x{} {unit} labels on {}x{} {unit}, {} per page ({} x {})",
                spec.name,
                spec.label_width,
                spec.label_height,
                spec.page_width,
                spec.page_height,
                geometry.slots_per_page(),
                geometry.columns,
                geometry.rows,
                unit = spec.unit.suffix(),
            ),
            Err(err) => println!("{:<14} unusable: {err}", spec.name),
        }
    }
}

fn read_job(path: Option<&Path>) -> Result<JobFile> {
    match path {
        Some(path) if path == Path::new("-") => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            parse_job(&buf)
        }
        Some(path) => load_job(Some(path)),
        None => Ok(JobFile::default()),
    }
}

fn apply_overrides(job: &mut JobFile, args: &Args) {
    if let Some(count) = args.count {
        job.total_labels = Some(count);
    }
    if let Some(date) = &args.start_date {
        job.start_date = Some(date.clone());
    }
    if let Some(cadence) = &args.cadence {
        job.cadence = Some(cadence.clone());
    }
    if let Some(position) = args.start_position {
        job.starting_position = Some(position);
    }
    if let Some(groups) = args.groups {
        job.group_count = Some(groups);
    }
    if let Some(format) = &args.format {
        // The flag beats an inline sheet from the job file as well.
        job.format = Some(format.clone());
        job.sheet = None;
    }
    if let Some(title) = &args.title {
        job.title = Some(title.clone());
    }
    if let Some(language) = &args.language {
        job.language = Some(language.clone());
    }
    if let Some(patient) = &args.patient {
        job.patient_name = Some(patient.clone());
    }
}

fn emit_svg(layout: &RunLayout, theme: &Theme, args: &Args, stem: &str) -> Result<RunReport> {
    let emitter =
        SvgEmitter::new(layout.geometry, theme, layout.title.clone()).with_outlines(args.outlines);
    let (pages, report) = emit_run(layout, emitter);
    if pages.len() == 1 && args.output.is_none() {
        write_output_svg(&pages[0], None)?;
        return Ok(report);
    }
    let outputs = resolve_numbered_outputs(args.output.as_deref(), "svg", pages.len(), stem);
    for (page, path) in pages.iter().zip(&outputs) {
        write_output_svg(page, Some(path))?;
    }
    Ok(report)
}

#[cfg(feature = "png")]
fn emit_png(layout: &RunLayout, theme: &Theme, args: &Args, stem: &str) -> Result<RunReport> {
    let emitter =
        SvgEmitter::new(layout.geometry, theme, layout.title.clone()).with_outlines(args.outlines);
    let (pages, report) = emit_run(layout, emitter);
    let outputs = resolve_numbered_outputs(args.output.as_deref(), "png", pages.len(), stem);
    for (page, path) in pages.iter().zip(&outputs) {
        write_output_png(page, path, theme, args.dpi)?;
    }
    Ok(report)
}

#[cfg(not(feature = "png"))]
fn emit_png(_layout: &RunLayout, _theme: &Theme, _args: &Args, _stem: &str) -> Result<RunReport> {
    Err(anyhow::anyhow!(
        "png output requires the `png` feature, rebuild with --features png"
    ))
}

fn emit_zpl(layout: &RunLayout, args: &Args, stem: &str) -> Result<RunReport> {
    let mut batch = String::new();
    let mut total = 0u32;
    for page in &layout.pages {
        for placed in &page.labels {
            if !batch.is_empty() {
                batch.push('\n');
            }
            batch.push_str(&zpl_label(&placed.record));
            total += 1;
        }
    }
    let path = args.output.as_deref().map(|base| {
        if base.is_dir() {
            base.join(format!("{stem}.zpl"))
        } else {
            base.to_path_buf()
        }
    });
    write_text(&batch, path.as_deref())?;
    Ok(RunReport {
        total,
        succeeded: total,
        failures: Vec::new(),
    })
}

fn emit_dymo(layout: &RunLayout, args: &Args, stem: &str) -> Result<RunReport> {
    let records: Vec<&LabelRecord> = layout
        .pages
        .iter()
        .flat_map(|page| page.labels.iter().map(|placed| &placed.record))
        .collect();
    let outputs = resolve_numbered_outputs(args.output.as_deref(), "xml", records.len(), stem);
    for (record, path) in records.iter().zip(&outputs) {
        std::fs::write(path, dymo_label_xml(record))?;
    }
    let total = records.len() as u32;
    Ok(RunReport {
        total,
        succeeded: total,
        failures: Vec::new(),
    })
}

fn write_text(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, text)?;
        }
        None => {
            print!("{}", text);
        }
    }
    Ok(())
}

fn default_stem(request: &SequenceRequest) -> String {
    let stamp = request.start_date.file_stamp();
    match request.patient.as_deref() {
        Some(patient) => format!("aligner-labels-{stamp}-{}", sanitize_name(patient)),
        None => format!("aligner-labels-{stamp}"),
    }
}

fn sanitize_name(name: &str) -> String {
    let mut cleaned = String::with_capacity(name.len());
    for ch in name.trim().chars() {
        if ch.is_alphanumeric() {
            cleaned.push(ch);
        } else if !cleaned.ends_with('-') {
            cleaned.push('-');
        }
    }
    cleaned.trim_matches('-').to_string()
}

fn resolve_numbered_outputs(
    output: Option<&Path>,
    ext: &str,
    count: usize,
    default_stem: &str,
) -> Vec<PathBuf> {
    if count == 1 {
        return vec![match output {
            Some(base) if base.is_dir() => base.join(format!("{default_stem}.{ext}")),
            Some(base) => base.to_path_buf(),
            None => PathBuf::from(format!("{default_stem}.{ext}")),
        }];
    }
    match output {
        Some(base) if base.is_dir() => (1..=count)
            .map(|n| base.join(format!("{default_stem}-{n}.{ext}")))
            .collect(),
        Some(base) => {
            let stem = base
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or(default_stem);
            let parent = base.parent().unwrap_or_else(|| Path::new("."));
            (1..=count)
                .map(|n| parent.join(format!("{stem}-{n}.{ext}")))
                .collect()
        }
        None => (1..=count)
            .map(|n| PathBuf::from(format!("{default_stem}-{n}.{ext}")))
            .collect(),
    }
}
