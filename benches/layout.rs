use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use labelrun::{
    CivilDate, SequenceRequest, SvgEmitter, Theme, compute_run_layout, emit_run, placements,
    resolve_geometry,
};
use std::hint::black_box;

fn make_request(total: u32, format: &str) -> SequenceRequest {
    let sheet = labelrun::config::format_by_name(format)
        .expect("unknown format")
        .clone();
    let mut request = SequenceRequest::new(
        total,
        CivilDate::new(2024, 1, 1).expect("valid date"),
        sheet,
    );
    request.group_count = 4;
    request
}

fn bench_placements(c: &mut Criterion) {
    let mut group = c.benchmark_group("placements");
    let geometry =
        resolve_geometry(&make_request(1, "uline-s16990").sheet).expect("geometry failed");
    for total in [35u32, 350, 3500] {
        group.bench_with_input(BenchmarkId::from_parameter(total), &total, |b, &total| {
            b.iter(|| {
                let count = placements(black_box(total), 1, &geometry)
                    .expect("placements failed")
                    .count();
                black_box(count);
            });
        });
    }
    group.finish();
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    for (name, total, format) in [
        ("letter_page", 35u32, "uline-s16990"),
        ("a4_multi", 200, "a4-48x24"),
        ("card_long", 1000, "card-85x54"),
    ] {
        let request = make_request(total, format);
        group.bench_with_input(BenchmarkId::from_parameter(name), &request, |b, request| {
            b.iter(|| {
                let layout = compute_run_layout(black_box(request)).expect("layout failed");
                black_box(layout.label_count());
            });
        });
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_svg");
    let theme = Theme::latin();
    for (name, total) in [("one_page", 35u32), ("ten_pages", 350)] {
        let layout =
            compute_run_layout(&make_request(total, "uline-s16990")).expect("layout failed");
        group.bench_with_input(BenchmarkId::from_parameter(name), &layout, |b, layout| {
            b.iter(|| {
                let emitter = SvgEmitter::new(layout.geometry, &theme, "SMILEBAR");
                let (pages, _) = emit_run(black_box(layout), emitter);
                black_box(pages.len());
            });
        });
    }
    group.finish();
}

fn bench_end_to_end(c: &mut Criterion) {
    let mut group = c.benchmark_group("end_to_end");
    let theme = Theme::latin();
    for (name, job) in [
        (
            "letter_weekly",
            r#"{ "totalLabels": 35, "startDate": "2024-01-01" }"#,
        ),
        (
            "a4_grouped",
            r#"{ "totalLabels": 200, "startDate": "2024-01-01", "cadence": "biweekly", "groupCount": 5, "format": "a4-48x24" }"#,
        ),
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(name), job, |b, job| {
            b.iter(|| {
                let request = labelrun::config::parse_job(black_box(job))
                    .expect("parse failed")
                    .into_request()
                    .expect("resolve failed");
                let layout = compute_run_layout(&request).expect("layout failed");
                let emitter = SvgEmitter::new(layout.geometry, &theme, layout.title.clone());
                let (pages, _) = emit_run(&layout, emitter);
                black_box(pages.len());
            });
        });
    }
    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_placements, bench_layout, bench_render, bench_end_to_end
);
criterion_main!(benches);
