use crate::error::EmitError;
use crate::layout::{LabelRecord, RunLayout};
use crate::placement::Placement;

/// Turns a payload string into an SVG fragment of the requested square size.
/// Implementations draw in the caller's coordinate space with the top-left
/// corner at the origin.
pub trait QrEncoder {
    fn encode_svg(&self, payload: &str, size: f32) -> Result<String, EmitError>;
}

/// A page-oriented output backend.
///
/// `emit_run` drives implementations strictly in placement order: one
/// `begin_page` per non-empty page, then `emit_label` for each label on it.
/// A failed label must leave the page usable for the labels after it.
pub trait DocumentEmitter {
    type Artifact;

    fn begin_page(&mut self, page: u32) -> Result<(), EmitError>;
    fn emit_label(&mut self, placement: &Placement, record: &LabelRecord)
    -> Result<(), EmitError>;
    fn finish(self) -> Self::Artifact;
}

/// One label that could not be produced. The rest of the run is unaffected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelFailure {
    pub index: u32,
    pub message: String,
}

/// What actually happened during a run: how much was asked for, how much came
/// out, and what went wrong per label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub total: u32,
    pub succeeded: u32,
    pub failures: Vec<LabelFailure>,
}

impl RunReport {
    pub fn complete(&self) -> bool {
        self.failures.is_empty() && self.succeeded == self.total
    }
}

/// Feed a resolved layout through an emitter, collecting per-label failures
/// instead of aborting. A page that fails to open marks every label on it as
/// failed and the run moves on to the next page.
pub fn emit_run<E: DocumentEmitter>(layout: &RunLayout, mut emitter: E) -> (E::Artifact, RunReport) {
    let mut report = RunReport {
        total: layout.label_count() as u32,
        ..RunReport::default()
    };

    for page in &layout.pages {
        if let Err(err) = emitter.begin_page(page.page) {
            for placed in &page.labels {
                report.failures.push(LabelFailure {
                    index: placed.record.index,
                    message: err.to_string(),
                });
            }
            continue;
        }
        for placed in &page.labels {
            match emitter.emit_label(&placed.placement, &placed.record) {
                Ok(()) => report.succeeded += 1,
                Err(err) => report.failures.push(LabelFailure {
                    index: placed.record.index,
                    message: err.to_string(),
                }),
            }
        }
    }

    (emitter.finish(), report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::CivilDate;
    use crate::layout::{SequenceRequest, compute_run_layout};
    use crate::sheet::{GridMode, SheetSpec, Unit};

    /// Records the call sequence and fails on request.
    #[derive(Default)]
    struct ScriptedEmitter {
        calls: Vec<String>,
        fail_labels: Vec<u32>,
        fail_pages: Vec<u32>,
    }

    impl DocumentEmitter for ScriptedEmitter {
        type Artifact = Vec<String>;

        fn begin_page(&mut self, page: u32) -> Result<(), EmitError> {
            if self.fail_pages.contains(&page) {
                return Err(EmitError::Draw(format!("page {page} refused")));
            }
            self.calls.push(format!("page {page}"));
            Ok(())
        }

        fn emit_label(
            &mut self,
            placement: &Placement,
            record: &LabelRecord,
        ) -> Result<(), EmitError> {
            if self.fail_labels.contains(&record.index) {
                return Err(EmitError::Draw(format!("label {} refused", record.index)));
            }
            self.calls
                .push(format!("label {} @{}:{}", record.index, placement.row, placement.col));
            Ok(())
        }

        fn finish(self) -> Vec<String> {
            self.calls
        }
    }

    fn two_page_layout() -> RunLayout {
        let sheet = SheetSpec {
            name: "tiny".into(),
            label_width: 1.0,
            label_height: 1.0,
            page_width: 2.0,
            page_height: 2.0,
            unit: Unit::In,
            grid: GridMode::Fixed {
                columns: 2,
                rows: 2,
            },
        };
        let request = SequenceRequest::new(6, CivilDate::new(2024, 1, 1).unwrap(), sheet);
        compute_run_layout(&request).unwrap()
    }

    #[test]
    fn a_clean_run_reports_complete() {
        let layout = two_page_layout();
        let (calls, report) = emit_run(&layout, ScriptedEmitter::default());
        assert!(report.complete());
        assert_eq!(report.succeeded, 6);
        assert_eq!(calls.first().map(String::as_str), Some("page 0"));
        assert_eq!(calls.iter().filter(|call| call.starts_with("page")).count(), 2);
    }

    #[test]
    fn label_failures_are_collected_not_fatal() {
        let layout = two_page_layout();
        let emitter = ScriptedEmitter {
            fail_labels: vec![2, 5],
            ..ScriptedEmitter::default()
        };
        let (calls, report) = emit_run(&layout, emitter);
        assert_eq!(report.succeeded, 4);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].index, 2);
        assert_eq!(report.failures[1].index, 5);
        assert!(!report.complete());
        // Labels after a failure still arrive.
        assert!(calls.iter().any(|call| call.starts_with("label 6")));
    }

    #[test]
    fn a_failed_page_fails_all_its_labels_and_moves_on() {
        let layout = two_page_layout();
        let emitter = ScriptedEmitter {
            fail_pages: vec![0],
            ..ScriptedEmitter::default()
        };
        let (calls, report) = emit_run(&layout, emitter);
        assert_eq!(report.succeeded, 2);
        let failed: Vec<u32> = report.failures.iter().map(|failure| failure.index).collect();
        assert_eq!(failed, vec![1, 2, 3, 4]);
        assert!(calls.iter().any(|call| call == "page 1"));
    }

    #[test]
    fn emission_follows_placement_order() {
        let layout = two_page_layout();
        let (calls, _) = emit_run(&layout, ScriptedEmitter::default());
        let labels: Vec<&String> = calls.iter().filter(|call| call.starts_with("label")).collect();
        for (offset, call) in labels.iter().enumerate() {
            assert!(
                call.starts_with(&format!("label {}", offset + 1)),
                "out of order: {call}"
            );
        }
    }
}
