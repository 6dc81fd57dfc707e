use crate::emit::{LabelFailure, RunReport};
use crate::error::{EmitError, LayoutError};
use crate::layout::{LabelRecord, RunLayout};
use crate::render::escape_xml;

/// Transport to a label printer spooler. `available` is probed once per run,
/// before any markup is generated; `send` delivers one label's worth.
pub trait LabelPrinter {
    fn available(&self) -> bool;
    fn send(&mut self, markup: &str) -> Result<(), EmitError>;
}

/// Markup language spoken by the target printer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrinterDialect {
    Zpl,
    Dymo,
}

/// ZPL II for one label on 2in thermal stock: date large, year and sequence
/// number below in a smaller face.
pub fn zpl_label(record: &LabelRecord) -> String {
    format!(
        "^XA\n^CF0,60\n^FO50,50^FD{date}^FS\n^CF0,45\n^FO50,120^FD{year}^FS\n^CF0,45\n^FO50,190^FD{number}^FS\n^XZ",
        date = record.change_date.short_label(),
        year = record.change_date.year_label(),
        number = record.number,
    )
}

/// DYMO Label Framework XML for 30334 1in x 1in die-cut stock. The single
/// text object holds all three lines; the printer driver does its own
/// shrink-to-fit.
pub fn dymo_label_xml(record: &LabelRecord) -> String {
    let text = escape_xml(&format!(
        "{}\n{}\n{}",
        record.change_date.short_label(),
        record.change_date.year_label(),
        record.number,
    ));
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<DieCutLabel Version="8.0" Units="twips">
  <PaperOrientation>Portrait</PaperOrientation>
  <Id>Small30334</Id>
  <PaperName>30334 1 in x 1 in</PaperName>
  <DrawCommands>
    <RoundRectangle X="0" Y="0" Width="1440" Height="1440" Rx="180" Ry="180" />
  </DrawCommands>
  <ObjectInfo>
    <TextObject>
      <Name>Date</Name>
      <ForeColor Alpha="255" Red="0" Green="0" Blue="0" />
      <BackColor Alpha="0" Red="255" Green="255" Blue="255" />
      <LinkedObjectName></LinkedObjectName>
      <Rotation>Rotation0</Rotation>
      <IsMirrored>False</IsMirrored>
      <IsVariable>False</IsVariable>
      <HorizontalAlignment>Center</HorizontalAlignment>
      <VerticalAlignment>Middle</VerticalAlignment>
      <TextFitMode>ShrinkToFit</TextFitMode>
      <UseFullFontHeight>True</UseFullFontHeight>
      <Verticalized>False</Verticalized>
      <StyledText>
        <Element>
          <String>{text}</String>
          <Attributes>
            <Font Family="Arial" Size="12" Bold="True" Italic="False" Underline="False" Strikeout="False" />
            <ForeColor Alpha="255" Red="0" Green="0" Blue="0" />
          </Attributes>
        </Element>
      </StyledText>
    </TextObject>
  </ObjectInfo>
</DieCutLabel>"#
    )
}

pub fn markup_for(dialect: PrinterDialect, record: &LabelRecord) -> String {
    match dialect {
        PrinterDialect::Zpl => zpl_label(record),
        PrinterDialect::Dymo => dymo_label_xml(record),
    }
}

/// Send every label of a run to a printer, in placement order.
///
/// A transport that is not available at all fails the run up front, before
/// anything is spooled. Once sending starts, individual failures are
/// collected and the rest of the run keeps going.
pub fn print_run(
    layout: &RunLayout,
    dialect: PrinterDialect,
    printer: &mut dyn LabelPrinter,
) -> Result<RunReport, LayoutError> {
    if !printer.available() {
        return Err(LayoutError::PrinterUnavailable);
    }

    let mut report = RunReport {
        total: layout.label_count() as u32,
        ..RunReport::default()
    };
    for page in &layout.pages {
        for placed in &page.labels {
            let markup = markup_for(dialect, &placed.record);
            match printer.send(&markup) {
                Ok(()) => report.succeeded += 1,
                Err(err) => report.failures.push(LabelFailure {
                    index: placed.record.index,
                    message: err.to_string(),
                }),
            }
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::CivilDate;
    use crate::layout::{SequenceRequest, compute_run_layout};
    use crate::numbering::display_number;
    use crate::schedule::Cadence;
    use crate::sheet::{GridMode, SheetSpec, Unit};

    #[derive(Default)]
    struct MockPrinter {
        up: bool,
        sent: Vec<String>,
        refuse: Vec<u32>,
        attempts: u32,
    }

    impl LabelPrinter for MockPrinter {
        fn available(&self) -> bool {
            self.up
        }

        fn send(&mut self, markup: &str) -> Result<(), EmitError> {
            self.attempts += 1;
            if self.refuse.contains(&self.attempts) {
                return Err(EmitError::Send(format!("spool rejected job {}", self.attempts)));
            }
            self.sent.push(markup.to_string());
            Ok(())
        }
    }

    fn record(index: u32, total: u32, groups: u32) -> LabelRecord {
        LabelRecord {
            index,
            change_date: crate::schedule::change_date(
                CivilDate::new(2024, 1, 1).unwrap(),
                Cadence::Weekly,
                index,
            ),
            number: display_number(index, total, groups),
            qr_payload: None,
        }
    }

    fn small_layout(total: u32) -> crate::layout::RunLayout {
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
        compute_run_layout(&SequenceRequest::new(
            total,
            CivilDate::new(2024, 1, 1).unwrap(),
            sheet,
        ))
        .unwrap()
    }

    #[test]
    fn zpl_carries_the_three_lines_in_order() {
        let zpl = zpl_label(&record(1, 3, 1));
        assert!(zpl.starts_with("^XA\n^CF0,60\n^FO50,50^FDJan 1^FS"));
        assert!(zpl.contains("^FO50,120^FD2024^FS"));
        assert!(zpl.contains("^FO50,190^FD1 of 3^FS"));
        assert!(zpl.ends_with("^XZ"));
    }

    #[test]
    fn zpl_respects_group_numbering() {
        let zpl = zpl_label(&record(6, 10, 2));
        assert!(zpl.contains("^FD2.1 of 2.5^FS"));
    }

    #[test]
    fn dymo_xml_targets_the_30334_die_cut() {
        let xml = dymo_label_xml(&record(2, 5, 1));
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(xml.contains("<Id>Small30334</Id>"));
        assert!(xml.contains("<PaperName>30334 1 in x 1 in</PaperName>"));
        assert!(xml.contains("<TextFitMode>ShrinkToFit</TextFitMode>"));
        assert!(xml.contains("<String>Jan 8\n2024\n2 of 5</String>"));
        assert!(xml.contains("Font Family=\"Arial\" Size=\"12\" Bold=\"True\""));
    }

    #[test]
    fn an_unavailable_printer_fails_before_anything_spools() {
        let layout = small_layout(3);
        let mut printer = MockPrinter::default();
        let err = print_run(&layout, PrinterDialect::Zpl, &mut printer).unwrap_err();
        assert!(matches!(err, LayoutError::PrinterUnavailable));
        assert!(printer.sent.is_empty());
    }

    #[test]
    fn every_label_is_sent_in_sequence() {
        let layout = small_layout(6);
        let mut printer = MockPrinter {
            up: true,
            ..MockPrinter::default()
        };
        let report = print_run(&layout, PrinterDialect::Zpl, &mut printer).unwrap();
        assert!(report.complete());
        assert_eq!(printer.sent.len(), 6);
        assert!(printer.sent[0].contains("^FD1 of 6^FS"));
        assert!(printer.sent[5].contains("^FD6 of 6^FS"));
    }

    #[test]
    fn a_rejected_label_does_not_stop_the_run() {
        let layout = small_layout(4);
        let mut printer = MockPrinter {
            up: true,
            refuse: vec![2],
            ..MockPrinter::default()
        };
        let report = print_run(&layout, PrinterDialect::Zpl, &mut printer).unwrap();
        assert_eq!(report.succeeded, 3);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].index, 2);
        assert!(report.failures[0].message.contains("spool rejected"));
        assert_eq!(printer.sent.len(), 3);
    }

    #[test]
    fn dialect_selects_the_markup() {
        let layout = small_layout(1);
        let mut printer = MockPrinter {
            up: true,
            ..MockPrinter::default()
        };
        print_run(&layout, PrinterDialect::Dymo, &mut printer).unwrap();
        assert!(printer.sent[0].starts_with("<?xml"));
    }
}
