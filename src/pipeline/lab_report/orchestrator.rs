use super::classify::classify_section;
use super::locator::section_spans;
use super::metadata::extract_metadata;
use super::types::{Clock, ParseWarning, SystemClock, Vocabulary};
use super::LabParseError;
use crate::models::{Report, Section};

/// Lab report parsing abstraction (allows mocking by callers).
pub trait ReportParser {
    fn parse(&self, document: &str) -> Result<Report, LabParseError>;
}

/// Parse a lab report using the wall clock for a missing collection date.
pub fn parse(document: &str, vocabulary: &Vocabulary) -> Result<Report, LabParseError> {
    parse_with_clock(document, vocabulary, &SystemClock)
}

/// Parse a lab report into sections and test results.
///
/// Sections are located by vocabulary headers, each span is classified as a
/// table or text, and report metadata is merged in. When a section name
/// repeats, the later span replaces the earlier one but keeps its position.
/// Bad rows and odd dates are attached as warnings; only an empty document
/// is rejected outright.
pub fn parse_with_clock(
    document: &str,
    vocabulary: &Vocabulary,
    clock: &dyn Clock,
) -> Result<Report, LabParseError> {
    if document.trim().is_empty() {
        return Err(LabParseError::EmptyDocument);
    }

    let mut sections: Vec<Section> = Vec::new();
    let mut warnings: Vec<ParseWarning> = Vec::new();

    for span in section_spans(document, vocabulary) {
        tracing::debug!(
            section = %span.name,
            start = span.start,
            end = span.end,
            "Located report section"
        );
        let (section, section_warnings) = classify_section(span.slice(document), &span.name);
        warnings.extend(section_warnings);
        upsert_section(&mut sections, section);
    }

    if sections.is_empty() {
        tracing::warn!(
            vocabulary_size = vocabulary.len(),
            "No known section headers found in lab report"
        );
        warnings.push(ParseWarning::NoHeadersFound);
    }

    let (metadata, metadata_warnings) = extract_metadata(document, clock);
    warnings.extend(metadata_warnings);

    tracing::info!(
        sections = sections.len(),
        results = sections.iter().map(|s| s.results().len()).sum::<usize>(),
        warnings = warnings.len(),
        has_specimen_id = metadata.specimen_id.is_some(),
        "Lab report parsed"
    );

    Ok(Report::new(
        metadata.specimen_id,
        metadata.collection_date,
        sections,
        warnings,
    ))
}

/// Last section with a given name wins, at the position of the first.
fn upsert_section(sections: &mut Vec<Section>, section: Section) {
    match sections.iter_mut().find(|s| s.name() == section.name()) {
        Some(existing) => {
            tracing::debug!(section = section.name(), "Replacing repeated section");
            *existing = section;
        }
        None => sections.push(section),
    }
}

/// Stateless parser bound to one vocabulary and clock.
pub struct LabReportParser {
    vocabulary: Vocabulary,
    clock: Box<dyn Clock>,
}

impl LabReportParser {
    pub fn new(vocabulary: Vocabulary) -> Self {
        Self {
            vocabulary,
            clock: Box::new(SystemClock),
        }
    }

    /// Use a different clock for the collection-date default.
    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }
}

impl ReportParser for LabReportParser {
    fn parse(&self, document: &str) -> Result<Report, LabParseError> {
        parse_with_clock(document, &self.vocabulary, self.clock.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ResultFlag, SectionKind};
    use crate::pipeline::lab_report::FixedClock;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn vocab() -> Vocabulary {
        Vocabulary::new(["Chemistry Panel", "Hematology", "Comments"]).unwrap()
    }

    fn fixed() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).unwrap())
    }

    /// Builds a document with "Chemistry Panel" at byte 50 and "Hematology" at byte 300.
    fn sample_document() -> String {
        let mut doc = String::from("ACME LABS  Specimen ID: S-2024-001 ");
        doc.push_str(&" ".repeat(50 - doc.len()));
        doc.push_str("Chemistry Panel\n");
        doc.push_str("Test Result Flag Previous Date Units Reference\n");
        doc.push_str("Glucose 95 H 88 01/01/2023 mg/dL 70-100\n");
        doc.push_str("Sodium 140 mmol/L 135-145\n");
        doc.push_str(&" ".repeat(300 - doc.len()));
        doc.push_str("Hematology\n");
        doc.push_str("Test Value Units\n");
        doc.push_str("WBC 6.1 x10^9/L\n");
        doc.push_str("Comments\nSample hemolyzed, interpret potassium with caution.\n");
        doc
    }

    #[test]
    fn sample_document_has_headers_at_expected_offsets() {
        let doc = sample_document();
        assert_eq!(doc.find("Chemistry Panel"), Some(50));
        assert_eq!(doc.find("Hematology"), Some(300));
    }

    #[test]
    fn parses_glucose_row_from_chemistry_panel() {
        let doc = sample_document();
        let report = parse_with_clock(&doc, &vocab(), &fixed()).unwrap();

        let chem = report.section("Chemistry Panel").unwrap();
        assert_eq!(chem.kind(), SectionKind::Table);
        let glucose = &chem.results()[0];
        assert_eq!(glucose.test_name, "Glucose");
        assert_eq!(glucose.current_result, "95");
        assert_eq!(glucose.flag, Some(ResultFlag::High));
        assert_eq!(glucose.previous_result.as_deref(), Some("88"));
        assert_eq!(glucose.previous_date, NaiveDate::from_ymd_opt(2023, 1, 1));
        assert_eq!(glucose.units.as_deref(), Some("mg/dL"));
        assert_eq!(glucose.reference_interval.as_deref(), Some("70-100"));

        let json = serde_json::to_value(glucose).unwrap();
        assert_eq!(json["flag"], "high");
        assert_eq!(json["previous_date"], "2023-01-01");
    }

    #[test]
    fn sections_follow_document_order() {
        let report = parse_with_clock(&sample_document(), &vocab(), &fixed()).unwrap();
        let names: Vec<_> = report.sections().iter().map(|s| s.name()).collect();
        assert_eq!(names, ["Chemistry Panel", "Hematology", "Comments"]);

        assert_eq!(report.section("Hematology").unwrap().results().len(), 1);
        assert_eq!(
            report.section("Comments").unwrap(),
            &Section::Text {
                name: "Comments".into(),
                content: "Comments\nSample hemolyzed, interpret potassium with caution.".into(),
            }
        );
        assert!(!report.has_warnings());
    }

    #[test]
    fn metadata_is_merged() {
        let report = parse_with_clock(&sample_document(), &vocab(), &fixed()).unwrap();
        assert_eq!(report.specimen_id(), Some("S-2024-001"));
        assert_eq!(report.collection_date(), fixed().now());
    }

    #[test]
    fn no_headers_gives_empty_report_with_warning() {
        let report = parse_with_clock("Just a letter from the clinic.", &vocab(), &fixed()).unwrap();
        assert!(report.sections().is_empty());
        assert_eq!(report.warnings(), &[ParseWarning::NoHeadersFound]);
        assert!(report.specimen_id().is_none());
        assert_eq!(report.collection_date(), fixed().now());
    }

    #[test]
    fn wall_clock_default_is_close_to_now() {
        let before = Utc::now();
        let report = parse("Nothing here", &vocab()).unwrap();
        let after = Utc::now();
        assert!(report.collection_date() >= before);
        assert!(report.collection_date() <= after);
    }

    #[test]
    fn empty_document_is_rejected() {
        assert_eq!(parse("", &vocab()), Err(LabParseError::EmptyDocument));
        assert_eq!(parse(" \n\t ", &vocab()), Err(LabParseError::EmptyDocument));
    }

    #[test]
    fn repeated_section_name_last_wins_in_first_position() {
        let doc = "Hematology\nTest Result\nWBC 6.1\nComments\nfirst\nHematology\nTest Result\nWBC 7.9\nRBC 4.5\n";
        let report = parse_with_clock(doc, &vocab(), &fixed()).unwrap();

        let names: Vec<_> = report.sections().iter().map(|s| s.name()).collect();
        assert_eq!(names, ["Hematology", "Comments"]);
        let heme = report.section("Hematology").unwrap().results();
        assert_eq!(heme.len(), 2);
        assert_eq!(heme[0].current_result, "7.9");
    }

    #[test]
    fn bad_rows_do_not_abort_the_parse() {
        let doc = "Chemistry Panel\nTest Result Units\nGlucose 95 mg/dL\n*** see note ***\nUrea 5.1 4.0 31/02/2023 mmol/L\n";
        let report = parse_with_clock(doc, &vocab(), &fixed()).unwrap();

        assert_eq!(report.section("Chemistry Panel").unwrap().results().len(), 2);
        assert_eq!(report.warnings().len(), 2);
        assert!(matches!(report.warnings()[0], ParseWarning::MalformedRow { .. }));
        assert!(matches!(report.warnings()[1], ParseWarning::AmbiguousDate { .. }));
        assert!(report.advisory_message().is_some());
    }

    #[test]
    fn same_input_and_clock_give_identical_reports() {
        let doc = sample_document();
        let a = parse_with_clock(&doc, &vocab(), &fixed()).unwrap();
        let b = parse_with_clock(&doc, &vocab(), &fixed()).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn parser_struct_uses_injected_clock() {
        let parser = LabReportParser::new(vocab()).with_clock(Box::new(fixed()));
        let report = parser.parse("Hematology\nTest Result\nWBC 6.1").unwrap();
        assert_eq!(report.collection_date(), fixed().now());
        assert_eq!(parser.vocabulary().len(), 3);
    }

    #[test]
    fn concurrent_parses_are_independent() {
        let parser = LabReportParser::new(vocab()).with_clock(Box::new(fixed()));
        let parser = &parser;
        let docs: Vec<String> = (0..8)
            .map(|i| format!("Specimen ID: S{i}\nHematology\nTest Result\nWBC {i}.5\n"))
            .collect();

        let reports: Vec<Report> = std::thread::scope(|scope| {
            let handles: Vec<_> = docs
                .iter()
                .map(|doc| scope.spawn(move || parser.parse(doc).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        for (i, report) in reports.iter().enumerate() {
            assert_eq!(report.specimen_id(), Some(format!("S{i}").as_str()));
            let wbc = &report.section("Hematology").unwrap().results()[0];
            assert_eq!(wbc.current_result, format!("{i}.5"));
        }
    }
}
