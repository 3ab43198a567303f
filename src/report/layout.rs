//! Sectioned, paginated report layout.
//!
//! Positions are millimetres measured from the top edge of an A4 page.
//! Sections are placed in a fixed order; before each one the paginator
//! checks whether it still fits above the bottom margin and starts a new
//! page otherwise. A section landing on a fresh page is placed even when
//! taller than the printable area.

use crate::analysis::classify::{two_tier, Summary};
use crate::models::{Condition, DiagnosisResult, Label};
use crate::workflow::validate::decode_data_url;

use super::{
    format_percent, format_timestamp, ReportMeta, DISCLAIMER_TEXT, DISCLAIMER_TITLE, FOOTER_TEXT,
    REPORT_SUBTITLE, REPORT_TITLE,
};

pub const PAGE_WIDTH: f64 = 210.0;
pub const PAGE_HEIGHT: f64 = 297.0;
pub const MARGIN_X: f64 = 20.0;
pub const TOP_MARGIN: f64 = 30.0;
pub const BOTTOM_MARGIN: f64 = 30.0;
pub const SAFETY_MARGIN: f64 = 5.0;
/// Lowest offset a section may reach, safety margin included.
pub const PRINTABLE_BOTTOM: f64 = PAGE_HEIGHT - BOTTOM_MARGIN;

pub const HEADER_BAND: f64 = 40.0;
pub const IMAGE_WIDTH: f64 = 80.0;
pub const IMAGE_HEIGHT: f64 = 60.0;
pub const LINE_HEIGHT: f64 = 6.0;
pub const BODY_FONT_PT: f64 = 11.0;
pub const DISCLAIMER_FONT_PT: f64 = 10.0;
pub const DISCLAIMER_LINE_HEIGHT: f64 = 5.0;
pub const FOOTER_OFFSET: f64 = 10.0;

const HEADER_EXTENT: f64 = 60.0;
const METADATA_EXTENT: f64 = 15.0 + 8.0 + 8.0 + 20.0;
const IMAGE_EXTENT: f64 = 10.0 + IMAGE_HEIGHT + 20.0;
const SUMMARY_EXTENT: f64 = 15.0 + 10.0 + 8.0 + 15.0;
const DETAIL_EXTENT: f64 = 10.0 + 8.0 + 15.0;
const RECOMMENDATION_PADDING: f64 = 10.0 + 15.0;
const DISCLAIMER_MIN_BOX: f64 = 25.0;
const DISCLAIMER_WIDTH: f64 = PAGE_WIDTH - 50.0;

const PT_TO_MM: f64 = 0.3528;
/// Average Helvetica glyph width, in ems.
const AVG_CHAR_EM: f64 = 0.5;

/// Approximate rendered width of `text`.
pub fn text_width(text: &str, font_pt: f64) -> f64 {
    text.chars().count() as f64 * font_pt * PT_TO_MM * AVG_CHAR_EM
}

pub fn chars_per_line(width_mm: f64, font_pt: f64) -> usize {
    ((width_mm / (font_pt * PT_TO_MM * AVG_CHAR_EM)).floor() as usize).max(1)
}

/// Greedy word wrap on character count. Words longer than a line are
/// split so no line exceeds `max_chars`.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let chars: Vec<char> = word.chars().collect();
        for piece in chars.chunks(max_chars) {
            if !current.is_empty() && current_len + 1 + piece.len() > max_chars {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if !current.is_empty() {
                current.push(' ');
                current_len += 1;
            }
            current.extend(piece);
            current_len += piece.len();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// True when a section of `extent` starting at `cursor` would run past
/// the printable area.
pub fn needs_break(cursor: f64, extent: f64) -> bool {
    cursor + extent + SAFETY_MARGIN > PRINTABLE_BOTTOM
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emphasis {
    Emphasized,
    Muted,
}

/// One `label: n%` line of a comparison block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreLine {
    pub label: Label,
    pub confidence: f64,
    pub emphasis: Emphasis,
}

impl ScoreLine {
    pub fn text(&self) -> String {
        format!(
            "{}: {}",
            self.label.display_name(),
            format_percent(self.confidence)
        )
    }
}

/// Two lines in fixed order; exactly one is emphasized.
fn score_pair(first: (Label, f64), second: (Label, f64), first_wins: bool) -> [ScoreLine; 2] {
    let emphasis = |wins: bool| {
        if wins {
            Emphasis::Emphasized
        } else {
            Emphasis::Muted
        }
    };
    [
        ScoreLine {
            label: first.0,
            confidence: first.1,
            emphasis: emphasis(first_wins),
        },
        ScoreLine {
            label: second.0,
            confidence: second.1,
            emphasis: emphasis(!first_wins),
        },
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Header,
    Metadata,
    Image,
    Summary,
    Detail,
    Recommendation,
    Disclaimer,
    Footer,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Section {
    Header {
        title: String,
        subtitle: String,
        generated_at: String,
    },
    Metadata {
        user_email: String,
        file_name: String,
        file_size: String,
    },
    Image {
        bytes: Vec<u8>,
    },
    Summary {
        summary: Summary,
        lines: [ScoreLine; 2],
    },
    Detail {
        condition: Condition,
        lines: [ScoreLine; 2],
    },
    Recommendation {
        lines: Vec<String>,
    },
    Disclaimer {
        title: String,
        lines: Vec<String>,
    },
    Footer {
        text: String,
    },
}

impl Section {
    pub fn kind(&self) -> SectionKind {
        match self {
            Self::Header { .. } => SectionKind::Header,
            Self::Metadata { .. } => SectionKind::Metadata,
            Self::Image { .. } => SectionKind::Image,
            Self::Summary { .. } => SectionKind::Summary,
            Self::Detail { .. } => SectionKind::Detail,
            Self::Recommendation { .. } => SectionKind::Recommendation,
            Self::Disclaimer { .. } => SectionKind::Disclaimer,
            Self::Footer { .. } => SectionKind::Footer,
        }
    }

    /// Vertical space the section consumes, trailing gap included.
    pub fn extent(&self) -> f64 {
        match self {
            Self::Header { .. } => HEADER_EXTENT,
            Self::Metadata { .. } => METADATA_EXTENT,
            Self::Image { .. } => IMAGE_EXTENT,
            Self::Summary { .. } => SUMMARY_EXTENT,
            Self::Detail { .. } => DETAIL_EXTENT,
            Self::Recommendation { lines } => {
                RECOMMENDATION_PADDING + lines.len() as f64 * LINE_HEIGHT
            }
            Self::Disclaimer { lines, .. } => disclaimer_box_height(lines.len()),
            Self::Footer { .. } => 0.0,
        }
    }
}

pub fn disclaimer_box_height(line_count: usize) -> f64 {
    (15.0 + line_count as f64 * DISCLAIMER_LINE_HEIGHT).max(DISCLAIMER_MIN_BOX)
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedSection {
    /// Zero-based page index.
    pub page: usize,
    /// Offset of the section's top from the page's top edge.
    pub y: f64,
    pub section: Section,
}

/// Finished report layout. Never mutated after `build`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    sections: Vec<PlacedSection>,
    page_count: usize,
}

impl ReportDocument {
    pub fn sections(&self) -> &[PlacedSection] {
        &self.sections
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn kinds(&self) -> Vec<SectionKind> {
        self.sections.iter().map(|p| p.section.kind()).collect()
    }

    pub fn find(&self, kind: SectionKind) -> Option<&PlacedSection> {
        self.sections.iter().find(|p| p.section.kind() == kind)
    }

    pub fn has(&self, kind: SectionKind) -> bool {
        self.find(kind).is_some()
    }
}

struct Paginator {
    page: usize,
    cursor: f64,
    fresh_page: bool,
    placed: Vec<PlacedSection>,
}

impl Paginator {
    fn new() -> Self {
        Self {
            page: 0,
            cursor: 0.0,
            fresh_page: true,
            placed: Vec::new(),
        }
    }

    fn place(&mut self, section: Section) {
        let extent = section.extent();
        if !self.fresh_page && needs_break(self.cursor, extent) {
            self.page += 1;
            self.cursor = TOP_MARGIN;
        }
        self.placed.push(PlacedSection {
            page: self.page,
            y: self.cursor,
            section,
        });
        self.cursor += extent;
        self.fresh_page = false;
    }

    /// Place outside the flow, at a fixed offset on the current page.
    fn pin(&mut self, section: Section, y: f64) {
        self.placed.push(PlacedSection {
            page: self.page,
            y,
            section,
        });
    }

    fn finish(self) -> ReportDocument {
        ReportDocument {
            page_count: self.page + 1,
            sections: self.placed,
        }
    }
}

/// Lay out the full report for `result`.
pub fn build(result: &DiagnosisResult, meta: &ReportMeta) -> ReportDocument {
    let mut pages = Paginator::new();

    pages.place(Section::Header {
        title: REPORT_TITLE.to_string(),
        subtitle: REPORT_SUBTITLE.to_string(),
        generated_at: format_timestamp(&meta.generated_at),
    });

    pages.place(Section::Metadata {
        user_email: meta.user_email.clone(),
        file_name: meta.file_name.clone(),
        file_size: meta.file_size.clone(),
    });

    if let Some(preview) = meta.preview.as_deref() {
        match decode_data_url(preview) {
            Ok(bytes) if !bytes.is_empty() => pages.place(Section::Image { bytes }),
            Ok(_) => tracing::warn!("Empty preview skipped in report"),
            Err(e) => tracing::warn!(error = %e, "Preview skipped in report"),
        }
    }

    let verdict = two_tier(result);
    pages.place(Section::Summary {
        summary: verdict.summary,
        lines: score_pair(
            (Label::Healthy, verdict.healthy),
            (Label::Sick, verdict.sick),
            verdict.summary == Summary::Healthy,
        ),
    });

    if let Some(detail) = verdict.detail {
        pages.place(Section::Detail {
            condition: detail.condition,
            lines: score_pair(
                (Label::Cataract, detail.cataract),
                (Label::Glaucoma, detail.glaucoma),
                detail.condition == Condition::Cataract,
            ),
        });
    }

    let body_chars = chars_per_line(PAGE_WIDTH - 2.0 * MARGIN_X, BODY_FONT_PT);
    pages.place(Section::Recommendation {
        lines: wrap_text(&meta.recommendation, body_chars),
    });

    let disclaimer_chars = chars_per_line(DISCLAIMER_WIDTH, DISCLAIMER_FONT_PT);
    pages.place(Section::Disclaimer {
        title: DISCLAIMER_TITLE.to_string(),
        lines: wrap_text(DISCLAIMER_TEXT, disclaimer_chars),
    });

    pages.pin(
        Section::Footer {
            text: FOOTER_TEXT.to_string(),
        },
        PAGE_HEIGHT - FOOTER_OFFSET,
    );

    pages.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::validate::data_url;
    use chrono::NaiveDate;

    fn meta(preview: Option<String>, recommendation: &str) -> ReportMeta {
        ReportMeta {
            user_email: "ana@example.org".into(),
            file_name: "fundus.jpg".into(),
            file_size: "1 MB".into(),
            generated_at: NaiveDate::from_ymd_opt(2024, 5, 2)
                .unwrap()
                .and_hms_opt(14, 30, 0)
                .unwrap(),
            preview,
            recommendation: recommendation.into(),
        }
    }

    fn healthy() -> DiagnosisResult {
        DiagnosisResult::new(Some(60.0), Some(40.0), None, None)
    }

    fn sick() -> DiagnosisResult {
        DiagnosisResult::new(Some(30.0), Some(70.0), Some(80.0), Some(20.0))
    }

    /// `count` words that wrap two per line at body width.
    fn words(count: usize) -> String {
        let width = chars_per_line(PAGE_WIDTH - 2.0 * MARGIN_X, BODY_FONT_PT);
        let word = "a".repeat((width - 1) / 2);
        vec![word; count].join(" ")
    }

    #[test]
    fn no_preview_means_no_image_section() {
        let doc = build(&healthy(), &meta(None, "Tudo certo."));
        assert!(!doc.has(SectionKind::Image));
        assert_eq!(
            doc.kinds(),
            vec![
                SectionKind::Header,
                SectionKind::Metadata,
                SectionKind::Summary,
                SectionKind::Recommendation,
                SectionKind::Disclaimer,
                SectionKind::Footer,
            ]
        );
    }

    #[test]
    fn preview_adds_image_after_metadata() {
        let preview = data_url("image/jpeg", &[0xFF, 0xD8, 0xFF]);
        let doc = build(&healthy(), &meta(Some(preview), "Tudo certo."));
        assert_eq!(doc.kinds()[2], SectionKind::Image);
    }

    #[test]
    fn broken_preview_is_skipped() {
        let doc = build(&healthy(), &meta(Some("blob:nope".into()), "Tudo certo."));
        assert!(!doc.has(SectionKind::Image));
        assert!(doc.has(SectionKind::Recommendation));
    }

    #[test]
    fn detail_only_when_sick() {
        assert!(!build(&healthy(), &meta(None, "x")).has(SectionKind::Detail));

        let doc = build(&sick(), &meta(None, "x"));
        let Some(PlacedSection {
            section: Section::Detail { condition, lines },
            ..
        }) = doc.find(SectionKind::Detail)
        else {
            panic!("detail section missing");
        };
        assert_eq!(*condition, Condition::Cataract);
        assert_eq!(lines[0].emphasis, Emphasis::Emphasized);
        assert_eq!(lines[1].emphasis, Emphasis::Muted);
    }

    #[test]
    fn summary_emphasizes_winner() {
        let doc = build(&sick(), &meta(None, "x"));
        let Some(PlacedSection {
            section: Section::Summary { summary, lines },
            ..
        }) = doc.find(SectionKind::Summary)
        else {
            panic!("summary section missing");
        };
        assert_eq!(*summary, Summary::Sick);
        assert_eq!(lines[0].label, Label::Healthy);
        assert_eq!(lines[0].emphasis, Emphasis::Muted);
        assert_eq!(lines[1].emphasis, Emphasis::Emphasized);
        assert_eq!(lines[1].text(), "Doente: 70%");
    }

    #[test]
    fn summary_recomputed_without_sick_field() {
        // Three-way-only results still get a healthy/sick summary (sick = 0).
        let result = DiagnosisResult::new(Some(20.0), None, Some(15.0), Some(65.0));
        let doc = build(&result, &meta(None, "x"));
        assert!(!doc.has(SectionKind::Detail));
    }

    #[test]
    fn long_recommendation_wraps_proportionally() {
        let short = build(&healthy(), &meta(None, &words(2)));
        let long = build(&healthy(), &meta(None, &words(10)));

        let lines = |doc: &ReportDocument| match &doc.find(SectionKind::Recommendation).unwrap().section {
            Section::Recommendation { lines } => lines.len(),
            _ => unreachable!(),
        };
        assert_eq!(lines(&short), 1);
        assert_eq!(lines(&long), 5);

        let extent = |doc: &ReportDocument| {
            doc.find(SectionKind::Recommendation).unwrap().section.extent()
        };
        assert_eq!(extent(&long) - extent(&short), 4.0 * LINE_HEIGHT);
    }

    #[test]
    fn wrapped_lines_fit_width() {
        let width = chars_per_line(PAGE_WIDTH - 2.0 * MARGIN_X, BODY_FONT_PT);
        let text = "Possível presença de glaucoma detectada. ".repeat(10);
        for line in wrap_text(&text, width) {
            assert!(line.chars().count() <= width, "{line}");
        }
    }

    #[test]
    fn long_tokens_are_split_to_width() {
        let url = format!("https://exemplo.org/{}", "a".repeat(200));
        let text = format!("Veja {url} para detalhes.");
        let lines = wrap_text(&text, 40);
        assert!(lines.iter().all(|line| line.chars().count() <= 40));
        assert_eq!(lines[0], "Veja");
        assert_eq!(lines.concat().replace(' ', ""), text.replace(' ', ""));
    }

    #[test]
    fn break_threshold_is_strict() {
        assert!(!needs_break(PRINTABLE_BOTTOM - SAFETY_MARGIN - 40.0, 40.0));
        assert!(needs_break(PRINTABLE_BOTTOM - SAFETY_MARGIN - 40.0 + 0.01, 40.0));
    }

    #[test]
    fn page_break_exactly_past_threshold() {
        // Header, metadata and summary leave the cursor at 159mm; a
        // recommendation of 13 lines ends exactly on the threshold.
        let fits = build(&healthy(), &meta(None, &words(26)));
        let rec = fits.find(SectionKind::Recommendation).unwrap();
        assert_eq!(rec.page, 0);
        assert_eq!(rec.y + rec.section.extent() + SAFETY_MARGIN, PRINTABLE_BOTTOM);

        let spills = build(&healthy(), &meta(None, &words(28)));
        let rec = spills.find(SectionKind::Recommendation).unwrap();
        assert_eq!(rec.page, 1);
        assert_eq!(rec.y, TOP_MARGIN);
        assert_eq!(spills.page_count(), 2);
    }

    #[test]
    fn short_report_fits_one_page() {
        let doc = build(&sick(), &meta(None, "Consulte um oftalmologista."));
        assert_eq!(doc.page_count(), 1);
        assert!(doc.sections().iter().all(|p| p.page == 0));
    }

    #[test]
    fn image_pushes_disclaimer_to_next_page() {
        let preview = data_url("image/png", b"\x89PNG\r\n");
        let doc = build(&sick(), &meta(Some(preview), &words(4)));
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.find(SectionKind::Header).unwrap().page, 0);
        assert_eq!(doc.find(SectionKind::Disclaimer).unwrap().page, 1);
    }

    #[test]
    fn footer_on_last_page_bottom() {
        let doc = build(&healthy(), &meta(None, &words(28)));
        let footer = doc.find(SectionKind::Footer).unwrap();
        assert_eq!(footer.page, doc.page_count() - 1);
        assert_eq!(footer.y, PAGE_HEIGHT - FOOTER_OFFSET);
    }

    #[test]
    fn oversized_section_on_fresh_page_is_placed() {
        let doc = build(&healthy(), &meta(None, &words(120)));
        let rec = doc.find(SectionKind::Recommendation).unwrap();
        assert_eq!(rec.page, 1);
        assert!(rec.y + rec.section.extent() > PRINTABLE_BOTTOM);
        assert_eq!(doc.find(SectionKind::Disclaimer).unwrap().page, 2);
    }
}
