//! Document classification.
//!
//! The orchestrator treats the classifier as a black box: it only consumes the
//! `(category, confidence, metadata)` triple. [`KeywordClassifier`] is the
//! default implementation, scoring categories by keyword hits in the file
//! name, sheet names, and the first rows of each sheet.

use sg_core::entities::{ClassificationMetadata, Document, GENERIC_CATEGORY, clamp_confidence};

use crate::categories::{ACTIVITIES, ATTENDANCE, BEHAVIOR, SUBJECT_REMARKS};
use crate::error::ClassifyError;

/// Output of a classifier for one document.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub category: String,
    /// Always within `[0, 1]`.
    pub confidence: f64,
    pub metadata: ClassificationMetadata,
}

impl Classification {
    /// The fallback used when classification fails.
    #[must_use]
    pub fn fallback(sheet_count: u32) -> Self {
        Self {
            category: GENERIC_CATEGORY.to_string(),
            confidence: 0.0,
            metadata: ClassificationMetadata {
                sheet_count,
                ..ClassificationMetadata::default()
            },
        }
    }
}

pub trait Classifier: Send + Sync {
    /// Assign a category to `document`.
    ///
    /// # Errors
    ///
    /// Returns `ClassifyError` when the document cannot be inspected. Callers
    /// degrade to [`Classification::fallback`].
    fn classify(&self, document: &Document) -> Result<Classification, ClassifyError>;
}

/// Rows per sheet scanned for header keywords.
const HEADER_ROWS: usize = 3;

/// Confidence reported when no keyword matches.
const NO_MATCH_CONFIDENCE: f64 = 0.4;

#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    table: Vec<(String, Vec<String>)>,
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        let table: [(&str, &[&str]); 4] = [
            (
                ATTENDANCE,
                &["출결", "출석", "결석", "지각", "조퇴", "수업일수"],
            ),
            (
                SUBJECT_REMARKS,
                &["세부능력", "특기사항", "세특", "교과", "과목"],
            ),
            (BEHAVIOR, &["행동특성", "종합의견", "행특"]),
            (
                ACTIVITIES,
                &["창의적 체험활동", "창체", "자율활동", "동아리", "봉사활동", "진로활동"],
            ),
        ];
        Self {
            table: table
                .iter()
                .map(|(category, words)| {
                    (
                        (*category).to_string(),
                        words.iter().map(|w| (*w).to_string()).collect(),
                    )
                })
                .collect(),
        }
    }
}

impl KeywordClassifier {
    /// Classifier with a custom keyword table. Earlier categories win ties.
    #[must_use]
    pub const fn with_table(table: Vec<(String, Vec<String>)>) -> Self {
        Self { table }
    }

    fn corpus(document: &Document) -> String {
        let mut corpus = document.file_name.clone();
        for sheet in &document.sheets {
            corpus.push('\n');
            corpus.push_str(&sheet.name);
            for row in sheet.rows.iter().take(HEADER_ROWS) {
                for cell in row {
                    corpus.push('\n');
                    corpus.push_str(cell);
                }
            }
        }
        corpus
    }
}

impl Classifier for KeywordClassifier {
    fn classify(&self, document: &Document) -> Result<Classification, ClassifyError> {
        if document.sheets.is_empty() {
            return Err(ClassifyError::EmptyDocument(document.file_name.clone()));
        }
        let sheet_count = u32::try_from(document.sheets.len()).unwrap_or(u32::MAX);
        let corpus = Self::corpus(document);

        let mut detected = Vec::new();
        let mut scores: Vec<(&str, usize)> = Vec::new();
        for (category, words) in &self.table {
            let hits: Vec<&String> = words.iter().filter(|w| corpus.contains(w.as_str())).collect();
            detected.extend(hits.iter().map(|w| (*w).clone()));
            scores.push((category, hits.len()));
        }

        let total: usize = scores.iter().map(|(_, hits)| hits).sum();
        let best = scores
            .iter()
            .enumerate()
            .max_by_key(|(index, (_, hits))| (*hits, std::cmp::Reverse(*index)))
            .map(|(_, score)| *score);

        let Some((category, best_hits)) = best.filter(|(_, hits)| *hits > 0) else {
            return Ok(Classification {
                category: GENERIC_CATEGORY.to_string(),
                confidence: NO_MATCH_CONFIDENCE,
                metadata: ClassificationMetadata {
                    sheet_count,
                    ..ClassificationMetadata::default()
                },
            });
        };

        let mut runners_up: Vec<(&str, usize)> = scores
            .iter()
            .copied()
            .filter(|(c, hits)| *hits > 0 && *c != category)
            .collect();
        runners_up.sort_by(|a, b| b.1.cmp(&a.1));

        #[allow(clippy::cast_precision_loss)]
        let share = best_hits as f64 / total as f64;
        let strength = 1.0 - 0.5_f64.powi(i32::try_from(best_hits).unwrap_or(i32::MAX));

        Ok(Classification {
            category: category.to_string(),
            confidence: clamp_confidence(share * strength),
            metadata: ClassificationMetadata {
                sheet_count,
                detected_keywords: detected,
                suggested_categories: runners_up.iter().map(|(c, _)| (*c).to_string()).collect(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use sg_core::entities::Sheet;

    use super::*;

    fn doc(file_name: &str, sheet: &str, header: &[&str]) -> Document {
        Document::new(
            file_name,
            vec![Sheet::new(
                sheet,
                vec![header.iter().map(|s| (*s).to_string()).collect()],
            )],
        )
    }

    #[test]
    fn attendance_headers_classify_as_attendance() {
        let classification = KeywordClassifier::default()
            .classify(&doc("2학년 출결.xlsx", "출결상황", &["번호", "결석", "지각", "조퇴"]))
            .unwrap();
        assert_eq!(classification.category, ATTENDANCE);
        assert!(classification.confidence > 0.8);
        assert!(classification.confidence <= 1.0);
        assert!(classification.metadata.detected_keywords.contains(&"결석".to_string()));
        assert_eq!(classification.metadata.sheet_count, 1);
    }

    #[test]
    fn unmatched_document_falls_back_to_generic() {
        let classification = KeywordClassifier::default()
            .classify(&doc("roster.xlsx", "Sheet1", &["이름", "번호"]))
            .unwrap();
        assert_eq!(classification.category, GENERIC_CATEGORY);
        assert!((classification.confidence - NO_MATCH_CONFIDENCE).abs() < f64::EPSILON);
    }

    #[test]
    fn runner_up_categories_are_suggested() {
        let classification = KeywordClassifier::default()
            .classify(&doc("세특.xlsx", "세부능력 및 특기사항", &["과목", "출석"]))
            .unwrap();
        assert_eq!(classification.category, SUBJECT_REMARKS);
        assert_eq!(
            classification.metadata.suggested_categories,
            vec![ATTENDANCE.to_string()]
        );
    }

    #[test]
    fn empty_document_is_an_error() {
        let err = KeywordClassifier::default()
            .classify(&Document::new("empty.xlsx", Vec::new()))
            .unwrap_err();
        assert!(matches!(err, ClassifyError::EmptyDocument(_)));
    }
}
