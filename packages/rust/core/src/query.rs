//! Fuzzy conjunctive queries over index records.
//!
//! Each predicate slides a window the length of its (normalized) search
//! string over the column value, scoring only windows that start with the
//! search string's first character. Column values are compared as stored,
//! so a lowercase value never matches an uppercased search string.

use papercut_shared::{INDEX_COLUMNS, IndexRecord, PapercutError, QueryPredicate, Result, normalize_text};
use tracing::debug;

use crate::similarity::ratio;

#[derive(Debug, Clone)]
struct Compiled {
    column: String,
    search: Vec<char>,
    threshold: f64,
}

/// A validated conjunction of predicates.
#[derive(Debug, Clone)]
pub struct Query {
    predicates: Vec<Compiled>,
}

/// Best window score of `search` inside `value`; 0 when no window qualifies.
pub fn best_window_ratio(value: &[char], search: &[char]) -> f64 {
    let Some(&first) = search.first() else {
        return 0.0;
    };
    if value.len() < search.len() {
        return 0.0;
    }

    (0..=value.len() - search.len())
        .filter(|&i| value[i] == first)
        .map(|i| ratio(&value[i..i + search.len()], search))
        .fold(0.0, f64::max)
}

impl Query {
    /// Validate and normalize predicates.
    pub fn new(predicates: &[QueryPredicate]) -> Result<Self> {
        let predicates = predicates
            .iter()
            .map(|p| {
                if !INDEX_COLUMNS.contains(&p.column.as_str()) {
                    return Err(PapercutError::validation(format!(
                        "unknown column '{}', expected one of: {}",
                        p.column,
                        INDEX_COLUMNS.join(", ")
                    )));
                }
                let search: Vec<char> = normalize_text(&p.search_string).chars().collect();
                if search.is_empty() {
                    return Err(PapercutError::validation(format!(
                        "search string for '{}' is empty",
                        p.column
                    )));
                }
                if !(0.0..=1.0).contains(&p.similarity) {
                    return Err(PapercutError::validation(format!(
                        "similarity {} for '{}' is outside [0, 1]",
                        p.similarity, p.column
                    )));
                }
                Ok(Compiled {
                    column: p.column.clone(),
                    search,
                    threshold: p.similarity,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { predicates })
    }

    /// Whether every predicate holds for `row`.
    pub fn matches(&self, row: &IndexRecord) -> bool {
        self.predicates.iter().all(|p| {
            let Some(value) = row.column(&p.column) else {
                return false;
            };
            let value: Vec<char> = value.chars().collect();
            best_window_ratio(&value, &p.search) >= p.threshold
        })
    }

    /// Filenames of matching rows, in row order.
    pub fn run(&self, rows: &[IndexRecord]) -> Vec<String> {
        let hits: Vec<String> = rows
            .iter()
            .filter(|row| self.matches(row))
            .map(|row| row.filename.clone())
            .collect();
        debug!(rows = rows.len(), hits = hits.len(), "query evaluated");
        hits
    }
}

/// Validate `predicates` and run them over `rows`.
pub fn query(rows: &[IndexRecord], predicates: &[QueryPredicate]) -> Result<Vec<String>> {
    Ok(Query::new(predicates)?.run(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(filename: &str, text: &str) -> IndexRecord {
        IndexRecord {
            subject_code: "9700".into(),
            year: 2022,
            season: "S".into(),
            paper: "12".into(),
            question: 1,
            filename: filename.into(),
            text: text.into(),
        }
    }

    fn rows() -> Vec<IndexRecord> {
        vec![
            row("q1.pdf", "1DEFINEOSMOSIS.[2]"),
            row("q2.pdf", "2EXPLAINDIFFUSION.[3]"),
            row("q3.pdf", "3OSMOSISANDDIFFUSION"),
        ]
    }

    #[test]
    fn exact_substring_scores_one() {
        let value: Vec<char> = "1DEFINEOSMOSIS".chars().collect();
        let search: Vec<char> = "OSMOSIS".chars().collect();
        assert_eq!(best_window_ratio(&value, &search), 1.0);

        let hits = query(&rows(), &[QueryPredicate::new("text", "osmosis", 1.0)]).expect("query");
        assert_eq!(hits, vec!["q1.pdf", "q3.pdf"]);
    }

    #[test]
    fn disjoint_search_fails_above_zero() {
        let hits = query(&rows(), &[QueryPredicate::new("text", "zzz", 0.01)]).expect("query");
        assert!(hits.is_empty());
        // Threshold zero admits every row.
        let all = query(&rows(), &[QueryPredicate::new("text", "zzz", 0.0)]).expect("query");
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn predicates_are_conjunctive() {
        let always = QueryPredicate::new("subject_code", "9700", 1.0);
        let never = QueryPredicate::new("text", "QQQQ", 0.5);
        let single = vec![row("only.pdf", "X")];

        assert!(query(&single, &[always.clone(), never]).expect("query").is_empty());
        assert_eq!(query(&single, &[always]).expect("query"), vec!["only.pdf"]);
    }

    #[test]
    fn fuzzy_window_tolerates_a_typo() {
        // "DIFFUSHON" vs window "DIFFUSION": 8 of 9 chars match.
        let hits = query(&rows(), &[QueryPredicate::new("text", "diffushon", 0.85)]).expect("query");
        assert_eq!(hits, vec!["q2.pdf", "q3.pdf"]);
    }

    #[test]
    fn column_values_are_case_sensitive() {
        let lower = vec![row("lower.pdf", "define osmosis")];
        let hits = query(&lower, &[QueryPredicate::new("text", "osmosis", 0.5)]).expect("query");
        assert!(hits.is_empty());
    }

    #[test]
    fn numeric_columns_match_as_text() {
        let hits = query(&rows(), &[QueryPredicate::new("year", "2022", 1.0)]).expect("query");
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn duplicate_filenames_are_kept() {
        let dupes = vec![row("q.pdf", "OSMOSIS"), row("q.pdf", "OSMOSIS")];
        let hits = query(&dupes, &[QueryPredicate::new("text", "OSMOSIS", 1.0)]).expect("query");
        assert_eq!(hits, vec!["q.pdf", "q.pdf"]);
    }

    #[test]
    fn invalid_predicates_are_rejected() {
        assert!(Query::new(&[QueryPredicate::new("colour", "red", 0.5)]).is_err());
        assert!(Query::new(&[QueryPredicate::new("text", "  ", 0.5)]).is_err());
        assert!(Query::new(&[QueryPredicate::new("text", "a", 1.5)]).is_err());
        assert!(Query::new(&[QueryPredicate::new("text", "a", f64::NAN)]).is_err());
        assert!(Query::new(&[]).expect("empty query").matches(&row("x.pdf", "")));
    }
}
