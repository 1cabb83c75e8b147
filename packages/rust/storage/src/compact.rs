//! Keep-first-by-filename compaction of index records.

use std::collections::HashSet;

use papercut_shared::IndexRecord;

/// Drop every record whose `filename` was already seen earlier.
///
/// Survivors keep their relative order, so compacting twice is a no-op.
pub fn compact(records: Vec<IndexRecord>) -> Vec<IndexRecord> {
    let mut seen: HashSet<String> = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|record| seen.insert(record.filename.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(filename: &str, text: &str) -> IndexRecord {
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

    #[test]
    fn first_occurrence_wins() {
        let records = vec![
            record("a.pdf", "first"),
            record("b.pdf", "b"),
            record("a.pdf", "second"),
            record("c.pdf", "c"),
            record("b.pdf", "b again"),
        ];
        let kept = compact(records);
        let keys: Vec<_> = kept.iter().map(|r| r.filename.as_str()).collect();
        assert_eq!(keys, vec!["a.pdf", "b.pdf", "c.pdf"]);
        assert_eq!(kept[0].text, "first");
        assert_eq!(kept[1].text, "b");
    }

    #[test]
    fn compaction_is_idempotent() {
        let records = vec![
            record("x.pdf", "1"),
            record("y.pdf", "2"),
            record("x.pdf", "3"),
            record("z.pdf", "4"),
            record("y.pdf", "5"),
            record("y.pdf", "6"),
        ];
        let once = compact(records);
        let twice = compact(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_and_unique_inputs_are_unchanged() {
        assert!(compact(Vec::new()).is_empty());
        let unique = vec![record("a.pdf", ""), record("b.pdf", "")];
        assert_eq!(compact(unique.clone()), unique);
    }
}
