//! "Did you mean" suggestions for unknown block ids.

/// Closest candidate by case-insensitive edit distance, if it is within
/// half the length of the longer id.
pub(crate) fn fuzzy_match<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    let input = input.to_lowercase();
    candidates
        .iter()
        .map(|&id| (id, edit_distance(&input, &id.to_lowercase())))
        .min_by_key(|&(_, distance)| distance)
        .filter(|&(id, distance)| {
            distance <= input.chars().count().max(id.chars().count()) / 2
        })
        .map(|(id, _)| id)
}

/// Levenshtein distance over chars, keeping a single row.
fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.chars().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let substitution = diagonal + usize::from(ca != cb);
            diagonal = row[j + 1];
            row[j + 1] = substitution.min(row[j] + 1).min(diagonal + 1);
        }
    }
    row[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    const AMOUNT_IDS: &[&str] = &["A0", "A1", "A2", "A3", "A4"];

    #[test]
    fn edit_distance_counts_chars() {
        assert_eq!(edit_distance("maximal", "minimal"), 2);
        assert_eq!(edit_distance("", "g1"), 2);
        assert_eq!(edit_distance("größer", "grösser"), 2);
    }

    #[test]
    fn suggestion_ignores_case() {
        assert_eq!(fuzzy_match("a3", AMOUNT_IDS), Some("A3"));
    }

    #[test]
    fn first_of_equally_close_ids_wins() {
        assert_eq!(fuzzy_match("A7", AMOUNT_IDS), Some("A0"));
    }

    #[test]
    fn distant_ids_get_no_suggestion() {
        assert_eq!(fuzzy_match("zwischen", AMOUNT_IDS), None);
    }
}
