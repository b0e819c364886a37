//! Edit-distance matching used to turn a misspelled name into suggestions.

/// Largest edit distance still considered a plausible typo.
pub const MAX_EDIT_DISTANCE: usize = 2;

/// Levenshtein distance between two strings, counted in chars.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a = a.chars().collect::<Vec<_>>();
    let b = b.chars().collect::<Vec<_>>();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev = (0..=b.len()).collect::<Vec<_>>();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        prev.copy_from_slice(&curr);
    }

    prev[b.len()]
}

/// Returns every candidate sharing the smallest distance to `word`, as long as
/// that distance is at most `max_distance`. Candidates keep their input order.
pub fn closest<'a>(word: &str, candidates: &[&'a str], max_distance: usize) -> Vec<&'a str> {
    let scored = candidates
        .iter()
        .map(|c| (*c, edit_distance(word, c)))
        .filter(|(_, d)| *d <= max_distance)
        .collect::<Vec<_>>();

    let best = match scored.iter().map(|(_, d)| *d).min() {
        Some(d) => d,
        None => return vec![],
    };

    scored
        .into_iter()
        .filter(|(_, d)| *d == best)
        .map(|(c, _)| c)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_basics() {
        assert_eq!(edit_distance("", "load"), 4);
        assert_eq!(edit_distance("load", "load"), 0);
        assert_eq!(edit_distance("dtect", "detect"), 1);
        assert_eq!(edit_distance("kitten", "sitting"), 3);
    }

    #[test]
    fn closest_keeps_only_best_distance() {
        let names = ["load", "save", "size", "say"];

        assert_eq!(closest("sav", &names, MAX_EDIT_DISTANCE), vec!["save", "say"]);
        assert_eq!(closest("lod", &names, MAX_EDIT_DISTANCE), vec!["load"]);
    }

    #[test]
    fn closest_rejects_far_words() {
        let names = ["detect", "classify"];

        assert!(closest("histogram", &names, MAX_EDIT_DISTANCE).is_empty());
    }
}
