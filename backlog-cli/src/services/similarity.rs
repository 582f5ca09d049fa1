//! Approximate string similarity on a 0-100 scale
//!
//! A weighted ratio in the style of the common fuzzy-matching libraries:
//! inputs are normalized, then the plain edit-distance ratio competes with
//! token-order-insensitive and partial (substring) ratios, each discounted
//! so that exact matches still rank first. The thresholds used by the
//! mapping proposer and the catalog matcher are calibrated to this scorer.

use std::collections::BTreeSet;

use strsim::normalized_levenshtein;

/// Weight applied to the token-based ratios
const TOKEN_SCALE: f64 = 0.95;
/// Length ratio from which partial ratios replace the token ratios
const PARTIAL_FROM: f64 = 1.5;
/// Length ratio from which partial ratios get the heavier discount
const PARTIAL_LONG_FROM: f64 = 8.0;

/// Lower-case, turn everything non-alphanumeric into spaces, collapse whitespace
pub fn normalize(s: &str) -> String {
    let mapped: String = s
        .chars()
        .flat_map(|c| {
            if c.is_alphanumeric() {
                c.to_lowercase().collect::<Vec<_>>()
            } else {
                vec![' ']
            }
        })
        .collect();
    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Weighted similarity score between two strings, 0-100
///
/// Returns 0 when either side normalizes to an empty string.
pub fn score(a: &str, b: &str) -> u8 {
    let a = normalize(a);
    let b = normalize(b);
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let base = ratio(&a, &b);

    let len_a = a.chars().count() as f64;
    let len_b = b.chars().count() as f64;
    let len_ratio = len_a.max(len_b) / len_a.min(len_b);

    let best = if len_ratio < PARTIAL_FROM {
        base.max(token_sort_ratio(&a, &b) * TOKEN_SCALE)
            .max(token_set_ratio(&a, &b) * TOKEN_SCALE)
    } else {
        let partial_scale = if len_ratio < PARTIAL_LONG_FROM { 0.9 } else { 0.6 };
        base.max(partial_ratio(&a, &b) * partial_scale)
            .max(partial_ratio(&sorted_tokens(&a), &sorted_tokens(&b)) * TOKEN_SCALE * partial_scale)
            .max(partial_token_set_ratio(&a, &b) * TOKEN_SCALE * partial_scale)
    };

    best.round().clamp(0.0, 100.0) as u8
}

/// Best score of `query` against any of `choices`, with the index of the winner
///
/// Ties keep the earliest choice.
pub fn best_of<'a, I>(query: &str, choices: I) -> Option<(usize, u8)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(usize, u8)> = None;
    for (idx, choice) in choices.into_iter().enumerate() {
        let s = score(query, choice);
        if best.is_none_or(|(_, top)| s > top) {
            best = Some((idx, s));
        }
    }
    best
}

fn ratio(a: &str, b: &str) -> f64 {
    normalized_levenshtein(a, b) * 100.0
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

struct TokenSets {
    common: String,
    only_a: String,
    only_b: String,
}

fn token_sets(a: &str, b: &str) -> TokenSets {
    let set_a: BTreeSet<&str> = a.split_whitespace().collect();
    let set_b: BTreeSet<&str> = b.split_whitespace().collect();
    let join = |tokens: Vec<&str>| tokens.join(" ");
    TokenSets {
        common: join(set_a.intersection(&set_b).copied().collect()),
        only_a: join(set_a.difference(&set_b).copied().collect()),
        only_b: join(set_b.difference(&set_a).copied().collect()),
    }
}

fn token_set_ratio(a: &str, b: &str) -> f64 {
    let sets = token_sets(a, b);
    let combined_a = format!("{} {}", sets.common, sets.only_a).trim().to_string();
    let combined_b = format!("{} {}", sets.common, sets.only_b).trim().to_string();

    ratio(&sets.common, &combined_a)
        .max(ratio(&sets.common, &combined_b))
        .max(ratio(&combined_a, &combined_b))
}

fn partial_token_set_ratio(a: &str, b: &str) -> f64 {
    let sets = token_sets(a, b);
    if !sets.common.is_empty() {
        return 100.0;
    }
    partial_ratio(&sets.only_a, &sets.only_b)
}

/// Best ratio of the shorter string against every same-length window of the longer
fn partial_ratio(a: &str, b: &str) -> f64 {
    let (short, long): (Vec<char>, Vec<char>) = {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        if a.len() <= b.len() { (a, b) } else { (b, a) }
    };
    if short.is_empty() {
        return 0.0;
    }

    let short_str: String = short.iter().collect();
    let mut best: f64 = 0.0;
    for start in 0..=(long.len() - short.len()) {
        let window: String = long[start..start + short.len()].iter().collect();
        best = best.max(ratio(&short_str, &window));
        if best >= 100.0 {
            break;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  Hades  "), "hades");
        assert_eq!(normalize("Zelda: Breath-of the WILD"), "zelda breath of the wild");
        assert_eq!(normalize("***"), "");
    }

    #[test]
    fn test_case_and_whitespace_are_identical() {
        assert_eq!(score("Hades", "hades "), 100);
        assert_eq!(score("Título", "título"), 100);
    }

    #[test]
    fn test_unrelated_titles_score_low() {
        assert!(score("Celeste", "Hades") < 60);
        assert!(score("Hollow Knight", "Stardew Valley") < 60);
    }

    #[test]
    fn test_token_order_is_ignored() {
        assert!(score("Souls Dark", "Dark Souls") >= 90);
    }

    #[test]
    fn test_substring_scores_high() {
        assert!(score("Game", "Game Name") >= 85);
    }

    #[test]
    fn test_empty_scores_zero() {
        assert_eq!(score("", "Hades"), 0);
        assert_eq!(score("--", "Hades"), 0);
    }

    #[test]
    fn test_best_of_keeps_first_on_tie() {
        let choices = ["Nota", "nota", "Notes"];
        assert_eq!(best_of("NOTA", choices.iter().copied()), Some((0, 100)));
        assert_eq!(best_of("x", std::iter::empty()), None);
    }
}
