//! Keystroke timing model
//!
//! Per-key delay is derived from a words-per-minute target, scaled by a
//! per-letter frequency heatmap, then jittered with a normal distribution.

use crate::constants::{
    COMPLEX_WORD_SLOWDOWN, COMPLEX_WORD_THRESHOLD, EFFECTIVE_WPM_FLOOR, KEY_DELAY_FLOOR_SECS,
    KEY_JITTER_RATIO, MUSCLE_MEMORY_BOOST, SECONDS_PER_KEY_AT_ONE_WPM, SHIFT_KEY_COST_SECS,
    SIMPLE_WORD_SPEEDUP, SIMPLE_WORD_THRESHOLD,
};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use std::time::Duration;

/// Delay multiplier per lowercase letter: common keys are faster
const KEY_DELAY_FACTOR: [(char, f64); 26] = [
    ('e', 0.85),
    ('t', 0.88),
    ('a', 0.88),
    ('o', 0.9),
    ('i', 0.9),
    ('n', 0.9),
    ('s', 0.95),
    ('h', 0.95),
    ('r', 0.95),
    ('d', 0.98),
    ('l', 0.98),
    ('u', 1.0),
    ('c', 1.0),
    ('m', 1.0),
    ('f', 1.05),
    ('w', 1.05),
    ('y', 1.05),
    ('p', 1.1),
    ('v', 1.1),
    ('b', 1.1),
    ('g', 1.1),
    ('k', 1.15),
    ('j', 1.2),
    ('q', 1.25),
    ('x', 1.3),
    ('z', 1.35),
];

/// Words typed from muscle memory
const MUSCLE_MEMORY_WORDS: [&str; 43] = [
    "the", "and", "that", "with", "have", "this", "will", "your", "from", "they", "know", "want",
    "been", "good", "much", "some", "time", "very", "when", "come", "here", "just", "like", "long",
    "make", "many", "more", "only", "over", "such", "take", "than", "them", "then", "were",
    "because", "should", "would", "what", "which", "there", "their", "about",
];

/// Heatmap multiplier for `ch`, case-insensitive; 1.0 when unmapped
pub fn heatmap_factor(ch: char) -> f64 {
    let lower = ch.to_ascii_lowercase();
    KEY_DELAY_FACTOR
        .iter()
        .find(|(key, _)| *key == lower)
        .map_or(1.0, |(_, factor)| *factor)
}

pub fn is_muscle_memory(word: &str) -> bool {
    let lower = word.to_lowercase();
    MUSCLE_MEMORY_WORDS.contains(&lower.as_str())
}

/// Length plus a penalty for awkward letters
pub fn complexity(word: &str) -> f64 {
    word.chars().count() as f64
        + word
            .chars()
            .map(|c| match c.to_ascii_lowercase() {
                'q' | 'z' | 'x' | 'j' | 'k' => 1.5,
                'v' | 'p' | 'b' | 'g' => 0.5,
                _ => 0.0,
            })
            .sum::<f64>()
}

/// Target WPM for `word` given the base draw
pub fn word_wpm(word: &str, base_wpm: f64) -> f64 {
    if is_muscle_memory(word) {
        return base_wpm * MUSCLE_MEMORY_BOOST;
    }
    let score = complexity(word);
    if score > COMPLEX_WORD_THRESHOLD {
        base_wpm * COMPLEX_WORD_SLOWDOWN
    } else if score < SIMPLE_WORD_THRESHOLD {
        base_wpm * SIMPLE_WORD_SPEEDUP
    } else {
        base_wpm
    }
}

/// Mean seconds per keystroke at `wpm` under the session speed multiplier
pub fn base_delay_secs(wpm: f64, speed_multiplier: f64) -> f64 {
    SECONDS_PER_KEY_AT_ONE_WPM / (wpm * speed_multiplier).max(EFFECTIVE_WPM_FLOOR)
}

/// Jittered delay after typing `ch`
pub fn char_delay<R: Rng + ?Sized>(
    ch: char,
    wpm: f64,
    speed_multiplier: f64,
    rng: &mut R,
) -> Duration {
    let mean = base_delay_secs(wpm, speed_multiplier) * heatmap_factor(ch);
    let jittered = match Normal::new(mean, mean * KEY_JITTER_RATIO) {
        Ok(normal) => normal.sample(rng),
        Err(_) => mean,
    };
    let mut secs = jittered.max(KEY_DELAY_FLOOR_SECS);
    if ch.is_uppercase() {
        secs += SHIFT_KEY_COST_SECS;
    }
    Duration::from_secs_f64(secs)
}

/// Extra thinking pause after a word, by trailing punctuation
pub fn post_word_pause<R: Rng + ?Sized>(word: &str, rng: &mut R) -> Option<Duration> {
    if word.ends_with(['.', '?', '!']) {
        Some(crate::utils::random_duration(rng, 0.3, 0.7))
    } else if word.ends_with([',', ';', ':']) {
        Some(crate::utils::random_duration(rng, 0.15, 0.3))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_heatmap_lookup() {
        assert_eq!(heatmap_factor('e'), 0.85);
        assert_eq!(heatmap_factor('Z'), 1.35);
        assert_eq!(heatmap_factor('7'), 1.0);
        assert_eq!(heatmap_factor('é'), 1.0);
    }

    #[test]
    fn test_muscle_memory_is_case_insensitive() {
        assert!(is_muscle_memory("the"));
        assert!(is_muscle_memory("Because"));
        assert!(!is_muscle_memory("the,"));
        assert!(!is_muscle_memory("quixotic"));
    }

    #[test]
    fn test_complexity_score() {
        assert_eq!(complexity("cat"), 3.0);
        assert_eq!(complexity("jazz"), 4.0 + 1.5 * 3.0);
        assert_eq!(complexity("big"), 3.0 + 0.5 * 2.0);
    }

    #[test]
    fn test_word_wpm_adjustments() {
        assert!((word_wpm("the", 50.0) - 70.0).abs() < 1e-9);
        assert!((word_wpm("quizzical", 50.0) - 35.0).abs() < 1e-9);
        assert!((word_wpm("cat", 50.0) - 55.0).abs() < 1e-9);
        assert!((word_wpm("moment", 50.0) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_base_delay_floor() {
        assert!((base_delay_secs(60.0, 1.0) - 0.2).abs() < 1e-12);
        assert!((base_delay_secs(60.0, 2.0) - 0.1).abs() < 1e-12);
        // Effective WPM never drops below 10
        assert!((base_delay_secs(1.0, 1.0) - 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_char_delay_bounds() {
        let mut rng = StdRng::seed_from_u64(21);
        for _ in 0..1000 {
            let d = char_delay('a', 10_000.0, 1.0, &mut rng);
            assert!(d >= Duration::from_secs_f64(KEY_DELAY_FLOOR_SECS));
        }
        let upper = char_delay('A', 10_000.0, 1.0, &mut rng);
        assert!(upper >= Duration::from_secs_f64(KEY_DELAY_FLOOR_SECS + SHIFT_KEY_COST_SECS));
    }

    #[test]
    fn test_post_word_pause() {
        let mut rng = StdRng::seed_from_u64(3);
        let end = post_word_pause("done.", &mut rng).unwrap();
        assert!(end >= Duration::from_millis(300) && end <= Duration::from_millis(700));
        let clause = post_word_pause("first,", &mut rng).unwrap();
        assert!(clause >= Duration::from_millis(150) && clause <= Duration::from_millis(300));
        assert!(post_word_pause("plain", &mut rng).is_none());
    }
}
