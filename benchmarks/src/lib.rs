//! Shared fixtures for the lexiglot benchmarks.
//!
//! Words are assembled from syllables drawn from two disjoint inventories so
//! the corpus is separable and every classifier has something to learn.

use lexiglot::dataset::LabeledWords;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const ENGLISH_SYLLABLES: &[&str] = &[
    "th", "wa", "ing", "ly", "ow", "er", "ry", "wh", "ex", "qu", "igh", "ness", "ed", "sh",
];
const CROATIAN_SYLLABLES: &[&str] = &[
    "ča", "ći", "že", "šu", "đa", "nje", "ko", "vo", "ri", "sti", "ica", "ski", "pre", "lj",
];

fn word(rng: &mut ChaCha8Rng, syllables: &[&str]) -> String {
    let n = rng.gen_range(1..=4);
    (0..n)
        .filter_map(|_| syllables.choose(rng).copied())
        .collect()
}

/// A balanced corpus of `n` words, half labelled English (1), half Croatian (0).
pub fn synthetic_corpus(n: usize, seed: u64) -> LabeledWords {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut words = Vec::with_capacity(n);
    let mut labels = Vec::with_capacity(n);
    for i in 0..n {
        if i % 2 == 0 {
            words.push(word(&mut rng, ENGLISH_SYLLABLES));
            labels.push(1);
        } else {
            words.push(word(&mut rng, CROATIAN_SYLLABLES));
            labels.push(0);
        }
    }
    LabeledWords { words, labels }
}
