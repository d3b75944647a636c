//! Cosmetic status lines for jobs that are still running.
//!
//! The text carries no progress information; clients should only look at `Done`.

use rand::seq::SliceRandom;

const VERBS: &[&str] = &[
    "eating", "smelling", "seeing", "kicking", "liking", "tasting", "licking",
];
const ADJECTIVES: &[&str] = &["sweet", "old", "dead", "tiny", "small", "bitter", "cold"];
const NOUNS: &[&str] = &[
    "pancakes", "farts", "people", "kittens", "feet", "ashes", "steel",
];

/// Random "verb adjective noun" placeholder.
pub fn working_status() -> String {
    format!("{} {} {}", pick(VERBS), pick(ADJECTIVES), pick(NOUNS))
}

fn pick(words: &[&'static str]) -> &'static str {
    words.choose(&mut rand::thread_rng()).copied().unwrap_or("working")
}
