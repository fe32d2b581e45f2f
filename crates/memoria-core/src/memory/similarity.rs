//! Lexical similarity check for memory deduplication.
//!
//! Two facts are "the same" when, after normalization, one contains the
//! other. This is deliberately high-recall: it would rather suppress a
//! near-duplicate than store it, and accepts that two short but distinct
//! facts occasionally collide.

/// Normalize a fact for comparison: case-fold and drop all whitespace.
///
/// Removing interior whitespace (not just trimming) lets "likes  black coffee"
/// and "Likes black coffee" compare equal, and matters for CJK text where
/// spacing is incidental.
pub fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Whether two facts should be treated as duplicates.
///
/// Symmetric, and always true for strings that normalize identically.
/// A string that normalizes to nothing only matches another blank string,
/// so blank input cannot suppress real facts.
pub fn is_similar(a: &str, b: &str) -> bool {
    let a = normalize(a);
    let b = normalize(b);

    if a.is_empty() || b.is_empty() {
        return a == b;
    }

    a.contains(&b) || b.contains(&a)
}

/// Whether `candidate` is similar to any of `existing`.
pub fn is_similar_to_any<'a, I>(candidate: &str, existing: I) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    existing.into_iter().any(|e| is_similar(candidate, e))
}
