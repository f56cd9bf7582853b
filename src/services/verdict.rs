//! Verdict Blending Module
//!
//! Pure heuristics turning fact-check, classifier, and news signals into
//! the final verdict. No I/O and no state; everything here is a plain
//! function over the normalized records.

use crate::models::{ClaimReviewItem, SourceArticle, Verdict};

/// Opening note before any provider signal lands.
pub const BASELINE_NOTE: &str =
    "Baseline analysis applied; fact-check and classifier verdicts are promoted when available.";

/// Textual ratings treated as a definitive "fake" call.
const NEGATIVE_ALIASES: [&str; 7] = [
    "false",
    "pants on fire",
    "incorrect",
    "fake",
    "fiction",
    "wrong",
    "misleading",
];

/// Textual ratings treated as a definitive "real" call.
const POSITIVE_ALIASES: [&str; 5] = ["true", "accurate", "correct", "verified", "true story"];

/// Textual ratings treated as genuinely mixed.
const MIXED_ALIASES: [&str; 6] = [
    "mixture",
    "half true",
    "partly true",
    "partly false",
    "mixed",
    "in between",
];

/// Publishers whose presence among the sources counts as credible
/// corroboration.
const CREDIBLE_PUBLISHERS: [&str; 5] = [
    "associated press",
    "reuters",
    "bbc",
    "new york times",
    "washington post",
];

// == Note Assembly ==
/// Appends a sentence to the running notes, dropping leading emptiness.
pub fn append_note(existing: &str, addition: &str) -> String {
    let cleaned = existing.trim();
    if cleaned.is_empty() {
        addition.to_string()
    } else {
        format!("{} {}", cleaned, addition)
    }
}

// == Claim-Review Promotion ==
/// Maps the first review's textual rating onto a verdict.
///
/// Fact-check reviews outrank every other signal, so a recognized rating
/// carries high confidence; an unrecognized one still promotes, at lower
/// confidence, because a human reviewer looked at the claim.
pub fn promote_claim_review_verdict(reviews: &[ClaimReviewItem]) -> (Verdict, f64) {
    let first = match reviews.first() {
        Some(review) => review,
        None => return (Verdict::Unsure, 0.5),
    };
    let rating = first
        .truth_rating
        .as_deref()
        .unwrap_or("")
        .trim()
        .to_lowercase();

    if NEGATIVE_ALIASES.contains(&rating.as_str()) {
        return (Verdict::Fake, 0.95);
    }
    if POSITIVE_ALIASES.contains(&rating.as_str()) {
        return (Verdict::Real, 0.95);
    }
    if MIXED_ALIASES.contains(&rating.as_str()) {
        return (Verdict::Unsure, 0.75);
    }

    (Verdict::Unsure, 0.6)
}

// == News Heuristic ==
/// Estimates how much the news coverage contradicts the text.
///
/// More credible publishers among the sources pulls the estimate down
/// (coverage corroborates); no sources at all is neutral.
pub fn estimate_news_contradiction_score(sources: &[SourceArticle]) -> f64 {
    if sources.is_empty() {
        return 0.5;
    }

    let credible_hits = sources
        .iter()
        .filter(|article| {
            let name = article.source.trim().to_lowercase();
            CREDIBLE_PUBLISHERS.contains(&name.as_str())
        })
        .count();

    let ratio = credible_hits as f64 / sources.len() as f64;
    (0.4 * (1.0 - ratio) + 0.3).clamp(0.0, 1.0)
}

// == Blending ==
/// Weighted blend of the classifier score and the news heuristic.
pub fn combine_scores(classifier_score: f64, news_score: f64) -> f64 {
    0.6 * classifier_score.clamp(0.0, 1.0) + 0.4 * news_score.clamp(0.0, 1.0)
}

/// Maps a blended score onto a verdict with a fixed confidence.
pub fn map_score_to_verdict(score: f64) -> (Verdict, f64) {
    if score >= 0.7 {
        (Verdict::Fake, 0.9)
    } else if score <= 0.3 {
        (Verdict::Real, 0.85)
    } else {
        (Verdict::Unsure, 0.6)
    }
}
