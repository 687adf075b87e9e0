//! Planning-poker estimation consensus.
//!
//! An estimation session collects one vote per member on the active story.
//! The consensus value is a *suggestion*: the arithmetic mean of the numeric
//! votes snapped to the nearest card in the deck. It is never auto-applied —
//! a facilitator either accepts it or overrides with an explicit value, and
//! applying either is a single-field points update on the story (no history
//! entry; estimation is not a workflow transition).

/// The card deck. Non-numeric cards (`?`, `☕`) register opinions but never
/// count toward the consensus mean.
pub const DECK: [&str; 11] = ["0", "1", "2", "3", "5", "8", "13", "21", "34", "?", "☕"];

const NUMERIC_DECK: [f64; 9] = [0.0, 1.0, 2.0, 3.0, 5.0, 8.0, 13.0, 21.0, 34.0];

/// Suggest a consensus estimate from raw vote values.
///
/// Votes that are not plain non-negative integers (abstains, `?`, `☕`,
/// anything malformed) are ignored. Returns `None` when no numeric votes
/// remain. The mean snaps to the nearest deck card; exact midpoints snap to
/// the smaller card.
#[must_use]
pub fn suggest<'a, I>(votes: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a str>,
{
    let numeric: Vec<f64> = votes
        .into_iter()
        .filter_map(parse_vote)
        .collect();
    if numeric.is_empty() {
        return None;
    }

    #[allow(clippy::cast_precision_loss)]
    let mean = numeric.iter().sum::<f64>() / numeric.len() as f64;
    Some(snap_to_deck(mean))
}

/// True when a raw vote counts toward the consensus mean: a plain
/// non-negative integer, ignoring surrounding whitespace.
#[must_use]
pub fn is_numeric_vote(raw: &str) -> bool {
    let trimmed = raw.trim();
    !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit())
}

fn parse_vote(raw: &str) -> Option<f64> {
    if !is_numeric_vote(raw) {
        return None;
    }
    raw.trim().parse::<f64>().ok()
}

fn snap_to_deck(mean: f64) -> f64 {
    let mut best = NUMERIC_DECK[0];
    let mut best_distance = (mean - best).abs();

    for &card in &NUMERIC_DECK[1..] {
        let distance = (mean - card).abs();
        if distance < best_distance {
            best = card;
            best_distance = distance;
        }
    }
    best
}
