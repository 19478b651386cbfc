//! Named-event rosters.
//!
//! Recurring events (classics, battles with fixed lineups) have statically
//! known participant rosters. When an event name appears in the text, its
//! roster takes priority over the general scorer: the event tells us who is
//! on the field more reliably than alias frequency does.
//!
//! Rosters are static configuration, not derived from data.

use super::alias::{AliasTable, BandAliases};
use crate::models::{MatchCandidate, MatchKind};
use crate::utils::text::normalize;

/// Fixed score for roster-derived candidates.
pub const EVENT_SCORE: u32 = 85;

/// Similarity at which an unresolved roster participant is logged as a
/// probable near-miss for some band.
const NEAR_MISS_SIMILARITY: f64 = 0.9;

/// One recurring event and its participant school lineup, in field order.
pub struct EventRoster {
    pub event: &'static str,
    pub participants: &'static [&'static str],
}

pub static EVENT_ROSTERS: &[EventRoster] = &[
    EventRoster {
        event: "bayou classic",
        participants: &["southern university", "grambling state university"],
    },
    EventRoster {
        event: "boombox classic",
        participants: &["southern university", "jackson state university"],
    },
    EventRoster {
        event: "magic city classic",
        participants: &["alabama a&m university", "alabama state university"],
    },
    EventRoster {
        event: "florida classic",
        participants: &["florida a&m university", "bethune-cookman university"],
    },
    EventRoster {
        event: "labor day classic",
        participants: &["texas southern university", "prairie view a&m university"],
    },
    EventRoster {
        event: "southern heritage classic",
        participants: &["jackson state university", "tennessee state university"],
    },
];

/// Roster candidates for every recognized event name in `text` (lowercased).
/// Empty when no event name is present or no participant resolves.
pub fn match_events(text: &str, table: &AliasTable) -> Vec<MatchCandidate> {
    let mut candidates: Vec<MatchCandidate> = Vec::new();

    for roster in EVENT_ROSTERS {
        if !text.contains(roster.event) {
            continue;
        }
        for participant in roster.participants {
            match resolve_participant(participant, table) {
                Some(entry) => {
                    if !candidates.iter().any(|c| c.band_id == entry.band_id) {
                        candidates.push(MatchCandidate {
                            band_id: entry.band_id,
                            alias: roster.event.to_string(),
                            score: EVENT_SCORE,
                            kind: MatchKind::Event,
                        });
                    }
                }
                None => log_near_miss(roster.event, participant, table),
            }
        }
    }

    candidates
}

/// Resolve a roster participant to the first band (declaration order) whose
/// normalized name or school contains the participant. Containment is
/// one-directional: a participant must fit inside the band field, otherwise
/// "texas southern university" would resolve against plain "southern
/// university".
fn resolve_participant<'a>(participant: &str, table: &'a AliasTable) -> Option<&'a BandAliases> {
    let p = normalize(participant);
    if p.is_empty() {
        return None;
    }
    table
        .entries()
        .iter()
        .find(|entry| entry.school.contains(&p) || entry.name.contains(&p))
}

fn log_near_miss(event: &str, participant: &str, table: &AliasTable) {
    let p = normalize(participant);
    let best = table
        .entries()
        .iter()
        .map(|entry| strsim::jaro_winkler(&p, &entry.school))
        .fold(0.0_f64, f64::max);
    if best >= NEAR_MISS_SIMILARITY {
        log::warn!(
            "event '{}' roster participant '{}' did not resolve but nearly matches a band school (similarity {:.3})",
            event,
            participant,
            best
        );
    } else {
        log::debug!(
            "event '{}' roster participant '{}' has no band record",
            event,
            participant
        );
    }
}
