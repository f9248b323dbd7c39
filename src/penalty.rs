//! # Source Penalty
//! Biases the digest away from sources that were already featured recently.
//!
//! penalty(source) = number of hash records from that source dated within
//! `[today - window_days, today]`. Derived on every run, never stored.
//! Sources are processed in ascending penalty order; ties keep feed order.
//!
//! Source matching is case-insensitive on trimmed names, the same way
//! feed titles are compared elsewhere.

use chrono::{Duration, NaiveDate};

use crate::history::HashRecord;

pub const DEFAULT_WINDOW_DAYS: i64 = 7;

/// Derived, per-run view of one source's recent exposure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PenaltyRecord {
    pub source: String,
    pub count_in_window: usize,
}

pub fn penalty(source: &str, records: &[HashRecord], window_days: i64, today: NaiveDate) -> usize {
    let from = today - Duration::days(window_days.max(0));
    let wanted = source.trim();
    records
        .iter()
        .filter(|r| r.source.trim().eq_ignore_ascii_case(wanted))
        .filter(|r| r.date >= from && r.date <= today)
        .count()
}

/// Sort `(source, payload)` groups by ascending penalty, stable.
pub fn rank_sources<T>(
    groups: Vec<(String, T)>,
    records: &[HashRecord],
    window_days: i64,
    today: NaiveDate,
) -> Vec<(PenaltyRecord, T)> {
    let mut ranked: Vec<(PenaltyRecord, T)> = groups
        .into_iter()
        .map(|(source, payload)| {
            let count_in_window = penalty(&source, records, window_days, today);
            (
                PenaltyRecord {
                    source,
                    count_in_window,
                },
                payload,
            )
        })
        .collect();
    ranked.sort_by_key(|(p, _)| p.count_in_window);
    ranked
}
