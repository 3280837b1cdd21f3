//! Over-counted punch resolution.
//!
//! Clock terminals sometimes record an employee three times on one day.
//! This module collapses each such group into a primary punch spanning the
//! earliest entry to the latest exit, plus one secondary punch that is
//! distinct from it. Groups of any other size are left untouched.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::DeduplicationRules;
use crate::error::EngineResult;
use crate::models::{ClockReading, Punch, PunchId};

/// Two punches of a merged group whose entries and exits are both within
/// the duplicate window of each other.
///
/// Pairs are informational: they are surfaced to the operator but never
/// decide which punches are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicatePair {
    /// The earlier punch of the pair, in source order.
    pub first: PunchId,
    /// The later punch of the pair, in source order.
    pub second: PunchId,
    /// Absolute entry difference in minutes.
    pub entry_gap_minutes: i64,
    /// Absolute exit difference in minutes.
    pub exit_gap_minutes: i64,
}

/// A three-punch group that was collapsed into two punches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedGroup {
    /// Employee of the group.
    pub employee: String,
    /// Date of the group.
    pub date: NaiveDate,
    /// Identity given to the synthesized primary punch.
    pub primary: PunchId,
    /// The source punch kept as the secondary.
    pub secondary: PunchId,
    /// Informational duplicate pairs found in the group.
    pub duplicate_pairs: Vec<DuplicatePair>,
    /// Members left out of the merge because a clock value was absent or
    /// unreadable.
    #[serde(default)]
    pub skipped: Vec<PunchId>,
}

/// A three-punch group that was passed through because fewer than two of
/// its members had readable clock values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedGroup {
    /// Employee of the group.
    pub employee: String,
    /// Date of the group.
    pub date: NaiveDate,
    /// The parse problem that stopped the merge.
    pub reason: String,
}

/// Output of [`resolve_duplicates`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeduplicationReport {
    /// Punches after resolution, in stable source order.
    pub punches: Vec<Punch>,
    /// Groups that were collapsed.
    pub merged_groups: Vec<MergedGroup>,
    /// Groups of three that were left as they were.
    pub unresolved_groups: Vec<UnresolvedGroup>,
}

/// A punch of a group with both clock values placed on its date.
struct Stamped<'a> {
    punch: &'a Punch,
    entry: NaiveDateTime,
    exit: NaiveDateTime,
}

impl<'a> Stamped<'a> {
    fn new(punch: &'a Punch) -> EngineResult<Self> {
        Ok(Self {
            punch,
            entry: punch.date.and_time(punch.entry_time()?),
            exit: punch.date.and_time(punch.exit_time()?),
        })
    }
}

/// The pair that replaces a merged group.
struct Merge {
    primary: Punch,
    secondary: Punch,
    duplicate_pairs: Vec<DuplicatePair>,
    skipped: Vec<PunchId>,
}

/// Resolves over-counted punches.
///
/// For every (employee, date) group of exactly three punches:
///
/// - the **primary** punch takes the earliest entry and the latest exit of
///   the group (chosen independently) and the remaining fields of the
///   earliest-entry punch;
/// - the **secondary** punch is the first punch, in source order, whose
///   entry or exit is more than `distinct_threshold_minutes` away from the
///   primary's; failing that, the punch with the median entry.
///
/// The pair replaces the group at the position of its first row so overall
/// order is preserved. A member with an absent or unreadable clock value
/// takes no part in the selection and is dropped from the output; it is
/// listed in [`MergedGroup::skipped`]. A group with fewer than two readable
/// members is passed through unchanged with a warning.
///
/// # Example
///
/// ```
/// use payroll_engine::config::DeduplicationRules;
/// use payroll_engine::models::{ClockReading, Punch, PunchId};
/// use payroll_engine::reconciliation::resolve_duplicates;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let punch = |row: usize, entry: &str, exit: &str| Punch {
///     id: PunchId::source(row),
///     employee: "Ana".to_string(),
///     date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
///     entry: ClockReading::from_raw(entry),
///     exit: ClockReading::from_raw(exit),
///     inventory_deduction: Decimal::ZERO,
///     cash_deduction: Decimal::ZERO,
///     withdrawal: Decimal::ZERO,
/// };
///
/// let report = resolve_duplicates(
///     vec![punch(0, "10:40", "18:00"), punch(1, "10:30", "18:10"), punch(2, "19:00", "21:45")],
///     &DeduplicationRules::default(),
/// );
/// assert_eq!(report.punches.len(), 2);
/// assert_eq!(report.punches[0].entry.as_str(), "10:30");
/// assert_eq!(report.punches[0].exit.as_str(), "21:45");
/// ```
pub fn resolve_duplicates(punches: Vec<Punch>, rules: &DeduplicationRules) -> DeduplicationReport {
    let groups = group_in_source_order(&punches);

    let mut replacements: HashMap<usize, Vec<Punch>> = HashMap::new();
    let mut absorbed = vec![false; punches.len()];
    let mut report = DeduplicationReport::default();

    for indices in groups.iter().filter(|indices| indices.len() == 3) {
        let lead = &punches[indices[0]];
        match merge_group(&punches, indices, rules) {
            Ok(merge) => {
                if !merge.skipped.is_empty() {
                    warn!(
                        employee = %lead.employee,
                        date = %lead.date,
                        skipped = merge.skipped.len(),
                        "Unreadable punches left out of an over-counted group"
                    );
                }
                report.merged_groups.push(MergedGroup {
                    employee: lead.employee.clone(),
                    date: lead.date,
                    primary: merge.primary.id,
                    secondary: merge.secondary.id,
                    duplicate_pairs: merge.duplicate_pairs,
                    skipped: merge.skipped,
                });
                for &index in &indices[1..] {
                    absorbed[index] = true;
                }
                replacements.insert(indices[0], vec![merge.primary, merge.secondary]);
            }
            Err(err) => {
                warn!(
                    employee = %lead.employee,
                    date = %lead.date,
                    error = %err,
                    "Too few readable punches in an over-counted group, passing them through"
                );
                report.unresolved_groups.push(UnresolvedGroup {
                    employee: lead.employee.clone(),
                    date: lead.date,
                    reason: err.to_string(),
                });
            }
        }
    }

    for (index, punch) in punches.into_iter().enumerate() {
        if let Some(pair) = replacements.remove(&index) {
            report.punches.extend(pair);
        } else if !absorbed[index] {
            report.punches.push(punch);
        }
    }

    if !report.merged_groups.is_empty() {
        let groups = report
            .merged_groups
            .iter()
            .map(|g| format!("{} - {}", g.employee, g.date))
            .collect::<Vec<_>>()
            .join("; ");
        info!(
            count = report.merged_groups.len(),
            groups = %groups,
            "Over-counted punches detected and resolved"
        );
    }

    report
}

/// Indices of every (employee, date) group, groups ordered by first row.
fn group_in_source_order(punches: &[Punch]) -> Vec<Vec<usize>> {
    let mut position: HashMap<(&str, NaiveDate), usize> = HashMap::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();

    for (index, punch) in punches.iter().enumerate() {
        let key = (punch.employee.as_str(), punch.date);
        let slot = *position.entry(key).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(index);
    }

    groups
}

fn merge_group(
    punches: &[Punch],
    indices: &[usize],
    rules: &DeduplicationRules,
) -> EngineResult<Merge> {
    let mut stamped = Vec::with_capacity(indices.len());
    let mut skipped = Vec::new();
    let mut first_error = None;
    for &index in indices {
        match Stamped::new(&punches[index]) {
            Ok(s) => stamped.push(s),
            Err(err) => {
                skipped.push(punches[index].id);
                first_error.get_or_insert(err);
            }
        }
    }
    // Selection needs two readable members.
    if let Some(err) = first_error.filter(|_| stamped.len() < 2) {
        return Err(err);
    }

    let duplicate_pairs = find_duplicate_pairs(&stamped, rules);

    // Strict comparison keeps the first of equal entries, matching source order.
    let earliest = stamped[1..]
        .iter()
        .fold(&stamped[0], |best, s| if s.entry < best.entry { s } else { best });
    let latest_exit = stamped.iter().map(|s| s.exit).fold(stamped[0].exit, NaiveDateTime::max);

    let mut primary = earliest.punch.clone();
    primary.id = PunchId::merged(earliest.punch.id.row);
    primary.entry = ClockReading::at(earliest.entry.time());
    primary.exit = ClockReading::at(latest_exit.time());

    let threshold = rules.distinct_threshold_minutes * 60;
    let secondary = stamped
        .iter()
        .find(|s| {
            (s.entry - earliest.entry).num_seconds().abs() > threshold
                || (s.exit - latest_exit).num_seconds().abs() > threshold
        })
        .map(|s| s.punch)
        .unwrap_or_else(|| {
            let mut by_entry: Vec<&Stamped> = stamped.iter().collect();
            by_entry.sort_by_key(|s| s.entry);
            by_entry[1].punch
        });

    Ok(Merge {
        primary,
        secondary: secondary.clone(),
        duplicate_pairs,
        skipped,
    })
}

fn find_duplicate_pairs(stamped: &[Stamped<'_>], rules: &DeduplicationRules) -> Vec<DuplicatePair> {
    let low = rules.duplicate_min_minutes * 60;
    let high = rules.duplicate_max_minutes * 60;
    let in_window = |seconds: i64| (low..=high).contains(&seconds);

    let mut pairs = Vec::new();
    for (i, a) in stamped.iter().enumerate() {
        for b in &stamped[i + 1..] {
            let entry_gap = (a.entry - b.entry).num_seconds().abs();
            let exit_gap = (a.exit - b.exit).num_seconds().abs();
            if in_window(entry_gap) && in_window(exit_gap) {
                pairs.push(DuplicatePair {
                    first: a.punch.id,
                    second: b.punch.id,
                    entry_gap_minutes: entry_gap / 60,
                    exit_gap_minutes: exit_gap / 60,
                });
            }
        }
    }
    pairs
}
