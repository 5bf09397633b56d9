//! Duration normalizer: rounding and rebalancing for a week of sessions.
//!
//! Rounding to human-friendly increments (5 minutes for ordinary sessions,
//! 10 for long ones) naturally breaks the weekly minute total. The
//! normalizer restores it: after rounding every session, unlocked sessions
//! absorb the difference one increment at a time until the week sums to the
//! raw total rounded to the nearest 5 minutes.
//!
//! The rebalancing loop is bounded by `|gap| / 5` iterations; every applied
//! step strictly shrinks the gap, so the bound is provable rather than an
//! ad hoc safety cap.

use serde::{Deserialize, Serialize};
use taper_domain::constants::{
    LONG_SESSION_INCREMENT_MINUTES, SHORT_SESSION_INCREMENT_MINUTES,
};
use taper_domain::{DraftSession, NormalizationRules};

/// Duration-relevant view of one session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionLoad {
    pub duration_minutes: u32,
    pub locked: bool,
    pub day_of_week: Option<u8>,
}

/// Result of normalizing a week of session durations
///
/// `final_total` equals `target_total` whenever at least one unlocked
/// session could absorb the rounding gap; a fully locked week may keep a
/// residual, which is accepted rather than treated as an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedWeek {
    pub loads: Vec<SessionLoad>,
    pub target_total: u32,
    pub final_total: u32,
}

/// Round and rebalance a week of session durations.
///
/// Long sessions (on the plan's designated long day, or at/above the raw
/// duration threshold) round to 10-minute multiples, everything else to
/// 5-minute multiples, ties rounding up. Locked sessions are rounded like
/// any other but never adjusted by the rebalancing pass.
pub fn normalize_durations(loads: Vec<SessionLoad>, rules: &NormalizationRules) -> NormalizedWeek {
    let raw_total: u32 = loads.iter().map(|load| load.duration_minutes).sum();
    let target_total = round_to_increment(raw_total, SHORT_SESSION_INCREMENT_MINUTES);

    let long_flags: Vec<bool> = loads.iter().map(|load| is_long(load, rules)).collect();

    let mut loads = loads;
    for (load, long) in loads.iter_mut().zip(&long_flags) {
        let increment = increment_for(*long);
        load.duration_minutes = round_to_increment(load.duration_minutes, increment);
    }

    let mut final_total: u32 = loads.iter().map(|load| load.duration_minutes).sum();

    // Provably terminating: each applied step shrinks |gap| by at least 5,
    // so |gap| / 5 iterations always suffice.
    let initial_gap = i64::from(target_total) - i64::from(final_total);
    let max_iterations = initial_gap.unsigned_abs() / u64::from(SHORT_SESSION_INCREMENT_MINUTES);

    for _ in 0..max_iterations {
        let gap = i64::from(target_total) - i64::from(final_total);
        if gap == 0 {
            break;
        }

        let Some((index, step)) = pick_adjustment(&loads, &long_flags, gap) else {
            break;
        };

        if gap > 0 {
            loads[index].duration_minutes += step;
            final_total += step;
        } else {
            loads[index].duration_minutes -= step;
            final_total -= step;
        }
    }

    NormalizedWeek { loads, target_total, final_total }
}

/// Normalize the durations of draft sessions directly.
///
/// The returned loads are index-aligned with the input sessions.
pub fn normalize_sessions(
    sessions: &[DraftSession],
    rules: &NormalizationRules,
) -> NormalizedWeek {
    let loads = sessions
        .iter()
        .map(|session| SessionLoad {
            duration_minutes: session.duration_minutes,
            locked: session.locked,
            day_of_week: Some(session.day_of_week),
        })
        .collect();

    normalize_durations(loads, rules)
}

fn is_long(load: &SessionLoad, rules: &NormalizationRules) -> bool {
    let on_long_day = match (load.day_of_week, rules.long_session_day) {
        (Some(day), Some(long_day)) => day == long_day,
        _ => false,
    };

    on_long_day || load.duration_minutes >= rules.long_session_threshold_minutes
}

fn increment_for(long: bool) -> u32 {
    if long {
        LONG_SESSION_INCREMENT_MINUTES
    } else {
        SHORT_SESSION_INCREMENT_MINUTES
    }
}

/// Round to the nearest multiple of `increment`, ties rounding up.
fn round_to_increment(minutes: u32, increment: u32) -> u32 {
    ((minutes + increment / 2) / increment) * increment
}

/// Choose the session to adjust for the current gap: the first unlocked
/// short session able to take a step, then the first unlocked long one.
/// A step is only eligible if it strictly reduces |gap| and never pushes
/// the duration below zero.
fn pick_adjustment(
    loads: &[SessionLoad],
    long_flags: &[bool],
    gap: i64,
) -> Option<(usize, u32)> {
    let candidate = |want_long: bool| {
        loads.iter().zip(long_flags).enumerate().find_map(|(index, (load, &long))| {
            if load.locked || long != want_long {
                return None;
            }
            let step = increment_for(long);
            step_reduces_gap(load.duration_minutes, step, gap).then_some((index, step))
        })
    };

    candidate(false).or_else(|| candidate(true))
}

fn step_reduces_gap(current: u32, step: u32, gap: i64) -> bool {
    if gap < 0 && u64::from(current) < u64::from(step) {
        return false;
    }

    let signed_step = if gap > 0 { i64::from(step) } else { -i64::from(step) };
    (gap - signed_step).abs() < gap.abs()
}
