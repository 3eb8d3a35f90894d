//! SM-2 review scheduling.
//!
//! [`next_review`] is a pure function from the current scheduling state, a
//! validated grade, and a caller-supplied clock to the next state. It never
//! touches storage; persisting the result is the caller's problem.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, word::SchedulingState};

/// Easiness assigned to a word entering its first review, before the quality
/// adjustment is applied.
pub const DEFAULT_EASINESS: f64 = 2.5;

/// Lower bound on the easiness factor.
pub const MIN_EASINESS: f64 = 1.3;

/// Days until a failed word comes back.
const RELEARN_INTERVAL_DAYS: u32 = 1;

// ─── Grade ───────────────────────────────────────────────────────────────────

/// Recall quality for a single review attempt. 0 is a blackout, 5 a perfect
/// response; 3 and above count as a pass. Values outside the range cannot be
/// constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Grade(u8);

impl Grade {
  pub const MAX: u8 = 5;

  pub fn new(value: u8) -> Result<Self> {
    if value > Self::MAX {
      return Err(Error::GradeOutOfRange(value));
    }
    Ok(Self(value))
  }

  pub fn value(self) -> u8 { self.0 }

  /// A grade of 3 or better is a successful recall.
  pub fn is_pass(self) -> bool { self.0 >= 3 }
}

impl TryFrom<u8> for Grade {
  type Error = Error;

  fn try_from(value: u8) -> Result<Self> { Self::new(value) }
}

impl From<Grade> for u8 {
  fn from(grade: Grade) -> Self { grade.0 }
}

impl std::fmt::Display for Grade {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

// ─── Scheduler ───────────────────────────────────────────────────────────────

/// Compute the scheduling state after one review at `now`.
///
/// The easiness adjustment applies on every review, pass or fail. A failing
/// grade resets the repetition streak and schedules the fixed relearn
/// interval; a passing grade advances the streak and grows the interval
/// (1 day, then 6 days, then `round(previous interval × easiness)`).
pub fn next_review(
  state: &SchedulingState,
  grade: Grade,
  now: DateTime<Utc>,
) -> SchedulingState {
  let easiness = if state.reviewed {
    state.easiness
  } else {
    DEFAULT_EASINESS
  };
  let q = f64::from(grade.value());
  let easiness = (easiness + (0.1 - (5.0 - q) * (0.08 + (5.0 - q) * 0.02)))
    .max(MIN_EASINESS);

  let (repetition, interval_days) = if grade.is_pass() {
    let repetition = state.repetition + 1;
    let interval_days = match repetition {
      1 => 1,
      2 => 6,
      _ => (f64::from(state.interval_days) * easiness).round() as u32,
    };
    (repetition, interval_days)
  } else {
    (0, RELEARN_INTERVAL_DAYS)
  };

  SchedulingState {
    reviewed: true,
    easiness,
    repetition,
    interval_days,
    review_secs: state.review_secs + elapsed_secs(state, now),
    next_review_at: Some(now + Duration::days(i64::from(interval_days))),
    first_reviewed_at: state.first_reviewed_at.or(Some(now)),
  }
}

/// Seconds since the previous review, reconstructed from the stored interval.
/// Zero on a first review or when the clock went backwards.
fn elapsed_secs(state: &SchedulingState, now: DateTime<Utc>) -> i64 {
  let Some(next) = state.next_review_at else {
    return 0;
  };
  let last = next - Duration::days(i64::from(state.interval_days));
  (now - last).num_seconds().max(0)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn dt(s: &str) -> DateTime<Utc> { s.parse().unwrap() }

  fn close(a: f64, b: f64) -> bool { (a - b).abs() < 1e-9 }

  #[test]
  fn grade_above_five_is_rejected() {
    assert!(matches!(Grade::new(6), Err(Error::GradeOutOfRange(6))));
    assert!(matches!(Grade::new(200), Err(Error::GradeOutOfRange(200))));
    assert!(Grade::new(0).is_ok());
    assert!(Grade::new(5).is_ok());
  }

  #[test]
  fn pass_threshold_is_three() {
    assert!(!Grade::new(2).unwrap().is_pass());
    assert!(Grade::new(3).unwrap().is_pass());
  }

  #[test]
  fn first_review_starts_from_default_easiness() {
    let now = dt("2024-03-01T09:00:00Z");
    let next = next_review(&SchedulingState::unreviewed(), Grade(4), now);

    // grade 4 leaves the quality adjustment at zero
    assert!(close(next.easiness, DEFAULT_EASINESS));
    assert!(next.reviewed);
    assert_eq!(next.first_reviewed_at, Some(now));
  }

  #[test]
  fn interval_grows_one_six_then_by_easiness() {
    let g = Grade(4);
    let t0 = dt("2024-03-01T09:00:00Z");

    let s1 = next_review(&SchedulingState::unreviewed(), g, t0);
    assert_eq!(s1.repetition, 1);
    assert_eq!(s1.interval_days, 1);
    assert_eq!(s1.next_review_at, Some(t0 + Duration::days(1)));

    let t1 = t0 + Duration::days(1);
    let s2 = next_review(&s1, g, t1);
    assert_eq!(s2.repetition, 2);
    assert_eq!(s2.interval_days, 6);

    let t2 = t1 + Duration::days(6);
    let s3 = next_review(&s2, g, t2);
    assert_eq!(s3.repetition, 3);
    // round(6 × 2.5) — easiness is unchanged at grade 4
    assert_eq!(s3.interval_days, 15);
    assert_eq!(s3.next_review_at, Some(t2 + Duration::days(15)));
  }

  #[test]
  fn failing_grade_resets_the_streak() {
    let t0 = dt("2024-03-01T09:00:00Z");
    let s1 = next_review(&SchedulingState::unreviewed(), Grade(5), t0);
    let s2 = next_review(&s1, Grade(5), t0 + Duration::days(1));
    assert_eq!(s2.repetition, 2);

    let t2 = t0 + Duration::days(7);
    let failed = next_review(&s2, Grade(1), t2);
    assert_eq!(failed.repetition, 0);
    assert_eq!(failed.interval_days, 1);
    assert_eq!(failed.next_review_at, Some(t2 + Duration::days(1)));
    // the quality adjustment still applied
    assert!(failed.easiness < s2.easiness);
    assert!(failed.easiness >= MIN_EASINESS);
  }

  #[test]
  fn easiness_never_drops_below_floor() {
    let now = dt("2024-03-01T09:00:00Z");
    let mut state = SchedulingState::unreviewed();
    for _ in 0..10 {
      state = next_review(&state, Grade(0), now);
      assert!(state.easiness >= MIN_EASINESS);
    }
    assert!(close(state.easiness, MIN_EASINESS));

    for g in 0..=Grade::MAX {
      let mut floored = SchedulingState::unreviewed();
      floored.reviewed = true;
      floored.easiness = MIN_EASINESS;
      let next = next_review(&floored, Grade(g), now);
      assert!(next.easiness >= MIN_EASINESS, "grade {g} broke the floor");
    }
  }

  #[test]
  fn review_seconds_accumulate_between_reviews() {
    let t0 = dt("2024-03-01T09:00:00Z");
    let s1 = next_review(&SchedulingState::unreviewed(), Grade(5), t0);
    assert_eq!(s1.review_secs, 0);

    // reviewed 36 hours later; the previous review reconstructs to t0
    let s2 = next_review(&s1, Grade(5), t0 + Duration::hours(36));
    assert_eq!(s2.review_secs, 36 * 3600);
  }

  #[test]
  fn first_reviewed_at_is_set_exactly_once() {
    let t0 = dt("2024-03-01T09:00:00Z");
    let t1 = t0 + Duration::days(1);
    let s1 = next_review(&SchedulingState::unreviewed(), Grade(5), t0);
    let s2 = next_review(&s1, Grade(5), t1);
    assert_eq!(s2.first_reviewed_at, Some(t0));
  }

  // The 猫 walkthrough: 5, then 5 a day later, then a failing 2.
  #[test]
  fn worked_example_holds() {
    let t0 = dt("2024-03-01T09:00:00Z");
    let s1 = next_review(&SchedulingState::unreviewed(), Grade(5), t0);
    assert!(close(s1.easiness, 2.6));
    assert_eq!(s1.repetition, 1);
    assert_eq!(s1.next_review_at, Some(t0 + Duration::days(1)));

    let t1 = t0 + Duration::days(1);
    let s2 = next_review(&s1, Grade(5), t1);
    assert!(close(s2.easiness, 2.7));
    assert_eq!(s2.repetition, 2);
    assert_eq!(s2.next_review_at, Some(t1 + Duration::days(6)));

    let t2 = t1 + Duration::days(6);
    let s3 = next_review(&s2, Grade(2), t2);
    assert!(close(s3.easiness, 2.38));
    assert_eq!(s3.repetition, 0);
    assert_eq!(s3.next_review_at, Some(t2 + Duration::days(1)));
  }
}
