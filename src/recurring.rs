//! Rolling recurring due dates forward.
//!
//! A recurring transaction stores the next date it is due. When that date has passed, it is
//! advanced by whole periods until it is today or later. Several periods are caught up at once if
//! the tracker has not been opened for a while.

use crate::model::Recurrence;
use crate::Result;
use anyhow::Context;
use chrono::NaiveDate;

/// The outcome of rolling a due date forward.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct RollForward {
    new_due_date: Option<NaiveDate>,
}

impl RollForward {
    /// True if the stored due date was in the past and has been advanced.
    pub fn updated(&self) -> bool {
        self.new_due_date.is_some()
    }

    /// The advanced due date, present only when `updated()` is true.
    pub fn new_due_date(&self) -> Option<NaiveDate> {
        self.new_due_date
    }
}

/// Advances `recurrence`'s due date by whole periods while it is strictly before `today`.
///
/// Comparison is by calendar day. A due date equal to `today` is not in the past and is left
/// alone. This does not modify `recurrence`; the caller persists the new date if there is one.
///
/// # Errors
/// - Returns an error if advancing would leave the supported calendar range.
pub fn roll_forward(recurrence: &Recurrence, today: NaiveDate) -> Result<RollForward> {
    let stored = recurrence.next_due_date();
    let frequency = recurrence.frequency();

    let mut periods: u32 = 0;
    let mut due = stored;
    while due < today {
        periods = periods
            .checked_add(1)
            .context("Too many periods to roll forward")?;
        due = frequency.advance(stored, periods).with_context(|| {
            format!("Unable to advance {stored} by {periods} {frequency} periods")
        })?;
    }

    Ok(RollForward {
        new_due_date: (periods > 0).then_some(due),
    })
}
