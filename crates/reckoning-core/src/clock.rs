//! Game clock: one turn per week, four weeks per month.
//!
//! Turn 0 is the pre-game state. The first advance lands on turn 1 at the
//! starting date without moving the calendar; every later advance moves one
//! week forward, rolling the month (and the animal's age) every fourth week.

use reckoning_types::{Month, TimeState};

/// Weeks in one in-game month.
pub const WEEKS_PER_MONTH: u8 = 4;

/// Errors that can occur during clock operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    /// Turn counter would overflow.
    #[error("turn counter overflow: cannot advance beyond u32::MAX")]
    TurnOverflow,
}

/// What changed when the clock advanced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockAdvance {
    /// The new turn number.
    pub turn: u32,
    /// Months that rolled over (0 or 1).
    pub months_elapsed: u32,
    /// Whether the season changed.
    pub season_changed: bool,
    /// Whether a new year began.
    pub new_year: bool,
}

/// Advance `time` by one turn.
///
/// # Errors
///
/// Returns [`ClockError::TurnOverflow`] if the turn counter would exceed
/// `u32::MAX`.
pub fn advance(time: &mut TimeState) -> Result<ClockAdvance, ClockError> {
    let turn = time.turn.checked_add(1).ok_or(ClockError::TurnOverflow)?;
    let first_turn = time.turn == 0;
    time.turn = turn;

    if first_turn {
        return Ok(ClockAdvance {
            turn,
            months_elapsed: 0,
            season_changed: false,
            new_year: false,
        });
    }

    let mut advance = ClockAdvance {
        turn,
        months_elapsed: 0,
        season_changed: false,
        new_year: false,
    };
    if time.week >= WEEKS_PER_MONTH {
        time.week = 1;
        time.month = time.month.next();
        advance.months_elapsed = 1;
        if time.month == Month::January {
            time.year = time.year.saturating_add(1);
            advance.new_year = true;
        }
        let season = time.month.season();
        advance.season_changed = season != time.season;
        time.season = season;
    } else {
        time.week = time.week.saturating_add(1);
    }
    Ok(advance)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use reckoning_types::Season;

    use super::*;

    #[test]
    fn first_advance_keeps_start_date() {
        let mut time = TimeState::starting(Month::May);
        let adv = advance(&mut time).unwrap();
        assert_eq!(adv.turn, 1);
        assert_eq!(time.week, 1);
        assert_eq!(time.month, Month::May);
        assert_eq!(adv.months_elapsed, 0);
    }

    #[test]
    fn month_rolls_after_four_weeks() {
        let mut time = TimeState::starting(Month::May);
        advance(&mut time).unwrap();
        for _ in 0..3 {
            advance(&mut time).unwrap();
        }
        assert_eq!(time.week, 4);
        assert_eq!(time.month, Month::May);
        let adv = advance(&mut time).unwrap();
        assert_eq!(time.week, 1);
        assert_eq!(time.month, Month::June);
        assert_eq!(adv.months_elapsed, 1);
        assert!(adv.season_changed);
        assert_eq!(time.season, Season::Summer);
    }

    #[test]
    fn december_rolls_into_new_year() {
        let mut time = TimeState::starting(Month::December);
        time.turn = 10;
        time.week = 4;
        let adv = advance(&mut time).unwrap();
        assert!(adv.new_year);
        assert_eq!(time.year, 2);
        assert_eq!(time.month, Month::January);
        assert!(!adv.season_changed);
    }

    #[test]
    fn overflow_is_an_error() {
        let mut time = TimeState::starting(Month::May);
        time.turn = u32::MAX;
        assert_eq!(advance(&mut time), Err(ClockError::TurnOverflow));
    }
}
