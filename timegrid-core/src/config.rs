//! Grid configuration types

use crate::{ConfigError, TimegridResult};
use serde::{Deserialize, Serialize};

/// Minutes in a day; the latest representable window end.
pub const MINUTES_PER_DAY: i32 = 24 * 60;

/// Visible time window and slot width of the grid.
///
/// The window is `[start_hour*60 + start_minute, end_hour*60 + end_minute)`
/// in absolute minutes from midnight. The step does not have to divide the
/// window; a partial trailing slot is simply not generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridConfig {
    pub start_hour: i32,
    pub start_minute: i32,
    pub end_hour: i32,
    pub end_minute: i32,
    pub step_minutes: i32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            start_hour: 5,
            start_minute: 0,
            end_hour: 21,
            end_minute: 0,
            step_minutes: 30,
        }
    }
}

impl GridConfig {
    /// First visible absolute minute.
    pub fn window_start(&self) -> i32 {
        self.start_hour * 60 + self.start_minute
    }

    /// Absolute minute one past the visible window.
    pub fn window_end(&self) -> i32 {
        self.end_hour * 60 + self.end_minute
    }

    /// Number of whole slots that fit the window. Zero for degenerate configs.
    pub fn slot_count(&self) -> i32 {
        if self.step_minutes <= 0 {
            return 0;
        }
        let span = self.window_end() - self.window_start();
        if span <= 0 {
            0
        } else {
            span / self.step_minutes
        }
    }

    /// Absolute `[start, end)` minute range of a slot, if the slot is visible.
    pub fn slot_range(&self, slot: i32) -> Option<(i32, i32)> {
        if slot < 0 || slot >= self.slot_count() {
            return None;
        }
        let start = self.window_start() + slot * self.step_minutes;
        Some((start, start + self.step_minutes))
    }

    /// Visible slot containing an absolute minute.
    pub fn slot_at_minute(&self, minute: i32) -> Option<i32> {
        if self.step_minutes <= 0 {
            return None;
        }
        let slot = (minute - self.window_start()).div_euclid(self.step_minutes);
        (0..self.slot_count()).contains(&slot).then_some(slot)
    }

    /// Validate the configuration.
    /// Returns Ok(()) if valid, Err(TimegridError::Config) if invalid.
    ///
    /// Validates:
    /// - start_hour in [0, 23], end_hour in [0, 24]
    /// - minutes in [0, 59], and 24:00 is the latest end
    /// - the window is non-empty
    /// - step_minutes > 0
    pub fn validate(&self) -> TimegridResult<()> {
        check_range("start_hour", self.start_hour, 0, 23)?;
        check_range("start_minute", self.start_minute, 0, 59)?;
        check_range("end_hour", self.end_hour, 0, 24)?;
        check_range("end_minute", self.end_minute, 0, 59)?;

        if self.window_end() > MINUTES_PER_DAY {
            return Err(invalid(
                "end_minute",
                self.end_minute,
                "window cannot end after 24:00",
            ));
        }
        if self.window_end() <= self.window_start() {
            return Err(invalid(
                "end_hour",
                self.end_hour,
                "window end must be after window start",
            ));
        }
        if self.step_minutes <= 0 {
            return Err(invalid("step_minutes", self.step_minutes, "must be > 0"));
        }
        Ok(())
    }

    /// Apply a partial update, returning the merged configuration.
    pub fn apply(&self, patch: &GridConfigPatch) -> GridConfig {
        GridConfig {
            start_hour: patch.start_hour.unwrap_or(self.start_hour),
            start_minute: patch.start_minute.unwrap_or(self.start_minute),
            end_hour: patch.end_hour.unwrap_or(self.end_hour),
            end_minute: patch.end_minute.unwrap_or(self.end_minute),
            step_minutes: patch.step_minutes.unwrap_or(self.step_minutes),
        }
    }
}

/// Partial grid configuration update. Unset fields keep their current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridConfigPatch {
    pub start_hour: Option<i32>,
    pub start_minute: Option<i32>,
    pub end_hour: Option<i32>,
    pub end_minute: Option<i32>,
    pub step_minutes: Option<i32>,
}

impl GridConfigPatch {
    /// Patch that only changes the slot width.
    pub fn step(step_minutes: i32) -> Self {
        Self {
            step_minutes: Some(step_minutes),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn check_range(field: &str, value: i32, min: i32, max: i32) -> TimegridResult<()> {
    if value < min || value > max {
        return Err(invalid(
            field,
            value,
            &format!("must be in [{}, {}]", min, max),
        ));
    }
    Ok(())
}

fn invalid(field: &str, value: i32, reason: &str) -> crate::TimegridError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TimegridError;

    #[test]
    fn test_default_window() {
        let config = GridConfig::default();
        assert_eq!(config.window_start(), 300);
        assert_eq!(config.window_end(), 1260);
        assert_eq!(config.slot_count(), 32);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_trailing_slot_not_generated() {
        let config = GridConfig {
            start_hour: 9,
            start_minute: 0,
            end_hour: 10,
            end_minute: 0,
            step_minutes: 25,
        };
        assert_eq!(config.slot_count(), 2);
        assert_eq!(config.slot_range(1), Some((565, 590)));
        assert_eq!(config.slot_range(2), None);
    }

    #[test]
    fn test_slot_at_minute() {
        let config = GridConfig::default();
        assert_eq!(config.slot_at_minute(300), Some(0));
        assert_eq!(config.slot_at_minute(389), Some(2));
        assert_eq!(config.slot_at_minute(390), Some(3));
        assert_eq!(config.slot_at_minute(299), None);
        assert_eq!(config.slot_at_minute(1260), None);
    }

    #[test]
    fn test_degenerate_step_yields_no_slots() {
        let config = GridConfig {
            step_minutes: 0,
            ..GridConfig::default()
        };
        assert_eq!(config.slot_count(), 0);
        assert_eq!(config.slot_range(0), None);
        assert_eq!(config.slot_at_minute(300), None);
    }

    #[test]
    fn test_validate_rejects_zero_step() {
        let config = GridConfig {
            step_minutes: 0,
            ..GridConfig::default()
        };
        let err = config.validate().unwrap_err();
        match err {
            TimegridError::Config(ConfigError::InvalidValue { field, .. }) => {
                assert_eq!(field, "step_minutes");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_inverted_window() {
        let config = GridConfig {
            start_hour: 12,
            end_hour: 8,
            ..GridConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_past_midnight() {
        let config = GridConfig {
            end_hour: 24,
            end_minute: 30,
            ..GridConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_apply_patch_keeps_unset_fields() {
        let config = GridConfig::default();
        let patched = config.apply(&GridConfigPatch::step(15));
        assert_eq!(patched.step_minutes, 15);
        assert_eq!(patched.start_hour, config.start_hour);
        assert_eq!(patched.end_hour, config.end_hour);
        assert!(GridConfigPatch::default().is_empty());
    }
}
