//! Workout, running and food trackers.

use serde::{Deserialize, Serialize};

use super::ValidationError;
use crate::types::{FoodEntryId, Principal, RunId, Timestamp};

/// A logged strength exercise. Workouts have no id and keep insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    pub exercise_name: String,
    pub sets: u64,
    pub reps: u64,
    /// Weight in kilograms.
    pub weight: u64,
}

impl Workout {
    /// Total volume lifted (sets x reps x weight).
    #[must_use]
    pub const fn volume(&self) -> u64 {
        self.sets.saturating_mul(self.reps).saturating_mul(self.weight)
    }

    /// Check the fields the workout form requires.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.exercise_name.trim().is_empty() {
            return Err(ValidationError::new("exerciseName", "cannot be empty"));
        }
        if self.sets == 0 {
            return Err(ValidationError::new("sets", "must be at least 1"));
        }
        if self.reps == 0 {
            return Err(ValidationError::new("reps", "must be at least 1"));
        }
        Ok(())
    }
}

/// A logged run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunningSession {
    pub run_id: RunId,
    pub user_id: Principal,
    /// Kilometres.
    pub distance: f64,
    /// Minutes.
    pub duration: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub timestamp: Timestamp,
}

/// Payload for logging a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunInput {
    pub distance: f64,
    pub duration: u64,
    pub notes: Option<String>,
}

impl RunInput {
    /// Check that distance and duration are positive.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.distance.is_finite() || self.distance <= 0.0 {
            return Err(ValidationError::new("distance", "must be greater than zero"));
        }
        if self.duration == 0 {
            return Err(ValidationError::new("duration", "must be greater than zero"));
        }
        Ok(())
    }

    /// Notes with surrounding whitespace removed; blank notes become `None`.
    #[must_use]
    pub fn normalized_notes(&self) -> Option<String> {
        self.notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(ToString::to_string)
    }
}

/// Aggregates shown on the running monitor page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunningTotals {
    pub sessions: usize,
    pub total_distance: f64,
    pub total_duration: u64,
    /// Minutes per kilometre; `None` when no distance was logged.
    pub average_pace: Option<f64>,
}

impl RunningTotals {
    /// Aggregate a list of sessions.
    #[must_use]
    pub fn from_sessions(sessions: &[RunningSession]) -> Self {
        let total_distance: f64 = sessions.iter().map(|s| s.distance).sum();
        let total_duration: u64 = sessions.iter().map(|s| s.duration).sum();
        #[allow(clippy::cast_precision_loss)] // minute totals never approach 2^52
        let average_pace =
            (total_distance > 0.0).then(|| total_duration as f64 / total_distance);
        Self {
            sessions: sessions.len(),
            total_distance,
            total_duration,
            average_pace,
        }
    }
}

/// Format a duration in minutes as `45 min` or `1h 5m`.
#[must_use]
pub fn format_duration(minutes: u64) -> String {
    if minutes < 60 {
        return format!("{minutes} min");
    }
    format!("{}h {}m", minutes / 60, minutes % 60)
}

/// Nutrition values for one food log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodEntryInput {
    pub food_name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub serving_size: f64,
}

impl FoodEntryInput {
    /// Check the fields the food form requires.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.food_name.trim().is_empty() {
            return Err(ValidationError::new("foodName", "cannot be empty"));
        }
        for (field, value) in [
            ("calories", self.calories),
            ("protein", self.protein),
            ("carbs", self.carbs),
            ("fat", self.fat),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ValidationError::new(field, "must be a non-negative number"));
            }
        }
        if !self.serving_size.is_finite() || self.serving_size <= 0.0 {
            return Err(ValidationError::new("servingSize", "must be greater than zero"));
        }
        Ok(())
    }

    /// Scale per-serving nutrition values to a number of servings.
    #[must_use]
    pub fn scaled(&self, servings: f64) -> Self {
        Self {
            food_name: self.food_name.clone(),
            calories: self.calories * servings,
            protein: self.protein * servings,
            carbs: self.carbs * servings,
            fat: self.fat * servings,
            serving_size: self.serving_size * servings,
        }
    }
}

/// A logged food entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodEntry {
    pub id: FoodEntryId,
    pub user_id: Principal,
    pub food_name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub serving_size: f64,
    pub timestamp: Timestamp,
}

impl FoodEntry {
    /// Build the stored entry from an input.
    #[must_use]
    pub fn from_input(
        id: FoodEntryId,
        user_id: Principal,
        input: FoodEntryInput,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            id,
            user_id,
            food_name: input.food_name,
            calories: input.calories,
            protein: input.protein,
            carbs: input.carbs,
            fat: input.fat,
            serving_size: input.serving_size,
            timestamp,
        }
    }
}

/// Daily macro totals shown on the food tracker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MacroTotals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl MacroTotals {
    /// Sum macros across entries.
    #[must_use]
    pub fn from_entries(entries: &[FoodEntry]) -> Self {
        entries.iter().fold(Self::default(), |acc, e| Self {
            calories: acc.calories + e.calories,
            protein: acc.protein + e.protein,
            carbs: acc.carbs + e.carbs,
            fat: acc.fat + e.fat,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn food(name: &str, calories: f64, protein: f64) -> FoodEntry {
        FoodEntry {
            id: FoodEntryId::new(1),
            user_id: Principal::new("u"),
            food_name: name.to_string(),
            calories,
            protein,
            carbs: 10.0,
            fat: 2.5,
            serving_size: 100.0,
            timestamp: Timestamp::from_nanos(0),
        }
    }

    fn run(distance: f64, duration: u64) -> RunningSession {
        RunningSession {
            run_id: RunId::new(1),
            user_id: Principal::new("u"),
            distance,
            duration,
            notes: None,
            timestamp: Timestamp::from_nanos(0),
        }
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(45), "45 min");
        assert_eq!(format_duration(60), "1h 0m");
        assert_eq!(format_duration(65), "1h 5m");
    }

    #[test]
    fn test_running_totals_pace() {
        let totals = RunningTotals::from_sessions(&[run(5.0, 25), run(5.0, 35)]);
        assert_eq!(totals.sessions, 2);
        assert_eq!(totals.total_duration, 60);
        assert!((totals.total_distance - 10.0).abs() < f64::EPSILON);
        assert!((totals.average_pace.unwrap_or_default() - 6.0).abs() < f64::EPSILON);

        assert_eq!(RunningTotals::from_sessions(&[]).average_pace, None);
    }

    #[test]
    fn test_macro_totals() {
        let totals = MacroTotals::from_entries(&[food("Oats", 150.0, 5.0), food("Eggs", 140.0, 12.0)]);
        assert!((totals.calories - 290.0).abs() < f64::EPSILON);
        assert!((totals.protein - 17.0).abs() < f64::EPSILON);
        assert!((totals.fat - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_food_input_validation() {
        let mut input = FoodEntryInput {
            food_name: "Chicken breast".to_string(),
            calories: 165.0,
            protein: 31.0,
            carbs: 0.0,
            fat: 3.6,
            serving_size: 100.0,
        };
        assert!(input.validate().is_ok());
        input.fat = -1.0;
        assert_eq!(input.validate().map_err(|e| e.field), Err("fat"));
        input.fat = 3.6;
        input.serving_size = 0.0;
        assert_eq!(input.validate().map_err(|e| e.field), Err("servingSize"));
    }

    #[test]
    fn test_run_input_notes_are_normalized() {
        let input = RunInput {
            distance: 3.2,
            duration: 20,
            notes: Some("   ".to_string()),
        };
        assert!(input.validate().is_ok());
        assert_eq!(input.normalized_notes(), None);
    }

    #[test]
    fn test_workout_volume_and_validation() {
        let workout = Workout {
            exercise_name: "Squat".to_string(),
            sets: 5,
            reps: 5,
            weight: 100,
        };
        assert_eq!(workout.volume(), 2500);
        assert!(workout.validate().is_ok());
        let empty = Workout {
            exercise_name: " ".to_string(),
            ..workout
        };
        assert!(empty.validate().is_err());
    }
}
