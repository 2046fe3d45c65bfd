//! Workout, running and food trackers.

use fit_amigo_core::{
    FoodEntry, FoodEntryId, FoodEntryInput, MacroTotals, RunId, RunInput, RunningSession,
    RunningTotals, Workout,
};
use tracing::instrument;

use super::{FitAmigoClient, Gate, QueryState};
use crate::backend::BackendError;
use crate::cache::QueryKey;
use crate::error::Result;
use crate::invalidation::Mutation;

impl FitAmigoClient {
    #[instrument(skip(self))]
    pub async fn workouts(&self) -> Vec<Workout> {
        self.fetch_or_default(Gate::Identity, QueryKey::Workouts, |backend| async move {
            backend.get_workouts().await
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn running_sessions(&self) -> Vec<RunningSession> {
        self.fetch_or_default(Gate::Identity, QueryKey::RunningSessions, |backend| async move {
            backend.get_user_running_sessions().await
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn food_entries(&self) -> Vec<FoodEntry> {
        self.fetch_or_default(Gate::Identity, QueryKey::UserFoodEntries, |backend| async move {
            backend.get_user_food_entries().await
        })
        .await
    }

    /// A single food entry.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotFound` for an unknown id, or
    /// `ClientError::Remote` if the call fails.
    #[instrument(skip(self), fields(entry_id = %id))]
    pub async fn food_entry(&self, id: FoodEntryId) -> Result<QueryState<FoodEntry>> {
        self.fetch_detail(Gate::Facade, QueryKey::FoodEntry(id), move |backend| async move {
            backend
                .get_food_entry(id)
                .await?
                .ok_or_else(|| BackendError::NotFound(format!("food entry {id}")))
        })
        .await
    }

    /// Distance, duration and pace over the caller's runs.
    pub async fn running_totals(&self) -> RunningTotals {
        RunningTotals::from_sessions(&self.running_sessions().await)
    }

    /// Macro totals over the caller's food log.
    pub async fn macro_totals(&self) -> MacroTotals {
        MacroTotals::from_entries(&self.food_entries().await)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// # Errors
    ///
    /// Returns `ClientError::InvalidInput` for an invalid workout, or the
    /// backend's error.
    #[instrument(skip(self, workout), fields(exercise = %workout.exercise_name))]
    pub async fn log_workout(&self, workout: Workout) -> Result<()> {
        self.check(Mutation::LogWorkout, workout.validate())?;
        self.mutate(Mutation::LogWorkout, move |backend| async move {
            backend.log_workout(&workout).await
        })
        .await
    }

    /// Log a run; blank notes are dropped.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidInput` for a non-positive distance or
    /// duration, or the backend's error.
    #[instrument(skip(self, run), fields(distance = run.distance, duration = run.duration))]
    pub async fn log_running_session(&self, run: RunInput) -> Result<RunId> {
        self.check(Mutation::LogRunningSession, run.validate())?;
        let notes = run.normalized_notes();
        self.mutate(Mutation::LogRunningSession, move |backend| async move {
            backend
                .log_running_session(run.distance, run.duration, notes.as_deref())
                .await
        })
        .await
    }

    /// # Errors
    ///
    /// Returns the backend's error.
    #[instrument(skip(self), fields(run_id = %id))]
    pub async fn delete_running_session(&self, id: RunId) -> Result<()> {
        self.mutate(Mutation::DeleteRunningSession(id), move |backend| async move {
            backend.delete_running_session(id).await
        })
        .await
    }

    /// # Errors
    ///
    /// Returns `ClientError::InvalidInput` for invalid nutrition values, or
    /// the backend's error.
    #[instrument(skip(self, food), fields(food = %food.food_name))]
    pub async fn add_food_entry(&self, food: FoodEntryInput) -> Result<FoodEntryId> {
        self.check(Mutation::AddFoodEntry, food.validate())?;
        self.mutate(Mutation::AddFoodEntry, move |backend| async move {
            backend.add_food_entry(&food).await
        })
        .await
    }

    /// # Errors
    ///
    /// Returns `ClientError::InvalidInput` for invalid nutrition values, or
    /// the backend's error.
    #[instrument(skip(self, food), fields(entry_id = %id))]
    pub async fn edit_food_entry(&self, id: FoodEntryId, food: FoodEntryInput) -> Result<()> {
        let mutation = Mutation::EditFoodEntry(id);
        self.check(mutation, food.validate())?;
        self.mutate(mutation, move |backend| async move {
            backend.edit_food_entry(id, &food).await
        })
        .await
    }

    /// # Errors
    ///
    /// Returns the backend's error.
    #[instrument(skip(self), fields(entry_id = %id))]
    pub async fn delete_food_entry(&self, id: FoodEntryId) -> Result<()> {
        self.mutate(Mutation::DeleteFoodEntry(id), move |backend| async move {
            backend.delete_food_entry(id).await
        })
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::super::tests::connected_as;
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::error::ClientError;

    fn oats() -> FoodEntryInput {
        FoodEntryInput {
            food_name: "Oats".to_string(),
            calories: 380.0,
            protein: 13.0,
            carbs: 67.0,
            fat: 7.0,
            serving_size: 100.0,
        }
    }

    #[tokio::test]
    async fn test_edit_food_entry_refreshes_list_and_detail() {
        let backend = MemoryBackend::new();
        let client = connected_as(&backend, "alice").await;

        let id = client.add_food_entry(oats()).await.unwrap();
        let before = client.food_entry(id).await.unwrap().ready().unwrap();
        assert_eq!(client.food_entries().await.len(), 1);

        client.edit_food_entry(id, oats().scaled(2.0)).await.unwrap();
        let after = client.food_entry(id).await.unwrap().ready().unwrap();
        assert!((after.calories - before.calories * 2.0).abs() < f64::EPSILON);
        let listed = client.food_entries().await;
        assert!((listed.first().map_or(0.0, |e| e.calories) - 760.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_running_totals_follow_log_and_delete() {
        let backend = MemoryBackend::new();
        let client = connected_as(&backend, "alice").await;

        let first = client
            .log_running_session(RunInput {
                distance: 5.0,
                duration: 25,
                notes: Some("  ".to_string()),
            })
            .await
            .unwrap();
        client
            .log_running_session(RunInput {
                distance: 10.0,
                duration: 50,
                notes: Some("long run".to_string()),
            })
            .await
            .unwrap();

        let totals = client.running_totals().await;
        assert_eq!(totals.sessions, 2);
        assert_eq!(totals.total_duration, 75);
        assert_eq!(totals.average_pace, Some(5.0));
        assert!(client.running_sessions().await.iter().any(|r| r.notes.is_none()));

        client.delete_running_session(first).await.unwrap();
        assert_eq!(client.running_totals().await.sessions, 1);
    }

    #[tokio::test]
    async fn test_invalid_workout_rejected_locally() {
        let backend = MemoryBackend::new();
        let client = connected_as(&backend, "alice").await;
        let err = client
            .log_workout(Workout {
                exercise_name: " ".to_string(),
                sets: 3,
                reps: 5,
                weight: 60,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidInput(_)));
        assert!(client.workouts().await.is_empty());
    }

    #[tokio::test]
    async fn test_macro_totals() {
        let backend = MemoryBackend::new();
        let client = connected_as(&backend, "alice").await;
        client.add_food_entry(oats()).await.unwrap();
        client.add_food_entry(oats()).await.unwrap();
        let totals = client.macro_totals().await;
        assert!((totals.protein - 26.0).abs() < f64::EPSILON);
    }
}
