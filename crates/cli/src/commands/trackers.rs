//! Fitness tracker summary.

use std::io::Write;

use fit_amigo_client::FitAmigoClient;
use fit_amigo_core::format_duration;

use super::CliError;

/// Print workout, running and food totals for the caller.
///
/// # Errors
///
/// Returns an I/O error from the writer.
pub async fn summary(client: &FitAmigoClient, out: &mut impl Write) -> Result<(), CliError> {
    if !client.session().is_authenticated() {
        writeln!(out, "Sign in with --user to see tracker data.")?;
        return Ok(());
    }

    let (workouts, runs, macros) = tokio::join!(
        client.workouts(),
        client.running_totals(),
        client.macro_totals()
    );

    writeln!(out, "Workouts")?;
    if workouts.is_empty() {
        writeln!(out, "  none logged")?;
    }
    for workout in &workouts {
        writeln!(
            out,
            "  {}: {}x{} @ {}kg",
            workout.exercise_name, workout.sets, workout.reps, workout.weight
        )?;
    }

    writeln!(out, "Running")?;
    writeln!(
        out,
        "  {} sessions, {:.2} km in {}",
        runs.sessions,
        runs.total_distance,
        format_duration(runs.total_duration)
    )?;
    if let Some(pace) = runs.average_pace {
        writeln!(out, "  average pace {pace:.2} min/km")?;
    }

    writeln!(out, "Nutrition")?;
    writeln!(
        out,
        "  {:.0} kcal, protein {:.1}g, carbs {:.1}g, fat {:.1}g",
        macros.calories, macros.protein, macros.carbs, macros.fat
    )?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::super::tests::{seeded_client, text};
    use super::*;

    #[tokio::test]
    async fn test_anonymous_is_prompted_to_sign_in() {
        let client = seeded_client(None).await;
        let mut out = Vec::new();
        summary(&client, &mut out).await.unwrap();
        assert!(text(&out).starts_with("Sign in"));
    }

    #[tokio::test]
    async fn test_fresh_user_has_zero_totals() {
        let client = seeded_client(Some("alice")).await;
        let mut out = Vec::new();
        summary(&client, &mut out).await.unwrap();
        let text = text(&out);
        assert!(text.contains("none logged"));
        assert!(text.contains("0 sessions, 0.00 km in 0 min"));
        assert!(!text.contains("average pace"));
    }
}
