//! Built-in fitness video catalog.

use fit_amigo_core::ExternalFitnessVideo;

const STRENGTH: &str = "/assets/generated/video-strength-training.dim_640x360.png";
const RUNNING: &str = "/assets/generated/video-running-form.dim_640x360.png";
const YOGA: &str = "/assets/generated/video-yoga.dim_640x360.png";
const NUTRITION: &str = "/assets/generated/video-nutrition.dim_640x360.png";

// (title, description, uploader, views, seconds, thumbnail)
type Row = (&'static str, &'static str, &'static str, u64, u32, &'static str);

const CATALOG: [Row; 16] = [
    (
        "Full Body Strength Training Workout",
        "Complete 45-minute strength training session targeting all major muscle groups. Perfect for building muscle and increasing strength.",
        "FitPro Training",
        125_000,
        2700,
        STRENGTH,
    ),
    (
        "Advanced HIIT Cardio Blast",
        "30-minute high-intensity interval training for maximum calorie burn. No equipment needed.",
        "CardioKing",
        89_000,
        1800,
        STRENGTH,
    ),
    (
        "Proper Running Form Tutorial",
        "Learn the fundamentals of proper running technique to prevent injuries and improve performance.",
        "RunCoach Pro",
        234_000,
        900,
        RUNNING,
    ),
    (
        "Marathon Training Tips",
        "Essential tips and strategies for marathon training. From beginner to advanced runners.",
        "RunCoach Pro",
        156_000,
        1200,
        RUNNING,
    ),
    (
        "Yoga for Athletes - Flexibility Flow",
        "40-minute yoga session designed specifically for athletes. Improve flexibility and recovery.",
        "Yoga Flow Studio",
        178_000,
        2400,
        YOGA,
    ),
    (
        "Morning Yoga Routine",
        "Gentle 20-minute morning yoga to energize your day. Perfect for all fitness levels.",
        "Yoga Flow Studio",
        312_000,
        1200,
        YOGA,
    ),
    (
        "Pilates Core Strengthening",
        "Targeted pilates workout for building a strong, stable core. Suitable for beginners.",
        "Pilates Power",
        98_000,
        1800,
        YOGA,
    ),
    (
        "Nutrition Basics for Athletes",
        "Complete guide to sports nutrition. Learn what to eat before, during, and after workouts.",
        "Sports Nutrition Expert",
        267_000,
        1500,
        NUTRITION,
    ),
    (
        "Meal Prep for Fitness Goals",
        "Step-by-step meal prep guide for building muscle and losing fat. Easy recipes included.",
        "Healthy Eats",
        445_000,
        2100,
        NUTRITION,
    ),
    (
        "Supplements Guide for Beginners",
        "Everything you need to know about fitness supplements. What works and what doesn't.",
        "Sports Nutrition Expert",
        189_000,
        1800,
        NUTRITION,
    ),
    (
        "Bodyweight Training at Home",
        "Effective bodyweight exercises you can do anywhere. No gym required.",
        "FitPro Training",
        201_000,
        1500,
        STRENGTH,
    ),
    (
        "Stretching Routine for Recovery",
        "Essential stretching exercises for post-workout recovery and injury prevention.",
        "Mobility Master",
        134_000,
        900,
        YOGA,
    ),
    (
        "Sprint Training Techniques",
        "Improve your speed with these proven sprint training methods. For all running levels.",
        "Speed Coach",
        87_000,
        1200,
        RUNNING,
    ),
    (
        "Kettlebell Full Body Workout",
        "Dynamic kettlebell workout for strength and conditioning. Burn calories and build muscle.",
        "Kettlebell King",
        156_000,
        2400,
        STRENGTH,
    ),
    (
        "Hydration and Performance",
        "Understanding the critical role of hydration in athletic performance and recovery.",
        "Sports Science Lab",
        76_000,
        600,
        NUTRITION,
    ),
    (
        "Beginner Weight Training Guide",
        "Complete beginner's guide to weight training. Learn proper form and technique.",
        "FitPro Training",
        389_000,
        2700,
        STRENGTH,
    ),
];

/// The full catalog, ids `video-1` through `video-16`.
#[must_use]
pub fn catalog() -> Vec<ExternalFitnessVideo> {
    CATALOG
        .iter()
        .zip(1..)
        .map(
            |(&(title, description, uploader, views, duration, thumbnail), n): (&Row, u32)| {
                ExternalFitnessVideo {
                    id: format!("video-{n}"),
                    title: title.to_string(),
                    description: description.to_string(),
                    thumbnail_url: thumbnail.to_string(),
                    video_url: format!("https://www.youtube.com/watch?v=example{n}"),
                    uploader: uploader.to_string(),
                    view_count: Some(views),
                    duration,
                }
            },
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog() {
        let videos = catalog();
        assert_eq!(videos.len(), 16);
        let last = videos.last().map(|v| (v.id.as_str(), v.video_url.as_str()));
        assert_eq!(
            last,
            Some(("video-16", "https://www.youtube.com/watch?v=example16"))
        );
        assert_eq!(
            videos.iter().filter(|v| v.uploader == "FitPro Training").count(),
            3
        );
    }
}
