//! Status and classification enums for backend entities.
//!
//! Wire names follow the backend contract (camelCase variant names).

use serde::{Deserialize, Serialize};

/// Order fulfillment status.
///
/// Transitions happen server-side only; the client treats orders as read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
}

impl OrderStatus {
    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
        }
    }
}

/// Access role of a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum UserRole {
    /// Full access including catalog and news management.
    Admin,
    /// Authenticated user.
    User,
    /// Anonymous visitor.
    #[default]
    Guest,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::User => write!(f, "user"),
            Self::Guest => write!(f, "guest"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            "guest" => Ok(Self::Guest),
            _ => Err(format!("invalid user role: {s}")),
        }
    }
}

/// Whether a news article is hosted by FIT AMIGO or links elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ArticleType {
    Internal,
    External,
}

/// News article category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NewsCategory {
    WorkoutTips,
    Nutrition,
    SportsNews,
    TrainingAdvice,
    ProductReviews,
    MentalHealth,
    FitnessLifestyle,
}

impl NewsCategory {
    /// All categories in display order.
    pub const ALL: [Self; 7] = [
        Self::WorkoutTips,
        Self::Nutrition,
        Self::SportsNews,
        Self::TrainingAdvice,
        Self::ProductReviews,
        Self::MentalHealth,
        Self::FitnessLifestyle,
    ];

    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::WorkoutTips => "Workout Tips",
            Self::Nutrition => "Nutrition",
            Self::SportsNews => "Sports News",
            Self::TrainingAdvice => "Training Advice",
            Self::ProductReviews => "Product Reviews",
            Self::MentalHealth => "Mental Health",
            Self::FitnessLifestyle => "Fitness Lifestyle",
        }
    }
}

impl std::str::FromStr for NewsCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "workoutTips" | "workout-tips" => Ok(Self::WorkoutTips),
            "nutrition" => Ok(Self::Nutrition),
            "sportsNews" | "sports-news" => Ok(Self::SportsNews),
            "trainingAdvice" | "training-advice" => Ok(Self::TrainingAdvice),
            "productReviews" | "product-reviews" => Ok(Self::ProductReviews),
            "mentalHealth" | "mental-health" => Ok(Self::MentalHealth),
            "fitnessLifestyle" | "fitness-lifestyle" => Ok(Self::FitnessLifestyle),
            _ => Err(format!("invalid news category: {s}")),
        }
    }
}

/// Kind of item a content search hit points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentType {
    Product,
    Video,
    Article,
    Workout,
    RunningSession,
    FoodEntry,
}

impl ContentType {
    /// Section heading used when grouping search results.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Product => "Products",
            Self::Video => "Videos",
            Self::Article => "News Articles",
            Self::Workout => "Workouts",
            Self::RunningSession => "Running Sessions",
            Self::FoodEntry => "Food Entries",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_wire_names() {
        let json = serde_json::to_string(&OrderStatus::Processing).unwrap();
        assert_eq!(json, "\"processing\"");
        let parsed: OrderStatus = serde_json::from_str("\"delivered\"").unwrap();
        assert_eq!(parsed, OrderStatus::Delivered);
    }

    #[test]
    fn test_user_role_roundtrip() {
        for role in [UserRole::Admin, UserRole::User, UserRole::Guest] {
            assert_eq!(role.to_string().parse::<UserRole>().unwrap(), role);
        }
        assert!("root".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_news_category_accepts_kebab_case() {
        assert_eq!(
            "sports-news".parse::<NewsCategory>().unwrap(),
            NewsCategory::SportsNews
        );
        let json = serde_json::to_string(&NewsCategory::MentalHealth).unwrap();
        assert_eq!(json, "\"mentalHealth\"");
    }
}
