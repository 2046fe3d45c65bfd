//! Which cached queries each mutation makes stale.
//!
//! The table is static: a mutation's invalidation set depends only on the
//! mutation and its identifiers, never on the response.

use fit_amigo_core::{ArticleId, FoodEntryId, ProductId, RunId, VideoId};

use crate::cache::{QueryKey, QueryKind};

/// A write against the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mutation {
    AddProduct,
    EditProduct(ProductId),
    DeleteProduct(ProductId),
    AddToCart,
    PlaceOrder,
    UploadVideo,
    LikeVideo(VideoId),
    UnlikeVideo(VideoId),
    AddComment(VideoId),
    DeleteComment(VideoId),
    LogWorkout,
    LogRunningSession,
    DeleteRunningSession(RunId),
    AddFoodEntry,
    EditFoodEntry(FoodEntryId),
    DeleteFoodEntry(FoodEntryId),
    AddNewsArticle,
    EditNewsArticle(ArticleId),
    DeleteNewsArticle(ArticleId),
    SaveCallerProfile,
    AssignUserRole,
}

/// Something to invalidate: one key, or every key of a kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidationTarget {
    Kind(QueryKind),
    Key(QueryKey),
}

impl InvalidationTarget {
    /// Whether this target covers `key`.
    #[must_use]
    pub fn covers(&self, key: &QueryKey) -> bool {
        match self {
            Self::Kind(kind) => key.kind() == *kind,
            Self::Key(target) => target == key,
        }
    }
}

impl Mutation {
    /// Name used in logs and notifications.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AddProduct => "add_product",
            Self::EditProduct(_) => "edit_product",
            Self::DeleteProduct(_) => "delete_product",
            Self::AddToCart => "add_to_cart",
            Self::PlaceOrder => "place_order",
            Self::UploadVideo => "upload_video",
            Self::LikeVideo(_) => "like_video",
            Self::UnlikeVideo(_) => "unlike_video",
            Self::AddComment(_) => "add_comment",
            Self::DeleteComment(_) => "delete_comment",
            Self::LogWorkout => "log_workout",
            Self::LogRunningSession => "log_running_session",
            Self::DeleteRunningSession(_) => "delete_running_session",
            Self::AddFoodEntry => "add_food_entry",
            Self::EditFoodEntry(_) => "edit_food_entry",
            Self::DeleteFoodEntry(_) => "delete_food_entry",
            Self::AddNewsArticle => "add_news_article",
            Self::EditNewsArticle(_) => "edit_news_article",
            Self::DeleteNewsArticle(_) => "delete_news_article",
            Self::SaveCallerProfile => "save_caller_profile",
            Self::AssignUserRole => "assign_user_role",
        }
    }

    /// Queries to invalidate once this mutation succeeds.
    #[must_use]
    pub fn invalidates(&self) -> Vec<InvalidationTarget> {
        use InvalidationTarget::{Key, Kind};

        let news_lists = [
            Kind(QueryKind::NewsArticles),
            Key(QueryKey::ArticleSummaries),
            Key(QueryKey::ArticlesByDate),
        ];

        match *self {
            Self::AddProduct => vec![Kind(QueryKind::Products)],
            Self::EditProduct(id) | Self::DeleteProduct(id) => {
                vec![Kind(QueryKind::Products), Key(QueryKey::Product(id))]
            }
            Self::AddToCart => vec![Key(QueryKey::Cart)],
            Self::PlaceOrder => vec![Key(QueryKey::Cart), Key(QueryKey::UserOrders)],
            Self::UploadVideo => vec![Key(QueryKey::Videos)],
            Self::LikeVideo(id) | Self::UnlikeVideo(id) => vec![
                Key(QueryKey::Video(id)),
                Key(QueryKey::Videos),
                Key(QueryKey::VideoLike(id)),
            ],
            Self::AddComment(video) | Self::DeleteComment(video) => vec![
                Key(QueryKey::VideoComments(video)),
                Key(QueryKey::Video(video)),
            ],
            Self::LogWorkout => vec![Key(QueryKey::Workouts)],
            Self::LogRunningSession | Self::DeleteRunningSession(_) => {
                vec![Key(QueryKey::RunningSessions)]
            }
            Self::AddFoodEntry => vec![Key(QueryKey::UserFoodEntries)],
            Self::EditFoodEntry(_) => vec![
                Key(QueryKey::UserFoodEntries),
                Kind(QueryKind::FoodEntry),
            ],
            Self::DeleteFoodEntry(id) => vec![
                Key(QueryKey::UserFoodEntries),
                Key(QueryKey::FoodEntry(id)),
            ],
            Self::AddNewsArticle => news_lists.to_vec(),
            Self::EditNewsArticle(_) => {
                let mut targets = news_lists.to_vec();
                targets.push(Kind(QueryKind::NewsArticle));
                targets
            }
            Self::DeleteNewsArticle(id) => {
                let mut targets = news_lists.to_vec();
                targets.push(Key(QueryKey::NewsArticle(id)));
                targets
            }
            Self::SaveCallerProfile => vec![Key(QueryKey::CallerProfile)],
            Self::AssignUserRole => vec![Key(QueryKey::CallerRole), Key(QueryKey::IsCallerAdmin)],
        }
    }

    /// Whether this mutation's success makes `key` stale.
    #[must_use]
    pub fn affects(&self, key: &QueryKey) -> bool {
        self.invalidates().iter().any(|target| target.covers(key))
    }
}
