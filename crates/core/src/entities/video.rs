//! FiTube videos, comments and the merged video feed.

use serde::{Deserialize, Serialize};

use super::ValidationError;
use crate::types::{BlobRef, CommentId, Principal, Timestamp, VideoId};

/// Maximum comment length accepted by the backend.
pub const MAX_COMMENT_LENGTH: usize = 1000;

/// A user-uploaded video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: VideoId,
    pub title: String,
    pub description: String,
    pub uploader_id: Principal,
    pub like_count: u64,
    pub comment_count: u64,
    pub upload_timestamp: Timestamp,
    pub video_file: BlobRef,
}

impl Video {
    /// URL the player can stream from.
    #[must_use]
    pub fn playable_url(&self) -> String {
        self.video_file.direct_url()
    }
}

/// A comment on a video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub video_id: VideoId,
    pub user_id: Principal,
    pub text: String,
    pub timestamp: Timestamp,
}

impl Comment {
    /// Only the author may delete a comment.
    #[must_use]
    pub fn is_authored_by(&self, user: &Principal) -> bool {
        &self.user_id == user
    }
}

/// Validate comment text before posting.
///
/// # Errors
///
/// Returns a [`ValidationError`] for blank or oversized comments.
pub fn validate_comment(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        return Err(ValidationError::new("text", "cannot be empty"));
    }
    if text.chars().count() > MAX_COMMENT_LENGTH {
        return Err(ValidationError::new(
            "text",
            format!("must be at most {MAX_COMMENT_LENGTH} characters"),
        ));
    }
    Ok(())
}

/// A fitness video hosted elsewhere (read-only projection).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalFitnessVideo {
    pub id: String,
    pub title: String,
    pub description: String,
    pub thumbnail_url: String,
    pub video_url: String,
    pub uploader: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_count: Option<u64>,
    /// Length in seconds.
    pub duration: u32,
}

impl ExternalFitnessVideo {
    /// Case-insensitive substring match over title, description and uploader.
    #[must_use]
    pub fn matches_term(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        term.is_empty()
            || self.title.to_lowercase().contains(&term)
            || self.description.to_lowercase().contains(&term)
            || self.uploader.to_lowercase().contains(&term)
    }

    /// Duration as `m:ss` (or `h:mm:ss` past an hour).
    #[must_use]
    pub fn duration_label(&self) -> String {
        let hours = self.duration / 3600;
        let minutes = (self.duration % 3600) / 60;
        let seconds = self.duration % 60;
        if hours > 0 {
            format!("{hours}:{minutes:02}:{seconds:02}")
        } else {
            format!("{minutes}:{seconds:02}")
        }
    }
}

/// Where a feed entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FeedSource {
    Uploaded,
    External,
}

/// One entry in the merged FiTube feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "camelCase")]
pub enum FeedEntry {
    Uploaded(Video),
    External(ExternalFitnessVideo),
}

impl FeedEntry {
    /// The entry's source tag.
    #[must_use]
    pub const fn source(&self) -> FeedSource {
        match self {
            Self::Uploaded(_) => FeedSource::Uploaded,
            Self::External(_) => FeedSource::External,
        }
    }

    /// Display title.
    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            Self::Uploaded(v) => &v.title,
            Self::External(v) => &v.title,
        }
    }

    /// URL to play the video from.
    #[must_use]
    pub fn playable_url(&self) -> String {
        match self {
            Self::Uploaded(v) => v.playable_url(),
            Self::External(v) => v.video_url.clone(),
        }
    }

    /// Backend id, only uploaded videos can be liked or commented on.
    #[must_use]
    pub const fn video_id(&self) -> Option<VideoId> {
        match self {
            Self::Uploaded(v) => Some(v.id),
            Self::External(_) => None,
        }
    }

    /// Merge uploaded videos (newest first) ahead of external ones.
    #[must_use]
    pub fn merge(mut uploaded: Vec<Video>, external: Vec<ExternalFitnessVideo>) -> Vec<Self> {
        uploaded.sort_by(|a, b| b.upload_timestamp.cmp(&a.upload_timestamp));
        uploaded
            .into_iter()
            .map(Self::Uploaded)
            .chain(external.into_iter().map(Self::External))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uploaded(id: u64, at: i64) -> Video {
        Video {
            id: VideoId::new(id),
            title: format!("clip {id}"),
            description: String::new(),
            uploader_id: Principal::new("uploader"),
            like_count: 0,
            comment_count: 0,
            upload_timestamp: Timestamp::from_nanos(at),
            video_file: BlobRef::Bytes(vec![1]),
        }
    }

    fn external(id: &str, duration: u32) -> ExternalFitnessVideo {
        ExternalFitnessVideo {
            id: id.to_string(),
            title: "Morning Yoga Routine".to_string(),
            description: "Gentle flow".to_string(),
            thumbnail_url: String::new(),
            video_url: format!("https://videos.example.com/{id}"),
            uploader: "Yoga Flow Studio".to_string(),
            view_count: None,
            duration,
        }
    }

    #[test]
    fn test_feed_merge_orders_uploaded_newest_first() {
        let feed = FeedEntry::merge(
            vec![uploaded(1, 10), uploaded(2, 30)],
            vec![external("video-5", 2400)],
        );
        let ids: Vec<Option<VideoId>> = feed.iter().map(FeedEntry::video_id).collect();
        assert_eq!(ids, [Some(VideoId::new(2)), Some(VideoId::new(1)), None]);
        assert_eq!(feed[2].source(), FeedSource::External);
        assert_eq!(feed[2].playable_url(), "https://videos.example.com/video-5");
    }

    #[test]
    fn test_duration_label() {
        assert_eq!(external("a", 900).duration_label(), "15:00");
        assert_eq!(external("b", 3725).duration_label(), "1:02:05");
    }

    #[test]
    fn test_comment_validation_and_authorship() {
        assert!(validate_comment("  ").is_err());
        assert!(validate_comment(&"x".repeat(MAX_COMMENT_LENGTH + 1)).is_err());
        assert!(validate_comment("Great form!").is_ok());

        let comment = Comment {
            id: CommentId::new(1),
            video_id: VideoId::new(1),
            user_id: Principal::new("author"),
            text: "nice".to_string(),
            timestamp: Timestamp::from_nanos(0),
        };
        assert!(comment.is_authored_by(&Principal::new("author")));
        assert!(!comment.is_authored_by(&Principal::new("someone-else")));
    }
}
