//! FiTube: uploaded videos, likes, comments and the partner video feed.

use std::sync::Arc;

use fit_amigo_core::{
    Comment, CommentId, ExternalFitnessVideo, FeedEntry, Video, VideoId, validate_comment,
};
use tracing::instrument;

use super::{FitAmigoClient, Gate, QueryState};
use crate::backend::BackendError;
use crate::blob::ExternalBlob;
use crate::cache::QueryKey;
use crate::error::Result;
use crate::invalidation::Mutation;

impl FitAmigoClient {
    #[instrument(skip(self))]
    pub async fn videos(&self) -> Vec<Video> {
        self.fetch_or_default(Gate::Facade, QueryKey::Videos, |backend| async move {
            backend.get_all_videos().await
        })
        .await
    }

    /// A single uploaded video.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotFound` for an unknown id, or
    /// `ClientError::Remote` if the call fails.
    #[instrument(skip(self), fields(video_id = %id))]
    pub async fn video(&self, id: VideoId) -> Result<QueryState<Video>> {
        self.fetch_detail(Gate::Facade, QueryKey::Video(id), move |backend| async move {
            backend
                .get_video(id)
                .await?
                .ok_or_else(|| BackendError::NotFound(format!("video {id}")))
        })
        .await
    }

    #[instrument(skip(self), fields(video_id = %id))]
    pub async fn video_comments(&self, id: VideoId) -> Vec<Comment> {
        self.fetch_or_default(Gate::Facade, QueryKey::VideoComments(id), move |backend| async move {
            backend.get_video_comments(id).await
        })
        .await
    }

    /// Whether the caller liked a video; `false` when anonymous.
    #[instrument(skip(self), fields(video_id = %id))]
    pub async fn has_liked_video(&self, id: VideoId) -> bool {
        self.fetch_or_default(Gate::Identity, QueryKey::VideoLike(id), move |backend| async move {
            backend.has_liked_video(id).await
        })
        .await
    }

    /// Partner fitness videos from the configured source.
    #[instrument(skip(self))]
    pub async fn external_fitness_videos(&self) -> Vec<ExternalFitnessVideo> {
        let source = Arc::clone(&self.inner.videos);
        self.fetch_or_default(
            Gate::Facade,
            QueryKey::ExternalFitnessVideos,
            move |backend| async move { source.fitness_videos(backend.as_ref()).await },
        )
        .await
    }

    /// Uploaded videos (newest first) followed by partner videos.
    #[instrument(skip(self))]
    pub async fn video_feed(&self) -> Vec<FeedEntry> {
        let (uploaded, external) = tokio::join!(self.videos(), self.external_fitness_videos());
        FeedEntry::merge(uploaded, external)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Upload a video.
    ///
    /// The blob's progress callback sees 0 before the call and 100 once the
    /// backend has accepted the upload.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidInput` for a blank title or empty file, or
    /// the backend's error.
    #[instrument(skip(self, description, file), fields(title = %title))]
    pub async fn upload_video(
        &self,
        title: &str,
        description: &str,
        file: ExternalBlob,
    ) -> Result<VideoId> {
        let title = title.trim().to_string();
        let validation = if title.is_empty() {
            Err(fit_amigo_core::ValidationError::new("title", "cannot be empty"))
        } else if file.blob_ref().is_empty() {
            Err(fit_amigo_core::ValidationError::new("videoFile", "cannot be empty"))
        } else {
            Ok(())
        };
        self.check(Mutation::UploadVideo, validation)?;

        let description = description.trim().to_string();
        file.report_progress(0);
        let id = self
            .mutate(Mutation::UploadVideo, {
                let file = file.clone();
                move |backend| async move {
                    backend
                        .upload_video(&title, &description, file.blob_ref())
                        .await
                }
            })
            .await?;
        file.report_progress(100);
        Ok(id)
    }

    /// # Errors
    ///
    /// Returns the backend's error.
    #[instrument(skip(self), fields(video_id = %id))]
    pub async fn like_video(&self, id: VideoId) -> Result<()> {
        self.mutate(Mutation::LikeVideo(id), move |backend| async move {
            backend.like_video(id).await
        })
        .await
    }

    /// # Errors
    ///
    /// Returns the backend's error.
    #[instrument(skip(self), fields(video_id = %id))]
    pub async fn unlike_video(&self, id: VideoId) -> Result<()> {
        self.mutate(Mutation::UnlikeVideo(id), move |backend| async move {
            backend.unlike_video(id).await
        })
        .await
    }

    /// Comment on a video.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidInput` for blank or overlong text, or the
    /// backend's error.
    #[instrument(skip(self, text), fields(video_id = %video_id))]
    pub async fn add_comment(&self, video_id: VideoId, text: &str) -> Result<CommentId> {
        let mutation = Mutation::AddComment(video_id);
        self.check(mutation, validate_comment(text))?;
        let text = text.trim().to_string();
        self.mutate(mutation, move |backend| async move {
            backend.add_comment(video_id, &text).await
        })
        .await
    }

    /// Delete a comment. The backend rejects callers other than its author.
    ///
    /// # Errors
    ///
    /// Returns the backend's error.
    #[instrument(skip(self), fields(video_id = %video_id, comment_id = %comment_id))]
    pub async fn delete_comment(&self, video_id: VideoId, comment_id: CommentId) -> Result<()> {
        self.mutate(Mutation::DeleteComment(video_id), move |backend| async move {
            backend.delete_comment(comment_id).await
        })
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use fit_amigo_core::FeedSource;

    use super::super::tests::connected_as;
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::error::ClientError;

    #[tokio::test]
    async fn test_feed_lists_uploads_before_partner_videos() {
        let backend = MemoryBackend::seeded();
        let client = connected_as(&backend, "alice").await;
        let feed = client.video_feed().await;
        assert_eq!(feed.len(), 2 + 16);
        assert_eq!(feed.first().map(FeedEntry::source), Some(FeedSource::Uploaded));
        assert_eq!(feed.last().map(FeedEntry::source), Some(FeedSource::External));
    }

    #[tokio::test]
    async fn test_like_refreshes_flag_and_count() {
        let backend = MemoryBackend::seeded();
        let client = connected_as(&backend, "alice").await;
        let id = client.videos().await.first().map(|v| v.id).unwrap();

        assert!(!client.has_liked_video(id).await);
        client.like_video(id).await.unwrap();
        assert!(client.has_liked_video(id).await);
        let video = client.video(id).await.unwrap().ready().unwrap();
        assert_eq!(video.like_count, 1);
    }

    #[tokio::test]
    async fn test_upload_reports_progress() {
        let backend = MemoryBackend::seeded();
        let client = connected_as(&backend, "alice").await;
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let blob = ExternalBlob::from_bytes(b"mp4".to_vec())
            .with_upload_progress(move |p| sink.lock().unwrap().push(p));

        let before = client.videos().await.len();
        let id = client.upload_video("Hill sprints", "", blob).await.unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![0, 100]);
        assert_eq!(client.videos().await.len(), before + 1);
        assert!(client.video(id).await.unwrap().is_ready());
    }

    #[tokio::test]
    async fn test_blank_comment_rejected_locally() {
        let backend = MemoryBackend::seeded();
        let client = connected_as(&backend, "alice").await;
        let err = client.add_comment(VideoId::new(6), "   ").await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_unknown_video_is_not_found() {
        let backend = MemoryBackend::seeded();
        let client = connected_as(&backend, "alice").await;
        let err = client.video(VideoId::new(404)).await.unwrap_err();
        assert!(matches!(err, ClientError::NotFound(_)));
    }
}
