//! Profiles and roles.

use fit_amigo_core::{Principal, UserProfile, UserRole};
use tracing::instrument;

use super::{FitAmigoClient, Gate, QueryState};
use crate::cache::QueryKey;
use crate::error::Result;
use crate::invalidation::Mutation;

impl FitAmigoClient {
    /// The caller's profile; `Ready(None)` until one is saved.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Remote` if the call fails.
    #[instrument(skip(self))]
    pub async fn caller_profile(&self) -> Result<QueryState<Option<UserProfile>>> {
        self.fetch_detail(Gate::Identity, QueryKey::CallerProfile, |backend| async move {
            backend.get_caller_user_profile().await
        })
        .await
    }

    /// Another user's profile.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Remote` if the call fails.
    #[instrument(skip(self), fields(user = %user))]
    pub async fn user_profile(&self, user: &Principal) -> Result<QueryState<Option<UserProfile>>> {
        let user = user.clone();
        self.fetch_detail(
            Gate::Facade,
            QueryKey::UserProfile(user.clone()),
            move |backend| async move { backend.get_user_profile(&user).await },
        )
        .await
    }

    /// The caller's role; guest when unavailable.
    #[instrument(skip(self))]
    pub async fn caller_role(&self) -> UserRole {
        self.fetch_or_default(Gate::Facade, QueryKey::CallerRole, |backend| async move {
            backend.get_caller_user_role().await
        })
        .await
    }

    /// Whether the caller is an admin; `false` when anonymous.
    #[instrument(skip(self))]
    pub async fn is_caller_admin(&self) -> bool {
        self.fetch_or_default(Gate::Identity, QueryKey::IsCallerAdmin, |backend| async move {
            backend.is_caller_admin().await
        })
        .await
    }

    /// # Errors
    ///
    /// Returns `ClientError::InvalidInput` for a blank name or malformed
    /// email, or the backend's error.
    #[instrument(skip(self, profile))]
    pub async fn save_caller_profile(&self, profile: UserProfile) -> Result<()> {
        self.check(Mutation::SaveCallerProfile, profile.validate())?;
        self.mutate(Mutation::SaveCallerProfile, move |backend| async move {
            backend.save_caller_user_profile(&profile).await
        })
        .await
    }

    /// Assign a role to a user (admin only).
    ///
    /// # Errors
    ///
    /// Returns the backend's error.
    #[instrument(skip(self), fields(user = %user, role = %role))]
    pub async fn assign_user_role(&self, user: &Principal, role: UserRole) -> Result<()> {
        let user = user.clone();
        self.mutate(Mutation::AssignUserRole, move |backend| async move {
            backend.assign_caller_user_role(&user, role).await
        })
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::super::tests::{client_over, connected_as};
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::session::Identity;

    #[tokio::test]
    async fn test_profile_roundtrip_through_cache() {
        let backend = MemoryBackend::new();
        let client = connected_as(&backend, "alice").await;

        assert_eq!(client.caller_profile().await.unwrap(), QueryState::Ready(None));
        let profile = UserProfile {
            name: "Alice".to_string(),
            email: "alice@fitamigo.app".to_string(),
        };
        client.save_caller_profile(profile.clone()).await.unwrap();
        assert_eq!(
            client.caller_profile().await.unwrap(),
            QueryState::Ready(Some(profile.clone()))
        );
        assert_eq!(
            client.user_profile(&Principal::new("alice")).await.unwrap(),
            QueryState::Ready(Some(profile))
        );
    }

    #[tokio::test]
    async fn test_anonymous_defaults() {
        let backend = MemoryBackend::new();
        let client = client_over(&backend);
        client.session().connect(Identity::anonymous()).await.unwrap();

        assert!(!client.is_caller_admin().await);
        assert_eq!(client.caller_role().await, UserRole::Guest);
        assert_eq!(client.caller_profile().await.unwrap(), QueryState::Disabled);
    }

    #[tokio::test]
    async fn test_role_assignment_refreshes_admin_flag() {
        let backend = MemoryBackend::new();
        backend.grant_role(&Principal::new("root"), UserRole::Admin);
        let admin = connected_as(&backend, "root").await;
        let bob = connected_as(&backend, "bob").await;

        assert!(!bob.is_caller_admin().await);
        admin
            .assign_user_role(&Principal::new("bob"), UserRole::Admin)
            .await
            .unwrap();
        // bob's client has its own cache; a fresh session observes the change.
        let bob_again = connected_as(&backend, "bob").await;
        assert!(bob_again.is_caller_admin().await);
        assert!(admin.is_caller_admin().await);
    }
}
