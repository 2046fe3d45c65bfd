//! User profiles.

use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Display profile stored per identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
}

impl UserProfile {
    /// Check the profile form fields.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for a blank name or a malformed email.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::new("name", "cannot be empty"));
        }
        let email = self.email.trim();
        let valid = email
            .split_once('@')
            .is_some_and(|(local, domain)| {
                !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
            });
        if !valid {
            return Err(ValidationError::new("email", "must be a valid address"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_validation() {
        let mut profile = UserProfile {
            name: "Sam".to_string(),
            email: "sam@example.com".to_string(),
        };
        assert!(profile.validate().is_ok());

        profile.email = "sam@localhost".to_string();
        assert_eq!(profile.validate().map_err(|e| e.field), Err("email"));

        profile.email = "sam@example.com".to_string();
        profile.name = " ".to_string();
        assert_eq!(profile.validate().map_err(|e| e.field), Err("name"));
    }
}
