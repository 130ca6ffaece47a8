//! Authentication capability
//!
//! The chat core never manages sessions. It only asks an injected
//! [`AuthState`] whether a user is signed in and who they are.

use serde::{Deserialize, Serialize};

use crate::config::Config;

/// Identity attributes supplied by the authentication provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl UserIdentity {
    /// Best human-facing name: full name, then first name, then email.
    ///
    /// # Examples
    ///
    /// ```
    /// use chatline::auth::UserIdentity;
    ///
    /// let user = UserIdentity {
    ///     first_name: Some("Ana".into()),
    ///     email: Some("ana@example.com".into()),
    ///     ..Default::default()
    /// };
    /// assert_eq!(user.display_name(), "Ana");
    /// ```
    pub fn display_name(&self) -> &str {
        [&self.name, &self.first_name, &self.email]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
            .unwrap_or("there")
    }
}

/// Signed-in state asserted by the environment.
#[cfg_attr(test, mockall::automock)]
pub trait AuthState: Send + Sync {
    fn is_signed_in(&self) -> bool;
    fn user(&self) -> Option<UserIdentity>;
}

/// Fixed authentication state, built from configuration in the CLI.
#[derive(Debug, Clone, Default)]
pub struct StaticAuth {
    user: Option<UserIdentity>,
}

impl StaticAuth {
    pub fn signed_in(user: UserIdentity) -> Self {
        Self { user: Some(user) }
    }

    pub fn signed_out() -> Self {
        Self { user: None }
    }

    /// Signed in when the configuration carries a token or identity.
    pub fn from_config(config: &Config) -> Self {
        if !config.is_signed_in() {
            return Self::signed_out();
        }
        Self::signed_in(UserIdentity {
            name: config.user.name.clone(),
            first_name: config.user.first_name.clone(),
            email: config.user.email.clone(),
        })
    }
}

impl AuthState for StaticAuth {
    fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }

    fn user(&self) -> Option<UserIdentity> {
        self.user.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_prefers_full_name() {
        let user = UserIdentity {
            name: Some("Ana Lima".into()),
            first_name: Some("Ana".into()),
            email: Some("ana@example.com".into()),
        };
        assert_eq!(user.display_name(), "Ana Lima");
    }

    #[test]
    fn test_display_name_skips_blank_values() {
        let user = UserIdentity {
            name: Some("  ".into()),
            first_name: None,
            email: Some("ana@example.com".into()),
        };
        assert_eq!(user.display_name(), "ana@example.com");
    }

    #[test]
    fn test_display_name_fallback() {
        assert_eq!(UserIdentity::default().display_name(), "there");
    }

    #[test]
    fn test_static_auth_from_config() {
        let mut config = Config::default();
        assert!(!StaticAuth::from_config(&config).is_signed_in());

        config.service.api_token = Some("tok".into());
        config.user.first_name = Some("Ana".into());
        let auth = StaticAuth::from_config(&config);
        assert!(auth.is_signed_in());
        assert_eq!(auth.user().unwrap().display_name(), "Ana");
    }
}
