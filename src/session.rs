//! Authentication state shared by the HTTP collections of one signed-in user.

use std::sync::{PoisonError, RwLock};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
    pub user_name: Option<String>,
}

/// Explicitly owned session; clone an `Arc<Session>` into every consumer.
#[derive(Debug, Default)]
pub struct Session {
    credentials: RwLock<Option<Credentials>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>, user_name: Option<String>) -> Self {
        let session = Self::new();
        session.set_auth(token, user_name);
        session
    }

    pub fn set_auth(&self, token: impl Into<String>, user_name: Option<String>) {
        let mut credentials = self
            .credentials
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *credentials = Some(Credentials {
            token: token.into(),
            user_name,
        });
    }

    pub fn logout(&self) {
        let mut credentials = self
            .credentials
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if credentials.take().is_some() {
            log::info!("Session cleared");
        }
    }

    pub fn token(&self) -> Option<String> {
        self.credentials
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|c| c.token.clone())
    }

    pub fn user_name(&self) -> Option<String> {
        self.credentials
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .and_then(|c| c.user_name.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }
}
