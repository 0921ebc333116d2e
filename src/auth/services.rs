use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use crate::auth::{password, repo::UserRepository, repo_types::User};
use crate::error::{AppError, AppResult};

/// Registration and login on top of the user store.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Usernames are matched exactly; no password policy is applied.
    #[instrument(skip(self, plain_password))]
    pub async fn register(&self, username: &str, plain_password: &str) -> AppResult<User> {
        if self.users.find_by_username(username).await?.is_some() {
            warn!(%username, "username already registered");
            return Err(AppError::DuplicateUsername);
        }

        let hashed = password::hash(plain_password)?;

        // A concurrent registration can slip past the check above; the unique
        // constraint on users.username reports it as DuplicateUsername.
        let user = self.users.create(username, &hashed).await?;
        info!(user_id = user.id, %username, "user registered");
        Ok(user)
    }

    /// Unknown usernames and wrong passwords produce the same error.
    #[instrument(skip(self, plain_password))]
    pub async fn login(&self, username: &str, plain_password: &str) -> AppResult<User> {
        let Some(user) = self.users.find_by_username(username).await? else {
            warn!(%username, "login unknown username");
            return Err(AppError::InvalidCredentials);
        };

        let ok = password::verify(&user.password_hash, plain_password).map_err(|e| {
            error!(error = %e, user_id = user.id, "stored password hash unreadable");
            AppError::Internal(e)
        })?;

        if !ok {
            warn!(user_id = user.id, "login invalid password");
            return Err(AppError::InvalidCredentials);
        }

        info!(user_id = user.id, "user logged in");
        Ok(user)
    }

    pub async fn get_user_by_id(&self, id: i64) -> AppResult<User> {
        self.users.find_by_id(id).await?.ok_or(AppError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryUserRepository;

    fn service() -> (AuthService, Arc<MemoryUserRepository>) {
        let repo = Arc::new(MemoryUserRepository::default());
        (AuthService::new(repo.clone()), repo)
    }

    #[tokio::test]
    async fn registered_user_hash_verifies_only_original_password() {
        let (auth, repo) = service();
        auth.register("jace", "mind-sculptor").await.expect("register");

        let stored = repo
            .find_by_username("jace")
            .await
            .expect("lookup")
            .expect("user exists");
        assert_eq!(stored.username, "jace");
        assert_ne!(stored.password_hash, "mind-sculptor");
        assert!(password::verify(&stored.password_hash, "mind-sculptor").expect("verify"));
        assert!(!password::verify(&stored.password_hash, "mind-sculptor2").expect("verify"));
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected_and_keeps_one_record() {
        let (auth, repo) = service();
        auth.register("testuser", "password123").await.expect("first");

        let err = auth.register("testuser", "password456").await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateUsername));
        assert_eq!(repo.count(), 1);
    }

    #[tokio::test]
    async fn usernames_are_case_sensitive() {
        let (auth, repo) = service();
        auth.register("Chandra", "pw").await.expect("first");
        auth.register("chandra", "pw").await.expect("different case is a new user");
        assert_eq!(repo.count(), 2);
    }

    #[tokio::test]
    async fn store_level_duplicate_surfaces_as_duplicate_username() {
        let (auth, repo) = service();
        repo.fail_next_create_as_duplicate();

        let err = auth.register("racer", "pw").await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateUsername));
    }

    #[tokio::test]
    async fn login_returns_user_for_correct_credentials() {
        let (auth, _) = service();
        let created = auth.register("testuser", "password123").await.expect("register");

        let user = auth.login("testuser", "password123").await.expect("login");
        assert_eq!(user.id, created.id);
        assert_eq!(user.username, "testuser");
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_fail_identically() {
        let (auth, _) = service();
        auth.register("testuser", "password123").await.expect("register");

        let wrong_password = auth.login("testuser", "wrongpassword").await.unwrap_err();
        let unknown_user = auth.login("nonexistent", "password123").await.unwrap_err();

        assert!(matches!(wrong_password, AppError::InvalidCredentials));
        assert!(matches!(unknown_user, AppError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    }

    #[tokio::test]
    async fn get_user_by_id_reports_missing_users() {
        let (auth, _) = service();
        let created = auth.register("liliana", "pw").await.expect("register");

        let found = auth.get_user_by_id(created.id).await.expect("found");
        assert_eq!(found.username, "liliana");

        let err = auth.get_user_by_id(created.id + 100).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }
}
