use anyhow::{Result, anyhow};
use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::db::Database;
use crate::error::ClinicError;
use crate::models::{Role, User};

/// Argon2 PHC string for a new password.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("hashing password: {}", e))?;
    Ok(hash.to_string())
}

/// False for a wrong password and for a malformed stored hash.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!(error = %e, "stored password hash could not be parsed");
            false
        }
    }
}

#[async_trait]
pub trait UserStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;
}

#[async_trait]
impl UserStore for Database {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Database::find_user_by_email(self, email).await
    }
}

/// The logged-in admin or staff member.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user_id: i32,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub started_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl Session {
    pub fn new(user: &User, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role(),
            started_at: now,
            last_activity: now,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>, idle: Duration) -> bool {
        now - self.last_activity > idle
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_activity = now;
    }
}

/// Checks credentials and opens a session.
///
/// Unknown e-mail and wrong password fail the same way.
pub async fn login<S>(store: &S, email: &str, password: &str, now: DateTime<Utc>) -> Result<Session>
where
    S: UserStore + Sync + ?Sized,
{
    let user = match store.find_user_by_email(email).await? {
        Some(user) => user,
        None => {
            tracing::warn!(email, "login attempt for unknown e-mail");
            return Err(ClinicError::InvalidCredentials.into());
        }
    };

    if !verify_password(password, &user.password_hash) {
        tracing::warn!(user_id = user.id, "login attempt with wrong password");
        return Err(ClinicError::InvalidCredentials.into());
    }

    if !user.active {
        tracing::warn!(user_id = user.id, "login attempt on disabled account");
        return Err(ClinicError::InactiveAccount.into());
    }

    tracing::info!(user_id = user.id, "user logged in");
    Ok(Session::new(&user, now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;

    static SECRET_HASH: Lazy<String> = Lazy::new(|| hash_password("s3cret!").unwrap());

    struct OneUser(User);

    #[async_trait]
    impl UserStore for OneUser {
        async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
            Ok((self.0.email.eq_ignore_ascii_case(email.trim())).then(|| self.0.clone()))
        }
    }

    fn store(active: bool) -> OneUser {
        OneUser(User {
            id: 1,
            name: "Administrator".into(),
            email: "admin@clinic.com".into(),
            role: "admin".into(),
            password_hash: SECRET_HASH.clone(),
            active,
        })
    }

    fn clinic_error(err: anyhow::Error) -> ClinicError {
        err.downcast::<ClinicError>().unwrap()
    }

    #[test]
    fn hash_round_trip_and_salting() {
        assert!(verify_password("s3cret!", &SECRET_HASH));
        assert!(!verify_password("wrong", &SECRET_HASH));
        assert!(!verify_password("s3cret!", "not a phc string"));
        assert_ne!(hash_password("s3cret!").unwrap(), *SECRET_HASH);
    }

    #[test]
    fn hash_is_argon2id_with_a_random_salt() {
        let parsed = PasswordHash::new(&SECRET_HASH).unwrap();
        assert_eq!(parsed.algorithm.as_str(), "argon2id");
        let salt = parsed.salt.unwrap();
        assert!(salt.len() >= 16);

        let other = hash_password("s3cret!").unwrap();
        let other_salt = PasswordHash::new(&other).unwrap().salt.unwrap();
        assert_ne!(salt.as_str(), other_salt.as_str());
    }

    #[tokio::test]
    async fn login_opens_session_for_valid_credentials() {
        let now = Utc::now();
        let session = login(&store(true), "ADMIN@clinic.com", "s3cret!", now).await.unwrap();
        assert_eq!(session.user_id, 1);
        assert_eq!(session.role, Role::Admin);
        assert_eq!(session.last_activity, now);
    }

    #[tokio::test]
    async fn unknown_email_and_wrong_password_look_the_same() {
        let now = Utc::now();
        let unknown = login(&store(true), "nobody@clinic.com", "s3cret!", now).await.unwrap_err();
        let wrong = login(&store(true), "admin@clinic.com", "guess", now).await.unwrap_err();
        assert_eq!(clinic_error(unknown), ClinicError::InvalidCredentials);
        assert_eq!(clinic_error(wrong), ClinicError::InvalidCredentials);
    }

    #[tokio::test]
    async fn disabled_account_is_rejected() {
        let err = login(&store(false), "admin@clinic.com", "s3cret!", Utc::now()).await.unwrap_err();
        assert_eq!(clinic_error(err), ClinicError::InactiveAccount);
    }

    #[test]
    fn session_expires_after_idle_period_and_touch_extends_it() {
        let start = Utc::now();
        let user = store(true).0;
        let mut session = Session::new(&user, start);
        let idle = Duration::minutes(30);

        assert!(!session.is_expired(start + Duration::minutes(30), idle));
        assert!(session.is_expired(start + Duration::minutes(31), idle));

        session.touch(start + Duration::minutes(20));
        assert!(!session.is_expired(start + Duration::minutes(45), idle));
    }
}
