use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use bson::oid::ObjectId;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::task;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::Role;

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id as hex; optional so a token without it is rejected as 401
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub role: Role,
    pub exp: i64, // expiration timestamp
    pub iat: i64, // issued at timestamp
}

pub struct AuthService;

impl AuthService {
    fn hasher(config: &Config) -> AppResult<Argon2<'static>> {
        let params = Params::new(
            Params::DEFAULT_M_COST,
            config.password_hash_cost,
            Params::DEFAULT_P_COST,
            None,
        )
        .map_err(|e| AppError::Internal(format!("Invalid hashing parameters: {}", e)))?;

        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    /// Hash a password using Argon2 with the configured time cost. Runs on the
    /// blocking pool.
    pub async fn hash_password(password: &str, config: &Config) -> AppResult<String> {
        let hasher = Self::hasher(config)?;
        let password = password.to_owned();

        task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            let hash = hasher
                .hash_password(password.as_bytes(), &salt)
                .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;
            Ok::<_, AppError>(hash.to_string())
        })
        .await
        .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
    }

    /// Verify a password against a hash. The cost is read from the hash itself.
    pub async fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
        let password = password.to_owned();
        let hash = hash.to_owned();

        task::spawn_blocking(move || {
            let parsed_hash = PasswordHash::new(&hash)
                .map_err(|e| AppError::Internal(format!("Invalid password hash: {}", e)))?;

            Ok::<_, AppError>(Argon2::default()
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok())
        })
        .await
        .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))?
    }

    /// Generate a JWT token for a user
    pub fn generate_token(user_id: ObjectId, role: Role, config: &Config) -> AppResult<String> {
        let secret = config.signing_secret()?;
        let now = OffsetDateTime::now_utc();
        let exp = now + config.jwt_expires_in;

        let claims = Claims {
            sub: Some(user_id.to_hex()),
            role,
            exp: exp.unix_timestamp(),
            iat: now.unix_timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;

        Ok(token)
    }

    /// Verify and decode a JWT token
    pub fn verify_token(token: &str, config: &Config) -> AppResult<Claims> {
        let secret = config.signing_secret()?;
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogFormat;
    use time::Duration;

    fn config(secret: Option<&str>) -> Config {
        Config {
            mongodb_url: String::new(),
            mongodb_database: String::new(),
            jwt_secret: secret.map(str::to_string),
            jwt_expires_in: Duration::days(7),
            password_hash_cost: 1,
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origin: String::new(),
            log_format: LogFormat::Pretty,
        }
    }

    #[tokio::test]
    async fn test_password_round_trip() {
        let config = config(Some("secret"));
        let hash = AuthService::hash_password("secret1", &config).await.unwrap();

        assert_ne!(hash, "secret1");
        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("t=1"));
        assert!(AuthService::verify_password("secret1", &hash).await.unwrap());
        assert!(!AuthService::verify_password("secret2", &hash).await.unwrap());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_hashing_leaves_runtime_free() {
        let config = Config {
            password_hash_cost: 10,
            ..config(Some("secret"))
        };
        let ticks = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = ticks.clone();
        let ticker = tokio::spawn(async move {
            loop {
                counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                tokio::task::yield_now().await;
            }
        });

        let hash = AuthService::hash_password("secret1", &config).await.unwrap();
        assert!(AuthService::verify_password("secret1", &hash).await.unwrap());
        ticker.abort();

        // The single runtime thread kept polling other tasks while hashing
        assert!(ticks.load(std::sync::atomic::Ordering::SeqCst) > 1);
    }

    #[tokio::test]
    async fn test_malformed_hash_is_internal_error() {
        let err = AuthService::verify_password("secret1", "not-a-hash")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[test]
    fn test_token_carries_user_and_role() {
        let config = config(Some("test-secret"));
        let id = ObjectId::new();

        let token = AuthService::generate_token(id, Role::Admin, &config).unwrap();
        let claims = AuthService::verify_token(&token, &config).unwrap();

        assert_eq!(claims.sub, Some(id.to_hex()));
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.exp - claims.iat, Duration::days(7).whole_seconds());
    }

    #[test]
    fn test_wrong_secret_is_unauthorized() {
        let token =
            AuthService::generate_token(ObjectId::new(), Role::User, &config(Some("one")))
                .unwrap();
        let err = AuthService::verify_token(&token, &config(Some("two"))).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[test]
    fn test_expired_token_is_unauthorized() {
        let config = config(Some("test-secret"));
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub: Some(ObjectId::new().to_hex()),
            role: Role::User,
            exp: (now - Duration::hours(1)).unix_timestamp(),
            iat: (now - Duration::hours(2)).unix_timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert!(matches!(
            AuthService::verify_token(&token, &config),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn test_missing_secret_is_config_error() {
        let err = AuthService::generate_token(ObjectId::new(), Role::User, &config(None))
            .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
