//! PIN gate for mutating register commands.
//!
//! The PIN is stored as an Argon2 PHC string in settings. Failed attempts
//! and the lockout deadline are stored there too, so restarting the
//! register does not reset a lockout.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use stockpoint_core::validation::validate_pin;
use stockpoint_db::{setting_keys as keys, SettingsRepository};
use tracing::{info, warn};

use crate::error::{AppError, AppResult, ErrorCode};

/// Longest lockout the register accepts, one day.
pub const MAX_LOCKOUT_SECS: i64 = 24 * 60 * 60;

/// Current lockout state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum LockoutStatus {
    #[serde(rename_all = "camelCase")]
    Unlocked { failed_attempts: i64, remaining_attempts: i64 },
    #[serde(rename_all = "camelCase")]
    Locked { until: DateTime<Utc> },
}

/// Verifies operator PINs and enforces lockout.
#[derive(Debug, Clone)]
pub struct PinGate {
    settings: SettingsRepository,
    max_attempts: i64,
    lockout: Duration,
}

impl PinGate {
    pub fn new(settings: SettingsRepository, max_attempts: i64, lockout_secs: i64) -> Self {
        PinGate {
            settings,
            max_attempts: max_attempts.max(1),
            lockout: Duration::seconds(lockout_secs.clamp(0, MAX_LOCKOUT_SECS)),
        }
    }

    /// Whether a PIN has been set.
    pub async fn is_configured(&self) -> AppResult<bool> {
        Ok(self.settings.get(keys::PIN_HASH).await?.is_some())
    }

    /// Stores a new PIN and clears any failed attempts or lockout.
    pub async fn set_pin(&self, pin: &str) -> AppResult<()> {
        validate_pin(pin)?;
        let hash = hash_pin(pin)?;

        self.settings.set(keys::PIN_HASH, &hash).await?;
        self.reset().await?;

        info!("PIN updated");
        Ok(())
    }

    /// Checks `pin` against the stored hash.
    ///
    /// Returns `false` for a wrong PIN, a missing PIN, or while locked out.
    /// A wrong PIN counts toward lockout; a correct one resets the count.
    pub async fn verify(&self, pin: &str) -> AppResult<bool> {
        if let LockoutStatus::Locked { until } = self.lockout_status().await? {
            warn!(until = %until, "PIN attempt while locked out");
            return Ok(false);
        }

        let Some(hash) = self.settings.get(keys::PIN_HASH).await? else {
            return Ok(false);
        };

        if verify_hash(pin, &hash) {
            self.reset().await?;
            return Ok(true);
        }

        let failed = self.settings.increment_counter(keys::PIN_FAILED_ATTEMPTS).await?;
        warn!(failed_attempts = failed, max = self.max_attempts, "Wrong PIN");

        if failed >= self.max_attempts {
            let until = Utc::now() + self.lockout;
            self.settings
                .set(keys::PIN_LOCKED_UNTIL, &until.to_rfc3339())
                .await?;
            self.settings.remove(keys::PIN_FAILED_ATTEMPTS).await?;
            warn!(until = %until, "Too many wrong PINs, register locked");
        }

        Ok(false)
    }

    /// Fails unless `pin` is given and correct.
    pub async fn require(&self, pin: Option<&str>) -> AppResult<()> {
        if !self.is_configured().await? {
            return Err(AppError::unauthorized("No PIN set; run `pin set` first"));
        }

        if let LockoutStatus::Locked { until } = self.lockout_status().await? {
            return Err(AppError::new(
                ErrorCode::LockedOut,
                format!("Too many wrong PINs; locked until {}", until.to_rfc3339()),
            ));
        }

        let pin = pin.ok_or_else(|| AppError::unauthorized("PIN required (--pin)"))?;
        if self.verify(pin).await? {
            Ok(())
        } else {
            Err(AppError::unauthorized("Wrong PIN"))
        }
    }

    /// Reads the lockout state, clearing an expired lockout.
    pub async fn lockout_status(&self) -> AppResult<LockoutStatus> {
        if let Some(raw) = self.settings.get(keys::PIN_LOCKED_UNTIL).await? {
            match DateTime::parse_from_rfc3339(&raw) {
                Ok(until) if until.with_timezone(&Utc) > Utc::now() => {
                    return Ok(LockoutStatus::Locked {
                        until: until.with_timezone(&Utc),
                    });
                }
                Ok(_) => {
                    self.settings.remove(keys::PIN_LOCKED_UNTIL).await?;
                }
                Err(e) => {
                    warn!(error = %e, "Unreadable lockout deadline, clearing it");
                    self.settings.remove(keys::PIN_LOCKED_UNTIL).await?;
                }
            }
        }

        let failed = self
            .settings
            .get_i64(keys::PIN_FAILED_ATTEMPTS)
            .await?
            .unwrap_or(0);

        Ok(LockoutStatus::Unlocked {
            failed_attempts: failed,
            remaining_attempts: (self.max_attempts - failed).max(0),
        })
    }

    async fn reset(&self) -> AppResult<()> {
        self.settings.remove(keys::PIN_FAILED_ATTEMPTS).await?;
        self.settings.remove(keys::PIN_LOCKED_UNTIL).await?;
        Ok(())
    }
}

fn hash_pin(pin: &str) -> AppResult<String> {
    use argon2::{
        password_hash::{rand_core::OsRng, SaltString},
        Argon2, PasswordHasher,
    };

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(pin.as_bytes(), &salt)
        .map_err(|e| AppError::internal(format!("Failed to hash PIN: {}", e)))?;

    Ok(hash.to_string())
}

fn verify_hash(pin: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};

    let parsed = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(pin.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockpoint_db::{Database, DbConfig};

    async fn gate(max_attempts: i64, lockout_secs: i64) -> PinGate {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        PinGate::new(db.settings(), max_attempts, lockout_secs)
    }

    #[tokio::test]
    async fn test_set_and_verify() {
        let gate = gate(3, 300).await;
        assert!(!gate.is_configured().await.unwrap());
        assert!(!gate.verify("1234").await.unwrap());

        gate.set_pin("1234").await.unwrap();
        assert!(gate.is_configured().await.unwrap());
        assert!(gate.verify("1234").await.unwrap());
        assert!(!gate.verify("4321").await.unwrap());
    }

    #[tokio::test]
    async fn test_hash_is_not_the_pin() {
        let gate = gate(3, 300).await;
        gate.set_pin("246810").await.unwrap();

        let stored = gate.settings.get(keys::PIN_HASH).await.unwrap().unwrap();
        assert!(stored.starts_with("$argon2"));
        assert!(!stored.contains("246810"));
    }

    #[tokio::test]
    async fn test_rejects_malformed_pin() {
        let gate = gate(3, 300).await;
        let err = gate.set_pin("12a4").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(gate.set_pin("123").await.is_err());
    }

    #[tokio::test]
    async fn test_lockout_after_max_attempts() {
        let gate = gate(3, 300).await;
        gate.set_pin("1234").await.unwrap();

        assert!(!gate.verify("0000").await.unwrap());
        assert_eq!(
            gate.lockout_status().await.unwrap(),
            LockoutStatus::Unlocked {
                failed_attempts: 1,
                remaining_attempts: 2
            }
        );

        assert!(!gate.verify("0000").await.unwrap());
        assert!(!gate.verify("0000").await.unwrap());
        assert!(matches!(
            gate.lockout_status().await.unwrap(),
            LockoutStatus::Locked { .. }
        ));

        // Correct PIN is refused while locked.
        assert!(!gate.verify("1234").await.unwrap());
        let err = gate.require(Some("1234")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::LockedOut);
    }

    #[tokio::test]
    async fn test_oversized_lockout_is_capped() {
        let gate = gate(1, i64::MAX).await;
        assert_eq!(gate.lockout, Duration::seconds(MAX_LOCKOUT_SECS));

        gate.set_pin("1234").await.unwrap();
        assert!(!gate.verify("9999").await.unwrap());

        let LockoutStatus::Locked { until } = gate.lockout_status().await.unwrap() else {
            panic!("expected lockout");
        };
        assert!(until <= Utc::now() + Duration::seconds(MAX_LOCKOUT_SECS));
    }

    #[tokio::test]
    async fn test_lockout_expires() {
        let gate = gate(1, 0).await;
        gate.set_pin("1234").await.unwrap();

        assert!(!gate.verify("9999").await.unwrap());
        assert!(gate.verify("1234").await.unwrap());
        assert_eq!(
            gate.lockout_status().await.unwrap(),
            LockoutStatus::Unlocked {
                failed_attempts: 0,
                remaining_attempts: 1
            }
        );
    }

    #[tokio::test]
    async fn test_success_resets_failures() {
        let gate = gate(3, 300).await;
        gate.set_pin("1234").await.unwrap();

        assert!(!gate.verify("0000").await.unwrap());
        assert!(!gate.verify("0000").await.unwrap());
        assert!(gate.verify("1234").await.unwrap());
        assert!(!gate.verify("0000").await.unwrap());

        assert_eq!(
            gate.lockout_status().await.unwrap(),
            LockoutStatus::Unlocked {
                failed_attempts: 1,
                remaining_attempts: 2
            }
        );
    }

    #[tokio::test]
    async fn test_require() {
        let gate = gate(3, 300).await;
        assert_eq!(
            gate.require(Some("1234")).await.unwrap_err().code,
            ErrorCode::Unauthorized
        );

        gate.set_pin("1234").await.unwrap();
        assert_eq!(gate.require(None).await.unwrap_err().code, ErrorCode::Unauthorized);
        assert_eq!(
            gate.require(Some("1111")).await.unwrap_err().code,
            ErrorCode::Unauthorized
        );
        gate.require(Some("1234")).await.unwrap();
    }
}
