//! Worker data model — workers, profiles, and position lookups.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Avatar image reference assigned to freshly provisioned profiles.
pub const DEFAULT_AVATAR: &str = "default.jpg";

/// Allowed username shape: word characters plus `.@+-`, 3-150 chars.
static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.@+-]{3,150}$").expect("static regex compiles"));

/// An authenticated principal in the system.
///
/// The password hash lives only in the store, never on this struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Worker {
    /// Unique ID.
    pub id: Uuid,
    /// Login name, unique across workers.
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    /// Position reference (if any).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Worker {
    /// Create a new worker record.
    pub fn new(username: impl Into<String>, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            position_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Builder: set position.
    pub fn with_position(mut self, position_id: Uuid) -> Self {
        self.position_id = Some(position_id);
        self
    }
}

/// Auxiliary per-worker record, created automatically at sign-up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Unique ID.
    pub id: Uuid,
    /// Owning worker. Exactly one profile exists per worker.
    pub worker_id: Uuid,
    /// Avatar image reference.
    pub avatar: String,
    pub bio: String,
    pub phone: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Create a default profile owned by the given worker.
    pub fn new_default(worker_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            worker_id,
            avatar: DEFAULT_AVATAR.to_string(),
            bio: String::new(),
            phone: String::new(),
            address: String::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A labeled job position referenced by workers (e.g. "Developer").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub id: Uuid,
    pub name: String,
}

/// Sign-up payload.
#[derive(Debug, Deserialize)]
pub struct NewWorker {
    pub username: String,
    pub password: SecretString,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub position_id: Option<Uuid>,
}

impl NewWorker {
    /// Validate the payload and build a `Worker`.
    pub fn into_worker(self) -> Result<(Worker, SecretString), ValidationError> {
        if !USERNAME_RE.is_match(&self.username) {
            return Err(ValidationError::field(
                "username",
                "must be 3-150 characters of letters, digits, or .@+-_",
            ));
        }
        if self.password.expose_secret().len() < 8 {
            return Err(ValidationError::field(
                "password",
                "must be at least 8 characters",
            ));
        }

        let mut worker = Worker::new(self.username, self.first_name, self.last_name);
        worker.position_id = self.position_id;
        Ok((worker, self.password))
    }
}

/// Login payload.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

/// Partial payload for a worker updating their own record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkerUpdate {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub position_id: Option<Uuid>,
}

impl WorkerUpdate {
    /// Apply this update to an existing worker.
    pub fn apply_to(&self, worker: &mut Worker) {
        if let Some(ref first_name) = self.first_name {
            worker.first_name = first_name.clone();
        }
        if let Some(ref last_name) = self.last_name {
            worker.last_name = last_name.clone();
        }
        if let Some(position_id) = self.position_id {
            worker.position_id = Some(position_id);
        }
        worker.updated_at = Utc::now();
    }
}

/// Partial payload for updating a profile. Absent fields are unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl ProfileUpdate {
    /// Apply this update to an existing profile.
    pub fn apply_to(&self, profile: &mut Profile) {
        if let Some(ref avatar) = self.avatar {
            profile.avatar = avatar.clone();
        }
        if let Some(ref bio) = self.bio {
            profile.bio = bio.clone();
        }
        if let Some(ref phone) = self.phone {
            profile.phone = phone.clone();
        }
        if let Some(ref address) = self.address {
            profile.address = address.clone();
        }
        profile.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_worker(username: &str, password: &str) -> NewWorker {
        NewWorker {
            username: username.into(),
            password: SecretString::from(password),
            first_name: "Test".into(),
            last_name: "Worker".into(),
            position_id: None,
        }
    }

    #[test]
    fn valid_signup_builds_worker() {
        let (worker, _) = new_worker("alice", "hunter2hunter2").into_worker().unwrap();
        assert_eq!(worker.username, "alice");
        assert!(worker.position_id.is_none());
    }

    #[test]
    fn short_username_rejected() {
        assert!(new_worker("ab", "hunter2hunter2").into_worker().is_err());
    }

    #[test]
    fn username_with_spaces_rejected() {
        assert!(new_worker("ali ce", "hunter2hunter2").into_worker().is_err());
    }

    #[test]
    fn email_style_username_accepted() {
        assert!(new_worker("alice@example.com", "hunter2hunter2").into_worker().is_ok());
    }

    #[test]
    fn short_password_rejected() {
        assert!(new_worker("alice", "short").into_worker().is_err());
    }

    #[test]
    fn default_profile_fields() {
        let worker_id = Uuid::new_v4();
        let profile = Profile::new_default(worker_id);
        assert_eq!(profile.worker_id, worker_id);
        assert_eq!(profile.avatar, DEFAULT_AVATAR);
        assert!(profile.bio.is_empty());
        assert!(profile.phone.is_empty());
    }

    #[test]
    fn profile_update_applies_only_present_fields() {
        let mut profile = Profile::new_default(Uuid::new_v4());
        let update = ProfileUpdate {
            bio: Some("Rustacean".into()),
            phone: Some("+1-555-0100".into()),
            ..Default::default()
        };
        update.apply_to(&mut profile);
        assert_eq!(profile.bio, "Rustacean");
        assert_eq!(profile.phone, "+1-555-0100");
        assert_eq!(profile.avatar, DEFAULT_AVATAR);
    }

    #[test]
    fn worker_serialization_has_no_password() {
        let worker = Worker::new("alice", "Alice", "Smith");
        let json = serde_json::to_string(&worker).unwrap();
        assert!(!json.contains("password"));
    }
}
