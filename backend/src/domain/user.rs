//! User data model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An application user belonging to exactly one organization.
///
/// ## Invariants
/// - `email` is syntactically valid and globally unique among live rows.
/// - `organization_id` referenced a live organization at creation time.
///   The reference is not re-verified on reads or on later updates.
/// - `password_hash` is an Argon2id PHC string, never plaintext, and is
///   excluded from serialization so it cannot leak into responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub organization_id: Uuid,
    pub is_admin: bool,
    pub phone_number: Option<String>,
    pub social_media: Option<String>,
    pub description: Option<String>,
    pub avatar_url: Option<String>,
    pub research_categories: Vec<String>,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Merge a partial update onto this entity.
    ///
    /// Only supplied fields overwrite existing values. The password is
    /// handled by the service layer (it must be re-hashed) and is therefore
    /// not part of this merge. A changed `organization_id` is applied
    /// without re-validating the reference.
    pub fn apply(&mut self, update: UserUpdate) {
        let UserUpdate {
            email,
            name,
            organization_id,
            is_admin,
            phone_number,
            social_media,
            description,
            avatar_url,
            research_categories,
            password: _,
        } = update;
        if let Some(email) = email {
            self.email = email;
        }
        if let Some(name) = name {
            self.name = name;
        }
        if let Some(organization_id) = organization_id {
            self.organization_id = organization_id;
        }
        if let Some(is_admin) = is_admin {
            self.is_admin = is_admin;
        }
        if let Some(phone_number) = phone_number {
            self.phone_number = Some(phone_number);
        }
        if let Some(social_media) = social_media {
            self.social_media = Some(social_media);
        }
        if let Some(description) = description {
            self.description = Some(description);
        }
        if let Some(avatar_url) = avatar_url {
            self.avatar_url = Some(avatar_url);
        }
        if let Some(research_categories) = research_categories {
            self.research_categories = research_categories;
        }
    }
}

/// Fields required to create a new user.
///
/// `password` is plaintext here; the service hashes it before anything is
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub organization_id: Uuid,
    pub password: String,
    pub is_admin: bool,
    pub phone_number: Option<String>,
    pub social_media: Option<String>,
    pub description: Option<String>,
    pub avatar_url: Option<String>,
    pub research_categories: Vec<String>,
}

/// Insert record handed to the persistence layer.
///
/// Identical to [`NewUser`] except the credential is already hashed, so
/// plaintext never crosses the repository boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserRecord {
    pub email: String,
    pub name: String,
    pub organization_id: Uuid,
    pub password_hash: String,
    pub is_admin: bool,
    pub phone_number: Option<String>,
    pub social_media: Option<String>,
    pub description: Option<String>,
    pub avatar_url: Option<String>,
    pub research_categories: Vec<String>,
}

impl NewUserRecord {
    /// Pair a validated create request with its freshly computed hash.
    pub fn from_new_user(new: NewUser, password_hash: String) -> Self {
        let NewUser {
            email,
            name,
            organization_id,
            password: _,
            is_admin,
            phone_number,
            social_media,
            description,
            avatar_url,
            research_categories,
        } = new;
        Self {
            email,
            name,
            organization_id,
            password_hash,
            is_admin,
            phone_number,
            social_media,
            description,
            avatar_url,
            research_categories,
        }
    }
}

/// Fields that can be updated on an existing user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub name: Option<String>,
    pub organization_id: Option<Uuid>,
    pub password: Option<String>,
    pub is_admin: Option<bool>,
    pub phone_number: Option<String>,
    pub social_media: Option<String>,
    pub description: Option<String>,
    pub avatar_url: Option<String>,
    pub research_categories: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            email: "a@example.com".into(),
            name: "Ada".into(),
            organization_id: Uuid::new_v4(),
            is_admin: false,
            phone_number: Some("+15551234567".into()),
            social_media: None,
            description: None,
            avatar_url: None,
            research_categories: vec!["geology".into()],
            password_hash: "$argon2id$stub".into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn apply_merges_only_supplied_fields() {
        let mut u = user();
        let before = u.clone();

        u.apply(UserUpdate {
            name: Some("Ada Lovelace".into()),
            ..UserUpdate::default()
        });

        assert_eq!(u.name, "Ada Lovelace");
        assert_eq!(u.email, before.email);
        assert_eq!(u.organization_id, before.organization_id);
        assert_eq!(u.phone_number, before.phone_number);
        assert_eq!(u.research_categories, before.research_categories);
        assert_eq!(u.password_hash, before.password_hash);
    }

    #[test]
    fn apply_does_not_touch_password_hash() {
        let mut u = user();

        u.apply(UserUpdate {
            password: Some("new-secret".into()),
            ..UserUpdate::default()
        });

        assert_eq!(u.password_hash, "$argon2id$stub");
    }

    #[test]
    fn password_hash_never_serializes() {
        let value = serde_json::to_value(user()).expect("serialize user");
        assert!(value.get("password_hash").is_none());
        assert!(value.get("password").is_none());
    }
}
