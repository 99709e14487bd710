use serde::{Deserialize, Serialize};

/// A registered user, as stored in the `users` table. The id is assigned by
/// PostgreSQL (`SERIAL`) on insert and never reused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub name: String,
}

/// Payload accepted by the create-user endpoint. `name` is optional at the
/// serde level so that an absent field and an empty string fail validation
/// the same way (400) instead of being rejected by the JSON extractor.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub name: Option<String>,
}

impl CreateUserRequest {
    /// Trims the submitted name and collapses absent, empty, and
    /// whitespace-only values to `None`.
    pub fn normalized_name(&self) -> Option<String> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    }
}
