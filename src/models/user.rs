use serde::{Deserialize, Deserializer, Serialize};

/// Account status shown on the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Inactive,
    Pending,
    Blacklisted,
    /// Any status value the backend sends that we don't know about
    #[default]
    #[serde(other)]
    Unknown,
}

impl UserStatus {
    pub fn label(&self) -> &'static str {
        match self {
            UserStatus::Active => "Active",
            UserStatus::Inactive => "Inactive",
            UserStatus::Pending => "Pending",
            UserStatus::Blacklisted => "Blacklisted",
            UserStatus::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A user record as returned by the users endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Backends disagree on whether this is a string or a number
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub org_name: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    /// Join date as sent by the backend, kept verbatim
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub status: UserStatus,
}

impl User {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            org_name: None,
            user_name: None,
            email: None,
            phone_number: None,
            created_at: None,
            status: UserStatus::Unknown,
        }
    }

    /// Name to show in listings, falling back to the id
    pub fn display_name(&self) -> &str {
        self.user_name.as_deref().unwrap_or(&self.id)
    }
}

/// Find a user by id in a fetched dataset
pub fn find_user<'a>(users: &'a [User], id: &str) -> Option<&'a User> {
    let id = id.trim();
    users.iter().find(|u| u.id == id)
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Int(n) => n.to_string(),
        Id::Float(n) => n.to_string(),
    })
}
