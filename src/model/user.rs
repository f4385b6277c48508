use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Super,
    #[serde(alias = "OPS")]
    Ops,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Super => "super",
            Role::Ops => "ops",
        }
    }
}

/// Registered user. `password` holds the Argon2 PHC string, never the plaintext.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub fullname: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_accepts_legacy_uppercase_ops() {
        let role: Role = serde_json::from_str("\"OPS\"").unwrap();
        assert_eq!(role, Role::Ops);
        assert_eq!(serde_json::to_string(&role).unwrap(), "\"ops\"");
    }
}
