/// Friend requests keyed by the deterministic `senderId_recipientId` id
use serde::{Deserialize, Serialize};

use super::validation::{optional_text, ValidationErrors};

/// POST /users/friend-request body
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequestInput {
    /// Defaults to the authenticated caller when omitted
    pub sender_id: Option<String>,
    pub recipient_id: Option<String>,
}

/// Friend request lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendRequestStatus {
    Pending,
}

/// Stored friend request document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequest {
    pub id: String,
    pub sender_id: String,
    pub recipient_id: String,
    pub status: FriendRequestStatus,
    pub created_at: String,
}

impl FriendRequest {
    /// Build the document id for a sender/recipient pair
    ///
    /// The same pair always maps to the same id, so repeating a request
    /// overwrites the existing document instead of adding a second one.
    pub fn key(sender_id: &str, recipient_id: &str) -> String {
        format!("{}_{}", sender_id, recipient_id)
    }

    pub fn pending(sender_id: String, recipient_id: String, created_at: String) -> Self {
        Self {
            id: Self::key(&sender_id, &recipient_id),
            sender_id,
            recipient_id,
            status: FriendRequestStatus::Pending,
            created_at,
        }
    }
}

/// Validated sender/recipient pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FriendRequestParties {
    pub sender_id: String,
    pub recipient_id: String,
}

impl FriendRequestInput {
    /// Resolve the sender against the caller and check the recipient
    ///
    /// Whether the caller may send on behalf of `sender_id` is decided by the
    /// HTTP layer; this only fills the default and rejects self-requests.
    pub fn validate(self, caller_id: &str) -> Result<FriendRequestParties, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let sender_id = optional_text(self.sender_id).unwrap_or_else(|| caller_id.to_string());
        let recipient_id = errors.require_text("recipientId", self.recipient_id);

        if let Some(recipient_id) = &recipient_id {
            if *recipient_id == sender_id {
                errors.push("recipientId", "cannot send a friend request to yourself");
            }
        }

        match recipient_id {
            Some(recipient_id) if errors.is_empty() => Ok(FriendRequestParties {
                sender_id,
                recipient_id,
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_sender_underscore_recipient() {
        assert_eq!(FriendRequest::key("A", "B"), "A_B");
    }

    #[test]
    fn test_pending_builds_keyed_document() {
        let request = FriendRequest::pending(
            "A".to_string(),
            "B".to_string(),
            "2024-01-01T00:00:00.000Z".to_string(),
        );

        assert_eq!(request.id, "A_B");
        assert_eq!(request.status, FriendRequestStatus::Pending);

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["status"], "pending");
        assert_eq!(json["senderId"], "A");
        assert_eq!(json["recipientId"], "B");
    }

    #[test]
    fn test_sender_defaults_to_caller() {
        let input = FriendRequestInput {
            sender_id: None,
            recipient_id: Some("B".to_string()),
        };

        let parties = input.validate("A").unwrap();
        assert_eq!(parties.sender_id, "A");
        assert_eq!(parties.recipient_id, "B");
    }

    #[test]
    fn test_explicit_sender_is_kept() {
        let input = FriendRequestInput {
            sender_id: Some("X".to_string()),
            recipient_id: Some("B".to_string()),
        };

        assert_eq!(input.validate("A").unwrap().sender_id, "X");
    }

    #[test]
    fn test_missing_recipient_is_rejected() {
        let errors = FriendRequestInput::default().validate("A").unwrap_err();
        assert_eq!(errors.errors()[0].field, "recipientId");
    }

    #[test]
    fn test_self_request_is_rejected() {
        let input = FriendRequestInput {
            sender_id: None,
            recipient_id: Some("A".to_string()),
        };

        let errors = input.validate("A").unwrap_err();
        assert_eq!(errors.errors().len(), 1);
        assert_eq!(errors.errors()[0].message, "cannot send a friend request to yourself");
    }
}
