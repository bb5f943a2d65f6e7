//! Domain DTOs for the Crisp REST API.
//!
//! # Design
//! Only the shapes the client itself reasons about are typed here: the
//! conversation state enum, the authentication tier, the response envelope
//! and a handful of response payloads. Request bodies the service defines
//! freely (messages, meta updates, routing assigns) travel as
//! `serde_json::Value` and are forwarded verbatim.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;

/// Lifecycle state of a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationState {
    Resolved,
    Unresolved,
    Pending,
}

impl ConversationState {
    pub const ALL: [ConversationState; 3] = [
        ConversationState::Resolved,
        ConversationState::Unresolved,
        ConversationState::Pending,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ConversationState::Resolved => "resolved",
            ConversationState::Unresolved => "unresolved",
            ConversationState::Pending => "pending",
        }
    }
}

impl fmt::Display for ConversationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConversationState {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| {
                ApiError::InvalidArgument(format!("conversation state '{s}' is not valid"))
            })
    }
}

/// Authentication tier sent along with every request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[default]
    User,
    Website,
    Plugin,
}

impl Tier {
    pub fn as_str(self) -> &'static str {
        match self {
            Tier::User => "user",
            Tier::Website => "website",
            Tier::Plugin => "plugin",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Tier::User),
            "website" => Ok(Tier::Website),
            "plugin" => Ok(Tier::Plugin),
            other => Err(ApiError::InvalidArgument(format!("tier '{other}' is not valid"))),
        }
    }
}

/// Wrapper the service puts around every response payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub error: bool,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub data: T,
}

/// Payload returned when a conversation is created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewConversation {
    pub session_id: String,
}

/// Payload returned when a message is sent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageReceipt {
    pub fingerprint: u64,
}

/// A conversation as returned by `get_one` and the list endpoints.
///
/// Fields beyond identifiers are optional on the wire; unknown fields are
/// ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Conversation {
    pub session_id: String,
    pub website_id: String,
    #[serde(default)]
    pub state: Option<ConversationState>,
    #[serde(default)]
    pub is_blocked: bool,
    #[serde(default)]
    pub meta: Value,
}

/// A single message inside a conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationMessage {
    pub fingerprint: u64,
    pub from: String,
    pub origin: String,
    #[serde(default)]
    pub content: Value,
    pub timestamp: u64,
}
