//! Error types for the chat engine and its front ends.

use thiserror::Error;

use crate::common::types::{CallId, ChatId, MessageId, UserId};

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum ChatError {
    /// No chat with this id exists
    #[error("chat not found: {0}")]
    UnknownChat(ChatId),

    /// The chat exists but holds no such message
    #[error("message {message_id} not found in chat {chat_id}")]
    UnknownMessage {
        chat_id: ChatId,
        message_id: MessageId,
    },

    /// User id not present in the seed
    #[error("user not found: {0}")]
    UnknownUser(UserId),

    /// Chat has nobody to call or reply
    #[error("chat {0} has no counterpart participant")]
    NoCounterpart(ChatId),

    /// Another call is still ringing or connected
    #[error("a call is already in progress: {0}")]
    CallInProgress(CallId),

    /// Nothing to hang up
    #[error("no active call")]
    NoActiveCall,

    /// Rejected user input (blank message, unknown theme, ...)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Seed data violates a model invariant
    #[error("invalid seed data: {0}")]
    InvalidSeed(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// The engine task is gone
    #[error("chat engine is not running")]
    EngineClosed,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using the crate error.
pub type Result<T> = std::result::Result<T, ChatError>;
