pub mod commands;
pub mod events;
pub mod types;

pub use commands::ChatCommand;
pub use events::{ChatEvent, ChatSnapshot, Notification};
pub use types::{
    CallKind, CallSession, CallStatus, Chat, ChatId, ChatTheme, Message, MessageId, MessageKind,
    TypingIndicator, User, UserId,
};
