//! Static lists backing the simulated counterpart and the picker overlays.

use crate::common::types::{QuickReply, ReplyCategory};

/// Shown as "Other location..." in the meeting picker.
pub const CUSTOM_LOCATION: &str = "Custom location";

const CANNED_RESPONSES: [&str; 5] = [
    "Thanks for your message!",
    "Let me check and get back to you.",
    "Sounds good to me!",
    "When would be a good time to meet?",
    "I'll send you the details.",
];

const MEETING_LOCATIONS: [&str; 6] = [
    "Campus Library",
    "Student Center",
    "Coffee Shop on Main St",
    "University Bookstore",
    "Central Park",
    "Local Starbucks",
];

const QUICK_REPLIES: [(&str, &str, ReplyCategory); 8] = [
    ("1", "Hi! Is this still available?", ReplyCategory::Greeting),
    ("2", "What condition is the book in?", ReplyCategory::Question),
    ("3", "Can we meet at the campus library?", ReplyCategory::Meeting),
    ("4", "I'd like to book this!", ReplyCategory::Booking),
    ("5", "Is pickup available?", ReplyCategory::Question),
    ("6", "When are you free to meet?", ReplyCategory::Meeting),
    ("7", "Thanks for the quick response!", ReplyCategory::Greeting),
    ("8", "Can you hold it for me?", ReplyCategory::Booking),
];

const EMOJI_CATEGORIES: [(&str, &[&str]); 4] = [
    (
        "Smileys",
        &[
            "😀", "😃", "😄", "😁", "😆", "😅", "😂", "🤣", "😊", "😇", "🙂", "🙃", "😉", "😌",
            "😍", "🥰", "😘", "😗", "😙", "😚", "😋", "😛", "😝", "😜", "🤪", "🤨", "🧐", "🤓",
            "😎", "🤩", "🥳",
        ],
    ),
    (
        "Gestures",
        &[
            "👍", "👎", "👌", "🤌", "🤏", "✌️", "🤞", "🤟", "🤘", "🤙", "👈", "👉", "👆", "👇",
            "☝️", "👏", "🙌", "👐", "🤲", "🤝", "🙏",
        ],
    ),
    (
        "Objects",
        &[
            "📚", "📖", "📝", "✏️", "🖊️", "🖋️", "🖌️", "📄", "📃", "📑", "📊", "📈", "📉", "💰",
            "💵", "💴", "💶", "💷", "💳", "💎", "⚖️", "🔧", "🔨", "⚒️", "🛠️", "⛏️", "🔩",
        ],
    ),
    (
        "Hearts",
        &[
            "❤️", "🧡", "💛", "💚", "💙", "💜", "🖤", "🤍", "🤎", "💔", "❣️", "💕", "💞", "💓",
            "💗", "💖", "💘", "💝",
        ],
    ),
];

pub fn canned_responses() -> &'static [&'static str] {
    &CANNED_RESPONSES
}

pub fn meeting_locations() -> &'static [&'static str] {
    &MEETING_LOCATIONS
}

/// Message text sent when the viewer picks a meeting place.
pub fn meeting_suggestion(location: &str) -> String {
    format!("How about we meet at {location}?")
}

pub fn quick_replies() -> Vec<QuickReply> {
    QUICK_REPLIES
        .iter()
        .map(|(id, text, category)| QuickReply {
            id: id.to_string(),
            text: text.to_string(),
            category: *category,
        })
        .collect()
}

/// Categories in order of first appearance.
pub fn quick_reply_categories(replies: &[QuickReply]) -> Vec<ReplyCategory> {
    let mut categories = Vec::new();
    for reply in replies {
        if !categories.contains(&reply.category) {
            categories.push(reply.category);
        }
    }
    categories
}

pub fn emoji_categories() -> &'static [(&'static str, &'static [&'static str])] {
    &EMOJI_CATEGORIES
}
