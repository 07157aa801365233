//! Text helpers shared by the egui views and the headless front end.

use chrono::{DateTime, Utc};

use crate::common::types::{CallSession, CallStatus, Listing, Message, User};

/// Delivery marker shown next to the viewer's own messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receipt {
    /// Incoming message; no marker.
    None,
    Sent,
    Read,
}

impl Receipt {
    pub fn symbol(&self) -> &'static str {
        match self {
            Receipt::None => "",
            Receipt::Sent => "✓",
            Receipt::Read => "✓✓",
        }
    }
}

/// Own messages count as read once anyone besides the sender has seen them.
pub fn receipt(message: &Message, viewer_id: &str) -> Receipt {
    if message.sender_id != viewer_id {
        Receipt::None
    } else if message.read_by.len() > 1 {
        Receipt::Read
    } else {
        Receipt::Sent
    }
}

pub fn format_call_duration(total_seconds: i64) -> String {
    let total_seconds = total_seconds.max(0);
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

pub fn call_status_text(call: &CallSession, now: DateTime<Utc>) -> String {
    match call.status {
        CallStatus::Ringing => "Calling...".to_string(),
        CallStatus::Connected => {
            let seconds = call.duration(now).map(|d| d.num_seconds()).unwrap_or(0);
            format_call_duration(seconds)
        }
        CallStatus::Ended => "Call ended".to_string(),
    }
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit}")
    } else {
        format!("{count} {unit}s")
    }
}

/// Coarse "time ago" wording for inbox rows and presence lines.
pub fn relative_time(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - timestamp).num_seconds();
    if seconds < 45 {
        return "less than a minute ago".to_string();
    }
    let minutes = (seconds + 30) / 60;
    if minutes < 45 {
        return format!("{} ago", plural(minutes, "minute"));
    }
    let hours = (minutes + 30) / 60;
    if hours < 24 {
        return format!("about {} ago", plural(hours, "hour"));
    }
    let days = (hours + 12) / 24;
    if days < 30 {
        return format!("{} ago", plural(days, "day"));
    }
    let months = (days + 15) / 30;
    if months < 12 {
        return format!("{} ago", plural(months, "month"));
    }
    format!("about {} ago", plural(months / 12, "year"))
}

pub fn clock_time(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%H:%M").to_string()
}

pub fn presence_line(user: &User, now: DateTime<Utc>) -> String {
    if user.is_online {
        return "Online".to_string();
    }
    match user.last_seen {
        Some(last_seen) => format!("Last seen {}", relative_time(last_seen, now)),
        None => "Offline".to_string(),
    }
}

pub fn price_line(listing: &Listing) -> String {
    match listing.rent_price {
        Some(rent) => format!("${:.2} · Rent ${:.2}", listing.price, rent),
        None => format!("${:.2}", listing.price),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::{CallKind, MessageKind};
    use chrono::Duration;

    #[test]
    fn receipts_depend_on_sender_and_readers() {
        let now = Utc::now();
        let mut own = Message::new("m1".into(), "c", "me", "hi", MessageKind::Text, now);
        assert_eq!(receipt(&own, "me"), Receipt::Sent);
        own.mark_read_by("them");
        assert_eq!(receipt(&own, "me"), Receipt::Read);

        let incoming = Message::new("m2".into(), "c", "them", "yo", MessageKind::Text, now);
        assert_eq!(receipt(&incoming, "me"), Receipt::None);
    }

    #[test]
    fn durations_are_zero_padded() {
        assert_eq!(format_call_duration(0), "00:00");
        assert_eq!(format_call_duration(75), "01:15");
        assert_eq!(format_call_duration(3_600), "60:00");
    }

    #[test]
    fn status_text_tracks_call_lifecycle() {
        let start = Utc::now();
        let mut call = CallSession {
            id: "call".into(),
            chat_id: "chat".into(),
            participants: Vec::new(),
            status: CallStatus::Ringing,
            kind: CallKind::Voice,
            start_time: None,
            end_time: None,
        };
        assert_eq!(call_status_text(&call, start), "Calling...");

        call.status = CallStatus::Connected;
        call.start_time = Some(start);
        assert_eq!(call_status_text(&call, start + Duration::seconds(62)), "01:02");

        call.status = CallStatus::Ended;
        assert_eq!(call_status_text(&call, start), "Call ended");
    }

    #[test]
    fn relative_time_buckets() {
        let now = Utc::now();
        assert_eq!(relative_time(now, now), "less than a minute ago");
        assert_eq!(relative_time(now - Duration::minutes(5), now), "5 minutes ago");
        assert_eq!(relative_time(now - Duration::hours(1), now), "about 1 hour ago");
        assert_eq!(relative_time(now - Duration::days(3), now), "3 days ago");
        assert_eq!(relative_time(now - Duration::days(400), now), "about 1 year ago");
    }

    #[test]
    fn presence_prefers_online_flag() {
        let now = Utc::now();
        let mut user = User {
            id: "u".into(),
            name: "Mike".into(),
            avatar: String::new(),
            is_online: true,
            last_seen: Some(now - Duration::minutes(10)),
        };
        assert_eq!(presence_line(&user, now), "Online");
        user.is_online = false;
        assert_eq!(presence_line(&user, now), "Last seen 10 minutes ago");
    }
}
