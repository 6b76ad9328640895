//! Sender role checks based on message tags.

use tmi_proto::ChatMessage;

/// Sender owns the channel: non-empty `user-id` equal to `room-id`.
pub fn sent_by_broadcaster(msg: &ChatMessage) -> bool {
    match (msg.tag("user-id"), msg.tag("room-id")) {
        (Some(user), Some(room)) => !user.is_empty() && user == room,
        _ => false,
    }
}

/// Sender is a channel moderator.
pub fn sent_by_mod(msg: &ChatMessage) -> bool {
    msg.tag("mod") == Some("1") || msg.tag("user-type") == Some("mod")
}

pub fn sent_by_admin(msg: &ChatMessage) -> bool {
    sent_by_broadcaster(msg) || sent_by_mod(msg)
}
