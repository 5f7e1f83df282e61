// Evolution Client: Message Group Filter
// is_group_message, filter_group_messages, group_messages
//
// findMessages matches `key.remoteJid` loosely on the server side, so the
// results are narrowed here by the group id carried in the sender-key
// distribution payload. This is a heuristic, not a membership proof: content
// kinds that carry no such payload (plain text, media…) are always dropped,
// even when they were posted in the target group.

use crate::atoms::types::{Message, MessageKind};

/// True when the message carries a sender-key distribution payload whose
/// group id equals `group_id` exactly (case-sensitive).
pub fn is_group_message(message: &Message, group_id: &str) -> bool {
    let Some(content) = message.message.as_ref() else {
        return false;
    };
    content.kinds().any(|kind| match kind {
        MessageKind::SenderKeyDistribution(skdm) => skdm.group_id.as_deref() == Some(group_id),
        MessageKind::ExtendedText(_) | MessageKind::Other(_) => false,
    })
}

/// Keep the messages that belong to `group_id`, preserving input order.
pub fn filter_group_messages(messages: Vec<Message>, group_id: &str) -> Vec<Message> {
    messages
        .into_iter()
        .filter(|m| is_group_message(m, group_id))
        .collect()
}

/// Borrowing variant of [`filter_group_messages`].
pub fn group_messages<'a>(
    messages: &'a [Message],
    group_id: &'a str,
) -> impl Iterator<Item = &'a Message> + 'a {
    messages.iter().filter(move |m| is_group_message(m, group_id))
}
