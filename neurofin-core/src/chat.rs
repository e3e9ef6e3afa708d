//! In-memory chat session: an append-only message log with monotonic ids.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::briefing::Briefing;
use crate::router::{ChartKind, Reply};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "msg-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub sender: Sender,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart: Option<ChartKind>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chips: Vec<String>,
}

pub const WELCOME: &str = "Hi! I'm your NeuroFin AI Coach.\n\n\
I can help you:\n\
- Analyze spending patterns\n\
- Find saving opportunities\n\
- Track your financial goals\n\
- Give personalized tips\n\n\
What would you like to know?";

/// Message log for one session. Ids are assigned at append time from a
/// counter, so replies that resolve out of order still get unique ids.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    next_id: u64,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    /// Start a session with the coach's welcome message.
    pub fn new() -> Self {
        let mut c = Self::empty();
        c.append(ChatMessage {
            id: MessageId(0),
            sender: Sender::Ai,
            text: Some(WELCOME.to_string()),
            title: None,
            chart: Some(ChartKind::Welcome),
            chips: crate::router::QUICK_QUESTIONS.iter().map(|q| q.to_string()).collect(),
        });
        c
    }

    pub fn empty() -> Self {
        Self {
            messages: Vec::new(),
            next_id: 1,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn push_user(&mut self, text: impl Into<String>) -> MessageId {
        self.append(ChatMessage {
            id: MessageId(0),
            sender: Sender::User,
            text: Some(text.into()),
            title: None,
            chart: None,
            chips: Vec::new(),
        })
    }

    pub fn push_reply(&mut self, reply: Reply) -> MessageId {
        self.append(ChatMessage {
            id: MessageId(0),
            sender: Sender::Ai,
            text: Some(reply.text),
            title: Some(reply.title),
            chart: Some(reply.chart),
            chips: reply.chips,
        })
    }

    pub fn push_briefing(&mut self, briefing: Briefing) -> MessageId {
        self.append(ChatMessage {
            id: MessageId(0),
            sender: Sender::Ai,
            text: Some(briefing.text),
            title: Some(format!("{}: {}", briefing.topic, briefing.title)),
            chart: Some(ChartKind::General),
            chips: briefing.chips,
        })
    }

    fn append(&mut self, mut msg: ChatMessage) -> MessageId {
        let id = MessageId(self.next_id);
        self.next_id += 1;
        msg.id = id;
        self.messages.push(msg);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::Topic;

    fn reply(text: &str) -> Reply {
        Reply {
            topic: Topic::Tips,
            title: "Smart Money Tips".to_string(),
            text: text.to_string(),
            chart: ChartKind::Tips,
            chips: vec!["Tips to reach my goal".to_string()],
        }
    }

    #[test]
    fn test_welcome_message() {
        let c = Conversation::new();
        assert_eq!(c.len(), 1);
        let first = &c.messages()[0];
        assert_eq!(first.sender, Sender::Ai);
        assert_eq!(first.chart, Some(ChartKind::Welcome));
        assert_eq!(first.chips.len(), 4);
    }

    #[test]
    fn test_ids_strictly_increase() {
        let mut c = Conversation::new();
        let a = c.push_user("tips?");
        let b = c.push_user("and my goal?");
        // replies resolve back to back, in any order relative to requests
        let r1 = c.push_reply(reply("second answer"));
        let r2 = c.push_reply(reply("first answer"));
        let ids = [c.messages()[0].id, a, b, r1, r2];
        for w in ids.windows(2) {
            assert!(w[0] < w[1]);
        }
    }

    #[test]
    fn test_reply_fields_carried() {
        let mut c = Conversation::empty();
        c.push_reply(reply("Meal prep"));
        let m = c.last().unwrap();
        assert_eq!(m.sender, Sender::Ai);
        assert_eq!(m.title.as_deref(), Some("Smart Money Tips"));
        assert_eq!(m.chart, Some(ChartKind::Tips));
        assert_eq!(m.id.to_string(), "msg-1");
    }

    #[test]
    fn test_briefing_keeps_chips() {
        use crate::briefing::{briefing, Depth, DockTopic};
        let mut c = Conversation::empty();
        c.push_briefing(briefing(DockTopic::Alerts, Depth::Insights));
        let m = c.last().unwrap();
        assert_eq!(m.title.as_deref(), Some("alerts: Key Insights"));
        assert_eq!(m.chips, vec!["Explain more", "Give me actions"]);
    }

    #[test]
    fn test_user_message_serialization_is_minimal() {
        let mut c = Conversation::empty();
        c.push_user("hi");
        let json = serde_json::to_value(c.last().unwrap()).unwrap();
        assert_eq!(json["sender"], "user");
        assert!(json.get("chips").is_none());
        assert!(json.get("title").is_none());
    }
}
