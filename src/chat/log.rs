//! The message list behind a conversation view, with the greeting and
//! the clear-chat prompt.
use super::models::DisplayMessage;
use crate::core::DEFAULT_CLEAR_PROMPT_THRESHOLD;

/// Ordered, in-memory list of the messages shown for one conversation.
#[derive(Clone, Debug)]
pub struct MessageLog {
    messages: Vec<DisplayMessage>,
    leader_name: Option<String>,
    clear_prompt_threshold: usize,
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::new(None, DEFAULT_CLEAR_PROMPT_THRESHOLD)
    }
}

impl MessageLog {
    pub fn new(leader_name: Option<&str>, clear_prompt_threshold: usize) -> Self {
        Self {
            messages: Vec::new(),
            leader_name: leader_name.map(str::to_string),
            clear_prompt_threshold,
        }
    }

    pub fn leader_name(&self) -> Option<&str> {
        self.leader_name.as_deref()
    }

    pub fn set_leader_name(&mut self, name: &str) {
        self.leader_name = Some(name.to_string());
    }

    pub fn append(&mut self, message: DisplayMessage) {
        self.messages.push(message)
    }

    pub fn extend(&mut self, messages: impl IntoIterator<Item = DisplayMessage>) {
        self.messages.extend(messages)
    }

    /// Empties the log and starts over with a greeting from the
    /// leader. The log stays empty while the leader's name is unknown.
    pub fn clear(&mut self) {
        self.messages.clear();
        if let Some(name) = &self.leader_name {
            self.messages.push(DisplayMessage::greeting(name));
        }
    }

    /// Replaces the contents of the log wholesale.
    pub fn replace(&mut self, messages: Vec<DisplayMessage>) {
        self.messages = messages;
    }

    /// True once the conversation is long enough that the user should
    /// be nudged to clear it. Appending still works past this point.
    pub fn should_prompt_clear(&self) -> bool {
        self.messages.len() >= self.clear_prompt_threshold
    }

    pub fn snapshot(&self) -> Vec<DisplayMessage> {
        self.messages.clone()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DisplayMessage> {
        self.messages.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::models::MessageKind;

    #[test]
    fn test_append_preserves_order() {
        let mut log = MessageLog::new(Some("Lincoln"), 20);
        log.append(DisplayMessage::user("one"));
        log.append(DisplayMessage::ai("two"));
        log.append(DisplayMessage::user("one"));

        let texts: Vec<String> = log.iter().map(|m| m.text.clone()).collect();
        assert_eq!(texts, vec!["one", "two", "one"]);
    }

    #[test]
    fn test_prompt_clear_threshold() {
        let mut log = MessageLog::new(Some("Lincoln"), 20);
        for i in 0..19 {
            log.append(DisplayMessage::user(&i.to_string()));
        }
        assert!(!log.should_prompt_clear());

        log.append(DisplayMessage::user("20th"));
        assert!(log.should_prompt_clear());

        // Soft limit only
        log.append(DisplayMessage::user("21st"));
        assert_eq!(log.len(), 21);
        assert!(log.should_prompt_clear());
    }

    #[test]
    fn test_clear_leaves_greeting() {
        let mut log = MessageLog::new(Some("Lincoln"), 20);
        for i in 0..25 {
            log.append(DisplayMessage::user(&i.to_string()));
        }

        log.clear();

        assert_eq!(log.len(), 1);
        let greeting = &log.snapshot()[0];
        assert_eq!(greeting.kind, MessageKind::Ai);
        assert!(greeting.text.contains("Lincoln"));
        assert!(!log.should_prompt_clear());
    }

    #[test]
    fn test_clear_on_empty_log() {
        let mut log = MessageLog::new(Some("Lincoln"), 20);
        log.clear();
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_clear_without_leader_name() {
        let mut log = MessageLog::default();
        log.append(DisplayMessage::user("hello"));
        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut log = MessageLog::new(Some("Lincoln"), 20);
        log.append(DisplayMessage::user("hello"));
        let snapshot = log.snapshot();
        log.append(DisplayMessage::user("again"));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(log.len(), 2);
    }
}
