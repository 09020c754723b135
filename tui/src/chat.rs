/// One line of chat history, kept by the UI layer only — the crypto core
/// never retains plaintext beyond the call that produced it.
#[derive(Clone, Debug)]
pub struct ChatMessage {
    pub from: String,
    pub text: String,
}

impl ChatMessage {
    pub fn new(from: impl Into<String>, text: impl Into<String>) -> Self {
        ChatMessage {
            from: from.into(),
            text: text.into(),
        }
    }
}
