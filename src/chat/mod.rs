pub mod citations;
mod core;
pub mod history;
pub mod log;
pub mod models;
pub mod session;

pub use self::core::{
    CLEAR_FAILED_MESSAGE, ChatSession, ChatSessionBuilder, ClearOutcome, LEADER_FAILED_MESSAGE,
    LoadOutcome, SEND_FAILED_MESSAGE, SendOutcome, send_failed_text,
};
pub use citations::{ParsedResponse, parse_response};
pub use history::{HistoryLoader, HistoryOutcome};
pub use log::MessageLog;
pub use models::{ChatEvent, DisplayMessage, MessageKind};
pub use session::SessionStore;
