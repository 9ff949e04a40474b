pub mod renderer;
pub mod transport;

pub use renderer::{DocumentRenderer, PlainTextRenderer};
pub use transport::{send_text, split_message, ChatAction, ChatTransport, OutboundDocument, MAX_MESSAGE_CHARS};
