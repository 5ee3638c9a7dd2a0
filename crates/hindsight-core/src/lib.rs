pub mod event;
pub mod host;
pub mod message;
pub mod session;

pub use event::{extract_session_id, parse_event_line, EventError, HostEvent, SessionEvent};
pub use host::{
    DirProvisioner, LogEntry, LogLevel, LogSink, MarkerSearch, Notifier, PromptPart,
    PromptRequest, SessionStore, Toast, ToastVariant,
};
pub use message::{Message, MessagePart, Role};
pub use session::{SessionInfo, SessionStats};
