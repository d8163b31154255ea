pub mod service;
pub mod transcript;

pub use service::{load_options, Session, SessionEvent, SessionOptions, SessionSnapshot};
pub use transcript::{Transcript, TranscriptEngine};
