use std::time::Duration;

mod console;
mod error;
mod frame;
mod request;
mod session;

pub use console::run_console;
pub use error::Error;
pub use frame::FrameRule;
pub use request::{encode_request, is_exit, trim_line_ending};
pub use session::{connect, Session};

pub const DEFAULT_SERVER: &'static str = "localhost";
pub const DEFAULT_PORT: u16 = 8888;
pub const EXIT_TEXT: &'static str = "Exit";
pub const PROMPT: &'static str = "Please enter the message: ";
pub const RECV_CHUNK: usize = 1024;
// the roof controller firmware reads at most this many bytes per command
pub const MAX_INPUT_TEXT: usize = 45;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server: String,
    pub port: u16,
    pub newline: bool,
    pub frame: FrameRule,
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn address(&self) -> (&str, u16) {
        (&self.server, self.port)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_string(),
            port: DEFAULT_PORT,
            newline: false,
            frame: FrameRule::default(),
            timeout: None,
        }
    }
}
