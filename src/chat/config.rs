//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for controlling chat behavior.  Options not given on the
//! command line fall back to the environment variable of the same name,
//! upper-cased with dashes replaced by underscores.

use arrrg_derive::CommandLine;

use crate::LogLevel;

/// Default agent endpoint.
pub const DEFAULT_URL: &str = "http://localhost:8080";

/// Default name shown in the prompt.
pub const DEFAULT_USERNAME: &str = "sparklyunicorn";

const URL_ENV: &str = "URL";
const USERNAME_ENV: &str = "USERNAME";
const TOKEN_ENV: &str = "TOKEN";
const LOG_LEVEL_ENV: &str = "LOG_LEVEL";

/// Command-line arguments for the copilot-debug-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Agent endpoint.
    #[arrrg(optional, "URL to chat with your agent (default: http://localhost:8080)", "URL")]
    pub url: Option<String>,

    /// Name shown in the prompt.
    #[arrrg(optional, "Username to display in chat (default: sparklyunicorn)", "NAME")]
    pub username: Option<String>,

    /// GitHub token forwarded to the agent.
    #[arrrg(optional, "GitHub token for chat authentication", "TOKEN")]
    pub token: Option<String>,

    /// Diagnostic verbosity.
    #[arrrg(optional, "Log level: DEBUG, TRACE or NONE (default: DEBUG)", "LEVEL")]
    pub log_level: Option<String>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Configuration for a chat session.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments and the environment with appropriate defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    /// The agent endpoint.
    pub url: String,

    /// The name shown in the prompt.
    pub username: String,

    /// Optional GitHub token.
    pub token: Option<String>,

    /// Diagnostic verbosity for decoding and display.
    pub log_level: LogLevel,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - URL: http://localhost:8080
    /// - Username: sparklyunicorn
    /// - Token: none
    /// - Log level: DEBUG
    /// - Color: enabled
    pub fn new() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            username: DEFAULT_USERNAME.to_string(),
            token: None,
            log_level: LogLevel::Debug,
            use_color: true,
        }
    }

    /// Resolve command-line arguments, consulting `lookup` for any option
    /// that was not given.
    pub fn resolve(args: ChatArgs, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let lookup = |name: &str| lookup(name).filter(|value| !value.is_empty());
        let url = args.url.or_else(|| lookup(URL_ENV));
        let username = args.username.or_else(|| lookup(USERNAME_ENV));
        let token = args.token.or_else(|| lookup(TOKEN_ENV));
        let log_level = args.log_level.or_else(|| lookup(LOG_LEVEL_ENV));
        ChatConfig::from(ChatArgs {
            url,
            username,
            token,
            log_level,
            no_color: args.no_color,
        })
    }

    /// Resolve command-line arguments against the process environment.
    pub fn from_env(args: ChatArgs) -> Self {
        Self::resolve(args, |name| std::env::var(name).ok())
    }

    /// Sets the agent endpoint.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Sets the prompt name.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    /// Sets the GitHub token.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// Sets the log level.
    pub fn with_log_level(mut self, log_level: LogLevel) -> Self {
        self.log_level = log_level;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ChatConfig {
    fn from(args: ChatArgs) -> Self {
        ChatConfig {
            url: args.url.unwrap_or_else(|| DEFAULT_URL.to_string()),
            username: args
                .username
                .unwrap_or_else(|| DEFAULT_USERNAME.to_string()),
            token: args.token.filter(|token| !token.is_empty()),
            log_level: args
                .log_level
                .map(|level| LogLevel::from(level.as_str()))
                .unwrap_or_default(),
            use_color: !args.no_color,
        }
    }
}
