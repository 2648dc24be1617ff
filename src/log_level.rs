//! Diagnostic verbosity for decode sessions and rendering.

use std::fmt;

/// Verbosity requested by the operator.
///
/// `Trace` implies every diagnostic, `None` suppresses every optional
/// diagnostic, and any other level only matches itself exactly.  Unknown
/// strings are preserved so they keep that exact-match behavior.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum LogLevel {
    /// No optional diagnostics.
    None,
    /// General diagnostics.
    #[default]
    Debug,
    /// Everything, including raw wire traffic.
    Trace,
    /// Any other level name, upper-cased.
    Other(String),
}

impl LogLevel {
    /// Returns true if `level` diagnostics should be produced at this verbosity.
    pub fn should_log(&self, level: &LogLevel) -> bool {
        match self {
            LogLevel::None => false,
            LogLevel::Trace => true,
            _ => self == level,
        }
    }

    /// Shorthand for `should_log(&LogLevel::Debug)`.
    pub fn is_debug(&self) -> bool {
        self.should_log(&LogLevel::Debug)
    }

    /// Shorthand for `should_log(&LogLevel::Trace)`.
    pub fn is_trace(&self) -> bool {
        self.should_log(&LogLevel::Trace)
    }

    /// Returns true for `NONE`, `DEBUG` and `TRACE`.
    pub fn is_known(&self) -> bool {
        !matches!(self, LogLevel::Other(_))
    }

    /// The canonical name of this level.
    pub fn as_str(&self) -> &str {
        match self {
            LogLevel::None => "NONE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
            LogLevel::Other(name) => name,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LogLevel {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        Ok(match upper.as_str() {
            "NONE" => LogLevel::None,
            "DEBUG" => LogLevel::Debug,
            "TRACE" => LogLevel::Trace,
            _ => LogLevel::Other(upper),
        })
    }
}

impl From<&str> for LogLevel {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(level) => level,
            Err(never) => match never {},
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_suppresses_everything() {
        assert!(!LogLevel::None.should_log(&LogLevel::Debug));
        assert!(!LogLevel::None.should_log(&LogLevel::Trace));
        assert!(!LogLevel::None.should_log(&LogLevel::None));
    }

    #[test]
    fn trace_implies_everything() {
        assert!(LogLevel::Trace.is_debug());
        assert!(LogLevel::Trace.is_trace());
    }

    #[test]
    fn debug_is_exact_match() {
        assert!(LogLevel::Debug.is_debug());
        assert!(!LogLevel::Debug.is_trace());
    }

    #[test]
    fn unknown_levels_match_nothing_standard() {
        let level = LogLevel::from("verbose");
        assert_eq!(level, LogLevel::Other("VERBOSE".to_string()));
        assert!(!level.is_known());
        assert!(!level.is_debug());
        assert!(level.should_log(&LogLevel::Other("VERBOSE".to_string())));
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(LogLevel::from("trace"), LogLevel::Trace);
        assert_eq!(LogLevel::from(" None "), LogLevel::None);
        assert_eq!(LogLevel::from("DEBUG").to_string(), "DEBUG");
    }
}
