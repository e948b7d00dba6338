use regex::Regex;
use std::sync::OnceLock;

/// How a producer stderr line affects the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StderrSeverity {
    /// The producer hit an error or crashed; the session is over.
    Fatal,
    /// Warnings, progress, library chatter.
    Informational,
}

/// Classify a stderr line. Only `error`, `exception` or `traceback` (any case) are fatal.
pub fn classify_stderr(line: &str) -> StderrSeverity {
    static FATAL_RE: OnceLock<Regex> = OnceLock::new();
    let re = FATAL_RE
        .get_or_init(|| Regex::new(r"(?i)error|exception|traceback").expect("fatal stderr regex"));
    if re.is_match(line) {
        StderrSeverity::Fatal
    } else {
        StderrSeverity::Informational
    }
}
