/// A note from a mirror run for whoever drives it.
///
/// `sync::run` collects these instead of printing:
/// - `Info` for run-level counts (pages in the manifest, orphans removed).
/// - `Warning` for name collisions and pages served as HTML with no raw URL.
/// - `Error` for pages whose fetch failed; the run still completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    Info(String),
    Warning(String),
    Error(String),
}

impl Feedback {
    pub fn info(msg: impl Into<String>) -> Self {
        Self::Info(msg.into())
    }

    pub fn warning(msg: impl Into<String>) -> Self {
        Self::Warning(msg.into())
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self::Error(msg.into())
    }

    pub fn is_info(&self) -> bool {
        matches!(self, Self::Info(_))
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, Self::Warning(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Info(msg) | Self::Warning(msg) | Self::Error(msg) => msg,
        }
    }
}

impl std::fmt::Display for Feedback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self {
            Self::Info(_) => "",
            Self::Warning(_) => "warning: ",
            Self::Error(_) => "error: ",
        };
        write!(f, "{prefix}{}", self.message())
    }
}
