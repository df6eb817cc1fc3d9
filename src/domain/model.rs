use std::time::{Duration, Instant};

/// How long a notice stays on screen.
pub const NOTICE_DURATION: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServiceAvailability {
    #[default]
    Unknown,
    Checking,
    Available,
    Unavailable,
}

/// The presentation mode derived from [`ServiceAvailability`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Checking,
    Extended,
    Compat,
}

impl ServiceAvailability {
    pub fn mode(self) -> Mode {
        match self {
            ServiceAvailability::Unknown | ServiceAvailability::Checking => Mode::Checking,
            ServiceAvailability::Available => Mode::Extended,
            ServiceAvailability::Unavailable => Mode::Compat,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlValidation {
    pub is_valid: bool,
    pub matched_type: Option<String>,
}

impl UrlValidation {
    pub fn invalid() -> Self {
        Self::default()
    }

    /// Valid only when the service reported at least one type; the first wins.
    pub fn from_types(types: &[String]) -> Self {
        match types.first() {
            Some(first) => Self {
                is_valid: true,
                matched_type: Some(first.clone()),
            },
            None => Self::invalid(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    InFlight,
}

impl RequestState {
    pub fn is_in_flight(self) -> bool {
        self == RequestState::InFlight
    }
}

/// A cookie as read from the browser's store.
#[derive(Debug, Clone, PartialEq)]
pub struct BrowserCookie {
    pub domain: String,
    pub name: String,
    pub value: String,
    pub path: String,
    /// Seconds since the Unix epoch; `None` for session cookies.
    pub expires_at: Option<f64>,
}

/// Snapshot of the active page, taken once per action.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabContext {
    pub url: String,
    pub cookies: Vec<BrowserCookie>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Transient, non-blocking message shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub shown_at: Instant,
}

impl Notice {
    pub fn success(title: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            title: title.into(),
            shown_at: Instant::now(),
        }
    }

    pub fn error(title: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: title.into(),
            shown_at: Instant::now(),
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) >= NOTICE_DURATION
    }
}
