use std::fmt;

const SCOPE_EMAIL: &str = "email";
const SCOPE_PROFILE: &str = "profile";
const SCOPE_YOUTUBE_READONLY: &str = "https://www.googleapis.com/auth/youtube.readonly";
const SCOPE_YOUTUBE: &str = "https://www.googleapis.com/auth/youtube";
const SCOPE_YOUTUBE_UPLOAD: &str = "https://www.googleapis.com/auth/youtube.upload";

/// A requestable OAuth2 permission string.
///
/// Scopes split into two groups: profile-bearing (`Email`, `Profile`), which
/// allow reading the user's identity, and API-only scopes, which grant
/// access to unrelated resources. Whether any profile-bearing scope was
/// requested decides if the callback performs a profile lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Read the user's email address.
    Email,
    /// Read basic profile information (name, picture).
    Profile,
    /// Read-only access to YouTube resources.
    YoutubeReadonly,
    /// Manage YouTube resources.
    Youtube,
    /// Upload videos to YouTube.
    YoutubeUpload,
    /// Any other provider scope string.
    Custom(String),
}

impl Scope {
    pub fn as_str(&self) -> &str {
        match self {
            Scope::Email => SCOPE_EMAIL,
            Scope::Profile => SCOPE_PROFILE,
            Scope::YoutubeReadonly => SCOPE_YOUTUBE_READONLY,
            Scope::Youtube => SCOPE_YOUTUBE,
            Scope::YoutubeUpload => SCOPE_YOUTUBE_UPLOAD,
            Scope::Custom(s) => s.as_str(),
        }
    }

    /// Whether this scope allows reading the user's email/name/picture.
    pub fn is_profile_bearing(&self) -> bool {
        matches!(self, Scope::Email | Scope::Profile)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Scope {
    fn from(s: &str) -> Self {
        match s {
            SCOPE_EMAIL => Scope::Email,
            SCOPE_PROFILE => Scope::Profile,
            SCOPE_YOUTUBE_READONLY => Scope::YoutubeReadonly,
            SCOPE_YOUTUBE => Scope::Youtube,
            SCOPE_YOUTUBE_UPLOAD => Scope::YoutubeUpload,
            other => Scope::Custom(other.to_string()),
        }
    }
}

/// Scopes used when the caller specifies none.
pub fn default_scopes() -> Vec<Scope> {
    vec![Scope::Profile, Scope::Email]
}
