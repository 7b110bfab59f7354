//! The destination a user was headed to before being sent to log in.

use std::fmt;

/// Query parameter on the login entry point that carries the intent.
pub const REDIRECT_PARAM: &str = "redirect";

/// An attempted location, kept verbatim. Never rewritten or normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationIntent(String);

impl NavigationIntent {
    #[must_use]
    pub fn new(location: impl Into<String>) -> Self {
        Self(location.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// The login entry point carrying this intent, e.g.
    /// `/login?redirect=%2Fprofile%3Ftab%3Dinvites`.
    #[must_use]
    pub fn login_location(&self, login_path: &str) -> String {
        let query: String = url::form_urlencoded::Serializer::new(String::new())
            .append_pair(REDIRECT_PARAM, &self.0)
            .finish();
        format!("{login_path}?{query}")
    }

    /// Recover the intent from a login location. `None` when the location
    /// carries no (or an empty) `redirect` parameter.
    #[must_use]
    pub fn from_location(location: &str) -> Option<Self> {
        let (_, rest) = location.split_once('?')?;
        let query = rest.split_once('#').map_or(rest, |(q, _)| q);
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == REDIRECT_PARAM)
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.is_empty())
            .map(Self)
    }
}

impl fmt::Display for NavigationIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where the guard sends an unauthenticated navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRedirect {
    pub location: String,
    pub intent: NavigationIntent,
}

impl LoginRedirect {
    #[must_use]
    pub fn new(login_path: &str, attempted: &str) -> Self {
        let intent = NavigationIntent::new(attempted);
        Self { location: intent.login_location(login_path), intent }
    }
}

#[cfg(test)]
#[path = "intent_test.rs"]
mod tests;
