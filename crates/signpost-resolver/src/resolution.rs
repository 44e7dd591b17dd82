use std::fmt::Display;

/// Response header used to keep offer detail pages out of search indexes.
pub const ROBOTS_HEADER: &str = "x-robots-tag";
pub const ROBOTS_NOINDEX: &str = "noindex, follow";

/// HTTP status of a redirect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RedirectStatus {
    /// 301
    MovedPermanently,
    /// 302
    Found,
}

impl RedirectStatus {
    pub fn as_u16(&self) -> u16 {
        match self {
            RedirectStatus::MovedPermanently => 301,
            RedirectStatus::Found => 302,
        }
    }
}

impl Display for RedirectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_u16())
    }
}

/// The edge's decision for a single request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Forward the request to the page renderer unchanged.
    ///
    /// With `noindex` set the forwarded response carries
    /// `X-Robots-Tag: noindex, follow`.
    PassThrough { noindex: bool },
    /// Answer with a redirect to an absolute URL.
    Redirect {
        location: String,
        status: RedirectStatus,
    },
    /// Answer with the static 410 page.
    Gone,
}

impl Resolution {
    /// A pass-through without annotation.
    pub fn pass_through() -> Self {
        Resolution::PassThrough { noindex: false }
    }

    pub fn is_pass_through(&self) -> bool {
        matches!(self, Resolution::PassThrough { .. })
    }

    /// The `Location` of a redirect, if this is one.
    pub fn location(&self) -> Option<&str> {
        match self {
            Resolution::Redirect { location, .. } => Some(location),
            _ => None,
        }
    }

    /// The status code the edge answers with, `None` for pass-through.
    pub fn status(&self) -> Option<u16> {
        match self {
            Resolution::PassThrough { .. } => None,
            Resolution::Redirect { status, .. } => Some(status.as_u16()),
            Resolution::Gone => Some(410),
        }
    }
}
