use std::fmt::Display;

/// The parts of an inbound request the resolver looks at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestTarget {
    path: String,
    query: Option<String>,
    origin: String,
}

impl RequestTarget {
    /// Creates a target from a path, a raw query string (without `?`) and the
    /// site origin (`scheme://host[:port]`).
    pub fn new(path: impl Into<String>, query: Option<String>, origin: impl Into<String>) -> Self {
        let origin = origin.into();
        Self {
            path: path.into(),
            query: query.filter(|q| !q.is_empty()),
            origin: origin.trim_end_matches('/').to_string(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// The current path with a trailing slash, origin-qualified, query preserved.
    ///
    /// Leading slashes collapse to one so the location can never read as a
    /// scheme-relative URL.
    pub fn with_trailing_slash(&self) -> String {
        let path = self.path.trim_start_matches('/');
        let mut location = if path.is_empty() {
            format!("{}/", self.origin)
        } else {
            format!("{}/{}/", self.origin, path)
        };
        if let Some(query) = &self.query {
            location.push('?');
            location.push_str(query);
        }
        location
    }

    /// Turns a redirect target into an absolute URL.
    ///
    /// Absolute `http(s)` targets are returned as-is. Relative targets are
    /// qualified against the origin and get the current query string
    /// appended after any query of their own. With `canonicalize` set, a
    /// relative target whose last segment is not a file name gains a
    /// trailing slash.
    pub fn qualify(&self, destination: &str, canonicalize: bool) -> String {
        if is_absolute(destination) {
            return destination.to_string();
        }

        let (path, fragment) = match destination.split_once('#') {
            Some((path, fragment)) => (path, Some(fragment)),
            None => (destination, None),
        };
        let (path, own_query) = match path.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (path, None),
        };

        let mut location = String::with_capacity(self.origin.len() + destination.len() + 2);
        location.push_str(&self.origin);
        location.push('/');
        location.push_str(path.trim_start_matches('/'));
        if canonicalize && needs_trailing_slash(path) {
            location.push('/');
        }

        let queries: Vec<&str> = [own_query, self.query()]
            .into_iter()
            .flatten()
            .filter(|q| !q.is_empty())
            .collect();
        if !queries.is_empty() {
            location.push('?');
            location.push_str(&queries.join("&"));
        }

        if let Some(fragment) = fragment {
            location.push('#');
            location.push_str(fragment);
        }

        location
    }
}

fn is_absolute(destination: &str) -> bool {
    let lower = destination.get(..8).unwrap_or(destination).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn needs_trailing_slash(path: &str) -> bool {
    if path.is_empty() || path.ends_with('/') {
        return false;
    }
    let last = path.rsplit('/').next().unwrap_or(path);
    !last.contains('.')
}

impl Display for RequestTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path)?;
        if let Some(query) = &self.query {
            write!(f, "?{}", query)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: &str = "https://bets.example";

    fn target(path: &str, query: Option<&str>) -> RequestTarget {
        RequestTarget::new(path, query.map(str::to_string), ORIGIN)
    }

    #[test]
    fn origin_trailing_slash_is_trimmed() {
        let t = RequestTarget::new("/a/", None, "https://bets.example/");
        assert_eq!(t.origin(), ORIGIN);
    }

    #[test]
    fn empty_query_is_no_query() {
        assert_eq!(target("/a/", Some("")).query(), None);
    }

    #[test]
    fn trailing_slash_location_keeps_query() {
        assert_eq!(
            target("/gh/offers", Some("utm_source=x&b=2")).with_trailing_slash(),
            "https://bets.example/gh/offers/?utm_source=x&b=2"
        );
        assert_eq!(
            target("/gh/offers", None).with_trailing_slash(),
            "https://bets.example/gh/offers/"
        );
    }

    #[test]
    fn doubled_leading_slashes_stay_on_origin() {
        let hostless = RequestTarget::new("//evil.example", None, "");
        assert_eq!(hostless.with_trailing_slash(), "/evil.example/");
        assert_eq!(hostless.qualify("//evil.example/x", true), "/evil.example/x/");

        let t = target("//evil.example", Some("a=1"));
        assert_eq!(t.with_trailing_slash(), "https://bets.example/evil.example/?a=1");
    }

    #[test]
    fn absolute_target_is_untouched() {
        let t = target("/a/", Some("q=1"));
        assert_eq!(
            t.qualify("https://partner.example/landing", true),
            "https://partner.example/landing"
        );
        assert_eq!(t.qualify("HTTP://partner.example", true), "HTTP://partner.example");
    }

    #[test]
    fn root_relative_target() {
        let t = target("/ng/old-page/", Some("ref=1"));
        assert_eq!(
            t.qualify("/ng/new-page/", true),
            "https://bets.example/ng/new-page/?ref=1"
        );
        assert_eq!(
            t.qualify("/ng/new-page", false),
            "https://bets.example/ng/new-page?ref=1"
        );
    }

    #[test]
    fn canonicalized_target_gains_slash() {
        let t = target("/ng/old-page/", None);
        assert_eq!(t.qualify("/ng/new-page", true), "https://bets.example/ng/new-page/");
        assert_eq!(t.qualify("/files/terms.pdf", true), "https://bets.example/files/terms.pdf");
        assert_eq!(t.qualify("/", true), "https://bets.example/");
    }

    #[test]
    fn bare_relative_target() {
        let t = target("/x/", None);
        assert_eq!(t.qualify("ng/new-page/", true), "https://bets.example/ng/new-page/");
        assert_eq!(t.qualify("http-guide", true), "https://bets.example/http-guide/");
    }

    #[test]
    fn target_with_own_query_and_fragment() {
        let t = target("/x/", Some("ref=1"));
        assert_eq!(
            t.qualify("/ng/new-page/?tab=2#terms", true),
            "https://bets.example/ng/new-page/?tab=2&ref=1#terms"
        );
    }

    #[test]
    fn display_includes_query() {
        assert_eq!(target("/a/", Some("b=1")).to_string(), "/a/?b=1");
    }
}
