use std::fmt::Display;

/// The three path spellings a rule lookup is parameterized with.
///
/// Whether a stored rule matches strictly or loosely is a property of the
/// rule, so all three spellings are handed to the rule source and the
/// source picks the one that applies:
///
/// * `exact` is the request path unchanged and is compared against rules
///   with `matchExact` set.
/// * `without_slash` and `with_slash` are the two trailing-slash variants
///   and are compared against every other rule.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PathCandidates {
    exact: String,
    without_slash: String,
    with_slash: String,
}

const ROOT: &str = "/";

impl PathCandidates {
    /// Derives the candidates for a request path.
    ///
    /// The root path is its own slash variant in both directions.
    pub fn new(path: impl Into<String>) -> Self {
        let exact = path.into();

        if exact == ROOT {
            return Self {
                without_slash: exact.clone(),
                with_slash: exact.clone(),
                exact,
            };
        }

        let without_slash = exact.strip_suffix('/').unwrap_or(&exact).to_string();
        let with_slash = format!("{}/", without_slash);

        Self {
            exact,
            without_slash,
            with_slash,
        }
    }

    /// The request path exactly as received.
    pub fn exact(&self) -> &str {
        &self.exact
    }

    /// The path with a single trailing slash removed.
    pub fn without_slash(&self) -> &str {
        &self.without_slash
    }

    /// The path with a trailing slash.
    pub fn with_slash(&self) -> &str {
        &self.with_slash
    }

    /// Returns true if `source` is one of the loose (slash-normalized) variants.
    pub fn matches_loosely(&self, source: &str) -> bool {
        source == self.without_slash || source == self.with_slash
    }
}

impl Display for PathCandidates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.exact)
    }
}
