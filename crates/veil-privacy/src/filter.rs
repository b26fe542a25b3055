//! Ad blocking
//!
//! A rule matches when it occurs anywhere in the raw destination string.
//! Matching is case-sensitive and does not parse the host, so
//! `https://example.com/?ref=doubleclick.net` is blocked too.

/// Advertising hosts blocked out of the box
pub const DEFAULT_BLOCKED_DOMAINS: &[&str] = &[
    "doubleclick.net",
    "adservice.google.com",
    "googlesyndication.com",
    "ads.yahoo.com",
    "adnxs.com",
    "adsfacebook.com",
];

#[derive(Debug, Clone)]
pub struct FilterList {
    /// Block rules in load order
    rules: Vec<String>,
    /// Whether blocking is enabled
    enabled: bool,
}

impl FilterList {
    pub fn new<I>(rules: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut deduped: Vec<String> = Vec::new();
        for rule in rules {
            if !rule.is_empty() && !deduped.contains(&rule) {
                deduped.push(rule);
            }
        }

        Self {
            rules: deduped,
            enabled: true,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn rules(&self) -> &[String] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// First rule contained in `url`, if blocking is on
    pub fn matching_rule(&self, url: &str) -> Option<&str> {
        if !self.enabled {
            return None;
        }

        self.rules
            .iter()
            .find(|rule| url.contains(rule.as_str()))
            .map(String::as_str)
    }
}

impl Default for FilterList {
    fn default() -> Self {
        Self::new(DEFAULT_BLOCKED_DOMAINS.iter().map(|d| d.to_string()))
    }
}
