use serde::{Deserialize, Serialize};

/// Associates a logical resource with the cache key substrings to purge
/// whenever a mutating call touches it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ResourceRule {
    pub name: String,
    /// A mutating request matches this rule if its path contains `base_path`.
    pub base_path: String,
    pub patterns: Vec<String>,
}

impl ResourceRule {
    pub fn new(
        name: impl Into<String>,
        base_path: impl Into<String>,
        patterns: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            base_path: base_path.into(),
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }
}

/// Static invalidation table consulted by [`ResponseCache`](super::ResponseCache).
///
/// Matching is plain substring containment. When several rules match the same
/// request path, the union of their patterns is evicted.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct InvalidationPolicy {
    pub resources: Vec<ResourceRule>,
    /// Mutating calls to these paths end the session, and empty the whole cache.
    pub session_ending: Vec<String>,
}

impl Default for InvalidationPolicy {
    fn default() -> Self {
        Self {
            resources: vec![ResourceRule::new("tasks", "/tasks", ["/tasks", "/ai/summary"])],
            session_ending: vec![String::from("/auth/logout")],
        }
    }
}

impl InvalidationPolicy {
    /// The patterns to evict for a mutating request on `path`, without duplicates.
    pub fn patterns_for(&self, path: &str) -> Vec<&str> {
        let mut patterns = Vec::new();
        for rule in self.resources.iter().filter(|rule| path.contains(&rule.base_path)) {
            for pattern in &rule.patterns {
                if !patterns.contains(&pattern.as_str()) {
                    patterns.push(pattern.as_str());
                }
            }
        }
        patterns
    }
    pub fn is_session_ending(&self, path: &str) -> bool {
        self.session_ending.iter().any(|p| path.contains(p.as_str()))
    }
}
