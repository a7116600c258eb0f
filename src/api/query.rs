//! Ordered query-parameter maps sent to the API.

/// Ordered `(key, value)` pairs for one API request.
///
/// Keys are unique: [`QueryParams::set`] replaces an existing value in place so
/// the original ordering is preserved. The type is hashable so that it can key
/// response caches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Creates an empty parameter map.
    #[must_use]
    pub const fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Sets `key` to `value`, replacing any previous value.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let text = value.into();
        match self.pairs.iter_mut().find(|(existing, _)| existing == key) {
            Some(pair) => pair.1 = text,
            None => self.pairs.push((key.to_owned(), text)),
        }
    }

    /// Builder-style variant of [`QueryParams::set`].
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Sets `key` only when `value` is a real constraint.
    ///
    /// Blank values and the `ALL` sentinel are skipped.
    pub fn set_constraint(&mut self, key: &str, value: &str) {
        let trimmed = value.trim();
        if is_unconstrained(trimmed) {
            return;
        }
        self.set(key, trimmed);
    }

    /// Sets `key` to the comma-joined list when at least one value constrains.
    pub fn set_list(&mut self, key: &str, values: &[String]) {
        let kept: Vec<&str> = values
            .iter()
            .map(|value| value.trim())
            .filter(|value| !is_unconstrained(value))
            .collect();
        if kept.is_empty() {
            return;
        }
        self.set(key, kept.join(","));
    }

    /// Returns the value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    /// Returns true if `key` is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterates over the pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Number of parameters.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns true when no parameter is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Returns true for the "no constraint" sentinels: blank or `ALL`.
#[must_use]
pub fn is_unconstrained(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case("ALL")
}
