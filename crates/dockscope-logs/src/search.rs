//! Search over buffered log entries.
//!
//! Queries are literal and case-insensitive unless asked otherwise, and run
//! against snapshots, so searching never blocks the streams.

use std::sync::Arc;

use regex::Regex;

use crate::{Container, ContainerLogContext, LogEntry, Result};

/// Compiled filter for log entries
#[derive(Clone)]
pub struct CompiledFilter {
    /// Regex pattern (if any)
    regex: Option<Regex>,

    /// Original query string
    pattern: String,

    case_insensitive: bool,
}

impl CompiledFilter {
    /// Case-insensitive literal search, the default for typed queries
    pub fn literal(query: &str) -> Result<Self> {
        Self::build(query, &regex::escape(query), true)
    }

    /// Literal search that respects case
    pub fn literal_case_sensitive(query: &str) -> Result<Self> {
        Self::build(query, &regex::escape(query), false)
    }

    /// Regular expression search
    pub fn regex(pattern: &str, case_insensitive: bool) -> Result<Self> {
        Self::build(pattern, pattern, case_insensitive)
    }

    fn build(query: &str, pattern: &str, case_insensitive: bool) -> Result<Self> {
        let regex = if query.is_empty() {
            None
        } else if case_insensitive {
            Some(Regex::new(&format!("(?i){pattern}"))?)
        } else {
            Some(Regex::new(pattern)?)
        };

        Ok(Self {
            regex,
            pattern: query.to_string(),
            case_insensitive,
        })
    }

    /// Check if a log entry matches this filter
    pub fn matches(&self, entry: &LogEntry) -> bool {
        match &self.regex {
            Some(re) => re.is_match(&entry.message),
            None => true,
        }
    }

    /// Byte ranges of every match in `text` (for highlighting)
    pub fn find_matches(&self, text: &str) -> Vec<(usize, usize)> {
        match &self.regex {
            Some(re) => re.find_iter(text).map(|m| (m.start(), m.end())).collect(),
            None => Vec::new(),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn has_pattern(&self) -> bool {
        self.regex.is_some()
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }
}

impl std::fmt::Debug for CompiledFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledFilter")
            .field("pattern", &self.pattern)
            .finish()
    }
}

/// One matching entry with the byte ranges that matched
#[derive(Clone, Debug)]
pub struct SearchHit {
    pub entry: LogEntry,
    pub ranges: Vec<(usize, usize)>,
}

/// Hits for one container, oldest first
#[derive(Clone, Debug)]
pub struct ContainerHits {
    pub container: Container,
    pub hits: Vec<SearchHit>,
}

/// Search results grouped by container, in display order
#[derive(Clone, Debug, Default)]
pub struct SearchResults {
    pub query: String,
    pub groups: Vec<ContainerHits>,
}

impl SearchResults {
    /// Search every context's buffer. A filter without a pattern finds nothing.
    pub fn collect(contexts: &[Arc<ContainerLogContext>], filter: &CompiledFilter) -> Self {
        let snapshot: Vec<_> = contexts
            .iter()
            .map(|c| (c.container().clone(), c.log_buffer()))
            .collect();
        Self::from_snapshot(snapshot, filter)
    }

    pub fn from_snapshot(
        snapshot: Vec<(Container, Vec<LogEntry>)>,
        filter: &CompiledFilter,
    ) -> Self {
        let mut results = Self {
            query: filter.pattern().to_string(),
            groups: Vec::new(),
        };
        if !filter.has_pattern() {
            return results;
        }

        for (container, entries) in snapshot {
            let hits: Vec<SearchHit> = entries
                .into_iter()
                .filter(|e| filter.matches(e))
                .map(|entry| SearchHit {
                    ranges: filter.find_matches(&entry.message),
                    entry,
                })
                .collect();
            if !hits.is_empty() {
                results.groups.push(ContainerHits { container, hits });
            }
        }
        results
    }

    pub fn total_hits(&self) -> usize {
        self.groups.iter().map(|g| g.hits.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn entry(container_id: &str, message: &str) -> LogEntry {
        LogEntry::new(container_id, Utc::now(), message)
    }

    fn snapshot() -> Vec<(Container, Vec<LogEntry>)> {
        vec![
            (
                Container::new("a", "api", "node", "Up"),
                vec![
                    entry("a", "GET /health 200"),
                    entry("a", "ERROR connection refused"),
                    entry("a", "retrying (error count 2)"),
                ],
            ),
            (
                Container::new("b", "db", "postgres", "Up"),
                vec![entry("b", "checkpoint complete")],
            ),
        ]
    }

    #[test]
    fn test_literal_is_case_insensitive() {
        let filter = CompiledFilter::literal("error").unwrap();
        assert!(filter.matches(&entry("a", "Some ERROR here")));
        assert!(!filter.matches(&entry("a", "all good")));
        assert!(filter.is_case_insensitive());
    }

    #[test]
    fn test_literal_escapes_metacharacters() {
        let filter = CompiledFilter::literal("a.b(").unwrap();
        assert!(filter.matches(&entry("a", "x a.b( y")));
        assert!(!filter.matches(&entry("a", "axb(")));
    }

    #[test]
    fn test_case_sensitive_literal() {
        let filter = CompiledFilter::literal_case_sensitive("Error").unwrap();
        assert!(filter.matches(&entry("a", "Error: boom")));
        assert!(!filter.matches(&entry("a", "error: boom")));
    }

    #[test]
    fn test_invalid_regex_is_an_error() {
        assert!(CompiledFilter::regex("(unclosed", false).is_err());
        assert!(CompiledFilter::regex(r"\d{3}", false).unwrap().matches(&entry("a", "GET 200")));
    }

    #[test]
    fn test_find_matches_ranges() {
        let filter = CompiledFilter::literal("ab").unwrap();
        assert_eq!(filter.find_matches("ab xx AB"), vec![(0, 2), (6, 8)]);
    }

    #[test]
    fn test_results_grouped_by_container() {
        let filter = CompiledFilter::literal("error").unwrap();
        let results = SearchResults::from_snapshot(snapshot(), &filter);

        assert_eq!(results.groups.len(), 1);
        assert_eq!(results.groups[0].container.name, "api");
        assert_eq!(results.total_hits(), 2);
        assert_eq!(results.groups[0].hits[0].ranges, vec![(0, 5)]);
    }

    #[test]
    fn test_empty_query_finds_nothing() {
        let filter = CompiledFilter::literal("").unwrap();
        assert!(!filter.has_pattern());
        assert!(SearchResults::from_snapshot(snapshot(), &filter).is_empty());
    }
}
