//! Admission rules: a level threshold plus optional regex filters that
//! decide whether an event reaches a sink.
//!
//! Filter patterns are compiled exactly once, when the configuration is
//! built; dispatch only runs pre-compiled matchers.

use crate::domain::{Level, LogEvent};
use regex::Regex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RuleError {
    #[error("invalid filter pattern '{pattern}': {source}")]
    InvalidFilter {
        pattern: String,
        source: regex::Error,
    },
}

/// A compiled admission rule: a minimum level plus optional full-match
/// regex filters for the event source, tag, and message.
///
/// Filters match the entire field (patterns are anchored at both ends when
/// compiled), so `aace\..*` matches the source `aace.alexa` while a bare
/// `alexa` does not. An empty pattern is a wildcard for its field and skips
/// compilation entirely.
#[derive(Debug, Clone)]
pub struct Rule {
    min_level: Level,
    source: Option<Regex>,
    tag: Option<Regex>,
    message: Option<Regex>,
}

impl Rule {
    pub fn new(min_level: Level, source: &str, tag: &str, message: &str) -> Result<Self, RuleError> {
        Ok(Self {
            min_level,
            source: compile_filter(source)?,
            tag: compile_filter(tag)?,
            message: compile_filter(message)?,
        })
    }

    pub fn min_level(&self) -> Level {
        self.min_level
    }

    /// True when the event clears the level threshold and every present
    /// filter matches its field in full. Pure; never fails.
    pub fn admits(&self, event: &LogEvent) -> bool {
        event.level >= self.min_level
            && filter_matches(self.source.as_ref(), &event.source)
            && filter_matches(self.tag.as_ref(), &event.tag)
            && filter_matches(self.message.as_ref(), &event.message)
    }
}

/// An ordered rule list evaluated as a logical OR: any matching rule admits
/// the event. An empty set admits nothing.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn admits(&self, event: &LogEvent) -> bool {
        self.rules.iter().any(|rule| rule.admits(event))
    }
}

fn filter_matches(filter: Option<&Regex>, field: &str) -> bool {
    filter.is_none_or(|re| re.is_match(field))
}

fn compile_filter(pattern: &str) -> Result<Option<Regex>, RuleError> {
    if pattern.is_empty() {
        return Ok(None);
    }
    match Regex::new(&format!("^(?:{pattern})$")) {
        Ok(re) => Ok(Some(re)),
        Err(source) => Err(RuleError::InvalidFilter {
            pattern: pattern.to_string(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(level: Level, source: &str, tag: &str, message: &str) -> LogEvent {
        LogEvent::new(level, source, tag, message)
    }

    #[test]
    fn test_level_threshold_is_inclusive() {
        let rule = Rule::new(Level::Warn, "", "", "").unwrap();
        assert!(!rule.admits(&event(Level::Info, "s", "t", "m")));
        assert!(rule.admits(&event(Level::Warn, "s", "t", "m")));
        assert!(rule.admits(&event(Level::Critical, "s", "t", "m")));
    }

    #[test]
    fn test_empty_filters_are_wildcards() {
        let rule = Rule::new(Level::Verbose, "", "", "").unwrap();
        assert!(rule.admits(&event(Level::Verbose, "any", "thing", "at all")));
    }

    #[test]
    fn test_filters_match_the_entire_field() {
        let rule = Rule::new(Level::Verbose, "alexa", "", "").unwrap();
        assert!(rule.admits(&event(Level::Info, "alexa", "t", "m")));
        // Substring hits are not admission; the pattern must cover the field.
        assert!(!rule.admits(&event(Level::Info, "aace.alexa", "t", "m")));

        let rule = Rule::new(Level::Verbose, r"aace\..*", "", "").unwrap();
        assert!(rule.admits(&event(Level::Info, "aace.alexa", "t", "m")));
        assert!(!rule.admits(&event(Level::Info, "navigation", "t", "m")));
    }

    #[test]
    fn test_all_present_filters_must_match() {
        let rule = Rule::new(Level::Verbose, "core", "Engine", "started.*").unwrap();
        assert!(rule.admits(&event(Level::Info, "core", "Engine", "started in 20ms")));
        assert!(!rule.admits(&event(Level::Info, "core", "Engine", "stopping")));
        assert!(!rule.admits(&event(Level::Info, "core", "Client", "started in 20ms")));
    }

    #[test]
    fn test_invalid_pattern_fails_construction() {
        let err = Rule::new(Level::Verbose, "(unclosed", "", "").unwrap_err();
        assert!(matches!(err, RuleError::InvalidFilter { ref pattern, .. } if pattern == "(unclosed"));
    }

    #[test]
    fn test_rule_set_is_a_logical_or() {
        let rules = RuleSet::new(vec![
            Rule::new(Level::Error, "", "", "").unwrap(),
            Rule::new(Level::Verbose, "core", "", "").unwrap(),
        ]);
        // Admitted by the second rule only.
        assert!(rules.admits(&event(Level::Info, "core", "t", "m")));
        // Admitted by the first rule only.
        assert!(rules.admits(&event(Level::Error, "navigation", "t", "m")));
        // Admitted by neither.
        assert!(!rules.admits(&event(Level::Info, "navigation", "t", "m")));
    }

    #[test]
    fn test_empty_rule_set_admits_nothing() {
        let rules = RuleSet::default();
        assert!(!rules.admits(&event(Level::Critical, "s", "t", "m")));
    }
}
