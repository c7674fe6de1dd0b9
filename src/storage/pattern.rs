use regex::Regex;

/// Glob-style selector for source objects, e.g. `song_data/*/*/*/*.json`.
///
/// `*` matches any run of characters within one key segment and `?` matches a
/// single character; neither crosses a `/`. The pattern must match the whole key.
#[derive(Debug, Clone)]
pub struct SourcePattern {
    pattern: String,
    prefix: String,
    regex: Regex,
}

impl SourcePattern {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let pattern = pattern.trim_matches('/');

        let mut expr = String::with_capacity(pattern.len() * 2 + 2);
        expr.push('^');
        for c in pattern.chars() {
            match c {
                '*' => expr.push_str("[^/]*"),
                '?' => expr.push_str("[^/]"),
                other => expr.push_str(&regex::escape(&other.to_string())),
            }
        }
        expr.push('$');

        let prefix = pattern
            .split('/')
            .take_while(|segment| !segment.contains(['*', '?']))
            .collect::<Vec<_>>();
        // A fully literal pattern names a single object, list its parent.
        let prefix = if prefix.len() == pattern.split('/').count() {
            prefix[..prefix.len().saturating_sub(1)].join("/")
        } else {
            prefix.join("/")
        };

        Ok(Self {
            pattern: pattern.to_string(),
            prefix,
            regex: Regex::new(&expr)?,
        })
    }

    /// Longest literal leading path, used as the listing prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn matches(&self, key: &str) -> bool {
        self.regex.is_match(key)
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }
}

impl std::fmt::Display for SourcePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn song_data_depth_is_enforced() {
        let p = SourcePattern::new("song_data/*/*/*/*.json").unwrap();
        assert_eq!(p.prefix(), "song_data");
        assert!(p.matches("song_data/A/B/C/TRABCEI128F424C983.json"));
        assert!(!p.matches("song_data/A/B/TRABCEI128F424C983.json"));
        assert!(!p.matches("song_data/A/B/C/D/TRABCEI128F424C983.json"));
        assert!(!p.matches("song_data/A/B/C/notes.txt"));
    }

    #[test]
    fn log_data_pattern() {
        let p = SourcePattern::new("log_data/*/*/*.json").unwrap();
        assert!(p.matches("log_data/2018/11/2018-11-12-events.json"));
        assert!(!p.matches("song_data/2018/11/2018-11-12-events.json"));
    }

    #[test]
    fn literal_segments_extend_prefix() {
        let p = SourcePattern::new("song_data/A/A/A/*.json").unwrap();
        assert_eq!(p.prefix(), "song_data/A/A/A");
        assert!(p.matches("song_data/A/A/A/TRAAAAW128F429D538.json"));
        assert!(!p.matches("song_data/A/A/B/TRAABCL128F4286650.json"));
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        let p = SourcePattern::new("data+1/?.json").unwrap();
        assert!(p.matches("data+1/a.json"));
        assert!(!p.matches("dataa1/a.json"));
        assert!(!p.matches("data+1/ab.json"));
    }

    #[test]
    fn literal_pattern_lists_parent() {
        let p = SourcePattern::new("log_data/one.json").unwrap();
        assert_eq!(p.prefix(), "log_data");
        assert!(p.matches("log_data/one.json"));
    }
}
