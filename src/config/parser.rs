//! Key/value config file parser.
//!
//! Accepts one `key = value` or `key: value` pair per line. Blank lines and
//! lines starting with `#` or `;` are skipped. A `[section]` header scopes
//! the keys below it as `section.key`; keys before any header are stored
//! bare. Values wrapped in matching single or double quotes are unwrapped.
//! When a key repeats, the last occurrence wins.

use indexmap::IndexMap;

/// Parse config text into an ordered key → value map.
pub fn parse_key_values(input: &str) -> IndexMap<String, String> {
    let mut entries = IndexMap::new();
    let mut section: Option<String> = None;

    for (idx, raw) in input.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(name) = parse_section_header(line) {
            section = (!name.is_empty()).then(|| name.to_string());
            continue;
        }

        let Some((key, value)) = split_pair(line) else {
            tracing::debug!(line = idx + 1, "skipping config line without a separator");
            continue;
        };
        if key.is_empty() {
            tracing::debug!(line = idx + 1, "skipping config line with an empty key");
            continue;
        }

        let key = match &section {
            Some(s) => format!("{s}.{key}"),
            None => key.to_string(),
        };
        entries.insert(key, unquote(value).to_string());
    }

    entries
}

/// Return the section name for a `[name]` line.
fn parse_section_header(line: &str) -> Option<&str> {
    line.strip_prefix('[')?.strip_suffix(']').map(str::trim)
}

/// Split on the first `=` or `:`, whichever comes first.
fn split_pair(line: &str) -> Option<(&str, &str)> {
    let idx = line.find(['=', ':'])?;
    Some((line[..idx].trim(), line[idx + 1..].trim()))
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_equals_pairs() {
        let map = parse_key_values(
            "AWSAccessKeyId=AKIA123\nAWSSecretKey = shh\nAWSRegion= us-east-1\n",
        );
        assert_eq!(map.len(), 3);
        assert_eq!(map["AWSAccessKeyId"], "AKIA123");
        assert_eq!(map["AWSSecretKey"], "shh");
        assert_eq!(map["AWSRegion"], "us-east-1");
    }

    #[test]
    fn parses_colon_pairs() {
        let map = parse_key_values("DBHost: db.example.com\nDBPort: 27017");
        assert_eq!(map["DBHost"], "db.example.com");
        assert_eq!(map["DBPort"], "27017");
    }

    #[test]
    fn first_separator_wins() {
        let map = parse_key_values("Endpoint = https://ec2.example.com:443\nlabel: a=b");
        assert_eq!(map["Endpoint"], "https://ec2.example.com:443");
        assert_eq!(map["label"], "a=b");
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let map = parse_key_values("# comment\n\n; another\n  \nkey = value\n");
        assert_eq!(map.len(), 1);
        assert_eq!(map["key"], "value");
    }

    #[test]
    fn strips_matching_quotes_only() {
        let map = parse_key_values("a = \"quoted value\"\nb = 'single'\nc = \"unbalanced'\nd = \"");
        assert_eq!(map["a"], "quoted value");
        assert_eq!(map["b"], "single");
        assert_eq!(map["c"], "\"unbalanced'");
        assert_eq!(map["d"], "\"");
    }

    #[test]
    fn sections_qualify_keys() {
        let map = parse_key_values("top = 1\n[db]\nhost = h\n[ ]\nbare = 2\n");
        assert_eq!(map["top"], "1");
        assert_eq!(map["db.host"], "h");
        assert_eq!(map["bare"], "2");
        assert!(!map.contains_key("host"));
    }

    #[test]
    fn last_duplicate_wins() {
        let map = parse_key_values("AWSRegion = us-east-1\nAWSRegion = eu-west-1\n");
        assert_eq!(map.len(), 1);
        assert_eq!(map["AWSRegion"], "eu-west-1");
    }

    #[test]
    fn ignores_malformed_lines() {
        let map = parse_key_values("no separator here\n= orphan value\nok = yes");
        assert_eq!(map.len(), 1);
        assert_eq!(map["ok"], "yes");
    }

    #[test]
    fn empty_value_is_kept() {
        let map = parse_key_values("AWSRegion =\n");
        assert_eq!(map["AWSRegion"], "");
    }
}
