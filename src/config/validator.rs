use std::collections::HashSet;

/// Knows which configuration keys scrubsum actually reads
pub struct ConfigValidator {
    /// Dotted keys recognized by the loader
    known_fields: HashSet<&'static str>,
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigValidator {
    /// Create a new validator with known configuration fields
    #[must_use]
    pub fn new() -> Self {
        let known_fields = [
            "scan",
            "scan.workers",
            "scan.buffer_size",
            "scan.follow_symlinks",
            "output",
            "output.progress",
            "output.color",
        ]
        .into_iter()
        .collect();

        Self { known_fields }
    }

    /// Dotted paths of every key in `table` that would be silently ignored
    #[must_use]
    pub fn unknown_fields(&self, table: &toml::Table) -> Vec<String> {
        let mut unknown = Vec::new();
        self.check_table(table, "", &mut unknown);
        unknown
    }

    /// Recursively collect unknown keys below `prefix`
    fn check_table(&self, table: &toml::Table, prefix: &str, unknown: &mut Vec<String>) {
        for (key, value) in table {
            let full_key = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };

            if !self.known_fields.contains(full_key.as_str()) {
                unknown.push(full_key);
                continue;
            }

            if let toml::Value::Table(section) = value {
                self.check_table(section, &full_key, unknown);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unknown(content: &str) -> Vec<String> {
        let table: toml::Table = toml::from_str(content).unwrap();
        let mut fields = ConfigValidator::new().unknown_fields(&table);
        fields.sort();
        fields
    }

    #[test]
    fn test_known_fields_pass() {
        assert!(unknown("[scan]\nworkers = 4\n[output]\ncolor = \"auto\"\n").is_empty());
    }

    #[test]
    fn test_unknown_fields_reported() {
        assert_eq!(
            unknown("[scan]\nworkerz = 4\n[cache]\nsize = 1\n"),
            vec!["cache".to_string(), "scan.workerz".to_string()]
        );
    }
}
