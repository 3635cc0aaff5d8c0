use std::{env, fs};

use serde::Deserialize;

/// Where a secret configuration value comes from.
///
/// Values are resolved on every use, so rotating an env var or a mounted file
/// takes effect without a restart.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum GenericSourceValue {
    Literal {
        value: String,
    },
    FromEnv {
        from_env: String,
        /// alternate variable names, tried in order when `from_env` is unset
        #[serde(default)]
        or_env: Vec<String>,
    },
    FromFile {
        path: String,
    },
}

impl GenericSourceValue {
    /// Resolve to a non-empty string, `None` when unset, unreadable or blank.
    pub fn resolve(&self) -> Option<String> {
        let value = match self {
            GenericSourceValue::Literal { value } => Some(value.to_owned()),
            GenericSourceValue::FromEnv { from_env, or_env } => std::iter::once(from_env)
                .chain(or_env.iter())
                .find_map(|name| env::var(name).ok().filter(|v| !v.trim().is_empty())),
            GenericSourceValue::FromFile { path } => fs::read_to_string(path)
                .ok()
                .map(|content| content.trim().to_string()),
        };
        value.filter(|v| !v.is_empty())
    }

    /// Human readable origin, safe to log.
    pub fn describe(&self) -> String {
        match self {
            GenericSourceValue::Literal { .. } => "literal".to_owned(),
            GenericSourceValue::FromEnv { from_env, or_env } if or_env.is_empty() => {
                format!("env {}", from_env)
            }
            GenericSourceValue::FromEnv { from_env, or_env } => {
                format!("env {} (or {})", from_env, or_env.join(", "))
            }
            GenericSourceValue::FromFile { path } => format!("file {}", path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    #[serial]
    fn env_value_falls_back_to_alternate_name() {
        env::remove_var("AUTH_FETCH_TEST_PRIMARY");
        env::set_var("AUTH_FETCH_TEST_ALT", "alt-id");
        let value = GenericSourceValue::FromEnv {
            from_env: "AUTH_FETCH_TEST_PRIMARY".into(),
            or_env: vec!["AUTH_FETCH_TEST_ALT".into()],
        };
        assert_eq!(value.resolve(), Some("alt-id".to_string()));

        env::set_var("AUTH_FETCH_TEST_PRIMARY", "primary-id");
        assert_eq!(value.resolve(), Some("primary-id".to_string()));

        env::remove_var("AUTH_FETCH_TEST_PRIMARY");
        env::remove_var("AUTH_FETCH_TEST_ALT");
        assert_eq!(value.resolve(), None);
    }

    #[test]
    fn file_value_is_trimmed_and_blank_is_none() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "  secret-from-file  ").unwrap();
        let value = GenericSourceValue::FromFile {
            path: file.path().to_string_lossy().into_owned(),
        };
        assert_eq!(value.resolve(), Some("secret-from-file".to_string()));

        let blank = GenericSourceValue::Literal { value: "".into() };
        assert_eq!(blank.resolve(), None);

        let missing = GenericSourceValue::FromFile {
            path: "/definitely/not/here".into(),
        };
        assert_eq!(missing.resolve(), None);
    }

    #[test]
    fn untagged_yaml_shapes_deserialize() {
        let literal: GenericSourceValue = serde_yaml::from_str("value: abc").unwrap();
        assert_eq!(literal, GenericSourceValue::Literal { value: "abc".into() });

        let env_value: GenericSourceValue =
            serde_yaml::from_str("from_env: A\nor_env: [B, C]").unwrap();
        assert_eq!(
            env_value,
            GenericSourceValue::FromEnv {
                from_env: "A".into(),
                or_env: vec!["B".into(), "C".into()]
            }
        );
        assert_eq!(env_value.describe(), "env A (or B, C)");
    }
}
