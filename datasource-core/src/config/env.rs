//! Environment lookups and `${...}` substitution.

use super::Config;
use crate::error::{DataSourceError, DataSourceResult};
use std::collections::HashMap;

/// Maximum nesting of substitutions that reference other substitutions.
const MAX_DEPTH: usize = 16;

/// Source for environment variables.
pub trait EnvSource: Send + Sync {
    /// Get an environment variable value.
    fn get(&self, name: &str) -> Option<String>;

    /// Check if a variable exists.
    fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

/// Default environment source using std::env.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdEnvSource;

impl EnvSource for StdEnvSource {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Environment source backed by a HashMap.
#[derive(Debug, Clone, Default)]
pub struct MapEnvSource {
    vars: HashMap<String, String>,
}

impl MapEnvSource {
    /// Create a new map-based environment source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// Add multiple variables.
    pub fn with_vars(mut self, vars: HashMap<String, String>) -> Self {
        self.vars.extend(vars);
        self
    }
}

impl EnvSource for MapEnvSource {
    fn get(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

/// Expands `${...}` references against a configuration tree, falling back to
/// the environment.
///
/// Supported syntax:
/// - `${path}` - Required config path or environment variable
/// - `${path:-default}` - With default value
/// - `${path:?error message}` - Required with custom error
/// - `${path:+value}` - `value` if set, empty otherwise
/// - `$${` - A literal `${`
///
/// Defaults and alternate values may contain further references. A `$` not
/// followed by `{` is kept literally.
pub(crate) struct Substitutor<'a> {
    config: &'a Config,
    env: &'a dyn EnvSource,
}

impl<'a> Substitutor<'a> {
    pub(crate) fn new(config: &'a Config, env: &'a dyn EnvSource) -> Self {
        Self { config, env }
    }

    pub(crate) fn expand(&self, input: &str) -> DataSourceResult<String> {
        self.expand_at(input, 0)
    }

    fn expand_at(&self, input: &str, depth: usize) -> DataSourceResult<String> {
        let mut result = String::with_capacity(input.len());
        let mut rest = input;

        while let Some(pos) = rest.find('$') {
            result.push_str(&rest[..pos]);
            let tail = &rest[pos..];
            if let Some(after) = tail.strip_prefix("$${") {
                result.push_str("${");
                rest = after;
            } else if let Some(after) = tail.strip_prefix("${") {
                let (body, after) = split_braced(after)?;
                result.push_str(&self.expand_braced(body, depth)?);
                rest = after;
            } else {
                result.push('$');
                rest = &tail[1..];
            }
        }
        result.push_str(rest);

        Ok(result)
    }

    fn expand_braced(&self, body: &str, depth: usize) -> DataSourceResult<String> {
        let (name, modifier, word) = match body.split_once(':') {
            Some((name, rest)) => {
                let mut chars = rest.chars();
                let modifier = chars.next();
                (name, modifier, chars.as_str())
            }
            None => (body, None, ""),
        };

        let name = name.trim();
        if name.is_empty() {
            return Err(DataSourceError::config("Empty substitution '${}'"));
        }

        match self.lookup(name, depth)? {
            Some(value) if !value.is_empty() => match modifier {
                Some('+') => self.expand_at(word, depth),
                _ => Ok(value),
            },
            _ => match modifier {
                Some('-') => self.expand_at(word, depth),
                Some('+') => Ok(String::new()),
                Some('?') => {
                    let message = self.expand_at(word, depth)?;
                    Err(DataSourceError::config(if message.is_empty() {
                        format!("Required substitution '{}' is not set", name)
                    } else {
                        message
                    }))
                }
                _ => Err(DataSourceError::config(format!(
                    "Could not resolve substitution '${{{}}}'",
                    name
                ))),
            },
        }
    }

    fn lookup(&self, name: &str, depth: usize) -> DataSourceResult<Option<String>> {
        let Some(value) = self.config.get(name) else {
            return Ok(self.env.get(name));
        };

        let value = super::scalar_to_string(name, value)?;
        if !value.contains("${") {
            return Ok(Some(value));
        }

        if depth >= MAX_DEPTH {
            return Err(DataSourceError::config(format!(
                "Substitution cycle detected while resolving '{}'",
                name
            )));
        }
        self.expand_at(&value, depth + 1).map(Some)
    }
}

/// Split the body of a `${` reference from the text after its closing brace.
fn split_braced(input: &str) -> DataSourceResult<(&str, &str)> {
    let mut open = 0usize;
    for (i, c) in input.char_indices() {
        match c {
            '{' => open += 1,
            '}' if open == 0 => return Ok((&input[..i], &input[i + 1..])),
            '}' => open -= 1,
            _ => {}
        }
    }
    Err(DataSourceError::config(format!(
        "Unterminated substitution '${{{}'",
        input
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_source() -> MapEnvSource {
        MapEnvSource::new()
            .set("HOST", "localhost")
            .set("PORT", "5432")
            .set("EMPTY", "")
    }

    fn test_config() -> Config {
        Config::parse(
            r#"
            [application]
            name = "jdbctest"
            tmpdir = "target"
            home = "${application.tmpdir}/home"
            "#,
        )
        .unwrap()
    }

    #[test]
    fn test_expand_config_path() {
        let config = test_config();
        let env = test_source();
        let sub = Substitutor::new(&config, &env);

        assert_eq!(
            sub.expand("jdbc:h2:${application.tmpdir}/${application.name}").unwrap(),
            "jdbc:h2:target/jdbctest"
        );
    }

    #[test]
    fn test_expand_nested_reference() {
        let config = test_config();
        let env = test_source();
        let sub = Substitutor::new(&config, &env);

        assert_eq!(sub.expand("${application.home}").unwrap(), "target/home");
    }

    #[test]
    fn test_expand_env_fallback() {
        let config = test_config();
        let env = test_source();
        let sub = Substitutor::new(&config, &env);

        assert_eq!(
            sub.expand("jdbc:postgresql://${HOST}:${PORT}/db").unwrap(),
            "jdbc:postgresql://localhost:5432/db"
        );
    }

    #[test]
    fn test_expand_default() {
        let config = test_config();
        let env = test_source();
        let sub = Substitutor::new(&config, &env);

        assert_eq!(sub.expand("${HOST:-default}").unwrap(), "localhost");
        assert_eq!(sub.expand("${MISSING:-/tmp}").unwrap(), "/tmp");
        assert_eq!(sub.expand("${EMPTY:-default}").unwrap(), "default");
    }

    #[test]
    fn test_expand_required() {
        let config = test_config();
        let env = test_source();
        let sub = Substitutor::new(&config, &env);

        let err = sub.expand("${MISSING:?Missing is required}").unwrap_err();
        assert!(err.to_string().contains("Missing is required"));
    }

    #[test]
    fn test_expand_alternate() {
        let config = test_config();
        let env = test_source();
        let sub = Substitutor::new(&config, &env);

        assert_eq!(sub.expand("${HOST:+set}").unwrap(), "set");
        assert_eq!(sub.expand("${MISSING:+set}").unwrap(), "");
    }

    #[test]
    fn test_unresolved_is_configuration_error() {
        let config = test_config();
        let env = test_source();
        let sub = Substitutor::new(&config, &env);

        let err = sub.expand("${MISSING}").unwrap_err();
        assert!(err.is_configuration());
        assert!(sub.expand("${HOST").is_err());
    }

    #[test]
    fn test_cycle_detected() {
        let config = Config::parse("a = \"${b}\"\nb = \"${a}\"").unwrap();
        let env = MapEnvSource::new();
        let sub = Substitutor::new(&config, &env);

        let err = sub.expand("${a}").unwrap_err();
        assert!(err.to_string().contains("cycle"));
    }

    #[test]
    fn test_literal_dollar() {
        let config = test_config();
        let env = test_source();
        let sub = Substitutor::new(&config, &env);

        assert_eq!(sub.expand("pa$$word").unwrap(), "pa$$word");
    }

    #[test]
    fn test_nested_default() {
        let config = test_config();
        let env = test_source().set("B", "x");
        let sub = Substitutor::new(&config, &env);

        assert_eq!(
            sub.expand("jdbc:postgresql://${A:-${B}}/orders").unwrap(),
            "jdbc:postgresql://x/orders"
        );
        assert_eq!(
            sub.expand("${A:-${C:-${application.tmpdir}}}/db").unwrap(),
            "target/db"
        );
        assert_eq!(sub.expand("${HOST:+${PORT}}").unwrap(), "5432");
        assert!(sub.expand("${A:-${C}}").is_err());
        assert!(sub.expand("${A:-${B}").is_err());
    }

    #[test]
    fn test_escaped_reference() {
        let config = test_config();
        let env = test_source();
        let sub = Substitutor::new(&config, &env);

        assert_eq!(sub.expand("pa$${ss").unwrap(), "pa${ss");
        assert_eq!(sub.expand("$${HOST}").unwrap(), "${HOST}");
        assert_eq!(sub.expand("${MISSING:-$${x}}").unwrap(), "${x}");
    }
}
