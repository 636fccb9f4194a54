//! Module parameter strings
//!
//! Backends are configured with a single opaque string of `key=value` pairs
//! separated by `:`, e.g. `model=llama3:url=http://localhost:11434`.
//!
//! | Rule | Example | Result |
//! |------|---------|--------|
//! | split on first `=` | `a=b=c` | `a` → `b=c` |
//! | first occurrence wins | `a=1:a=2` | `a` → `1` |
//! | segment without `=` after a pair | `url=http://h:80` | `url` → `http://h:80` |
//! | segment without `=` with no pair before it | `oops:a=1` | `oops` rejected |
//! | empty segment | `a=1::b=2` | ignored |
//!
//! The continuation rule lets values such as URLs carry `:` without escaping.

use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
    #[error("Required parameter \"{0}\" is not provided")]
    Missing(String),

    #[error("Parameter \"{key}\" has invalid value \"{value}\"")]
    Invalid { key: String, value: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleParams {
    entries: Vec<(String, String)>,
    rejected: Vec<String>,
}

impl ModuleParams {
    pub fn parse(text: &str) -> Self {
        let mut params = Self::default();
        // Index of the entry the previous segment extended, for continuations.
        let mut last: Option<usize> = None;

        for segment in text.split(':') {
            match segment.split_once('=') {
                Some((key, value)) if !key.is_empty() => {
                    if params.position(key).is_some() {
                        last = None;
                        continue;
                    }
                    params.entries.push((key.to_string(), value.to_string()));
                    last = Some(params.entries.len() - 1);
                }
                _ if segment.is_empty() => {}
                _ => match last {
                    Some(index) => {
                        let value = &mut params.entries[index].1;
                        value.push(':');
                        value.push_str(segment);
                    }
                    None => params.rejected.push(segment.to_string()),
                },
            }
        }
        params
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.position(key).map(|i| self.entries[i].1.as_str())
    }

    pub fn require(&self, key: &str) -> Result<&str, ParamError> {
        self.get(key)
            .ok_or_else(|| ParamError::Missing(key.to_string()))
    }

    /// Parse an optional value, falling back to `default` when absent.
    pub fn get_parsed<T: FromStr>(&self, key: &str, default: T) -> Result<T, ParamError> {
        match self.get(key) {
            None => Ok(default),
            Some(value) => value.parse().map_err(|_| ParamError::Invalid {
                key: key.to_string(),
                value: value.to_string(),
            }),
        }
    }

    /// Segments that were not in `key=value` form.
    pub fn rejected(&self) -> &[String] {
        &self.rejected
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromStr for ModuleParams {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}
