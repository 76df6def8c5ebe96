//! Route pattern compilation and matching.
//!
//! # Responsibilities
//! - Compile `/tasks/:id` style templates into anchored regular expressions
//! - Capture named parameters and an optional trailing query string in one pass
//!
//! # Design Decisions
//! - Parameter names are ASCII letters only; a name ends at the first non-letter
//! - A `:` not followed by a letter is literal text
//! - Parameter values accept lowercase letters, digits, `-` and `_`
//! - Literal text is escaped so templates never carry regex syntax

use std::collections::HashMap;

use regex::Regex;
use thiserror::Error;

use crate::routing::query::{parse_query, QueryParams};

/// Name of the capture group holding the raw query string.
pub const QUERY_GROUP: &str = "query";

const PARAM_VALUE_CLASS: &str = "[a-z0-9_-]+";

/// Errors raised while compiling a route template.
#[derive(Debug, Error)]
pub enum PatternError {
    /// The parameter name collides with the query capture group.
    #[error("parameter name `{name}` is reserved (template `{template}`)")]
    ReservedName { template: String, name: String },

    /// The same parameter name appears twice in one template.
    #[error("duplicate parameter `{name}` in template `{template}`")]
    DuplicateParameter { template: String, name: String },

    /// The generated expression was rejected by the regex engine.
    #[error("invalid route template `{template}`: {source}")]
    Regex {
        template: String,
        #[source]
        source: regex::Error,
    },
}

/// Captures produced by a successful match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteMatch {
    /// Named path parameters.
    pub params: HashMap<String, String>,
    /// Parsed query string, empty when the target carried none.
    pub query: QueryParams,
}

/// A compiled path template.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    template: String,
    regex: Regex,
    params: Vec<String>,
}

impl RoutePattern {
    /// Compile a template such as `/tasks/:id`.
    pub fn compile(template: &str) -> Result<Self, PatternError> {
        let mut source = String::from("^");
        let mut params: Vec<String> = Vec::new();
        let mut rest = template;

        while let Some(colon) = rest.find(':') {
            source.push_str(&regex::escape(&rest[..colon]));
            let after_colon = &rest[colon + 1..];
            let name_len = after_colon
                .find(|c: char| !c.is_ascii_alphabetic())
                .unwrap_or(after_colon.len());

            if name_len == 0 {
                source.push(':');
                rest = after_colon;
                continue;
            }

            let name = &after_colon[..name_len];
            if name == QUERY_GROUP {
                return Err(PatternError::ReservedName {
                    template: template.to_string(),
                    name: name.to_string(),
                });
            }
            if params.iter().any(|existing| existing == name) {
                return Err(PatternError::DuplicateParameter {
                    template: template.to_string(),
                    name: name.to_string(),
                });
            }

            source.push_str(&format!("(?P<{name}>{PARAM_VALUE_CLASS})"));
            params.push(name.to_string());
            rest = &after_colon[name_len..];
        }

        source.push_str(&regex::escape(rest));
        source.push_str(&format!(r"(?P<{QUERY_GROUP}>\?(.*))?$"));

        let regex = Regex::new(&source).map_err(|source| PatternError::Regex {
            template: template.to_string(),
            source,
        })?;

        Ok(Self {
            template: template.to_string(),
            regex,
            params,
        })
    }

    /// The template this pattern was compiled from.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Parameter names in template order.
    pub fn param_names(&self) -> &[String] {
        &self.params
    }

    /// Returns true if `target` (path plus optional query) matches.
    pub fn is_match(&self, target: &str) -> bool {
        self.regex.is_match(target)
    }

    /// Match `target` and extract named parameters and the query string.
    pub fn captures(&self, target: &str) -> Option<RouteMatch> {
        let captures = self.regex.captures(target)?;

        let params = self
            .params
            .iter()
            .filter_map(|name| {
                captures
                    .name(name)
                    .map(|value| (name.clone(), value.as_str().to_string()))
            })
            .collect();

        let query = captures
            .name(QUERY_GROUP)
            .map(|raw| parse_query(raw.as_str()))
            .unwrap_or_default();

        Some(RouteMatch { params, query })
    }
}
