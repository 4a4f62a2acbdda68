//! Path pattern matching.
//!
//! # Responsibilities
//! - Compile `/literal/{param}` patterns at startup
//! - Match request paths segment by segment (case-sensitive)
//! - Capture parameter segments and render upstream templates
//!
//! # Design Decisions
//! - Segment counts must be equal: no wildcards, no prefix matching
//! - No regex to guarantee O(n) matching
//! - Empty, `.` and `..` segments never bind to a parameter, so a captured
//!   value cannot walk the upstream path. The check runs on the
//!   percent-decoded segment: `%2e%2e` is resolved as `..` further down.

use std::collections::HashMap;

/// One segment of a compiled pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// Values captured from a matched path, keyed by parameter name.
pub type Params = HashMap<String, String>;

/// A compiled inbound path pattern such as `/api/admin/users/{id}`.
#[derive(Debug, Clone)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Compile a pattern. It must start with `/`; `{name}` segments capture.
    pub fn parse(pattern: &str) -> Result<Self, String> {
        let rest = pattern
            .strip_prefix('/')
            .ok_or_else(|| format!("pattern '{}' must start with '/'", pattern))?;

        let mut segments = Vec::new();
        let mut names = Vec::new();
        if !rest.is_empty() {
            for part in rest.split('/') {
                match parse_segment(part)? {
                    Some(name) => {
                        if names.contains(&name) {
                            return Err(format!("parameter '{}' appears twice", name));
                        }
                        names.push(name.clone());
                        segments.push(Segment::Param(name));
                    }
                    None => segments.push(Segment::Literal(part.to_string())),
                }
            }
        }

        Ok(Self {
            raw: pattern.to_string(),
            segments,
        })
    }

    /// The pattern as written in configuration.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns true if the pattern declares a parameter called `name`.
    pub fn has_param(&self, name: &str) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Param(p) if p == name))
    }

    /// Match `path` against the pattern, returning captured parameters.
    pub fn captures(&self, path: &str) -> Option<Params> {
        let rest = path.strip_prefix('/')?;
        let parts: Vec<&str> = if rest.is_empty() {
            Vec::new()
        } else {
            rest.split('/').collect()
        };

        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = Params::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(lit) => {
                    if lit != part {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    if !is_bindable(part) {
                        return None;
                    }
                    params.insert(name.clone(), part.to_string());
                }
            }
        }
        Some(params)
    }

    /// Names of every `{placeholder}` in a template, in order.
    pub fn placeholders(template: &str) -> Result<Vec<String>, String> {
        let mut names = Vec::new();
        for part in template.split('/') {
            if let Some(name) = parse_segment(part)? {
                names.push(name);
            }
        }
        Ok(names)
    }

    /// Substitute captured parameters into an upstream template.
    ///
    /// Placeholders must occupy a whole segment; validation guarantees every
    /// placeholder has a value.
    pub fn render(template: &str, params: &Params) -> String {
        template
            .split('/')
            .map(|part| match parse_segment(part) {
                Ok(Some(name)) => params.get(&name).map(String::as_str).unwrap_or(part),
                _ => part,
            })
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Whether a raw path segment may be captured by a parameter.
fn is_bindable(part: &str) -> bool {
    match urlencoding::decode(part) {
        Ok(decoded) => {
            !(decoded.is_empty() || decoded == "." || decoded == ".." || decoded.contains('/'))
        }
        Err(_) => false,
    }
}

/// Returns the parameter name for a `{name}` segment, None for a literal.
fn parse_segment(part: &str) -> Result<Option<String>, String> {
    match part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
        Some(name) => {
            if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(format!("invalid parameter segment '{}'", part));
            }
            Ok(Some(name.to_string()))
        }
        None if part.contains('{') || part.contains('}') => {
            Err(format!("braces must enclose a whole segment: '{}'", part))
        }
        None => Ok(None),
    }
}
