//! core::types
//!
//! Strong types for entity identity.
//!
//! # Types
//!
//! - [`ApplicationTag`] - Validated application name
//! - [`UnitTag`] - Validated unit name (`<application>/<number>`)
//! - [`MachineTag`] - Validated machine id (`0`, `0/lxd/1`, ...)
//! - [`ModelTag`] - Opaque model identifier
//! - [`ModelType`] - Unit placement model (`iaas` / `caas`)
//! - [`UtcTimestamp`] - RFC3339 timestamp as carried in documents
//!
//! # Validation
//!
//! Tags are opaque to the rest of the crate: they are compared, printed and
//! stored, never interpreted. Validation happens once at construction so an
//! invalid identifier cannot be represented.
//!
//! # Examples
//!
//! ```
//! use model_description::core::types::{ApplicationTag, UnitTag};
//!
//! let app = ApplicationTag::new("civil-wars").unwrap();
//! let unit = UnitTag::new("ubuntu/0").unwrap();
//! assert_eq!(unit.application(), "ubuntu");
//!
//! assert!(ApplicationTag::new("Bad_Name").is_err());
//! assert!(UnitTag::new("ubuntu").is_err());
//! # let _ = app;
//! ```

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid application name: {0:?}")]
    InvalidApplicationName(String),

    #[error("invalid unit name: {0:?}")]
    InvalidUnitName(String),

    #[error("invalid machine id: {0:?}")]
    InvalidMachineId(String),

    #[error("invalid model id: {0:?}")]
    InvalidModelId(String),

    #[error("invalid model type: {0:?}")]
    InvalidModelType(String),

    #[error("invalid endpoint role: {0:?}")]
    InvalidEndpointRole(String),

    #[error("invalid timestamp {value:?}: {reason}")]
    InvalidTimestamp { value: String, reason: String },
}

/// Application names: lowercase alphanumeric segments joined by `-`, starting
/// with a letter. Segments after the first must contain a letter so that
/// `foo-1` is not mistaken for a unit-like suffix.
fn is_valid_application_name(name: &str) -> bool {
    let mut segments = name.split('-');
    let first = match segments.next() {
        Some(first) => first,
        None => return false,
    };
    if !first.starts_with(|c: char| c.is_ascii_lowercase()) {
        return false;
    }
    let valid_chars = |s: &str| {
        !s.is_empty()
            && s
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
    };
    if !valid_chars(first) {
        return false;
    }
    segments.all(|s| valid_chars(s) && s.chars().any(|c| c.is_ascii_lowercase()))
}

fn is_number(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// Identity of an application (local or remote).
///
/// # Example
///
/// ```
/// use model_description::core::types::ApplicationTag;
///
/// let tag = ApplicationTag::new("mysql-router").unwrap();
/// assert_eq!(tag.as_str(), "mysql-router");
/// assert!(ApplicationTag::new("-leading").is_err());
/// assert!(ApplicationTag::new("foo-1").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ApplicationTag(String);

impl ApplicationTag {
    /// Create a new validated application tag.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidApplicationName` if the name is malformed.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        if !is_valid_application_name(&name) {
            return Err(TypeError::InvalidApplicationName(name));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identity of a unit: `<application>/<number>`.
///
/// # Example
///
/// ```
/// use model_description::core::types::UnitTag;
///
/// let tag = UnitTag::new("ubuntu/12").unwrap();
/// assert_eq!(tag.application(), "ubuntu");
/// assert_eq!(tag.number(), 12);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UnitTag(String);

impl UnitTag {
    /// Create a new validated unit tag.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidUnitName` unless the name is an application
    /// name followed by `/` and a number.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        match name.split_once('/') {
            Some((app, number)) if is_valid_application_name(app) && is_number(number) => {
                Ok(Self(name))
            }
            _ => Err(TypeError::InvalidUnitName(name)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The owning application's name.
    pub fn application(&self) -> &str {
        self.0.split_once('/').map(|(app, _)| app).unwrap_or(&self.0)
    }

    /// The unit number within its application.
    pub fn number(&self) -> u64 {
        self.0
            .split_once('/')
            .and_then(|(_, n)| n.parse().ok())
            .unwrap_or_default()
    }
}

/// Identity of a machine: a number, optionally followed by
/// `/<container-type>/<number>` pairs.
///
/// # Example
///
/// ```
/// use model_description::core::types::MachineTag;
///
/// assert!(MachineTag::new("0").is_ok());
/// assert!(MachineTag::new("3/lxd/1").is_ok());
/// assert!(MachineTag::new("3/lxd").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MachineTag(String);

impl MachineTag {
    /// Create a new validated machine tag.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidMachineId` if the id is malformed.
    pub fn new(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into();
        let parts: Vec<&str> = id.split('/').collect();
        let valid = parts.len() % 2 == 1
            && parts.iter().enumerate().all(|(i, part)| {
                if i % 2 == 0 {
                    is_number(part)
                } else {
                    !part.is_empty() && part.chars().all(|c| c.is_ascii_lowercase())
                }
            });
        if !valid {
            return Err(TypeError::InvalidMachineId(id));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this machine is a container inside another machine.
    pub fn is_container(&self) -> bool {
        self.0.contains('/')
    }
}

/// Identity of a model. Usually a UUID; only the character set is checked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModelTag(String);

impl ModelTag {
    /// Create a new model tag.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidModelId` if the id is empty or contains
    /// anything but ASCII alphanumerics and `-`.
    pub fn new(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into();
        if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(TypeError::InvalidModelId(id));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! string_tag_impls {
    ($($tag:ident),*) => {$(
        impl TryFrom<String> for $tag {
            type Error = TypeError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                Self::new(s)
            }
        }

        impl From<$tag> for String {
            fn from(tag: $tag) -> Self {
                tag.0
            }
        }

        impl AsRef<str> for $tag {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $tag {
            type Err = TypeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl std::fmt::Display for $tag {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    )*};
}

string_tag_impls!(ApplicationTag, UnitTag, MachineTag, ModelTag);

/// How units of a model are placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelType {
    /// Units run on machines and carry agent tools.
    Iaas,
    /// Units run in cloud containers managed by the substrate.
    Caas,
}

/// Model type literals in document form.
pub const MODEL_TYPES: &[&str] = &["iaas", "caas"];

impl ModelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelType::Iaas => "iaas",
            ModelType::Caas => "caas",
        }
    }
}

impl FromStr for ModelType {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "iaas" => Ok(ModelType::Iaas),
            "caas" => Ok(ModelType::Caas),
            other => Err(TypeError::InvalidModelType(other.to_string())),
        }
    }
}

impl std::fmt::Display for ModelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A UTC timestamp, rendered as RFC3339 with a `Z` suffix.
///
/// # Example
///
/// ```
/// use model_description::core::types::UtcTimestamp;
///
/// let ts = UtcTimestamp::parse("2016-01-28T11:50:00Z").unwrap();
/// assert_eq!(ts.to_string(), "2016-01-28T11:50:00Z");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UtcTimestamp(DateTime<Utc>);

impl UtcTimestamp {
    /// Create a timestamp from a chrono DateTime.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Parse an RFC3339 string, normalising any offset to UTC.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidTimestamp` if the string is not RFC3339.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| Self(dt.with_timezone(&Utc)))
            .map_err(|e| TypeError::InvalidTimestamp {
                value: s.to_string(),
                reason: e.to_string(),
            })
    }

    /// Get the underlying datetime.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }
}

impl std::fmt::Display for UtcTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }
}
