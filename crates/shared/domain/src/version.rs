use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A `major.minor` API version.
///
/// Parsed from `1`, `1.0`, `v1` or `v1.0` and always rendered as `1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ApiVersion {
    pub major: u32,
    pub minor: u32,
}

impl ApiVersion {
    #[must_use]
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Documentation group name (`v1.0`).
    #[must_use]
    pub fn group_name(&self) -> String {
        format!("v{self}")
    }
}

impl Default for ApiVersion {
    fn default() -> Self {
        Self::new(1, 0)
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Returned when a string is not a `major[.minor]` version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseApiVersionError {
    input: String,
}

impl ParseApiVersionError {
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl fmt::Display for ParseApiVersionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a valid API version", self.input)
    }
}

impl std::error::Error for ParseApiVersionError {}

impl FromStr for ApiVersion {
    type Err = ParseApiVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseApiVersionError { input: s.to_owned() };

        let raw = s.strip_prefix(['v', 'V']).unwrap_or(s);
        let (major, minor) = raw.split_once('.').unwrap_or((raw, "0"));

        let parse = |part: &str| {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            part.parse::<u32>().ok()
        };

        match (parse(major), parse(minor)) {
            (Some(major), Some(minor)) => Ok(Self { major, minor }),
            _ => Err(err()),
        }
    }
}

impl TryFrom<String> for ApiVersion {
    type Error = ParseApiVersionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ApiVersion> for String {
    fn from(value: ApiVersion) -> Self {
        value.to_string()
    }
}

/// Everything the documentation layer needs to know about one supported version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiVersionDescription {
    pub version: ApiVersion,
    pub group_name: String,
    pub deprecated: bool,
}

impl ApiVersionDescription {
    #[must_use]
    pub fn new(version: ApiVersion, deprecated: bool) -> Self {
        Self { group_name: version.group_name(), version, deprecated }
    }

    /// Label shown in the documentation UI (`V1.0`).
    #[must_use]
    pub fn label(&self) -> String {
        self.group_name.to_uppercase()
    }

    /// Route serving this version's `OpenAPI` document.
    #[must_use]
    pub fn document_path(&self) -> String {
        format!("/swagger/{}/swagger.json", self.group_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_segment_forms() {
        assert_eq!("1".parse::<ApiVersion>(), Ok(ApiVersion::new(1, 0)));
        assert_eq!("1.0".parse::<ApiVersion>(), Ok(ApiVersion::new(1, 0)));
        assert_eq!("v2".parse::<ApiVersion>(), Ok(ApiVersion::new(2, 0)));
        assert_eq!("V2.5".parse::<ApiVersion>(), Ok(ApiVersion::new(2, 5)));
    }

    #[test]
    fn rejects_garbage() {
        for raw in ["", "v", "1.", ".1", "1.x", "1.0.0", "v-1", "+1", "one"] {
            assert!(raw.parse::<ApiVersion>().is_err(), "{raw} should not parse");
        }
    }

    #[test]
    fn ordering_is_numeric() {
        assert!(ApiVersion::new(1, 10) > ApiVersion::new(1, 9));
        assert!(ApiVersion::new(10, 0) > ApiVersion::new(2, 0));
    }

    #[test]
    fn description_names() {
        let desc = ApiVersionDescription::new(ApiVersion::new(1, 0), false);
        assert_eq!(desc.group_name, "v1.0");
        assert_eq!(desc.label(), "V1.0");
        assert_eq!(desc.document_path(), "/swagger/v1.0/swagger.json");
    }
}
