//! Document loading
//!
//! Wire documents arrive as JSON or YAML. JSON input is detected by its
//! leading bracket and decoded with `serde_json`; everything else goes
//! through `serde_yaml`.

use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Document parser utilities
pub struct DocumentParser;

impl DocumentParser {
    /// Parse a JSON or YAML document
    pub fn parse<T: DeserializeOwned>(content: &str) -> Result<T> {
        if Self::is_json(content) {
            Ok(serde_json::from_str(content)?)
        } else {
            Ok(serde_yaml::from_str(content)?)
        }
    }

    /// Serialize a document as pretty JSON
    pub fn to_json<T: Serialize>(document: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(document)?)
    }

    /// Serialize a document as YAML
    pub fn to_yaml<T: Serialize>(document: &T) -> Result<String> {
        Ok(serde_yaml::to_string(document)?)
    }

    fn is_json(content: &str) -> bool {
        matches!(content.trim_start().chars().next(), Some('{') | Some('['))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::WhitelistDto;

    #[test]
    fn test_parse_json_and_yaml() {
        let json: WhitelistDto = DocumentParser::parse(r#"{"paths": ["/DC1/Zone1"], "version": 2}"#).unwrap();
        let yaml: WhitelistDto = DocumentParser::parse("paths:\n  - /DC1/Zone1\nversion: 2\n").unwrap();
        assert_eq!(json, yaml);
        assert_eq!(json.version, 2);
    }

    #[test]
    fn test_parse_errors_are_reported() {
        assert!(DocumentParser::parse::<WhitelistDto>("{not json").is_err());
        assert!(DocumentParser::parse::<WhitelistDto>("paths: [unclosed").is_err());
    }
}
