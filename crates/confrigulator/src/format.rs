//! text formats for documents
//!
//! [Format::load] turns raw text into a [Value] document, [Format::dump] writes one back.
//! Both directions keep object key order.
use crate::value::{ConversionError, Value};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json,
}

impl Format {
    /// Picks a format from a file extension (`yaml`, `yml` or `json`)
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        match path.extension().and_then(|extension| extension.to_str()) {
            Some("yaml" | "yml") => Ok(Format::Yaml),
            Some("json") => Ok(Format::Json),
            _ => Err(LoadError::UnknownFormat(path.to_owned())),
        }
    }

    /// Parses a document; empty yaml input is an empty object
    pub fn load(self, raw: &str) -> Result<Value, LoadError> {
        match self {
            Format::Yaml => {
                let yaml: serde_yaml::Value = serde_yaml::from_str(raw)?;
                if yaml.is_null() {
                    return Ok(Value::empty_object());
                }
                Ok(Value::from_yaml(yaml)?)
            }
            Format::Json => {
                let json: serde_json::Value = serde_json::from_str(raw)?;
                Ok(Value::from_json(json)?)
            }
        }
    }

    /// Renders a document
    ///
    /// Json has no NaN or infinity, such decimals are refused rather than written as `null`.
    pub fn dump(self, document: &Value) -> Result<String, LoadError> {
        Ok(match self {
            Format::Yaml => serde_yaml::to_string(document)?,
            Format::Json => {
                if let Some(decimal) = document.find_non_finite() {
                    return Err(LoadError::NonFiniteDecimal(decimal));
                }
                let mut json = serde_json::to_string_pretty(document)?;
                json.push('\n');
                json
            }
        })
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Format::Yaml => f.write_str("yaml"),
            Format::Json => f.write_str("json"),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("Unable to parse yaml document")]
    YamlParseFailed(#[from] serde_yaml::Error),
    #[error("Unable to parse json document")]
    JsonParseFailed(#[from] serde_json::Error),
    #[error(transparent)]
    Conversion(#[from] ConversionError),
    #[error("json can not represent the decimal {0}")]
    NonFiniteDecimal(f64),
    #[error("no document format known for {0}")]
    UnknownFormat(std::path::PathBuf),
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::document;
    use pretty_assertions::assert_eq;

    #[test]
    fn format_from_extension() {
        assert_eq!(Format::from_path(Path::new("a/b.yaml")).unwrap(), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("b.yml")).unwrap(), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("b.json")).unwrap(), Format::Json);
        assert!(matches!(
            Format::from_path(Path::new("b.toml")),
            Err(LoadError::UnknownFormat(_))
        ));
    }

    #[test]
    fn empty_yaml_is_an_empty_object() {
        assert_eq!(Format::Yaml.load("").unwrap(), Value::empty_object());
    }

    #[test]
    fn yaml_round_trip() {
        let document = document!({
            "server": {"host": "localhost", "port": 8080, "ratio": 0.5},
            "list": [1, "two", null, false],
            "empty": {}
        });

        let dumped = Format::Yaml.dump(&document).unwrap();
        assert_eq!(Format::Yaml.load(&dumped).unwrap(), document);
    }

    #[test]
    fn json_round_trip() {
        let document = document!({"b": 1, "a": [{"x": null}], "c": "text"});

        let dumped = Format::Json.dump(&document).unwrap();
        assert_eq!(Format::Json.load(&dumped).unwrap(), document);
    }

    #[test]
    fn out_of_range_integers_are_not_loaded_as_decimals() {
        assert!(matches!(
            Format::Json.load(r#"{"id": 18446744073709551615, "x": 1}"#),
            Err(LoadError::Conversion(ConversionError::IntegerOutOfRange(_)))
        ));
        assert!(matches!(
            Format::Yaml.load("id: 18446744073709551615"),
            Err(LoadError::Conversion(ConversionError::IntegerOutOfRange(_)))
        ));
    }

    #[test]
    fn json_refuses_non_finite_decimals() {
        let document: Value = [("x", Value::Decimal(f64::INFINITY))].into_iter().collect();

        assert!(matches!(
            Format::Json.dump(&document),
            Err(LoadError::NonFiniteDecimal(decimal)) if decimal.is_infinite()
        ));
    }

    #[test]
    fn yaml_keeps_non_finite_decimals() {
        let document: Value = [("x", Value::Decimal(f64::NEG_INFINITY))].into_iter().collect();

        let dumped = Format::Yaml.dump(&document).unwrap();
        assert_eq!(Format::Yaml.load(&dumped).unwrap(), document);
    }

    #[test]
    fn invalid_input() {
        assert!(matches!(
            Format::Json.load("{"),
            Err(LoadError::JsonParseFailed(_))
        ));
        assert!(matches!(
            Format::Yaml.load("a: [1"),
            Err(LoadError::YamlParseFailed(_))
        ));
    }
}
