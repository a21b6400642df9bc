//! Serialization formats for stored values.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("unknown format {0:?} (expected one of: json, json-pretty, bincode)")]
    Unknown(String),
    #[error("{format} codec failed: {message}")]
    Codec { format: Format, message: String },
}

/// The wire format a store uses for its blobs.
///
/// Every store carries its own format, chosen at construction. JSON is the
/// default because it is self-describing and stays readable across versions
/// of the stored types. `Bincode` is compact but not self-describing: values
/// must be read back with exactly the type they were written with, and
/// untyped reads such as `serde_json::Value` are not supported.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Format {
    #[default]
    Json,
    /// JSON indented for human inspection. Reads exactly like `Json`.
    JsonPretty,
    Bincode,
}

impl Format {
    pub const ALL: [Format; 3] = [Format::Json, Format::JsonPretty, Format::Bincode];

    /// The short name used in configuration files and on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::JsonPretty => "json-pretty",
            Format::Bincode => "bincode",
        }
    }

    /// MIME-type-like identifier for the encoded bytes.
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Json | Format::JsonPretty => "application/json",
            Format::Bincode => "application/x-bincode",
        }
    }

    pub fn is_self_describing(&self) -> bool {
        !matches!(self, Format::Bincode)
    }

    pub fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, FormatError> {
        let encoded = match self {
            Format::Json => serde_json::to_vec(value).map_err(|e| e.to_string()),
            Format::JsonPretty => serde_json::to_vec_pretty(value).map_err(|e| e.to_string()),
            Format::Bincode => bincode::serialize(value).map_err(|e| e.to_string()),
        };

        encoded.map_err(|message| FormatError::Codec {
            format: *self,
            message,
        })
    }

    pub fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, FormatError> {
        let decoded = match self {
            Format::Json | Format::JsonPretty => {
                serde_json::from_slice(bytes).map_err(|e| e.to_string())
            }
            Format::Bincode => bincode::deserialize(bytes).map_err(|e| e.to_string()),
        };

        decoded.map_err(|message| FormatError::Codec {
            format: *self,
            message,
        })
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Format {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Format::ALL
            .into_iter()
            .find(|format| format.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| FormatError::Unknown(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Header {
        subject: String,
        size: u32,
        flags: Vec<bool>,
    }

    fn header() -> Header {
        Header {
            subject: "hello".to_owned(),
            size: 42,
            flags: vec![true, false],
        }
    }

    #[test]
    fn every_format_reads_what_it_writes() {
        for format in Format::ALL {
            let bytes = format.encode(&header()).unwrap();
            let decoded: Header = format.decode(&bytes).unwrap();
            assert_eq!(decoded, header(), "{format}");
        }
    }

    #[test]
    fn pretty_json_is_plain_json_on_read() {
        let bytes = Format::JsonPretty.encode(&header()).unwrap();
        assert!(bytes.contains(&b'\n'));
        let decoded: Header = Format::Json.decode(&bytes).unwrap();
        assert_eq!(decoded, header());
    }

    #[test]
    fn decode_failure_names_format() {
        let err = Format::Json.decode::<Header>(b"not json").unwrap_err();
        match &err {
            FormatError::Codec { format, .. } => assert_eq!(*format, Format::Json),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().starts_with("json codec failed"));
    }

    #[test]
    fn truncated_bincode_fails() {
        let bytes = Format::Bincode.encode(&header()).unwrap();
        assert!(Format::Bincode
            .decode::<Header>(&bytes[..bytes.len() / 2])
            .is_err());
    }

    #[test]
    fn parse_names() {
        assert_eq!("json".parse::<Format>().unwrap(), Format::Json);
        assert_eq!("JSON-PRETTY".parse::<Format>().unwrap(), Format::JsonPretty);
        assert_eq!("bincode".parse::<Format>().unwrap(), Format::Bincode);
        assert_eq!(
            "pickle".parse::<Format>(),
            Err(FormatError::Unknown("pickle".to_owned()))
        );
    }

    #[test]
    fn serde_uses_short_names() {
        assert_eq!(
            serde_json::to_string(&Format::JsonPretty).unwrap(),
            "\"json-pretty\""
        );
        let format: Format = serde_json::from_str("\"bincode\"").unwrap();
        assert_eq!(format, Format::Bincode);
    }

    #[test]
    fn default_is_json() {
        assert_eq!(Format::default(), Format::Json);
        assert!(Format::default().is_self_describing());
        assert!(!Format::Bincode.is_self_describing());
        assert_eq!(Format::Bincode.as_str(), "application/x-bincode");
    }
}
