//! Endpoint record type and its JSON/CSV encodings.
//!
//! An [`Endpoint`] describes one monitored URL target. Every way of building
//! one (a JSON request body, a CSV row from the config file) funnels through
//! [`EndpointPayload`] validation, so an `Endpoint` value is always valid.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::duration::{format_duration, parse_duration, DurationError};

/// Pattern every endpoint identifier must match.
pub const IDENTIFIER_PATTERN: &str = "^[a-z][-a-z0-9]+$";

/// Number of fields in a CSV row.
pub const CSV_FIELDS: usize = 6;

/// HTTP methods an endpoint may be probed with.
pub const SUPPORTED_METHODS: [&str; 9] = [
    "GET", "HEAD", "POST", "PUT", "PATCH", "DELETE", "OPTIONS", "TRACE", "CONNECT",
];

static IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(IDENTIFIER_PATTERN).expect("identifier pattern is valid"));

/// Returns true if `identifier` is a well-formed endpoint identifier.
pub fn is_valid_identifier(identifier: &str) -> bool {
    IDENTIFIER_RE.is_match(identifier)
}

#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    #[error("identifier \"{0}\" does not match pattern \"^[a-z][-a-z0-9]+$\"")]
    InvalidIdentifier(String),

    #[error("invalid url \"{url}\": {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported method \"{0}\"")]
    UnsupportedMethod(String),

    #[error("invalid expected status \"{0}\" (must be 100-599)")]
    InvalidStatus(String),

    #[error("invalid frequency \"{value}\": {source}")]
    InvalidFrequency {
        value: String,
        #[source]
        source: DurationError,
    },

    #[error("frequency must be greater than zero")]
    ZeroFrequency,

    #[error("invalid failure threshold \"{0}\" (must be 1-255)")]
    InvalidFailAfter(String),

    #[error("expected 6 fields, got {0}")]
    FieldCount(usize),
}

/// A monitored endpoint configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "EndpointPayload", into = "EndpointPayload")]
pub struct Endpoint {
    pub identifier: String,
    pub url: Url,
    pub method: String,
    pub status_online: u16,
    pub frequency: Duration,
    pub fail_after: u8,
}

/// JSON wire view of an [`Endpoint`], with URL and frequency as strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointPayload {
    pub identifier: String,
    pub url: String,
    pub method: String,
    pub status_online: u16,
    pub frequency: String,
    pub fail_after: u8,
}

impl Endpoint {
    /// Builds a validated endpoint from its already-typed parts.
    pub fn new(
        identifier: &str,
        url: &str,
        method: &str,
        status_online: u16,
        frequency: Duration,
        fail_after: u8,
    ) -> Result<Self, EndpointError> {
        EndpointPayload {
            identifier: identifier.to_string(),
            url: url.to_string(),
            method: method.to_string(),
            status_online,
            frequency: format_duration(frequency),
            fail_after,
        }
        .try_into()
    }

    /// Decodes one CSV row.
    pub fn from_record<S: AsRef<str>>(fields: &[S]) -> Result<Self, EndpointError> {
        if fields.len() != CSV_FIELDS {
            return Err(EndpointError::FieldCount(fields.len()));
        }
        let field = |i: usize| fields[i].as_ref();

        let status_online = field(3)
            .parse::<u16>()
            .map_err(|_| EndpointError::InvalidStatus(field(3).to_string()))?;
        let fail_after = field(5)
            .parse::<u8>()
            .map_err(|_| EndpointError::InvalidFailAfter(field(5).to_string()))?;

        EndpointPayload {
            identifier: field(0).to_string(),
            url: field(1).to_string(),
            method: field(2).to_string(),
            status_online,
            frequency: field(4).to_string(),
            fail_after,
        }
        .try_into()
    }

    /// Encodes the endpoint as one CSV row in the fixed field order.
    pub fn to_record(&self) -> [String; CSV_FIELDS] {
        [
            self.identifier.clone(),
            self.url.to_string(),
            self.method.clone(),
            self.status_online.to_string(),
            format_duration(self.frequency),
            self.fail_after.to_string(),
        ]
    }
}

impl TryFrom<EndpointPayload> for Endpoint {
    type Error = EndpointError;

    fn try_from(payload: EndpointPayload) -> Result<Self, Self::Error> {
        if !is_valid_identifier(&payload.identifier) {
            return Err(EndpointError::InvalidIdentifier(payload.identifier));
        }

        let url = Url::parse(&payload.url).map_err(|source| EndpointError::InvalidUrl {
            url: payload.url.clone(),
            source,
        })?;

        if !SUPPORTED_METHODS.contains(&payload.method.as_str()) {
            return Err(EndpointError::UnsupportedMethod(payload.method));
        }

        if !(100..=599).contains(&payload.status_online) {
            return Err(EndpointError::InvalidStatus(
                payload.status_online.to_string(),
            ));
        }

        let frequency =
            parse_duration(&payload.frequency).map_err(|source| EndpointError::InvalidFrequency {
                value: payload.frequency.clone(),
                source,
            })?;
        if frequency.is_zero() {
            return Err(EndpointError::ZeroFrequency);
        }

        if payload.fail_after == 0 {
            return Err(EndpointError::InvalidFailAfter(
                payload.fail_after.to_string(),
            ));
        }

        Ok(Self {
            identifier: payload.identifier,
            url,
            method: payload.method,
            status_online: payload.status_online,
            frequency,
            fail_after: payload.fail_after,
        })
    }
}

impl From<Endpoint> for EndpointPayload {
    fn from(endpoint: Endpoint) -> Self {
        Self {
            identifier: endpoint.identifier,
            url: endpoint.url.to_string(),
            method: endpoint.method,
            status_online: endpoint.status_online,
            frequency: format_duration(endpoint.frequency),
            fail_after: endpoint.fail_after,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Endpoint {
        Endpoint::new("svc-a", "http://x/", "GET", 200, Duration::from_secs(30), 3).unwrap()
    }

    #[test]
    fn test_identifier_pattern() {
        assert!(is_valid_identifier("svc-a"));
        assert!(is_valid_identifier("a1"));
        assert!(is_valid_identifier("frontend-2-eu"));
        assert!(!is_valid_identifier("a"));
        assert!(!is_valid_identifier("1abc"));
        assert!(!is_valid_identifier("-abc"));
        assert!(!is_valid_identifier("Bad_ID"));
        assert!(!is_valid_identifier("svc a"));
        assert!(!is_valid_identifier(""));
    }

    #[test]
    fn test_json_shape() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(
            value,
            json!({
                "identifier": "svc-a",
                "url": "http://x/",
                "method": "GET",
                "statusOnline": 200,
                "frequency": "30s",
                "failAfter": 3
            })
        );
    }

    #[test]
    fn test_json_decode_validates() {
        let body = r#"{"identifier":"svc-a","url":"http://x/","method":"GET","statusOnline":200,"frequency":"1m30s","failAfter":3}"#;
        let endpoint: Endpoint = serde_json::from_str(body).unwrap();
        assert_eq!(endpoint.frequency, Duration::from_secs(90));

        let bad_id = body.replace("svc-a", "Svc");
        assert!(serde_json::from_str::<Endpoint>(&bad_id).is_err());

        let bad_url = body.replace("http://x/", "not a url");
        assert!(serde_json::from_str::<Endpoint>(&bad_url).is_err());

        let bad_method = body.replace("\"GET\"", "\"FETCH\"");
        assert!(serde_json::from_str::<Endpoint>(&bad_method).is_err());

        let bad_frequency = body.replace("1m30s", "soon");
        assert!(serde_json::from_str::<Endpoint>(&bad_frequency).is_err());

        let missing_field = r#"{"identifier":"svc-a","url":"http://x/"}"#;
        assert!(serde_json::from_str::<Endpoint>(missing_field).is_err());
    }

    #[test]
    fn test_record_encoding() {
        let record = sample().to_record();
        assert_eq!(record, ["svc-a", "http://x/", "GET", "200", "30s", "3"]);
        assert_eq!(Endpoint::from_record(&record).unwrap(), sample());
    }

    #[test]
    fn test_record_decode_errors() {
        assert!(matches!(
            Endpoint::from_record(&["svc-a", "http://x/", "GET"]),
            Err(EndpointError::FieldCount(3))
        ));
        assert!(matches!(
            Endpoint::from_record(&["svc-a", "http://x/", "GET", "abc", "30s", "3"]),
            Err(EndpointError::InvalidStatus(_))
        ));
        assert!(matches!(
            Endpoint::from_record(&["svc-a", "http://x/", "GET", "200", "30s", "0"]),
            Err(EndpointError::InvalidFailAfter(_))
        ));
        assert!(matches!(
            Endpoint::from_record(&["svc-a", "http://x/", "GET", "200", "0s", "1"]),
            Err(EndpointError::ZeroFrequency)
        ));
        assert!(matches!(
            Endpoint::from_record(&["svc-a", "http://x/", "GET", "700", "30s", "1"]),
            Err(EndpointError::InvalidStatus(_))
        ));
    }

    #[test]
    fn test_record_fields_are_not_trimmed() {
        assert!(matches!(
            Endpoint::from_record(&[" svc-a ", "http://x/", "GET", "200", "30s", "3"]),
            Err(EndpointError::InvalidIdentifier(_))
        ));
        assert!(matches!(
            Endpoint::from_record(&["svc-a", "http://x/", " GET", "200", "30s", "3"]),
            Err(EndpointError::UnsupportedMethod(_))
        ));

        let body = r#"{"identifier":" svc-a ","url":"http://x/","method":"GET","statusOnline":200,"frequency":"30s","failAfter":3}"#;
        assert!(serde_json::from_str::<Endpoint>(body).is_err());
    }
}
