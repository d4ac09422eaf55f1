//! Body serializers.
//!
//! A [`Serializer`] turns bytes into a structured value and back. It works on
//! `serde_json::Value` so it stays object-safe; the typed helpers on
//! [`Context`](crate::Context) (`json`, `scan_json`, …) convert to and from
//! your own `serde` types on either side of it.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Error;
use crate::response::ContentType;

pub trait Serializer: Send + Sync {
    /// Content type written alongside marshalled bodies.
    fn content_type(&self) -> ContentType;

    fn marshal(&self, value: &serde_json::Value) -> Result<Vec<u8>, Error>;

    fn unmarshal(&self, bytes: &[u8]) -> Result<serde_json::Value, Error>;
}

/// The default body format, backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn content_type(&self) -> ContentType {
        ContentType::Json
    }

    fn marshal(&self, value: &serde_json::Value) -> Result<Vec<u8>, Error> {
        Ok(serde_json::to_vec(value)?)
    }

    fn unmarshal(&self, bytes: &[u8]) -> Result<serde_json::Value, Error> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

pub(crate) fn encode<T: Serialize + ?Sized>(
    serializer: &dyn Serializer,
    value: &T,
) -> Result<Vec<u8>, Error> {
    serializer.marshal(&serde_json::to_value(value)?)
}

pub(crate) fn decode<T: DeserializeOwned>(
    serializer: &dyn Serializer,
    bytes: &[u8],
) -> Result<T, Error> {
    Ok(serde_json::from_value(serializer.unmarshal(bytes)?)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct User {
        id: u32,
        name: String,
    }

    #[test]
    fn typed_helpers_go_through_the_serializer() {
        let user = User { id: 7, name: "ann".into() };
        let bytes = encode(&JsonSerializer, &user).unwrap();
        assert_eq!(bytes, br#"{"id":7,"name":"ann"}"#);

        let back: User = decode(&JsonSerializer, &bytes).unwrap();
        assert_eq!(back, user);
    }

    #[test]
    fn malformed_input_is_a_serialization_error() {
        let err = decode::<User>(&JsonSerializer, b"{not json").unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));

        let err = decode::<User>(&JsonSerializer, br#"{"id":"x"}"#).unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }
}
