//! JSON response envelope.
//!
//! Every service answers with `{ "error": bool, "message": String, "data"?: T }`.
//! The envelope is modelled as an enum so a success can carry data and an
//! error cannot, while the wire shape stays flat.

use serde::{
    ser::SerializeStruct, Deserialize, Deserializer, Serialize, Serializer,
};

/// Response envelope with explicit success and error variants.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonResponse<T> {
    Success { message: String, data: Option<T> },
    Error { message: String },
}

impl<T> JsonResponse<T> {
    /// Successful response carrying a payload.
    pub fn success(message: impl Into<String>, data: T) -> Self {
        JsonResponse::Success {
            message: message.into(),
            data: Some(data),
        }
    }

    /// Error response.
    pub fn error(message: impl Into<String>) -> Self {
        JsonResponse::Error {
            message: message.into(),
        }
    }

    /// Whether this is the error variant.
    pub fn is_error(&self) -> bool {
        matches!(self, JsonResponse::Error { .. })
    }

    /// Human-readable message of either variant.
    pub fn message(&self) -> &str {
        match self {
            JsonResponse::Success { message, .. } | JsonResponse::Error { message } => message,
        }
    }

    /// Payload of a success, if any.
    pub fn data(&self) -> Option<&T> {
        match self {
            JsonResponse::Success { data, .. } => data.as_ref(),
            JsonResponse::Error { .. } => None,
        }
    }
}

impl JsonResponse<()> {
    /// Successful response with no payload.
    pub fn message_only(message: impl Into<String>) -> Self {
        JsonResponse::Success {
            message: message.into(),
            data: None,
        }
    }
}

impl<T: Serialize> Serialize for JsonResponse<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            JsonResponse::Success {
                message,
                data: Some(data),
            } => {
                let mut state = serializer.serialize_struct("JsonResponse", 3)?;
                state.serialize_field("error", &false)?;
                state.serialize_field("message", message)?;
                state.serialize_field("data", data)?;
                state.end()
            }
            JsonResponse::Success {
                message,
                data: None,
            } => {
                let mut state = serializer.serialize_struct("JsonResponse", 2)?;
                state.serialize_field("error", &false)?;
                state.serialize_field("message", message)?;
                state.end()
            }
            JsonResponse::Error { message } => {
                let mut state = serializer.serialize_struct("JsonResponse", 2)?;
                state.serialize_field("error", &true)?;
                state.serialize_field("message", message)?;
                state.end()
            }
        }
    }
}

/// Flat wire form used for decoding.
#[derive(Deserialize)]
struct Envelope<T> {
    error: bool,
    message: String,
    data: Option<T>,
}

impl<'de, T> Deserialize<'de> for JsonResponse<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let envelope = Envelope::<T>::deserialize(deserializer)?;
        Ok(if envelope.error {
            JsonResponse::Error {
                message: envelope.message,
            }
        } else {
            JsonResponse::Success {
                message: envelope.message,
                data: envelope.data,
            }
        })
    }
}
