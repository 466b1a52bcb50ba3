use thiserror::Error;

/// Result type for Daikin operations
pub type Result<T> = std::result::Result<T, DaikinError>;

/// Errors that can occur when discovering or talking to Daikin units
#[derive(Error, Debug)]
pub enum DaikinError {
    /// HTTP request could not be completed
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// I/O error (interface enumeration, socket bind)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A named interface had no usable IPv4 address
    #[error("no interface or no addresses: {0}")]
    NoInterface(String),

    /// Response body was not a single `key=value` record
    #[error("frame error: {0}")]
    Frame(String),

    /// A wire value is outside the parameter's domain
    #[error("invalid {field} value: {value:?}")]
    Decode {
        /// Wire key of the offending field
        field: String,
        /// Raw value as received
        value: String,
    },

    /// The unit answered with a `ret` other than `OK`
    #[error("device returned error ret={ret:?}")]
    Device {
        /// The `ret` value reported by the unit (empty if absent)
        ret: String,
    },

    /// Tried to push control settings that were never fetched or assigned
    #[error("device has no control info to send")]
    MissingControlInfo,

    /// Configuration rejected during validation
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl DaikinError {
    pub(crate) fn decode(field: &str, value: &str) -> Self {
        Self::Decode {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    /// True if the unit itself rejected the request (as opposed to the
    /// request never reaching it or its answer being unreadable).
    pub fn is_device_error(&self) -> bool {
        matches!(self, Self::Device { .. })
    }
}
