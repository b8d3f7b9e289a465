use std::fmt;

use shared::{
    domain::{EntityKind, MediaCategory, Weekday},
    error::ApiError,
};
use thiserror::Error;

/// Failure of a single backend call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("backend rejected request: {0}")]
    Api(#[from] ApiError),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("malformed backend response: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError::new(field, message));
    }

    pub fn extend(&mut self, other: ValidationErrors) {
        for error in other.0 {
            if !self.0.contains(&error) {
                self.0.push(error);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|error| error.field == field)
    }

    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.message.as_str())
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, error) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", error.field, error.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    #[error("{category} holds at most {max} item(s); {current} present, {requested} requested")]
    CapacityExceeded {
        category: MediaCategory,
        max: usize,
        current: usize,
        requested: usize,
    },
    #[error("{category} images must be cropped before they are added")]
    CropRequired { category: MediaCategory },
    #[error("{category} does not contain remote media {url}")]
    UnknownRemote { category: MediaCategory, url: String },
    #[error("{category} has no pending file {id}")]
    UnknownLocalFile { category: MediaCategory, id: String },
    #[error("media category {0} is not attached to this record")]
    UnknownCategory(MediaCategory),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimingError {
    #[error("{day:?} is closed; reopen it before editing slots")]
    DayClosed { day: Weekday },
    #[error("{day:?} has no slot at index {index}")]
    NoSuchSlot { day: Weekday, index: usize },
    #[error("invalid time {0:?}; expected hh:mm AM/PM")]
    InvalidTime(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CropError {
    #[error("failed to decode image {filename}: {reason}")]
    Decode { filename: String, reason: String },
    #[error("failed to encode cropped image {filename}: {reason}")]
    Encode { filename: String, reason: String },
    #[error("crop area lies outside the {width}x{height} image")]
    AreaOutOfBounds { width: u32, height: u32 },
}

/// Rejection of a reducer transition; the snapshot is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error(transparent)]
    Media(#[from] MediaError),
    #[error(transparent)]
    Timing(#[from] TimingError),
    #[error("action applies to a {expected} record, but the form holds a {actual}")]
    WrongEntityKind {
        expected: EntityKind,
        actual: EntityKind,
    },
    #[error("{collection} has no row at index {index}")]
    IndexOutOfRange {
        collection: &'static str,
        index: usize,
    },
    #[error("{field} is derived from the selected location")]
    ReadOnlyField { field: &'static str },
    #[error("record id is already assigned")]
    IdAlreadyAssigned,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("enter an address before searching the map")]
    EmptyQuery,
    #[error("'{0}' is not a valid email")]
    InvalidEmail(String),
    #[error("no user is registered with {0}")]
    UnknownCreator(String),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Form(#[from] FormError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("form is incomplete: {0}")]
    Validation(ValidationErrors),
    #[error("cannot update a record that has no id")]
    MissingEntityId,
    #[error("record was already created with id {0}")]
    AlreadyCreated(String),
    #[error("failed to save {kind}: {source}")]
    Primary {
        kind: EntityKind,
        source: GatewayError,
    },
}
