//! Response handlers: the types a manager builds from a transport's raw body.
//!
//! # Design
//! A handler type implements `Response`. `parse` plays the role of the
//! constructor and may decline (`None`) when it can make nothing of the body;
//! `null` must always succeed and is what the manager falls back on for
//! faults. The manager never looks inside `Raw`.
//!
//! Verdict and messages live in a shared `Status` so implementors only
//! provide storage, not the accessor plumbing.

use serde_json::Value;

/// Verdict and human-readable classification carried by every response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Status {
    pub okay: bool,
    pub message: Option<String>,
    pub message_type: Option<String>,
}

pub trait Response: Sized + Send + 'static {
    type Raw;

    /// Build a response from a raw body, or `None` if nothing usable can
    /// be made of it.
    fn parse(raw: &str) -> Option<Self>;

    /// A response with no body.
    fn null() -> Self;

    fn raw(&self) -> Option<&Self::Raw>;

    fn status(&self) -> &Status;

    fn status_mut(&mut self) -> &mut Status;

    fn okay(&self) -> bool {
        self.status().okay
    }

    fn set_okay(&mut self, okay: bool) {
        self.status_mut().okay = okay;
    }

    fn message(&self) -> Option<&str> {
        self.status().message.as_deref()
    }

    fn set_message(&mut self, message: impl Into<String>) {
        self.status_mut().message = Some(message.into());
    }

    fn message_type(&self) -> Option<&str> {
        self.status().message_type.as_deref()
    }

    fn set_message_type(&mut self, message_type: impl Into<String>) {
        self.status_mut().message_type = Some(message_type.into());
    }
}

/// The body as an unparsed string. Okay whenever there is a body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextResponse {
    raw: Option<String>,
    status: Status,
}

impl Response for TextResponse {
    type Raw = String;

    fn parse(raw: &str) -> Option<Self> {
        Some(Self {
            raw: Some(raw.to_string()),
            status: Status {
                okay: true,
                ..Status::default()
            },
        })
    }

    fn null() -> Self {
        Self {
            raw: None,
            status: Status::default(),
        }
    }

    fn raw(&self) -> Option<&String> {
        self.raw.as_ref()
    }

    fn status(&self) -> &Status {
        &self.status
    }

    fn status_mut(&mut self) -> &mut Status {
        &mut self.status
    }
}

/// The body parsed as JSON.
///
/// A blank body yields no response at all. A body that fails to parse still
/// yields one, not okay, carrying the parse error as its message.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonResponse {
    raw: Option<Value>,
    status: Status,
}

impl Response for JsonResponse {
    type Raw = Value;

    fn parse(raw: &str) -> Option<Self> {
        if raw.trim().is_empty() {
            return None;
        }
        let response = match serde_json::from_str(raw) {
            Ok(value) => Self {
                raw: Some(value),
                status: Status {
                    okay: true,
                    ..Status::default()
                },
            },
            Err(e) => Self {
                raw: None,
                status: Status {
                    okay: false,
                    message: Some(format!("could not parse JSON: {e}")),
                    message_type: None,
                },
            },
        };
        Some(response)
    }

    fn null() -> Self {
        Self {
            raw: None,
            status: Status::default(),
        }
    }

    fn raw(&self) -> Option<&Value> {
        self.raw.as_ref()
    }

    fn status(&self) -> &Status {
        &self.status
    }

    fn status_mut(&mut self) -> &mut Status {
        &mut self.status
    }
}
