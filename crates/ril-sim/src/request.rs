//! Request and handler-result types
//!
//! A [`Request`] is the unit of work a subsystem queue carries, whether it
//! originated at the device boundary, at the controller boundary, or from the
//! subsystem scheduling work for itself. Handlers return a fresh [`Outcome`]
//! per invocation; no scratch state is shared between calls.

use ril_proto::{Body, CtrlStatus, RilError};

/// Which boundary a request entered through. Decides the completion channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestSource {
    /// Device-originated (RIL-style) request; completes on the request channel.
    Device,
    /// Controller-originated request; completes on the control channel.
    Control,
    /// Subsystem-internal scheduling tick; never completes externally.
    Internal,
}

/// A routed request or scheduling tick.
#[derive(Debug, Clone)]
pub struct Request {
    pub code: i32,
    pub token: i64,
    pub source: RequestSource,
    /// Decoded payload; `None` when the command carries no payload or when
    /// decoding failed (handlers treat both defensively).
    pub body: Option<Body>,
}

impl Request {
    /// A scheduling tick with no payload.
    pub fn internal(code: i32) -> Self {
        Self {
            code,
            token: 0,
            source: RequestSource::Internal,
            body: None,
        }
    }

    /// A scheduling tick carrying a payload.
    pub fn internal_with(code: i32, body: Body) -> Self {
        Self {
            code,
            token: 0,
            source: RequestSource::Internal,
            body: Some(body),
        }
    }
}

/// Completion status on either channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionStatus {
    Ril(RilError),
    Ctrl(CtrlStatus),
}

impl CompletionStatus {
    /// Coerce to a device-channel status.
    pub fn as_ril(self) -> RilError {
        match self {
            CompletionStatus::Ril(e) => e,
            CompletionStatus::Ctrl(CtrlStatus::Ok) => RilError::Success,
            CompletionStatus::Ctrl(CtrlStatus::Err) => RilError::GenericFailure,
        }
    }

    /// Coerce to a control-channel status.
    pub fn as_ctrl(self) -> CtrlStatus {
        match self {
            CompletionStatus::Ctrl(s) => s,
            CompletionStatus::Ril(RilError::Success) => CtrlStatus::Ok,
            CompletionStatus::Ril(_) => CtrlStatus::Err,
        }
    }
}

/// What a handler produced: whether to respond, with what status, and with
/// what (already encoded) payload.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub send_response: bool,
    pub status: CompletionStatus,
    pub payload: Option<Vec<u8>>,
}

impl Outcome {
    /// Successful device-channel completion with no payload.
    pub fn ok() -> Self {
        Self::ril(RilError::Success)
    }

    pub fn ril(error: RilError) -> Self {
        Self {
            send_response: true,
            status: CompletionStatus::Ril(error),
            payload: None,
        }
    }

    pub fn ril_with(error: RilError, payload: Vec<u8>) -> Self {
        Self {
            send_response: true,
            status: CompletionStatus::Ril(error),
            payload: Some(payload),
        }
    }

    pub fn ctrl(status: CtrlStatus) -> Self {
        Self {
            send_response: true,
            status: CompletionStatus::Ctrl(status),
            payload: None,
        }
    }

    pub fn ctrl_with(status: CtrlStatus, payload: Vec<u8>) -> Self {
        Self {
            send_response: true,
            status: CompletionStatus::Ctrl(status),
            payload: Some(payload),
        }
    }

    /// No completion at all (internal ticks, fire-and-forget work).
    pub fn silent() -> Self {
        Self {
            send_response: false,
            status: CompletionStatus::Ril(RilError::Success),
            payload: None,
        }
    }
}
