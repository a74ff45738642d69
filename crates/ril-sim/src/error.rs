//! Simulation error types
//!
//! Business-rule violations inside handlers are values of [`SimError`]; the
//! subsystem processing loop maps them onto completion statuses, so a failing
//! request can never escape to crash a worker or starve its queue.

use ril_proto::{CallState, CtrlStatus, RilError};
use thiserror::Error;

/// Errors raised by call-table and subsystem operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SimError {
    /// The live-call limit is reached or no free index remains.
    #[error("call limit reached")]
    CallLimitReached,

    /// No call occupies the given index.
    #[error("no call at index {0}")]
    NoSuchCall(i32),

    /// A call was found in a state the operation does not accept.
    #[error("call {index} in unexpected state {state:?}")]
    UnexpectedCallState { index: i32, state: CallState },

    /// A scheduled or requested transition is not a legal edge.
    #[error("illegal call state transition {from:?} -> {to:?}")]
    IllegalTransition { from: CallState, to: CallState },

    /// The operation needs a different call composition (count or states).
    #[error("operation requires {required}, found {found}")]
    BadCallComposition {
        required: &'static str,
        found: usize,
    },

    /// The request carried no decodable body but the handler needs one.
    #[error("missing or undecodable request body")]
    MissingBody,

    /// A signal-strength value is outside its legal range.
    #[error("gsm signal strength {0} outside [0,31] or 99")]
    SignalOutOfRange(i32),

    /// The simulated radio is off or unavailable.
    #[error("radio not available")]
    RadioNotAvailable,
}

impl SimError {
    /// Device-channel status for this failure.
    pub fn as_ril_error(&self) -> RilError {
        match self {
            SimError::RadioNotAvailable => RilError::RadioNotAvailable,
            _ => RilError::GenericFailure,
        }
    }

    /// Control-channel status for this failure.
    pub fn as_ctrl_status(&self) -> CtrlStatus {
        CtrlStatus::Err
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            SimError::RadioNotAvailable.as_ril_error(),
            RilError::RadioNotAvailable
        );
        assert_eq!(
            SimError::CallLimitReached.as_ril_error(),
            RilError::GenericFailure
        );
        assert_eq!(SimError::MissingBody.as_ctrl_status(), CtrlStatus::Err);
    }
}
