//! Completion status codes for the two response channels

use serde::{Deserialize, Serialize};

/// Status reported on device-request completions.
///
/// The numeric values are part of the wire contract and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum RilError {
    Success,
    RadioNotAvailable,
    GenericFailure,
    PasswordIncorrect,
    SimPin2,
    SimPuk2,
    RequestNotSupported,
    Cancelled,
}

impl From<RilError> for i32 {
    fn from(e: RilError) -> i32 {
        match e {
            RilError::Success => 0,
            RilError::RadioNotAvailable => 1,
            RilError::GenericFailure => 2,
            RilError::PasswordIncorrect => 3,
            RilError::SimPin2 => 4,
            RilError::SimPuk2 => 5,
            RilError::RequestNotSupported => 6,
            RilError::Cancelled => 7,
        }
    }
}

impl TryFrom<i32> for RilError {
    type Error = String;

    fn try_from(v: i32) -> Result<Self, Self::Error> {
        Ok(match v {
            0 => RilError::Success,
            1 => RilError::RadioNotAvailable,
            2 => RilError::GenericFailure,
            3 => RilError::PasswordIncorrect,
            4 => RilError::SimPin2,
            5 => RilError::SimPuk2,
            6 => RilError::RequestNotSupported,
            7 => RilError::Cancelled,
            other => return Err(format!("unknown ril error code: {other}")),
        })
    }
}

/// Status reported on control-request completions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum CtrlStatus {
    Ok,
    Err,
}

impl From<CtrlStatus> for i32 {
    fn from(s: CtrlStatus) -> i32 {
        match s {
            CtrlStatus::Ok => 0,
            CtrlStatus::Err => 1,
        }
    }
}

impl TryFrom<i32> for CtrlStatus {
    type Error = String;

    fn try_from(v: i32) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(CtrlStatus::Ok),
            1 => Ok(CtrlStatus::Err),
            other => Err(format!("unknown control status: {other}")),
        }
    }
}
