//! Call and radio state enums
//!
//! Both enums carry their wire-level numeric values through serde so encoded
//! payloads stay interoperable with drivers that compare raw integers.

use serde::{Deserialize, Serialize};

/// State of a single voice call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum CallState {
    Active,
    Holding,
    /// Mobile-originated call being set up.
    Dialing,
    /// Mobile-originated call, remote end is ringing.
    Alerting,
    /// Mobile-terminated call, no other call in progress.
    Incoming,
    /// Mobile-terminated call while another call is in progress.
    Waiting,
}

impl CallState {
    /// Legal transitions of the call state machine. Removal from the call
    /// table is terminal from any state and is not modeled here.
    pub fn can_transition_to(self, next: CallState) -> bool {
        use CallState::*;
        matches!(
            (self, next),
            (Dialing, Alerting)
                | (Alerting, Active)
                | (Incoming, Active)
                | (Waiting, Active)
                | (Active, Holding)
                | (Holding, Active)
        )
    }

    /// True for the states an incoming (mobile-terminated) call rings in.
    pub fn is_ringing(self) -> bool {
        matches!(self, CallState::Incoming | CallState::Waiting)
    }
}

impl From<CallState> for i32 {
    fn from(s: CallState) -> i32 {
        match s {
            CallState::Active => 0,
            CallState::Holding => 1,
            CallState::Dialing => 2,
            CallState::Alerting => 3,
            CallState::Incoming => 4,
            CallState::Waiting => 5,
        }
    }
}

impl TryFrom<i32> for CallState {
    type Error = String;

    fn try_from(v: i32) -> Result<Self, Self::Error> {
        Ok(match v {
            0 => CallState::Active,
            1 => CallState::Holding,
            2 => CallState::Dialing,
            3 => CallState::Alerting,
            4 => CallState::Incoming,
            5 => CallState::Waiting,
            other => return Err(format!("unknown call state: {other}")),
        })
    }
}

/// Process-wide state of the simulated radio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum RadioState {
    Off,
    Unavailable,
    SimNotReady,
    SimLockedOrAbsent,
    SimReady,
    RuimNotReady,
    RuimReady,
    RuimLockedOrAbsent,
    NvNotReady,
    NvReady,
}

impl RadioState {
    /// Whether the radio can service operations that need a powered,
    /// reachable modem (e.g. mute control).
    pub fn is_available(self) -> bool {
        !matches!(self, RadioState::Off | RadioState::Unavailable)
    }
}

impl From<RadioState> for i32 {
    fn from(s: RadioState) -> i32 {
        match s {
            RadioState::Off => 0,
            RadioState::Unavailable => 1,
            RadioState::SimNotReady => 2,
            RadioState::SimLockedOrAbsent => 3,
            RadioState::SimReady => 4,
            RadioState::RuimNotReady => 5,
            RadioState::RuimReady => 6,
            RadioState::RuimLockedOrAbsent => 7,
            RadioState::NvNotReady => 8,
            RadioState::NvReady => 9,
        }
    }
}

impl TryFrom<i32> for RadioState {
    type Error = String;

    fn try_from(v: i32) -> Result<Self, Self::Error> {
        Ok(match v {
            0 => RadioState::Off,
            1 => RadioState::Unavailable,
            2 => RadioState::SimNotReady,
            3 => RadioState::SimLockedOrAbsent,
            4 => RadioState::SimReady,
            5 => RadioState::RuimNotReady,
            6 => RadioState::RuimReady,
            7 => RadioState::RuimLockedOrAbsent,
            8 => RadioState::NvNotReady,
            9 => RadioState::NvReady,
            other => return Err(format!("unknown radio state: {other}")),
        })
    }
}
