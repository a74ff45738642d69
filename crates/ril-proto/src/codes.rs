//! Numeric command and notification codes
//!
//! The simulator routes on raw numbers, not type tags: the control router
//! compares a code against [`CTRL_DISPATCH_BASE`] to decide whether a command
//! is handled locally or forwarded into RIL-style subsystem dispatch. The
//! ranges below are therefore load-bearing and must stay disjoint:
//!
//! - device request codes: small positive integers (1..=103)
//! - unsolicited notification codes: 1000..=1030
//! - controller-local codes: 1 and 2 (disjoint from device codes by router)
//! - controller-forwarded codes: above [`CTRL_DISPATCH_BASE`]
//! - internal scheduling codes: 2000..=2004

// -----------------------------------------------------------------------------
// Device (RIL-style) request codes
// -----------------------------------------------------------------------------

pub const REQUEST_GET_SIM_STATUS: i32 = 1;
pub const REQUEST_ENTER_SIM_PIN: i32 = 2;
pub const REQUEST_GET_CURRENT_CALLS: i32 = 9;
pub const REQUEST_DIAL: i32 = 10;
pub const REQUEST_GET_IMSI: i32 = 11;
pub const REQUEST_HANGUP: i32 = 12;
pub const REQUEST_HANGUP_WAITING_OR_BACKGROUND: i32 = 13;
pub const REQUEST_HANGUP_FOREGROUND_RESUME_BACKGROUND: i32 = 14;
pub const REQUEST_SWITCH_WAITING_OR_HOLDING_AND_ACTIVE: i32 = 15;
pub const REQUEST_CONFERENCE: i32 = 16;
pub const REQUEST_LAST_CALL_FAIL_CAUSE: i32 = 18;
pub const REQUEST_SIGNAL_STRENGTH: i32 = 19;
pub const REQUEST_VOICE_REGISTRATION_STATE: i32 = 20;
pub const REQUEST_DATA_REGISTRATION_STATE: i32 = 21;
pub const REQUEST_OPERATOR: i32 = 22;
pub const REQUEST_GET_IMEI: i32 = 38;
pub const REQUEST_GET_IMEISV: i32 = 39;
pub const REQUEST_ANSWER: i32 = 40;
pub const REQUEST_QUERY_NETWORK_SELECTION_MODE: i32 = 45;
pub const REQUEST_SET_NETWORK_SELECTION_AUTOMATIC: i32 = 46;
pub const REQUEST_BASEBAND_VERSION: i32 = 51;
pub const REQUEST_SET_MUTE: i32 = 53;
pub const REQUEST_GET_MUTE: i32 = 54;
pub const REQUEST_SCREEN_STATE: i32 = 61;

// -----------------------------------------------------------------------------
// Unsolicited notification codes
// -----------------------------------------------------------------------------

pub const UNSOL_BASE: i32 = 1000;
pub const UNSOL_RADIO_STATE_CHANGED: i32 = 1000;
pub const UNSOL_CALL_STATE_CHANGED: i32 = 1001;
pub const UNSOL_NETWORK_STATE_CHANGED: i32 = 1002;
pub const UNSOL_SIGNAL_STRENGTH: i32 = 1009;
pub const UNSOL_CALL_RING: i32 = 1018;

// -----------------------------------------------------------------------------
// Controller command codes
// -----------------------------------------------------------------------------

/// Handled by the control subsystem itself.
pub const CTRL_GET_RADIO_STATE: i32 = 1;
pub const CTRL_SET_RADIO_STATE: i32 = 2;

/// Codes at or below this value stay local to the controller; codes above it
/// are forwarded to a subsystem's control-facing handler table.
pub const CTRL_DISPATCH_BASE: i32 = 1000;

pub const CTRL_SET_MT_CALL: i32 = 1001;
pub const CTRL_HANGUP_CONN_REMOTE: i32 = 1002;
pub const CTRL_SET_CALL_TRANSITION_FLAG: i32 = 1003;
pub const CTRL_SET_CALL_ALERT: i32 = 1004;
pub const CTRL_SET_CALL_ACTIVE: i32 = 1005;
pub const CTRL_ADD_DIALING_CALL: i32 = 1006;

// -----------------------------------------------------------------------------
// Internal scheduling codes
// -----------------------------------------------------------------------------
// Enqueued only by subsystems onto their own queues, never routed externally.

pub const CMD_BASE: i32 = 2000;
pub const CMD_DELAY_TEST: i32 = 2000;
pub const CMD_UNSOL_SIGNAL_STRENGTH: i32 = 2001;
pub const CMD_UNSOL_CALL_STATE_CHANGED: i32 = 2002;
pub const CMD_CALL_STATE_CHANGE: i32 = 2003;
pub const CMD_UNSOL_CALL_RING: i32 = 2004;

/// True for codes reserved for subsystem-internal scheduling ticks.
pub fn is_internal(code: i32) -> bool {
    code >= CMD_BASE
}

// -----------------------------------------------------------------------------
// SIM card status constants
// -----------------------------------------------------------------------------

pub const CARD_MAX_APPS: usize = 8;

pub const CARDSTATE_ABSENT: i32 = 0;
pub const CARDSTATE_PRESENT: i32 = 1;

pub const PINSTATE_UNKNOWN: i32 = 0;

pub const APPTYPE_UNKNOWN: i32 = 0;
pub const APPTYPE_SIM: i32 = 1;

pub const APPSTATE_UNKNOWN: i32 = 0;
pub const APPSTATE_READY: i32 = 5;

pub const PERSOSUBSTATE_UNKNOWN: i32 = 0;
pub const PERSOSUBSTATE_READY: i32 = 2;

// -----------------------------------------------------------------------------
// Call fail causes
// -----------------------------------------------------------------------------

pub const CALL_FAIL_UNOBTAINABLE_NUMBER: i32 = 1;
pub const CALL_FAIL_NORMAL: i32 = 16;
pub const CALL_FAIL_BUSY: i32 = 17;
pub const CALL_FAIL_CONGESTION: i32 = 34;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_ranges_are_disjoint() {
        // Forwarded controller codes must sit strictly above the dispatch base.
        for code in [
            CTRL_SET_MT_CALL,
            CTRL_HANGUP_CONN_REMOTE,
            CTRL_SET_CALL_TRANSITION_FLAG,
            CTRL_SET_CALL_ALERT,
            CTRL_SET_CALL_ACTIVE,
            CTRL_ADD_DIALING_CALL,
        ] {
            assert!(code > CTRL_DISPATCH_BASE);
            assert!(!is_internal(code));
        }

        // Internal scheduling codes live above everything routable.
        for code in [
            CMD_DELAY_TEST,
            CMD_UNSOL_SIGNAL_STRENGTH,
            CMD_UNSOL_CALL_STATE_CHANGED,
            CMD_CALL_STATE_CHANGE,
            CMD_UNSOL_CALL_RING,
        ] {
            assert!(is_internal(code));
            assert!(code > CTRL_ADD_DIALING_CALL);
        }

        // Device request codes stay below the unsolicited range.
        assert!(REQUEST_SCREEN_STATE < UNSOL_BASE);
    }
}
