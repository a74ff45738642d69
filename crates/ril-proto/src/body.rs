//! Request and response payload shapes
//!
//! Every wire payload the simulator decodes or encodes is one of these serde
//! structs, wrapped in [`Body`] so a request can carry "whatever the schema
//! said" without the dispatch layer knowing the concrete type. Handlers match
//! on the variant they expect and treat anything else (or a missing body) as
//! a malformed request.

use serde::{Deserialize, Serialize};

use crate::codes;
use crate::state::{CallState, RadioState};

// -----------------------------------------------------------------------------
// Device request payloads
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialReq {
    /// Phone number to dial.
    pub address: String,
    /// CLIR mode (0 = subscription default).
    #[serde(default)]
    pub clir: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HangUpReq {
    pub connection_index: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenStateReq {
    pub on: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnterSimPinReq {
    pub pin: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetMuteReq {
    pub mute: bool,
}

// -----------------------------------------------------------------------------
// Control request payloads
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetMtCallReq {
    /// Calling-party number presented for the incoming call.
    pub phone_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HangupConnRemoteReq {
    pub connection_index: i32,
    /// Recorded as the last call fail cause, e.g. [`codes::CALL_FAIL_NORMAL`].
    pub fail_cause: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetCallTransitionFlagReq {
    /// When set, dialing calls do not progress automatically; the controller
    /// drives alert/active transitions explicitly.
    pub flag: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddDialingCallReq {
    pub phone_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetRadioStateReq {
    pub state: RadioState,
}

// -----------------------------------------------------------------------------
// Response payloads
// -----------------------------------------------------------------------------

/// One call as reported to the device, packed from the live call table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallInfo {
    pub index: i32,
    pub state: CallState,
    pub number: String,
    pub name: String,
    pub is_multiparty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentCallsRsp {
    pub calls: Vec<CallInfo>,
}

/// Generic string-array response. `None` entries stand for values the
/// simulator has no reading for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringsRsp {
    pub strings: Vec<Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegersRsp {
    pub integers: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorRsp {
    pub long_name: String,
    pub short_name: String,
    pub mcc_mnc: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnterSimPinRsp {
    pub retries_remaining: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MuteRsp {
    pub mute: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastCallFailCauseRsp {
    pub cause: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadioStateRsp {
    pub state: RadioState,
}

/// Per-technology signal readings, reported together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalStrength {
    /// GSM RSSI, valid range 0..=31 or the sentinel 99 (unknown).
    pub gsm_signal_strength: i32,
    pub gsm_bit_error_rate: i32,
    pub cdma_dbm: i32,
    pub cdma_ecio: i32,
    pub evdo_dbm: i32,
    pub evdo_ecio: i32,
    pub evdo_snr: i32,
    pub lte_signal_strength: i32,
    pub lte_rsrp: i32,
    pub lte_rsrq: i32,
    pub lte_rssnr: i32,
    pub lte_cqi: i32,
}

/// GSM RSSI sentinel meaning "not known or not detectable".
pub const GSM_SIGNAL_UNKNOWN: i32 = 99;

impl SignalStrength {
    /// Range check for a GSM RSSI value.
    pub fn gsm_rssi_valid(rssi: i32) -> bool {
        (0..=31).contains(&rssi) || rssi == GSM_SIGNAL_UNKNOWN
    }
}

impl Default for SignalStrength {
    fn default() -> Self {
        Self {
            gsm_signal_strength: 10,
            gsm_bit_error_rate: 0,
            cdma_dbm: 65,
            cdma_ecio: 90,
            evdo_dbm: 70,
            evdo_ecio: 80,
            evdo_snr: 7,
            lte_signal_strength: GSM_SIGNAL_UNKNOWN,
            lte_rsrp: 0,
            lte_rsrq: 0,
            lte_rssnr: 0,
            lte_cqi: 0,
        }
    }
}

// -----------------------------------------------------------------------------
// SIM card status
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppStatus {
    pub app_type: i32,
    pub app_state: i32,
    pub perso_substate: i32,
    pub aid: Option<String>,
    pub app_label: Option<String>,
    pub pin1_replaced: i32,
    pub pin1: i32,
    pub pin2: i32,
}

impl AppStatus {
    fn unknown() -> Self {
        Self {
            app_type: codes::APPTYPE_UNKNOWN,
            app_state: codes::APPSTATE_UNKNOWN,
            perso_substate: codes::PERSOSUBSTATE_UNKNOWN,
            aid: None,
            app_label: None,
            pin1_replaced: 0,
            pin1: codes::PINSTATE_UNKNOWN,
            pin2: codes::PINSTATE_UNKNOWN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardStatus {
    pub card_state: i32,
    pub universal_pin_state: i32,
    pub gsm_umts_subscription_app_index: i32,
    pub cdma_subscription_app_index: i32,
    pub num_applications: i32,
    pub applications: Vec<AppStatus>,
}

impl CardStatus {
    /// A present card with a single ready GSM application, the fixture every
    /// SIM status query reports.
    pub fn present_gsm() -> Self {
        let mut applications = vec![AppStatus::unknown(); codes::CARD_MAX_APPS];
        applications[0] = AppStatus {
            app_type: codes::APPTYPE_SIM,
            app_state: codes::APPSTATE_READY,
            perso_substate: codes::PERSOSUBSTATE_READY,
            ..AppStatus::unknown()
        };
        Self {
            card_state: codes::CARDSTATE_PRESENT,
            universal_pin_state: codes::PINSTATE_UNKNOWN,
            gsm_umts_subscription_app_index: 0,
            cdma_subscription_app_index: codes::CARD_MAX_APPS as i32,
            num_applications: 1,
            applications,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimStatusRsp {
    pub card_status: CardStatus,
}

// -----------------------------------------------------------------------------
// Internal scheduling payloads
// -----------------------------------------------------------------------------

/// Payload of a delayed call-state transition tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallStateChange {
    pub call_index: i32,
    pub next_state: CallState,
}

// -----------------------------------------------------------------------------
// Body
// -----------------------------------------------------------------------------

/// A decoded payload, tagged by shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Dial(DialReq),
    HangUp(HangUpReq),
    ScreenState(ScreenStateReq),
    EnterSimPin(EnterSimPinReq),
    SetMute(SetMuteReq),
    SetMtCall(SetMtCallReq),
    HangupConnRemote(HangupConnRemoteReq),
    SetCallTransitionFlag(SetCallTransitionFlagReq),
    AddDialingCall(AddDialingCallReq),
    SetRadioState(SetRadioStateReq),
    CurrentCalls(CurrentCallsRsp),
    Strings(StringsRsp),
    Integers(IntegersRsp),
    Operator(OperatorRsp),
    EnterSimPinRsp(EnterSimPinRsp),
    SimStatus(SimStatusRsp),
    SignalStrength(SignalStrength),
    Mute(MuteRsp),
    LastCallFailCause(LastCallFailCauseRsp),
    RadioState(RadioStateRsp),
    CallStateChange(CallStateChange),
}
