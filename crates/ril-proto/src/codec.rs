//! Schema-driven payload codec
//!
//! The simulation core never touches raw payload bytes directly: every decode
//! and encode goes through [`PayloadCodec`], keyed by a [`Schema`] name taken
//! from the dispatch table. The core consumes this as an opaque capability,
//! so the wire format can be swapped without touching dispatch or handlers.
//! [`JsonCodec`] is the format shipped here.

use crate::body::{
    AddDialingCallReq, Body, CallStateChange, CurrentCallsRsp, DialReq, EnterSimPinReq,
    EnterSimPinRsp, HangUpReq, HangupConnRemoteReq, IntegersRsp, LastCallFailCauseRsp, MuteRsp,
    OperatorRsp, RadioStateRsp, ScreenStateReq, SetCallTransitionFlagReq, SetMtCallReq,
    SetMuteReq, SetRadioStateReq, SignalStrength, SimStatusRsp, StringsRsp,
};
use crate::error::CodecError;

/// Names of every payload shape the simulator decodes or encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Schema {
    ReqDial,
    ReqHangUp,
    ReqScreenState,
    ReqEnterSimPin,
    ReqSetMute,
    CtrlReqSetMtCall,
    CtrlReqHangupConnRemote,
    CtrlReqSetCallTransitionFlag,
    CtrlReqAddDialingCall,
    CtrlReqSetRadioState,
    RspCurrentCalls,
    RspStrings,
    RspIntegers,
    RspOperator,
    RspEnterSimPin,
    RspSimStatus,
    RspSignalStrength,
    RspMute,
    RspLastCallFailCause,
    CtrlRspRadioState,
    EvCallStateChange,
}

/// Conversion between raw payload bytes and structured bodies.
pub trait PayloadCodec: Send + Sync {
    /// Decode `bytes` as the shape named by `schema`.
    fn decode(&self, schema: Schema, bytes: &[u8]) -> Result<Body, CodecError>;

    /// Encode `body`, which must be the shape named by `schema`.
    fn encode(&self, schema: Schema, body: &Body) -> Result<Vec<u8>, CodecError>;
}

/// JSON-backed implementation of the codec boundary.
#[derive(Debug, Default)]
pub struct JsonCodec;

impl JsonCodec {
    pub fn new() -> Self {
        Self
    }
}

fn parse<T>(schema: Schema, bytes: &[u8]) -> Result<T, CodecError>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_slice(bytes).map_err(|source| CodecError::Malformed { schema, source })
}

fn emit<T>(value: &T) -> Vec<u8>
where
    T: serde::Serialize,
{
    // Serialization of these in-memory shapes cannot fail.
    serde_json::to_vec(value).expect("payload serialization")
}

impl PayloadCodec for JsonCodec {
    fn decode(&self, schema: Schema, bytes: &[u8]) -> Result<Body, CodecError> {
        Ok(match schema {
            Schema::ReqDial => Body::Dial(parse::<DialReq>(schema, bytes)?),
            Schema::ReqHangUp => Body::HangUp(parse::<HangUpReq>(schema, bytes)?),
            Schema::ReqScreenState => Body::ScreenState(parse::<ScreenStateReq>(schema, bytes)?),
            Schema::ReqEnterSimPin => Body::EnterSimPin(parse::<EnterSimPinReq>(schema, bytes)?),
            Schema::ReqSetMute => Body::SetMute(parse::<SetMuteReq>(schema, bytes)?),
            Schema::CtrlReqSetMtCall => Body::SetMtCall(parse::<SetMtCallReq>(schema, bytes)?),
            Schema::CtrlReqHangupConnRemote => {
                Body::HangupConnRemote(parse::<HangupConnRemoteReq>(schema, bytes)?)
            }
            Schema::CtrlReqSetCallTransitionFlag => {
                Body::SetCallTransitionFlag(parse::<SetCallTransitionFlagReq>(schema, bytes)?)
            }
            Schema::CtrlReqAddDialingCall => {
                Body::AddDialingCall(parse::<AddDialingCallReq>(schema, bytes)?)
            }
            Schema::CtrlReqSetRadioState => {
                Body::SetRadioState(parse::<SetRadioStateReq>(schema, bytes)?)
            }
            Schema::RspCurrentCalls => Body::CurrentCalls(parse::<CurrentCallsRsp>(schema, bytes)?),
            Schema::RspStrings => Body::Strings(parse::<StringsRsp>(schema, bytes)?),
            Schema::RspIntegers => Body::Integers(parse::<IntegersRsp>(schema, bytes)?),
            Schema::RspOperator => Body::Operator(parse::<OperatorRsp>(schema, bytes)?),
            Schema::RspEnterSimPin => {
                Body::EnterSimPinRsp(parse::<EnterSimPinRsp>(schema, bytes)?)
            }
            Schema::RspSimStatus => Body::SimStatus(parse::<SimStatusRsp>(schema, bytes)?),
            Schema::RspSignalStrength => {
                Body::SignalStrength(parse::<SignalStrength>(schema, bytes)?)
            }
            Schema::RspMute => Body::Mute(parse::<MuteRsp>(schema, bytes)?),
            Schema::RspLastCallFailCause => {
                Body::LastCallFailCause(parse::<LastCallFailCauseRsp>(schema, bytes)?)
            }
            Schema::CtrlRspRadioState => Body::RadioState(parse::<RadioStateRsp>(schema, bytes)?),
            Schema::EvCallStateChange => {
                Body::CallStateChange(parse::<CallStateChange>(schema, bytes)?)
            }
        })
    }

    fn encode(&self, schema: Schema, body: &Body) -> Result<Vec<u8>, CodecError> {
        let bytes = match (schema, body) {
            (Schema::ReqDial, Body::Dial(v)) => emit(v),
            (Schema::ReqHangUp, Body::HangUp(v)) => emit(v),
            (Schema::ReqScreenState, Body::ScreenState(v)) => emit(v),
            (Schema::ReqEnterSimPin, Body::EnterSimPin(v)) => emit(v),
            (Schema::ReqSetMute, Body::SetMute(v)) => emit(v),
            (Schema::CtrlReqSetMtCall, Body::SetMtCall(v)) => emit(v),
            (Schema::CtrlReqHangupConnRemote, Body::HangupConnRemote(v)) => emit(v),
            (Schema::CtrlReqSetCallTransitionFlag, Body::SetCallTransitionFlag(v)) => emit(v),
            (Schema::CtrlReqAddDialingCall, Body::AddDialingCall(v)) => emit(v),
            (Schema::CtrlReqSetRadioState, Body::SetRadioState(v)) => emit(v),
            (Schema::RspCurrentCalls, Body::CurrentCalls(v)) => emit(v),
            (Schema::RspStrings, Body::Strings(v)) => emit(v),
            (Schema::RspIntegers, Body::Integers(v)) => emit(v),
            (Schema::RspOperator, Body::Operator(v)) => emit(v),
            (Schema::RspEnterSimPin, Body::EnterSimPinRsp(v)) => emit(v),
            (Schema::RspSimStatus, Body::SimStatus(v)) => emit(v),
            (Schema::RspSignalStrength, Body::SignalStrength(v)) => emit(v),
            (Schema::RspMute, Body::Mute(v)) => emit(v),
            (Schema::RspLastCallFailCause, Body::LastCallFailCause(v)) => emit(v),
            (Schema::CtrlRspRadioState, Body::RadioState(v)) => emit(v),
            (Schema::EvCallStateChange, Body::CallStateChange(v)) => emit(v),
            _ => return Err(CodecError::SchemaMismatch { schema }),
        };
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{CallState, RadioState};
    use proptest::prelude::*;

    fn round_trip(schema: Schema, body: Body) {
        let codec = JsonCodec::new();
        let bytes = codec.encode(schema, &body).unwrap();
        let decoded = codec.decode(schema, &bytes).unwrap();
        assert_eq!(decoded, body);
    }

    #[test]
    fn test_request_round_trips() {
        round_trip(
            Schema::ReqDial,
            Body::Dial(DialReq {
                address: "555-0100".into(),
                clir: 0,
            }),
        );
        round_trip(
            Schema::ReqHangUp,
            Body::HangUp(HangUpReq {
                connection_index: 3,
            }),
        );
        round_trip(
            Schema::CtrlReqSetRadioState,
            Body::SetRadioState(SetRadioStateReq {
                state: RadioState::SimReady,
            }),
        );
    }

    #[test]
    fn test_response_round_trips() {
        round_trip(
            Schema::RspStrings,
            Body::Strings(StringsRsp {
                strings: vec![Some("1".into()), None, Some("3".into())],
            }),
        );
        round_trip(
            Schema::RspSignalStrength,
            Body::SignalStrength(SignalStrength::default()),
        );
        round_trip(
            Schema::RspSimStatus,
            Body::SimStatus(SimStatusRsp {
                card_status: crate::body::CardStatus::present_gsm(),
            }),
        );
        round_trip(
            Schema::EvCallStateChange,
            Body::CallStateChange(CallStateChange {
                call_index: 1,
                next_state: CallState::Alerting,
            }),
        );
    }

    #[test]
    fn test_decode_rejects_malformed_bytes() {
        let codec = JsonCodec::new();
        let err = codec.decode(Schema::ReqDial, b"not json").unwrap_err();
        assert!(matches!(err, CodecError::Malformed { .. }));
    }

    #[test]
    fn test_encode_rejects_mismatched_body() {
        let codec = JsonCodec::new();
        let body = Body::HangUp(HangUpReq {
            connection_index: 1,
        });
        let err = codec.encode(Schema::ReqDial, &body).unwrap_err();
        assert!(matches!(err, CodecError::SchemaMismatch { .. }));
    }

    proptest! {
        #[test]
        fn prop_dial_round_trip(address in "[0-9+*#]{1,16}", clir in 0..3i32) {
            round_trip(Schema::ReqDial, Body::Dial(DialReq { address, clir }));
        }

        #[test]
        fn prop_current_calls_round_trip(
            entries in proptest::collection::vec((1..=7i32, 0..=5i32, "[0-9]{4,10}"), 0..7)
        ) {
            let calls = entries
                .into_iter()
                .map(|(index, state, number)| crate::body::CallInfo {
                    index,
                    state: CallState::try_from(state).unwrap(),
                    number,
                    name: String::new(),
                    is_multiparty: false,
                })
                .collect();
            round_trip(
                Schema::RspCurrentCalls,
                Body::CurrentCalls(CurrentCallsRsp { calls }),
            );
        }

        #[test]
        fn prop_integers_round_trip(integers in proptest::collection::vec(any::<i32>(), 0..8)) {
            round_trip(Schema::RspIntegers, Body::Integers(IntegersRsp { integers }));
        }
    }
}
