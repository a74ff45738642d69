//! Mock modem wire vocabulary
//!
//! This crate defines everything the simulation core and its drivers agree on
//! at the boundary:
//!
//! - numeric command, notification and scheduling codes ([`codes`])
//! - completion status enums ([`RilError`], [`CtrlStatus`])
//! - call and radio state enums with the legal-transition predicate
//! - request/response payload shapes ([`Body`] and friends)
//! - the schema-driven payload codec ([`PayloadCodec`], [`JsonCodec`])
//!
//! The codec is consumed by the core as an opaque parse/serialize capability;
//! nothing outside this crate depends on the concrete wire format.
//!
//! # Example
//!
//! ```rust
//! use ril_proto::{Body, DialReq, JsonCodec, PayloadCodec, Schema};
//!
//! let codec = JsonCodec::new();
//! let body = Body::Dial(DialReq { address: "555-0100".into(), clir: 0 });
//! let bytes = codec.encode(Schema::ReqDial, &body).unwrap();
//! assert_eq!(codec.decode(Schema::ReqDial, &bytes).unwrap(), body);
//! ```

pub mod body;
pub mod codec;
pub mod codes;
pub mod error;
pub mod state;
pub mod status;

pub use body::{
    AddDialingCallReq, AppStatus, Body, CallInfo, CallStateChange, CardStatus, CurrentCallsRsp,
    DialReq, EnterSimPinReq, EnterSimPinRsp, HangUpReq, HangupConnRemoteReq, IntegersRsp,
    LastCallFailCauseRsp, MuteRsp, OperatorRsp, RadioStateRsp, ScreenStateReq,
    SetCallTransitionFlagReq, SetMtCallReq, SetMuteReq, SetRadioStateReq, SignalStrength,
    SimStatusRsp, StringsRsp, GSM_SIGNAL_UNKNOWN,
};
pub use codec::{JsonCodec, PayloadCodec, Schema};
pub use error::CodecError;
pub use state::{CallState, RadioState};
pub use status::{CtrlStatus, RilError};
