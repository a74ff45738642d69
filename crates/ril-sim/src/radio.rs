//! Radio subsystem
//!
//! Owns the call table, signal readings and registration info, and exposes
//! two statically-built handler tables: one for device (RIL-style) requests
//! and one for controller commands forwarded past the dispatch base. Internal
//! scheduling ticks (delayed call transitions, ring and signal reports) run
//! through the same dispatch path with `send_response` off.
//!
//! Every successful mutation of call state enqueues the call-state-changed
//! notification as a follow-up task on this subsystem's own queue rather than
//! emitting inline, so notifications observe the same serialization as the
//! mutations they report.

use std::collections::HashMap;
use std::sync::Arc;

use ril_proto::{
    codes, Body, CallState, CallStateChange, CtrlStatus, CurrentCallsRsp, IntegersRsp,
    LastCallFailCauseRsp, MuteRsp, PayloadCodec, RilError, Schema, SignalStrength, StringsRsp,
};
use tracing::{debug, warn};

use crate::calls::CallTable;
use crate::config::SimConfig;
use crate::context::DeviceContext;
use crate::emitter::Emitter;
use crate::error::SimError;
use crate::queue::{QueueHandle, Subsystem};
use crate::request::{Outcome, Request, RequestSource};

const NETWORK_SELECTION_AUTOMATIC: i32 = 0;

type Handler = fn(&mut Radio, &Request, &QueueHandle) -> Outcome;

/// Serving-cell registration readings reported to the device.
#[derive(Debug, Clone)]
struct Registration {
    state: String,
    lac: String,
    cid: String,
    technology: String,
}

impl Default for Registration {
    fn default() -> Self {
        Self {
            state: "1".to_string(),
            lac: "0".to_string(),
            cid: "0".to_string(),
            technology: "3".to_string(),
        }
    }
}

/// The simulated radio subsystem.
pub struct Radio {
    ctx: Arc<DeviceContext>,
    codec: Arc<dyn PayloadCodec>,
    emitter: Emitter,
    config: SimConfig,
    calls: CallTable,
    signal: SignalStrength,
    registration: Registration,
    network_selection_mode: i32,
    last_call_fail_cause: i32,
    /// When set, dialing calls wait for explicit controller transitions.
    call_transition_flag: bool,
    /// Whether a ring tick is already in flight, to avoid double-arming.
    ring_armed: bool,
    /// Code and token of the previously processed external request, for the
    /// duplicate-swap guard.
    last_external: Option<(i32, i64)>,
    ril_table: HashMap<i32, Handler>,
    ctrl_table: HashMap<i32, Handler>,
}

impl Radio {
    pub fn new(
        ctx: Arc<DeviceContext>,
        codec: Arc<dyn PayloadCodec>,
        emitter: Emitter,
        config: SimConfig,
    ) -> Self {
        let mut ril_table: HashMap<i32, Handler> = HashMap::new();
        ril_table.insert(codes::REQUEST_GET_CURRENT_CALLS, Self::get_current_calls);
        ril_table.insert(codes::REQUEST_DIAL, Self::dial);
        ril_table.insert(codes::REQUEST_HANGUP, Self::hang_up);
        ril_table.insert(
            codes::REQUEST_HANGUP_WAITING_OR_BACKGROUND,
            Self::hang_up_waiting_or_background,
        );
        ril_table.insert(
            codes::REQUEST_HANGUP_FOREGROUND_RESUME_BACKGROUND,
            Self::hang_up_foreground_resume_background,
        );
        ril_table.insert(
            codes::REQUEST_SWITCH_WAITING_OR_HOLDING_AND_ACTIVE,
            Self::switch_waiting_or_holding_and_active,
        );
        ril_table.insert(codes::REQUEST_CONFERENCE, Self::conference);
        ril_table.insert(codes::REQUEST_ANSWER, Self::answer);
        ril_table.insert(
            codes::REQUEST_LAST_CALL_FAIL_CAUSE,
            Self::last_call_fail_cause,
        );
        ril_table.insert(codes::REQUEST_SIGNAL_STRENGTH, Self::signal_strength);
        ril_table.insert(
            codes::REQUEST_VOICE_REGISTRATION_STATE,
            Self::voice_registration_state,
        );
        ril_table.insert(
            codes::REQUEST_DATA_REGISTRATION_STATE,
            Self::data_registration_state,
        );
        ril_table.insert(
            codes::REQUEST_QUERY_NETWORK_SELECTION_MODE,
            Self::query_network_selection_mode,
        );
        ril_table.insert(
            codes::REQUEST_SET_NETWORK_SELECTION_AUTOMATIC,
            Self::set_network_selection_automatic,
        );
        ril_table.insert(codes::REQUEST_BASEBAND_VERSION, Self::baseband_version);
        ril_table.insert(codes::REQUEST_SET_MUTE, Self::set_mute);
        ril_table.insert(codes::REQUEST_GET_MUTE, Self::get_mute);
        ril_table.insert(codes::REQUEST_SCREEN_STATE, Self::screen_state);
        // Internal scheduling ticks share the RIL-facing table.
        ril_table.insert(codes::CMD_DELAY_TEST, Self::delay_test);
        ril_table.insert(codes::CMD_CALL_STATE_CHANGE, Self::call_state_change);
        ril_table.insert(
            codes::CMD_UNSOL_CALL_STATE_CHANGED,
            Self::unsol_call_state_changed,
        );
        ril_table.insert(codes::CMD_UNSOL_CALL_RING, Self::unsol_call_ring);
        ril_table.insert(
            codes::CMD_UNSOL_SIGNAL_STRENGTH,
            Self::unsol_signal_strength,
        );

        let mut ctrl_table: HashMap<i32, Handler> = HashMap::new();
        ctrl_table.insert(codes::CTRL_SET_MT_CALL, Self::ctrl_set_mt_call);
        ctrl_table.insert(
            codes::CTRL_HANGUP_CONN_REMOTE,
            Self::ctrl_hangup_conn_remote,
        );
        ctrl_table.insert(
            codes::CTRL_SET_CALL_TRANSITION_FLAG,
            Self::ctrl_set_call_transition_flag,
        );
        ctrl_table.insert(codes::CTRL_SET_CALL_ALERT, Self::ctrl_set_call_alert);
        ctrl_table.insert(codes::CTRL_SET_CALL_ACTIVE, Self::ctrl_set_call_active);
        ctrl_table.insert(codes::CTRL_ADD_DIALING_CALL, Self::ctrl_add_dialing_call);

        let calls = CallTable::new(config.max_active_calls);
        let signal = config.signal;
        Self {
            ctx,
            codec,
            emitter,
            config,
            calls,
            signal,
            registration: Registration::default(),
            network_selection_mode: NETWORK_SELECTION_AUTOMATIC,
            last_call_fail_cause: codes::CALL_FAIL_NORMAL,
            call_transition_flag: false,
            ring_armed: false,
            last_external: None,
            ril_table,
            ctrl_table,
        }
    }

    /// Replace the signal readings. GSM RSSI outside its legal range is
    /// rejected and the previous readings stay in place.
    pub fn set_signal_strength(&mut self, signal: SignalStrength) -> Result<(), SimError> {
        if !SignalStrength::gsm_rssi_valid(signal.gsm_signal_strength) {
            return Err(SimError::SignalOutOfRange(signal.gsm_signal_strength));
        }
        self.signal = signal;
        Ok(())
    }

    fn reply(&self, schema: Schema, body: Body) -> Outcome {
        match self.codec.encode(schema, &body) {
            Ok(payload) => Outcome::ril_with(RilError::Success, payload),
            Err(e) => {
                warn!(?schema, error = %e, "response encode failed");
                Outcome::ril(RilError::GenericFailure)
            }
        }
    }

    /// Enqueue the call-state-changed notification as a follow-up task.
    fn push_call_state_changed(queue: &QueueHandle) {
        queue.add(Request::internal(codes::CMD_UNSOL_CALL_STATE_CHANGED));
    }

    fn arm_ring(&mut self, queue: &QueueHandle) {
        if !self.ring_armed {
            self.ring_armed = true;
            queue.add(Request::internal(codes::CMD_UNSOL_CALL_RING));
        }
    }

    // -------------------------------------------------------------------------
    // Device request handlers
    // -------------------------------------------------------------------------

    fn get_current_calls(&mut self, _req: &Request, _queue: &QueueHandle) -> Outcome {
        let rsp = CurrentCallsRsp {
            calls: self.calls.snapshot(),
        };
        self.reply(Schema::RspCurrentCalls, Body::CurrentCalls(rsp))
    }

    fn dial(&mut self, req: &Request, queue: &QueueHandle) -> Outcome {
        let Some(Body::Dial(dial)) = &req.body else {
            warn!("dial without decodable body");
            return Outcome::ril(RilError::GenericFailure);
        };
        match self.calls.add(CallState::Dialing, &dial.address, "") {
            Ok(index) => {
                debug!(index, address = %dial.address, "dialing");
                if !self.call_transition_flag {
                    queue.add_delayed(
                        Request::internal_with(
                            codes::CMD_CALL_STATE_CHANGE,
                            Body::CallStateChange(CallStateChange {
                                call_index: index,
                                next_state: CallState::Alerting,
                            }),
                        ),
                        self.config.dial_alert_delay_ms,
                    );
                    queue.add_delayed(
                        Request::internal_with(
                            codes::CMD_CALL_STATE_CHANGE,
                            Body::CallStateChange(CallStateChange {
                                call_index: index,
                                next_state: CallState::Active,
                            }),
                        ),
                        self.config.dial_active_delay_ms,
                    );
                }
                Self::push_call_state_changed(queue);
                Outcome::ok()
            }
            Err(e) => Outcome::ril(e.as_ril_error()),
        }
    }

    fn hang_up(&mut self, req: &Request, queue: &QueueHandle) -> Outcome {
        let Some(Body::HangUp(hangup)) = &req.body else {
            warn!("hangup without decodable body");
            return Outcome::ril(RilError::GenericFailure);
        };
        match self.calls.remove(hangup.connection_index) {
            Ok(_) => {
                Self::push_call_state_changed(queue);
                Outcome::ok()
            }
            Err(e) => Outcome::ril(e.as_ril_error()),
        }
    }

    fn hang_up_waiting_or_background(&mut self, _req: &Request, queue: &QueueHandle) -> Outcome {
        match self.calls.hangup_held_or_waiting() {
            Ok(()) => {
                Self::push_call_state_changed(queue);
                Outcome::ok()
            }
            Err(e) => Outcome::ril(e.as_ril_error()),
        }
    }

    fn hang_up_foreground_resume_background(
        &mut self,
        _req: &Request,
        queue: &QueueHandle,
    ) -> Outcome {
        match self.calls.hangup_active_resume_held() {
            Ok(()) => {
                Self::push_call_state_changed(queue);
                Outcome::ok()
            }
            Err(e) => Outcome::ril(e.as_ril_error()),
        }
    }

    fn switch_waiting_or_holding_and_active(
        &mut self,
        req: &Request,
        queue: &QueueHandle,
    ) -> Outcome {
        // The device stack is known to deliver this request twice in
        // immediate succession; the second identical delivery is a no-op.
        if self.last_external == Some((req.code, req.token)) {
            debug!(token = req.token, "duplicate swap suppressed");
            return Outcome::ok();
        }
        if self.calls.swap_active_and_held() {
            Self::push_call_state_changed(queue);
        }
        Outcome::ok()
    }

    fn conference(&mut self, _req: &Request, queue: &QueueHandle) -> Outcome {
        match self.calls.conference(self.config.max_connections_per_call) {
            Ok(()) => {
                Self::push_call_state_changed(queue);
                Outcome::ok()
            }
            Err(e) => Outcome::ril(e.as_ril_error()),
        }
    }

    fn answer(&mut self, _req: &Request, queue: &QueueHandle) -> Outcome {
        match self.calls.answer() {
            Ok(_) => {
                Self::push_call_state_changed(queue);
                Outcome::ok()
            }
            Err(e) => {
                // A lone call in the wrong state was removed as part of the
                // failure; that removal is still a state change.
                if matches!(e, SimError::UnexpectedCallState { .. }) {
                    Self::push_call_state_changed(queue);
                }
                Outcome::ril(e.as_ril_error())
            }
        }
    }

    fn last_call_fail_cause(&mut self, _req: &Request, _queue: &QueueHandle) -> Outcome {
        let rsp = LastCallFailCauseRsp {
            cause: self.last_call_fail_cause,
        };
        self.reply(Schema::RspLastCallFailCause, Body::LastCallFailCause(rsp))
    }

    fn signal_strength(&mut self, _req: &Request, _queue: &QueueHandle) -> Outcome {
        self.reply(Schema::RspSignalStrength, Body::SignalStrength(self.signal))
    }

    fn voice_registration_state(&mut self, _req: &Request, _queue: &QueueHandle) -> Outcome {
        let mut strings = vec![
            Some(self.registration.state.clone()),
            Some(self.registration.lac.clone()),
            Some(self.registration.cid.clone()),
            Some(self.registration.technology.clone()),
        ];
        // Base station, CDMA and registration-denial fields have no reading.
        strings.resize(15, None);
        self.reply(Schema::RspStrings, Body::Strings(StringsRsp { strings }))
    }

    fn data_registration_state(&mut self, _req: &Request, _queue: &QueueHandle) -> Outcome {
        let strings = vec![
            Some(self.registration.state.clone()),
            Some(self.registration.lac.clone()),
            Some(self.registration.cid.clone()),
            Some(self.registration.technology.clone()),
        ];
        self.reply(Schema::RspStrings, Body::Strings(StringsRsp { strings }))
    }

    fn query_network_selection_mode(&mut self, _req: &Request, _queue: &QueueHandle) -> Outcome {
        let rsp = IntegersRsp {
            integers: vec![self.network_selection_mode],
        };
        self.reply(Schema::RspIntegers, Body::Integers(rsp))
    }

    fn set_network_selection_automatic(&mut self, _req: &Request, _queue: &QueueHandle) -> Outcome {
        self.network_selection_mode = NETWORK_SELECTION_AUTOMATIC;
        Outcome::ok()
    }

    fn baseband_version(&mut self, _req: &Request, _queue: &QueueHandle) -> Outcome {
        let rsp = StringsRsp {
            strings: vec![Some(self.config.baseband_version.clone())],
        };
        self.reply(Schema::RspStrings, Body::Strings(rsp))
    }

    fn set_mute(&mut self, req: &Request, _queue: &QueueHandle) -> Outcome {
        if !self.ctx.radio_state().is_available() {
            return Outcome::ril(RilError::RadioNotAvailable);
        }
        let Some(Body::SetMute(set)) = &req.body else {
            warn!("set mute without decodable body");
            return Outcome::ril(RilError::GenericFailure);
        };
        self.ctx.set_mute(set.mute);
        Outcome::ok()
    }

    fn get_mute(&mut self, _req: &Request, _queue: &QueueHandle) -> Outcome {
        if !self.ctx.radio_state().is_available() {
            return Outcome::ril(RilError::RadioNotAvailable);
        }
        let rsp = MuteRsp {
            mute: self.ctx.mute(),
        };
        self.reply(Schema::RspMute, Body::Mute(rsp))
    }

    fn screen_state(&mut self, req: &Request, _queue: &QueueHandle) -> Outcome {
        let Some(Body::ScreenState(screen)) = &req.body else {
            warn!("screen state without decodable body");
            return Outcome::ril(RilError::GenericFailure);
        };
        self.ctx.set_screen_on(screen.on);
        Outcome::ok()
    }

    // -------------------------------------------------------------------------
    // Controller command handlers
    // -------------------------------------------------------------------------

    fn ctrl_set_mt_call(&mut self, req: &Request, queue: &QueueHandle) -> Outcome {
        let Some(Body::SetMtCall(mt)) = &req.body else {
            warn!("set mt call without decodable body");
            return Outcome::ctrl(CtrlStatus::Err);
        };
        match self.calls.start_incoming(&mt.phone_number) {
            Ok((index, state)) => {
                debug!(index, ?state, number = %mt.phone_number, "incoming call");
                Self::push_call_state_changed(queue);
                self.arm_ring(queue);
                Outcome::ctrl(CtrlStatus::Ok)
            }
            Err(e) => {
                debug!(error = %e, "incoming call rejected");
                Outcome::ctrl(e.as_ctrl_status())
            }
        }
    }

    fn ctrl_hangup_conn_remote(&mut self, req: &Request, queue: &QueueHandle) -> Outcome {
        let Some(Body::HangupConnRemote(hangup)) = &req.body else {
            warn!("remote hangup without decodable body");
            return Outcome::ctrl(CtrlStatus::Err);
        };
        match self.calls.remove(hangup.connection_index) {
            Ok(_) => {
                self.last_call_fail_cause = hangup.fail_cause;
                Self::push_call_state_changed(queue);
                Outcome::ctrl(CtrlStatus::Ok)
            }
            Err(e) => Outcome::ctrl(e.as_ctrl_status()),
        }
    }

    fn ctrl_set_call_transition_flag(&mut self, req: &Request, _queue: &QueueHandle) -> Outcome {
        let Some(Body::SetCallTransitionFlag(set)) = &req.body else {
            warn!("set transition flag without decodable body");
            return Outcome::ctrl(CtrlStatus::Err);
        };
        debug!(flag = set.flag, "call transition flag");
        self.call_transition_flag = set.flag;
        Outcome::ctrl(CtrlStatus::Ok)
    }

    fn ctrl_set_call_alert(&mut self, _req: &Request, queue: &QueueHandle) -> Outcome {
        match self
            .calls
            .transition_single(CallState::Dialing, CallState::Alerting)
        {
            Ok(_) => {
                Self::push_call_state_changed(queue);
                Outcome::ctrl(CtrlStatus::Ok)
            }
            Err(e) => Outcome::ctrl(e.as_ctrl_status()),
        }
    }

    fn ctrl_set_call_active(&mut self, _req: &Request, queue: &QueueHandle) -> Outcome {
        match self
            .calls
            .transition_single(CallState::Alerting, CallState::Active)
        {
            Ok(_) => {
                Self::push_call_state_changed(queue);
                Outcome::ctrl(CtrlStatus::Ok)
            }
            Err(e) => Outcome::ctrl(e.as_ctrl_status()),
        }
    }

    fn ctrl_add_dialing_call(&mut self, req: &Request, queue: &QueueHandle) -> Outcome {
        let Some(Body::AddDialingCall(add)) = &req.body else {
            warn!("add dialing call without decodable body");
            return Outcome::ctrl(CtrlStatus::Err);
        };
        match self.calls.add(CallState::Dialing, &add.phone_number, "") {
            Ok(index) => {
                debug!(index, "dialing call added without timers");
                Self::push_call_state_changed(queue);
                Outcome::ctrl(CtrlStatus::Ok)
            }
            Err(e) => Outcome::ctrl(e.as_ctrl_status()),
        }
    }

    // -------------------------------------------------------------------------
    // Internal scheduling handlers
    // -------------------------------------------------------------------------

    fn delay_test(&mut self, req: &Request, _queue: &QueueHandle) -> Outcome {
        debug!(token = req.token, "delay test tick");
        Outcome::silent()
    }

    fn call_state_change(&mut self, req: &Request, queue: &QueueHandle) -> Outcome {
        let Some(Body::CallStateChange(change)) = &req.body else {
            warn!("call state change tick without payload");
            return Outcome::silent();
        };
        match self.calls.transition(change.call_index, change.next_state) {
            Ok(()) => Self::push_call_state_changed(queue),
            // The call was hung up before its timer fired.
            Err(SimError::NoSuchCall(index)) => {
                debug!(index, "scheduled transition for gone call");
            }
            Err(e) => warn!(error = %e, "scheduled transition rejected"),
        }
        Outcome::silent()
    }

    fn unsol_call_state_changed(&mut self, _req: &Request, _queue: &QueueHandle) -> Outcome {
        self.emitter
            .unsolicited(codes::UNSOL_CALL_STATE_CHANGED, None);
        Outcome::silent()
    }

    fn unsol_call_ring(&mut self, _req: &Request, queue: &QueueHandle) -> Outcome {
        if self.calls.has_ringing_call() {
            self.emitter.unsolicited(codes::UNSOL_CALL_RING, None);
            queue.add_delayed(
                Request::internal(codes::CMD_UNSOL_CALL_RING),
                self.config.call_ring_period_ms,
            );
        } else {
            debug!("ring stopped, no ringing call");
            self.ring_armed = false;
        }
        Outcome::silent()
    }

    fn unsol_signal_strength(&mut self, _req: &Request, queue: &QueueHandle) -> Outcome {
        match self
            .codec
            .encode(Schema::RspSignalStrength, &Body::SignalStrength(self.signal))
        {
            Ok(payload) => self
                .emitter
                .unsolicited(codes::UNSOL_SIGNAL_STRENGTH, Some(payload)),
            Err(e) => warn!(error = %e, "signal report encode failed"),
        }
        if self.config.signal_report_period_ms > 0 {
            queue.add_delayed(
                Request::internal(codes::CMD_UNSOL_SIGNAL_STRENGTH),
                self.config.signal_report_period_ms,
            );
        }
        Outcome::silent()
    }
}

impl Subsystem for Radio {
    fn name(&self) -> &'static str {
        "radio"
    }

    fn process(&mut self, req: Request, queue: &QueueHandle) {
        debug!(code = req.code, token = req.token, source = ?req.source, "radio request");

        let handler = match req.source {
            RequestSource::Control => self.ctrl_table.get(&req.code).copied(),
            RequestSource::Device | RequestSource::Internal => {
                self.ril_table.get(&req.code).copied()
            }
        };

        let outcome = match handler {
            Some(handler) => handler(self, &req, queue),
            None => {
                warn!(code = req.code, "radio: unsupported command");
                match req.source {
                    RequestSource::Control => Outcome::ctrl(CtrlStatus::Err),
                    _ => Outcome::ril(RilError::RequestNotSupported),
                }
            }
        };

        if req.source != RequestSource::Internal {
            self.last_external = Some((req.code, req.token));
        }

        if outcome.send_response {
            match req.source {
                RequestSource::Device => self.emitter.request_complete(
                    outcome.status.as_ril(),
                    req.code,
                    req.token,
                    outcome.payload,
                ),
                RequestSource::Control => self.emitter.ctrl_complete(
                    outcome.status.as_ctrl(),
                    req.code,
                    req.token,
                    outcome.payload,
                ),
                RequestSource::Internal => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::Emission;
    use crate::queue::spawn_subsystem;
    use ril_proto::{DialReq, HangUpReq, JsonCodec, SetMuteReq, RadioState};

    /// Swallows follow-up tasks so handler logic can be driven directly.
    struct Sink;

    impl Subsystem for Sink {
        fn name(&self) -> &'static str {
            "sink"
        }
        fn process(&mut self, _req: Request, _queue: &QueueHandle) {}
    }

    struct Fixture {
        radio: Radio,
        ctx: Arc<DeviceContext>,
        rx: tokio::sync::mpsc::UnboundedReceiver<Emission>,
        queue: QueueHandle,
    }

    fn fixture() -> Fixture {
        let (emitter, rx) = Emitter::channel();
        let ctx = Arc::new(DeviceContext::new(emitter.clone()));
        let radio = Radio::new(
            ctx.clone(),
            Arc::new(JsonCodec::new()),
            emitter,
            SimConfig::default(),
        );
        let queue = spawn_subsystem(Sink);
        Fixture {
            radio,
            ctx,
            rx,
            queue,
        }
    }

    fn device_request(code: i32, token: i64, body: Option<Body>) -> Request {
        Request {
            code,
            token,
            source: RequestSource::Device,
            body,
        }
    }

    #[tokio::test]
    async fn test_dial_then_hangup() {
        let mut f = fixture();
        let dial = device_request(
            codes::REQUEST_DIAL,
            1,
            Some(Body::Dial(DialReq {
                address: "555-0100".into(),
                clir: 0,
            })),
        );
        f.radio.process(dial, &f.queue);
        assert!(matches!(
            f.rx.recv().await.unwrap(),
            Emission::RequestCompleted {
                error: RilError::Success,
                code: codes::REQUEST_DIAL,
                token: 1,
                ..
            }
        ));

        let hangup = device_request(
            codes::REQUEST_HANGUP,
            2,
            Some(Body::HangUp(HangUpReq {
                connection_index: 1,
            })),
        );
        f.radio.process(hangup, &f.queue);
        assert!(matches!(
            f.rx.recv().await.unwrap(),
            Emission::RequestCompleted {
                error: RilError::Success,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_hangup_missing_index_fails() {
        let mut f = fixture();
        let hangup = device_request(
            codes::REQUEST_HANGUP,
            1,
            Some(Body::HangUp(HangUpReq {
                connection_index: 3,
            })),
        );
        f.radio.process(hangup, &f.queue);
        assert!(matches!(
            f.rx.recv().await.unwrap(),
            Emission::RequestCompleted {
                error: RilError::GenericFailure,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_null_body_is_a_generic_failure() {
        let mut f = fixture();
        f.radio
            .process(device_request(codes::REQUEST_DIAL, 1, None), &f.queue);
        assert!(matches!(
            f.rx.recv().await.unwrap(),
            Emission::RequestCompleted {
                error: RilError::GenericFailure,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_unknown_command_reports_not_supported() {
        let mut f = fixture();
        f.radio.process(device_request(777, 1, None), &f.queue);
        assert!(matches!(
            f.rx.recv().await.unwrap(),
            Emission::RequestCompleted {
                error: RilError::RequestNotSupported,
                code: 777,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_mute_requires_available_radio() {
        let mut f = fixture();
        // Context starts unavailable.
        f.radio.process(
            device_request(
                codes::REQUEST_SET_MUTE,
                1,
                Some(Body::SetMute(SetMuteReq { mute: true })),
            ),
            &f.queue,
        );
        assert!(matches!(
            f.rx.recv().await.unwrap(),
            Emission::RequestCompleted {
                error: RilError::RadioNotAvailable,
                ..
            }
        ));

        f.ctx.set_radio_state(RadioState::SimReady);
        // Drain the bundled unsolicited notification.
        let _ = f.rx.recv().await.unwrap();

        f.radio.process(
            device_request(
                codes::REQUEST_SET_MUTE,
                2,
                Some(Body::SetMute(SetMuteReq { mute: true })),
            ),
            &f.queue,
        );
        assert!(matches!(
            f.rx.recv().await.unwrap(),
            Emission::RequestCompleted {
                error: RilError::Success,
                ..
            }
        ));
        assert!(f.ctx.mute());
    }

    #[test]
    fn test_signal_strength_rejects_out_of_range_rssi() {
        let (emitter, _rx) = Emitter::channel();
        let ctx = Arc::new(DeviceContext::new(emitter.clone()));
        let mut radio = Radio::new(
            ctx,
            Arc::new(JsonCodec::new()),
            emitter,
            SimConfig::default(),
        );

        let before = radio.signal;
        let mut bad = before;
        bad.gsm_signal_strength = 32;
        assert_eq!(
            radio.set_signal_strength(bad).unwrap_err(),
            SimError::SignalOutOfRange(32)
        );
        assert_eq!(radio.signal, before);

        let mut good = before;
        good.gsm_signal_strength = 31;
        radio.set_signal_strength(good).unwrap();
        assert_eq!(radio.signal.gsm_signal_strength, 31);
    }

    #[tokio::test]
    async fn test_duplicate_swap_is_suppressed() {
        let mut f = fixture();
        f.radio.process(
            device_request(
                codes::REQUEST_DIAL,
                1,
                Some(Body::Dial(DialReq {
                    address: "555-0100".into(),
                    clir: 0,
                })),
            ),
            &f.queue,
        );
        let _ = f.rx.recv().await.unwrap();
        // Settle the call so the swap has something to toggle.
        f.radio.calls.transition(1, CallState::Alerting).unwrap();
        f.radio.calls.transition(1, CallState::Active).unwrap();

        let swap = device_request(codes::REQUEST_SWITCH_WAITING_OR_HOLDING_AND_ACTIVE, 9, None);
        f.radio.process(swap.clone(), &f.queue);
        let _ = f.rx.recv().await.unwrap();
        assert_eq!(f.radio.calls.get(1).unwrap().state, CallState::Holding);

        // Identical delivery straight after: state must not toggle back.
        f.radio.process(swap, &f.queue);
        let _ = f.rx.recv().await.unwrap();
        assert_eq!(f.radio.calls.get(1).unwrap().state, CallState::Holding);

        // A distinct swap request does toggle.
        let swap2 = device_request(codes::REQUEST_SWITCH_WAITING_OR_HOLDING_AND_ACTIVE, 10, None);
        f.radio.process(swap2, &f.queue);
        let _ = f.rx.recv().await.unwrap();
        assert_eq!(f.radio.calls.get(1).unwrap().state, CallState::Active);
    }
}
