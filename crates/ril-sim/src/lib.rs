//! Mock modem simulation engine
//!
//! A protocol-level stand-in for a real cellular modem, built for integration
//! testing: it accepts device-control requests, produces synchronous
//! completions and asynchronous notifications, and keeps believable session
//! state (calls, registration, signal quality) across request types.
//!
//! # Architecture
//!
//! Three subsystems (radio/call handling, SIM card, control) each run as one
//! serialized worker over their own task queue; all state mutation happens
//! inside the owning worker. Two routers feed the queues:
//!
//! - the device router maps RIL-style request codes to target subsystems,
//! - the control router handles controller commands, keeping codes at or
//!   below the dispatch base local and forwarding the rest into RIL-style
//!   subsystem handling.
//!
//! Completions and unsolicited notifications surface on a single
//! [`Emission`] channel. Payload bytes cross the boundary through the
//! schema-driven codec from `ril-proto`; the engine never interprets raw
//! bytes itself.
//!
//! # Example
//!
//! ```rust,no_run
//! use ril_proto::{codes, Body, DialReq, JsonCodec, PayloadCodec, Schema};
//! use ril_sim::{MockRil, SimConfig};
//!
//! # async fn demo() {
//! let (ril, mut emissions) = MockRil::start(SimConfig::default());
//!
//! let codec = JsonCodec::new();
//! let dial = codec
//!     .encode(Schema::ReqDial, &Body::Dial(DialReq { address: "555-0100".into(), clir: 0 }))
//!     .unwrap();
//! ril.submit_device_request(codes::REQUEST_DIAL, 1, &dial);
//!
//! while let Some(emission) = emissions.recv().await {
//!     println!("{emission:?}");
//! }
//! # }
//! ```

pub mod calls;
pub mod config;
pub mod context;
pub mod control;
pub mod emitter;
pub mod error;
pub mod icc;
pub mod queue;
pub mod radio;
pub mod request;
pub mod router;

use std::sync::Arc;

use ril_proto::{codes, JsonCodec, PayloadCodec, RadioState, Schema};
use tokio::sync::mpsc;
use tracing::info;

pub use calls::{Call, CallTable};
pub use config::SimConfig;
pub use context::DeviceContext;
pub use control::Control;
pub use emitter::{Emission, Emitter};
pub use error::SimError;
pub use icc::Icc;
pub use queue::{spawn_subsystem, QueueHandle, Subsystem};
pub use radio::Radio;
pub use request::{CompletionStatus, Outcome, Request, RequestSource};
pub use router::{ControlRouter, DeviceRouter, DispatchEntry};

/// A running simulator: spawned subsystem workers plus the two routers.
///
/// Dropping the instance tears the subsystems down; pending timers go with
/// them.
pub struct MockRil {
    device_router: DeviceRouter,
    control_router: ControlRouter,
    context: Arc<DeviceContext>,
}

impl MockRil {
    /// Boot the simulator. Must be called within a tokio runtime.
    ///
    /// Returns the instance and the emission stream carrying every
    /// completion and unsolicited notification.
    pub fn start(config: SimConfig) -> (MockRil, mpsc::UnboundedReceiver<Emission>) {
        let (emitter, emissions) = Emitter::channel();
        let codec: Arc<dyn PayloadCodec> = Arc::new(JsonCodec::new());
        let context = Arc::new(DeviceContext::new(emitter.clone()));

        let radio = Radio::new(
            context.clone(),
            codec.clone(),
            emitter.clone(),
            config.clone(),
        );
        let radio_queue = spawn_subsystem(radio);

        let icc = Icc::new(codec.clone(), emitter.clone(), config.clone());
        let icc_queue = spawn_subsystem(icc);

        let control = Control::new(context.clone(), codec.clone(), emitter.clone());
        let control_queue = spawn_subsystem(control);

        let device_router = build_device_router(
            codec.clone(),
            emitter.clone(),
            &radio_queue,
            &icc_queue,
        );
        let control_router =
            build_control_router(codec, emitter, control_queue, &radio_queue);

        // Arm the periodic signal-quality report.
        if config.signal_report_period_ms > 0 {
            radio_queue.add_delayed(
                Request::internal(codes::CMD_UNSOL_SIGNAL_STRENGTH),
                config.signal_report_period_ms,
            );
        }

        // A booted modem comes up with its SIM ready; the setter bundles the
        // radio-state notification.
        context.set_radio_state(RadioState::SimReady);
        info!("mock modem started");

        (
            MockRil {
                device_router,
                control_router,
                context,
            },
            emissions,
        )
    }

    /// Submit a device-originated request. Fire-and-forget: the completion
    /// arrives later on the emission stream.
    pub fn submit_device_request(&self, code: i32, token: i64, payload: &[u8]) {
        self.device_router.route(code, token, payload);
    }

    /// Submit a controller-originated request.
    pub fn submit_control_request(&self, code: i32, token: i64, payload: &[u8]) {
        self.control_router.route(code, token, payload);
    }

    /// Shared device context (radio state, screen, mute).
    pub fn context(&self) -> &Arc<DeviceContext> {
        &self.context
    }
}

fn build_device_router(
    codec: Arc<dyn PayloadCodec>,
    emitter: Emitter,
    radio: &QueueHandle,
    icc: &QueueHandle,
) -> DeviceRouter {
    let mut router = DeviceRouter::new(codec, emitter);

    router.register(codes::REQUEST_GET_SIM_STATUS, vec![icc.clone()], None);
    router.register(
        codes::REQUEST_ENTER_SIM_PIN,
        vec![icc.clone()],
        Some(Schema::ReqEnterSimPin),
    );
    router.register(codes::REQUEST_GET_CURRENT_CALLS, vec![radio.clone()], None);
    router.register(
        codes::REQUEST_DIAL,
        vec![radio.clone()],
        Some(Schema::ReqDial),
    );
    router.register(codes::REQUEST_GET_IMSI, vec![icc.clone()], None);
    router.register(
        codes::REQUEST_HANGUP,
        vec![radio.clone()],
        Some(Schema::ReqHangUp),
    );
    router.register(
        codes::REQUEST_HANGUP_WAITING_OR_BACKGROUND,
        vec![radio.clone()],
        None,
    );
    router.register(
        codes::REQUEST_HANGUP_FOREGROUND_RESUME_BACKGROUND,
        vec![radio.clone()],
        None,
    );
    router.register(
        codes::REQUEST_SWITCH_WAITING_OR_HOLDING_AND_ACTIVE,
        vec![radio.clone()],
        None,
    );
    router.register(codes::REQUEST_CONFERENCE, vec![radio.clone()], None);
    router.register(
        codes::REQUEST_LAST_CALL_FAIL_CAUSE,
        vec![radio.clone()],
        None,
    );
    router.register(codes::REQUEST_SIGNAL_STRENGTH, vec![radio.clone()], None);
    router.register(
        codes::REQUEST_VOICE_REGISTRATION_STATE,
        vec![radio.clone()],
        None,
    );
    router.register(
        codes::REQUEST_DATA_REGISTRATION_STATE,
        vec![radio.clone()],
        None,
    );
    router.register(codes::REQUEST_OPERATOR, vec![icc.clone()], None);
    router.register(codes::REQUEST_GET_IMEI, vec![icc.clone()], None);
    router.register(codes::REQUEST_GET_IMEISV, vec![icc.clone()], None);
    router.register(codes::REQUEST_ANSWER, vec![radio.clone()], None);
    router.register(
        codes::REQUEST_QUERY_NETWORK_SELECTION_MODE,
        vec![radio.clone()],
        None,
    );
    router.register(
        codes::REQUEST_SET_NETWORK_SELECTION_AUTOMATIC,
        vec![radio.clone()],
        None,
    );
    router.register(codes::REQUEST_BASEBAND_VERSION, vec![radio.clone()], None);
    router.register(
        codes::REQUEST_SET_MUTE,
        vec![radio.clone()],
        Some(Schema::ReqSetMute),
    );
    router.register(codes::REQUEST_GET_MUTE, vec![radio.clone()], None);
    router.register(
        codes::REQUEST_SCREEN_STATE,
        vec![radio.clone()],
        Some(Schema::ReqScreenState),
    );

    router
}

fn build_control_router(
    codec: Arc<dyn PayloadCodec>,
    emitter: Emitter,
    control: QueueHandle,
    radio: &QueueHandle,
) -> ControlRouter {
    let mut router = ControlRouter::new(control, codec, emitter);

    router.register_local_schema(codes::CTRL_SET_RADIO_STATE, Schema::CtrlReqSetRadioState);

    router.register_forward(
        codes::CTRL_SET_MT_CALL,
        vec![radio.clone()],
        Some(Schema::CtrlReqSetMtCall),
    );
    router.register_forward(
        codes::CTRL_HANGUP_CONN_REMOTE,
        vec![radio.clone()],
        Some(Schema::CtrlReqHangupConnRemote),
    );
    router.register_forward(
        codes::CTRL_SET_CALL_TRANSITION_FLAG,
        vec![radio.clone()],
        Some(Schema::CtrlReqSetCallTransitionFlag),
    );
    router.register_forward(codes::CTRL_SET_CALL_ALERT, vec![radio.clone()], None);
    router.register_forward(codes::CTRL_SET_CALL_ACTIVE, vec![radio.clone()], None);
    router.register_forward(
        codes::CTRL_ADD_DIALING_CALL,
        vec![radio.clone()],
        Some(Schema::CtrlReqAddDialingCall),
    );

    router
}
