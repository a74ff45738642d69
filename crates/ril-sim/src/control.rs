//! Control subsystem
//!
//! Handles the controller-local commands (radio-state get/set). Everything
//! numerically above the dispatch base never reaches this subsystem; the
//! control router forwards those commands straight into the RIL-style handler
//! tables of the target subsystems.

use std::collections::HashMap;
use std::sync::Arc;

use ril_proto::{codes, Body, CtrlStatus, PayloadCodec, RadioStateRsp, Schema};
use tracing::{debug, warn};

use crate::context::DeviceContext;
use crate::emitter::Emitter;
use crate::queue::{QueueHandle, Subsystem};
use crate::request::{Outcome, Request};

type Handler = fn(&mut Control, &Request) -> Outcome;

/// The controller-facing subsystem.
pub struct Control {
    ctx: Arc<DeviceContext>,
    codec: Arc<dyn PayloadCodec>,
    emitter: Emitter,
    table: HashMap<i32, Handler>,
}

impl Control {
    pub fn new(ctx: Arc<DeviceContext>, codec: Arc<dyn PayloadCodec>, emitter: Emitter) -> Self {
        let mut table: HashMap<i32, Handler> = HashMap::new();
        table.insert(codes::CTRL_GET_RADIO_STATE, Self::get_radio_state);
        table.insert(codes::CTRL_SET_RADIO_STATE, Self::set_radio_state);

        Self {
            ctx,
            codec,
            emitter,
            table,
        }
    }

    fn get_radio_state(&mut self, _req: &Request) -> Outcome {
        let rsp = RadioStateRsp {
            state: self.ctx.radio_state(),
        };
        match self
            .codec
            .encode(Schema::CtrlRspRadioState, &Body::RadioState(rsp))
        {
            Ok(payload) => Outcome::ctrl_with(CtrlStatus::Ok, payload),
            Err(e) => {
                warn!(error = %e, "radio state encode failed");
                Outcome::ctrl(CtrlStatus::Err)
            }
        }
    }

    fn set_radio_state(&mut self, req: &Request) -> Outcome {
        let Some(Body::SetRadioState(set)) = &req.body else {
            warn!("set radio state without decodable body");
            return Outcome::ctrl(CtrlStatus::Err);
        };
        // The context setter bundles the unsolicited notification.
        self.ctx.set_radio_state(set.state);
        Outcome::ctrl(CtrlStatus::Ok)
    }
}

impl Subsystem for Control {
    fn name(&self) -> &'static str {
        "control"
    }

    fn process(&mut self, req: Request, _queue: &QueueHandle) {
        debug!(code = req.code, token = req.token, "control request");

        let outcome = match self.table.get(&req.code).copied() {
            Some(handler) => handler(self, &req),
            None => {
                warn!(code = req.code, "control: unsupported command");
                Outcome::ctrl(CtrlStatus::Err)
            }
        };

        if outcome.send_response {
            self.emitter.ctrl_complete(
                outcome.status.as_ctrl(),
                req.code,
                req.token,
                outcome.payload,
            );
        }
    }
}
