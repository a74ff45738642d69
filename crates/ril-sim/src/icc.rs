//! SIM/card subsystem
//!
//! Identity and card-status queries with static or lightly parameterized
//! answers. No state machine lives here; the subsystem exists as a dispatch
//! target with the same handler contract as the radio.

use std::collections::HashMap;
use std::sync::Arc;

use ril_proto::{
    codes, Body, CardStatus, CtrlStatus, EnterSimPinRsp, OperatorRsp, PayloadCodec, RilError,
    Schema, SimStatusRsp, StringsRsp,
};
use tracing::{debug, warn};

use crate::config::SimConfig;
use crate::emitter::Emitter;
use crate::queue::{QueueHandle, Subsystem};
use crate::request::{Outcome, Request, RequestSource};

const PIN_RETRIES: i32 = 3;

type Handler = fn(&mut Icc, &Request) -> Outcome;

/// The simulated SIM card subsystem.
pub struct Icc {
    codec: Arc<dyn PayloadCodec>,
    emitter: Emitter,
    config: SimConfig,
    card_status: CardStatus,
    table: HashMap<i32, Handler>,
}

impl Icc {
    pub fn new(codec: Arc<dyn PayloadCodec>, emitter: Emitter, config: SimConfig) -> Self {
        let mut table: HashMap<i32, Handler> = HashMap::new();
        table.insert(codes::REQUEST_GET_SIM_STATUS, Self::get_sim_status);
        table.insert(codes::REQUEST_ENTER_SIM_PIN, Self::enter_sim_pin);
        table.insert(codes::REQUEST_GET_IMSI, Self::get_imsi);
        table.insert(codes::REQUEST_OPERATOR, Self::operator);
        table.insert(codes::REQUEST_GET_IMEI, Self::get_imei);
        table.insert(codes::REQUEST_GET_IMEISV, Self::get_imeisv);

        Self {
            codec,
            emitter,
            config,
            card_status: CardStatus::present_gsm(),
            table,
        }
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

    fn single_string(&self, value: &str) -> Outcome {
        self.reply(
            Schema::RspStrings,
            Body::Strings(StringsRsp {
                strings: vec![Some(value.to_string())],
            }),
        )
    }

    fn get_sim_status(&mut self, _req: &Request) -> Outcome {
        let rsp = SimStatusRsp {
            card_status: self.card_status.clone(),
        };
        self.reply(Schema::RspSimStatus, Body::SimStatus(rsp))
    }

    fn enter_sim_pin(&mut self, req: &Request) -> Outcome {
        let Some(Body::EnterSimPin(enter)) = &req.body else {
            warn!("enter sim pin without decodable body");
            return Outcome::ril(RilError::GenericFailure);
        };
        debug!(pin_len = enter.pin.len(), "sim pin entered");
        let rsp = EnterSimPinRsp {
            retries_remaining: PIN_RETRIES,
        };
        self.reply(Schema::RspEnterSimPin, Body::EnterSimPinRsp(rsp))
    }

    fn get_imsi(&mut self, _req: &Request) -> Outcome {
        self.single_string(&self.config.imsi())
    }

    fn operator(&mut self, _req: &Request) -> Outcome {
        let rsp = OperatorRsp {
            long_name: self.config.operator_long_name.clone(),
            short_name: self.config.operator_short_name.clone(),
            mcc_mnc: self.config.mcc_mnc(),
        };
        self.reply(Schema::RspOperator, Body::Operator(rsp))
    }

    fn get_imei(&mut self, _req: &Request) -> Outcome {
        self.single_string(&self.config.imei)
    }

    fn get_imeisv(&mut self, _req: &Request) -> Outcome {
        self.single_string(&self.config.imeisv)
    }
}

impl Subsystem for Icc {
    fn name(&self) -> &'static str {
        "icc"
    }

    fn process(&mut self, req: Request, _queue: &QueueHandle) {
        debug!(code = req.code, token = req.token, "icc request");

        let outcome = match self.table.get(&req.code).copied() {
            Some(handler) => handler(self, &req),
            None => {
                warn!(code = req.code, "icc: unsupported command");
                match req.source {
                    RequestSource::Control => Outcome::ctrl(CtrlStatus::Err),
                    _ => Outcome::ril(RilError::RequestNotSupported),
                }
            }
        };

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
    use ril_proto::{EnterSimPinReq, JsonCodec};

    struct Sink;

    impl Subsystem for Sink {
        fn name(&self) -> &'static str {
            "sink"
        }
        fn process(&mut self, _req: Request, _queue: &QueueHandle) {}
    }

    fn fixture() -> (
        Icc,
        tokio::sync::mpsc::UnboundedReceiver<Emission>,
        QueueHandle,
    ) {
        let (emitter, rx) = Emitter::channel();
        let icc = Icc::new(Arc::new(JsonCodec::new()), emitter, SimConfig::default());
        (icc, rx, spawn_subsystem(Sink))
    }

    fn decode(codec: &JsonCodec, schema: Schema, payload: &[u8]) -> Body {
        codec.decode(schema, payload).unwrap()
    }

    async fn payload_of(rx: &mut tokio::sync::mpsc::UnboundedReceiver<Emission>) -> Vec<u8> {
        match rx.recv().await.unwrap() {
            Emission::RequestCompleted {
                error: RilError::Success,
                payload: Some(payload),
                ..
            } => payload,
            other => panic!("expected successful completion, got {other:?}"),
        }
    }

    fn device_request(code: i32, body: Option<Body>) -> Request {
        Request {
            code,
            token: 1,
            source: RequestSource::Device,
            body,
        }
    }

    #[tokio::test]
    async fn test_imsi_is_mcc_mnc_msn() {
        let (mut icc, mut rx, queue) = fixture();
        icc.process(device_request(codes::REQUEST_GET_IMSI, None), &queue);
        let payload = payload_of(&mut rx).await;
        let Body::Strings(rsp) = decode(&JsonCodec::new(), Schema::RspStrings, &payload) else {
            panic!("wrong shape");
        };
        assert_eq!(rsp.strings, vec![Some("310260123456789".to_string())]);
    }

    #[tokio::test]
    async fn test_sim_status_reports_present_card() {
        let (mut icc, mut rx, queue) = fixture();
        icc.process(device_request(codes::REQUEST_GET_SIM_STATUS, None), &queue);
        let payload = payload_of(&mut rx).await;
        let Body::SimStatus(rsp) = decode(&JsonCodec::new(), Schema::RspSimStatus, &payload) else {
            panic!("wrong shape");
        };
        assert_eq!(rsp.card_status.card_state, codes::CARDSTATE_PRESENT);
        assert_eq!(rsp.card_status.num_applications, 1);
    }

    #[tokio::test]
    async fn test_enter_sim_pin_reports_fixed_retries() {
        let (mut icc, mut rx, queue) = fixture();
        icc.process(
            device_request(
                codes::REQUEST_ENTER_SIM_PIN,
                Some(Body::EnterSimPin(EnterSimPinReq {
                    pin: "0000".into(),
                })),
            ),
            &queue,
        );
        let payload = payload_of(&mut rx).await;
        let Body::EnterSimPinRsp(rsp) = decode(&JsonCodec::new(), Schema::RspEnterSimPin, &payload)
        else {
            panic!("wrong shape");
        };
        assert_eq!(rsp.retries_remaining, PIN_RETRIES);
    }

    #[tokio::test]
    async fn test_operator_names() {
        let (mut icc, mut rx, queue) = fixture();
        icc.process(device_request(codes::REQUEST_OPERATOR, None), &queue);
        let payload = payload_of(&mut rx).await;
        let Body::Operator(rsp) = decode(&JsonCodec::new(), Schema::RspOperator, &payload) else {
            panic!("wrong shape");
        };
        assert_eq!(rsp.mcc_mnc, "310260");
        assert!(!rsp.long_name.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_command() {
        let (mut icc, mut rx, queue) = fixture();
        icc.process(device_request(500, None), &queue);
        assert!(matches!(
            rx.recv().await.unwrap(),
            Emission::RequestCompleted {
                error: RilError::RequestNotSupported,
                ..
            }
        ));
    }
}
