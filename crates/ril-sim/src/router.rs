//! Request dispatch routers
//!
//! The single entry points for externally originated work. Each router owns a
//! static table mapping a command code to the target subsystem queues and the
//! schema used to decode the payload. Two independent instances exist: the
//! device router for RIL-style request codes, and the control router for
//! controller codes, each reporting completions over its own channel.
//!
//! Routing never blocks and never fails loudly: argument violations and
//! unknown codes turn into failure completions, decode failures into requests
//! with a null body that handlers treat defensively.

use std::collections::HashMap;
use std::sync::Arc;

use ril_proto::{codes, Body, CtrlStatus, PayloadCodec, RilError, Schema};
use tracing::{debug, warn};

use crate::emitter::Emitter;
use crate::queue::QueueHandle;
use crate::request::{Request, RequestSource};

/// One row of a dispatch table.
pub struct DispatchEntry {
    /// Subsystems the decoded request fans out to, in table order.
    pub targets: Vec<QueueHandle>,
    /// Schema for the request payload; `None` when the command carries none.
    pub schema: Option<Schema>,
}

fn arguments_valid(code: i32, token: i64) -> bool {
    code > 0 && token >= 0
}

fn decode_body(
    codec: &Arc<dyn PayloadCodec>,
    schema: Option<Schema>,
    code: i32,
    payload: &[u8],
) -> Option<Body> {
    let schema = schema?;
    match codec.decode(schema, payload) {
        Ok(body) => Some(body),
        Err(e) => {
            // Routing proceeds; the handler sees a null body.
            warn!(code, ?schema, error = %e, "payload decode failed");
            None
        }
    }
}

/// Router for device-originated (RIL-style) requests.
pub struct DeviceRouter {
    table: HashMap<i32, DispatchEntry>,
    codec: Arc<dyn PayloadCodec>,
    emitter: Emitter,
}

impl DeviceRouter {
    pub fn new(codec: Arc<dyn PayloadCodec>, emitter: Emitter) -> Self {
        Self {
            table: HashMap::new(),
            codec,
            emitter,
        }
    }

    /// Add a table entry. Called once per command at startup.
    pub fn register(&mut self, code: i32, targets: Vec<QueueHandle>, schema: Option<Schema>) {
        self.table.insert(code, DispatchEntry { targets, schema });
    }

    /// Route one request. Returns immediately; the result surfaces later on
    /// the request-completion channel.
    pub fn route(&self, code: i32, token: i64, payload: &[u8]) {
        if !arguments_valid(code, token) {
            warn!(code, token, "invalid request arguments");
            self.emitter
                .request_complete(RilError::GenericFailure, code, token, None);
            return;
        }

        let Some(entry) = self.table.get(&code) else {
            // Absence of an entry is an expected outcome, not a fault.
            debug!(code, "no dispatch entry");
            self.emitter
                .request_complete(RilError::RequestNotSupported, code, token, None);
            return;
        };

        let body = decode_body(&self.codec, entry.schema, code, payload);
        for target in &entry.targets {
            target.add(Request {
                code,
                token,
                source: RequestSource::Device,
                body: body.clone(),
            });
        }
    }
}

/// Router for controller-originated requests.
///
/// A numeric comparison against [`codes::CTRL_DISPATCH_BASE`] decides the
/// path: commands at or below the base stay local to the control subsystem,
/// commands above it are forwarded to RIL-style subsystem handling, shaped as
/// ordinary requests with a control completion channel.
pub struct ControlRouter {
    local: QueueHandle,
    local_schemas: HashMap<i32, Schema>,
    forward_table: HashMap<i32, DispatchEntry>,
    codec: Arc<dyn PayloadCodec>,
    emitter: Emitter,
}

impl ControlRouter {
    pub fn new(local: QueueHandle, codec: Arc<dyn PayloadCodec>, emitter: Emitter) -> Self {
        Self {
            local,
            local_schemas: HashMap::new(),
            forward_table: HashMap::new(),
            codec,
            emitter,
        }
    }

    /// Declare the payload schema of a controller-local command.
    pub fn register_local_schema(&mut self, code: i32, schema: Schema) {
        self.local_schemas.insert(code, schema);
    }

    /// Add a forwarding entry for a command above the dispatch base.
    pub fn register_forward(&mut self, code: i32, targets: Vec<QueueHandle>, schema: Option<Schema>) {
        debug_assert!(code > codes::CTRL_DISPATCH_BASE);
        self.forward_table
            .insert(code, DispatchEntry { targets, schema });
    }

    /// Route one controller request.
    pub fn route(&self, code: i32, token: i64, payload: &[u8]) {
        if !arguments_valid(code, token) {
            warn!(code, token, "invalid control arguments");
            self.emitter
                .ctrl_complete(CtrlStatus::Err, code, token, None);
            return;
        }

        if code <= codes::CTRL_DISPATCH_BASE {
            // Local command; unknown codes fail inside the control subsystem.
            let body = decode_body(
                &self.codec,
                self.local_schemas.get(&code).copied(),
                code,
                payload,
            );
            self.local.add(Request {
                code,
                token,
                source: RequestSource::Control,
                body,
            });
            return;
        }

        let Some(entry) = self.forward_table.get(&code) else {
            debug!(code, "no control dispatch entry");
            self.emitter
                .ctrl_complete(CtrlStatus::Err, code, token, None);
            return;
        };

        let body = decode_body(&self.codec, entry.schema, code, payload);
        for target in &entry.targets {
            target.add(Request {
                code,
                token,
                source: RequestSource::Control,
                body: body.clone(),
            });
        }
    }
}
