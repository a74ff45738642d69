//! Response emitter
//!
//! All externally visible output of the simulator flows through a single
//! [`Emission`] channel: request completions, control completions and
//! unsolicited notifications. The test harness (or a transport layer) owns
//! the receiving end; subsystems hold cloned [`Emitter`] handles.

use ril_proto::{CtrlStatus, RilError};
use tokio::sync::mpsc;
use tracing::debug;

/// One outbound message from the simulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Emission {
    /// Completion of a device-originated request.
    RequestCompleted {
        error: RilError,
        code: i32,
        token: i64,
        payload: Option<Vec<u8>>,
    },

    /// Completion of a controller-originated request.
    ControlCompleted {
        status: CtrlStatus,
        code: i32,
        token: i64,
        payload: Option<Vec<u8>>,
    },

    /// Asynchronous notification not tied to any request.
    Unsolicited { code: i32, payload: Option<Vec<u8>> },
}

impl Emission {
    /// True if this is an unsolicited notification with the given code.
    pub fn is_unsolicited(&self, unsol_code: i32) -> bool {
        matches!(self, Emission::Unsolicited { code, .. } if *code == unsol_code)
    }
}

/// Cloneable sending half of the emission channel.
#[derive(Debug, Clone)]
pub struct Emitter {
    tx: mpsc::UnboundedSender<Emission>,
}

impl Emitter {
    /// Create an emitter and the receiver the harness drains.
    pub fn channel() -> (Emitter, mpsc::UnboundedReceiver<Emission>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Emitter { tx }, rx)
    }

    pub fn request_complete(
        &self,
        error: RilError,
        code: i32,
        token: i64,
        payload: Option<Vec<u8>>,
    ) {
        debug!(code, token, ?error, "request complete");
        let _ = self.tx.send(Emission::RequestCompleted {
            error,
            code,
            token,
            payload,
        });
    }

    pub fn ctrl_complete(
        &self,
        status: CtrlStatus,
        code: i32,
        token: i64,
        payload: Option<Vec<u8>>,
    ) {
        debug!(code, token, ?status, "control request complete");
        let _ = self.tx.send(Emission::ControlCompleted {
            status,
            code,
            token,
            payload,
        });
    }

    pub fn unsolicited(&self, code: i32, payload: Option<Vec<u8>>) {
        debug!(code, "unsolicited notification");
        let _ = self.tx.send(Emission::Unsolicited { code, payload });
    }
}
