//! Shared device context
//!
//! Radio state, screen state and mute are process-wide, read by more than one
//! subsystem. They live behind this context and change only through its
//! setters; the radio-state setter bundles the unsolicited notification with
//! the mutation so the two can never be observed decoupled.

use std::sync::Mutex;

use ril_proto::{codes, RadioState};
use tracing::info;

use crate::emitter::Emitter;

#[derive(Debug)]
struct ContextInner {
    radio_state: RadioState,
    screen_on: bool,
    mute: bool,
}

/// Process-wide mutable device state.
#[derive(Debug)]
pub struct DeviceContext {
    inner: Mutex<ContextInner>,
    emitter: Emitter,
}

impl DeviceContext {
    /// Start with the radio unavailable, as a booting modem would be.
    pub fn new(emitter: Emitter) -> Self {
        Self {
            inner: Mutex::new(ContextInner {
                radio_state: RadioState::Unavailable,
                screen_on: false,
                mute: false,
            }),
            emitter,
        }
    }

    pub fn radio_state(&self) -> RadioState {
        self.inner.lock().expect("context lock").radio_state
    }

    /// Change the radio state and notify. State and notification are one
    /// operation; callers cannot get the first without the second.
    pub fn set_radio_state(&self, state: RadioState) {
        {
            let mut inner = self.inner.lock().expect("context lock");
            inner.radio_state = state;
        }
        info!(?state, "radio state changed");
        self.emitter
            .unsolicited(codes::UNSOL_RADIO_STATE_CHANGED, None);
    }

    pub fn screen_on(&self) -> bool {
        self.inner.lock().expect("context lock").screen_on
    }

    pub fn set_screen_on(&self, on: bool) {
        self.inner.lock().expect("context lock").screen_on = on;
    }

    pub fn mute(&self) -> bool {
        self.inner.lock().expect("context lock").mute
    }

    pub fn set_mute(&self, mute: bool) {
        self.inner.lock().expect("context lock").mute = mute;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::Emission;

    #[tokio::test]
    async fn test_radio_state_change_emits_unsolicited() {
        let (emitter, mut rx) = Emitter::channel();
        let ctx = DeviceContext::new(emitter);
        assert_eq!(ctx.radio_state(), RadioState::Unavailable);

        ctx.set_radio_state(RadioState::SimReady);
        assert_eq!(ctx.radio_state(), RadioState::SimReady);

        let emission = rx.recv().await.unwrap();
        assert!(matches!(
            emission,
            Emission::Unsolicited {
                code: codes::UNSOL_RADIO_STATE_CHANGED,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_screen_and_mute_do_not_notify() {
        let (emitter, mut rx) = Emitter::channel();
        let ctx = DeviceContext::new(emitter);

        ctx.set_screen_on(true);
        ctx.set_mute(true);
        assert!(ctx.screen_on());
        assert!(ctx.mute());
        assert!(rx.try_recv().is_err());
    }
}
