//! Voice call table and state machine
//!
//! The table is a sparse slot array: indices are 1-based, holes mean free
//! slots, and the lowest free index is handed to each new call. An index is
//! stable for the call's lifetime and reused only after removal. The cached
//! live-call count always equals the number of occupied slots.
//!
//! Multi-call operations come in two flavors, deliberately:
//!
//! - the hangup sweeps (`hangup_held_or_waiting`,
//!   `hangup_active_resume_held`) stop at the first call in an unexpected
//!   state and leave the remaining calls unprocessed, matching the modem
//!   behavior they simulate;
//! - `conference` validates the full composition before touching anything, so
//!   a failed attempt leaves the table unchanged.

use ril_proto::{CallInfo, CallState};
use tracing::debug;

use crate::error::SimError;

/// One live voice call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub index: i32,
    pub state: CallState,
    pub number: String,
    pub name: String,
    pub is_multiparty: bool,
}

impl From<&Call> for CallInfo {
    fn from(c: &Call) -> CallInfo {
        CallInfo {
            index: c.index,
            state: c.state,
            number: c.number.clone(),
            name: c.name.clone(),
            is_multiparty: c.is_multiparty,
        }
    }
}

/// Sparse table of live calls.
#[derive(Debug)]
pub struct CallTable {
    slots: Vec<Option<Call>>,
    active_count: usize,
}

impl CallTable {
    /// `max_calls` bounds both the live-call count and the index range.
    pub fn new(max_calls: usize) -> Self {
        Self {
            slots: vec![None; max_calls],
            active_count: 0,
        }
    }

    pub fn active_count(&self) -> usize {
        self.active_count
    }

    pub fn is_empty(&self) -> bool {
        self.active_count == 0
    }

    pub fn get(&self, index: i32) -> Option<&Call> {
        let slot = usize::try_from(index.checked_sub(1)?).ok()?;
        self.slots.get(slot)?.as_ref()
    }

    fn get_mut(&mut self, index: i32) -> Option<&mut Call> {
        let slot = usize::try_from(index.checked_sub(1)?).ok()?;
        self.slots.get_mut(slot)?.as_mut()
    }

    /// Live calls in index order.
    pub fn live(&self) -> impl Iterator<Item = &Call> {
        self.slots.iter().flatten()
    }

    /// Pack the live calls for a current-calls response.
    pub fn snapshot(&self) -> Vec<CallInfo> {
        self.live().map(CallInfo::from).collect()
    }

    /// Create a call in `state` at the lowest free index.
    pub fn add(&mut self, state: CallState, number: &str, name: &str) -> Result<i32, SimError> {
        let slot = self
            .slots
            .iter()
            .position(Option::is_none)
            .ok_or(SimError::CallLimitReached)?;
        let index = slot as i32 + 1;
        self.slots[slot] = Some(Call {
            index,
            state,
            number: number.to_string(),
            name: name.to_string(),
            is_multiparty: false,
        });
        self.active_count += 1;
        debug!(index, ?state, number, "call added");
        Ok(index)
    }

    /// Remove the call at `index`.
    pub fn remove(&mut self, index: i32) -> Result<Call, SimError> {
        let slot = index
            .checked_sub(1)
            .and_then(|i| usize::try_from(i).ok())
            .ok_or(SimError::NoSuchCall(index))?;
        let call = self
            .slots
            .get_mut(slot)
            .and_then(Option::take)
            .ok_or(SimError::NoSuchCall(index))?;
        self.active_count -= 1;
        debug!(index, "call removed");
        Ok(call)
    }

    /// Apply a legal state transition to the call at `index`.
    pub fn transition(&mut self, index: i32, next: CallState) -> Result<(), SimError> {
        let call = self.get_mut(index).ok_or(SimError::NoSuchCall(index))?;
        if !call.state.can_transition_to(next) {
            return Err(SimError::IllegalTransition {
                from: call.state,
                to: next,
            });
        }
        debug!(index, from = ?call.state, to = ?next, "call transition");
        call.state = next;
        Ok(())
    }

    /// Remove every held, waiting or incoming call. Stops at the first call
    /// in any other state, leaving the remaining calls unprocessed.
    pub fn hangup_held_or_waiting(&mut self) -> Result<(), SimError> {
        if self.is_empty() {
            return Err(SimError::BadCallComposition {
                required: "at least one live call",
                found: 0,
            });
        }
        for slot in self.slots.iter_mut() {
            let Some(call) = slot else { continue };
            match call.state {
                CallState::Holding | CallState::Waiting | CallState::Incoming => {
                    debug!(index = call.index, "hung up background call");
                    *slot = None;
                    self.active_count -= 1;
                }
                state => {
                    return Err(SimError::UnexpectedCallState {
                        index: call.index,
                        state,
                    })
                }
            }
        }
        Ok(())
    }

    /// Remove every active call and resume held or waiting calls. Stops at
    /// the first call in any other state.
    pub fn hangup_active_resume_held(&mut self) -> Result<(), SimError> {
        if self.is_empty() {
            return Err(SimError::BadCallComposition {
                required: "at least one live call",
                found: 0,
            });
        }
        for slot in self.slots.iter_mut() {
            let Some(call) = slot else { continue };
            match call.state {
                CallState::Active => {
                    debug!(index = call.index, "hung up active call");
                    *slot = None;
                    self.active_count -= 1;
                }
                CallState::Holding | CallState::Waiting => {
                    debug!(index = call.index, "resumed call");
                    call.state = CallState::Active;
                }
                state => {
                    return Err(SimError::UnexpectedCallState {
                        index: call.index,
                        state,
                    })
                }
            }
        }
        Ok(())
    }

    /// Toggle active and held calls; a waiting call is picked up as active.
    /// Returns whether anything changed.
    pub fn swap_active_and_held(&mut self) -> bool {
        let mut changed = false;
        for call in self.slots.iter_mut().flatten() {
            let next = match call.state {
                CallState::Active => CallState::Holding,
                CallState::Holding | CallState::Waiting => CallState::Active,
                _ => continue,
            };
            debug!(index = call.index, from = ?call.state, to = ?next, "swap");
            call.state = next;
            changed = true;
        }
        changed
    }

    /// Merge all calls into a conference: every live call must already be
    /// active or holding, and the party count must fit `max_connections`.
    /// Validation happens before any mutation; a failed attempt is a no-op.
    pub fn conference(&mut self, max_connections: usize) -> Result<(), SimError> {
        let count = self.active_count;
        if count == 0 || count > max_connections {
            return Err(SimError::BadCallComposition {
                required: "between 1 and max_connections calls",
                found: count,
            });
        }
        for call in self.live() {
            if !matches!(call.state, CallState::Active | CallState::Holding) {
                return Err(SimError::UnexpectedCallState {
                    index: call.index,
                    state: call.state,
                });
            }
        }
        for call in self.slots.iter_mut().flatten() {
            call.state = CallState::Active;
            call.is_multiparty = true;
        }
        debug!(parties = count, "conference established");
        Ok(())
    }

    /// Answer the single incoming call. Any other composition fails; a single
    /// call in the wrong state is removed as part of the failure.
    pub fn answer(&mut self) -> Result<i32, SimError> {
        if self.active_count != 1 {
            return Err(SimError::BadCallComposition {
                required: "exactly one live call",
                found: self.active_count,
            });
        }
        let call = self.live().next().expect("one live call");
        let (index, state) = (call.index, call.state);
        if state != CallState::Incoming {
            self.remove(index)?;
            return Err(SimError::UnexpectedCallState { index, state });
        }
        self.transition(index, CallState::Active)?;
        Ok(index)
    }

    /// Trip an incoming (mobile-terminated) call: `Incoming` when the table
    /// is empty, `Waiting` when exactly one settled call is in progress.
    pub fn start_incoming(&mut self, number: &str) -> Result<(i32, CallState), SimError> {
        match self.active_count {
            0 => {
                let index = self.add(CallState::Incoming, number, "")?;
                Ok((index, CallState::Incoming))
            }
            1 => {
                let existing = self.live().next().expect("one live call");
                match existing.state {
                    CallState::Dialing
                    | CallState::Alerting
                    | CallState::Incoming
                    | CallState::Waiting => Err(SimError::UnexpectedCallState {
                        index: existing.index,
                        state: existing.state,
                    }),
                    _ => {
                        let index = self.add(CallState::Waiting, number, "")?;
                        Ok((index, CallState::Waiting))
                    }
                }
            }
            found => Err(SimError::BadCallComposition {
                required: "no more than one live call",
                found,
            }),
        }
    }

    /// Manual-transition helper: exactly one live call, which must be in
    /// `from`, moves to `to`.
    pub fn transition_single(&mut self, from: CallState, to: CallState) -> Result<i32, SimError> {
        if self.active_count != 1 {
            return Err(SimError::BadCallComposition {
                required: "exactly one live call",
                found: self.active_count,
            });
        }
        let call = self.live().next().expect("one live call");
        let (index, state) = (call.index, call.state);
        if state != from {
            return Err(SimError::UnexpectedCallState { index, state });
        }
        self.transition(index, to)?;
        Ok(index)
    }

    /// True while a ringing (incoming or waiting) call is live.
    pub fn has_ringing_call(&self) -> bool {
        self.live().any(|c| c.state.is_ringing())
    }
}
