//! Telephony state as seen by the headset service

use num_traits::FromPrimitive;

use super::CallState;

impl CallState {
    /// Convert a HAL call state value, if valid
    pub fn from_hal(value: u32) -> Option<CallState> {
        CallState::from_u32(value)
    }
}

/// A call state update, as forwarded to every connected headset
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeadsetCallState {
    /// Number of active calls
    pub num_active: u32,
    /// Number of held calls
    pub num_held: u32,
    /// State of the call that is being set up, if any
    pub call_state: CallState,
    /// Phone number of that call
    pub number: String,
    /// Type of the phone number
    pub number_type: i32,
    /// Caller name
    pub name: String,
}

impl HeadsetCallState {
    /// Construct an update without caller information
    pub fn new(num_active: u32, num_held: u32, call_state: CallState) -> Self {
        Self {
            num_active,
            num_held,
            call_state,
            number: String::new(),
            number_type: 0,
            name: String::new(),
        }
    }

    /// Whether this update carries any call activity
    pub fn has_call(&self) -> bool {
        self.num_active + self.num_held > 0 || self.call_state != CallState::Idle
    }
}

/// Snapshot of the telephony state the service makes decisions on. It is
/// only updated from the worker, after the updates queued before it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HeadsetPhoneState {
    /// Number of active calls
    pub num_active: u32,
    /// Number of held calls
    pub num_held: u32,
    /// State of the call that is being set up, if any
    pub call_state: CallState,
}

impl Default for HeadsetPhoneState {
    fn default() -> Self {
        Self { num_active: 0, num_held: 0, call_state: CallState::Idle }
    }
}

impl HeadsetPhoneState {
    /// Apply a call state update
    pub fn update(&mut self, update: &HeadsetCallState) {
        self.num_active = update.num_active;
        self.num_held = update.num_held;
        self.call_state = update.call_state;
    }

    /// True if there is an active or held call, or an outgoing call being set up
    pub fn is_in_call(&self) -> bool {
        self.num_active > 0
            || self.num_held > 0
            || (self.call_state != CallState::Idle && self.call_state != CallState::Incoming)
    }

    /// True if an incoming call is ringing
    pub fn is_ringing(&self) -> bool {
        self.call_state == CallState::Incoming
    }

    /// True if there is no call activity at all
    pub fn is_call_idle(&self) -> bool {
        self.num_active == 0 && self.num_held == 0 && self.call_state == CallState::Idle
    }

    /// True if there is an active or held call
    pub fn has_active_or_held_call(&self) -> bool {
        self.num_active > 0 || self.num_held > 0
    }
}
