//! The headset service. The coordinator in `service` owns one
//! `HeadsetStateMachine` per remote device and enforces the rules that span
//! all of them: connection admission, the active device, and which audio mode
//! may hold SCO.

pub mod adapter;
mod admission;
mod active_device;
mod audio_mode;
pub mod mocks;
pub mod native;
pub mod phone_state;
pub mod service;
pub mod state_machine;
pub mod system;
mod timeouts;
mod worker;

pub use service::HeadsetService;

use std::fmt;

use num_derive::{FromPrimitive, ToPrimitive};

use crate::core::address::RawAddress;

/// Profile-level connection state of a headset
#[derive(Copy, Clone, Debug, FromPrimitive, ToPrimitive, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ProfileConnectionState {
    /// No link
    Disconnected = 0,
    /// Link is being established (RFCOMM up, service level connection pending)
    Connecting,
    /// Service level connection established
    Connected,
    /// Link is being torn down
    Disconnecting,
}

impl ProfileConnectionState {
    /// States that count against the connection limit
    pub const CONNECTING_CONNECTED: [ProfileConnectionState; 2] =
        [ProfileConnectionState::Connecting, ProfileConnectionState::Connected];
}

/// SCO audio state of a headset
#[derive(Copy, Clone, Debug, FromPrimitive, ToPrimitive, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum AudioState {
    /// No SCO link
    Disconnected = 0,
    /// SCO link is being set up
    Connecting,
    /// SCO link is up
    Connected,
    /// SCO link is being torn down
    Disconnecting,
}

/// Telephony call state as reported to the headset
#[derive(Copy, Clone, Debug, FromPrimitive, ToPrimitive, PartialEq, Eq)]
#[repr(u32)]
pub enum CallState {
    /// A call is active
    Active = 0,
    /// A call is on hold
    Held = 1,
    /// Outgoing call is being dialed
    Dialing = 2,
    /// Outgoing call is ringing at the remote end
    Alerting = 3,
    /// Incoming call is ringing
    Incoming = 4,
    /// Incoming call while another call is active
    Waiting = 5,
    /// No call activity
    Idle = 6,
    /// Call ended
    Disconnected = 7,
}

/// Connection policy stored for a device
#[derive(Copy, Clone, Debug, FromPrimitive, ToPrimitive, PartialEq, Eq)]
#[repr(i32)]
pub enum Priority {
    /// Never set by the user
    Undefined = -1,
    /// Connections are refused
    Off = 0,
    /// Connections are allowed
    On = 100,
    /// Connections are allowed and initiated automatically
    AutoConnect = 1000,
}

/// Final result code of an AT command
#[derive(Copy, Clone, Debug, FromPrimitive, ToPrimitive, PartialEq, Eq)]
#[repr(u32)]
pub enum AtResponse {
    /// ERROR
    Error = 0,
    /// OK
    Ok = 1,
}

/// Indicators reported to every connected headset
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DeviceStatus {
    /// Cellular service is available
    pub network_available: bool,
    /// Phone is roaming
    pub roaming: bool,
    /// Signal strength, 0 to 5
    pub signal_strength: i32,
    /// Battery level, 0 to 5
    pub battery_level: i32,
}

/// One entry of a current-calls listing
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClccEntry {
    /// Call index, starting at 1. Index 0 terminates the listing.
    pub index: i32,
    /// Whether the call is mobile terminated
    pub dir_incoming: bool,
    /// State of the call
    pub state: CallState,
    /// Whether the call is part of a conference
    pub multi_party: bool,
    /// Phone number
    pub number: String,
    /// Type of the phone number
    pub number_type: i32,
}

/// Errors that abort a call into the service
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HfpError {
    /// The stack reported an event for a device that has no session, which
    /// means the stack and the session table have diverged
    SessionNotFound(RawAddress),
    /// The service is not running
    NotStarted,
}

impl fmt::Display for HfpError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HfpError::SessionNotFound(addr) => {
                write!(f, "no session for {}, stack and service are out of sync", addr)
            }
            HfpError::NotStarted => write!(f, "headset service is not running"),
        }
    }
}

impl std::error::Error for HfpError {}
