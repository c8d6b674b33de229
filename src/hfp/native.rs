//! The boundary to the native HFP stack: commands the service issues and the
//! events the stack reports back.

use std::convert::TryFrom;

use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::FromPrimitive;

use super::phone_state::HeadsetCallState;
use super::{AtResponse, AudioState, ClccEntry, DeviceStatus, ProfileConnectionState};
use crate::core::address::RawAddress;

/// Connection state as reported by the native stack
#[derive(Copy, Clone, Debug, FromPrimitive, ToPrimitive, PartialEq, Eq)]
#[repr(u32)]
pub enum BthfConnectionState {
    /// No link
    Disconnected = 0,
    /// RFCOMM is being set up
    Connecting,
    /// RFCOMM is up, service level connection not yet established
    Connected,
    /// Service level connection established
    SlcConnected,
    /// Link is being torn down
    Disconnecting,
}

impl TryFrom<u32> for BthfConnectionState {
    type Error = u32;
    fn try_from(item: u32) -> Result<Self, Self::Error> {
        BthfConnectionState::from_u32(item).ok_or(item)
    }
}

impl From<BthfConnectionState> for ProfileConnectionState {
    fn from(state: BthfConnectionState) -> Self {
        match state {
            BthfConnectionState::Disconnected => ProfileConnectionState::Disconnected,
            BthfConnectionState::Connecting | BthfConnectionState::Connected => {
                ProfileConnectionState::Connecting
            }
            BthfConnectionState::SlcConnected => ProfileConnectionState::Connected,
            BthfConnectionState::Disconnecting => ProfileConnectionState::Disconnecting,
        }
    }
}

/// SCO state as reported by the native stack
#[derive(Copy, Clone, Debug, FromPrimitive, ToPrimitive, PartialEq, Eq)]
#[repr(u32)]
pub enum BthfAudioState {
    /// No SCO link
    Disconnected = 0,
    /// SCO is being set up
    Connecting,
    /// SCO is up
    Connected,
    /// SCO is being torn down
    Disconnecting,
}

impl TryFrom<u32> for BthfAudioState {
    type Error = u32;
    fn try_from(item: u32) -> Result<Self, Self::Error> {
        BthfAudioState::from_u32(item).ok_or(item)
    }
}

impl From<BthfAudioState> for AudioState {
    fn from(state: BthfAudioState) -> Self {
        match state {
            BthfAudioState::Disconnected => AudioState::Disconnected,
            BthfAudioState::Connecting => AudioState::Connecting,
            BthfAudioState::Connected => AudioState::Connected,
            BthfAudioState::Disconnecting => AudioState::Disconnecting,
        }
    }
}

/// Events from the native stack for one device
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StackEvent {
    /// The link changed state
    ConnectionStateChanged(BthfConnectionState),
    /// The SCO link changed state
    AudioStateChanged(BthfAudioState),
    /// The headset asked to start (true) or stop (false) voice recognition
    VoiceRecognition(bool),
    /// The headset asked to dial a number
    Dial(String),
}

/// Commands the service issues to the native stack. All calls must return
/// without waiting for the radio; the outcome is reported as a `StackEvent`.
///
/// The service calls these methods while holding its internal lock, which is
/// not reentrant. An implementation must never call back into
/// `HeadsetService` from inside a method; report through
/// `HeadsetService::message_from_native` from another task or thread instead.
pub trait NativeInterface: Send + Sync {
    /// Initialize the stack for the given number of links
    fn init(&self, max_connections: usize, inband_ringing_enabled: bool);

    /// Release the stack
    fn cleanup(&self);

    /// Open the service level connection
    fn connect_hfp(&self, addr: RawAddress) -> bool;

    /// Close the service level connection
    fn disconnect_hfp(&self, addr: RawAddress) -> bool;

    /// Open SCO
    fn connect_audio(&self, addr: RawAddress) -> bool;

    /// Close SCO
    fn disconnect_audio(&self, addr: RawAddress) -> bool;

    /// Tell the stack which device is the active one, if any
    fn set_active_device(&self, addr: Option<RawAddress>) -> bool;

    /// Send +BVRA: 1
    fn start_voice_recognition(&self, addr: RawAddress) -> bool;

    /// Send +BVRA: 0
    fn stop_voice_recognition(&self, addr: RawAddress) -> bool;

    /// Report a call state update
    fn phone_state_change(&self, addr: RawAddress, call_state: &HeadsetCallState) -> bool;

    /// Complete a pending AT command
    fn at_response_code(&self, addr: RawAddress, code: AtResponse) -> bool;

    /// Send +BSIR
    fn send_bsir(&self, addr: RawAddress, enabled: bool) -> bool;

    /// Send one +CLCC line
    fn clcc_response(&self, addr: RawAddress, entry: &ClccEntry) -> bool;

    /// Send an unsolicited vendor specific result code
    fn send_vendor_result_code(&self, addr: RawAddress, command: &str, arg: &str) -> bool;

    /// Report network and battery indicators
    fn notify_device_status(&self, addr: RawAddress, status: &DeviceStatus) -> bool;

    /// Allow or forbid SCO globally
    fn set_sco_allowed(&self, allowed: bool) -> bool;
}
