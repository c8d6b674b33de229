//! The boundary to the telecom, audio and power frameworks

use crate::core::address::RawAddress;

/// Platform services the headset service drives.
///
/// Methods run with the service lock held. Answers such as a placed call or
/// an activated assistant must reach `HeadsetService` later, from another task
/// or thread (for example through `phone_state_changed` or
/// `start_voice_recognition`), never from inside the call.
pub trait SystemInterface: Send + Sync {
    /// Hand a headset-initiated voice recognition request to the assistant
    fn activate_voice_recognition(&self) -> bool;

    /// Tell the assistant the headset cancelled voice recognition
    fn deactivate_voice_recognition(&self) -> bool;

    /// Bring the platform out of doze so it can serve a headset request.
    /// Returns false if the idle controller is unavailable or refused.
    fn exit_idle(&self, reason: &str) -> bool;

    /// Place a call requested by the headset
    fn place_outgoing_call(&self, number: &str) -> bool;

    /// Pause A2DP streaming while a call or ring is in progress
    fn suspend_a2dp(&self);

    /// Lift any A2DP suspension held by the headset service
    fn release_a2dp(&self);

    /// Resume A2DP towards a device
    fn resume_a2dp(&self, addr: RawAddress);

    /// Announce the new active device
    fn broadcast_active_device(&self, addr: Option<RawAddress>);

    /// Keep the system awake while voice recognition is starting
    fn acquire_voice_recognition_wake_lock(&self);

    /// Let the system sleep again
    fn release_voice_recognition_wake_lock(&self);
}
