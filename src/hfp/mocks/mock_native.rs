//! Mocked implementation of NativeInterface for use in test

use std::sync::Mutex;

use tokio::sync::mpsc::{self, unbounded_channel, UnboundedReceiver};

use crate::core::address::RawAddress;
use crate::hfp::native::NativeInterface;
use crate::hfp::phone_state::HeadsetCallState;
use crate::hfp::{AtResponse, ClccEntry, DeviceStatus};

/// Events representing calls to NativeInterface
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NativeCall {
    /// NativeInterface#init invoked
    Init(usize, bool),
    /// NativeInterface#cleanup invoked
    Cleanup,
    /// NativeInterface#connect_hfp invoked
    ConnectHfp(RawAddress),
    /// NativeInterface#disconnect_hfp invoked
    DisconnectHfp(RawAddress),
    /// NativeInterface#connect_audio invoked
    ConnectAudio(RawAddress),
    /// NativeInterface#disconnect_audio invoked
    DisconnectAudio(RawAddress),
    /// NativeInterface#set_active_device invoked
    SetActiveDevice(Option<RawAddress>),
    /// NativeInterface#start_voice_recognition invoked
    StartVoiceRecognition(RawAddress),
    /// NativeInterface#stop_voice_recognition invoked
    StopVoiceRecognition(RawAddress),
    /// NativeInterface#phone_state_change invoked
    PhoneStateChange(RawAddress, HeadsetCallState),
    /// NativeInterface#at_response_code invoked
    AtResponseCode(RawAddress, AtResponse),
    /// NativeInterface#send_bsir invoked
    SendBsir(RawAddress, bool),
    /// NativeInterface#clcc_response invoked
    ClccResponse(RawAddress, ClccEntry),
    /// NativeInterface#send_vendor_result_code invoked
    VendorResultCode(RawAddress, String, String),
    /// NativeInterface#notify_device_status invoked
    DeviceStatus(RawAddress, DeviceStatus),
    /// NativeInterface#set_sco_allowed invoked
    SetScoAllowed(bool),
}

type FailurePredicate = Box<dyn Fn(&NativeCall) -> bool + Send + Sync>;

/// Routes calls to NativeInterface into a channel of NativeCalls. Every call
/// succeeds unless it matches the failure predicate.
pub struct MockNativeInterface {
    tx: mpsc::UnboundedSender<NativeCall>,
    failing: Mutex<Option<FailurePredicate>>,
}

impl MockNativeInterface {
    /// Constructor. Returns self and the RX side of the associated channel.
    pub fn new() -> (Self, UnboundedReceiver<NativeCall>) {
        let (tx, rx) = unbounded_channel();
        (Self { tx, failing: Mutex::new(None) }, rx)
    }

    /// Make every call matching the predicate fail
    pub fn set_failing(&self, predicate: impl Fn(&NativeCall) -> bool + Send + Sync + 'static) {
        *self.failing.lock().unwrap() = Some(Box::new(predicate));
    }

    /// Let every call succeed again
    pub fn clear_failing(&self) {
        *self.failing.lock().unwrap() = None;
    }

    fn record(&self, call: NativeCall) -> bool {
        let failed = self.failing.lock().unwrap().as_ref().map_or(false, |f| f(&call));
        let _ = self.tx.send(call);
        !failed
    }
}

impl NativeInterface for MockNativeInterface {
    fn init(&self, max_connections: usize, inband_ringing_enabled: bool) {
        self.record(NativeCall::Init(max_connections, inband_ringing_enabled));
    }

    fn cleanup(&self) {
        self.record(NativeCall::Cleanup);
    }

    fn connect_hfp(&self, addr: RawAddress) -> bool {
        self.record(NativeCall::ConnectHfp(addr))
    }

    fn disconnect_hfp(&self, addr: RawAddress) -> bool {
        self.record(NativeCall::DisconnectHfp(addr))
    }

    fn connect_audio(&self, addr: RawAddress) -> bool {
        self.record(NativeCall::ConnectAudio(addr))
    }

    fn disconnect_audio(&self, addr: RawAddress) -> bool {
        self.record(NativeCall::DisconnectAudio(addr))
    }

    fn set_active_device(&self, addr: Option<RawAddress>) -> bool {
        self.record(NativeCall::SetActiveDevice(addr))
    }

    fn start_voice_recognition(&self, addr: RawAddress) -> bool {
        self.record(NativeCall::StartVoiceRecognition(addr))
    }

    fn stop_voice_recognition(&self, addr: RawAddress) -> bool {
        self.record(NativeCall::StopVoiceRecognition(addr))
    }

    fn phone_state_change(&self, addr: RawAddress, call_state: &HeadsetCallState) -> bool {
        self.record(NativeCall::PhoneStateChange(addr, call_state.clone()))
    }

    fn at_response_code(&self, addr: RawAddress, code: AtResponse) -> bool {
        self.record(NativeCall::AtResponseCode(addr, code))
    }

    fn send_bsir(&self, addr: RawAddress, enabled: bool) -> bool {
        self.record(NativeCall::SendBsir(addr, enabled))
    }

    fn clcc_response(&self, addr: RawAddress, entry: &ClccEntry) -> bool {
        self.record(NativeCall::ClccResponse(addr, entry.clone()))
    }

    fn send_vendor_result_code(&self, addr: RawAddress, command: &str, arg: &str) -> bool {
        self.record(NativeCall::VendorResultCode(addr, command.to_string(), arg.to_string()))
    }

    fn notify_device_status(&self, addr: RawAddress, status: &DeviceStatus) -> bool {
        self.record(NativeCall::DeviceStatus(addr, *status))
    }

    fn set_sco_allowed(&self, allowed: bool) -> bool {
        self.record(NativeCall::SetScoAllowed(allowed))
    }
}
