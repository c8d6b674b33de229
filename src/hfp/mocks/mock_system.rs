//! Mocked implementation of SystemInterface for use in test

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc::{self, unbounded_channel, UnboundedReceiver};

use crate::core::address::RawAddress;
use crate::hfp::system::SystemInterface;

/// Events representing calls to SystemInterface
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SystemCall {
    /// SystemInterface#activate_voice_recognition invoked
    ActivateVoiceRecognition,
    /// SystemInterface#deactivate_voice_recognition invoked
    DeactivateVoiceRecognition,
    /// SystemInterface#exit_idle invoked
    ExitIdle(String),
    /// SystemInterface#place_outgoing_call invoked
    PlaceOutgoingCall(String),
    /// SystemInterface#suspend_a2dp invoked
    SuspendA2dp,
    /// SystemInterface#release_a2dp invoked
    ReleaseA2dp,
    /// SystemInterface#resume_a2dp invoked
    ResumeA2dp(RawAddress),
    /// SystemInterface#broadcast_active_device invoked
    BroadcastActiveDevice(Option<RawAddress>),
    /// SystemInterface#acquire_voice_recognition_wake_lock invoked
    AcquireWakeLock,
    /// SystemInterface#release_voice_recognition_wake_lock invoked
    ReleaseWakeLock,
}

/// Routes calls to SystemInterface into a channel of SystemCalls
pub struct MockSystemInterface {
    tx: mpsc::UnboundedSender<SystemCall>,
    voice_recognition_available: AtomicBool,
    outgoing_calls_allowed: AtomicBool,
    exit_idle_allowed: AtomicBool,
    wake_lock_held: AtomicBool,
}

impl MockSystemInterface {
    /// Constructor. Returns self and the RX side of the associated channel.
    pub fn new() -> (Self, UnboundedReceiver<SystemCall>) {
        let (tx, rx) = unbounded_channel();
        (
            Self {
                tx,
                voice_recognition_available: AtomicBool::new(true),
                outgoing_calls_allowed: AtomicBool::new(true),
                exit_idle_allowed: AtomicBool::new(true),
                wake_lock_held: AtomicBool::new(false),
            },
            rx,
        )
    }

    /// Whether the assistant accepts voice recognition requests
    pub fn set_voice_recognition_available(&self, available: bool) {
        self.voice_recognition_available.store(available, Ordering::SeqCst);
    }

    /// Whether telecom accepts outgoing calls
    pub fn set_outgoing_calls_allowed(&self, allowed: bool) {
        self.outgoing_calls_allowed.store(allowed, Ordering::SeqCst);
    }

    /// Whether the idle controller lets the platform leave doze
    pub fn set_exit_idle_allowed(&self, allowed: bool) {
        self.exit_idle_allowed.store(allowed, Ordering::SeqCst);
    }

    /// Whether the voice recognition wake lock is currently held
    pub fn is_wake_lock_held(&self) -> bool {
        self.wake_lock_held.load(Ordering::SeqCst)
    }

    fn record(&self, call: SystemCall) {
        let _ = self.tx.send(call);
    }
}

impl SystemInterface for MockSystemInterface {
    fn activate_voice_recognition(&self) -> bool {
        self.record(SystemCall::ActivateVoiceRecognition);
        self.voice_recognition_available.load(Ordering::SeqCst)
    }

    fn deactivate_voice_recognition(&self) -> bool {
        self.record(SystemCall::DeactivateVoiceRecognition);
        true
    }

    fn exit_idle(&self, reason: &str) -> bool {
        self.record(SystemCall::ExitIdle(reason.to_string()));
        self.exit_idle_allowed.load(Ordering::SeqCst)
    }

    fn place_outgoing_call(&self, number: &str) -> bool {
        self.record(SystemCall::PlaceOutgoingCall(number.to_string()));
        self.outgoing_calls_allowed.load(Ordering::SeqCst)
    }

    fn suspend_a2dp(&self) {
        self.record(SystemCall::SuspendA2dp);
    }

    fn release_a2dp(&self) {
        self.record(SystemCall::ReleaseA2dp);
    }

    fn resume_a2dp(&self, addr: RawAddress) {
        self.record(SystemCall::ResumeA2dp(addr));
    }

    fn broadcast_active_device(&self, addr: Option<RawAddress>) {
        self.record(SystemCall::BroadcastActiveDevice(addr));
    }

    fn acquire_voice_recognition_wake_lock(&self) {
        self.wake_lock_held.store(true, Ordering::SeqCst);
        self.record(SystemCall::AcquireWakeLock);
    }

    fn release_voice_recognition_wake_lock(&self) {
        self.wake_lock_held.store(false, Ordering::SeqCst);
        self.record(SystemCall::ReleaseWakeLock);
    }
}
