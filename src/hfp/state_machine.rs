//! Per-device HFP session. A session tracks the link and SCO state of one
//! headset, turns commands from the service into native stack calls, and
//! reports what changed back to the service. Sessions only run on the
//! service worker, one message at a time.

use std::fmt;
use std::sync::Arc;

use log::{debug, info, warn};
use tokio::time::Instant;

use super::native::{NativeInterface, StackEvent};
use super::phone_state::HeadsetCallState;
use super::{AtResponse, AudioState, ClccEntry, DeviceStatus, ProfileConnectionState};
use crate::core::address::RawAddress;

/// Commands delivered to a session, in order
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionMessage {
    /// Open the service level connection
    Connect,
    /// Close the service level connection
    Disconnect,
    /// Open SCO
    ConnectAudio,
    /// Close SCO
    DisconnectAudio,
    /// Start voice recognition on the headset
    StartVoiceRecognition,
    /// Stop voice recognition on the headset
    StopVoiceRecognition,
    /// Network and battery indicators changed
    DeviceStateChanged(DeviceStatus),
    /// Telephony state changed
    CallStateChanged {
        /// The new call state
        state: HeadsetCallState,
        /// Whether the update belongs to a virtual call
        is_virtual: bool,
    },
    /// Answer a headset dial request
    DialingOutResult(bool),
    /// Answer a headset voice recognition request
    VoiceRecognitionResult(bool),
    /// Resume A2DP if SCO is not in use
    ResumeA2dp,
    /// Update the in-band ringing indicator
    SendBsir(bool),
    /// Forward one current-calls entry
    ClccResponse(ClccEntry),
    /// Send a vendor specific result code
    VendorResultCode {
        /// Result code name, such as "+ANDROID"
        command: String,
        /// Result code argument
        arg: String,
    },
    /// An event reported by the native stack
    StackEvent(StackEvent),
}

/// What a session reports back after handling a message
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionOutput {
    /// The profile connection state changed
    ConnectionStateChanged {
        /// Previous state
        from: ProfileConnectionState,
        /// New state
        to: ProfileConnectionState,
    },
    /// The SCO state changed
    AudioStateChanged {
        /// Previous state
        from: AudioState,
        /// New state
        to: AudioState,
    },
    /// The headset wants to place a call
    DialRequested(String),
    /// The headset wants to start voice recognition
    VoiceRecognitionRequested,
    /// The headset wants to stop voice recognition
    VoiceRecognitionStopRequested,
    /// A2DP may resume towards this device
    ResumeA2dp,
}

/// State of one remote headset
pub struct HeadsetStateMachine {
    device: RawAddress,
    connection_state: ProfileConnectionState,
    audio_state: AudioState,
    silence: bool,
    connecting_timestamp: Option<Instant>,
    native: Arc<dyn NativeInterface>,
}

impl HeadsetStateMachine {
    /// Constructor. A new session starts Disconnected.
    pub fn new(device: RawAddress, native: Arc<dyn NativeInterface>) -> Self {
        Self {
            device,
            connection_state: ProfileConnectionState::Disconnected,
            audio_state: AudioState::Disconnected,
            silence: false,
            connecting_timestamp: None,
            native,
        }
    }

    /// The remote device
    pub fn device(&self) -> RawAddress {
        self.device
    }

    /// Profile connection state
    pub fn connection_state(&self) -> ProfileConnectionState {
        self.connection_state
    }

    /// SCO state
    pub fn audio_state(&self) -> AudioState {
        self.audio_state
    }

    /// When the session last started connecting
    pub fn connecting_timestamp(&self) -> Option<Instant> {
        self.connecting_timestamp
    }

    /// Whether the headset is silenced
    pub fn is_silenced(&self) -> bool {
        self.silence
    }

    /// Silence or unsilence the headset. Only a connected headset can be
    /// silenced.
    pub fn set_silence(&mut self, silence: bool) -> bool {
        if self.connection_state != ProfileConnectionState::Connected {
            warn!("set_silence: {} is not connected", self.device);
            return false;
        }
        self.silence = silence;
        true
    }

    /// Handle one message. Returns the state changes and requests the service
    /// must act on; a message that fails leaves the state untouched.
    pub fn process(&mut self, message: SessionMessage) -> Vec<SessionOutput> {
        debug!("{}: process {:?} in {:?}", self.device, message, self.connection_state);
        let mut outputs = vec![];
        match message {
            SessionMessage::Connect => {
                if self.connection_state != ProfileConnectionState::Disconnected {
                    warn!("{}: connect in {:?}", self.device, self.connection_state);
                } else if self.native.connect_hfp(self.device) {
                    self.transition(ProfileConnectionState::Connecting, &mut outputs);
                } else {
                    warn!("{}: native connect failed", self.device);
                }
            }
            SessionMessage::Disconnect => match self.connection_state {
                ProfileConnectionState::Connecting | ProfileConnectionState::Connected => {
                    if self.native.disconnect_hfp(self.device) {
                        self.transition(ProfileConnectionState::Disconnecting, &mut outputs);
                    } else {
                        warn!("{}: native disconnect failed", self.device);
                    }
                }
                state => warn!("{}: disconnect in {:?}", self.device, state),
            },
            SessionMessage::ConnectAudio => {
                if self.connection_state != ProfileConnectionState::Connected
                    || self.audio_state != AudioState::Disconnected
                {
                    warn!(
                        "{}: connect audio in {:?}/{:?}",
                        self.device, self.connection_state, self.audio_state
                    );
                } else if self.native.connect_audio(self.device) {
                    self.audio_transition(AudioState::Connecting, &mut outputs);
                } else {
                    warn!("{}: native connect audio failed", self.device);
                }
            }
            SessionMessage::DisconnectAudio => match self.audio_state {
                AudioState::Connecting | AudioState::Connected => {
                    if self.native.disconnect_audio(self.device) {
                        self.audio_transition(AudioState::Disconnecting, &mut outputs);
                    } else {
                        warn!("{}: native disconnect audio failed", self.device);
                    }
                }
                state => warn!("{}: disconnect audio in {:?}", self.device, state),
            },
            SessionMessage::StartVoiceRecognition => {
                if self.is_connecting_or_connected() {
                    if !self.native.start_voice_recognition(self.device) {
                        warn!("{}: failed to start voice recognition", self.device);
                    }
                }
            }
            SessionMessage::StopVoiceRecognition => {
                if self.is_connecting_or_connected() {
                    if !self.native.stop_voice_recognition(self.device) {
                        warn!("{}: failed to stop voice recognition", self.device);
                    }
                }
            }
            SessionMessage::DeviceStateChanged(status) => {
                if self.connection_state == ProfileConnectionState::Connected {
                    self.native.notify_device_status(self.device, &status);
                }
            }
            SessionMessage::CallStateChanged { state, is_virtual } => {
                if self.is_connecting_or_connected() {
                    debug!("{}: call state {:?}, virtual={}", self.device, state, is_virtual);
                    self.native.phone_state_change(self.device, &state);
                }
            }
            SessionMessage::DialingOutResult(success) => {
                self.native.at_response_code(self.device, at_response(success));
            }
            SessionMessage::VoiceRecognitionResult(success) => {
                self.native.at_response_code(self.device, at_response(success));
            }
            SessionMessage::ResumeA2dp => {
                if self.audio_state == AudioState::Disconnected {
                    outputs.push(SessionOutput::ResumeA2dp);
                }
            }
            SessionMessage::SendBsir(enabled) => {
                if self.connection_state == ProfileConnectionState::Connected {
                    self.native.send_bsir(self.device, enabled);
                }
            }
            SessionMessage::ClccResponse(entry) => {
                if self.connection_state == ProfileConnectionState::Connected {
                    self.native.clcc_response(self.device, &entry);
                }
            }
            SessionMessage::VendorResultCode { command, arg } => {
                if self.connection_state == ProfileConnectionState::Connected {
                    self.native.send_vendor_result_code(self.device, &command, &arg);
                }
            }
            SessionMessage::StackEvent(event) => self.process_stack_event(event, &mut outputs),
        }
        outputs
    }

    fn process_stack_event(&mut self, event: StackEvent, outputs: &mut Vec<SessionOutput>) {
        match event {
            StackEvent::ConnectionStateChanged(state) => {
                let to = ProfileConnectionState::from(state);
                if to == ProfileConnectionState::Disconnected {
                    self.audio_transition(AudioState::Disconnected, outputs);
                    self.silence = false;
                }
                self.transition(to, outputs);
            }
            StackEvent::AudioStateChanged(state) => {
                if self.connection_state != ProfileConnectionState::Connected {
                    warn!("{}: audio {:?} while {:?}", self.device, state, self.connection_state);
                    return;
                }
                self.audio_transition(state.into(), outputs);
            }
            StackEvent::VoiceRecognition(start) => {
                if self.connection_state != ProfileConnectionState::Connected {
                    warn!("{}: voice recognition request while not connected", self.device);
                    self.native.at_response_code(self.device, AtResponse::Error);
                } else if start {
                    outputs.push(SessionOutput::VoiceRecognitionRequested);
                } else {
                    outputs.push(SessionOutput::VoiceRecognitionStopRequested);
                }
            }
            StackEvent::Dial(number) => {
                if self.connection_state != ProfileConnectionState::Connected {
                    warn!("{}: dial request while not connected", self.device);
                    self.native.at_response_code(self.device, AtResponse::Error);
                } else {
                    outputs.push(SessionOutput::DialRequested(number));
                }
            }
        }
    }

    fn is_connecting_or_connected(&self) -> bool {
        ProfileConnectionState::CONNECTING_CONNECTED.contains(&self.connection_state)
    }

    fn transition(&mut self, to: ProfileConnectionState, outputs: &mut Vec<SessionOutput>) {
        let from = self.connection_state;
        if from == to {
            return;
        }
        info!("{}: connection state {:?} -> {:?}", self.device, from, to);
        self.connection_state = to;
        if to == ProfileConnectionState::Connecting {
            self.connecting_timestamp = Some(Instant::now());
        }
        outputs.push(SessionOutput::ConnectionStateChanged { from, to });
    }

    fn audio_transition(&mut self, to: AudioState, outputs: &mut Vec<SessionOutput>) {
        let from = self.audio_state;
        if from == to {
            return;
        }
        info!("{}: audio state {:?} -> {:?}", self.device, from, to);
        self.audio_state = to;
        outputs.push(SessionOutput::AudioStateChanged { from, to });
    }
}

fn at_response(success: bool) -> AtResponse {
    if success {
        AtResponse::Ok
    } else {
        AtResponse::Error
    }
}

impl fmt::Display for HeadsetStateMachine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}: connection={:?} audio={:?} silence={} connecting_timestamp={:?}",
            self.device,
            self.connection_state,
            self.audio_state,
            self.silence,
            self.connecting_timestamp
        )
    }
}
