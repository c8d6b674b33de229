//! The headset service coordinator.
//!
//! All state lives in `HeadsetServiceInner` behind one mutex. Public calls
//! lock it, update the state and queue work for the sessions; they never wait
//! for the radio. Session messages, timer expiries and deferred telephony
//! snapshot updates all run on one worker task, in the order they were
//! queued.

use std::collections::HashMap;
use std::fmt::Write;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, error, info, warn};
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};

use super::adapter::AdapterInterface;
use super::native::{BthfConnectionState, NativeInterface, StackEvent};
use super::phone_state::{HeadsetCallState, HeadsetPhoneState};
use super::state_machine::{HeadsetStateMachine, SessionMessage, SessionOutput};
use super::system::SystemInterface;
use super::timeouts::TimeoutSupervisor;
use super::worker::{self, WorkItem};
use super::{AtResponse, AudioState, ClccEntry, DeviceStatus, HfpError, Priority};
use super::ProfileConnectionState;
use crate::config::HfpConfig;
use crate::core::address::RawAddress;
use crate::utils::owned_handle::OwnedHandle;

/// The only vendor result code applications may send
pub const VENDOR_RESULT_CODE_COMMAND_ANDROID: &str = "+ANDROID";

/// Coordinator state. Every field is only touched with the service lock held.
pub(crate) struct HeadsetServiceInner {
    pub(super) config: HfpConfig,
    pub(super) native: Arc<dyn NativeInterface>,
    pub(super) system: Arc<dyn SystemInterface>,
    pub(super) adapter: Arc<dyn AdapterInterface>,
    pub(super) sessions: HashMap<RawAddress, HeadsetStateMachine>,
    pub(super) active_device: Option<RawAddress>,
    pub(super) virtual_call_started: bool,
    pub(super) voice_recognition_started: bool,
    pub(super) phone_state: HeadsetPhoneState,
    pub(super) force_sco_audio: bool,
    pub(super) audio_route_allowed: bool,
    pub(super) inband_ringing_runtime_disable: bool,
    pub(super) timeouts: TimeoutSupervisor,
    /// Set while the worker is handling an item
    pub(super) on_worker: bool,
    pub(super) started: bool,
    tx: UnboundedSender<WorkItem>,
}

pub(super) fn lock(inner: &Mutex<HeadsetServiceInner>) -> MutexGuard<'_, HeadsetServiceInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

impl HeadsetServiceInner {
    fn new(
        config: HfpConfig,
        native: Arc<dyn NativeInterface>,
        system: Arc<dyn SystemInterface>,
        adapter: Arc<dyn AdapterInterface>,
        tx: UnboundedSender<WorkItem>,
    ) -> Self {
        Self {
            config,
            native,
            system,
            adapter,
            sessions: HashMap::new(),
            active_device: None,
            virtual_call_started: false,
            voice_recognition_started: false,
            phone_state: HeadsetPhoneState::default(),
            force_sco_audio: false,
            audio_route_allowed: true,
            inband_ringing_runtime_disable: false,
            timeouts: TimeoutSupervisor::default(),
            on_worker: false,
            started: true,
            tx,
        }
    }

    pub(super) fn post(&self, item: WorkItem) {
        if self.tx.send(item).is_err() {
            error!("post: worker is gone");
        }
    }

    pub(super) fn send_to_session(&self, device: RawAddress, message: SessionMessage) {
        self.post(WorkItem::Session(device, message));
    }

    pub(super) fn session(&self, device: RawAddress) -> Option<&HeadsetStateMachine> {
        self.sessions.get(&device)
    }

    fn get_or_create_session(&mut self, device: RawAddress) -> &mut HeadsetStateMachine {
        let native = &self.native;
        self.sessions.entry(device).or_insert_with(|| {
            debug!("creating session for {}", device);
            HeadsetStateMachine::new(device, native.clone())
        })
    }

    pub(super) fn connection_state(&self, device: RawAddress) -> ProfileConnectionState {
        self.session(device)
            .map_or(ProfileConnectionState::Disconnected, HeadsetStateMachine::connection_state)
    }

    pub(super) fn audio_state(&self, device: Option<RawAddress>) -> AudioState {
        device
            .and_then(|d| self.session(d))
            .map_or(AudioState::Disconnected, HeadsetStateMachine::audio_state)
    }

    pub(super) fn devices_matching_connection_states(
        &self,
        states: &[ProfileConnectionState],
    ) -> Vec<RawAddress> {
        let mut devices: Vec<RawAddress> = self
            .sessions
            .values()
            .filter(|s| states.contains(&s.connection_state()))
            .map(HeadsetStateMachine::device)
            .collect();
        devices.sort();
        devices
    }

    pub(super) fn connecting_connected_devices(&self) -> Vec<RawAddress> {
        self.devices_matching_connection_states(&ProfileConnectionState::CONNECTING_CONNECTED)
    }

    pub(super) fn connected_devices(&self) -> Vec<RawAddress> {
        self.devices_matching_connection_states(&[ProfileConnectionState::Connected])
    }

    pub(super) fn for_each_connected(&self, message: SessionMessage) {
        for device in self.connected_devices() {
            self.send_to_session(device, message.clone());
        }
    }

    pub(super) fn is_inband_ringing_enabled(&self) -> bool {
        self.config.inband_ringing_supported
            && !self.config.disable_inband_ringing
            && !self.inband_ringing_runtime_disable
    }

    pub(super) fn connect(&mut self, device: RawAddress) -> bool {
        if self.adapter.priority(device) == Priority::Off {
            warn!("connect: priority is off, device={}", device);
            return false;
        }
        if !self.adapter.has_headset_uuid(device) {
            error!("connect: cannot connect to {}: no headset UUID", device);
            return false;
        }
        info!("connect: device={}", device);
        let connection_state = self.connection_state(device);
        if ProfileConnectionState::CONNECTING_CONNECTED.contains(&connection_state) {
            warn!("connect: {} is already {:?}", device, connection_state);
            return false;
        }

        let connecting_connected = self.connecting_connected_devices();
        if !self.is_connection_allowed(device, &connecting_connected) {
            // With a single allowed connection, the new device replaces the current one
            if self.config.user_max_connections() != 1 {
                warn!("connect: max connections reached, rejecting {}", device);
                return false;
            }
            if !self.config.tws_plus_enabled && self.adapter.is_tws_plus_device(device) {
                warn!("connect: TWS+ is not enabled, rejecting {}", device);
                return false;
            }
            for existing in connecting_connected {
                self.process_session_message(existing, SessionMessage::Disconnect);
            }
            self.set_active_device(None);
        }

        // The session leaves Disconnected before the lock is released, so the
        // next admission decision already counts this device.
        let created = !self.sessions.contains_key(&device);
        self.get_or_create_session(device);
        self.process_session_message(device, SessionMessage::Connect);
        if self.connection_state(device) != ProfileConnectionState::Connecting {
            if created {
                self.sessions.remove(&device);
            }
            return false;
        }
        true
    }

    pub(super) fn disconnect(&mut self, device: RawAddress) -> bool {
        info!("disconnect: device={}", device);
        let Some(session) = self.session(device) else {
            warn!("disconnect: {} was never connected/connecting", device);
            return false;
        };
        let connection_state = session.connection_state();
        if !ProfileConnectionState::CONNECTING_CONNECTED.contains(&connection_state) {
            warn!("disconnect: {} is {:?}", device, connection_state);
            return false;
        }
        self.send_to_session(device, SessionMessage::Disconnect);
        true
    }

    pub(super) fn message_from_native(
        &mut self,
        device: RawAddress,
        event: StackEvent,
    ) -> Result<(), HfpError> {
        if !self.started {
            return Err(HfpError::NotStarted);
        }
        if matches!(
            event,
            StackEvent::ConnectionStateChanged(
                BthfConnectionState::Connecting | BthfConnectionState::Connected
            )
        ) {
            self.get_or_create_session(device);
        }
        if !self.sessions.contains_key(&device) {
            error!("message_from_native: no session for {}, event={:?}", device, event);
            return Err(HfpError::SessionNotFound(device));
        }
        self.send_to_session(device, SessionMessage::StackEvent(event));
        Ok(())
    }

    /// Runs a session message and acts on what it reports
    pub(super) fn process_session_message(&mut self, device: RawAddress, message: SessionMessage) {
        let link_closed = matches!(
            message,
            SessionMessage::StackEvent(StackEvent::ConnectionStateChanged(
                BthfConnectionState::Disconnected
            ))
        );
        if let SessionMessage::StackEvent(event) = &message {
            if !self.admit_stack_event(device, event) {
                return;
            }
        }
        let outputs = match self.sessions.get_mut(&device) {
            Some(session) => session.process(message),
            None => {
                warn!("process_session_message: {} has no session, dropping {:?}", device, message);
                return;
            }
        };
        for output in outputs {
            self.handle_session_output(device, output);
        }
        if link_closed {
            self.reap_unused_session(device);
        }
    }

    /// Drops a session whose link was refused before it ever started connecting
    fn reap_unused_session(&mut self, device: RawAddress) {
        let unused = self.session(device).is_some_and(|s| {
            s.connection_state() == ProfileConnectionState::Disconnected
                && s.connecting_timestamp().is_none()
        });
        if unused {
            debug!("removing unused session for {}", device);
            self.sessions.remove(&device);
        }
    }

    /// Remote-initiated links and SCO go through the same checks as local requests
    fn admit_stack_event(&mut self, device: RawAddress, event: &StackEvent) -> bool {
        match event {
            StackEvent::ConnectionStateChanged(
                BthfConnectionState::Connecting
                | BthfConnectionState::Connected
                | BthfConnectionState::SlcConnected,
            ) if self.connection_state(device) == ProfileConnectionState::Disconnected => {
                if !self.ok_to_accept_connection(device) {
                    warn!("rejecting incoming connection from {}", device);
                    self.native.disconnect_hfp(device);
                    return false;
                }
            }
            StackEvent::AudioStateChanged(state)
                if self.audio_state(Some(device)) == AudioState::Disconnected
                    && AudioState::from(*state) != AudioState::Disconnected =>
            {
                if !self.is_sco_acceptable(device) {
                    warn!("rejecting incoming SCO from {}", device);
                    self.native.disconnect_audio(device);
                    return false;
                }
            }
            _ => (),
        }
        true
    }

    fn handle_session_output(&mut self, device: RawAddress, output: SessionOutput) {
        match output {
            SessionOutput::ConnectionStateChanged { from, to } => {
                self.on_connection_state_changed_from_state_machine(device, from, to)
            }
            SessionOutput::AudioStateChanged { from, to } => {
                self.on_audio_state_changed_from_state_machine(device, from, to)
            }
            SessionOutput::DialRequested(number) => {
                if !self.dial_outgoing_call(device, &number) {
                    self.native.at_response_code(device, AtResponse::Error);
                }
            }
            SessionOutput::VoiceRecognitionRequested => {
                if !self.start_voice_recognition_by_headset(device) {
                    self.native.at_response_code(device, AtResponse::Error);
                }
            }
            SessionOutput::VoiceRecognitionStopRequested => {
                let code = if self.stop_voice_recognition_by_headset(device) {
                    AtResponse::Ok
                } else {
                    AtResponse::Error
                };
                self.native.at_response_code(device, code);
            }
            SessionOutput::ResumeA2dp => self.system.resume_a2dp(device),
        }
    }

    pub(super) fn on_connection_state_changed_from_state_machine(
        &mut self,
        device: RawAddress,
        from: ProfileConnectionState,
        to: ProfileConnectionState,
    ) {
        let audio_connectable_devices = self.connecting_connected_devices();
        if from != ProfileConnectionState::Connected && to == ProfileConnectionState::Connected {
            if audio_connectable_devices.len() > 1 && self.is_inband_ringing_enabled() {
                info!(
                    "in-band ringing disabled, {} devices connected",
                    audio_connectable_devices.len()
                );
                self.inband_ringing_runtime_disable = true;
                self.for_each_connected(SessionMessage::SendBsir(false));
            }
        }
        if from != ProfileConnectionState::Disconnected
            && to == ProfileConnectionState::Disconnected
        {
            if audio_connectable_devices.len() <= 1 {
                self.inband_ringing_runtime_disable = false;
                if self.is_inband_ringing_enabled() {
                    self.for_each_connected(SessionMessage::SendBsir(true));
                }
            }
            if self.active_device == Some(device) {
                self.on_active_device_disconnected(device);
            }
        }

        if from == ProfileConnectionState::Connecting
            && to == ProfileConnectionState::Connected
            && self.active_device.is_none()
        {
            info!("SLC connected and no active device, making {} active", device);
            self.set_active_device(Some(device));
        }
    }

    pub(super) fn on_bond_state_changed(&mut self, device: RawAddress, bonded: bool) {
        if bonded {
            return;
        }
        if self.connection_state(device) != ProfileConnectionState::Disconnected {
            return;
        }
        if self.sessions.remove(&device).is_some() {
            info!("on_bond_state_changed: removed session for {}", device);
        }
    }

    pub(super) fn clcc_response(&self, entry: ClccEntry) {
        self.for_each_connected(SessionMessage::ClccResponse(entry));
    }

    pub(super) fn send_vendor_specific_result_code(
        &self,
        device: RawAddress,
        command: &str,
        arg: &str,
    ) -> bool {
        let Some(session) = self.session(device) else {
            warn!("send_vendor_specific_result_code: {} was never connected/connecting", device);
            return false;
        };
        if session.connection_state() != ProfileConnectionState::Connected {
            return false;
        }
        if command != VENDOR_RESULT_CODE_COMMAND_ANDROID {
            warn!("Disallowed unsolicited result code command: {}", command);
            return false;
        }
        self.send_to_session(
            device,
            SessionMessage::VendorResultCode { command: command.to_string(), arg: arg.to_string() },
        );
        true
    }

    pub(super) fn on_device_state_changed(&self, status: DeviceStatus) {
        self.for_each_connected(SessionMessage::DeviceStateChanged(status));
    }

    fn stop(&mut self) {
        if !self.started {
            warn!("stop: already stopped");
            return;
        }
        info!("stop()");
        self.started = false;
        self.active_device = None;
        self.inband_ringing_runtime_disable = false;
        self.force_sco_audio = false;
        self.audio_route_allowed = true;
        self.voice_recognition_started = false;
        self.virtual_call_started = false;
        if self.timeouts.clear() {
            self.system.release_voice_recognition_wake_lock();
        }
        self.sessions.clear();
        self.native.cleanup();
    }

    fn dump(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "HeadsetService:");
        let _ = writeln!(out, "  started: {}", self.started);
        let _ = writeln!(out, "  config: {}", self.config);
        let _ = writeln!(out, "  max_connections: {}", self.config.max_connections());
        let _ = writeln!(out, "  active_device: {:?}", self.active_device.map(|d| d.to_string()));
        let _ = writeln!(out, "  virtual_call_started: {}", self.virtual_call_started);
        let _ = writeln!(out, "  voice_recognition_started: {}", self.voice_recognition_started);
        let _ = writeln!(out, "  phone_state: {:?}", self.phone_state);
        let _ = writeln!(out, "  force_sco_audio: {}", self.force_sco_audio);
        let _ = writeln!(out, "  audio_route_allowed: {}", self.audio_route_allowed);
        let _ = writeln!(out, "  inband_ringing_enabled: {}", self.is_inband_ringing_enabled());
        let _ = writeln!(out, "  timeouts: {}", self.timeouts);
        let mut devices: Vec<&RawAddress> = self.sessions.keys().collect();
        devices.sort();
        for device in devices {
            if let Some(session) = self.sessions.get(device) {
                let _ = writeln!(out, "  {}", session);
            }
        }
        out
    }
}

/// Handle to the running headset service. Dropping it stops the worker.
pub struct HeadsetService {
    inner: Arc<Mutex<HeadsetServiceInner>>,
    _worker: OwnedHandle<()>,
}

impl HeadsetService {
    /// Start the service. Must be called from within a tokio runtime, which
    /// will run the worker.
    pub fn start(
        config: HfpConfig,
        native: Arc<dyn NativeInterface>,
        system: Arc<dyn SystemInterface>,
        adapter: Arc<dyn AdapterInterface>,
    ) -> Self {
        let (tx, rx) = unbounded_channel();
        let inner = HeadsetServiceInner::new(config, native, system, adapter, tx);
        info!(
            "start(): max_connections={}, user_max_connections={}, tws_plus={}, tws_plus_sho={}",
            inner.config.max_connections(),
            inner.config.user_max_connections(),
            inner.config.tws_plus_enabled,
            inner.config.tws_plus_sho_enabled
        );
        // One extra link so a device can be connecting or disconnecting while all slots are used
        inner.native.init(inner.config.max_connections() + 1, inner.is_inband_ringing_enabled());

        let inner = Arc::new(Mutex::new(inner));
        let worker = tokio::spawn(worker::run(inner.clone(), rx));
        Self { inner, _worker: worker.into() }
    }

    fn lock(&self) -> MutexGuard<'_, HeadsetServiceInner> {
        lock(&self.inner)
    }

    fn with_started<T: Default>(&self, f: impl FnOnce(&mut HeadsetServiceInner) -> T) -> T {
        let mut inner = self.lock();
        if !inner.started {
            warn!("headset service is not running");
            return T::default();
        }
        f(&mut inner)
    }

    /// Stop the service: clear all modes, cancel pending timeouts and drop
    /// every session
    pub fn stop(&self) {
        self.lock().stop();
    }

    /// Whether the service is running
    pub fn is_started(&self) -> bool {
        self.lock().started
    }

    /// Human readable state, for diagnostics
    pub fn dump(&self) -> String {
        self.lock().dump()
    }

    /// Connect to a headset
    pub fn connect(&self, device: RawAddress) -> bool {
        self.with_started(|inner| inner.connect(device))
    }

    /// Disconnect a headset
    pub fn disconnect(&self, device: RawAddress) -> bool {
        self.with_started(|inner| inner.disconnect(device))
    }

    /// Devices with a service level connection
    pub fn connected_devices(&self) -> Vec<RawAddress> {
        self.lock().connected_devices()
    }

    /// Devices in any of the given states
    pub fn devices_matching_connection_states(
        &self,
        states: &[ProfileConnectionState],
    ) -> Vec<RawAddress> {
        self.lock().devices_matching_connection_states(states)
    }

    /// Connection state of a device
    pub fn connection_state(&self, device: RawAddress) -> ProfileConnectionState {
        self.lock().connection_state(device)
    }

    /// SCO state of a device
    pub fn audio_state(&self, device: RawAddress) -> AudioState {
        self.lock().audio_state(Some(device))
    }

    /// Whether SCO is fully up on a device
    pub fn is_audio_connected(&self, device: RawAddress) -> bool {
        self.audio_state(device) == AudioState::Connected
    }

    /// Whether any device has SCO in any state other than disconnected
    pub fn is_audio_on(&self) -> bool {
        self.lock().is_audio_on()
    }

    /// Whether there is a call, a ringing call, or SCO
    pub fn is_sco_or_call_active(&self) -> bool {
        let inner = self.lock();
        inner.phone_state.is_in_call() || inner.phone_state.is_ringing() || inner.is_audio_on()
    }

    /// Change the active device. `None` clears it.
    pub fn set_active_device(&self, device: Option<RawAddress>) -> bool {
        self.with_started(|inner| inner.set_active_device(device))
    }

    /// The active device, if any
    pub fn active_device(&self) -> Option<RawAddress> {
        self.lock().active_device
    }

    /// The connecting or connected device that started connecting first
    pub fn first_connected_audio_device(&self) -> Option<RawAddress> {
        self.lock().first_connected_audio_device()
    }

    /// Start voice recognition on a device, or on the active device
    pub fn start_voice_recognition(&self, device: Option<RawAddress>) -> bool {
        self.with_started(|inner| inner.start_voice_recognition(device))
    }

    /// Stop voice recognition
    pub fn stop_voice_recognition(&self, device: Option<RawAddress>) -> bool {
        self.with_started(|inner| inner.stop_voice_recognition(device))
    }

    /// Open SCO to the active device by pretending there is a call
    pub fn start_sco_using_virtual_voice_call(&self) -> bool {
        self.with_started(|inner| inner.start_sco_using_virtual_voice_call())
    }

    /// End the virtual call
    pub fn stop_sco_using_virtual_voice_call(&self) -> bool {
        self.with_started(|inner| inner.stop_sco_using_virtual_voice_call())
    }

    /// Open SCO to a device
    pub fn connect_audio(&self, device: RawAddress) -> bool {
        self.with_started(|inner| inner.connect_audio(device))
    }

    /// Open SCO to the active device
    pub fn connect_audio_to_active_device(&self) -> bool {
        self.with_started(|inner| inner.connect_audio_to_active_device())
    }

    /// Close SCO to a device
    pub fn disconnect_audio(&self, device: RawAddress) -> bool {
        self.with_started(|inner| inner.disconnect_audio(device))
    }

    /// Close SCO to every device that has it
    pub fn disconnect_all_audio(&self) -> bool {
        self.with_started(|inner| inner.disconnect_all_audio())
    }

    /// Telephony reports a new call state
    pub fn phone_state_changed(&self, state: HeadsetCallState) {
        self.with_started(|inner| inner.phone_state_changed(state, false))
    }

    /// Open SCO regardless of call state
    pub fn set_force_sco_audio(&self, forced: bool) {
        self.with_started(|inner| inner.set_force_sco_audio(forced))
    }

    /// Whether SCO is forced
    pub fn force_sco_audio(&self) -> bool {
        self.lock().force_sco_audio
    }

    /// Allow or forbid routing audio over SCO
    pub fn set_audio_route_allowed(&self, allowed: bool) {
        self.with_started(|inner| inner.set_audio_route_allowed(allowed))
    }

    /// Whether routing audio over SCO is allowed
    pub fn audio_route_allowed(&self) -> bool {
        self.lock().audio_route_allowed
    }

    /// Silence or unsilence a device
    pub fn set_silence_mode(&self, device: RawAddress, silence: bool) -> bool {
        self.with_started(|inner| inner.set_silence_mode(device, silence))
    }

    /// Whether SCO may be opened to a device right now
    pub fn is_sco_acceptable(&self, device: RawAddress) -> bool {
        self.lock().is_sco_acceptable(device)
    }

    /// Whether the ringtone is played over SCO
    pub fn is_inband_ringing_enabled(&self) -> bool {
        self.lock().is_inband_ringing_enabled()
    }

    /// Whether a virtual call is running
    pub fn is_virtual_call_started(&self) -> bool {
        self.lock().virtual_call_started
    }

    /// Whether voice recognition is running
    pub fn is_voice_recognition_started(&self) -> bool {
        self.lock().voice_recognition_started
    }

    /// Whether a headset dial request is waiting for telecom
    pub fn has_device_initiated_dialing_out(&self) -> bool {
        self.lock().timeouts.dialing_out_device().is_some()
    }

    /// Whether a headset voice recognition request is waiting for the assistant
    pub fn has_pending_voice_recognition_request(&self) -> bool {
        self.lock().timeouts.voice_recognition_device().is_some()
    }

    /// Whether the device or its earbud peer is the active device
    pub fn is_tws_plus_active(&self, device: RawAddress) -> bool {
        self.lock().is_tws_plus_active(device)
    }

    /// The connected earbud peer of a device
    pub fn tws_plus_connected_peer(&self, device: RawAddress) -> Option<RawAddress> {
        self.lock().tws_plus_connected_peer(device)
    }

    /// Whether an incoming connection from the device should be accepted
    pub fn ok_to_accept_connection(&self, device: RawAddress) -> bool {
        self.lock().ok_to_accept_connection(device)
    }

    /// Deliver an event from the native stack. Fails hard if the event is for
    /// a device the service has no session for.
    pub fn message_from_native(&self, device: RawAddress, event: StackEvent) -> Result<(), HfpError> {
        self.lock().message_from_native(device, event)
    }

    /// Place a call requested by a headset. Only valid on the worker.
    pub fn dial_outgoing_call(&self, from: RawAddress, number: &str) -> bool {
        self.with_started(|inner| inner.dial_outgoing_call(from, number))
    }

    /// Start voice recognition requested by a headset
    pub fn start_voice_recognition_by_headset(&self, from: RawAddress) -> bool {
        self.with_started(|inner| inner.start_voice_recognition_by_headset(from))
    }

    /// Stop voice recognition requested by a headset
    pub fn stop_voice_recognition_by_headset(&self, from: RawAddress) -> bool {
        self.with_started(|inner| inner.stop_voice_recognition_by_headset(from))
    }

    /// Forward a current-calls entry to connected headsets
    pub fn clcc_response(&self, entry: ClccEntry) {
        self.with_started(|inner| inner.clcc_response(entry))
    }

    /// Send a vendor specific result code to a connected headset
    pub fn send_vendor_specific_result_code(
        &self,
        device: RawAddress,
        command: &str,
        arg: &str,
    ) -> bool {
        self.with_started(|inner| inner.send_vendor_specific_result_code(device, command, arg))
    }

    /// Forward network and battery indicators to connected headsets
    pub fn on_device_state_changed(&self, status: DeviceStatus) {
        self.with_started(|inner| inner.on_device_state_changed(status))
    }

    /// The adapter reports a bond state change
    pub fn on_bond_state_changed(&self, device: RawAddress, bonded: bool) {
        self.with_started(|inner| inner.on_bond_state_changed(device, bonded))
    }

    /// Whether a session exists for the device
    pub fn has_session(&self, device: RawAddress) -> bool {
        self.lock().sessions.contains_key(&device)
    }
}
