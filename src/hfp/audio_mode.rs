//! Audio mode control. Telecom calls, virtual calls and voice recognition
//! share one SCO link; starting one mode requires the others to be idle, and
//! every SCO request goes through `is_sco_acceptable`.

use log::{debug, error, info, warn};

use super::phone_state::HeadsetCallState;
use super::service::HeadsetServiceInner;
use super::state_machine::SessionMessage;
use super::worker::WorkItem;
use super::{AudioState, CallState, ProfileConnectionState};
use crate::core::address::RawAddress;

impl HeadsetServiceInner {
    pub(super) fn non_idle_audio_devices(&self) -> Vec<RawAddress> {
        let mut devices: Vec<RawAddress> = self
            .sessions
            .values()
            .filter(|s| s.audio_state() != AudioState::Disconnected)
            .map(|s| s.device())
            .collect();
        devices.sort();
        devices
    }

    pub(super) fn is_audio_on(&self) -> bool {
        !self.non_idle_audio_devices().is_empty()
    }

    fn is_audio_mode_idle(&self) -> bool {
        if self.voice_recognition_started
            || self.virtual_call_started
            || !self.phone_state.is_call_idle()
        {
            info!(
                "is_audio_mode_idle: not idle, voice_recognition={}, virtual_call={}, \
                 call_idle={}",
                self.voice_recognition_started,
                self.virtual_call_started,
                self.phone_state.is_call_idle()
            );
            return false;
        }
        true
    }

    fn should_call_audio_be_active(&self) -> bool {
        let phone = &self.phone_state;
        if phone.has_active_or_held_call() {
            return true;
        }
        // A ringing call only needs SCO when the ringtone is played in-band
        (phone.is_in_call() && !phone.is_ringing())
            || (phone.is_ringing() && self.is_inband_ringing_enabled())
    }

    /// Whether SCO should follow the active device when it changes. Virtual
    /// call users reconnect SCO on their own.
    pub(super) fn should_persist_audio(&self) -> bool {
        !self.virtual_call_started && self.should_call_audio_be_active()
    }

    pub(super) fn is_sco_acceptable(&self, device: RawAddress) -> bool {
        // Both earbuds of a set may carry SCO
        if !self.adapter.is_tws_plus_device(device) && self.active_device != Some(device) {
            warn!(
                "is_sco_acceptable: {} is not the active device {:?}",
                device, self.active_device
            );
            return false;
        }
        if self.force_sco_audio {
            return true;
        }
        if !self.audio_route_allowed {
            warn!("is_sco_acceptable: audio route is not allowed");
            return false;
        }
        if self.phone_state.is_ringing()
            && !self.is_inband_ringing_enabled()
            && !self.phone_state.has_active_or_held_call()
        {
            warn!("is_sco_acceptable: ringing without in-band ringing");
            return false;
        }
        if self.voice_recognition_started || self.virtual_call_started {
            return true;
        }
        if self.should_call_audio_be_active() {
            return true;
        }
        warn!(
            "is_sco_acceptable: rejected, in_call={}, ringing={}, inband_ringing={}",
            self.phone_state.is_in_call(),
            self.phone_state.is_ringing(),
            self.is_inband_ringing_enabled()
        );
        false
    }

    pub(super) fn set_force_sco_audio(&mut self, forced: bool) {
        info!("set_force_sco_audio: forced={}", forced);
        self.force_sco_audio = forced;
    }

    pub(super) fn set_audio_route_allowed(&mut self, allowed: bool) {
        info!("set_audio_route_allowed: allowed={}", allowed);
        self.audio_route_allowed = allowed;
        self.native.set_sco_allowed(allowed);
    }

    pub(super) fn connect_audio(&mut self, device: RawAddress) -> bool {
        info!("connect_audio: device={}", device);
        if !self.is_sco_acceptable(device) {
            warn!("connect_audio: rejected SCO request to {}", device);
            return false;
        }
        let Some(session) = self.session(device) else {
            warn!("connect_audio: {} was never connected/connecting", device);
            return false;
        };
        if session.connection_state() != ProfileConnectionState::Connected {
            warn!("connect_audio: profile not connected");
            return false;
        }
        if session.audio_state() != AudioState::Disconnected {
            debug!("connect_audio: audio is not idle for {}", device);
            return true;
        }
        if self.is_audio_on() {
            warn!(
                "connect_audio: audio is already on for {:?}, returning true",
                self.non_idle_audio_devices()
            );
            return true;
        }
        self.send_to_session(device, SessionMessage::ConnectAudio);
        true
    }

    pub(super) fn connect_audio_to_active_device(&mut self) -> bool {
        match self.active_device {
            Some(device) => self.connect_audio(device),
            None => {
                warn!("connect_audio: no active device");
                false
            }
        }
    }

    pub(super) fn disconnect_audio(&mut self, device: RawAddress) -> bool {
        info!("disconnect_audio: device={}", device);
        let Some(session) = self.session(device) else {
            warn!("disconnect_audio: {} was never connected/connecting", device);
            return false;
        };
        if session.audio_state() == AudioState::Disconnected {
            warn!("disconnect_audio: audio is already disconnected for {}", device);
            return false;
        }
        self.send_to_session(device, SessionMessage::DisconnectAudio);
        true
    }

    pub(super) fn disconnect_all_audio(&mut self) -> bool {
        let mut result = false;
        for device in self.non_idle_audio_devices() {
            if self.disconnect_audio(device) {
                result = true;
            } else {
                error!("disconnect_all_audio: {} failed", device);
            }
        }
        if !result {
            debug!("disconnect_all_audio: no active audio connection");
        }
        result
    }

    /// Voice recognition may be left running if the assistant never reported
    /// the end of a session. Stop it and make the caller retry.
    fn recover_stale_voice_recognition(&mut self, caller: &str) -> bool {
        if !self.voice_recognition_started {
            return false;
        }
        let status = self.stop_voice_recognition(self.active_device);
        warn!(
            "{}: voice recognition is still active, stop returned {} on {:?}, please try again",
            caller, status, self.active_device
        );
        self.voice_recognition_started = false;
        true
    }

    /// Common gate for starting any audio mode
    fn ready_for_audio_mode(&mut self, caller: &str) -> bool {
        if self.recover_stale_voice_recognition(caller) {
            return false;
        }
        if !self.is_audio_mode_idle() {
            warn!("{}: audio mode not idle, active device is {:?}", caller, self.active_device);
            return false;
        }
        // SCO should not be up when no audio mode is active
        if self.is_audio_on() {
            let status = self.disconnect_all_audio();
            warn!(
                "{}: audio is still on, wait for it to disconnect, disconnect returned {}",
                caller, status
            );
            return false;
        }
        true
    }

    pub(super) fn start_voice_recognition(&mut self, device: Option<RawAddress>) -> bool {
        info!("start_voice_recognition: device={:?}", device.map(|d| d.to_string()));
        if !self.ready_for_audio_mode("start_voice_recognition") {
            return false;
        }
        let mut device = device.or(self.active_device);
        let mut pending_request_by_headset = false;
        if let Some(requesting) = self.timeouts.cancel_voice_recognition() {
            if device != Some(requesting) {
                // The headset that asked wins over a stale caller argument
                warn!(
                    "start_voice_recognition: {:?} is not the requesting device {}, using it",
                    device, requesting
                );
                device = Some(requesting);
            }
            self.system.release_voice_recognition_wake_lock();
            pending_request_by_headset = true;
        }
        let Some(device) = device else {
            warn!("start_voice_recognition: no device");
            return false;
        };
        if self.active_device != Some(device)
            && !self.adapter.is_tws_plus_device(device)
            && !self.set_active_device(Some(device))
        {
            warn!("start_voice_recognition: failed to set {} as active", device);
            return false;
        }
        let Some(session) = self.session(device) else {
            warn!("start_voice_recognition: {} was never connected", device);
            return false;
        };
        if !ProfileConnectionState::CONNECTING_CONNECTED.contains(&session.connection_state()) {
            warn!("start_voice_recognition: {} is not connected or connecting", device);
            return false;
        }
        self.voice_recognition_started = true;
        if pending_request_by_headset {
            self.send_to_session(device, SessionMessage::VoiceRecognitionResult(true));
        } else {
            self.send_to_session(device, SessionMessage::StartVoiceRecognition);
        }
        true
    }

    pub(super) fn stop_voice_recognition(&mut self, device: Option<RawAddress>) -> bool {
        info!("stop_voice_recognition: device={:?}", device.map(|d| d.to_string()));
        let mut device = device;
        if device != self.active_device {
            warn!(
                "stop_voice_recognition: {:?} is not active, using {:?}",
                device, self.active_device
            );
            device = self.active_device;
        }
        let Some(mut device) = device else {
            warn!("stop_voice_recognition: no active device");
            return false;
        };
        if self.adapter.is_tws_plus_device(device)
            && self.audio_state(Some(device)) != AudioState::Connected
        {
            match self
                .tws_plus_connected_peer(device)
                .filter(|peer| self.audio_state(Some(*peer)) == AudioState::Connected)
            {
                Some(peer) => {
                    warn!("stop_voice_recognition: {} has no audio, using peer {}", device, peer);
                    device = peer;
                }
                None => {
                    warn!("stop_voice_recognition: neither earbud has audio, resume A2DP");
                    self.voice_recognition_started = false;
                    self.system.release_a2dp();
                    return false;
                }
            }
        }
        let Some(session) = self.session(device) else {
            warn!("stop_voice_recognition: {} was never connected", device);
            return false;
        };
        if !ProfileConnectionState::CONNECTING_CONNECTED.contains(&session.connection_state()) {
            warn!("stop_voice_recognition: {} is not connected or connecting", device);
            return false;
        }
        if !self.voice_recognition_started {
            warn!("stop_voice_recognition: voice recognition was not started");
            return false;
        }
        self.voice_recognition_started = false;
        self.send_to_session(device, SessionMessage::StopVoiceRecognition);
        if self.is_audio_on() {
            self.send_to_session(device, SessionMessage::DisconnectAudio);
        } else {
            warn!("stop_voice_recognition: SCO is not connected, resuming A2DP");
            self.send_to_session(device, SessionMessage::ResumeA2dp);
        }
        true
    }

    pub(super) fn start_sco_using_virtual_voice_call(&mut self) -> bool {
        info!("start_sco_using_virtual_voice_call");
        if !self.ready_for_audio_mode("start_sco_using_virtual_voice_call") {
            return false;
        }
        if self.active_device.is_none() {
            warn!("start_sco_using_virtual_voice_call: no active device");
            return false;
        }
        self.virtual_call_started = true;
        // Walk the headset through an outgoing call so that it opens SCO
        self.phone_state_changed(HeadsetCallState::new(0, 0, CallState::Dialing), true);
        self.phone_state_changed(HeadsetCallState::new(0, 0, CallState::Alerting), true);
        self.phone_state_changed(HeadsetCallState::new(1, 0, CallState::Idle), true);
        true
    }

    pub(super) fn stop_sco_using_virtual_voice_call(&mut self) -> bool {
        info!("stop_sco_using_virtual_voice_call");
        if !self.virtual_call_started {
            warn!("stop_sco_using_virtual_voice_call: virtual call not started");
            return false;
        }
        self.virtual_call_started = false;
        self.phone_state_changed(HeadsetCallState::new(0, 0, CallState::Idle), true);
        true
    }

    pub(super) fn phone_state_changed(&mut self, state: HeadsetCallState, is_virtual: bool) {
        debug!("phone_state_changed: {:?}, virtual={}", state, is_virtual);
        if state.has_call() {
            // Telecom calls preempt every other audio mode
            if !is_virtual && self.virtual_call_started {
                self.stop_sco_using_virtual_voice_call();
            }
            if self.voice_recognition_started {
                self.stop_voice_recognition(self.active_device);
            }
        } else if !is_virtual && self.virtual_call_started {
            info!("phone_state_changed: ignoring idle update during virtual call");
            return;
        }

        if let Some(device) = self.timeouts.dialing_out_device() {
            match state.call_state {
                CallState::Dialing => {
                    if self.timeouts.resolve_dialing_out() {
                        self.send_to_session(device, SessionMessage::DialingOutResult(true));
                    }
                }
                CallState::Active | CallState::Idle => {
                    self.timeouts.clear_resolved_dialing_out();
                }
                _ => (),
            }
        }

        self.post(WorkItem::UpdatePhoneState(state.clone()));
        let available = self.connecting_connected_devices();
        if available.is_empty() {
            self.post(WorkItem::SyncA2dpWithoutDevices);
            return;
        }
        for device in &available {
            self.send_to_session(
                *device,
                SessionMessage::CallStateChanged { state: state.clone(), is_virtual },
            );
        }
        self.post(WorkItem::ResumeA2dpIfIdle(available));
    }

    pub(super) fn dial_outgoing_call(&mut self, from: RawAddress, number: &str) -> bool {
        info!("dial_outgoing_call: from {}", from);
        if !self.on_worker {
            error!("dial_outgoing_call must be called from the worker");
            return false;
        }
        if let Some(device) = self.timeouts.dialing_out_device() {
            error!("dial_outgoing_call: already dialing for {}", device);
            return false;
        }
        if self.virtual_call_started && !self.stop_sco_using_virtual_voice_call() {
            error!("dial_outgoing_call: failed to stop current virtual call");
            return false;
        }
        if !self.is_tws_plus_active(from) && !self.set_active_device(Some(from)) {
            error!("dial_outgoing_call: failed to set active device to {}", from);
            return false;
        }
        if !self.system.place_outgoing_call(number) {
            error!("dial_outgoing_call: telecom refused the call");
            return false;
        }
        let timeout = self.config.dialing_out_timeout();
        self.timeouts.arm_dialing_out(from, timeout);
        self.timers_changed();
        true
    }

    pub(super) fn start_voice_recognition_by_headset(&mut self, from: RawAddress) -> bool {
        info!("start_voice_recognition_by_headset: from {}", from);
        if !self.ready_for_audio_mode("start_voice_recognition_by_headset") {
            return false;
        }
        // Only one request at a time until it completes or times out
        if let Some(pending) = self.timeouts.voice_recognition_device() {
            warn!("start_voice_recognition_by_headset: already pending for {}", pending);
            return false;
        }
        if !self.is_tws_plus_active(from) && !self.set_active_device(Some(from)) {
            warn!("start_voice_recognition_by_headset: failed to set {} as active", from);
            return false;
        }
        if !self.system.exit_idle("voice-command") {
            warn!("start_voice_recognition_by_headset: failed to exit idle, device={}", from);
            return false;
        }
        if !self.system.activate_voice_recognition() {
            warn!("start_voice_recognition_by_headset: request from {} refused", from);
            return false;
        }
        let timeout = self.config.voice_recognition_timeout();
        self.timeouts.arm_voice_recognition(from, timeout);
        self.system.acquire_voice_recognition_wake_lock();
        self.timers_changed();
        true
    }

    pub(super) fn stop_voice_recognition_by_headset(&mut self, from: RawAddress) -> bool {
        info!("stop_voice_recognition_by_headset: from {}", from);
        if self.active_device != Some(from) {
            warn!(
                "stop_voice_recognition_by_headset: {} is not active, active is {:?}",
                from, self.active_device
            );
            return false;
        }
        if !self.voice_recognition_started && self.timeouts.voice_recognition_device().is_none() {
            warn!("stop_voice_recognition_by_headset: voice recognition not started");
            return false;
        }
        if self.timeouts.cancel_voice_recognition().is_some() {
            self.system.release_voice_recognition_wake_lock();
        }
        if self.voice_recognition_started {
            if self.is_audio_on() {
                if !self.disconnect_all_audio() {
                    warn!("stop_voice_recognition_by_headset: failed to disconnect audio");
                }
            } else {
                warn!("stop_voice_recognition_by_headset: no SCO, resume A2DP");
                self.system.release_a2dp();
            }
            self.voice_recognition_started = false;
        }
        if !self.system.deactivate_voice_recognition() {
            warn!("stop_voice_recognition_by_headset: request from {} refused", from);
            return false;
        }
        true
    }

    pub(super) fn on_audio_state_changed_from_state_machine(
        &mut self,
        device: RawAddress,
        from: AudioState,
        to: AudioState,
    ) {
        debug!("on_audio_state_changed_from_state_machine: {} {:?} -> {:?}", device, from, to);
        if to != AudioState::Disconnected {
            return;
        }
        let is_tws_plus = self.adapter.is_tws_plus_device(device);
        let active_is_tws_plus =
            self.active_device.map_or(false, |a| self.adapter.is_tws_plus_device(a));
        if is_tws_plus && active_is_tws_plus && self.is_audio_on() {
            debug!("SCO transfer is not needed between earbuds");
            return;
        }

        if is_tws_plus && self.is_audio_on() {
            debug!("the other earbud still has SCO, keeping audio modes");
        } else {
            if self.voice_recognition_started {
                if !self.stop_voice_recognition_by_headset(device) {
                    warn!("on_audio_state_changed: failed to stop voice recognition");
                } else if self.sessions.contains_key(&device) {
                    self.send_to_session(device, SessionMessage::StopVoiceRecognition);
                }
            }
            if self.virtual_call_started && !self.stop_sco_using_virtual_voice_call() {
                warn!("on_audio_state_changed: failed to stop virtual call");
            }
        }

        let Some(active) = self.active_device else {
            return;
        };
        if active == device || !self.should_persist_audio() {
            return;
        }
        if is_tws_plus && self.is_audio_on() {
            debug!("waiting for both earbuds to close SCO");
        } else if is_tws_plus && self.is_tws_plus_active(active) {
            // The user moved the call away from the earbuds
            debug!("explicit transfer away from {}, not moving SCO", device);
        } else {
            info!("moving SCO to active device {}", active);
            if !self.connect_audio(active) {
                warn!("failed to connect audio to {} after {} dropped SCO", active, device);
            }
        }
    }
}
