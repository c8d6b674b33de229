//! Active device arbitration. At most one device, or one paired earbud set,
//! is the audio route at any time.

use log::{debug, error, info, warn};

use super::service::HeadsetServiceInner;
use super::state_machine::HeadsetStateMachine;
use super::{AudioState, ProfileConnectionState};
use crate::core::address::RawAddress;

impl HeadsetServiceInner {
    pub(super) fn set_active_device(&mut self, device: Option<RawAddress>) -> bool {
        info!("set_active_device: device={:?}", device.map(|d| d.to_string()));
        match device {
            None => self.clear_active_device(),
            Some(device) => self.switch_active_device(device),
        }
    }

    fn clear_active_device(&mut self) -> bool {
        let active = self.active_device;
        if self.voice_recognition_started && !self.stop_voice_recognition(active) {
            warn!("set_active_device: failed to stop voice recognition on {:?}", active);
        }
        if self.virtual_call_started && !self.stop_sco_using_virtual_voice_call() {
            warn!("set_active_device: failed to stop virtual call on {:?}", active);
        }
        if let Some(active) = active {
            if self.audio_state(Some(active)) != AudioState::Disconnected
                && !self.disconnect_audio(active)
            {
                warn!("set_active_device: failed to disconnect audio on {}", active);
            }
        }
        if !self.native.set_active_device(None) {
            warn!("set_active_device: cannot clear the active device in native layer");
        }
        self.active_device = None;
        self.system.broadcast_active_device(None);
        true
    }

    fn switch_active_device(&mut self, device: RawAddress) -> bool {
        if self.active_device == Some(device) {
            info!("set_active_device: {} is already active", device);
            return true;
        }
        if self.connection_state(device) != ProfileConnectionState::Connected {
            error!("set_active_device: cannot set {} as active, it is not connected", device);
            return false;
        }
        if let Some(active) = self.active_device {
            if self.adapter.is_tws_plus_device(device)
                && self.adapter.is_tws_plus_device(active)
                && self.connection_state(active) == ProfileConnectionState::Connected
            {
                debug!("set_active_device: {} and {} are the same earbud set", device, active);
                return false;
            }
        }
        if !self.native.set_active_device(Some(device)) {
            error!("set_active_device: cannot set {} as active in native layer", device);
            return false;
        }

        let previous = self.active_device;
        self.active_device = Some(device);

        // The earbud that carries SCO may be the peer of the previous active device
        let mut teardown = previous;
        let mut previous_audio = AudioState::Disconnected;
        let mut switch_between_earbuds = false;
        match previous {
            Some(prev) if self.adapter.is_tws_plus_device(prev) => {
                let peer = self.tws_plus_connected_peer(prev);
                if self.adapter.is_tws_plus_device(device) {
                    debug!("set_active_device: switching between earbuds");
                    switch_between_earbuds = true;
                } else if self.audio_state(Some(prev)) != AudioState::Disconnected
                    || self.audio_state(peer) != AudioState::Disconnected
                {
                    previous_audio = AudioState::Connected;
                }
                if previous_audio == AudioState::Connected
                    && self.audio_state(Some(prev)) == AudioState::Disconnected
                {
                    warn!("set_active_device: tearing down audio on peer {:?}", peer);
                    teardown = peer;
                }
            }
            _ => previous_audio = self.audio_state(previous),
        }

        if !switch_between_earbuds && previous_audio != AudioState::Disconnected {
            if !teardown.map_or(false, |t| self.disconnect_audio(t)) {
                error!("set_active_device: failed to disconnect audio from {:?}", teardown);
                self.roll_back_active_device(previous);
                return false;
            }
        } else if self.should_persist_audio() && !self.config.pts_certification {
            if !self.connect_audio(device) {
                error!("set_active_device: failed to connect audio to {}", device);
                self.roll_back_active_device(previous);
                return false;
            }
        }
        self.system.broadcast_active_device(Some(device));
        true
    }

    fn roll_back_active_device(&mut self, previous: Option<RawAddress>) {
        self.active_device = previous;
        if !self.native.set_active_device(previous) {
            warn!("set_active_device: failed to restore {:?} in native layer", previous);
        }
    }

    /// The active device went away: hand over to its earbud peer if possible
    pub(super) fn on_active_device_disconnected(&mut self, device: RawAddress) {
        if self.adapter.is_tws_plus_device(device) {
            if let Some(peer) = self.tws_plus_connected_peer(device) {
                if self.set_active_device(Some(peer)) {
                    return;
                }
                warn!("on_active_device_disconnected: could not hand over to {}", peer);
            }
        }
        self.set_active_device(None);
    }

    pub(super) fn first_connected_audio_device(&self) -> Option<RawAddress> {
        let mut sessions: Vec<&HeadsetStateMachine> = self
            .sessions
            .values()
            .filter(|s| ProfileConnectionState::CONNECTING_CONNECTED.contains(&s.connection_state()))
            .collect();
        sessions.sort_by_key(|s| (s.connecting_timestamp(), s.device()));
        sessions.first().map(|s| s.device())
    }

    pub(super) fn is_tws_plus_active(&self, device: RawAddress) -> bool {
        if !self.adapter.is_tws_plus_device(device) {
            return false;
        }
        let Some(active) = self.active_device else {
            return false;
        };
        active == device || self.adapter.tws_plus_peer(device) == Some(active)
    }

    pub(super) fn set_silence_mode(&mut self, device: RawAddress, silence: bool) -> bool {
        debug!("set_silence_mode({}): {}", device, silence);
        if silence && self.active_device == Some(device) {
            self.set_active_device(None);
        } else if !silence && self.active_device.is_none() {
            self.set_active_device(Some(device));
        }
        match self.sessions.get_mut(&device) {
            Some(session) => session.set_silence(silence),
            None => {
                warn!("set_silence_mode: {} was never connected/connecting", device);
                false
            }
        }
    }
}
