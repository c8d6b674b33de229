//! Connection admission: how many headsets may be connected at once, and how
//! slots are shared between ordinary headsets and paired earbud sets.

use log::{debug, warn};

use super::adapter::AdapterInterface;
use super::service::HeadsetServiceInner;
use super::Priority;
use crate::config::HfpConfig;
use crate::core::address::RawAddress;

/// Decides whether one more device may connect
pub(super) struct AdmissionPolicy<'a> {
    pub(super) config: &'a HfpConfig,
    pub(super) adapter: &'a dyn AdapterInterface,
}

impl AdmissionPolicy<'_> {
    /// `conn_devices` are the devices currently connecting or connected,
    /// `connected` the subset with a service level connection.
    pub(super) fn is_connection_allowed(
        &self,
        device: RawAddress,
        conn_devices: &[RawAddress],
        connected: &[RawAddress],
    ) -> bool {
        let is_tws_plus = self.adapter.is_tws_plus_device(device);
        if !self.config.tws_plus_enabled && is_tws_plus {
            debug!("is_connection_allowed: TWS+ is not enabled, device={}", device);
            return false;
        }
        if conn_devices.is_empty() {
            return true;
        }

        let max_connections = self.config.max_connections();
        let existing_tws_plus =
            conn_devices.iter().copied().find(|d| self.adapter.is_tws_plus_device(*d));
        let allowed = match existing_tws_plus {
            Some(existing) if is_tws_plus => self.adapter.tws_plus_peer(device) == Some(existing),
            Some(existing) => {
                // Keep a slot for the other earbud until it shows up
                let reserved = match self.connected_peer(existing, connected) {
                    Some(_) => 0,
                    None => 1,
                };
                if !self.config.tws_plus_sho_enabled {
                    debug!("is_connection_allowed: TWS+ SHO is not enabled");
                    false
                } else if conn_devices.len() < max_connections.saturating_sub(reserved) {
                    true
                } else {
                    debug!("is_connection_allowed: max connections reached");
                    false
                }
            }
            None if is_tws_plus => {
                if !self.config.tws_plus_sho_enabled {
                    false
                } else if max_connections.saturating_sub(conn_devices.len()) >= 2 {
                    true
                } else {
                    debug!("is_connection_allowed: not enough slots for a TWS+ pair");
                    false
                }
            }
            None => conn_devices.len() < self.config.user_max_connections(),
        };
        debug!(
            "is_connection_allowed: device={}, existing_tws_plus={:?}, allowed={}",
            device, existing_tws_plus, allowed
        );
        allowed
    }

    /// The peer of a paired earbud, if it is connected
    pub(super) fn connected_peer(
        &self,
        device: RawAddress,
        connected: &[RawAddress],
    ) -> Option<RawAddress> {
        if !self.adapter.is_tws_plus_device(device) {
            return None;
        }
        self.adapter.tws_plus_peer(device).filter(|peer| connected.contains(peer))
    }
}

impl HeadsetServiceInner {
    pub(super) fn admission_policy(&self) -> AdmissionPolicy<'_> {
        AdmissionPolicy { config: &self.config, adapter: self.adapter.as_ref() }
    }

    pub(super) fn is_connection_allowed(
        &self,
        device: RawAddress,
        conn_devices: &[RawAddress],
    ) -> bool {
        self.admission_policy().is_connection_allowed(device, conn_devices, &self.connected_devices())
    }

    pub(super) fn tws_plus_connected_peer(&self, device: RawAddress) -> Option<RawAddress> {
        self.admission_policy().connected_peer(device, &self.connected_devices())
    }

    pub(super) fn ok_to_accept_connection(&self, device: RawAddress) -> bool {
        if self.adapter.is_quiet_mode_enabled() {
            warn!("ok_to_accept_connection: quiet mode enabled, device={}", device);
            return false;
        }
        if !self.config.pts_certification {
            // Connections while bonding could be unauthorized
            if !self.adapter.is_bonded(device) {
                warn!("ok_to_accept_connection: {} is not bonded", device);
                return false;
            }
            let priority = self.adapter.priority(device);
            if !matches!(priority, Priority::Undefined | Priority::On | Priority::AutoConnect) {
                warn!("ok_to_accept_connection: priority={:?}, device={}", priority, device);
                return false;
            }
        }
        let conn_devices = self.connecting_connected_devices();
        if !self.is_connection_allowed(device, &conn_devices) {
            warn!(
                "Maximum number of connections {} was reached, rejecting connection from {}",
                self.config.user_max_connections(),
                device
            );
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hfp::mocks::mock_adapter::MockAdapterInterface;

    const LEGACY_1: RawAddress = RawAddress::new([0, 0, 0, 0, 0, 1]);
    const LEGACY_2: RawAddress = RawAddress::new([0, 0, 0, 0, 0, 2]);
    const EARBUD_L: RawAddress = RawAddress::new([0, 0, 0, 0, 1, 1]);
    const EARBUD_R: RawAddress = RawAddress::new([0, 0, 0, 0, 1, 2]);
    const OTHER_EARBUD: RawAddress = RawAddress::new([0, 0, 0, 0, 2, 1]);
    const OTHER_EARBUD_PEER: RawAddress = RawAddress::new([0, 0, 0, 0, 2, 2]);

    fn adapter() -> MockAdapterInterface {
        let adapter = MockAdapterInterface::new();
        adapter.add_tws_plus_pair(EARBUD_L, EARBUD_R);
        adapter.add_tws_plus_pair(OTHER_EARBUD, OTHER_EARBUD_PEER);
        adapter
    }

    fn config(max: usize, tws_plus: bool, sho: bool) -> HfpConfig {
        HfpConfig {
            max_connected_audio_devices: max,
            tws_plus_enabled: tws_plus,
            tws_plus_sho_enabled: sho,
            ..Default::default()
        }
    }

    #[test]
    fn test_first_device_always_allowed() {
        let adapter = adapter();
        let config = config(1, false, false);
        let policy = AdmissionPolicy { config: &config, adapter: &adapter };

        assert!(policy.is_connection_allowed(LEGACY_1, &[], &[]));
    }

    #[test]
    fn test_tws_plus_rejected_when_disabled() {
        let adapter = adapter();
        let config = config(3, false, false);
        let policy = AdmissionPolicy { config: &config, adapter: &adapter };

        assert!(!policy.is_connection_allowed(EARBUD_L, &[], &[]));
    }

    #[test]
    fn test_legacy_devices_use_user_limit() {
        let adapter = adapter();
        let config = config(2, false, false);
        let policy = AdmissionPolicy { config: &config, adapter: &adapter };

        assert!(policy.is_connection_allowed(LEGACY_2, &[LEGACY_1], &[LEGACY_1]));
        assert!(!policy.is_connection_allowed(
            RawAddress::new([9; 6]),
            &[LEGACY_1, LEGACY_2],
            &[LEGACY_1, LEGACY_2]
        ));
    }

    #[test]
    fn test_only_the_peer_joins_an_earbud() {
        let adapter = adapter();
        let config = config(2, true, false);
        let policy = AdmissionPolicy { config: &config, adapter: &adapter };

        assert!(policy.is_connection_allowed(EARBUD_R, &[EARBUD_L], &[EARBUD_L]));
        assert!(!policy.is_connection_allowed(OTHER_EARBUD, &[EARBUD_L], &[EARBUD_L]));
    }

    #[test]
    fn test_legacy_next_to_earbuds_requires_sho() {
        let adapter = adapter();
        let config = config(2, true, false);
        let policy = AdmissionPolicy { config: &config, adapter: &adapter };

        assert!(!policy.is_connection_allowed(
            LEGACY_1,
            &[EARBUD_L, EARBUD_R],
            &[EARBUD_L, EARBUD_R]
        ));
    }

    #[test]
    fn test_slot_reserved_for_missing_peer() {
        let adapter = adapter();
        let config = config(1, true, true);
        let policy = AdmissionPolicy { config: &config, adapter: &adapter };
        assert_eq!(config.max_connections(), 3);

        // the right earbud is not connected yet, so one of the two free slots is kept for it
        assert!(!policy.is_connection_allowed(LEGACY_2, &[LEGACY_1, EARBUD_L], &[LEGACY_1, EARBUD_L]));
        // with only the earbud connected, a legacy headset still fits
        assert!(policy.is_connection_allowed(LEGACY_1, &[EARBUD_L], &[EARBUD_L]));
    }

    #[test]
    fn test_connecting_peer_does_not_release_reservation() {
        let adapter = adapter();
        let config = config(1, true, true);
        let policy = AdmissionPolicy { config: &config, adapter: &adapter };

        assert!(!policy.is_connection_allowed(LEGACY_1, &[EARBUD_L, EARBUD_R], &[EARBUD_L]));
        assert!(policy.is_connection_allowed(
            LEGACY_1,
            &[EARBUD_L, EARBUD_R],
            &[EARBUD_L, EARBUD_R]
        ));
    }

    #[test]
    fn test_earbud_next_to_legacy_needs_two_slots() {
        let adapter = adapter();
        let config = config(1, true, true);
        let policy = AdmissionPolicy { config: &config, adapter: &adapter };

        assert!(policy.is_connection_allowed(EARBUD_L, &[LEGACY_1], &[LEGACY_1]));
        assert!(!policy.is_connection_allowed(
            EARBUD_L,
            &[LEGACY_1, LEGACY_2],
            &[LEGACY_1, LEGACY_2]
        ));
    }

    #[test]
    fn test_earbud_next_to_legacy_requires_sho() {
        let adapter = adapter();
        let config = config(3, true, false);
        let policy = AdmissionPolicy { config: &config, adapter: &adapter };

        assert!(!policy.is_connection_allowed(EARBUD_L, &[LEGACY_1], &[LEGACY_1]));
    }

    #[test]
    fn test_connected_peer() {
        let adapter = adapter();
        let config = config(2, true, false);
        let policy = AdmissionPolicy { config: &config, adapter: &adapter };

        assert_eq!(policy.connected_peer(EARBUD_L, &[EARBUD_R]), Some(EARBUD_R));
        assert_eq!(policy.connected_peer(EARBUD_L, &[]), None);
        assert_eq!(policy.connected_peer(LEGACY_1, &[EARBUD_R]), None);
    }
}
