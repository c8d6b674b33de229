//! Mocked implementation of AdapterInterface for use in test

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::core::address::RawAddress;
use crate::hfp::adapter::AdapterInterface;
use crate::hfp::Priority;

#[derive(Default)]
struct AdapterState {
    tws_peers: HashMap<RawAddress, RawAddress>,
    unbonded: HashSet<RawAddress>,
    no_headset_uuid: HashSet<RawAddress>,
    priorities: HashMap<RawAddress, Priority>,
    quiet_mode: bool,
}

/// An adapter where every device is bonded, advertises the headset service
/// and has an undefined priority, until told otherwise
#[derive(Default)]
pub struct MockAdapterInterface {
    state: Mutex<AdapterState>,
}

impl MockAdapterInterface {
    /// Constructor
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare two devices as the halves of one paired earbud set
    pub fn add_tws_plus_pair(&self, first: RawAddress, second: RawAddress) {
        let mut state = self.state.lock().unwrap();
        state.tws_peers.insert(first, second);
        state.tws_peers.insert(second, first);
    }

    /// Change the bond state of a device
    pub fn set_bonded(&self, addr: RawAddress, bonded: bool) {
        let mut state = self.state.lock().unwrap();
        if bonded {
            state.unbonded.remove(&addr);
        } else {
            state.unbonded.insert(addr);
        }
    }

    /// Change whether a device advertises the headset service
    pub fn set_has_headset_uuid(&self, addr: RawAddress, has_uuid: bool) {
        let mut state = self.state.lock().unwrap();
        if has_uuid {
            state.no_headset_uuid.remove(&addr);
        } else {
            state.no_headset_uuid.insert(addr);
        }
    }

    /// Change the stored priority of a device
    pub fn set_priority(&self, addr: RawAddress, priority: Priority) {
        self.state.lock().unwrap().priorities.insert(addr, priority);
    }

    /// Turn quiet mode on or off
    pub fn set_quiet_mode(&self, enabled: bool) {
        self.state.lock().unwrap().quiet_mode = enabled;
    }
}

impl AdapterInterface for MockAdapterInterface {
    fn is_tws_plus_device(&self, addr: RawAddress) -> bool {
        self.state.lock().unwrap().tws_peers.contains_key(&addr)
    }

    fn tws_plus_peer(&self, addr: RawAddress) -> Option<RawAddress> {
        self.state.lock().unwrap().tws_peers.get(&addr).copied()
    }

    fn is_bonded(&self, addr: RawAddress) -> bool {
        !self.state.lock().unwrap().unbonded.contains(&addr)
    }

    fn priority(&self, addr: RawAddress) -> Priority {
        self.state.lock().unwrap().priorities.get(&addr).copied().unwrap_or(Priority::Undefined)
    }

    fn has_headset_uuid(&self, addr: RawAddress) -> bool {
        !self.state.lock().unwrap().no_headset_uuid.contains(&addr)
    }

    fn is_quiet_mode_enabled(&self) -> bool {
        self.state.lock().unwrap().quiet_mode
    }
}
