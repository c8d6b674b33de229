//! The boundary to the adapter: bonding, stored priorities and paired earbud
//! information.

use super::Priority;
use crate::core::address::RawAddress;

/// Adapter queries the headset service needs. They are made with the service
/// lock held and must not call back into `HeadsetService`.
pub trait AdapterInterface: Send + Sync {
    /// Whether the device is one half of a paired earbud set
    fn is_tws_plus_device(&self, addr: RawAddress) -> bool;

    /// The other half of a paired earbud set
    fn tws_plus_peer(&self, addr: RawAddress) -> Option<RawAddress>;

    /// Whether the device is bonded
    fn is_bonded(&self, addr: RawAddress) -> bool;

    /// Stored connection priority of the device
    fn priority(&self, addr: RawAddress) -> Priority;

    /// Whether the device advertises a headset or hands-free service
    fn has_headset_uuid(&self, addr: RawAddress) -> bool;

    /// Whether the adapter is in quiet mode, refusing incoming connections
    fn is_quiet_mode_enabled(&self) -> bool;
}
