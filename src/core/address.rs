//! A Bluetooth classic device address

use std::fmt::{Debug, Display, Formatter, Result};

/// A BR/EDR device address. Stable for the lifetime of a pairing, so it is
/// used as the key of every per-device table in this crate.
#[derive(Copy, Clone, Default, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[repr(C)]
pub struct RawAddress {
    /// The 6 address bytes, most significant first
    pub address: [u8; 6],
}

impl RawAddress {
    /// An empty/invalid address
    pub const EMPTY: Self = Self { address: [0, 0, 0, 0, 0, 0] };

    /// Constructs a RawAddress from its 6 bytes
    pub const fn new(address: [u8; 6]) -> Self {
        Self { address }
    }

    /// Parses an address in "AA:BB:CC:DD:EE:FF" form. Case does not matter.
    pub fn from_string<S: Into<String>>(addr: S) -> Option<RawAddress> {
        let addr: String = addr.into();
        let s = addr.split(':').collect::<Vec<&str>>();

        if s.len() != 6 {
            return None;
        }

        let mut raw: [u8; 6] = [0; 6];
        for (i, part) in s.iter().enumerate() {
            if part.len() != 2 {
                return None;
            }
            raw[i] = match u8::from_str_radix(part, 16) {
                Ok(res) => res,
                Err(_) => {
                    return None;
                }
            };
        }

        Some(RawAddress { address: raw })
    }

    /// Returns the raw bytes
    pub fn to_byte_arr(&self) -> [u8; 6] {
        self.address
    }
}

impl Display for RawAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let a = &self.address;
        write!(f, "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}", a[0], a[1], a[2], a[3], a[4], a[5])
    }
}

// Only the last two bytes are printed in debug output, like the native stack does
impl Debug for RawAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "xx:xx:xx:xx:{:02X}:{:02X}", self.address[4], self.address[5])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_string_invalid() {
        assert!(RawAddress::from_string("").is_none());
        assert!(RawAddress::from_string("some invalid string").is_none());
        assert!(RawAddress::from_string("aa:bb:cc:dd:ee:ff:00").is_none());
        assert!(RawAddress::from_string("aa:bb:cc:dd:ee").is_none());
        assert!(RawAddress::from_string("aa:bb:cc:dd::ff").is_none());
        assert!(RawAddress::from_string("aa:bb:cc:dd:e:fff").is_none());
    }

    #[test]
    fn from_string_valid() {
        let addr = RawAddress::from_string("11:22:33:aa:bb:cc");
        assert_eq!(Some([0x11, 0x22, 0x33, 0xaa, 0xbb, 0xcc]), addr.map(|a| a.to_byte_arr()));

        // Upper/lower case should not matter.
        let addr = RawAddress::from_string("11:22:33:AA:BB:CC");
        assert_eq!(Some([0x11, 0x22, 0x33, 0xaa, 0xbb, 0xcc]), addr.map(|a| a.to_byte_arr()));
    }

    #[test]
    fn display_and_debug() {
        let addr = RawAddress::new([0x11, 0x22, 0x33, 0xaa, 0xbb, 0xcc]);
        assert_eq!(addr.to_string(), "11:22:33:AA:BB:CC");
        assert_eq!(format!("{:?}", addr), "xx:xx:xx:xx:BB:CC");
    }
}
