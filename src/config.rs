//! Service configuration. Values are keyed by their system property names and
//! may be supplied as "<KEY>=<VALUE>" strings or read from a file with one
//! such entry per line.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use log::{error, info, LevelFilter};

use crate::logging::parse_log_level;

/// Properties understood by the headset service
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Property {
    /// Number of audio devices the user allows to be connected at once
    MaxConnectedAudioDevices,
    /// Support for paired earbud sets (TWS+)
    TwsPlusEnabled,
    /// Support for a legacy headset alongside a paired earbud set
    TwsPlusShoEnabled,
    /// Whether the platform can play the ringtone over SCO
    InbandRingingSupported,
    /// Turns in-band ringing off even when supported
    DisableInbandRinging,
    /// Protocol certification mode
    PtsCertification,
    /// How long a headset-initiated voice recognition request may stay pending
    VoiceRecognitionTimeoutMs,
    /// How long a headset-initiated dial request may stay pending
    DialingOutTimeoutMs,
    /// Log level of the service
    LogLevel,
}

impl Property {
    /// Every property, in dump order
    pub const ALL: [Property; 9] = [
        Property::MaxConnectedAudioDevices,
        Property::TwsPlusEnabled,
        Property::TwsPlusShoEnabled,
        Property::InbandRingingSupported,
        Property::DisableInbandRinging,
        Property::PtsCertification,
        Property::VoiceRecognitionTimeoutMs,
        Property::DialingOutTimeoutMs,
        Property::LogLevel,
    ];

    /// Convert the property into the property key name and a default value.
    pub fn key_and_default(self) -> (&'static str, &'static str) {
        match self {
            Property::MaxConnectedAudioDevices => ("persist.bluetooth.maxconnectedaudiodevices", "1"),
            Property::TwsPlusEnabled => ("persist.vendor.btstack.enable.twsplus", "false"),
            Property::TwsPlusShoEnabled => ("persist.vendor.btstack.enable.twsplussho", "false"),
            Property::InbandRingingSupported => ("bluetooth.hfp.inband_ringing_supported", "true"),
            Property::DisableInbandRinging => ("persist.bluetooth.disableinbandringing", "true"),
            Property::PtsCertification => ("vendor.bt.pts.certification", "false"),
            Property::VoiceRecognitionTimeoutMs => ("bluetooth.hfp.vr_start_timeout_ms", "5000"),
            Property::DialingOutTimeoutMs => ("bluetooth.hfp.dialing_out_timeout_ms", "10000"),
            Property::LogLevel => ("persist.log.tag.bt_hfp", "info"),
        }
    }

    /// The property key name
    pub fn key(self) -> &'static str {
        self.key_and_default().0
    }

    /// Look up a property by its key name
    pub fn from_key(key: &str) -> Option<Property> {
        Property::ALL.iter().copied().find(|p| p.key() == key)
    }
}

/// Configuration of the headset service
#[derive(Clone, Debug, PartialEq)]
pub struct HfpConfig {
    /// User configured connection limit for ordinary headsets
    pub max_connected_audio_devices: usize,
    /// Paired earbud set support
    pub tws_plus_enabled: bool,
    /// Second slot next to a paired earbud set. Requires `tws_plus_enabled`.
    pub tws_plus_sho_enabled: bool,
    /// Platform support for in-band ringing
    pub inband_ringing_supported: bool,
    /// In-band ringing turned off by property
    pub disable_inband_ringing: bool,
    /// Protocol certification mode relaxes admission checks
    pub pts_certification: bool,
    /// Voice recognition start timeout
    pub voice_recognition_timeout_ms: u64,
    /// Dial-out confirmation timeout
    pub dialing_out_timeout_ms: u64,
    /// Level passed to the logger
    pub log_level: LevelFilter,
}

impl Default for HfpConfig {
    fn default() -> Self {
        Self {
            max_connected_audio_devices: 1,
            tws_plus_enabled: false,
            tws_plus_sho_enabled: false,
            inband_ringing_supported: true,
            disable_inband_ringing: true,
            pts_certification: false,
            voice_recognition_timeout_ms: 5000,
            dialing_out_timeout_ms: 10000,
            log_level: LevelFilter::Info,
        }
    }
}

impl HfpConfig {
    /// Build a config out of "<KEY>=<VALUE>" entries. Bad entries are logged
    /// and skipped.
    pub fn parse(flags: Vec<String>) -> Self {
        let mut config = Self::default();

        for flag in flags {
            let values: Vec<&str> = flag.split('=').collect();
            if values.len() != 2 {
                error!("Bad flag {}, must be in <KEY>=<VALUE> format", flag);
                continue;
            }

            let key = values[0].trim();
            match Property::from_key(key) {
                Some(prop) => {
                    if let Err(e) = config.set(prop, values[1].trim()) {
                        error!("Parse failure on '{}': {:#}", flag, e);
                    }
                }
                None => error!("Unknown property: {} = {}", key, values[1]),
            }
        }

        config.reconcile()
    }

    /// Read a config file. Blank lines and lines starting with '#' are ignored.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let flags = contents
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .map(String::from)
            .collect();
        let config = Self::parse(flags);
        info!("Loaded config from {}: {}", path.display(), config);
        Ok(config)
    }

    /// Update a single property from its string value
    pub fn set(&mut self, prop: Property, value: &str) -> Result<()> {
        match prop {
            Property::MaxConnectedAudioDevices => {
                self.max_connected_audio_devices = value.parse().context("not a count")?
            }
            Property::TwsPlusEnabled => self.tws_plus_enabled = value.parse()?,
            Property::TwsPlusShoEnabled => self.tws_plus_sho_enabled = value.parse()?,
            Property::InbandRingingSupported => self.inband_ringing_supported = value.parse()?,
            Property::DisableInbandRinging => self.disable_inband_ringing = value.parse()?,
            Property::PtsCertification => self.pts_certification = value.parse()?,
            Property::VoiceRecognitionTimeoutMs => {
                self.voice_recognition_timeout_ms = value.parse().context("not milliseconds")?
            }
            Property::DialingOutTimeoutMs => {
                self.dialing_out_timeout_ms = value.parse().context("not milliseconds")?
            }
            Property::LogLevel => {
                self.log_level =
                    parse_log_level(value).ok_or_else(|| anyhow!("unknown log level"))?
            }
        }
        Ok(())
    }

    /// Fix up combinations that cannot be honoured
    pub fn reconcile(mut self) -> Self {
        if self.tws_plus_sho_enabled && !self.tws_plus_enabled {
            error!("no TWS+ SHO without TWS+ support!");
            self.tws_plus_sho_enabled = false;
        }
        if self.max_connected_audio_devices == 0 {
            error!("max_connected_audio_devices must be at least 1");
            self.max_connected_audio_devices = 1;
        }
        self
    }

    /// Total number of connections the service admits, including the slots
    /// needed by paired earbud sets
    pub fn max_connections(&self) -> usize {
        let mut max = self.max_connected_audio_devices;
        if self.tws_plus_enabled && max < 2 {
            max = 2;
        }
        if self.tws_plus_sho_enabled && max < 3 {
            max = 3;
        }
        max
    }

    /// The connection limit the user configured, applied to ordinary headsets
    pub fn user_max_connections(&self) -> usize {
        self.max_connected_audio_devices
    }

    /// Voice recognition start timeout
    pub fn voice_recognition_timeout(&self) -> Duration {
        Duration::from_millis(self.voice_recognition_timeout_ms)
    }

    /// Dial-out confirmation timeout
    pub fn dialing_out_timeout(&self) -> Duration {
        Duration::from_millis(self.dialing_out_timeout_ms)
    }

    /// Dump every property with its current value
    pub fn dump(&self) -> BTreeMap<&'static str, String> {
        Property::ALL
            .iter()
            .map(|p| {
                let value = match p {
                    Property::MaxConnectedAudioDevices => {
                        self.max_connected_audio_devices.to_string()
                    }
                    Property::TwsPlusEnabled => self.tws_plus_enabled.to_string(),
                    Property::TwsPlusShoEnabled => self.tws_plus_sho_enabled.to_string(),
                    Property::InbandRingingSupported => self.inband_ringing_supported.to_string(),
                    Property::DisableInbandRinging => self.disable_inband_ringing.to_string(),
                    Property::PtsCertification => self.pts_certification.to_string(),
                    Property::VoiceRecognitionTimeoutMs => {
                        self.voice_recognition_timeout_ms.to_string()
                    }
                    Property::DialingOutTimeoutMs => self.dialing_out_timeout_ms.to_string(),
                    Property::LogLevel => self.log_level.to_string(),
                };
                (p.key(), value)
            })
            .collect()
    }
}

impl fmt::Display for HfpConfig {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let entries: Vec<String> =
            self.dump().into_iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        write!(f, "{}", entries.join(", "))
    }
}
