//! Cross-device settings record.
//!
//! The phone app pushes gesture configuration to the watch over a
//! message channel; this module defines the typed record that payload
//! decodes into. The transport itself and the preference store that
//! persists the values are external collaborators; the engine only
//! defines the record, its merge semantics, and the wire codec.
//!
//! Compatibility contract: the record is versioned, every field is
//! optional, absent fields retain the receiver's previous value, and
//! unknown incoming keys are ignored. Old and new builds can exchange
//! payloads in either direction without coordination.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Schema version written into every encoded payload.
pub const SETTINGS_VERSION: u32 = 1;

/// Clamp bounds for the off-screen retry delay (ms).
const RETRY_DELAY_MIN_MS: u32 = 120;
const RETRY_DELAY_MAX_MS: u32 = 1000;

/// User-assignable action identifiers.
///
/// The dispatcher that maps these onto platform media/system calls is out
/// of scope; the engine only carries the identifiers between devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureAction {
    PlayPause,
    Play,
    Pause,
    Stop,
    Back,
    Home,
    Recents,
    NextTrack,
    PrevTrack,
    FastForward,
    Rewind,
    VolumeUp,
    VolumeDown,
    Mute,
    Notifications,
    OpenCamera,
    LaunchAssistant,
    FindPhone,
}

impl GestureAction {
    /// Stable wire name, shared with the phone-side protocol.
    pub fn wire_name(&self) -> &'static str {
        match self {
            GestureAction::PlayPause => "play_pause",
            GestureAction::Play => "play",
            GestureAction::Pause => "pause",
            GestureAction::Stop => "stop",
            GestureAction::Back => "back",
            GestureAction::Home => "home",
            GestureAction::Recents => "recents",
            GestureAction::NextTrack => "next_track",
            GestureAction::PrevTrack => "prev_track",
            GestureAction::FastForward => "fast_forward",
            GestureAction::Rewind => "rewind",
            GestureAction::VolumeUp => "volume_up",
            GestureAction::VolumeDown => "volume_down",
            GestureAction::Mute => "mute",
            GestureAction::Notifications => "notifications",
            GestureAction::OpenCamera => "open_camera",
            GestureAction::LaunchAssistant => "launch_assistant",
            GestureAction::FindPhone => "find_phone",
        }
    }

    /// Parse a wire name. Unknown names return `None` so a newer peer's
    /// actions degrade to "retain previous" instead of a silent default.
    pub fn from_wire_name(name: &str) -> Option<Self> {
        Some(match name {
            "play_pause" => GestureAction::PlayPause,
            "play" => GestureAction::Play,
            "pause" => GestureAction::Pause,
            "stop" => GestureAction::Stop,
            "back" => GestureAction::Back,
            "home" => GestureAction::Home,
            "recents" => GestureAction::Recents,
            "next_track" => GestureAction::NextTrack,
            "prev_track" => GestureAction::PrevTrack,
            "fast_forward" => GestureAction::FastForward,
            "rewind" => GestureAction::Rewind,
            "volume_up" => GestureAction::VolumeUp,
            "volume_down" => GestureAction::VolumeDown,
            "mute" => GestureAction::Mute,
            "notifications" => GestureAction::Notifications,
            "open_camera" => GestureAction::OpenCamera,
            "launch_assistant" => GestureAction::LaunchAssistant,
            "find_phone" => GestureAction::FindPhone,
            _ => return None,
        })
    }
}

impl Default for GestureAction {
    fn default() -> Self {
        GestureAction::PlayPause
    }
}

/// Versioned cross-device settings record.
///
/// Every field is optional: `None` means "the sender said nothing about
/// this", never "turn it off".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Schema version of the sender.
    pub version: u32,
    /// Action for a gesture starting in the negative direction.
    pub primary_action: Option<GestureAction>,
    /// Action for a gesture starting in the positive direction.
    pub reverse_action: Option<GestureAction>,
    /// Master enable for the gesture service.
    pub control_enabled: Option<bool>,
    /// Haptic confirmation on gesture.
    pub haptics_enabled: Option<bool>,
    /// Route media actions to the paired phone first.
    pub route_media_to_phone: Option<bool>,
    /// Prefer explicit play/pause keys over the toggle key.
    pub prefer_explicit_play_pause: Option<bool>,
    /// Count proxy-session control as success while the screen is off.
    pub allow_proxy_screen_off: Option<bool>,
    /// Retry media keys once when dispatched with the screen off.
    pub offscreen_retry_enabled: Option<bool>,
    /// Delay before the off-screen retry, clamped to 120..=1000 ms.
    pub offscreen_retry_delay_ms: Option<u32>,
    /// Sender's timestamp for this payload (their clock, opaque here).
    pub sync_ts: Option<u64>,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            primary_action: None,
            reverse_action: None,
            control_enabled: None,
            haptics_enabled: None,
            route_media_to_phone: None,
            prefer_explicit_play_pause: None,
            allow_proxy_screen_off: None,
            offscreen_retry_enabled: None,
            offscreen_retry_delay_ms: None,
            sync_ts: None,
        }
    }
}

impl SyncSettings {
    /// Fold an incoming payload into this record. Present fields replace,
    /// absent fields retain; the local schema version is kept.
    pub fn merge(&mut self, incoming: &SyncSettings) {
        fn take<T: Copy>(slot: &mut Option<T>, incoming: Option<T>) {
            if incoming.is_some() {
                *slot = incoming;
            }
        }

        take(&mut self.primary_action, incoming.primary_action);
        take(&mut self.reverse_action, incoming.reverse_action);
        take(&mut self.control_enabled, incoming.control_enabled);
        take(&mut self.haptics_enabled, incoming.haptics_enabled);
        take(&mut self.route_media_to_phone, incoming.route_media_to_phone);
        take(
            &mut self.prefer_explicit_play_pause,
            incoming.prefer_explicit_play_pause,
        );
        take(
            &mut self.allow_proxy_screen_off,
            incoming.allow_proxy_screen_off,
        );
        take(
            &mut self.offscreen_retry_enabled,
            incoming.offscreen_retry_enabled,
        );
        take(
            &mut self.offscreen_retry_delay_ms,
            incoming
                .offscreen_retry_delay_ms
                .map(|d| d.clamp(RETRY_DELAY_MIN_MS, RETRY_DELAY_MAX_MS)),
        );
        take(&mut self.sync_ts, incoming.sync_ts);
    }

    /// Encode as UTF-8 `key=value` lines. Only present fields are written.
    pub fn encode(&self) -> Vec<u8> {
        let mut lines: Vec<String> = vec![format!("version={}", self.version)];

        if let Some(action) = self.primary_action {
            lines.push(format!("primary_action={}", action.wire_name()));
        }
        if let Some(action) = self.reverse_action {
            lines.push(format!("reverse_action={}", action.wire_name()));
        }
        if let Some(v) = self.control_enabled {
            lines.push(format!("control_enabled={v}"));
        }
        if let Some(v) = self.haptics_enabled {
            lines.push(format!("haptics_enabled={v}"));
        }
        if let Some(v) = self.route_media_to_phone {
            lines.push(format!("route_media_to_phone={v}"));
        }
        if let Some(v) = self.prefer_explicit_play_pause {
            lines.push(format!("prefer_explicit_play_pause={v}"));
        }
        if let Some(v) = self.allow_proxy_screen_off {
            lines.push(format!("allow_proxy_screen_off={v}"));
        }
        if let Some(v) = self.offscreen_retry_enabled {
            lines.push(format!("enable_offscreen_retry={v}"));
        }
        if let Some(v) = self.offscreen_retry_delay_ms {
            lines.push(format!("offscreen_retry_delay_ms={v}"));
        }
        if let Some(v) = self.sync_ts {
            lines.push(format!("sync_ts={v}"));
        }

        lines.join("\n").into_bytes()
    }

    /// Decode a `key=value` payload. Malformed lines, unknown keys, and
    /// unparseable values are skipped, never errors: a settings payload
    /// from a peer must not be able to break the receiver.
    pub fn decode(bytes: &[u8]) -> SyncSettings {
        let mut settings = SyncSettings::default();
        let text = String::from_utf8_lossy(bytes);

        for line in text.lines() {
            let Some(idx) = line.find('=') else { continue };
            if idx == 0 || idx == line.len() - 1 {
                continue;
            }
            let key = line[..idx].trim();
            let value = line[idx + 1..].trim();
            if key.is_empty() || value.is_empty() {
                continue;
            }

            match key {
                "version" => {
                    if let Ok(v) = value.parse() {
                        settings.version = v;
                    }
                }
                "primary_action" => {
                    settings.primary_action = GestureAction::from_wire_name(value);
                }
                "reverse_action" => {
                    settings.reverse_action = GestureAction::from_wire_name(value);
                }
                "control_enabled" => settings.control_enabled = value.parse().ok(),
                "haptics_enabled" => settings.haptics_enabled = value.parse().ok(),
                "route_media_to_phone" => {
                    settings.route_media_to_phone = value.parse().ok();
                }
                "prefer_explicit_play_pause" => {
                    settings.prefer_explicit_play_pause = value.parse().ok();
                }
                "allow_proxy_screen_off" => {
                    settings.allow_proxy_screen_off = value.parse().ok();
                }
                "enable_offscreen_retry" => {
                    settings.offscreen_retry_enabled = value.parse().ok();
                }
                "offscreen_retry_delay_ms" => {
                    settings.offscreen_retry_delay_ms = value
                        .parse()
                        .ok()
                        .map(|d: u32| d.clamp(RETRY_DELAY_MIN_MS, RETRY_DELAY_MAX_MS));
                }
                "sync_ts" => settings.sync_ts = value.parse().ok(),
                other => {
                    debug!(key = other, "ignoring unknown settings key");
                }
            }
        }

        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_round_trip() {
        let settings = SyncSettings {
            primary_action: Some(GestureAction::NextTrack),
            reverse_action: Some(GestureAction::PrevTrack),
            haptics_enabled: Some(false),
            offscreen_retry_delay_ms: Some(300),
            sync_ts: Some(1_723_000_000),
            ..SyncSettings::default()
        };

        let decoded = SyncSettings::decode(&settings.encode());
        assert_eq!(decoded, settings);
    }

    #[test]
    fn test_absent_fields_retain_previous_values() {
        let mut local = SyncSettings {
            primary_action: Some(GestureAction::PlayPause),
            haptics_enabled: Some(true),
            ..SyncSettings::default()
        };

        // The peer only mentions the reverse action.
        let incoming = SyncSettings {
            reverse_action: Some(GestureAction::VolumeUp),
            ..SyncSettings::default()
        };

        local.merge(&incoming);
        assert_eq!(local.primary_action, Some(GestureAction::PlayPause));
        assert_eq!(local.haptics_enabled, Some(true));
        assert_eq!(local.reverse_action, Some(GestureAction::VolumeUp));
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let payload = b"version=7\nprimary_action=play\nfuture_flag=true\nwhatever=42";
        let decoded = SyncSettings::decode(payload);
        assert_eq!(decoded.version, 7);
        assert_eq!(decoded.primary_action, Some(GestureAction::Play));
        assert_eq!(decoded.control_enabled, None);
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let payload = b"=oops\nno_separator\nhaptics_enabled=\nroute_media_to_phone=true";
        let decoded = SyncSettings::decode(payload);
        assert_eq!(decoded.haptics_enabled, None);
        assert_eq!(decoded.route_media_to_phone, Some(true));
    }

    #[test]
    fn test_unknown_action_degrades_to_retain() {
        let payload = b"primary_action=teleport";
        let decoded = SyncSettings::decode(payload);
        assert_eq!(decoded.primary_action, None);

        let mut local = SyncSettings {
            primary_action: Some(GestureAction::Mute),
            ..SyncSettings::default()
        };
        local.merge(&decoded);
        assert_eq!(local.primary_action, Some(GestureAction::Mute));
    }

    #[test]
    fn test_retry_delay_clamped() {
        let decoded = SyncSettings::decode(b"offscreen_retry_delay_ms=5000");
        assert_eq!(decoded.offscreen_retry_delay_ms, Some(1000));

        let decoded = SyncSettings::decode(b"offscreen_retry_delay_ms=10");
        assert_eq!(decoded.offscreen_retry_delay_ms, Some(120));
    }

    #[test]
    fn test_empty_payload_decodes_to_defaults() {
        let decoded = SyncSettings::decode(b"");
        assert_eq!(decoded, SyncSettings::default());
    }
}
