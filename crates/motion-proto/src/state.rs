//! Motion states and the hero metadata attached to state changes.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::ProtocolError;

/// Named animation state understood by the native view.
///
/// The set is closed: a tag outside this enum is rejected, never mapped to
/// a nearby state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MotionState {
    /// Resting loop on the home screen.
    Idle,
    /// Battle stance.
    Combat,
    /// Banner showcase.
    Banner,
    /// Summon reveal.
    Summon,
    /// Post-battle win pose.
    Victory,
    /// Post-battle loss pose.
    Defeat,
    /// Talking during story dialogue.
    Dialogue,
}

impl MotionState {
    /// Every motion state, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Idle,
        Self::Combat,
        Self::Banner,
        Self::Summon,
        Self::Victory,
        Self::Defeat,
        Self::Dialogue,
    ];

    /// Wire tag for this state.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Combat => "combat",
            Self::Banner => "banner",
            Self::Summon => "summon",
            Self::Victory => "victory",
            Self::Defeat => "defeat",
            Self::Dialogue => "dialogue",
        }
    }
}

impl fmt::Display for MotionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MotionState {
    type Err = ProtocolError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == tag)
            .ok_or_else(|| ProtocolError::UnknownState(tag.to_string()))
    }
}

/// Descriptive fields about the active hero.
///
/// Passed through to the native side, which resolves its own motion profile
/// from them. Fields this client does not know about are kept in `extra` so
/// they survive a round trip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroMetadata {
    /// Stable hero identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_id: Option<String>,

    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Rarity tier label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rarity: Option<String>,

    /// Elemental affinity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,

    /// Equipped skin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skin_id: Option<String>,

    /// Any other fields, forwarded untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl HeroMetadata {
    /// Metadata carrying only a hero id.
    pub fn hero(hero_id: impl Into<String>) -> Self {
        Self { hero_id: Some(hero_id.into()), ..Self::default() }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn every_state_parses_from_its_tag() {
        for state in MotionState::ALL {
            assert_eq!(state.as_str().parse::<MotionState>(), Ok(state));
        }
    }

    #[test]
    fn tags_are_case_sensitive() {
        assert_eq!(
            "Combat".parse::<MotionState>(),
            Err(ProtocolError::UnknownState("Combat".into()))
        );
        assert!(" idle".parse::<MotionState>().is_err());
    }

    #[test]
    fn serde_tag_matches_display() {
        let json = serde_json::to_string(&MotionState::Summon).unwrap();
        assert_eq!(json, "\"summon\"");
        assert_eq!(MotionState::Summon.to_string(), "summon");
    }

    #[test]
    fn metadata_omits_absent_fields() {
        let json = serde_json::to_string(&HeroMetadata::hero("aethon")).unwrap();
        assert_eq!(json, r#"{"heroId":"aethon"}"#);
    }

    #[test]
    fn metadata_keeps_unknown_fields() {
        let raw = r#"{"heroId":"aethon","skinId":"s2","affection":7}"#;
        let meta: HeroMetadata = serde_json::from_str(raw).unwrap();
        assert_eq!(meta.skin_id.as_deref(), Some("s2"));
        assert_eq!(meta.extra.get("affection"), Some(&Value::from(7)));

        let back = serde_json::to_value(&meta).unwrap();
        assert_eq!(back, serde_json::from_str::<Value>(raw).unwrap());
    }

    proptest! {
        #[test]
        fn unknown_tags_are_rejected(tag in "\\PC*") {
            prop_assume!(MotionState::ALL.iter().all(|s| s.as_str() != tag));
            prop_assert!(tag.parse::<MotionState>().is_err());
        }
    }
}
