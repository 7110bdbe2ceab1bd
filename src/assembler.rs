//! Outbound payload assembly

use crate::backend::{ChatRequest, HistoryEntry, WireRole};
use crate::pins::PinnedItem;
use crate::profile::Profile;
use crate::transcript::{Role, Turn};
use crate::variant::EngineConfig;

/// Build the `POST /chat` body for a new turn
///
/// `prior` is every turn before the one being sent. Seed turns are dropped,
/// assistant turns are relabelled with the variant's wire role, and the
/// profile / pins are attached only if the variant forwards them.
#[must_use]
pub fn assemble(
    config: &EngineConfig,
    message: &str,
    prior: &[Turn],
    profile: Option<&Profile>,
    pins: &[PinnedItem],
) -> ChatRequest {
    let history = prior
        .iter()
        .filter(|turn| !turn.is_seed())
        .map(|turn| HistoryEntry {
            role: match turn.role {
                Role::User => WireRole::User,
                Role::Assistant => config.assistant_role,
            },
            content: turn.content.clone(),
        })
        .collect();

    ChatRequest {
        message: message.to_string(),
        history,
        profile: profile.filter(|_| config.payload.profile).cloned(),
        pinned_context: config.payload.pinned_context.then(|| pins.to_vec()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pins::{PinCategory, PinStore};
    use crate::profile::ProfileForm;
    use crate::transcript::Transcript;
    use crate::variant::PinMode;

    fn profile() -> Profile {
        ProfileForm {
            name: "Ana".to_string(),
            age: "31".to_string(),
            gender: "female".to_string(),
            height_cm: "165".to_string(),
            weight_kg: "60".to_string(),
            activity_level: "active".to_string(),
            goal: "maintain".to_string(),
            restrictions: Some("beef".to_string()),
        }
        .validate()
        .unwrap()
    }

    fn conversation(greeting: Option<&str>) -> Transcript {
        let mut t = Transcript::new(greeting);
        let p = t.begin_user_turn("hi").unwrap();
        t.settle::<()>(&p, Ok("hello there".to_string()), "err");
        t
    }

    #[test]
    fn drops_seed_and_relabels_assistant() {
        let config = EngineConfig::strategy();
        let t = conversation(config.greeting);

        let req = assemble(&config, "  next question ", t.turns(), None, &[]);

        assert_eq!(req.message, "  next question ");
        assert_eq!(
            req.history,
            vec![
                HistoryEntry { role: WireRole::User, content: "hi".to_string() },
                HistoryEntry { role: WireRole::Model, content: "hello there".to_string() },
            ]
        );
    }

    #[test]
    fn strategy_payload_omits_profile_and_pins() {
        let config = EngineConfig::strategy();
        let mut pins = PinStore::new(PinMode::Toggle);
        pins.pin("t1", "idea", None);
        let p = profile();

        let req = assemble(&config, "q", &[], Some(&p), pins.items());
        let json = serde_json::to_value(&req).unwrap();

        assert!(json.get("profile").is_none());
        assert!(json.get("pinned_context").is_none());
    }

    #[test]
    fn nutrition_payload_carries_profile_and_pins() {
        let config = EngineConfig::nutrition();
        let mut pins = PinStore::new(PinMode::Additive);
        pins.pin("t1", "no beef", Some(PinCategory::Medical));
        let p = profile();
        let t = conversation(None);

        let req = assemble(&config, "q", t.turns(), Some(&p), pins.items());

        assert_eq!(req.history[1].role, WireRole::Ai);
        assert_eq!(req.profile.as_ref(), Some(&p));
        assert_eq!(req.pinned_context.as_ref().map(Vec::len), Some(1));

        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["pinned_context"][0]["category"], "medical");
        assert_eq!(json["profile"]["restrictions"], "beef");
    }

    #[test]
    fn nutrition_payload_sends_empty_pin_list() {
        let config = EngineConfig::nutrition();
        let p = profile();
        let req = assemble(&config, "q", &[], Some(&p), &[]);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["pinned_context"], serde_json::json!([]));
    }
}
