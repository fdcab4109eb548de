#[cfg(test)]
mod tests {
    use crate::commands::Command;
    use crate::components::*;
    use crate::enums::*;
    use crate::mission::*;
    use crate::types::{ActorId, Direction8, TilePos};

    #[test]
    fn test_direction_buckets_axes() {
        assert_eq!(Direction8::from_delta(0, -5), Some(Direction8::N));
        assert_eq!(Direction8::from_delta(5, 0), Some(Direction8::E));
        assert_eq!(Direction8::from_delta(0, 3), Some(Direction8::S));
        assert_eq!(Direction8::from_delta(-2, 0), Some(Direction8::W));
        assert_eq!(Direction8::from_delta(0, 0), None);
    }

    #[test]
    fn test_direction_buckets_diagonals_and_edges() {
        assert_eq!(Direction8::from_delta(3, 3), Some(Direction8::SE));
        assert_eq!(Direction8::from_delta(-4, -4), Some(Direction8::NW));
        // 10 east, 4 north is inside the 22.5° band around east.
        assert_eq!(Direction8::from_delta(10, -4), Some(Direction8::E));
        // 10 east, 5 north is past it.
        assert_eq!(Direction8::from_delta(10, -5), Some(Direction8::NE));
    }

    #[test]
    fn test_direction_opposite_round_trip() {
        for dir in Direction8::ALL {
            assert_eq!(dir.opposite().opposite(), dir);
            let (dx, dy) = dir.delta();
            assert_eq!(Direction8::from_delta(dx, dy), Some(dir));
        }
    }

    #[test]
    fn test_health_clamps() {
        let mut hp = Health::new(50);
        assert_eq!(hp.apply_damage(80), 50);
        assert_eq!(hp.current, 0);
        assert!(!hp.is_alive());
        assert_eq!(hp.apply_damage(5), 0);
    }

    #[test]
    fn test_weapon_reload_moves_reserve() {
        let mut weapon = Weapon {
            name: "test".into(),
            damage: 10,
            range: 5.0,
            accuracy: 0.5,
            magazine: 0,
            magazine_size: 10,
            reserve: 4,
            fire_interval_ticks: 2,
            cooldown: 0,
            reload_remaining: 0,
        };
        assert!(weapon.start_reload(3));
        for _ in 0..3 {
            weapon.tick();
        }
        assert_eq!(weapon.magazine, 4);
        assert_eq!(weapon.reserve, 0);
        assert!(!weapon.start_reload(3), "empty reserve cannot reload");
    }

    #[test]
    fn test_status_effects_refresh_not_stack() {
        let mut effects = StatusEffects::default();
        let suppressed = |ticks| StatusEffect {
            kind: EffectKind::Suppressed,
            source: ModifierSource::Actor(ActorId(1)),
            remaining_ticks: Some(ticks),
            modifiers: vec![StatModifier {
                stat: ModifiedStat::Accuracy,
                factor: 0.5,
            }],
        };
        assert!(effects.apply(suppressed(10)));
        assert!(!effects.apply(suppressed(30)));
        assert_eq!(effects.effects.len(), 1);
        assert_eq!(effects.effects[0].remaining_ticks, Some(30));
        assert!((effects.multiplier(ModifiedStat::Accuracy) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_status_effects_multiply_and_remove_by_source() {
        let mut effects = StatusEffects::default();
        effects.apply(StatusEffect {
            kind: EffectKind::CommandAura,
            source: ModifierSource::Actor(ActorId(7)),
            remaining_ticks: None,
            modifiers: vec![StatModifier {
                stat: ModifiedStat::Accuracy,
                factor: 1.2,
            }],
        });
        effects.apply(StatusEffect {
            kind: EffectKind::Suppressed,
            source: ModifierSource::Actor(ActorId(2)),
            remaining_ticks: Some(5),
            modifiers: vec![StatModifier {
                stat: ModifiedStat::Accuracy,
                factor: 0.5,
            }],
        });
        assert!((effects.multiplier(ModifiedStat::Accuracy) - 0.6).abs() < 1e-12);
        assert_eq!(effects.multiplier(ModifiedStat::MoveSpeed), 1.0);

        assert_eq!(effects.remove_by_source(ModifierSource::Actor(ActorId(7))), 1);
        assert!((effects.multiplier(ModifiedStat::Accuracy) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_status_effects_expire() {
        let mut effects = StatusEffects::default();
        effects.apply(StatusEffect {
            kind: EffectKind::KnockedDown,
            source: ModifierSource::Mission,
            remaining_ticks: Some(2),
            modifiers: Vec::new(),
        });
        assert!(effects.tick().is_empty());
        assert_eq!(effects.tick(), vec![EffectKind::KnockedDown]);
        assert!(!effects.has(EffectKind::KnockedDown));
    }

    #[test]
    fn test_phase_table_is_forward_only() {
        use MissionPhase::*;
        let phases = [Setup, Negotiation, Contact, Pressure, Resolution, Complete];
        for (i, from) in phases.iter().enumerate() {
            for to in &phases[..=i] {
                assert!(!from.can_advance_to(*to), "{from:?} -> {to:?} must be illegal");
            }
        }
        assert!(Setup.can_advance_to(Contact));
        assert!(Contact.can_advance_to(Pressure));
        // A crew wipe can end the mission mid-negotiation.
        assert!(Negotiation.can_advance_to(Complete));
        assert!(!Setup.can_advance_to(Complete));
    }

    #[test]
    fn test_armor_values() {
        assert_eq!(ArmorClass::Light.value(), 10);
        assert_eq!(ArmorClass::Medium.value(), 18);
    }

    #[test]
    fn test_command_serde() {
        let commands = vec![
            Command::Move {
                actor: ActorId(1),
                to: TilePos::new(3, 4),
            },
            Command::EnterOverwatch {
                actor: ActorId(2),
                facing: Some(Direction8::NE),
            },
            Command::SuppressiveFire {
                actor: ActorId(2),
                target: SuppressTarget::Tile(TilePos::new(1, 1)),
            },
            Command::Pause,
        ];
        for cmd in &commands {
            let json = serde_json::to_string(cmd).unwrap();
            let back: Command = serde_json::from_str(&json).unwrap();
            assert_eq!(*cmd, back);
        }
    }

    #[test]
    fn test_mission_spec_defaults() {
        let json = r#"{
            "id": "m1",
            "seed": 9,
            "map": { "width": 2, "height": 1, "rows": [".X"] },
            "crew": [{
                "name": "Vale",
                "hp": 100,
                "weapon": {
                    "name": "pistol", "damage": 15, "range": 8.0, "accuracy": 0.75,
                    "magazine_size": 12, "reserve": 36, "fire_interval_ticks": 10
                }
            }],
            "waves": [{
                "id": "w1",
                "required_phase": "Contact",
                "composition": [],
                "spawn_point": "door",
                "trigger": { "type": "ActorHpBelow", "tag": "boss", "threshold": 0.5 }
            }]
        }"#;
        let spec: MissionSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.crew[0].armor, ArmorClass::None);
        assert_eq!(spec.crew[0].vision, crate::constants::DEFAULT_VISION_RANGE);
        assert!(spec.enemies.is_empty());
        assert!(matches!(
            spec.waves[0].trigger,
            WaveTrigger::ActorHpBelow { ref tag, threshold } if tag == "boss" && threshold == 0.5
        ));
    }
}
