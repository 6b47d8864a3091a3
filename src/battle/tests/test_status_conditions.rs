#[cfg(test)]
mod tests {
    use crate::battle::conditions::{run_pre_move_gate, GateOutcome};
    use crate::battle::engine::resolve_turn;
    use crate::battle::state::{
        ActionFailureReason, BattleEvent, BattleOutcome, BattleSide, EventBus, TurnRng,
    };
    use crate::battle::tests::common::{
        assert_ok, count_events, create_test_battle, moves_used_by, predictable_rng, steady_ai,
        TestPokemonBuilder,
    };
    use crate::pokemon::{Confusion, StatusCondition};
    use crate::player::PlayerAction;
    use pretty_assertions::assert_eq;
    use schema::{StageStat, StatusKind};

    const USE_FIRST_MOVE: PlayerAction = PlayerAction::UseMove { move_index: 0 };

    fn idle_opponent() -> TestPokemonBuilder {
        TestPokemonBuilder::new("Rattata", 13).with_speed(1)
    }

    fn exhausted(builder: TestPokemonBuilder) -> crate::pokemon::Combatant {
        let mut pokemon = builder.build();
        for m in &mut pokemon.moves {
            m.current_pp = 0;
        }
        pokemon
    }

    #[test]
    fn test_paralysis_prevention_rate_converges_to_a_quarter() {
        let player = TestPokemonBuilder::new("Pikachu", 13)
            .with_status(StatusCondition::Paralysis)
            .build();
        let mut state = create_test_battle(player, idle_opponent().build());
        let mut rng = TurnRng::from_seed(2024);

        let samples = 10_000;
        let mut prevented = 0;
        for _ in 0..samples {
            let mut bus = EventBus::new();
            if run_pre_move_gate(&mut state, BattleSide::Player, &mut rng, &mut bus).unwrap()
                == GateOutcome::Prevented
            {
                prevented += 1;
            }
        }

        let rate = prevented as f64 / samples as f64;
        assert!((rate - 0.25).abs() < 0.02, "paralysis rate was {rate}");
    }

    #[test]
    fn test_full_paralysis_message() {
        let player = TestPokemonBuilder::new("Pikachu", 13)
            .with_status(StatusCondition::Paralysis)
            .build();
        let mut state = create_test_battle(player, exhausted(idle_opponent()));
        let mut rng = TurnRng::new_for_test(vec![0.1]);

        let bus = assert_ok(resolve_turn(&mut state, USE_FIRST_MOVE, &steady_ai(), &mut rng));

        assert_eq!(bus.messages(), vec!["Pikachu is fully paralyzed!".to_string()]);
        // PP is not refunded.
        assert_eq!(state.active(BattleSide::Player).unwrap().moves[0].current_pp, 34);
    }

    #[test]
    fn test_sleep_counts_down_then_wakes_and_acts() {
        let player = TestPokemonBuilder::new("Eevee", 13)
            .with_status(StatusCondition::Sleep { turns_remaining: 2 })
            .build();
        let mut state = create_test_battle(player, exhausted(idle_opponent()));
        let ai = steady_ai();

        let first = assert_ok(resolve_turn(&mut state, USE_FIRST_MOVE, &ai, &mut predictable_rng()));
        assert_eq!(first.messages(), vec!["Eevee is fast asleep.".to_string()]);
        assert_eq!(
            state.active(BattleSide::Player).unwrap().status,
            Some(StatusCondition::Sleep { turns_remaining: 1 })
        );

        let second = assert_ok(resolve_turn(&mut state, USE_FIRST_MOVE, &ai, &mut predictable_rng()));
        assert_eq!(second.messages()[0], "Eevee woke up!");
        assert_eq!(second.messages()[1], "Eevee used Tackle!");
        assert_eq!(state.active(BattleSide::Player).unwrap().status, None);
    }

    #[test]
    fn test_poison_hurts_before_acting() {
        let player = TestPokemonBuilder::new("Eevee", 13)
            .with_status(StatusCondition::Poison)
            .build();
        let mut state = create_test_battle(player, exhausted(idle_opponent()));

        let bus = assert_ok(resolve_turn(&mut state, USE_FIRST_MOVE, &steady_ai(), &mut predictable_rng()));

        assert_eq!(bus.messages()[0], "Eevee is hurt by poison!");
        assert_eq!(bus.messages()[1], "Eevee used Tackle!");
        assert_eq!(state.active(BattleSide::Player).unwrap().current_hp, 35);
    }

    #[test]
    fn test_poison_can_knock_out_the_last_combatant() {
        let player = TestPokemonBuilder::new("Eevee", 13)
            .with_status(StatusCondition::Poison)
            .with_hp(3)
            .build();
        let mut state = create_test_battle(player, exhausted(idle_opponent()));

        let bus = assert_ok(resolve_turn(&mut state, USE_FIRST_MOVE, &steady_ai(), &mut predictable_rng()));

        assert!(moves_used_by(&bus, BattleSide::Player).is_empty());
        assert_eq!(
            bus.events().last(),
            Some(&BattleEvent::BattleEnded {
                outcome: BattleOutcome::Lose
            })
        );
    }

    #[test]
    fn test_confusion_self_hit_uses_half_attack() {
        let player = TestPokemonBuilder::new("Eevee", 13)
            .with_attack(21)
            .with_confusion(3)
            .build();
        let mut state = create_test_battle(player, exhausted(idle_opponent()));
        let mut rng = TurnRng::new_for_test(vec![0.1]);

        let bus = assert_ok(resolve_turn(&mut state, USE_FIRST_MOVE, &steady_ai(), &mut rng));

        assert_eq!(
            bus.messages(),
            vec![
                "Eevee is confused!".to_string(),
                "It hurt itself in its confusion!".to_string(),
                "Eevee took 10 damage!".to_string(),
            ]
        );
        let eevee = state.active(BattleSide::Player).unwrap();
        assert_eq!(eevee.current_hp, 30);
        assert_eq!(eevee.confusion, Some(Confusion { turns_remaining: 2 }));
    }

    #[test]
    fn test_confusion_self_hit_ignores_attack_stages() {
        let mut player = TestPokemonBuilder::new("Eevee", 13)
            .with_attack(21)
            .with_confusion(3)
            .build();
        player.modify_stage(StageStat::Attack, 2);
        let mut state = create_test_battle(player, exhausted(idle_opponent()));
        let mut rng = TurnRng::new_for_test(vec![0.1]);

        let bus = assert_ok(resolve_turn(&mut state, USE_FIRST_MOVE, &steady_ai(), &mut rng));

        assert!(bus.messages().contains(&"Eevee took 10 damage!".to_string()));
        assert_eq!(state.active(BattleSide::Player).unwrap().current_hp, 30);
    }

    #[test]
    fn test_confusion_expiring_consumes_no_roll() {
        let player = TestPokemonBuilder::new("Eevee", 13).with_confusion(1).build();
        let mut state = create_test_battle(player, exhausted(idle_opponent()));
        // accuracy, crit, spread only
        let mut rng = TurnRng::new_for_test(vec![0.5, 0.5, 0.5]);

        let bus = assert_ok(resolve_turn(&mut state, USE_FIRST_MOVE, &steady_ai(), &mut rng));

        assert_eq!(bus.messages()[0], "Eevee snapped out of its confusion!");
        assert_eq!(bus.messages()[1], "Eevee used Tackle!");
        assert_eq!(rng.remaining(), 0);
        assert_eq!(state.active(BattleSide::Player).unwrap().confusion, None);
    }

    #[test]
    fn test_confusion_and_paralysis_stack() {
        let player = TestPokemonBuilder::new("Eevee", 13)
            .with_status(StatusCondition::Paralysis)
            .with_confusion(3)
            .build();
        let mut state = create_test_battle(player, exhausted(idle_opponent()));
        // paralysis passes, confusion self-hit
        let mut rng = TurnRng::new_for_test(vec![0.9, 0.0]);

        let bus = assert_ok(resolve_turn(&mut state, USE_FIRST_MOVE, &steady_ai(), &mut rng));

        assert!(bus.events().contains(&BattleEvent::ActionPrevented {
            pokemon: "Eevee".to_string(),
            reason: ActionFailureReason::HurtItselfInConfusion,
        }));
        assert_eq!(state.active(BattleSide::Player).unwrap().status_label(), "PARALYZED");
    }

    #[test]
    fn test_hypnosis_sleep_applies_before_the_target_moves() {
        let player = TestPokemonBuilder::new("Gastly", 13)
            .with_moves(&["Hypnosis"])
            .with_speed(50)
            .build();
        let opponent = TestPokemonBuilder::new("Eevee", 13).build();
        let mut state = create_test_battle(player, opponent);
        // accuracy 50 <= 60, duration draws the minimum of 2..=4
        let mut rng = TurnRng::new_for_test(vec![0.5, 0.0]);

        let bus = assert_ok(resolve_turn(&mut state, USE_FIRST_MOVE, &steady_ai(), &mut rng));

        assert!(bus.messages().contains(&"Eevee fell asleep!".to_string()));
        assert!(bus.messages().contains(&"Eevee is fast asleep.".to_string()));
        assert_eq!(
            state.active(BattleSide::Opponent).unwrap().status,
            Some(StatusCondition::Sleep { turns_remaining: 1 })
        );
        assert_eq!(rng.remaining(), 0);
    }

    #[test]
    fn test_smokescreen_confusion_chance_and_duration() {
        let player = TestPokemonBuilder::new("Cyndaquil", 13)
            .with_moves(&["Smokescreen"])
            .build();
        let mut state = create_test_battle(player, exhausted(idle_opponent()));
        let ai = steady_ai();

        // Chance roll of 0.6 misses the 50% effect.
        let mut rng = TurnRng::new_for_test(vec![0.5, 0.6]);
        let bus = assert_ok(resolve_turn(&mut state, USE_FIRST_MOVE, &ai, &mut rng));
        assert_eq!(count_events(&bus, |e| matches!(e, BattleEvent::StatusApplied { .. })), 0);
        assert_eq!(state.active(BattleSide::Opponent).unwrap().confusion, None);

        // 0.2 lands it and 0.99 draws the longest duration.
        let mut rng = TurnRng::new_for_test(vec![0.5, 0.2, 0.99]);
        let bus = assert_ok(resolve_turn(&mut state, USE_FIRST_MOVE, &ai, &mut rng));
        assert!(bus.events().contains(&BattleEvent::StatusApplied {
            target: "Rattata".to_string(),
            status: StatusKind::Confused,
        }));
        assert_eq!(
            state.active(BattleSide::Opponent).unwrap().confusion,
            Some(Confusion { turns_remaining: 4 })
        );
    }

    #[test]
    fn test_status_on_an_afflicted_target_fails_silently() {
        let player = TestPokemonBuilder::new("Pikachu", 13)
            .with_moves(&["Thunder Wave"])
            .build();
        let opponent = idle_opponent().with_status(StatusCondition::Poison);
        let mut state = create_test_battle(player, exhausted(opponent));
        let mut rng = TurnRng::new_for_test(vec![0.5]);

        let bus = assert_ok(resolve_turn(&mut state, USE_FIRST_MOVE, &steady_ai(), &mut rng));

        assert_eq!(bus.messages(), vec!["Pikachu used Thunder Wave!".to_string()]);
        assert_eq!(
            state.active(BattleSide::Opponent).unwrap().status,
            Some(StatusCondition::Poison)
        );
    }

    #[test]
    fn test_thunder_wave_paralyzes_and_updates_the_panel() {
        let player = TestPokemonBuilder::new("Pikachu", 13)
            .with_moves(&["Thunder Wave"])
            .build();
        let mut state = create_test_battle(player, exhausted(idle_opponent()));
        let mut rng = TurnRng::new_for_test(vec![0.5]);

        let bus = assert_ok(resolve_turn(&mut state, USE_FIRST_MOVE, &steady_ai(), &mut rng));

        assert!(bus
            .messages()
            .contains(&"Rattata is paralyzed! It may be unable to move!".to_string()));
        let last_panel = bus.events().iter().rev().find_map(|e| match e {
            BattleEvent::PanelsChanged { opponent, .. } => Some(opponent.status.clone()),
            _ => None,
        });
        assert_eq!(last_panel, Some("PARALYZED".to_string()));
    }
}
