use std::sync::Arc;

use uuid::Uuid;

use chronicle_domain::{
    Coordinates, EntityKind, EntityName, EntityRef, EquipmentSlot, FlagValue, Item, ItemId,
    JournalAction, Location, Npc, NpcId, PlayerCharacter, PlayerId, Quest, QuestStatus, SlotSet,
    WorldModel, Wound, WoundSeverity,
};
use chronicle_shared::{
    CharacterRefData, EntityChanges, EntityRefData, GmTurnPayload, ItemDelta, ItemOwnerData,
    NpcDelta, PlayerDelta, QuestDelta, WorldStateDelta, WoundDelta,
};

use super::*;
use crate::infrastructure::clock::{FixedClock, SequentialIds};

fn name(s: &str) -> EntityName {
    EntityName::new(s).unwrap()
}

fn reconciler() -> TurnReconciler {
    TurnReconciler::new(
        Arc::new(SequentialIds::starting_at(1)),
        Arc::new(FixedClock::at_epoch(1_700_000_000)),
        50,
    )
}

fn hero() -> PlayerCharacter {
    PlayerCharacter::new(PlayerId::from_uuid(Uuid::from_u128(0xFACE)), name("Ash"))
}

fn world() -> WorldModel {
    WorldModel::new().with_player(hero())
}

fn added<T>(deltas: Vec<T>) -> EntityChanges<T> {
    EntityChanges {
        added: deltas,
        ..Default::default()
    }
}

fn updated<T>(deltas: Vec<T>) -> EntityChanges<T> {
    EntityChanges {
        updated: deltas,
        ..Default::default()
    }
}

fn removed<T>(deltas: Vec<T>) -> EntityChanges<T> {
    EntityChanges {
        removed: deltas,
        ..Default::default()
    }
}

fn npc_named(n: &str) -> NpcDelta {
    NpcDelta {
        name: Some(n.into()),
        ..Default::default()
    }
}

fn item_named(n: &str) -> ItemDelta {
    ItemDelta {
        name: Some(n.into()),
        ..Default::default()
    }
}

mod parse {
    use super::*;

    #[test]
    fn accepts_fenced_json() {
        let raw = "```json\n{ \"narration\": \"Rain falls.\" }\n```";
        let payload = TurnReconciler::parse_payload(raw).unwrap();
        assert_eq!(payload.narration.as_deref(), Some("Rain falls."));
    }

    #[test]
    fn rejects_garbage() {
        let err = TurnReconciler::parse_payload("the goblin attacks").unwrap_err();
        assert!(matches!(err, ReconcileError::MalformedPayload(_)));
    }
}

mod turn {
    use super::*;

    #[test]
    fn input_world_is_untouched_and_turn_advances() {
        let before = world();
        let snapshot = before.clone();
        let payload = GmTurnPayload {
            narration: Some("A stranger approaches.".into()),
            npcs: added(vec![npc_named("Mira")]),
            ..Default::default()
        };

        let (after, log) = reconciler().apply_turn(&before, &payload).unwrap();

        assert_eq!(before, snapshot);
        assert_eq!(after.turn_number, 1);
        assert_eq!(log.turn_number, 1);
        assert_eq!(log.narration.as_deref(), Some("A stranger approaches."));
        assert_eq!(log.count(JournalAction::Created), 1);
        assert_eq!(after.turn_journal.len(), 1);
        assert_eq!(after.turn_journal[0].turn_number, 1);
    }

    #[test]
    fn contradictory_payload_is_rejected() {
        let id = Uuid::from_u128(0xBAD);
        let payload = GmTurnPayload {
            npcs: EntityChanges {
                updated: vec![NpcDelta {
                    id: Some(id),
                    ..npc_named("Mira")
                }],
                removed: vec![NpcDelta {
                    id: Some(id),
                    ..Default::default()
                }],
                ..Default::default()
            },
            ..Default::default()
        };

        let err = reconciler().apply_turn(&world(), &payload).unwrap_err();
        assert!(matches!(err, ReconcileError::MalformedPayload(_)));
    }

    #[test]
    fn empty_payload_only_advances_the_turn() {
        let (after, log) = reconciler().apply_turn(&world(), &GmTurnPayload::default()).unwrap();
        assert_eq!(after.turn_number, 1);
        assert!(log.changes.is_empty());
        assert!(log.is_clean());
    }

    #[test]
    fn journal_respects_cap() {
        let reconciler = TurnReconciler::new(
            Arc::new(SequentialIds::starting_at(1)),
            Arc::new(FixedClock::at_epoch(0)),
            2,
        );
        let payload = GmTurnPayload {
            npcs: added(vec![npc_named("A"), npc_named("B"), npc_named("C")]),
            ..Default::default()
        };
        let (after, _) = reconciler.apply_turn(&world(), &payload).unwrap();
        assert_eq!(after.encountered_npcs.len(), 3);
        assert_eq!(after.turn_journal.len(), 2);
    }
}

mod npcs {
    use super::*;

    #[test]
    fn proposed_id_is_honored_when_free() {
        let id = Uuid::from_u128(0xA11CE);
        let payload = GmTurnPayload {
            npcs: added(vec![NpcDelta {
                id: Some(id),
                ..npc_named("Mira")
            }]),
            ..Default::default()
        };
        let (after, _) = reconciler().apply_turn(&world(), &payload).unwrap();
        assert_eq!(after.encountered_npcs[0].id.to_uuid(), id);
    }

    #[test]
    fn adding_a_known_name_updates_instead_of_duplicating() {
        let mut start = world();
        start.encountered_npcs.push(Npc::new(name("Mira")));
        let payload = GmTurnPayload {
            npcs: added(vec![NpcDelta {
                attitude: Some("friendly".into()),
                ..npc_named("Mira")
            }]),
            ..Default::default()
        };

        let (after, log) = reconciler().apply_turn(&start, &payload).unwrap();
        assert_eq!(after.encountered_npcs.len(), 1);
        assert_eq!(after.encountered_npcs[0].attitude.as_deref(), Some("friendly"));
        assert_eq!(log.count(JournalAction::Updated), 1);
    }

    #[test]
    fn update_never_creates() {
        let payload = GmTurnPayload {
            npcs: updated(vec![npc_named("Ghost")]),
            ..Default::default()
        };
        let (after, log) = reconciler().apply_turn(&world(), &payload).unwrap();
        assert!(after.encountered_npcs.is_empty());
        assert_eq!(log.count(JournalAction::Skipped), 1);
    }

    #[test]
    fn stale_id_does_not_fall_back_to_name() {
        let mut start = world();
        start.encountered_npcs.push(Npc::new(name("Mira")));
        let payload = GmTurnPayload {
            npcs: updated(vec![NpcDelta {
                id: Some(Uuid::from_u128(0x5747E)),
                attitude: Some("hostile".into()),
                ..npc_named("Mira")
            }]),
            ..Default::default()
        };

        let (after, log) = reconciler().apply_turn(&start, &payload).unwrap();
        assert_eq!(after.encountered_npcs[0].attitude, None);
        assert!(!log.is_clean());
    }

    #[test]
    fn omitted_fields_are_kept() {
        let mut start = world();
        let mut mira = Npc::new(name("Mira"));
        mira.description = Some("A cartographer".into());
        start.encountered_npcs.push(mira);
        let payload = GmTurnPayload {
            npcs: updated(vec![NpcDelta {
                level: Some(4),
                ..npc_named("Mira")
            }]),
            ..Default::default()
        };

        let (after, _) = reconciler().apply_turn(&start, &payload).unwrap();
        let mira = &after.encountered_npcs[0];
        assert_eq!(mira.level, Some(4));
        assert_eq!(mira.description.as_deref(), Some("A cartographer"));
    }

    #[test]
    fn removal_clears_quest_givers_and_retires_the_id() {
        let mut start = world();
        let mira = Npc::new(name("Mira"));
        let mira_id = mira.id;
        let mut quest = Quest::new(name("Map the Coast"));
        quest.giver_npc_id = Some(mira_id);
        start.encountered_npcs.push(mira);
        start.active_quests.push(quest);

        let payload = GmTurnPayload {
            npcs: removed(vec![npc_named("Mira")]),
            ..Default::default()
        };
        let (after, _) = reconciler().apply_turn(&start, &payload).unwrap();
        assert!(after.encountered_npcs.is_empty());
        assert_eq!(after.active_quests[0].giver_npc_id, None);
        assert!(after.is_id_taken(mira_id.to_uuid()));

        // A later turn proposing the retired ID gets a fresh one.
        let payload = GmTurnPayload {
            npcs: added(vec![NpcDelta {
                id: Some(mira_id.to_uuid()),
                ..npc_named("Mira")
            }]),
            ..Default::default()
        };
        let (again, _) = reconciler().apply_turn(&after, &payload).unwrap();
        assert_ne!(again.encountered_npcs[0].id, mira_id);
    }

    #[test]
    fn blank_name_is_skipped() {
        let payload = GmTurnPayload {
            npcs: added(vec![npc_named("   ")]),
            ..Default::default()
        };
        let (after, log) = reconciler().apply_turn(&world(), &payload).unwrap();
        assert!(after.encountered_npcs.is_empty());
        assert_eq!(log.skipped().count(), 1);
    }
}

mod items {
    use super::*;

    fn with_backpack() -> WorldModel {
        let mut start = world();
        let inventory = &mut start.player_characters[0].inventory;
        inventory.items.push(Item::new(name("Backpack")).as_container());
        inventory
            .items
            .push(Item::new(name("Gem")).inside(vec!["Backpack".into()]));
        start
    }

    #[test]
    fn added_item_lands_in_primary_inventory() {
        let payload = GmTurnPayload {
            items: added(vec![ItemDelta {
                count: Some(3),
                ..item_named("Torch")
            }]),
            ..Default::default()
        };
        let (after, _) = reconciler().apply_turn(&world(), &payload).unwrap();
        let items = &after.player_characters[0].inventory.items;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].count, 3);
    }

    #[test]
    fn missing_container_skips_the_item() {
        let payload = GmTurnPayload {
            items: added(vec![ItemDelta {
                contents_path: Some(vec!["Chest".into()]),
                ..item_named("Coin")
            }]),
            ..Default::default()
        };
        let (after, log) = reconciler().apply_turn(&world(), &payload).unwrap();
        assert!(after.player_characters[0].inventory.items.is_empty());
        assert_eq!(log.count(JournalAction::Skipped), 1);
    }

    #[test]
    fn zero_count_update_consumes() {
        let payload = GmTurnPayload {
            items: updated(vec![ItemDelta {
                count: Some(0),
                ..item_named("Gem")
            }]),
            ..Default::default()
        };
        let (after, log) = reconciler().apply_turn(&with_backpack(), &payload).unwrap();
        let items = &after.player_characters[0].inventory.items;
        assert_eq!(items.len(), 1);
        assert_eq!(log.count(JournalAction::Removed), 1);
    }

    #[test]
    fn zero_count_add_is_skipped() {
        let payload = GmTurnPayload {
            items: added(vec![ItemDelta {
                count: Some(0),
                ..item_named("Dust")
            }]),
            ..Default::default()
        };
        let (after, _) = reconciler().apply_turn(&world(), &payload).unwrap();
        assert!(after.player_characters[0].inventory.items.is_empty());
    }

    #[test]
    fn renaming_a_container_rewrites_contents() {
        let start = with_backpack();
        let backpack_id = start.player_characters[0].inventory.items[0].existed_id;
        let payload = GmTurnPayload {
            items: updated(vec![ItemDelta {
                id: Some(backpack_id.to_uuid()),
                ..item_named("Rucksack")
            }]),
            ..Default::default()
        };
        let (after, _) = reconciler().apply_turn(&start, &payload).unwrap();
        let gem = &after.player_characters[0].inventory.items[1];
        assert_eq!(gem.contents_path, vec!["Rucksack".to_string()]);
    }

    #[test]
    fn removing_a_container_lifts_contents() {
        let payload = GmTurnPayload {
            items: removed(vec![item_named("Backpack")]),
            ..Default::default()
        };
        let (after, _) = reconciler().apply_turn(&with_backpack(), &payload).unwrap();
        let items = &after.player_characters[0].inventory.items;
        assert_eq!(items.len(), 1);
        assert!(items[0].contents_path.is_empty());
    }

    #[test]
    fn moving_equipped_item_into_container_unequips() {
        let mut start = with_backpack();
        let sword = Item::new(name("Sword")).with_slots(SlotSet::single(EquipmentSlot::MainHand));
        let sword_id = sword.existed_id;
        let inventory = &mut start.player_characters[0].inventory;
        inventory.items.push(sword);
        inventory.equipped_items.insert(EquipmentSlot::MainHand, sword_id);

        let payload = GmTurnPayload {
            items: updated(vec![ItemDelta {
                contents_path: Some(vec!["Backpack".into()]),
                ..item_named("Sword")
            }]),
            ..Default::default()
        };
        let (after, _) = reconciler().apply_turn(&start, &payload).unwrap();
        let inventory = &after.player_characters[0].inventory;
        assert!(!inventory.is_equipped(sword_id));
        assert_eq!(
            inventory.get(sword_id).map(|i| i.contents_path.clone()),
            Some(vec!["Backpack".to_string()])
        );
    }

    #[test]
    fn npc_owner_resolves_by_name() {
        let mut start = world();
        start.encountered_npcs.push(Npc::new(name("Old Tam")));
        let payload = GmTurnPayload {
            items: added(vec![ItemDelta {
                owner: ItemOwnerData::Npc {
                    id: None,
                    name: Some("Old Tam".into()),
                },
                ..item_named("Lantern")
            }]),
            ..Default::default()
        };
        let (after, _) = reconciler().apply_turn(&start, &payload).unwrap();
        assert_eq!(after.encountered_npcs[0].inventory.items.len(), 1);
        assert!(after.player_characters[0].inventory.items.is_empty());
    }

    #[test]
    fn added_item_held_by_another_owner_changes_hands() {
        let mut start = world();
        let mut mira = Npc::new(name("Mira"));
        let case = Item::new(name("Lute Case")).as_container();
        let lute = Item::new(name("Lute")).inside(vec!["Lute Case".into()]);
        let (case_id, lute_id) = (case.existed_id, lute.existed_id);
        mira.inventory.items.extend([case, lute]);
        mira.inventory.item_sort_order.push(case_id);
        start.encountered_npcs.push(mira);

        let payload = GmTurnPayload {
            items: added(vec![ItemDelta {
                id: Some(case_id.to_uuid()),
                owner: ItemOwnerData::Player { player_id: None },
                ..item_named("Lute Case")
            }]),
            ..Default::default()
        };
        let (after, log) = reconciler().apply_turn(&start, &payload).unwrap();

        let mira = &after.encountered_npcs[0].inventory;
        assert!(mira.items.is_empty());
        assert!(mira.item_sort_order.is_empty());

        let inventory = &after.player_characters[0].inventory;
        assert_eq!(inventory.items.len(), 2);
        assert!(inventory.contains(case_id));
        assert_eq!(
            inventory.get(lute_id).map(|i| i.contents_path.clone()),
            Some(vec!["Lute Case".to_string()])
        );
        assert_eq!(log.count(JournalAction::Created), 0);
        assert_eq!(log.count(JournalAction::Updated), 1);
    }

    #[test]
    fn container_arriving_beside_a_namesake_is_skipped() {
        let mut start = with_backpack();
        let mut tam = Npc::new(name("Old Tam"));
        let backpack = Item::new(name("Backpack")).as_container();
        let backpack_id = backpack.existed_id;
        tam.inventory.items.push(backpack);
        start.encountered_npcs.push(tam);

        let payload = GmTurnPayload {
            items: updated(vec![ItemDelta {
                id: Some(backpack_id.to_uuid()),
                ..Default::default()
            }]),
            ..Default::default()
        };
        let (after, log) = reconciler().apply_turn(&start, &payload).unwrap();
        assert_eq!(after.encountered_npcs[0].inventory.items.len(), 1);
        assert_eq!(after.player_characters[0].inventory.items.len(), 2);
        assert_eq!(log.count(JournalAction::Skipped), 1);
    }

    #[test]
    fn stash_accepts_items() {
        let payload = GmTurnPayload {
            items: added(vec![ItemDelta {
                owner: ItemOwnerData::Stash,
                ..item_named("Crate")
            }]),
            ..Default::default()
        };
        let (after, _) = reconciler().apply_turn(&world(), &payload).unwrap();
        assert_eq!(after.temporary_stash.len(), 1);
    }
}

mod wounds {
    use super::*;

    #[test]
    fn added_without_owner_goes_to_primary_player() {
        let payload = GmTurnPayload {
            wounds: added(vec![WoundDelta {
                name: Some("Gash".into()),
                severity: Some(WoundSeverity::Moderate),
                ..Default::default()
            }]),
            ..Default::default()
        };
        let (after, _) = reconciler().apply_turn(&world(), &payload).unwrap();
        let wound = &after.player_characters[0].wounds[0];
        assert_eq!(wound.severity, WoundSeverity::Moderate);
    }

    #[test]
    fn healed_update_removes_the_wound() {
        let mut start = world();
        start.player_characters[0]
            .wounds
            .push(Wound::new(name("Gash"), WoundSeverity::Moderate));
        let payload = GmTurnPayload {
            wounds: updated(vec![WoundDelta {
                name: Some("Gash".into()),
                severity: Some(WoundSeverity::Moderate),
                healed: true,
                ..Default::default()
            }]),
            ..Default::default()
        };
        let (after, log) = reconciler().apply_turn(&start, &payload).unwrap();
        assert!(after.player_characters[0].wounds.is_empty());
        assert_eq!(log.count(JournalAction::Removed), 1);
    }

    #[test]
    fn severity_distinguishes_same_named_wounds() {
        let mut start = world();
        let wounds = &mut start.player_characters[0].wounds;
        wounds.push(Wound::new(name("Bruise"), WoundSeverity::Minor));
        wounds.push(Wound::new(name("Bruise"), WoundSeverity::Severe));
        let payload = GmTurnPayload {
            wounds: updated(vec![WoundDelta {
                name: Some("Bruise".into()),
                severity: Some(WoundSeverity::Severe),
                description: Some("Purple and swollen".into()),
                ..Default::default()
            }]),
            ..Default::default()
        };
        let (after, _) = reconciler().apply_turn(&start, &payload).unwrap();
        let wounds = &after.player_characters[0].wounds;
        assert_eq!(wounds[0].description, None);
        assert_eq!(wounds[1].description.as_deref(), Some("Purple and swollen"));
    }

    #[test]
    fn unknown_npc_owner_is_skipped() {
        let payload = GmTurnPayload {
            wounds: added(vec![WoundDelta {
                owner: Some(CharacterRefData::Npc {
                    id: None,
                    name: Some("Nobody".into()),
                }),
                name: Some("Burn".into()),
                ..Default::default()
            }]),
            ..Default::default()
        };
        let (_, log) = reconciler().apply_turn(&world(), &payload).unwrap();
        assert_eq!(log.count(JournalAction::Skipped), 1);
    }
}

mod progression {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn player_updates_merge_per_key() {
        let mut start = world();
        start.player_characters[0]
            .characteristics
            .insert("wits".into(), 12);
        let payload = GmTurnPayload {
            player_updates: vec![PlayerDelta {
                level: Some(3),
                characteristics: Some(BTreeMap::from([("strength".to_string(), 14)])),
                ..Default::default()
            }],
            ..Default::default()
        };
        let (after, _) = reconciler().apply_turn(&start, &payload).unwrap();
        let pc = &after.player_characters[0];
        assert_eq!(pc.level, 3);
        assert_eq!(pc.characteristic("wits"), 12);
        assert_eq!(pc.characteristic("strength"), 14);
    }
}

mod world_level {
    use super::*;

    #[test]
    fn closing_a_quest_moves_it_to_completed() {
        let mut start = world();
        start.active_quests.push(Quest::new(name("Map the Coast")));
        let payload = GmTurnPayload {
            quests: updated(vec![QuestDelta {
                name: Some("Map the Coast".into()),
                status: Some(QuestStatus::Completed),
                ..Default::default()
            }]),
            ..Default::default()
        };
        let (after, _) = reconciler().apply_turn(&start, &payload).unwrap();
        assert!(after.active_quests.is_empty());
        assert_eq!(after.completed_quests[0].status, QuestStatus::Completed);
    }

    #[test]
    fn flags_set_and_clear() {
        let mut start = world();
        start
            .world_state_flags
            .insert("alarm".into(), FlagValue::Bool(true));
        let payload = GmTurnPayload {
            world_state_flags: [
                ("alarm".to_string(), None),
                ("gateOpen".to_string(), Some(FlagValue::Bool(true))),
            ]
            .into_iter()
            .collect(),
            ..Default::default()
        };
        let (after, _) = reconciler().apply_turn(&start, &payload).unwrap();
        assert_eq!(after.flag("alarm"), None);
        assert_eq!(after.flag("gateOpen"), Some(&FlagValue::Bool(true)));
    }

    #[test]
    fn world_state_merges() {
        let mut start = world();
        start.world_state.weather = Some("clear".into());
        let payload = GmTurnPayload {
            world_state: Some(WorldStateDelta {
                day: Some(4),
                ..Default::default()
            }),
            ..Default::default()
        };
        let (after, _) = reconciler().apply_turn(&start, &payload).unwrap();
        assert_eq!(after.world_state.day, 4);
        assert_eq!(after.world_state.weather.as_deref(), Some("clear"));
    }

    #[test]
    fn current_location_must_be_visited() {
        let mut start = world();
        let gate = Location::new(name("North Gate"), Coordinates::new(1, 2));
        let gate_id = gate.location_id;
        start.visited_locations.push(gate);

        let payload = GmTurnPayload {
            current_location: Some(EntityRefData {
                id: None,
                name: Some("North Gate".into()),
            }),
            ..Default::default()
        };
        let (after, _) = reconciler().apply_turn(&start, &payload).unwrap();
        assert_eq!(after.current_location_id, Some(gate_id));

        let payload = GmTurnPayload {
            current_location: Some(EntityRefData {
                id: None,
                name: Some("Nowhere".into()),
            }),
            ..Default::default()
        };
        let (after, log) = reconciler().apply_turn(&after, &payload).unwrap();
        assert_eq!(after.current_location_id, Some(gate_id));
        assert!(!log.is_clean());
    }
}

mod regeneration {
    use super::*;

    #[test]
    fn regenerating_an_npc_rewrites_quest_givers_and_journals() {
        let mut world = world();
        let mira = Npc::new(name("Mira"));
        let old = mira.id;
        let mut quest = Quest::new(name("Map the Coast"));
        quest.giver_npc_id = Some(old);
        world.encountered_npcs.push(mira);
        world.active_quests.push(quest);

        let report = reconciler()
            .regenerate_id(&mut world, EntityRef::new(EntityKind::Npc, old))
            .unwrap();

        let new = NpcId::from_uuid(report.new_id);
        assert_eq!(world.encountered_npcs[0].id, new);
        assert_eq!(world.active_quests[0].giver_npc_id, Some(new));
        assert_eq!(report.rewritten.len(), 1);
        assert!(world.is_id_taken(old.to_uuid()));
        let last = world.turn_journal.last().unwrap();
        assert_eq!(last.action, JournalAction::Regenerated);
    }

    #[test]
    fn repair_assigns_ids_to_nil_entities() {
        let mut world = world();
        let mut rope = Item::new(name("Rope"));
        rope.existed_id = ItemId::from_uuid(Uuid::nil());
        let mut lamp = Item::new(name("Lamp"));
        lamp.existed_id = ItemId::from_uuid(Uuid::nil());
        world.player_characters[0].inventory.items.extend([rope, lamp]);

        let reports = reconciler().repair_missing_ids(&mut world);

        assert_eq!(reports.len(), 2);
        let items = &world.player_characters[0].inventory.items;
        assert!(items.iter().all(|i| !i.existed_id.to_uuid().is_nil()));
        assert_ne!(items[0].existed_id, items[1].existed_id);
    }
}
