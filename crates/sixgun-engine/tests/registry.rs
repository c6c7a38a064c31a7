//! Integration tests for the game registry and game actors.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use sixgun_broadcast::{BroadcastConfig, EventReceiver, RoomBroadcaster};
use sixgun_engine::{
    BANG, BEER, CardDef, Catalogue, CharacterDef, EngineConfig, ErrorKind, GameError, GameRegistry,
    GameState, GatewayError, InMemoryGateway, JAIL, MISSED, PersistenceGateway, PlayerRecord,
    RoleDef, SHERIFF,
};
use sixgun_protocol::{CardKind, EffectOutcome, GameEvent, GameId, GameStatus, PlayerId, TurnPhase};
use sixgun_transport::ConnectionId;

// =========================================================================
// Test gateway: the in-memory store with switches that fail its writes.
// =========================================================================

#[derive(Default)]
struct FlakyGateway {
    inner: InMemoryGateway,
    fail_saves: AtomicBool,
    fail_appends: AtomicBool,
}

impl FlakyGateway {
    /// Fails every write.
    fn set_failing(&self, failing: bool) {
        self.set_failing_saves(failing);
        self.set_failing_appends(failing);
    }

    /// Fails `save_session` and `delete_session` only.
    fn set_failing_saves(&self, failing: bool) {
        self.fail_saves.store(failing, Ordering::SeqCst);
    }

    fn set_failing_appends(&self, failing: bool) {
        self.fail_appends.store(failing, Ordering::SeqCst);
    }

    fn check(flag: &AtomicBool, what: &str) -> Result<(), GatewayError> {
        if flag.load(Ordering::SeqCst) {
            return Err(GatewayError::Unavailable(format!("disk on fire: {what}")));
        }
        Ok(())
    }
}

impl PersistenceGateway for FlakyGateway {
    async fn load_session(&self, game_id: GameId) -> Result<Option<GameState>, GatewayError> {
        self.inner.load_session(game_id).await
    }

    async fn save_session(&self, state: &GameState) -> Result<(), GatewayError> {
        Self::check(&self.fail_saves, "save")?;
        self.inner.save_session(state).await
    }

    async fn delete_session(&self, game_id: GameId) -> Result<(), GatewayError> {
        Self::check(&self.fail_saves, "delete")?;
        self.inner.delete_session(game_id).await
    }

    async fn append_user_record(&self, record: PlayerRecord) -> Result<(), GatewayError> {
        Self::check(&self.fail_appends, "append")?;
        self.inner.append_user_record(record).await
    }

    async fn find_roles_available(&self, n: usize) -> Result<Vec<RoleDef>, GatewayError> {
        self.inner.find_roles_available(n).await
    }

    async fn find_characters_available(
        &self,
        game_id: GameId,
        n: usize,
    ) -> Result<Vec<CharacterDef>, GatewayError> {
        self.inner.find_characters_available(game_id, n).await
    }
}

// =========================================================================
// Helpers
// =========================================================================

fn pid(id: u64) -> PlayerId {
    PlayerId(id)
}

fn card_def(name: &str, kind: CardKind, copies: u32) -> CardDef {
    CardDef {
        name: name.into(),
        kind,
        copies,
        description: String::new(),
    }
}

/// Classic roles and characters; the deck opens with `first` so the first
/// draws are predictable.
fn catalogue_opening_with(first: &str) -> Catalogue {
    let mut cat = Catalogue::classic();
    let kind = if first == JAIL {
        CardKind::Status
    } else {
        CardKind::Action
    };
    cat.cards.insert(0, card_def(first, kind, 10));
    cat
}

fn config() -> EngineConfig {
    EngineConfig {
        shuffle_on_start: false,
        seed: Some(11),
        ..EngineConfig::default()
    }
}

fn registry() -> GameRegistry<InMemoryGateway> {
    GameRegistry::new(
        InMemoryGateway::default(),
        RoomBroadcaster::spawn(BroadcastConfig::default()),
    )
    .with_config(config())
}

fn flaky_registry() -> GameRegistry<FlakyGateway> {
    GameRegistry::new(
        FlakyGateway::default(),
        RoomBroadcaster::spawn(BroadcastConfig::default()),
    )
    .with_config(config())
}

/// Creates a game owned by player 1 and seats players 2..=n.
async fn table<G: PersistenceGateway>(reg: &GameRegistry<G>, n: u64) -> GameId {
    let game = reg.create("High Noon", pid(1)).await.unwrap();
    for id in 2..=n {
        reg.join(game, pid(id)).await.unwrap();
    }
    game
}

fn listen<G: PersistenceGateway>(reg: &GameRegistry<G>, game: GameId, conn: u64) -> EventReceiver {
    let bus = reg.broadcaster();
    let (sub, rx) = bus.subscriber(ConnectionId::new(conn));
    bus.subscribe(game, sub).unwrap();
    rx
}

/// Waits for the dispatcher, then takes every queued event.
async fn drain<G: PersistenceGateway>(reg: &GameRegistry<G>, rx: &mut EventReceiver) -> Vec<GameEvent> {
    reg.broadcaster().flush().await.unwrap();
    let mut events = Vec::new();
    while let Ok(env) = rx.try_recv() {
        events.push(env.event.clone());
    }
    events
}

// =========================================================================
// Lifecycle
// =========================================================================

#[tokio::test]
async fn test_create_returns_unique_ids() {
    let reg = registry();
    let a = reg.create("Dodge City", pid(1)).await.unwrap();
    let b = reg.create("Dodge City", pid(2)).await.unwrap();

    assert_ne!(a, b);
    assert_eq!(reg.game_count().await, 2);
}

#[tokio::test]
async fn test_create_empty_name_rejected() {
    let reg = registry();
    let result = reg.create("   ", pid(1)).await;
    assert!(matches!(result, Err(GameError::Validation(_))));
    assert_eq!(reg.game_count().await, 0);
}

#[tokio::test]
async fn test_create_persists_session_and_creator_record() {
    let reg = registry();
    let game = reg.create("Tombstone", pid(7)).await.unwrap();

    let stored = reg.gateway().load_session(game).await.unwrap().unwrap();
    assert_eq!(stored.seating(), vec![pid(7)]);
    assert_eq!(
        reg.gateway().records().unwrap(),
        vec![PlayerRecord {
            game_id: game,
            player_id: pid(7),
            seat: 0,
        }]
    );
}

#[tokio::test]
async fn test_get_unknown_game_not_found() {
    let reg = registry();
    let result = reg.get(GameId(404)).await;
    assert!(matches!(result, Err(GameError::NotFound(_))));
}

#[tokio::test]
async fn test_list_reports_every_game() {
    let reg = registry();
    let a = table(&reg, 3).await;
    let b = reg.create("Deadwood", pid(9)).await.unwrap();

    let games = reg.list().await;

    assert_eq!(games.len(), 2);
    assert_eq!(games[0].game_id, a);
    assert_eq!(games[0].player_count, 3);
    assert_eq!(games[0].status, GameStatus::Waiting);
    assert_eq!(games[1].game_id, b);
    assert_eq!(games[1].creator_id, pid(9));
}

#[tokio::test]
async fn test_join_records_seat_and_emits_event() {
    let reg = registry();
    let game = reg.create("x", pid(1)).await.unwrap();
    let mut rx = listen(&reg, game, 1);

    reg.join(game, pid(2)).await.unwrap();

    assert_eq!(
        drain(&reg, &mut rx).await,
        vec![GameEvent::PlayerJoined {
            player_id: pid(2),
            seat: 1,
        }]
    );
    assert_eq!(reg.gateway().records().unwrap().len(), 2);
}

#[tokio::test]
async fn test_start_requires_creator_and_four_players() {
    let reg = registry();
    let game = table(&reg, 3).await;

    let too_few = reg.start(game, pid(1)).await;
    assert!(matches!(too_few, Err(GameError::Validation(_))));

    reg.join(game, pid(4)).await.unwrap();
    let not_creator = reg.start(game, pid(2)).await;
    assert!(matches!(not_creator, Err(GameError::Forbidden(_))));

    reg.start(game, pid(1)).await.unwrap();
    let state = reg.snapshot(game).await.unwrap();
    assert_eq!(state.status, GameStatus::Active);
}

#[tokio::test]
async fn test_start_deals_each_table_size() {
    for n in 4..=7u64 {
        let reg = registry();
        let game = table(&reg, n).await;
        reg.start(game, pid(1)).await.unwrap();

        let state = reg.snapshot(game).await.unwrap();
        let cat = Catalogue::classic();
        let mut characters: Vec<&str> = state.seats.iter().filter_map(|s| s.character.as_deref()).collect();
        characters.sort_unstable();
        characters.dedup();
        assert_eq!(characters.len(), n as usize);
        assert_eq!(state.seats.iter().filter(|s| s.is_sheriff()).count(), 1);

        for seat in &state.seats {
            let name = seat.character.as_deref().unwrap();
            let base = cat.characters.iter().find(|c| c.name == name).unwrap().health;
            let bonus = u32::from(seat.is_sheriff());
            assert_eq!(seat.health, base + bonus);
        }
    }
}

#[tokio::test]
async fn test_custom_catalogue_with_matching_gateway_deals_its_characters() {
    let mut cat = Catalogue::classic();
    cat.characters = (1..=4)
        .map(|i| CharacterDef {
            name: format!("Drifter {i}"),
            description: String::new(),
            health: 5,
        })
        .collect();
    let reg = GameRegistry::new(
        InMemoryGateway::new(&cat),
        RoomBroadcaster::spawn(BroadcastConfig::default()),
    )
    .with_config(config())
    .with_catalogue(cat);
    let game = table(&reg, 4).await;

    reg.start(game, pid(1)).await.unwrap();

    let state = reg.snapshot(game).await.unwrap();
    for seat in &state.seats {
        let character = seat.character.as_deref().unwrap();
        assert!(character.starts_with("Drifter"), "dealt {character}");
        let expected = if seat.role.as_deref() == Some(SHERIFF) { 6 } else { 5 };
        assert_eq!(seat.health, expected);
    }
}

#[tokio::test]
async fn test_view_hides_secrets_from_other_players() {
    let reg = registry();
    let game = table(&reg, 4).await;
    reg.start(game, pid(1)).await.unwrap();
    reg.start_turn(game, pid(1)).await.unwrap();

    let mine = reg.view(game, pid(1)).await.unwrap();
    let theirs = reg.view(game, pid(2)).await.unwrap();

    assert_eq!(mine.hand.len(), 2);
    assert!(theirs.hand.is_empty());
    assert_eq!(theirs.seats[0].hand_size, 2);
    assert!(mine.seats[0].role.is_some());
    for seat in &theirs.seats[2..] {
        assert!(seat.role.is_none() || seat.role.as_deref() == Some("Sheriff"));
    }
}

// =========================================================================
// Turns
// =========================================================================

#[tokio::test]
async fn test_beer_scenario_reaches_only_its_room() {
    let reg = registry().with_catalogue(catalogue_opening_with(BEER));
    let game = table(&reg, 4).await;
    let other = table(&reg, 4).await;
    let mut room = listen(&reg, game, 1);
    let mut elsewhere = listen(&reg, other, 2);

    reg.start(game, pid(1)).await.unwrap();
    let before = reg.snapshot(game).await.unwrap();
    assert!(before.seats[0].hand.is_empty());

    reg.start_turn(game, pid(1)).await.unwrap();
    let after_draw = reg.snapshot(game).await.unwrap();
    assert_eq!(after_draw.seats[0].hand.len(), 2);
    assert_eq!(after_draw.deck.len(), before.deck.len() - 2);

    let beer = after_draw.seats[0].hand[0].clone();
    assert_eq!(beer.name, BEER);
    drain(&reg, &mut room).await;

    reg.play_card(game, pid(1), beer.id, None).await.unwrap();

    let after_play = reg.snapshot(game).await.unwrap();
    assert_eq!(after_play.seats[0].health, after_draw.seats[0].health + 1);

    let events = drain(&reg, &mut room).await;
    let effects: Vec<&GameEvent> = events
        .iter()
        .filter(|e| matches!(e, GameEvent::CardEffect(_)))
        .collect();
    assert_eq!(
        effects,
        vec![&GameEvent::CardEffect(EffectOutcome::Beer {
            player_id: pid(1),
            heal: 1,
        })]
    );
    assert!(drain(&reg, &mut elsewhere).await.is_empty());
}

#[tokio::test]
async fn test_bang_then_missed_through_registry() {
    let mut cat = Catalogue::classic();
    // Holder draws two Bang!s; seat 1 draws one Missed! and a Beer.
    cat.cards = vec![
        card_def(BANG, CardKind::Action, 2),
        card_def(MISSED, CardKind::Action, 1),
        card_def(BEER, CardKind::Action, 10),
    ];
    let reg = registry().with_catalogue(cat);
    let game = table(&reg, 4).await;
    reg.start(game, pid(1)).await.unwrap();
    reg.start_turn(game, pid(1)).await.unwrap();
    reg.end_turn(game, pid(1)).await.unwrap();
    reg.start_turn(game, pid(2)).await.unwrap();
    reg.end_turn(game, pid(2)).await.unwrap();
    for p in [3, 4] {
        reg.start_turn(game, pid(p)).await.unwrap();
        reg.end_turn(game, pid(p)).await.unwrap();
    }
    reg.start_turn(game, pid(1)).await.unwrap();

    let state = reg.snapshot(game).await.unwrap();
    let bangs: Vec<_> = state.seats[0]
        .hand
        .iter()
        .filter(|c| c.name == BANG)
        .map(|c| c.id)
        .collect();
    let target_health = state.seats[1].health;
    let mut rx = listen(&reg, game, 1);

    // First shot is dodged, second one lands.
    reg.play_card(game, pid(1), bangs[0], Some(pid(2))).await.unwrap();
    reg.play_card(game, pid(1), bangs[1], Some(pid(2))).await.unwrap();

    let state = reg.snapshot(game).await.unwrap();
    let target = state.seat(pid(2)).unwrap();
    assert_eq!(target.health, target_health - 1);
    assert!(target.hand.iter().all(|c| c.name != MISSED));

    let events = drain(&reg, &mut rx).await;
    assert!(matches!(
        events[1],
        GameEvent::CardEffect(EffectOutcome::Missed { successful: true, .. })
    ));
    assert!(matches!(
        events[3],
        GameEvent::CardEffect(EffectOutcome::Bang { damage: 1, .. })
    ));
}

#[tokio::test]
async fn test_jail_lands_on_target_board() {
    let reg = registry().with_catalogue(catalogue_opening_with(JAIL));
    let game = table(&reg, 4).await;
    reg.start(game, pid(1)).await.unwrap();
    reg.start_turn(game, pid(1)).await.unwrap();
    let jail = reg.snapshot(game).await.unwrap().seats[0].hand[0].id;

    reg.play_card(game, pid(1), jail, Some(pid(3))).await.unwrap();

    let state = reg.snapshot(game).await.unwrap();
    let board = &state.seat(pid(3)).unwrap().board;
    assert_eq!(board.len(), 1);
    assert_eq!(board[0].id, jail);
    let view = reg.view(game, pid(2)).await.unwrap();
    assert_eq!(view.seats[2].board[0].name, JAIL);
}

#[tokio::test]
async fn test_non_holder_actions_forbidden_and_harmless() {
    let reg = registry();
    let game = table(&reg, 4).await;
    reg.start(game, pid(1)).await.unwrap();
    reg.start_turn(game, pid(1)).await.unwrap();
    let before = reg.snapshot(game).await.unwrap();
    let card = before.seats[0].hand[0].id;
    let mut rx = listen(&reg, game, 1);

    let play = reg.play_card(game, pid(2), card, Some(pid(3))).await;
    let end = reg.end_turn(game, pid(3)).await;

    assert_eq!(play.unwrap_err().kind(), ErrorKind::Forbidden);
    assert_eq!(end.unwrap_err().kind(), ErrorKind::Forbidden);
    assert_eq!(reg.snapshot(game).await.unwrap(), before);
    assert!(drain(&reg, &mut rx).await.is_empty());
}

#[tokio::test]
async fn test_end_turn_wraps_to_first_seat() {
    let reg = registry();
    let game = table(&reg, 4).await;
    reg.start(game, pid(1)).await.unwrap();
    let mut rx = listen(&reg, game, 1);

    for p in 1..=4 {
        reg.end_turn(game, pid(p)).await.unwrap();
    }

    let ends: Vec<(PlayerId, PlayerId)> = drain(&reg, &mut rx)
        .await
        .into_iter()
        .filter_map(|e| match e {
            GameEvent::TurnEnded {
                previous_player_id,
                next_player_id,
            } => Some((previous_player_id, next_player_id)),
            _ => None,
        })
        .collect();
    assert_eq!(
        ends,
        vec![
            (pid(1), pid(2)),
            (pid(2), pid(3)),
            (pid(3), pid(4)),
            (pid(4), pid(1)),
        ]
    );
}

#[tokio::test]
async fn test_cards_are_conserved_over_many_turns() {
    let reg = registry();
    let game = table(&reg, 5).await;
    reg.start(game, pid(1)).await.unwrap();
    let total = Catalogue::classic().total_copies();

    for round in 0..30u64 {
        let holder = pid(round % 5 + 1);
        reg.start_turn(game, holder).await.unwrap();
        assert_eq!(reg.snapshot(game).await.unwrap().card_count(), total);

        let hand = reg.view(game, holder).await.unwrap().hand;
        reg.discard(game, holder, hand[0].id).await.unwrap();
        assert_eq!(reg.snapshot(game).await.unwrap().card_count(), total);

        reg.end_turn(game, holder).await.unwrap();
    }
}

#[tokio::test]
async fn test_concurrent_start_turn_only_one_wins() {
    let reg = Arc::new(registry());
    let game = table(&reg, 4).await;
    reg.start(game, pid(1)).await.unwrap();

    let mut tasks = Vec::new();
    for _ in 0..10 {
        let reg = Arc::clone(&reg);
        tasks.push(tokio::spawn(async move { reg.start_turn(game, pid(1)).await }));
    }
    let mut wins = 0;
    for task in tasks {
        if task.await.unwrap().is_ok() {
            wins += 1;
        }
    }

    assert_eq!(wins, 1);
    let state = reg.snapshot(game).await.unwrap();
    assert_eq!(state.seats[0].hand.len(), 2);
    assert_eq!(state.phase, Some(TurnPhase::Play));
}

#[tokio::test]
async fn test_concurrent_end_turn_advances_once() {
    let reg = Arc::new(registry());
    let game = table(&reg, 4).await;
    reg.start(game, pid(1)).await.unwrap();

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let reg = Arc::clone(&reg);
        tasks.push(tokio::spawn(async move { reg.end_turn(game, pid(1)).await }));
    }
    let mut wins = 0;
    for task in tasks {
        if task.await.unwrap().is_ok() {
            wins += 1;
        }
    }

    assert_eq!(wins, 1);
    assert_eq!(reg.snapshot(game).await.unwrap().current_player(), Some(pid(2)));
}

// =========================================================================
// Persistence
// =========================================================================

#[tokio::test]
async fn test_gateway_failure_leaves_state_and_room_untouched() {
    let reg = flaky_registry();
    let game = table(&reg, 4).await;
    reg.start(game, pid(1)).await.unwrap();
    let before = reg.snapshot(game).await.unwrap();
    let mut rx = listen(&reg, game, 1);

    reg.gateway().set_failing(true);
    let turn = reg.start_turn(game, pid(1)).await;
    let end = reg.end_turn(game, pid(1)).await;

    assert_eq!(turn.unwrap_err().kind(), ErrorKind::Internal);
    assert_eq!(end.unwrap_err().kind(), ErrorKind::Internal);
    assert_eq!(reg.snapshot(game).await.unwrap(), before);
    assert!(drain(&reg, &mut rx).await.is_empty());

    reg.gateway().set_failing(false);
    reg.start_turn(game, pid(1)).await.unwrap();
    assert_eq!(reg.snapshot(game).await.unwrap().seats[0].hand.len(), 2);
}

#[tokio::test]
async fn test_join_failed_save_leaves_no_record() {
    let reg = flaky_registry();
    let game = reg.create("High Noon", pid(1)).await.unwrap();
    let mut rx = listen(&reg, game, 1);

    reg.gateway().set_failing_saves(true);
    let result = reg.join(game, pid(2)).await;

    assert_eq!(result.unwrap_err().kind(), ErrorKind::Internal);
    assert_eq!(reg.snapshot(game).await.unwrap().seats.len(), 1);
    assert_eq!(reg.gateway().inner.records().unwrap().len(), 1);
    assert!(drain(&reg, &mut rx).await.is_empty());

    reg.gateway().set_failing_saves(false);
    reg.join(game, pid(2)).await.unwrap();
    let records = reg.gateway().inner.records().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].player_id, pid(2));
    assert_eq!(records[1].seat, 1);
}

#[tokio::test]
async fn test_join_failed_record_restores_stored_session() {
    let reg = flaky_registry();
    let game = reg.create("High Noon", pid(1)).await.unwrap();
    let mut rx = listen(&reg, game, 1);

    reg.gateway().set_failing_appends(true);
    let result = reg.join(game, pid(2)).await;

    assert_eq!(result.unwrap_err().kind(), ErrorKind::Internal);
    assert_eq!(reg.snapshot(game).await.unwrap().seats.len(), 1);
    let stored = reg.gateway().inner.load_session(game).await.unwrap().unwrap();
    assert_eq!(stored.seats.len(), 1);
    assert!(drain(&reg, &mut rx).await.is_empty());
}

#[tokio::test]
async fn test_create_failed_record_discards_game() {
    let reg = flaky_registry();
    reg.gateway().set_failing_appends(true);

    let result = reg.create("Ghost Town", pid(1)).await;

    assert_eq!(result.unwrap_err().kind(), ErrorKind::Internal);
    assert_eq!(reg.game_count().await, 0);
    assert_eq!(reg.gateway().inner.session_count().unwrap(), 0);
    assert_eq!(reg.get(GameId(1)).await.unwrap_err().kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_create_skips_ids_already_stored() {
    let gateway = Arc::new(InMemoryGateway::default());
    let first = GameRegistry::new(
        Arc::clone(&gateway),
        RoomBroadcaster::spawn(BroadcastConfig::default()),
    );
    let old = first.create("Old Town", pid(1)).await.unwrap();

    let second = GameRegistry::new(
        Arc::clone(&gateway),
        RoomBroadcaster::spawn(BroadcastConfig::default()),
    );
    let new = second.create("New Town", pid(2)).await.unwrap();

    assert_ne!(new, old);
    assert_eq!(gateway.session_count().unwrap(), 2);
    let kept = gateway.load_session(old).await.unwrap().unwrap();
    assert_eq!(kept.name, "Old Town");
    assert_eq!(kept.creator, pid(1));
}

#[tokio::test]
async fn test_with_first_id_sets_first_allocated_id() {
    let reg = registry().with_first_id(40);
    assert_eq!(reg.create("Yuma", pid(1)).await.unwrap(), GameId(40));
    assert_eq!(reg.create("Yuma", pid(1)).await.unwrap(), GameId(41));
}

#[tokio::test]
async fn test_get_rehydrates_from_gateway() {
    let gateway = Arc::new(InMemoryGateway::default());
    let first = GameRegistry::new(
        Arc::clone(&gateway),
        RoomBroadcaster::spawn(BroadcastConfig::default()),
    )
    .with_config(config());
    let game = table(&first, 4).await;
    first.start(game, pid(1)).await.unwrap();

    let second = GameRegistry::new(gateway, RoomBroadcaster::spawn(BroadcastConfig::default()))
        .with_config(config());
    assert_eq!(second.game_count().await, 0);

    let state = second.snapshot(game).await.unwrap();

    assert_eq!(state.status, GameStatus::Active);
    assert_eq!(state.seats.len(), 4);
    assert_eq!(second.game_count().await, 1);
}

// =========================================================================
// Deletion
// =========================================================================

#[tokio::test]
async fn test_delete_by_creator_notifies_and_closes_room() {
    let reg = registry();
    let game = table(&reg, 4).await;
    let mut rx = listen(&reg, game, 1);

    reg.delete(game, pid(1)).await.unwrap();

    assert_eq!(
        drain(&reg, &mut rx).await,
        vec![GameEvent::GameDeleted { game_id: game }]
    );
    assert_eq!(reg.broadcaster().subscriber_count(game).await.unwrap(), 0);
    assert_eq!(reg.game_count().await, 0);
    assert_eq!(reg.gateway().session_count().unwrap(), 0);
    assert!(matches!(reg.get(game).await, Err(GameError::NotFound(_))));
}

#[tokio::test]
async fn test_delete_by_other_player_forbidden() {
    let reg = registry();
    let game = table(&reg, 2).await;

    let result = reg.delete(game, pid(2)).await;

    assert!(matches!(result, Err(GameError::Forbidden(_))));
    assert_eq!(reg.game_count().await, 1);
}

#[tokio::test]
async fn test_delete_twice_not_found() {
    let reg = Arc::new(registry());
    let game = table(&reg, 2).await;

    let a = {
        let reg = Arc::clone(&reg);
        tokio::spawn(async move { reg.delete(game, pid(1)).await })
    };
    let b = {
        let reg = Arc::clone(&reg);
        tokio::spawn(async move { reg.delete(game, pid(1)).await })
    };
    let results = [a.await.unwrap(), b.await.unwrap()];

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        results
            .iter()
            .any(|r| matches!(r, Err(GameError::NotFound(_))))
    );
}
