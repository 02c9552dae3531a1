//! Scheduler (orchestrator)
//!
//! Owns one instance of every engine and the run lifecycle. `start`
//! launches six concurrent loops on the tokio runtime:
//!
//! 1. price tick - advance the market every pricing period
//! 2. action dispatch - per-actor decision cadence through the policy
//! 3. event check - clock persistence, scripted events, eliminations,
//!    staking bonuses, and clock-driven termination
//! 4. settlement sweep - matured leverage positions, expired blackmail
//! 5. defection sweep - matured alliance betrayals
//! 6. snapshot - periodic ranked balance snapshots
//!
//! Every loop selects on a shared shutdown watch channel, so `stop`
//! drains them between operations - never mid-transaction. Delayed
//! compensating timers (breach auto-unfreeze, tribunal resolution) also
//! select on shutdown and run their compensation before exiting: a run
//! that stops early can never leave trading stuck frozen.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::actions::{dispatch, perceive, DecisionPolicy, EngineSet};
use crate::alliance::AllianceEngine;
use crate::config::GameConfig;
use crate::core::clock::{GameClock, GamePhase};
use crate::covert::CovertMarketEngine;
use crate::events::EventsEngine;
use crate::market::MarketEngine;
use crate::models::actor::Actor;
use crate::models::event::{EventKind, SystemEvent};
use crate::models::state::{PriceRecord, World};
use crate::notice::Notice;
use crate::reputation::ReputationEngine;
use crate::rng::RngManager;
use crate::social::SocialEngine;
use crate::store::GameStore;
use crate::trading::TradingEngine;

/// One seat definition at game start.
#[derive(Debug, Clone)]
pub struct ActorSeed {
    pub id: String,
    pub hidden_goal: String,
}

/// The standard ten-seat roster.
pub fn default_seeds() -> Vec<ActorSeed> {
    [
        ("vega", "end the game holding the largest balance"),
        ("rigel", "betray an alliance and get away with it"),
        ("altair", "never drop below the starting balance"),
        ("deneb", "finish with the highest reputation"),
        ("sirius", "profit from every market crash"),
        ("capella", "broker more trades than anyone else"),
        ("antares", "bankrupt a specific rival"),
        ("spica", "win without ever being blackmailed"),
        ("polaris", "control the largest alliance treasury"),
        ("mimosa", "survive to the final hour unnoticed"),
    ]
    .into_iter()
    .map(|(id, goal)| ActorSeed {
        id: id.to_string(),
        hidden_goal: goal.to_string(),
    })
    .collect()
}

/// Coordinator for the whole run.
pub struct Scheduler {
    config: GameConfig,
    engines: EngineSet,
    policy: Arc<dyn DecisionPolicy>,
    rng: StdMutex<RngManager>,

    running: Arc<AtomicBool>,
    shutdown: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
    timers: Arc<StdMutex<Vec<JoinHandle<()>>>>,
}

impl Scheduler {
    /// Build the world, the store, and one instance of every engine.
    /// Nothing runs until `start`.
    pub fn new(config: GameConfig, seeds: Vec<ActorSeed>, policy: Arc<dyn DecisionPolicy>) -> Self {
        assert!(!seeds.is_empty(), "at least one actor seed is required");

        let actors: Vec<Actor> = seeds
            .iter()
            .map(|seed| {
                let mut actor = Actor::new(
                    seed.id.clone(),
                    config.starting_balance,
                    config.starting_reputation,
                );
                actor.hidden_goal = seed.hidden_goal.clone();
                actor
            })
            .collect();

        let world = World::new(actors, config.starting_price, config.trade_fee);
        let store = GameStore::new(world);

        let engines = EngineSet {
            store: store.clone(),
            market: Arc::new(MarketEngine::new(
                store.clone(),
                config.clone(),
                RngManager::new(config.rng_seed ^ 0x01),
            )),
            trading: Arc::new(TradingEngine::new(store.clone(), config.clone())),
            alliance: Arc::new(AllianceEngine::new(store.clone(), config.clone())),
            covert: Arc::new(CovertMarketEngine::new(
                store.clone(),
                config.clone(),
                RngManager::new(config.rng_seed ^ 0x02),
            )),
            social: Arc::new(SocialEngine::new(store.clone(), config.clone())),
            events: Arc::new(EventsEngine::new(store.clone(), config.clone())),
            reputation: Arc::new(ReputationEngine::new(store.clone())),
        };

        let (shutdown, _) = watch::channel(false);
        Self {
            rng: StdMutex::new(RngManager::new(config.rng_seed ^ 0x03)),
            config,
            engines,
            policy,
            running: Arc::new(AtomicBool::new(false)),
            shutdown,
            tasks: Vec::new(),
            timers: Arc::new(StdMutex::new(Vec::new())),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Shared store handle, for observers and tests.
    pub fn store(&self) -> Arc<GameStore> {
        self.engines.store.clone()
    }

    /// The engine bundle, for the admin surface and tests.
    pub fn engines(&self) -> EngineSet {
        self.engines.clone()
    }

    /// Completes when the run has been asked to stop (clock expiry or
    /// an explicit `stop`).
    pub fn shutdown_watch(&self) -> watch::Receiver<bool> {
        self.shutdown.subscribe()
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Initialise state and launch all six loops.
    pub async fn start(&mut self) {
        if self.running.swap(true, Ordering::SeqCst) {
            tracing::warn!("start called but the game is already running");
            return;
        }
        let _ = self.shutdown.send(false);

        let clock = GameClock::start(self.config.duration_hours, self.config.secs_per_hour);
        let unix_now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        {
            let mut world = self.engines.store.write().await;
            world.game_state.active = true;
            world.game_state.phase = GamePhase::Accumulation.label().to_string();
            world.game_state.started_unix = Some(unix_now);
            world.game_state.ends_unix =
                Some(unix_now + self.config.duration_hours as u64 * self.config.secs_per_hour);
            let price = world.market.price;
            world.price_log.push(PriceRecord {
                price,
                buy_volume: 0,
                sell_volume: 0,
                pressure: 0.0,
                volatility: 0.0,
                event_label: Some("game_start".to_string()),
                at_secs: 0,
            });
        }
        self.engines.events.seed_events().await;

        let actor_count = self.engines.store.read().await.actors.len();
        self.engines.store.publish(Notice::GameStarted {
            duration_hours: self.config.duration_hours,
            actor_count,
        });
        tracing::info!(
            duration_hours = self.config.duration_hours,
            actor_count,
            "game starting"
        );

        self.tasks = vec![
            self.spawn_price_loop(),
            self.spawn_decision_loop(),
            self.spawn_event_loop(clock),
            self.spawn_settlement_loop(),
            self.spawn_defection_loop(),
            self.spawn_snapshot_loop(),
        ];
    }

    /// Stop every loop, drain the delayed timers, and finalise state.
    ///
    /// Safe to call twice; also runs the unfreeze compensation so a
    /// breach freeze can never outlive the run.
    pub async fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        tracing::info!("game stopping");
        let _ = self.shutdown.send(true);

        for task in self.tasks.drain(..) {
            if let Err(err) = task.await {
                if !err.is_cancelled() {
                    tracing::error!(%err, "loop task failed during shutdown");
                }
            }
        }
        let timers: Vec<JoinHandle<()>> = {
            let mut timers = self.timers.lock().expect("timer mutex poisoned");
            timers.drain(..).collect()
        };
        for timer in timers {
            if let Err(err) = timer.await {
                if !err.is_cancelled() {
                    tracing::error!(%err, "timer task failed during shutdown");
                }
            }
        }

        // Compensating action: never leave trading stuck frozen.
        self.engines.market.unfreeze().await;

        {
            let mut world = self.engines.store.write().await;
            world.game_state.active = false;
            world.game_state.phase = GamePhase::PostGame.label().to_string();
        }
        self.engines.store.publish(Notice::GameEnded);
        tracing::info!("game stopped");
    }

    // ── Loops ────────────────────────────────────────────────────────

    fn wall_interval(&self, secs: u64) -> Duration {
        // Scheduler cadences are defined against a real-time game;
        // compressed demo runs shrink them proportionally.
        let scaled = secs * self.config.secs_per_hour / 3600;
        Duration::from_secs(scaled.max(1))
    }

    fn spawn_price_loop(&self) -> JoinHandle<()> {
        let market = self.engines.market.clone();
        let mut shutdown = self.shutdown.subscribe();
        let period = self.wall_interval(self.config.price_tick_interval_secs);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(err) = market.tick().await {
                            tracing::error!(%err, "price tick failed");
                        }
                    }
                    _ = shutdown.changed() => break,
                }
            }
            tracing::debug!("price loop stopped");
        })
    }

    fn spawn_decision_loop(&self) -> JoinHandle<()> {
        let engines = self.engines.clone();
        let policy = self.policy.clone();
        let mut shutdown = self.shutdown.subscribe();
        let (lo, hi) = self.config.decision_interval_secs;
        let cadence_lo = self.wall_interval(lo);
        let cadence_hi = self.wall_interval(hi.max(lo + 1));
        let mut rng = {
            let seed = self.rng.lock().expect("rng mutex poisoned").next_u64();
            RngManager::new(seed)
        };

        tokio::spawn(async move {
            let mut next_due: HashMap<String, Instant> = HashMap::new();
            let mut ticker = tokio::time::interval(Duration::from_secs(2));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = shutdown.changed() => break,
                }

                let actor_ids: Vec<String> = {
                    let world = engines.store.read().await;
                    world.active_actors().map(|a| a.id().to_string()).collect()
                };
                let now = Instant::now();
                for actor_id in actor_ids {
                    if let Some(due) = next_due.get(&actor_id) {
                        if now < *due {
                            continue;
                        }
                    }
                    if let Some(view) = perceive(&engines.store, &actor_id).await {
                        let request = policy.decide(&view);
                        let outcome = dispatch(&engines, &actor_id, request).await;
                        if !outcome.success {
                            tracing::debug!(
                                actor_id = %outcome.actor_id,
                                action = outcome.action,
                                reason = %outcome.message,
                                "action refused"
                            );
                        }
                    }
                    // Jittered cadence keeps actors from deciding in
                    // lockstep.
                    let span_ms = (cadence_hi.as_millis() as i64
                        - cadence_lo.as_millis() as i64)
                        .max(1);
                    let offset = rng.range_i64(0, span_ms) as u64;
                    next_due.insert(actor_id, now + cadence_lo + Duration::from_millis(offset));
                }
            }
            tracing::debug!("decision loop stopped");
        })
    }

    fn spawn_event_loop(&self, clock: GameClock) -> JoinHandle<()> {
        let engines = self.engines.clone();
        let config = self.config.clone();
        let shutdown_tx = self.shutdown.clone();
        let mut shutdown = self.shutdown.subscribe();
        let timers = self.timers.clone();
        let running = self.running.clone();
        let period = self.wall_interval(config.event_check_interval_secs);
        let mut rng = {
            let seed = self.rng.lock().expect("rng mutex poisoned").next_u64();
            RngManager::new(seed)
        };

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut last_staking_boundary = 0u32;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = shutdown.changed() => break,
                }

                let hour = clock.current_hour();
                let game_secs = clock.game_secs();

                // Persist the clock into the game state; everything
                // downstream (gates, deadlines, sweeps) reads from there.
                {
                    let mut world = engines.store.write().await;
                    world.game_state.current_hour = hour;
                    world.game_state.elapsed_secs = game_secs;
                    world.game_state.phase = GamePhase::for_hour(hour, config.duration_hours)
                        .label()
                        .to_string();
                }

                // Scripted events due this hour. One failed event must
                // not block the rest.
                for event in engines.events.pending_events(hour).await {
                    match engines.events.trigger_event(event.id()).await {
                        Ok(payload) => {
                            engines.store.publish(Notice::SystemEvent {
                                event: payload.kind.label().to_string(),
                                description: payload.description.clone(),
                                price_impact: payload.price_impact,
                            });
                            apply_event_effects(
                                &engines,
                                &config,
                                &timers,
                                &shutdown_tx,
                                &mut rng,
                                &payload,
                                hour,
                            )
                            .await;
                        }
                        Err(err) => {
                            tracing::warn!(event_id = event.id(), %err, "event trigger skipped")
                        }
                    }
                }

                // Elimination checkpoints are idempotent per hour.
                match engines.events.run_elimination(hour).await {
                    Ok(Some(elimination)) => {
                        tracing::warn!(
                            victim = %elimination.actor_id,
                            hour,
                            "checkpoint elimination"
                        );
                    }
                    Ok(None) => {}
                    Err(err) => tracing::error!(%err, hour, "elimination checkpoint failed"),
                }

                // Staking bonuses on every staking-interval boundary.
                let boundary =
                    (hour / config.staking_interval_hours) * config.staking_interval_hours;
                if boundary > 0 && boundary != last_staking_boundary {
                    last_staking_boundary = boundary;
                    for alliance in engines.alliance.list_active().await {
                        if let Err(err) = engines.alliance.apply_staking_bonus(alliance.id()).await
                        {
                            tracing::debug!(
                                alliance_id = alliance.id(),
                                %err,
                                "staking bonus skipped"
                            );
                        }
                    }
                }

                // Clock-driven termination.
                if clock.is_expired() {
                    tracing::info!("game duration expired");
                    running.store(false, Ordering::SeqCst);
                    {
                        let mut world = engines.store.write().await;
                        world.game_state.active = false;
                        world.game_state.phase = GamePhase::PostGame.label().to_string();
                    }
                    engines.store.publish(Notice::GameEnded);
                    let _ = shutdown_tx.send(true);
                    break;
                }
            }
            tracing::debug!("event loop stopped");
        })
    }

    fn spawn_settlement_loop(&self) -> JoinHandle<()> {
        let engines = self.engines.clone();
        let mut shutdown = self.shutdown.subscribe();
        let period = self.wall_interval(self.config.sweep_interval_secs);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = shutdown.changed() => break,
                }
                let price = engines.market.current_price().await;
                let settled = engines.trading.settle_due_positions(price).await;
                if !settled.is_empty() {
                    tracing::info!(count = settled.len(), price, "leverage positions settled");
                }
                engines.covert.sweep_expired_blackmail().await;
            }
            tracing::debug!("settlement loop stopped");
        })
    }

    fn spawn_defection_loop(&self) -> JoinHandle<()> {
        let engines = self.engines.clone();
        let mut shutdown = self.shutdown.subscribe();
        let period = self.wall_interval(self.config.sweep_interval_secs);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = shutdown.changed() => break,
                }
                let executed = engines.alliance.check_pending_defections().await;
                for defection in executed {
                    tracing::warn!(
                        alliance_id = %defection.alliance_id,
                        betrayer = %defection.betrayer_id,
                        stolen = defection.stolen,
                        "defection executed by sweep"
                    );
                }
            }
            tracing::debug!("defection loop stopped");
        })
    }

    fn spawn_snapshot_loop(&self) -> JoinHandle<()> {
        let engines = self.engines.clone();
        let mut shutdown = self.shutdown.subscribe();
        let period = self.wall_interval(self.config.price_tick_interval_secs);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = shutdown.changed() => break,
                }
                let hour = engines.store.current_hour().await;
                engines.events.take_snapshot(hour).await;
            }
            tracing::debug!("snapshot loop stopped");
        })
    }
}

/// Dispatch event-kind-specific side effects. The events engine only
/// returns the payload; this is where the scheduler routes it to the
/// market and trading engines.
async fn apply_event_effects(
    engines: &EngineSet,
    config: &GameConfig,
    timers: &Arc<StdMutex<Vec<JoinHandle<()>>>>,
    shutdown: &watch::Sender<bool>,
    rng: &mut RngManager,
    event: &SystemEvent,
    hour: u32,
) {
    tracing::info!(kind = event.kind.label(), description = %event.description, "system event");

    match event.kind {
        EventKind::WhaleAlert
        | EventKind::FlashCrash
        | EventKind::FinalPump
        | EventKind::FakeLeak
        | EventKind::Custom => {
            if let Some(impact) = event.price_impact {
                if let Err(err) = engines.market.apply_shock(impact, event.kind.label()).await {
                    tracing::error!(%err, "shock application failed");
                }
            }
        }
        EventKind::SecurityBreach | EventKind::TradingFreeze => {
            engines.market.freeze().await;
            let minutes = event.duration_minutes.unwrap_or(30);
            let delay = game_minutes_to_wall(minutes, config);
            let market = engines.market.clone();
            let mut shutdown_rx = shutdown.subscribe();
            let handle = tokio::spawn(async move {
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = shutdown_rx.changed() => {}
                }
                // Unfreeze either way: the timer firing and the run
                // stopping both end the freeze.
                market.unfreeze().await;
            });
            timers.lock().expect("timer mutex poisoned").push(handle);
        }
        EventKind::FeeIncrease => {
            if let Err(err) = engines.events.set_fee_rate(8).await {
                tracing::error!(%err, "fee increase failed");
            }
            if let Some(impact) = event.price_impact {
                let _ = engines.market.apply_shock(impact, event.kind.label()).await;
            }
        }
        EventKind::MarginCall => {
            match engines.trading.liquidate_all().await {
                Ok(count) => tracing::warn!(count, "margin call liquidation"),
                Err(err) => tracing::error!(%err, "margin call failed"),
            }
            if let Some(impact) = event.price_impact {
                let _ = engines.market.apply_shock(impact, event.kind.label()).await;
            }
        }
        EventKind::Tribunal => {
            let minutes = event.duration_minutes.unwrap_or(30);
            let delay = game_minutes_to_wall(minutes, config);
            let events = engines.events.clone();
            let mut shutdown_rx = shutdown.subscribe();
            let handle = tokio::spawn(async move {
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = shutdown_rx.changed() => {}
                }
                // Resolve even on early shutdown so cast votes are
                // never silently discarded.
                match events.resolve_tribunal(hour).await {
                    Ok(Some(outcome)) => {
                        tracing::warn!(
                            target = %outcome.target_id,
                            votes = outcome.votes,
                            "tribunal verdict"
                        )
                    }
                    Ok(None) => tracing::info!("tribunal closed with no votes"),
                    Err(err) => tracing::error!(%err, "tribunal resolution failed"),
                }
            });
            timers.lock().expect("timer mutex poisoned").push(handle);
        }
        EventKind::Gaslighting => {
            // A fabricated balance notice whispered to a random target,
            // apparently from a random peer.
            let actors: Vec<(String, i64)> = {
                let world = engines.store.read().await;
                world
                    .active_actors()
                    .map(|a| (a.id().to_string(), a.balance()))
                    .collect()
            };
            if actors.len() < 2 {
                return;
            }
            let target = actors[rng.pick(actors.len())].clone();
            let sender = loop {
                let candidate = &actors[rng.pick(actors.len())];
                if candidate.0 != target.0 {
                    break candidate.0.clone();
                }
            };
            let fake_balance = (target.1 as f64 * rng.uniform(0.3, 0.7)) as i64;
            let message = format!(
                "SYSTEM NOTICE: balance correction applied, your adjusted balance is {fake_balance}"
            );
            if let Err(err) = engines
                .social
                .send_whisper(&sender, &target.0, &message)
                .await
            {
                tracing::debug!(%err, "gaslighting whisper skipped");
            }
        }
    }
}

fn game_minutes_to_wall(minutes: u32, config: &GameConfig) -> Duration {
    let wall_secs = minutes as u64 * config.secs_per_hour / 60;
    Duration::from_secs(wall_secs.max(1))
}
