//! Market engine
//!
//! Maintains the single traded-asset price: ingests buy/sell volume,
//! ticks the price from volume pressure plus bounded random volatility,
//! applies instantaneous shocks from system events, and synthesizes an
//! order-book facade for display.
//!
//! Every price movement - tick or shock - is clamped to the configured
//! per-application cap and floored at 0.01, so the price can never reach
//! zero no matter what the event catalogue asks for.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::errors::{EngineError, EngineResult};
use crate::models::state::PriceRecord;
use crate::notice::Notice;
use crate::rng::RngManager;
use crate::store::GameStore;

/// One side level of the synthetic order book.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookLevel {
    pub price: f64,
    pub quantity: f64,
}

/// Synthetic bid/ask ladders around the current price.
///
/// Display only: there is no real liquidity behind these levels and they
/// must never be used to settle anything.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderBook {
    pub bids: Vec<BookLevel>,
    pub asks: Vec<BookLevel>,
    pub spread: f64,
}

/// Engine owning price movement and the trading freeze flag.
#[derive(Debug)]
pub struct MarketEngine {
    store: Arc<GameStore>,
    config: GameConfig,
    rng: Mutex<RngManager>,
}

fn round_price(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl MarketEngine {
    pub fn new(store: Arc<GameStore>, config: GameConfig, rng: RngManager) -> Self {
        Self {
            store,
            config,
            rng: Mutex::new(rng),
        }
    }

    /// Accumulate trade volume for the open pricing period.
    ///
    /// Rejected while trading is frozen; no side effects beyond the
    /// volume accounting.
    pub async fn record_trade(&self, amount: i64, is_buy: bool) -> EngineResult<()> {
        if amount <= 0 {
            return Err(EngineError::validation("trade volume must be positive"));
        }
        let mut world = self.store.write().await;
        if world.game_state.trading_frozen {
            return Err(EngineError::rule("trading is currently frozen"));
        }
        if is_buy {
            world.market.buy_volume += amount;
        } else {
            world.market.sell_volume += amount;
        }
        Ok(())
    }

    /// Advance the price one period.
    ///
    /// `pressure = (buy - sell) / (buy + sell) * 0.05` (zero with no
    /// volume), plus a volatility draw from the configured range; the sum
    /// is clamped to the per-application cap before being applied. The
    /// period volumes reset afterwards. No-op while frozen.
    pub async fn tick(&self) -> EngineResult<f64> {
        let volatility = {
            let mut rng = self.rng.lock().expect("rng mutex poisoned");
            let (lo, hi) = self.config.volatility_range;
            rng.uniform(lo, hi)
        };

        let mut world = self.store.write().await;
        if world.game_state.trading_frozen {
            tracing::debug!("price tick skipped: trading frozen");
            return Ok(world.market.price);
        }

        let buy = world.market.buy_volume as f64;
        let sell = world.market.sell_volume as f64;
        let total = buy + sell;
        let pressure = if total > 0.0 {
            (buy - sell) / total * 0.05
        } else {
            0.0
        };

        let cap = self.config.max_price_change;
        let change = (pressure + volatility).clamp(-cap, cap);

        let old_price = world.market.price;
        let new_price = round_price((old_price * (1.0 + change)).max(0.01));

        let at_secs = world.game_state.elapsed_secs;
        let record = PriceRecord {
            price: new_price,
            buy_volume: world.market.buy_volume,
            sell_volume: world.market.sell_volume,
            pressure,
            volatility,
            event_label: None,
            at_secs,
        };
        let volume = world.market.total_volume();
        world.price_log.push(record);
        world.market.price = new_price;
        world.market.reset_volume();
        drop(world);

        let change_pct = if old_price > 0.0 {
            (new_price - old_price) / old_price
        } else {
            0.0
        };
        self.store.publish(Notice::PriceUpdate {
            price: new_price,
            change_pct,
            volume,
        });
        tracing::info!(
            old_price,
            new_price,
            pressure,
            volatility,
            "price tick applied"
        );
        Ok(new_price)
    }

    /// Apply an instantaneous shock, independent of the periodic tick.
    ///
    /// The requested fraction is clamped to the per-application cap; the
    /// price is floored at 0.01 and the shock is logged with its label.
    pub async fn apply_shock(&self, percent: f64, label: &str) -> EngineResult<f64> {
        let cap = self.config.max_price_change;
        let clamped = percent.clamp(-cap, cap);

        let mut world = self.store.write().await;
        let old_price = world.market.price;
        let new_price = round_price((old_price * (1.0 + clamped)).max(0.01));
        let at_secs = world.game_state.elapsed_secs;
        world.price_log.push(PriceRecord {
            price: new_price,
            buy_volume: 0,
            sell_volume: 0,
            pressure: 0.0,
            volatility: clamped,
            event_label: Some(label.to_string()),
            at_secs,
        });
        world.market.price = new_price;
        drop(world);

        let change_pct = if old_price > 0.0 {
            (new_price - old_price) / old_price
        } else {
            0.0
        };
        self.store.publish(Notice::PriceUpdate {
            price: new_price,
            change_pct,
            volume: 0,
        });
        tracing::info!(label, old_price, new_price, clamped, "price shock applied");
        Ok(new_price)
    }

    /// Halt trading and price updates.
    pub async fn freeze(&self) {
        let mut world = self.store.write().await;
        world.game_state.trading_frozen = true;
        drop(world);
        self.store.publish(Notice::TradingFrozen);
        tracing::warn!("trading frozen");
    }

    /// Resume trading, resetting period volumes.
    ///
    /// Idempotent: safe to call even when no freeze is in effect, so the
    /// shutdown path can always run it as a compensating action.
    pub async fn unfreeze(&self) {
        let mut world = self.store.write().await;
        let was_frozen = world.game_state.trading_frozen;
        world.game_state.trading_frozen = false;
        world.market.reset_volume();
        drop(world);
        if was_frozen {
            self.store.publish(Notice::TradingResumed);
            tracing::info!("trading resumed, volumes reset");
        }
    }

    /// The live price.
    pub async fn current_price(&self) -> f64 {
        self.store.read().await.market.price
    }

    pub async fn is_frozen(&self) -> bool {
        self.store.read().await.game_state.trading_frozen
    }

    /// Recent price records, newest first.
    pub async fn price_history(&self, limit: usize) -> Vec<PriceRecord> {
        let limit = limit.clamp(1, 500);
        let world = self.store.read().await;
        world.price_log.iter().rev().take(limit).cloned().collect()
    }

    /// Synthesize bid/ask ladders around the current price.
    ///
    /// Bids fan downward and asks upward with jittered spacing and
    /// quantities that taper away from the touch. Purely illustrative.
    pub async fn order_book(&self, depth: usize) -> OrderBook {
        let depth = depth.clamp(1, 25);
        let price = self.store.read().await.market.price;
        let tick = (round_price(price * 0.001)).max(0.01);

        let mut rng = self.rng.lock().expect("rng mutex poisoned");
        let mut bids = Vec::with_capacity(depth);
        let mut asks = Vec::with_capacity(depth);

        for level in 1..=depth {
            let jitter = rng.uniform(0.8, 1.2);
            let offset = tick * level as f64 * jitter;
            let taper = (1.0 - level as f64 / (depth + 1) as f64).max(0.1);
            let base_qty = rng.uniform(0.05, 0.5);

            bids.push(BookLevel {
                price: round_price((price - offset).max(0.01)),
                quantity: base_qty * taper * rng.uniform(0.8, 1.2),
            });
            asks.push(BookLevel {
                price: round_price(price + offset),
                quantity: base_qty * taper * rng.uniform(0.8, 1.2),
            });
        }

        bids.sort_by(|a, b| b.price.partial_cmp(&a.price).expect("finite prices"));
        asks.sort_by(|a, b| a.price.partial_cmp(&b.price).expect("finite prices"));

        let spread = match (bids.first(), asks.first()) {
            (Some(bid), Some(ask)) => round_price(ask.price - bid.price),
            _ => 0.0,
        };

        OrderBook { bids, asks, spread }
    }
}
