use std::collections::BTreeMap;

use bullet_trade_market_data::{SecurityCode, Tick};

/// Subscribed securities and their latest ticks.
#[derive(Clone, Debug, Default)]
pub struct TickBook {
    entries: BTreeMap<SecurityCode, Option<Tick>>,
}

impl TickBook {
    /// Subscribe, keeping any tick already held unless `seed` is given.
    pub fn subscribe(&mut self, security: SecurityCode, seed: Option<Tick>) {
        let slot = self.entries.entry(security).or_default();
        if seed.is_some() {
            *slot = seed;
        }
    }

    pub fn unsubscribe(&mut self, security: &SecurityCode) -> bool {
        self.entries.remove(security).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_subscribed(&self, security: &SecurityCode) -> bool {
        self.entries.contains_key(security)
    }

    pub fn latest(&self, security: &SecurityCode) -> Option<&Tick> {
        self.entries.get(security).and_then(Option::as_ref)
    }

    /// Store a tick for a subscribed security. Returns false otherwise.
    pub fn record(&mut self, tick: Tick) -> bool {
        match self.entries.get_mut(&tick.security) {
            Some(slot) => {
                *slot = Some(tick);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
