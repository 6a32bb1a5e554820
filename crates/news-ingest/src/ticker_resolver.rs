use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::universe::{UniverseEntry, TRACKED_UNIVERSE};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub entity: String,
    pub ticker: Option<String>,
}

/// Maps organization mentions to tracked tickers through the alias table.
///
/// Resolution order:
/// 1. exact case-insensitive alias match;
/// 2. aliases contained in the entity, longest alias wins;
/// 3. aliases containing the entity, shortest alias wins.
///
/// Ties keep universe order, so results never depend on map iteration.
#[derive(Debug, Clone)]
pub struct TickerResolver {
    exact: HashMap<String, String>,
    /// `(alias_lowercase, ticker)` in universe order
    aliases: Vec<(String, String)>,
}

impl Default for TickerResolver {
    fn default() -> Self {
        Self::from_entries(TRACKED_UNIVERSE)
    }
}

impl TickerResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: &[UniverseEntry]) -> Self {
        let mut exact = HashMap::new();
        let mut aliases = Vec::new();
        for entry in entries {
            for alias in entry.aliases {
                let key = alias.trim().to_lowercase();
                if key.is_empty() {
                    continue;
                }
                exact
                    .entry(key.clone())
                    .or_insert_with(|| entry.ticker.to_string());
                aliases.push((key, entry.ticker.to_string()));
            }
        }
        tracing::debug!(
            "TickerResolver initialized with {} aliases for {} tickers",
            exact.len(),
            entries.len()
        );
        Self { exact, aliases }
    }

    pub fn alias_count(&self) -> usize {
        self.exact.len()
    }

    pub fn resolve(&self, entity: &str) -> Option<&str> {
        let candidate = entity.trim().to_lowercase();
        if candidate.is_empty() {
            return None;
        }

        if let Some(ticker) = self.exact.get(&candidate) {
            return Some(ticker.as_str());
        }

        // Entity mentions a known alias, e.g. "Tata Motors Ltd".
        let mut best: Option<&(String, String)> = None;
        for pair in self.aliases.iter().filter(|(alias, _)| candidate.contains(alias.as_str())) {
            if best.map_or(true, |(b, _)| pair.0.len() > b.len()) {
                best = Some(pair);
            }
        }
        if let Some((_, ticker)) = best {
            return Some(ticker.as_str());
        }

        // Entity is a fragment of a known alias, e.g. "Tata Consult".
        let mut best: Option<&(String, String)> = None;
        for pair in self.aliases.iter().filter(|(alias, _)| alias.contains(candidate.as_str())) {
            if best.map_or(true, |(b, _)| pair.0.len() < b.len()) {
                best = Some(pair);
            }
        }
        best.map(|(_, ticker)| ticker.as_str())
    }

    /// Resolve each entity, preserving input order and length.
    pub fn resolve_all<S: AsRef<str>>(&self, entities: &[S]) -> Vec<Resolution> {
        entities
            .iter()
            .map(|e| Resolution {
                entity: e.as_ref().to_string(),
                ticker: self.resolve(e.as_ref()).map(str::to_string),
            })
            .collect()
    }
}
