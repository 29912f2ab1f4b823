use std::collections::HashMap;
use std::sync::Arc;

use market::PriceHistory;

use crate::config::AppConfig;

/// Label used for the single ring in shared mode.
pub const SHARED_LABEL: &str = "shared";

/// Maps product ids to the price history their ticks are written into.
///
/// In shared mode every product resolves to the same ring; otherwise each
/// product owns one. Cloning is cheap and all clones see the same rings.
#[derive(Clone)]
pub struct HistoryRegistry {
    by_product: HashMap<String, Arc<PriceHistory>>,
    /// Distinct rings with their label, in registration order.
    distinct: Vec<(String, Arc<PriceHistory>)>,
}

impl HistoryRegistry {
    /// One ring shared by every product.
    pub fn shared<S: AsRef<str>>(products: &[S], capacity: usize) -> Self {
        let ring = Arc::new(PriceHistory::new(capacity));
        let by_product = products
            .iter()
            .map(|p| (p.as_ref().to_string(), Arc::clone(&ring)))
            .collect();

        Self {
            by_product,
            distinct: vec![(SHARED_LABEL.to_string(), ring)],
        }
    }

    /// One ring per product.
    pub fn per_product<S: AsRef<str>>(products: &[S], capacity: usize) -> Self {
        let mut by_product = HashMap::new();
        let mut distinct = Vec::new();

        for p in products {
            let p = p.as_ref().to_string();
            if by_product.contains_key(&p) {
                continue;
            }
            let ring = Arc::new(PriceHistory::new(capacity));
            by_product.insert(p.clone(), Arc::clone(&ring));
            distinct.push((p, ring));
        }

        Self {
            by_product,
            distinct,
        }
    }

    pub fn from_config(cfg: &AppConfig) -> Self {
        if cfg.shared_history {
            Self::shared(&cfg.products, cfg.history_capacity)
        } else {
            Self::per_product(&cfg.products, cfg.history_capacity)
        }
    }

    pub fn get(&self, product: &str) -> Option<&Arc<PriceHistory>> {
        self.by_product.get(product)
    }

    /// Each distinct ring once, with its label.
    pub fn histories(&self) -> &[(String, Arc<PriceHistory>)] {
        &self.distinct
    }

    pub fn products(&self) -> impl Iterator<Item = &str> {
        self.by_product.keys().map(String::as_str)
    }
}
