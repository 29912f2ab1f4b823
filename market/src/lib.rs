//! Market core: the bounded price history shared between feed writers and
//! analysis readers, and the strategy engine that turns a history snapshot
//! into trading signals.

pub mod history;
pub mod signal;

pub use history::{HistorySnapshot, HistoryStatus, PriceHistory};
pub use signal::{AnalysisResult, Consensus, Direction, Signal, analyze_all};
