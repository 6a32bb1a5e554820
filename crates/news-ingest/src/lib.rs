//! Article admission and ticker tagging.

pub mod dedup;
pub mod ingest;
pub mod tagging;
pub mod text_cleaner;
pub mod ticker_resolver;
pub mod universe;

pub use dedup::{
    article_content_hash, best_title_match, content_hash, is_fuzzy_duplicate, title_similarity,
    DedupConfig, DedupDecision, Deduplicator,
};
pub use ingest::{IngestOutcome, Ingestor};
pub use tagging::{explicit_tickers, AliasScanExtractor, TickerTagger, MENTION_RELEVANCE};
pub use ticker_resolver::{Resolution, TickerResolver};
pub use universe::{tracked_stocks, UniverseEntry, TRACKED_SECTORS, TRACKED_UNIVERSE};
