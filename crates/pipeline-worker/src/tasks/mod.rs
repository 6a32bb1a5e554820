pub mod alpha;
pub mod ingest;
pub mod sentiment;
pub mod tickers;

#[cfg(test)]
pub(crate) mod testing;
