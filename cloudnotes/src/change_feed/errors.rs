use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChangeFeedError {
    #[error("change feed lagged, {0} events were dropped")]
    Overflow(u64),
}
