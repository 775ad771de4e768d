use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A per-shard execution failure, annotated with the offending
    /// data-source name.
    #[error("execution failed on \"{data_source}\": {message}")]
    Exec { data_source: String, message: String },

    /// An `in_transaction` call produced more than one `RewriteResult`
    /// A corrected behavior relative to silently
    /// fanning out a transactional statement across shards.
    #[error("in-transaction call fanned out to {0} shards; cross-shard transactions are not supported")]
    MultiShardTxn(usize),

    /// Context cancelled or deadline exceeded during dispatch.
    #[error("execution cancelled")]
    Cancelled,
}
