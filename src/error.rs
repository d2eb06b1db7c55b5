use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    #[error("invalid price format: {0:?}")]
    InvalidPriceFormat(String),

    #[error("price does not fit in 256 bits: {0:?}")]
    Overflow(String),

    #[error("zero denominator: quote token price is 0")]
    ZeroDenominator,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("unknown token {input:?} (known symbols: {known}, or a 0x-prefixed address)")]
    UnknownToken { input: String, known: String },

    #[error("invalid address {0:?}: expected 0x-prefixed 40 hex digits or shard.realm.num")]
    InvalidAddress(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PairError {
    #[error("no price pairs given")]
    Empty,

    #[error("malformed pair {0:?}: expected SYM=usd")]
    Malformed(String),

    #[error("token listed twice: {0}")]
    Duplicate(String),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("pair {pair:?}: {source}")]
    Price {
        pair: String,
        #[source]
        source: PriceError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing configuration: set one of {}", .names.join(", "))]
    Missing { names: Vec<String> },

    #[error("invalid value for {name}: {value:?} ({reason})")]
    Invalid {
        name: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("missing return value at index {index}")]
    Missing { index: usize },

    #[error("expected {expected} at index {index}, got {got}")]
    UnexpectedType {
        index: usize,
        expected: &'static str,
        got: &'static str,
    },

    #[error("invalid uint256 {0:?}")]
    InvalidUint(String),

    #[error("unset value kind")]
    Unset,
}
