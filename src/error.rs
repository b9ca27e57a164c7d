use alloy_primitives::{Address, U256};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MathError {
    #[error("Math error - overflow")]
    Overflow,
    #[error("Math error - underflow")]
    Underflow,
    #[error("Math error - tick not aligned to spacing")]
    OutOfBounds,
    #[error("Math error - division by zero")]
    DivisionByZero,
    #[error("BitMath error - zero input value")]
    ZeroValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("State error - sqrtPrice out of bounds")]
    SqrtPriceOutOfBounds,
    #[error("State error - sqrtPrice is 0")]
    SqrtPriceIsZero,

    #[error("State error - tick out of bounds")]
    TickOutOfBounds,

    #[error("State error - liquidity is 0")]
    LiquidityIsZero,

    #[error("State error - requested amount exceeds pool reserves")]
    InsufficientReserves,
}

/// Failures raised by the stateful pool engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("Pool error - tickLower must be below tickUpper and both within bounds")]
    InvalidRange,
    #[error("Pool error - tick {0} is not a multiple of the tick spacing")]
    TickNotSpaced(i32),
    #[error("Pool error - already initialized")]
    AlreadyInitialized,
    #[error("Pool error - not initialized")]
    NotInitialized,
    #[error("Pool error - locked")]
    Locked,
    #[error("Pool error - sqrt price limit invalid")]
    PriceLimitInvalid,
    #[error("Pool error - amount is zero")]
    ZeroAmount,
    #[error("Pool error - liquidity overflow")]
    LiquidityOverflow,
    #[error("Pool error - liquidity underflow")]
    LiquidityUnderflow,
    #[error("Pool error - position holds no liquidity")]
    EmptyPosition,
    #[error("Pool error - tick {0} is not initialized")]
    TickNotInitialized(i32),
    #[error("Pool error - pool has no active liquidity")]
    ZeroLiquidity,
    #[error("Pool error - insufficient settlement of token {token}")]
    InsufficientSettlement { token: Address },
    #[error("Pool error - transfer of token {token} failed")]
    TransferFailed { token: Address },
    #[error("Pool error - observation is older than the oldest retained")]
    ObservationOutOfRange,
    #[error("Pool error - oracle has no observations")]
    OracleUninitialized,
    #[error("Pool error - caller {0} is not the admin")]
    Unauthorized(Address),
    #[error("Pool error - fee protocol ratio must be 0 or within [4, 10]")]
    InvalidFeeProtocol,
    #[error("Pool error - invalid config: {0}")]
    InvalidConfig(&'static str),
}

/// Failures raised by a [`TokenLedger`](crate::TokenLedger) implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Ledger error - {account} holds {balance} of {token}, needs {required}")]
    InsufficientBalance {
        token: Address,
        account: Address,
        balance: U256,
        required: U256,
    },
    #[error("Ledger error - balance of {account} in {token} would overflow")]
    BalanceOverflow { token: Address, account: Address },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    MathError(#[from] MathError),

    #[error(transparent)]
    StateError(#[from] StateError),

    #[error(transparent)]
    PoolError(#[from] PoolError),

    #[error(transparent)]
    LedgerError(#[from] LedgerError),
}
