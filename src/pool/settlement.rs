use crate::FastMap;
use crate::error::LedgerError;
use alloy_primitives::{Address, U256};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Token balances the pool settles against.
///
/// The engine only ever reads balances and pushes tokens out of its own
/// account. Whatever a settlement callback owes must show up as a balance
/// increase on the pool's account before the callback returns.
pub trait TokenLedger {
    /// Balance of `account` in `token`.
    fn balance_of(&self, token: Address, account: Address) -> U256;

    /// Moves `amount` of `token` from `from` to `to`, failing without side
    /// effects if `from` cannot cover it.
    fn transfer(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), LedgerError>;
}

/// Reference [`TokenLedger`] holding every balance in a map.
#[derive(Clone, Debug, Default)]
pub struct InMemoryLedger {
    balances: FastMap<(Address, Address), U256>,
}

impl InMemoryLedger {
    /// Mints `amount` of `token` to `account`.
    pub fn credit(&mut self, token: Address, account: Address, amount: U256) {
        let balance = self.balances.entry((token, account)).or_default();
        *balance = balance.saturating_add(amount);
    }
}

impl TokenLedger for InMemoryLedger {
    fn balance_of(&self, token: Address, account: Address) -> U256 {
        self.balances
            .get(&(token, account))
            .copied()
            .unwrap_or_default()
    }

    fn transfer(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), LedgerError> {
        if amount.is_zero() || from == to {
            return Ok(());
        }

        let from_balance = self.balance_of(token, from);
        let remaining = from_balance
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance {
                token,
                account: from,
                balance: from_balance,
                required: amount,
            })?;
        let credited = self
            .balance_of(token, to)
            .checked_add(amount)
            .ok_or(LedgerError::BalanceOverflow { token, account: to })?;

        self.balances.insert((token, from), remaining);
        self.balances.insert((token, to), credited);
        Ok(())
    }
}

/// Source of the current time, in seconds.
///
/// Timestamps are 32-bit and wrap; the oracle compares them relative to
/// "now" so a wrap is handled like any other tick of the clock.
pub trait Clock {
    fn now(&self) -> u32;
}

/// Wall-clock seconds since the Unix epoch, truncated to 32 bits.
#[derive(Copy, Clone, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u32 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs() as u32)
            .unwrap_or_default()
    }
}

/// Clock that only moves when told to.
///
/// Clones share the same time, so a handle kept outside the pool can
/// advance the clock the pool reads from.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Arc<AtomicU32>,
}

impl ManualClock {
    pub fn new(now: u32) -> Self {
        Self {
            now: Arc::new(AtomicU32::new(now)),
        }
    }

    pub fn set(&self, now: u32) {
        self.now.store(now, Ordering::SeqCst);
    }

    /// Moves the clock forward, wrapping at `u32::MAX`.
    pub fn advance(&self, seconds: u32) {
        let now = self.now();
        self.set(now.wrapping_add(seconds));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u32 {
        self.now.load(Ordering::SeqCst)
    }
}
