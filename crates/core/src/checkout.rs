//! Checkout gating: the ordered checks that decide whether an order may be
//! placed.
//!
//! [`validate`] is a pure decision function. It sees only values: the cart
//! total, the wallet balance, and the address selection. Fetching those and
//! acting on the verdict belongs to the checkout flow in the client layer.

use crate::types::AddressSelection;

/// Why checkout cannot proceed.
///
/// Exactly one blocker is reported per attempt, decided by the fixed check
/// order in [`validate`]. The `Display` text is the warning shown to the
/// user.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutBlocker {
    /// The cart costs more than the wallet holds.
    #[error("You do not have enough balance in your wallet for this purchase")]
    InsufficientBalance,
    /// Addresses exist but none is chosen.
    #[error("Please select one shipping address to proceed.")]
    NoAddressSelected,
    /// There is no address on file at all.
    #[error("Please add a new address before proceeding.")]
    NoAddressOnFile,
}

/// Decide whether checkout may proceed.
///
/// Checks run in a fixed order and the first failure wins, even when several
/// would fail at once:
///
/// 1. `cart_total > wallet_balance` → [`CheckoutBlocker::InsufficientBalance`].
///    Balance goes first because it is the most common real blocker.
/// 2. nothing selected → [`CheckoutBlocker::NoAddressSelected`].
/// 3. empty address list → [`CheckoutBlocker::NoAddressOnFile`].
///
/// Checks 2 and 3 are independent failure modes and stay separate branches:
/// a selection can be recorded against a since-deleted address, so "nothing
/// selected" and "nothing to select" need different messages. Because the
/// surrounding flow disallows selecting before adding, check 3 fires only on
/// edge cases such as a deletion racing the checkout click.
///
/// # Errors
///
/// Returns the single blocking [`CheckoutBlocker`] when checkout must not
/// proceed.
pub fn validate(
    cart_total: i64,
    wallet_balance: i64,
    selection: &AddressSelection,
) -> Result<(), CheckoutBlocker> {
    if cart_total > wallet_balance {
        return Err(CheckoutBlocker::InsufficientBalance);
    }
    if selection.selected.is_none() {
        return Err(CheckoutBlocker::NoAddressSelected);
    }
    if selection.all.is_empty() {
        return Err(CheckoutBlocker::NoAddressOnFile);
    }
    Ok(())
}
