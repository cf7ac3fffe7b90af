extern crate std;

use pretty_assertions::assert_eq;

use super::setup::{setup, ASK_RATE, ONE};
use crate::error::ContractError;

#[test]
fn purchase_at_correct_rate() {
    let setup = setup();
    setup.base_admin.mint(&setup.treasury, &(1_000 * ONE));
    setup.quote_admin.mint(&setup.buyer, &(64_640 * ONE));
    setup.approve_treasury(1_000 * ONE);
    setup.approve_buyer(64_640 * ONE);

    assert_eq!(setup.broker.query_ask(), ASK_RATE);
    let cost = setup.broker.purchase(&setup.buyer, &ONE, &ASK_RATE);

    assert_eq!(cost, ASK_RATE);
    assert_eq!(setup.base.balance(&setup.buyer), ONE);
    assert_eq!(setup.base.balance(&setup.treasury), 999 * ONE);
    assert_eq!(setup.quote.balance(&setup.treasury), ASK_RATE);
    assert_eq!(
        setup.quote.balance(&setup.buyer),
        64_575_360_000_000_000_000_000
    );
    // allowances are consumed
    assert_eq!(
        setup.base.allowance(&setup.treasury, &setup.broker.address),
        999 * ONE
    );
    assert_eq!(
        setup.quote.allowance(&setup.buyer, &setup.broker.address),
        64_640 * ONE - ASK_RATE
    );
}

#[test]
fn purchase_fractional_quantity_truncates_cost() {
    let setup = setup();
    setup.base_admin.mint(&setup.treasury, &ONE);
    setup.quote_admin.mint(&setup.buyer, &(100 * ONE));
    setup.approve_treasury(ONE);
    setup.approve_buyer(100 * ONE);

    // 3 atomics at 64.64 cost 193.92 atomics
    let cost = setup.broker.purchase(&setup.buyer, &3, &ASK_RATE);
    assert_eq!(cost, 193);
    assert_eq!(setup.base.balance(&setup.buyer), 3);
}

#[test]
fn purchase_large_quantity() {
    let setup = setup();
    let quantity = 4_000_000 * ONE;
    setup.base_admin.mint(&setup.treasury, &quantity);
    setup.quote_admin.mint(&setup.buyer, &(258_560_000 * ONE));
    setup.approve_treasury(quantity);
    setup.approve_buyer(258_560_000 * ONE);

    assert_eq!(
        setup.broker.purchase(&setup.buyer, &quantity, &ASK_RATE),
        258_560_000 * ONE
    );
    assert_eq!(setup.quote.balance(&setup.buyer), 0);
}

#[test]
fn purchase_zero_amount() {
    let setup = setup();

    assert_eq!(
        setup.broker.try_purchase(&setup.buyer, &0, &ASK_RATE),
        Err(Ok(ContractError::ZeroAmount))
    );
    assert_eq!(
        setup.broker.try_purchase(&setup.buyer, &-ONE, &ASK_RATE),
        Err(Ok(ContractError::ZeroAmount))
    );
}

#[test]
fn purchase_at_incorrect_rate() {
    let setup = setup();
    setup.base_admin.mint(&setup.treasury, &(1_000 * ONE));
    setup.quote_admin.mint(&setup.buyer, &(64_640 * ONE));
    setup.approve_treasury(1_000 * ONE);
    setup.approve_buyer(64_640 * ONE);

    assert_eq!(
        setup.broker.try_purchase(&setup.buyer, &ONE, &(64 * ONE)),
        Err(Ok(ContractError::StaleRate))
    );
    assert_eq!(
        setup.broker.try_purchase(&setup.buyer, &ONE, &(ASK_RATE + 1)),
        Err(Ok(ContractError::StaleRate))
    );
}

#[test]
fn purchase_without_treasury_allowance() {
    let setup = setup();
    setup.base_admin.mint(&setup.treasury, &(1_000 * ONE));
    setup.quote_admin.mint(&setup.buyer, &(64_640 * ONE));
    setup.approve_treasury(ONE - 1);
    setup.approve_buyer(64_640 * ONE);

    assert_eq!(
        setup.broker.try_purchase(&setup.buyer, &ONE, &ASK_RATE),
        Err(Ok(ContractError::InsufficientTreasuryAllowance))
    );
}

#[test]
fn purchase_with_empty_treasury() {
    let setup = setup();
    setup.base_admin.mint(&setup.treasury, &(ONE / 2));
    setup.quote_admin.mint(&setup.buyer, &(64_640 * ONE));
    setup.approve_treasury(1_000 * ONE);
    setup.approve_buyer(64_640 * ONE);

    assert_eq!(
        setup.broker.try_purchase(&setup.buyer, &ONE, &ASK_RATE),
        Err(Ok(ContractError::InsufficientTreasuryBalance))
    );
}

#[test]
fn purchase_without_enough_quote_balance() {
    let setup = setup();
    setup.base_admin.mint(&setup.treasury, &ONE);
    setup.quote_admin.mint(&setup.buyer, &(ASK_RATE - 1));
    setup.approve_treasury(ONE);
    setup.approve_buyer(64_640 * ONE);

    assert_eq!(
        setup.broker.try_purchase(&setup.buyer, &ONE, &ASK_RATE),
        Err(Ok(ContractError::InsufficientBuyerBalance))
    );
    assert_eq!(setup.base.balance(&setup.treasury), ONE);
    assert_eq!(setup.quote.balance(&setup.buyer), ASK_RATE - 1);
}

#[test]
fn purchase_without_enough_quote_allowance() {
    let setup = setup();
    setup.base_admin.mint(&setup.treasury, &ONE);
    setup.quote_admin.mint(&setup.buyer, &(64_640 * ONE));
    setup.approve_treasury(ONE);
    // 63.64
    setup.approve_buyer(63_640_000_000_000_000_000);

    assert_eq!(
        setup.broker.try_purchase(&setup.buyer, &ONE, &ASK_RATE),
        Err(Ok(ContractError::InsufficientBuyerAllowance))
    );
    assert_eq!(setup.base.balance(&setup.treasury), ONE);
    assert_eq!(setup.quote.balance(&setup.treasury), 0);
}

#[test]
fn checks_run_in_order() {
    let setup = setup();

    // nothing minted or approved, the treasury allowance is reported first
    assert_eq!(
        setup.broker.try_purchase(&setup.buyer, &ONE, &ASK_RATE),
        Err(Ok(ContractError::InsufficientTreasuryAllowance))
    );
    setup.approve_treasury(ONE);
    assert_eq!(
        setup.broker.try_purchase(&setup.buyer, &ONE, &ASK_RATE),
        Err(Ok(ContractError::InsufficientTreasuryBalance))
    );
    setup.base_admin.mint(&setup.treasury, &ONE);
    assert_eq!(
        setup.broker.try_purchase(&setup.buyer, &ONE, &ASK_RATE),
        Err(Ok(ContractError::InsufficientBuyerBalance))
    );
    setup.quote_admin.mint(&setup.buyer, &ASK_RATE);
    assert_eq!(
        setup.broker.try_purchase(&setup.buyer, &ONE, &ASK_RATE),
        Err(Ok(ContractError::InsufficientBuyerAllowance))
    );
    setup.approve_buyer(ASK_RATE);
    assert_eq!(
        setup.broker.purchase(&setup.buyer, &ONE, &ASK_RATE),
        ASK_RATE
    );
}
