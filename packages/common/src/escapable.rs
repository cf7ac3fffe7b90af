//! Escape hatch: a single capability holder may move the contract's whole
//! token balance to a destination fixed at initialization.

use soroban_sdk::{contracttype, token, Address, Env};

use crate::access::{self, Role};

#[contracttype]
#[derive(Clone)]
enum EscapeKey {
    Destination,
}

pub fn initialize(env: &Env, destination: &Address, caller: &Address) {
    env.storage()
        .instance()
        .set(&EscapeKey::Destination, destination);
    access::revoke_all(env, Role::EscapeCaller);
    access::grant_role(env, Role::EscapeCaller, caller);
}

pub fn destination(env: &Env) -> Option<Address> {
    env.storage().instance().get(&EscapeKey::Destination)
}

pub fn caller(env: &Env) -> Option<Address> {
    access::role_members(env, Role::EscapeCaller).first()
}

pub fn is_permitted(env: &Env, address: &Address) -> bool {
    access::has_role(env, Role::EscapeCaller, address)
}

/// Hands the capability to `new_holder`, revoking every previous holder in
/// the same step. Returns the previous holder.
pub fn transfer_capability(env: &Env, new_holder: &Address) -> Option<Address> {
    let previous = caller(env);
    access::revoke_all(env, Role::EscapeCaller);
    access::grant_role(env, Role::EscapeCaller, new_holder);

    previous
}

/// Transfers the full `token` balance of the current contract to the escape
/// destination. A zero balance is transferred as zero. Returns the
/// destination and the amount moved, `None` when no destination is set.
pub fn drain(env: &Env, token: &Address) -> Option<(Address, i128)> {
    let destination = destination(env)?;
    let contract = env.current_contract_address();
    let client = token::Client::new(env, token);
    let balance = client.balance(&contract);
    client.transfer(&contract, &destination, &balance);

    Some((destination, balance))
}
