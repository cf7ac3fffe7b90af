//! Role based access control kept in instance storage.
//!
//! Every role maps to the set of addresses holding it. The contracts check
//! membership at the start of each privileged operation.

use soroban_sdk::{contracttype, Address, Env, Vec};

use crate::ttl::{INSTANCE_RENEWAL_THRESHOLD, INSTANCE_TARGET_TTL};

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum Role {
    /// Configuration, pause control, upgrades and role management.
    Admin = 0,
    /// May trigger the escape hatch. Held by at most one address.
    EscapeCaller = 1,
}

#[contracttype]
#[derive(Clone)]
enum AccessKey {
    Members(Role),
}

pub fn role_members(env: &Env, role: Role) -> Vec<Address> {
    let members = env
        .storage()
        .instance()
        .get(&AccessKey::Members(role))
        .unwrap_or_else(|| Vec::new(env));
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_RENEWAL_THRESHOLD, INSTANCE_TARGET_TTL);

    members
}

pub fn has_role(env: &Env, role: Role, account: &Address) -> bool {
    role_members(env, role).contains(account)
}

/// Adds `account` to `role`. Returns `false` when it already held the role.
pub fn grant_role(env: &Env, role: Role, account: &Address) -> bool {
    let mut members = role_members(env, role);
    if members.contains(account) {
        return false;
    }
    members.push_back(account.clone());
    save_members(env, role, &members);

    true
}

/// Removes `account` from `role`. Returns `false` when it did not hold the role.
pub fn revoke_role(env: &Env, role: Role, account: &Address) -> bool {
    let mut members = role_members(env, role);
    match members.first_index_of(account) {
        Some(index) => {
            members.remove(index);
            save_members(env, role, &members);
            true
        }
        None => false,
    }
}

pub fn revoke_all(env: &Env, role: Role) {
    env.storage().instance().remove(&AccessKey::Members(role));
}

fn save_members(env: &Env, role: Role, members: &Vec<Address>) {
    env.storage()
        .instance()
        .set(&AccessKey::Members(role), members);
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_RENEWAL_THRESHOLD, INSTANCE_TARGET_TTL);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutils::register_host;
    use soroban_sdk::testutils::Address as _;

    #[test]
    fn grant_and_revoke_roles() {
        let env = Env::default();
        let host = register_host(&env);
        let alice = Address::generate(&env);
        let bob = Address::generate(&env);

        env.as_contract(&host, || {
            assert!(!has_role(&env, Role::Admin, &alice));
            assert!(grant_role(&env, Role::Admin, &alice));
            assert!(!grant_role(&env, Role::Admin, &alice));
            assert!(grant_role(&env, Role::Admin, &bob));
            assert_eq!(role_members(&env, Role::Admin).len(), 2);

            assert!(has_role(&env, Role::Admin, &alice));
            assert!(!has_role(&env, Role::EscapeCaller, &alice));

            assert!(revoke_role(&env, Role::Admin, &alice));
            assert!(!revoke_role(&env, Role::Admin, &alice));
            assert!(!has_role(&env, Role::Admin, &alice));
            assert!(has_role(&env, Role::Admin, &bob));
        });
    }

    #[test]
    fn revoke_all_clears_only_the_given_role() {
        let env = Env::default();
        let host = register_host(&env);
        let alice = Address::generate(&env);

        env.as_contract(&host, || {
            grant_role(&env, Role::Admin, &alice);
            grant_role(&env, Role::EscapeCaller, &alice);

            revoke_all(&env, Role::EscapeCaller);

            assert!(role_members(&env, Role::EscapeCaller).is_empty());
            assert!(has_role(&env, Role::Admin, &alice));
        });
    }
}
