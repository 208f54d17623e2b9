use crate::admin::AdminModule;
use crate::types::{DataKey, Error, PartnerProfile, ReferralConfig};
use soroban_sdk::{Address, Env};

pub fn get_profile(env: &Env, partner: &Address) -> Result<PartnerProfile, Error> {
    env.storage()
        .persistent()
        .get(&DataKey::Partner(partner.clone()))
        .ok_or(Error::PartnerNotFound)
}

pub fn set_profile(env: &Env, profile: &PartnerProfile) {
    env.storage()
        .persistent()
        .set(&DataKey::Partner(profile.address.clone()), profile);
}

pub fn partner_exists(env: &Env, partner: &Address) -> bool {
    env.storage()
        .persistent()
        .has(&DataKey::Partner(partner.clone()))
}

pub fn get_config(env: &Env) -> Result<ReferralConfig, Error> {
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .ok_or(Error::NotInitialized)
}

pub fn verify_admin(env: &Env) -> Result<(), Error> {
    let admin: Address = env
        .storage()
        .instance()
        .get(&DataKey::Admin)
        .ok_or(Error::NotInitialized)?;
    admin.require_auth();
    Ok(())
}

pub fn ensure_contract_active(env: &Env) -> Result<(), Error> {
    if AdminModule::is_contract_paused(env) {
        return Err(Error::ContractPaused);
    }
    Ok(())
}
