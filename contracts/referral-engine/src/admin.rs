use crate::helpers::verify_admin;
use crate::types::{DataKey, Error, ReferralConfig};
use soroban_sdk::{Address, Env};

pub struct AdminModule;

impl AdminModule {
    pub fn initialize(env: Env, admin: Address, config: ReferralConfig) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Admin) {
            return Err(Error::AlreadyInitialized);
        }

        if !Self::validate_config(&config) {
            return Err(Error::InvalidConfig);
        }

        env.storage().instance().set(&DataKey::Admin, &admin);
        env.storage().instance().set(&DataKey::Config, &config);
        env.storage()
            .instance()
            .set(&DataKey::ContractPaused, &false);

        Ok(())
    }

    /// Replaces the engine configuration. Every rate, threshold and day
    /// boundary the engine applies is validated here before it can take
    /// effect.
    pub fn set_config(env: Env, config: ReferralConfig) -> Result<(), Error> {
        verify_admin(&env)?;

        if !Self::validate_config(&config) {
            return Err(Error::InvalidConfig);
        }

        env.storage().instance().set(&DataKey::Config, &config);
        Ok(())
    }

    pub fn get_config(env: Env) -> Result<ReferralConfig, Error> {
        crate::helpers::get_config(&env)
    }

    pub fn get_admin(env: Env) -> Result<Address, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Admin)
            .ok_or(Error::NotInitialized)
    }

    pub fn transfer_admin(env: Env, new_admin: Address) -> Result<(), Error> {
        verify_admin(&env)?;
        env.storage().instance().set(&DataKey::Admin, &new_admin);
        Ok(())
    }

    pub fn pause_contract(env: Env) -> Result<(), Error> {
        verify_admin(&env)?;
        env.storage()
            .instance()
            .set(&DataKey::ContractPaused, &true);
        Ok(())
    }

    pub fn resume_contract(env: Env) -> Result<(), Error> {
        verify_admin(&env)?;
        env.storage()
            .instance()
            .set(&DataKey::ContractPaused, &false);
        Ok(())
    }

    pub fn get_paused_state(env: Env) -> Result<bool, Error> {
        Ok(Self::is_contract_paused(&env))
    }

    pub fn is_contract_paused(env: &Env) -> bool {
        env.storage()
            .instance()
            .get(&DataKey::ContractPaused)
            .unwrap_or(false)
    }

    fn validate_config(config: &ReferralConfig) -> bool {
        // Tier thresholds must be ordered and multipliers non-decreasing
        let tiers = &config.tiers;
        if tiers.silver_min < 1 || tiers.gold_min <= tiers.silver_min {
            return false;
        }
        if tiers.silver_multiplier_bps < tiers.bronze_multiplier_bps
            || tiers.gold_multiplier_bps < tiers.silver_multiplier_bps
            || tiers.bronze_multiplier_bps == 0
        {
            return false;
        }

        if config.rates.covered_months < 1 || config.rates.renewal_schedule_bps.is_empty() {
            return false;
        }

        // Phase boundaries must be strictly ordered and leave room for an
        // availability window even in February
        let windows = &config.windows;
        if windows.calculation_end_day < 1
            || windows.verification_end_day <= windows.calculation_end_day
            || windows.payout_end_day <= windows.verification_end_day
            || windows.payout_end_day > 27
        {
            return false;
        }

        let withdrawal = &config.withdrawal;
        if withdrawal.min_withdrawal < 0
            || withdrawal.monthly_cap_bps == 0
            || withdrawal.monthly_cap_bps > 10_000
        {
            return false;
        }

        true
    }
}
