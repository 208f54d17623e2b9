use crate::helpers::get_profile;
use crate::types::{DataKey, EarningsKey, EarningsRecord, Error};
use soroban_sdk::{Address, Env, String, Vec};

pub struct MetricsModule;

impl MetricsModule {
    pub fn get_total_partners(env: Env) -> Result<u32, Error> {
        Ok(env
            .storage()
            .persistent()
            .get(&DataKey::TotalPartners)
            .unwrap_or(0))
    }

    pub fn get_total_distributed(env: Env) -> Result<i128, Error> {
        Ok(env
            .storage()
            .instance()
            .get(&DataKey::TotalDistributed)
            .unwrap_or(0))
    }

    /// Full earnings ledger of one referrer, oldest first
    pub fn get_earnings_history(env: Env, partner: Address) -> Result<Vec<EarningsRecord>, Error> {
        let keys: Vec<EarningsKey> = env
            .storage()
            .persistent()
            .get(&DataKey::EarningsIndex(partner.clone()))
            .unwrap_or_else(|| Vec::new(&env));

        let mut records = Vec::new(&env);
        for key in keys.iter() {
            let record: EarningsRecord = env
                .storage()
                .persistent()
                .get(&DataKey::Earnings(
                    partner.clone(),
                    key.referred.clone(),
                    key.month_index,
                ))
                .ok_or(Error::ReferralNotFound)?;
            records.push_back(record);
        }

        Ok(records)
    }

    /// System statistics as key-value pairs:
    /// total_partners, total_distributed, average_bonus_per_partner
    pub fn get_system_metrics(env: Env) -> Result<Vec<(String, i128)>, Error> {
        let mut metrics = Vec::new(&env);

        let total_partners = Self::get_total_partners(env.clone())? as i128;
        metrics.push_back((String::from_str(&env, "total_partners"), total_partners));

        let total_distributed = Self::get_total_distributed(env.clone())?;
        metrics.push_back((
            String::from_str(&env, "total_distributed"),
            total_distributed,
        ));

        let avg_bonus = if total_partners > 0 {
            total_distributed / total_partners
        } else {
            0
        };
        metrics.push_back((
            String::from_str(&env, "average_bonus_per_partner"),
            avg_bonus,
        ));

        Ok(metrics)
    }

    /// Share of a partner's referrals that completed a first paid cycle,
    /// as a percentage (0-100)
    pub fn get_activation_rate(env: Env, partner: Address) -> Result<u32, Error> {
        let profile = get_profile(&env, &partner)?;

        let total = profile.lifetime_referrals();
        if total == 0 {
            return Ok(0);
        }

        Ok((profile.active_referrals * 100) / total)
    }
}
