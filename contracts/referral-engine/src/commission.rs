use crate::helpers::{ensure_contract_active, get_config, get_profile, set_profile, verify_admin};
use crate::schedule::ScheduleModule;
use crate::tier::TierModule;
use crate::types::{
    CommissionRates, ContractType, DataKey, EarningsKey, EarningsRecord, Error,
    ReferralRelationship, ReferralStatus, ReferredContract, Tier, TierSchedule,
};
use soroban_sdk::{Address, Env, Symbol, Vec};

pub struct CommissionModule;

const BPS_DENOMINATOR: i128 = 10_000;

impl CommissionModule {
    /// Commission owed to a referrer for one billing month of one referred
    /// partner's contract. Pure; negative profit (a loss month) propagates
    /// with its sign. A month index past the participating window yields 0
    /// rather than an error.
    pub fn compute_bonus(
        rates: &CommissionRates,
        tiers: &TierSchedule,
        platform_profit: i128,
        contract_type: ContractType,
        tier: Tier,
        month_index: u32,
        paid_months: u32,
    ) -> i128 {
        // No bonus of any kind before the first completed paid cycle
        if paid_months < 1 || month_index < 1 {
            return 0;
        }

        let rate_bps = match contract_type {
            // 1-month contracts pay per renewal cycle; a lookup past the
            // schedule's end is a miss, not a fault
            ContractType::OneMonth => rates
                .renewal_schedule_bps
                .get(month_index - 1)
                .unwrap_or(0),
            ContractType::ThreeMonth => {
                if month_index <= rates.covered_months {
                    rates.three_month_rate_bps
                } else {
                    0
                }
            }
            // 6-month contracts participate for the first covered months
            // only; the remaining term accrues nothing
            ContractType::SixMonth => {
                if month_index <= rates.covered_months {
                    rates.six_month_rate_bps
                } else {
                    0
                }
            }
        };

        let multiplier_bps = TierModule::multiplier_bps(tiers, tier) as i128;

        platform_profit * rate_bps as i128 * multiplier_bps / (BPS_DENOMINATOR * BPS_DENOMINATOR)
    }

    /// Entry point for the billing collaborator's "subscription payment
    /// confirmed" event. Upserts the referred partner's contract, promotes
    /// the referral to Active on the first paid cycle, and accrues exactly
    /// one earnings record per (referrer, referred, month) tuple.
    ///
    /// Returns the accrued amount; 0 when the payer has no referrer.
    pub fn record_payment(
        env: Env,
        referred: Address,
        contract_months: u32,
        month_index: u32,
        platform_profit: i128,
        paid_months_to_date: u32,
    ) -> Result<i128, Error> {
        ensure_contract_active(&env)?;
        verify_admin(&env)?;

        if month_index < 1 {
            return Err(Error::InvalidAmount);
        }

        let contract_type = ContractType::from_months(contract_months)?;
        let now = env.ledger().timestamp();

        // Track the referred partner's contract as billing reports it
        let contract = match env
            .storage()
            .persistent()
            .get::<_, ReferredContract>(&DataKey::SubContract(referred.clone()))
        {
            Some(mut existing) => {
                existing.contract_type = contract_type;
                existing.paid_months = paid_months_to_date;
                existing
            }
            None => ReferredContract {
                referred: referred.clone(),
                contract_type,
                start_date: now,
                paid_months: paid_months_to_date,
            },
        };
        env.storage()
            .persistent()
            .set(&DataKey::SubContract(referred.clone()), &contract);

        // A payment with no referral behind it is normal: nothing accrues
        let mut relationship = match env
            .storage()
            .persistent()
            .get::<_, ReferralRelationship>(&DataKey::Referral(referred.clone()))
        {
            Some(rel) => rel,
            None => return Ok(0),
        };

        let referrer = relationship.referrer.clone();
        let mut referrer_profile = get_profile(&env, &referrer)?;

        // The natural key rejects retried webhook deliveries outright:
        // a duplicate is a distinct outcome, never a silent re-credit
        let earnings_key = DataKey::Earnings(referrer.clone(), referred.clone(), month_index);
        if env.storage().persistent().has(&earnings_key) {
            return Err(Error::DuplicateEarnings);
        }

        // First confirmed payment activates the relationship
        if paid_months_to_date >= 1 && relationship.status != ReferralStatus::Active {
            relationship.status = ReferralStatus::Active;
            referrer_profile.active_referrals += 1;
            env.storage()
                .persistent()
                .set(&DataKey::Referral(referred.clone()), &relationship);

            env.events().publish(
                (Symbol::new(&env, "referral_activated"), referrer.clone()),
                referred.clone(),
            );
        }

        let config = get_config(&env)?;
        let tier = TierModule::resolve_tier(&config.tiers, referrer_profile.lifetime_referrals());

        let bonus = Self::compute_bonus(
            &config.rates,
            &config.tiers,
            platform_profit,
            contract_type,
            tier,
            month_index,
            paid_months_to_date,
        );

        let record = EarningsRecord {
            referrer: referrer.clone(),
            referred: referred.clone(),
            month_index,
            amount: bonus,
            computed_at: now,
            phase: ScheduleModule::phase_for(&config.windows, now),
        };
        env.storage().persistent().set(&earnings_key, &record);

        let key = EarningsKey {
            referred: referred.clone(),
            month_index,
        };
        // A loss month needs no clearing cycle: it hits the available
        // balance at accrual, so only non-negative amounts ever sit
        // unsettled and the available balance cannot outrun the ledger
        if bonus < 0 {
            referrer_profile.available_bonus += bonus;
        } else {
            Self::push_key(&env, &DataKey::Unsettled(referrer.clone()), &key);
        }
        Self::push_key(&env, &DataKey::EarningsIndex(referrer.clone()), &key);

        referrer_profile.accumulated_bonus += bonus;
        set_profile(&env, &referrer_profile);

        Self::add_distributed(&env, bonus);

        env.events().publish(
            (Symbol::new(&env, "bonus_earned"), referrer),
            (referred, month_index, bonus),
        );

        Ok(bonus)
    }

    /// Fetch one earnings record by its natural key
    pub fn get_earnings_record(
        env: Env,
        referrer: Address,
        referred: Address,
        month_index: u32,
    ) -> Result<EarningsRecord, Error> {
        env.storage()
            .persistent()
            .get(&DataKey::Earnings(referrer, referred, month_index))
            .ok_or(Error::ReferralNotFound)
    }

    fn push_key(env: &Env, storage_key: &DataKey, key: &EarningsKey) {
        let mut keys: Vec<EarningsKey> = env
            .storage()
            .persistent()
            .get(storage_key)
            .unwrap_or_else(|| Vec::new(env));
        keys.push_back(key.clone());
        env.storage().persistent().set(storage_key, &keys);
    }

    fn add_distributed(env: &Env, amount: i128) {
        let current: i128 = env
            .storage()
            .instance()
            .get(&DataKey::TotalDistributed)
            .unwrap_or(0);
        env.storage()
            .instance()
            .set(&DataKey::TotalDistributed, &(current + amount));
    }
}
