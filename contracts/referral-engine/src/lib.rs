#![no_std]
use soroban_sdk::{contract, contractimpl, Address, Env, String, Vec};

mod admin;
mod campaign;
mod commission;
mod helpers;
mod interface;
mod metrics;
mod partner;
mod schedule;
mod tier;
mod types;
mod withdrawal;

use admin::AdminModule;
use campaign::CampaignModule;
use commission::CommissionModule;
use metrics::MetricsModule;
use partner::PartnerModule;
use schedule::ScheduleModule;
use tier::TierModule;
use types::*;
use withdrawal::WithdrawalModule;

#[contract]
pub struct ReferralEngineContract;

#[contractimpl]
impl ReferralEngineContract {
    /// Initializes the engine with an admin address and the default
    /// configuration: tier boundaries at 6 and 16 referrals, the
    /// per-contract commission rates, the four payout-phase day windows
    /// and the withdrawal policy.
    ///
    /// # Arguments
    /// * `admin` - The address of the contract administrator
    pub fn initialize(env: Env, admin: Address) -> Result<(), Error> {
        let default_config = ReferralConfig {
            tiers: TierSchedule {
                silver_min: 6,
                gold_min: 16,
                bronze_multiplier_bps: 10_000, // 1.00x
                silver_multiplier_bps: 11_000, // 1.10x
                gold_multiplier_bps: 12_500,   // 1.25x
            },
            rates: CommissionRates {
                // 1-month contracts pay per renewal cycle: 5%, 10%, 10%
                renewal_schedule_bps: Vec::from_array(&env, [500, 1_000, 1_000]),
                three_month_rate_bps: 2_000, // 20%
                six_month_rate_bps: 2_500,   // 25%
                covered_months: 3,
            },
            windows: PayoutWindows {
                calculation_end_day: 15,
                verification_end_day: 20,
                payout_end_day: 25,
            },
            withdrawal: WithdrawalPolicy {
                min_withdrawal: 100,
                monthly_cap_bps: 5_000, // Half the accumulated bonus per month
                required_premium_months: 6,
                required_active_referrals: 3,
                bank_transfer: MethodTerms {
                    fee_bps: 100,
                    min_amount: 100,
                },
                e_wallet: MethodTerms {
                    fee_bps: 50,
                    min_amount: 50,
                },
                reinvest_bonus_bps: 500, // 5% bonus on reinvested credit
            },
        };
        AdminModule::initialize(env, admin, default_config)
    }

    /// Replaces the engine configuration
    ///
    /// # Arguments
    /// * `config` - The new configuration; validated before taking effect
    pub fn set_config(env: Env, config: ReferralConfig) -> Result<(), Error> {
        AdminModule::set_config(env, config)
    }

    /// Current engine configuration
    pub fn get_config(env: Env) -> Result<ReferralConfig, Error> {
        AdminModule::get_config(env)
    }

    /// get admin address
    pub fn get_admin(env: Env) -> Result<Address, Error> {
        AdminModule::get_admin(env)
    }

    /// Transfers admin rights to a new address
    pub fn transfer_admin(env: Env, new_admin: Address) -> Result<(), Error> {
        AdminModule::transfer_admin(env, new_admin)
    }

    /// Pauses all contract operations
    pub fn pause_contract(env: Env) -> Result<(), Error> {
        AdminModule::pause_contract(env)
    }

    /// Resumes contract operations after being paused
    pub fn resume_contract(env: Env) -> Result<(), Error> {
        AdminModule::resume_contract(env)
    }

    /// Check if contract is paused
    pub fn get_paused_state(env: Env) -> Result<bool, Error> {
        AdminModule::get_paused_state(env)
    }

    /// Registers a partner with no referrer
    pub fn register_partner(env: Env, partner: Address) -> Result<(), Error> {
        PartnerModule::register_partner(env, partner)
    }

    /// Records an invitation sent to a prospective partner
    pub fn invite_referral(env: Env, referrer: Address, invitee: Address) -> Result<(), Error> {
        PartnerModule::invite_referral(env, referrer, invitee)
    }

    /// Registers a partner who signed up with a referrer's code
    ///
    /// # Arguments
    /// * `partner` - The address of the new partner
    /// * `referrer` - The address whose referral code was used
    pub fn register_with_referral(
        env: Env,
        partner: Address,
        referrer: Address,
    ) -> Result<(), Error> {
        PartnerModule::register_with_referral(env, partner, referrer)
    }

    /// Updates a partner's subscription state from the account collaborator
    pub fn set_subscription(
        env: Env,
        partner: Address,
        is_premium: bool,
        subscription_months: u32,
    ) -> Result<(), Error> {
        PartnerModule::set_subscription(env, partner, is_premium, subscription_months)
    }

    /// Retrieves a partner's profile
    pub fn get_partner(env: Env, partner: Address) -> Result<PartnerProfile, Error> {
        PartnerModule::get_partner(env, partner)
    }

    /// Retrieves the referral relationship behind a referred partner
    pub fn get_referral(env: Env, referred: Address) -> Result<ReferralRelationship, Error> {
        PartnerModule::get_referral(env, referred)
    }

    /// Gets the list of partners a referrer brought in
    pub fn get_direct_referrals(env: Env, partner: Address) -> Result<Vec<Address>, Error> {
        PartnerModule::get_direct_referrals(env, partner)
    }

    /// Maps a lifetime referral count to a tier under the stored
    /// configuration. Pure; boundary counts go to the higher tier.
    pub fn resolve_tier(env: Env, lifetime_referrals: u32) -> Result<Tier, Error> {
        let config = helpers::get_config(&env)?;
        Ok(TierModule::resolve_tier(&config.tiers, lifetime_referrals))
    }

    /// Current tier of a partner, recomputed from their lifetime referral
    /// count on every call
    pub fn get_partner_tier(env: Env, partner: Address) -> Result<Tier, Error> {
        TierModule::partner_tier(&env, &partner)
    }

    /// Commission for one billing month under the stored configuration,
    /// without touching any state
    ///
    /// # Arguments
    /// * `platform_profit` - The platform's margin for the month (may be negative)
    /// * `contract_months` - Contract duration: 1, 3 or 6
    /// * `tier` - The referrer's tier
    /// * `month_index` - Which billing month of the contract (1-based)
    /// * `paid_months` - Months the referred partner has paid so far
    pub fn preview_bonus(
        env: Env,
        platform_profit: i128,
        contract_months: u32,
        tier: Tier,
        month_index: u32,
        paid_months: u32,
    ) -> Result<i128, Error> {
        let config = helpers::get_config(&env)?;
        let contract_type = ContractType::from_months(contract_months)?;
        Ok(CommissionModule::compute_bonus(
            &config.rates,
            &config.tiers,
            platform_profit,
            contract_type,
            tier,
            month_index,
            paid_months,
        ))
    }

    /// Handles a "subscription payment confirmed" event from the billing
    /// collaborator. At most one earnings record per
    /// (referrer, referred, month) tuple; retries are rejected as
    /// `DuplicateEarnings` without touching any balance.
    ///
    /// # Arguments
    /// * `referred` - The partner whose payment was confirmed
    /// * `contract_months` - Contract duration: 1, 3 or 6
    /// * `month_index` - Which billing month this payment covers (1-based)
    /// * `platform_profit` - The platform's margin for the month
    /// * `paid_months_to_date` - Total months paid after this payment
    pub fn record_payment(
        env: Env,
        referred: Address,
        contract_months: u32,
        month_index: u32,
        platform_profit: i128,
        paid_months_to_date: u32,
    ) -> Result<i128, Error> {
        CommissionModule::record_payment(
            env,
            referred,
            contract_months,
            month_index,
            platform_profit,
            paid_months_to_date,
        )
    }

    /// Fetches one earnings record by its natural key
    pub fn get_earnings_record(
        env: Env,
        referrer: Address,
        referred: Address,
        month_index: u32,
    ) -> Result<EarningsRecord, Error> {
        CommissionModule::get_earnings_record(env, referrer, referred, month_index)
    }

    /// Creates a time-boxed referral contest running `duration_days` from now
    ///
    /// # Arguments
    /// * `name` - Display name of the campaign
    /// * `duration_days` - Contest length in days, at least 1
    /// * `target_referrals` - Referrals needed to win, at least 1
    /// * `bonus_amount` - Prize credited to each winner
    /// * `min_tier` - Minimum tier required to join
    /// * `min_subscription_months` - One of the supported contract durations
    pub fn create_campaign(
        env: Env,
        name: String,
        duration_days: u32,
        target_referrals: u32,
        bonus_amount: i128,
        min_tier: Tier,
        min_subscription_months: u32,
    ) -> Result<u32, Error> {
        CampaignModule::create_campaign(
            env,
            name,
            duration_days,
            target_referrals,
            bonus_amount,
            min_tier,
            min_subscription_months,
        )
    }

    /// Enrolls a partner into an active campaign. Opt-in only.
    pub fn join_campaign(env: Env, campaign_id: u32, partner: Address) -> Result<(), Error> {
        CampaignModule::join_campaign(env, campaign_id, partner)
    }

    /// Attributes one referral to a participant's campaign progress
    ///
    /// # Arguments
    /// * `campaign_id` - The campaign being scored
    /// * `referrer` - The participating partner who made the referral
    /// * `referral_timestamp` - When the referral relationship was created
    pub fn record_campaign_referral(
        env: Env,
        campaign_id: u32,
        referrer: Address,
        referral_timestamp: u64,
    ) -> Result<(), Error> {
        CampaignModule::record_campaign_referral(env, campaign_id, referrer, referral_timestamp)
    }

    /// Campaigns still live at the current ledger time
    pub fn get_active_campaigns(env: Env) -> Result<Vec<Campaign>, Error> {
        CampaignModule::get_active_campaigns(env)
    }

    /// Campaign with its status derived from the clock
    pub fn get_campaign(env: Env, campaign_id: u32) -> Result<Campaign, Error> {
        CampaignModule::get_campaign(env, campaign_id)
    }

    /// Campaign snapshot with one partner's enrollment and winner counts
    pub fn get_campaign_stats(
        env: Env,
        campaign_id: u32,
        partner: Address,
    ) -> Result<CampaignStats, Error> {
        CampaignModule::get_campaign_stats(env, campaign_id, partner)
    }

    /// Stops a campaign before its end time
    pub fn cancel_campaign(env: Env, campaign_id: u32) -> Result<(), Error> {
        CampaignModule::cancel_campaign(env, campaign_id)
    }

    /// Removes a participant from a campaign for fraud
    pub fn disqualify_participant(
        env: Env,
        campaign_id: u32,
        partner: Address,
    ) -> Result<(), Error> {
        CampaignModule::disqualify_participant(env, campaign_id, partner)
    }

    /// Evaluates the withdrawal eligibility gate for a partner. An
    /// ineligible answer carries the first unmet rule as its reason.
    pub fn check_withdrawal(env: Env, partner: Address) -> Result<WithdrawalEligibility, Error> {
        WithdrawalModule::check_withdrawal(env, partner)
    }

    /// Executes a withdrawal through the chosen method
    ///
    /// # Arguments
    /// * `partner` - The withdrawing partner
    /// * `amount` - Gross amount to withdraw
    /// * `method` - Bank transfer, e-wallet or account-balance credit
    ///
    /// # Returns
    /// The payout record ID
    pub fn request_withdrawal(
        env: Env,
        partner: Address,
        amount: i128,
        method: WithdrawalMethod,
    ) -> Result<u32, Error> {
        WithdrawalModule::request_withdrawal(env, partner, amount, method)
    }

    /// Rail callback confirming a pending payout
    pub fn confirm_payout(env: Env, payout_id: u32) -> Result<(), Error> {
        WithdrawalModule::confirm_payout(env, payout_id)
    }

    /// Rail callback failing a pending payout; restores the balance
    pub fn fail_payout(env: Env, payout_id: u32) -> Result<(), Error> {
        WithdrawalModule::fail_payout(env, payout_id)
    }

    /// Fetches a payout record
    pub fn get_payout(env: Env, payout_id: u32) -> Result<PendingPayout, Error> {
        WithdrawalModule::get_payout(&env, payout_id)
    }

    /// Payout phase at the current ledger time
    pub fn get_current_phase(env: Env) -> Result<PayoutPhase, Error> {
        ScheduleModule::current_phase(&env)
    }

    /// Sweeps a partner's cleared earnings into their available balance.
    /// Also runs implicitly on every withdrawal check.
    pub fn settle_available(env: Env, partner: Address) -> Result<i128, Error> {
        ScheduleModule::settle_available(&env, &partner)
    }

    /// Gets the total number of registered partners
    pub fn get_total_partners(env: Env) -> Result<u32, Error> {
        MetricsModule::get_total_partners(env)
    }

    /// Gets the total commission accrued across all referrers
    pub fn get_total_distributed(env: Env) -> Result<i128, Error> {
        MetricsModule::get_total_distributed(env)
    }

    /// Full earnings ledger of one referrer, oldest first
    pub fn get_earnings_history(env: Env, partner: Address) -> Result<Vec<EarningsRecord>, Error> {
        MetricsModule::get_earnings_history(env, partner)
    }

    /// Gets various system metrics as key-value pairs
    /// total_partners, total_distributed, average_bonus_per_partner
    pub fn get_system_metrics(env: Env) -> Result<Vec<(String, i128)>, Error> {
        MetricsModule::get_system_metrics(env)
    }

    /// Share of a partner's referrals that completed a first paid cycle
    pub fn get_activation_rate(env: Env, partner: Address) -> Result<u32, Error> {
        MetricsModule::get_activation_rate(env, partner)
    }
}

#[cfg(test)]
mod test;
