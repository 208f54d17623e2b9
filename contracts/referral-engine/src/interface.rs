//! Interface documentation for the Referral Bonus & Campaign Engine
//!
//! The engine decides how much commission a referring partner earns from a
//! referred partner's subscription payments, how referrer tiers are
//! computed, how time-boxed referral campaigns are scored and resolved,
//! and what withdrawal eligibility rules apply.

use crate::types::{
    Campaign, CampaignStats, EarningsRecord, Error, PartnerProfile, PayoutPhase, ReferralConfig,
    ReferralRelationship, Tier, WithdrawalEligibility, WithdrawalMethod,
};
use soroban_sdk::{Address, String, Vec};

/// Partner registration and referral relationships
pub trait PartnerOperations {
    /// Register a partner with no referrer
    ///
    /// # Errors
    /// * `AlreadyRegistered` - If the partner already exists
    fn register_partner(partner: Address) -> Result<(), Error>;

    /// Record an invitation sent to a prospective partner
    ///
    /// # Errors
    /// * `SelfReferral` - If the referrer invited themselves
    /// * `AlreadyRegistered` - If the invitee already signed up or holds
    ///   a pending invitation
    fn invite_referral(referrer: Address, invitee: Address) -> Result<(), Error>;

    /// Register a partner who signed up with a referrer's code. The
    /// relationship starts at `Registered` and becomes `Active` after the
    /// referred partner's first confirmed subscription payment.
    ///
    /// # Errors
    /// * `SelfReferral` - If the partner used their own code
    /// * `AlreadyRegistered` - If the partner already exists
    /// * `ReferrerNotFound` - If the referrer doesn't exist
    fn register_with_referral(partner: Address, referrer: Address) -> Result<(), Error>;

    /// Subscription state feed from the partner/account collaborator
    fn set_subscription(
        partner: Address,
        is_premium: bool,
        subscription_months: u32,
    ) -> Result<(), Error>;

    /// Get a partner's profile
    fn get_partner(partner: Address) -> Result<PartnerProfile, Error>;

    /// Get the referral relationship behind a referred partner
    fn get_referral(referred: Address) -> Result<ReferralRelationship, Error>;
}

/// Commission accrual driven by billing events
pub trait CommissionOperations {
    /// Handle a "subscription payment confirmed" event from the billing
    /// collaborator. Accrues at most one earnings record per
    /// (referrer, referred, month) tuple.
    ///
    /// # Errors
    /// * `UnknownContractType` - If `contract_months` is unsupported
    /// * `DuplicateEarnings` - If the tuple was already recorded
    fn record_payment(
        referred: Address,
        contract_months: u32,
        month_index: u32,
        platform_profit: i128,
        paid_months_to_date: u32,
    ) -> Result<i128, Error>;

    /// Fetch one earnings record by its natural key
    fn get_earnings_record(
        referrer: Address,
        referred: Address,
        month_index: u32,
    ) -> Result<EarningsRecord, Error>;
}

/// Time-boxed referral contests
pub trait CampaignOperations {
    /// Create a campaign running `duration_days` from now
    ///
    /// # Errors
    /// * `InvalidCampaignParams` - If duration, target, bonus or minimum
    ///   subscription months fail validation
    fn create_campaign(
        name: String,
        duration_days: u32,
        target_referrals: u32,
        bonus_amount: i128,
        min_tier: Tier,
        min_subscription_months: u32,
    ) -> Result<u32, Error>;

    /// Opt-in enrollment into an active campaign
    ///
    /// # Errors
    /// * `CampaignNotActive` - If the campaign expired or ended
    /// * `AlreadyParticipating` - If the partner already joined
    /// * `TierTooLow` - If the partner's tier is below the minimum
    fn join_campaign(campaign_id: u32, partner: Address) -> Result<(), Error>;

    /// Attribute a referral to a participant's campaign progress
    fn record_campaign_referral(
        campaign_id: u32,
        referrer: Address,
        referral_timestamp: u64,
    ) -> Result<(), Error>;

    /// Campaigns still live at the current ledger time
    fn get_active_campaigns() -> Result<Vec<Campaign>, Error>;

    /// Campaign snapshot with one partner's enrollment
    fn get_campaign_stats(campaign_id: u32, partner: Address) -> Result<CampaignStats, Error>;
}

/// Withdrawal eligibility and execution
pub trait WithdrawalOperations {
    /// Evaluate the eligibility gate. Ineligibility is an expected answer
    /// carrying a human-readable reason, not an error.
    fn check_withdrawal(partner: Address) -> Result<WithdrawalEligibility, Error>;

    /// Execute a withdrawal through one of the supported methods
    ///
    /// # Errors
    /// * `WithdrawalNotAllowed` - If the eligibility gate rejects
    /// * `ExceedsMonthlyCap` - If the amount breaks the monthly throttle
    /// * `BelowMethodMinimum` - If the amount is under the method's floor
    fn request_withdrawal(
        partner: Address,
        amount: i128,
        method: WithdrawalMethod,
    ) -> Result<u32, Error>;

    /// Rail callback confirming a pending payout
    fn confirm_payout(payout_id: u32) -> Result<(), Error>;

    /// Rail callback failing a pending payout; restores the balance
    fn fail_payout(payout_id: u32) -> Result<(), Error>;
}

/// Administrative operations
pub trait AdminOperations {
    /// Initialize with an admin and the engine configuration
    fn initialize(admin: Address, config: ReferralConfig) -> Result<(), Error>;

    /// Replace the engine configuration after validation
    fn set_config(config: ReferralConfig) -> Result<(), Error>;

    /// Stop a campaign before its end time
    fn cancel_campaign(campaign_id: u32) -> Result<(), Error>;

    /// Remove a participant from a campaign for fraud
    fn disqualify_participant(campaign_id: u32, partner: Address) -> Result<(), Error>;

    /// Pause contract operations (emergency)
    fn pause_contract() -> Result<(), Error>;

    /// Resume contract operations
    fn resume_contract() -> Result<(), Error>;

    /// Transfer admin rights to a new address
    fn transfer_admin(new_admin: Address) -> Result<(), Error>;
}

/// Payout scheduling and system metrics
pub trait ScheduleMetricsOperations {
    /// Payout phase at the current ledger time
    fn get_current_phase() -> Result<PayoutPhase, Error>;

    /// Full earnings ledger of one referrer
    fn get_earnings_history(partner: Address) -> Result<Vec<EarningsRecord>, Error>;

    /// System statistics as key-value pairs
    fn get_system_metrics() -> Result<Vec<(String, i128)>, Error>;
}
