use soroban_sdk::{contracterror, contracttype, Address, String, Vec};

/// Referrer classification driven by lifetime referral count.
/// Higher tiers scale commission through a larger multiplier.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub enum Tier {
    Bronze = 0, // 5 or fewer lifetime referrals
    Silver = 1, // 6 to 15
    Gold = 2,   // 16 and up
}

/// Subscription contract durations supported by the platform.
/// A closed set: an unknown duration cannot exist past the boundary.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ContractType {
    OneMonth,
    ThreeMonth,
    SixMonth,
}

impl ContractType {
    /// Converts a raw month count (as carried by billing events) into a
    /// contract type. Anything outside the supported set is rejected.
    pub fn from_months(months: u32) -> Result<ContractType, Error> {
        match months {
            1 => Ok(ContractType::OneMonth),
            3 => Ok(ContractType::ThreeMonth),
            6 => Ok(ContractType::SixMonth),
            _ => Err(Error::UnknownContractType),
        }
    }

    pub fn months(&self) -> u32 {
        match self {
            ContractType::OneMonth => 1,
            ContractType::ThreeMonth => 3,
            ContractType::SixMonth => 6,
        }
    }
}

/// Lifecycle of a referral relationship
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReferralStatus {
    Invited,    // Invitation sent, referred partner not yet signed up
    Registered, // Referred partner signed up with the referrer's code
    Active,     // Referred partner completed their first paid billing cycle
}

/// Link between a referrer and the partner they brought in.
/// Stored under the referred partner's address (one referrer per partner).
#[contracttype]
#[derive(Clone)]
pub struct ReferralRelationship {
    pub referrer: Address,
    pub referred: Address,
    pub created_at: u64,
    pub status: ReferralStatus,
}

/// Subscription contract of a referred partner, as reported by billing.
/// `paid_months` only ever moves forward, one confirmed payment at a time.
#[contracttype]
#[derive(Clone)]
pub struct ReferredContract {
    pub referred: Address,
    pub contract_type: ContractType,
    pub start_date: u64,
    pub paid_months: u32,
}

/// Core partner record: referral stats, bonus balances, subscription state
#[contracttype]
#[derive(Clone)]
pub struct PartnerProfile {
    pub address: Address,
    pub referrer: Option<Address>,      // Who brought this partner in
    pub direct_referrals: Vec<Address>, // Partners this one brought in
    pub active_referrals: u32,          // Referrals past their first paid cycle
    pub accumulated_bonus: i128,        // Lifetime earnings ledger sum
    pub available_bonus: i128,          // Portion cleared for withdrawal
    pub account_balance: i128,          // Platform wallet (reinvested credit, prizes)
    pub is_premium: bool,
    pub subscription_months: u32,
    pub withdrawn_this_month: i128, // Drawdown inside the current throttle window
    pub withdrawal_month: u64,      // Civil month key of the throttle window
    pub join_date: u64,
}

impl PartnerProfile {
    /// Lifetime referral count, the sole input to tier resolution.
    /// Derived from the append-only referral list so it can never drift.
    pub fn lifetime_referrals(&self) -> u32 {
        self.direct_referrals.len()
    }
}

/// Four fixed sub-periods of every calendar month gating when computed
/// earnings become withdrawable
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PayoutPhase {
    Calculation,  // Days 1-15
    Verification, // Days 16-20
    Payout,       // Days 21-25
    Available,    // Day 26 to month end
}

/// One month of commission for one referred partner. Append-only: the
/// (referrer, referred, month_index) tuple is the natural idempotency key.
#[contracttype]
#[derive(Clone)]
pub struct EarningsRecord {
    pub referrer: Address,
    pub referred: Address,
    pub month_index: u32,
    pub amount: i128,
    pub computed_at: u64,
    pub phase: PayoutPhase, // Payout phase at computation time
}

/// Handle to an earnings record from the owning referrer's side
#[contracttype]
#[derive(Clone)]
pub struct EarningsKey {
    pub referred: Address,
    pub month_index: u32,
}

/// Status of a campaign
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CampaignStatus {
    Active,
    Ended,     // Derived from end_time at read; never stored while Active
    Cancelled, // Admin decision, stored
}

/// Time-boxed referral contest
#[contracttype]
#[derive(Clone)]
pub struct Campaign {
    pub id: u32,
    pub name: String,
    pub start_time: u64,
    pub end_time: u64,
    pub target_referrals: u32,
    pub bonus_amount: i128,
    pub min_tier: Tier,
    pub min_subscription_months: u32,
    pub status: CampaignStatus,
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParticipantStatus {
    Participating,
    Winner,       // Terminal: survives campaign expiry
    Disqualified, // Admin/fraud decision, terminal
}

/// A partner's enrollment in one campaign
#[contracttype]
#[derive(Clone)]
pub struct CampaignParticipant {
    pub campaign_id: u32,
    pub partner: Address,
    pub status: ParticipantStatus,
    pub referral_count: u32, // Referrals attributed to the campaign window
    pub joined_at: u64,
}

/// Campaign snapshot for display and admin tooling
#[contracttype]
#[derive(Clone)]
pub struct CampaignStats {
    pub campaign: Campaign,
    pub participant: Vec<CampaignParticipant>, // Queried partner's entry, or empty
    pub participant_count: u32,
    pub winner_count: u32,
}

/// Outcome of the withdrawal eligibility gate. Ineligibility is an
/// expected answer, not a fault, so it travels as data with its reason.
#[contracttype]
#[derive(Clone)]
pub struct WithdrawalEligibility {
    pub allowed: bool,
    pub reason: Option<String>,
    pub max_amount: i128, // Cap for the current calendar month when allowed
}

/// How a withdrawal leaves the platform
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WithdrawalMethod {
    BankTransfer,
    EWallet,
    AccountCredit, // Fee-free, stays on platform with a reinvestment bonus
}

/// Fee and floor for one external withdrawal method
#[contracttype]
#[derive(Clone)]
pub struct MethodTerms {
    pub fee_bps: u32,
    pub min_amount: i128,
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PayoutStatus {
    Pending,   // Handed to the external rail, awaiting confirmation
    Confirmed, // Rail confirmed delivery
    Failed,    // Rail rejected; balance restored
}

/// Withdrawal handed off to the external payout rail. The available
/// balance is decremented optimistically and restored on failure.
#[contracttype]
#[derive(Clone)]
pub struct PendingPayout {
    pub id: u32,
    pub partner: Address,
    pub amount: i128, // Gross amount deducted from available balance
    pub fee: i128,
    pub method: WithdrawalMethod,
    pub requested_at: u64,
    pub status: PayoutStatus,
}

/// Tier thresholds and multipliers (basis points, 10000 = 1.0x)
#[contracttype]
#[derive(Clone)]
pub struct TierSchedule {
    pub silver_min: u32, // Lifetime referrals for Silver
    pub gold_min: u32,   // Lifetime referrals for Gold
    pub bronze_multiplier_bps: u32,
    pub silver_multiplier_bps: u32,
    pub gold_multiplier_bps: u32,
}

/// Commission rates per contract type (basis points of platform profit)
#[contracttype]
#[derive(Clone)]
pub struct CommissionRates {
    pub renewal_schedule_bps: Vec<u32>, // 1-month contracts: rate per renewal cycle
    pub three_month_rate_bps: u32,
    pub six_month_rate_bps: u32,
    pub covered_months: u32, // Months participating in the scheme per contract
}

/// Day-of-month boundaries of the four payout phases. The last day of
/// each phase is inclusive; everything past `payout_end_day` is Available.
#[contracttype]
#[derive(Clone)]
pub struct PayoutWindows {
    pub calculation_end_day: u32,
    pub verification_end_day: u32,
    pub payout_end_day: u32,
}

/// Withdrawal gate thresholds, monthly throttle and per-method terms
#[contracttype]
#[derive(Clone)]
pub struct WithdrawalPolicy {
    pub min_withdrawal: i128,
    pub monthly_cap_bps: u32, // Max share of accumulated bonus per calendar month
    pub required_premium_months: u32,
    pub required_active_referrals: u32,
    pub bank_transfer: MethodTerms,
    pub e_wallet: MethodTerms,
    pub reinvest_bonus_bps: u32, // Extra credit on the account-balance path
}

/// Full engine configuration, stored at initialization and replaceable
/// by the admin. Every rate the engine applies comes from here.
#[contracttype]
#[derive(Clone)]
pub struct ReferralConfig {
    pub tiers: TierSchedule,
    pub rates: CommissionRates,
    pub windows: PayoutWindows,
    pub withdrawal: WithdrawalPolicy,
}

/// Storage keys for contract data
#[contracttype]
pub enum DataKey {
    Admin,                          // Contract administrator
    Config,                         // ReferralConfig
    ContractPaused,                 // Emergency pause flag
    TotalPartners,                  // Registered partner count
    TotalDistributed,               // Sum of all accrued commission
    CampaignCount,                  // Counter for campaign IDs
    PayoutCount,                    // Counter for payout IDs
    Partner(Address),               // Partner profile
    Referral(Address),              // Referred partner -> relationship
    SubContract(Address),           // Referred partner -> subscription contract
    Earnings(Address, Address, u32), // (referrer, referred, month) -> record
    Unsettled(Address),             // Referrer -> keys awaiting availability
    EarningsIndex(Address),         // Referrer -> all earnings keys
    Campaign(u32),                  // Campaign data
    Participant(u32, Address),      // (campaign, partner) -> enrollment
    CampaignPartners(u32),          // Campaign -> enrolled partners
    Payout(u32),                    // Pending payout record
}

/// Contract error types
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    NotInitialized = 1,        // Contract not initialized
    AlreadyInitialized = 2,    // Contract already setup
    Unauthorized = 3,          // Caller lacks permission
    AlreadyRegistered = 4,     // Partner already exists
    PartnerNotFound = 5,       // Partner doesn't exist
    ReferrerNotFound = 6,      // Referrer doesn't exist
    SelfReferral = 7,          // Partner used their own code
    ReferralNotFound = 8,      // No relationship for referred partner
    UnknownContractType = 9,   // Unsupported contract duration
    DuplicateEarnings = 10,    // Earnings tuple already recorded
    InvalidAmount = 11,        // Non-positive or out-of-range amount
    InvalidCampaignParams = 12, // Bad campaign creation parameters
    CampaignNotFound = 13,     // Campaign doesn't exist
    CampaignNotActive = 14,    // Campaign expired or ended
    CampaignCancelled = 15,    // Campaign was cancelled by admin
    AlreadyParticipating = 16, // Partner already joined this campaign
    NotParticipating = 17,     // No live enrollment for this pair
    TierTooLow = 18,           // Partner tier below campaign minimum
    ReferralOutsideWindow = 19, // Referral timestamp outside campaign window
    WithdrawalNotAllowed = 20, // Eligibility gate rejected the withdrawal
    BelowMethodMinimum = 21,   // Amount under the method's floor
    ExceedsMonthlyCap = 22,    // Monthly drawdown throttle hit
    PayoutNotFound = 23,       // Payout record doesn't exist
    PayoutAlreadySettled = 24, // Payout no longer pending
    InvalidConfig = 25,        // Configuration failed validation
    ContractPaused = 26,       // Contract is paused
}
