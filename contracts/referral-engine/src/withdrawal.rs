use crate::helpers::{ensure_contract_active, get_config, get_profile, set_profile, verify_admin};
use crate::schedule::ScheduleModule;
use crate::types::{
    DataKey, Error, MethodTerms, PartnerProfile, PayoutStatus, PendingPayout,
    WithdrawalEligibility, WithdrawalMethod, WithdrawalPolicy,
};
use soroban_sdk::{Address, Env, String, Symbol};

pub struct WithdrawalModule;

const BPS_DENOMINATOR: i128 = 10_000;

impl WithdrawalModule {
    /// Withdrawal eligibility gate. Checks run in strict order and stop
    /// at the first failure, so the reason always names the first unmet
    /// rule. Sweeps cleared earnings into the available balance first.
    pub fn check_withdrawal(env: Env, partner: Address) -> Result<WithdrawalEligibility, Error> {
        ScheduleModule::settle_available(&env, &partner)?;

        let config = get_config(&env)?;
        let mut profile = get_profile(&env, &partner)?;
        Self::roll_monthly_window(&env, &mut profile);
        set_profile(&env, &profile);

        Ok(Self::evaluate_gate(&env, &config.withdrawal, &profile))
    }

    /// Executes a withdrawal: gate, method floor and monthly throttle,
    /// then the balance decrement. External-rail methods park a pending
    /// payout and decrement optimistically; the account-credit method
    /// settles on the spot with the reinvestment bonus.
    pub fn request_withdrawal(
        env: Env,
        partner: Address,
        amount: i128,
        method: WithdrawalMethod,
    ) -> Result<u32, Error> {
        ensure_contract_active(&env)?;
        partner.require_auth();

        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        ScheduleModule::settle_available(&env, &partner)?;

        let config = get_config(&env)?;
        let mut profile = get_profile(&env, &partner)?;
        Self::roll_monthly_window(&env, &mut profile);

        let eligibility = Self::evaluate_gate(&env, &config.withdrawal, &profile);
        if !eligibility.allowed {
            return Err(Error::WithdrawalNotAllowed);
        }
        if amount > eligibility.max_amount {
            return Err(Error::ExceedsMonthlyCap);
        }

        let terms = Self::method_terms(&config.withdrawal, method);
        if amount < terms.min_amount {
            return Err(Error::BelowMethodMinimum);
        }
        let fee = amount * terms.fee_bps as i128 / BPS_DENOMINATOR;

        // The decrement and the payout record commit in this same
        // invocation: no window for a second call to spend the same funds
        profile.available_bonus -= amount;
        profile.withdrawn_this_month += amount;

        let payout_id = match method {
            WithdrawalMethod::AccountCredit => {
                // Stays on platform: fee-free, credited with the
                // reinvestment bonus into the partner's own wallet
                let credited =
                    amount + amount * config.withdrawal.reinvest_bonus_bps as i128 / BPS_DENOMINATOR;
                profile.account_balance += credited;
                set_profile(&env, &profile);

                let id = Self::store_payout(&env, &partner, amount, 0, method, PayoutStatus::Confirmed);

                env.events().publish(
                    (Symbol::new(&env, "bonus_reinvested"), partner),
                    (amount, credited),
                );
                id
            }
            _ => {
                set_profile(&env, &profile);

                let id = Self::store_payout(&env, &partner, amount, fee, method, PayoutStatus::Pending);

                env.events().publish(
                    (Symbol::new(&env, "payout_requested"), partner),
                    (id, amount, fee),
                );
                id
            }
        };

        Ok(payout_id)
    }

    /// Rail callback: payout delivered
    pub fn confirm_payout(env: Env, payout_id: u32) -> Result<(), Error> {
        verify_admin(&env)?;

        let mut payout = Self::get_payout(&env, payout_id)?;
        if payout.status != PayoutStatus::Pending {
            return Err(Error::PayoutAlreadySettled);
        }

        payout.status = PayoutStatus::Confirmed;
        env.storage()
            .persistent()
            .set(&DataKey::Payout(payout_id), &payout);

        env.events().publish(
            (Symbol::new(&env, "payout_confirmed"), payout.partner),
            payout_id,
        );

        Ok(())
    }

    /// Rail callback: payout failed. Restores the optimistically
    /// decremented balance and the monthly throttle headroom.
    pub fn fail_payout(env: Env, payout_id: u32) -> Result<(), Error> {
        verify_admin(&env)?;

        let mut payout = Self::get_payout(&env, payout_id)?;
        if payout.status != PayoutStatus::Pending {
            return Err(Error::PayoutAlreadySettled);
        }

        payout.status = PayoutStatus::Failed;
        env.storage()
            .persistent()
            .set(&DataKey::Payout(payout_id), &payout);

        let mut profile = get_profile(&env, &payout.partner)?;
        profile.available_bonus += payout.amount;
        // The throttle counter is only refunded while its window still
        // covers the request; a rolled-over window owes nothing back
        if ScheduleModule::month_key(payout.requested_at) == profile.withdrawal_month {
            profile.withdrawn_this_month -= payout.amount;
        }
        set_profile(&env, &profile);

        env.events().publish(
            (Symbol::new(&env, "payout_failed"), payout.partner.clone()),
            payout_id,
        );

        Ok(())
    }

    pub fn get_payout(env: &Env, payout_id: u32) -> Result<PendingPayout, Error> {
        env.storage()
            .persistent()
            .get(&DataKey::Payout(payout_id))
            .ok_or(Error::PayoutNotFound)
    }

    fn evaluate_gate(
        env: &Env,
        policy: &WithdrawalPolicy,
        profile: &PartnerProfile,
    ) -> WithdrawalEligibility {
        if !profile.is_premium || profile.subscription_months < policy.required_premium_months {
            return Self::denied(env, "6-month Premium required.");
        }

        if profile.active_referrals < policy.required_active_referrals {
            return Self::denied(env, "minimum 3 active referrals required.");
        }

        if profile.available_bonus < policy.min_withdrawal {
            return Self::denied(env, "minimum withdrawal amount not met.");
        }

        // Monthly drawdown throttle: a capped share of the lifetime
        // accumulated bonus per calendar month, however high the
        // available balance is
        let monthly_cap =
            profile.accumulated_bonus * policy.monthly_cap_bps as i128 / BPS_DENOMINATOR;
        let mut headroom = monthly_cap - profile.withdrawn_this_month;
        if headroom < 0 {
            headroom = 0;
        }

        let max_amount = profile.available_bonus.min(headroom);

        WithdrawalEligibility {
            allowed: true,
            reason: None,
            max_amount,
        }
    }

    fn denied(env: &Env, reason: &str) -> WithdrawalEligibility {
        WithdrawalEligibility {
            allowed: false,
            reason: Some(String::from_str(env, reason)),
            max_amount: 0,
        }
    }

    fn method_terms(policy: &WithdrawalPolicy, method: WithdrawalMethod) -> MethodTerms {
        match method {
            WithdrawalMethod::BankTransfer => policy.bank_transfer.clone(),
            WithdrawalMethod::EWallet => policy.e_wallet.clone(),
            // Fee-free with no floor of its own
            WithdrawalMethod::AccountCredit => MethodTerms {
                fee_bps: 0,
                min_amount: 0,
            },
        }
    }

    // The throttle window is keyed by civil calendar month and rolled
    // lazily the first time a new month is touched
    fn roll_monthly_window(env: &Env, profile: &mut PartnerProfile) {
        let current_month = ScheduleModule::month_key(env.ledger().timestamp());
        if profile.withdrawal_month != current_month {
            profile.withdrawal_month = current_month;
            profile.withdrawn_this_month = 0;
        }
    }

    fn store_payout(
        env: &Env,
        partner: &Address,
        amount: i128,
        fee: i128,
        method: WithdrawalMethod,
        status: PayoutStatus,
    ) -> u32 {
        let count: u32 = env
            .storage()
            .instance()
            .get(&DataKey::PayoutCount)
            .unwrap_or(0);
        let id = count + 1;
        env.storage().instance().set(&DataKey::PayoutCount, &id);

        let payout = PendingPayout {
            id,
            partner: partner.clone(),
            amount,
            fee,
            method,
            requested_at: env.ledger().timestamp(),
            status,
        };
        env.storage().persistent().set(&DataKey::Payout(id), &payout);

        id
    }
}
