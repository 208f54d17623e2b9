use crate::helpers::{
    ensure_contract_active, get_profile, partner_exists, set_profile, verify_admin,
};
use crate::types::{DataKey, Error, PartnerProfile, ReferralRelationship, ReferralStatus};
use soroban_sdk::{Address, Env, Symbol, Vec};

pub struct PartnerModule;

impl PartnerModule {
    /// Registers a partner with no referrer (organic signup)
    pub fn register_partner(env: Env, partner: Address) -> Result<(), Error> {
        ensure_contract_active(&env)?;
        partner.require_auth();

        if partner_exists(&env, &partner) {
            return Err(Error::AlreadyRegistered);
        }

        let profile = Self::new_profile(&env, &partner, None);
        set_profile(&env, &profile);
        Self::increment_total_partners(&env);

        Ok(())
    }

    /// Records an invitation sent to a prospective partner. The
    /// relationship sits at Invited until the invitee actually signs up;
    /// the referrer's lifetime count is untouched until then.
    pub fn invite_referral(env: Env, referrer: Address, invitee: Address) -> Result<(), Error> {
        ensure_contract_active(&env)?;
        referrer.require_auth();

        if referrer == invitee {
            return Err(Error::SelfReferral);
        }
        if !partner_exists(&env, &referrer) {
            return Err(Error::PartnerNotFound);
        }
        if partner_exists(&env, &invitee)
            || env
                .storage()
                .persistent()
                .has(&DataKey::Referral(invitee.clone()))
        {
            return Err(Error::AlreadyRegistered);
        }

        let relationship = ReferralRelationship {
            referrer: referrer.clone(),
            referred: invitee.clone(),
            created_at: env.ledger().timestamp(),
            status: ReferralStatus::Invited,
        };
        env.storage()
            .persistent()
            .set(&DataKey::Referral(invitee.clone()), &relationship);

        env.events()
            .publish((Symbol::new(&env, "referral_invited"), referrer), invitee);

        Ok(())
    }

    /// Registers a partner who signed up with a referrer's code. Creates
    /// the referral relationship at Registered; it becomes Active only
    /// after the first confirmed subscription payment.
    pub fn register_with_referral(
        env: Env,
        partner: Address,
        referrer: Address,
    ) -> Result<(), Error> {
        ensure_contract_active(&env)?;
        partner.require_auth();

        if partner == referrer {
            return Err(Error::SelfReferral);
        }
        if partner_exists(&env, &partner) {
            return Err(Error::AlreadyRegistered);
        }
        if !partner_exists(&env, &referrer) {
            return Err(Error::ReferrerNotFound);
        }

        let now = env.ledger().timestamp();

        let profile = Self::new_profile(&env, &partner, Some(referrer.clone()));
        set_profile(&env, &profile);

        let relationship = ReferralRelationship {
            referrer: referrer.clone(),
            referred: partner.clone(),
            created_at: now,
            status: ReferralStatus::Registered,
        };
        env.storage()
            .persistent()
            .set(&DataKey::Referral(partner.clone()), &relationship);

        // The lifetime count grows here and only here; tier resolution
        // reads it fresh on every use
        let mut referrer_profile = get_profile(&env, &referrer)?;
        referrer_profile.direct_referrals.push_back(partner.clone());
        set_profile(&env, &referrer_profile);

        Self::increment_total_partners(&env);

        env.events().publish(
            (Symbol::new(&env, "referral_created"), referrer),
            (partner, now),
        );

        Ok(())
    }

    /// Subscription state feed from the partner/account collaborator
    pub fn set_subscription(
        env: Env,
        partner: Address,
        is_premium: bool,
        subscription_months: u32,
    ) -> Result<(), Error> {
        ensure_contract_active(&env)?;
        verify_admin(&env)?;

        let mut profile = get_profile(&env, &partner)?;
        profile.is_premium = is_premium;
        profile.subscription_months = subscription_months;
        set_profile(&env, &profile);

        Ok(())
    }

    pub fn get_partner(env: Env, partner: Address) -> Result<PartnerProfile, Error> {
        get_profile(&env, &partner)
    }

    pub fn get_referral(env: Env, referred: Address) -> Result<ReferralRelationship, Error> {
        env.storage()
            .persistent()
            .get(&DataKey::Referral(referred))
            .ok_or(Error::ReferralNotFound)
    }

    pub fn get_direct_referrals(env: Env, partner: Address) -> Result<Vec<Address>, Error> {
        let profile = get_profile(&env, &partner)?;
        Ok(profile.direct_referrals)
    }

    fn new_profile(env: &Env, partner: &Address, referrer: Option<Address>) -> PartnerProfile {
        PartnerProfile {
            address: partner.clone(),
            referrer,
            direct_referrals: Vec::new(env),
            active_referrals: 0,
            accumulated_bonus: 0,
            available_bonus: 0,
            account_balance: 0,
            is_premium: false,
            subscription_months: 0,
            withdrawn_this_month: 0,
            withdrawal_month: 0,
            join_date: env.ledger().timestamp(),
        }
    }

    fn increment_total_partners(env: &Env) {
        let current: u32 = env
            .storage()
            .persistent()
            .get(&DataKey::TotalPartners)
            .unwrap_or(0);
        env.storage()
            .persistent()
            .set(&DataKey::TotalPartners, &(current + 1));
    }
}
