use crate::helpers::{ensure_contract_active, get_profile, set_profile, verify_admin};
use crate::tier::TierModule;
use crate::types::{
    Campaign, CampaignParticipant, CampaignStats, CampaignStatus, ContractType, DataKey, Error,
    ParticipantStatus, Tier,
};
use soroban_sdk::{Address, Env, String, Symbol, Vec};

pub struct CampaignModule;

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

impl CampaignModule {
    /// Creates a time-boxed referral contest. Admin only.
    pub fn create_campaign(
        env: Env,
        name: String,
        duration_days: u32,
        target_referrals: u32,
        bonus_amount: i128,
        min_tier: Tier,
        min_subscription_months: u32,
    ) -> Result<u32, Error> {
        ensure_contract_active(&env)?;
        verify_admin(&env)?;

        if duration_days < 1 || target_referrals < 1 || bonus_amount < 0 {
            return Err(Error::InvalidCampaignParams);
        }
        // Must be one of the contract-supported subscription durations
        if ContractType::from_months(min_subscription_months).is_err() {
            return Err(Error::InvalidCampaignParams);
        }

        let now = env.ledger().timestamp();
        let campaign_id = Self::next_campaign_id(&env);

        let campaign = Campaign {
            id: campaign_id,
            name,
            start_time: now,
            end_time: now + duration_days as u64 * SECONDS_PER_DAY,
            target_referrals,
            bonus_amount,
            min_tier,
            min_subscription_months,
            status: CampaignStatus::Active,
        };

        env.storage()
            .persistent()
            .set(&DataKey::Campaign(campaign_id), &campaign);
        env.storage().persistent().set(
            &DataKey::CampaignPartners(campaign_id),
            &Vec::<Address>::new(&env),
        );

        env.events().publish(
            (Symbol::new(&env, "campaign_created"), campaign_id),
            (campaign.start_time, campaign.end_time, target_referrals),
        );

        Ok(campaign_id)
    }

    /// Opt-in enrollment. Joining is explicit; no partner is enrolled
    /// automatically.
    pub fn join_campaign(env: Env, campaign_id: u32, partner: Address) -> Result<(), Error> {
        ensure_contract_active(&env)?;
        partner.require_auth();

        let campaign = Self::get_campaign_raw(&env, campaign_id)?;
        Self::ensure_live(&env, &campaign)?;

        if env
            .storage()
            .persistent()
            .has(&DataKey::Participant(campaign_id, partner.clone()))
        {
            return Err(Error::AlreadyParticipating);
        }

        let tier = TierModule::partner_tier(&env, &partner)?;
        if tier < campaign.min_tier {
            return Err(Error::TierTooLow);
        }

        let participant = CampaignParticipant {
            campaign_id,
            partner: partner.clone(),
            status: ParticipantStatus::Participating,
            referral_count: 0,
            joined_at: env.ledger().timestamp(),
        };
        env.storage()
            .persistent()
            .set(&DataKey::Participant(campaign_id, partner.clone()), &participant);

        let mut enrolled: Vec<Address> = env
            .storage()
            .persistent()
            .get(&DataKey::CampaignPartners(campaign_id))
            .unwrap_or_else(|| Vec::new(&env));
        enrolled.push_back(partner.clone());
        env.storage()
            .persistent()
            .set(&DataKey::CampaignPartners(campaign_id), &enrolled);

        env.events().publish(
            (Symbol::new(&env, "campaign_joined"), campaign_id),
            partner,
        );

        Ok(())
    }

    /// Attributes one referral to a participant's campaign progress. Fed
    /// by the platform's referral-creation events. The increment and the
    /// winner check are one read-modify-write, so retried deliveries of
    /// the same event stream cannot award the prize twice.
    pub fn record_campaign_referral(
        env: Env,
        campaign_id: u32,
        referrer: Address,
        referral_timestamp: u64,
    ) -> Result<(), Error> {
        ensure_contract_active(&env)?;
        verify_admin(&env)?;

        let campaign = Self::get_campaign_raw(&env, campaign_id)?;
        Self::ensure_live(&env, &campaign)?;

        let mut participant: CampaignParticipant = env
            .storage()
            .persistent()
            .get(&DataKey::Participant(campaign_id, referrer.clone()))
            .ok_or(Error::NotParticipating)?;

        if participant.status == ParticipantStatus::Disqualified {
            return Err(Error::NotParticipating);
        }

        if referral_timestamp < campaign.start_time || referral_timestamp > campaign.end_time {
            return Err(Error::ReferralOutsideWindow);
        }
        // Only referrals made while the partner was already enrolled count;
        // nothing is credited retroactively for the pre-join stretch
        if referral_timestamp < participant.joined_at {
            return Err(Error::ReferralOutsideWindow);
        }

        participant.referral_count += 1;

        // Threshold contest: every participant who reaches the target
        // before expiry wins independently. Winner is terminal; referrals
        // past the target keep counting without touching the status.
        if participant.status == ParticipantStatus::Participating
            && participant.referral_count >= campaign.target_referrals
        {
            participant.status = ParticipantStatus::Winner;

            // Prize lands in the partner's platform account balance; the
            // commission ledger and its balances stay untouched
            let mut profile = get_profile(&env, &referrer)?;
            profile.account_balance += campaign.bonus_amount;
            set_profile(&env, &profile);

            env.events().publish(
                (Symbol::new(&env, "campaign_winner"), campaign_id),
                (referrer.clone(), campaign.bonus_amount),
            );
        }

        env.storage()
            .persistent()
            .set(&DataKey::Participant(campaign_id, referrer), &participant);

        Ok(())
    }

    /// Campaigns still live right now. Expired ones are filtered out
    /// lazily; nothing is written back.
    pub fn get_active_campaigns(env: Env) -> Result<Vec<Campaign>, Error> {
        let now = env.ledger().timestamp();
        let count: u32 = env
            .storage()
            .instance()
            .get(&DataKey::CampaignCount)
            .unwrap_or(0);

        let mut active = Vec::new(&env);
        for id in 1..=count {
            if let Some(campaign) = env
                .storage()
                .persistent()
                .get::<_, Campaign>(&DataKey::Campaign(id))
            {
                if campaign.status == CampaignStatus::Active && now <= campaign.end_time {
                    active.push_back(campaign);
                }
            }
        }

        Ok(active)
    }

    /// Campaign with its status derived from the clock: an Active record
    /// past its end time reads as Ended without a stored flag.
    pub fn get_campaign(env: Env, campaign_id: u32) -> Result<Campaign, Error> {
        let mut campaign = Self::get_campaign_raw(&env, campaign_id)?;
        if campaign.status == CampaignStatus::Active
            && env.ledger().timestamp() > campaign.end_time
        {
            campaign.status = CampaignStatus::Ended;
        }
        Ok(campaign)
    }

    pub fn get_campaign_stats(
        env: Env,
        campaign_id: u32,
        partner: Address,
    ) -> Result<CampaignStats, Error> {
        let campaign = Self::get_campaign(env.clone(), campaign_id)?;

        let mut participant = Vec::new(&env);
        if let Some(entry) = env
            .storage()
            .persistent()
            .get::<_, CampaignParticipant>(&DataKey::Participant(campaign_id, partner))
        {
            participant.push_back(entry);
        }

        let enrolled: Vec<Address> = env
            .storage()
            .persistent()
            .get(&DataKey::CampaignPartners(campaign_id))
            .unwrap_or_else(|| Vec::new(&env));

        let mut winner_count = 0;
        for address in enrolled.iter() {
            if let Some(entry) = env
                .storage()
                .persistent()
                .get::<_, CampaignParticipant>(&DataKey::Participant(campaign_id, address))
            {
                if entry.status == ParticipantStatus::Winner {
                    winner_count += 1;
                }
            }
        }

        Ok(CampaignStats {
            campaign,
            participant,
            participant_count: enrolled.len(),
            winner_count,
        })
    }

    /// Admin stops a campaign before its end time. One-way.
    pub fn cancel_campaign(env: Env, campaign_id: u32) -> Result<(), Error> {
        verify_admin(&env)?;

        let mut campaign = Self::get_campaign_raw(&env, campaign_id)?;
        if campaign.status != CampaignStatus::Active {
            return Err(Error::CampaignNotActive);
        }

        campaign.status = CampaignStatus::Cancelled;
        env.storage()
            .persistent()
            .set(&DataKey::Campaign(campaign_id), &campaign);

        env.events()
            .publish((Symbol::new(&env, "campaign_cancelled"), campaign_id), ());

        Ok(())
    }

    /// Admin removes a participant for fraud. Only a Participating entry
    /// can be disqualified; Winner is terminal.
    pub fn disqualify_participant(
        env: Env,
        campaign_id: u32,
        partner: Address,
    ) -> Result<(), Error> {
        verify_admin(&env)?;

        let mut participant: CampaignParticipant = env
            .storage()
            .persistent()
            .get(&DataKey::Participant(campaign_id, partner.clone()))
            .ok_or(Error::NotParticipating)?;

        if participant.status != ParticipantStatus::Participating {
            return Err(Error::NotParticipating);
        }

        participant.status = ParticipantStatus::Disqualified;
        env.storage()
            .persistent()
            .set(&DataKey::Participant(campaign_id, partner.clone()), &participant);

        env.events().publish(
            (Symbol::new(&env, "participant_disqualified"), campaign_id),
            partner,
        );

        Ok(())
    }

    // Write operations on an expired or cancelled campaign must reject,
    // even though reads only filter lazily
    fn ensure_live(env: &Env, campaign: &Campaign) -> Result<(), Error> {
        match campaign.status {
            CampaignStatus::Cancelled => Err(Error::CampaignCancelled),
            CampaignStatus::Ended => Err(Error::CampaignNotActive),
            CampaignStatus::Active => {
                if env.ledger().timestamp() > campaign.end_time {
                    Err(Error::CampaignNotActive)
                } else {
                    Ok(())
                }
            }
        }
    }

    fn get_campaign_raw(env: &Env, campaign_id: u32) -> Result<Campaign, Error> {
        env.storage()
            .persistent()
            .get(&DataKey::Campaign(campaign_id))
            .ok_or(Error::CampaignNotFound)
    }

    fn next_campaign_id(env: &Env) -> u32 {
        let count: u32 = env
            .storage()
            .instance()
            .get(&DataKey::CampaignCount)
            .unwrap_or(0);
        let next = count + 1;
        env.storage().instance().set(&DataKey::CampaignCount, &next);
        next
    }
}
