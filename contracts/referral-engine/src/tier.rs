use crate::helpers::{get_config, get_profile};
use crate::types::{Error, Tier, TierSchedule};
use soroban_sdk::{Address, Env};

pub struct TierModule;

impl TierModule {
    /// Maps a lifetime referral count to a tier. Total over all counts;
    /// boundary counts belong to the higher tier.
    pub fn resolve_tier(schedule: &TierSchedule, lifetime_referrals: u32) -> Tier {
        if lifetime_referrals >= schedule.gold_min {
            return Tier::Gold;
        }
        if lifetime_referrals >= schedule.silver_min {
            return Tier::Silver;
        }
        Tier::Bronze
    }

    /// Commission multiplier for a tier, in basis points (10000 = 1.0x)
    pub fn multiplier_bps(schedule: &TierSchedule, tier: Tier) -> u32 {
        match tier {
            Tier::Bronze => schedule.bronze_multiplier_bps,
            Tier::Silver => schedule.silver_multiplier_bps,
            Tier::Gold => schedule.gold_multiplier_bps,
        }
    }

    /// Current tier of a partner, recomputed from the profile's lifetime
    /// referral count on every read. Never cached: a count that crosses a
    /// tier boundary takes effect immediately.
    pub fn partner_tier(env: &Env, partner: &Address) -> Result<Tier, Error> {
        let config = get_config(env)?;
        let profile = get_profile(env, partner)?;
        Ok(Self::resolve_tier(
            &config.tiers,
            profile.lifetime_referrals(),
        ))
    }
}
