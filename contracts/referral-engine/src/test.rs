use super::*;
use crate::types::{
    CampaignStatus, ParticipantStatus, PayoutPhase, PayoutStatus, ReferralStatus, Tier,
    WithdrawalMethod,
};
use soroban_sdk::testutils::{Address as _, Ledger};
use soroban_sdk::{Address, Env, String};

#[cfg(test)]
mod test_setup {
    use super::*;

    pub const DAY: u64 = 24 * 60 * 60;

    pub fn setup_contract(e: &Env) -> (ReferralEngineContractClient, Address) {
        let admin = Address::generate(e);
        let contract_id = e.register(ReferralEngineContract, {});
        let client = ReferralEngineContractClient::new(e, &contract_id);

        e.mock_all_auths();
        client.initialize(&admin);

        (client, admin)
    }

    /// Ledger time at 00:00 of the given day of January 1970
    pub fn january(day: u64) -> u64 {
        (day - 1) * DAY
    }

    pub fn set_time(e: &Env, timestamp: u64) {
        e.ledger().with_mut(|li| li.timestamp = timestamp);
    }

    /// Referrer with `count` registered referrals, returned with the
    /// referred addresses
    pub fn referrer_with_referrals(
        e: &Env,
        contract: &ReferralEngineContractClient,
        count: u32,
    ) -> (Address, soroban_sdk::Vec<Address>) {
        let referrer = Address::generate(e);
        contract.register_partner(&referrer);

        let mut referred = soroban_sdk::Vec::new(e);
        for _ in 0..count {
            let partner = Address::generate(e);
            contract.register_with_referral(&partner, &referrer);
            referred.push_back(partner);
        }

        (referrer, referred)
    }
}

mod test_admin {
    use super::*;

    #[test]
    #[should_panic(expected = "Error(Contract, #2)")]
    fn test_double_initialization() {
        let env = Env::default();
        let (contract, admin) = test_setup::setup_contract(&env);

        assert!(!contract.get_paused_state());

        env.mock_all_auths();
        contract.initialize(&admin);
    }

    #[test]
    fn test_pause_resume() {
        let env = Env::default();
        let (contract, _) = test_setup::setup_contract(&env);

        env.mock_all_auths();
        contract.pause_contract();
        assert!(contract.get_paused_state());

        contract.resume_contract();
        assert!(!contract.get_paused_state());
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #26)")]
    fn test_pause_blocks_registration() {
        let env = Env::default();
        let (contract, _) = test_setup::setup_contract(&env);

        env.mock_all_auths();
        contract.pause_contract();

        let partner = Address::generate(&env);
        contract.register_partner(&partner);
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #25)")]
    fn test_invalid_config_rejected() {
        let env = Env::default();
        let (contract, _) = test_setup::setup_contract(&env);

        env.mock_all_auths();
        let mut config = contract.get_config();
        config.tiers.gold_min = config.tiers.silver_min; // thresholds must be ordered
        contract.set_config(&config);
    }

    #[test]
    fn test_transfer_admin() {
        let env = Env::default();
        let (contract, _) = test_setup::setup_contract(&env);

        env.mock_all_auths();
        let new_admin = Address::generate(&env);
        contract.transfer_admin(&new_admin);
        assert_eq!(contract.get_admin(), new_admin);
    }
}

mod test_partners {
    use super::*;

    #[test]
    fn test_referral_registration() {
        let env = Env::default();
        let (contract, _) = test_setup::setup_contract(&env);

        env.mock_all_auths();
        let referrer = Address::generate(&env);
        contract.register_partner(&referrer);

        let partner = Address::generate(&env);
        contract.register_with_referral(&partner, &referrer);

        let relationship = contract.get_referral(&partner);
        assert_eq!(relationship.referrer, referrer);
        assert_eq!(relationship.status, ReferralStatus::Registered);

        let referrals = contract.get_direct_referrals(&referrer);
        assert_eq!(referrals.len(), 1);
        assert_eq!(contract.get_total_partners(), 2);
    }

    #[test]
    fn test_invitation_upgrades_on_signup() {
        let env = Env::default();
        let (contract, _) = test_setup::setup_contract(&env);

        env.mock_all_auths();
        let referrer = Address::generate(&env);
        contract.register_partner(&referrer);

        let invitee = Address::generate(&env);
        contract.invite_referral(&referrer, &invitee);

        let relationship = contract.get_referral(&invitee);
        assert_eq!(relationship.status, ReferralStatus::Invited);
        // Invitations alone never move the lifetime count
        assert_eq!(contract.get_direct_referrals(&referrer).len(), 0);

        contract.register_with_referral(&invitee, &referrer);
        let relationship = contract.get_referral(&invitee);
        assert_eq!(relationship.status, ReferralStatus::Registered);
        assert_eq!(contract.get_direct_referrals(&referrer).len(), 1);
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #7)")]
    fn test_self_referral_rejected() {
        let env = Env::default();
        let (contract, _) = test_setup::setup_contract(&env);

        env.mock_all_auths();
        let partner = Address::generate(&env);
        contract.register_with_referral(&partner, &partner);
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #4)")]
    fn test_double_registration_rejected() {
        let env = Env::default();
        let (contract, _) = test_setup::setup_contract(&env);

        env.mock_all_auths();
        let partner = Address::generate(&env);
        contract.register_partner(&partner);
        contract.register_partner(&partner);
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #6)")]
    fn test_unknown_referrer_rejected() {
        let env = Env::default();
        let (contract, _) = test_setup::setup_contract(&env);

        env.mock_all_auths();
        let partner = Address::generate(&env);
        let stranger = Address::generate(&env);
        contract.register_with_referral(&partner, &stranger);
    }
}

mod test_tiers {
    use super::*;

    #[test]
    fn test_tier_boundaries() {
        let env = Env::default();
        let (contract, _) = test_setup::setup_contract(&env);

        assert_eq!(contract.resolve_tier(&0), Tier::Bronze);
        assert_eq!(contract.resolve_tier(&5), Tier::Bronze);
        assert_eq!(contract.resolve_tier(&6), Tier::Silver);
        assert_eq!(contract.resolve_tier(&15), Tier::Silver);
        assert_eq!(contract.resolve_tier(&16), Tier::Gold);
        assert_eq!(contract.resolve_tier(&100), Tier::Gold);
    }

    #[test]
    fn test_tier_tracks_live_referral_count() {
        let env = Env::default();
        let (contract, _) = test_setup::setup_contract(&env);

        env.mock_all_auths();
        let (referrer, _) = test_setup::referrer_with_referrals(&env, &contract, 5);
        assert_eq!(contract.get_partner_tier(&referrer), Tier::Bronze);

        // The sixth referral crosses the boundary with no cache to go stale
        let partner = Address::generate(&env);
        contract.register_with_referral(&partner, &referrer);
        assert_eq!(contract.get_partner_tier(&referrer), Tier::Silver);
    }
}

mod test_commission {
    use super::*;

    #[test]
    fn test_one_month_schedule() {
        let env = Env::default();
        let (contract, _) = test_setup::setup_contract(&env);

        // 5% on the first cycle, bronze multiplier 1.00
        assert_eq!(
            contract.preview_bonus(&1_000_000, &1, &Tier::Bronze, &1, &1),
            50_000
        );
        // 10% on the second cycle, silver multiplier 1.10
        assert_eq!(
            contract.preview_bonus(&1_000_000, &1, &Tier::Silver, &2, &1),
            110_000
        );
        // Past the schedule's end: lookup miss yields 0, not an error
        assert_eq!(
            contract.preview_bonus(&1_000_000, &1, &Tier::Gold, &4, &4),
            0
        );
    }

    #[test]
    fn test_flat_rates_and_participation_cap() {
        let env = Env::default();
        let (contract, _) = test_setup::setup_contract(&env);

        assert_eq!(
            contract.preview_bonus(&1_000_000, &3, &Tier::Bronze, &2, &2),
            200_000
        );
        assert_eq!(
            contract.preview_bonus(&1_000_000, &6, &Tier::Bronze, &3, &3),
            250_000
        );
        // The 6-month contract runs six months but only the first three
        // participate in the scheme
        assert_eq!(
            contract.preview_bonus(&1_000_000, &6, &Tier::Gold, &4, &4),
            0
        );
    }

    #[test]
    fn test_no_bonus_before_first_paid_cycle() {
        let env = Env::default();
        let (contract, _) = test_setup::setup_contract(&env);

        assert_eq!(
            contract.preview_bonus(&1_000_000, &1, &Tier::Gold, &1, &0),
            0
        );
        assert_eq!(
            contract.preview_bonus(&1_000_000, &6, &Tier::Gold, &1, &0),
            0
        );
    }

    #[test]
    fn test_loss_month_propagates() {
        let env = Env::default();
        let (contract, _) = test_setup::setup_contract(&env);

        assert_eq!(
            contract.preview_bonus(&-1_000_000, &3, &Tier::Bronze, &1, &1),
            -200_000
        );
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #9)")]
    fn test_unknown_contract_type() {
        let env = Env::default();
        let (contract, _) = test_setup::setup_contract(&env);

        contract.preview_bonus(&1_000_000, &2, &Tier::Bronze, &1, &1);
    }

    #[test]
    fn test_payment_accrues_and_activates() {
        let env = Env::default();
        let (contract, _) = test_setup::setup_contract(&env);

        env.mock_all_auths();
        let (referrer, referred) = test_setup::referrer_with_referrals(&env, &contract, 1);
        let partner = referred.get(0).unwrap();

        let bonus = contract.record_payment(&partner, &1, &1, &1_000_000, &1);
        assert_eq!(bonus, 50_000);

        let profile = contract.get_partner(&referrer);
        assert_eq!(profile.accumulated_bonus, 50_000);
        assert_eq!(profile.available_bonus, 0); // Not yet through its payout cycle
        assert_eq!(profile.active_referrals, 1);

        let relationship = contract.get_referral(&partner);
        assert_eq!(relationship.status, ReferralStatus::Active);

        let record = contract.get_earnings_record(&referrer, &partner, &1);
        assert_eq!(record.amount, 50_000);
        assert_eq!(record.phase, PayoutPhase::Calculation);
    }

    #[test]
    fn test_duplicate_payment_rejected() {
        let env = Env::default();
        let (contract, _) = test_setup::setup_contract(&env);

        env.mock_all_auths();
        let (referrer, referred) = test_setup::referrer_with_referrals(&env, &contract, 1);
        let partner = referred.get(0).unwrap();

        contract.record_payment(&partner, &1, &1, &1_000_000, &1);

        // A retried webhook delivery is a distinct outcome, not a
        // silent re-credit
        let result = contract.try_record_payment(&partner, &1, &1, &1_000_000, &1);
        assert_eq!(result, Err(Ok(Error::DuplicateEarnings)));

        let profile = contract.get_partner(&referrer);
        assert_eq!(profile.accumulated_bonus, 50_000);
        assert_eq!(contract.get_earnings_history(&referrer).len(), 1);
    }

    #[test]
    fn test_payment_without_referrer_accrues_nothing() {
        let env = Env::default();
        let (contract, _) = test_setup::setup_contract(&env);

        env.mock_all_auths();
        let partner = Address::generate(&env);
        contract.register_partner(&partner);

        let bonus = contract.record_payment(&partner, &3, &1, &1_000_000, &1);
        assert_eq!(bonus, 0);
        assert_eq!(contract.get_total_distributed(), 0);
    }

    #[test]
    fn test_tier_multiplier_applied_at_accrual() {
        let env = Env::default();
        let (contract, _) = test_setup::setup_contract(&env);

        env.mock_all_auths();
        let (referrer, referred) = test_setup::referrer_with_referrals(&env, &contract, 6);
        let partner = referred.get(0).unwrap();

        // Six lifetime referrals: silver, 1.10x on the 20% flat rate
        let bonus = contract.record_payment(&partner, &3, &1, &1_000_000, &1);
        assert_eq!(bonus, 220_000);
        assert_eq!(contract.get_partner(&referrer).accumulated_bonus, 220_000);
    }
}

mod test_schedule {
    use super::*;
    use super::test_setup::january;

    #[test]
    fn test_phase_boundaries() {
        let env = Env::default();
        let (contract, _) = test_setup::setup_contract(&env);

        test_setup::set_time(&env, january(1));
        assert_eq!(contract.get_current_phase(), PayoutPhase::Calculation);

        test_setup::set_time(&env, january(15));
        assert_eq!(contract.get_current_phase(), PayoutPhase::Calculation);

        test_setup::set_time(&env, january(16));
        assert_eq!(contract.get_current_phase(), PayoutPhase::Verification);

        test_setup::set_time(&env, january(20));
        assert_eq!(contract.get_current_phase(), PayoutPhase::Verification);

        test_setup::set_time(&env, january(21));
        assert_eq!(contract.get_current_phase(), PayoutPhase::Payout);

        test_setup::set_time(&env, january(25));
        assert_eq!(contract.get_current_phase(), PayoutPhase::Payout);

        test_setup::set_time(&env, january(26));
        assert_eq!(contract.get_current_phase(), PayoutPhase::Available);

        test_setup::set_time(&env, january(31));
        assert_eq!(contract.get_current_phase(), PayoutPhase::Available);
    }

    #[test]
    fn test_earnings_clear_in_availability_window() {
        let env = Env::default();
        let (contract, _) = test_setup::setup_contract(&env);

        env.mock_all_auths();
        test_setup::set_time(&env, january(10));
        let (referrer, referred) = test_setup::referrer_with_referrals(&env, &contract, 1);
        let partner = referred.get(0).unwrap();
        contract.record_payment(&partner, &1, &1, &1_000_000, &1);

        // Mid-cycle: accumulated but nothing withdrawable
        test_setup::set_time(&env, january(20));
        assert_eq!(contract.settle_available(&referrer), 0);
        assert_eq!(contract.get_partner(&referrer).available_bonus, 0);

        // Day 26 opens the record's own availability window
        test_setup::set_time(&env, january(26));
        assert_eq!(contract.settle_available(&referrer), 50_000);

        let profile = contract.get_partner(&referrer);
        assert_eq!(profile.available_bonus, 50_000);
        assert_eq!(profile.accumulated_bonus, 50_000);
    }

    #[test]
    fn test_earnings_clear_in_any_later_month() {
        let env = Env::default();
        let (contract, _) = test_setup::setup_contract(&env);

        env.mock_all_auths();
        test_setup::set_time(&env, january(18));
        let (referrer, referred) = test_setup::referrer_with_referrals(&env, &contract, 1);
        let partner = referred.get(0).unwrap();
        contract.record_payment(&partner, &1, &1, &1_000_000, &1);

        // February 2nd: the record's month has fully passed
        test_setup::set_time(&env, january(33));
        assert_eq!(contract.settle_available(&referrer), 50_000);
    }

    #[test]
    fn test_loss_month_settles_immediately() {
        let env = Env::default();
        let (contract, _) = test_setup::setup_contract(&env);

        env.mock_all_auths();
        test_setup::set_time(&env, january(10));
        let (referrer, referred) = test_setup::referrer_with_referrals(&env, &contract, 1);
        let partner = referred.get(0).unwrap();
        contract.record_payment(&partner, &1, &1, &4_000_000, &1);

        // February loss month: the negative amount skips the clearing
        // cycle and lands on the available balance at accrual
        test_setup::set_time(&env, january(33));
        contract.record_payment(&partner, &1, &2, &-2_000_000, &2);

        let profile = contract.get_partner(&referrer);
        assert_eq!(profile.accumulated_bonus, 0);
        assert_eq!(profile.available_bonus, -200_000);

        // The January record clears in February; the available balance
        // ends at the accumulated one, never above it
        assert_eq!(contract.settle_available(&referrer), 200_000);
        let profile = contract.get_partner(&referrer);
        assert_eq!(profile.accumulated_bonus, 0);
        assert_eq!(profile.available_bonus, 0);
    }

    #[test]
    fn test_settlement_is_idempotent() {
        let env = Env::default();
        let (contract, _) = test_setup::setup_contract(&env);

        env.mock_all_auths();
        let (referrer, referred) = test_setup::referrer_with_referrals(&env, &contract, 1);
        let partner = referred.get(0).unwrap();
        contract.record_payment(&partner, &1, &1, &1_000_000, &1);

        test_setup::set_time(&env, january(26));
        assert_eq!(contract.settle_available(&referrer), 50_000);
        assert_eq!(contract.settle_available(&referrer), 0);
        assert_eq!(contract.get_partner(&referrer).available_bonus, 50_000);
    }
}

mod test_campaigns {
    use super::*;
    use super::test_setup::{january, DAY};

    fn create_default_campaign(env: &Env, contract: &ReferralEngineContractClient) -> u32 {
        contract.create_campaign(
            &String::from_str(env, "Spring sprint"),
            &3,
            &2,
            &1_000,
            &Tier::Bronze,
            &1,
        )
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #12)")]
    fn test_zero_duration_rejected() {
        let env = Env::default();
        let (contract, _) = test_setup::setup_contract(&env);

        env.mock_all_auths();
        contract.create_campaign(
            &String::from_str(&env, "Bad"),
            &0,
            &2,
            &1_000,
            &Tier::Bronze,
            &1,
        );
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #12)")]
    fn test_unsupported_subscription_months_rejected() {
        let env = Env::default();
        let (contract, _) = test_setup::setup_contract(&env);

        env.mock_all_auths();
        contract.create_campaign(
            &String::from_str(&env, "Bad"),
            &3,
            &2,
            &1_000,
            &Tier::Bronze,
            &4,
        );
    }

    #[test]
    fn test_threshold_contest_winner() {
        let env = Env::default();
        let (contract, _) = test_setup::setup_contract(&env);

        env.mock_all_auths();
        let campaign_id = create_default_campaign(&env, &contract);

        let partner = Address::generate(&env);
        contract.register_partner(&partner);
        contract.join_campaign(&campaign_id, &partner);

        contract.record_campaign_referral(&campaign_id, &partner, &DAY);
        let stats = contract.get_campaign_stats(&campaign_id, &partner);
        assert_eq!(
            stats.participant.get(0).unwrap().status,
            ParticipantStatus::Participating
        );

        // Second referral reaches the target
        contract.record_campaign_referral(&campaign_id, &partner, &DAY);
        let stats = contract.get_campaign_stats(&campaign_id, &partner);
        let entry = stats.participant.get(0).unwrap();
        assert_eq!(entry.status, ParticipantStatus::Winner);
        assert_eq!(entry.referral_count, 2);
        assert_eq!(stats.winner_count, 1);

        // Prize paid exactly once, into the platform account balance
        assert_eq!(contract.get_partner(&partner).account_balance, 1_000);

        // Winner is terminal: further referrals count without touching it
        contract.record_campaign_referral(&campaign_id, &partner, &(2 * DAY));
        let stats = contract.get_campaign_stats(&campaign_id, &partner);
        let entry = stats.participant.get(0).unwrap();
        assert_eq!(entry.status, ParticipantStatus::Winner);
        assert_eq!(entry.referral_count, 3);
        assert_eq!(contract.get_partner(&partner).account_balance, 1_000);
    }

    #[test]
    fn test_multiple_winners_allowed() {
        let env = Env::default();
        let (contract, _) = test_setup::setup_contract(&env);

        env.mock_all_auths();
        let campaign_id = create_default_campaign(&env, &contract);

        for _ in 0..2 {
            let partner = Address::generate(&env);
            contract.register_partner(&partner);
            contract.join_campaign(&campaign_id, &partner);
            contract.record_campaign_referral(&campaign_id, &partner, &DAY);
            contract.record_campaign_referral(&campaign_id, &partner, &DAY);
        }

        let outsider = Address::generate(&env);
        contract.register_partner(&outsider);
        let stats = contract.get_campaign_stats(&campaign_id, &outsider);
        assert_eq!(stats.winner_count, 2);
        assert_eq!(stats.participant_count, 2);
        // A partner who never joined shows up with no enrollment entry
        assert!(stats.participant.is_empty());
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #16)")]
    fn test_double_join_rejected() {
        let env = Env::default();
        let (contract, _) = test_setup::setup_contract(&env);

        env.mock_all_auths();
        let campaign_id = create_default_campaign(&env, &contract);

        let partner = Address::generate(&env);
        contract.register_partner(&partner);
        contract.join_campaign(&campaign_id, &partner);
        contract.join_campaign(&campaign_id, &partner);
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #18)")]
    fn test_tier_gate_on_join() {
        let env = Env::default();
        let (contract, _) = test_setup::setup_contract(&env);

        env.mock_all_auths();
        let campaign_id = contract.create_campaign(
            &String::from_str(&env, "Gold only"),
            &3,
            &5,
            &10_000,
            &Tier::Gold,
            &6,
        );

        let partner = Address::generate(&env);
        contract.register_partner(&partner);
        contract.join_campaign(&campaign_id, &partner);
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #14)")]
    fn test_join_after_expiry_rejected() {
        let env = Env::default();
        let (contract, _) = test_setup::setup_contract(&env);

        env.mock_all_auths();
        let campaign_id = create_default_campaign(&env, &contract);

        let partner = Address::generate(&env);
        contract.register_partner(&partner);

        test_setup::set_time(&env, 4 * DAY);
        contract.join_campaign(&campaign_id, &partner);
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #19)")]
    fn test_referral_outside_window_rejected() {
        let env = Env::default();
        let (contract, _) = test_setup::setup_contract(&env);

        env.mock_all_auths();
        test_setup::set_time(&env, january(10));
        let campaign_id = create_default_campaign(&env, &contract);

        let partner = Address::generate(&env);
        contract.register_partner(&partner);
        contract.join_campaign(&campaign_id, &partner);

        // Relationship created before the campaign started
        contract.record_campaign_referral(&campaign_id, &partner, &january(5));
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #19)")]
    fn test_referral_before_join_rejected() {
        let env = Env::default();
        let (contract, _) = test_setup::setup_contract(&env);

        env.mock_all_auths();
        let campaign_id = create_default_campaign(&env, &contract);

        test_setup::set_time(&env, DAY);
        let partner = Address::generate(&env);
        contract.register_partner(&partner);
        contract.join_campaign(&campaign_id, &partner);

        // Inside the campaign window, but before the partner enrolled:
        // nothing is credited for the pre-join stretch
        contract.record_campaign_referral(&campaign_id, &partner, &0);
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #15)")]
    fn test_cancelled_campaign_rejects_joins() {
        let env = Env::default();
        let (contract, _) = test_setup::setup_contract(&env);

        env.mock_all_auths();
        let campaign_id = create_default_campaign(&env, &contract);
        contract.cancel_campaign(&campaign_id);

        let partner = Address::generate(&env);
        contract.register_partner(&partner);
        contract.join_campaign(&campaign_id, &partner);
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #17)")]
    fn test_disqualified_participant_stops_counting() {
        let env = Env::default();
        let (contract, _) = test_setup::setup_contract(&env);

        env.mock_all_auths();
        let campaign_id = create_default_campaign(&env, &contract);

        let partner = Address::generate(&env);
        contract.register_partner(&partner);
        contract.join_campaign(&campaign_id, &partner);
        contract.record_campaign_referral(&campaign_id, &partner, &DAY);

        contract.disqualify_participant(&campaign_id, &partner);
        contract.record_campaign_referral(&campaign_id, &partner, &DAY);
    }

    #[test]
    fn test_lazy_expiry() {
        let env = Env::default();
        let (contract, _) = test_setup::setup_contract(&env);

        env.mock_all_auths();
        let short = create_default_campaign(&env, &contract);
        let long = contract.create_campaign(
            &String::from_str(&env, "Quarter push"),
            &30,
            &10,
            &5_000,
            &Tier::Bronze,
            &3,
        );

        assert_eq!(contract.get_active_campaigns().len(), 2);

        // The short campaign expires without any write to its record
        test_setup::set_time(&env, 4 * DAY);
        let active = contract.get_active_campaigns();
        assert_eq!(active.len(), 1);
        assert_eq!(active.get(0).unwrap().id, long);

        // Its status reads as Ended, derived from the clock
        assert_eq!(contract.get_campaign(&short).status, CampaignStatus::Ended);
    }
}

mod test_eligibility {
    use super::*;
    use super::test_setup::january;

    /// Premium referrer with `active` activated referrals, each having
    /// paid one 1-month cycle with the given platform profit
    fn eligible_referrer(
        env: &Env,
        contract: &ReferralEngineContractClient,
        active: u32,
        profit: i128,
    ) -> Address {
        let (referrer, referred) = test_setup::referrer_with_referrals(env, contract, active);
        contract.set_subscription(&referrer, &true, &6);
        for partner in referred.iter() {
            contract.record_payment(&partner, &1, &1, &profit, &1);
        }
        referrer
    }

    #[test]
    fn test_gate_passes() {
        let env = Env::default();
        let (contract, _) = test_setup::setup_contract(&env);

        env.mock_all_auths();
        // Three active referrals at 50 bonus each: available lands at 150
        let referrer = eligible_referrer(&env, &contract, 3, 1_000);

        test_setup::set_time(&env, january(26));
        let eligibility = contract.check_withdrawal(&referrer);
        assert!(eligibility.allowed);
        assert_eq!(eligibility.reason, None);
        // Throttle: half the accumulated bonus per calendar month
        assert_eq!(eligibility.max_amount, 75);
    }

    #[test]
    fn test_gate_requires_premium() {
        let env = Env::default();
        let (contract, _) = test_setup::setup_contract(&env);

        env.mock_all_auths();
        let referrer = eligible_referrer(&env, &contract, 3, 1_000);
        contract.set_subscription(&referrer, &true, &5); // One month short

        test_setup::set_time(&env, january(26));
        let eligibility = contract.check_withdrawal(&referrer);
        assert!(!eligibility.allowed);
        assert_eq!(
            eligibility.reason,
            Some(String::from_str(&env, "6-month Premium required."))
        );
    }

    #[test]
    fn test_gate_requires_active_referrals() {
        let env = Env::default();
        let (contract, _) = test_setup::setup_contract(&env);

        env.mock_all_auths();
        let referrer = eligible_referrer(&env, &contract, 2, 1_000);

        test_setup::set_time(&env, january(26));
        let eligibility = contract.check_withdrawal(&referrer);
        assert!(!eligibility.allowed);
        assert_eq!(
            eligibility.reason,
            Some(String::from_str(
                &env,
                "minimum 3 active referrals required."
            ))
        );
    }

    #[test]
    fn test_gate_requires_minimum_balance() {
        let env = Env::default();
        let (contract, _) = test_setup::setup_contract(&env);

        env.mock_all_auths();
        // 3 active referrals but 1.5 bonus each: available far below 100
        let referrer = eligible_referrer(&env, &contract, 3, 30);

        test_setup::set_time(&env, january(26));
        let eligibility = contract.check_withdrawal(&referrer);
        assert!(!eligibility.allowed);
        assert_eq!(
            eligibility.reason,
            Some(String::from_str(&env, "minimum withdrawal amount not met."))
        );
    }

    #[test]
    fn test_gate_checks_in_order() {
        let env = Env::default();
        let (contract, _) = test_setup::setup_contract(&env);

        env.mock_all_auths();
        // Fails every rule; the reason must name the first one
        let referrer = eligible_referrer(&env, &contract, 1, 10);
        contract.set_subscription(&referrer, &false, &0);

        test_setup::set_time(&env, january(26));
        let eligibility = contract.check_withdrawal(&referrer);
        assert_eq!(
            eligibility.reason,
            Some(String::from_str(&env, "6-month Premium required."))
        );
    }
}

mod test_withdrawal {
    use super::*;
    use super::test_setup::january;

    /// Premium referrer with three activated referrals and 150_000
    /// accumulated, settled into the available balance
    fn funded_referrer(env: &Env, contract: &ReferralEngineContractClient) -> Address {
        let (referrer, referred) = test_setup::referrer_with_referrals(env, contract, 3);
        contract.set_subscription(&referrer, &true, &6);
        for partner in referred.iter() {
            contract.record_payment(&partner, &1, &1, &1_000_000, &1);
        }
        test_setup::set_time(env, january(26));
        contract.settle_available(&referrer);
        referrer
    }

    #[test]
    fn test_bank_transfer_withdrawal() {
        let env = Env::default();
        let (contract, _) = test_setup::setup_contract(&env);

        env.mock_all_auths();
        let referrer = funded_referrer(&env, &contract);

        let payout_id =
            contract.request_withdrawal(&referrer, &50_000, &WithdrawalMethod::BankTransfer);

        let payout = contract.get_payout(&payout_id);
        assert_eq!(payout.status, PayoutStatus::Pending);
        assert_eq!(payout.amount, 50_000);
        assert_eq!(payout.fee, 500); // 1% bank transfer fee

        let profile = contract.get_partner(&referrer);
        assert_eq!(profile.available_bonus, 100_000);
        assert_eq!(profile.withdrawn_this_month, 50_000);
        // The ledger itself never shrinks on withdrawal
        assert_eq!(profile.accumulated_bonus, 150_000);
    }

    #[test]
    fn test_confirm_payout() {
        let env = Env::default();
        let (contract, _) = test_setup::setup_contract(&env);

        env.mock_all_auths();
        let referrer = funded_referrer(&env, &contract);

        let payout_id =
            contract.request_withdrawal(&referrer, &50_000, &WithdrawalMethod::BankTransfer);
        contract.confirm_payout(&payout_id);
        assert_eq!(
            contract.get_payout(&payout_id).status,
            PayoutStatus::Confirmed
        );
    }

    #[test]
    fn test_failed_payout_restores_balance() {
        let env = Env::default();
        let (contract, _) = test_setup::setup_contract(&env);

        env.mock_all_auths();
        let referrer = funded_referrer(&env, &contract);

        let payout_id =
            contract.request_withdrawal(&referrer, &50_000, &WithdrawalMethod::BankTransfer);
        contract.fail_payout(&payout_id);

        let profile = contract.get_partner(&referrer);
        assert_eq!(profile.available_bonus, 150_000);
        assert_eq!(profile.withdrawn_this_month, 0);
        assert_eq!(contract.get_payout(&payout_id).status, PayoutStatus::Failed);

        // Settled payouts cannot be re-settled
        let result = contract.try_confirm_payout(&payout_id);
        assert_eq!(result, Err(Ok(Error::PayoutAlreadySettled)));
    }

    #[test]
    fn test_account_credit_reinvests() {
        let env = Env::default();
        let (contract, _) = test_setup::setup_contract(&env);

        env.mock_all_auths();
        let referrer = funded_referrer(&env, &contract);

        contract.request_withdrawal(&referrer, &50_000, &WithdrawalMethod::AccountCredit);

        let profile = contract.get_partner(&referrer);
        assert_eq!(profile.available_bonus, 100_000);
        // Fee-free, credited with the 5% reinvestment bonus
        assert_eq!(profile.account_balance, 52_500);
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #22)")]
    fn test_monthly_cap_enforced() {
        let env = Env::default();
        let (contract, _) = test_setup::setup_contract(&env);

        env.mock_all_auths();
        let referrer = funded_referrer(&env, &contract);

        // Cap is half of 150_000 accumulated for the month
        contract.request_withdrawal(&referrer, &80_000, &WithdrawalMethod::BankTransfer);
    }

    #[test]
    fn test_monthly_cap_resets_next_month() {
        let env = Env::default();
        let (contract, _) = test_setup::setup_contract(&env);

        env.mock_all_auths();
        let referrer = funded_referrer(&env, &contract);

        contract.request_withdrawal(&referrer, &75_000, &WithdrawalMethod::BankTransfer);
        let result =
            contract.try_request_withdrawal(&referrer, &1_000, &WithdrawalMethod::BankTransfer);
        assert_eq!(result, Err(Ok(Error::ExceedsMonthlyCap)));

        // February: fresh throttle window
        test_setup::set_time(&env, january(35));
        contract.request_withdrawal(&referrer, &75_000, &WithdrawalMethod::BankTransfer);
        assert_eq!(contract.get_partner(&referrer).available_bonus, 0);
    }

    #[test]
    fn test_fail_after_window_roll_keeps_throttle() {
        let env = Env::default();
        let (contract, _) = test_setup::setup_contract(&env);

        env.mock_all_auths();
        let referrer = funded_referrer(&env, &contract);

        let payout_id =
            contract.request_withdrawal(&referrer, &75_000, &WithdrawalMethod::BankTransfer);

        // February rolls the throttle window before the rail reports back
        test_setup::set_time(&env, january(35));
        contract.check_withdrawal(&referrer);
        contract.fail_payout(&payout_id);

        let profile = contract.get_partner(&referrer);
        assert_eq!(profile.available_bonus, 150_000);
        // January's failed payout owes February's window no headroom
        assert_eq!(profile.withdrawn_this_month, 0);
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #21)")]
    fn test_method_minimum_enforced() {
        let env = Env::default();
        let (contract, _) = test_setup::setup_contract(&env);

        env.mock_all_auths();
        let referrer = funded_referrer(&env, &contract);

        contract.request_withdrawal(&referrer, &50, &WithdrawalMethod::BankTransfer);
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #20)")]
    fn test_ineligible_request_rejected() {
        let env = Env::default();
        let (contract, _) = test_setup::setup_contract(&env);

        env.mock_all_auths();
        let referrer = funded_referrer(&env, &contract);
        contract.set_subscription(&referrer, &false, &0);

        contract.request_withdrawal(&referrer, &50_000, &WithdrawalMethod::BankTransfer);
    }
}

mod test_metrics {
    use super::*;

    #[test]
    fn test_system_metrics() {
        let env = Env::default();
        let (contract, _) = test_setup::setup_contract(&env);

        env.mock_all_auths();
        let (_, referred) = test_setup::referrer_with_referrals(&env, &contract, 2);
        for partner in referred.iter() {
            contract.record_payment(&partner, &1, &1, &1_000_000, &1);
        }

        assert_eq!(contract.get_total_partners(), 3);
        assert_eq!(contract.get_total_distributed(), 100_000);

        let metrics = contract.get_system_metrics();
        assert_eq!(metrics.len(), 3);
        assert_eq!(
            metrics.get(0).unwrap(),
            (String::from_str(&env, "total_partners"), 3)
        );
    }

    #[test]
    fn test_activation_rate() {
        let env = Env::default();
        let (contract, _) = test_setup::setup_contract(&env);

        env.mock_all_auths();
        let (referrer, referred) = test_setup::referrer_with_referrals(&env, &contract, 3);
        contract.record_payment(&referred.get(0).unwrap(), &1, &1, &1_000_000, &1);
        contract.record_payment(&referred.get(1).unwrap(), &1, &1, &1_000_000, &1);

        assert_eq!(contract.get_activation_rate(&referrer), 66);
    }

    #[test]
    fn test_earnings_history() {
        let env = Env::default();
        let (contract, _) = test_setup::setup_contract(&env);

        env.mock_all_auths();
        let (referrer, referred) = test_setup::referrer_with_referrals(&env, &contract, 1);
        let partner = referred.get(0).unwrap();

        contract.record_payment(&partner, &1, &1, &1_000_000, &1);
        contract.record_payment(&partner, &1, &2, &1_000_000, &2);
        contract.record_payment(&partner, &1, &3, &1_000_000, &3);
        contract.record_payment(&partner, &1, &4, &1_000_000, &4);

        let history = contract.get_earnings_history(&referrer);
        assert_eq!(history.len(), 4);
        assert_eq!(history.get(0).unwrap().amount, 50_000);
        assert_eq!(history.get(1).unwrap().amount, 100_000);
        assert_eq!(history.get(2).unwrap().amount, 100_000);
        // Fourth renewal is past the schedule: recorded at zero
        assert_eq!(history.get(3).unwrap().amount, 0);
    }
}
