use crate::helpers::{get_config, get_profile, set_profile};
use crate::types::{DataKey, EarningsKey, EarningsRecord, Error, PayoutPhase, PayoutWindows};
use soroban_sdk::{Address, Env, Symbol, Vec};

pub struct ScheduleModule;

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Civil date from days since the Unix epoch (proleptic Gregorian).
/// Returns (year, month 1-12, day 1-31).
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let days = days + 719_468;
    let era = if days >= 0 { days } else { days - 146_096 } / 146_097;
    let doe = (days - era * 146_097) as i64;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let year = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    (if month <= 2 { year + 1 } else { year }, month, day)
}

impl ScheduleModule {
    /// Day of month (1-31) for a ledger timestamp
    pub fn day_of_month(timestamp: u64) -> u32 {
        let (_, _, day) = civil_from_days((timestamp / SECONDS_PER_DAY) as i64);
        day
    }

    /// Monotonic key identifying the civil calendar month of a timestamp
    pub fn month_key(timestamp: u64) -> u64 {
        let (year, month, _) = civil_from_days((timestamp / SECONDS_PER_DAY) as i64);
        (year as u64) * 12 + (month as u64 - 1)
    }

    /// Maps a timestamp to its payout phase. Total: every day of every
    /// month lands in exactly one phase.
    pub fn phase_for(windows: &PayoutWindows, timestamp: u64) -> PayoutPhase {
        let day = Self::day_of_month(timestamp);
        if day <= windows.calculation_end_day {
            PayoutPhase::Calculation
        } else if day <= windows.verification_end_day {
            PayoutPhase::Verification
        } else if day <= windows.payout_end_day {
            PayoutPhase::Payout
        } else {
            PayoutPhase::Available
        }
    }

    /// Whether earnings computed at `earned_at` have cleared for
    /// withdrawal by `now`: the record's own calendar month must have
    /// reached its availability window, or any later month begun.
    pub fn is_record_available(windows: &PayoutWindows, earned_at: u64, now: u64) -> bool {
        let earned_month = Self::month_key(earned_at);
        let current_month = Self::month_key(now);
        if current_month > earned_month {
            return true;
        }
        current_month == earned_month
            && Self::phase_for(windows, now) == PayoutPhase::Available
    }

    /// Sweeps the partner's unsettled earnings whose availability window
    /// has been reached into the available balance. Run lazily from the
    /// withdrawal path; there is no background clock.
    pub fn settle_available(env: &Env, partner: &Address) -> Result<i128, Error> {
        let config = get_config(env)?;
        let now = env.ledger().timestamp();

        let unsettled: Vec<EarningsKey> = env
            .storage()
            .persistent()
            .get(&DataKey::Unsettled(partner.clone()))
            .unwrap_or_else(|| Vec::new(env));

        let mut still_pending = Vec::new(env);
        let mut settled_total: i128 = 0;

        for key in unsettled.iter() {
            let record: EarningsRecord = env
                .storage()
                .persistent()
                .get(&DataKey::Earnings(
                    partner.clone(),
                    key.referred.clone(),
                    key.month_index,
                ))
                .ok_or(Error::ReferralNotFound)?;

            if Self::is_record_available(&config.windows, record.computed_at, now) {
                settled_total += record.amount;
            } else {
                still_pending.push_back(key);
            }
        }

        if settled_total != 0 || still_pending.len() != unsettled.len() {
            let mut profile = get_profile(env, partner)?;
            profile.available_bonus += settled_total;
            set_profile(env, &profile);

            env.storage()
                .persistent()
                .set(&DataKey::Unsettled(partner.clone()), &still_pending);

            env.events().publish(
                (Symbol::new(env, "earnings_settled"), partner.clone()),
                settled_total,
            );
        }

        Ok(settled_total)
    }

    /// Payout phase at the current ledger time
    pub fn current_phase(env: &Env) -> Result<PayoutPhase, Error> {
        let config = get_config(env)?;
        Ok(Self::phase_for(&config.windows, env.ledger().timestamp()))
    }
}

#[cfg(test)]
mod civil_tests {
    use super::civil_from_days;

    #[test]
    fn epoch_is_january_first_1970() {
        assert_eq!(civil_from_days(0), (1970, 1, 1));
    }

    #[test]
    fn leap_day_resolves() {
        // 2024-02-29 is 19782 days after the epoch
        assert_eq!(civil_from_days(19_782), (2024, 2, 29));
    }

    #[test]
    fn month_rollover() {
        assert_eq!(civil_from_days(30), (1970, 1, 31));
        assert_eq!(civil_from_days(31), (1970, 2, 1));
    }
}
