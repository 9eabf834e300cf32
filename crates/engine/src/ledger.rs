//! Pure running-fund fold shared by every ledger mutation.

use crate::{MoneyCents, ResultEngine, Transaction};

/// Folds `transactions` (already sorted by time, oldest first) starting from
/// `seed`, writing each entry's `running_fund` and returning the final fund.
///
/// `Fund` adds, `Expenditure` subtracts and `ManualUpdate` replaces the
/// running value with the entry's own amount.
pub fn fold_running_funds(
    seed: MoneyCents,
    transactions: &mut [Transaction],
) -> ResultEngine<MoneyCents> {
    let mut fund = seed;
    for tx in transactions.iter_mut() {
        fund = tx.kind.apply(fund, tx.amount)?;
        tx.running_fund = fund;
    }
    Ok(fund)
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};

    use super::*;
    use crate::{EngineError, TransactionKind};

    fn at(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap() + Duration::minutes(minutes)
    }

    fn tx(kind: TransactionKind, amount: i64, minutes: i64) -> Transaction {
        Transaction::new(kind, None, MoneyCents::new(amount), at(minutes), None).unwrap()
    }

    fn running(txs: &[Transaction]) -> Vec<i64> {
        txs.iter().map(|t| t.running_fund.cents()).collect()
    }

    #[test]
    fn empty_history_returns_seed() {
        assert_eq!(
            fold_running_funds(MoneyCents::new(42), &mut []).unwrap(),
            MoneyCents::new(42)
        );
    }

    #[test]
    fn inflow_and_outflow_accumulate() {
        let mut txs = vec![
            tx(TransactionKind::Fund, 500, 0),
            tx(TransactionKind::Expenditure, 200, 1),
            tx(TransactionKind::Fund, 50, 2),
        ];
        let fund = fold_running_funds(MoneyCents::ZERO, &mut txs).unwrap();
        assert_eq!(fund, MoneyCents::new(350));
        assert_eq!(running(&txs), vec![500, 300, 350]);
    }

    #[test]
    fn manual_update_is_a_reset_point() {
        let mut txs = vec![
            tx(TransactionKind::Fund, 500, 0),
            tx(TransactionKind::ManualUpdate, 1000, 1),
            tx(TransactionKind::Expenditure, 100, 2),
        ];
        let fund = fold_running_funds(MoneyCents::ZERO, &mut txs).unwrap();
        assert_eq!(fund, MoneyCents::new(900));
        assert_eq!(running(&txs), vec![500, 1000, 900]);
    }

    #[test]
    fn seeded_replay_shifts_entries_before_the_override() {
        // Replaying the whole history from the override value (instead of 0)
        // moves every pre-override running fund, while the final value is
        // still pinned by the override entry itself.
        let mut txs = vec![
            tx(TransactionKind::Fund, 500, 0),
            tx(TransactionKind::Expenditure, 200, 1),
            tx(TransactionKind::ManualUpdate, 1000, 2),
        ];
        let seeded = fold_running_funds(MoneyCents::new(1000), &mut txs).unwrap();
        assert_eq!(seeded, MoneyCents::new(1000));
        assert_eq!(running(&txs), vec![1500, 1300, 1000]);

        let from_zero = fold_running_funds(MoneyCents::ZERO, &mut txs).unwrap();
        assert_eq!(from_zero, MoneyCents::new(1000));
        assert_eq!(running(&txs), vec![500, 300, 1000]);
    }

    #[test]
    fn overflow_is_reported_as_invalid_amount() {
        let mut txs = vec![tx(TransactionKind::Fund, 1, 0)];
        let err = fold_running_funds(MoneyCents::new(i64::MAX), &mut txs).unwrap_err();
        assert!(matches!(err, EngineError::InvalidAmount(_)));
    }
}
