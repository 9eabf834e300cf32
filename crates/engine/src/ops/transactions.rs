use chrono::{DateTime, Utc};
use uuid::Uuid;

use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};

use crate::{
    EngineError, MoneyCents, NewTransaction, ResultEngine, Transaction, TransactionKind,
    fold_running_funds, transactions,
    util::normalize_optional_text,
};

use super::{Engine, with_tx};

/// Label and remarks stamped on entries created by [`Engine::override_fund`].
const OVERRIDE_LABEL: &str = "System";
const OVERRIDE_REMARKS: &str = "Manual fund update";

/// Re-folds every entry at or after `from` (the whole ledger when `None`)
/// and writes back the running funds that changed.
///
/// Entries are folded by `(occurred_at, seq)`. The fold is seeded with the
/// running fund of the latest entry strictly before `from`, or 0. Returns the fund after the last entry.
async fn recompute_from<C>(db: &C, from: Option<DateTime<Utc>>) -> ResultEngine<MoneyCents>
where
    C: ConnectionTrait,
{
    let seed = match from {
        Some(from) => transactions::Entity::find()
            .filter(transactions::Column::OccurredAt.lt(from))
            .order_by_desc(transactions::Column::OccurredAt)
            .order_by_desc(transactions::Column::Seq)
            .one(db)
            .await?
            .map_or(MoneyCents::ZERO, |model| {
                MoneyCents::new(model.running_fund_minor)
            }),
        None => MoneyCents::ZERO,
    };

    let mut query = transactions::Entity::find();
    if let Some(from) = from {
        query = query.filter(transactions::Column::OccurredAt.gte(from));
    }
    let models = query
        .order_by_asc(transactions::Column::OccurredAt)
        .order_by_asc(transactions::Column::Seq)
        .all(db)
        .await?;

    let stored: Vec<i64> = models.iter().map(|m| m.running_fund_minor).collect();
    let mut suffix = models
        .into_iter()
        .map(Transaction::try_from)
        .collect::<ResultEngine<Vec<_>>>()?;
    let final_fund = fold_running_funds(seed, &mut suffix)?;

    let mut rewritten = 0usize;
    for (tx, previous) in suffix.iter().zip(stored) {
        if tx.running_fund.cents() == previous {
            continue;
        }
        let active = transactions::ActiveModel {
            id: ActiveValue::Set(tx.id.to_string()),
            running_fund_minor: ActiveValue::Set(tx.running_fund.cents()),
            ..Default::default()
        };
        active.update(db).await?;
        rewritten += 1;
    }

    tracing::debug!(
        %seed,
        entries = suffix.len(),
        rewritten,
        %final_fund,
        "recomputed running funds"
    );
    Ok(final_fund)
}

/// Inserts `tx` with the next insertion sequence number.
///
/// Callers hold the writer lock, so `MAX(seq) + 1` cannot race.
async fn insert_entry<C>(db: &C, tx: &Transaction) -> ResultEngine<()>
where
    C: ConnectionTrait,
{
    let last = transactions::Entity::find()
        .order_by_desc(transactions::Column::Seq)
        .one(db)
        .await?
        .map_or(0, |model| model.seq);

    let mut active = transactions::ActiveModel::from(tx);
    active.seq = ActiveValue::Set(last + 1);
    active.insert(db).await?;
    Ok(())
}

impl Engine {
    /// Appends an entry to the ledger.
    ///
    /// The new entry's running fund builds on the latest entry before it in
    /// time. When it is back-dated, every later entry is re-folded too.
    pub async fn append_transaction(&self, input: NewTransaction) -> ResultEngine<Transaction> {
        let tx = Transaction::new(
            input.kind,
            normalize_optional_text(input.player_name.as_deref()),
            input.amount,
            input.occurred_at,
            normalize_optional_text(input.remarks.as_deref()),
        )?;

        let _writer = self.writer.lock().await;
        with_tx!(self, |db_tx| {
            insert_entry(&db_tx, &tx).await?;
            recompute_from(&db_tx, Some(tx.occurred_at)).await?;

            let model = transactions::Entity::find_by_id(tx.id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))?;
            let stored = Transaction::try_from(model)?;
            tracing::debug!(
                transaction_id = %stored.id,
                kind = stored.kind.as_str(),
                running_fund = %stored.running_fund,
                "transaction appended"
            );
            Ok(stored)
        })
    }

    /// Deletes an entry and re-folds everything from its timestamp onward.
    ///
    /// Returns the fund after the latest remaining entry.
    pub async fn delete_transaction(&self, transaction_id: Uuid) -> ResultEngine<MoneyCents> {
        let _writer = self.writer.lock().await;
        with_tx!(self, |db_tx| {
            let model = transactions::Entity::find_by_id(transaction_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))?;

            transactions::Entity::delete_by_id(model.id.clone())
                .exec(&db_tx)
                .await?;
            let final_fund = recompute_from(&db_tx, Some(model.occurred_at)).await?;
            tracing::debug!(%transaction_id, %final_fund, "transaction deleted");
            Ok(final_fund)
        })
    }

    /// Resets the fund to `value` as of now.
    ///
    /// A `ManualUpdate` entry is recorded at the current time. Entries before
    /// it keep their running funds; entries dated after it build on `value`.
    pub async fn override_fund(&self, value: MoneyCents) -> ResultEngine<MoneyCents> {
        self.override_fund_at(value, Utc::now()).await
    }

    /// Same as [`Engine::override_fund`] with an explicit timestamp.
    pub async fn override_fund_at(
        &self,
        value: MoneyCents,
        occurred_at: DateTime<Utc>,
    ) -> ResultEngine<MoneyCents> {
        let tx = Transaction::new(
            TransactionKind::ManualUpdate,
            Some(OVERRIDE_LABEL.to_string()),
            value,
            occurred_at,
            Some(OVERRIDE_REMARKS.to_string()),
        )?;

        let _writer = self.writer.lock().await;
        with_tx!(self, |db_tx| {
            insert_entry(&db_tx, &tx).await?;
            let final_fund = recompute_from(&db_tx, Some(occurred_at)).await?;
            tracing::info!(override_value = %value, %final_fund, "fund overridden");
            Ok(final_fund)
        })
    }

    /// Re-folds the whole ledger from 0 and repairs any stale running fund.
    pub async fn recompute_ledger(&self) -> ResultEngine<MoneyCents> {
        let _writer = self.writer.lock().await;
        with_tx!(self, |db_tx| { recompute_from(&db_tx, None).await })
    }

    /// All entries, newest first.
    pub async fn list_transactions(&self) -> ResultEngine<Vec<Transaction>> {
        transactions::Entity::find()
            .order_by_desc(transactions::Column::OccurredAt)
            .order_by_desc(transactions::Column::Seq)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Transaction::try_from)
            .collect()
    }

    /// Return a single entry.
    pub async fn transaction(&self, transaction_id: Uuid) -> ResultEngine<Transaction> {
        let model = transactions::Entity::find_by_id(transaction_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))?;
        Transaction::try_from(model)
    }

    /// The running fund of the latest entry, or 0 for an empty ledger.
    pub async fn current_fund(&self) -> ResultEngine<MoneyCents> {
        let latest = transactions::Entity::find()
            .order_by_desc(transactions::Column::OccurredAt)
            .order_by_desc(transactions::Column::Seq)
            .one(&self.database)
            .await?;
        Ok(latest.map_or(MoneyCents::ZERO, |model| {
            MoneyCents::new(model.running_fund_minor)
        }))
    }
}
