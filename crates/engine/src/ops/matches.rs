use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use sea_orm::{ActiveValue, ConnectionTrait, QueryFilter, TransactionTrait, prelude::*};

use crate::{
    EngineError, Match, MatchPayment, MoneyCents, NewMatch, PaymentEntry, Player, ResultEngine,
    match_players, matches, players,
    util::{normalize_optional_text, normalize_required_name},
};

use super::{Engine, players::apply_balance_delta, with_tx};

fn match_not_found(match_id: Uuid) -> EngineError {
    EngineError::KeyNotFound(format!("match {match_id} not exists"))
}

fn validate_entries(entries: &[PaymentEntry]) -> ResultEngine<()> {
    let mut seen = HashSet::with_capacity(entries.len());
    for entry in entries {
        if entry.paid.is_negative() {
            return Err(EngineError::InvalidAmount(format!(
                "paid amount for player {} must be >= 0",
                entry.player_id
            )));
        }
        if !seen.insert(entry.player_id) {
            return Err(EngineError::InvalidInput(format!(
                "player {} listed more than once",
                entry.player_id
            )));
        }
    }
    Ok(())
}

/// Load a match with its payments, players populated and sorted by name.
async fn load_match<C>(db: &C, match_id: Uuid) -> ResultEngine<Match>
where
    C: ConnectionTrait,
{
    let model = matches::Entity::find_by_id(match_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| match_not_found(match_id))?;
    let mut found = Match::try_from(model)?;

    let rows = match_players::Entity::find()
        .filter(match_players::Column::MatchId.eq(match_id.to_string()))
        .find_also_related(players::Entity)
        .all(db)
        .await?;

    let mut payments = Vec::with_capacity(rows.len());
    for (row, player) in rows {
        let player = player.ok_or_else(|| {
            EngineError::KeyNotFound(format!("player {} not exists", row.player_id))
        })?;
        payments.push(MatchPayment {
            player: Player::try_from(player)?,
            paid: MoneyCents::new(row.paid_minor),
        });
    }
    payments.sort_by(|a, b| {
        a.player
            .name
            .cmp(&b.player.name)
            .then(a.player.id.cmp(&b.player.id))
    });
    found.players = payments;
    Ok(found)
}

impl Engine {
    /// Create a match with an empty payment list.
    pub async fn new_match(&self, input: NewMatch) -> ResultEngine<Match> {
        if input.booking_fee.is_negative() || input.fee_per_person.is_negative() {
            return Err(EngineError::InvalidAmount(
                "match fees must be >= 0".to_string(),
            ));
        }
        let created = Match {
            id: Uuid::new_v4(),
            ground_name: normalize_required_name(&input.ground_name, "ground")?,
            ground_location: normalize_optional_text(input.ground_location.as_deref()),
            google_map_link: normalize_optional_text(input.google_map_link.as_deref()),
            booking_fee: input.booking_fee,
            fee_per_person: input.fee_per_person,
            scheduled_at: input.scheduled_at,
            players: Vec::new(),
        };

        let _writer = self.writer.lock().await;
        with_tx!(self, |db_tx| {
            matches::ActiveModel::from(&created).insert(&db_tx).await?;
            Ok(created)
        })
    }

    /// Return a match with its payment entries.
    pub async fn match_detail(&self, match_id: Uuid) -> ResultEngine<Match> {
        load_match(&self.database, match_id).await
    }

    /// Replaces a match's payment list and moves the difference onto each
    /// player's balance.
    ///
    /// A listed player's balance changes by `(paid - fee)` minus whatever
    /// their previous entry for this match contributed; a player dropped from
    /// the list gets their previous contribution reversed. The whole batch
    /// runs in one transaction: if any player is missing nothing is applied.
    pub async fn reconcile_match_payments(
        &self,
        match_id: Uuid,
        entries: Vec<PaymentEntry>,
    ) -> ResultEngine<Match> {
        validate_entries(&entries)?;

        let _writer = self.writer.lock().await;
        with_tx!(self, |db_tx| {
            let current = load_match(&db_tx, match_id).await?;
            let mut previous: HashMap<Uuid, MoneyCents> = current
                .players
                .iter()
                .map(|payment| (payment.player.id, payment.paid))
                .collect();

            for entry in &entries {
                let contribution = current.contribution(entry.paid)?;
                let already = match previous.remove(&entry.player_id) {
                    Some(paid) => current.contribution(paid)?,
                    None => MoneyCents::ZERO,
                };
                let delta = contribution.checked_sub(already).ok_or_else(|| {
                    EngineError::InvalidAmount("payment delta overflow".to_string())
                })?;
                apply_balance_delta(&db_tx, entry.player_id, delta).await?;
            }

            for (player_id, paid) in previous {
                let reversal = -current.contribution(paid)?;
                apply_balance_delta(&db_tx, player_id, reversal).await?;
            }

            match_players::Entity::delete_many()
                .filter(match_players::Column::MatchId.eq(match_id.to_string()))
                .exec(&db_tx)
                .await?;
            for entry in &entries {
                let row = match_players::ActiveModel {
                    match_id: ActiveValue::Set(match_id.to_string()),
                    player_id: ActiveValue::Set(entry.player_id.to_string()),
                    paid_minor: ActiveValue::Set(entry.paid.cents()),
                };
                row.insert(&db_tx).await?;
            }

            tracing::info!(%match_id, entries = entries.len(), "match payments reconciled");
            load_match(&db_tx, match_id).await
        })
    }

    /// Drops a player from a match's payment list and reverses what their
    /// entry contributed to their balance.
    pub async fn remove_match_player(
        &self,
        match_id: Uuid,
        player_id: Uuid,
    ) -> ResultEngine<Match> {
        let _writer = self.writer.lock().await;
        with_tx!(self, |db_tx| {
            let current = load_match(&db_tx, match_id).await?;
            let paid = current
                .players
                .iter()
                .find(|payment| payment.player.id == player_id)
                .map(|payment| payment.paid)
                .ok_or_else(|| {
                    EngineError::KeyNotFound(format!(
                        "player {player_id} not listed in match {match_id}"
                    ))
                })?;

            let reversal = -current.contribution(paid)?;
            apply_balance_delta(&db_tx, player_id, reversal).await?;

            match_players::Entity::delete_many()
                .filter(match_players::Column::MatchId.eq(match_id.to_string()))
                .filter(match_players::Column::PlayerId.eq(player_id.to_string()))
                .exec(&db_tx)
                .await?;

            tracing::info!(%match_id, %player_id, "player removed from match");
            load_match(&db_tx, match_id).await
        })
    }
}
