//! Record keeping for a team: the fund ledger, player balances and match
//! payments.
//!
//! All operations go through [`Engine`], which owns the database connection.
//! Mutations run inside a single database transaction and are serialized by
//! one writer lock, so the derived running funds are never observed half
//! recomputed.

pub use error::EngineError;
pub use ledger::fold_running_funds;
pub use matches::{Match, MatchPayment, NewMatch, PaymentEntry};
pub use money::MoneyCents;
pub use ops::{Engine, EngineBuilder, NewPlayer};
pub use players::{Player, Team};
pub use transactions::{NewTransaction, Transaction, TransactionKind};

mod error;
mod ledger;
mod match_players;
mod matches;
mod money;
mod ops;
mod players;
mod transactions;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
