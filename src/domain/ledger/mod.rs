//! The transaction ledger: append-only payment attempt history.

mod payee;
mod status;
mod transaction;

pub use payee::{Payee, PayeeKind};
pub use status::{is_settled_report, map_report, TransactionStatus, SETTLED_REPORTS};
pub use transaction::Transaction;
