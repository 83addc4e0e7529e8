//! Resource helpers built on the generic dispatcher
//!
//! Each helper is a thin wrapper around `get`/`post`/`put`/`delete` or
//! `paginate`, exposed as an extension trait on [`FolioClient`](crate::FolioClient).

pub mod loans;
pub mod users;

pub use loans::{due_date_query, LoansApi, LOANS_ENDPOINT};
pub use users::{UsersApi, USERS_ENDPOINT};
