//! Refund case lifecycle: evaluation, review, withdrawal, and expiration.
//!
//! The pure transition functions ([`evaluate`], [`resolve`],
//! [`check_expiration`], [`withdraw`]) take the current time as an argument.
//! [`CaseBook`] owns live cases, reads time from an injected [`Clock`], and
//! guarantees that at most one transition wins for a pending case.
//! [`ExpirationSweeper`] drives expirations from a `tokio` interval.

#![warn(missing_docs, clippy::pedantic)]

mod book;
mod clock;
mod lifecycle;
mod notify;
mod sweeper;

pub use book::{BookError, BookResult, CaseBook};
pub use clock::{Clock, ManualClock, SystemClock};
pub use lifecycle::{
    LifecycleError, LifecycleEvent, LifecycleResult, RefundCase, RefundState, ReviewAction,
    check_expiration, evaluate, next_state, resolve, withdraw,
};
pub use notify::{Notice, NoticeKind, expiry_notice, review_notice};
pub use sweeper::{ExpirationSweeper, SweeperConfig, SweeperError, SweeperResult};
