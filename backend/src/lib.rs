//! # Gabbai Backend
//!
//! Domain logic for the congregation tracker: the Hebrew calendar model,
//! aliya assignment bookkeeping, donation aggregation, upcoming-event
//! windows and the aliya-history export, plus the storage seam the
//! embedding application implements against its document store.
//!
//! Everything in [`domain`] is synchronous and pure: services are handed
//! already-fetched collections and return new values. Fetching, caching and
//! retry behavior belong to the storage backend behind [`storage`].

pub mod domain;
pub mod storage;
