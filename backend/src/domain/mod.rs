//! # Domain Module
//!
//! Business logic for the congregation tracker.
//!
//! - **calendar**: Hebrew calendar conversion, age arithmetic and validation
//! - **sedra**: weekly Torah-portion schedule backing parasha lookups
//! - **gematria**: Hebrew numeral and date rendering
//! - **prayer_service**: aliya eligibility and roster flattening
//! - **aliya_service**: joining assignment maps against the roster
//! - **donation_service**: roster-wide donation aggregation
//! - **upcoming_service**: birthday and life-event lookahead windows
//! - **history_service**: aliya history and its export shaping
//!
//! Services operate on collections the caller already fetched; they never
//! touch storage and every operation returns new values.

pub mod aliya_service;
pub mod calendar;
pub mod donation_service;
pub mod gematria;
pub mod history_service;
pub mod prayer_service;
pub mod sedra;
pub mod upcoming_service;

pub use aliya_service::*;
pub use calendar::*;
pub use donation_service::*;
pub use history_service::*;
pub use prayer_service::*;
pub use upcoming_service::*;
