//! Trackmail: email parsing core for a job-application tracker.
//!
//! Takes an arbitrary inbound email and answers two questions: what
//! application is this about (company, position, applied date), and where in
//! the lifecycle is it (applied / interview / offer / rejected / not job
//! related). Extraction runs a layered fallback chain ordered by reliability;
//! classification scores weighted phrase indicators. The contract is "never
//! fail, always answer with a confidence": the worst case is absent fields
//! with confidence 0, not an error.
//!
//! Persistence, auth, and the ingestion HTTP surface live in sibling
//! services; this crate is the parsing core plus a thin CLI boundary.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod aggregate;
pub mod classify;
pub mod config;
pub mod email;
pub mod engine;
pub mod extract;
pub mod logging;
pub mod rules;
pub mod semantic;
