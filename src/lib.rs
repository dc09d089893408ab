//! # tidegen
//!
//! Tidal harmonic constituents: generation of yearly speeds, equilibrium
//! arguments and node factors from astronomical definitions, and least-squares
//! harmonic analysis of water-level records.
//!
//! ## Modules
//!
//! * [`astro`] – Mean longitudes, lunar node terms and node factor formulas.
//! * [`constituent`] – Constituent definitions and the [`constituent::ConstituentBuilder`].
//! * [`legacy_input`] – Reader for the legacy text definition format.
//! * [`tables`] – Text tables of speeds, arguments and node factors.
//! * [`analysis`] – Time series, harmonic regression and pruning.
//! * [`tidegen`] – The [`tidegen::Tidegen`] context tying it all together.
pub mod analysis;
pub mod astro;
pub mod constants;
pub mod constituent;
pub mod legacy_input;
pub mod logger;
pub mod tables;
pub mod tidegen;
pub mod tidegen_errors;
pub mod time;
mod tokens;

pub use crate::tidegen::Tidegen;
pub use crate::tidegen_errors::TidegenError;
