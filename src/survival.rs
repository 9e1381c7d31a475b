//! Right-censored, discrete-time survival outcomes.
//!
//! - [`censoring`]: IPCW weights from a Kaplan-Meier censoring curve.
//! - [`person_period`]: the person-period expansion and its inverse.
//! - [`hazard`]: pooled and unpooled hazard ensembles.

pub mod censoring;
pub mod person_period;
pub mod hazard;


pub use censoring::{
    ipcw_weights,
    CensoringFit,
    CensoringTable,
    IpcwVariant,
};
pub use person_period::{Expander, PersonPeriod};
pub use hazard::{DiscreteSurvival, HazardModel, SurvivalEnsemble};
