//! ncml-wizard library interface
//!
//! Project creation wizard, dataset parsing and the training-service
//! clients. The `ncml` binary is a thin CLI over these modules.

pub mod error;
pub mod models;
pub mod services;
pub mod wizard;

pub use crate::error::{WizardError, WizardResult};
pub use crate::wizard::{ParseTicket, Wizard};
