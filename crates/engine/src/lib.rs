//! # Impugna Engine
//!
//! Navigation and form logic behind the impugnación registration wizard,
//! free of any terminal I/O.
//!
//! ## Usage
//!
//! ```rust
//! use impugna_engine::{ImpugnacionWizard, NavigationError, StepperStore, impugnacion_step_configs};
//! use impugna_types::TramiteKind;
//!
//! let mut store = StepperStore::create(impugnacion_step_configs());
//! let mut wizard = ImpugnacionWizard::new(TramiteKind::Registro, None);
//!
//! // "Titular" jumps straight to the authority step.
//! assert_eq!(wizard.choose_titular(&mut store), Ok(3));
//! // Guarded navigation cannot reach past the frontier.
//! assert_eq!(store.go_to_step(5), Err(NavigationError::BeyondFrontier { index: 5, frontier: 1 }));
//!
//! let collected = store.dispose();
//! assert!(collected.get("step0").is_some());
//! ```
//!
//! ## Architecture
//!
//! - **`stepper`**: the [`StepperStore`], single owner of the active step
//! - **`wizard`**: [`ImpugnacionWizard`], per-step form state and validity
//! - **`upload`**: file validation and simulated uploads
//! - **`route`**: [`WizardRoute`], the path projection of the store
//! - **`catalog`**: responsible authorities offered on the authority step

pub mod catalog;
mod error;
pub mod route;
pub mod stepper;
pub mod upload;
pub mod wizard;

pub use error::{NavigationError, RouteError, UploadRejection};
pub use route::{ResolvedRoute, WizardRoute};
pub use stepper::StepperStore;
pub use upload::{FileCandidate, FileUploader, UploadProfile};
pub use wizard::{ImpugnacionWizard, WizardExit, impugnacion_step_configs};
