//! UI components: stepper, step content and review.

pub mod common;
pub mod component;
pub mod review;
pub mod stepper;
pub mod wizard;

pub(crate) use component::*;
pub use review::ReviewComponent;
pub use stepper::StepperComponent;
pub use wizard::WizardComponent;
