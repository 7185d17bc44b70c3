mod state;
mod stepper_component;

pub use state::{DotState, StepperViewState};
pub use stepper_component::StepperComponent;
