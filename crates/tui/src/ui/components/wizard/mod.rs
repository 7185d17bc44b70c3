//! Step content of the impugnación wizard.

mod fields;
mod state;
mod text_field;
mod uploader_view;
mod wizard_component;

pub use fields::{DESCRIPCION_MAX_CHARS, Field, NARRATIVA_MAX_CHARS};
pub use state::{WizardButton, WizardViewState};
pub use wizard_component::WizardComponent;
