use thiserror::Error;

/// Why a navigation request or a per-step mutation was refused.
///
/// A refused request never changes the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("step {index} is out of range (wizard has {total} steps)")]
    OutOfRange { index: usize, total: usize },
    #[error("the wizard has no steps configured")]
    NoSteps,
    #[error("already at the first step")]
    AtFirstStep,
    #[error("already at the last step")]
    AtLastStep,
    #[error("step {index} is not valid yet")]
    CurrentStepInvalid { index: usize },
    #[error("step {index} lies beyond the reachable frontier (step {frontier})")]
    BeyondFrontier { index: usize, frontier: usize },
    #[error("step {index} is not the last step")]
    NotAtLastStep { index: usize },
}

/// Failure to resolve a wizard route path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("invalid route '{path}': {reason}")]
    Malformed { path: String, reason: String },
    #[error("route '{path}' does not belong to the impugnación wizard")]
    ForeignPrefix { path: String },
    #[error("unknown step '{step}' in route")]
    UnknownStep { step: String },
    #[error("invalid tipo '{0}' in route")]
    UnknownTramite(String),
}

/// Why a file was refused by an uploader. `Display` is the message shown to
/// the citizen.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadRejection {
    #[error("El archivo no tiene nombre. Por favor, selecciona un archivo válido.")]
    MissingName,
    #[error("Solo puedes subir un máximo de {max} archivo(s)")]
    TooManyFiles { max: usize },
    #[error("Este archivo ya ha sido agregado. Por favor, selecciona un archivo diferente.")]
    Duplicate,
    #[error("El nombre del archivo es demasiado largo (máximo {max} caracteres).")]
    NameTooLong { max: usize },
    #[error("Tipo de archivo no permitido. Solo se permiten: {allowed}")]
    TypeNotAllowed { allowed: String },
    #[error("El archivo no es válido o ha sido modificado.")]
    InvalidContent,
    #[error("El archivo excede el tamaño máximo de {max_mb} MB")]
    TooLarge { max_mb: u64 },
}
