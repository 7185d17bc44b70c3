//! # ImpugnaINE shared types
//!
//! Data model shared by the stepper engine, the terminal front end and the
//! command line: step descriptors and their runtime state, the typed per-step
//! payloads accumulated while the citizen fills in the wizard, and the file
//! metadata reported by the uploaders.
//!
//! Everything here is plain data. Navigation rules and validity predicates
//! live in `impugna-engine`.

pub mod archivo;
pub mod payload;
pub mod step;

pub use archivo::{ArchivoResumen, EstadoArchivo};
pub use payload::{
    ActoresData, AutoridadAgregada, AutoridadData, DemandaData, EvidenciaData, FormData, ParseTramiteKindError, PersonalidadData,
    RegistrantType, Representante, RepresentanteData, StepPayload, TramiteKind,
};
pub use step::{StepConfig, StepConfigPatch, StepState};
