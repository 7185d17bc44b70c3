//! File metadata reported by the uploaders.

use serde::{Deserialize, Serialize};

/// Lifecycle of a file inside an uploader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstadoArchivo {
    /// Accepted, waiting for its turn.
    Pendiente,
    /// Upload in flight.
    Cargando,
    Exitoso,
    Error,
}

impl EstadoArchivo {
    /// Spanish caption for status lines and screen readers.
    pub fn caption(&self) -> &'static str {
        match self {
            Self::Pendiente => "En espera",
            Self::Cargando => "Cargando archivo",
            Self::Exitoso => "Archivo cargado exitosamente",
            Self::Error => "Error al cargar archivo",
        }
    }
}

/// Summary of an uploaded file as stored in the step payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchivoResumen {
    pub nombre: String,
    /// Size in bytes.
    pub tamano: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tipo: Option<String>,
}
