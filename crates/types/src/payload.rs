//! Typed per-step payloads and the accumulated form data.
//!
//! Each wizard step stores its own record. Field names serialize in
//! camelCase so the JSON matches what the registration backend expects.

use std::{fmt, str::FromStr};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::ArchivoResumen;

/// Kind of procedure the citizen is registering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TramiteKind {
    #[default]
    Registro,
    Ampliacion,
    Coadyuvante,
}

impl TramiteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Registro => "registro",
            Self::Ampliacion => "ampliacion",
            Self::Coadyuvante => "coadyuvante",
        }
    }

    /// Heading shown above the stepper.
    pub fn wizard_title(&self) -> &'static str {
        match self {
            Self::Registro => "Registrar una nueva impugnación",
            Self::Ampliacion => "Registrar una ampliación de demanda",
            Self::Coadyuvante => "Registrar tercero interesado-Coadyuvante",
        }
    }

    /// Question asked on the first step.
    pub fn actor_prompt(&self) -> &'static str {
        match self {
            Self::Registro => "Elige el tipo de persona que registra la impugnación",
            Self::Ampliacion => "Elige al actor que va a registrar una ampliación de demanda",
            Self::Coadyuvante => "Elige el tipo de persona que registra la tercería",
        }
    }

    /// Caption of the "titular" choice on the first step.
    pub fn titular_label(&self) -> &'static str {
        match self {
            Self::Coadyuvante => "Titular del registro",
            _ => "Titular (Agraviado)",
        }
    }
}

impl fmt::Display for TramiteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a [`TramiteKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTramiteKindError(pub String);

impl fmt::Display for ParseTramiteKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown tramite kind '{}' (expected registro, ampliacion or coadyuvante)", self.0)
    }
}

impl std::error::Error for ParseTramiteKindError {}

impl FromStr for TramiteKind {
    type Err = ParseTramiteKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "registro" => Ok(Self::Registro),
            "ampliacion" => Ok(Self::Ampliacion),
            "coadyuvante" => Ok(Self::Coadyuvante),
            other => Err(ParseTramiteKindError(other.to_string())),
        }
    }
}

/// Who is filing: the aggrieved person or their representatives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrantType {
    Titular,
    Representantes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActoresData {
    pub option: RegistrantType,
    pub tipo_tramite: TramiteKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expediente: Option<String>,
}

/// A legal representative and the capacity ("calidad") they hold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Representante {
    pub nombre: String,
    pub calidad: String,
}

impl Representante {
    pub fn is_complete(&self) -> bool {
        !self.nombre.trim().is_empty() && !self.calidad.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepresentanteData {
    pub option: RegistrantType,
    pub nombre_titular: String,
    pub representantes: Vec<Representante>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalidadData {
    pub archivos: Vec<ArchivoResumen>,
}

/// One responsible authority added on the authority step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoridadAgregada {
    pub autoridad_responsable: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subopcion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estado: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distrito: Option<String>,
    #[serde(default)]
    pub descripcion: String,
}

impl AutoridadAgregada {
    /// One-line caption, e.g. "Juntas Distritales - Jalisco - Junta Distrital Ejecutiva 02".
    pub fn display_label(&self) -> String {
        let mut label = self.autoridad_responsable.clone();
        if let Some(subopcion) = &self.subopcion {
            label.push_str(" - ");
            label.push_str(subopcion);
        }
        if let (Some(estado), Some(distrito)) = (&self.estado, &self.distrito) {
            label.push_str(&format!(" - {estado} - {distrito}"));
        }
        label
    }

    pub fn has_description(&self) -> bool {
        !self.descripcion.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoridadData {
    pub autoridades_agregadas: Vec<AutoridadAgregada>,
}

/// Narrative of facts and grievances plus the signed complaint PDF.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemandaData {
    pub descripcion: String,
    pub archivos: Vec<ArchivoResumen>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenciaData {
    pub archivos: Vec<ArchivoResumen>,
    pub cantidad_archivos: usize,
}

impl EvidenciaData {
    pub fn from_archivos(archivos: Vec<ArchivoResumen>) -> Self {
        let cantidad_archivos = archivos.len();
        Self {
            archivos,
            cantidad_archivos,
        }
    }
}

/// Payload stored for a step, tagged by the step it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", content = "data", rename_all = "snake_case")]
pub enum StepPayload {
    Actores(ActoresData),
    Representante(RepresentanteData),
    Personalidad(PersonalidadData),
    Autoridad(AutoridadData),
    Demanda(DemandaData),
    Evidencia(EvidenciaData),
}

impl StepPayload {
    /// Id of the step configuration this payload belongs to.
    pub fn step_id(&self) -> &'static str {
        match self {
            Self::Actores(_) => "actores",
            Self::Representante(_) => "representante",
            Self::Personalidad(_) => "personalidad",
            Self::Autoridad(_) => "autoridad",
            Self::Demanda(_) => "impugnacion",
            Self::Evidencia(_) => "evidencia",
        }
    }
}

/// Accumulated wizard data keyed by step key (`step1`, `step3`, ...).
///
/// Insertion ordered; merging is shallow, a later payload for the same key
/// replaces the earlier one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormData(IndexMap<String, StepPayload>);

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key under which data for the step at `index` is stored.
    pub fn step_key(index: usize) -> String {
        format!("step{index}")
    }

    /// Single-entry form data, handy for partial updates.
    pub fn with_entry(key: impl Into<String>, payload: StepPayload) -> Self {
        let mut data = Self::new();
        data.insert(key, payload);
        data
    }

    pub fn insert(&mut self, key: impl Into<String>, payload: StepPayload) -> Option<StepPayload> {
        self.0.insert(key.into(), payload)
    }

    pub fn get(&self, key: &str) -> Option<&StepPayload> {
        self.0.get(key)
    }

    /// Shallow merge: every entry of `partial` overwrites the same key here.
    pub fn merge(&mut self, partial: FormData) {
        for (key, payload) in partial.0 {
            self.0.insert(key, payload);
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &StepPayload)> {
        self.0.iter()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn autoridad(descripcion: &str) -> StepPayload {
        StepPayload::Autoridad(AutoridadData {
            autoridades_agregadas: vec![AutoridadAgregada {
                autoridad_responsable: "Juntas Locales".into(),
                subopcion: Some("Junta Local Ejecutiva en Jalisco".into()),
                descripcion: descripcion.into(),
                ..Default::default()
            }],
        })
    }

    #[test]
    fn payload_serializes_with_step_tag_and_camel_case_fields() {
        let payload = StepPayload::Representante(RepresentanteData {
            option: RegistrantType::Representantes,
            nombre_titular: "María López".into(),
            representantes: vec![Representante {
                nombre: "Juan Pérez".into(),
                calidad: "Apoderado".into(),
            }],
        });

        let value = serde_json::to_value(&payload).expect("serialize payload");
        assert_eq!(value["step"], "representante");
        assert_eq!(value["data"]["option"], "representantes");
        assert_eq!(value["data"]["nombreTitular"], "María López");
        assert_eq!(value["data"]["representantes"][0]["calidad"], "Apoderado");
    }

    #[test]
    fn merge_replaces_same_key_and_keeps_order() {
        let mut data = FormData::with_entry("step3", autoridad("primera"));
        data.insert("step4", StepPayload::Demanda(DemandaData::default()));

        data.merge(FormData::with_entry("step3", autoridad("segunda")));

        let keys: Vec<_> = data.iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(keys, vec!["step3", "step4"]);
        assert_eq!(data.get("step3"), Some(&autoridad("segunda")));
    }

    #[test]
    fn form_data_is_a_plain_json_object() {
        let data = FormData::with_entry(FormData::step_key(4), StepPayload::Demanda(DemandaData::default()));
        let yaml = serde_yaml::to_string(&data).expect("serialize yaml");
        assert!(yaml.starts_with("step4:"), "unexpected yaml: {yaml}");
    }

    #[test]
    fn tramite_kind_parses_case_insensitively() {
        assert_eq!("Ampliacion".parse::<TramiteKind>(), Ok(TramiteKind::Ampliacion));
        assert!("amicus".parse::<TramiteKind>().is_err());
        assert_eq!(TramiteKind::Coadyuvante.titular_label(), "Titular del registro");
    }

    #[test]
    fn autoridad_label_includes_district_path() {
        let entry = AutoridadAgregada {
            autoridad_responsable: "Juntas Distritales".into(),
            estado: Some("Jalisco".into()),
            distrito: Some("Junta Distrital Ejecutiva 02".into()),
            ..Default::default()
        };
        assert_eq!(entry.display_label(), "Juntas Distritales - Jalisco - Junta Distrital Ejecutiva 02");
        assert!(!entry.has_description());
    }
}
