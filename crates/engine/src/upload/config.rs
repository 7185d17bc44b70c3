use std::{fmt, str::FromStr};

/// Static rules applied by a [`FileUploader`](super::FileUploader).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploaderConfig {
    /// Extensions including the leading dot, lowercase (".pdf").
    pub accepted_file_types: Vec<String>,
    pub accepted_mime_types: Vec<String>,
    pub max_file_size_mb: u64,
    pub max_files: Option<usize>,
    pub max_file_name_length: Option<usize>,
    pub allow_multiple: bool,
    /// At least one successful file is needed for the uploader to be valid.
    pub required: bool,
    /// Check the first four bytes against the known signatures.
    pub validate_magic_number: bool,
    pub title: String,
}

impl UploaderConfig {
    /// "PDF, JPG, PNG" style list used in rejection messages and hints.
    pub fn file_types_text(&self) -> String {
        self.accepted_file_types
            .iter()
            .map(|ext| ext.trim_start_matches('.').to_uppercase())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb.saturating_mul(1024 * 1024)
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

/// The uploader presets used by the impugnación wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadProfile {
    /// Identity documents on the "Personalidad" step.
    Personalidad,
    /// The signed complaint on the "Impugnación" step.
    Demanda,
    /// Supporting evidence on the "Evidencia" step.
    Evidencia,
}

impl UploadProfile {
    pub const ALL: [UploadProfile; 3] = [Self::Personalidad, Self::Demanda, Self::Evidencia];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Personalidad => "personalidad",
            Self::Demanda => "demanda",
            Self::Evidencia => "evidencia",
        }
    }

    pub fn config(&self) -> UploaderConfig {
        match self {
            Self::Personalidad => UploaderConfig {
                accepted_file_types: strings(&[".jpg", ".jpeg", ".png", ".pdf"]),
                accepted_mime_types: strings(&["image/jpeg", "image/png", "application/pdf"]),
                max_file_size_mb: 50,
                max_files: None,
                max_file_name_length: Some(60),
                allow_multiple: true,
                required: false,
                validate_magic_number: true,
                title: "Sube un documento que acredite tu personalidad legal".into(),
            },
            Self::Demanda => UploaderConfig {
                accepted_file_types: strings(&[".pdf"]),
                accepted_mime_types: strings(&["application/pdf"]),
                max_file_size_mb: 200,
                max_files: Some(1),
                max_file_name_length: Some(60),
                allow_multiple: false,
                required: true,
                validate_magic_number: true,
                title: "Sube tu demanda firmada".into(),
            },
            Self::Evidencia => UploaderConfig {
                accepted_file_types: strings(&[
                    ".pdf", ".jpg", ".jpeg", ".png", ".zip", ".doc", ".docx", ".xls", ".xlsx", ".mp3", ".mp4",
                ]),
                accepted_mime_types: strings(&[
                    "application/pdf",
                    "image/jpeg",
                    "image/png",
                    "application/zip",
                    "audio/mpeg",
                    "video/mp4",
                ]),
                max_file_size_mb: 1024,
                max_files: None,
                max_file_name_length: Some(60),
                allow_multiple: true,
                required: false,
                validate_magic_number: false,
                title: "Adjunta las pruebas que respalden tu impugnación".into(),
            },
        }
    }
}

impl fmt::Display for UploadProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UploadProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|profile| profile.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown upload profile '{s}' (expected personalidad, demanda or evidencia)"))
    }
}
