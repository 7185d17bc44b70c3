use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use impugna_types::{ArchivoResumen, EstadoArchivo};
use impugna_util::format_file_size;
use tracing::{debug, info};

use super::{UploaderConfig, sniff};
use crate::UploadRejection;

/// Interval between two simulated progress updates.
pub const UPLOAD_TICK_MS: u64 = 30;

const MIN_UPLOAD_MS: f64 = 500.0;
const MAX_UPLOAD_MS: f64 = 3000.0;
/// Progress stalls here until the next tick completes the upload.
const PROGRESS_CEILING: f64 = 95.0;

/// A file offered to an uploader, described by what the validator needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    pub nombre: String,
    pub tamano: u64,
    pub mime_type: Option<String>,
    /// Leading bytes of the content; four are enough for sniffing.
    pub header: Vec<u8>,
}

impl FileCandidate {
    pub fn new(nombre: impl Into<String>, tamano: u64, header: impl Into<Vec<u8>>) -> Self {
        Self {
            nombre: nombre.into(),
            tamano,
            mime_type: None,
            header: header.into(),
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Reads the size and the first four bytes of a local file.
    pub fn inspect_path(path: &Path) -> io::Result<Self> {
        let metadata = path.metadata()?;
        let mut header = Vec::with_capacity(4);
        File::open(path)?.take(4).read_to_end(&mut header)?;
        let nombre = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(nombre, metadata.len(), header))
    }

    /// Lowercase extension with its leading dot. A name without a dot yields
    /// the whole name, which never matches an accepted type.
    fn extension(&self) -> String {
        let last = self.nombre.rsplit('.').next().unwrap_or_default();
        format!(".{}", last.to_lowercase())
    }
}

/// One row of an uploader.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchivoMetadata {
    pub id: String,
    pub nombre: String,
    /// Human readable size.
    pub tamano: String,
    pub tamano_bytes: u64,
    pub tipo: Option<String>,
    pub estado: EstadoArchivo,
    /// 0..=100
    pub progreso: u8,
    pub mensaje_error: Option<String>,
    exact_progress: f64,
    increment: f64,
}

impl ArchivoMetadata {
    fn new(id: String, candidate: &FileCandidate, estado: EstadoArchivo) -> Self {
        let size_mb = candidate.tamano as f64 / (1024.0 * 1024.0);
        let duration_ms = (size_mb * 100.0).clamp(MIN_UPLOAD_MS, MAX_UPLOAD_MS);
        Self {
            id,
            nombre: candidate.nombre.clone(),
            tamano: format_file_size(candidate.tamano),
            tamano_bytes: candidate.tamano,
            tipo: candidate.mime_type.clone(),
            estado,
            progreso: 0,
            mensaje_error: None,
            exact_progress: 0.0,
            increment: PROGRESS_CEILING / (duration_ms / UPLOAD_TICK_MS as f64),
        }
    }

    /// Status line, e.g. "Cargando archivo: demanda.pdf, tamaño: 2 MB, progreso: 40%".
    pub fn describe(&self) -> String {
        let mut line = format!("{}: {}, tamaño: {}", self.estado.caption(), self.nombre, self.tamano);
        if self.estado == EstadoArchivo::Cargando {
            line.push_str(&format!(", progreso: {}%", self.progreso));
        }
        line
    }

    fn is_counted(&self) -> bool {
        self.estado != EstadoArchivo::Error
    }
}

/// Validates files and simulates their upload one at a time.
///
/// Progress is driven by [`FileUploader::tick`], called every
/// [`UPLOAD_TICK_MS`] by the host while [`FileUploader::is_busy`] holds.
#[derive(Debug, Clone)]
pub struct FileUploader {
    config: UploaderConfig,
    archivos: Vec<ArchivoMetadata>,
    next_id: u64,
}

impl FileUploader {
    pub fn new(config: UploaderConfig) -> Self {
        Self {
            config,
            archivos: Vec::new(),
            next_id: 1,
        }
    }

    pub fn config(&self) -> &UploaderConfig {
        &self.config
    }

    pub fn entries(&self) -> &[ArchivoMetadata] {
        &self.archivos
    }

    /// Runs the validation pipeline for a single candidate against the
    /// current entries without adding it.
    pub fn validate(&self, candidate: &FileCandidate) -> Result<(), UploadRejection> {
        if candidate.nombre.trim().is_empty() {
            return Err(UploadRejection::MissingName);
        }
        if let Some(max) = self.config.max_files
            && self.archivos.iter().filter(|a| a.is_counted()).count() >= max
        {
            return Err(UploadRejection::TooManyFiles { max });
        }
        if self
            .archivos
            .iter()
            .any(|a| a.is_counted() && a.nombre == candidate.nombre)
        {
            return Err(UploadRejection::Duplicate);
        }
        if let Some(max) = self.config.max_file_name_length
            && candidate.nombre.chars().count() > max
        {
            return Err(UploadRejection::NameTooLong { max });
        }
        let type_accepted = self.config.accepted_file_types.contains(&candidate.extension())
            || candidate
                .mime_type
                .as_ref()
                .is_some_and(|mime| self.config.accepted_mime_types.contains(mime));
        if !type_accepted {
            return Err(UploadRejection::TypeNotAllowed {
                allowed: self.config.file_types_text(),
            });
        }
        if self.config.validate_magic_number && sniff(&candidate.header).is_none() {
            return Err(UploadRejection::InvalidContent);
        }
        if candidate.tamano > self.config.max_file_size_bytes() {
            return Err(UploadRejection::TooLarge {
                max_mb: self.config.max_file_size_mb,
            });
        }
        Ok(())
    }

    /// Validates and queues `candidates`. Rejected files are kept as error
    /// rows so the user sees why. Returns the id of each new row or the
    /// rejection, in order.
    pub fn add_files(&mut self, candidates: Vec<FileCandidate>) -> Vec<Result<String, UploadRejection>> {
        let mut candidates = candidates;
        if !self.config.allow_multiple {
            self.cancel_in_flight();
            self.archivos.clear();
            candidates.truncate(1);
        }

        let mut outcomes = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let id = self.allocate_id();
            match self.validate(&candidate) {
                Ok(()) => {
                    debug!(uploader = %self.config.title, file = %candidate.nombre, "file queued");
                    self.archivos.push(ArchivoMetadata::new(id.clone(), &candidate, EstadoArchivo::Pendiente));
                    outcomes.push(Ok(id));
                }
                Err(rejection) => {
                    debug!(uploader = %self.config.title, file = %candidate.nombre, %rejection, "file rejected");
                    let mut entry = ArchivoMetadata::new(id, &candidate, EstadoArchivo::Error);
                    entry.mensaje_error = Some(rejection.to_string());
                    self.archivos.push(entry);
                    outcomes.push(Err(rejection));
                }
            }
        }
        outcomes
    }

    /// Advances the simulated upload of the first queued or in-flight file.
    /// Returns whether anything changed.
    pub fn tick(&mut self) -> bool {
        let Some(entry) = self
            .archivos
            .iter_mut()
            .find(|a| matches!(a.estado, EstadoArchivo::Pendiente | EstadoArchivo::Cargando))
        else {
            return false;
        };

        if entry.estado == EstadoArchivo::Pendiente {
            entry.estado = EstadoArchivo::Cargando;
            entry.progreso = 0;
            debug!(file = %entry.nombre, "upload started");
        } else if entry.exact_progress >= PROGRESS_CEILING {
            entry.estado = EstadoArchivo::Exitoso;
            entry.progreso = 100;
            info!(file = %entry.nombre, size = %entry.tamano, "upload finished");
        } else {
            entry.exact_progress = (entry.exact_progress + entry.increment).min(PROGRESS_CEILING);
            entry.progreso = entry.exact_progress.round() as u8;
        }
        true
    }

    /// Removes a row. Removing the file in flight cancels its upload and the
    /// next queued file starts on the following tick.
    pub fn remove(&mut self, id: &str) -> Option<ArchivoMetadata> {
        let position = self.archivos.iter().position(|a| a.id == id)?;
        let removed = self.archivos.remove(position);
        if removed.estado == EstadoArchivo::Cargando {
            info!(file = %removed.nombre, progress = removed.progreso, "upload cancelled");
        }
        Some(removed)
    }

    /// Drops every row, cancelling any upload in flight.
    pub fn clear(&mut self) {
        self.cancel_in_flight();
        self.archivos.clear();
    }

    pub fn is_uploading(&self) -> bool {
        self.archivos.iter().any(|a| a.estado == EstadoArchivo::Cargando)
    }

    /// Whether ticks still have work to do.
    pub fn is_busy(&self) -> bool {
        self.archivos
            .iter()
            .any(|a| matches!(a.estado, EstadoArchivo::Pendiente | EstadoArchivo::Cargando))
    }

    pub fn is_valid(&self) -> bool {
        if self.is_uploading() {
            return false;
        }
        if self.archivos.is_empty() {
            return !self.config.required;
        }
        self.archivos.iter().all(|a| a.estado == EstadoArchivo::Exitoso)
    }

    /// Files that finished uploading, for the step payloads.
    pub fn successful_files(&self) -> Vec<ArchivoResumen> {
        self.archivos
            .iter()
            .filter(|a| a.estado == EstadoArchivo::Exitoso)
            .map(|a| ArchivoResumen {
                nombre: a.nombre.clone(),
                tamano: a.tamano_bytes,
                tipo: a.tipo.clone(),
            })
            .collect()
    }

    fn cancel_in_flight(&mut self) {
        if let Some(entry) = self.archivos.iter().find(|a| a.estado == EstadoArchivo::Cargando) {
            info!(file = %entry.nombre, "upload cancelled");
        }
    }

    fn allocate_id(&mut self) -> String {
        let id = format!("archivo-{}", self.next_id);
        self.next_id += 1;
        id
    }
}
