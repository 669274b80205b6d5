//! Configuration structures for the extraction and dataset pipeline.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ConfigError, JoblineError};
use crate::models::line::Label;

/// Main configuration for the jobline pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JoblineConfig {
    /// Field extraction vocabularies and limits.
    pub extraction: ExtractionConfig,

    /// Posting splitter settings.
    pub splitter: SplitterConfig,

    /// Line labeling settings.
    pub labeling: LabelingConfig,

    /// Company candidate scoring settings.
    pub candidates: CandidateConfig,

    /// Minority-class oversampling defaults.
    pub oversample: OversampleConfig,
}

/// Field extraction configuration.
///
/// Marker and phrase lists are matched after [`crate::text::normalize`], so
/// case and accents in these lists do not matter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Labels introducing the role (`Cargo: ...`).
    pub role_markers: Vec<String>,

    /// Labels introducing the company.
    pub company_markers: Vec<String>,

    /// Labels introducing the posting date.
    pub date_markers: Vec<String>,

    /// Labels introducing the work mode.
    pub work_mode_markers: Vec<String>,

    /// Labels introducing the description block.
    pub description_markers: Vec<String>,

    /// Section headers introducing the requirements list.
    pub requirement_headers: Vec<String>,

    /// Words that make a line look like a job title (EN/ES).
    pub role_keywords: Vec<String>,

    /// UI chrome that is never a field value (normalized equality).
    pub deny_phrases: Vec<String>,

    /// Regexes over normalized text marking metadata lines.
    pub boilerplate_patterns: Vec<String>,

    /// Place names; a value made only of these is a location.
    pub location_terms: Vec<String>,

    /// Synonyms per canonical work mode.
    pub work_mode_synonyms: WorkModeSynonyms,

    /// `chrono` formats tried in order when parsing dates.
    pub date_formats: Vec<String>,

    /// Maximum words in a title line.
    pub max_title_words: usize,

    /// Maximum characters in a title line.
    pub max_title_chars: usize,

    /// Maximum words in a company line for the capitalized-line rule.
    pub max_company_words: usize,

    /// Maximum characters of an accepted company value.
    pub max_company_chars: usize,

    /// Minimum characters of a description block or paragraph.
    pub description_min_chars: usize,

    /// Lines kept by the leading-lines description fallback.
    pub description_max_lines: usize,

    /// Characters kept by the raw-head description fallback.
    pub description_max_chars: usize,

    /// Description used when the posting text is blank.
    pub description_placeholder: String,

    /// List items needed by the whole-text requirement fallbacks.
    pub min_list_items: usize,

    /// Single entry emitted when no requirements are found (empty list if unset).
    pub requirements_sentinel: Option<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            role_markers: strings(&[
                "cargo", "puesto", "posición", "position", "rol", "role", "título", "title",
                "job title", "nombre del cargo",
            ]),
            company_markers: strings(&[
                "empresa", "company", "organization", "organización", "cliente", "employer",
            ]),
            date_markers: strings(&[
                "fecha", "date", "publicado", "published", "posted", "start date",
                "fecha de publicación",
            ]),
            work_mode_markers: strings(&[
                "modalidad", "work mode", "modo de trabajo", "workplace type", "tipo de lugar de trabajo",
            ]),
            description_markers: strings(&[
                "descripción", "description", "sobre el puesto", "about the role",
                "about the position", "job description", "what you'll do", "acerca del empleo",
            ]),
            requirement_headers: strings(&[
                "requirements", "requisitos", "requerimientos", "responsabilidades",
                "responsibilities", "qualifications", "skills", "must have",
                "what you bring", "lo que buscamos", "perfil", "requisitos mínimos",
            ]),
            role_keywords: strings(&[
                "engineer", "analyst", "developer", "manager", "scientist", "designer",
                "consultant", "specialist", "coordinator", "architect", "administrator",
                "intern", "director", "officer", "lead", "ingeniero", "ingeniera", "analista",
                "desarrollador", "desarrolladora", "gerente", "cientifico", "cientifica",
                "disenador", "disenadora", "consultor", "consultora", "especialista",
                "coordinador", "coordinadora", "arquitecto", "arquitecta", "administrador",
                "administradora", "practicante", "lider", "jefe", "auxiliar", "asistente",
            ]),
            deny_phrases: strings(&[
                "easy apply", "apply", "save", "share", "promoted by hirer", "promoted",
                "logo", "solicitud sencilla", "solicitar", "guardar", "compartir",
                "show more", "ver más", "see more", "actively recruiting", "reposted",
                "responses managed off linkedin", "about the job", "acerca del empleo",
                "meet the hiring team", "message", "full-time", "part-time", "contract",
                "jornada completa", "medio tiempo", "contrato",
            ]),
            boilerplate_patterns: strings(&[
                r"\b\d+\s+(?:days?|weeks?|hours?|months?|minutes?)\s+ago\b",
                r"\bhace\s+\d+\s+(?:dias?|semanas?|horas?|meses?|minutos?)\b",
                r"\b(?:over\s+|mas\s+de\s+)?\d+\s+(?:applicants?|solicitudes|candidatos)\b",
                r"\bapplicants?\b",
                r"\bfull ?time\b",
                r"\bpart ?time\b",
                r"\beasy apply\b",
                r"\bpromoted\b",
                r"\b(?:save|share)\b",
            ]),
            location_terms: strings(&[
                "colombia", "bogota", "bogota d.c.", "medellin", "cali", "barranquilla",
                "antioquia", "cundinamarca", "valle del cauca", "mexico", "cdmx",
                "ciudad de mexico", "argentina", "buenos aires", "chile", "santiago", "peru",
                "lima", "spain", "espana", "madrid", "barcelona", "united states",
                "latin america", "latam", "americas",
            ]),
            work_mode_synonyms: WorkModeSynonyms::default(),
            date_formats: strings(&[
                "%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%d-%m-%Y", "%d/%m/%Y", "%d.%m.%Y",
                "%m-%d-%Y", "%m/%d/%Y",
            ]),
            max_title_words: 12,
            max_title_chars: 100,
            max_company_words: 8,
            max_company_chars: 80,
            description_min_chars: 50,
            description_max_lines: 10,
            description_max_chars: 500,
            description_placeholder: "Sin descripción disponible".to_string(),
            min_list_items: 2,
            requirements_sentinel: None,
        }
    }
}

/// Synonym lists mapping free text to a canonical work mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkModeSynonyms {
    pub remote: Vec<String>,
    pub hybrid: Vec<String>,
    pub onsite: Vec<String>,
}

impl Default for WorkModeSynonyms {
    fn default() -> Self {
        Self {
            remote: strings(&["remote", "remoto", "remota", "teletrabajo", "work from home", "wfh"]),
            hybrid: strings(&["hybrid", "híbrido", "hibrido", "híbrida", "mixto"]),
            onsite: strings(&["on-site", "on site", "onsite", "presencial", "in office", "en oficina"]),
        }
    }
}

/// Posting splitter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitterConfig {
    /// Blocks shorter than this many characters are dropped as noise.
    pub min_block_chars: usize,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self { min_block_chars: 50 }
    }
}

/// Line labeling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelingConfig {
    /// Leading target tokens that must all appear for the token fallback.
    pub token_fallback_len: usize,

    /// Only accept whole-word matches of the full target.
    pub require_word_boundary: bool,
}

impl Default for LabelingConfig {
    fn default() -> Self {
        Self {
            token_fallback_len: 3,
            require_word_boundary: false,
        }
    }
}

/// Company candidate scoring configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateConfig {
    pub indicator_weight: i32,
    pub logo_weight: i32,
    pub titlecase_weight: i32,
    pub metadata_penalty: i32,
    pub titlecase_min_words: usize,
    pub titlecase_max_words: usize,
    /// Score at or above which a candidate is auto-labeled as company.
    pub auto_label_threshold: i32,
}

impl Default for CandidateConfig {
    fn default() -> Self {
        Self {
            indicator_weight: 5,
            logo_weight: 3,
            titlecase_weight: 2,
            metadata_penalty: 5,
            titlecase_min_words: 2,
            titlecase_max_words: 6,
            auto_label_threshold: 5,
        }
    }
}

/// Oversampling defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OversampleConfig {
    pub label: Label,
    pub target_ratio: f64,
    pub seed: Option<u64>,
}

impl Default for OversampleConfig {
    fn default() -> Self {
        Self {
            label: Label::Company,
            target_ratio: 0.25,
            seed: None,
        }
    }
}

impl JoblineConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, JoblineError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), JoblineError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Value of a dotted key such as `splitter.min_block_chars`.
    pub fn lookup(&self, key: &str) -> Result<serde_json::Value, JoblineError> {
        let json = serde_json::to_value(self)?;
        key.split('.')
            .try_fold(&json, |node, part| node.get(part))
            .cloned()
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()).into())
    }

    /// Copy with one existing dotted key replaced, validated.
    ///
    /// The value must deserialize into the setting's type.
    pub fn with_setting(&self, key: &str, value: serde_json::Value) -> Result<Self, JoblineError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let mut json = serde_json::to_value(self)?;

        let (last, path) = match key.rsplit_once('.') {
            Some((path, last)) => (last, Some(path)),
            None => (key, None),
        };
        let mut node = &mut json;
        for part in path.into_iter().flat_map(|p| p.split('.')) {
            node = node.get_mut(part).ok_or_else(unknown)?;
        }
        let slot = node
            .as_object_mut()
            .and_then(|section| section.get_mut(last))
            .ok_or_else(unknown)?;
        *slot = value;

        let config: Self = serde_json::from_value(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check settings that the pipeline cannot run without.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let extraction = &self.extraction;
        if extraction.date_formats.is_empty() {
            return Err(ConfigError::EmptyVocabulary("extraction.date_formats"));
        }
        if extraction.requirement_headers.is_empty() {
            return Err(ConfigError::EmptyVocabulary("extraction.requirement_headers"));
        }
        if extraction.description_placeholder.trim().is_empty() {
            return Err(ConfigError::EmptyVocabulary("extraction.description_placeholder"));
        }
        if extraction.max_title_words == 0 || extraction.max_title_chars == 0 {
            return Err(ConfigError::InvalidValue {
                field: "extraction.max_title_words",
                reason: "title limits must be positive".to_string(),
            });
        }
        if self.labeling.token_fallback_len == 0 {
            return Err(ConfigError::InvalidValue {
                field: "labeling.token_fallback_len",
                reason: "must be at least 1".to_string(),
            });
        }
        let ratio = self.oversample.target_ratio;
        if !(ratio > 0.0 && ratio < 1.0) {
            return Err(ConfigError::InvalidValue {
                field: "oversample.target_ratio",
                reason: format!("{ratio} is not in (0, 1)"),
            });
        }
        Ok(())
    }
}
