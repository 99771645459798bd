//! Configuração do speakscore carregada a partir de `speakscore.toml`.
//!
//! A struct [`ScoreConfig`] contém todos os parâmetros configuráveis.
//! Valores não presentes no arquivo usam defaults sensíveis.
//! As variáveis de ambiente `SPEAKSCORE_ENDPOINT` e `SPEAKSCORE_DB` têm
//! precedência sobre o arquivo.

use anyhow::Result;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::runner::MediaSettings;
use crate::state_machine::PollPolicy;
use crate::transcribe::DEFAULT_ENDPOINT;

/// Nome do arquivo de configuração procurado no diretório atual.
pub const CONFIG_FILE: &str = "speakscore.toml";

/// Configuração de nível superior carregada de `speakscore.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoreConfig {
    /// Endpoint do serviço de transcrição.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Caminho do banco SQLite com problemas e resultados.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Intervalo fixo entre consultas de status, em segundos.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Máximo de consultas antes de declarar o job expirado.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Formato do áudio enviado ao serviço.
    #[serde(default = "default_media_format")]
    pub media_format: String,

    /// Idioma falado no áudio.
    #[serde(default = "default_language_code")]
    pub language_code: String,

    /// Timeout de cada requisição ao serviço, em segundos.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Timeout do download da transcrição, em segundos.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_database_path() -> String {
    "speakscore.db".to_string()
}

// 5s x 60 tentativas = teto de 5 minutos.
fn default_poll_interval_secs() -> u64 {
    5
}

fn default_max_attempts() -> u32 {
    60
}

fn default_media_format() -> String {
    "mp3".to_string()
}

fn default_language_code() -> String {
    "en-US".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            database_path: default_database_path(),
            poll_interval_secs: default_poll_interval_secs(),
            max_attempts: default_max_attempts(),
            media_format: default_media_format(),
            language_code: default_language_code(),
            request_timeout_secs: default_request_timeout_secs(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

impl ScoreConfig {
    /// Carrega a configuração de `speakscore.toml` no diretório atual e
    /// aplica as variáveis de ambiente.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(Path::new(CONFIG_FILE))?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Lê `path`, usando valores padrão se o arquivo não existir.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str::<ScoreConfig>(&contents)?)
    }

    /// Valores não vazios retornados por `lookup` substituem os do arquivo.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(endpoint) = lookup("SPEAKSCORE_ENDPOINT").filter(|v| !v.is_empty()) {
            self.endpoint = endpoint;
        }
        if let Some(db) = lookup("SPEAKSCORE_DB").filter(|v| !v.is_empty()) {
            self.database_path = db;
        }
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            max_attempts: self.max_attempts,
        }
    }

    pub fn media_settings(&self) -> MediaSettings {
        MediaSettings {
            media_format: self.media_format.clone(),
            language_code: self.language_code.clone(),
        }
    }
}
