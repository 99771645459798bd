//! Tipos de erro do ciclo de vida de um job de transcrição.
//!
//! Cada variante de [`TranscriptionError`] corresponde a um desfecho terminal
//! distinto de `JobRunner`. Nenhuma delas é retentada internamente além da
//! cadência fixa de polling.

use thiserror::Error;

/// Erros que encerram a transcrição de um item.
#[derive(Debug, Error)]
pub enum TranscriptionError {
    /// O serviço recusou iniciar o job (local inválido, cota, autenticação).
    #[error("failed to start transcription job: {0}")]
    Submission(String),

    /// Falha de transporte ou resposta de erro ao consultar o status.
    #[error("failed to get transcription job: {0}")]
    Poll(String),

    /// O serviço reportou `FAILED`. `reason` fica vazio quando não informado.
    #[error("transcription job failed: {reason}")]
    JobFailed { reason: String },

    /// O orçamento de tentativas acabou sem status terminal.
    /// O job continua existindo no serviço.
    #[error("transcription job timed out after {attempts} polls")]
    TimedOut { attempts: u32 },

    /// `COMPLETED` sem local de transcrição: resposta malformada.
    #[error("transcript location is missing for job {job_id}")]
    TranscriptMissing { job_id: String },

    /// Falha de transporte, status não-2xx ou payload malformado.
    #[error("failed to fetch transcript: {0}")]
    Fetch(String),

    /// O payload não contém nenhuma transcrição.
    #[error("no transcripts found in result")]
    EmptyResult,

    /// Cancelamento externo observado durante o polling.
    #[error("transcription cancelled")]
    Cancelled,

    /// Falha ao remover o job. Apenas registrada em log pelo runner.
    #[error("failed to delete transcription job: {0}")]
    Cleanup(String),
}
