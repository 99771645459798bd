//! Interface de linha de comando do speakscore baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] (score, transcribe,
//! process, batch, add-problem, problems, results) e flags globais
//! (--poll-interval-secs, --max-attempts, --verbose, --json).

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// speakscore: avalia respostas faladas contra um texto de referência.
#[derive(Debug, Parser)]
#[command(name = "speakscore", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Intervalo entre consultas de status do job, em segundos.
    #[arg(long, global = true)]
    pub poll_interval_secs: Option<u64>,

    /// Número máximo de consultas antes de desistir do job.
    #[arg(long, global = true)]
    pub max_attempts: Option<u32>,

    /// Habilita saída detalhada (logs em nível debug).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Imprime resultados em JSON em vez de texto colorido.
    #[arg(long, global = true, default_value_t = false)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Calcula a nota de um texto transcrito contra a referência, sem rede.
    Score {
        /// Texto de referência (correto).
        reference: String,
        /// Texto transcrito a ser avaliado.
        transcribed: String,
    },

    /// Transcreve um áudio e imprime o texto obtido.
    Transcribe {
        /// Local do áudio (ex.: s3://bucket/problems/1/users/2/answer.mp3).
        media: String,
    },

    /// Processa um único objeto enviado: transcreve, avalia e salva.
    Process {
        /// Nome do bucket onde o áudio foi enviado.
        #[arg(long)]
        bucket: String,

        /// Chave do objeto no formato problems/<id>/users/<id>/<arquivo>.mp3.
        #[arg(long)]
        key: String,
    },

    /// Processa todos os registros de um evento de criação de objetos (JSON).
    Batch {
        /// Caminho para o arquivo JSON do evento.
        event: PathBuf,
    },

    /// Cadastra um texto de referência e imprime seu id.
    AddProblem {
        /// Texto correto do problema.
        text: String,
    },

    /// Lista os problemas mais recentes.
    Problems {
        /// Quantidade máxima de problemas listados.
        #[arg(long, default_value_t = 30)]
        limit: u32,
    },

    /// Lista os resultados salvos de um usuário.
    Results {
        /// Id do usuário.
        #[arg(long)]
        user: i64,
    },
}
