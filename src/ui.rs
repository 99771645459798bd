//! Interface de terminal do speakscore: spinners e saída colorida.
//!
//! Usa as crates `indicatif` para spinners de progresso e `console` para
//! estilização com cores. O [`JobProgress`] acompanha visualmente
//! a espera por um job de transcrição no terminal.

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use speakscore::pipeline::{BatchSummary, ItemOutcome};
use speakscore::scoring::ScoreResult;
use speakscore::state_machine::{JobOutcome, JobReport};

/// Indicador visual de progresso enquanto um item é transcrito.
///
/// Exibe um spinner animado durante o polling e mensagens coloridas para
/// sucesso (verde) e falha (vermelho).
pub struct JobProgress {
    // Barra de progresso/spinner do indicatif.
    pb: ProgressBar,
    green: Style,
    red: Style,
}

impl JobProgress {
    /// Inicia o spinner com a descrição do item e retorna a instância de progresso.
    pub fn start(description: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg} ({elapsed})")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        pb.set_style(style);
        pb.set_message(description.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));

        Self {
            pb,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
        }
    }

    /// Finaliza o spinner com uma mensagem de sucesso.
    pub fn success(&self, message: &str) {
        self.pb.finish_and_clear();
        println!("  {} {message}", self.green.apply_to("✓"));
    }

    /// Finaliza o spinner com uma mensagem de falha.
    pub fn failure(&self, message: &str) {
        self.pb.finish_and_clear();
        println!("  {} {message}", self.red.apply_to("✗"));
    }
}

/// Cor da nota: verde a partir de 80, amarelo a partir de 50, vermelho abaixo.
fn score_style(score: f64) -> Style {
    if score >= 80.0 {
        Style::new().green().bold()
    } else if score >= 50.0 {
        Style::new().yellow().bold()
    } else {
        Style::new().red().bold()
    }
}

pub fn print_score(result: &ScoreResult) {
    let dim = Style::new().dim();
    println!("{} {}", dim.apply_to("reference:  "), result.reference_text);
    println!("{} {}", dim.apply_to("transcribed:"), result.transcribed_text);
    println!(
        "{} {} (distance {} over {} chars)",
        dim.apply_to("score:      "),
        score_style(result.score).apply_to(format!("{:.2}", result.score)),
        result.distance,
        result.max_len
    );
}

/// Imprime o registro de auditoria formatado em JSON com estilo colorido.
pub fn print_report(report: &JobReport) {
    let style = match report.outcome {
        JobOutcome::Transcribed => Style::new().green(),
        _ => Style::new().red(),
    };
    println!();
    println!("{}", style.apply_to("─── Job Report ───"));
    println!("{}", serde_json::to_string_pretty(report).unwrap_or_default());
}

pub fn print_summary(summary: &BatchSummary) {
    let green = Style::new().green().bold();
    let red = Style::new().red().bold();

    for item in &summary.items {
        match item {
            ItemOutcome::Scored(answer) => println!(
                "  {} {} [{}] {}",
                green.apply_to("✓"),
                answer.source_location,
                answer.key,
                score_style(answer.result.score).apply_to(format!("{:.2}", answer.result.score))
            ),
            ItemOutcome::Skipped {
                source_location,
                error,
                job_id,
                ..
            } => match job_id {
                Some(job_id) => println!("  {} {source_location} ({job_id}): {error}", red.apply_to("✗")),
                None => println!("  {} {source_location}: {error}", red.apply_to("✗")),
            },
        }
    }
    println!();
    println!(
        "{} scored, {} skipped",
        green.apply_to(summary.scored()),
        red.apply_to(summary.skipped())
    );
}

