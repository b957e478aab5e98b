//! Line-based terminal rendering of the form.
//!
//! Stands in for the page: prints the fields and controls, turns typed
//! lines into change/blur events, and shows feedback overlays as blocks
//! of text that close on Enter.

use std::io::Write;
use std::time::Instant;

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use muster_core::fields::Field;
use muster_core::format::format_date;
use muster_core::rank::{format_rank, RANK_CATALOG};
use muster_core::record::MilitaryRecord;
use muster_form::feedback::{DismissTrigger, FeedbackState};
use muster_form::geolocation::{locate_into_form, Geolocator};
use muster_form::pipeline::{SubmissionPipeline, SubmitOutcome};
use muster_form::state::AppState;

type Input = Lines<BufReader<Stdin>>;

/// Menu keys for the editable fields, in form order.
const FIELD_KEYS: [(&str, Field); 6] = [
    ("1", Field::Rank),
    ("2", Field::Name),
    ("3", Field::Battalion),
    ("4", Field::Address),
    ("5", Field::Latitude),
    ("6", Field::Longitude),
];

/// Drive the form until the user quits or stdin closes.
pub async fn run(
    state: &AppState,
    pipeline: &SubmissionPipeline,
    geolocator: &Geolocator,
) -> anyhow::Result<()> {
    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut last_record: Option<MilitaryRecord> = None;

    loop {
        render_form(state);

        let Some(choice) = prompt(&mut input, "Opção: ").await? else {
            break;
        };
        let choice = choice.trim().to_lowercase();

        if let Some(&(_, field)) = FIELD_KEYS.iter().find(|(key, _)| *key == choice) {
            if field == Field::Rank {
                edit_rank(state, &mut input).await?;
            } else {
                edit_text(state, &mut input, field).await?;
            }
            continue;
        }

        match choice.as_str() {
            "l" if state.locate_control().is_visible() => {
                println!("{}", state.locate_control().label(Instant::now()));
                // Outcome is rendered through the form and feedback state.
                let _ = locate_into_form(state, geolocator).await;
            }
            "e" => {
                if let Ok(SubmitOutcome::Submitted(record)) = pipeline.submit(state).await {
                    last_record = Some(record);
                }
            }
            "c" => state.form().reset(),
            "q" => break,
            _ => println!("Opção inválida."),
        }

        if !show_feedback(state, &mut input, last_record.as_ref()).await? {
            break;
        }
    }

    tracing::info!("Form closed");
    Ok(())
}

fn render_form(state: &AppState) {
    state.locate_control().refresh(Instant::now());

    let fields = state.form().fields().clone();
    let submit_enabled = state.submit_enabled();

    println!();
    println!("=== {} ===", muster_core::config::APP_NAME);
    for (key, field) in FIELD_KEYS {
        let value = fields.get(field);
        let shown = if field == Field::Rank && !value.is_empty() {
            format_rank(value)
        } else {
            value
        };
        println!(" {key}) {:<16} {shown}", field.label());
    }

    let locate = state.locate_control();
    if locate.is_visible() {
        let marker = if locate.is_enabled() { "" } else { " (aguarde)" };
        println!(" l) {}{marker}", locate.label(Instant::now()));
    }
    drop(locate);

    let submit_marker = if submit_enabled { "" } else { " (preencha todos os campos)" };
    println!(" e) Cadastrar Militar{submit_marker}");
    println!(" c) Limpar formulário");
    println!(" q) Sair");
}

async fn edit_rank(state: &AppState, input: &mut Input) -> anyhow::Result<()> {
    for (index, rank) in RANK_CATALOG.iter().enumerate() {
        println!("   {:>2}) {}", index + 1, rank.label);
    }

    let Some(line) = prompt(input, "Posto/Graduação (número ou sigla): ").await? else {
        return Ok(());
    };
    let line = line.trim();

    let code = line
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| RANK_CATALOG.get(i))
        .map_or_else(|| line.to_uppercase(), |rank| rank.code.to_string());

    let mut form = state.form();
    if let Err(e) = form.input(Field::Rank, &code) {
        println!("{e}");
    }
    form.blur(Field::Rank);
    Ok(())
}

async fn edit_text(state: &AppState, input: &mut Input, field: Field) -> anyhow::Result<()> {
    let max = state.form().max_length(field);
    let label = match max {
        Some(max) => format!("{} (máx. {max} caracteres): ", field.label()),
        None => format!("{}: ", field.label()),
    };

    let Some(line) = prompt(input, &label).await? else {
        return Ok(());
    };

    let mut form = state.form();
    // Free-text fields never refuse input; truncation is silent.
    let _ = form.input(field, &line);
    form.blur(field);
    Ok(())
}

/// Show the open overlay, if any, and wait for the user to close it.
///
/// Returns `false` once stdin is closed.
async fn show_feedback(
    state: &AppState,
    input: &mut Input,
    last_record: Option<&MilitaryRecord>,
) -> anyhow::Result<bool> {
    let current = state.feedback().state().clone();

    match current {
        FeedbackState::Idle | FeedbackState::Loading => return Ok(true),
        FeedbackState::Success => {
            println!();
            println!("*** Militar cadastrado com sucesso! ***");
            if let Some(record) = last_record {
                println!(
                    "    {} {} - {} ({})",
                    record.rank().label,
                    record.name(),
                    record.battalion(),
                    format_date(&record.timestamp()),
                );
            }
        }
        FeedbackState::Error(message) => {
            println!();
            println!("*** Erro: {message} ***");
        }
    }

    let closed = prompt(input, "Pressione Enter para fechar.").await?;
    let trigger = if closed.is_some() {
        DismissTrigger::CloseButton
    } else {
        DismissTrigger::EscapeKey
    };
    state.feedback().dismiss(trigger);
    Ok(closed.is_some())
}

async fn prompt(input: &mut Input, text: &str) -> anyhow::Result<Option<String>> {
    print!("{text}");
    std::io::stdout().flush()?;
    Ok(input.next_line().await?)
}
