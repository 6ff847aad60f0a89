//! CLI probe for `nbreview_core`.
//!
//! # Responsibility
//! - Print core version to verify linkage.
//! - Print the review stored in a downloaded notebook file.
//! - With a question catalog, print each answer with its option label.
//!
//! Usage: `nbreview_cli [NOTEBOOK.ipynb [QUESTIONS.json]]`

use nbreview_core::{core_version, decode, parse_catalog, Notebook, ReviewPayload};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("nbreview_core version={}", core_version());
    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        return ExitCode::SUCCESS;
    };
    let catalog = args.next();

    match inspect(path.as_str(), catalog.as_deref()) {
        Ok(report) => {
            println!("{report}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn inspect(path: &str, catalog: Option<&str>) -> Result<String, String> {
    let raw =
        std::fs::read_to_string(path).map_err(|err| format!("cannot read `{path}`: {err}"))?;
    let notebook: Notebook = serde_json::from_str(raw.as_str())
        .map_err(|err| format!("`{path}` is not a notebook: {err}"))?;

    let Some(payload) = decode(notebook.first_cell_notes()) else {
        return Ok(format!("no review note in `{path}`"));
    };
    match catalog {
        Some(catalog_path) => label_answers(&payload, catalog_path),
        None => serde_json::to_string_pretty(&payload)
            .map_err(|err| format!("cannot encode review: {err}")),
    }
}

fn label_answers(payload: &ReviewPayload, catalog_path: &str) -> Result<String, String> {
    let raw = std::fs::read_to_string(catalog_path)
        .map_err(|err| format!("cannot read `{catalog_path}`: {err}"))?;
    let questions = parse_catalog(raw.as_str()).map_err(|err| err.to_string())?;

    let mut lines = vec![format!("reviewer: {}", payload.reviewer_name)];
    for question in &questions {
        let line = match payload.answers.get(question.id.as_str()) {
            Some(value) => {
                let label = question.option_label(*value).unwrap_or("unknown option");
                format!("{}: {value} ({label})", question.id)
            }
            None => format!("{}: unanswered", question.id),
        };
        lines.push(line);
    }
    Ok(lines.join("\n"))
}
