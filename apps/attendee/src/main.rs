use std::{process::ExitCode, sync::Arc};

use anyhow::Result;
use clap::{Parser, Subcommand};
use client_core::{
    HttpRegistrationAction, ModalContent, RegistrationFlow, SubmitOutcome, Toast, ToastSink,
};
use serde_json::{json, Map, Value};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Register for a webinar session")]
struct Args {
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    server_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Register {
        #[arg(long)]
        webinar_id: String,
        #[arg(long)]
        session_id: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: Option<String>,
    },
}

/// Toasts go to stderr so stdout stays machine-readable.
struct StderrToasts;

impl ToastSink for StderrToasts {
    fn push(&self, toast: Toast) {
        eprintln!("error: {}", toast.message);
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let action = Arc::new(HttpRegistrationAction::new(&args.server_url)?);
    let mut flow = RegistrationFlow::new(action, StderrToasts);

    let Command::Register {
        webinar_id,
        session_id,
        first_name,
        last_name,
        email,
        phone,
    } = args.command;
    let mut form = Map::new();
    form.insert("webinarId".into(), json!(webinar_id));
    form.insert("sessionId".into(), json!(session_id));
    form.insert("firstName".into(), json!(first_name));
    form.insert("lastName".into(), json!(last_name));
    form.insert("email".into(), json!(email));
    form.insert("phone".into(), json!(phone));

    match flow.submit(&Value::Object(form)).await {
        SubmitOutcome::Registered(_) => {
            if let Some(ModalContent::RegistrationConfirmed(receipt)) = flow.modal().content() {
                println!("{}", serde_json::to_string_pretty(receipt)?);
            }
            Ok(ExitCode::SUCCESS)
        }
        SubmitOutcome::Invalid(errors) => {
            for message in &errors.form_errors {
                eprintln!("invalid input: {message}");
            }
            for (field, issue) in &errors.field_errors {
                eprintln!("  {field}: {}", issue.message);
            }
            Ok(ExitCode::from(2))
        }
        SubmitOutcome::Failed => Ok(ExitCode::FAILURE),
    }
}
