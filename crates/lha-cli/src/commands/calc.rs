//! Terminal calculator: the two-step form against a running server.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use dialoguer::{Confirm, Input};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use std::time::Duration;

use lha_core::form::{FormFlow, LookupOutcome, LookupRequest, SubmitRejected};
use lha_core::ResponseEnvelope;

use crate::output;

#[derive(Args)]
pub struct CalcArgs {
    /// Base URL of the calculator server
    #[arg(long, default_value = "http://127.0.0.1:3030", env = "LHA_SERVER")]
    pub server: String,
}

/// Endpoint and token handed out by the server.
struct Session {
    ajax_url: String,
    nonce: String,
}

pub async fn execute(args: CalcArgs) -> Result<()> {
    let client = reqwest::Client::new();
    let server = args.server.trim_end_matches('/').to_string();
    let mut flow = FormFlow::new();

    println!("{}", "Enter Your Details".cyan().bold());
    loop {
        let name = prompt("Name")?;
        let email = prompt("Email")?;
        match flow.submit_details(&name, &email) {
            Ok(_) => break,
            Err(message) => output::print_message(&message),
        }
    }

    println!();
    println!("{}", "Calculate LHA Rate".cyan().bold());
    loop {
        let postcode = prompt("Enter postcode")?;
        let bedrooms = prompt("Bedrooms (1-4)")?;

        let request = match flow.begin_lookup(&postcode, &bedrooms) {
            Ok(request) => request,
            Err(SubmitRejected::Invalid) => {
                output::print_message(flow.message());
                continue;
            }
            Err(rejected) => anyhow::bail!("Form rejected the lookup: {:?}", rejected),
        };

        let spinner = create_spinner(flow.message().text());
        let outcome = post_lookup(&client, &server, &request).await;
        spinner.finish_and_clear();

        output::print_message(flow.finish_lookup(outcome));

        let again = Confirm::new()
            .with_prompt("Look up another rate?")
            .default(false)
            .interact()
            .context("Failed to read answer")?;
        if !again {
            break;
        }
    }

    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    Input::<String>::new()
        .with_prompt(label)
        .allow_empty(true)
        .interact_text()
        .with_context(|| format!("Failed to read {}", label.to_lowercase()))
}

/// Fetch a session, post the form and classify the result the way the
/// browser form does.
async fn post_lookup(client: &reqwest::Client, server: &str, request: &LookupRequest) -> LookupOutcome {
    let session = match fetch_session(client, server).await {
        Ok(session) => session,
        Err(e) => {
            tracing::debug!(error = %e, server = %server, "Session request failed");
            return LookupOutcome::Failed(format!("{:#}", e));
        }
    };

    let form = request.to_rate_request(&session.nonce);
    let response = match client.post(&session.ajax_url).form(&form).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::debug!(error = %e, "Lookup request failed");
            return LookupOutcome::Failed(e.to_string());
        }
    };
    if !response.status().is_success() {
        return LookupOutcome::HttpStatus(response.status().as_u16());
    }

    match response.json::<ResponseEnvelope>().await {
        Ok(envelope) => LookupOutcome::Envelope(envelope),
        Err(e) => LookupOutcome::Failed(e.to_string()),
    }
}

async fn fetch_session(client: &reqwest::Client, server: &str) -> Result<Session> {
    let body: Value = client
        .get(format!("{}/api/session", server))
        .send()
        .await
        .context("Server unreachable")?
        .error_for_status()
        .context("Session request failed")?
        .json()
        .await
        .context("Invalid session response")?;

    let field = |name: &str| {
        body[name]
            .as_str()
            .map(str::to_string)
            .with_context(|| format!("Session response is missing {}", name))
    };
    let ajax_url = field("ajax_url")?;

    Ok(Session {
        // Same-origin servers hand out a path.
        ajax_url: if ajax_url.starts_with('/') {
            format!("{}{}", server, ajax_url)
        } else {
            ajax_url
        },
        nonce: field("nonce")?,
    })
}

/// Create a spinner for the in-flight lookup.
fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
        .template("{spinner:.cyan} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
