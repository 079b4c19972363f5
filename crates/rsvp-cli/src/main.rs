//! `rsvp`, the command-line client for the RSVP server.
//!
//! A standalone HTTP client. It posts the same forms a browser would and
//! reports redirects instead of following them, so a `302 Found` is a
//! success. Non-success statuses print the server's text and exit 1.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::borrow::Cow;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use reqwest::Method;
use reqwest::header::{COOKIE, LOCATION, SET_COOKIE};
use reqwest::redirect::Policy;
use serde_json::Value;

// ── ANSI color helpers ───────────────────────────────────────────────

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";

// ── CLI structure ────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "rsvp",
    version,
    about = "RSVP CLI: respond to the event, edit it, and post updates",
    long_about = None,
    after_help = format!(
        "{DIM}Environment variables:{RESET}\n  \
         RSVP_ADDR             Server address (default: http://127.0.0.1:4321)\n  \
         RSVP_GUEST_PASSWORD   Guest password for private events\n  \
         RSVP_ADMIN_PASSWORD   Admin password for `rsvp admin`\n\n\
         {DIM}Examples:{RESET}\n  \
         rsvp status\n  \
         rsvp respond --name 'Ada Lovelace' --email ada@example.com --response yes\n  \
         rsvp admin event --name 'Garden Party' --date 2025-06-14 --accepting-rsvps --public\n  \
         rsvp admin post 'Parking is on Elm Street'"
    ),
)]
struct Cli {
    /// RSVP server address.
    #[arg(long, env = "RSVP_ADDR", default_value = "http://127.0.0.1:4321")]
    addr: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show server health and the event.
    Status {
        /// Guest password, needed to see a private event.
        #[arg(long, env = "RSVP_GUEST_PASSWORD")]
        password: Option<String>,
    },
    /// RSVP to the event.
    Respond {
        /// Your name.
        #[arg(long)]
        name: String,
        /// Your email; one RSVP per address.
        #[arg(long)]
        email: String,
        /// `yes`, `no` or `maybe`.
        #[arg(long)]
        response: String,
        #[arg(long)]
        phone: Option<String>,
        /// A note for the host.
        #[arg(long)]
        message: Option<String>,
        /// Guest password, needed for a private event.
        #[arg(long, env = "RSVP_GUEST_PASSWORD")]
        password: Option<String>,
    },
    /// Manage the event.
    Admin {
        /// Admin password.
        #[arg(long, env = "RSVP_ADMIN_PASSWORD", hide_env_values = true)]
        admin_password: String,
        #[command(subcommand)]
        action: AdminCommands,
    },
}

#[derive(Subcommand)]
enum AdminCommands {
    /// Replace the event details. Omitted fields are cleared, except the
    /// date, which is kept.
    Event {
        #[arg(long)]
        name: String,
        /// `YYYY-MM-DD`.
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        time: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Open the event for RSVPs.
        #[arg(long)]
        accepting_rsvps: bool,
        /// Let guests in without the guest password.
        #[arg(long)]
        public: bool,
    },
    /// Post an update to the event page.
    Post {
        /// Update text (at least 5 characters).
        content: String,
    },
    /// List RSVPs with response counts.
    Rsvps,
    /// Print a `mailto:` link inviting guests.
    Invite {
        /// Only guests who answered `yes`, `no` or `maybe`.
        #[arg(long)]
        response: Option<String>,
    },
}

// ── Output helpers ───────────────────────────────────────────────────

fn success(msg: &str) {
    println!("  {GREEN}{BOLD}✓{RESET} {msg}");
}

fn warning(msg: &str) {
    println!("  {YELLOW}{BOLD}!{RESET} {msg}");
}

fn field(label: &str, value: &str) {
    println!("  {DIM}{label:<12}{RESET} {value}");
}

fn text<'v>(value: &'v Value, key: &str) -> &'v str {
    value[key].as_str().unwrap_or("—")
}

fn yes_no(value: &Value) -> &'static str {
    if value.as_bool().unwrap_or(false) { "yes" } else { "no" }
}

// ── HTTP client ──────────────────────────────────────────────────────

struct Client {
    http: reqwest::Client,
    addr: String,
    /// `name=value` of the session cookie, once logged in.
    session: Option<String>,
}

impl Client {
    fn new(addr: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .redirect(Policy::none())
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            addr: addr.trim_end_matches('/').to_owned(),
            session: None,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.addr)
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let req = self.http.request(method, self.url(path));
        match &self.session {
            Some(cookie) => req.header(COOKIE, cookie),
            None => req,
        }
    }

    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value> {
        let resp = self
            .request(Method::GET, path)
            .query(query)
            .send()
            .await
            .context("request failed")?;
        let resp = check(resp).await?;
        resp.json().await.context("failed to parse response JSON")
    }

    /// Post a form and return the redirect target, if any.
    async fn post_form(&self, path: &str, fields: &[(&str, &str)]) -> Result<Option<String>> {
        let resp = self
            .request(Method::POST, path)
            .form(fields)
            .send()
            .await
            .context("request failed")?;
        let resp = check(resp).await?;
        Ok(resp
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned))
    }

    /// Log in and keep the session cookie for later requests.
    async fn login(&mut self, path: &str, password: &str) -> Result<()> {
        let resp = self
            .http
            .post(self.url(path))
            .form(&[("password", password)])
            .send()
            .await
            .context("request failed")?;
        let resp = check(resp).await?;
        let cookie = resp
            .headers()
            .get(SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::to_owned)
            .context("server did not set a session cookie")?;
        self.session = Some(cookie);
        Ok(())
    }
}

/// Pass through 2xx and 3xx responses; turn anything else into an error
/// carrying the server's text.
async fn check(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() || status.is_redirection() {
        return Ok(resp);
    }
    let body = resp.text().await.context("failed to read response body")?;
    bail!("server returned {status}: {body}")
}

// ── Command dispatch ─────────────────────────────────────────────────

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli.addr, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!();
            eprintln!("  {RED}{BOLD}✗ Error:{RESET} {e:#}");
            eprintln!();
            ExitCode::FAILURE
        }
    }
}

async fn run(addr: &str, cmd: Commands) -> Result<()> {
    let mut client = Client::new(addr)?;
    match cmd {
        Commands::Status { password } => cmd_status(&mut client, password.as_deref()).await,
        Commands::Respond {
            name,
            email,
            response,
            phone,
            message,
            password,
        } => {
            if let Some(password) = password {
                client.login("/api/login", &password).await?;
            }
            let mut fields = vec![
                ("name", name.as_str()),
                ("email", email.as_str()),
                ("response", response.as_str()),
            ];
            if let Some(phone) = &phone {
                fields.push(("phone", phone.as_str()));
            }
            if let Some(message) = &message {
                fields.push(("message", message.as_str()));
            }
            client.post_form("/api/rsvp", &fields).await?;
            println!();
            success(&format!("RSVP recorded for {email} ({response})"));
            println!();
            Ok(())
        }
        Commands::Admin {
            admin_password,
            action,
        } => {
            client.login("/api/admin/login", &admin_password).await?;
            cmd_admin(&client, action).await
        }
    }
}

// ── Status ───────────────────────────────────────────────────────────

async fn cmd_status(client: &mut Client, password: Option<&str>) -> Result<()> {
    let health = client.get("/health", &[]).await?;
    println!();
    println!("  {CYAN}{BOLD}RSVP server{RESET} {DIM}{}{RESET}", client.addr);
    field("Status", text(&health, "status"));
    field("Database", text(&health, "database"));

    if health["database"] != "configured" {
        println!();
        warning("No database configured; event data is unavailable.");
        println!();
        return Ok(());
    }

    if let Some(password) = password {
        client.login("/api/login", password).await?;
    }

    println!();
    match client.get("/api/event", &[]).await {
        Ok(overview) => print_overview(&overview),
        Err(e) => warning(&format!("Event unavailable: {e:#}")),
    }
    println!();
    Ok(())
}

fn print_overview(overview: &Value) {
    let event = &overview["event"];
    println!("  {BOLD}{}{RESET}", text(event, "name"));
    field("Date", text(event, "date"));
    field("Time", text(event, "time"));
    field("Location", text(event, "location"));
    field("Details", text(event, "description"));
    field("Open", yes_no(&event["accepting_rsvps"]));
    field("Public", yes_no(&event["is_public"]));

    let updates = overview["updates"].as_array().map_or(&[][..], Vec::as_slice);
    if !updates.is_empty() {
        println!();
        println!("  {BOLD}Updates{RESET}");
        for update in updates {
            println!(
                "  {DIM}{}{RESET}  {}",
                text(update, "created_at"),
                text(update, "content")
            );
        }
    }
}

// ── Admin commands ───────────────────────────────────────────────────

async fn cmd_admin(client: &Client, action: AdminCommands) -> Result<()> {
    match action {
        AdminCommands::Event {
            name,
            date,
            time,
            location,
            description,
            accepting_rsvps,
            public,
        } => {
            let mut fields = vec![("action", "update_event"), ("name", name.as_str())];
            for (key, value) in [
                ("date", &date),
                ("time", &time),
                ("location", &location),
                ("description", &description),
            ] {
                if let Some(value) = value {
                    fields.push((key, value.as_str()));
                }
            }
            // Checkboxes: present means checked.
            if accepting_rsvps {
                fields.push(("accepting_rsvps", "on"));
            }
            if public {
                fields.push(("is_public", "on"));
            }
            let location = client.post_form("/api/admin-actions", &fields).await?;
            report_admin(location.as_deref(), "Event updated");
        }
        AdminCommands::Post { content } => {
            let fields = [("action", "post_update"), ("content", content.as_str())];
            let location = client.post_form("/api/admin-actions", &fields).await?;
            report_admin(location.as_deref(), "Update posted");
        }
        AdminCommands::Rsvps => {
            let list = client.get("/api/admin/rsvps", &[]).await?;
            print_guest_list(&list);
        }
        AdminCommands::Invite { response } => {
            let query: Vec<(&str, &str)> =
                response.iter().map(|r| ("response", r.as_str())).collect();
            let invite = client.get("/api/admin/invite", &query).await?;
            println!("{}", text(&invite, "mailto"));
        }
    }
    Ok(())
}

/// Print the confirmation carried in the admin redirect, if it has one.
fn report_admin(location: Option<&str>, fallback: &str) {
    let message = admin_message(location);
    println!();
    success(message.as_deref().unwrap_or(fallback));
    println!();
}

/// Decode the `success` query value of an admin redirect.
fn admin_message(location: Option<&str>) -> Option<String> {
    let (_, query) = location?.split_once('?')?;
    let raw = query
        .split('&')
        .find_map(|pair| pair.strip_prefix("success="))?;
    Some(
        urlencoding::decode(raw)
            .map(Cow::into_owned)
            .unwrap_or_else(|_| raw.to_owned()),
    )
}

fn print_guest_list(list: &Value) {
    let summary = &list["summary"];
    println!();
    println!(
        "  {BOLD}{} RSVPs{RESET}  {GREEN}{} yes{RESET} · {RED}{} no{RESET} · {YELLOW}{} maybe{RESET}",
        summary["total"], summary["yes"], summary["no"], summary["maybe"]
    );
    println!();

    let rsvps = list["rsvps"].as_array().map_or(&[][..], Vec::as_slice);
    for rsvp in rsvps {
        println!(
            "  {:<6} {:<24} {}",
            text(rsvp, "response"),
            text(rsvp, "guest_name"),
            text(rsvp, "guest_email")
        );
        if let Some(phone) = rsvp["guest_phone"].as_str() {
            println!("         {DIM}phone:{RESET} {phone}");
        }
        if let Some(message) = rsvp["message"].as_str() {
            println!("         {DIM}\"{message}\"{RESET}");
        }
    }
    if !rsvps.is_empty() {
        println!();
    }
}
