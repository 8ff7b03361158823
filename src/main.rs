//! Taskify - project and task dashboard
//!
//! A CLI that loads projects and tasks from built-in mock data or a
//! Taskify REST backend and renders kanban boards, task lists, calendars,
//! analytics reports and CSV exports.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (connection, config, invalid input, etc.)
//!   2 - Requested project or task not found

mod analysis;
mod api;
mod cli;
mod config;
mod kanban;
mod models;
mod report;
mod source;
mod state;

use anyhow::{Context, Result};
use api::{ApiClient, ClientConfig, Invitation, NewProject, Onboarding, SettingsUpdate};
use chrono::{DateTime, Utc};
use cli::{Args, Command, OutputFormat};
use config::{Config, SourceKind};
use kanban::{KanbanBoard, Slot};
use models::{flexible_date, Project, Task};
use source::{with_spinner, DataSource, MockStore};
use state::{FileStateStore, MemoryStateStore, Session, StateStore};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

const EXIT_NOT_FOUND: i32 = 2;

type AppSession = Session<Box<dyn StateStore>>;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle init-config early (no logging needed)
    if matches!(args.command, Command::InitConfig) {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("Taskify v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Command failed: {:#}", e);
            eprintln!("\n❌ Error: {}", e);
            if e
                .downcast_ref::<api::ApiError>()
                .is_some_and(api::ApiError::is_auth_failure)
            {
                eprintln!("   Run `taskify login` to sign in again.");
            }
            std::process::exit(1);
        }
    }
}

/// Handle init-config: generate a default .taskify.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(config::CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!("⚠️  .taskify.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .taskify.toml")?;

    println!("✅ Created .taskify.toml with default settings.");
    println!("   Edit it to choose the data source, API URL and analytics windows.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Everything a command needs.
struct AppContext {
    config: Config,
    source: DataSource,
    session: AppSession,
    now: DateTime<Utc>,
    show_progress: bool,
}

/// Dispatch the parsed command. Returns the exit code.
async fn run(args: Args) -> Result<i32> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let now = Utc::now();
    let session = open_session(&args, &config)?;
    let source = build_source(&config, session.token(), now)?;
    info!("Data source: {}", source.describe());

    let mut ctx = AppContext {
        config,
        source,
        session,
        now,
        show_progress: !args.quiet,
    };

    match args.command {
        Command::Projects => handle_projects(&ctx).await,
        Command::Analytics {
            project,
            format,
            output,
        } => handle_analytics(&ctx, &project, format, output).await,
        Command::Export { project, output } => handle_export(&ctx, &project, output).await,
        Command::Board { project } => handle_board(&ctx, &project).await,
        Command::Move {
            project,
            from,
            from_index,
            to,
            to_index,
        } => {
            let from = Slot::new(from, from_index);
            let to = Slot::new(to, to_index);
            handle_move(&mut ctx, &project, BoardChange::Move { from, to }).await
        }
        Command::Toggle { project, task } => {
            handle_move(&mut ctx, &project, BoardChange::Toggle(task)).await
        }
        Command::List {
            project,
            status,
            priority,
        } => {
            let Some((_, tasks)) = fetch_project(&ctx, &project).await? else {
                return Ok(not_found("Project", &project));
            };
            let filtered: Vec<&Task> = tasks
                .iter()
                .filter(|t| status.map_or(true, |s| t.status == s))
                .filter(|t| priority.map_or(true, |p| t.priority == p))
                .collect();
            print!("{}", report::views::render_list(&filtered, ctx.now));
            Ok(0)
        }
        Command::Calendar { project } => {
            let Some((_, tasks)) = fetch_project(&ctx, &project).await? else {
                return Ok(not_found("Project", &project));
            };
            print!("{}", report::views::render_calendar(&tasks));
            Ok(0)
        }
        Command::Task { id } => {
            let task =
                with_spinner(ctx.show_progress, "Loading task...", ctx.source.task(&id)).await?;
            match task {
                Some(task) => {
                    print!("{}", report::views::render_task(&task));
                    Ok(0)
                }
                None => Ok(not_found("Task", &id)),
            }
        }
        Command::Login { email, password } => {
            let client = require_api(&ctx.source)?;
            let auth = client.login(&email, &password).await?;
            let name = auth.user.name.clone();
            ctx.session.sign_in(auth.token, auth.user)?;
            println!("✅ Signed in as {}", name);
            Ok(0)
        }
        Command::VerifyOtp { email, otp } => {
            let client = require_api(&ctx.source)?;
            let auth = client.verify_otp(&email, &otp).await?;
            ctx.session.sign_in(auth.token, auth.user)?;
            println!("✅ Email verified. You are signed in.");
            Ok(0)
        }
        Command::ResendOtp { email } => {
            let ack = require_api(&ctx.source)?.resend_otp(&email).await?;
            println!("📧 {}", ack_message(&ack.message, "A new code is on its way."));
            Ok(0)
        }
        Command::ForgotPassword { email } => {
            let ack = require_api(&ctx.source)?.forgot_password(&email).await?;
            println!("📧 {}", ack_message(&ack.message, "Check your inbox for a reset code."));
            Ok(0)
        }
        Command::ResetPassword {
            email,
            otp,
            new_password,
        } => {
            let ack = require_api(&ctx.source)?
                .reset_password(&email, &otp, &new_password)
                .await?;
            println!("✅ {}", ack_message(&ack.message, "Password updated. Sign in again."));
            Ok(0)
        }
        Command::Logout => handle_logout(&mut ctx).await,
        Command::Onboard {
            role,
            team_size,
            use_case,
        } => {
            let answers = Onboarding {
                role,
                team_size,
                use_case,
            };
            let user = require_api(&ctx.source)?.complete_onboarding(&answers).await?;
            ctx.session.update_user(user)?;
            println!("✅ Onboarding complete.");
            Ok(0)
        }
        Command::Settings { name, email } => {
            let update = SettingsUpdate { name, email };
            let user = require_api(&ctx.source)?.update_settings(&update).await?;
            println!("✅ Settings saved for {} <{}>", user.name, user.email);
            ctx.session.update_user(user)?;
            Ok(0)
        }
        Command::CreateProject {
            name,
            description,
            category,
            due,
            icon,
            color,
        } => {
            let new_project = NewProject {
                name,
                description,
                category,
                due_date: due.as_deref().and_then(flexible_date::parse),
                icon,
                color,
            };
            let project = require_api(&ctx.source)?.create_project(&new_project).await?;
            println!("✅ Created project {} [{}]", project.name, project.id);
            Ok(0)
        }
        Command::Invite {
            project,
            email,
            role,
        } => {
            let invite = Invitation { email, role };
            let ack = require_api(&ctx.source)?
                .invite_member(&project, &invite)
                .await?;
            println!("📧 {}", ack_message(&ack.message, "Invitation sent."));
            Ok(0)
        }
        Command::Prefs {
            sidebar_collapsed,
            theme,
            nav,
        } => {
            let prefs = if sidebar_collapsed.is_none() && theme.is_none() && nav.is_none() {
                ctx.session.preferences()
            } else {
                ctx.session.update_preferences(|p| {
                    if let Some(collapsed) = sidebar_collapsed {
                        p.sidebar_collapsed = collapsed;
                    }
                    if let Some(theme) = theme {
                        p.theme = theme;
                    }
                    if let Some(ref items) = nav {
                        p.nav_items = state::reorder_nav_items(items);
                    }
                })?
            };
            if let Some(user) = ctx.session.user() {
                println!("Preferences for {}", user.name);
            }
            print!("{}", report::views::render_preferences(&prefs));
            Ok(0)
        }
        Command::InitConfig => handle_init_config().map(|_| 0),
    }
}

async fn handle_projects(ctx: &AppContext) -> Result<i32> {
    let projects = with_spinner(
        ctx.show_progress,
        "Loading projects...",
        ctx.source.list_projects(),
    )
    .await?;

    print!("{}", report::views::render_projects(&projects));
    Ok(0)
}

async fn handle_analytics(
    ctx: &AppContext,
    project_id: &str,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> Result<i32> {
    let (project, tasks) = with_spinner(
        ctx.show_progress,
        "Loading project...",
        ctx.source.project_with_tasks(project_id),
    )
    .await?;

    let windows = analysis::AnalyticsWindows::from(&ctx.config.analytics);
    let outcome =
        analysis::analyze_project(project_id, project.as_ref(), &tasks, ctx.now, &windows);
    let analytics = match outcome {
        analysis::AnalyticsOutcome::NotFound { project_id } => {
            return Ok(not_found("Project", &project_id));
        }
        analysis::AnalyticsOutcome::NoTasks { project } => {
            println!(
                "{} {} has no tasks yet. Add some to see analytics.",
                project.icon, project.name
            );
            return Ok(0);
        }
        analysis::AnalyticsOutcome::Ready(analytics) => analytics,
    };

    let rendered = match format {
        OutputFormat::Json => report::generate_json_report(&analytics)?,
        OutputFormat::Markdown => report::generate_markdown_report(&analytics),
    };

    match output {
        Some(path) => {
            std::fs::write(&path, &rendered)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            println!("{}", report::generate_terminal_summary(&analytics));
            println!("\n✅ Report saved to: {}", path.display());
        }
        None => print!("{}", rendered),
    }

    Ok(0)
}

async fn handle_export(ctx: &AppContext, project_id: &str, output: Option<PathBuf>) -> Result<i32> {
    let Some((project, tasks)) = fetch_project(ctx, project_id).await? else {
        return Ok(not_found("Project", project_id));
    };

    let path = output.unwrap_or_else(|| {
        ctx.config
            .output_path(&report::csv::export_file_name(&project.name))
    });
    report::csv::write_csv(&tasks, &path)?;

    println!("✅ Exported {} tasks to {}", tasks.len(), path.display());
    Ok(0)
}

async fn handle_board(ctx: &AppContext, project_id: &str) -> Result<i32> {
    let Some((project, tasks)) = fetch_project(ctx, project_id).await? else {
        return Ok(not_found("Project", project_id));
    };

    let board = KanbanBoard::from_tasks(tasks);
    println!("{} {} ({} tasks)\n", project.icon, project.name, board.len());
    if board.is_empty() {
        println!("No tasks yet.");
        return Ok(0);
    }
    print!("{}", report::views::render_board(&board));
    Ok(0)
}

/// A change requested on the board.
enum BoardChange {
    Move { from: Slot, to: Slot },
    Toggle(String),
}

async fn handle_move(ctx: &mut AppContext, project_id: &str, change: BoardChange) -> Result<i32> {
    let Some((project, tasks)) = fetch_project(ctx, project_id).await? else {
        return Ok(not_found("Project", project_id));
    };

    let mut board = KanbanBoard::from_tasks(tasks);
    let moved = match change {
        BoardChange::Move { from, to } => board.move_card(from, to)?,
        BoardChange::Toggle(task_id) => board.toggle_completed(&task_id)?,
    };

    if moved.status_changed() {
        let updated = ctx
            .source
            .update_task_status(&moved.task_id, moved.to, ctx.now)
            .await?;
        if updated.is_none() {
            warn!("Task {} disappeared before its status could be saved", moved.task_id);
        }
    }

    println!("{} {}\n", project.icon, project.name);
    print!("{}", report::views::render_board(&board));

    if moved.status_changed() {
        println!("✅ Task {} moved from {} to {}", moved.task_id, moved.from, moved.to);
    }
    if !ctx.source.persists_writes() {
        println!("ℹ️  Mock data: changes last only for this run.");
    }
    Ok(0)
}

async fn handle_logout(ctx: &mut AppContext) -> Result<i32> {
    if let DataSource::Remote(client) = &ctx.source {
        if ctx.session.is_signed_in() {
            if let Err(e) = client.logout().await {
                warn!("Server-side logout failed: {}", e);
            }
        }
    }

    let name = ctx.session.user().map(|u| u.name.clone());
    ctx.session.sign_out()?;
    match name {
        Some(name) => println!("👋 Signed out {}.", name),
        None => println!("👋 Signed out."),
    }
    Ok(0)
}

/// Fetch a project and its tasks; `None` when the project does not exist.
async fn fetch_project(ctx: &AppContext, project_id: &str) -> Result<Option<(Project, Vec<Task>)>> {
    let (project, tasks) = with_spinner(
        ctx.show_progress,
        "Loading project...",
        ctx.source.project_with_tasks(project_id),
    )
    .await?;

    Ok(project.map(|p| (p, tasks)))
}

fn not_found(kind: &str, id: &str) -> i32 {
    eprintln!("🔍 {} not found: {}", kind, id);
    EXIT_NOT_FOUND
}

fn ack_message<'a>(message: &'a str, fallback: &'a str) -> &'a str {
    if message.trim().is_empty() {
        fallback
    } else {
        message
    }
}

/// The REST client, or an error when running on mock data.
fn require_api(source: &DataSource) -> Result<&ApiClient> {
    match source {
        DataSource::Remote(client) => Ok(client),
        DataSource::Mock(_) => anyhow::bail!(
            "This command needs the REST backend. Pass --api-url or set [source] kind = \"api\" in .taskify.toml"
        ),
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .taskify.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}

/// Open the persisted session, or an in-memory one for --ephemeral runs.
fn open_session(args: &Args, config: &Config) -> Result<AppSession> {
    let store: Box<dyn StateStore> = if args.ephemeral {
        debug!("Using in-memory session state");
        Box::new(MemoryStateStore::default())
    } else {
        let store = FileStateStore::new(&config.state.path);
        debug!("Session state file: {}", store.path().display());
        Box::new(store)
    };

    Session::open(store)
}

/// Build the data source selected by the configuration.
fn build_source(config: &Config, token: Option<&str>, now: DateTime<Utc>) -> Result<DataSource> {
    match config.source.kind {
        SourceKind::Mock => {
            let store = match config.source.data_file {
                Some(ref path) => MockStore::from_file(Path::new(path))?,
                None => MockStore::seeded(now),
            };
            let delay = Duration::from_millis(config.source.mock_delay_ms);
            Ok(DataSource::Mock(store.with_delay(delay)))
        }
        SourceKind::Api => {
            let client = ApiClient::new(ClientConfig {
                base_url: config.api.base_url.clone(),
                timeout_seconds: config.api.timeout_seconds,
                token: token.map(String::from),
            })?;
            Ok(DataSource::Remote(client))
        }
    }
}
