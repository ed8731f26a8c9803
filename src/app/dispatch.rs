use crate::app::render;
use crate::cli::commands::{Cli, Commands, HistoryCommands};
use anyhow::{Context, Result, bail};
use geminizer::activity::ActivitySimulator;
use geminizer::config::Config;
use geminizer::dashboard::StatusDashboard;
use geminizer::demo::{ExpertConsole, LiveDemo, PhysicsPreset, PoseLibrary};
use geminizer::gateway::{Gateway, HttpGateway};
use geminizer::generation::GenerationController;
use geminizer::history::HistorySynchronizer;
use geminizer::safety::{ListObserver, SafetyMonitor, SafetyObservers};
use geminizer::session::{FileKeyValueStore, Identity, SessionStore};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

/// Everything a command needs, built once from config and the stored session.
struct Workspace {
    config: Config,
    session: SessionStore,
    gateway: Arc<dyn Gateway>,
}

impl Workspace {
    fn open(config: Config) -> Result<Self> {
        let session = SessionStore::open(FileKeyValueStore::new(config.session_path()));
        let gateway = HttpGateway::from_config(&config.service)?
            .with_bearer_token(session.token().as_deref());
        Ok(Self {
            config,
            session,
            gateway: Arc::new(gateway),
        })
    }
}

pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    let workspace = Workspace::open(config)?;

    match cli.command {
        Commands::Generate {
            prompt,
            options,
            no_safety,
            quiet,
            export,
            export_dir,
        } => {
            let export = export.then_some(export_dir);
            run_generate(&workspace, &prompt, options, !no_safety, quiet, export).await
        }
        Commands::Safety { prompt } => run_safety(&workspace, prompt).await,
        Commands::History { history_command } => run_history(&workspace, history_command).await,
        Commands::Demo => {
            let simulator = ActivitySimulator::from_config(&workspace.config.activity);
            let demo = LiveDemo::new(Arc::clone(&workspace.gateway), simulator);
            let printer = spawn_activity_printer(demo.simulator());
            let outcome = demo.run().await;
            printer.abort();
            print_lines(&render::demo(&outcome));
            Ok(())
        }
        Commands::Analyze { pose, prompt } => {
            let library = PoseLibrary::new(Arc::clone(&workspace.gateway));
            let analysis = match (pose, prompt) {
                (_, Some(prompt)) => library.analyze_prompt(&prompt).await?,
                (Some(pose), None) => library.analyze(&pose).await?,
                (None, None) => bail!("Pass a pose key or --prompt (see `geminizer poses`)"),
            };
            print_lines(&render::analysis(&analysis));
            Ok(())
        }
        Commands::Poses => {
            print_lines(&render::poses(PoseLibrary::poses()));
            Ok(())
        }
        Commands::Expert {
            command,
            preset,
            raw,
            library,
        } => run_expert(&workspace, command, preset, raw, library).await,
        Commands::Status { watch } => run_status(&workspace, watch).await,
        Commands::Agent { id } => {
            let dashboard = StatusDashboard::new(
                Arc::clone(&workspace.gateway),
                Duration::from_secs(workspace.config.dashboard.poll_interval_secs),
            );
            let details = dashboard.agent_details(&id).await?;
            print_lines(&render::agent(&id, &details));
            Ok(())
        }
        Commands::Login {
            username,
            token,
            display_name,
        } => {
            let identity = Identity {
                username,
                display_name,
            };
            let session = workspace.session.login(identity, &token)?;
            print_lines(&render::session(Some(&session)));
            Ok(())
        }
        Commands::Logout => {
            workspace.session.logout()?;
            println!("Signed out.");
            Ok(())
        }
        Commands::Whoami => {
            print_lines(&render::session(workspace.session.current().as_ref()));
            Ok(())
        }
        Commands::Config => {
            print_lines(&render::config(&workspace.config));
            Ok(())
        }
    }
}

async fn run_generate(
    workspace: &Workspace,
    prompt: &str,
    overrides: Vec<(String, String)>,
    safety_gate: bool,
    quiet: bool,
    export: Option<Option<PathBuf>>,
) -> Result<()> {
    let mut options: BTreeMap<String, String> = workspace.config.generation.default_options.clone();
    options.extend(overrides);

    let history = HistorySynchronizer::new(Arc::clone(&workspace.gateway));
    let controller = GenerationController::new(Arc::clone(&workspace.gateway))
        .with_safety_gate(safety_gate && workspace.config.safety.gate_generation)
        .with_history(Arc::clone(&history));

    let simulator = ActivitySimulator::from_config(&workspace.config.activity);
    let printer = (!quiet).then(|| {
        let printer = spawn_activity_printer(&simulator);
        simulator.start();
        printer
    });

    let outcome = tokio::select! {
        outcome = controller.generate(prompt, options) => outcome,
        _ = tokio::signal::ctrl_c() => {
            controller.teardown();
            simulator.teardown();
            bail!("Generation cancelled");
        }
    };
    // The real result supersedes the simulated progress.
    simulator.teardown();
    if let Some(printer) = printer {
        printer.abort();
    }

    let result = outcome?;
    print_lines(&render::generation(&result));

    if let Some(dir) = export {
        let dir = dir.unwrap_or_else(|| workspace.config.export_dir());
        let path = controller.export_current(&dir).await?;
        println!("Saved {}", path.display());
    }

    // The background refresh may not land before the process exits.
    match history.refresh().await {
        Ok(entries) => println!("History now holds {} generations.", entries.len()),
        Err(err) => tracing::warn!(error = %err, "history refresh after generation failed"),
    }
    Ok(())
}

async fn run_safety(workspace: &Workspace, prompt: String) -> Result<()> {
    let on_suggestion: ListObserver = Arc::new(|suggestions: &[String]| {
        tracing::debug!(count = suggestions.len(), "safety suggestions received");
    });
    let monitor = SafetyMonitor::with_observers(
        Arc::clone(&workspace.gateway),
        Duration::ZERO,
        SafetyObservers {
            on_issue: None,
            on_suggestion: Some(on_suggestion),
        },
    );

    monitor.on_draft_changed(prompt);
    let snapshot = monitor.settled().await;
    print_lines(&render::safety(&snapshot));
    Ok(())
}

async fn run_history(workspace: &Workspace, command: HistoryCommands) -> Result<()> {
    let history = HistorySynchronizer::new(Arc::clone(&workspace.gateway));
    match command {
        HistoryCommands::List => {
            let entries = history.refresh().await.context("Failed to load history")?;
            print_lines(&render::history(&entries));
        }
        HistoryCommands::Delete { id } => {
            history.remove(&id).await?;
            println!("Deleted {id}.");
            print_lines(&render::history(&history.entries()));
        }
    }
    Ok(())
}

async fn run_expert(
    workspace: &Workspace,
    command: Option<String>,
    preset: Option<String>,
    raw: bool,
    library: bool,
) -> Result<()> {
    if library {
        print_lines(&render::command_library());
        return Ok(());
    }

    let console = ExpertConsole::new(
        Arc::clone(&workspace.gateway),
        raw || workspace.config.expert.expert_mode,
        workspace.config.expert.history_limit,
    );
    let reply = match (command, preset) {
        (_, Some(preset)) => console.apply_preset(&PhysicsPreset::parse(&preset)?).await?,
        (Some(command), None) => console.execute(&command).await?,
        (None, None) => bail!("Pass a command, --preset or --library"),
    };
    print_lines(&render::expert(&reply, &console.recent(1)));
    Ok(())
}

async fn run_status(workspace: &Workspace, watch: bool) -> Result<()> {
    let dashboard = StatusDashboard::new(
        Arc::clone(&workspace.gateway),
        Duration::from_secs(workspace.config.dashboard.poll_interval_secs),
    );

    if !watch {
        // Errors are folded into the view and rendered there.
        let _ = dashboard.fetch_once().await;
        print_lines(&render::status(&dashboard.view()));
        return Ok(());
    }

    let mut updates = dashboard.subscribe();
    dashboard.start();
    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = updates.borrow_and_update().clone();
                print_lines(&render::status(&view));
                println!();
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    dashboard.teardown();
    Ok(())
}

/// Print activity records as they are appended.
fn spawn_activity_printer(simulator: &Arc<ActivitySimulator>) -> tokio::task::JoinHandle<()> {
    let mut updates = simulator.subscribe();
    tokio::spawn(async move {
        let mut printed = 0;
        while updates.changed().await.is_ok() {
            let records = updates.borrow_and_update().clone();
            if records.len() < printed {
                printed = 0;
            }
            for record in &records[printed..] {
                println!("{}", render::activity_line(record));
            }
            printed = records.len();
        }
    })
}
