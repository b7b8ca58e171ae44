//! Drill CLI
//!
//! Terminal front-end for drill sessions: browse the catalog, play a drill
//! step by step, throw the difficulty dice, split teams and manage saved
//! workshops.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use drill_core::{
    FileStore, LevelFilter, Positions, Session, SessionConfig, WallClock, WorkshopStore,
};
use std::path::PathBuf;
use std::thread;

#[derive(Parser)]
#[command(name = "drill")]
#[command(about = "Futsal drill sessions and workshops", long_about = None)]
struct Cli {
    /// Workshop storage directory (overrides config)
    #[arg(long, global = true)]
    storage_dir: Option<PathBuf>,

    /// Fixed RNG seed (overrides config)
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List drills, optionally only one level
    Drills {
        #[arg(long)]
        level: Option<u8>,
    },

    /// Show one drill with its cues
    Show {
        /// Catalog index
        index: usize,
    },

    /// Play a drill and print positions at every step
    Play {
        /// Catalog index
        index: usize,

        /// Number of ticks to run
        #[arg(long, default_value_t = 8)]
        ticks: u32,

        /// Wait one tick period between steps
        #[arg(long, default_value = "false")]
        realtime: bool,

        /// Print JSON session status instead of text
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Roll a random difficulty
    Roll,

    /// Split comma-separated names into two teams
    Teams { names: String },

    /// Manage saved workshops
    Workshop {
        #[command(subcommand)]
        command: WorkshopCommand,
    },
}

#[derive(Subcommand)]
enum WorkshopCommand {
    /// List saved workshops
    List,

    /// Save a new workshop
    Save {
        name: String,

        /// Catalog index of the drill
        #[arg(long)]
        drill: usize,

        /// Roll a difficulty for it
        #[arg(long, default_value = "false")]
        roll: bool,
    },

    /// Change and re-save an existing workshop
    Update {
        id: String,

        #[arg(long)]
        drill: Option<usize>,

        #[arg(long, default_value = "false")]
        roll: bool,

        #[arg(long)]
        name: Option<String>,
    },

    /// Delete a workshop
    Delete { id: String },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = SessionConfig::from_env().map_err(anyhow::Error::msg)?;
    if let Some(dir) = cli.storage_dir {
        config.storage_dir = dir;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    log::debug!(
        "config: tick {} ms, storage {:?} under key '{}'",
        config.tick_period_ms,
        config.storage_dir,
        config.storage_key
    );

    let mut session = Session::builtin(&config);

    match cli.command {
        Commands::Drills { level } => list_drills(&mut session, LevelFilter::from(level)),
        Commands::Show { index } => show_drill(&mut session, index)?,
        Commands::Play { index, ticks, realtime, json } => {
            play(&mut session, &config, index, ticks, realtime, json)?
        }
        Commands::Roll => {
            let rolled = session.roll_difficulty();
            println!("🎲 {}: {}", rolled.name, rolled.description);
        }
        Commands::Teams { names } => match session.randomize_teams(&names) {
            Some(teams) => {
                println!("Equipo A: {}", teams.a.join(", "));
                println!("Equipo B: {}", teams.b.join(", "));
            }
            None => bail!("no names given"),
        },
        Commands::Workshop { command } => {
            let store = WorkshopStore::with_key(
                FileStore::new(&config.storage_dir),
                config.storage_key.clone(),
            );
            workshop(&mut session, &store, command)?;
        }
    }

    Ok(())
}

fn list_drills(session: &mut Session, filter: LevelFilter) {
    session.select_level_filter(filter);
    let catalog = session.catalog();
    for drill in session.playback().filtered_drills() {
        let index = catalog.position_of(&drill.id).unwrap_or_default();
        let level = drill.level.map(|l| l.to_string()).unwrap_or_else(|| "-".to_string());
        println!("[{}] {} (level {}, {} steps)", index, drill.name, level, drill.path_len());
    }
}

fn show_drill(session: &mut Session, index: usize) -> Result<()> {
    let drill = session.select_drill(index)?;

    println!("{} [{}]", drill.name, drill.id);
    println!("{}", drill.description);
    if let Some(exercise) = &drill.exercise_description {
        println!("{}", exercise);
    }
    if let Some(minutes) = drill.duration_minutes {
        println!("Duración: {} min", minutes);
    }
    for cue in &drill.cues {
        println!("  • {}: {}", cue.keyword, cue.description);
    }
    Ok(())
}

fn play(
    session: &mut Session,
    config: &SessionConfig,
    index: usize,
    ticks: u32,
    realtime: bool,
    json: bool,
) -> Result<()> {
    session.select_drill(index)?;
    session.play();

    print_step(session, json)?;

    let mut wall = WallClock::new();
    let mut taken = 0;
    while taken < ticks {
        let elapsed = if realtime {
            thread::sleep(config.tick_period());
            wall.lap()
        } else {
            config.tick_period()
        };

        taken += session.advance(elapsed);
        print_step(session, json)?;
    }

    session.pause();
    Ok(())
}

fn print_step(session: &Session, json: bool) -> Result<()> {
    if json {
        let status = serde_json::to_string(&session.status()).context("serialize status")?;
        println!("{}", status);
        return Ok(());
    }

    let positions = session.current_positions()?;
    println!(
        "step {:>2} | passes {:>2} | {}",
        positions.step_index,
        session.playback().lap_count(),
        describe(&positions)
    );
    Ok(())
}

fn describe(positions: &Positions<'_>) -> String {
    let balls: Vec<String> =
        positions.balls.iter().map(|p| format!("({:.0},{:.0})", p.x, p.y)).collect();
    let mut line = format!("ball {}", balls.join(" "));

    if !positions.players.is_empty() {
        let players: Vec<String> = positions
            .players
            .iter()
            .map(|p| format!("{}#{}@({:.0},{:.0})", p.team, p.number, p.position.x, p.position.y))
            .collect();
        line.push_str(&format!(" | players {}", players.join(" ")));
    }
    if !positions.obstacles.is_empty() {
        line.push_str(&format!(" | {} obstacles", positions.obstacles.len()));
    }
    line
}

fn workshop(
    session: &mut Session,
    store: &WorkshopStore<FileStore>,
    command: WorkshopCommand,
) -> Result<()> {
    match command {
        WorkshopCommand::List => {
            let workshops = store.list_all();
            if workshops.is_empty() {
                println!("No workshops saved in {:?}", store.backend().dir());
            }
            for ws in workshops {
                let difficulty =
                    ws.difficulty.as_ref().map(|d| d.name.as_str()).unwrap_or("sin dificultad");
                println!(
                    "{}  {}  drill #{}  {}  (saved {})",
                    ws.id,
                    ws.name,
                    ws.drill_index,
                    difficulty,
                    ws.last_saved().format("%Y-%m-%d %H:%M")
                );
            }
        }
        WorkshopCommand::Save { name, drill, roll } => {
            session.select_drill(drill)?;
            if roll {
                session.roll_difficulty();
            }
            let ws = session.save_as(store, &name)?;
            log::info!("Saved workshop '{}' to {:?}", ws.id, store.backend().dir());
            println!("Saved workshop '{}' ({})", ws.name, ws.id);
        }
        WorkshopCommand::Update { id, drill, roll, name } => {
            if let Some(name) = name {
                let mut renamed = store.get(&id)?;
                renamed.name = name;
                store.update(&renamed)?;
            }

            session.load_by_id(store, &id)?;
            if let Some(drill) = drill {
                session.select_drill(drill)?;
            }
            if roll {
                session.roll_difficulty();
            }
            if session.has_unsaved_changes() {
                session.save(store)?;
                log::info!("Re-saved workshop '{}'", id);
            }

            let ws = session.current_workshop().context("workshop vanished after load")?;
            println!("Workshop '{}' now on drill #{}", ws.name, ws.drill_index);
        }
        WorkshopCommand::Delete { id } => {
            session.delete_workshop(store, &id)?;
            log::info!("Deleted workshop '{}' from {:?}", id, store.backend().dir());
            println!("Deleted workshop {}", id);
        }
    }
    Ok(())
}
