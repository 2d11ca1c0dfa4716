use clap::Parser;
use color_eyre::Result;
use taskmaster::{
    Config, Database, Profile,
    cli::{self, Cli, Commands, TaskEdits},
    logging,
    models::TaskDraft,
    utils,
};

fn main() -> Result<()> {
    // Set up error reporting with color-eyre
    color_eyre::install()?;

    let cli = Cli::parse();

    // --dev keeps config and database apart from the real ones
    let profile = if cli.dev { Profile::Dev } else { Profile::Prod };

    let command = cli.command.unwrap_or(Commands::Tui);

    // The TUI owns the terminal, so its logs go to a file
    if matches!(command, Commands::Tui) {
        match utils::get_data_dir(profile) {
            Some(dir) => logging::init_file(&dir.join("taskmaster.log")),
            None => logging::init_stderr(),
        }
    } else {
        logging::init_stderr();
    }

    let mut config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load_with_profile(profile)?,
    };
    if let Some(database) = &cli.database {
        config.database_path = database.to_string_lossy().to_string();
    }

    let db_path = config.get_database_path();
    let db = Database::new(
        db_path
            .to_str()
            .ok_or_else(|| color_eyre::eyre::eyre!("Database path contains invalid UTF-8"))?,
    )?;
    tracing::debug!(?profile, path = %db_path.display(), "starting");

    match command {
        Commands::Tui => {
            let app = taskmaster::tui::App::new(config, db)?;
            taskmaster::tui::run_event_loop(app)?;
        }
        Commands::Add { title, description, date, time, priority, tag } => {
            let draft = TaskDraft {
                title,
                description,
                date,
                time,
                priority,
                tag: tag.unwrap_or_default(),
            };
            cli::handle_add(draft, &db)?;
        }
        Commands::Edit { id, title, description, date, time, priority, tag } => {
            let edits = TaskEdits { title, description, date, time, priority, tag };
            cli::handle_edit(id, edits, &db)?;
        }
        Commands::Done { id } => cli::handle_set_completed(id, true, &db)?,
        Commands::Undone { id } => cli::handle_set_completed(id, false, &db)?,
        Commands::Delete { id } => cli::handle_delete(id, &db)?,
        Commands::Clear { yes } => cli::handle_clear(yes, &db)?,
        Commands::Today { json } => cli::handle_day(None, json, &db)?,
        Commands::Day { date, json } => cli::handle_day(Some(&date), json, &db)?,
        Commands::Week { date, json } => cli::handle_week(date.as_deref(), json, &db)?,
        Commands::Overdue { json } => cli::handle_overdue(json, &db)?,
        Commands::Share { date } => cli::handle_share(date.as_deref(), &db)?,
        Commands::Remind { catch_up, watch } => cli::handle_remind(catch_up, watch, &config, &db)?,
    }

    Ok(())
}
