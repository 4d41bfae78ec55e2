//! Command-line front end for the contact book.
//!
//! # Responsibility
//! - Parse commands and form-style input (required name, reminder values).
//! - Open the persistent store from `StoreConfig` plus flag overrides.
//! - Render contacts, notes and groups as plain text.

use clap::{Args, Parser, Subcommand};
use contactbook_core::db::open_db;
use contactbook_core::{
    init_logging_from_config, ContactDraft, ContactId, ContactStore, GroupDraft, GroupId,
    KeyValueStorage, LoadPolicy, NoteDraft, Reminder, ReminderDraft, ReminderUnit,
    SqliteKeyValueStorage, StoreConfig,
};
use log::debug;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "contactbook",
    version,
    about = "Keep track of the people you mean to stay in touch with"
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    /// SQLite file holding the store (overrides CONTACTBOOK_DB_PATH).
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Fail instead of starting empty when stored data is corrupt.
    #[arg(long, global = true)]
    strict: bool,
    /// Absolute directory for rolling log files (overrides CONTACTBOOK_LOG_DIR).
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
    /// trace|debug|info|warn|error (overrides CONTACTBOOK_LOG_LEVEL).
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List contacts with days since last contact and status.
    List,
    /// Show one contact with its notes.
    Show { contact_id: String },
    /// Add a contact.
    Add {
        name: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value = "")]
        email: String,
        /// Reminder frequency; defaults to 7.
        #[arg(long)]
        every: Option<u32>,
        /// days|weeks|months; defaults to days.
        #[arg(long, value_parser = parse_unit)]
        unit: Option<ReminderUnit>,
    },
    /// Mark a contact as contacted now.
    Touch { contact_id: String },
    /// Change a contact's reminder.
    Remind {
        contact_id: String,
        every: u32,
        #[arg(value_parser = parse_unit)]
        unit: ReminderUnit,
    },
    /// Add a note to a contact (also marks it as contacted).
    Note { contact_id: String, content: String },
    /// List groups and their members.
    Groups,
    /// Create a group.
    GroupAdd { name: String },
    /// Add a contact to a group.
    GroupJoin { contact_id: String, group_id: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let config = resolve_config(&cli.global)?;
    init_logging_from_config(&config)?;
    debug!("event=cli_start module=cli status=ok");

    let conn = open_db(&config.db_path)
        .map_err(|err| format!("failed to open `{}`: {err}", config.db_path.display()))?;
    let storage = SqliteKeyValueStorage::try_new(&conn).map_err(|err| err.to_string())?;
    let mut store =
        ContactStore::open(storage, config.load_policy).map_err(|err| err.to_string())?;

    execute(&mut store, cli.command)
}

fn resolve_config(global: &GlobalArgs) -> Result<StoreConfig, String> {
    let mut config = StoreConfig::from_env().map_err(|err| err.to_string())?;
    if let Some(db) = global.db.clone() {
        config.db_path = db;
    }
    if global.strict {
        config.load_policy = LoadPolicy::Strict;
    }
    if let Some(log_dir) = global.log_dir.clone() {
        config.log_dir = Some(log_dir);
    }
    if let Some(level) = global.log_level.clone() {
        config.log_level = level;
    }
    Ok(config)
}

fn execute<S: KeyValueStorage>(
    store: &mut ContactStore<S>,
    command: Command,
) -> Result<(), String> {
    match command {
        Command::List => {
            let overview = store.contact_overview();
            if overview.is_empty() {
                println!("No contacts yet.");
            }
            for row in overview {
                println!(
                    "{}  {}  last contacted {} day(s) ago  {}  [{}]",
                    row.contact.id,
                    row.contact.name,
                    row.status.days_since,
                    row.contact.reminder,
                    row.status.tier.as_str()
                );
            }
        }
        Command::Show { contact_id } => {
            let id = ContactId::from(contact_id);
            let contact = store
                .find_contact(&id)
                .ok_or_else(|| format!("contact not found: {id}"))?;
            let status = store.contact_status(contact);
            println!("{}", contact.name);
            println!("Phone: {}", contact.phone);
            println!("Email: {}", contact.email);
            println!("Last contacted: {} day(s) ago", status.days_since);
            println!("Reminder: {}", contact.reminder);
            println!("Status: {}", status.tier.as_str());
            if contact.notes.is_empty() {
                println!("No notes yet");
            }
            for note in &contact.notes {
                println!("- {}  {}", note.date.format("%b %d, %Y"), note.content);
            }
        }
        Command::Add {
            name,
            phone,
            email,
            every,
            unit,
        } => {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err("name is required".to_string());
            }
            let draft = ContactDraft::new(name)
                .phone(phone)
                .email(email)
                .reminder(ReminderDraft {
                    frequency: every,
                    unit,
                });
            let contact = store.add_contact(draft).map_err(|err| err.to_string())?;
            println!("{}", contact.id);
        }
        Command::Touch { contact_id } => {
            let id = ContactId::from(contact_id);
            require_found(
                store.update_last_contacted(&id).map_err(|err| err.to_string())?,
                || format!("contact not found: {id}"),
            )?;
        }
        Command::Remind {
            contact_id,
            every,
            unit,
        } => {
            let reminder = Reminder::new(every, unit).map_err(|err| err.to_string())?;
            let id = ContactId::from(contact_id);
            require_found(
                store
                    .update_contact_reminder(&id, reminder)
                    .map_err(|err| err.to_string())?,
                || format!("contact not found: {id}"),
            )?;
        }
        Command::Note {
            contact_id,
            content,
        } => {
            let content = content.trim().to_string();
            if content.is_empty() {
                return Err("note content is required".to_string());
            }
            let id = ContactId::from(contact_id);
            let note = store
                .add_note(&id, NoteDraft::new(content))
                .map_err(|err| err.to_string())?
                .ok_or_else(|| format!("contact not found: {id}"))?;
            println!("{}", note.id);
        }
        Command::Groups => {
            if store.groups().is_empty() {
                println!("No groups yet.");
            }
            for group in store.groups() {
                println!("{}  {}", group.id, group.name);
                for member in store.group_members(&group.id) {
                    println!("  - {}", member.name);
                }
            }
        }
        Command::GroupAdd { name } => {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err("group name is required".to_string());
            }
            let group = store
                .add_group(GroupDraft::new(name))
                .map_err(|err| err.to_string())?;
            println!("{}", group.id);
        }
        Command::GroupJoin {
            contact_id,
            group_id,
        } => {
            let contact_id = ContactId::from(contact_id);
            let group_id = GroupId::from(group_id);
            require_found(
                store
                    .add_contact_to_group(&contact_id, &group_id)
                    .map_err(|err| err.to_string())?,
                || format!("group not found: {group_id}"),
            )?;
        }
    }
    Ok(())
}

fn require_found(found: bool, not_found: impl FnOnce() -> String) -> Result<(), String> {
    if found {
        Ok(())
    } else {
        Err(not_found())
    }
}

fn parse_unit(raw: &str) -> Result<ReminderUnit, String> {
    raw.parse()
        .map_err(|err: contactbook_core::ModelValidationError| err.to_string())
}
