use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use schooldesk::config::ClientConfig;
use schooldesk::editor::forms::{parse_assignment, parse_subject};
use schooldesk::editor::{Editor, LoginForm, RegisterForm};
use schooldesk::error::{ErrorCode, ShellError};
use schooldesk::net::{ApiClient, Resource};
use schooldesk::net::types::{ClassItem, Student, Teacher};
use schooldesk::session::{FileStore, SessionStore};
use schooldesk::shell::render;
use schooldesk::shell::{AutoConfirm, Confirmer, Decision, Notifier, SectionRecord, Shell, TerminalConfirmer, TerminalNotifier};
use schooldesk::state::DeleteOutcome;

#[derive(Parser, Debug)]
#[command(name = "schooldesk", about = "School management dashboard client")]
struct Cli {
    #[arg(long, env = "SCHOOLDESK_BASE_URL")]
    base_url: Option<String>,

    #[arg(long, env = "SCHOOLDESK_SESSION_FILE")]
    session_file: Option<PathBuf>,

    /// Log debug output to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Register(RegisterArgs),
    Logout {
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
    Whoami,
    Classes(RecordArgs),
    Students(StudentArgs),
    Teachers(RecordArgs),
}

#[derive(Args, Debug)]
struct RegisterArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
    #[arg(long)]
    retype_password: String,
    #[arg(long, default_value_t = false)]
    agree_terms: bool,
}

#[derive(Args, Debug)]
struct RecordArgs {
    #[command(subcommand)]
    command: RecordCommand,
}

#[derive(Subcommand, Debug)]
enum RecordCommand {
    List {
        #[arg(long, default_value = "")]
        filter: String,
    },
    Create(EditArgs),
    Update {
        id: String,
        #[command(flatten)]
        edit: EditArgs,
    },
    Delete {
        id: String,
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args, Debug)]
struct StudentArgs {
    #[command(subcommand)]
    command: StudentCommand,
}

#[derive(Subcommand, Debug)]
enum StudentCommand {
    #[command(flatten)]
    Record(RecordCommand),
    /// Upload a CSV file of students.
    Import { path: PathBuf },
}

#[derive(Args, Debug)]
struct EditArgs {
    #[arg(long = "set", value_name = "FIELD=VALUE")]
    set: Vec<String>,

    /// Teachers only.
    #[arg(long = "subject", value_name = "CLASS_ID:SUBJECT")]
    subjects: Vec<String>,

    /// Teachers only; index into the current subject list.
    #[arg(long = "remove-subject", value_name = "INDEX")]
    remove_subjects: Vec<usize>,
}

// =============================================================================
// FAILURE REPORTING
// =============================================================================

/// A failed command plus the message shown when the error has none of its own.
struct Failure {
    error: ShellError,
    fallback: String,
}

trait OrSay<T> {
    fn or_say(self, fallback: impl Into<String>) -> Result<T, Failure>;
}

impl<T, E: Into<ShellError>> OrSay<T> for Result<T, E> {
    fn or_say(self, fallback: impl Into<String>) -> Result<T, Failure> {
        self.map_err(|e| Failure { error: e.into(), fallback: fallback.into() })
    }
}

type Outcome = Result<(), Failure>;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::WARN };
    tracing_subscriber::fmt().with_writer(io::stderr).with_max_level(level).init();

    let mut config = ClientConfig::from_env();
    if let Some(base_url) = cli.base_url.as_deref() {
        config = config.with_base_url(base_url);
    }
    if let Some(path) = cli.session_file.clone() {
        config = config.with_session_file(path);
    }

    let mut notifier = TerminalNotifier::new(io::stdout(), io::stderr());
    let session = SessionStore::restore(Arc::new(FileStore::new(&config.session_file)));
    let api = match ApiClient::new(&config, session.token_source()) {
        Ok(api) => api,
        Err(e) => {
            notifier.error(&e.to_string());
            return ExitCode::FAILURE;
        }
    };
    let mut shell = Shell::new(session, api);

    match run(&mut shell, cli.command, &mut notifier).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(Failure { error, fallback }) => {
            tracing::debug!(code = error.error_code(), error = %error, "command failed");
            notifier.error(&error.user_message(&fallback));
            ExitCode::FAILURE
        }
    }
}

async fn run(shell: &mut Shell, command: Command, notifier: &mut dyn Notifier) -> Outcome {
    match command {
        Command::Login { email, password } => {
            let principal = shell.sign_in(&LoginForm::new(email, password)).await.or_say("Login failed")?;
            notifier.info(&format!("Signed in as {}", render::principal(principal)));
            Ok(())
        }
        Command::Register(args) => {
            let form = RegisterForm {
                name: args.name,
                email: args.email,
                password: args.password,
                retype_password: args.retype_password,
                agree_terms: args.agree_terms,
            };
            let principal = shell.sign_up(&form).await.or_say("Registration failed")?;
            notifier.info(&format!("Registered and signed in as {}", render::principal(principal)));
            Ok(())
        }
        Command::Logout { yes } => {
            let mut confirmer = confirmer(yes);
            if shell.logout(confirmer.as_mut()).or_say("Logout failed")? {
                notifier.info("Logged out.");
            } else {
                notifier.info("Logout cancelled.");
            }
            Ok(())
        }
        Command::Whoami => {
            let principal = shell.whoami().or_say("Not signed in")?;
            println!("{}", render::principal(principal));
            Ok(())
        }
        Command::Classes(args) => run_records::<ClassItem>(shell, args.command, notifier).await,
        Command::Teachers(args) => run_records::<Teacher>(shell, args.command, notifier).await,
        Command::Students(args) => match args.command {
            StudentCommand::Record(command) => run_records::<Student>(shell, command, notifier).await,
            StudentCommand::Import { path } => {
                shell.select(Student::SECTION).await.or_say("Error loading students")?;
                let summary = shell.import_students(&path).await.or_say("Failed to import CSV")?;
                notifier.info(&format!("{} students imported successfully!", summary.count));
                Ok(())
            }
        },
    }
}

fn confirmer(yes: bool) -> Box<dyn Confirmer> {
    if yes {
        Box::new(AutoConfirm(Decision::Confirm))
    } else {
        Box::new(TerminalConfirmer::new(io::BufReader::new(io::stdin()), io::stderr()))
    }
}

async fn run_records<R: SectionRecord + EditHooks>(
    shell: &mut Shell,
    command: RecordCommand,
    notifier: &mut dyn Notifier,
) -> Outcome {
    shell.select(R::SECTION).await.or_say(format!("Error loading {}", R::SECTION))?;
    let saving = format!("Error saving {}", R::NOUN);

    match command {
        RecordCommand::List { filter } => {
            println!("{}", shell.render_list::<R>(&filter).or_say(format!("Error loading {}", R::SECTION))?);
            Ok(())
        }
        RecordCommand::Create(edit) => {
            let mut editor = shell.editor::<R>(None).or_say(saving.as_str())?;
            apply_edits(&mut editor, &edit).or_say(saving.as_str())?;
            shell.save(&mut editor).await.or_say(saving.as_str())?;
            let created = shell.controller::<R>().or_say(saving.as_str())?.snapshot();
            let id = created.first().and_then(|r| r.id().map(str::to_owned)).unwrap_or_default();
            notifier.info(&format!("Created {} {id}", R::NOUN));
            Ok(())
        }
        RecordCommand::Update { id, edit } => {
            let mut editor = shell.editor::<R>(Some(&id)).or_say(saving.as_str())?;
            apply_edits(&mut editor, &edit).or_say(saving.as_str())?;
            shell.save(&mut editor).await.or_say(saving.as_str())?;
            notifier.info(&format!("Updated {} {id}", R::NOUN));
            Ok(())
        }
        RecordCommand::Delete { id, yes } => {
            let mut confirmer = confirmer(yes);
            let outcome =
                shell.delete::<R>(&id, confirmer.as_mut()).await.or_say(format!("Error deleting {}", R::NOUN))?;
            match outcome {
                DeleteOutcome::Cancelled => notifier.info("Delete cancelled."),
                DeleteOutcome::Deleted(_) => notifier.info(&format!("Deleted {} {id}", R::NOUN)),
            }
            Ok(())
        }
    }
}

// =============================================================================
// EDITS
// =============================================================================

/// Record-specific edits beyond `--set`.
trait EditHooks: Sized + SectionRecord {
    fn apply_extra(editor: &mut Editor<Self>, edit: &EditArgs) -> Result<(), ShellError> {
        if edit.subjects.is_empty() && edit.remove_subjects.is_empty() {
            Ok(())
        } else {
            Err(ShellError::Invalid(vec!["--subject and --remove-subject only apply to teachers.".to_owned()]))
        }
    }
}

impl EditHooks for ClassItem {}

impl EditHooks for Student {}

impl EditHooks for Teacher {
    fn apply_extra(editor: &mut Editor<Self>, edit: &EditArgs) -> Result<(), ShellError> {
        let mut removals = edit.remove_subjects.clone();
        removals.sort_unstable_by(|a, b| b.cmp(a));
        removals.dedup();
        editor.edit(|teacher| {
            for index in removals {
                teacher.remove_subject(index);
            }
        });

        for raw in &edit.subjects {
            let (class_id, subject) = parse_subject(raw)?;
            editor.edit(|teacher| {
                teacher.add_subject(class_id, subject);
            });
        }
        Ok(())
    }
}

fn apply_edits<R: EditHooks>(editor: &mut Editor<R>, edit: &EditArgs) -> Result<(), ShellError> {
    for raw in &edit.set {
        let (field, value) = parse_assignment(raw)?;
        editor.set_field(field, value)?;
    }
    R::apply_extra(editor, edit)
}
