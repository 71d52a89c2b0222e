//! Interactive terminal client for the Task Manager API
//!
//! # Environment Variables
//!
//! - `TASK_API_URL`: API base URL (default: `http://localhost:5000/api`)
//! - `TASK_API_TIMEOUT_SECS`: Request timeout in seconds (default: `10`)
//! - `RUST_LOG`: Logging level, written to stderr
//! - `LOG_FORMAT`: `pretty` (default) | `json`

use std::io::{self, Lines, StdinLock, Write};
use std::str::FromStr;

use tracing_subscriber::fmt::writer::BoxMakeWriter;

use task_manager_api::client::{EditMode, Method, Presenter, SyncAgent, TaskApiClient, TaskForm};
use task_manager_api::config::ClientConfig;
use task_manager_api::domain::{Task, TaskId};
use task_manager_api::logging::{CONSOLE_DEFAULT_FILTER, init_tracing_from_env};

const HELP: &str = "\
Commands:
  list                      reload and show all tasks
  set <field> <value>       edit the form (title, description, status, priority, due)
  form                      show the form
  submit                    create, or update the task under edit
  edit <n|id>               load a task into the form
  delete <n|id>             delete a task
  cancel                    leave edit mode and clear the form
  help                      show this text
  quit                      exit";

/// Presenter over stdin and stdout.
struct ConsolePresenter {
    input: Lines<StdinLock<'static>>,
}

impl ConsolePresenter {
    fn new() -> Self {
        Self {
            input: io::stdin().lines(),
        }
    }

    fn prompt(&mut self, prompt: &str) -> Option<String> {
        print!("{prompt}");
        if io::stdout().flush().is_err() {
            return None;
        }
        match self.input.next() {
            Some(Ok(line)) => Some(line),
            Some(Err(error)) => {
                tracing::warn!(%error, "Failed to read input");
                None
            }
            None => None,
        }
    }
}

impl Presenter for ConsolePresenter {
    fn render_tasks(&mut self, tasks: &[Task]) {
        for (index, task) in tasks.iter().enumerate() {
            println!(
                "[{}] {}  ({}, {})  {}",
                index + 1,
                task.title,
                task.status.as_str(),
                task.priority.as_str(),
                task.id
            );
            if !task.description.is_empty() {
                println!("    {}", task.description);
            }
            if let Some(due_date) = task.due_date {
                println!("    Due: {}", due_date.date_string());
            }
            println!("    Created: {}", task.created_at.date_string());
        }
    }

    fn render_empty(&mut self) {
        println!("No tasks yet. Create one with `set title ...` then `submit`.");
    }

    fn alert(&mut self, message: &str) {
        println!("! {message}");
    }

    fn confirm(&mut self, message: &str) -> bool {
        self.prompt(&format!("{message} [y/N] "))
            .is_some_and(|answer| matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
    }

    fn show_method(&mut self, method: Method) {
        eprintln!("-> {method} Request");
    }

    fn show_form(&mut self, form: &TaskForm, mode: &EditMode) {
        match mode.editing_id() {
            Some(task_id) => println!("Edit Task {task_id}"),
            None => println!("Add New Task"),
        }
        println!("  title:       {}", form.title);
        println!("  description: {}", form.description);
        println!("  status:      {}", form.status);
        println!("  priority:    {}", form.priority);
        println!("  due:         {}", form.due_date);
    }
}

/// Resolves a 1-based list position or a literal id.
fn resolve_task_id(argument: &str, tasks: &[Task]) -> Option<TaskId> {
    argument
        .parse::<usize>()
        .ok()
        .and_then(|position| position.checked_sub(1))
        .and_then(|index| tasks.get(index))
        .map(|task| task.id.clone())
        .or_else(|| TaskId::from_str(argument).ok())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenvy::dotenv().ok();

    if let Err(error) = init_tracing_from_env(CONSOLE_DEFAULT_FILTER, BoxMakeWriter::new(io::stderr))
    {
        eprintln!("Configuration error: {error}");
        std::process::exit(1);
    }

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            tracing::error!("Configuration error: {}", error);
            std::process::exit(1);
        }
    };

    let client = match TaskApiClient::new(&config) {
        Ok(client) => client,
        Err(error) => {
            tracing::error!("Failed to create HTTP client: {}", error);
            std::process::exit(1);
        }
    };

    println!("Task Manager console ({})", client.base_url());
    println!("Type `help` for commands.");

    let mut agent = SyncAgent::new(client, ConsolePresenter::new());
    agent.load().await;

    while let Some(line) = agent.presenter_mut().prompt("> ") {
        let line = line.trim();
        let (command, argument) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(command, rest)| (command, rest.trim()));

        match command {
            "" => {}
            "list" | "refresh" => {
                agent.load().await;
            }
            "set" => {
                let (field, value) = argument
                    .split_once(char::is_whitespace)
                    .map_or((argument, ""), |(field, value)| (field, value.trim()));
                if !agent.form_mut().set(field, value) {
                    println!("Unknown field '{field}'");
                }
            }
            "form" => {
                let (form, mode) = (agent.form().clone(), agent.mode().clone());
                agent.presenter_mut().show_form(&form, &mode);
            }
            "submit" => {
                agent.submit().await;
            }
            "edit" | "delete" => match resolve_task_id(argument, agent.tasks()) {
                Some(task_id) if command == "edit" => {
                    agent.edit(&task_id).await;
                }
                Some(task_id) => {
                    agent.delete(&task_id).await;
                }
                None => println!("No task matches '{argument}'"),
            },
            "cancel" => agent.cancel(),
            "help" => println!("{HELP}"),
            "quit" | "exit" => break,
            other => println!("Unknown command '{other}'. Type `help` for commands."),
        }
    }
}
