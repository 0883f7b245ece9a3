use chrono::Local;
use clap::Subcommand;
use questmaster_core::backend::completion_email;
use questmaster_core::task::parse_deadline;
use questmaster_core::{
    AppController, Config, NotFoundError, Priority, Task, TaskCategory, TaskFilter, TaskInput, TaskUpdate, Toggle,
};

use super::{email_target, open_session};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a new quest
    Create {
        /// Quest name
        name: String,
        /// Category (work, personal, health, learning, creative, social, finance, home)
        #[arg(long)]
        category: String,
        /// Deadline (RFC 3339, or local "YYYY-MM-DD HH:MM")
        #[arg(long)]
        deadline: String,
        /// Priority (low, medium, high)
        #[arg(long)]
        priority: String,
        /// Optional free-form notes
        #[arg(long, default_value = "")]
        description: String,
    },
    /// List quests
    List {
        /// View: all, urgent, today, completed, overdue
        #[arg(long, default_value = "all")]
        filter: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Search quests by name, description or category
    Search {
        query: String,
        /// View shown when the query is blank
        #[arg(long, default_value = "all")]
        filter: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one quest as JSON
    Show {
        /// Quest ID
        id: String,
    },
    /// Mark a quest complete, or reopen a completed one
    Toggle {
        /// Quest ID
        id: String,
    },
    /// Edit a quest
    Update {
        /// Quest ID
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        deadline: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a quest
    Delete {
        /// Quest ID
        id: String,
    },
}

pub async fn run(action: TaskAction, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = open_session(config)?;

    match action {
        TaskAction::Create {
            name,
            category,
            deadline,
            priority,
            description,
        } => {
            let input = TaskInput {
                name,
                category: Some(category.parse::<TaskCategory>()?),
                deadline: Some(parse_deadline(&deadline, app.clock())?),
                priority: Some(priority.parse::<Priority>()?),
                description,
            };
            let task = app.create_task(input)?;
            println!("{}", task.id);
        }
        TaskAction::List { filter, json } => {
            let filter: TaskFilter = filter.parse()?;
            let tasks = app.tasks(filter);
            print_tasks(&tasks, &app, json)?;
        }
        TaskAction::Search { query, filter, json } => {
            let tasks = app.search(&query, filter.parse::<TaskFilter>()?);
            print_tasks(&tasks, &app, json)?;
        }
        TaskAction::Show { id } => match app.task(&id) {
            Some(task) => println!("{}", serde_json::to_string_pretty(task)?),
            None => return Err(NotFoundError::task(id).into()),
        },
        TaskAction::Toggle { id } => match app.toggle_task(&id)? {
            Toggle::Completed(task) => {
                println!("completed: {}", task.name);
                if let Some((client, email)) = email_target(config, &app)? {
                    let outcome = client.send_task_completed(&email, &task).await;
                    if outcome.success {
                        let (subject, _) = completion_email(&task.name);
                        println!("email sent: {subject}");
                    } else {
                        tracing::warn!(error = ?outcome.error, "{}", outcome.message);
                    }
                }
            }
            Toggle::Reopened(task) => println!("reopened: {}", task.name),
        },
        TaskAction::Update {
            id,
            name,
            category,
            deadline,
            priority,
            description,
        } => {
            let fields = TaskUpdate {
                name,
                category: category.map(|c| c.parse::<TaskCategory>()).transpose()?,
                deadline: deadline
                    .map(|d| parse_deadline(&d, app.clock()))
                    .transpose()?,
                priority: priority.map(|p| p.parse::<Priority>()).transpose()?,
                description,
            };
            if fields.is_empty() {
                return Err("nothing to update".into());
            }
            let task = app.update_task(&id, fields)?;
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::Delete { id } => {
            let task = app.delete_task(&id)?;
            println!("deleted: {}", task.name);
        }
    }
    Ok(())
}

fn print_tasks(
    tasks: &[Task],
    app: &AppController,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(tasks)?);
        return Ok(());
    }
    if tasks.is_empty() {
        println!("No quests found.");
        return Ok(());
    }
    let now = app.clock().now();
    for task in tasks {
        let mark = if task.completed { "x" } else { " " };
        let flag = if task.is_overdue(now) {
            " OVERDUE"
        } else if task.is_urgent(now) {
            " URGENT"
        } else {
            ""
        };
        println!(
            "[{mark}] {}  {}  ({}, {})  due {}{flag}",
            task.id,
            task.name,
            task.category,
            task.priority,
            task.deadline.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
        );
    }
    Ok(())
}
