use crate::commands::{split, Command, Line, TasksArgs};
use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use taskdesk_rest_client::reqwest::ReqwestClient;
use taskdesk_sdk::agent::config::{Config, FileStore};
use taskdesk_sdk::agent::store::FileSessionStore;
use taskdesk_sdk::api::agent::events::{Event, Notification, Route};
use taskdesk_sdk::api::common::coordinator::Submit;
use taskdesk_sdk::api::types::auth::{LoginRequest, RegisterRequest};
use taskdesk_sdk::api::types::tasks::{CreateTaskRequest, UpdateTaskRequest};
use taskdesk_sdk::api::Error as ApiError;
use taskdesk_sdk::TaskAgent;
use tokio::fs::create_dir_all;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

type Agent = TaskAgent<ReqwestClient, FileSessionStore>;

pub struct Runner {
    agent: Agent,
    debug: bool,
    config_path: PathBuf,
}

impl Runner {
    pub async fn new(endpoint: Option<String>, debug: bool) -> Result<Self> {
        let config_dir = dirs::config_dir()
            .with_context(|| format!("No config dir: {:?}", dirs::config_dir()))?;
        let dir = config_dir.join("taskdesk-cli");
        create_dir_all(&dir).await?;
        let config_path = dir.join("config.json");

        let mut config = if config_path.exists() {
            Config::load(&FileStore::new(&config_path))
                .await
                .with_context(|| format!("Failed to load {config_path:?}"))?
        } else {
            Config::default()
        };
        if let Some(endpoint) = endpoint {
            config.endpoint = endpoint;
        }
        let agent = TaskAgent::builder()
            .config(config)
            .store(FileSessionStore::new(dir.join("session.json")))
            .build()
            .await?;
        agent.to_config().save(&FileStore::new(&config_path)).await?;
        Ok(Self { agent, debug, config_path })
    }
    /// Reads commands from stdin until `quit` or end of input.
    pub async fn run(&self) -> Result<()> {
        let printer = spawn_printer(self.agent.subscribe_events());
        if let Some(user) = self.agent.current_user() {
            println!("Logged in as {} <{}>", user.name, user.email);
        }
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("> ");
            std::io::stdout().flush()?;
            let Some(line) = lines.next_line().await? else {
                break;
            };
            let words = match split(&line) {
                Ok(words) if words.is_empty() => continue,
                Ok(words) => words,
                Err(err) => {
                    eprintln!("{err}");
                    continue;
                }
            };
            let command = match Line::try_parse_from(words) {
                Ok(line) => line.command,
                Err(err) => {
                    let _ = err.print();
                    continue;
                }
            };
            if matches!(command, Command::Quit) {
                break;
            }
            if let Err(err) = self.execute(command).await {
                eprintln!("Error: {err:#}");
            }
        }
        printer.abort();
        self.agent.to_config().save(&FileStore::new(&self.config_path)).await?;
        Ok(())
    }
    async fn execute(&self, command: Command) -> Result<()> {
        match command {
            Command::Login(args) => {
                self.agent
                    .login(
                        Submit::new(LoginRequest { email: args.email, password: args.password })
                            .on_error(print_validation),
                    )
                    .await;
                Ok(())
            }
            Command::Register(args) => {
                self.agent
                    .register(
                        Submit::new(RegisterRequest {
                            name: args.name,
                            email: args.email,
                            password: args.password,
                        })
                        .on_error(print_validation),
                    )
                    .await;
                Ok(())
            }
            Command::Logout => {
                self.agent.logout(()).await;
                Ok(())
            }
            Command::Whoami => match self.agent.current_user() {
                Some(user) => self.print(&user),
                None => {
                    println!("Not logged in");
                    Ok(())
                }
            },
            Command::Refresh => {
                if self.agent.refresh_token().await?.is_some() {
                    println!("Session renewed");
                }
                Ok(())
            }
            Command::Status => {
                println!("endpoint:   {}", self.agent.get_endpoint());
                println!("session:    {}", self.agent.state());
                println!("renewal:    {}", if self.agent.is_renewal_armed() { "armed" } else { "off" });
                println!("submitting: {}", self.agent.flags().is_submitting());
                println!("loading:    {}", self.agent.flags().is_loading());
                println!("cached:     {}", self.agent.cache().len());
                Ok(())
            }
            Command::Tasks(args) => self.tasks(args).await,
            Command::Task(args) => match self.agent.tasks.get_task(args.id).await? {
                Some(task) => self.print(&task),
                None => Ok(()),
            },
            Command::Create(args) => {
                self.agent
                    .tasks
                    .create_task(
                        Submit::new(CreateTaskRequest {
                            title: args.title,
                            description: args.description,
                            due_date: args.due,
                            priority: args.priority,
                            category: args.category,
                        })
                        .on_error(print_validation),
                    )
                    .await;
                Ok(())
            }
            Command::Update(args) => {
                let input = UpdateTaskRequest {
                    title: args.title,
                    description: args.description,
                    due_date: args.due,
                    priority: args.priority,
                    category: args.category,
                };
                self.agent
                    .tasks
                    .update_task(Submit::new((args.id, input)).on_error(print_validation))
                    .await;
                Ok(())
            }
            Command::SetStatus(args) => {
                self.agent.tasks.update_task_status((args.id, args.status)).await;
                Ok(())
            }
            Command::Delete(args) => {
                self.agent.tasks.delete_task(args.id).await;
                Ok(())
            }
            Command::Summary => match self.agent.dashboard.load_summary().await? {
                Some(summary) => self.print(&summary),
                None => Ok(()),
            },
            Command::Quit => Ok(()),
        }
    }
    async fn tasks(&self, args: TasksArgs) -> Result<()> {
        let store = &self.agent.tasks;
        if args.reset {
            store.reset_filter_params();
        }
        store.set_filter_params(|params| {
            params.status = args.status.or(params.status);
            params.priority = args.priority.or(params.priority);
            params.category = args.category.or(params.category);
            params.search_term = args.search.or(params.search_term.take());
            params.due_date_from = args.from.or(params.due_date_from.take());
            params.due_date_to = args.to.or(params.due_date_to.take());
            params.sort_by = args.sort_by.or(params.sort_by);
            params.sort_descending = args.desc;
        });
        if !args.local && store.get_tasks(None).await?.is_none() {
            return Ok(());
        }
        let tasks = store.filtered_tasks();
        if self.debug {
            return self.print(&tasks);
        }
        for task in &tasks {
            println!(
                "{:>5}  {:<11}  {:<6}  {:<8}  {:<10}  {}",
                task.id,
                task.status.label(),
                task.priority.label(),
                task.category.label(),
                task.due_date.as_deref().map(|due| due.get(..10).unwrap_or(due)).unwrap_or("-"),
                task.title
            );
        }
        println!("{} task(s)", tasks.len());
        Ok(())
    }
    fn print<T: std::fmt::Debug + Serialize>(&self, result: &T) -> Result<()> {
        if self.debug {
            println!("{:#?}", result);
        } else {
            println!("{}", serde_json::to_string_pretty(result)?);
        }
        Ok(())
    }
}

fn print_validation(err: ApiError) {
    for message in err.validation_messages() {
        eprintln!("  - {message}");
    }
}

fn spawn_printer(mut rx: broadcast::Receiver<Event>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(Event::Notification(Notification { title, message, .. })) => {
                    println!("[{title}] {message}");
                }
                Ok(Event::Navigate(route)) => match route {
                    Route::Login => println!("Please log in."),
                    Route::Home => {}
                    Route::NotFound => println!("[Error] Not found"),
                    Route::ServerError { message } => {
                        println!("[Error] Server error: {}", message.as_deref().unwrap_or("unknown"))
                    }
                },
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "events dropped");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}
