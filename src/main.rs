use std::{error::Error, path::PathBuf, process};

use clap::{Parser, Subcommand};
use serde::{de::DeserializeOwned, Serialize};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tokio::fs;
use tracing_subscriber::{
    layer::SubscriberExt as _, util::SubscriberInitExt as _,
};

use repair_desk::{
    api::{component, notification, repair_request, user},
    client, Client, Config,
};

/// Repair-service requests from the command line.
#[derive(Parser)]
#[command(name = "repair-desk", version, about)]
struct Cli {
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in with e-mail and password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Sign out and forget the session
    Logout,

    /// Show the signed-in user
    Me,

    /// E-mail a one-time sign-in link
    SendLink { email: String },

    /// Sign in with the token of a one-time link
    Verify { token: String },

    /// Work with repair requests
    Requests {
        #[command(subcommand)]
        command: RequestCommand,
    },

    /// Work with the component inventory
    Components {
        #[command(subcommand)]
        command: ComponentCommand,
    },

    /// Read and send notifications
    Notifications {
        #[command(subcommand)]
        command: NotificationCommand,
    },

    /// Manage accounts
    Users {
        #[command(subcommand)]
        command: UserCommand,
    },
}

#[derive(Subcommand)]
enum RequestCommand {
    /// Submit a new repair request
    Create {
        #[arg(long)]
        device_model: String,
        #[arg(long, value_parser = parse_wire::<repair_request::IssueType>)]
        issue_type: repair_request::IssueType,
        #[arg(long)]
        problem_area: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        location: String,
    },

    /// Requests you submitted
    Mine,

    /// All requests
    List {
        #[arg(long, value_parser = parse_wire::<repair_request::Status>)]
        status: Option<repair_request::Status>,
    },

    /// Requests assigned to you
    Assigned,

    /// One request
    Show { id: i64 },

    /// Mark a created request as checked
    Check { id: i64 },

    /// Reject a created or checked request
    Reject { id: i64 },

    /// Price and schedule a checked request
    Personalize {
        id: i64,
        #[arg(long)]
        price: f64,
        /// Promised completion time, RFC 3339
        #[arg(long, value_parser = parse_time)]
        end_date: OffsetDateTime,
        /// Consumed component as `ID:QUANTITY`, repeatable
        #[arg(long = "component", value_parser = parse_allocation)]
        components: Vec<component::Allocation>,
    },

    /// Accept the offer and start the work
    Start { id: i64 },

    /// Mark the work as completed
    Complete { id: i64 },
}

#[derive(Subcommand)]
enum ComponentCommand {
    List,
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, default_value_t = 0)]
        in_stock: u32,
        #[arg(long)]
        price: Option<f64>,
    },
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        in_stock: Option<u32>,
        #[arg(long)]
        price: Option<f64>,
    },
}

#[derive(Subcommand)]
enum NotificationCommand {
    List,
    /// Mark notifications as read
    Read { ids: Vec<i64> },
    /// Send a notification to a user
    Send {
        #[arg(long)]
        to: i64,
        #[arg(long)]
        title: String,
        #[arg(long)]
        message: String,
    },
}

#[derive(Subcommand)]
enum UserCommand {
    /// All accounts, optionally with one role
    List {
        #[arg(long, value_parser = parse_wire::<user::Role>)]
        role: Option<user::Role>,
    },

    /// Open an account
    Add {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, value_parser = parse_wire::<user::Role>)]
        role: Option<user::Role>,
    },

    /// Change the role of an account
    SetRole {
        id: i64,
        #[arg(value_parser = parse_wire::<user::Role>)]
        role: user::Role,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = fs::read_to_string(&cli.config).await?;
    let config = toml::from_str::<Config>(&config)?;

    let client = Client::new(&config.api, config.session.store()).await?;

    if let Err(e) = run(&client, cli.command).await {
        tracing::error!(kind = %e.kind(), "{e}");
        eprintln!("error: {e}");
        process::exit(1);
    }

    Ok(())
}

async fn run(client: &Client, command: Command) -> Result<(), client::Error> {
    match command {
        Command::Login { email, password } => {
            print(&client.login(&email, &password).await?.user)
        }
        Command::Logout => client.logout().await,
        Command::Me => print(&client.me().await?),
        Command::SendLink { email } => client.send_auth_link(&email).await,
        Command::Verify { token } => {
            print(&client.verify_link(&token).await?.user)
        }
        Command::Requests { command } => requests(client, command).await,
        Command::Components { command } => components(client, command).await,
        Command::Notifications { command } => match command {
            NotificationCommand::List => print(&client.notifications().await?),
            NotificationCommand::Read { ids } => {
                let ids = ids
                    .into_iter()
                    .map(notification::Id::from)
                    .collect::<Vec<_>>();
                client.mark_notifications_read(&ids).await
            }
            NotificationCommand::Send { to, title, message } => {
                let new = notification::New {
                    title,
                    message,
                    receiver_id: to.into(),
                };
                print(&client.send_notification(&new).await?)
            }
        },
        Command::Users { command } => users(client, command).await,
    }
}

async fn users(
    client: &Client,
    command: UserCommand,
) -> Result<(), client::Error> {
    match command {
        UserCommand::List { role } => print(&client.users(role).await?),
        UserCommand::Add {
            first_name,
            last_name,
            email,
            password,
            role,
        } => {
            let registration = user::Registration {
                first_name,
                last_name,
                email,
                password,
                role,
            };
            client.create_user(&registration).await
        }
        UserCommand::SetRole { id, role } => {
            print(&client.update_user_role(id.into(), role).await?)
        }
    }
}

async fn requests(
    client: &Client,
    command: RequestCommand,
) -> Result<(), client::Error> {
    use RequestCommand as C;

    match command {
        C::Create {
            device_model,
            issue_type,
            problem_area,
            description,
            location,
        } => {
            let new = repair_request::New {
                device_model,
                issue_type,
                problem_area,
                description,
                location,
            };
            print(&client.create_repair_request(&new).await?)
        }
        C::Mine => print(&client.my_repair_requests().await?),
        C::List { status } => print(&client.repair_requests(status).await?),
        C::Assigned => print(&client.assigned_repair_requests().await?),
        C::Show { id } => print(&client.repair_request(id.into()).await?),
        C::Check { id } => {
            let request = client.repair_request(id.into()).await?;
            print(&client.check(&request).await?)
        }
        C::Reject { id } => {
            let request = client.repair_request(id.into()).await?;
            print(&client.reject(&request).await?)
        }
        C::Personalize {
            id,
            price,
            end_date,
            components,
        } => {
            let request = client.repair_request(id.into()).await?;
            let inventory = client.inventory().await?;
            let personalization = repair_request::Personalization {
                price,
                end_date,
                components,
            };
            print(
                &client
                    .personalize(&request, personalization, &inventory)
                    .await?,
            )
        }
        C::Start { id } => {
            let request = client.repair_request(id.into()).await?;
            print(&client.start(&request).await?)
        }
        C::Complete { id } => {
            let request = client.repair_request(id.into()).await?;
            print(&client.complete(&request).await?)
        }
    }
}

async fn components(
    client: &Client,
    command: ComponentCommand,
) -> Result<(), client::Error> {
    match command {
        ComponentCommand::List => print(&client.inventory().await?),
        ComponentCommand::Add {
            name,
            description,
            in_stock,
            price,
        } => {
            let new = component::New {
                name,
                description,
                in_stock,
                price,
            };
            print(&client.create_component(&new).await?)
        }
        ComponentCommand::Update {
            id,
            name,
            description,
            in_stock,
            price,
        } => {
            let update = component::Update {
                name,
                description,
                in_stock,
                price,
            };
            print(&client.update_component(id.into(), &update).await?)
        }
    }
}

fn print(value: &impl Serialize) -> Result<(), client::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Parses a value by its wire name, e.g. `in_progress`.
fn parse_wire<T: DeserializeOwned>(s: &str) -> Result<T, serde_json::Error> {
    serde_json::from_value(serde_json::Value::from(s))
}

fn parse_time(s: &str) -> Result<OffsetDateTime, time::error::Parse> {
    OffsetDateTime::parse(s, &Rfc3339)
}

fn parse_allocation(s: &str) -> Result<component::Allocation, String> {
    let (id, quantity) = s
        .split_once(':')
        .ok_or_else(|| format!("expected ID:QUANTITY, got `{s}`"))?;
    let id = id.parse::<i64>().map_err(|e| format!("bad id `{id}`: {e}"))?;
    let quantity = quantity
        .parse::<u32>()
        .map_err(|e| format!("bad quantity `{quantity}`: {e}"))?;
    Ok(component::Allocation {
        id: id.into(),
        quantity,
    })
}
