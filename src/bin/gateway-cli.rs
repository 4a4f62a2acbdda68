use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use admin_gateway::client::filter::{filter_requests, filter_users};
use admin_gateway::client::types::{Role, UserStatus, UserUpdate};
use admin_gateway::client::AdminClient;

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Management CLI for the admin gateway", long_about = None)]
struct Cli {
    /// Gateway API root.
    #[arg(short, long, default_value = "http://localhost:3000/api")]
    url: String,

    /// Session cookie issued by the upstream, e.g. "access_token=...".
    #[arg(short, long, env = "GATEWAY_COOKIE")]
    cookie: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registration requests
    Requests {
        /// Status to ask the upstream for (e.g. PENDING)
        #[arg(long)]
        status: Option<String>,
        /// Search email or IP
        #[arg(long, default_value = "")]
        search: String,
    },
    /// Approve a registration request
    Approve { id: String },
    /// Reject a registration request
    Reject { id: String },
    /// List users
    Users {
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
        /// Search email or IP
        #[arg(long, default_value = "")]
        search: String,
    },
    /// Change a user's status and/or role
    UpdateUser {
        id: String,
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
        #[arg(long, value_enum)]
        role: Option<RoleArg>,
    },
    /// Show the signed-in account
    Me,
    /// Refresh the session
    Refresh,
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    Active,
    Pending,
    Blocked,
}

impl From<StatusArg> for UserStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Active => UserStatus::Active,
            StatusArg::Pending => UserStatus::Pending,
            StatusArg::Blocked => UserStatus::Blocked,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    User,
    Admin,
}

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::User => Role::User,
            RoleArg::Admin => Role::Admin,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = AdminClient::new(&cli.url, cli.cookie.as_deref())?;

    let result = match cli.command {
        Commands::Requests { status, search } => client
            .registration_requests(status.as_deref())
            .await
            .map(|items| print_json(&filter_requests(&items, status.as_deref(), &search))),
        Commands::Approve { id } => client.approve(&id).await.map(|v| print_json(&v)),
        Commands::Reject { id } => client.reject(&id).await.map(|v| print_json(&v)),
        Commands::Users { status, search } => client
            .users()
            .await
            .map(|items| print_json(&filter_users(&items, status.map(Into::into), &search))),
        Commands::UpdateUser { id, status, role } => {
            let update = UserUpdate {
                status: status.map(Into::into),
                role: role.map(Into::into),
            };
            if update.is_empty() {
                eprintln!("Error: nothing to update (pass --status and/or --role)");
                std::process::exit(2);
            }
            client
                .update_user(&id, &update)
                .await
                .map(|v| print_json(&v.user))
        }
        Commands::Me => client.me().await.map(|v| print_json(&v)),
        Commands::Refresh => client.refresh().await.map(|v| print_json(&v)),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("Error: failed to render response: {}", e),
    }
}
