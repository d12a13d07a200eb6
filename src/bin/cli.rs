use toybank::{Ledger, Dashboard, BankError, UserSummary,
    backend::JsonStore,
    config::AppConfig,
    ledger::parse_amount,
    stego};

use std::{fs, path::PathBuf, process};
use anyhow::Context;
use colored::Colorize;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[clap(version, about, propagate_version = true)]
struct Cli {
    /// Configuration file (defaults to resources/bank.toml when present)
    #[clap(short, long, value_parser)]
    config: Option<PathBuf>,

    /// Profile file to operate on, overriding the configured one
    #[clap(short, long, value_parser)]
    profile: Option<PathBuf>,

    /// Verbose mode (-v, -vv, -vvv)
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Action to perform
    #[clap(subcommand)]
    action: Subcommands,
}

#[derive(Debug, Subcommand)]
enum Subcommands {
    /// Open a new account and log into it
    Register(Register),
    /// Log into an existing account
    Login(Login),
    /// End the current session
    Logout,
    /// Show who is logged in
    Whoami,
    /// Show balance and transaction history of the logged in account
    Dashboard,
    /// Send money from the logged in account
    Transfer(Transfer),
    /// List every account with its balance
    Admin(Admin),
    /// Hide a message in a text file using zero-width characters
    Hide(Hide),
    /// Recover a message hidden with `hide`
    Reveal(Reveal)
}

#[derive(Args, Debug)]
struct Register {
    #[clap(value_parser)]
    username: String,

    #[clap(short, long, value_parser)]
    password: String,

    /// Repeat the password
    #[clap(short='c', long, value_parser)]
    confirm: String
}

#[derive(Args, Debug)]
struct Login {
    #[clap(value_parser)]
    username: String,

    #[clap(short, long, value_parser)]
    password: String
}

#[derive(Args, Debug)]
struct Transfer {
    /// Name of user that gets paid
    #[clap(short='t', long, value_parser)]
    to: String,

    #[clap(short='a', long, value_parser, allow_hyphen_values = true)]
    amount: String
}

#[derive(Args, Debug)]
struct Admin {
    /// Admin password
    #[clap(short, long, value_parser)]
    password: String
}

#[derive(Args, Debug)]
struct Hide {
    /// Text file to hide the message in
    #[clap(long, value_parser)]
    cover: PathBuf,

    #[clap(short, long, value_parser)]
    message: String,

    /// Shuffle seed, defaults to the current time
    #[clap(short, long, value_parser)]
    seed: Option<u16>,

    /// Where to write the result, stdout if omitted
    #[clap(short, long, value_parser)]
    out: Option<PathBuf>
}

#[derive(Args, Debug)]
struct Reveal {
    #[clap(value_parser)]
    path: PathBuf
}

fn colored_amount(amount: f64) -> colored::ColoredString {
    let color = if amount < 0.0 {
        colored::ColoredString::bright_red
    } else if amount > 0.0 {
        colored::ColoredString::green
    } else {
        colored::ColoredString::normal
    };
    color(format!("{}", amount).white())
}

fn print_dashboard(dashboard: &Dashboard) {
    println!("{} {}", "Welcome,".bold(), dashboard.username.bold());
    println!("Balance: {}", colored_amount(dashboard.balance));
    for t in dashboard.transactions.iter().rev() {
        println!("  {}", t);
    }
}

fn print_balances(listing: &[UserSummary]) {
    for row in listing {
        println!("{}: {}", row.username, colored_amount(row.balance));
    }
}

impl Hide {
    fn run(&self) -> anyhow::Result<()> {
        let cover = fs::read_to_string(&self.cover)
            .with_context(|| format!("failed to read {}", self.cover.display()))?;
        let seed = self.seed.unwrap_or_else(|| (chrono::Utc::now().timestamp() & 0xFFFF) as u16);
        let hidden = stego::hide_verified(&cover, &self.message, seed)?;

        match &self.out {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(path, &hidden)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                println!("Hidden text written to: {}", path.display());
                println!("Recovered message: {}", stego::reveal(&hidden)?);
            },
            None => {
                print!("{}", hidden);
                eprintln!("Recovered message: {}", stego::reveal(&hidden)?);
            }
        }
        Ok(())
    }
}

fn run(args: Cli) -> anyhow::Result<()> {
    let config = AppConfig::load(args.config.as_deref())?;
    let profile = args.profile.unwrap_or_else(|| config.storage.profile.clone());
    let mut ledger = Ledger::with_opening_balance(JsonStore::new(&profile), config.opening_balance())?;

    match args.action {
        Subcommands::Register(form) => {
            let deposit = ledger.register(&form.username, &form.password, &form.confirm)?;
            println!("Welcome {}, your account opened with {}", form.username, colored_amount(deposit));
        },
        Subcommands::Login(form) => {
            ledger.login(&form.username, &form.password)?;
            println!("Logged in as {}", form.username);
        },
        Subcommands::Logout => {
            ledger.logout()?;
            println!("Logged out");
        },
        Subcommands::Whoami => {
            match ledger.current_user()? {
                Some(username) => println!("{}", username),
                None => println!("{}", "anonymous".dimmed())
            }
        },
        Subcommands::Dashboard => {
            match ledger.dashboard() {
                Ok(dashboard) => print_dashboard(&dashboard),
                Err(BankError::NotAuthenticated) => {
                    anyhow::bail!("not logged in, use `login` or `register` first")
                },
                Err(err) => return Err(err.into())
            }
        },
        Subcommands::Transfer(form) => {
            let amount = parse_amount(&form.amount)?;
            ledger.transfer_from_session(&form.to, amount)?;
            println!("Sent {} to {}", amount, form.to);
        },
        Subcommands::Admin(form) => {
            let mut gate = config.admin_gate()?;
            gate.unlock(&form.password)?;
            print_balances(&ledger.list_all_users(&gate)?);
            gate.logout();
        },
        Subcommands::Hide(hide) => hide.run()?,
        Subcommands::Reveal(reveal) => {
            let text = fs::read_to_string(&reveal.path)
                .with_context(|| format!("failed to read {}", reveal.path.display()))?;
            println!("{}", stego::reveal(&text)?);
        }
    }
    Ok(())
}

fn main() {
    let args = Cli::parse();

    let level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(err) = run(args) {
        eprintln!("{}", format!("{:#}", err).bright_red());
        process::exit(1);
    }
}
