//! CLI for creating and checking Argon2 password hashes.
//!
//! ## Usage
//!
//! ```bash
//! # Hash a password with the default parameters
//! a2pw hash "mysecret"
//! echo "mysecret" | a2pw hash -
//!
//! # Verify a password against a stored hash (exit 0 = match, 1 = mismatch)
//! a2pw verify 'argon2id$1$65536$4$32$...$...' "mysecret"
//!
//! # Show the parameters of a stored hash
//! a2pw inspect 'argon2$4$32768$4$32$...$...'
//!
//! # Generate shell completions
//! source <(COMPLETE=bash a2pw)
//! ```

use std::io::{self, IsTerminal, Read};
use std::process::ExitCode;

use clap::{ArgAction, Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use argon2pw::salt::DEFAULT_SALT_LEN;
use argon2pw::{
    AlgorithmRegistry, DEFAULT_KEY_LEN, DEFAULT_MEMORY_COST_KIB, DEFAULT_TIME_COST, HashParams,
    HashRecord, PasswordHashError, PasswordHasher, PasswordVerifier,
};

/// Create and check salted Argon2 password hashes
#[derive(Parser)]
#[command(name = "a2pw", version, about, long_about = None)]
#[command(after_help = AFTER_HELP)]
struct Cli {
    /// Increase log verbosity on stderr (-v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Hash a password with a fresh random salt
    Hash {
        /// Password to hash ("-" or omitted to read stdin)
        #[arg(value_name = "PASSWORD")]
        password: Option<String>,

        #[command(flatten)]
        cost: CostArgs,
    },

    /// Check a password against a stored hash
    Verify {
        /// Stored hash
        #[arg(value_name = "HASH")]
        hash: String,

        /// Candidate password ("-" or omitted to read stdin)
        #[arg(value_name = "PASSWORD")]
        password: Option<String>,
    },

    /// Show the algorithm and parameters recorded in a stored hash
    Inspect {
        /// Stored hash
        #[arg(value_name = "HASH")]
        hash: String,

        #[command(flatten)]
        cost: CostArgs,
    },
}

/// Cost parameters for new hashes.
#[derive(Debug, Args)]
struct CostArgs {
    /// Number of passes over memory
    #[arg(long, value_name = "N", default_value_t = DEFAULT_TIME_COST)]
    time_cost: u32,

    /// Memory cost in KiB
    #[arg(long, value_name = "KIB", default_value_t = DEFAULT_MEMORY_COST_KIB)]
    memory_cost: u32,

    /// Number of lanes [default: available CPUs, at most 255]
    #[arg(long, value_name = "N")]
    parallelism: Option<u32>,

    /// Derived key length in bytes
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_KEY_LEN)]
    key_length: u32,

    /// Salt length in bytes
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_SALT_LEN)]
    salt_length: usize,
}

impl CostArgs {
    fn hasher(&self) -> PasswordHasher {
        let parallelism = self
            .parallelism
            .unwrap_or_else(|| HashParams::for_host().parallelism);
        let params = HashParams::new(
            self.time_cost,
            self.memory_cost,
            parallelism,
            self.key_length,
        );
        debug!(?params, salt_length = self.salt_length, "resolved cost parameters");
        PasswordHasher::new(params).with_salt_length(self.salt_length)
    }
}

#[derive(Debug, Error)]
enum CliError {
    #[error("{0}")]
    Input(String),

    #[error("failed to read from stdin: {0}")]
    Stdin(#[from] io::Error),

    #[error(transparent)]
    Hash(#[from] PasswordHashError),
}

const AFTER_HELP: &str = "\
EXIT STATUS:
  0  success, or the password matched
  1  the password did not match
  2  any other error (malformed hash, unsupported algorithm, bad input)

SHELL COMPLETIONS:
  Bash (~/.bashrc):
    source <(COMPLETE=bash a2pw)

  Zsh (~/.zshrc):
    source <(COMPLETE=zsh a2pw)

  Fish (~/.config/fish/config.fish):
    COMPLETE=fish a2pw | source

EXAMPLES:
  a2pw hash \"secret\"                      # Argon2id hash, default cost
  a2pw hash --memory-cost 19456 \"secret\"  # Custom memory cost
  echo \"secret\" | a2pw hash -             # Password from stdin
  a2pw verify \"$HASH\" \"secret\"            # Exit 0 on match, 1 on mismatch
  a2pw inspect \"$HASH\"                    # Show stored parameters
";

fn main() -> ExitCode {
    // Check for shell completion generation before parsing args
    if let Ok(shell_name) = std::env::var("COMPLETE") {
        return generate_completions(&shell_name);
    }

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let Some(command) = cli.command else {
        let _ = Cli::command().print_help();
        println!();
        return ExitCode::SUCCESS;
    };

    match run(command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Hash(PasswordHashError::Mismatch)) => {
            println!("mismatch");
            ExitCode::from(1)
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(2)
        }
    }
}

fn run(command: Command) -> Result<(), CliError> {
    match command {
        Command::Hash { password, cost } => {
            let password = resolve_password(password.as_deref())?;
            let hash = cost.hasher().hash(&password)?;
            println!("{hash}");
        }
        Command::Verify { hash, password } => {
            let password = resolve_password(password.as_deref())?;
            PasswordVerifier::default().verify(hash.trim(), &password)?;
            println!("match");
        }
        Command::Inspect { hash, cost } => {
            let hash = hash.trim();
            let record: HashRecord = hash.parse()?;
            let supported = AlgorithmRegistry::default().contains(record.algorithm_tag());
            let needs_rehash = cost.hasher().needs_rehash(hash)?;

            println!("algorithm:    {}", record.algorithm_tag());
            println!("supported:    {}", yes_no(supported));
            println!("time cost:    {}", record.time_cost());
            println!("memory cost:  {} KiB", record.memory_cost());
            println!("parallelism:  {}", record.parallelism());
            println!("key length:   {}", record.key_length());
            println!("salt bytes:   {}", record.salt().len());
            println!("key bytes:    {}", record.derived_key().len());
            println!("needs rehash: {}", yes_no(needs_rehash));
        }
    }
    Ok(())
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

/// Get the password from the positional arg or stdin.
fn resolve_password(arg: Option<&str>) -> Result<String, CliError> {
    match arg {
        Some("-") => read_from_stdin(),
        Some(password) => Ok(password.to_string()),
        None if !io::stdin().is_terminal() => read_from_stdin(),
        None => Err(CliError::Input(
            "No password provided. Pass it as an argument or pipe it to stdin.".into(),
        )),
    }
}

/// Read a password from stdin, dropping one trailing line ending.
fn read_from_stdin() -> Result<String, CliError> {
    let mut content = String::new();
    io::stdin().read_to_string(&mut content)?;

    if content.ends_with('\n') {
        content.pop();
        if content.ends_with('\r') {
            content.pop();
        }
    }

    Ok(content)
}

/// Initialize the stderr subscriber from `RUST_LOG` or the verbosity count.
fn init_tracing(verbose: u8) {
    let base_filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            0 => "warn".to_string(),
            1 => "warn,argon2pw=debug".to_string(),
            _ => "debug,argon2pw=trace".to_string(),
        },
    };

    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .compact()
        .init();
}

/// Generate shell completions.
fn generate_completions(shell_name: &str) -> ExitCode {
    let shell = match shell_name.to_lowercase().as_str() {
        "bash" => Shell::Bash,
        "zsh" => Shell::Zsh,
        "fish" => Shell::Fish,
        "powershell" => Shell::PowerShell,
        "elvish" => Shell::Elvish,
        _ => {
            eprintln!(
                "Unknown shell: {shell_name}. Supported: bash, zsh, fish, powershell, elvish"
            );
            return ExitCode::from(2);
        }
    };

    clap_complete::generate(shell, &mut Cli::command(), "a2pw", &mut io::stdout());
    ExitCode::SUCCESS
}
