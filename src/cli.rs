//! Command-line interface parsing for the field-operations client
//!
//! This module handles parsing of CLI arguments using clap and turns the
//! global options into the [`Settings`] the application starts with.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use thiserror::Error;

use crate::api::DEFAULT_API_URL;
use crate::cache::CacheConfig;
use crate::services::labo::TestResultat;

/// Error types for CLI argument handling
#[derive(Debug, Error)]
pub enum CliError {
    /// The API URL is not an http(s) URL
    #[error("Invalid API URL: '{0}'. Expected an http:// or https:// URL")]
    InvalidApiUrl(String),

    /// A line typed in the shell could not be split into words
    #[error("Unterminated quote in: {0}")]
    UnterminatedQuote(String),
}

/// Field operations client - concentrator inventory for warehouse, bases and lab
#[derive(Parser, Debug)]
#[command(name = "fieldops")]
#[command(about = "Field operations inventory client for network concentrators")]
#[command(version)]
pub struct Cli {
    /// Base URL of the inventory API
    #[arg(long, env = "FIELDOPS_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Directory holding the stored session (defaults to the XDG data directory)
    #[arg(long, env = "FIELDOPS_SESSION_DIR", value_name = "DIR")]
    pub session_dir: Option<PathBuf>,

    /// TTL in seconds for rarely changing data (base names, operators)
    #[arg(long, env = "FIELDOPS_TTL_STATIC", value_name = "SECS")]
    pub ttl_static: Option<u64>,

    /// TTL in seconds for stats and info endpoints
    #[arg(long, env = "FIELDOPS_TTL_MEDIUM", value_name = "SECS")]
    pub ttl_medium: Option<u64>,

    /// TTL in seconds for frequently changing data (pending transfers)
    #[arg(long, env = "FIELDOPS_TTL_SHORT", value_name = "SECS")]
    pub ttl_short: Option<u64>,

    /// Print raw JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// One line typed in the interactive shell
#[derive(Parser, Debug)]
#[command(name = "fieldops>", no_binary_name = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Log in and store the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "FIELDOPS_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session and cached data
    Logout,
    /// Show the logged-in user
    Me,
    /// Field-base operations
    #[command(subcommand)]
    Bo(BoCommand),
    /// Concentrator inventory
    #[command(subcommand)]
    Concentrateurs(ConcentrateursCommand),
    /// Electrical substations
    #[command(subcommand)]
    Postes(PostesCommand),
    /// Warehouse operations
    #[command(subcommand)]
    Magasin(MagasinCommand),
    /// Warehouse-to-base transfers
    #[command(subcommand)]
    Transferts(TransfertsCommand),
    /// Lab operations
    #[command(subcommand)]
    Labo(LaboCommand),
    /// Global counters
    Dashboard,
    /// Movements you recorded
    Actions {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 100)]
        page_size: u32,
        /// Keep actions whose type, serial number or comment contains this
        #[arg(long)]
        search: Option<String>,
    },
    /// Interactive session sharing one cache across commands
    Shell,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum BoCommand {
    /// List all bases
    Liste,
    /// Stock counters for one base
    Stats { bo_name: String },
    /// Stock counters for every base
    Overview,
    /// Profile and counters of your base
    Info,
    /// Transfer requests of your base
    Demandes,
    /// Concentrators of your base
    Concentrateurs {
        #[arg(long)]
        etat: Option<String>,
    },
    /// Record an installation on site
    Pose(MovementArgs),
    /// Record a removal from site
    Depose(MovementArgs),
    /// Record the arrival of a delivered concentrator
    Reception { numero_serie: String },
    /// Ask the warehouse for concentrators
    Demande {
        quantite: u32,
        #[arg(long)]
        operateur: Option<String>,
    },
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct MovementArgs {
    pub numero_serie: String,
    #[arg(long)]
    pub commentaire: Option<String>,
    /// Photo as a data URL
    #[arg(long)]
    pub photo: Option<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ConcentrateursCommand {
    /// List concentrators
    List {
        #[arg(long)]
        affectation: Option<String>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        operateur: Option<String>,
        #[arg(long)]
        etat: Option<String>,
        #[arg(long)]
        skip: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Show one concentrator with its history
    Show { numero_serie: String },
    /// Check a scanned serial number
    Verify { numero_serie: String },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum PostesCommand {
    /// List substations
    List {
        #[arg(long = "bo")]
        bo_affectee: Option<String>,
        /// Only substations with coordinates
        #[arg(long)]
        with_coords: bool,
    },
    /// Show one substation
    Show { id_poste: i64 },
    /// Concentrators installed at a substation
    Concentrateurs { id_poste: i64 },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum MagasinCommand {
    /// Warehouse stock counters
    Stats,
    /// Known operators
    Operateurs,
    /// Register a received carton
    Reception {
        #[arg(long)]
        carton: String,
        #[arg(long)]
        operateur: String,
        #[arg(long)]
        modele: Option<String>,
        /// Serial numbers of the concentrators in the carton
        #[arg(required = true)]
        numeros_serie: Vec<String>,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum TransfertsCommand {
    /// Transfer orders
    Commandes {
        #[arg(long)]
        statut: Option<String>,
    },
    /// Cartons ready to ship
    Cartons,
    /// Fulfil an order with a carton
    Valider { id_commande: i64, numero_carton: String },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum LaboCommand {
    /// Record a diagnostic result (reparable, hs)
    Test {
        numero_serie: String,
        resultat: TestResultat,
        #[arg(long)]
        commentaire: Option<String>,
    },
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_url: String,
    pub session_dir: Option<PathBuf>,
    pub cache: CacheConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            session_dir: None,
            cache: CacheConfig::default(),
        }
    }
}

impl Settings {
    /// Creates Settings from parsed CLI arguments.
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let api_url = cli.api_url.trim();
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(CliError::InvalidApiUrl(api_url.to_string()));
        }

        let mut cache = CacheConfig::default();
        if let Some(secs) = cli.ttl_static {
            cache.static_ttl = Duration::from_secs(secs);
        }
        if let Some(secs) = cli.ttl_medium {
            cache.medium_ttl = Duration::from_secs(secs);
        }
        if let Some(secs) = cli.ttl_short {
            cache.short_ttl = Duration::from_secs(secs);
        }

        Ok(Settings {
            api_url: api_url.to_string(),
            session_dir: cli.session_dir.clone(),
            cache,
        })
    }
}

/// Splits a shell line into words, honouring single and double quotes.
pub fn split_words(line: &str) -> Result<Vec<String>, CliError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        return Err(CliError::UnterminatedQuote(line.to_string()));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_bo_stats() {
        let cli = Cli::parse_from(["fieldops", "bo", "stats", "Nord"]);
        assert_eq!(
            cli.command,
            Command::Bo(BoCommand::Stats {
                bo_name: "Nord".to_string()
            })
        );
        assert!(!cli.json);
    }

    #[test]
    fn test_cli_parse_pose_with_comment() {
        let cli = Cli::parse_from([
            "fieldops",
            "bo",
            "pose",
            "C-001",
            "--commentaire",
            "poste 12",
        ]);
        match cli.command {
            Command::Bo(BoCommand::Pose(args)) => {
                assert_eq!(args.numero_serie, "C-001");
                assert_eq!(args.commentaire.as_deref(), Some("poste 12"));
                assert!(args.photo.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_parse_labo_resultat() {
        let cli = Cli::parse_from(["fieldops", "labo", "test", "C-001", "hs"]);
        assert_eq!(
            cli.command,
            Command::Labo(LaboCommand::Test {
                numero_serie: "C-001".to_string(),
                resultat: TestResultat::Hs,
                commentaire: None,
            })
        );
    }

    #[test]
    fn test_cli_rejects_unknown_resultat() {
        let result = Cli::try_parse_from(["fieldops", "labo", "test", "C-001", "broken"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_magasin_reception_requires_serials() {
        let result = Cli::try_parse_from([
            "fieldops",
            "magasin",
            "reception",
            "--carton",
            "CT-9",
            "--operateur",
            "Enedis",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parse_actions_defaults() {
        let cli = Cli::parse_from(["fieldops", "actions", "--search", "pose"]);
        assert_eq!(
            cli.command,
            Command::Actions {
                page: 1,
                page_size: 100,
                search: Some("pose".to_string()),
            }
        );
    }

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert_eq!(settings.api_url, DEFAULT_API_URL);
        assert!(settings.session_dir.is_none());
        assert_eq!(settings.cache.short_ttl, Duration::from_secs(30));
    }

    #[test]
    fn test_settings_from_cli_applies_ttl_overrides() {
        let cli = Cli::parse_from([
            "fieldops",
            "--api-url",
            "https://inventaire.example.com/api/v1",
            "--ttl-short",
            "5",
            "dashboard",
        ]);
        let settings = Settings::from_cli(&cli).unwrap();

        assert_eq!(settings.api_url, "https://inventaire.example.com/api/v1");
        assert_eq!(settings.cache.short_ttl, Duration::from_secs(5));
        assert_eq!(settings.cache.medium_ttl, CacheConfig::default().medium_ttl);
    }

    #[test]
    fn test_settings_from_cli_rejects_bad_url() {
        let cli = Cli::parse_from(["fieldops", "--api-url", "ftp://nope", "dashboard"]);
        let err = Settings::from_cli(&cli).unwrap_err();
        assert!(err.to_string().contains("Invalid API URL"));
    }

    #[test]
    fn test_shell_line_parses_without_binary_name() {
        let line = ShellLine::try_parse_from(["transferts", "commandes", "--statut", "en_attente"])
            .unwrap();
        assert_eq!(
            line.command,
            Command::Transferts(TransfertsCommand::Commandes {
                statut: Some("en_attente".to_string())
            })
        );
    }

    #[test]
    fn test_split_words_honours_quotes() {
        let words = split_words(r#"bo pose C-001 --commentaire "poste 12 nord""#).unwrap();
        assert_eq!(
            words,
            vec!["bo", "pose", "C-001", "--commentaire", "poste 12 nord"]
        );
    }

    #[test]
    fn test_split_words_empty_quotes_make_empty_word() {
        assert_eq!(split_words("a '' b").unwrap(), vec!["a", "", "b"]);
    }

    #[test]
    fn test_split_words_unterminated_quote() {
        assert!(split_words("bo stats 'Nord").is_err());
    }
}
