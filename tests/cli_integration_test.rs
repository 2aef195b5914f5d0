//! CLI integration tests: argument parsing, config loading, listen address
//! resolution and store selection.

use clap::Parser;
use pricetrend::adapters::file_config_adapter::FileConfigAdapter;
use pricetrend::cli::{self, Cli, Command, DEFAULT_LISTEN};
use pricetrend::domain::error::PriceTrendError;
use pricetrend::ports::document_port::DocumentPort;
use std::io::Write;
use std::path::PathBuf;

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const VALID_INI: &str = r#"
[server]
listen = 0.0.0.0:8080

[store]
backend = sqlite

[sqlite]
data_dir = /tmp/pricetrend-test
pool_size = 2
"#;

mod argument_parsing {
    use super::*;

    #[test]
    fn serve_takes_database_and_options() {
        let cli = Cli::try_parse_from([
            "pricetrend",
            "serve",
            "market",
            "--config",
            "app.ini",
            "--listen",
            "0.0.0.0:9000",
        ])
        .unwrap();

        match cli.command {
            Command::Serve {
                database,
                config,
                listen,
            } => {
                assert_eq!(database, "market");
                assert_eq!(config, Some(PathBuf::from("app.ini")));
                assert_eq!(listen.as_deref(), Some("0.0.0.0:9000"));
            }
            other => panic!("expected serve, got {other:?}"),
        }
    }

    #[test]
    fn serve_short_flags() {
        let cli = Cli::try_parse_from([
            "pricetrend",
            "serve",
            "market",
            "-c",
            "a.ini",
            "-l",
            "127.0.0.1:1",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Command::Serve { config: Some(_), listen: Some(_), .. }
        ));
    }

    #[test]
    fn serve_requires_database() {
        assert!(Cli::try_parse_from(["pricetrend", "serve"]).is_err());
    }

    #[test]
    fn collections_subcommand() {
        let cli = Cli::try_parse_from(["pricetrend", "collections", "market"]).unwrap();
        match cli.command {
            Command::Collections { database, config } => {
                assert_eq!(database, "market");
                assert!(config.is_none());
            }
            other => panic!("expected collections, got {other:?}"),
        }
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["pricetrend"]).is_err());
    }
}

mod config_loading {
    use super::*;

    #[test]
    fn no_path_gives_empty_config() {
        let config = cli::load_config(None).unwrap();
        let addr = cli::resolve_listen_addr(None, &config).unwrap();
        assert_eq!(addr.to_string(), DEFAULT_LISTEN);
    }

    #[test]
    fn missing_file_is_config_parse_error() {
        let path = PathBuf::from("/nonexistent/pricetrend.ini");
        let err = cli::load_config(Some(&path)).err().unwrap();
        assert!(matches!(err, PriceTrendError::ConfigParse { .. }));
    }

    #[test]
    fn file_values_are_read() {
        let file = write_temp_ini(VALID_INI);
        let path = file.path().to_path_buf();
        let config = cli::load_config(Some(&path)).unwrap();
        let addr = cli::resolve_listen_addr(None, &config).unwrap();
        assert_eq!(addr.to_string(), "0.0.0.0:8080");
    }
}

mod listen_address {
    use super::*;

    #[test]
    fn flag_overrides_config() {
        let config = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let addr = cli::resolve_listen_addr(Some("127.0.0.1:7000"), &config).unwrap();
        assert_eq!(addr.to_string(), "127.0.0.1:7000");
    }

    #[test]
    fn unparsable_address_is_config_invalid() {
        let config =
            FileConfigAdapter::from_string("[server]\nlisten = not-an-address\n").unwrap();
        let err = cli::resolve_listen_addr(None, &config).unwrap_err();
        match err {
            PriceTrendError::ConfigInvalid { section, key, .. } => {
                assert_eq!(section, "server");
                assert_eq!(key, "listen");
            }
            other => panic!("expected ConfigInvalid, got {other:?}"),
        }
    }
}

mod store_selection {
    use super::*;

    #[test]
    fn invalid_database_name_is_rejected() {
        let config = FileConfigAdapter::empty();
        let too_long = "x".repeat(64);
        for name in ["", "has space", "../escape", too_long.as_str()] {
            let Err(err) = cli::build_document_store(&config, name) else {
                panic!("{name:?} should be rejected");
            };
            assert!(
                matches!(err, PriceTrendError::InvalidDatabaseName { .. }),
                "{name:?}"
            );
        }
    }

    #[test]
    fn unknown_backend_is_config_invalid() {
        let config = FileConfigAdapter::from_string("[store]\nbackend = mongodb\n").unwrap();
        let Err(err) = cli::build_document_store(&config, "market") else {
            panic!("unknown backend should be rejected");
        };
        match err {
            PriceTrendError::ConfigInvalid { section, key, reason } => {
                assert_eq!(section, "store");
                assert_eq!(key, "backend");
                assert!(reason.contains("mongodb"));
            }
            other => panic!("expected ConfigInvalid, got {other:?}"),
        }
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn sqlite_is_the_default_backend() {
        let dir = tempfile::TempDir::new().unwrap();
        let ini = format!("[sqlite]\ndata_dir = {}\n", dir.path().display());
        let config = FileConfigAdapter::from_string(&ini).unwrap();
        let store = cli::build_document_store(&config, "market").ok().unwrap();
        assert_eq!(store.database(), "market");
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn zero_pool_size_is_config_invalid() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = FileConfigAdapter::from_string(&format!(
            "[sqlite]\ndata_dir = {}\npool_size = 0\n",
            dir.path().display()
        ))
        .unwrap();
        let Err(err) = cli::build_document_store(&config, "market") else {
            panic!("pool_size 0 should be rejected");
        };
        assert!(matches!(err, PriceTrendError::ConfigInvalid { .. }));
    }

    #[test]
    fn error_exit_codes() {
        use std::process::ExitCode;
        let config_err = PriceTrendError::ConfigInvalid {
            section: "store".into(),
            key: "backend".into(),
            reason: "x".into(),
        };
        let db_err = PriceTrendError::Database {
            reason: "down".into(),
        };
        assert_eq!(ExitCode::from(&config_err), ExitCode::from(2));
        assert_eq!(ExitCode::from(&db_err), ExitCode::from(3));
    }
}
