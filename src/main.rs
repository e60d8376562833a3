// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Lessonmap CLI entrypoint.
//!
//! Reads configuration from the environment, applies command-line overrides and serves the HTTP
//! API until Ctrl-C.

use std::error::Error;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use lessonmap::auth::{AuthService, LogMailer, OtpPolicy, TokenService};
use lessonmap::config::Config;
use lessonmap::provider::OpenRouter;
use lessonmap::relay::Framing;
use lessonmap::server::{AppState, ServerSettings};
use lessonmap::store::{DocumentStore, FolderStore, MemoryStore, WriteDurability};

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [--bind <addr>] [--data-dir <dir> | --memory] [--durable-writes]\n      [--stream-newlines] [--log-level <level>] [--log-format <compact|pretty|json>]\n\nConfiguration is read from the environment (JWT_SECRET is required; see the config module\nfor the full list). Flags override the matching variables.\n\n--memory keeps documents in memory even when LESSONMAP_DATA_DIR is set.\n--durable-writes opts into slower, best-effort durable persistence (fsync/sync where supported).\n--stream-newlines appends a newline to every streamed fragment."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    help: bool,
    bind: Option<SocketAddr>,
    data_dir: Option<PathBuf>,
    memory: bool,
    durable_writes: bool,
    stream_newlines: bool,
    log_level: Option<String>,
    log_format: Option<String>,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => options.help = true,
            "--bind" => {
                if options.bind.is_some() {
                    return Err(());
                }
                let raw = args.next().ok_or(())?;
                options.bind = Some(raw.parse().map_err(|_| ())?);
            }
            "--data-dir" => {
                if options.data_dir.is_some() {
                    return Err(());
                }
                options.data_dir = Some(PathBuf::from(args.next().ok_or(())?));
            }
            "--memory" => {
                if options.memory {
                    return Err(());
                }
                options.memory = true;
            }
            "--durable-writes" => {
                if options.durable_writes {
                    return Err(());
                }
                options.durable_writes = true;
            }
            "--stream-newlines" => {
                if options.stream_newlines {
                    return Err(());
                }
                options.stream_newlines = true;
            }
            "--log-level" => {
                if options.log_level.is_some() {
                    return Err(());
                }
                options.log_level = Some(args.next().ok_or(())?);
            }
            "--log-format" => {
                if options.log_format.is_some() {
                    return Err(());
                }
                options.log_format = Some(args.next().ok_or(())?);
            }
            _ => return Err(()),
        }
    }

    if options.memory && options.data_dir.is_some() {
        return Err(());
    }

    Ok(options)
}

impl CliOptions {
    fn apply(&self, config: &mut Config) {
        if let Some(bind) = self.bind {
            config.bind = bind;
        }
        if self.memory {
            config.data_dir = None;
        } else if let Some(dir) = &self.data_dir {
            config.data_dir = Some(dir.clone());
        }
        if self.durable_writes {
            config.durability = WriteDurability::Durable;
        }
        if self.stream_newlines {
            config.framing = Framing::NewlinePerFragment;
        }
    }
}

async fn run(config: Config) -> Result<(), Box<dyn Error>> {
    let store: Arc<dyn DocumentStore> = match &config.data_dir {
        Some(dir) => {
            tracing::info!(
                dir = %dir.display(),
                durability = ?config.durability,
                "using folder store"
            );
            Arc::new(FolderStore::open(dir, config.durability).await?)
        }
        None => {
            tracing::warn!("no data directory configured; documents are kept in memory");
            Arc::new(MemoryStore::new())
        }
    };

    let api_key = config.openrouter_api_key.clone().unwrap_or_else(|| {
        tracing::warn!(
            "OPENROUTER_API_KEY is not set; generation requests will be rejected upstream"
        );
        String::new()
    });
    let provider = OpenRouter::new(api_key).base_url(config.openrouter_base_url.as_str());

    let auth = AuthService::new(
        OtpPolicy {
            ttl: config.otp_ttl,
            capacity: config.otp_capacity,
            ..OtpPolicy::default()
        },
        TokenService::new(&config.jwt_secret, config.token_ttl),
        Arc::new(LogMailer),
    );

    let state = AppState {
        store,
        provider: Arc::new(provider),
        auth: Arc::new(auth),
        settings: Arc::new(ServerSettings {
            default_model: config.default_model.clone(),
            framing: config.framing,
        }),
    };

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    lessonmap::server::serve(listener, state, async {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown requested");
        }
    })
    .await?;
    Ok(())
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "lessonmap".to_owned());

        let options = match parse_options(args) {
            Ok(options) if options.help => {
                print_usage(&program);
                return Ok(());
            }
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        lessonmap::logging::init_logging(
            options.log_level.as_deref(),
            options.log_format.as_deref(),
        )?;

        let mut config = Config::from_env()?;
        options.apply(&mut config);
        tracing::debug!(?config, "configuration loaded");

        let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
        runtime.block_on(run(config))
    })();

    if let Err(err) = result {
        eprintln!("lessonmap: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_options, CliOptions};

    fn args(raw: &[&str]) -> impl Iterator<Item = String> {
        raw.iter().map(|s| (*s).to_owned()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn parses_empty_args() {
        let options = parse_options(std::iter::empty()).expect("parse options");
        assert_eq!(options, CliOptions::default());
    }

    #[test]
    fn parses_bind_and_data_dir() {
        let options = parse_options(args(&["--bind", "0.0.0.0:9000", "--data-dir", "data"]))
            .expect("parse options");
        assert_eq!(options.bind.map(|addr| addr.port()), Some(9000));
        assert_eq!(options.data_dir.as_deref(), Some(std::path::Path::new("data")));
        assert!(!options.memory);
    }

    #[test]
    fn parses_switches() {
        let options = parse_options(args(&["--durable-writes", "--stream-newlines", "--memory"]))
            .expect("parse options");
        assert!(options.durable_writes);
        assert!(options.stream_newlines);
        assert!(options.memory);
    }

    #[test]
    fn parses_logging_flags() {
        let options = parse_options(args(&["--log-level", "debug", "--log-format", "json"]))
            .expect("parse options");
        assert_eq!(options.log_level.as_deref(), Some("debug"));
        assert_eq!(options.log_format.as_deref(), Some("json"));
    }

    #[test]
    fn help_flag_is_recognized() {
        assert!(parse_options(args(&["--help"])).expect("parse options").help);
    }

    #[test]
    fn rejects_bad_input() {
        parse_options(args(&["--bind"])).unwrap_err();
        parse_options(args(&["--bind", "not-an-addr"])).unwrap_err();
        parse_options(args(&["--memory", "--memory"])).unwrap_err();
        parse_options(args(&["--memory", "--data-dir", "x"])).unwrap_err();
        parse_options(args(&["positional"])).unwrap_err();
    }
}
