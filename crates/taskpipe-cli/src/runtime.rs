//! Assembles the mutation pipeline and caller identity for one invocation.

use std::env;
use std::path::PathBuf;

use anyhow::{Context as _, Result, anyhow};
use taskpipe_core::config::{self, ServiceConfig};
use taskpipe_core::model::UserId;
use taskpipe_core::pipeline::Pipeline;
use taskpipe_store::{JsonlEventBus, SqliteRepository, SqliteStateStore};

/// Environment variable supplying the user id when `--user` is not passed.
pub const USER_ENV: &str = "TASKPIPE_USER";

/// The pipeline as wired for CLI use: SQLite primary store, JSONL event
/// log, SQLite key-value sink.
pub type CliPipeline = Pipeline<SqliteRepository, JsonlEventBus, SqliteStateStore>;

/// Everything a command handler needs: the pipeline plus resolved caller
/// identities.
pub struct Ctx {
    pub pipeline: CliPipeline,
    /// Who is making the call.
    pub actor: UserId,
    /// Whose todo list is being addressed.
    pub owner: UserId,
}

impl Ctx {
    /// Resolve identities, load config, and open the backing stores.
    ///
    /// # Errors
    ///
    /// Returns an error if no user id can be resolved, an id fails to
    /// parse, or a backing store cannot be opened.
    pub fn open(
        data_dir_flag: Option<PathBuf>,
        user_flag: Option<&str>,
        actor_flag: Option<&str>,
    ) -> Result<Self> {
        let owner = resolve_user(user_flag)?;
        let actor = match actor_flag {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("invalid --actor value '{raw}'"))?,
            None => owner,
        };

        let data_dir = config::resolve_data_dir(data_dir_flag)?;
        let cfg = config::load(&data_dir)?;

        let repo = SqliteRepository::open(
            &ServiceConfig::primary_db_path(&data_dir),
            cfg.store.busy_timeout(),
        )?;
        let bus = JsonlEventBus::new(cfg.events_log_path(&data_dir), cfg.bus.lock_timeout());
        let sink = SqliteStateStore::open(
            &ServiceConfig::state_db_path(&data_dir),
            cfg.store.busy_timeout(),
        )?;

        Ok(Self {
            pipeline: Pipeline::new(repo, bus, sink),
            actor,
            owner,
        })
    }
}

/// Resolve the addressed user: `--user` flag, then `TASKPIPE_USER`.
fn resolve_user(flag: Option<&str>) -> Result<UserId> {
    let raw = match flag {
        Some(raw) => raw.to_string(),
        None => env::var(USER_ENV)
            .map_err(|_| anyhow!("no user id: pass --user or set {USER_ENV}"))?,
    };
    raw.parse()
        .with_context(|| format!("invalid user id '{raw}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_user_parses() {
        let id = UserId::generate().to_string();
        let resolved = resolve_user(Some(&id)).expect("resolve");
        assert_eq!(resolved.to_string(), id);
    }

    #[test]
    fn malformed_user_is_an_error() {
        assert!(resolve_user(Some("not-a-uuid")).is_err());
    }
}
