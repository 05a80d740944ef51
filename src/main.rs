//! Wiring & DI. Entry point: bootstrap adapters, inject into services, run UI.
//! No business logic here.

use dotenv::dotenv;
use psytrack::adapters::persistence::{MemoryRepo, SqliteRepo};
use psytrack::adapters::ui::tui::TuiInputPort;
use psytrack::ports::{
    AlterRepoPort, DisorderRepoPort, EntryRepoPort, InputPort, MedicationRepoPort,
    TherapyRepoPort,
};
use psytrack::shared::config::{AppConfig, StorageBackend};
use psytrack::usecases::{AnalyticsService, JournalService};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// The repository ports, all backed by the same store.
struct Repos {
    disorders: Arc<dyn DisorderRepoPort>,
    entries: Arc<dyn EntryRepoPort>,
    medications: Arc<dyn MedicationRepoPort>,
    alters: Arc<dyn AlterRepoPort>,
    therapy: Arc<dyn TherapyRepoPort>,
}

impl Repos {
    fn from_shared<R>(repo: Arc<R>) -> Self
    where
        R: DisorderRepoPort
            + EntryRepoPort
            + MedicationRepoPort
            + AlterRepoPort
            + TherapyRepoPort
            + 'static,
    {
        Self {
            disorders: Arc::clone(&repo) as Arc<dyn DisorderRepoPort>,
            entries: Arc::clone(&repo) as Arc<dyn EntryRepoPort>,
            medications: Arc::clone(&repo) as Arc<dyn MedicationRepoPort>,
            alters: Arc::clone(&repo) as Arc<dyn AlterRepoPort>,
            therapy: repo as Arc<dyn TherapyRepoPort>,
        }
    }
}

async fn open_repos(backend: StorageBackend, data_dir: &Path) -> anyhow::Result<Repos> {
    match backend {
        StorageBackend::Sqlite => {
            let repo = SqliteRepo::connect(data_dir)
                .await
                .map_err(|e| anyhow::anyhow!("SQLite connect failed: {}", e))?;
            info!(path = %repo.db_path().display(), "using sqlite storage");
            Ok(Repos::from_shared(Arc::new(repo)))
        }
        StorageBackend::Memory => {
            warn!("using in-memory storage; nothing will be saved");
            Ok(Repos::from_shared(Arc::new(MemoryRepo::new())))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    psytrack::adapters::ui::init_ui();

    let cfg = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "could not load config, using defaults");
        AppConfig::default()
    });
    let backend = cfg
        .storage_backend()
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    let data_dir = cfg.data_dir_or_default();
    let reports_dir = cfg.reports_dir_or_default();
    let timespan = cfg.default_timespan_or_default();
    info!(
        data_dir = %data_dir.display(),
        reports_dir = %reports_dir.display(),
        timespan_days = timespan.get(),
        "configuration loaded"
    );

    let repos = open_repos(backend, &data_dir).await?;

    // --- Services ---
    let journal = Arc::new(JournalService::new(
        Arc::clone(&repos.disorders),
        Arc::clone(&repos.entries),
        Arc::clone(&repos.medications),
        Arc::clone(&repos.alters),
        Arc::clone(&repos.therapy),
    ));
    if cfg.seed_disorders_or_default() {
        journal
            .seed_default_disorders()
            .await
            .map_err(|e| anyhow::anyhow!("{}", e))?;
    }

    let analytics = Arc::new(AnalyticsService::new(
        Arc::clone(&repos.disorders),
        Arc::clone(&repos.entries),
        Arc::clone(&repos.medications),
        Arc::clone(&repos.alters),
        Arc::clone(&repos.therapy),
        reports_dir,
        timespan,
    ));

    let input_port: Arc<dyn InputPort> = Arc::new(TuiInputPort::new(journal, analytics));

    input_port
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    Ok(())
}
