pub mod analytics;
pub mod coach;
pub mod db;
pub mod error;
pub mod format;
pub mod journal;
pub mod models;
pub mod repository;

use std::path::Path;
use std::sync::Arc;

pub use error::{JournalError, Result};
pub use journal::TradeJournal;

use coach::{CoachConfig, TradeCoach};
use db::Database;
use models::{Dashboard, NewTrade, TradeRecord};
use repository::SqliteTradeRepository;

pub const DATABASE_FILE: &str = "trade_journal.db";

/// Everything a front end needs: storage, the journal and the optional coach
pub struct AppState {
    pub db: Arc<Database>,
    pub journal: TradeJournal,
    coach: Option<Box<dyn TradeCoach>>,
}

impl AppState {
    /// Open (or create) the journal database under `app_dir`.
    pub fn initialize(app_dir: &Path, coach_config: CoachConfig) -> Result<Self> {
        std::fs::create_dir_all(app_dir)?;

        let db_path = app_dir.join(DATABASE_FILE);
        log::info!("Database path: {:?}", db_path);

        let db_path = db_path
            .to_str()
            .ok_or_else(|| JournalError::Storage(format!("non UTF-8 path: {:?}", db_path)))?;
        let database = Database::new(db_path).map_err(|e| {
            log::error!("Database initialization failed: {}", e);
            log::error!("Pre-migration backups are located at {:?}", app_dir.join("backups"));
            JournalError::from(e)
        })?;

        Ok(Self::with_database(Arc::new(database), coach::coach_from_config(coach_config)))
    }

    pub fn with_database(db: Arc<Database>, coach: Option<Box<dyn TradeCoach>>) -> Self {
        let repository = Arc::new(SqliteTradeRepository::new(Arc::clone(&db)));
        let journal = TradeJournal::open(repository);

        Self { db, journal, coach }
    }

    pub fn add_trade(&self, trade: NewTrade) -> Result<TradeRecord> {
        self.journal.add_trade(trade)
    }

    pub fn dashboard(&self) -> Result<Arc<Dashboard>> {
        self.journal.dashboard()
    }

    /// Coaching feedback for a stored trade, in the configured language.
    /// Disabled coaching or provider failures yield a localized notice.
    pub async fn analyze_trade(&self, id: &str) -> Result<String> {
        let trade = self.journal.trade_with_pl(id)?;
        let settings = db::get_settings(&self.db)?;

        let coach = if settings.coach_enabled {
            self.coach.as_deref()
        } else {
            None
        };

        Ok(coach::analyze_trade(coach, &trade, settings.language).await)
    }
}
