use crate::db::Database;
use crate::error::{JournalError, Result};
use crate::models::{Language, Settings, UpdateSettingsInput};

pub fn get_settings(db: &Database) -> Result<Settings> {
    let conn = db.lock()?;

    let settings = conn.query_row(
        "SELECT id, language, currency, coach_enabled, created_at, updated_at FROM settings WHERE id = 1",
        [],
        |row| {
            let language: String = row.get(1)?;
            Ok(Settings {
                id: row.get(0)?,
                language: Language::from_code(&language).unwrap_or_default(),
                currency: row.get(2)?,
                coach_enabled: row.get::<_, i32>(3)? == 1,
                created_at: row.get(4)?,
                updated_at: row.get(5)?,
            })
        },
    )?;

    Ok(settings)
}

pub fn update_settings(db: &Database, settings: UpdateSettingsInput) -> Result<Settings> {
    {
        let conn = db.lock()?;

        let mut updates = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(val) = settings.language {
            updates.push("language = ?");
            values.push(Box::new(val.code()));
        }
        if let Some(val) = settings.currency {
            let code = val.trim().to_ascii_uppercase();
            if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(JournalError::Validation(format!(
                    "currency must be a three-letter ISO code, got '{}'",
                    val
                )));
            }
            updates.push("currency = ?");
            values.push(Box::new(code));
        }
        if let Some(val) = settings.coach_enabled {
            updates.push("coach_enabled = ?");
            values.push(Box::new(val as i32));
        }

        updates.push("updated_at = strftime('%s', 'now')");

        let query = format!("UPDATE settings SET {} WHERE id = 1", updates.join(", "));
        let params: Vec<&dyn rusqlite::ToSql> = values.iter().map(|v| v.as_ref()).collect();

        conn.execute(&query, params.as_slice())?;
    }

    log::info!("Settings updated");
    get_settings(db)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let db = Database::open_in_memory().unwrap();
        let settings = get_settings(&db).unwrap();

        assert_eq!(settings.id, 1);
        assert_eq!(settings.language, Language::En);
        assert_eq!(settings.currency, "USD");
        assert!(settings.coach_enabled);
    }

    #[test]
    fn test_partial_update() {
        let db = Database::open_in_memory().unwrap();
        let updated = update_settings(
            &db,
            UpdateSettingsInput {
                language: Some(Language::Fa),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(updated.language, Language::Fa);
        assert_eq!(updated.currency, "USD");

        let updated = update_settings(
            &db,
            UpdateSettingsInput {
                currency: Some("eur".to_string()),
                coach_enabled: Some(false),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(updated.language, Language::Fa);
        assert_eq!(updated.currency, "EUR");
        assert!(!updated.coach_enabled);
    }

    #[test]
    fn test_rejects_bad_currency() {
        let db = Database::open_in_memory().unwrap();
        let result = update_settings(
            &db,
            UpdateSettingsInput {
                currency: Some("dollars".to_string()),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(JournalError::Validation(_))));
    }
}
