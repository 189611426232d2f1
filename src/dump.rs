use std::{
    fmt::Display,
    path::{Path, PathBuf},
};

use tokio::fs;

use crate::{menu::Meal, parse::Floor};

/// The page a dump was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Floor(Floor),
    Weekly,
}

impl Page {
    fn file_suffix(self) -> String {
        match self {
            Self::Floor(floor) => format!("_floor{}", floor.number()),
            Self::Weekly => String::new(),
        }
    }
}

impl Display for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Floor(floor) => write!(f, "{floor}"),
            Self::Weekly => f.write_str("weekly page"),
        }
    }
}

/// Scratch copies of what each page fetch saw and produced, for debugging parser drift.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebugDump {
    Dir(PathBuf),
    Disabled,
}

impl DebugDump {
    pub fn new(dir: Option<impl AsRef<Path>>) -> Self {
        dir.map_or(Self::Disabled, |dir| Self::Dir(dir.as_ref().to_owned()))
    }

    pub fn table_path(dir: &Path, page: Page) -> PathBuf {
        dir.join(format!("fetched_table{}.html", page.file_suffix()))
    }

    pub fn meals_path(dir: &Path, page: Page) -> PathBuf {
        dir.join(format!("parsed_menu{}.json", page.file_suffix()))
    }

    pub async fn save(&self, page: Page, table_html: &str, meals: &[Meal]) -> crate::Result<()> {
        let Self::Dir(dir) = self else {
            return Ok(());
        };
        fs::create_dir_all(dir).await?;
        fs::write(Self::table_path(dir, page), table_html).await?;
        let json = serde_json::to_vec_pretty(meals)?;
        fs::write(Self::meals_path(dir, page), json).await?;
        Ok(())
    }

    /// Like [`Self::save`], but a failure is only logged.
    pub async fn record(&self, page: Page, table_html: &str, meals: &[Meal]) {
        if let Err(e) = self.save(page, table_html, meals).await {
            log::warn!("Could not write debug dump for {page}: {e}");
        }
    }
}
