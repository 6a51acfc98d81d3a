use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::ContenderError;

/// Current NBA franchises by display name.
const NBA_TEAMS: [&str; 30] = [
    "Atlanta Hawks",
    "Boston Celtics",
    "Brooklyn Nets",
    "Charlotte Hornets",
    "Chicago Bulls",
    "Cleveland Cavaliers",
    "Dallas Mavericks",
    "Denver Nuggets",
    "Detroit Pistons",
    "Golden State Warriors",
    "Houston Rockets",
    "Indiana Pacers",
    "Los Angeles Clippers",
    "Los Angeles Lakers",
    "Memphis Grizzlies",
    "Miami Heat",
    "Milwaukee Bucks",
    "Minnesota Timberwolves",
    "New Orleans Pelicans",
    "New York Knicks",
    "Oklahoma City Thunder",
    "Orlando Magic",
    "Philadelphia 76ers",
    "Phoenix Suns",
    "Portland Trail Blazers",
    "Sacramento Kings",
    "San Antonio Spurs",
    "Toronto Raptors",
    "Utah Jazz",
    "Washington Wizards",
];

/// Spellings the stats endpoint uses that differ from the display name.
const NBA_ALIASES: [(&str, &str); 1] = [("LA Clippers", "Los Angeles Clippers")];

/// Canonical, sorted list of valid team names.
#[derive(Debug, Clone)]
pub struct TeamRegistry {
    names: Vec<String>,
    aliases: HashMap<String, String>,
}

impl TeamRegistry {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = names.into_iter().map(Into::into).collect();
        names.sort();
        names.dedup();
        TeamRegistry {
            names,
            aliases: HashMap::new(),
        }
    }

    pub fn nba() -> Self {
        let mut registry = TeamRegistry::new(NBA_TEAMS);
        for (alias, canonical) in NBA_ALIASES {
            registry = registry.with_alias(alias, canonical);
        }
        registry
    }

    pub fn with_alias(mut self, alias: &str, canonical: &str) -> Self {
        self.aliases
            .insert(alias.to_string(), canonical.to_string());
        self
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Map a provider-side team name to its canonical display name.
    pub fn resolve(&self, name: &str) -> Result<&str, ContenderError> {
        let name = name.trim();
        let canonical = self.aliases.get(name).map(String::as_str).unwrap_or(name);
        match self.names.binary_search_by(|n| n.as_str().cmp(canonical)) {
            Ok(idx) => Ok(self.names[idx].as_str()),
            Err(_) => Err(ContenderError::DataIntegrity {
                team: name.to_string(),
            }),
        }
    }
}

/// `<dir>/<team>.png`, the layout of the logo folder.
pub fn logo_path(dir: &Path, team: &str) -> PathBuf {
    dir.join(format!("{}.png", team))
}
