//! Runtime switches for the app's feature areas.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FeatureFlag {
    Minigames,
    Location,
    Quests,
    Packs,
    Inventory,
    Profile,
}

impl FeatureFlag {
    pub const ALL: [Self; 6] = [
        Self::Minigames,
        Self::Location,
        Self::Quests,
        Self::Packs,
        Self::Inventory,
        Self::Profile,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Minigames => "minigames",
            Self::Location => "location",
            Self::Quests => "quests",
            Self::Packs => "packs",
            Self::Inventory => "inventory",
            Self::Profile => "profile",
        }
    }
}

impl fmt::Display for FeatureFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown feature flag {0:?}")]
pub struct UnknownFeatureError(pub String);

impl FromStr for FeatureFlag {
    type Err = UnknownFeatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|flag| flag.as_str() == wanted)
            .ok_or_else(|| UnknownFeatureError(s.trim().to_owned()))
    }
}

/// The set of enabled features.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeatureFlags {
    enabled: BTreeSet<FeatureFlag>,
}

impl FeatureFlags {
    #[must_use]
    pub fn all() -> Self {
        Self {
            enabled: FeatureFlag::ALL.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Parse `*` (everything) or a comma-separated list of names.
    ///
    /// Unknown names are skipped; an empty list enables nothing.
    #[must_use]
    pub fn from_list(list: &str) -> Self {
        if list.trim() == "*" {
            return Self::all();
        }
        let mut enabled = BTreeSet::new();
        for name in list.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            match name.parse::<FeatureFlag>() {
                Ok(flag) => {
                    enabled.insert(flag);
                }
                Err(err) => log::warn!("ignoring {err}"),
            }
        }
        Self { enabled }
    }

    #[must_use]
    pub fn is_enabled(&self, flag: FeatureFlag) -> bool {
        self.enabled.contains(&flag)
    }

    pub fn enable(&mut self, flag: FeatureFlag) {
        self.enabled.insert(flag);
    }

    pub fn disable(&mut self, flag: FeatureFlag) {
        self.enabled.remove(&flag);
    }

    /// Enabled flags in declaration order.
    #[must_use]
    pub fn enabled(&self) -> Vec<FeatureFlag> {
        self.enabled.iter().copied().collect()
    }

    /// Disable everything.
    pub fn reset(&mut self) {
        self.enabled.clear();
    }
}
