//! TTL tiers, resource families and the invalidation table
//!
//! Every mutating endpoint names an [`Action`]; the table in
//! [`Action::invalidation`] is the only place that decides which cached reads
//! become stale after it succeeds.

use std::time::Duration;

/// Freshness tier of a cached read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtlTier {
    /// Data that rarely changes (list of base names, operators)
    Static,
    /// Aggregate stats and info endpoints
    Medium,
    /// Data expected to change frequently (pending transfers)
    Short,
}

/// Durations assigned to each TTL tier
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for [`TtlTier::Static`]
    pub static_ttl: Duration,
    /// TTL for [`TtlTier::Medium`]
    pub medium_ttl: Duration,
    /// TTL for [`TtlTier::Short`]
    pub short_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            static_ttl: Duration::from_secs(1800), // 30 minutes
            medium_ttl: Duration::from_secs(300),  // 5 minutes
            short_ttl: Duration::from_secs(30),
        }
    }
}

impl CacheConfig {
    /// Returns the TTL configured for a tier
    pub fn ttl(&self, tier: TtlTier) -> Duration {
        match tier {
            TtlTier::Static => self.static_ttl,
            TtlTier::Medium => self.medium_ttl,
            TtlTier::Short => self.short_ttl,
        }
    }
}

/// Resource families; every cache key starts with one of these prefixes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Bo,
    Concentrateurs,
    Dashboard,
    Magasin,
    Transferts,
    Postes,
    Actions,
}

impl Resource {
    /// Key prefix shared by every cached read of this family
    pub const fn prefix(self) -> &'static str {
        match self {
            Resource::Bo => "bo",
            Resource::Concentrateurs => "concentrateurs",
            Resource::Dashboard => "dashboard",
            Resource::Magasin => "magasin",
            Resource::Transferts => "transferts",
            Resource::Postes => "postes",
            Resource::Actions => "actions",
        }
    }

    /// Builds a resource path under this family, e.g. `bo/stats/Nord`
    pub fn path(self, rest: &str) -> String {
        if rest.is_empty() {
            self.prefix().to_string()
        } else {
            format!("{}/{}", self.prefix(), rest)
        }
    }
}

/// Mutating operations that can make cached reads stale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    BoPose,
    BoDepose,
    BoReception,
    BoCreerDemande,
    MagasinReception,
    TransfertValidation,
    LaboTest,
    Logout,
}

/// What an [`Action`] invalidates once it succeeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invalidation {
    /// Drop every key under these prefixes and every key containing these substrings
    Targeted {
        resources: &'static [Resource],
        patterns: &'static [&'static str],
    },
    /// Drop the whole cache
    Everything,
}

const BO_MOVEMENT: &[Resource] = &[
    Resource::Bo,
    Resource::Concentrateurs,
    Resource::Dashboard,
    Resource::Actions,
];

// A lab verdict moves the unit back to the warehouse or out of stock.
const LABO_TEST: &[Resource] = &[
    Resource::Bo,
    Resource::Concentrateurs,
    Resource::Magasin,
    Resource::Dashboard,
    Resource::Actions,
];

impl Action {
    /// The invalidation applied after this action succeeds
    pub const fn invalidation(self) -> Invalidation {
        match self {
            Action::BoPose | Action::BoDepose | Action::BoReception => Invalidation::Targeted {
                resources: BO_MOVEMENT,
                patterns: &[],
            },
            Action::BoCreerDemande => Invalidation::Targeted {
                resources: &[Resource::Transferts],
                patterns: &["bo/demandes"],
            },
            Action::MagasinReception => Invalidation::Targeted {
                resources: &[
                    Resource::Concentrateurs,
                    Resource::Magasin,
                    Resource::Dashboard,
                    Resource::Actions,
                ],
                patterns: &[],
            },
            Action::TransfertValidation => Invalidation::Targeted {
                resources: &[
                    Resource::Transferts,
                    Resource::Bo,
                    Resource::Concentrateurs,
                    Resource::Magasin,
                    Resource::Dashboard,
                    Resource::Actions,
                ],
                patterns: &[],
            },
            Action::LaboTest => Invalidation::Targeted {
                resources: LABO_TEST,
                patterns: &[],
            },
            Action::Logout => Invalidation::Everything,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_config_default() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl(TtlTier::Static), Duration::from_secs(1800));
        assert_eq!(config.ttl(TtlTier::Medium), Duration::from_secs(300));
        assert_eq!(config.ttl(TtlTier::Short), Duration::from_secs(30));
    }

    #[test]
    fn test_tiers_are_ordered_by_lifetime() {
        let config = CacheConfig::default();
        assert!(config.ttl(TtlTier::Static) > config.ttl(TtlTier::Medium));
        assert!(config.ttl(TtlTier::Medium) > config.ttl(TtlTier::Short));
    }

    #[test]
    fn test_resource_path() {
        assert_eq!(Resource::Bo.path("stats/Nord"), "bo/stats/Nord");
        assert_eq!(Resource::Dashboard.path(""), "dashboard");
    }

    #[test]
    fn test_bo_movements_invalidate_bo_concentrateurs_dashboard() {
        for action in [Action::BoPose, Action::BoDepose, Action::BoReception] {
            match action.invalidation() {
                Invalidation::Targeted { resources, patterns } => {
                    assert!(resources.contains(&Resource::Bo));
                    assert!(resources.contains(&Resource::Concentrateurs));
                    assert!(resources.contains(&Resource::Dashboard));
                    assert!(patterns.is_empty());
                }
                Invalidation::Everything => panic!("{:?} should be targeted", action),
            }
        }
    }

    #[test]
    fn test_creer_demande_only_targets_demandes_under_bo() {
        match Action::BoCreerDemande.invalidation() {
            Invalidation::Targeted { resources, patterns } => {
                assert!(!resources.contains(&Resource::Bo));
                assert_eq!(patterns, &["bo/demandes"]);
            }
            Invalidation::Everything => panic!("should be targeted"),
        }
    }

    #[test]
    fn test_labo_test_invalidates_magasin() {
        match Action::LaboTest.invalidation() {
            Invalidation::Targeted { resources, .. } => {
                assert!(resources.contains(&Resource::Magasin));
                assert!(resources.contains(&Resource::Concentrateurs));
                assert!(!resources.contains(&Resource::Transferts));
            }
            Invalidation::Everything => panic!("should be targeted"),
        }
    }

    #[test]
    fn test_every_movement_invalidates_action_history() {
        let movements = [
            Action::BoPose,
            Action::BoDepose,
            Action::BoReception,
            Action::MagasinReception,
            Action::TransfertValidation,
            Action::LaboTest,
        ];
        for action in movements {
            match action.invalidation() {
                Invalidation::Targeted { resources, .. } => {
                    assert!(resources.contains(&Resource::Actions), "{:?}", action);
                }
                Invalidation::Everything => panic!("{:?} should be targeted", action),
            }
        }
    }

    #[test]
    fn test_logout_clears_everything() {
        assert_eq!(Action::Logout.invalidation(), Invalidation::Everything);
    }
}
