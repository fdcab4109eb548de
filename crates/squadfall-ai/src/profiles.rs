//! Role-specific weight profiles.
//!
//! Consolidates per-role tuning for the decision policies. Adding a role
//! means adding an entry here and a policy in `decision`.

use squadfall_core::enums::EnemyRole;

/// Behavioral weights for an enemy role.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoleProfile {
    /// Preference for closing distance and shooting.
    pub aggression: f64,
    /// Weight of cover quality when scoring positions.
    pub cover_priority: f64,
    /// Weight of flank-angle quality when scoring positions.
    pub flank_tendency: f64,
    /// Chance to take overwatch when no target can be engaged.
    pub overwatch_propensity: f64,
    /// Chance to use suppressive fire instead of aimed shots.
    pub suppression_propensity: f64,
    /// HP fraction at or below which the enemy retreats.
    pub retreat_threshold: f64,
    /// Penalty weight for ending a move inside player overwatch.
    pub overwatch_avoidance: f64,
    /// Max distance from the home tile when repositioning.
    pub leash: Option<i32>,
}

/// Get the profile for a role.
pub fn get_profile(role: EnemyRole) -> RoleProfile {
    match role {
        EnemyRole::Guard => RoleProfile {
            aggression: 0.4,
            cover_priority: 0.8,
            flank_tendency: 0.1,
            overwatch_propensity: 0.3,
            suppression_propensity: 0.1,
            retreat_threshold: 0.25,
            overwatch_avoidance: 0.8,
            leash: Some(5),
        },
        EnemyRole::Flanker => RoleProfile {
            aggression: 0.7,
            cover_priority: 0.4,
            flank_tendency: 1.0,
            overwatch_propensity: 0.05,
            suppression_propensity: 0.1,
            retreat_threshold: 0.3,
            overwatch_avoidance: 1.0,
            leash: None,
        },
        EnemyRole::Suppressor => RoleProfile {
            aggression: 0.4,
            cover_priority: 0.7,
            flank_tendency: 0.1,
            overwatch_propensity: 0.15,
            suppression_propensity: 0.8,
            retreat_threshold: 0.25,
            overwatch_avoidance: 0.7,
            leash: None,
        },
        EnemyRole::Heavy => RoleProfile {
            aggression: 1.0,
            cover_priority: 0.2,
            flank_tendency: 0.2,
            overwatch_propensity: 0.05,
            suppression_propensity: 0.4,
            retreat_threshold: 0.15,
            overwatch_avoidance: 0.3,
            leash: None,
        },
        EnemyRole::Officer => RoleProfile {
            aggression: 0.3,
            cover_priority: 1.0,
            flank_tendency: 0.0,
            overwatch_propensity: 0.2,
            suppression_propensity: 0.2,
            retreat_threshold: 0.4,
            overwatch_avoidance: 0.9,
            leash: Some(4),
        },
        EnemyRole::Boss => RoleProfile {
            aggression: 0.9,
            cover_priority: 0.5,
            flank_tendency: 0.3,
            overwatch_propensity: 0.0,
            suppression_propensity: 0.5,
            retreat_threshold: 0.0,
            overwatch_avoidance: 0.4,
            leash: None,
        },
    }
}
