//! Propagation settings.

use std::collections::BTreeSet;
use std::str::FromStr;

use domain::{OrderStatus, StatusError};
use thiserror::Error;

/// The stages whose changes propagate between an order and its items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropagationPolicy {
    stages: BTreeSet<OrderStatus>,
}

impl PropagationPolicy {
    /// Every stage propagates.
    pub fn all() -> Self {
        Self::only(OrderStatus::ALL)
    }

    /// Only the given stages propagate.
    pub fn only(stages: impl IntoIterator<Item = OrderStatus>) -> Self {
        Self {
            stages: stages.into_iter().collect(),
        }
    }

    pub fn propagates(&self, stage: impl Into<OrderStatus>) -> bool {
        self.stages.contains(&stage.into())
    }

    pub fn stages(&self) -> impl Iterator<Item = OrderStatus> + '_ {
        self.stages.iter().copied()
    }

    fn is_all(&self) -> bool {
        self.stages.len() == OrderStatus::ALL.len()
    }
}

impl Default for PropagationPolicy {
    fn default() -> Self {
        Self::all()
    }
}

/// Parses `all` or a comma-separated list of stage names.
impl FromStr for PropagationPolicy {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(Self::all());
        }

        let stages = s
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(OrderStatus::from_str)
            .collect::<Result<BTreeSet<_>, _>>()?;

        if stages.is_empty() {
            return Err(StatusError::UnknownStage {
                vocabulary: "order",
                value: s.to_string(),
            });
        }
        Ok(Self { stages })
    }
}

impl std::fmt::Display for PropagationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_all() {
            return f.write_str("all");
        }
        let names: Vec<&str> = self.stages.iter().map(OrderStatus::as_str).collect();
        f.write_str(&names.join(","))
    }
}

/// How a direct edit of an order's status treats its items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DirectEditPolicy {
    /// The order's new status is pushed to every item, whatever they hold.
    #[default]
    ParentWins,

    /// The new status is only pushed down when the items already share
    /// one status. The order edit itself always stands.
    RequireConvergence,
}

impl DirectEditPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DirectEditPolicy::ParentWins => "parent-wins",
            DirectEditPolicy::RequireConvergence => "require-convergence",
        }
    }
}

impl std::fmt::Display for DirectEditPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a direct-edit policy name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown direct edit policy: '{0}' (expected parent-wins or require-convergence)")]
pub struct ParsePolicyError(pub String);

impl FromStr for DirectEditPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "parent-wins" => Ok(DirectEditPolicy::ParentWins),
            "require-convergence" => Ok(DirectEditPolicy::RequireConvergence),
            _ => Err(ParsePolicyError(s.to_string())),
        }
    }
}

/// Settings for the status hooks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub propagation: PropagationPolicy,
    pub direct_edit: DirectEditPolicy,
}
