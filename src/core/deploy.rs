//! Deploy state machine.
//!
//! Pure transitions over [`ServiceState`]. The `*_at` variants take the
//! deploy date explicitly; the short forms stamp `DeployDate::now()`.

use super::types::{Deploy, DeployDate, Rollback, ServiceState};

/// What an incoming write represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployEvent {
    /// A new version goes live; the outgoing version becomes the rollback target.
    Deploy,
    /// The same operational action is re-applied; the rollback target is kept.
    Restart,
}

impl DeployEvent {
    pub fn from_flag(restart: bool) -> Self {
        if restart {
            DeployEvent::Restart
        } else {
            DeployEvent::Deploy
        }
    }

    pub fn is_restart(self) -> bool {
        matches!(self, DeployEvent::Restart)
    }
}

/// State of a service on its first recorded deploy.
pub fn initialize(version: &str) -> ServiceState {
    initialize_at(version, DeployDate::now())
}

pub fn initialize_at(version: &str, date: DeployDate) -> ServiceState {
    let current = Deploy::new(version, date, false);
    ServiceState {
        rollback: Rollback::new(version),
        history: vec![current.clone()],
        current,
    }
}

/// Applies a deploy or restart on top of `existing`, returning the new state.
pub fn apply_deploy(existing: &ServiceState, version: &str, is_restart: bool) -> ServiceState {
    apply_deploy_at(existing, version, is_restart, DeployDate::now())
}

pub fn apply_deploy_at(
    existing: &ServiceState,
    version: &str,
    is_restart: bool,
    date: DeployDate,
) -> ServiceState {
    let deploy = Deploy::new(version, date, is_restart);

    let rollback = match DeployEvent::from_flag(is_restart) {
        DeployEvent::Deploy => Rollback::new(existing.current.version.clone()),
        DeployEvent::Restart => existing.rollback.clone(),
    };

    let mut history = Vec::with_capacity(existing.history.len() + 1);
    history.push(deploy.clone());
    history.extend(existing.history.iter().cloned());

    ServiceState {
        current: deploy,
        rollback,
        history,
    }
}
