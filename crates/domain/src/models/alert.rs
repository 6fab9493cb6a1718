//! Alert trigger configuration attached to a geofence.

use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// Dwell time assigned when the dwell trigger is switched on without one.
pub const DEFAULT_DWELL_MINUTES: u32 = 15;

/// Zone triggers that can be toggled independently of the speed limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerKind {
    Entry,
    Exit,
    Dwell,
}

impl TriggerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerKind::Entry => "entry",
            TriggerKind::Exit => "exit",
            TriggerKind::Dwell => "dwell",
        }
    }
}

/// How the speed-limit trigger relates to the zone triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerCoupling {
    /// A geofence is either a zone alert or a speed-zone alert: choosing a
    /// speed limit clears entry/exit/dwell, and enabling any of those clears
    /// the speed limit.
    #[default]
    SpeedExclusive,
    /// All triggers toggle independently.
    Independent,
}

/// Editing rules applied when triggers change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlertPolicy {
    pub coupling: TriggerCoupling,
    pub default_dwell_minutes: u32,
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self {
            coupling: TriggerCoupling::default(),
            default_dwell_minutes: DEFAULT_DWELL_MINUTES,
        }
    }
}

/// Which vehicle events raise an alert for a geofence.
///
/// `dwell_minutes` is kept while dwell is switched off so toggling it back
/// on restores the previous value; it is only persisted while dwell is on.
/// The speed trigger is enabled exactly when `speed_limit_kph` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertConfig {
    pub entry: bool,
    pub exit: bool,
    pub dwell: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dwell_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_limit_kph: Option<f64>,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            entry: true,
            exit: true,
            dwell: false,
            dwell_minutes: None,
            speed_limit_kph: None,
        }
    }
}

impl AlertConfig {
    /// Toggles one zone trigger.
    pub fn set_trigger(&mut self, kind: TriggerKind, enabled: bool, policy: &AlertPolicy) {
        match kind {
            TriggerKind::Entry => self.entry = enabled,
            TriggerKind::Exit => self.exit = enabled,
            TriggerKind::Dwell => {
                self.dwell = enabled;
                if enabled && self.dwell_minutes.is_none() {
                    self.dwell_minutes = Some(policy.default_dwell_minutes);
                }
            }
        }

        if enabled
            && policy.coupling == TriggerCoupling::SpeedExclusive
            && self.speed_limit_kph.take().is_some()
        {
            tracing::debug!(
                trigger = kind.as_str(),
                "Zone trigger enabled, speed limit cleared"
            );
        }
    }

    pub fn set_dwell_minutes(&mut self, minutes: u32) {
        self.dwell_minutes = Some(minutes);
    }

    /// Enables the speed trigger with the given limit.
    ///
    /// The value is stored as given; [`AlertConfig::validate`] rejects
    /// non-positive limits.
    pub fn set_speed_limit(&mut self, kph: f64, policy: &AlertPolicy) {
        self.speed_limit_kph = Some(kph);
        if policy.coupling == TriggerCoupling::SpeedExclusive {
            self.entry = false;
            self.exit = false;
            self.dwell = false;
        }
    }

    pub fn clear_speed_limit(&mut self) {
        self.speed_limit_kph = None;
    }

    pub fn has_speed_trigger(&self) -> bool {
        self.speed_limit_kph.is_some()
    }

    pub fn has_any_trigger(&self) -> bool {
        self.entry || self.exit || self.dwell || self.has_speed_trigger()
    }

    /// Dwell time to persist: only while the dwell trigger is on.
    pub fn effective_dwell_minutes(&self) -> Option<u32> {
        if self.dwell {
            self.dwell_minutes
        } else {
            None
        }
    }

    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if !self.has_any_trigger() {
            errors.push(ValidationError::NoTriggerSelected);
        }

        if self.dwell {
            match self.dwell_minutes {
                None => errors.push(ValidationError::MissingDwellTime),
                Some(0) => errors.push(ValidationError::InvalidDwellTime),
                Some(_) => {}
            }
        }

        if let Some(value) = self.speed_limit_kph {
            if !value.is_finite() || value <= 0.0 {
                errors.push(ValidationError::InvalidSpeedLimit { value });
            }
        }

        errors
    }
}
