//! Representative status classification.
//!
//! [`classify`] is a pure function of one delegate's weight share, online
//! flag, uptime signal, known-list entry and blocklist membership. Steps run
//! in a fixed order and later steps may raise or replace the tier:
//!
//! 1. weight share (≥ 10 % alert, ≥ 5 % warn)
//! 2. blocklist
//! 3. known-list entry, or the reputation provider's alias
//! 4. uptime history (skipped for trusted representatives)
//! 5. online flag

use std::fmt;

use serde::{Deserialize, Serialize};

use repwatch_types::{RawAmount, Timestamp};

use crate::known_list::KnownEntry;
use crate::sources::UptimeRecord;
use crate::SourceError;

/// Weight share (percent of online stake) at or above which a representative
/// is too powerful and must be changed.
pub const VERY_HIGH_WEIGHT_PERCENT: u128 = 10;
/// Weight share at or above which a representative is flagged as heavy.
pub const HIGH_WEIGHT_PERCENT: u128 = 5;
/// Uptime below this percentage requires a change.
pub const VERY_LOW_UPTIME_PERCENT: f64 = 50.0;
/// Uptime below this percentage is a warning.
pub const LOW_UPTIME_PERCENT: f64 = 60.0;
/// Length of the uptime interval the weekly figure covers.
pub const UPTIME_INTERVAL_DAYS: u64 = 7;
/// Uptime floor for a representative that is voting right now.
pub const ONLINE_UPTIME_FLOOR: f64 = 1.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusTier {
    #[default]
    None,
    Ok,
    Warn,
    Alert,
    Trusted,
    Unknown,
}

impl StatusTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Ok => "ok",
            Self::Warn => "warn",
            Self::Alert => "alert",
            Self::Trusted => "trusted",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for StatusTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flag set produced for one representative.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RepresentativeStatus {
    pub online: bool,
    pub very_high_weight: bool,
    pub high_weight: bool,
    pub very_low_uptime: bool,
    pub low_uptime: bool,
    pub closing: bool,
    pub marked_to_avoid: bool,
    pub marked_as_nf: bool,
    pub trusted: bool,
    pub change_required: bool,
    pub warn: bool,
    pub known: bool,
    pub days_since_last_voted: u64,
    /// Effective uptime percentage over the interval.
    pub uptime: Option<f64>,
    pub score: Option<f64>,
}

impl RepresentativeStatus {
    /// Whether delegating accounts should move away from this representative.
    pub fn needs_change(&self) -> bool {
        !self.trusted
            && (self.high_weight
                || self.very_high_weight
                || self.low_uptime
                || self.very_low_uptime
                || self.warn)
    }
}

/// Outcome of asking the reputation provider about one representative.
#[derive(Clone, Debug, PartialEq)]
pub enum UptimeSignal {
    Record(UptimeRecord),
    /// The provider does not know the representative.
    NotFound,
    /// The provider was unreachable or answered with garbage.
    Unavailable,
}

impl UptimeSignal {
    pub fn record(&self) -> Option<&UptimeRecord> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn alias(&self) -> Option<&str> {
        self.record()
            .and_then(|r| r.alias.as_deref())
            .filter(|alias| !alias.trim().is_empty())
    }
}

impl From<Result<Option<UptimeRecord>, SourceError>> for UptimeSignal {
    fn from(result: Result<Option<UptimeRecord>, SourceError>) -> Self {
        match result {
            Ok(Some(record)) => Self::Record(record),
            Ok(None) => Self::NotFound,
            Err(_) => Self::Unavailable,
        }
    }
}

/// A representative's voting weight against the network's online stake.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WeightShare {
    pub weight: RawAmount,
    /// `None` when the node did not report a quorum.
    pub online_stake: Option<RawAmount>,
}

impl WeightShare {
    pub fn new(weight: RawAmount, online_stake: Option<RawAmount>) -> Self {
        Self {
            weight,
            online_stake,
        }
    }

    /// Share in percent. Zero when the online stake is unknown or zero.
    pub fn percent(&self) -> f64 {
        match self.online_stake {
            Some(total) => self.weight.percent_of(total),
            None => 0.0,
        }
    }

    /// Exact `percent() >= pct`. Always false for a non-zero `pct` when the
    /// online stake is unknown or zero.
    pub fn is_at_least(&self, pct: u128) -> bool {
        match self.online_stake {
            Some(total) if !total.is_zero() => self.weight.is_at_least_percent(total, pct),
            _ => pct == 0,
        }
    }
}

/// Everything the classifier looks at for one representative.
#[derive(Clone, Copy, Debug)]
pub struct ClassifierInput<'a> {
    pub share: WeightShare,
    pub online: bool,
    pub uptime: &'a UptimeSignal,
    pub known: Option<&'a KnownEntry>,
    pub blocklisted: bool,
    /// Reference time for "days since last voted".
    pub now: Timestamp,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Classification {
    pub tier: StatusTier,
    pub label: Option<String>,
    pub status: RepresentativeStatus,
    pub percent: f64,
}

/// Classify one representative.
pub fn classify(input: &ClassifierInput<'_>) -> Classification {
    let mut tier = StatusTier::None;
    let mut label = None;
    let mut status = RepresentativeStatus::default();

    if input.share.is_at_least(VERY_HIGH_WEIGHT_PERCENT) {
        tier = StatusTier::Alert;
        status.very_high_weight = true;
        status.change_required = true;
    } else if input.share.is_at_least(HIGH_WEIGHT_PERCENT) {
        tier = StatusTier::Warn;
        status.high_weight = true;
    }

    // Stays set even if the representative is trusted below.
    if input.blocklisted {
        status.marked_as_nf = true;
        status.change_required = true;
        status.warn = true;
        tier = StatusTier::Alert;
    }

    if let Some(entry) = input.known {
        if tier == StatusTier::None {
            tier = StatusTier::Ok;
        }
        label = Some(entry.name.clone());
        status.known = true;
        if entry.trusted {
            tier = StatusTier::Trusted;
            status.trusted = true;
            status.change_required = false;
            status.warn = false;
        } else if entry.warn {
            tier = StatusTier::Alert;
            status.marked_to_avoid = true;
            status.warn = true;
            status.change_required = true;
        }
    } else if let Some(alias) = input.uptime.alias() {
        if tier == StatusTier::None {
            tier = StatusTier::Ok;
        }
        label = Some(alias.to_string());
    }

    if !status.trusted {
        match input.uptime {
            UptimeSignal::Record(record) => {
                tier = apply_uptime(record, input.online, input.now, tier, &mut status);
            }
            UptimeSignal::NotFound => {
                tier = StatusTier::Alert;
                status.uptime = Some(0.0);
                status.very_low_uptime = true;
                status.days_since_last_voted = UPTIME_INTERVAL_DAYS;
                status.warn = true;
                status.change_required = true;
            }
            UptimeSignal::Unavailable => {
                if tier == StatusTier::None {
                    tier = StatusTier::Unknown;
                }
            }
        }
    }

    status.online = input.online;

    Classification {
        tier,
        label,
        status,
        percent: input.share.percent(),
    }
}

fn apply_uptime(
    record: &UptimeRecord,
    online: bool,
    now: Timestamp,
    mut tier: StatusTier,
    status: &mut RepresentativeStatus,
) -> StatusTier {
    if record.closing {
        tier = StatusTier::Alert;
        status.closing = true;
        status.warn = true;
        status.change_required = true;
    }

    let uptime = effective_uptime(record, online);
    status.uptime = Some(uptime);
    status.score = Some(record.score);

    status.days_since_last_voted = record
        .last_voted_at
        .map(|voted| voted.days_since(now))
        .unwrap_or(0);
    if uptime == 0.0 {
        status.days_since_last_voted = status.days_since_last_voted.max(UPTIME_INTERVAL_DAYS);
    }

    if uptime < VERY_LOW_UPTIME_PERCENT {
        tier = StatusTier::Alert;
        status.very_low_uptime = true;
        status.warn = true;
        status.change_required = true;
    } else if uptime < LOW_UPTIME_PERCENT {
        if tier != StatusTier::Alert {
            tier = StatusTier::Warn;
        }
        status.low_uptime = true;
        status.warn = true;
    }

    tier
}

/// Weekly uptime, raised to at least a seventh of the daily figure, and to
/// the online floor when the representative is voting now.
pub fn effective_uptime(record: &UptimeRecord, online: bool) -> f64 {
    let mut value = record
        .weekly_pct
        .max(record.daily_pct / UPTIME_INTERVAL_DAYS as f64);
    if online {
        value = value.max(ONLINE_UPTIME_FLOOR);
    }
    value
}
