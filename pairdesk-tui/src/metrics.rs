//! Headline metric cards with count-up animation.
//!
//! Each metric eases from the value currently on screen to its new target
//! over one second (ease-out cubic). Retargeting mid-flight starts the new
//! animation from wherever the old one had got to.

use std::time::{Duration, Instant};

use pairdesk_core::TradingSummary;

pub const ANIMATION_DURATION: Duration = Duration::from_millis(1000);

/// `1 - (1 - t)^3`, with `t` clamped to `[0, 1]`.
pub fn ease_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// One animation from `from` to `to`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    pub from: f64,
    pub to: f64,
    pub start: Instant,
}

impl Tween {
    pub fn settled(value: f64, now: Instant) -> Self {
        Self {
            from: value,
            to: value,
            start: now,
        }
    }

    fn progress(&self, now: Instant) -> f64 {
        now.saturating_duration_since(self.start).as_secs_f64()
            / ANIMATION_DURATION.as_secs_f64()
    }

    /// Exactly `to` once the duration has elapsed.
    pub fn value_at(&self, now: Instant) -> f64 {
        let t = self.progress(now);
        if t >= 1.0 {
            self.to
        } else {
            self.from + (self.to - self.from) * ease_out_cubic(t)
        }
    }

    pub fn is_done(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    TotalPnl,
    TotalTrades,
    WinRate,
    TotalVolume,
}

impl MetricKind {
    pub const ALL: [MetricKind; 4] = [
        MetricKind::TotalPnl,
        MetricKind::TotalTrades,
        MetricKind::WinRate,
        MetricKind::TotalVolume,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MetricKind::TotalPnl => "Total P&L",
            MetricKind::TotalTrades => "Total Trades",
            MetricKind::WinRate => "Win Rate",
            MetricKind::TotalVolume => "Total Volume",
        }
    }

    pub fn format(self, value: f64) -> String {
        match self {
            MetricKind::TotalPnl => format_currency(value),
            MetricKind::TotalTrades => format!("{}", value.round() as i64),
            MetricKind::WinRate => format_percent(value),
            MetricKind::TotalVolume => format!("{value:.2}"),
        }
    }

    fn target(self, summary: &TradingSummary) -> f64 {
        match self {
            MetricKind::TotalPnl => summary.total_pnl,
            MetricKind::TotalTrades => f64::from(summary.total_trades),
            MetricKind::WinRate => summary.win_rate,
            MetricKind::TotalVolume => summary.total_volume,
        }
    }

    fn index(self) -> usize {
        match self {
            MetricKind::TotalPnl => 0,
            MetricKind::TotalTrades => 1,
            MetricKind::WinRate => 2,
            MetricKind::TotalVolume => 3,
        }
    }
}

/// `$1,234.56`, `-$42.10`.
pub fn format_currency(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let frac = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{frac:02}")
}

/// `39.1%`
pub fn format_percent(value: f64) -> String {
    format!("{value:.1}%")
}

#[derive(Debug, Clone)]
pub struct MetricsRenderer {
    tweens: [Tween; 4],
}

impl MetricsRenderer {
    pub fn new(now: Instant) -> Self {
        Self {
            tweens: [Tween::settled(0.0, now); 4],
        }
    }

    /// Animate every metric towards `summary`.
    pub fn set_targets(&mut self, summary: &TradingSummary, now: Instant) {
        for kind in MetricKind::ALL {
            self.retarget(kind, kind.target(summary), now);
        }
    }

    /// Animate one metric towards `to`, starting from its on-screen value.
    pub fn retarget(&mut self, kind: MetricKind, to: f64, now: Instant) {
        let tween = &mut self.tweens[kind.index()];
        if tween.to == to {
            return;
        }
        *tween = Tween {
            from: tween.value_at(now),
            to,
            start: now,
        };
    }

    pub fn displayed(&self, kind: MetricKind, now: Instant) -> f64 {
        self.tweens[kind.index()].value_at(now)
    }

    pub fn target(&self, kind: MetricKind) -> f64 {
        self.tweens[kind.index()].to
    }

    pub fn formatted(&self, kind: MetricKind, now: Instant) -> String {
        kind.format(self.displayed(kind, now))
    }

    pub fn is_animating(&self, now: Instant) -> bool {
        self.tweens.iter().any(|t| !t.is_done(now))
    }
}
