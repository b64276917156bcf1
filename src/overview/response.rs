//! Non-linear response of adoption and inflation to the transfer level

use std::fmt;

use serde::Serialize;

use crate::overview::profile::ScenarioProfile;
use crate::stats::summary::{mean, sample_std};

/// Mean and sample std at one scenario's transfer, in percent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponsePoint {
    pub label: String,
    pub bdp_amount: f64,
    pub adoption_mean: f64,
    pub adoption_std: f64,
    pub inflation_mean: f64,
    pub inflation_std: f64,
}

impl From<&ScenarioProfile> for ResponsePoint {
    fn from(profile: &ScenarioProfile) -> Self {
        Self {
            label: profile.label.clone(),
            bdp_amount: profile.bdp_amount,
            adoption_mean: mean(&profile.adoption_pct),
            adoption_std: sample_std(&profile.adoption_pct),
            inflation_mean: mean(&profile.inflation_pct),
            inflation_std: sample_std(&profile.inflation_pct),
        }
    }
}

/// Response points ordered by transfer
#[derive(Debug, Clone, Serialize)]
pub struct ResponseCurve {
    pub points: Vec<ResponsePoint>,
}

impl ResponseCurve {
    pub fn from_profiles(profiles: &[ScenarioProfile]) -> Self {
        let mut points: Vec<ResponsePoint> = profiles.iter().map(ResponsePoint::from).collect();
        points.sort_by(|a, b| a.bdp_amount.total_cmp(&b.bdp_amount));
        Self { points }
    }

    /// Point with the highest mean adoption; the lowest transfer wins ties
    pub fn adoption_peak(&self) -> Option<&ResponsePoint> {
        self.points.iter().fold(None, |best, p| match best {
            Some(b) if b.adoption_mean >= p.adoption_mean => Some(b),
            _ => Some(p),
        })
    }

    /// True when mean adoption never decreases as the transfer grows
    pub fn is_monotonic(&self) -> bool {
        self.points
            .windows(2)
            .all(|w| w[1].adoption_mean >= w[0].adoption_mean)
    }
}

impl fmt::Display for ResponseCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "NON-LINEAR RESPONSE:")?;
        writeln!(
            f,
            "  {:>8} {:>18} {:>18}",
            "BDP", "Adoption (%)", "Inflation (%)"
        )?;
        for p in &self.points {
            writeln!(
                f,
                "  {:>8.0} {:>9.1} ± {:>5.1}  {:>9.2} ± {:>5.2}",
                p.bdp_amount, p.adoption_mean, p.adoption_std, p.inflation_mean, p.inflation_std
            )?;
        }
        if let Some(peak) = self.adoption_peak() {
            let shape = if self.is_monotonic() {
                "monotonic"
            } else {
                "non-monotonic"
            };
            writeln!(
                f,
                "  Peak adoption at BDP={:.0} ({}), response is {}",
                peak.bdp_amount, peak.label, shape
            )?;
        }
        Ok(())
    }
}
