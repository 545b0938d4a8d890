use super::model::Cell;

// ---------------------------------------------------------------------------
// RateSeries – rate per LED trigger versus HV
// ---------------------------------------------------------------------------

/// Background-subtracted rate per LED trigger, one point per HV setting.
///
/// The four vectors are parallel; `x` is strictly ascending and `x_err` is
/// all zeros (HV settings are taken as exact).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateSeries {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub x_err: Vec<f64>,
    pub y_err: Vec<f64>,
}

impl RateSeries {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    fn push(&mut self, x: f64, y: f64, y_err: f64) {
        self.x.push(x);
        self.y.push(y);
        self.x_err.push(0.0);
        self.y_err.push(y_err);
    }

    /// Largest rate in the series, if any.
    pub fn peak(&self) -> Option<f64> {
        self.y.iter().copied().reduce(f64::max)
    }

    /// Scale rates and their errors so the peak rate becomes 1.
    ///
    /// Returns `None` for an empty series or when the peak is zero or not
    /// finite, since there is nothing meaningful to divide by.
    pub fn normalized(&self) -> Option<RateSeries> {
        let peak = self.peak()?;
        if peak == 0.0 || !peak.is_finite() {
            return None;
        }
        Some(RateSeries {
            x: self.x.clone(),
            y: self.y.iter().map(|y| y / peak).collect(),
            x_err: self.x_err.clone(),
            y_err: self.y_err.iter().map(|e| e / peak).collect(),
        })
    }
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Mean and population variance, ignoring NaN samples. Both are NaN when no
/// usable sample remains.
pub fn mean_and_var(samples: &[f64]) -> (f64, f64) {
    let (n, sum) = samples
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0usize, 0.0), |(n, s), v| (n + 1, s + v));
    if n == 0 {
        return (f64::NAN, f64::NAN);
    }
    let mean = sum / n as f64;
    let var = samples
        .iter()
        .filter(|v| !v.is_nan())
        .map(|v| (v - mean).powi(2))
        .sum::<f64>()
        / n as f64;
    (mean, var)
}

// ---------------------------------------------------------------------------
// Rate computation
// ---------------------------------------------------------------------------

/// Samples collected at one HV setting.
#[derive(Debug, Default)]
struct HvGroup {
    background: Vec<f64>,
    signal: Vec<f64>,
    led: Vec<f64>,
}

/// Why a group produced no rate point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Undefined {
    NoBackground,
    ZeroLedMean,
    NotFinite,
}

impl std::fmt::Display for Undefined {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Undefined::NoBackground => write!(f, "no background readings"),
            Undefined::ZeroLedMean => write!(f, "mean LED count is zero"),
            Undefined::NotFinite => write!(f, "rate is not finite"),
        }
    }
}

impl HvGroup {
    /// (rate, standard error), propagating the three variances as
    /// independent.
    fn rate(&self) -> Result<(f64, f64), Undefined> {
        if self.background.is_empty() {
            return Err(Undefined::NoBackground);
        }
        let (bkg, var_bkg) = mean_and_var(&self.background);
        let (sig, var_sig) = mean_and_var(&self.signal);
        let (led, var_led) = mean_and_var(&self.led);
        if led == 0.0 {
            return Err(Undefined::ZeroLedMean);
        }

        let rate = (sig - bkg) / led;
        let led2 = led * led;
        let var = var_sig / led2 + var_bkg / led2 + var_led / led2 * rate * rate;
        if !rate.is_finite() || !var.is_finite() {
            return Err(Undefined::NotFinite);
        }
        Ok((rate, var.sqrt()))
    }
}

/// Background-subtracted rate per LED trigger for one signal column.
///
/// `hv`, `counts` and `led` are parallel columns; `hv` should already be the
/// absolute setting. At each distinct HV, rows with a present non-negative
/// count are split into background (LED == 0) and signal (LED != 0). HV
/// settings without signal rows are dropped. Settings whose rate is undefined
/// (no background, zero LED mean, non-finite result) are dropped with a
/// warning naming `column`.
pub fn calc_rate(hv: &[Cell], counts: &[Cell], led: &[Cell], column: &str) -> RateSeries {
    let mut settings: Vec<f64> = hv.iter().flatten().copied().filter(|v| !v.is_nan()).collect();
    settings.sort_by(f64::total_cmp);
    settings.dedup();

    let mut series = RateSeries::default();
    for setting in settings {
        let mut group = HvGroup::default();
        for ((h, c), l) in hv.iter().zip(counts).zip(led) {
            if *h != Some(setting) {
                continue;
            }
            let Some(count) = c.filter(|c| *c >= 0.0) else {
                continue;
            };
            match l {
                None => log::debug!("{column}: HV {setting}: row without LED value skipped"),
                Some(l) if *l == 0.0 => group.background.push(count),
                Some(l) => {
                    group.signal.push(count);
                    group.led.push(*l);
                }
            }
        }

        if group.signal.is_empty() {
            log::debug!("{column}: HV {setting}: no LED-triggered readings");
            continue;
        }
        match group.rate() {
            Ok((rate, err)) => {
                log::trace!("{column}: HV {setting}: rate {rate} +- {err}");
                series.push(setting, rate, err);
            }
            Err(why) => log::warn!(
                "{column}: HV {setting}: rate undefined ({why}); bkg {:?} cts {:?} led {:?}",
                group.background,
                group.signal,
                group.led
            ),
        }
    }
    series
}
