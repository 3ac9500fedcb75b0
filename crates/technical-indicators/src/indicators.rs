//! Pure indicator math over close-price slices. Every function is a
//! deterministic function of its input; series too short for the requested
//! window come back empty (or `None`) instead of erroring.

/// Simple Moving Average
pub fn sma(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < period {
        return vec![];
    }

    data.windows(period)
        .map(|w| w.iter().sum::<f64>() / period as f64)
        .collect()
}

/// Exponential Moving Average, seeded with the SMA of the first `period`
/// values. Output is aligned to input index `period - 1`.
pub fn ema(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < period {
        return vec![];
    }

    let alpha = 2.0 / (period as f64 + 1.0);
    let seed: f64 = data[..period].iter().sum::<f64>() / period as f64;

    let mut result = Vec::with_capacity(data.len() - period + 1);
    result.push(seed);
    for &value in &data[period..] {
        let prev = *result.last().unwrap();
        result.push(prev + alpha * (value - prev));
    }
    result
}

/// Wilder Relative Strength Index, bounded [0, 100]
pub fn rsi(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() <= period {
        return vec![];
    }

    let mut gains = Vec::with_capacity(data.len() - 1);
    let mut losses = Vec::with_capacity(data.len() - 1);
    for pair in data.windows(2) {
        let change = pair[1] - pair[0];
        gains.push(change.max(0.0));
        losses.push((-change).max(0.0));
    }

    let to_rsi = |avg_gain: f64, avg_loss: f64| {
        if avg_loss == 0.0 {
            100.0
        } else {
            100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
        }
    };

    let mut avg_gain = gains[..period].iter().sum::<f64>() / period as f64;
    let mut avg_loss = losses[..period].iter().sum::<f64>() / period as f64;

    let mut result = Vec::with_capacity(gains.len() - period + 1);
    result.push(to_rsi(avg_gain, avg_loss));

    for i in period..gains.len() {
        avg_gain = (avg_gain * (period - 1) as f64 + gains[i]) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + losses[i]) / period as f64;
        result.push(to_rsi(avg_gain, avg_loss));
    }

    result
}

/// MACD line, signal line and histogram
pub struct MacdSeries {
    pub line: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

pub fn macd(data: &[f64], fast_period: usize, slow_period: usize, signal_period: usize) -> MacdSeries {
    if fast_period == 0 || slow_period == 0 || signal_period == 0 || slow_period <= fast_period {
        return MacdSeries { line: vec![], signal: vec![], histogram: vec![] };
    }

    let ema_fast = ema(data, fast_period);
    let ema_slow = ema(data, slow_period);

    // ema_fast starts at input index fast_period-1, ema_slow at slow_period-1;
    // shift the fast series so both align on the same session.
    let offset = slow_period - fast_period;
    let line: Vec<f64> = ema_slow
        .iter()
        .enumerate()
        .map(|(i, slow)| ema_fast[i + offset] - slow)
        .collect();

    let signal = ema(&line, signal_period);

    let hist_offset = line.len() - signal.len();
    let histogram: Vec<f64> = signal
        .iter()
        .enumerate()
        .map(|(i, s)| line[i + hist_offset] - s)
        .collect();

    MacdSeries { line, signal, histogram }
}

/// Bollinger Bands: `period`-SMA middle band, upper/lower at `width` standard
/// deviations.
pub struct BollingerSeries {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

pub fn bollinger(data: &[f64], period: usize, width: f64) -> BollingerSeries {
    if period == 0 || data.len() < period {
        return BollingerSeries { upper: vec![], middle: vec![], lower: vec![] };
    }

    let middle = sma(data, period);
    let mut upper = Vec::with_capacity(middle.len());
    let mut lower = Vec::with_capacity(middle.len());

    for (i, window) in data.windows(period).enumerate() {
        let mean = middle[i];
        let variance = window.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / period as f64;
        let std = variance.sqrt();
        upper.push(mean + width * std);
        lower.push(mean - width * std);
    }

    BollingerSeries { upper, middle, lower }
}

/// Annualized volatility of daily log returns over the trailing `window`
/// sessions, in percent. `None` when fewer than `window` closes exist or the
/// closes are not strictly positive.
pub fn annualized_volatility_pct(closes: &[f64], window: usize) -> Option<f64> {
    if window < 3 || closes.len() < window {
        return None;
    }

    let tail = &closes[closes.len() - window..];
    let mut returns = Vec::with_capacity(window - 1);
    for pair in tail.windows(2) {
        if pair[0] <= 0.0 || pair[1] <= 0.0 {
            return None;
        }
        returns.push((pair[1] / pair[0]).ln());
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    // Sample variance: the trailing window is a sample of the return process
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);

    Some(variance.sqrt() * (252.0_f64).sqrt() * 100.0)
}
