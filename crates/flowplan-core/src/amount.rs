//! Human-readable amounts.
//!
//! Formatting picks an SI-like prefix from the order of magnitude and rounds
//! to a fixed number of decimals per magnitude, trimming trailing zeros.
//! Parsing accepts `<number><optional prefix><optional unit suffix>` and
//! converts back into the base unit (per second, megawatt, megajoule).

use serde::{Deserialize, Serialize};

/// Largest magnitude accepted by [`parse_amount`], in base units.
pub const MAX_PARSED_AMOUNT: f64 = 1e15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitOfMeasure {
    None,
    Percent,
    Second,
    PerSecond,
    ItemPerSecond,
    FluidPerSecond,
    Megawatt,
    Megajoule,
    Celsius,
}

impl UnitOfMeasure {
    fn is_rate(self) -> bool {
        matches!(
            self,
            UnitOfMeasure::PerSecond | UnitOfMeasure::ItemPerSecond | UnitOfMeasure::FluidPerSecond
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    #[default]
    Second,
    Minute,
    Hour,
    Tick,
}

impl TimeUnit {
    /// Display value per base (per second) value.
    pub fn multiplier(self) -> f64 {
        match self {
            TimeUnit::Second => 1.0,
            TimeUnit::Minute => 60.0,
            TimeUnit::Hour => 3600.0,
            TimeUnit::Tick => 1.0 / 60.0,
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            TimeUnit::Second => "/s",
            TimeUnit::Minute => "/m",
            TimeUnit::Hour => "/h",
            TimeUnit::Tick => "/t",
        }
    }

    fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "/s" => Some(TimeUnit::Second),
            "/m" => Some(TimeUnit::Minute),
            "/h" => Some(TimeUnit::Hour),
            "/t" => Some(TimeUnit::Tick),
            _ => None,
        }
    }
}

/// User-facing display preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub time_unit: TimeUnit,
    /// Items per second carried by one belt, for the `b` suffix.
    pub items_per_belt: f32,
    /// Fluid per second carried by one pipe, for the `p` suffix.
    pub fluid_per_pipe: f32,
    /// Six fixed decimals instead of magnitude rounding.
    pub precise: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            time_unit: TimeUnit::Second,
            items_per_belt: 15.0,
            fluid_per_pipe: 1000.0,
            precise: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

struct FormatSpec {
    prefix: &'static str,
    multiplier: f64,
    decimals: usize,
}

const fn spec(prefix: &'static str, multiplier: f64, decimals: usize) -> FormatSpec {
    FormatSpec {
        prefix,
        multiplier,
        decimals,
    }
}

/// Indexed by `floor(log10(value)) + 8`, covering 1e-8 up to 1e14.
const FORMAT_TABLE: [FormatSpec; 23] = [
    spec("μ", 1e6, 2),
    spec("μ", 1e6, 2),
    spec("μ", 1e6, 2),
    spec("μ", 1e6, 1),
    spec("μ", 1e6, 0),
    spec("", 1.0, 4),
    spec("", 1.0, 3),
    spec("", 1.0, 2),
    spec("", 1.0, 2),
    spec("", 1.0, 1),
    spec("", 1.0, 0),
    spec("k", 1e-3, 2),
    spec("k", 1e-3, 1),
    spec("k", 1e-3, 0),
    spec("M", 1e-6, 2),
    spec("M", 1e-6, 1),
    spec("M", 1e-6, 0),
    spec("G", 1e-9, 2),
    spec("G", 1e-9, 1),
    spec("G", 1e-9, 0),
    spec("T", 1e-12, 2),
    spec("T", 1e-12, 1),
    spec("T", 1e-12, 0),
];

fn display_scale(unit: UnitOfMeasure, settings: &DisplaySettings) -> (f64, &'static str) {
    match unit {
        UnitOfMeasure::None => (1.0, ""),
        UnitOfMeasure::Percent => (100.0, "%"),
        UnitOfMeasure::Second => (1.0, "s"),
        UnitOfMeasure::PerSecond | UnitOfMeasure::ItemPerSecond | UnitOfMeasure::FluidPerSecond => {
            (settings.time_unit.multiplier(), settings.time_unit.suffix())
        }
        UnitOfMeasure::Megawatt => (1e6, "W"),
        UnitOfMeasure::Megajoule => (1e6, "J"),
        UnitOfMeasure::Celsius => (1.0, "°"),
    }
}

fn trim_decimals(mut text: String) -> String {
    if text.contains('.') {
        while text.ends_with('0') {
            text.pop();
        }
        if text.ends_with('.') {
            text.pop();
        }
    }
    if text == "-0" { "0".to_string() } else { text }
}

/// Format `amount`, given in base units, for display.
pub fn format_amount(amount: f32, unit: UnitOfMeasure, settings: &DisplaySettings) -> String {
    let (multiplier, suffix) = display_scale(unit, settings);
    let value = amount as f64 * multiplier;

    if !value.is_finite() {
        return "-".to_string();
    }
    if unit == UnitOfMeasure::Celsius {
        return format!("{value:.0}{suffix}");
    }
    if settings.precise {
        return format!("{value:.6}{suffix}");
    }
    if value == 0.0 {
        return format!("0{suffix}");
    }

    let abs = value.abs();
    let mut exponent = abs.log10().floor() as i32;
    // log10 is not exact at powers of ten
    if 10f64.powi(exponent + 1) <= abs {
        exponent += 1;
    } else if 10f64.powi(exponent) > abs {
        exponent -= 1;
    }
    let index = (exponent as i64 + 8).clamp(0, FORMAT_TABLE.len() as i64 - 1) as usize;
    let spec = &FORMAT_TABLE[index];
    let number = trim_decimals(format!("{:.*}", spec.decimals, value * spec.multiplier));
    format!("{number}{}{suffix}", spec.prefix)
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AmountParseError {
    #[error("empty amount")]
    Empty,
    #[error("invalid number: {0}")]
    InvalidNumber(String),
    #[error("unexpected unit suffix: {0}")]
    UnexpectedSuffix(String),
    #[error("amounts in {0:?} cannot be entered")]
    UnsupportedUnit(UnitOfMeasure),
    #[error("amount {0} is out of range")]
    OutOfRange(f64),
}

fn prefix_multiplier(c: char) -> Option<f64> {
    match c {
        'μ' | 'u' => Some(1e-6),
        'k' | 'K' => Some(1e3),
        'M' => Some(1e6),
        'G' => Some(1e9),
        'T' => Some(1e12),
        _ => None,
    }
}

/// Parse user text into a base-unit amount.
pub fn parse_amount(text: &str, unit: UnitOfMeasure, settings: &DisplaySettings) -> Result<f32, AmountParseError> {
    if unit == UnitOfMeasure::Celsius {
        return Err(AmountParseError::UnsupportedUnit(unit));
    }
    let text: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if text.is_empty() {
        return Err(AmountParseError::Empty);
    }

    let split = text
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_digit() || matches!(c, '.' | '-' | '+')))
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    let (number, mut rest) = text.split_at(split);
    let number: f64 = number
        .parse()
        .map_err(|_| AmountParseError::InvalidNumber(number.to_string()))?;

    let mut value = number;
    if let Some(c) = rest.chars().next()
        && let Some(m) = prefix_multiplier(c)
    {
        value *= m;
        rest = &rest[c.len_utf8()..];
    }

    let base = match rest {
        "" => value / display_scale(unit, settings).0,
        "%" if unit == UnitOfMeasure::Percent => value / 100.0,
        "s" if unit == UnitOfMeasure::Second => value,
        "W" if unit == UnitOfMeasure::Megawatt => value / 1e6,
        "J" if unit == UnitOfMeasure::Megajoule => value / 1e6,
        "b" if unit == UnitOfMeasure::ItemPerSecond => value * settings.items_per_belt as f64,
        "p" if unit == UnitOfMeasure::FluidPerSecond => value * settings.fluid_per_pipe as f64,
        suffix => match TimeUnit::from_suffix(suffix) {
            Some(time) if unit.is_rate() => value / time.multiplier(),
            _ => return Err(AmountParseError::UnexpectedSuffix(suffix.to_string())),
        },
    };

    if !base.is_finite() || base.abs() > MAX_PARSED_AMOUNT {
        return Err(AmountParseError::OutOfRange(base));
    }
    Ok(base as f32)
}
