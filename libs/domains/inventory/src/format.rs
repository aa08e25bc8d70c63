//! Locale-aware display formatting for prices, quantities, dates and text.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

const CACHE_LIMIT: usize = 1024;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
pub enum Locale {
    #[default]
    #[strum(to_string = "es-CL", serialize = "es")]
    #[serde(rename = "es-CL")]
    EsCl,
    #[strum(to_string = "en-US", serialize = "en")]
    #[serde(rename = "en-US")]
    EnUs,
}

impl Locale {
    fn thousands_separator(&self) -> char {
        match self {
            Locale::EsCl => '.',
            Locale::EnUs => ',',
        }
    }

    fn decimal_separator(&self) -> char {
        match self {
            Locale::EsCl => ',',
            Locale::EnUs => '.',
        }
    }

    /// Pesos are shown without cents
    fn currency_decimals(&self) -> usize {
        match self {
            Locale::EsCl => 0,
            Locale::EnUs => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum CacheKind {
    Currency,
    Number(usize),
}

/// Formatter bound to one locale; currency and number output is memoized
#[derive(Debug, Default)]
pub struct Formatter {
    locale: Locale,
    cache: Mutex<HashMap<(CacheKind, u64), String>>,
}

impl Formatter {
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    fn memoized(&self, kind: CacheKind, value: f64, render: impl FnOnce() -> String) -> String {
        let key = (kind, value.to_bits());
        if let Ok(cache) = self.cache.lock() {
            if let Some(hit) = cache.get(&key) {
                return hit.clone();
            }
        }

        let rendered = render();
        if let Ok(mut cache) = self.cache.lock() {
            if cache.len() >= CACHE_LIMIT {
                cache.clear();
            }
            cache.insert(key, rendered.clone());
        }
        rendered
    }

    /// Cached entries, for diagnostics
    pub fn cached_entries(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }

    /// `$12.990` (es-CL) or `$12,990.00` (en-US); non-finite values render as `$0`
    pub fn currency(&self, amount: f64) -> String {
        self.memoized(CacheKind::Currency, amount, || {
            let amount = if amount.is_finite() { amount } else { 0.0 };
            let digits = self.group(amount.abs(), self.locale.currency_decimals());
            if amount < 0.0 && digits.chars().any(|c| c.is_ascii_digit() && c != '0') {
                format!("-${digits}")
            } else {
                format!("${digits}")
            }
        })
    }

    /// Grouped number with a fixed number of decimals
    pub fn number(&self, value: f64, decimals: usize) -> String {
        self.memoized(CacheKind::Number(decimals), value, || {
            let value = if value.is_finite() { value } else { 0.0 };
            let digits = self.group(value.abs(), decimals);
            if value < 0.0 && digits.chars().any(|c| c.is_ascii_digit() && c != '0') {
                format!("-{digits}")
            } else {
                digits
            }
        })
    }

    /// `value` is already a percentage (12.5 → "12,5 %")
    pub fn percentage(&self, value: f64, decimals: usize) -> String {
        let number = self.number(value, decimals);
        match self.locale {
            Locale::EsCl => format!("{number} %"),
            Locale::EnUs => format!("{number}%"),
        }
    }

    pub fn date(&self, value: &DateTime<Utc>) -> String {
        match self.locale {
            Locale::EsCl => value.format("%d-%m-%Y").to_string(),
            Locale::EnUs => value.format("%m/%d/%Y").to_string(),
        }
    }

    pub fn date_time(&self, value: &DateTime<Utc>) -> String {
        format!("{} {}", self.date(value), value.format("%H:%M"))
    }

    /// "hace 3 días" / "3 days ago"
    pub fn relative_time(&self, value: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
        let elapsed = *now - *value;
        let (amount, unit_es, unit_en) = if elapsed.num_seconds() < 60 {
            return match self.locale {
                Locale::EsCl => "hace un momento".to_string(),
                Locale::EnUs => "just now".to_string(),
            };
        } else if elapsed.num_minutes() < 60 {
            (elapsed.num_minutes(), ("minuto", "minutos"), ("minute", "minutes"))
        } else if elapsed.num_hours() < 24 {
            (elapsed.num_hours(), ("hora", "horas"), ("hour", "hours"))
        } else if elapsed.num_days() < 30 {
            (elapsed.num_days(), ("día", "días"), ("day", "days"))
        } else if elapsed.num_days() < 365 {
            (elapsed.num_days() / 30, ("mes", "meses"), ("month", "months"))
        } else {
            (elapsed.num_days() / 365, ("año", "años"), ("year", "years"))
        };

        match self.locale {
            Locale::EsCl => {
                let unit = if amount == 1 { unit_es.0 } else { unit_es.1 };
                format!("hace {amount} {unit}")
            }
            Locale::EnUs => {
                let unit = if amount == 1 { unit_en.0 } else { unit_en.1 };
                format!("{amount} {unit} ago")
            }
        }
    }

    /// Human-readable byte size with one decimal
    pub fn file_size(&self, bytes: u64) -> String {
        const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
        if bytes < 1024 {
            return format!("{bytes} B");
        }
        let mut size = bytes as f64;
        let mut unit = 0;
        while size >= 1024.0 && unit < UNITS.len() - 1 {
            size /= 1024.0;
            unit += 1;
        }
        format!("{} {}", self.number(size, 1), UNITS[unit])
    }

    fn group(&self, value: f64, decimals: usize) -> String {
        let fixed = format!("{value:.decimals$}");
        let (int_part, frac_part) = match fixed.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (fixed.as_str(), None),
        };

        let sep = self.locale.thousands_separator();
        let len = int_part.len();
        let mut grouped = String::with_capacity(len + len / 3 + decimals + 1);
        for (i, ch) in int_part.chars().enumerate() {
            if i > 0 && (len - i) % 3 == 0 {
                grouped.push(sep);
            }
            grouped.push(ch);
        }
        if let Some(frac) = frac_part {
            grouped.push(self.locale.decimal_separator());
            grouped.push_str(frac);
        }
        grouped
    }
}

/// Cut `text` to at most `max` characters, ending in "..." when shortened
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    if max <= 3 {
        return text.chars().take(max).collect();
    }
    let kept: String = text.chars().take(max - 3).collect();
    format!("{}...", kept.trim_end())
}

/// Upper-case the first letter, lower-case the rest
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
