use crate::error::{ActionError, ActionResult};

const BOUNTY_MARKER: &str = "BOUNTY";

/// Лейблы из input приходят одной строкой через запятую.
pub fn split_labels(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// First label, in input order, that mentions BOUNTY in any case.
pub fn find_bounty_label<S: AsRef<str>>(labels: &[S]) -> Option<&str> {
    labels
        .iter()
        .map(|l| l.as_ref())
        .find(|l| l.to_uppercase().contains(BOUNTY_MARKER))
}

/// Everything after the first `$`. Without a `$` the whole label is returned.
pub fn dollar_amount(label: &str) -> &str {
    match label.find('$') {
        Some(i) => &label[i + 1..],
        None => label,
    }
}

pub fn parse_bounty_amount(raw: &str) -> ActionResult<f64> {
    let s = raw.trim();
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(v),
        _ => Err(ActionError::config(format!("invalid bounty amount: `{s}`"))),
    }
}

/// Ищем bounty-лейбл и достаём сумму в USD; отсутствие лейбла — ошибка, не ноль.
pub fn bounty_usd_from_labels<S: AsRef<str>>(labels: &[S]) -> ActionResult<f64> {
    let label = find_bounty_label(labels)
        .ok_or_else(|| ActionError::config("no bounty label found in `labels`"))?;
    parse_bounty_amount(dollar_amount(label))
}
