use chrono::Duration;

/// Parses a compound duration like `30s`, `10m`, `2h`, `1d`, `1w` or
/// `1h30m`. Dangling digits without a unit make the whole input invalid,
/// and so do totals that do not fit in a [`Duration`].
pub fn parse_duration(input: &str) -> Option<Duration> {
    let input = input.trim().to_lowercase();
    let mut total_seconds: i64 = 0;
    let mut current_number = String::new();

    for c in input.chars() {
        if c.is_ascii_digit() {
            current_number.push(c);
        } else if !current_number.is_empty() {
            let value: i64 = current_number.parse().ok()?;
            current_number.clear();

            let seconds = match c {
                's' => Some(value),
                'm' => value.checked_mul(60),
                'h' => value.checked_mul(3_600),
                'd' => value.checked_mul(86_400),
                'w' => value.checked_mul(604_800),
                _ => return None,
            }?;
            total_seconds = total_seconds.checked_add(seconds)?;
        } else {
            return None;
        }
    }

    if total_seconds > 0 && current_number.is_empty() {
        Duration::try_seconds(total_seconds)
    } else {
        None
    }
}

/// Renders a duration in the same compact units the parser accepts.
/// Negative durations clamp to `0s`.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.num_seconds().max(0);
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{days}d"));
    }
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes}m"));
    }
    if seconds > 0 || parts.is_empty() {
        parts.push(format!("{seconds}s"));
    }

    parts.join(" ")
}

/// Splits a `/remind` argument line into its leading duration and the
/// reminder text: `10m take out the trash`.
pub fn parse_remind_request(args: &str) -> Option<(Duration, String)> {
    let args = args.trim();
    let (duration_part, text) = args.split_once(char::is_whitespace)?;
    let duration = parse_duration(duration_part)?;

    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    Some((duration, text.to_string()))
}
