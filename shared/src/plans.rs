//! Static investment plan catalog: display names and fixed monthly return
//! rates. Pure lookups, no state.

/// Rate applied when a stored plan code is not in the catalog.
pub const DEFAULT_RETURN_RATE: f64 = 5.0;

/// Human-readable plan name; unrecognized codes are echoed back.
pub fn display_name(code: &str) -> String {
    match code {
        "starter" => "Starter Plan".to_string(),
        "silver" => "Silver Plan".to_string(),
        "bonus" => "Bonus Plan".to_string(),
        "flexible" => "Flexible Plan".to_string(),
        other => other.to_string(),
    }
}

/// Fixed nominal monthly return rate in percent.
pub fn monthly_return_rate(code: &str) -> f64 {
    match code {
        "starter" => 6.5,
        "silver" => 10.0,
        "bonus" => 15.0,
        "flexible" => 21.5,
        _ => DEFAULT_RETURN_RATE,
    }
}

/// Monthly return in currency units: amount * rate / 100.
pub fn monthly_return_amount(amount: i64, code: &str) -> f64 {
    amount as f64 * monthly_return_rate(code) / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rates_match_catalog() {
        assert_eq!(monthly_return_rate("starter"), 6.5);
        assert_eq!(monthly_return_rate("silver"), 10.0);
        assert_eq!(monthly_return_rate("bonus"), 15.0);
        assert_eq!(monthly_return_rate("flexible"), 21.5);
    }

    #[test]
    fn unknown_code_falls_back() {
        assert_eq!(monthly_return_rate("unknown"), DEFAULT_RETURN_RATE);
        assert_eq!(display_name("gold"), "gold");
    }

    #[test]
    fn display_names() {
        assert_eq!(display_name("starter"), "Starter Plan");
        assert_eq!(display_name("flexible"), "Flexible Plan");
    }

    #[test]
    fn monthly_return_amounts() {
        assert_eq!(monthly_return_amount(1000, "silver"), 100.0);
        assert_eq!(monthly_return_amount(2000, "silver"), 200.0);
        assert_eq!(monthly_return_amount(100, "starter"), 6.5);
        assert_eq!(monthly_return_amount(1000, "unknown"), 50.0);
    }
}
