use super::{
    types::{Config, RunConfig, RunPlan},
    ConfigError,
};
use crate::filter::FilterCriteria;

/// Validate configuration
/// Currently validates:
/// - Catalog section exists (enforced by serde) and carries an API key
/// - Page size is within the provider's 1..=50 range
/// - Timeout is not 0
///
/// The `[run]` section is validated separately by [`validate_run`] when a run
/// starts, so a config without keywords can still be loaded.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.catalog.api_key.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "catalog.api_key cannot be empty".to_string(),
        ));
    }

    if !(1..=50).contains(&config.catalog.page_size) {
        return Err(ConfigError::ValidationError(format!(
            "catalog.page_size must be between 1 and 50, got {}",
            config.catalog.page_size
        )));
    }

    if config.catalog.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "catalog.timeout_secs cannot be 0".to_string(),
        ));
    }

    Ok(())
}

/// Validate run options and convert them into a typed [`RunPlan`].
pub fn validate_run(run: &RunConfig) -> Result<RunPlan, ConfigError> {
    let keywords: Vec<String> = run
        .keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect();
    if keywords.is_empty() {
        return Err(ConfigError::ValidationError(
            "at least one keyword is required".to_string(),
        ));
    }

    let views = bounds("views", run.views_min, run.views_max)?;
    let subs = bounds("subs", run.subs_min, run.subs_max)?;
    let custom = bounds("duration", run.duration_min, run.duration_max)?;
    let (duration_min, duration_max) = run.duration.minute_bounds(custom.0, custom.1);

    if run.pages_per_keyword < 1 {
        return Err(ConfigError::ValidationError(format!(
            "pages_per_keyword must be at least 1, got {}",
            run.pages_per_keyword
        )));
    }
    let pages_per_keyword = u32::try_from(run.pages_per_keyword).map_err(|_| {
        ConfigError::ValidationError(format!(
            "pages_per_keyword is too large: {}",
            run.pages_per_keyword
        ))
    })?;

    let daily_quota_cap = non_negative("daily_quota_cap", run.daily_quota_cap)?;

    let criteria = FilterCriteria {
        views_min: views.0,
        views_max: views.1,
        duration_min_minutes: duration_min,
        duration_max_minutes: duration_max,
        subs_min: subs.0,
        subs_max: subs.1,
        region: non_blank(run.region.as_deref()),
        language: non_blank(run.language.as_deref()),
        skip_hidden_subscribers: run.skip_hidden_subscribers,
    };

    Ok(RunPlan {
        keywords,
        criteria,
        pages_per_keyword,
        daily_quota_cap,
        fresh_search: run.fresh_search,
    })
}

fn non_negative(name: &str, value: i64) -> Result<u64, ConfigError> {
    u64::try_from(value)
        .map_err(|_| ConfigError::ValidationError(format!("{} cannot be negative, got {}", name, value)))
}

fn bounds(
    name: &str,
    min: Option<i64>,
    max: Option<i64>,
) -> Result<(Option<u64>, Option<u64>), ConfigError> {
    let min = min
        .map(|v| non_negative(&format!("{}_min", name), v))
        .transpose()?;
    let max = max
        .map(|v| non_negative(&format!("{}_max", name), v))
        .transpose()?;

    if let (Some(lo), Some(hi)) = (min, max) {
        if lo > hi {
            return Err(ConfigError::ValidationError(format!(
                "{}_min ({}) is greater than {}_max ({})",
                name, lo, name, hi
            )));
        }
    }

    Ok((min, max))
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{load_config_from_str, DurationMode};

    fn config() -> Config {
        load_config_from_str(
            r#"
[catalog]
api_key = "key"
"#,
        )
        .unwrap()
    }

    fn run_with_keywords() -> RunConfig {
        RunConfig {
            keywords: vec!["rust".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&config()).is_ok());
    }

    #[test]
    fn test_validate_empty_api_key_fails() {
        let mut config = config();
        config.catalog.api_key = "  ".to_string();
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_page_size_out_of_range_fails() {
        let mut config = config();
        config.catalog.page_size = 51;
        assert!(validate_config(&config).is_err());
        config.catalog.page_size = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_run_requires_keyword() {
        let run = RunConfig {
            keywords: vec!["   ".to_string(), String::new()],
            ..Default::default()
        };
        let err = validate_run(&run).unwrap_err();
        assert!(err.to_string().contains("at least one keyword"));
    }

    #[test]
    fn test_validate_run_trims_keywords() {
        let run = RunConfig {
            keywords: vec!["  lofi ".to_string(), "".to_string(), "jazz".to_string()],
            ..Default::default()
        };
        let plan = validate_run(&run).unwrap();
        assert_eq!(plan.keywords, vec!["lofi", "jazz"]);
    }

    #[test]
    fn test_validate_run_rejects_negative_bounds() {
        let run = RunConfig {
            views_min: Some(-1),
            ..run_with_keywords()
        };
        assert!(matches!(
            validate_run(&run),
            Err(ConfigError::ValidationError(_))
        ));

        let run = RunConfig {
            daily_quota_cap: -5,
            ..run_with_keywords()
        };
        assert!(validate_run(&run).is_err());
    }

    #[test]
    fn test_validate_run_rejects_inverted_bounds() {
        let run = RunConfig {
            subs_min: Some(500),
            subs_max: Some(100),
            ..run_with_keywords()
        };
        let err = validate_run(&run).unwrap_err();
        assert!(err.to_string().contains("subs_min"));
    }

    #[test]
    fn test_validate_run_rejects_zero_pages() {
        let run = RunConfig {
            pages_per_keyword: 0,
            ..run_with_keywords()
        };
        assert!(validate_run(&run).is_err());
    }

    #[test]
    fn test_validate_run_builds_criteria() {
        let run = RunConfig {
            views_min: Some(1000),
            subs_max: Some(10_000),
            duration: DurationMode::Short,
            duration_min: Some(50),
            region: Some("".to_string()),
            language: Some(" en ".to_string()),
            skip_hidden_subscribers: false,
            ..run_with_keywords()
        };
        let plan = validate_run(&run).unwrap();
        assert_eq!(plan.criteria.views_min, Some(1000));
        assert_eq!(plan.criteria.subs_max, Some(10_000));
        // Custom minutes are ignored outside of custom mode.
        assert_eq!(plan.criteria.duration_min_minutes, None);
        assert_eq!(plan.criteria.duration_max_minutes, Some(3));
        assert_eq!(plan.region(), None);
        assert_eq!(plan.language(), Some("en"));
        assert!(!plan.criteria.skip_hidden_subscribers);
        assert_eq!(plan.daily_quota_cap, 9500);
    }
}
