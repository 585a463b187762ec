//! Filter engine: a pure predicate over enriched records.
//!
//! Checks run in a fixed order and stop at the first failure:
//! views, duration, region, language, hidden subscribers, subscriber bounds.
//! No state is shared between records.

mod types;

pub use types::*;

use std::collections::HashMap;

use crate::catalog::{ItemRecord, OwnerInfo};

/// Evaluate `record` against `criteria`, returning the first failed check.
pub fn evaluate(
    record: &ItemRecord,
    owner: &OwnerInfo,
    criteria: &FilterCriteria,
) -> Result<(), Rejection> {
    if !within(record.view_count, criteria.views_min, criteria.views_max) {
        return Err(Rejection::Views);
    }

    if !within(
        record.duration_minutes(),
        criteria.duration_min_minutes,
        criteria.duration_max_minutes,
    ) {
        return Err(Rejection::Duration);
    }

    // Missing metadata on the record never rejects.
    if let (Some(wanted), Some(actual)) = (&criteria.region, &record.region_code) {
        if wanted != actual {
            return Err(Rejection::Region);
        }
    }

    if let (Some(wanted), Some(actual)) = (&criteria.language, &record.language_code) {
        if wanted != actual {
            return Err(Rejection::Language);
        }
    }

    if criteria.skip_hidden_subscribers && owner.hidden {
        return Err(Rejection::HiddenSubscribers);
    }

    // Unknown subscriber counts pass the bounds.
    if let Some(subs) = owner.subscriber_count {
        if !within(subs, criteria.subs_min, criteria.subs_max) {
            return Err(Rejection::Subscribers);
        }
    }

    Ok(())
}

/// True when `record` passes every check in `criteria`.
pub fn matches(record: &ItemRecord, owner: &OwnerInfo, criteria: &FilterCriteria) -> bool {
    evaluate(record, owner, criteria).is_ok()
}

/// Keep the records that match, in input order.
///
/// Owners missing from `owners` are evaluated as [`OwnerInfo::unknown`].
pub fn filter(
    records: &[ItemRecord],
    owners: &HashMap<String, OwnerInfo>,
    criteria: &FilterCriteria,
) -> Vec<ItemRecord> {
    let unknown = OwnerInfo::unknown();
    records
        .iter()
        .filter(|r| matches(r, owners.get(&r.owner_id).unwrap_or(&unknown), criteria))
        .cloned()
        .collect()
}

fn within(value: u64, min: Option<u64>, max: Option<u64>) -> bool {
    min.is_none_or(|lo| value >= lo) && max.is_none_or(|hi| value <= hi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    fn owner(subs: Option<u64>, hidden: bool) -> OwnerInfo {
        OwnerInfo {
            subscriber_count: subs,
            hidden,
        }
    }

    fn us_record() -> ItemRecord {
        let mut record = fixtures::item_record("abc123", "UC1", 5000, 300);
        record.region_code = Some("US".to_string());
        record
    }

    #[test]
    fn test_views_duration_region_scenario() {
        let record = us_record();
        let criteria = FilterCriteria {
            views_min: Some(1000),
            duration_max_minutes: Some(10),
            region: Some("US".to_string()),
            ..Default::default()
        };
        assert!(matches(&record, &OwnerInfo::unknown(), &criteria));

        let tighter = FilterCriteria {
            duration_max_minutes: Some(4),
            ..criteria
        };
        assert_eq!(
            evaluate(&record, &OwnerInfo::unknown(), &tighter),
            Err(Rejection::Duration)
        );
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let record = us_record();
        let criteria = FilterCriteria {
            views_min: Some(5000),
            views_max: Some(5000),
            duration_min_minutes: Some(5),
            duration_max_minutes: Some(5),
            ..Default::default()
        };
        assert!(matches(&record, &OwnerInfo::unknown(), &criteria));
    }

    #[test]
    fn test_views_out_of_range() {
        let record = us_record();
        let too_few = FilterCriteria {
            views_min: Some(5001),
            ..Default::default()
        };
        let too_many = FilterCriteria {
            views_max: Some(4999),
            ..Default::default()
        };
        assert_eq!(
            evaluate(&record, &OwnerInfo::unknown(), &too_few),
            Err(Rejection::Views)
        );
        assert_eq!(
            evaluate(&record, &OwnerInfo::unknown(), &too_many),
            Err(Rejection::Views)
        );
    }

    #[test]
    fn test_duration_uses_floor_minutes() {
        // 359 seconds is 5 whole minutes.
        let record = fixtures::item_record("v", "UC1", 0, 359);
        let criteria = FilterCriteria {
            duration_max_minutes: Some(5),
            ..Default::default()
        };
        assert!(matches(&record, &OwnerInfo::unknown(), &criteria));
    }

    #[test]
    fn test_region_and_language_skip_missing_metadata() {
        let record = fixtures::item_record("v", "UC1", 0, 60);
        let criteria = FilterCriteria {
            region: Some("DE".to_string()),
            language: Some("de".to_string()),
            ..Default::default()
        };
        assert!(matches(&record, &OwnerInfo::unknown(), &criteria));

        let mut english = record.clone();
        english.language_code = Some("en".to_string());
        assert_eq!(
            evaluate(&english, &OwnerInfo::unknown(), &criteria),
            Err(Rejection::Language)
        );

        let mut french_region = record;
        french_region.region_code = Some("FR".to_string());
        assert_eq!(
            evaluate(&french_region, &OwnerInfo::unknown(), &criteria),
            Err(Rejection::Region)
        );
    }

    #[test]
    fn test_unknown_subscribers_pass_any_bounds() {
        let record = us_record();
        for (min, max) in [(Some(0), Some(0)), (Some(u64::MAX), None), (None, Some(0))] {
            let criteria = FilterCriteria {
                subs_min: min,
                subs_max: max,
                ..Default::default()
            };
            assert!(matches(&record, &owner(None, false), &criteria));
        }
    }

    #[test]
    fn test_hidden_owner_rejected_regardless_of_count() {
        let record = us_record();
        let criteria = FilterCriteria {
            skip_hidden_subscribers: true,
            subs_min: Some(0),
            ..Default::default()
        };
        assert_eq!(
            evaluate(&record, &owner(Some(1_000_000), true), &criteria),
            Err(Rejection::HiddenSubscribers)
        );
        assert_eq!(
            evaluate(&record, &owner(None, true), &criteria),
            Err(Rejection::HiddenSubscribers)
        );

        let allow_hidden = FilterCriteria {
            skip_hidden_subscribers: false,
            ..criteria
        };
        assert!(matches(&record, &owner(None, true), &allow_hidden));
    }

    #[test]
    fn test_known_subscribers_checked_against_bounds() {
        let record = us_record();
        let criteria = FilterCriteria {
            subs_min: Some(100),
            subs_max: Some(1000),
            ..Default::default()
        };
        assert!(matches(&record, &owner(Some(100), false), &criteria));
        assert!(matches(&record, &owner(Some(1000), false), &criteria));
        assert_eq!(
            evaluate(&record, &owner(Some(99), false), &criteria),
            Err(Rejection::Subscribers)
        );
        assert_eq!(
            evaluate(&record, &owner(Some(1001), false), &criteria),
            Err(Rejection::Subscribers)
        );
    }

    #[test]
    fn test_check_order_views_before_hidden() {
        let record = us_record();
        let criteria = FilterCriteria {
            views_min: Some(10_000),
            skip_hidden_subscribers: true,
            ..Default::default()
        };
        assert_eq!(
            evaluate(&record, &owner(None, true), &criteria),
            Err(Rejection::Views)
        );
    }

    #[test]
    fn test_filter_preserves_order_and_is_idempotent() {
        let records = vec![
            fixtures::item_record("a", "UC1", 100, 60),
            fixtures::item_record("b", "UC2", 5000, 60),
            fixtures::item_record("c", "UC1", 9000, 60),
            fixtures::item_record("d", "UC3", 7000, 60),
        ];
        let mut owners = HashMap::new();
        owners.insert("UC1".to_string(), owner(Some(50), false));
        owners.insert("UC2".to_string(), owner(None, true));
        let criteria = FilterCriteria {
            views_min: Some(1000),
            skip_hidden_subscribers: true,
            ..Default::default()
        };

        let once = filter(&records, &owners, &criteria);
        let ids: Vec<_> = once.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "d"]);

        let twice = filter(&once, &owners, &criteria);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_criteria_accepts_everything() {
        let records = vec![
            fixtures::item_record("a", "UC1", 0, 0),
            fixtures::item_record("b", "UC2", u64::MAX, u64::MAX),
        ];
        let kept = filter(&records, &HashMap::new(), &FilterCriteria::default());
        assert_eq!(kept, records);
    }
}
