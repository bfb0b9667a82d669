#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::NaiveDate;
    use proptest::prelude::*;
    use serde_json::json;

    use crate::models::{ingest, PlayEvent, RawPlayback, TrackIdentity};
    use crate::services::aggregation::{
        aggregate_by_day, aggregate_by_year, top_tracks_for_day, years_present, YearFilter,
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn event(ts: &str, ms_played: u64, track: &str) -> PlayEvent {
        PlayEvent::try_from(RawPlayback::track(ts, ms_played, track)).unwrap()
    }

    fn track(name: &str) -> TrackIdentity {
        TrackIdentity::named(name)
    }

    #[test]
    fn test_same_day_plays_are_merged() {
        let events = vec![
            event("2024-01-01T10:00:00Z", 1000, "A"),
            event("2024-01-01T11:00:00Z", 2000, "A"),
        ];

        let days = aggregate_by_day(&events);

        assert_eq!(days.len(), 1);
        let day = days.get(date(2024, 1, 1)).unwrap();
        assert_eq!(day.total_playtime_ms, 3000);
        let stats = day.tracks[&track("A")];
        assert_eq!(stats.plays, 2);
        assert_eq!(stats.playtime_ms, 3000);
    }

    #[test]
    fn test_different_days_aggregate_independently() {
        let events = vec![
            event("2024-01-01T10:00:00Z", 1000, "A"),
            event("2024-03-05T22:00:00Z", 4000, "A"),
        ];

        let days = aggregate_by_day(&events);
        assert_eq!(days.len(), 2);
        assert_eq!(days.get(date(2024, 1, 1)).unwrap().total_playtime_ms, 1000);
        assert_eq!(days.get(date(2024, 3, 5)).unwrap().total_playtime_ms, 4000);

        let year = aggregate_by_year(&events, YearFilter::Year(2024));
        assert_eq!(year[&track("A")], 5000);
    }

    #[test]
    fn test_days_iterate_in_date_order() {
        let events = vec![
            event("2024-02-01T10:00:00Z", 1, "A"),
            event("2023-12-31T10:00:00Z", 1, "A"),
            event("2024-01-15T10:00:00Z", 1, "A"),
        ];
        let days = aggregate_by_day(&events);
        let dates: Vec<NaiveDate> = days.iter().map(|d| d.date).collect();
        assert_eq!(
            dates,
            vec![date(2023, 12, 31), date(2024, 1, 15), date(2024, 2, 1)]
        );
        assert_eq!(days.first_date(), Some(date(2023, 12, 31)));
        assert_eq!(days.last_date(), Some(date(2024, 2, 1)));
    }

    #[test]
    fn test_unidentified_plays_use_sentinel() {
        let raw = RawPlayback {
            ts: "2024-01-01T10:00:00Z".to_string(),
            ms_played: 500,
            master_metadata_track_name: None,
            episode_name: None,
        };
        let events = vec![
            PlayEvent::try_from(raw.clone()).unwrap(),
            PlayEvent::try_from(raw).unwrap(),
        ];

        let days = aggregate_by_day(&events);
        let stats = days.get(date(2024, 1, 1)).unwrap().tracks[&TrackIdentity::Unknown];
        assert_eq!(stats.plays, 2);
        assert_eq!(stats.playtime_ms, 1000);

        // Every unidentified play is counted, not just the first one.
        let year = aggregate_by_year(&events, YearFilter::AllTime);
        assert_eq!(year[&TrackIdentity::Unknown], 1000);
    }

    #[test]
    fn test_track_and_episode_with_same_name_group_together() {
        let events = vec![
            event("2024-01-01T10:00:00Z", 1000, "Intro"),
            PlayEvent::try_from(RawPlayback::episode("2024-01-01T11:00:00Z", 2000, "Intro")).unwrap(),
        ];
        let days = aggregate_by_day(&events);

        let top = top_tracks_for_day(&days, date(2024, 1, 1), 10);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].identity.name(), "Intro");
        assert_eq!(top[0].plays, 2);
        assert_eq!(top[0].playtime_ms, 3000);

        let year = aggregate_by_year(&events, YearFilter::AllTime);
        assert_eq!(year.len(), 1);
        assert_eq!(year[&track("Intro")], 3000);
    }

    #[test]
    fn test_extreme_playtime_saturates() {
        let values = vec![
            json!({"ts": "2024-01-01T10:00:00Z", "ms_played": u64::MAX, "master_metadata_track_name": "A"}),
            json!({"ts": "2024-01-01T11:00:00Z", "ms_played": 1, "master_metadata_track_name": "A"}),
            json!({"ts": "2024-01-02T11:00:00Z", "ms_played": 5, "master_metadata_track_name": "A"}),
        ];
        let dataset = ingest(values);
        assert_eq!(dataset.events.len(), 3);
        assert_eq!(dataset.total_playtime_ms(), u64::MAX);

        let days = aggregate_by_day(&dataset.events);
        let day = days.get(date(2024, 1, 1)).unwrap();
        assert_eq!(day.total_playtime_ms, u64::MAX);
        assert_eq!(day.tracks[&track("A")].playtime_ms, u64::MAX);
        assert_eq!(day.tracks[&track("A")].plays, 2);
        assert_eq!(days.total_playtime_ms(), u64::MAX);

        let year = aggregate_by_year(&dataset.events, YearFilter::Year(2024));
        assert_eq!(year[&track("A")], u64::MAX);
        assert_eq!(top_tracks_for_day(&days, date(2024, 1, 1), 1)[0].playtime_ms, u64::MAX);
    }

    #[test]
    fn test_top_tracks_ordering_and_limit() {
        let events = vec![
            event("2024-01-01T01:00:00Z", 100, "A"),
            event("2024-01-01T02:00:00Z", 100, "A"),
            event("2024-01-01T03:00:00Z", 900, "B"),
            event("2024-01-01T04:00:00Z", 100, "B"),
            event("2024-01-01T05:00:00Z", 5000, "C"),
            event("2024-01-01T06:00:00Z", 50, "D"),
        ];
        let days = aggregate_by_day(&events);

        let top = top_tracks_for_day(&days, date(2024, 1, 1), 3);
        let names: Vec<&str> = top.iter().map(|t| t.identity.name()).collect();
        // B and A both have two plays; B wins on playtime.
        assert_eq!(names, vec!["B", "A", "C"]);
        assert_eq!(top[0].plays, 2);
        assert_eq!(top[0].playtime_ms, 1000);
    }

    #[test]
    fn test_top_tracks_full_ties_are_ordered_by_name() {
        let events = vec![
            event("2024-01-01T01:00:00Z", 100, "zeta"),
            event("2024-01-01T02:00:00Z", 100, "alpha"),
        ];
        let days = aggregate_by_day(&events);
        let top = top_tracks_for_day(&days, date(2024, 1, 1), 10);
        assert_eq!(top[0].identity.name(), "alpha");
        assert_eq!(top[1].identity.name(), "zeta");
    }

    #[test]
    fn test_top_tracks_for_missing_day_is_empty() {
        let days = aggregate_by_day(&[event("2024-01-01T01:00:00Z", 100, "A")]);
        assert!(top_tracks_for_day(&days, date(2024, 1, 2), 100).is_empty());
        assert!(top_tracks_for_day(&days, date(2024, 1, 1), 0).is_empty());
    }

    #[test]
    fn test_year_filter_excludes_other_years() {
        let events = vec![
            event("2023-12-31T23:59:59Z", 100, "A"),
            event("2024-01-01T00:00:00Z", 200, "A"),
            event("2024-06-01T00:00:00Z", 300, "B"),
        ];

        let y2023 = aggregate_by_year(&events, YearFilter::Year(2023));
        assert_eq!(y2023.len(), 1);
        assert_eq!(y2023[&track("A")], 100);
        assert!(!y2023.contains_key(&track("B")));

        let all = aggregate_by_year(&events, YearFilter::AllTime);
        assert_eq!(all[&track("A")], 300);
        assert_eq!(all[&track("B")], 300);

        assert!(aggregate_by_year(&events, YearFilter::Year(1999)).is_empty());
    }

    #[test]
    fn test_year_filter_wire_value() {
        assert_eq!(YearFilter::from(0), YearFilter::AllTime);
        assert_eq!(YearFilter::from(2024), YearFilter::Year(2024));
        assert_eq!(YearFilter::AllTime.value(), 0);
        assert_eq!(serde_json::to_string(&YearFilter::Year(2021)).unwrap(), "2021");
        let parsed: YearFilter = serde_json::from_str("0").unwrap();
        assert_eq!(parsed, YearFilter::AllTime);
        assert_eq!(YearFilter::AllTime.to_string(), "All time");
    }

    #[test]
    fn test_years_present_descending() {
        let events = vec![
            event("2022-05-01T00:00:00Z", 1, "A"),
            event("2024-05-01T00:00:00Z", 1, "A"),
            event("2022-06-01T00:00:00Z", 1, "A"),
        ];
        assert_eq!(years_present(&events), vec![2024, 2022]);
        assert!(years_present(&[]).is_empty());
    }

    #[test]
    fn test_ingested_rejects_do_not_reach_totals() {
        let values = vec![
            serde_json::json!({"ts": "2024-01-01T00:00:00Z", "ms_played": 10, "master_metadata_track_name": "A"}),
            serde_json::json!({"ts": "garbage", "ms_played": 99999}),
        ];
        let dataset = ingest(values);
        let days = aggregate_by_day(&dataset.events);
        assert_eq!(days.total_playtime_ms(), 10);
    }

    fn arb_event() -> impl Strategy<Value = PlayEvent> {
        (0i64..900, 0u64..10_000_000, prop::option::of(0usize..6)).prop_map(
            |(offset, ms_played, name)| {
                let date = date(2022, 1, 1) + chrono::Duration::days(offset);
                PlayEvent {
                    timestamp: format!("{}T12:00:00Z", date),
                    date,
                    ms_played,
                    identity: name
                        .map(|i| TrackIdentity::named(format!("track-{}", i)))
                        .unwrap_or(TrackIdentity::Unknown),
                }
            },
        )
    }

    proptest! {
        #[test]
        fn prop_day_totals_sum_to_input(events in prop::collection::vec(arb_event(), 0..200)) {
            let days = aggregate_by_day(&events);
            let expected: u64 = events.iter().map(|e| e.ms_played).sum();
            prop_assert_eq!(days.total_playtime_ms(), expected);
        }

        #[test]
        fn prop_day_total_equals_track_sum(events in prop::collection::vec(arb_event(), 0..200)) {
            let days = aggregate_by_day(&events);
            for day in days.iter() {
                let tracks: u64 = day.tracks.values().map(|t| t.playtime_ms).sum();
                prop_assert_eq!(day.total_playtime_ms, tracks);
            }
        }

        #[test]
        fn prop_top_tracks_bounded_and_sorted(
            events in prop::collection::vec(arb_event(), 1..200),
            n in 0usize..8,
        ) {
            let days = aggregate_by_day(&events);
            for day in days.iter() {
                let top = top_tracks_for_day(&days, day.date, n);
                prop_assert!(top.len() <= n);
                for pair in top.windows(2) {
                    prop_assert!(
                        (pair[0].plays, pair[0].playtime_ms) >= (pair[1].plays, pair[1].playtime_ms)
                    );
                }
            }
        }

        #[test]
        fn prop_all_time_is_sum_of_years(events in prop::collection::vec(arb_event(), 0..200)) {
            let all = aggregate_by_year(&events, YearFilter::AllTime);
            let mut summed: HashMap<TrackIdentity, u64> = HashMap::new();
            for year in years_present(&events) {
                for (identity, ms) in aggregate_by_year(&events, YearFilter::Year(year)) {
                    *summed.entry(identity).or_insert(0) += ms;
                }
            }
            prop_assert_eq!(all, summed);
        }
    }
}
