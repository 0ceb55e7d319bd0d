use iiuc_bus::schedule::{
    filter, FilterState, Pager, ScheduleDataset, Selection, PAGE_SIZE,
};
use proptest::prelude::*;
use proptest::sample::select;
use regex::Regex;
use serde_json::Value;

const BUNDLED: &str = include_str!("../data/bus_schedules.json");

fn dataset() -> ScheduleDataset {
    ScheduleDataset::bundled().unwrap()
}

/// Raw filter choices. `None` stands for "All".
#[derive(Debug, Clone, Default)]
struct Choice {
    search: &'static str,
    direction: Option<&'static str>,
    gender: Option<&'static str>,
    bus_type: Option<&'static str>,
    schedule_type: Option<&'static str>,
    route: Option<&'static str>,
}

impl Choice {
    fn state(&self) -> FilterState {
        let parse = |v: Option<&str>| v.unwrap_or("All").to_string();
        FilterState {
            search_term: self.search.to_string(),
            direction: parse(self.direction).parse().unwrap(),
            gender: parse(self.gender).parse().unwrap(),
            bus_type: parse(self.bus_type).parse().unwrap(),
            schedule_type: parse(self.schedule_type).parse().unwrap(),
            route_filter: parse(self.route).parse().unwrap(),
        }
    }
}

/// The timetable search rules written out directly against the raw JSON rows.
fn reference_ids(choice: &Choice) -> Vec<String> {
    let rows: Vec<Value> = serde_json::from_str(BUNDLED).unwrap();
    let morning = Regex::new(r"^[6-9]:").unwrap();
    let afternoon = Regex::new(r"^1[0-6]:").unwrap();
    let evening = Regex::new(r"^1[7-9]:|^2[0-3]:").unwrap();

    rows.iter()
        .filter(|row| {
            let field = |key: &str| row.get(key).and_then(Value::as_str);
            let lower = |key: &str| field(key).map(str::to_lowercase);
            let time = field("time").unwrap_or_default();
            let needle = choice.search.to_lowercase().trim().to_string();
            let has = |key: &str| lower(key).is_some_and(|v| v.contains(&needle));

            let search = choice.search.is_empty()
                || ["time", "startingPoint", "route", "endPoint", "busType", "remarks", "description"]
                    .iter()
                    .any(|key| has(key))
                || (needle.contains("morning") && morning.is_match(time))
                || (needle.contains("afternoon") && afternoon.is_match(time))
                || (needle.contains("evening") && evening.is_match(time))
                || (needle.contains("ac") && lower("busType").is_some_and(|b| b.contains("ac")))
                || (needle.contains("friday") && field("scheduleType") == Some("Friday"))
                || (needle.contains("regular") && field("scheduleType") == Some("Regular"));

            let exact = |key: &str, wanted: Option<&str>| wanted.is_none() || field(key) == wanted;

            let route = match choice.route {
                None => true,
                Some(wanted) => {
                    let wanted = wanted.to_lowercase();
                    let route = lower("route").unwrap_or_default();
                    route.contains(&wanted)
                        || lower("startingPoint").unwrap_or_default().contains(&wanted)
                        || lower("endPoint").unwrap_or_default().contains(&wanted)
                        || (wanted.contains("bot") && route.contains("bahaddarhat"))
                        || (wanted.contains("bahaddarhat") && route.contains("bot"))
                }
            };

            search
                && exact("direction", choice.direction)
                && exact("gender", choice.gender)
                && exact("busType", choice.bus_type)
                && exact("scheduleType", choice.schedule_type)
                && route
        })
        .filter_map(|row| row.get("id").and_then(Value::as_str).map(str::to_string))
        .collect()
}

fn filtered_ids(state: &FilterState) -> Vec<String> {
    let data = dataset();
    filter(data.records(), state)
        .into_iter()
        .map(|r| r.id.clone())
        .collect()
}

fn maybe(values: Vec<&'static str>) -> impl Strategy<Value = Option<&'static str>> {
    prop_oneof![Just(None), select(values).prop_map(Some)]
}

fn choice() -> impl Strategy<Value = Choice> {
    (
        select(vec![
            "", "7:00", "7:00 AM", "bot", "morning", "afternoon", "evening", "ac", "friday",
            "regular", "agrabad", "IIUC", "shuttle", "xyz",
        ]),
        maybe(vec!["CityToIIUC", "IIUCToCity", "ToUniversity", "FromUniversity"]),
        maybe(vec!["Male", "Female"]),
        maybe(vec!["AC Bus", "Non-AC Bus", "IIUC Bus", "IIUC A&H B"]),
        maybe(vec!["Regular", "Friday"]),
        maybe(vec!["BOT", "Bahaddarhat", "Agrabad", "Chatteswari", "Hathazari"]),
    )
        .prop_map(
            |(search, direction, gender, bus_type, schedule_type, route)| Choice {
                search,
                direction,
                gender,
                bus_type,
                schedule_type,
                route,
            },
        )
}

fn filter_state() -> impl Strategy<Value = FilterState> {
    choice().prop_map(|c| c.state())
}

#[test]
fn test_known_filter_results() {
    let cases = [
        (
            Choice { search: "7:00 AM", ..Default::default() },
            vec!["6", "7", "8", "9", "10", "11"],
        ),
        (Choice { search: "8:00 AM", ..Default::default() }, vec!["f8", "f9"]),
        (
            Choice {
                gender: Some("Female"),
                direction: Some("CityToIIUC"),
                route: Some("BOT"),
                ..Default::default()
            },
            vec!["6", "11"],
        ),
        (
            Choice { search: "ac", ..Default::default() },
            vec!["5", "16", "f8", "f9", "f10", "f11", "f12", "f15", "f21", "f22"],
        ),
        (
            Choice {
                schedule_type: Some("Friday"),
                bus_type: Some("AC Bus"),
                ..Default::default()
            },
            vec!["f9", "f10", "f15", "f21", "f22"],
        ),
        (
            Choice {
                direction: Some("FromUniversity"),
                bus_type: Some("AC Bus"),
                ..Default::default()
            },
            vec!["f15", "f21", "f22"],
        ),
        (
            Choice { route: Some("Agrabad"), ..Default::default() },
            vec!["10", "23", "f3", "f8", "f18", "f25"],
        ),
        (
            Choice {
                schedule_type: Some("Regular"),
                gender: Some("Female"),
                direction: Some("IIUCToCity"),
                ..Default::default()
            },
            vec!["26", "27", "28", "29", "31", "34"],
        ),
        (Choice { search: "evening", ..Default::default() }, vec![]),
    ];

    for (choice, expected) in cases {
        let expected: Vec<String> = expected.into_iter().map(str::to_string).collect();
        assert_eq!(filtered_ids(&choice.state()), expected, "{choice:?}");
        assert_eq!(reference_ids(&choice), expected, "{choice:?}");
    }
}

proptest! {
    #[test]
    fn test_filter_agrees_with_reference_rules(choice in choice()) {
        prop_assert_eq!(filtered_ids(&choice.state()), reference_ids(&choice));
    }

    #[test]
    fn test_extra_dimension_never_widens(state in filter_state()) {
        let data = dataset();
        let narrowed = filter(data.records(), &state);

        let mut wider = state.clone();
        wider.route_filter = Selection::All;
        wider.gender = Selection::All;
        let widened = filter(data.records(), &wider);

        prop_assert!(narrowed.len() <= widened.len());
        for record in &narrowed {
            prop_assert!(widened.iter().any(|r| r.id == record.id));
        }
    }

    #[test]
    fn test_reset_returns_everything(state in filter_state()) {
        let data = dataset();
        let mut state = state;
        state.reset_all_filters();

        prop_assert_eq!(state.active_filter_count(), 0);
        prop_assert_eq!(filter(data.records(), &state).len(), data.len());
    }

    #[test]
    fn test_results_keep_dataset_order(state in filter_state()) {
        let data = dataset();
        let positions: Vec<usize> = filter(data.records(), &state)
            .iter()
            .map(|r| data.records().iter().position(|x| x.id == r.id).unwrap())
            .collect();
        prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_pager_grows_monotonically(total in 0usize..200, steps in 0usize..40) {
        let mut pager = Pager::new(total);
        prop_assert_eq!(pager.display_count(), PAGE_SIZE.min(total));

        let mut previous = pager.display_count();
        for _ in 0..steps {
            pager.load_more();
            prop_assert!(pager.display_count() >= previous);
            prop_assert!(pager.display_count() <= total);
            prop_assert_eq!(pager.has_more(), pager.display_count() < total);
            previous = pager.display_count();
        }

        pager.load_all();
        prop_assert_eq!(pager.display_count(), total);
        prop_assert_eq!(pager.percent_loaded(), 100);
    }

    #[test]
    fn test_resumed_pager_stays_in_range(total in 0usize..200, shown in 0usize..400) {
        let pager = Pager::resume(total, shown);
        prop_assert!(pager.display_count() >= PAGE_SIZE.min(total));
        prop_assert!(pager.display_count() <= total);
    }
}
