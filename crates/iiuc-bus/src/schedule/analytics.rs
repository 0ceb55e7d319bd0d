/// Schedule statistics for the teacher dashboard
use super::filter::Selection;
use super::types::{Gender, ScheduleRecord, ScheduleType};
use crate::backend::UserProfile;
use serde::Serialize;
use std::ops::RangeInclusive;

/// Leading hours counted as morning departures.
const MORNING_HOURS: RangeInclusive<u32> = 6..=10;
/// Leading hours counted as afternoon departures. The timetable text is 12-hour,
/// so `1:30 PM` is not an afternoon trip here.
const AFTERNOON_HOURS: RangeInclusive<u32> = 11..=18;
/// Number of starting points listed as busiest.
const TOP_ROUTES: usize = 5;

/// A starting point and how many trips leave from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteFrequency {
    pub starting_point: String,
    pub trips: usize,
}

/// Aggregated timetable and student numbers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleAnalytics {
    pub total_schedules: usize,
    pub regular_schedules: usize,
    pub friday_schedules: usize,
    pub morning_schedules: usize,
    pub afternoon_schedules: usize,
    pub male_schedules: usize,
    pub female_schedules: usize,
    /// Trips open to everyone (no gender tag).
    pub general_schedules: usize,
    pub male_students: usize,
    pub female_students: usize,
    pub top_routes: Vec<RouteFrequency>,
}

impl ScheduleAnalytics {
    pub fn compute(schedules: &[ScheduleRecord], students: &[UserProfile]) -> Self {
        let count = |pred: fn(&ScheduleRecord) -> bool| schedules.iter().filter(|s| pred(s)).count();

        Self {
            total_schedules: schedules.len(),
            regular_schedules: count(|s| s.schedule_type == ScheduleType::Regular),
            friday_schedules: count(|s| s.schedule_type == ScheduleType::Friday),
            morning_schedules: count(|s| in_hours(s, &MORNING_HOURS)),
            afternoon_schedules: count(|s| in_hours(s, &AFTERNOON_HOURS)),
            male_schedules: count(|s| s.gender == Some(Gender::Male)),
            female_schedules: count(|s| s.gender == Some(Gender::Female)),
            general_schedules: count(|s| s.gender.is_none()),
            male_students: students.iter().filter(|s| s.gender == Gender::Male).count(),
            female_students: students.iter().filter(|s| s.gender == Gender::Female).count(),
            top_routes: top_routes(schedules),
        }
    }
}

fn in_hours(schedule: &ScheduleRecord, hours: &RangeInclusive<u32>) -> bool {
    schedule.leading_hour().is_some_and(|h| hours.contains(&h))
}

/// Busiest starting points, most trips first.
///
/// Ties keep the order in which the starting points first appear.
fn top_routes(schedules: &[ScheduleRecord]) -> Vec<RouteFrequency> {
    let mut routes: Vec<RouteFrequency> = Vec::new();
    for schedule in schedules {
        match routes
            .iter_mut()
            .find(|r| r.starting_point == schedule.starting_point)
        {
            Some(route) => route.trips += 1,
            None => routes.push(RouteFrequency {
                starting_point: schedule.starting_point.clone(),
                trips: 1,
            }),
        }
    }

    // Stable, so equal counts stay in first-seen order
    routes.sort_by(|a, b| b.trips.cmp(&a.trips));
    routes.truncate(TOP_ROUTES);
    routes
}

/// Student directory narrowed by gender.
pub fn filter_students<'a>(
    students: &'a [UserProfile],
    gender: &Selection<Gender>,
) -> Vec<&'a UserProfile> {
    students
        .iter()
        .filter(|s| match gender {
            Selection::All => true,
            Selection::Only(g) => s.gender == *g,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Role;
    use crate::schedule::dataset::ScheduleDataset;

    fn student(id: &str, gender: Gender) -> UserProfile {
        UserProfile {
            id: id.to_string(),
            email: format!("{id}@ugrad.iiuc.ac.bd"),
            name: id.to_string(),
            university_id: format!("C2310{id}"),
            mobile: String::new(),
            gender,
            role: Role::Student,
            created_at: None,
        }
    }

    #[test]
    fn test_counts_on_bundled_timetable() {
        let dataset = ScheduleDataset::bundled().unwrap();
        let students = vec![
            student("a", Gender::Male),
            student("b", Gender::Female),
            student("c", Gender::Female),
        ];

        let analytics = ScheduleAnalytics::compute(dataset.records(), &students);

        assert_eq!(analytics.total_schedules, 59);
        assert_eq!(analytics.regular_schedules, 34);
        assert_eq!(analytics.friday_schedules, 25);
        assert_eq!(analytics.general_schedules, 25);
        assert_eq!(
            analytics.male_schedules + analytics.female_schedules,
            34
        );
        assert_eq!(analytics.male_students, 1);
        assert_eq!(analytics.female_students, 2);
        assert_eq!(analytics.morning_schedules, 39);
        assert_eq!(analytics.afternoon_schedules, 9);

        let top: Vec<_> = analytics
            .top_routes
            .iter()
            .map(|r| (r.starting_point.as_str(), r.trips))
            .collect();
        assert_eq!(
            top,
            vec![
                ("IIUC", 21),
                ("BOT", 7),
                ("Baroyarhat", 3),
                ("Chatteswari", 3),
                ("Kotowali", 3)
            ]
        );
    }

    #[test]
    fn test_hour_buckets_use_leading_hour() {
        let dataset = ScheduleDataset::bundled().unwrap();
        let picked: Vec<_> = dataset
            .records()
            .iter()
            .filter(|r| r.id == "f13" || r.id == "29")
            .cloned()
            .collect();

        // 9:15 PM counts as morning and 12:15 PM as afternoon
        let analytics = ScheduleAnalytics::compute(&picked, &[]);
        assert_eq!(analytics.morning_schedules, 1);
        assert_eq!(analytics.afternoon_schedules, 1);
    }

    #[test]
    fn test_hosted_time_format_is_counted() {
        let dataset = ScheduleDataset::bundled().unwrap();
        let mut record = dataset.records()[0].clone();
        record.time = "07:00:00".to_string();

        let analytics = ScheduleAnalytics::compute(&[record], &[]);
        assert_eq!(analytics.morning_schedules, 1);
    }

    #[test]
    fn test_top_route_ties_keep_first_seen_order() {
        let dataset = ScheduleDataset::bundled().unwrap();
        let base = dataset.records()[0].clone();
        let trips: Vec<_> = ["Zeta", "Alpha", "Alpha", "Zeta", "Mid"]
            .into_iter()
            .map(|from| {
                let mut r = base.clone();
                r.starting_point = from.to_string();
                r
            })
            .collect();

        let analytics = ScheduleAnalytics::compute(&trips, &[]);
        let names: Vec<_> = analytics
            .top_routes
            .iter()
            .map(|r| r.starting_point.as_str())
            .collect();
        assert_eq!(names, vec!["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn test_filter_students() {
        let students = vec![student("a", Gender::Male), student("b", Gender::Female)];

        assert_eq!(filter_students(&students, &Selection::All).len(), 2);
        let female = filter_students(&students, &Selection::Only(Gender::Female));
        assert_eq!(female.len(), 1);
        assert_eq!(female[0].id, "b");
    }
}
