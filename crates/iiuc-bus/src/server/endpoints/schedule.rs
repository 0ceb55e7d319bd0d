use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::schedule::{
    filter_with_summary, route_areas, FilterState, FilterSummary, Pager, QuickFilter,
    ScheduleRecord, Selection,
};
use crate::server::types::ApiErrorType;
use crate::types::AppState;

/// Query parameters for `GET /schedules`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ScheduleQuery {
    pub search: Option<String>,
    pub direction: Option<String>,
    pub gender: Option<String>,
    pub bus_type: Option<String>,
    pub schedule_type: Option<String>,
    pub route: Option<String>,
    /// Number of results the client is already showing.
    pub display_count: Option<usize>,
    pub load_more: bool,
    pub load_all: bool,
}

fn parse_selection<T>(value: &Option<String>) -> Result<Selection<T>, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        None => Ok(Selection::All),
        Some(raw) => raw.parse().map_err(|e: T::Err| e.to_string()),
    }
}

impl ScheduleQuery {
    pub fn to_filter_state(&self) -> Result<FilterState, String> {
        Ok(FilterState {
            search_term: self.search.clone().unwrap_or_default(),
            direction: parse_selection(&self.direction)?,
            gender: parse_selection(&self.gender)?,
            bus_type: parse_selection(&self.bus_type)?,
            schedule_type: parse_selection(&self.schedule_type)?,
            route_filter: parse_selection(&self.route)?,
        })
    }

    fn pager(&self, total: usize) -> Pager {
        let mut pager = match self.display_count {
            Some(shown) => Pager::resume(total, shown),
            None => Pager::new(total),
        };
        if self.load_all {
            pager.load_all();
        } else if self.load_more {
            pager.load_more();
        }
        pager
    }
}

#[derive(Debug, Serialize)]
struct PageView {
    display_count: usize,
    total: usize,
    has_more: bool,
    remaining: usize,
    percent_loaded: u32,
}

impl From<Pager> for PageView {
    fn from(pager: Pager) -> Self {
        Self {
            display_count: pager.display_count(),
            total: pager.total(),
            has_more: pager.has_more(),
            remaining: pager.remaining(),
            percent_loaded: pager.percent_loaded(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ScheduleResults<'a> {
    filters: FilterState,
    summary: FilterSummary,
    page: PageView,
    schedules: &'a [&'a ScheduleRecord],
}

fn results_response(s: &AppState, state: FilterState, query: &ScheduleQuery) -> Response {
    let (filtered, summary) = filter_with_summary(s.dataset.records(), &state);
    let pager = query.pager(filtered.len());

    info!(
        matched = summary.total_filtered,
        shown = pager.display_count(),
        active_filters = summary.active_filter_count,
        "Schedule search"
    );

    let body = ScheduleResults {
        filters: state,
        summary,
        page: pager.into(),
        schedules: pager.visible(&filtered),
    };
    (StatusCode::OK, Json(body)).into_response()
}

/// GET /schedules
/// Filters the timetable and returns the visible page
pub async fn get_schedules(
    State(s): State<Arc<AppState>>,
    Query(query): Query<ScheduleQuery>,
) -> Response {
    info!("GET /schedules");

    match query.to_filter_state() {
        Ok(state) => results_response(&s, state, &query),
        Err(e) => ApiErrorType::from((StatusCode::BAD_REQUEST, "Invalid filter value", Some(e)))
            .into_response(),
    }
}

/// GET /schedules/routes
/// Place names for the route dropdown
pub async fn get_route_areas(State(s): State<Arc<AppState>>) -> Response {
    info!("GET /schedules/routes");

    (StatusCode::OK, Json(route_areas(s.dataset.records()))).into_response()
}

/// GET /schedules/quick/:preset
/// Applies a quick filter preset on a cleared filter state
pub async fn get_quick_filter(
    Path(preset): Path<String>,
    State(s): State<Arc<AppState>>,
    Query(query): Query<ScheduleQuery>,
) -> Response {
    info!("GET /schedules/quick/{}", preset);

    let mut state = FilterState::default();
    state.apply_quick_filter(&QuickFilter::parse(&preset));
    results_response(&s, state, &query)
}

/// GET /schedules/:id
pub async fn get_schedule(Path(id): Path<String>, State(s): State<Arc<AppState>>) -> Response {
    info!("GET /schedules/{}", id);

    match s.dataset.get(&id) {
        Some(record) => (StatusCode::OK, Json(record)).into_response(),
        None => ApiErrorType::from((
            StatusCode::NOT_FOUND,
            "Schedule not found",
            Some(format!("No schedule with id {id}")),
        ))
        .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{Direction, Gender};

    #[test]
    fn test_query_to_filter_state() {
        let query = ScheduleQuery {
            search: Some("7:00".to_string()),
            direction: Some("IIUCToCity".to_string()),
            gender: Some("all".to_string()),
            route: Some("BOT".to_string()),
            ..Default::default()
        };
        let state = query.to_filter_state().unwrap();
        assert_eq!(state.search_term, "7:00");
        assert_eq!(state.direction, Selection::Only(Direction::IIUCToCity));
        assert_eq!(state.gender, Selection::<Gender>::All);
        assert_eq!(state.route_filter, Selection::Only("BOT".to_string()));
    }

    #[test]
    fn test_invalid_filter_value() {
        let query = ScheduleQuery {
            gender: Some("Other".to_string()),
            ..Default::default()
        };
        assert!(query.to_filter_state().is_err());
    }

    #[test]
    fn test_pager_from_query() {
        let query = ScheduleQuery {
            display_count: Some(6),
            load_more: true,
            ..Default::default()
        };
        assert_eq!(query.pager(20).display_count(), 12);

        let query = ScheduleQuery {
            load_all: true,
            ..Default::default()
        };
        assert_eq!(query.pager(20).display_count(), 20);
        assert_eq!(ScheduleQuery::default().pager(20).display_count(), 6);
    }
}
