/// Bus timetable: records, filtering, paging and statistics
pub mod analytics;
mod dataset;
mod error;
pub mod filter;
pub mod pagination;
mod types;

pub use dataset::ScheduleDataset;
pub use error::DatasetError;
pub use filter::{
    filter, filter_with_summary, route_areas, DashboardFilter, FilterState, FilterSummary,
    QuickFilter, Selection,
};
pub use pagination::{Pager, PAGE_SIZE};
pub use types::*;
