use crate::assistant::Assistant;
use crate::backend::{BackendError, HostedClient};
use crate::schedule::ScheduleDataset;
use crate::session::ProfileCache;
use crate::settings::Settings;

/// State shared by every request handler.
pub struct AppState {
    pub settings: Settings,
    /// Timetable loaded at startup. Never modified afterwards.
    pub dataset: ScheduleDataset,
    pub assistant: Assistant,
    pub backend: HostedClient,
    pub profiles: ProfileCache,
}

impl AppState {
    pub fn new(settings: Settings, dataset: ScheduleDataset) -> Result<Self, BackendError> {
        Ok(Self {
            assistant: Assistant::new(&settings.assistant),
            backend: HostedClient::new(&settings.backend)?,
            profiles: ProfileCache::new(settings.cache.profile_ttl()),
            dataset,
            settings,
        })
    }
}
