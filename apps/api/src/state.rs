use std::sync::Arc;

use crate::llm_client::ChatCompletion;
use crate::outreach::messaging::ChatOutreach;
use crate::outreach::phone::PhoneOutreach;
use crate::scheduler::calendar::AppointmentScheduler;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Chat provider behind the trait so tests can swap in a double.
    pub llm: Arc<dyn ChatCompletion>,
    pub scheduler: AppointmentScheduler,
    pub phone: PhoneOutreach,
    pub messaging: ChatOutreach,
}
