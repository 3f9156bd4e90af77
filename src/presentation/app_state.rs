// Application state for HTTP handlers
use crate::application::dashboard_service::DashboardService;
use crate::application::point_of_sale_service::PointOfSaleService;
use crate::infrastructure::config::EngineSettings;

pub struct AppState {
    pub point_of_sale_service: PointOfSaleService,
    pub dashboard_service: DashboardService,
    pub engine_settings: EngineSettings,
}
