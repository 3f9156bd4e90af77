// Point of sale service - Use case for listing points of sale
use crate::application::reading_repository::ReadingRepository;
use crate::domain::point_of_sale::PointOfSale;
use std::sync::Arc;

#[derive(Clone)]
pub struct PointOfSaleService {
    repository: Arc<dyn ReadingRepository>,
}

impl PointOfSaleService {
    pub fn new(repository: Arc<dyn ReadingRepository>) -> Self {
        Self { repository }
    }

    pub async fn list_points_of_sale(&self) -> anyhow::Result<Vec<PointOfSale>> {
        let ids = self.repository.list_location_ids().await?;
        Ok(ids.into_iter().map(PointOfSale::new).collect())
    }
}
