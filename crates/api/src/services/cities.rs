//! City options derived from the location table.

use domain::models::CityOption;
use domain::services::group_cities;
use persistence::entities::LocationEntity;
use persistence::UnitOfWork;

use super::ServiceError;

pub struct CityService {
    uow: UnitOfWork,
}

impl CityService {
    pub fn new(uow: UnitOfWork) -> Self {
        Self { uow }
    }

    /// One option per distinct city name, keeping the first location's id.
    pub async fn get_cities(&self) -> Result<Vec<CityOption>, ServiceError> {
        let locations = self.uow.repository::<LocationEntity>().get_all().await?;
        Ok(group_cities(
            locations.into_iter().map(|l| (l.id, l.city_name)),
        ))
    }

    /// The option for `name`, if some location carries that city name.
    pub async fn find_city(&self, name: &str) -> Result<Option<CityOption>, ServiceError> {
        let name = name.trim();
        Ok(self
            .get_cities()
            .await?
            .into_iter()
            .find(|city| city.name == name))
    }
}
