use serde::Serialize;
use std::sync::Arc;

use crate::database::Store;
use crate::error::{Error, Result};
use crate::models::{
    district::{District, DistrictPatch, NewDistrict},
    region::Region,
    school::{NewSchool, School, SchoolPatch, SchoolSummary},
    vacancy::Vacancy,
};

#[derive(Debug, Clone, Serialize)]
pub struct VacancyDetail {
    #[serde(flatten)]
    pub vacancy: Vacancy,
    pub school: School,
}

/// Region → district → school → vacancy navigation plus the
/// super-admin catalog of districts and schools.
#[derive(Clone)]
pub struct HierarchyService {
    store: Arc<dyn Store>,
}

impl HierarchyService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn regions(&self) -> Result<Vec<Region>> {
        self.store.list_regions().await
    }

    pub async fn districts(&self, region_id: i64) -> Result<Vec<District>> {
        if self.store.get_region(region_id).await?.is_none() {
            return Err(Error::NotFound(format!("Region {} not found", region_id)));
        }
        self.store.list_districts(region_id).await
    }

    pub async fn schools(&self, district_id: i64) -> Result<Vec<School>> {
        if self.store.get_district(district_id).await?.is_none() {
            return Err(Error::NotFound(format!("District {} not found", district_id)));
        }
        self.store.list_schools(district_id).await
    }

    pub async fn vacancies(&self, school_id: i64) -> Result<Vec<Vacancy>> {
        if self.store.get_school(school_id).await?.is_none() {
            return Err(Error::NotFound(format!("School {} not found", school_id)));
        }
        self.store.list_vacancies(school_id).await
    }

    pub async fn vacancy(&self, vacancy_id: i64) -> Result<VacancyDetail> {
        let vacancy = self
            .store
            .get_vacancy(vacancy_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Vacancy {} not found", vacancy_id)))?;
        let school = self
            .store
            .get_school(vacancy.school_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("School {} not found", vacancy.school_id)))?;
        Ok(VacancyDetail { vacancy, school })
    }

    pub async fn school_catalog(&self) -> Result<Vec<SchoolSummary>> {
        self.store.list_school_summaries().await
    }

    pub async fn create_district(&self, district: NewDistrict) -> Result<District> {
        if self.store.get_region(district.region_id).await?.is_none() {
            return Err(Error::NotFound(format!(
                "Region {} not found",
                district.region_id
            )));
        }
        let created = self.store.insert_district(district).await?;
        tracing::info!(district_id = created.id, "district created");
        Ok(created)
    }

    pub async fn update_district(&self, id: i64, patch: DistrictPatch) -> Result<District> {
        if let Some(region_id) = patch.region_id {
            if self.store.get_region(region_id).await?.is_none() {
                return Err(Error::NotFound(format!("Region {} not found", region_id)));
            }
        }
        self.store
            .update_district(id, patch)
            .await?
            .ok_or_else(|| Error::NotFound(format!("District {} not found", id)))
    }

    pub async fn delete_district(&self, id: i64) -> Result<()> {
        if !self.store.delete_district(id).await? {
            return Err(Error::NotFound(format!("District {} not found", id)));
        }
        tracing::info!(district_id = id, "district deleted");
        Ok(())
    }

    pub async fn create_school(&self, school: NewSchool) -> Result<School> {
        if self.store.get_district(school.district_id).await?.is_none() {
            return Err(Error::NotFound(format!(
                "District {} not found",
                school.district_id
            )));
        }
        let created = self.store.insert_school(school).await?;
        tracing::info!(school_id = created.id, "school created");
        Ok(created)
    }

    pub async fn update_school(&self, id: i64, patch: SchoolPatch) -> Result<School> {
        if let Some(district_id) = patch.district_id {
            if self.store.get_district(district_id).await?.is_none() {
                return Err(Error::NotFound(format!("District {} not found", district_id)));
            }
        }
        self.store
            .update_school(id, patch)
            .await?
            .ok_or_else(|| Error::NotFound(format!("School {} not found", id)))
    }

    pub async fn delete_school(&self, id: i64) -> Result<()> {
        if !self.store.delete_school(id).await? {
            return Err(Error::NotFound(format!("School {} not found", id)));
        }
        tracing::info!(school_id = id, "school deleted");
        Ok(())
    }
}
