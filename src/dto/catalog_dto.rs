use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{
    district::{DistrictPatch, NewDistrict},
    school::{NewSchool, SchoolPatch},
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateDistrictPayload {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub region_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateDistrictPayload {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub region_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateSchoolPayload {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub district_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateSchoolPayload {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub district_id: Option<i64>,
}

impl From<CreateDistrictPayload> for NewDistrict {
    fn from(p: CreateDistrictPayload) -> Self {
        NewDistrict {
            name: p.name.trim().to_string(),
            region_id: p.region_id,
        }
    }
}

impl From<UpdateDistrictPayload> for DistrictPatch {
    fn from(p: UpdateDistrictPayload) -> Self {
        DistrictPatch {
            name: p.name.map(|n| n.trim().to_string()),
            region_id: p.region_id,
        }
    }
}

impl From<CreateSchoolPayload> for NewSchool {
    fn from(p: CreateSchoolPayload) -> Self {
        NewSchool {
            name: p.name.trim().to_string(),
            district_id: p.district_id,
        }
    }
}

impl From<UpdateSchoolPayload> for SchoolPatch {
    fn from(p: UpdateSchoolPayload) -> Self {
        SchoolPatch {
            name: p.name.map(|n| n.trim().to_string()),
            district_id: p.district_id,
        }
    }
}
