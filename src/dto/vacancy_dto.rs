use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::vacancy::{NewVacancy, VacancyPatch};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateVacancyPayload {
    pub school_id: i64,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub rate: String,
}

impl From<CreateVacancyPayload> for NewVacancy {
    fn from(p: CreateVacancyPayload) -> Self {
        NewVacancy {
            title: p.title,
            rate: p.rate,
            school_id: p.school_id,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateVacancyPayload {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[validate(length(max = 100))]
    pub rate: Option<String>,
}

impl From<UpdateVacancyPayload> for VacancyPatch {
    fn from(p: UpdateVacancyPayload) -> Self {
        VacancyPatch {
            title: p.title,
            rate: p.rate,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VacancyListQuery {
    pub school_id: Option<i64>,
}
