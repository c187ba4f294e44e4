use std::sync::Arc;

use crate::database::Store;
use crate::error::{Error, Result};
use crate::models::vacancy::{NewVacancy, Vacancy, VacancyPatch};

/// Vacancy management restricted to the schools an admin governs.
#[derive(Clone)]
pub struct VacancyService {
    store: Arc<dyn Store>,
}

fn ensure_in_scope(school_ids: &[i64], school_id: i64) -> Result<()> {
    if school_ids.contains(&school_id) {
        Ok(())
    } else {
        Err(Error::Forbidden(
            "You do not administer this school".to_string(),
        ))
    }
}

fn clean_title(title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(Error::BadRequest("Vacancy title must not be empty".to_string()));
    }
    Ok(title.to_string())
}

impl VacancyService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Vacancies of every school in scope, or of one of them.
    pub async fn list(&self, school_ids: &[i64], school_id: Option<i64>) -> Result<Vec<Vacancy>> {
        let targets: Vec<i64> = match school_id {
            Some(id) => {
                ensure_in_scope(school_ids, id)?;
                vec![id]
            }
            None => school_ids.to_vec(),
        };

        let mut items = Vec::new();
        for id in targets {
            items.extend(self.store.list_vacancies(id).await?);
        }
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    pub async fn create(&self, school_ids: &[i64], vacancy: NewVacancy) -> Result<Vacancy> {
        ensure_in_scope(school_ids, vacancy.school_id)?;
        let vacancy = NewVacancy {
            title: clean_title(&vacancy.title)?,
            rate: vacancy.rate.trim().to_string(),
            school_id: vacancy.school_id,
        };
        let created = self.store.insert_vacancy(vacancy).await?;
        tracing::info!(vacancy_id = created.id, school_id = created.school_id, "vacancy created");
        Ok(created)
    }

    async fn scoped_vacancy(&self, school_ids: &[i64], id: i64) -> Result<Vacancy> {
        let vacancy = self
            .store
            .get_vacancy(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Vacancy {} not found", id)))?;
        ensure_in_scope(school_ids, vacancy.school_id)?;
        Ok(vacancy)
    }

    pub async fn update(&self, school_ids: &[i64], id: i64, patch: VacancyPatch) -> Result<Vacancy> {
        self.scoped_vacancy(school_ids, id).await?;
        let patch = VacancyPatch {
            title: patch.title.as_deref().map(clean_title).transpose()?,
            rate: patch.rate.map(|r| r.trim().to_string()),
        };
        self.store
            .update_vacancy(id, patch)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Vacancy {} not found", id)))
    }

    pub async fn delete(&self, school_ids: &[i64], id: i64) -> Result<()> {
        self.scoped_vacancy(school_ids, id).await?;
        if !self.store.delete_vacancy(id).await? {
            return Err(Error::NotFound(format!("Vacancy {} not found", id)));
        }
        tracing::info!(vacancy_id = id, "vacancy deleted");
        Ok(())
    }
}
