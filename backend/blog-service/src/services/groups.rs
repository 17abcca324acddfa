/// Group service - groups are read-only through the API
use std::sync::Arc;

use crate::db::BlogStore;
use crate::error::{AppError, Result};
use crate::models::Group;

pub struct GroupService {
    store: Arc<dyn BlogStore>,
}

impl GroupService {
    pub fn new(store: Arc<dyn BlogStore>) -> Self {
        Self { store }
    }

    pub async fn list_groups(&self) -> Result<Vec<Group>> {
        Ok(self.store.list_groups().await?)
    }

    pub async fn get_group(&self, group_id: i64) -> Result<Group> {
        self.store
            .find_group(group_id)
            .await?
            .ok_or_else(AppError::not_found)
    }
}
