//! Item listing and availability block management

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::item::{Availability, CreateAvailability, CreateItem, Item, UpdateItem},
    repository::{BlockStore, ItemCatalog},
};

const DEFAULT_PER_PAGE: i64 = 20;
const MAX_PER_PAGE: i64 = 100;

/// Page and page size actually used for a listing
pub fn page_bounds(page: Option<i64>, per_page: Option<i64>) -> (i64, i64) {
    (
        page.unwrap_or(1).max(1),
        per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
    )
}

#[derive(Clone)]
pub struct ItemsService {
    items: Arc<dyn ItemCatalog>,
    blocks: Arc<dyn BlockStore>,
}

fn ensure_owner(item: &Item, user_id: i32) -> AppResult<()> {
    if item.owner_id != user_id {
        return Err(AppError::Authorization(
            "Only the item owner can modify this item".to_string(),
        ));
    }
    Ok(())
}

impl ItemsService {
    pub fn new(items: Arc<dyn ItemCatalog>, blocks: Arc<dyn BlockStore>) -> Self {
        Self { items, blocks }
    }

    /// Items on `page`, with the total count. Out-of-range bounds are clamped.
    pub async fn list(&self, page: i64, per_page: i64) -> AppResult<(Vec<Item>, i64)> {
        let (page, per_page) = page_bounds(Some(page), Some(per_page));
        self.items.list(page, per_page).await
    }

    pub async fn get(&self, id: i32) -> AppResult<Item> {
        self.items.get_by_id(id).await
    }

    pub async fn create(&self, owner_id: i32, data: &CreateItem) -> AppResult<Item> {
        let item = self.items.create(owner_id, data).await?;
        tracing::info!("Item {} listed by user {}", item.id, owner_id);
        Ok(item)
    }

    pub async fn update(&self, id: i32, user_id: i32, data: &UpdateItem) -> AppResult<Item> {
        let item = self.items.get_by_id(id).await?;
        ensure_owner(&item, user_id)?;
        self.items.update(id, data).await
    }

    pub async fn delete(&self, id: i32, user_id: i32) -> AppResult<()> {
        let item = self.items.get_by_id(id).await?;
        ensure_owner(&item, user_id)?;
        self.items.delete(id).await?;
        tracing::info!("Item {} deleted by its owner", id);
        Ok(())
    }

    pub async fn list_availabilities(&self, item_id: i32) -> AppResult<Vec<Availability>> {
        self.items.get_by_id(item_id).await?;
        self.blocks.list_for_item(item_id).await
    }

    /// Block a date window on an item the user owns
    pub async fn add_availability(
        &self,
        item_id: i32,
        user_id: i32,
        data: &CreateAvailability,
    ) -> AppResult<Availability> {
        if data.unavailable_from > data.unavailable_to {
            return Err(AppError::BadRequest(
                "unavailable_from must not be after unavailable_to".to_string(),
            ));
        }
        let item = self.items.get_by_id(item_id).await?;
        ensure_owner(&item, user_id)?;
        self.blocks.create(item_id, data).await
    }

    pub async fn delete_availability(&self, id: i32, user_id: i32) -> AppResult<()> {
        let block = self.blocks.get_by_id(id).await?;
        let item = self.items.get_by_id(block.item_id).await?;
        ensure_owner(&item, user_id)?;
        self.blocks.delete(id).await
    }
}
