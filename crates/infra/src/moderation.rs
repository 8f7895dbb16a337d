//! Moderation workflow over the catalog store.
//!
//! Every mutation here is a single store call per action, so bulk requests
//! rely on the store's statement-level atomicity and nothing else.

use std::sync::Arc;

use serde::Serialize;
use tracing::instrument;

use decorshop_catalog::{BulkAction, Category, CategoryAssignment, ModerationTransition, NewCategory, Product};
use decorshop_core::{DomainError, ProductId};

use crate::error::{ServiceError, ServiceResult};
use crate::store::{CatalogStore, StoreError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkOutcome {
    pub action: BulkAction,
    /// Valid ids in the request.
    pub requested: usize,
    /// Rows actually updated or deleted.
    pub affected: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorizeOutcome {
    pub product: Product,
    pub category: Category,
    /// The category did not exist before this call.
    pub created: bool,
}

#[derive(Clone)]
pub struct ModerationService {
    store: Arc<dyn CatalogStore>,
}

impl ModerationService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Apply `action` to every product in `ids`. Unknown ids are ignored;
    /// an empty id list is rejected.
    #[instrument(skip(self, ids), fields(action = action.as_str(), requested = ids.len()), err)]
    pub async fn bulk(&self, action: BulkAction, ids: &[ProductId]) -> ServiceResult<BulkOutcome> {
        if ids.is_empty() {
            return Err(DomainError::validation("no valid product ids supplied").into());
        }

        let affected = match action.target() {
            Some(state) => self.store.set_confirmed(ids, state.is_confirmed()).await?,
            None => self.store.delete_products(ids).await?,
        };

        tracing::info!(action = action.as_str(), requested = ids.len(), affected, "bulk moderation applied");
        Ok(BulkOutcome {
            action,
            requested: ids.len(),
            affected,
        })
    }

    /// Confirm the given products, or every pending product when `ids` is `None`.
    #[instrument(skip(self, ids), err)]
    pub async fn approve_all(&self, ids: Option<Vec<ProductId>>) -> ServiceResult<u64> {
        let affected = match ids {
            None => self.store.confirm_all_pending().await?,
            Some(ids) if ids.is_empty() => {
                return Err(DomainError::validation("no valid product ids supplied").into());
            }
            Some(ids) => self.store.set_confirmed(&ids, true).await?,
        };
        tracing::info!(affected, "products approved");
        Ok(affected)
    }

    /// Move one product between pending and confirmed.
    #[instrument(skip(self), fields(product_id = %id), err)]
    pub async fn transition(&self, id: ProductId, transition: ModerationTransition) -> ServiceResult<Product> {
        let product = self.require_product(id).await?;
        let target = product.state().apply(transition)?;

        self.store.set_confirmed(&[id], target.is_confirmed()).await?;
        tracing::info!(product_id = %id, state = ?target, "moderation state changed");
        self.require_product(id).await
    }

    /// Attach a category (created on first use) and optional subcategory.
    #[instrument(skip(self), fields(product_id = %id), err)]
    pub async fn categorize(
        &self,
        id: ProductId,
        category_name: &str,
        subcategory_name: Option<&str>,
    ) -> ServiceResult<CategorizeOutcome> {
        let category_name = category_name.trim();
        if category_name.is_empty() {
            return Err(DomainError::validation("category name must not be empty").into());
        }
        self.require_product(id).await?;

        let (category, created) = self.find_or_create_category(category_name).await?;

        let subcategory = match subcategory_name.map(str::trim).filter(|s| !s.is_empty()) {
            Some(name) => Some(self.store.find_or_create_subcategory(category.id, name).await?.name),
            None => None,
        };

        let assignment = CategoryAssignment {
            category: category.name.clone(),
            category_id: category.id,
            subcategory,
        };
        if !self.store.assign_category(id, &assignment).await? {
            return Err(DomainError::not_found().into());
        }

        tracing::info!(product_id = %id, category = %category.name, created, "product categorized");
        Ok(CategorizeOutcome {
            product: self.require_product(id).await?,
            category,
            created,
        })
    }

    async fn find_or_create_category(&self, name: &str) -> ServiceResult<(Category, bool)> {
        if let Some(existing) = self.store.find_category_by_name(name).await? {
            return Ok((existing, false));
        }

        let slugs = self.store.category_slugs().await?;
        let new = NewCategory::from_name(name, |slug| slugs.iter().any(|s| s == slug))?;
        match self.store.create_category(new).await {
            Ok(category) => Ok((category, true)),
            // Lost a race with a concurrent categorize call.
            Err(StoreError::Conflict(_)) => match self.store.find_category_by_name(name).await? {
                Some(existing) => Ok((existing, false)),
                None => Err(DomainError::conflict(format!("category slug for '{name}' is already taken")).into()),
            },
            Err(other) => Err(ServiceError::Store(other)),
        }
    }

    async fn require_product(&self, id: ProductId) -> ServiceResult<Product> {
        self.store
            .get_product(id)
            .await?
            .ok_or_else(|| DomainError::not_found().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{CategoryStore, InMemoryCatalogStore, ProductStore};
    use decorshop_catalog::{NewProduct, Visibility};
    use rust_decimal::Decimal;

    async fn service_with(titles: &[&str]) -> (ModerationService, Arc<InMemoryCatalogStore>) {
        let store = InMemoryCatalogStore::arc();
        for title in titles {
            store.insert_product(NewProduct::new(*title, Decimal::from(100))).await.unwrap();
        }
        (ModerationService::new(store.clone()), store)
    }

    fn ids(raw: &[i64]) -> Vec<ProductId> {
        raw.iter().map(|r| ProductId::from_raw(*r).unwrap()).collect()
    }

    #[tokio::test]
    async fn bulk_confirm_touches_exactly_the_existing_ids() {
        let (service, store) = service_with(&["a", "b", "c"]).await;
        let outcome = service.bulk(BulkAction::Confirm, &ids(&[1, 3, 42])).await.unwrap();
        assert_eq!(outcome.requested, 3);
        assert_eq!(outcome.affected, 2);

        let confirmed: Vec<i64> = store
            .all_products(Visibility::Confirmed)
            .await
            .unwrap()
            .iter()
            .map(|p| p.id.get())
            .collect();
        assert_eq!(confirmed, vec![1, 3]);
    }

    #[tokio::test]
    async fn bulk_delete_is_safe_to_repeat() {
        let (service, store) = service_with(&["a", "b"]).await;
        assert_eq!(service.bulk(BulkAction::Delete, &ids(&[2])).await.unwrap().affected, 1);
        assert_eq!(service.bulk(BulkAction::Delete, &ids(&[2])).await.unwrap().affected, 0);
        assert_eq!(store.count_products(Visibility::Any).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn bulk_rejects_empty_id_list() {
        let (service, _) = service_with(&["a"]).await;
        match service.bulk(BulkAction::Confirm, &[]).await {
            Err(ServiceError::Domain(DomainError::Validation(_))) => {}
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn approve_all_without_ids_confirms_every_pending_product() {
        let (service, store) = service_with(&["a", "b", "c"]).await;
        assert_eq!(service.approve_all(Some(ids(&[2]))).await.unwrap(), 1);
        assert_eq!(service.approve_all(None).await.unwrap(), 2);
        assert_eq!(store.count_products(Visibility::Pending).await.unwrap(), 0);
        assert!(service.approve_all(Some(Vec::new())).await.is_err());
    }

    #[tokio::test]
    async fn single_transitions_report_missing_and_no_op() {
        let (service, _) = service_with(&["a"]).await;
        let id = ids(&[1])[0];

        let approved = service.transition(id, ModerationTransition::Approve).await.unwrap();
        assert!(approved.is_confirmed);

        match service.transition(id, ModerationTransition::Approve).await {
            Err(ServiceError::Domain(DomainError::Conflict(_))) => {}
            other => panic!("expected Conflict, got {other:?}"),
        }

        let back = service.transition(id, ModerationTransition::BackToModeration).await.unwrap();
        assert!(!back.is_confirmed);

        match service.transition(ids(&[9])[0], ModerationTransition::Approve).await {
            Err(ServiceError::Domain(DomainError::NotFound)) => {}
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn approval_leaves_id_price_and_images_untouched() {
        let store = InMemoryCatalogStore::arc();
        let mut input = NewProduct::new("Торшер", Decimal::new(1_999_90, 2));
        input.discount = 15;
        input.images = vec!["/img/torsher-1.jpg".into(), "/img/torsher-2.jpg".into()];
        let original = store.insert_product(input).await.unwrap();
        let service = ModerationService::new(store.clone());

        let snapshot = |p: &Product| (p.id, p.price, p.discount, p.image.clone(), p.images.clone());
        let expected = snapshot(&original);

        let approved = service.transition(original.id, ModerationTransition::Approve).await.unwrap();
        assert!(approved.is_confirmed);
        assert_eq!(snapshot(&approved), expected);

        service.transition(original.id, ModerationTransition::BackToModeration).await.unwrap();
        service.bulk(BulkAction::Confirm, &[original.id]).await.unwrap();
        let after_bulk = store.get_product(original.id).await.unwrap().unwrap();
        assert!(after_bulk.is_confirmed);
        assert_eq!(snapshot(&after_bulk), expected);

        service.bulk(BulkAction::Unconfirm, &[original.id]).await.unwrap();
        assert_eq!(service.approve_all(None).await.unwrap(), 1);
        let after_all = store.get_product(original.id).await.unwrap().unwrap();
        assert!(after_all.is_confirmed);
        assert_eq!(snapshot(&after_all), expected);
        assert_eq!(after_all.title, original.title);
    }

    #[tokio::test]
    async fn categorize_creates_category_once() {
        let (service, store) = service_with(&["a", "b"]).await;
        let both = ids(&[1, 2]);
        let (first, second) = (both[0], both[1]);

        let outcome = service.categorize(first, "Мягкая мебель", Some("Диваны")).await.unwrap();
        assert!(outcome.created);
        assert_eq!(outcome.category.slug, "мягкая-мебель");
        assert_eq!(outcome.product.category.as_deref(), Some("Мягкая мебель"));
        assert_eq!(outcome.product.category_id, Some(outcome.category.id));
        assert_eq!(outcome.product.subcategory.as_deref(), Some("Диваны"));

        let again = service.categorize(second, "Мягкая мебель", None).await.unwrap();
        assert!(!again.created);
        assert_eq!(again.category.id, outcome.category.id);
        assert_eq!(store.list_categories(false).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn categorize_checks_input_before_creating_anything() {
        let (service, store) = service_with(&["a"]).await;

        assert!(matches!(
            service.categorize(ids(&[1])[0], "   ", None).await,
            Err(ServiceError::Domain(DomainError::Validation(_)))
        ));
        assert!(matches!(
            service.categorize(ids(&[5])[0], "Лампы", None).await,
            Err(ServiceError::Domain(DomainError::NotFound))
        ));
        assert!(store.list_categories(false).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn colliding_slugs_get_a_counter() {
        let (service, _) = service_with(&["a", "b"]).await;
        let first = service.categorize(ids(&[1])[0], "Лампы!", None).await.unwrap();
        let second = service.categorize(ids(&[2])[0], "Лампы", None).await.unwrap();
        assert_eq!(first.category.slug, "лампы");
        assert_eq!(second.category.slug, "лампы-2");
    }
}
