mod common;

use common::shop;
use inventory::{
    abstract_trait::{
        category::CategoryServiceTrait,
        inventory::InventoryServiceTrait,
        order::{OrderCommandServiceTrait, OrderTransactionManagerTrait, OrderTransactionTrait},
        product::ProductServiceTrait,
        store::StoreServiceTrait,
    },
    domain::requests::{
        category::UpdateCategoryRequest, order::CreateOrderRequest, store::UpdateStoreRequest,
    },
};
use shared::errors::ServiceError;
use std::{collections::BTreeSet, time::Duration};

#[tokio::test]
async fn renaming_a_category_shows_on_its_products() {
    let shop = shop().await;
    let app = &shop.app;
    let tools = app.services.product_service.find_by_id(shop.p1).await.unwrap();
    let category = tools.data.category.id;

    let renamed = app
        .services
        .category_service
        .update(category, &UpdateCategoryRequest { name: "  Hand tools ".into() })
        .await
        .unwrap()
        .data;
    assert_eq!(renamed.name, "Hand tools");

    let product = app.services.product_service.find_by_id(shop.p1).await.unwrap();
    assert_eq!(product.data.category.name, "Hand tools");
}

#[tokio::test]
async fn category_rename_to_a_taken_name_conflicts() {
    let shop = shop().await;
    let app = &shop.app;
    let garden = app.category("Garden").await;

    let err = app
        .services
        .category_service
        .update(garden, &UpdateCategoryRequest { name: "Tools".into() })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)), "{err:?}");

    let err = app
        .services
        .category_service
        .update(9_999, &UpdateCategoryRequest { name: "Nowhere".into() })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)), "{err:?}");
}

#[tokio::test]
async fn category_in_use_cannot_be_deleted() {
    let shop = shop().await;
    let app = &shop.app;
    let category = app
        .services
        .product_service
        .find_by_id(shop.p1)
        .await
        .unwrap()
        .data
        .category
        .id;
    let empty = app.category("Empty").await;

    let err = app.services.category_service.delete(category).await.unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)), "{err:?}");

    app.services.category_service.delete(empty).await.unwrap();
    let err = app.services.category_service.find_by_id(empty).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn store_update_only_touches_given_fields() {
    let shop = shop().await;
    let app = &shop.app;

    let updated = app
        .services
        .store_service
        .update(
            shop.store,
            &UpdateStoreRequest {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .data;
    assert_eq!(updated.name, "Downtown");
    assert_eq!(updated.location, "Downtown street 1");
    assert!(!updated.is_active);

    let listed = app.services.store_service.find_all().await.unwrap().data;
    assert!(listed.iter().all(|s| s.id != shop.store));
}

#[tokio::test]
async fn deleting_a_store_takes_its_inventory_along() {
    let shop = shop().await;
    let app = &shop.app;

    app.services.store_service.delete(shop.store).await.unwrap();

    assert_eq!(app.db.quantity(shop.store, shop.p1), None);
    assert_eq!(app.db.quantity(shop.store, shop.p2), None);
    let err = app.services.store_service.delete(shop.store).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn order_history_blocks_store_and_product_deletes() {
    let shop = shop().await;
    let app = &shop.app;
    app.services
        .order_command
        .place_order(&CreateOrderRequest::new(shop.store, [(shop.p1, 1)]))
        .await
        .unwrap();

    let err = app.services.store_service.delete(shop.store).await.unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)), "{err:?}");

    let err = app.services.product_service.delete(shop.p1).await.unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)), "{err:?}");
    assert_eq!(app.db.quantity(shop.store, shop.p1), Some(9));

    app.services.product_service.delete(shop.p2).await.unwrap();
    assert_eq!(app.db.quantity(shop.store, shop.p2), None);
    let err = app.services.product_service.find_by_id(shop.p2).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn inventory_delete_waits_for_the_order_holding_the_row() {
    let shop = shop().await;
    let app = &shop.app;
    let store = app.store("Harbor").await;
    let row = app.stock(store, shop.p1, 4).await;

    let mut holder = app.db.begin().await.unwrap();
    holder
        .lock_for_update(store, &BTreeSet::from([shop.p1]))
        .await
        .unwrap();

    let inventory = app.services.inventory_service.clone();
    let mut delete = tokio::spawn(async move { inventory.delete(row).await });

    assert!(
        tokio::time::timeout(Duration::from_millis(50), &mut delete)
            .await
            .is_err(),
        "delete finished while the row was locked"
    );

    holder.rollback().await.unwrap();
    delete.await.unwrap().unwrap();

    assert_eq!(app.db.quantity(store, shop.p1), None);
    assert_eq!(app.db.tracked_row_locks(), 0);
    let err = app.services.inventory_service.delete(row).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}
