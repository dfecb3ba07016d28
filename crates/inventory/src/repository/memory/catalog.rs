use async_trait::async_trait;
use chrono::Utc;
use shared::errors::RepositoryError;

use super::{MemoryDatabase, Tables, next_id};
use crate::{
    abstract_trait::{
        category::CategoryRepositoryTrait,
        inventory::InventoryRepositoryTrait,
        product::{ProductChanges, ProductRepositoryTrait},
        store::StoreRepositoryTrait,
    },
    domain::requests::{
        inventory::{CreateInventoryRequest, InventoryFilter, UpdateInventoryRequest},
        product::{CreateProductRequest, ProductSearchFilter},
        store::{CreateStoreRequest, UpdateStoreRequest},
    },
    model::{
        category::Category,
        inventory::{DEFAULT_LOW_STOCK_THRESHOLD, Inventory, InventoryDetail},
        product::Product,
        store::Store,
    },
};

fn sorted_by_title(mut products: Vec<Product>) -> Vec<Product> {
    products.sort_by(|a, b| a.title.cmp(&b.title).then(a.product_id.cmp(&b.product_id)));
    products
}

fn detail(tables: &Tables, row: &Inventory) -> Option<InventoryDetail> {
    let store = tables.stores.get(&row.store_id)?;
    let product = tables.products.get(&row.product_id)?;

    Some(InventoryDetail {
        inventory: row.clone(),
        store_name: store.name.clone(),
        product_title: product.title.clone(),
        product_price: product.price,
    })
}

#[async_trait]
impl CategoryRepositoryTrait for MemoryDatabase {
    async fn find_all(&self) -> Result<Vec<Category>, RepositoryError> {
        let mut categories: Vec<Category> =
            self.tables.read().categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Category>, RepositoryError> {
        Ok(self.tables.read().categories.get(&id).cloned())
    }

    async fn create(&self, name: &str) -> Result<Category, RepositoryError> {
        let mut tables = self.tables.write();

        if tables.categories.values().any(|c| c.name == name) {
            return Err(RepositoryError::AlreadyExists(format!(
                "category {name} already exists"
            )));
        }

        let now = Utc::now();
        let category = Category {
            category_id: next_id(&mut tables.seq.category),
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        };
        tables
            .categories
            .insert(category.category_id, category.clone());

        Ok(category)
    }

    async fn update(&self, id: i32, name: &str) -> Result<Option<Category>, RepositoryError> {
        let mut tables = self.tables.write();

        if !tables.categories.contains_key(&id) {
            return Ok(None);
        }
        if tables
            .categories
            .values()
            .any(|c| c.name == name && c.category_id != id)
        {
            return Err(RepositoryError::AlreadyExists(format!(
                "category {name} already exists"
            )));
        }

        for product in tables.products.values_mut().filter(|p| p.category_id == id) {
            product.category_name = name.to_string();
        }

        let Some(category) = tables.categories.get_mut(&id) else {
            return Ok(None);
        };
        category.name = name.to_string();
        category.updated_at = Utc::now();

        Ok(Some(category.clone()))
    }

    async fn delete(&self, id: i32) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.write();

        if tables.products.values().any(|p| p.category_id == id) {
            return Err(RepositoryError::ForeignKey(format!(
                "category {id} is still referenced by products"
            )));
        }

        Ok(tables.categories.remove(&id).is_some())
    }
}

#[async_trait]
impl ProductRepositoryTrait for MemoryDatabase {
    async fn find_active(&self) -> Result<Vec<Product>, RepositoryError> {
        let products = self
            .tables
            .read()
            .products
            .values()
            .filter(|p| p.is_active)
            .cloned()
            .collect();
        Ok(sorted_by_title(products))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Product>, RepositoryError> {
        Ok(self.tables.read().products.get(&id).cloned())
    }

    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<Product>, RepositoryError> {
        let tables = self.tables.read();
        Ok(ids
            .iter()
            .filter_map(|id| tables.products.get(id).cloned())
            .collect())
    }

    async fn search(&self, filter: &ProductSearchFilter) -> Result<Vec<Product>, RepositoryError> {
        let tables = self.tables.read();
        let needle = filter.query.as_deref().map(str::to_lowercase);

        let products = tables
            .products
            .values()
            .filter(|p| p.is_active)
            .filter(|p| {
                needle.as_deref().is_none_or(|q| {
                    p.title.to_lowercase().contains(q)
                        || p.description.to_lowercase().contains(q)
                        || p.category_name.to_lowercase().contains(q)
                })
            })
            .filter(|p| filter.category_id.is_none_or(|id| p.category_id == id))
            .filter(|p| filter.min_price.is_none_or(|min| p.price >= min))
            .filter(|p| filter.max_price.is_none_or(|max| p.price <= max))
            .filter(|p| {
                filter.store_id.is_none_or(|store_id| {
                    tables
                        .inventory_row(store_id, p.product_id)
                        .is_some_and(|row| row.quantity > 0)
                })
            })
            .cloned()
            .collect();

        Ok(sorted_by_title(products))
    }

    async fn autocomplete(&self, prefix: &str, limit: i64) -> Result<Vec<Product>, RepositoryError> {
        let prefix = prefix.to_lowercase();
        let products = self
            .tables
            .read()
            .products
            .values()
            .filter(|p| p.is_active && p.title.to_lowercase().starts_with(&prefix))
            .cloned()
            .collect();

        let mut products = sorted_by_title(products);
        products.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(products)
    }

    async fn create(&self, req: &CreateProductRequest) -> Result<Product, RepositoryError> {
        let mut tables = self.tables.write();

        let category_name = tables
            .categories
            .get(&req.category_id)
            .map(|c| c.name.clone())
            .ok_or_else(|| {
                RepositoryError::ForeignKey(format!("category {} does not exist", req.category_id))
            })?;

        let now = Utc::now();
        let product = Product {
            product_id: next_id(&mut tables.seq.product),
            title: req.title.clone(),
            description: req.description.clone(),
            price: req.price,
            category_id: req.category_id,
            category_name,
            is_active: req.is_active,
            created_at: now,
            updated_at: now,
        };
        tables.products.insert(product.product_id, product.clone());

        Ok(product)
    }

    async fn update(
        &self,
        id: i32,
        changes: &ProductChanges,
    ) -> Result<Option<Product>, RepositoryError> {
        let mut tables = self.tables.write();
        let Some(product) = tables.products.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(price) = changes.price {
            product.price = price;
        }
        if let Some(description) = &changes.description {
            product.description = description.clone();
        }
        if let Some(is_active) = changes.is_active {
            product.is_active = is_active;
        }
        product.updated_at = Utc::now();

        Ok(Some(product.clone()))
    }

    async fn delete(&self, id: i32) -> Result<bool, RepositoryError> {
        let _rows = self.lock_rows_where(|row| row.product_id == id).await?;
        let mut tables = self.tables.write();

        if !tables.products.contains_key(&id) {
            return Ok(false);
        }
        if tables.order_items.values().any(|item| item.product_id == id) {
            return Err(RepositoryError::ForeignKey(format!(
                "product {id} is still referenced by order items"
            )));
        }

        tables.inventory.retain(|_, row| row.product_id != id);
        tables.products.remove(&id);
        Ok(true)
    }
}

#[async_trait]
impl StoreRepositoryTrait for MemoryDatabase {
    async fn find_active(&self) -> Result<Vec<Store>, RepositoryError> {
        let mut stores: Vec<Store> = self
            .tables
            .read()
            .stores
            .values()
            .filter(|s| s.is_active)
            .cloned()
            .collect();
        stores.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(stores)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Store>, RepositoryError> {
        Ok(self.tables.read().stores.get(&id).cloned())
    }

    async fn create(&self, req: &CreateStoreRequest) -> Result<Store, RepositoryError> {
        let mut tables = self.tables.write();
        let now = Utc::now();
        let store = Store {
            store_id: next_id(&mut tables.seq.store),
            name: req.name.clone(),
            location: req.location.clone(),
            is_active: req.is_active,
            created_at: now,
            updated_at: now,
        };
        tables.stores.insert(store.store_id, store.clone());

        Ok(store)
    }

    async fn update(
        &self,
        id: i32,
        req: &UpdateStoreRequest,
    ) -> Result<Option<Store>, RepositoryError> {
        let mut tables = self.tables.write();
        let Some(store) = tables.stores.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(name) = &req.name {
            store.name = name.clone();
        }
        if let Some(location) = &req.location {
            store.location = location.clone();
        }
        if let Some(is_active) = req.is_active {
            store.is_active = is_active;
        }
        store.updated_at = Utc::now();

        Ok(Some(store.clone()))
    }

    async fn delete(&self, id: i32) -> Result<bool, RepositoryError> {
        let _rows = self.lock_rows_where(|row| row.store_id == id).await?;
        let mut tables = self.tables.write();

        if !tables.stores.contains_key(&id) {
            return Ok(false);
        }
        if tables.orders.values().any(|order| order.store_id == id) {
            return Err(RepositoryError::ForeignKey(format!(
                "store {id} is still referenced by orders"
            )));
        }

        tables.inventory.retain(|_, row| row.store_id != id);
        tables.stores.remove(&id);
        Ok(true)
    }
}

#[async_trait]
impl InventoryRepositoryTrait for MemoryDatabase {
    async fn find_all(
        &self,
        filter: &InventoryFilter,
    ) -> Result<Vec<InventoryDetail>, RepositoryError> {
        let tables = self.tables.read();
        let low_stock_only = filter.low_stock == Some(true);

        let mut rows: Vec<InventoryDetail> = tables
            .inventory
            .values()
            .filter(|row| filter.store_id.is_none_or(|id| row.store_id == id))
            .filter(|row| filter.product_id.is_none_or(|id| row.product_id == id))
            .filter(|row| !low_stock_only || row.is_low_stock())
            .filter_map(|row| detail(&tables, row))
            .collect();

        rows.sort_by(|a, b| {
            a.store_name
                .cmp(&b.store_name)
                .then_with(|| a.product_title.cmp(&b.product_title))
        });
        Ok(rows)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<InventoryDetail>, RepositoryError> {
        let tables = self.tables.read();
        Ok(tables.inventory.get(&id).and_then(|row| detail(&tables, row)))
    }

    async fn create(&self, req: &CreateInventoryRequest) -> Result<InventoryDetail, RepositoryError> {
        let _row = self.lock_row(req.store_id, req.product_id).await?;
        let mut tables = self.tables.write();

        if !tables.stores.contains_key(&req.store_id) {
            return Err(RepositoryError::ForeignKey(format!(
                "store {} does not exist",
                req.store_id
            )));
        }
        if !tables.products.contains_key(&req.product_id) {
            return Err(RepositoryError::ForeignKey(format!(
                "product {} does not exist",
                req.product_id
            )));
        }
        if tables.inventory_row(req.store_id, req.product_id).is_some() {
            return Err(RepositoryError::AlreadyExists(format!(
                "inventory for store {} and product {} already exists",
                req.store_id, req.product_id
            )));
        }
        if req.quantity < 0 {
            return Err(RepositoryError::Custom("quantity must not be negative".into()));
        }

        let now = Utc::now();
        let row = Inventory {
            inventory_id: next_id(&mut tables.seq.inventory),
            store_id: req.store_id,
            product_id: req.product_id,
            quantity: req.quantity,
            low_stock_threshold: req.low_stock_threshold.unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD),
            created_at: now,
            updated_at: now,
        };
        tables.inventory.insert(row.inventory_id, row.clone());

        detail(&tables, &row).ok_or(RepositoryError::NotFound)
    }

    async fn update(
        &self,
        id: i32,
        req: &UpdateInventoryRequest,
    ) -> Result<Option<InventoryDetail>, RepositoryError> {
        let Some(key) = self
            .tables
            .read()
            .inventory
            .get(&id)
            .map(|row| (row.store_id, row.product_id))
        else {
            return Ok(None);
        };
        // Waits for any order transaction holding this row.
        let _row = self.lock_row(key.0, key.1).await?;

        let mut tables = self.tables.write();
        let Some(row) = tables.inventory.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(quantity) = req.quantity {
            if quantity < 0 {
                return Err(RepositoryError::Custom("quantity must not be negative".into()));
            }
            row.quantity = quantity;
        }
        if let Some(threshold) = req.low_stock_threshold {
            row.low_stock_threshold = threshold;
        }
        row.updated_at = Utc::now();

        let row = row.clone();
        Ok(detail(&tables, &row))
    }

    async fn delete(&self, id: i32) -> Result<bool, RepositoryError> {
        let Some(key) = self
            .tables
            .read()
            .inventory
            .get(&id)
            .map(|row| (row.store_id, row.product_id))
        else {
            return Ok(false);
        };
        let _row = self.lock_row(key.0, key.1).await?;

        Ok(self.tables.write().inventory.remove(&id).is_some())
    }
}
