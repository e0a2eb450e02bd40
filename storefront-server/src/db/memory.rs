//! In-memory store
//!
//! One `tokio::sync::Mutex` guards the whole state. A fulfillment
//! transaction owns the guard until it commits or is dropped, so concurrent
//! order placements run one after another, the same way row locks serialize
//! them in PostgreSQL.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use shared::models::{NewOrder, Order, OrderLine, Product, ProductCreate, TokenPair, User};
use shared::util::now_millis;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{
    FulfillmentTx, NewUser, OrderRepository, ProductRepository, StoreError, UserRepository,
};

#[derive(Debug, Default)]
struct Tables {
    products: BTreeMap<i64, Product>,
    users: BTreeMap<i64, User>,
    orders: Vec<Order>,
    next_product_id: i64,
    next_user_id: i64,
    next_order_id: i64,
    next_line_id: i64,
}

impl Tables {
    fn next_id(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }

    fn user_mut(&mut self, user_id: i64) -> Result<&mut User, StoreError> {
        self.users
            .get_mut(&user_id)
            .ok_or_else(|| StoreError::not_found("user", user_id))
    }
}

/// In-memory implementation of every repository
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Product>, StoreError> {
        Ok(self.tables.lock().await.products.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.tables.lock().await.products.values().cloned().collect())
    }

    async fn create(
        &self,
        created_by: &str,
        products: &[ProductCreate],
    ) -> Result<Vec<Product>, StoreError> {
        let mut tables = self.tables.lock().await;

        for (i, new) in products.iter().enumerate() {
            let taken = tables.products.values().any(|p| p.name == new.name)
                || products[..i].iter().any(|p| p.name == new.name);
            if taken {
                return Err(StoreError::conflict("product", &new.name));
            }
        }

        let now = now_millis();
        let mut created = Vec::with_capacity(products.len());
        for new in products {
            let id = Tables::next_id(&mut tables.next_product_id);
            let product = Product {
                id,
                name: new.name.clone(),
                description: new.description.clone(),
                price: new.price,
                stock: new.stock,
                created_by: created_by.to_string(),
                created_at: now,
                updated_at: now,
            };
            tables.products.insert(id, product.clone());
            created.push(product);
        }
        Ok(created)
    }

    async fn update(&self, product: &Product) -> Result<Product, StoreError> {
        let mut tables = self.tables.lock().await;
        let stored = tables
            .products
            .get_mut(&product.id)
            .ok_or_else(|| StoreError::not_found("product", product.id))?;
        if product.stock < 0 {
            return Err(StoreError::NegativeStock(product.id));
        }
        *stored = Product {
            updated_at: now_millis(),
            ..product.clone()
        };
        Ok(stored.clone())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.tables.lock().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::conflict("user", &user.email));
        }

        let id = Tables::next_id(&mut tables.next_user_id);
        let now = now_millis();
        let user = User {
            id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            token: String::new(),
            refresh_token: String::new(),
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn update_tokens(&self, user_id: i64, tokens: &TokenPair) -> Result<User, StoreError> {
        let mut tables = self.tables.lock().await;
        let user = tables.user_mut(user_id)?;
        user.token = tokens.token.clone();
        user.refresh_token = tokens.refresh_token.clone();
        user.updated_at = now_millis();
        Ok(user.clone())
    }

    async fn update_password_hash(&self, user_id: i64, hash: &str) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        let user = tables.user_mut(user_id)?;
        user.password_hash = hash.to_string();
        user.updated_at = now_millis();
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn FulfillmentTx>, StoreError> {
        let guard = Arc::clone(&self.tables).lock_owned().await;
        Ok(Box::new(MemoryTx {
            tables: guard,
            products: HashMap::new(),
            orders: Vec::new(),
        }))
    }

    async fn find_by_user(&self, user_id: i64) -> Result<Vec<Order>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .orders
            .iter()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect())
    }
}

/// Fulfillment transaction over the locked tables
///
/// Writes land in `products`/`orders` and are copied into the tables on
/// commit only.
struct MemoryTx {
    tables: OwnedMutexGuard<Tables>,
    products: HashMap<i64, Product>,
    orders: Vec<Order>,
}

#[async_trait]
impl FulfillmentTx for MemoryTx {
    async fn lock_product(&mut self, id: i64) -> Result<Option<Product>, StoreError> {
        if let Some(staged) = self.products.get(&id) {
            return Ok(Some(staged.clone()));
        }
        Ok(self.tables.products.get(&id).cloned())
    }

    async fn update_product(&mut self, product: &Product) -> Result<(), StoreError> {
        if !self.tables.products.contains_key(&product.id) {
            return Err(StoreError::not_found("product", product.id));
        }
        if product.stock < 0 {
            return Err(StoreError::NegativeStock(product.id));
        }
        self.products.insert(
            product.id,
            Product {
                updated_at: now_millis(),
                ..product.clone()
            },
        );
        Ok(())
    }

    async fn create_order(&mut self, order: &NewOrder) -> Result<Order, StoreError> {
        let id = Tables::next_id(&mut self.tables.next_order_id);
        let mut order_items = Vec::with_capacity(order.lines.len());
        for line in &order.lines {
            order_items.push(OrderLine {
                id: Tables::next_id(&mut self.tables.next_line_id),
                order_id: id,
                product_id: line.product_id,
                quantity: line.quantity,
                unit_price: line.unit_price,
            });
        }

        let order = Order {
            id,
            user_id: order.user_id,
            total: order.total,
            created_at: now_millis(),
            order_items,
        };
        self.orders.push(order.clone());
        Ok(order)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let MemoryTx {
            mut tables,
            products,
            orders,
        } = *self;
        tables.products.extend(products);
        tables.orders.extend(orders);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        Ok(())
    }
}
