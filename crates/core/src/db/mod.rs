use diesel::r2d2::{ConnectionManager, Pool};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use kirana_types::{Order, OrderItem};
use tracing::debug;

mod models;
pub mod schema;

pub use models::{NewOrder, NewOrderItem, OrderItemModel, OrderModel, PaymentUpdate};
pub use models::order::ORDER_STATUS_CREATED;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./src/db/migrations");

#[cfg(feature = "sqlite")]
type DbConnection = diesel::sqlite::SqliteConnection;
#[cfg(feature = "postgres")]
type DbConnection = diesel::pg::PgConnection;

pub type PooledConnection = diesel::r2d2::PooledConnection<ConnectionManager<DbConnection>>;

pub type DbPool = Pool<ConnectionManager<DbConnection>>;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Database connection error: {0}")]
    ConnectionError(String),
    #[error("Database migration error")]
    MigrationError(#[from] Box<dyn std::error::Error + Send + Sync>),
    #[error("Failed to encode order for storage: {0}")]
    EncodeOrderError(#[from] serde_json::Error),
    #[error("Failed to create order: {0}")]
    CreateOrderError(diesel::result::Error),
    #[error("Failed to fetch order: {0}")]
    FetchOrderError(diesel::result::Error),
    #[error("Failed to list orders: {0}")]
    ListOrdersError(diesel::result::Error),
    #[error("Failed to update order payment state: {0}")]
    UpdatePaymentError(diesel::result::Error),
}

fn run_migrations(conn: &mut PooledConnection) -> Result<(), DbError> {
    conn.run_pending_migrations(MIGRATIONS)?;
    Ok(())
}

/// Order row plus its items, loaded on an already-held connection.
fn load_order(
    conn: &mut PooledConnection,
    order_id: &str,
) -> Result<Option<Order>, diesel::result::Error> {
    let Some(model) = models::order::find_order(conn, order_id)? else {
        return Ok(None);
    };

    let items = models::order_item::list_items_for_order(conn, order_id)?
        .into_iter()
        .map(OrderItem::from)
        .collect();

    Ok(Some(model.into_order(items)))
}

/// Connection pool over the orders database. Opens (or creates) the store
/// and brings the schema up to date on construction.
#[derive(Debug)]
pub struct DbManager {
    pool: DbPool,
}

impl DbManager {
    pub fn open(database_url: &str) -> DbResult<Self> {
        debug!("Establishing connection to database at {}", database_url);
        let manager = ConnectionManager::<DbConnection>::new(database_url);
        // A `:memory:` sqlite database exists per connection, so the pool
        // must not grow past one or each checkout sees a different store.
        let builder = if database_url.contains(":memory:") {
            Pool::builder().max_size(1)
        } else {
            Pool::builder()
        };
        let pool = builder
            .build(manager)
            .map_err(|e| DbError::ConnectionError(e.to_string()))?;

        let mut conn = pool
            .get()
            .map_err(|e| DbError::ConnectionError(e.to_string()))?;

        debug!("Running database migrations...");
        run_migrations(&mut conn)?;

        Ok(Self { pool })
    }

    fn conn(&self) -> DbResult<PooledConnection> {
        self.pool
            .get()
            .map_err(|e| DbError::ConnectionError(e.to_string()))
    }

    /// Insert an order together with its items, then return the stored order.
    /// The read-back reuses the held connection; a `:memory:` pool has only
    /// one, so a second checkout here would wait on ourselves.
    pub fn create_order(&self, new_order: NewOrder, items: Vec<NewOrderItem>) -> DbResult<Order> {
        let mut conn = self.conn()?;

        new_order.insert(&mut conn).map_err(DbError::CreateOrderError)?;
        NewOrderItem::insert_all(&items, &mut conn).map_err(DbError::CreateOrderError)?;

        load_order(&mut conn, &new_order.id)
            .map_err(DbError::FetchOrderError)?
            .ok_or(DbError::FetchOrderError(diesel::result::Error::NotFound))
    }

    pub fn get_order(&self, order_id: &str) -> DbResult<Option<Order>> {
        let mut conn = self.conn()?;
        load_order(&mut conn, order_id).map_err(DbError::FetchOrderError)
    }

    /// All orders placed by `user_id`, newest first, items included.
    pub fn list_orders_for_user(&self, user_id: &str) -> DbResult<Vec<Order>> {
        let mut conn = self.conn()?;

        let rows = models::order::list_orders_for_user(&mut conn, user_id)
            .map_err(DbError::ListOrdersError)?;

        let mut orders = Vec::with_capacity(rows.len());
        for model in rows {
            let items = models::order_item::list_items_for_order(&mut conn, &model.id)
                .map_err(DbError::ListOrdersError)?
                .into_iter()
                .map(OrderItem::from)
                .collect();
            orders.push(model.into_order(items));
        }
        Ok(orders)
    }

    /// Conditional payment update: only fires while the order is pending.
    pub fn apply_payment_update(
        &self,
        order_id: &str,
        update: PaymentUpdate,
    ) -> DbResult<Option<OrderModel>> {
        let mut conn = self.conn()?;
        update
            .apply_if_pending(&mut conn, order_id)
            .map_err(DbError::UpdatePaymentError)
    }

    /// Raw row lookup, used to disambiguate a no-op payment update.
    pub fn find_order_model(&self, order_id: &str) -> DbResult<Option<OrderModel>> {
        let mut conn = self.conn()?;
        models::order::find_order(&mut conn, order_id).map_err(DbError::FetchOrderError)
    }
}
