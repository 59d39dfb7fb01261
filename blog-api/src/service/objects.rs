#[derive(Clone)]
pub struct DbConnection {
    pub(crate) db_connection: sea_orm::DatabaseConnection,
}
impl DbConnection {
    pub fn new(db_connection: sea_orm::prelude::DatabaseConnection) -> Self {
        Self { db_connection }
    }
}
