use async_trait::async_trait;
use roster_db::{Gateway, StoreError};
use sea_orm::sea_query::{Expr, Order, Query, SelectStatement};
use sea_orm::{FromQueryResult, QueryResult};

use crate::domain::model::{NewStudent, Student};
use crate::domain::repo::StudentsRepository;

use super::entity::{self, Column, Entity};

/// [`StudentsRepository`] that runs one parameterized statement per call
/// through the persistence [`Gateway`].
pub struct GatewayStudentsRepository {
    gateway: Gateway,
}

impl GatewayStudentsRepository {
    #[must_use]
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    fn select() -> SelectStatement {
        Query::select()
            .columns([Column::Id, Column::Roll, Column::Name, Column::ClassName])
            .from(Entity)
            .to_owned()
    }

    fn decode(row: &QueryResult) -> Result<Student, StoreError> {
        Ok(entity::Model::from_query_result(row, "")?.into())
    }
}

#[async_trait]
impl StudentsRepository for GatewayStudentsRepository {
    async fn list(&self) -> Result<Vec<Student>, StoreError> {
        let stmt = Self::select()
            .order_by(Column::Roll, Order::Asc)
            .order_by(Column::Id, Order::Asc)
            .to_owned();

        self.gateway
            .query_all(&stmt)
            .await?
            .iter()
            .map(Self::decode)
            .collect()
    }

    async fn find(&self, id: i32) -> Result<Option<Student>, StoreError> {
        let stmt = Self::select()
            .and_where(Expr::col(Column::Id).eq(id))
            .to_owned();

        self.gateway
            .query_one(&stmt)
            .await?
            .as_ref()
            .map(Self::decode)
            .transpose()
    }

    async fn insert(&self, new: NewStudent) -> Result<Student, StoreError> {
        let mut stmt = Query::insert();
        stmt.into_table(Entity)
            .columns([Column::Roll, Column::Name, Column::ClassName])
            .values([new.roll.into(), new.name.into(), new.class_name.into()])
            .map_err(|e| StoreError::Unknown(e.to_string()))?
            .returning_all();

        let row = self
            .gateway
            .query_one(&stmt)
            .await?
            .ok_or_else(|| StoreError::Unknown("insert returned no row".to_owned()))?;
        Self::decode(&row)
    }

    async fn update(&self, id: i32, new: NewStudent) -> Result<Option<Student>, StoreError> {
        let stmt = Query::update()
            .table(Entity)
            .values([
                (Column::Roll, new.roll.into()),
                (Column::Name, new.name.into()),
                (Column::ClassName, new.class_name.into()),
            ])
            .and_where(Expr::col(Column::Id).eq(id))
            .returning_all()
            .to_owned();

        self.gateway
            .query_one(&stmt)
            .await?
            .as_ref()
            .map(Self::decode)
            .transpose()
    }

    async fn delete(&self, id: i32) -> Result<bool, StoreError> {
        let stmt = Query::delete()
            .from_table(Entity)
            .and_where(Expr::col(Column::Id).eq(id))
            .to_owned();

        Ok(self.gateway.execute(&stmt).await? > 0)
    }
}
