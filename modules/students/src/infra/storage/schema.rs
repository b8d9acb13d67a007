use sea_orm::sea_query::{ColumnDef, Table, TableCreateStatement};

use super::entity::{Column, Entity};

/// `CREATE TABLE IF NOT EXISTS students`.
///
/// `id` is an auto-increment key that is never handed out twice, `roll` is unique.
#[must_use]
pub fn students_table() -> TableCreateStatement {
    Table::create()
        .table(Entity)
        .if_not_exists()
        .col(
            ColumnDef::new(Column::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(ColumnDef::new(Column::Roll).integer().not_null().unique_key())
        .col(ColumnDef::new(Column::Name).string_len(100).not_null())
        .col(ColumnDef::new(Column::ClassName).string_len(50).not_null())
        .to_owned()
}
