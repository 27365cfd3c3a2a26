#[allow(unused_imports)]
pub mod prelude {
    pub use super::item::Entity as Item;
}

pub mod item {
    use sea_orm::entity::prelude::*;

    #[sea_orm::model]
    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "items")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub name: String,
        pub description: Option<String>,
        #[sea_orm(default_value = false)]
        pub completed: bool,
        pub due_date: Option<DateTimeWithTimeZone>,
        #[sea_orm(default_expr = "Expr::current_timestamp()")]
        pub created_at: DateTimeWithTimeZone,
        #[sea_orm(default_expr = "Expr::current_timestamp()")]
        pub updated_at: DateTimeWithTimeZone,
    }

    impl ActiveModelBehavior for ActiveModel {}
}
