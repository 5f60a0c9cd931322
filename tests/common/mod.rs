//! Shared entities and fixtures for the SQLite-backed integration tests.
#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use fake::faker::internet::en::SafeEmail;
use fake::faker::lorem::en::Word;
use fake::faker::name::en::Name;
use fake::Fake;
use fluentguard::{
    ColumnDef, ColumnTrait, ColumnType, EntityTrait, FluentError, FromRow, QuerySession,
    RelationDef, Row, SqliteSession,
};
use sea_query::{Value, Values};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct User;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserColumn {
    Id,
    Name,
    Email,
    Active,
    CreatedAt,
}

impl ColumnTrait for UserColumn {
    type Entity = User;

    fn def(&self) -> ColumnDef {
        match self {
            UserColumn::Id => ColumnDef::new("id", ColumnType::Integer),
            UserColumn::Name => ColumnDef::new("name", ColumnType::Text),
            UserColumn::Email => ColumnDef::new("email", ColumnType::Text),
            UserColumn::Active => ColumnDef::new("active", ColumnType::Boolean),
            UserColumn::CreatedAt => ColumnDef::new("created_at", ColumnType::Timestamp),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserModel {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub active: bool,
    pub created_at: NaiveDateTime,
    pub orders: Vec<OrderModel>,
}

impl FromRow for UserModel {
    fn from_row(row: &Row) -> Result<Self, FluentError> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            active: row.try_get("active")?,
            created_at: row.try_get("created_at")?,
            orders: Vec::new(),
        })
    }

    fn attach_related(&mut self, relation: &str, row: &Row) -> Result<(), FluentError> {
        if relation == "orders" {
            self.orders.push(OrderModel::from_row(row)?);
        }
        Ok(())
    }
}

impl EntityTrait for User {
    type Model = UserModel;
    type Column = UserColumn;

    fn table_name(&self) -> &'static str {
        "users"
    }

    fn columns(&self) -> Vec<UserColumn> {
        vec![
            UserColumn::Id,
            UserColumn::Name,
            UserColumn::Email,
            UserColumn::Active,
            UserColumn::CreatedAt,
        ]
    }

    fn primary_key(&self) -> UserColumn {
        UserColumn::Id
    }

    fn relations(&self) -> Vec<RelationDef> {
        vec![RelationDef::has_many(
            "orders",
            "orders",
            "id",
            "user_id",
            &["id", "user_id", "product", "amount"],
        )]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Order;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderColumn {
    Id,
    UserId,
    Product,
    Amount,
}

impl ColumnTrait for OrderColumn {
    type Entity = Order;

    fn def(&self) -> ColumnDef {
        match self {
            OrderColumn::Id => ColumnDef::new("id", ColumnType::Integer),
            OrderColumn::UserId => ColumnDef::new("user_id", ColumnType::Integer),
            OrderColumn::Product => ColumnDef::new("product", ColumnType::Text),
            OrderColumn::Amount => ColumnDef::new("amount", ColumnType::Double),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderModel {
    pub id: i32,
    pub user_id: i32,
    pub product: String,
    pub amount: f64,
    pub user: Option<Box<UserModel>>,
}

impl FromRow for OrderModel {
    fn from_row(row: &Row) -> Result<Self, FluentError> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            product: row.try_get("product")?,
            amount: row.try_get("amount")?,
            user: None,
        })
    }

    fn attach_related(&mut self, relation: &str, row: &Row) -> Result<(), FluentError> {
        if relation == "user" {
            self.user = Some(Box::new(UserModel::from_row(row)?));
        }
        Ok(())
    }
}

impl EntityTrait for Order {
    type Model = OrderModel;
    type Column = OrderColumn;

    fn table_name(&self) -> &'static str {
        "orders"
    }

    fn columns(&self) -> Vec<OrderColumn> {
        vec![
            OrderColumn::Id,
            OrderColumn::UserId,
            OrderColumn::Product,
            OrderColumn::Amount,
        ]
    }

    fn primary_key(&self) -> OrderColumn {
        OrderColumn::Id
    }

    fn relations(&self) -> Vec<RelationDef> {
        vec![RelationDef::belongs_to(
            "user",
            "users",
            "user_id",
            "id",
            &["id", "name", "email", "active", "created_at"],
        )]
    }
}

const SCHEMA: &str = "
    CREATE TABLE users (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT NOT NULL,
        active BOOLEAN NOT NULL,
        created_at TIMESTAMP NOT NULL
    );
    CREATE TABLE orders (
        id INTEGER PRIMARY KEY,
        user_id INTEGER NOT NULL REFERENCES users (id),
        product TEXT NOT NULL,
        amount REAL NOT NULL
    );
";

/// A fresh in-memory database with the schema applied
pub fn setup() -> SqliteSession {
    let session = SqliteSession::open_in_memory().expect("open in-memory database");
    session.execute_batch(SCHEMA).expect("create schema");
    session
}

fn base_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(9, 0, 0))
        .expect("valid timestamp")
}

/// Insert `count` users with fake names; ids run 1..=count and every third user is inactive
pub fn seed_users(session: &SqliteSession, count: i32) -> Vec<UserModel> {
    (1..=count)
        .map(|id| {
            let user = UserModel {
                id,
                name: Name().fake(),
                email: SafeEmail().fake(),
                active: id % 3 != 0,
                created_at: base_time() + Duration::hours(i64::from(id)),
                orders: Vec::new(),
            };
            session
                .execute(
                    "INSERT INTO users (id, name, email, active, created_at) VALUES (?, ?, ?, ?, ?)",
                    &Values(vec![
                        Value::from(user.id),
                        Value::from(user.name.clone()),
                        Value::from(user.email.clone()),
                        Value::from(user.active),
                        Value::from(user.created_at),
                    ]),
                )
                .expect("insert user");
            user
        })
        .collect()
}

/// Insert `per_user` orders for each user id; order ids are sequential from 1
pub fn seed_orders(session: &SqliteSession, user_ids: &[i32], per_user: i32) -> Vec<OrderModel> {
    let mut orders = Vec::new();
    let mut next_id = 1;
    for &user_id in user_ids {
        for n in 0..per_user {
            let order = OrderModel {
                id: next_id,
                user_id,
                product: Word().fake(),
                amount: f64::from(n + 1) * 9.5,
                user: None,
            };
            session
                .execute(
                    "INSERT INTO orders (id, user_id, product, amount) VALUES (?, ?, ?, ?)",
                    &Values(vec![
                        Value::from(order.id),
                        Value::from(order.user_id),
                        Value::from(order.product.clone()),
                        Value::from(order.amount),
                    ]),
                )
                .expect("insert order");
            orders.push(order);
            next_id += 1;
        }
    }
    orders
}
