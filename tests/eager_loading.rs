//! Joined eager loading against an in-memory SQLite database.

mod common;

use common::{seed_orders, seed_users, setup, Order, OrderColumn, User, UserColumn};
use fluentguard::{ColumnPath, ColumnTrait, FluentError, LoadHint, SelectBuilder};
use sea_query::ExprTrait;

#[test]
fn test_has_many_attaches_children_once_per_parent() {
    let session = setup();
    let users = seed_users(&session, 4);
    let orders = seed_orders(&session, &[1, 3], 3);

    let loaded = SelectBuilder::new(&session, User)
        .unwrap()
        .options(LoadHint::joined("orders"))
        .order_by(UserColumn::Id.asc())
        .get()
        .unwrap();

    assert_eq!(loaded.len(), 4);
    assert_eq!(loaded.iter().map(|u| u.id).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    assert_eq!(loaded[0].name, users[0].name);

    let mut first: Vec<i32> = loaded[0].orders.iter().map(|o| o.id).collect();
    first.sort();
    assert_eq!(first, vec![1, 2, 3]);
    assert_eq!(loaded[2].orders.len(), 3);
    assert!(loaded[1].orders.is_empty());
    assert!(loaded[3].orders.is_empty());

    let order = loaded[2].orders.iter().find(|o| o.id == 4).unwrap();
    assert_eq!(order.product, orders[3].product);
    assert_eq!(order.amount, 9.5);
}

#[test]
fn test_limit_counts_parents_not_joined_rows() {
    let session = setup();
    seed_users(&session, 5);
    seed_orders(&session, &[1, 2, 3], 4);

    let loaded = SelectBuilder::new(&session, User)
        .unwrap()
        .options(LoadHint::joined("orders"))
        .order_by(UserColumn::Id.asc())
        .limit(2)
        .get()
        .unwrap();

    assert_eq!(loaded.iter().map(|u| u.id).collect::<Vec<_>>(), vec![1, 2]);
    assert!(loaded.iter().all(|u| u.orders.len() == 4));
}

#[test]
fn test_paginate_with_joined_children() {
    let session = setup();
    seed_users(&session, 6);
    seed_orders(&session, &[3, 4], 2);

    let page = SelectBuilder::new(&session, User)
        .unwrap()
        .options(LoadHint::joined("orders"))
        .order_by(UserColumn::Id.asc())
        .paginate(2, 2)
        .unwrap();

    assert_eq!(page.total, 6);
    assert_eq!(page.data.iter().map(|u| u.id).collect::<Vec<_>>(), vec![3, 4]);
    assert!(page.data.iter().all(|u| u.orders.len() == 2));
}

#[test]
fn test_raw_result_requires_unique() {
    let session = setup();
    seed_users(&session, 2);
    seed_orders(&session, &[1], 2);

    let builder = SelectBuilder::new(&session, User)
        .unwrap()
        .options(LoadHint::joined("orders"))
        .order_by(UserColumn::Id.asc());

    let result = builder.execute().unwrap();
    assert_eq!(result.len(), 3);
    assert!(matches!(
        result.models::<common::UserModel>(),
        Err(FluentError::AmbiguousResult(_))
    ));

    let users = builder
        .execute()
        .unwrap()
        .unique()
        .models::<common::UserModel>()
        .unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0].orders.len(), 2);
}

#[test]
fn test_belongs_to_attaches_parent() {
    let session = setup();
    let users = seed_users(&session, 2);
    seed_orders(&session, &[2, 1], 1);

    let orders = SelectBuilder::new(&session, Order)
        .unwrap()
        .options(LoadHint::joined("user"))
        .order_by(OrderColumn::Id.asc())
        .get()
        .unwrap();

    assert_eq!(orders.len(), 2);
    let owner = orders[0].user.as_deref().unwrap();
    assert_eq!(owner.id, 2);
    assert_eq!(owner.email, users[1].email);
    assert_eq!(owner.created_at, users[1].created_at);
    assert_eq!(orders[1].user.as_deref().map(|u| u.id), Some(1));

    // belongs-to rows never multiply, so the raw result decodes directly
    let direct = SelectBuilder::new(&session, Order)
        .unwrap()
        .options(LoadHint::joined("user"))
        .execute()
        .unwrap()
        .models::<common::OrderModel>()
        .unwrap();
    assert_eq!(direct.len(), 2);
}

#[test]
fn test_filter_on_related_column() {
    let session = setup();
    seed_users(&session, 3);
    seed_orders(&session, &[1, 2, 3], 2);

    let loaded = SelectBuilder::new(&session, Order)
        .unwrap()
        .options(LoadHint::joined("user"))
        .filter(
            ColumnPath {
                table: "users",
                name: "id",
            }
            .expr()
            .eq(2),
        )
        .get()
        .unwrap();
    assert_eq!(loaded.len(), 2);
    assert!(loaded.iter().all(|o| o.user_id == 2));
}

#[test]
fn test_first_with_child_filter() {
    let session = setup();
    seed_users(&session, 3);
    // orders 1-2 belong to user 1, orders 3-4 to user 2, orders 5-6 to user 3
    seed_orders(&session, &[1, 2, 3], 2);

    let builder = || {
        SelectBuilder::new(&session, User)
            .unwrap()
            .options(LoadHint::joined("orders"))
            .filter(OrderColumn::Id.gt(2))
            .order_by(UserColumn::Id.asc())
    };

    let first = builder().first().unwrap().unwrap();
    assert_eq!(first.id, 2);
    let mut ids: Vec<i32> = first.orders.iter().map(|o| o.id).collect();
    ids.sort();
    assert_eq!(ids, vec![3, 4]);

    let limited = builder().limit(5).get().unwrap();
    assert_eq!(limited.iter().map(|u| u.id).collect::<Vec<_>>(), vec![2, 3]);
}

#[test]
fn test_limited_join_rejects_ordering_by_child() {
    let session = setup();
    let err = SelectBuilder::new(&session, User)
        .unwrap()
        .options(LoadHint::joined("orders"))
        .order_by(OrderColumn::Id.desc())
        .first()
        .unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn test_invalid_eager_loads() {
    let session = setup();

    let unknown = SelectBuilder::new(&session, User)
        .unwrap()
        .options(LoadHint::joined("invoices"))
        .get()
        .unwrap_err();
    assert!(unknown.is_configuration());

    let with_fields = SelectBuilder::new(&session, User)
        .unwrap()
        .select([UserColumn::Name])
        .options(LoadHint::joined("orders"))
        .get_fields()
        .unwrap_err();
    assert!(with_fields.is_configuration());
}
