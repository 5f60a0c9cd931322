//! Entities shared by the unit tests.
//!
//! `posts` has many `comments`; `comments` belongs to `posts`.

use crate::entity::{
    ColumnDef, ColumnTrait, ColumnType, EntityTrait, FromRow, RelationDef,
};
use crate::error::FluentError;
use crate::row::Row;
use chrono::NaiveDateTime;
use sea_query::Value;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Post;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostColumn {
    Id,
    Title,
    Published,
    CreatedAt,
}

impl ColumnTrait for PostColumn {
    type Entity = Post;

    fn def(&self) -> ColumnDef {
        match self {
            PostColumn::Id => ColumnDef::new("id", ColumnType::BigInteger),
            PostColumn::Title => ColumnDef::new("title", ColumnType::Text),
            PostColumn::Published => ColumnDef::new("published", ColumnType::Boolean),
            PostColumn::CreatedAt => ColumnDef::new("created_at", ColumnType::Timestamp).nullable(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostModel {
    pub id: i64,
    pub title: String,
    pub published: bool,
    pub created_at: Option<NaiveDateTime>,
    pub comments: Vec<CommentModel>,
}

impl FromRow for PostModel {
    fn from_row(row: &Row) -> Result<Self, FluentError> {
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            published: row.try_get("published")?,
            created_at: row.try_get("created_at")?,
            comments: Vec::new(),
        })
    }

    fn attach_related(&mut self, relation: &str, row: &Row) -> Result<(), FluentError> {
        if relation == "comments" {
            self.comments.push(CommentModel::from_row(row)?);
        }
        Ok(())
    }
}

pub const COMMENTS: RelationDef =
    RelationDef::has_many("comments", "comments", "id", "post_id", &["id", "post_id", "body"]);

impl EntityTrait for Post {
    type Model = PostModel;
    type Column = PostColumn;

    fn table_name(&self) -> &'static str {
        "posts"
    }

    fn columns(&self) -> Vec<PostColumn> {
        vec![
            PostColumn::Id,
            PostColumn::Title,
            PostColumn::Published,
            PostColumn::CreatedAt,
        ]
    }

    fn primary_key(&self) -> PostColumn {
        PostColumn::Id
    }

    fn relations(&self) -> Vec<RelationDef> {
        vec![COMMENTS]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Comment;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentColumn {
    Id,
    PostId,
    Body,
}

impl ColumnTrait for CommentColumn {
    type Entity = Comment;

    fn def(&self) -> ColumnDef {
        match self {
            CommentColumn::Id => ColumnDef::new("id", ColumnType::BigInteger),
            CommentColumn::PostId => ColumnDef::new("post_id", ColumnType::BigInteger),
            CommentColumn::Body => ColumnDef::new("body", ColumnType::Text),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommentModel {
    pub id: i64,
    pub post_id: i64,
    pub body: String,
}

impl FromRow for CommentModel {
    fn from_row(row: &Row) -> Result<Self, FluentError> {
        Ok(Self {
            id: row.try_get("id")?,
            post_id: row.try_get("post_id")?,
            body: row.try_get("body")?,
        })
    }
}

impl EntityTrait for Comment {
    type Model = CommentModel;
    type Column = CommentColumn;

    fn table_name(&self) -> &'static str {
        "comments"
    }

    fn columns(&self) -> Vec<CommentColumn> {
        vec![CommentColumn::Id, CommentColumn::PostId, CommentColumn::Body]
    }

    fn primary_key(&self) -> CommentColumn {
        CommentColumn::Id
    }

    fn relations(&self) -> Vec<RelationDef> {
        vec![RelationDef::belongs_to("post", "posts", "post_id", "id", &["id", "title", "published", "created_at"])]
    }
}

/// A `posts` row as SQLite would return it
pub fn post_row(id: i64, title: &str) -> Row {
    Row::from_pairs([
        ("id", Value::BigInt(Some(id))),
        ("title", Value::from(title)),
        ("published", Value::BigInt(Some(1))),
        ("created_at", Value::String(None)),
    ])
}

/// A `posts` row joined with one `comments` row
pub fn post_with_comment_row(id: i64, title: &str, comment: Option<(i64, &str)>) -> Row {
    let (comment_id, body) = match comment {
        Some((cid, body)) => (Value::BigInt(Some(cid)), Value::from(body)),
        None => (Value::BigInt(None), Value::String(None)),
    };
    let post_id = if comment.is_some() {
        Value::BigInt(Some(id))
    } else {
        Value::BigInt(None)
    };
    Row::from_pairs([
        ("id", Value::BigInt(Some(id))),
        ("title", Value::from(title)),
        ("published", Value::BigInt(Some(0))),
        ("created_at", Value::from("2024-01-02 03:04:05")),
        ("comments__id", comment_id),
        ("comments__post_id", post_id),
        ("comments__body", body),
    ])
}
