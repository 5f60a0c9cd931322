//! Relationship declarations consumed by eager loading.

/// Kind of relationship between two tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    /// One-to-one, foreign key on the related table
    HasOne,
    /// One-to-many, foreign key on the related table
    HasMany,
    /// Many-to-one, foreign key on this table
    BelongsTo,
}

impl RelationKind {
    /// Whether joining this relation can repeat the owning row
    pub fn is_to_many(self) -> bool {
        matches!(self, RelationKind::HasMany)
    }
}

/// A named relationship from an entity to another table
///
/// The join condition is `from_table.from_column = to_table.to_column`.
/// `to_columns` lists the related table's columns that a joined load
/// projects, in the order the related model decodes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationDef {
    pub name: &'static str,
    pub kind: RelationKind,
    pub to_table: &'static str,
    pub from_column: &'static str,
    pub to_column: &'static str,
    pub to_columns: &'static [&'static str],
}

impl RelationDef {
    pub const fn has_many(
        name: &'static str,
        to_table: &'static str,
        from_column: &'static str,
        to_column: &'static str,
        to_columns: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            kind: RelationKind::HasMany,
            to_table,
            from_column,
            to_column,
            to_columns,
        }
    }

    pub const fn has_one(
        name: &'static str,
        to_table: &'static str,
        from_column: &'static str,
        to_column: &'static str,
        to_columns: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            kind: RelationKind::HasOne,
            to_table,
            from_column,
            to_column,
            to_columns,
        }
    }

    pub const fn belongs_to(
        name: &'static str,
        to_table: &'static str,
        from_column: &'static str,
        to_column: &'static str,
        to_columns: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            kind: RelationKind::BelongsTo,
            to_table,
            from_column,
            to_column,
            to_columns,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_has_many_repeats_rows() {
        const ORDERS: RelationDef =
            RelationDef::has_many("orders", "orders", "id", "user_id", &["id", "user_id"]);
        const OWNER: RelationDef =
            RelationDef::belongs_to("owner", "users", "user_id", "id", &["id", "name"]);
        assert!(ORDERS.kind.is_to_many());
        assert!(!OWNER.kind.is_to_many());
        assert!(!RelationKind::HasOne.is_to_many());
    }
}
