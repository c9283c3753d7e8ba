//! Diesel schema for board persistence.

diesel::table! {
    /// Columns ordered on the board.
    board_columns (id) {
        /// Column identifier.
        id -> Uuid,
        /// Column title.
        title -> Text,
        /// Zero-based position on the board.
        order_index -> Int4,
    }
}

diesel::table! {
    /// Tasks ordered within their column.
    board_tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Task content.
        content -> Text,
        /// Owning column; deleting the column cascades to its tasks.
        column_id -> Uuid,
        /// Zero-based position within the owning column.
        order_index -> Int4,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(board_tasks -> board_columns (column_id));
diesel::allow_tables_to_appear_in_same_query!(board_columns, board_tasks);
