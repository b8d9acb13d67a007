/// A stored student record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Student {
    /// Store-assigned identity; never reused after deletion.
    pub id: i32,
    /// Business identifier, unique across live records.
    pub roll: i32,
    pub name: String,
    pub class_name: String,
}

/// Fields supplied by a create or a full-replace update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub roll: i32,
    pub name: String,
    pub class_name: String,
}
