// src/schema/types.rs

/// The three cell types a scraped column can be cast to.
#[derive(Debug, PartialEq, Clone, Copy, Eq, Hash)]
pub enum ScalarType {
    Integer,
    Float,
    Text,
}

/// A single column definition: authoritative name plus declared type.
#[derive(Debug, PartialEq, Clone, Copy, Eq, Hash)]
pub struct Column {
    pub name: &'static str,
    pub ty: ScalarType,
}

impl Column {
    pub const fn int(name: &'static str) -> Self {
        Self {
            name,
            ty: ScalarType::Integer,
        }
    }

    pub const fn float(name: &'static str) -> Self {
        Self {
            name,
            ty: ScalarType::Float,
        }
    }

    pub const fn text(name: &'static str) -> Self {
        Self {
            name,
            ty: ScalarType::Text,
        }
    }
}

/// Positional schema for one HTML table: the `id` attribute of the table in
/// the source document and its columns in source order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    pub table_id: &'static str,
    pub columns: &'static [Column],
}

impl TableSchema {
    pub fn width(&self) -> usize {
        self.columns.len()
    }
}
