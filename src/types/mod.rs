/// Tenant identifier scoping every record held by the remote data service.
pub type AssetManagerId = i64;

/// 1-indexed position of a data row within an import file.
pub type RowIndex = usize;
