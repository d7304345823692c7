/// Table holding every ingested security, partitioned by exchange
pub const SECURITY_TABLE: &str = "SECURITY";

/// Bookkeeping table recording which tables this store has created
pub const TABLE_REGISTRY: &str = "_secmaster_tables";
