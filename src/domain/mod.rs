// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Domain types and rules, independent of HTTP and of the storage backend.
// The only persistence dependency is the `store::OrderStore` trait.
//
// ============================================================================

pub mod order;
