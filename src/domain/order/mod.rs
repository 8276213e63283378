// ============================================================================
// Order Domain - Business Logic for the café order
// ============================================================================
//
// This module contains ALL Order-specific code:
// - Value objects (LineItem, OrderStatus)
// - Item text (the `<name> <price>` line format)
// - Commands (CreateOrder, UpdateOrder, raw form fields, JSON payloads)
// - Errors (OrderError enum)
// - Aggregate (Order entity, total computation and invariants)
// - Command Handler (OrderCommandHandler over an OrderStore)
//
// ============================================================================

pub mod value_objects;
pub mod items_text;
pub mod commands;
pub mod errors;
pub mod aggregate;
pub mod command_handler;

// Re-export for convenience
pub use value_objects::*;
pub use items_text::*;
pub use commands::*;
pub use errors::*;
pub use aggregate::*;
pub use command_handler::*;
