pub mod tracing;
pub use self::tracing::TracingHttpServiceLayer;
