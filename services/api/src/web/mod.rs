pub mod rest;
pub mod state;

// Re-export the analyze handler to make it easily accessible
// to the binary that will build the web server router.
pub use rest::analyze_handler;
