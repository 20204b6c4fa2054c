//! CLI support.
//!
//! The `recordpro` binary parses arguments and dispatches; this module holds
//! the pieces it shares with tests.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `list` | Show the records table, filtered and sorted |
//! | `show` | Show one record in full |
//! | `add` | Create a record |
//! | `edit` | Change fields of a record |
//! | `delete` | Remove a record after confirmation |
//! | `reset` | Remove every record after confirmation |
//! | `stats` | Show headline figures and distributions |
//! | `insights` | Ask the AI endpoint for a narrative report |
//! | `generate` | Ask the AI endpoint for sample records and store them |
//! | `config` | Show the effective configuration |
//!
//! # Example Usage
//!
//! ```bash
//! recordpro add --name "Ann Lee" --roll CS-001 --gpa 3.9
//! recordpro list --search ann --sort gpa --desc
//! recordpro insights
//! ```

mod confirm;
mod llm_factory;
pub mod render;

pub use confirm::{confirm, confirm_stdin};
pub use llm_factory::{
    build_gateway, build_gemini_client, build_http_config, build_openai_client, build_provider,
};
