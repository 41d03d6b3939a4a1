//! secrets-to-env - Lambda extension that turns secret references into an env file.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli             # Flags with env fallbacks
//! ├── runner          # Materialize, register, poll
//! ├── error           # Error types
//! └── core/
//!     ├── config      # Config built once at startup
//!     ├── constants   # Suffix, paths, header names
//!     ├── secrets/    # Reference scan + SecretStore trait
//!     │   └── aws     # Secrets Manager implementation
//!     ├── env         # Env file policy, writer, reader
//!     ├── lifecycle/  # Extension state machine
//!     │   └── client  # Extensions API over HTTP
//!     └── signal      # SIGINT/SIGTERM to cancellation
//! ```
//!
//! # Flow
//!
//! 1. Scan the environment for `*_SECRET_ARN` variables
//! 2. Fetch each secret and flatten its JSON object
//! 3. Write `KEY=VALUE` lines to `/tmp/.env`
//! 4. Register with the Extensions API and wait for `SHUTDOWN`

pub mod cli;
pub mod core;
pub mod error;
pub mod runner;
