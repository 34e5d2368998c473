//! External system integrations for Tabula.
//!
//! The export pipeline only depends on the traits in [`traits`]. This module
//! also ships reference implementations so exports run from the command line:
//!
//! - [`definitions`] - a directory of XML export definitions
//! - [`dataset`] - a JSON dataset acting as record source and resolver backend
//! - [`sink`] - row sinks producing CSV or an in-memory table
//!
//! # Example
//!
//! ```rust,no_run
//! use tabula::adapters::definitions::FsDefinitionStore;
//! use tabula::adapters::traits::DefinitionStore;
//! use tabula::domain::ModelName;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = FsDefinitionStore::open("definitions").await?;
//! let model = ModelName::new("Addressbook_Model_Contact")?;
//! let found = store.search(&model, "default").await?;
//! println!("{} definition(s)", found.len());
//! # Ok(())
//! # }
//! ```

pub mod dataset;
pub mod definitions;
pub mod sink;
pub mod traits;
