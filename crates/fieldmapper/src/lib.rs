//! # fieldmapper
//!
//! Generates conversion methods between structs that share field names.
//!
//! Annotate a struct with the target it maps into:
//!
//! ```ignore
//! use fieldmapper::generate_mapper;
//! use crate::entities::Book;
//!
//! #[generate_mapper(Book)]
//! pub struct UpdateBookInput {
//!   pub id: u64,
//!   pub name: String,
//!   pub author: String,
//! }
//! ```
//!
//! and run [`build::generate`] from the crate's build script. Every annotated
//! struct gets a `to_<target>(&self)` method copying the fields both structs
//! declare; `id` above is left out because `Book` has no such field.
//!
//! The generator can also be driven directly:
//!
//! ```
//!   use fieldmapper::{Generator, Program};
//!
//!   let program = Program::from_sources(vec![
//!     ("crate", "pub mod entities; pub mod inputs;"),
//!     ("crate::entities", "pub struct Book { pub name: String, pub pages: u32 }"),
//!     ("crate::inputs", r#"
//!       #[fieldmapper::generate_mapper(crate::entities::Book)]
//!       pub struct UpdateBookInput { pub id: u64, pub name: String, pub pages: u32 }
//!     "#),
//!   ]).unwrap();
//!
//!   let units = Generator::default().run(&program);
//!   let unit = units.get("UpdateBookInput_Mapper").unwrap();
//!   assert_eq!(unit.fields, vec!["name", "pages"]);
//!   assert!(unit.text.contains("pub fn to_book(&self) -> crate::entities::Book"));
//! ```

pub use fieldmapper_codegen::generate_mapper;

pub mod build;
pub mod config;
mod emit;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod program;
pub mod resolve;
pub mod scope;
pub mod shape;

pub use config::Config;
pub use error::{Error, Result};
pub use output::{GeneratedUnit, GeneratedUnits};
pub use pipeline::Generator;
pub use program::Program;
