//! Drives a generation pass: scan, filter, then resolve, extract, plan and
//! emit each candidate independently. A candidate that fails any step is
//! dropped; it never aborts the pass.

use crate::config::Config;
use crate::emit;
use crate::output::{GeneratedUnit, GeneratedUnits};
use crate::program::Program;
use crate::resolve::{self, Resolved};
use crate::scope::{Declaration, ModuleTree};
use crate::shape;

#[derive(Debug, Clone, Default)]
pub struct Generator {
  config: Config,
}

impl Generator {
  pub fn new(config: Config) -> Self {
    Self { config }
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  /// Runs one pass over `program`. Identical programs yield identical units.
  #[tracing::instrument(skip_all, fields(files = program.files().len()))]
  pub fn run(&self, program: &Program) -> GeneratedUnits {
    let tree = ModuleTree::build(program);
    let mut units = GeneratedUnits::new();

    let candidates = tree
      .declarations()
      .iter()
      .filter(|decl| resolve::has_attributes(decl.item));
    for decl in candidates {
      if let Some(unit) = self.generate(&tree, decl) {
        if let Some(replaced) = units.insert(unit) {
          tracing::warn!(
            key = %replaced.key,
            replaced = %replaced.source,
            "two annotated structs share a name; the later one wins"
          );
        }
      }
    }

    tracing::debug!(units = units.len(), "pass finished");
    units
  }

  /// Processes one candidate through to its generated unit.
  pub fn generate(&self, tree: &ModuleTree<'_>, decl: &Declaration<'_>) -> Option<GeneratedUnit> {
    let resolved = resolve::resolve(tree, &self.config, decl)?;
    self.emit_unit(&resolved)
  }

  fn emit_unit(&self, resolved: &Resolved<'_>) -> Option<GeneratedUnit> {
    let source_fields = shape::field_names(resolved.source.item);
    let target_fields = shape::field_names(resolved.target.item);
    let plan = shape::plan(&source_fields, &target_fields);

    let source = resolved.source.path().join("::");
    let target = resolved.target.path.join("::");
    let text = match emit::emit(&self.config, resolved, &plan) {
      Ok(text) => text,
      Err(err) => {
        tracing::warn!(%source, %err, "generated mapper failed to parse, skipping");
        return None
      }
    };

    let key = self.config.unit_key(&resolved.source.item.ident);
    tracing::debug!(%key, %source, target_type = %target, fields = ?plan.names(), "mapper generated");
    Some(GeneratedUnit {
      key,
      source,
      target,
      fields: plan.names(),
      text,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const ENTITIES: &str = r#"
    pub struct Book {
      pub name: String,
      pub author: String,
      pub page_count: u32,
    }

    pub struct Letters {
      pub D: u32,
      pub C: u32,
      pub B: u32,
    }
  "#;

  const INPUTS: &str = r#"
    use fieldmapper::generate_mapper;
    use crate::entities::Book;

    #[generate_mapper(Book)]
    #[derive(Debug, Clone)]
    pub struct UpdateBookInput {
      pub id: u64,
      pub name: String,
      pub author: String,
      pub page_count: u32,
    }

    #[derive(Debug)]
    pub struct NotAnnotated {
      pub name: String,
    }

    pub struct Bare {
      pub name: String,
    }

    #[generate_mapper(Missing)]
    pub struct Unresolved {
      pub name: String,
    }

    #[other::generate_mapper(Book)]
    pub struct Lookalike {
      pub name: String,
    }

    #[generate_mapper(crate::entities::Letters)]
    pub struct Abc {
      pub A: u32,
      pub B: u32,
      pub C: u32,
    }
  "#;

  fn run(inputs: &str) -> GeneratedUnits {
    let program = Program::from_sources(vec![
      ("crate", "pub mod entities; pub mod inputs;"),
      ("crate::entities", ENTITIES),
      ("crate::inputs", inputs),
    ])
    .unwrap();
    Generator::default().run(&program)
  }

  #[test]
  fn test_only_resolved_candidates_produce_units() {
    let units = run(INPUTS);
    assert_eq!(
      units.keys().collect::<Vec<_>>(),
      vec!["Abc_Mapper", "UpdateBookInput_Mapper"]
    );
  }

  #[test]
  fn test_update_book_input() {
    let units = run(INPUTS);
    let unit = units.get("UpdateBookInput_Mapper").unwrap();
    assert_eq!(unit.source, "crate::inputs::UpdateBookInput");
    assert_eq!(unit.target, "crate::entities::Book");
    assert_eq!(unit.fields, vec!["name", "author", "page_count"]);
    assert!(unit.text.contains("pub fn to_book(&self) -> crate::entities::Book"));
    assert!(!unit.text.contains("self.id"));
  }

  #[test]
  fn test_plan_follows_source_order() {
    let units = run(INPUTS);
    assert_eq!(units.get("Abc_Mapper").unwrap().fields, vec!["B", "C"]);
  }

  #[test]
  fn test_deterministic() {
    let first = run(INPUTS);
    let second = run(INPUTS);
    assert_eq!(first, second);
    assert_eq!(first.render(), second.render());
  }

  #[test]
  fn test_rerun_after_edit() {
    let before = run(INPUTS);
    assert!(before
      .get("UpdateBookInput_Mapper")
      .unwrap()
      .text
      .contains("self.author"));

    let edited = INPUTS.replace("pub author: String,", "");
    let after = run(&edited);
    let unit = after.get("UpdateBookInput_Mapper").unwrap();
    assert_eq!(unit.fields, vec!["name", "page_count"]);
    assert!(!unit.text.contains("author"));
  }

  #[test]
  fn test_removing_marker_drops_unit() {
    let edited = INPUTS.replace("#[generate_mapper(Book)]", "");
    let units = run(&edited);
    assert!(units.get("UpdateBookInput_Mapper").is_none());
  }

  #[test]
  fn test_inline_modules() {
    let units = run(
      r#"
        pub mod v2 {
          use fieldmapper::generate_mapper;

          #[generate_mapper(super::super::entities::Book)]
          pub struct Renamed {
            pub name: String,
          }
        }
      "#,
    );
    let unit = units.get("Renamed_Mapper").unwrap();
    assert_eq!(unit.source, "crate::inputs::v2::Renamed");
    assert!(unit.text.contains("impl crate::inputs::v2::Renamed"));
  }

  #[test]
  fn test_glob_import_in_gated_module() {
    let units = run(
      r#"
        #[cfg(test)]
        mod tests {
          use fieldmapper::*;
          use crate::entities::Book;

          #[generate_mapper(Book)]
          pub struct Fixture {
            pub name: String,
          }
        }
      "#,
    );
    let unit = units.get("Fixture_Mapper").unwrap();
    assert_eq!(unit.fields, vec!["name"]);
    assert!(unit.text.contains("#[cfg(test)]\nimpl crate::inputs::tests::Fixture"));
  }

  #[test]
  fn test_custom_config() {
    let program = Program::from_sources(vec![
      ("crate", "pub mod entities; pub mod inputs;"),
      ("crate::entities", ENTITIES),
      (
        "crate::inputs",
        "#[my_macros::map_to(crate::entities::Book)] pub struct In { pub name: String }",
      ),
    ])
    .unwrap();
    assert!(Generator::default().run(&program).is_empty());

    let config = Config::default()
      .with_marker("my_macros::map_to")
      .with_method_prefix("into_")
      .with_key_suffix("_Conv");
    let units = Generator::new(config).run(&program);
    let unit = units.get("In_Conv").unwrap();
    assert!(unit.text.contains("pub fn into_book(&self)"));
  }
}
