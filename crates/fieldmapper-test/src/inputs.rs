use fieldmapper::generate_mapper;
use fieldmapper::generate_mapper as map_into;

#[generate_mapper(crate::entities::Book)]
#[derive(Debug, Clone)]
pub struct UpdateBookInput {
  pub id: u64,
  pub name: String,
  pub author: String,
  pub page_count: u32,
}

impl UpdateBookInput {
  pub fn new(id: u64, name: &str, author: &str, page_count: u32) -> Self {
    Self {
      id,
      name: name.to_string(),
      author: author.to_string(),
      page_count,
    }
  }
}

/// Field order differs from `Shelf`; the mapper follows this struct's order.
#[map_into(super::entities::Shelf)]
#[derive(Debug, Clone, Default)]
pub struct CreateShelfInput {
  pub capacity: usize,
  pub requested_by: String,
  pub label: String,
}

/// Nothing in common with `Audit`: the mapper builds an empty one.
#[generate_mapper(crate::entities::Audit)]
#[derive(Debug, Clone, Default)]
pub struct AuditInput {
  pub reason: String,
}

/// Not annotated: no mapper.
#[derive(Debug, Clone, Default)]
pub struct DeleteBookInput {
  pub id: u64,
}
