#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
  pub name: String,
  pub author: String,
  pub page_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Shelf {
  pub label: String,
  pub capacity: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Audit {}
