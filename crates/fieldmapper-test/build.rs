fn main() -> Result<(), fieldmapper::Error> {
  fieldmapper::build::generate()?;
  Ok(())
}
