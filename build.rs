fn main() -> Result<(), Box<dyn std::error::Error>> {
    // exposes build metadata to `shadow_rs::shadow!(build)` in main.rs
    shadow_rs::ShadowBuilder::builder().build()?;

    Ok(())
}
