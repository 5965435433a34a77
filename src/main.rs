mod config;
mod core;
mod error;
mod render;
mod spawner;
mod types;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    ui::run()?;
    Ok(())
}
