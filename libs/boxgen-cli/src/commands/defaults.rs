//! boxgen defaults command - print the default parameter record.

use anyhow::Result;
use boxgen_mesh::BoxParams;

pub fn run() -> Result<()> {
    println!("{}", BoxParams::default().to_json_pretty()?);
    Ok(())
}
