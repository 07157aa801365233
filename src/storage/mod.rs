pub mod catalog;
pub mod seed;

pub use seed::SeedData;

use crate::error::Result;

/// Loads the seed file when one is configured, otherwise the built-in mock data.
pub fn load_seed(path: Option<&str>) -> Result<SeedData> {
    match path {
        Some(path) => {
            let seed = SeedData::from_json_file(path)?;
            log::info!(
                "Loaded seed {path}: {} users, {} chats",
                seed.users.len(),
                seed.chats.len()
            );
            Ok(seed)
        }
        None => {
            log::info!("No seed file configured; using built-in mock data");
            Ok(SeedData::mock())
        }
    }
}
