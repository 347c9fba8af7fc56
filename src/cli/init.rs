use crate::core::db::{async_db, initialize_db};
use anyhow::Result;
use std::fs;
use std::path::Path;

pub async fn run(db_path: &str) -> Result<()> {
    println!("Initializing db...");
    if let Some(parent) = Path::new(db_path).parent() {
        fs::create_dir_all(parent)
            .unwrap_or_else(|err| println!("Ignoring storage directory create failed: {}", err));
    }

    let db = async_db(db_path).await.expect("Failed to connect to db");
    db.call(|conn| {
        initialize_db(conn).expect("DB initialization failed");
        Ok(())
    })
    .await?;
    println!("Finished initializing db");

    Ok(())
}
