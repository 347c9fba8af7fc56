use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub storage_path: String,
    pub db_path: String,
    pub identity_api_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let storage_path = env::var("TAKVIM_STORAGE_PATH").unwrap_or("./".to_string());
        let db_path = format!("{}/takvim.db", storage_path);
        let identity_api_url =
            env::var("TAKVIM_IDENTITY_API_URL").expect("Missing env var TAKVIM_IDENTITY_API_URL");

        Self {
            storage_path,
            db_path,
            identity_api_url,
        }
    }
}
