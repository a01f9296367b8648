use clap::Args;

use nailfeed_core::Viewer;

/// Connection settings. Every flag can also come from the environment or `.env`.
#[derive(Debug, Clone, Args)]
pub struct Config {
    /// Base URL of the Strapi backend
    #[arg(long, env = "NAILFEED_API_URL", default_value = "http://localhost:1337", global = true)]
    pub api_url: String,

    /// JWT of the signed-in viewer; omit to browse anonymously
    #[arg(long, env = "NAILFEED_JWT", hide_env_values = true, global = true)]
    pub jwt: Option<String>,

    /// Numeric id of the signed-in viewer
    #[arg(long, env = "NAILFEED_USER_ID", global = true)]
    pub user_id: Option<u64>,

    #[arg(long, env = "NAILFEED_USERNAME", default_value = "me", global = true)]
    pub username: String,

    #[arg(long, env = "NAILFEED_PAGE_SIZE", default_value_t = 10, global = true)]
    pub page_size: u32,
}

impl Config {
    /// A viewer needs both a token and an id; with neither the session is anonymous.
    pub fn viewer(&self) -> anyhow::Result<Option<Viewer>> {
        match (&self.jwt, self.user_id) {
            (None, _) => Ok(None),
            (Some(_), None) => anyhow::bail!("NAILFEED_USER_ID is required when NAILFEED_JWT is set"),
            (Some(jwt), Some(id)) => Ok(Some(Viewer {
                id,
                document_id: None,
                username: self.username.clone(),
                jwt: jwt.clone(),
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(jwt: Option<&str>, user_id: Option<u64>) -> Config {
        Config {
            api_url: "http://localhost:1337".into(),
            jwt: jwt.map(str::to_string),
            user_id,
            username: "me".into(),
            page_size: 10,
        }
    }

    #[test]
    fn no_token_is_anonymous() {
        assert_eq!(config(None, Some(3)).viewer().unwrap(), None);
    }

    #[test]
    fn token_without_id_is_rejected() {
        assert!(config(Some("t"), None).viewer().is_err());
    }

    #[test]
    fn token_and_id_make_a_viewer() {
        let viewer = config(Some("t"), Some(3)).viewer().unwrap().unwrap();
        assert_eq!(viewer.id, 3);
        assert_eq!(viewer.jwt, "t");
    }
}
