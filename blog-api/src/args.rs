use clap::Parser;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct RunArgs {
    #[arg(short, long)]
    pub adress: String,
    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,
    /// Database server url, or a full sqlite url
    #[arg(long)]
    pub db: String,
    #[arg(long)]
    pub db_name: String,
    /// Drop every table and rerun all migrations on start-up
    #[arg(long, default_value_t = false)]
    pub fresh: bool,
    /// Directory profile pictures are written to
    #[arg(long, default_value = "media")]
    pub media_dir: String,
    /// Session lifetime in seconds, 0 keeps sessions until logout
    #[arg(long, default_value_t = 3600)]
    pub session_ttl: i64,
}

impl RunArgs {
    pub fn session_ttl(&self) -> Option<i64> {
        (self.session_ttl > 0).then_some(self.session_ttl)
    }
}
