use clap::Parser;
use std::path::PathBuf;

use craftdesk_lib::plugins::projects::types::Member;
use craftdesk_lib::shared::paths::get_storage_dir;
use craftdesk_lib::RunOptions;

#[derive(Parser, Debug)]
#[command(name = "craftdesk", version, about = "Minecraft server companion and personal assistant bot")]
struct Cli {
    /// Data directory (defaults to $XDG_DATA_HOME/craftdesk)
    #[arg(long, env = "CRAFTDESK_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Numeric id of the person at the console
    #[arg(long, default_value_t = 1)]
    user_id: u64,

    /// Display name used for broadcasts and project notes
    #[arg(long, env = "USER", default_value = "console")]
    user_name: String,

    /// Do not start the background reminder, stock and status jobs
    #[arg(long)]
    no_jobs: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let options = RunOptions {
        storage_dir: cli.data_dir.unwrap_or_else(get_storage_dir),
        caller: Member {
            id: cli.user_id,
            name: cli.user_name,
        },
        jobs: !cli.no_jobs,
    };

    if let Err(e) = craftdesk_lib::run(options).await {
        eprintln!("craftdesk: {}", e);
        std::process::exit(1);
    }
}
